//! Small pure helpers shared across the crate.

use crate::paths::ChannelType;

/// Clamp a numeric value to min and max
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Round a number to three decimal places.
/// All numeric values on the wire are written with this precision.
pub fn round_to_three_decimals(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Lexical check for an integer literal (optional leading minus)
fn is_int_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Lexical check for a float literal like `0.5`, `-3.25` or `.5`
fn is_float_literal(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    match body.split_once('.') {
        Some((int_part, frac_part)) => {
            int_part.bytes().all(|b| b.is_ascii_digit())
                && !frac_part.is_empty()
                && frac_part.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// Returns `Some(n)` if the raw string lexically matches an integer or
/// floating-point literal, `None` otherwise. Words like `inf` or `1e5`
/// stay textual even though `f64::from_str` would accept them.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    if is_int_literal(raw) || is_float_literal(raw) {
        raw.parse().ok()
    } else {
        None
    }
}

/// Channel number of the stereo-link partner.
/// `stereo_index` is `0` for the first channel of a linked pair and `1`
/// for the second; numbers are 1-based like the public API.
pub fn linked_channel_number(channel: u32, stereo_index: i32) -> u32 {
    match stereo_index {
        0 => channel + 1,
        1 => channel.saturating_sub(1),
        _ => channel,
    }
}

/// Construct a human-readable channel name based on the default labels
/// from the mixer's web interface. Used when no custom name is set.
pub fn readable_channel_name(ty: ChannelType, channel: u32) -> String {
    match ty {
        ChannelType::Input => format!("CH {channel}"),
        ChannelType::Line => format!("LINE {channel}"),
        ChannelType::Player => format!("PLAYER {channel}"),
        ChannelType::FxReturn => format!("FX {channel}"),
        ChannelType::SubGroup => format!("SUB {channel}"),
        ChannelType::AuxMaster => format!("AUX {channel}"),
        ChannelType::Vca => format!("VCA {channel}"),
    }
}
