//! Conversions between linear wire values and decibel values.
//!
//! Each channel class has its own curve and valid range:
//!
//! * fader levels follow the console's logarithmic fader taper
//!   (`-Infinity`..`+10` dB mapped to `0`..`1`),
//! * hardware input gain is a straight line over `-6`..`57` dB,
//! * automix weights are a straight line over `-12`..`12` dB.
//!
//! Every pair of functions is mutually inverse within `1e-3`.

use crate::util::{clamp, round_to_three_decimals};

/// Maximum fader level in dB (fader fully up)
pub const FADER_MAX_DB: f64 = 10.0;

/// Hardware gain range in dB
pub const GAIN_MIN_DB: f64 = -6.0;
pub const GAIN_MAX_DB: f64 = 57.0;

/// Automix weight range in dB
pub const AUTOMIX_WEIGHT_MIN_DB: f64 = -12.0;
pub const AUTOMIX_WEIGHT_MAX_DB: f64 = 12.0;

/// Convert a fader value from dB to a linear float between 0 and 1.
/// `-Infinity` maps to exactly 0.
pub fn db_to_fader_value(db_value: f64) -> f64 {
    if db_value == f64::NEG_INFINITY {
        return 0.0;
    }
    10f64.powf((db_value - FADER_MAX_DB) / 40.0)
}

/// Convert a linear fader value (between 0 and 1) to dB.
/// 0 maps to `-Infinity`.
pub fn fader_value_to_db(value: f64) -> f64 {
    if value <= 0.0 {
        return f64::NEG_INFINITY;
    }
    round_to_three_decimals(40.0 * value.log10() + FADER_MAX_DB)
}

/// Convert hardware gain from dB (between -6 and 57) to linear
pub fn db_to_gain_value(db_value: f64) -> f64 {
    let db = clamp(db_value, GAIN_MIN_DB, GAIN_MAX_DB);
    (db - GAIN_MIN_DB) / (GAIN_MAX_DB - GAIN_MIN_DB)
}

/// Convert linear hardware gain (between 0 and 1) to dB
pub fn gain_value_to_db(value: f64) -> f64 {
    let lin = clamp(value, 0.0, 1.0);
    round_to_three_decimals(GAIN_MIN_DB + lin * (GAIN_MAX_DB - GAIN_MIN_DB))
}

/// Convert an automix weight from dB (between -12 and 12) to linear
pub fn db_to_automix_weight(db_value: f64) -> f64 {
    let db = clamp(db_value, AUTOMIX_WEIGHT_MIN_DB, AUTOMIX_WEIGHT_MAX_DB);
    (db - AUTOMIX_WEIGHT_MIN_DB) / (AUTOMIX_WEIGHT_MAX_DB - AUTOMIX_WEIGHT_MIN_DB)
}

/// Convert a linear automix weight (between 0 and 1) to dB
pub fn automix_weight_to_db(value: f64) -> f64 {
    let lin = clamp(value, 0.0, 1.0);
    round_to_three_decimals(
        AUTOMIX_WEIGHT_MIN_DB + lin * (AUTOMIX_WEIGHT_MAX_DB - AUTOMIX_WEIGHT_MIN_DB),
    )
}
