//! Wire protocol of the Ui mixer family.
//!
//! The console speaks a line-oriented text protocol, one message per
//! WebSocket frame: `<OPCODE>^<path>^<value>`. `SETD` carries numeric
//! parameter values, `SETS` carries string values (channel names, model,
//! firmware). `BMSG^SYNC^<id>^<index>` synchronizes channel selection
//! between clients. Everything else (VU blobs, heartbeats) is passed
//! through to the raw message log untouched.

/// Keepalive command sent periodically while the connection is open
pub const KEEPALIVE_MESSAGE: &str = "ALIVE";

/// Kind of a set message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetKind {
    /// `SETD` — numeric parameter value
    Numeric,
    /// `SETS` — string value
    Text,
}

impl SetKind {
    fn opcode(self) -> &'static str {
        match self {
            SetKind::Numeric => "SETD",
            SetKind::Text => "SETS",
        }
    }
}

/// A message recognized by the state store
#[derive(Debug, Clone, PartialEq)]
pub enum MixerMessage {
    /// Parameter set (`SETD` or `SETS`)
    Set {
        /// Which opcode carried the value
        kind: SetKind,
        /// Dotted parameter path, e.g. `i.2.mute`
        path: String,
        /// Raw value text, coerced later by the store
        value: String,
    },
    /// Channel selection sync (`BMSG^SYNC^<id>^<index>`)
    Sync {
        /// Sync group identifier
        sync_id: String,
        /// Selected channel index
        index: i64,
    },
}

/// Parse one raw line into a recognized message.
///
/// Returns `None` for unrecognized or malformed input; such lines stay
/// visible on the raw log but never touch the state table.
pub fn parse_message(raw: &str) -> Option<MixerMessage> {
    let raw = raw.trim_end_matches(['\r', '\n']);
    let mut parts = raw.splitn(3, '^');
    let opcode = parts.next()?;
    match opcode {
        "SETD" | "SETS" => {
            let path = parts.next()?;
            let value = parts.next()?;
            if path.is_empty() {
                return None;
            }
            let kind = if opcode == "SETD" {
                SetKind::Numeric
            } else {
                SetKind::Text
            };
            Some(MixerMessage::Set {
                kind,
                path: path.to_string(),
                value: value.to_string(),
            })
        }
        "BMSG" => {
            // BMSG^SYNC^<syncId>^<index>
            let subtype = parts.next()?;
            if subtype != "SYNC" {
                return None;
            }
            let rest = parts.next()?;
            let (sync_id, index) = rest.split_once('^')?;
            if sync_id.is_empty() {
                return None;
            }
            let index: i64 = index.parse().ok()?;
            Some(MixerMessage::Sync {
                sync_id: sync_id.to_string(),
                index,
            })
        }
        _ => None,
    }
}

/// Format a numeric set command.
/// Values are rounded to three decimals before transmission.
pub fn format_setd(path: &str, value: f64) -> String {
    format!("SETD^{path}^{}", crate::util::round_to_three_decimals(value))
}

/// Format a string set command
pub fn format_sets(path: &str, value: &str) -> String {
    format!("SETS^{path}^{value}")
}

/// Format a channel selection sync command
pub fn format_sync(sync_id: &str, index: i64) -> String {
    format!("BMSG^SYNC^{sync_id}^{index}")
}
