//! The address model: deterministic mapping between semantic channel
//! descriptors and wire parameter paths.
//!
//! Paths are dotted strings. Channel numbers are 1-based in the public
//! API (matching the console's web UI) and 0-based on the wire, so the
//! builders here subtract one exactly once. Path construction is pure:
//! the same descriptor always yields a byte-identical path.

use serde::{Deserialize, Serialize};

/// Channel type letter used in wire paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelType {
    /// Input channel (`i`)
    Input,
    /// Line input (`l`)
    Line,
    /// Media player channel (`p`)
    Player,
    /// FX return channel (`f`)
    FxReturn,
    /// Sub group (`s`)
    SubGroup,
    /// AUX master (`a`)
    AuxMaster,
    /// VCA (`v`)
    Vca,
}

impl ChannelType {
    /// The single-letter wire code
    pub fn code(self) -> &'static str {
        match self {
            ChannelType::Input => "i",
            ChannelType::Line => "l",
            ChannelType::Player => "p",
            ChannelType::FxReturn => "f",
            ChannelType::SubGroup => "s",
            ChannelType::AuxMaster => "a",
            ChannelType::Vca => "v",
        }
    }
}

/// Bus a channel strip belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BusType {
    /// The master (main mix) bus
    Master,
    /// An AUX send bus
    Aux,
    /// An FX send bus
    Fx,
}

impl BusType {
    fn qualifier(self) -> &'static str {
        match self {
            BusType::Master => "",
            BusType::Aux => "aux",
            BusType::Fx => "fx",
        }
    }
}

/// Hardware model of the mixer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MixerModel {
    Ui12,
    Ui16,
    Ui24,
}

impl MixerModel {
    /// Parse the wire representation (`ui12`, `ui16`, `ui24`)
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw {
            "ui12" => Some(MixerModel::Ui12),
            "ui16" => Some(MixerModel::Ui16),
            "ui24" => Some(MixerModel::Ui24),
            _ => None,
        }
    }

    /// Number of channels per type, in the fixed left-to-right order of
    /// the master bus: input, line, player, fx, sub, aux, vca.
    pub fn channel_counts(self) -> [(ChannelType, u32); 7] {
        let (i, s, a, v) = match self {
            MixerModel::Ui12 => (12, 0, 4, 0),
            MixerModel::Ui16 => (16, 0, 6, 0),
            MixerModel::Ui24 => (24, 6, 10, 6),
        };
        [
            (ChannelType::Input, i),
            (ChannelType::Line, 2),
            (ChannelType::Player, 2),
            (ChannelType::FxReturn, 4),
            (ChannelType::SubGroup, s),
            (ChannelType::AuxMaster, a),
            (ChannelType::Vca, v),
        ]
    }
}

/// Master-relative channel id, e.g. `i.2` for input 3.
/// This prefix addresses mute, name, pan and the other properties that
/// exist once per channel regardless of bus.
pub fn master_channel_id(ty: ChannelType, channel: u32) -> String {
    format!("{}.{}", ty.code(), channel.saturating_sub(1))
}

/// Channel id on a send bus, e.g. `i.2.aux.0` for input 3 on AUX 1
pub fn send_channel_id(ty: ChannelType, channel: u32, bus_type: BusType, bus: u32) -> String {
    debug_assert!(bus_type != BusType::Master);
    format!(
        "{}.{}.{}.{}",
        ty.code(),
        channel.saturating_sub(1),
        bus_type.qualifier(),
        bus.saturating_sub(1)
    )
}

/// Property path under a channel id, e.g. `i.2` + `mute` -> `i.2.mute`
pub fn channel_property(channel_id: &str, property: &str) -> String {
    format!("{channel_id}.{property}")
}

/// Fader path for a master-bus channel (`<id>.mix`)
pub fn master_fader_path(channel_id: &str) -> String {
    channel_property(channel_id, "mix")
}

/// Fader path for a send-bus channel (`<id>.value`)
pub fn send_fader_path(channel_id: &str) -> String {
    channel_property(channel_id, "value")
}

/// Master bus output paths
pub const MASTER_FADER: &str = "m.mix";
pub const MASTER_PAN: &str = "m.pan";
pub const MASTER_DIM: &str = "m.dim";
pub const MASTER_DELAY_L: &str = "m.delayL";
pub const MASTER_DELAY_R: &str = "m.delayR";

/// Mute group bitmask path (groups 1-6 are bits 0-5, MUTE ALL is bit 6,
/// MUTE FX is bit 7)
pub const MGMASK: &str = "mgmask";

/// Device info paths
pub const MODEL: &str = "model";
pub const FIRMWARE: &str = "firmware";

/// Automix controller paths
pub const AUTOMIX_TIME: &str = "settings.automix.time";

/// Path of an automix group's active state (`settings.automix.a` / `.b`)
pub fn automix_group_path(group: char) -> String {
    format!("settings.automix.{group}")
}

/// Hardware channel property, e.g. `hw.2.gain`
pub fn hw_property(channel: u32, property: &str) -> String {
    format!("hw.{}.{}", channel.saturating_sub(1), property)
}

/// Volume bus fader path: SOLO or headphone output volume
pub fn volume_bus_path(bus: VolumeBusKind) -> String {
    match bus {
        VolumeBusKind::Solo => "settings.solovol".to_string(),
        VolumeBusKind::Headphone(id) => {
            format!("settings.hpvol.{}", id.saturating_sub(1))
        }
    }
}

/// Kind of a volume bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeBusKind {
    /// The SOLO bus volume
    Solo,
    /// A headphone output volume (1-based id)
    Headphone(u32),
}

/// FX bus property, e.g. `f.0.bpm`
pub fn fx_bus_property(bus: u32, property: &str) -> String {
    format!("f.{}.{}", bus.saturating_sub(1), property)
}

/// Index of a channel in the fixed left-to-right ordering of the master
/// bus: inputs, line, player, fx, sub, aux, vca. Returns `None` when the
/// model does not have that channel.
pub fn channel_sync_index(model: MixerModel, ty: ChannelType, channel: u32) -> Option<i64> {
    let mut offset: i64 = 0;
    for (t, count) in model.channel_counts() {
        if t == ty {
            if channel == 0 || channel > count {
                return None;
            }
            return Some(offset + (channel as i64 - 1));
        }
        offset += count as i64;
    }
    None
}

/// Index that addresses the master fader in the sync ordering
/// (one past the last channel)
pub fn master_sync_index(model: MixerModel) -> i64 {
    model
        .channel_counts()
        .iter()
        .map(|(_, count)| *count as i64)
        .sum()
}

/// Reverse of [`channel_sync_index`]: resolve a sync index into a
/// channel descriptor. `None` means the index addresses the master bus
/// or is out of range.
pub fn channel_from_sync_index(model: MixerModel, index: i64) -> Option<(ChannelType, u32)> {
    if index < 0 {
        return None;
    }
    let mut rest = index;
    for (ty, count) in model.channel_counts() {
        if rest < count as i64 {
            return Some((ty, rest as u32 + 1));
        }
        rest -= count as i64;
    }
    None
}
