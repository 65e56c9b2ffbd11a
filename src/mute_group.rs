//! MUTE groups and the related MUTE ALL / MUTE FX groupings.
//!
//! All groups share a single bitmask parameter on the wire: groups 1-6
//! occupy bits 0-5, MUTE ALL bit 6 and MUTE FX bit 7.

use crate::connection::MixerConnection;
use crate::paths::MGMASK;
use crate::protocol::format_setd;
use crate::store::{MixerStore, ParamStream};
use std::sync::Arc;

/// Identifier of a MUTE group or grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MuteGroupId {
    /// Regular MUTE group 1-6
    Group(u32),
    /// The MUTE ALL grouping
    All,
    /// The MUTE FX grouping
    Fx,
}

impl MuteGroupId {
    /// Bit of this group in the `mgmask` bitmask.
    /// Group numbers outside 1-6 are clamped into range.
    fn bit(self) -> u32 {
        match self {
            MuteGroupId::Group(n) => n.clamp(1, 6) - 1,
            MuteGroupId::All => 6,
            MuteGroupId::Fx => 7,
        }
    }
}

/// One MUTE group (or MUTE ALL / MUTE FX)
#[derive(Clone)]
pub struct MuteGroup {
    conn: Arc<MixerConnection>,
    store: Arc<MixerStore>,
    id: MuteGroupId,
}

impl MuteGroup {
    pub(crate) fn new(
        conn: Arc<MixerConnection>,
        store: Arc<MixerStore>,
        id: MuteGroupId,
    ) -> Self {
        Self { conn, store, id }
    }

    /// The group identifier
    pub fn id(&self) -> MuteGroupId {
        self.id
    }

    fn mask(&self) -> u32 {
        self.store.num(MGMASK).unwrap_or(0.0) as u32
    }

    /// MUTE state of the group
    pub fn state(&self) -> ParamStream<bool> {
        let bit = self.id.bit();
        self.store
            .num_stream(MGMASK)
            .map_items(move |mask| (mask as u32) & (1 << bit) != 0)
    }

    /// Mute the group
    pub fn mute(&self) {
        let mask = self.mask() | (1 << self.id.bit());
        self.conn.send_message(format_setd(MGMASK, mask as f64));
    }

    /// Unmute the group
    pub fn unmute(&self) {
        let mask = self.mask() & !(1 << self.id.bit());
        self.conn.send_message(format_setd(MGMASK, mask as f64));
    }

    /// Toggle the group
    pub fn toggle(&self) {
        let mask = self.mask() ^ (1 << self.id.bit());
        self.conn.send_message(format_setd(MGMASK, mask as f64));
    }
}

/// Unmute all MUTE groups including MUTE ALL and MUTE FX
pub(crate) fn clear_mute_groups(conn: &MixerConnection) {
    conn.send_message(format_setd(MGMASK, 0.0));
}
