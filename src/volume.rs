//! SOLO and headphone volume buses.

use crate::capabilities::HasFader;
use crate::channel::FaderCore;
use crate::connection::MixerConnection;
use crate::paths::{self, VolumeBusKind};
use crate::store::MixerStore;
use std::sync::Arc;

/// A volume bus like headphones or solo.
///
/// Volume buses are plain faders; all behavior comes from
/// [`FadeableChannel`](crate::FadeableChannel).
#[derive(Clone)]
pub struct VolumeBus {
    fader: FaderCore,
}

impl VolumeBus {
    pub(crate) fn new(
        conn: Arc<MixerConnection>,
        store: Arc<MixerStore>,
        kind: VolumeBusKind,
    ) -> Self {
        let level_path = paths::volume_bus_path(kind);
        let default_name = match kind {
            VolumeBusKind::Solo => "SOLO".to_string(),
            VolumeBusKind::Headphone(id) => format!("HP {id}"),
        };
        let fader = FaderCore {
            conn,
            store,
            name_path: format!("{level_path}.name"),
            level_path,
            default_name,
        };
        Self { fader }
    }
}

impl HasFader for VolumeBus {
    fn fader(&self) -> &FaderCore {
        &self.fader
    }
}

/// Access to the SOLO and headphone volume buses
#[derive(Clone)]
pub struct VolumeBuses {
    conn: Arc<MixerConnection>,
    store: Arc<MixerStore>,
}

impl VolumeBuses {
    pub(crate) fn new(conn: Arc<MixerConnection>, store: Arc<MixerStore>) -> Self {
        Self { conn, store }
    }

    fn bus(&self, kind: VolumeBusKind) -> VolumeBus {
        let id = format!("volume.{}", paths::volume_bus_path(kind));
        let conn = self.conn.clone();
        let store = self.store.clone();
        self.store
            .objects()
            .get_or_create(&id, move || VolumeBus::new(conn, store, kind))
    }

    /// The SOLO bus volume
    pub fn solo(&self) -> VolumeBus {
        self.bus(VolumeBusKind::Solo)
    }

    /// A headphone output volume (1-based id)
    pub fn headphone(&self, id: u32) -> VolumeBus {
        self.bus(VolumeBusKind::Headphone(id))
    }
}
