//! The top-level mixer facade.

use crate::automix::AutomixController;
use crate::aux::AuxBus;
use crate::channel_sync::ChannelSync;
use crate::connection::{ConnectionEvent, ConnectionStatus, MixerConnection, UiOptions};
use crate::device_info::DeviceInfo;
use crate::error::Result;
use crate::fx::FxBus;
use crate::hw::HwChannel;
use crate::master::MasterBus;
use crate::mute_group::{self, MuteGroup, MuteGroupId};
use crate::store::MixerStore;
use crate::volume::VolumeBuses;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Client for a Soundcraft Ui mixer.
///
/// Owns the connection and the synchronized state store, and hands out
/// the channel, bus and controller facades. Facades are cached: asking
/// twice for the same descriptor returns the same instance.
pub struct SoundcraftUi {
    conn: Arc<MixerConnection>,
    store: Arc<MixerStore>,
}

impl SoundcraftUi {
    /// Create a client for the mixer described by `options`.
    ///
    /// Must be called within a Tokio runtime (the state store runs as a
    /// background task). No I/O happens until
    /// [`connect`](SoundcraftUi::connect).
    pub fn new(options: UiOptions) -> Self {
        let conn = Arc::new(MixerConnection::new(options));
        let store = Arc::new(MixerStore::new(&conn));
        Self { conn, store }
    }

    /// Create a client for the mixer at the given IP address with
    /// default options
    pub fn with_target_ip(target_ip: impl Into<String>) -> Self {
        Self::new(UiOptions::new(target_ip))
    }

    /// The connection settings (immutable after construction)
    pub fn options(&self) -> &UiOptions {
        self.conn.options()
    }

    /// The connection manager
    pub fn conn(&self) -> &Arc<MixerConnection> {
        &self.conn
    }

    /// The synchronized state store
    pub fn store(&self) -> &Arc<MixerStore> {
        &self.store
    }

    /// Connect to the mixer. Resolves when the connection is open and
    /// the initial parameter dump has likely been received.
    pub async fn connect(&self) -> Result<()> {
        self.conn.connect().await?;
        self.store.wait_for_initial_state().await;
        Ok(())
    }

    /// Disconnect from the mixer. Resolves when the connection is
    /// closed; no automatic reconnect happens afterwards.
    pub async fn disconnect(&self) -> Result<()> {
        self.conn.disconnect().await
    }

    /// Reconnect to the mixer after one second. Resolves when the
    /// connection is open again and the initial parameters have likely
    /// been received.
    pub async fn reconnect(&self) -> Result<()> {
        self.conn.reconnect().await?;
        self.store.wait_for_initial_state().await;
        Ok(())
    }

    /// Current connection status
    pub fn status(&self) -> ConnectionStatus {
        self.conn.status()
    }

    /// Subscribe to connection status events
    pub fn status_events(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.conn.status_events()
    }

    /// Send a raw command to the mixer, e.g. `SETD^i.2.mute^1`.
    /// Escape hatch for parameters without a typed facade.
    pub fn send_message(&self, msg: impl Into<String>) {
        self.conn.send_message(msg);
    }

    /// Information about hardware and firmware of the mixer
    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo::new(self.store.clone())
    }

    /// The master bus
    pub fn master(&self) -> MasterBus {
        let conn = self.conn.clone();
        let store = self.store.clone();
        self.store
            .objects()
            .get_or_create("masterbus", move || MasterBus::new(conn, store))
    }

    /// An AUX bus (1-based)
    pub fn aux(&self, bus: u32) -> AuxBus {
        let id = format!("auxbus.{bus}");
        let conn = self.conn.clone();
        let store = self.store.clone();
        self.store
            .objects()
            .get_or_create(&id, move || AuxBus::new(conn, store, bus))
    }

    /// An FX bus (1-based)
    pub fn fx(&self, bus: u32) -> FxBus {
        let id = format!("fxbus.{bus}");
        let conn = self.conn.clone();
        let store = self.store.clone();
        self.store
            .objects()
            .get_or_create(&id, move || FxBus::new(conn, store, bus))
    }

    /// A hardware input channel (1-based). With 1:1 patching these are
    /// the same as the input channels.
    pub fn hw(&self, channel: u32) -> HwChannel {
        let id = format!("hw.{channel}");
        let conn = self.conn.clone();
        let store = self.store.clone();
        self.store
            .objects()
            .get_or_create(&id, move || HwChannel::new(conn, store, channel))
    }

    /// A MUTE group (1-6) or the MUTE ALL / MUTE FX groupings
    pub fn mute_group(&self, id: MuteGroupId) -> MuteGroup {
        let key = format!("mutegroup.{id:?}");
        let conn = self.conn.clone();
        let store = self.store.clone();
        self.store
            .objects()
            .get_or_create(&key, move || MuteGroup::new(conn, store, id))
    }

    /// Unmute all MUTE groups, MUTE ALL and MUTE FX
    pub fn clear_mute_groups(&self) {
        mute_group::clear_mute_groups(&self.conn);
    }

    /// The SOLO and headphone volume buses
    pub fn volume(&self) -> VolumeBuses {
        VolumeBuses::new(self.conn.clone(), self.store.clone())
    }

    /// Controller for the automix settings
    pub fn automix(&self) -> AutomixController {
        AutomixController::new(self.conn.clone(), self.store.clone())
    }

    /// Multi-client channel selection
    pub fn channel_sync(&self) -> ChannelSync {
        ChannelSync::new(self.conn.clone(), self.store.clone())
    }
}
