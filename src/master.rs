//! The master (main mix) bus.

use crate::capabilities::{HasFader, PannableChannel};
use crate::channel::{DelayableMasterChannel, FaderCore, MasterChannel};
use crate::connection::MixerConnection;
use crate::paths::{self, ChannelType};
use crate::protocol::format_setd;
use crate::store::{MixerStore, ParamStream};
use crate::util::clamp;
use std::sync::Arc;

/// Maximum master output delay per side in milliseconds
const MASTER_DELAY_MAX_MS: f64 = 500.0;

/// The master bus: the main stereo output fader plus access to every
/// channel strip on it.
#[derive(Clone)]
pub struct MasterBus {
    conn: Arc<MixerConnection>,
    store: Arc<MixerStore>,
    fader: FaderCore,
}

impl MasterBus {
    pub(crate) fn new(conn: Arc<MixerConnection>, store: Arc<MixerStore>) -> Self {
        let fader = FaderCore {
            conn: conn.clone(),
            store: store.clone(),
            level_path: paths::MASTER_FADER.to_string(),
            name_path: "m.name".to_string(),
            default_name: "MASTER".to_string(),
        };
        Self { conn, store, fader }
    }

    /// DIM state of the master output
    pub fn dim(&self) -> ParamStream<bool> {
        self.store
            .num_stream(paths::MASTER_DIM)
            .map_items(|n| n != 0.0)
    }

    /// Set the DIM state
    pub fn set_dim(&self, dim: bool) {
        self.conn
            .send_message(format_setd(paths::MASTER_DIM, if dim { 1.0 } else { 0.0 }));
    }

    /// Enable DIM
    pub fn dim_on(&self) {
        self.set_dim(true);
    }

    /// Disable DIM
    pub fn dim_off(&self) {
        self.set_dim(false);
    }

    /// Toggle DIM
    pub fn toggle_dim(&self) {
        let current = self.store.num(paths::MASTER_DIM).unwrap_or(0.0);
        self.set_dim(current == 0.0);
    }

    /// LEFT output delay in milliseconds
    pub fn delay_l(&self) -> ParamStream<f64> {
        self.store.num_stream(paths::MASTER_DELAY_L)
    }

    /// RIGHT output delay in milliseconds
    pub fn delay_r(&self) -> ParamStream<f64> {
        self.store.num_stream(paths::MASTER_DELAY_R)
    }

    /// Set the LEFT output delay in milliseconds (maximum 500 ms)
    pub fn set_delay_l(&self, ms: f64) {
        self.set_delay(paths::MASTER_DELAY_L, ms);
    }

    /// Set the RIGHT output delay in milliseconds (maximum 500 ms)
    pub fn set_delay_r(&self, ms: f64) {
        self.set_delay(paths::MASTER_DELAY_R, ms);
    }

    /// Change the LEFT output delay by a millisecond offset;
    /// the result is clamped
    pub fn change_delay_l(&self, offset_ms: f64) {
        let current = self.store.num(paths::MASTER_DELAY_L).unwrap_or(0.0);
        self.set_delay(paths::MASTER_DELAY_L, current + offset_ms);
    }

    /// Change the RIGHT output delay by a millisecond offset;
    /// the result is clamped
    pub fn change_delay_r(&self, offset_ms: f64) {
        let current = self.store.num(paths::MASTER_DELAY_R).unwrap_or(0.0);
        self.set_delay(paths::MASTER_DELAY_R, current + offset_ms);
    }

    fn set_delay(&self, path: &str, ms: f64) {
        self.conn
            .send_message(format_setd(path, clamp(ms, 0.0, MASTER_DELAY_MAX_MS)));
    }

    fn delayable(&self, ty: ChannelType, channel: u32) -> DelayableMasterChannel {
        let id = format!("master.{}", paths::master_channel_id(ty, channel));
        let conn = self.conn.clone();
        let store = self.store.clone();
        self.store.objects().get_or_create(&id, move || {
            DelayableMasterChannel::new(conn, store, ty, channel)
        })
    }

    fn plain(&self, ty: ChannelType, channel: u32) -> MasterChannel {
        let id = format!("master.{}", paths::master_channel_id(ty, channel));
        let conn = self.conn.clone();
        let store = self.store.clone();
        self.store
            .objects()
            .get_or_create(&id, move || MasterChannel::new(conn, store, ty, channel))
    }

    /// Input channel on the master bus
    pub fn input(&self, channel: u32) -> DelayableMasterChannel {
        self.delayable(ChannelType::Input, channel)
    }

    /// Line channel on the master bus
    pub fn line(&self, channel: u32) -> DelayableMasterChannel {
        self.delayable(ChannelType::Line, channel)
    }

    /// Player channel on the master bus
    pub fn player(&self, channel: u32) -> MasterChannel {
        self.plain(ChannelType::Player, channel)
    }

    /// AUX output channel on the master bus
    pub fn aux(&self, channel: u32) -> DelayableMasterChannel {
        self.delayable(ChannelType::AuxMaster, channel)
    }

    /// FX return channel on the master bus
    pub fn fx(&self, channel: u32) -> MasterChannel {
        self.plain(ChannelType::FxReturn, channel)
    }

    /// Sub group channel on the master bus
    pub fn sub(&self, channel: u32) -> MasterChannel {
        self.plain(ChannelType::SubGroup, channel)
    }

    /// VCA channel on the master bus
    pub fn vca(&self, channel: u32) -> MasterChannel {
        self.plain(ChannelType::Vca, channel)
    }
}

impl HasFader for MasterBus {
    fn fader(&self) -> &FaderCore {
        &self.fader
    }
}

impl PannableChannel for MasterBus {
    fn pan(&self) -> ParamStream<f64> {
        self.store.num_stream(paths::MASTER_PAN)
    }

    fn set_pan(&self, value: f64) {
        self.conn
            .send_message(format_setd(paths::MASTER_PAN, clamp(value, 0.0, 1.0)));
    }

    fn change_pan(&self, offset: f64) {
        let current = self.store.num(paths::MASTER_PAN).unwrap_or(0.5);
        self.conn.send_message(format_setd(
            paths::MASTER_PAN,
            clamp(current + offset, 0.0, 1.0),
        ));
    }
}
