//! AUX buses and the channel strips on them.

use crate::capabilities::{HasChannelBase, HasFader, PannableChannel, PrePostChannel};
use crate::channel::{ChannelBase, FaderCore};
use crate::connection::MixerConnection;
use crate::paths::{self, BusType, ChannelType};
use crate::store::{MixerStore, ParamStream};
use crate::util::clamp;
use std::sync::Arc;

/// A channel strip on an AUX bus.
///
/// PAN only exists on stereo-linked AUX buses; on a mono AUX the pan
/// operations are no-ops (a warning is logged).
#[derive(Clone)]
pub struct AuxChannel {
    base: ChannelBase,
    bus: u32,
}

impl AuxChannel {
    pub(crate) fn new(
        conn: Arc<MixerConnection>,
        store: Arc<MixerStore>,
        channel_type: ChannelType,
        channel: u32,
        bus: u32,
    ) -> Self {
        let full_id = paths::send_channel_id(channel_type, channel, BusType::Aux, bus);
        let level_path = paths::send_fader_path(&full_id);
        Self {
            base: ChannelBase::new(conn, store, channel_type, channel, full_id, level_path),
            bus,
        }
    }

    /// Canonical id of this strip, e.g. `i.2.aux.0`
    pub fn full_channel_id(&self) -> &str {
        &self.base.full_id
    }

    /// Set the PRE/POST PROC state (`true` is POST PROC)
    pub fn set_post_proc(&self, post_proc: bool) {
        self.base.set_bool_full("postproc", post_proc);
    }

    /// Switch to POST PROC
    pub fn to_post_proc(&self) {
        self.set_post_proc(true);
    }

    /// Switch to PRE PROC
    pub fn to_pre_proc(&self) {
        self.set_post_proc(false);
    }

    /// Stereo-link index of the AUX bus itself
    /// (0 first of a pair, 1 second, -1 not linked)
    fn bus_stereo_index(&self) -> i32 {
        let bus_master = paths::master_channel_id(ChannelType::AuxMaster, self.bus);
        self.base
            .store()
            .num(&paths::channel_property(&bus_master, "stereoIndex"))
            .map(|n| n as i32)
            .unwrap_or(-1)
    }

    /// Pan path on the primary bus of the linked pair, or `None` when
    /// the AUX bus is not stereo-linked
    fn pan_path(&self) -> Option<String> {
        let primary_bus = match self.bus_stereo_index() {
            0 => self.bus,
            1 => self.bus - 1,
            _ => return None,
        };
        let id = paths::send_channel_id(
            self.base.channel_type,
            self.base.channel,
            BusType::Aux,
            primary_bus,
        );
        Some(paths::channel_property(&id, "pan"))
    }
}

impl HasFader for AuxChannel {
    fn fader(&self) -> &FaderCore {
        &self.base.fader
    }
}

impl HasChannelBase for AuxChannel {
    fn channel_base(&self) -> &ChannelBase {
        &self.base
    }
}

impl PrePostChannel for AuxChannel {
    fn post(&self) -> ParamStream<bool> {
        self.base.bool_stream_full("post")
    }

    fn set_post(&self, post: bool) {
        self.base.set_bool_full("post", post);
    }

    fn toggle_post(&self) {
        self.base.toggle_bool_full("post");
    }
}

impl PannableChannel for AuxChannel {
    fn pan(&self) -> ParamStream<f64> {
        // reads resolve against the bus pair's primary strip; on a mono
        // bus this falls back to the own strip's (unused) pan path
        let path = self
            .pan_path()
            .unwrap_or_else(|| paths::channel_property(&self.base.full_id, "pan"));
        self.base.store().num_stream(&path)
    }

    fn set_pan(&self, value: f64) {
        match self.pan_path() {
            Some(path) => self.base.set_num(&path, clamp(value, 0.0, 1.0)),
            None => {
                tracing::warn!(
                    channel = %self.base.full_id,
                    "pan ignored: AUX bus is not stereo-linked"
                );
            }
        }
    }

    fn change_pan(&self, offset: f64) {
        match self.pan_path() {
            Some(path) => {
                let current = self.base.store().num(&path).unwrap_or(0.5);
                self.base.set_num(&path, clamp(current + offset, 0.0, 1.0));
            }
            None => {
                tracing::warn!(
                    channel = %self.base.full_id,
                    "pan ignored: AUX bus is not stereo-linked"
                );
            }
        }
    }
}

/// An AUX bus; hands out the channel strips sending to it
#[derive(Clone)]
pub struct AuxBus {
    conn: Arc<MixerConnection>,
    store: Arc<MixerStore>,
    bus: u32,
}

impl AuxBus {
    pub(crate) fn new(conn: Arc<MixerConnection>, store: Arc<MixerStore>, bus: u32) -> Self {
        Self { conn, store, bus }
    }

    fn channel(&self, ty: ChannelType, channel: u32) -> AuxChannel {
        let id = format!(
            "aux.{}.{}",
            self.bus,
            paths::master_channel_id(ty, channel)
        );
        let conn = self.conn.clone();
        let store = self.store.clone();
        let bus = self.bus;
        self.store
            .objects()
            .get_or_create(&id, move || AuxChannel::new(conn, store, ty, channel, bus))
    }

    /// Input channel on this AUX bus
    pub fn input(&self, channel: u32) -> AuxChannel {
        self.channel(ChannelType::Input, channel)
    }

    /// Line channel on this AUX bus
    pub fn line(&self, channel: u32) -> AuxChannel {
        self.channel(ChannelType::Line, channel)
    }

    /// Player channel on this AUX bus
    pub fn player(&self, channel: u32) -> AuxChannel {
        self.channel(ChannelType::Player, channel)
    }

    /// FX return channel on this AUX bus
    pub fn fx(&self, channel: u32) -> AuxChannel {
        self.channel(ChannelType::FxReturn, channel)
    }
}
