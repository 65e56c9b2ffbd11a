//! FX buses and the channel strips on them.

use crate::capabilities::{HasChannelBase, HasFader, PrePostChannel};
use crate::channel::{ChannelBase, FaderCore};
use crate::connection::MixerConnection;
use crate::error::{Result, UiError};
use crate::paths::{self, BusType, ChannelType};
use crate::protocol::format_setd;
use crate::store::{MixerStore, ParamStream, Value};
use crate::util::clamp;
use std::sync::Arc;

/// Effect type loaded on an FX bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FxType {
    None,
    Reverb,
    Delay,
    Chorus,
    Room,
}

impl FxType {
    fn from_wire(n: f64) -> Self {
        match n as i64 {
            0 => FxType::Reverb,
            1 => FxType::Delay,
            2 => FxType::Chorus,
            3 => FxType::Room,
            _ => FxType::None,
        }
    }
}

/// A channel strip on an FX bus
#[derive(Clone)]
pub struct FxChannel {
    base: ChannelBase,
}

impl FxChannel {
    pub(crate) fn new(
        conn: Arc<MixerConnection>,
        store: Arc<MixerStore>,
        channel_type: ChannelType,
        channel: u32,
        bus: u32,
    ) -> Self {
        let full_id = paths::send_channel_id(channel_type, channel, BusType::Fx, bus);
        let level_path = paths::send_fader_path(&full_id);
        Self {
            base: ChannelBase::new(conn, store, channel_type, channel, full_id, level_path),
        }
    }

    /// Canonical id of this strip, e.g. `i.2.fx.0`
    pub fn full_channel_id(&self) -> &str {
        &self.base.full_id
    }
}

impl HasFader for FxChannel {
    fn fader(&self) -> &FaderCore {
        &self.base.fader
    }
}

impl HasChannelBase for FxChannel {
    fn channel_base(&self) -> &ChannelBase {
        &self.base
    }
}

impl PrePostChannel for FxChannel {
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

/// An FX bus: effect settings plus the channel strips sending to it
#[derive(Clone)]
pub struct FxBus {
    conn: Arc<MixerConnection>,
    store: Arc<MixerStore>,
    bus: u32,
}

impl FxBus {
    pub(crate) fn new(conn: Arc<MixerConnection>, store: Arc<MixerStore>, bus: u32) -> Self {
        Self { conn, store, bus }
    }

    /// Selected effect type (Reverb, Delay, Chorus, Room)
    pub fn fx_type(&self) -> ParamStream<FxType> {
        self.store
            .param_stream(&paths::fx_bus_property(self.bus, "fxtype"), |v| {
                Some(match v.and_then(Value::as_num) {
                    Some(n) => FxType::from_wire(n),
                    None => FxType::None,
                })
            })
    }

    /// BPM value of this FX (between 20 and 400).
    /// Always present, but only used by effects with a BPM setting.
    pub fn bpm(&self) -> ParamStream<f64> {
        self.store
            .num_stream(&paths::fx_bus_property(self.bus, "bpm"))
    }

    /// Set the BPM value of this FX (between 20 and 400, clamped)
    pub fn set_bpm(&self, value: f64) {
        let path = paths::fx_bus_property(self.bus, "bpm");
        self.conn
            .send_message(format_setd(&path, clamp(value, 20.0, 400.0)));
    }

    fn param_path(&self, param: u32) -> Result<String> {
        if !(1..=6).contains(&param) {
            return Err(UiError::OutOfRange {
                what: "FX parameter slot",
                value: param as i64,
                min: 1,
                max: 6,
            });
        }
        Ok(paths::fx_bus_property(self.bus, &format!("par{param}")))
    }

    /// Linear value (between 0 and 1) of one FX parameter slot
    /// (between 1 and 6)
    pub fn param(&self, param: u32) -> Result<ParamStream<f64>> {
        Ok(self.store.num_stream(&self.param_path(param)?))
    }

    /// Set one FX parameter slot (between 1 and 6) to a linear value
    /// (between 0 and 1, clamped)
    pub fn set_param(&self, param: u32, value: f64) -> Result<()> {
        let path = self.param_path(param)?;
        self.conn
            .send_message(format_setd(&path, clamp(value, 0.0, 1.0)));
        Ok(())
    }

    fn channel(&self, ty: ChannelType, channel: u32) -> FxChannel {
        let id = format!("fx.{}.{}", self.bus, paths::master_channel_id(ty, channel));
        let conn = self.conn.clone();
        let store = self.store.clone();
        let bus = self.bus;
        self.store
            .objects()
            .get_or_create(&id, move || FxChannel::new(conn, store, ty, channel, bus))
    }

    /// Input channel on this FX bus
    pub fn input(&self, channel: u32) -> FxChannel {
        self.channel(ChannelType::Input, channel)
    }

    /// Line channel on this FX bus
    pub fn line(&self, channel: u32) -> FxChannel {
        self.channel(ChannelType::Line, channel)
    }

    /// Player channel on this FX bus
    pub fn player(&self, channel: u32) -> FxChannel {
        self.channel(ChannelType::Player, channel)
    }

    /// Sub group channel on this FX bus
    pub fn sub(&self, channel: u32) -> FxChannel {
        self.channel(ChannelType::SubGroup, channel)
    }
}
