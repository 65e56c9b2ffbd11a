//! Hardware input channels.
//!
//! With 1:1 patching these match the input channels; when patched
//! differently, hardware channel 1 is still the first physical input.

use crate::connection::MixerConnection;
use crate::conversions::{db_to_gain_value, gain_value_to_db};
use crate::paths;
use crate::protocol::format_setd;
use crate::store::{MixerStore, ParamStream};
use crate::util::clamp;
use std::sync::Arc;

/// A hardware input on the mixer: preamp gain and phantom power
#[derive(Clone)]
pub struct HwChannel {
    conn: Arc<MixerConnection>,
    store: Arc<MixerStore>,
    channel: u32,
}

impl HwChannel {
    pub(crate) fn new(conn: Arc<MixerConnection>, store: Arc<MixerStore>, channel: u32) -> Self {
        Self {
            conn,
            store,
            channel,
        }
    }

    fn gain_path(&self) -> String {
        paths::hw_property(self.channel, "gain")
    }

    fn phantom_path(&self) -> String {
        paths::hw_property(self.channel, "phantom")
    }

    /// Phantom power state of the channel
    pub fn phantom(&self) -> ParamStream<bool> {
        self.store
            .num_stream(&self.phantom_path())
            .map_items(|n| n != 0.0)
    }

    /// Set the phantom power state
    pub fn set_phantom(&self, on: bool) {
        self.conn
            .send_message(format_setd(&self.phantom_path(), if on { 1.0 } else { 0.0 }));
    }

    /// Switch phantom power on
    pub fn phantom_on(&self) {
        self.set_phantom(true);
    }

    /// Switch phantom power off
    pub fn phantom_off(&self) {
        self.set_phantom(false);
    }

    /// Toggle phantom power
    pub fn toggle_phantom(&self) {
        let current = self.store.num(&self.phantom_path()).unwrap_or(0.0);
        self.set_phantom(current == 0.0);
    }

    /// Linear gain level of the channel (between 0 and 1)
    pub fn gain(&self) -> ParamStream<f64> {
        self.store.num_stream(&self.gain_path())
    }

    /// Gain level of the channel in dB (between -6 and 57)
    pub fn gain_db(&self) -> ParamStream<f64> {
        self.gain().map_items(gain_value_to_db)
    }

    /// Set the gain level (linear, between 0 and 1, clamped)
    pub fn set_gain(&self, value: f64) {
        self.conn
            .send_message(format_setd(&self.gain_path(), clamp(value, 0.0, 1.0)));
    }

    /// Set the gain level in dB (between -6 and 57, clamped)
    pub fn set_gain_db(&self, db_value: f64) {
        self.set_gain(db_to_gain_value(db_value));
    }

    /// Change the gain by a dB offset; the result is clamped
    pub fn change_gain_db(&self, offset_db: f64) {
        let current = self.store.num(&self.gain_path()).unwrap_or(0.0);
        self.set_gain_db(gain_value_to_db(current) + offset_db);
    }
}
