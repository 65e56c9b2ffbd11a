//! Automix controller and groups.
//!
//! Per-channel automix weight and group assignment live on
//! [`MasterChannel`](crate::MasterChannel); this module covers the
//! global controller: the two automix groups `a` and `b` and the shared
//! response time.

use crate::connection::MixerConnection;
use crate::paths::{self, AUTOMIX_TIME};
use crate::protocol::format_setd;
use crate::store::{MixerStore, ParamStream};
use crate::util::clamp;
use std::sync::Arc;

/// Response time range in milliseconds
const RESPONSE_TIME_MIN_MS: f64 = 20.0;
const RESPONSE_TIME_MAX_MS: f64 = 4000.0;

/// Identifier of an automix group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AutomixGroupId {
    A,
    B,
}

impl AutomixGroupId {
    /// Wire code of the group (`a` or `b`)
    pub fn code(self) -> &'static str {
        match self {
            AutomixGroupId::A => "a",
            AutomixGroupId::B => "b",
        }
    }

    fn letter(self) -> char {
        match self {
            AutomixGroupId::A => 'a',
            AutomixGroupId::B => 'b',
        }
    }
}

/// One automix group
#[derive(Clone)]
pub struct AutomixGroup {
    conn: Arc<MixerConnection>,
    store: Arc<MixerStore>,
    group: AutomixGroupId,
}

impl AutomixGroup {
    pub(crate) fn new(
        conn: Arc<MixerConnection>,
        store: Arc<MixerStore>,
        group: AutomixGroupId,
    ) -> Self {
        Self { conn, store, group }
    }

    fn path(&self) -> String {
        paths::automix_group_path(self.group.letter())
    }

    /// Active state of this automix group
    pub fn state(&self) -> ParamStream<bool> {
        self.store.num_stream(&self.path()).map_items(|n| n != 0.0)
    }

    fn set_state(&self, on: bool) {
        self.conn
            .send_message(format_setd(&self.path(), if on { 1.0 } else { 0.0 }));
    }

    /// Enable this automix group
    pub fn enable(&self) {
        self.set_state(true);
    }

    /// Disable this automix group
    pub fn disable(&self) {
        self.set_state(false);
    }

    /// Toggle the state of this automix group
    pub fn toggle(&self) {
        let current = self.store.num(&self.path()).unwrap_or(0.0);
        self.set_state(current == 0.0);
    }
}

/// Controller for the global automix settings
#[derive(Clone)]
pub struct AutomixController {
    conn: Arc<MixerConnection>,
    store: Arc<MixerStore>,
}

impl AutomixController {
    pub(crate) fn new(conn: Arc<MixerConnection>, store: Arc<MixerStore>) -> Self {
        Self { conn, store }
    }

    /// Access to automix group `a` or `b`
    pub fn group(&self, group: AutomixGroupId) -> AutomixGroup {
        AutomixGroup::new(self.conn.clone(), self.store.clone(), group)
    }

    /// Global response time (linear, between 0 and 1)
    pub fn response_time(&self) -> ParamStream<f64> {
        self.store.num_stream(AUTOMIX_TIME)
    }

    /// Global response time in milliseconds (between 20 and 4000)
    pub fn response_time_ms(&self) -> ParamStream<f64> {
        self.response_time().map_items(linear_to_ms)
    }

    /// Set the global response time (linear, between 0 and 1, clamped)
    pub fn set_response_time(&self, value: f64) {
        self.conn
            .send_message(format_setd(AUTOMIX_TIME, clamp(value, 0.0, 1.0)));
    }

    /// Set the global response time in milliseconds
    /// (between 20 and 4000, clamped)
    pub fn set_response_time_ms(&self, time_ms: f64) {
        self.set_response_time(ms_to_linear(time_ms));
    }
}

fn linear_to_ms(value: f64) -> f64 {
    RESPONSE_TIME_MIN_MS + value * (RESPONSE_TIME_MAX_MS - RESPONSE_TIME_MIN_MS)
}

fn ms_to_linear(ms: f64) -> f64 {
    let ms = clamp(ms, RESPONSE_TIME_MIN_MS, RESPONSE_TIME_MAX_MS);
    (ms - RESPONSE_TIME_MIN_MS) / (RESPONSE_TIME_MAX_MS - RESPONSE_TIME_MIN_MS)
}
