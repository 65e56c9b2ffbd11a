//! Channel strip facades on the master bus, and the shared plumbing all
//! channel-like facades are built from.
//!
//! Facades hold no state of their own: reads are derived streams over
//! the [`MixerStore`] and writes go through the [`MixerConnection`].
//! They are cheap to clone and cached by canonical id, so repeated
//! lookups return the same instance.

use crate::capabilities::{DelayableChannel, HasChannelBase, HasFader, PannableChannel};
use crate::connection::MixerConnection;
use crate::conversions::{
    automix_weight_to_db, db_to_automix_weight, db_to_fader_value, fader_value_to_db,
};
use crate::easing::Easing;
use crate::paths::{self, ChannelType};
use crate::protocol::{format_setd, format_sets};
use crate::store::{MixerStore, ParamStream, Value};
use crate::transition::{self, TransitionHandle};
use crate::util::{clamp, linked_channel_number, readable_channel_name};
use std::sync::Arc;

/// Fader plumbing shared by everything fadeable
#[derive(Clone)]
pub(crate) struct FaderCore {
    pub(crate) conn: Arc<MixerConnection>,
    pub(crate) store: Arc<MixerStore>,
    /// Path of the fader value, e.g. `i.2.mix` or `i.2.aux.0.value`
    pub(crate) level_path: String,
    /// Path of the channel name
    pub(crate) name_path: String,
    /// Label when no custom name is set
    pub(crate) default_name: String,
}

impl FaderCore {
    pub(crate) fn name_stream(&self) -> ParamStream<String> {
        let default_name = self.default_name.clone();
        self.store.param_stream(&self.name_path, move |value| {
            Some(match value {
                Some(Value::Text(s)) if !s.is_empty() => s.clone(),
                Some(Value::Num(n)) => n.to_string(),
                _ => default_name.clone(),
            })
        })
    }

    pub(crate) fn level_stream(&self) -> ParamStream<f64> {
        self.store.num_stream(&self.level_path)
    }

    pub(crate) fn level_db_stream(&self) -> ParamStream<f64> {
        self.level_stream().map_items(fader_value_to_db)
    }

    pub(crate) fn set_level(&self, value: f64) {
        let value = clamp(value, 0.0, 1.0);
        self.conn.send_message(format_setd(&self.level_path, value));
    }

    pub(crate) fn set_level_db(&self, db_value: f64) {
        self.set_level(db_to_fader_value(db_value));
    }

    pub(crate) fn change_level_db(&self, offset_db: f64) {
        let current = self.store.num(&self.level_path).unwrap_or(0.0);
        self.set_level_db(fader_value_to_db(current) + offset_db);
    }

    pub(crate) fn fade_to(
        &self,
        target: f64,
        fade_time_ms: u64,
        easing: Easing,
        fps: Option<u32>,
    ) -> TransitionHandle {
        transition::fade_to(
            self.conn.clone(),
            self.store.clone(),
            self.level_path.clone(),
            target,
            fade_time_ms,
            easing,
            fps,
        )
    }

    pub(crate) fn fade_to_db(
        &self,
        target_db: f64,
        fade_time_ms: u64,
        easing: Easing,
        fps: Option<u32>,
    ) -> TransitionHandle {
        transition::fade_to_db(
            self.conn.clone(),
            self.store.clone(),
            self.level_path.clone(),
            target_db,
            fade_time_ms,
            easing,
            fps,
        )
    }
}

/// Plumbing shared by all channel strips (master-relative properties
/// plus the bus-specific fader)
#[derive(Clone)]
pub(crate) struct ChannelBase {
    pub(crate) fader: FaderCore,
    pub(crate) channel_type: ChannelType,
    pub(crate) channel: u32,
    /// Master-relative id, e.g. `i.2`; mute, name, pan and the stereo
    /// link index live here regardless of bus
    pub(crate) master_id: String,
    /// Id of this strip on its bus, e.g. `i.2` or `i.2.aux.0`
    pub(crate) full_id: String,
}

impl ChannelBase {
    pub(crate) fn new(
        conn: Arc<MixerConnection>,
        store: Arc<MixerStore>,
        channel_type: ChannelType,
        channel: u32,
        full_id: String,
        level_path: String,
    ) -> Self {
        let master_id = paths::master_channel_id(channel_type, channel);
        let fader = FaderCore {
            conn,
            store,
            level_path,
            name_path: paths::channel_property(&master_id, "name"),
            default_name: readable_channel_name(channel_type, channel),
        };
        Self {
            fader,
            channel_type,
            channel,
            master_id,
            full_id,
        }
    }

    pub(crate) fn conn(&self) -> &MixerConnection {
        &self.fader.conn
    }

    pub(crate) fn store(&self) -> &MixerStore {
        &self.fader.store
    }

    fn master_path(&self, property: &str) -> String {
        paths::channel_property(&self.master_id, property)
    }

    fn full_path(&self, property: &str) -> String {
        paths::channel_property(&self.full_id, property)
    }

    pub(crate) fn set_num(&self, path: &str, value: f64) {
        self.conn().send_message(format_setd(path, value));
    }

    pub(crate) fn bool_stream_master(&self, property: &str) -> ParamStream<bool> {
        self.store()
            .num_stream(&self.master_path(property))
            .map_items(|n| n != 0.0)
    }

    pub(crate) fn set_bool_master(&self, property: &str, on: bool) {
        self.set_num(&self.master_path(property), if on { 1.0 } else { 0.0 });
    }

    pub(crate) fn toggle_bool_master(&self, property: &str) {
        let current = self.store().num(&self.master_path(property)).unwrap_or(0.0);
        self.set_bool_master(property, current == 0.0);
    }

    pub(crate) fn bool_stream_full(&self, property: &str) -> ParamStream<bool> {
        self.store()
            .num_stream(&self.full_path(property))
            .map_items(|n| n != 0.0)
    }

    pub(crate) fn set_bool_full(&self, property: &str, on: bool) {
        self.set_num(&self.full_path(property), if on { 1.0 } else { 0.0 });
    }

    pub(crate) fn toggle_bool_full(&self, property: &str) {
        let current = self.store().num(&self.full_path(property)).unwrap_or(0.0);
        self.set_bool_full(property, current == 0.0);
    }

    /// Index of this channel in its stereo-link compound:
    /// 0 first, 1 second, -1 not linked
    pub(crate) fn stereo_index(&self) -> i32 {
        self.store()
            .num(&self.master_path("stereoIndex"))
            .map(|n| n as i32)
            .unwrap_or(-1)
    }

    /// Master-relative id of the stereo-link partner, when linked
    pub(crate) fn linked_master_id(&self) -> Option<String> {
        match self.stereo_index() {
            si @ (0 | 1) => {
                let partner = linked_channel_number(self.channel, si);
                Some(paths::master_channel_id(self.channel_type, partner))
            }
            _ => None,
        }
    }

    /// Set the channel name
    pub(crate) fn set_name(&self, name: &str) {
        self.conn()
            .send_message(format_sets(&self.fader.name_path, name));
    }
}

/// A channel strip on the master bus (player, FX return, sub group and
/// VCA kinds; the delayable kinds use [`DelayableMasterChannel`]).
#[derive(Clone)]
pub struct MasterChannel {
    base: ChannelBase,
}

impl MasterChannel {
    pub(crate) fn new(
        conn: Arc<MixerConnection>,
        store: Arc<MixerStore>,
        channel_type: ChannelType,
        channel: u32,
    ) -> Self {
        let full_id = paths::master_channel_id(channel_type, channel);
        let level_path = paths::master_fader_path(&full_id);
        Self {
            base: ChannelBase::new(conn, store, channel_type, channel, full_id, level_path),
        }
    }

    /// Canonical id of this channel, e.g. `i.2`
    pub fn full_channel_id(&self) -> &str {
        &self.base.full_id
    }

    /// Set the channel name
    pub fn set_name(&self, name: &str) {
        self.base.set_name(name);
    }

    /// SOLO state of the channel
    pub fn solo(&self) -> ParamStream<bool> {
        self.base.bool_stream_master("solo")
    }

    /// Set the SOLO state
    pub fn set_solo(&self, solo: bool) {
        self.base.set_bool_master("solo", solo);
    }

    /// Enable SOLO
    pub fn solo_on(&self) {
        self.set_solo(true);
    }

    /// Disable SOLO
    pub fn solo_off(&self) {
        self.set_solo(false);
    }

    /// Toggle the SOLO state
    pub fn toggle_solo(&self) {
        self.base.toggle_bool_master("solo");
    }

    /// Index of this channel in its stereo-link compound
    /// (0 first, 1 second, -1 not linked)
    pub fn stereo_index(&self) -> ParamStream<i64> {
        self.base
            .store()
            .param_stream(&paths::channel_property(&self.base.master_id, "stereoIndex"), |v| {
                Some(v.and_then(Value::as_num).unwrap_or(-1.0) as i64)
            })
    }

    /// Assigned automix group (`a`, `b` or none).
    /// Assignment includes the stereo-linked partner channel.
    pub fn automix_group(&self) -> ParamStream<Option<crate::automix::AutomixGroupId>> {
        self.base
            .store()
            .param_stream(&paths::channel_property(&self.base.master_id, "amixgroup"), |v| {
                Some(match v.and_then(Value::as_text) {
                    Some("a") => Some(crate::automix::AutomixGroupId::A),
                    Some("b") => Some(crate::automix::AutomixGroupId::B),
                    _ => None,
                })
            })
    }

    /// Assign this channel (and its stereo-link partner) to an automix
    /// group; `None` removes it from all groups
    pub fn automix_assign_group(&self, group: Option<crate::automix::AutomixGroupId>) {
        let value = match group {
            Some(g) => g.code(),
            None => "none",
        };
        let own = paths::channel_property(&self.base.master_id, "amixgroup");
        self.base.conn().send_message(format_sets(&own, value));
        if let Some(partner) = self.base.linked_master_id() {
            let partner_path = paths::channel_property(&partner, "amixgroup");
            self.base
                .conn()
                .send_message(format_sets(&partner_path, value));
        }
    }

    /// Remove this channel from its automix group
    pub fn automix_remove(&self) {
        self.automix_assign_group(None);
    }

    /// Automix weight of this channel (linear, between 0 and 1)
    pub fn automix_weight(&self) -> ParamStream<f64> {
        self.base
            .store()
            .num_stream(&paths::channel_property(&self.base.master_id, "amix"))
    }

    /// Automix weight of this channel in dB (between -12 and 12)
    pub fn automix_weight_db(&self) -> ParamStream<f64> {
        self.automix_weight().map_items(automix_weight_to_db)
    }

    /// Set the automix weight (linear, between 0 and 1, clamped)
    pub fn automix_set_weight(&self, value: f64) {
        let path = paths::channel_property(&self.base.master_id, "amix");
        self.base.set_num(&path, clamp(value, 0.0, 1.0));
    }

    /// Set the automix weight in dB (between -12 and 12, clamped)
    pub fn automix_set_weight_db(&self, db_value: f64) {
        self.automix_set_weight(db_to_automix_weight(db_value));
    }

    /// Change the automix weight by a dB offset; the result is clamped
    pub fn automix_change_weight_db(&self, offset_db: f64) {
        let path = paths::channel_property(&self.base.master_id, "amix");
        let current = self.base.store().num(&path).unwrap_or(0.0);
        self.automix_set_weight_db(automix_weight_to_db(current) + offset_db);
    }
}

impl HasFader for MasterChannel {
    fn fader(&self) -> &FaderCore {
        &self.base.fader
    }
}

impl HasChannelBase for MasterChannel {
    fn channel_base(&self) -> &ChannelBase {
        &self.base
    }
}

impl PannableChannel for MasterChannel {
    fn pan(&self) -> ParamStream<f64> {
        self.base
            .store()
            .num_stream(&paths::channel_property(&self.base.master_id, "pan"))
    }

    fn set_pan(&self, value: f64) {
        let path = paths::channel_property(&self.base.master_id, "pan");
        self.base.set_num(&path, clamp(value, 0.0, 1.0));
    }

    fn change_pan(&self, offset: f64) {
        let path = paths::channel_property(&self.base.master_id, "pan");
        let current = self.base.store().num(&path).unwrap_or(0.5);
        self.base.set_num(&path, clamp(current + offset, 0.0, 1.0));
    }
}

/// A channel strip on the master bus whose signal can be delayed
/// (input, line and aux master kinds).
///
/// Everything from [`MasterChannel`] plus the delay capability; input
/// and line channels allow up to 250 ms, aux masters up to 500 ms.
#[derive(Clone)]
pub struct DelayableMasterChannel {
    inner: MasterChannel,
    max_delay_ms: f64,
}

impl DelayableMasterChannel {
    pub(crate) fn new(
        conn: Arc<MixerConnection>,
        store: Arc<MixerStore>,
        channel_type: ChannelType,
        channel: u32,
    ) -> Self {
        let max_delay_ms = match channel_type {
            ChannelType::AuxMaster => 500.0,
            _ => 250.0,
        };
        Self {
            inner: MasterChannel::new(conn, store, channel_type, channel),
            max_delay_ms,
        }
    }

    /// The underlying master channel
    pub fn channel(&self) -> &MasterChannel {
        &self.inner
    }
}

impl std::ops::Deref for DelayableMasterChannel {
    type Target = MasterChannel;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl HasFader for DelayableMasterChannel {
    fn fader(&self) -> &FaderCore {
        &self.inner.base.fader
    }
}

impl HasChannelBase for DelayableMasterChannel {
    fn channel_base(&self) -> &ChannelBase {
        &self.inner.base
    }
}

impl PannableChannel for DelayableMasterChannel {
    fn pan(&self) -> ParamStream<f64> {
        self.inner.pan()
    }

    fn set_pan(&self, value: f64) {
        self.inner.set_pan(value);
    }

    fn change_pan(&self, offset: f64) {
        self.inner.change_pan(offset);
    }
}

impl DelayableChannel for DelayableMasterChannel {
    fn delay(&self) -> ParamStream<f64> {
        self.inner
            .base
            .store()
            .num_stream(&paths::channel_property(&self.inner.base.master_id, "delay"))
    }

    fn max_delay_ms(&self) -> f64 {
        self.max_delay_ms
    }

    fn set_delay(&self, ms: f64) {
        let path = paths::channel_property(&self.inner.base.master_id, "delay");
        self.inner.base.set_num(&path, clamp(ms, 0.0, self.max_delay_ms));
    }

    fn change_delay(&self, offset_ms: f64) {
        let path = paths::channel_property(&self.inner.base.master_id, "delay");
        let current = self.inner.base.store().num(&path).unwrap_or(0.0);
        self.inner
            .base
            .set_num(&path, clamp(current + offset_ms, 0.0, self.max_delay_ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delay_limits_per_kind() {
        let conn = Arc::new(MixerConnection::new(crate::UiOptions::new("127.0.0.1")));
        let store = Arc::new(MixerStore::new(&conn));

        let input =
            DelayableMasterChannel::new(conn.clone(), store.clone(), ChannelType::Input, 1);
        let aux =
            DelayableMasterChannel::new(conn.clone(), store.clone(), ChannelType::AuxMaster, 1);
        assert_eq!(input.max_delay_ms(), 250.0);
        assert_eq!(aux.max_delay_ms(), 500.0);
    }
}
