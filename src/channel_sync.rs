//! Multi-client channel selection.
//!
//! Clients sharing a SYNC ID select the same channel: a selection is
//! broadcast as `BMSG^SYNC^<id>^<index>` and mirrored into every
//! client's sync state, including our own through the outbound echo.
//! Indexes count the master bus left to right (inputs, line, player,
//! fx, sub, aux, vca) with the master fader last; the counts per type
//! depend on the mixer model.

use crate::capabilities::FadeableChannel;
use crate::connection::MixerConnection;
use crate::device_info::DeviceInfo;
use crate::error::{Result, UiError};
use crate::master::MasterBus;
use crate::paths::{self, ChannelType, MixerModel};
use crate::protocol::format_sync;
use crate::store::MixerStore;
use futures_util::{Stream, StreamExt};
use std::sync::Arc;
use tokio_stream::wrappers::WatchStream;

/// SYNC ID used when none is given
pub const DEFAULT_SYNC_ID: &str = "SYNC_ID";

/// Channel selection shared between clients with the same SYNC ID
#[derive(Clone)]
pub struct ChannelSync {
    conn: Arc<MixerConnection>,
    store: Arc<MixerStore>,
    device_info: DeviceInfo,
}

impl ChannelSync {
    pub(crate) fn new(conn: Arc<MixerConnection>, store: Arc<MixerStore>) -> Self {
        let device_info = DeviceInfo::new(store.clone());
        Self {
            conn,
            store,
            device_info,
        }
    }

    fn model(&self) -> MixerModel {
        // until the mixer reports its model, assume the largest console
        self.device_info.current_model().unwrap_or(MixerModel::Ui24)
    }

    /// Index of the currently selected channel as a replay-latest
    /// stream, counted left to right on the master bus
    pub fn selected_channel_index(
        &self,
        sync_id: &str,
    ) -> impl Stream<Item = i64> + Send + Unpin {
        WatchStream::new(self.store.sync_subscribe(sync_id))
            .filter_map(|index| futures_util::future::ready(index))
    }

    /// The currently selected channel as a replay-latest stream.
    ///
    /// Emits `None` while nothing (or something out of range) is
    /// selected. The items only expose the subset of behavior all
    /// fadeable strips share.
    pub fn selected_channel(
        &self,
        sync_id: &str,
    ) -> impl Stream<Item = Option<Box<dyn FadeableChannel>>> + Send + Unpin {
        let this = self.clone();
        WatchStream::new(self.store.sync_subscribe(sync_id)).map(move |index| {
            index.and_then(|index| this.resolve_channel(index))
        })
    }

    /// Select a channel by index. All clients with the same SYNC ID
    /// will select the same channel.
    pub fn select_channel_index(&self, index: i64, sync_id: &str) {
        self.conn.send_message(format_sync(sync_id, index));
    }

    /// Select a channel by type and number
    pub fn select_channel(&self, ty: ChannelType, channel: u32, sync_id: &str) -> Result<()> {
        let model = self.model();
        let index = paths::channel_sync_index(model, ty, channel).ok_or_else(|| {
            let count = model
                .channel_counts()
                .iter()
                .find(|(t, _)| *t == ty)
                .map(|(_, c)| *c as i64)
                .unwrap_or(0);
            UiError::OutOfRange {
                what: "channel number",
                value: channel as i64,
                min: 1,
                max: count,
            }
        })?;
        self.select_channel_index(index, sync_id);
        Ok(())
    }

    /// Select the master fader
    pub fn select_master(&self, sync_id: &str) {
        self.select_channel_index(paths::master_sync_index(self.model()), sync_id);
    }

    /// Resolve a sync index into the facade it addresses
    fn resolve_channel(&self, index: i64) -> Option<Box<dyn FadeableChannel>> {
        let model = self.model();
        let master = MasterBus::new(self.conn.clone(), self.store.clone());

        if index == paths::master_sync_index(model) {
            return Some(Box::new(master));
        }

        let (ty, channel) = paths::channel_from_sync_index(model, index)?;
        Some(match ty {
            ChannelType::Input => Box::new(master.input(channel)),
            ChannelType::Line => Box::new(master.line(channel)),
            ChannelType::Player => Box::new(master.player(channel)),
            ChannelType::FxReturn => Box::new(master.fx(channel)),
            ChannelType::SubGroup => Box::new(master.sub(channel)),
            ChannelType::AuxMaster => Box::new(master.aux(channel)),
            ChannelType::Vca => Box::new(master.vca(channel)),
        })
    }
}
