//! Hardware and firmware information reported by the mixer.

use crate::paths::{self, MixerModel};
use crate::store::{MixerStore, ParamStream, Value};
use std::sync::Arc;

/// Information about the connected mixer
#[derive(Clone)]
pub struct DeviceInfo {
    store: Arc<MixerStore>,
}

impl DeviceInfo {
    pub(crate) fn new(store: Arc<MixerStore>) -> Self {
        Self { store }
    }

    /// Hardware model of the mixer (`ui12`, `ui16`, `ui24`)
    pub fn model(&self) -> ParamStream<MixerModel> {
        self.store.param_stream(paths::MODEL, |v| {
            v.and_then(Value::as_text).and_then(MixerModel::from_wire)
        })
    }

    /// Currently known hardware model, if the mixer has reported one yet
    pub fn current_model(&self) -> Option<MixerModel> {
        self.store
            .value(paths::MODEL)
            .as_ref()
            .and_then(Value::as_text)
            .and_then(MixerModel::from_wire)
    }

    /// Firmware version of the mixer
    pub fn firmware(&self) -> ParamStream<String> {
        self.store.param_stream(paths::FIRMWARE, |v| {
            v.map(|value| match value {
                Value::Text(s) => s.clone(),
                Value::Num(n) => n.to_string(),
            })
        })
    }
}
