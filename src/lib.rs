//! Rust library for controlling Soundcraft Ui series digital mixers
//!
//! This library keeps a live, bidirectionally synchronized model of a
//! Ui12/Ui16/Ui24R mixing console over a persistent WebSocket
//! connection. It supports:
//!
//! - Automatic reconnection and keepalive handling
//! - A subscribable parameter store fed by the mixer's state messages
//! - Typed channel and bus facades (master, AUX, FX, hardware inputs,
//!   volume buses) with clamped setters
//! - Animated fader transitions with selectable easing
//! - Mute groups, automix control and multi-client channel selection
//!
//! # Quick Start
//!
//! ```no_run
//! use soundcraft_ui::{Easing, FadeableChannel, MuteableChannel, SoundcraftUi};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mixer = SoundcraftUi::with_target_ip("192.168.1.123");
//!     mixer.connect().await?;
//!
//!     // control input 3 on the master bus
//!     let channel = mixer.master().input(3);
//!     channel.set_fader_level_db(-6.0);
//!     channel.mute_off();
//!
//!     // subscribe to fader changes (the current value arrives first)
//!     let mut level = channel.fader_level();
//!     if let Some(value) = level.next_value().await {
//!         println!("input 3 fader: {value}");
//!     }
//!
//!     // animated fade over 2 seconds
//!     channel.fade_to(0.0, 2000, Easing::EaseOut, None).finished().await;
//!
//!     mixer.disconnect().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! The library is organized into several layers:
//!
//! - **SoundcraftUi**: entry point, hands out cached facades
//! - **MixerConnection**: WebSocket lifecycle, reconnect, keepalive and
//!   the raw message streams
//! - **MixerStore**: parameter table with per-path subscriptions
//! - **Facades**: channels and buses composed from capability traits
//! - **Transitions**: timed fader animations with pre-emption

mod automix;
mod aux;
mod capabilities;
mod channel;
mod channel_sync;
mod connection;
mod conversions;
mod device_info;
mod easing;
mod error;
mod fx;
mod hw;
mod master;
mod mixer;
mod mute_group;
mod object_store;
mod paths;
mod protocol;
mod store;
mod transition;
mod transport;
mod util;
mod volume;

// Public exports
pub use automix::{AutomixController, AutomixGroup, AutomixGroupId};
pub use aux::{AuxBus, AuxChannel};
pub use capabilities::{
    DelayableChannel, FadeableChannel, MuteableChannel, PannableChannel, PrePostChannel,
};
pub use channel::{DelayableMasterChannel, MasterChannel};
pub use channel_sync::{ChannelSync, DEFAULT_SYNC_ID};
pub use connection::{ConnectionEvent, ConnectionStatus, MixerConnection, UiOptions};
pub use conversions::{
    automix_weight_to_db, db_to_automix_weight, db_to_fader_value, db_to_gain_value,
    fader_value_to_db, gain_value_to_db,
};
pub use device_info::DeviceInfo;
pub use easing::Easing;
pub use error::{Result, UiError};
pub use fx::{FxBus, FxChannel, FxType};
pub use hw::HwChannel;
pub use master::MasterBus;
pub use mixer::SoundcraftUi;
pub use mute_group::{MuteGroup, MuteGroupId};
pub use paths::{BusType, ChannelType, MixerModel};
pub use store::{MixerStore, ParamStream, Value};
pub use transition::TransitionHandle;
pub use transport::{Transport, TransportSession, TransportSink, TransportStream, WsTransport};
pub use volume::{VolumeBus, VolumeBuses};
