//! Capability traits of channels and buses.
//!
//! The console's strips differ in what they can do: an aux send has pan
//! and pre/post but no delay, a master-bus aux output has delay and pan
//! but no pre/post. Instead of a type hierarchy, each concrete facade
//! composes the orthogonal capabilities it actually has by implementing
//! these traits. All traits are object-safe; `ChannelSync` hands out
//! `Box<dyn FadeableChannel>`.

use crate::channel::{ChannelBase, FaderCore};
use crate::easing::Easing;
use crate::store::ParamStream;
use crate::transition::TransitionHandle;

/// Anything with a fader: channels, send strips, the master bus and the
/// volume buses.
pub trait FadeableChannel: Send + Sync {
    /// Name of the channel (custom name when set, default label
    /// otherwise)
    fn name(&self) -> ParamStream<String>;

    /// Linear fader level (between 0 and 1)
    fn fader_level(&self) -> ParamStream<f64>;

    /// Fader level in dB (between -inf and 10)
    fn fader_level_db(&self) -> ParamStream<f64>;

    /// Set the linear fader level (between 0 and 1, clamped)
    fn set_fader_level(&self, value: f64);

    /// Set the fader level in dB (between -inf and 10, clamped)
    fn set_fader_level_db(&self, db_value: f64);

    /// Change the fader level by a dB offset; the result is clamped,
    /// never the offset
    fn change_fader_level_db(&self, offset_db: f64);

    /// Fade to a linear target value over `fade_time_ms`. `fps` falls
    /// back to the configured default frame rate.
    fn fade_to(
        &self,
        target: f64,
        fade_time_ms: u64,
        easing: Easing,
        fps: Option<u32>,
    ) -> TransitionHandle;

    /// Fade to a dB target value over `fade_time_ms`, interpolating in
    /// dB space
    fn fade_to_db(
        &self,
        target_db: f64,
        fade_time_ms: u64,
        easing: Easing,
        fps: Option<u32>,
    ) -> TransitionHandle;
}

/// Channels with a MUTE button
pub trait MuteableChannel: Send + Sync {
    /// MUTE state of the channel
    fn mute(&self) -> ParamStream<bool>;

    /// Set the MUTE state
    fn set_mute(&self, muted: bool);

    /// Enable MUTE
    fn mute_on(&self) {
        self.set_mute(true);
    }

    /// Disable MUTE
    fn mute_off(&self) {
        self.set_mute(false);
    }

    /// Toggle the MUTE state
    fn toggle_mute(&self);
}

/// Channels with a PAN control
pub trait PannableChannel: Send + Sync {
    /// PAN value (between 0 and 1, 0.5 is center)
    fn pan(&self) -> ParamStream<f64>;

    /// Set the PAN value (between 0 and 1, clamped)
    fn set_pan(&self, value: f64);

    /// Change the PAN value by an offset; the result is clamped
    fn change_pan(&self, offset: f64);
}

/// Channels whose signal can be delayed
pub trait DelayableChannel: Send + Sync {
    /// Delay in milliseconds
    fn delay(&self) -> ParamStream<f64>;

    /// Maximum delay of this channel in milliseconds
    fn max_delay_ms(&self) -> f64;

    /// Set the delay in milliseconds (clamped to `0..=max_delay_ms`)
    fn set_delay(&self, ms: f64);

    /// Change the delay by a millisecond offset; the result is clamped
    fn change_delay(&self, offset_ms: f64);
}

/// Send strips that switch between PRE and POST fader pickup
pub trait PrePostChannel: Send + Sync {
    /// PRE/POST state (`true` is POST)
    fn post(&self) -> ParamStream<bool>;

    /// Set the PRE/POST state (`true` is POST)
    fn set_post(&self, post: bool);

    /// Switch to POST fader
    fn to_post(&self) {
        self.set_post(true);
    }

    /// Switch to PRE fader
    fn to_pre(&self) {
        self.set_post(false);
    }

    /// Toggle the PRE/POST state
    fn toggle_post(&self);
}

/// Internal access to the fader plumbing; carries the blanket
/// [`FadeableChannel`] implementation for every facade that has one.
pub(crate) trait HasFader {
    fn fader(&self) -> &FaderCore;
}

impl<T: HasFader + Send + Sync> FadeableChannel for T {
    fn name(&self) -> ParamStream<String> {
        self.fader().name_stream()
    }

    fn fader_level(&self) -> ParamStream<f64> {
        self.fader().level_stream()
    }

    fn fader_level_db(&self) -> ParamStream<f64> {
        self.fader().level_db_stream()
    }

    fn set_fader_level(&self, value: f64) {
        self.fader().set_level(value);
    }

    fn set_fader_level_db(&self, db_value: f64) {
        self.fader().set_level_db(db_value);
    }

    fn change_fader_level_db(&self, offset_db: f64) {
        self.fader().change_level_db(offset_db);
    }

    fn fade_to(
        &self,
        target: f64,
        fade_time_ms: u64,
        easing: Easing,
        fps: Option<u32>,
    ) -> TransitionHandle {
        self.fader().fade_to(target, fade_time_ms, easing, fps)
    }

    fn fade_to_db(
        &self,
        target_db: f64,
        fade_time_ms: u64,
        easing: Easing,
        fps: Option<u32>,
    ) -> TransitionHandle {
        self.fader().fade_to_db(target_db, fade_time_ms, easing, fps)
    }
}

/// Internal access to the master-relative channel plumbing; carries the
/// blanket [`MuteableChannel`] implementation.
pub(crate) trait HasChannelBase {
    fn channel_base(&self) -> &ChannelBase;
}

impl<T: HasChannelBase + Send + Sync> MuteableChannel for T {
    fn mute(&self) -> ParamStream<bool> {
        self.channel_base().bool_stream_master("mute")
    }

    fn set_mute(&self, muted: bool) {
        self.channel_base().set_bool_master("mute", muted);
    }

    fn toggle_mute(&self) {
        self.channel_base().toggle_bool_master("mute");
    }
}
