//! E2E tests for the channel and bus facades: addressing, caching,
//! clamping and the stereo-link rules.

mod common;

use common::mock_mixer;
use futures_util::StreamExt;
use soundcraft_ui::{
    AutomixGroupId, Easing, FadeableChannel, MuteGroupId, MuteableChannel, PannableChannel,
    PrePostChannel, Value,
};
use std::time::Duration;

async fn settle(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn channel_addresses_are_deterministic() {
    let (mixer, _transport) = mock_mixer();

    let a = mixer.master().input(2);
    let b = mixer.master().input(2);
    assert_eq!(a.full_channel_id(), "i.1");
    assert_eq!(a.full_channel_id(), b.full_channel_id());

    assert_eq!(mixer.aux(1).input(3).full_channel_id(), "i.2.aux.0");
    assert_eq!(mixer.fx(2).player(1).full_channel_id(), "p.0.fx.1");
}

#[tokio::test(start_paused = true)]
async fn facades_are_cached_per_descriptor() {
    let (mixer, transport) = mock_mixer();
    mixer.connect().await.unwrap();
    let session = transport.session(0).await;

    // two requests for the same descriptor share one subscription state:
    // a write through the first is visible through the second
    let first = mixer.master().input(4);
    let second = mixer.master().input(4);

    session.push("SETD^i.3.mix^0.9");
    settle(10).await;
    assert_eq!(first.fader_level().current(), Some(0.9));
    assert_eq!(second.fader_level().current(), Some(0.9));
}

#[tokio::test(start_paused = true)]
async fn setters_clamp_out_of_range_values() {
    let (mixer, transport) = mock_mixer();
    mixer.connect().await.unwrap();
    let session = transport.session(0).await;

    let channel = mixer.master().input(1);
    channel.set_fader_level(1.7);
    channel.set_fader_level(-0.3);
    assert_eq!(session.next_setd().await.unwrap(), "SETD^i.0.mix^1");
    assert_eq!(session.next_setd().await.unwrap(), "SETD^i.0.mix^0");
}

#[tokio::test(start_paused = true)]
async fn relative_changes_clamp_the_result_not_the_offset() {
    let (mixer, transport) = mock_mixer();
    mixer.connect().await.unwrap();
    let session = transport.session(0).await;

    session.push("SETD^i.0.mix^0.5");
    settle(10).await;

    // a huge positive offset lands exactly on the maximum
    let channel = mixer.master().input(1);
    channel.change_fader_level_db(200.0);
    assert_eq!(session.next_setd().await.unwrap(), "SETD^i.0.mix^1");
}

#[tokio::test(start_paused = true)]
async fn mute_writes_the_master_relative_path() {
    let (mixer, transport) = mock_mixer();
    mixer.connect().await.unwrap();
    let session = transport.session(0).await;

    // mute is master-relative even for a strip on a send bus
    mixer.aux(2).input(5).mute_on();
    assert_eq!(session.next_setd().await.unwrap(), "SETD^i.4.mute^1");

    mixer.master().input(5).mute_off();
    assert_eq!(session.next_setd().await.unwrap(), "SETD^i.4.mute^0");
}

#[tokio::test(start_paused = true)]
async fn toggles_read_the_current_state() {
    let (mixer, transport) = mock_mixer();
    mixer.connect().await.unwrap();
    let session = transport.session(0).await;

    session.push("SETD^p.0.mute^1");
    settle(10).await;

    mixer.master().player(1).toggle_mute();
    assert_eq!(session.next_setd().await.unwrap(), "SETD^p.0.mute^0");
}

#[tokio::test(start_paused = true)]
async fn aux_sends_use_the_value_property() {
    let (mixer, transport) = mock_mixer();
    mixer.connect().await.unwrap();
    let session = transport.session(0).await;

    let send = mixer.aux(1).input(1);
    send.set_fader_level(0.25);
    assert_eq!(session.next_setd().await.unwrap(), "SETD^i.0.aux.0.value^0.25");

    send.set_post(true);
    assert_eq!(session.next_setd().await.unwrap(), "SETD^i.0.aux.0.post^1");

    send.set_post_proc(false);
    assert_eq!(session.next_setd().await.unwrap(), "SETD^i.0.aux.0.postproc^0");
}

#[tokio::test(start_paused = true)]
async fn aux_pan_requires_a_stereo_linked_bus() {
    let (mixer, transport) = mock_mixer();
    mixer.connect().await.unwrap();
    let session = transport.session(0).await;

    let send = mixer.aux(1).input(1);

    // unlinked bus: pan is a no-op
    send.set_pan(0.2);
    settle(10).await;
    assert!(session.drain_outbound().iter().all(|m| !m.contains("pan")));

    // aux bus 1 is the first half of a linked pair: pan goes to its own
    // strip on the primary bus
    session.push("SETD^a.0.stereoIndex^0");
    settle(10).await;
    send.set_pan(0.2);
    assert_eq!(session.next_setd().await.unwrap(), "SETD^i.0.aux.0.pan^0.2");

    // the partner strip on bus 2 resolves back to the primary bus 1
    session.push("SETD^a.1.stereoIndex^1");
    settle(10).await;
    let partner = mixer.aux(2).input(1);
    partner.set_pan(0.8);
    assert_eq!(session.next_setd().await.unwrap(), "SETD^i.0.aux.0.pan^0.8");
}

#[tokio::test(start_paused = true)]
async fn hw_gain_converts_between_db_and_linear() {
    let (mixer, transport) = mock_mixer();
    mixer.connect().await.unwrap();
    let session = transport.session(0).await;

    let hw = mixer.hw(1);
    // -6 dB is the bottom of the gain range
    hw.set_gain_db(-6.0);
    assert_eq!(session.next_setd().await.unwrap(), "SETD^hw.0.gain^0");
    // 57 dB is the top
    hw.set_gain_db(57.0);
    assert_eq!(session.next_setd().await.unwrap(), "SETD^hw.0.gain^1");

    hw.set_phantom(true);
    assert_eq!(session.next_setd().await.unwrap(), "SETD^hw.0.phantom^1");
}

#[tokio::test(start_paused = true)]
async fn mute_groups_share_one_bitmask() {
    let (mixer, transport) = mock_mixer();
    mixer.connect().await.unwrap();
    let session = transport.session(0).await;

    session.push("SETD^mgmask^5");
    settle(10).await;

    // group 1 (bit 0) reads as muted, group 2 (bit 1) does not
    assert_eq!(
        mixer.mute_group(MuteGroupId::Group(1)).state().current(),
        Some(true)
    );
    assert_eq!(
        mixer.mute_group(MuteGroupId::Group(2)).state().current(),
        Some(false)
    );

    // muting group 2 adds bit 1 to the mask
    mixer.mute_group(MuteGroupId::Group(2)).mute();
    assert_eq!(session.next_setd().await.unwrap(), "SETD^mgmask^7");
    settle(10).await;

    // MUTE ALL is bit 6
    mixer.mute_group(MuteGroupId::All).mute();
    assert_eq!(session.next_setd().await.unwrap(), "SETD^mgmask^71");

    mixer.clear_mute_groups();
    assert_eq!(session.next_setd().await.unwrap(), "SETD^mgmask^0");
}

#[tokio::test(start_paused = true)]
async fn names_fall_back_to_default_labels() {
    let (mixer, transport) = mock_mixer();
    mixer.connect().await.unwrap();
    let session = transport.session(0).await;

    let channel = mixer.master().input(3);
    let mut names = channel.name();
    assert_eq!(names.next().await, Some("CH 3".to_string()));

    session.push("SETS^i.2.name^Guitar");
    assert_eq!(names.next().await, Some("Guitar".to_string()));
}

#[tokio::test(start_paused = true)]
async fn master_bus_controls() {
    let (mixer, transport) = mock_mixer();
    mixer.connect().await.unwrap();
    let session = transport.session(0).await;

    let master = mixer.master();
    master.set_fader_level(0.5);
    assert_eq!(session.next_setd().await.unwrap(), "SETD^m.mix^0.5");

    master.set_pan(0.5);
    assert_eq!(session.next_setd().await.unwrap(), "SETD^m.pan^0.5");

    master.dim_on();
    assert_eq!(session.next_setd().await.unwrap(), "SETD^m.dim^1");

    // delay is clamped to 500 ms per side
    master.set_delay_l(750.0);
    assert_eq!(session.next_setd().await.unwrap(), "SETD^m.delayL^500");
}

#[tokio::test(start_paused = true)]
async fn channel_delay_limits_depend_on_the_kind() {
    let (mixer, transport) = mock_mixer();
    mixer.connect().await.unwrap();
    let session = transport.session(0).await;
    use soundcraft_ui::DelayableChannel;

    mixer.master().input(1).set_delay(400.0);
    assert_eq!(session.next_setd().await.unwrap(), "SETD^i.0.delay^250");

    mixer.master().aux(1).set_delay(400.0);
    assert_eq!(session.next_setd().await.unwrap(), "SETD^a.0.delay^400");
}

#[tokio::test(start_paused = true)]
async fn automix_weight_and_groups() {
    let (mixer, transport) = mock_mixer();
    mixer.connect().await.unwrap();
    let session = transport.session(0).await;

    let channel = mixer.master().input(1);
    channel.automix_set_weight_db(0.0);
    assert_eq!(session.next_setd().await.unwrap(), "SETD^i.0.amix^0.5");

    // unlinked channel: only its own assignment is written
    channel.automix_assign_group(Some(AutomixGroupId::A));
    assert_eq!(session.next_outbound().await.unwrap(), "SETS^i.0.amixgroup^a");

    // linked channel: the partner is assigned as well
    session.push("SETD^i.0.stereoIndex^0");
    settle(10).await;
    channel.automix_assign_group(Some(AutomixGroupId::B));
    assert_eq!(session.next_outbound().await.unwrap(), "SETS^i.0.amixgroup^b");
    assert_eq!(session.next_outbound().await.unwrap(), "SETS^i.1.amixgroup^b");

    let automix = mixer.automix();
    automix.group(AutomixGroupId::A).enable();
    assert_eq!(session.next_setd().await.unwrap(), "SETD^settings.automix.a^1");

    automix.set_response_time_ms(4000.0);
    assert_eq!(
        session.next_setd().await.unwrap(),
        "SETD^settings.automix.time^1"
    );
}

#[tokio::test(start_paused = true)]
async fn volume_buses_are_plain_faders() {
    let (mixer, transport) = mock_mixer();
    mixer.connect().await.unwrap();
    let session = transport.session(0).await;

    mixer.volume().solo().set_fader_level(0.4);
    assert_eq!(session.next_setd().await.unwrap(), "SETD^settings.solovol^0.4");

    mixer.volume().headphone(2).set_fader_level_db(10.0);
    assert_eq!(session.next_setd().await.unwrap(), "SETD^settings.hpvol.1^1");

    // volume buses can fade like any channel
    let handle = mixer.volume().solo().fade_to(1.0, 200, Easing::Linear, None);
    assert!(handle.finished().await);
}

#[tokio::test(start_paused = true)]
async fn fx_bus_settings() {
    let (mixer, transport) = mock_mixer();
    mixer.connect().await.unwrap();
    let session = transport.session(0).await;

    let fx = mixer.fx(1);
    fx.set_bpm(500.0);
    assert_eq!(session.next_setd().await.unwrap(), "SETD^f.0.bpm^400");

    fx.set_param(3, 0.5).unwrap();
    assert_eq!(session.next_setd().await.unwrap(), "SETD^f.0.par3^0.5");

    session.push("SETD^f.0.fxtype^2");
    settle(10).await;
    assert_eq!(
        fx.fx_type().current(),
        Some(soundcraft_ui::FxType::Chorus)
    );
}

#[tokio::test(start_paused = true)]
async fn channel_sync_selects_by_ordering() {
    let (mixer, transport) = mock_mixer();
    mixer.connect().await.unwrap();
    let session = transport.session(0).await;

    // the mixer reports its model during the initial dump
    session.push("SETS^model^ui24");
    settle(10).await;

    let sync = mixer.channel_sync();
    // line 1 follows the 24 inputs
    sync.select_channel(soundcraft_ui::ChannelType::Line, 1, "SYNC_ID")
        .unwrap();
    assert_eq!(session.next_outbound().await.unwrap(), "BMSG^SYNC^SYNC_ID^24");

    // the local sync state updates through the outbound echo
    settle(10).await;
    assert_eq!(mixer.store().sync_index("SYNC_ID"), Some(24));

    // a selection from another client resolves to a facade
    let mut selected = sync.selected_channel("SYNC_ID");
    session.push("BMSG^SYNC^SYNC_ID^0");
    settle(10).await;
    let channel = selected.next().await.flatten().expect("no channel resolved");
    let mut names = channel.name();
    assert_eq!(names.next().await, Some("CH 1".to_string()));

    // the master fader is one past the last channel
    sync.select_master("SYNC_ID");
    assert_eq!(session.next_outbound().await.unwrap(), "BMSG^SYNC^SYNC_ID^54");

    // out-of-range channels are rejected
    assert!(sync
        .select_channel(soundcraft_ui::ChannelType::Input, 25, "SYNC_ID")
        .is_err());
}

#[tokio::test(start_paused = true)]
async fn device_info_reports_model_and_firmware() {
    let (mixer, transport) = mock_mixer();
    mixer.connect().await.unwrap();
    let session = transport.session(0).await;

    assert_eq!(mixer.device_info().current_model(), None);

    session.push("SETS^model^ui16");
    session.push("SETS^firmware^3.0.7876");
    settle(10).await;

    assert_eq!(
        mixer.device_info().current_model(),
        Some(soundcraft_ui::MixerModel::Ui16)
    );
    assert_eq!(
        mixer.device_info().firmware().current(),
        Some("3.0.7876".to_string())
    );
    assert_eq!(
        mixer.store().value("model"),
        Some(Value::Text("ui16".to_string()))
    );
}
