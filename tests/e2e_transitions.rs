//! E2E tests for fader transitions: frame shape, dB-space fades and
//! same-path pre-emption.

mod common;

use approx::assert_abs_diff_eq;
use common::mock_mixer;
use soundcraft_ui::{fader_value_to_db, Easing, FadeableChannel};
use std::time::Duration;

fn setd_value(msg: &str) -> f64 {
    msg.rsplit('^').next().unwrap().parse().unwrap()
}

#[tokio::test(start_paused = true)]
async fn linear_fade_emits_one_frame_per_tick() {
    let (mixer, transport) = mock_mixer();
    mixer.connect().await.unwrap();
    let session = transport.session(0).await;

    // 1 s at 25 fps from 0.0 to 1.0: exactly 25 strictly increasing
    // writes, the last one exactly at the target
    let channel = mixer.master().input(1);
    let handle = channel.fade_to(1.0, 1000, Easing::Linear, None);
    assert!(handle.finished().await);

    let values: Vec<f64> = session
        .drain_outbound()
        .into_iter()
        .filter(|m| m.starts_with("SETD^i.0.mix^"))
        .map(|m| setd_value(&m))
        .collect();

    assert_eq!(values.len(), 25);
    for pair in values.windows(2) {
        assert!(pair[1] > pair[0], "values not strictly increasing: {values:?}");
    }
    assert_abs_diff_eq!(values[0], 0.04, epsilon = 1e-9);
    assert_abs_diff_eq!(*values.last().unwrap(), 1.0, epsilon = 1e-9);
}

#[tokio::test(start_paused = true)]
async fn fade_starts_from_the_current_value() {
    let (mixer, transport) = mock_mixer();
    mixer.connect().await.unwrap();
    let session = transport.session(0).await;

    session.push("SETD^i.0.mix^0.5");
    tokio::time::sleep(Duration::from_millis(10)).await;

    let channel = mixer.master().input(1);
    assert!(channel.fade_to(1.0, 200, Easing::Linear, None).finished().await);

    let values: Vec<f64> = session
        .drain_outbound()
        .into_iter()
        .filter(|m| m.starts_with("SETD^i.0.mix^"))
        .map(|m| setd_value(&m))
        .collect();
    // 200 ms at 25 fps: 5 frames, starting above 0.5
    assert_eq!(values.len(), 5);
    assert!(values[0] > 0.5);
    assert_abs_diff_eq!(*values.last().unwrap(), 1.0, epsilon = 1e-9);
}

#[tokio::test(start_paused = true)]
async fn very_short_fades_emit_a_single_frame() {
    let (mixer, transport) = mock_mixer();
    mixer.connect().await.unwrap();
    let session = transport.session(0).await;

    let channel = mixer.master().input(2);
    assert!(channel.fade_to(0.8, 1, Easing::Linear, None).finished().await);

    let values: Vec<f64> = session
        .drain_outbound()
        .into_iter()
        .filter(|m| m.starts_with("SETD^i.1.mix^"))
        .map(|m| setd_value(&m))
        .collect();
    assert_eq!(values, vec![0.8]);
}

#[tokio::test(start_paused = true)]
async fn db_fades_interpolate_in_db_space() {
    let (mixer, transport) = mock_mixer();
    mixer.connect().await.unwrap();
    let session = transport.session(0).await;

    // start at 0 dB, fade to -40 dB
    let start_linear = soundcraft_ui::db_to_fader_value(0.0);
    session.push(&format!("SETD^i.0.mix^{start_linear}"));
    tokio::time::sleep(Duration::from_millis(10)).await;

    let channel = mixer.master().input(1);
    assert!(channel.fade_to_db(-40.0, 400, Easing::Linear, None).finished().await);

    let values: Vec<f64> = session
        .drain_outbound()
        .into_iter()
        .filter(|m| m.starts_with("SETD^i.0.mix^"))
        .map(|m| setd_value(&m))
        .collect();
    assert_eq!(values.len(), 10);

    // equal steps in dB space, not in linear space: the dB distance
    // between consecutive frames is constant
    // tolerance covers the three-decimal wire rounding of small linear
    // values
    let dbs: Vec<f64> = values.iter().map(|v| fader_value_to_db(*v)).collect();
    let first_step = dbs[1] - dbs[0];
    for pair in dbs.windows(2) {
        assert_abs_diff_eq!(pair[1] - pair[0], first_step, epsilon = 0.25);
    }
    assert_abs_diff_eq!(*dbs.last().unwrap(), -40.0, epsilon = 0.2);
}

#[tokio::test(start_paused = true)]
async fn fade_to_silence_lands_on_exactly_zero() {
    let (mixer, transport) = mock_mixer();
    mixer.connect().await.unwrap();
    let session = transport.session(0).await;

    session.push("SETD^i.0.mix^1");
    tokio::time::sleep(Duration::from_millis(10)).await;

    let channel = mixer.master().input(1);
    assert!(channel
        .fade_to_db(f64::NEG_INFINITY, 200, Easing::Linear, None)
        .finished()
        .await);

    let values: Vec<f64> = session
        .drain_outbound()
        .into_iter()
        .filter(|m| m.starts_with("SETD^i.0.mix^"))
        .map(|m| setd_value(&m))
        .collect();
    assert_eq!(*values.last().unwrap(), 0.0);
}

#[tokio::test(start_paused = true)]
async fn starting_a_second_fade_preempts_the_first() {
    let (mixer, transport) = mock_mixer();
    mixer.connect().await.unwrap();
    let session = transport.session(0).await;

    let channel = mixer.master().input(1);

    // a slow rising fade...
    let first = channel.fade_to(1.0, 10_000, Easing::Linear, None);
    tokio::time::sleep(Duration::from_millis(500)).await;

    // ...interrupted by a fade back down
    let second = channel.fade_to(0.0, 200, Easing::Linear, None);

    // the superseded transition never completes
    assert!(!first.finished().await);
    assert!(second.finished().await);

    let values: Vec<f64> = session
        .drain_outbound()
        .into_iter()
        .filter(|m| m.starts_with("SETD^i.0.mix^"))
        .map(|m| setd_value(&m))
        .collect();

    // once the second fade has taken over, no write from the first may
    // appear: values decrease monotonically to 0 after the peak
    let peak_at = values
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
        .map(|(i, _)| i)
        .unwrap();
    for pair in values[peak_at..].windows(2) {
        assert!(pair[1] < pair[0], "rising write after pre-emption: {values:?}");
    }
    assert_eq!(*values.last().unwrap(), 0.0);
}

#[tokio::test(start_paused = true)]
async fn cancel_behaves_like_preemption() {
    let (mixer, transport) = mock_mixer();
    mixer.connect().await.unwrap();
    let session = transport.session(0).await;

    let channel = mixer.master().input(1);
    let handle = channel.fade_to(1.0, 10_000, Easing::Linear, None);
    tokio::time::sleep(Duration::from_millis(500)).await;

    handle.cancel();
    let frames_at_cancel = session
        .drain_outbound()
        .iter()
        .filter(|m| m.starts_with("SETD^i.0.mix^"))
        .count();
    assert!(frames_at_cancel > 0);

    assert!(!handle.finished().await);

    // no further frames after the cancel
    tokio::time::sleep(Duration::from_secs(2)).await;
    let later: Vec<String> = session
        .drain_outbound()
        .into_iter()
        .filter(|m| m.starts_with("SETD^i.0.mix^"))
        .collect();
    assert!(later.is_empty(), "frames after cancel: {later:?}");
}

#[tokio::test(start_paused = true)]
async fn fades_on_different_paths_run_independently() {
    let (mixer, transport) = mock_mixer();
    mixer.connect().await.unwrap();
    let session = transport.session(0).await;

    let one = mixer.master().input(1);
    let two = mixer.master().input(2);
    let a = one.fade_to(1.0, 200, Easing::Linear, None);
    let b = two.fade_to(1.0, 200, Easing::Linear, None);
    assert!(a.finished().await);
    assert!(b.finished().await);

    let sent = session.drain_outbound();
    let count = |path: &str| {
        sent.iter()
            .filter(|m| m.starts_with(&format!("SETD^{path}^")))
            .count()
    };
    assert_eq!(count("i.0.mix"), 5);
    assert_eq!(count("i.1.mix"), 5);
}

#[tokio::test(start_paused = true)]
async fn eased_fades_keep_the_endpoints() {
    let (mixer, transport) = mock_mixer();
    mixer.connect().await.unwrap();
    let session = transport.session(0).await;

    let channel = mixer.master().input(1);
    for easing in [Easing::EaseIn, Easing::EaseOut, Easing::EaseInOut] {
        assert!(channel.fade_to(1.0, 400, easing, Some(10)).finished().await);
        let values: Vec<f64> = session
            .drain_outbound()
            .into_iter()
            .filter(|m| m.starts_with("SETD^i.0.mix^"))
            .map(|m| setd_value(&m))
            .collect();
        assert_eq!(values.len(), 4, "{easing:?}");
        assert_abs_diff_eq!(*values.last().unwrap(), 1.0, epsilon = 1e-9);

        // reset for the next round and let the echo settle
        assert!(channel.fade_to(0.0, 1, Easing::Linear, None).finished().await);
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.drain_outbound();
    }
}
