//! Time-based fader transitions.
//!
//! A transition animates one parameter from its current value to a
//! target by issuing discrete writes at a fixed frame rate. At most one
//! transition is live per parameter path: starting a new one invalidates
//! the running one before its next frame, and its completion never fires
//! as finished. Transitions for different paths run independently.

use crate::connection::MixerConnection;
use crate::conversions::{db_to_fader_value, fader_value_to_db};
use crate::easing::Easing;
use crate::protocol::format_setd;
use crate::store::MixerStore;
use crate::util::clamp;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::interval;

/// Fades from or to silence interpolate in dB space down to this floor;
/// the exact target (including -inf) is still sent on the final frame.
const FADE_DB_FLOOR: f64 = -100.0;

/// Tracks the one live transition per parameter path
pub(crate) struct TransitionRegistry {
    active: Mutex<HashMap<String, u64>>,
    next_id: AtomicU64,
}

impl TransitionRegistry {
    pub(crate) fn new() -> Self {
        Self {
            active: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a new transition on a path, superseding any running one
    fn begin(&self, path: &str) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.active
            .lock()
            .expect("mutex poisoned")
            .insert(path.to_string(), id);
        id
    }

    fn is_current(&self, path: &str, id: u64) -> bool {
        self.active.lock().expect("mutex poisoned").get(path) == Some(&id)
    }

    /// Drop the registration if it still belongs to `id`
    fn end(&self, path: &str, id: u64) {
        let mut active = self.active.lock().expect("mutex poisoned");
        if active.get(path) == Some(&id) {
            active.remove(path);
        }
    }
}

/// Handle to one in-flight fader transition.
///
/// The transition runs on its own task; dropping the handle does not
/// stop it. Await [`finished`](TransitionHandle::finished) for the
/// completion signal or call [`cancel`](TransitionHandle::cancel) to
/// stop future frames.
pub struct TransitionHandle {
    path: String,
    id: u64,
    store: Arc<MixerStore>,
    done: oneshot::Receiver<()>,
}

impl TransitionHandle {
    /// Parameter path this transition animates
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Resolves after the final frame was issued. Returns `false` when
    /// the transition was superseded or cancelled before completing.
    pub async fn finished(self) -> bool {
        self.done.await.is_ok()
    }

    /// Stop the transition before its next frame. Behaves exactly like
    /// being superseded: no completion fires.
    pub fn cancel(&self) {
        self.store.transitions().end(&self.path, self.id);
    }
}

/// How the intermediate values of a fade are computed
enum FadePlan {
    /// Interpolate linearly between two linear values
    Linear { from: f64, to: f64 },
    /// Interpolate in dB space, converting each frame to linear just
    /// before transmission. The exact linear target is sent on the
    /// final frame.
    Db {
        from_db: f64,
        to_db: f64,
        final_linear: f64,
    },
}

impl FadePlan {
    fn frame_value(&self, t: f64, last: bool) -> f64 {
        match *self {
            FadePlan::Linear { from, to } => from + (to - from) * t,
            FadePlan::Db {
                from_db,
                to_db,
                final_linear,
            } => {
                if last {
                    final_linear
                } else {
                    db_to_fader_value(from_db + (to_db - from_db) * t)
                }
            }
        }
    }
}

/// Start a fade to a linear target value (between 0 and 1)
pub(crate) fn fade_to(
    conn: Arc<MixerConnection>,
    store: Arc<MixerStore>,
    path: String,
    target: f64,
    fade_time_ms: u64,
    easing: Easing,
    fps: Option<u32>,
) -> TransitionHandle {
    let current = store.num(&path).unwrap_or(0.0);
    let target = clamp(target, 0.0, 1.0);
    let plan = FadePlan::Linear {
        from: current,
        to: target,
    };
    start(conn, store, path, plan, fade_time_ms, easing, fps)
}

/// Start a fade to a dB target value.
///
/// Interpolation happens in dB space; each intermediate sample is
/// converted to linear immediately before transmission. This ordering
/// determines the perceived fade shape and must not be reordered.
pub(crate) fn fade_to_db(
    conn: Arc<MixerConnection>,
    store: Arc<MixerStore>,
    path: String,
    target_db: f64,
    fade_time_ms: u64,
    easing: Easing,
    fps: Option<u32>,
) -> TransitionHandle {
    let current = store.num(&path).unwrap_or(0.0);
    let target_db = target_db.min(crate::conversions::FADER_MAX_DB);
    let plan = FadePlan::Db {
        from_db: fader_value_to_db(current).max(FADE_DB_FLOOR),
        to_db: target_db.max(FADE_DB_FLOOR),
        final_linear: db_to_fader_value(target_db),
    };
    start(conn, store, path, plan, fade_time_ms, easing, fps)
}

fn start(
    conn: Arc<MixerConnection>,
    store: Arc<MixerStore>,
    path: String,
    plan: FadePlan,
    fade_time_ms: u64,
    easing: Easing,
    fps: Option<u32>,
) -> TransitionHandle {
    let fps = fps.unwrap_or_else(|| conn.options().default_fps).max(1);
    let frames = ((fade_time_ms as f64 * fps as f64 / 1000.0).round() as u64).max(1);
    let period = Duration::from_secs_f64(1.0 / fps as f64);

    let id = store.transitions().begin(&path);
    let (done_tx, done_rx) = oneshot::channel();

    let handle = TransitionHandle {
        path: path.clone(),
        id,
        store: store.clone(),
        done: done_rx,
    };

    tokio::spawn(async move {
        let mut ticker = interval(period);
        // the first tick of an interval completes immediately
        ticker.tick().await;

        for i in 1..=frames {
            ticker.tick().await;
            if !store.transitions().is_current(&path, id) {
                // superseded or cancelled; no completion fires
                return;
            }
            let t = easing.apply(i as f64 / frames as f64);
            let value = plan.frame_value(t, i == frames);
            conn.send_message(format_setd(&path, value));
        }

        store.transitions().end(&path, id);
        let _ = done_tx.send(());
    });

    handle
}
