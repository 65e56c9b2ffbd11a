//! State store: turns the raw message stream into a queryable,
//! subscribable parameter table.
//!
//! The store consumes the union of inbound and outbound messages, so a
//! local write is reflected immediately (optimistically) and later
//! confirmed by the mixer's echo. Values are kept per parameter path
//! with last-write-wins semantics; every path has its own watch channel,
//! which gives late subscribers the current value before any future
//! change. A notification is suppressed when the incoming value equals
//! the stored one.

use crate::connection::MixerConnection;
use crate::object_store::ObjectStore;
use crate::protocol::{self, MixerMessage};
use crate::transition::TransitionRegistry;
use crate::util::parse_numeric;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_stream::wrappers::WatchStream;

/// Quiet window after which the initial state dump counts as settled
const SETTLE_QUIET: Duration = Duration::from_millis(25);

/// Upper bound on the settle wait, even under a dense state dump
const SETTLE_TIMEOUT: Duration = Duration::from_millis(250);

/// A parameter value after lexical coercion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// The raw text matched an integer or float literal
    Num(f64),
    /// Anything else stays text
    Text(String),
}

impl Value {
    /// Coerce a raw wire string
    pub fn coerce(raw: &str) -> Self {
        match parse_numeric(raw) {
            Some(n) => Value::Num(n),
            None => Value::Text(raw.to_string()),
        }
    }

    /// Numeric value, if this is one
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    /// Text value, if this is one
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Num(_) => None,
            Value::Text(s) => Some(s),
        }
    }
}

type ValueSlot = watch::Sender<Option<Value>>;

struct StoreInner {
    state: Mutex<HashMap<String, ValueSlot>>,
    sync_state: Mutex<HashMap<String, watch::Sender<Option<i64>>>>,
    /// Bumped on every inbound message; drives settle detection
    inbound_seen: watch::Sender<u64>,
    objects: ObjectStore,
    transitions: TransitionRegistry,
}

impl StoreInner {
    fn slot(&self, path: &str) -> ValueSlot {
        let mut state = self.state.lock().expect("mutex poisoned");
        state
            .entry(path.to_string())
            .or_insert_with(|| watch::channel(None).0)
            .clone()
    }

    fn sync_slot(&self, sync_id: &str) -> watch::Sender<Option<i64>> {
        let mut sync_state = self.sync_state.lock().expect("mutex poisoned");
        sync_state
            .entry(sync_id.to_string())
            .or_insert_with(|| watch::channel(None).0)
            .clone()
    }

    /// Last-write-wins with distinct-change filtering
    fn apply_set(&self, path: &str, raw: &str) {
        let value = Value::coerce(raw);
        self.slot(path).send_if_modified(|current| {
            if current.as_ref() == Some(&value) {
                false
            } else {
                *current = Some(value);
                true
            }
        });
    }

    fn apply_sync(&self, sync_id: &str, index: i64) {
        self.sync_slot(sync_id).send_if_modified(|current| {
            if *current == Some(index) {
                false
            } else {
                *current = Some(index);
                true
            }
        });
    }

    fn handle_message(&self, raw: &str) {
        match protocol::parse_message(raw) {
            Some(MixerMessage::Set { path, value, .. }) => self.apply_set(&path, &value),
            Some(MixerMessage::Sync { sync_id, index }) => self.apply_sync(&sync_id, index),
            None => {}
        }
    }
}

/// The synchronized mixer state.
///
/// Created once per [`SoundcraftUi`](crate::SoundcraftUi) instance,
/// before the first connect, so that no message is missed. Entries
/// survive reconnects; the table lives as long as the store.
pub struct MixerStore {
    inner: Arc<StoreInner>,
    task: JoinHandle<()>,
}

impl MixerStore {
    /// Create a store fed by the given connection's message streams.
    /// Must be called within a Tokio runtime.
    pub fn new(conn: &MixerConnection) -> Self {
        let inner = Arc::new(StoreInner {
            state: Mutex::new(HashMap::new()),
            sync_state: Mutex::new(HashMap::new()),
            inbound_seen: watch::channel(0u64).0,
            objects: ObjectStore::new(),
            transitions: TransitionRegistry::new(),
        });

        let task = tokio::spawn(pump(
            inner.clone(),
            conn.inbound(),
            conn.outbound(),
        ));

        Self { inner, task }
    }

    /// Subscribe to one parameter path.
    ///
    /// The entry is created lazily when unknown; the receiver's current
    /// value is `None` until the first observation.
    pub fn subscribe(&self, path: &str) -> watch::Receiver<Option<Value>> {
        self.inner.slot(path).subscribe()
    }

    /// Current value of a path, if any has been observed
    pub fn value(&self, path: &str) -> Option<Value> {
        self.inner.slot(path).borrow().clone()
    }

    /// Current numeric value of a path
    pub fn num(&self, path: &str) -> Option<f64> {
        self.value(path).and_then(|v| v.as_num())
    }

    /// Replay-latest stream over a path, with a converter deciding the
    /// item type (missing values may map to defaults)
    pub fn param_stream<T>(
        &self,
        path: &str,
        convert: impl Fn(Option<&Value>) -> Option<T> + Send + Sync + 'static,
    ) -> ParamStream<T> {
        ParamStream::new(self.subscribe(path), convert)
    }

    /// Numeric stream over a path; missing and textual values are
    /// filtered out
    pub fn num_stream(&self, path: &str) -> ParamStream<f64> {
        self.param_stream(path, |v| v.and_then(Value::as_num))
    }

    /// Currently selected channel index of a sync group
    pub fn sync_index(&self, sync_id: &str) -> Option<i64> {
        *self.inner.sync_slot(sync_id).borrow()
    }

    /// Watch the selected channel index of a sync group
    pub fn sync_subscribe(&self, sync_id: &str) -> watch::Receiver<Option<i64>> {
        self.inner.sync_slot(sync_id).subscribe()
    }

    /// Resolves when the initial state dump has likely been received:
    /// no inbound message for 25 ms, or 250 ms at the latest
    pub async fn wait_for_initial_state(&self) {
        let mut seen = self.inner.inbound_seen.subscribe();
        seen.mark_unchanged();
        let settle = async {
            loop {
                match timeout(SETTLE_QUIET, seen.changed()).await {
                    // quiet window elapsed without a message
                    Err(_) => break,
                    Ok(Ok(())) => continue,
                    // connection torn down, nothing more will arrive
                    Ok(Err(_)) => break,
                }
            }
        };
        let _ = timeout(SETTLE_TIMEOUT, settle).await;
    }

    pub(crate) fn objects(&self) -> &ObjectStore {
        &self.inner.objects
    }

    pub(crate) fn transitions(&self) -> &TransitionRegistry {
        &self.inner.transitions
    }
}

impl Drop for MixerStore {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Feed the state table from both message directions.
/// Inbound has priority so that echoes confirm in delivery order.
async fn pump(
    inner: Arc<StoreInner>,
    mut inbound: broadcast::Receiver<String>,
    mut outbound: broadcast::Receiver<String>,
) {
    loop {
        tokio::select! {
            biased;
            msg = inbound.recv() => match msg {
                Ok(raw) => {
                    inner.inbound_seen.send_modify(|n| *n = n.wrapping_add(1));
                    inner.handle_message(&raw);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "state store lagged behind inbound messages");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            msg = outbound.recv() => match msg {
                Ok(raw) => inner.handle_message(&raw),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "state store lagged behind outbound messages");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}

/// Replay-latest stream over one parameter path.
///
/// The first poll yields the current value (when one is known), every
/// later item is a distinct change. The converter decides the item type
/// and may substitute defaults for missing values.
pub struct ParamStream<T> {
    rx: watch::Receiver<Option<Value>>,
    inner: WatchStream<Option<Value>>,
    convert: Box<dyn Fn(Option<&Value>) -> Option<T> + Send + Sync>,
}

impl<T> ParamStream<T> {
    fn new(
        rx: watch::Receiver<Option<Value>>,
        convert: impl Fn(Option<&Value>) -> Option<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: WatchStream::new(rx.clone()),
            rx,
            convert: Box::new(convert),
        }
    }

    /// Current value without waiting
    pub fn current(&self) -> Option<T> {
        (self.convert)(self.rx.borrow().as_ref())
    }

    /// Wait for the next item (the current value on first call)
    pub async fn next_value(&mut self) -> Option<T> {
        use futures_util::StreamExt;
        self.next().await
    }

    /// Derive a stream with a different item type
    pub fn map_items<U>(self, f: impl Fn(T) -> U + Send + Sync + 'static) -> ParamStream<U>
    where
        T: 'static,
    {
        let convert = self.convert;
        ParamStream {
            rx: self.rx,
            inner: self.inner,
            convert: Box::new(move |v| convert(v).map(&f)),
        }
    }
}

impl<T> futures_util::Stream for ParamStream<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(value)) => {
                    if let Some(item) = (this.convert)(value.as_ref()) {
                        return Poll::Ready(Some(item));
                    }
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
