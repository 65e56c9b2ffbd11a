//! Connection management: status state machine, auto-reconnect and
//! keepalive.
//!
//! A supervisor task owns the transport. While a session is open it
//! pumps outbound commands into the socket, fans inbound frames out to
//! subscribers and sends periodic keepalives. On an unexpected error or
//! close it emits an `Error` status and retries after a fixed delay,
//! forever, unless an explicit disconnect was requested.

use crate::error::{Result, UiError};
use crate::protocol::KEEPALIVE_MESSAGE;
use crate::transport::{Transport, TransportSession, WsTransport};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tokio_stream::wrappers::BroadcastStream;

/// Capacity of the raw message log channels
const LOG_CHANNEL_CAPACITY: usize = 256;

/// Pause between the disconnect and connect halves of a reconnect
const RECONNECT_PAUSE: Duration = Duration::from_secs(1);

/// Connection status of the mixer socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// Transport open in progress
    Opening,
    /// Connected
    Open,
    /// Explicit close in progress
    Closing,
    /// Not connected, no reconnect pending
    Closed,
    /// Transport failed or closed unexpectedly
    Error,
    /// Waiting for the next automatic reconnect attempt
    Reconnecting,
}

/// Status change event.
///
/// `Error` carries an opaque description of the transport failure; it is
/// meant for logs and diagnostics, not for matching.
#[derive(Debug, Clone)]
pub enum ConnectionEvent {
    Opening,
    Open,
    Closing,
    Closed,
    /// Transport failure with an opaque payload
    Error(String),
    Reconnecting,
}

impl ConnectionEvent {
    /// The status this event transitions to
    pub fn status(&self) -> ConnectionStatus {
        match self {
            ConnectionEvent::Opening => ConnectionStatus::Opening,
            ConnectionEvent::Open => ConnectionStatus::Open,
            ConnectionEvent::Closing => ConnectionStatus::Closing,
            ConnectionEvent::Closed => ConnectionStatus::Closed,
            ConnectionEvent::Error(_) => ConnectionStatus::Error,
            ConnectionEvent::Reconnecting => ConnectionStatus::Reconnecting,
        }
    }
}

/// Connection settings, immutable after construction
#[derive(Clone)]
pub struct UiOptions {
    /// IP address of the mixer
    pub target_ip: String,
    /// Transport implementation, [`WsTransport`] by default
    pub transport: Arc<dyn Transport>,
    /// Delay before an automatic reconnect attempt (default 2 s)
    pub reconnect_delay: Duration,
    /// Period of the keepalive messages while open (default 1 s)
    pub keepalive_interval: Duration,
    /// Default frame rate for fader transitions (default 25)
    pub default_fps: u32,
}

impl UiOptions {
    /// Options for a mixer at the given IP address, with defaults for
    /// everything else
    pub fn new(target_ip: impl Into<String>) -> Self {
        Self {
            target_ip: target_ip.into(),
            transport: Arc::new(WsTransport),
            reconnect_delay: Duration::from_secs(2),
            keepalive_interval: Duration::from_secs(1),
            default_fps: 25,
        }
    }

    /// Use a custom transport (monitored or mock)
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Set the automatic reconnect delay
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Set the keepalive period
    pub fn with_keepalive_interval(mut self, interval: Duration) -> Self {
        self.keepalive_interval = interval;
        self
    }

    /// Set the default transition frame rate
    pub fn with_default_fps(mut self, fps: u32) -> Self {
        self.default_fps = fps.max(1);
        self
    }
}

impl std::fmt::Debug for UiOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiOptions")
            .field("target_ip", &self.target_ip)
            .field("reconnect_delay", &self.reconnect_delay)
            .field("keepalive_interval", &self.keepalive_interval)
            .field("default_fps", &self.default_fps)
            .finish_non_exhaustive()
    }
}

struct ConnectionShared {
    options: UiOptions,
    status_tx: watch::Sender<ConnectionStatus>,
    event_tx: broadcast::Sender<ConnectionEvent>,
    inbound_tx: broadcast::Sender<String>,
    outbound_tx: broadcast::Sender<String>,
    /// Sender into the current session's write pump, present while Open
    session_tx: std::sync::Mutex<Option<mpsc::UnboundedSender<String>>>,
    /// Explicit-close signal; suppresses auto-reconnect while `true`
    force_close: watch::Sender<bool>,
}

impl ConnectionShared {
    fn transition(&self, event: ConnectionEvent) {
        let status = event.status();
        tracing::debug!(?status, "connection status change");
        self.status_tx.send_replace(status);
        let _ = self.event_tx.send(event);
    }
}

/// Manages the socket connection to the mixer.
///
/// Owns the transport lifecycle and exposes the connection status, the
/// raw inbound/outbound message logs and [`send_message`].
///
/// [`send_message`]: MixerConnection::send_message
pub struct MixerConnection {
    shared: Arc<ConnectionShared>,
    supervisor: Mutex<Option<JoinHandle<()>>>,
}

impl MixerConnection {
    /// Create a connection manager. No I/O happens until
    /// [`connect`](MixerConnection::connect) is called.
    pub fn new(options: UiOptions) -> Self {
        let (status_tx, _) = watch::channel(ConnectionStatus::Closed);
        let (event_tx, _) = broadcast::channel(LOG_CHANNEL_CAPACITY);
        let (inbound_tx, _) = broadcast::channel(LOG_CHANNEL_CAPACITY);
        let (outbound_tx, _) = broadcast::channel(LOG_CHANNEL_CAPACITY);
        let (force_close, _) = watch::channel(false);

        Self {
            shared: Arc::new(ConnectionShared {
                options,
                status_tx,
                event_tx,
                inbound_tx,
                outbound_tx,
                session_tx: std::sync::Mutex::new(None),
                force_close,
            }),
            supervisor: Mutex::new(None),
        }
    }

    /// The connection settings
    pub fn options(&self) -> &UiOptions {
        &self.shared.options
    }

    /// Current connection status
    pub fn status(&self) -> ConnectionStatus {
        *self.shared.status_tx.borrow()
    }

    /// Subscribe to connection status events
    pub fn status_events(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.shared.event_tx.subscribe()
    }

    /// Watch the current connection status
    pub fn status_watch(&self) -> watch::Receiver<ConnectionStatus> {
        self.shared.status_tx.subscribe()
    }

    /// Subscribe to raw inbound messages (mixer to client)
    pub fn inbound(&self) -> broadcast::Receiver<String> {
        self.shared.inbound_tx.subscribe()
    }

    /// Subscribe to raw outbound messages (client to mixer)
    pub fn outbound(&self) -> broadcast::Receiver<String> {
        self.shared.outbound_tx.subscribe()
    }

    /// Combined stream of inbound and outbound messages, in arrival
    /// order, for logging collaborators
    pub fn all_messages(&self) -> impl futures_util::Stream<Item = String> + Send + Unpin {
        let inbound = BroadcastStream::new(self.shared.inbound_tx.subscribe());
        let outbound = BroadcastStream::new(self.shared.outbound_tx.subscribe());
        futures_util::stream::select(inbound, outbound)
            .filter_map(|res| futures_util::future::ready(res.ok()))
    }

    /// Connect to the mixer and retry automatically if the connection is
    /// lost. Resolves once the socket is open.
    pub async fn connect(&self) -> Result<()> {
        {
            let mut supervisor = self.supervisor.lock().await;
            // an explicit disconnect shuts the supervisor down; wait for
            // that to finish before starting a new connection cycle
            if *self.shared.force_close.borrow() {
                if let Some(handle) = supervisor.take() {
                    let _ = handle.await;
                }
            }
            let running = supervisor.as_ref().is_some_and(|h| !h.is_finished());
            if !running {
                if let Some(handle) = supervisor.take() {
                    let _ = handle.await;
                }
                self.shared.force_close.send_replace(false);
                let shared = self.shared.clone();
                *supervisor = Some(tokio::spawn(supervise(shared)));
            }
        }

        let mut status = self.shared.status_tx.subscribe();
        let status = status
            .wait_for(|s| matches!(s, ConnectionStatus::Open | ConnectionStatus::Closed))
            .await
            .map_err(|_| UiError::ConnectionClosed)?;
        match *status {
            ConnectionStatus::Open => Ok(()),
            _ => Err(UiError::ConnectionClosed),
        }
    }

    /// Disconnect from the mixer. Suppresses any pending or future
    /// automatic reconnect. Resolves once the connection is closed.
    pub async fn disconnect(&self) -> Result<()> {
        let running = {
            let supervisor = self.supervisor.lock().await;
            supervisor.as_ref().is_some_and(|h| !h.is_finished())
        };
        if !running {
            self.shared.transition(ConnectionEvent::Closed);
            return Ok(());
        }

        self.shared.force_close.send_replace(true);
        let mut status = self.shared.status_tx.subscribe();
        status
            .wait_for(|s| *s == ConnectionStatus::Closed)
            .await
            .map_err(|_| UiError::ConnectionClosed)?;
        Ok(())
    }

    /// Reconnect to the mixer: disconnect, then wait one second before
    /// connecting again
    pub async fn reconnect(&self) -> Result<()> {
        self.disconnect().await?;
        sleep(RECONNECT_PAUSE).await;
        self.connect().await
    }

    /// Send a command to the mixer, e.g. `SETD^i.2.mute^1`.
    ///
    /// Delivery happens only while the connection is open. In any other
    /// state the message is dropped and a warning is logged; there is no
    /// send queue.
    pub fn send_message(&self, msg: impl Into<String>) {
        let msg = msg.into();
        if self.status() != ConnectionStatus::Open {
            tracing::warn!(message = %msg, "not connected, dropping outbound message");
            return;
        }
        let session_tx = self.shared.session_tx.lock().expect("mutex poisoned");
        match session_tx.as_ref() {
            Some(tx) if tx.send(msg.clone()).is_ok() => {
                let _ = self.shared.outbound_tx.send(msg);
            }
            _ => {
                tracing::warn!(message = %msg, "session gone, dropping outbound message");
            }
        }
    }
}

impl Drop for MixerConnection {
    fn drop(&mut self) {
        // the supervisor owns all timers; nothing may fire after teardown
        if let Ok(supervisor) = self.supervisor.try_lock() {
            if let Some(handle) = supervisor.as_ref() {
                handle.abort();
            }
        }
    }
}

/// Why an open session ended
enum SessionEnd {
    Explicit,
    Unexpected(String),
}

/// Connection supervisor: one iteration per connection attempt
async fn supervise(shared: Arc<ConnectionShared>) {
    let mut force_close = shared.force_close.subscribe();
    loop {
        if *force_close.borrow() {
            shared.transition(ConnectionEvent::Closed);
            return;
        }

        shared.transition(ConnectionEvent::Opening);
        tracing::info!(target_ip = %shared.options.target_ip, "connecting to mixer");

        let opened = tokio::select! {
            res = shared.options.transport.open(&shared.options.target_ip) => res,
            _ = force_close.wait_for(|v| *v) => {
                shared.transition(ConnectionEvent::Closed);
                return;
            }
        };

        match opened {
            Ok(session) => {
                tracing::info!("mixer connection open");
                shared.transition(ConnectionEvent::Open);
                match run_session(&shared, session, &mut force_close).await {
                    SessionEnd::Explicit => {
                        shared.transition(ConnectionEvent::Closed);
                        return;
                    }
                    SessionEnd::Unexpected(payload) => {
                        tracing::warn!(error = %payload, "mixer connection lost");
                        shared.transition(ConnectionEvent::Error(payload));
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "mixer connection failed");
                shared.transition(ConnectionEvent::Error(e.to_string()));
            }
        }

        shared.transition(ConnectionEvent::Reconnecting);
        tokio::select! {
            _ = sleep(shared.options.reconnect_delay) => {}
            _ = force_close.wait_for(|v| *v) => {
                shared.transition(ConnectionEvent::Closed);
                return;
            }
        }
    }
}

/// Pump one open session until it ends
async fn run_session(
    shared: &ConnectionShared,
    session: TransportSession,
    force_close: &mut watch::Receiver<bool>,
) -> SessionEnd {
    let TransportSession {
        mut outgoing,
        mut incoming,
    } = session;

    let (session_tx, mut session_rx) = mpsc::unbounded_channel::<String>();
    *shared.session_tx.lock().expect("mutex poisoned") = Some(session_tx);

    // first keepalive one period after open, then periodically
    let mut keepalive = interval_at(
        Instant::now() + shared.options.keepalive_interval,
        shared.options.keepalive_interval,
    );
    keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let end = loop {
        tokio::select! {
            _ = async { let _ = force_close.wait_for(|v| *v).await; } => {
                shared.transition(ConnectionEvent::Closing);
                let _ = outgoing.close().await;
                break SessionEnd::Explicit;
            }
            Some(msg) = session_rx.recv() => {
                tracing::debug!(message = %msg, "-> mixer");
                if let Err(e) = outgoing.send(msg).await {
                    break SessionEnd::Unexpected(e.to_string());
                }
            }
            _ = keepalive.tick() => {
                if let Err(e) = outgoing.send(KEEPALIVE_MESSAGE.to_string()).await {
                    break SessionEnd::Unexpected(e.to_string());
                }
                let _ = shared.outbound_tx.send(KEEPALIVE_MESSAGE.to_string());
            }
            frame = incoming.next() => match frame {
                Some(Ok(text)) => {
                    // frames are line-oriented; tolerate bundled lines
                    for line in text.split('\n').filter(|l| !l.trim().is_empty()) {
                        tracing::trace!(message = %line, "<- mixer");
                        let _ = shared.inbound_tx.send(line.to_string());
                    }
                }
                Some(Err(e)) => break SessionEnd::Unexpected(e.to_string()),
                None => break SessionEnd::Unexpected("connection closed by peer".to_string()),
            },
        }
    };

    *shared.session_tx.lock().expect("mutex poisoned") = None;
    end
}
