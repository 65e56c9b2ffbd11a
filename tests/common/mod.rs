//! Shared test support: a channel-backed mock transport.
//!
//! Each call to `open` produces a scripted session the test can drive:
//! inject inbound lines, read what the client sent, or drop the inbound
//! side to simulate an unexpected close.

// not every test binary uses every helper
#![allow(dead_code)]

use async_trait::async_trait;
use futures_util::Sink;
use soundcraft_ui::{Result, Transport, TransportSession, UiError};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// One accepted mock connection
pub struct MockSession {
    to_client: Mutex<Option<mpsc::UnboundedSender<String>>>,
    from_client: tokio::sync::Mutex<mpsc::UnboundedReceiver<String>>,
}

impl MockSession {
    /// Inject an inbound line (mixer to client)
    pub fn push(&self, line: &str) {
        let guard = self.to_client.lock().unwrap();
        if let Some(tx) = guard.as_ref() {
            tx.send(line.to_string()).ok();
        }
    }

    /// Simulate an unexpected close of the connection
    pub fn close(&self) {
        self.to_client.lock().unwrap().take();
    }

    /// Wait for the next outbound message (client to mixer)
    pub async fn next_outbound(&self) -> Option<String> {
        self.from_client.lock().await.recv().await
    }

    /// Wait for the next outbound `SETD` message, skipping keepalives
    /// and everything else
    pub async fn next_setd(&self) -> Option<String> {
        loop {
            let msg = self.next_outbound().await?;
            if msg.starts_with("SETD^") {
                return Some(msg);
            }
        }
    }

    /// Everything the client has sent so far without waiting
    pub fn drain_outbound(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut rx = self.from_client.try_lock().expect("receiver busy");
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }
}

#[derive(Default)]
struct MockState {
    sessions: Mutex<Vec<Arc<MockSession>>>,
    fail_next: AtomicUsize,
}

/// Transport whose sessions are in-memory channel pairs
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<MockState>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` open attempts fail
    #[allow(dead_code)]
    pub fn fail_next_opens(&self, count: usize) {
        self.state.fail_next.store(count, Ordering::SeqCst);
    }

    /// Number of sessions opened so far
    #[allow(dead_code)]
    pub fn session_count(&self) -> usize {
        self.state.sessions.lock().unwrap().len()
    }

    /// Wait until session `index` exists and return it
    pub async fn session(&self, index: usize) -> Arc<MockSession> {
        loop {
            if let Some(session) = self.state.sessions.lock().unwrap().get(index) {
                return session.clone();
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn open(&self, _target_ip: &str) -> Result<TransportSession> {
        let failures = &self.state.fail_next;
        if failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(UiError::Transport("connection refused".to_string()));
        }

        let (in_tx, in_rx) = mpsc::unbounded_channel::<String>();
        let (out_tx, out_rx) = mpsc::unbounded_channel::<String>();

        let session = Arc::new(MockSession {
            to_client: Mutex::new(Some(in_tx)),
            from_client: tokio::sync::Mutex::new(out_rx),
        });
        self.state.sessions.lock().unwrap().push(session);

        use futures_util::StreamExt;
        Ok(TransportSession {
            outgoing: Box::pin(ChannelSink(out_tx)),
            incoming: Box::pin(UnboundedReceiverStream::new(in_rx).map(Ok::<_, UiError>)),
        })
    }
}

/// Sink writing into an unbounded channel
struct ChannelSink(mpsc::UnboundedSender<String>);

impl Sink<String> for ChannelSink {
    type Error = UiError;

    fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn start_send(self: Pin<&mut Self>, item: String) -> Result<()> {
        self.0.send(item).map_err(|_| UiError::ConnectionClosed)
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// A mixer wired to a fresh mock transport with fast timers
#[allow(dead_code)]
pub fn mock_mixer() -> (soundcraft_ui::SoundcraftUi, MockTransport) {
    let transport = MockTransport::new();
    let options = soundcraft_ui::UiOptions::new("10.0.0.2")
        .with_transport(Arc::new(transport.clone()))
        .with_reconnect_delay(Duration::from_millis(100))
        .with_keepalive_interval(Duration::from_secs(1));
    (soundcraft_ui::SoundcraftUi::new(options), transport)
}
