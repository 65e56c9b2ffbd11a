//! Pluggable transport layer.
//!
//! The connection manager only needs a bidirectional stream of text
//! frames. The default [`WsTransport`] speaks WebSocket via
//! tokio-tungstenite; tests and monitoring wrappers substitute their own
//! implementation through [`UiOptions::with_transport`].
//!
//! [`UiOptions::with_transport`]: crate::UiOptions::with_transport

use crate::error::{Result, UiError};
use async_trait::async_trait;
use futures_util::{future, Sink, SinkExt, Stream, StreamExt, TryStreamExt};
use std::pin::Pin;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Outgoing half of a transport session
pub type TransportSink = Pin<Box<dyn Sink<String, Error = UiError> + Send>>;
/// Incoming half of a transport session
pub type TransportStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// One established transport session
pub struct TransportSession {
    /// Frames from client to mixer
    pub outgoing: TransportSink,
    /// Frames from mixer to client
    pub incoming: TransportStream,
}

/// A factory for transport sessions.
///
/// One session per connection attempt; the connection manager calls
/// [`Transport::open`] again for every reconnect.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a new session to the given target IP
    async fn open(&self, target_ip: &str) -> Result<TransportSession>;
}

/// Default WebSocket transport (`ws://<ip>`)
#[derive(Debug, Default)]
pub struct WsTransport;

#[async_trait]
impl Transport for WsTransport {
    async fn open(&self, target_ip: &str) -> Result<TransportSession> {
        let url = format!("ws://{target_ip}");
        let (ws_stream, _) = connect_async(&url).await?;
        let (write, read) = ws_stream.split();

        let outgoing = write
            .with(|text: String| future::ready(Ok(Message::Text(text))))
            .sink_map_err(UiError::WebSocket);

        let incoming = read.map_err(UiError::WebSocket).try_filter_map(|msg| {
            future::ready(Ok(match msg {
                Message::Text(text) => Some(text),
                _ => None,
            }))
        });

        Ok(TransportSession {
            outgoing: Box::pin(outgoing),
            incoming: Box::pin(incoming),
        })
    }
}
