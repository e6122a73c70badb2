//! Socket abstraction over the LuxWS websocket.
//!
//! The transport engine only needs three operations from the underlying
//! connection: read the next message, write a message, close. Framing and
//! the websocket handshake stay inside this module; everything above it
//! deals in opaque text payloads.
//!
//! Splitting read and write into separate traits lets the receiver task own
//! the read half exclusively while callers share the write half.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::trace;
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Timeout for the websocket handshake.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

/// Subprotocol announced to the controller.
const SUBPROTOCOL: &str = "Lux_WS";

// ============================================================================
// Traits
// ============================================================================

/// Read half of a LuxWS socket.
///
/// `read` returns `Ok(Some(text))` for a non-empty text message,
/// `Ok(None)` for any other frame (empty text, ping, pong, binary), and an
/// error once the connection is closed or broken. After an error the
/// reader must not be used again.
#[async_trait]
pub trait SocketReader: Send {
    /// Reads the next message.
    async fn read(&mut self) -> Result<Option<String>>;
}

/// Write half of a LuxWS socket.
#[async_trait]
pub trait SocketWriter: Send {
    /// Writes a single text message.
    async fn write(&mut self, text: String) -> Result<()>;

    /// Initiates connection shutdown.
    ///
    /// The read half observes the closure as an error.
    async fn close(&mut self) -> Result<()>;
}

// ============================================================================
// Websocket Implementation
// ============================================================================

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// [`SocketReader`] over a tokio-tungstenite stream half.
#[derive(Debug)]
pub(crate) struct WsReader {
    inner: SplitStream<WsStream>,
}

/// [`SocketWriter`] over a tokio-tungstenite sink half.
#[derive(Debug)]
pub(crate) struct WsWriter {
    inner: SplitSink<WsStream, Message>,
}

#[async_trait]
impl SocketReader for WsReader {
    async fn read(&mut self) -> Result<Option<String>> {
        match self.inner.next().await {
            Some(Ok(Message::Text(text))) if !text.is_empty() => Ok(Some(text.to_string())),

            Some(Ok(Message::Close(_))) => {
                trace!("websocket closed by remote");
                Err(Error::ConnectionClosed)
            }

            // Ignore empty text, binary, ping and pong frames
            Some(Ok(_)) => Ok(None),

            Some(Err(e)) => Err(e.into()),

            None => Err(Error::ConnectionClosed),
        }
    }
}

#[async_trait]
impl SocketWriter for WsWriter {
    async fn write(&mut self, text: String) -> Result<()> {
        self.inner.send(Message::Text(text.into())).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.inner.close().await?;
        Ok(())
    }
}

// ============================================================================
// Connecting
// ============================================================================

/// Connects to a LuxWS server.
///
/// The address must have the format `host:port`. The handshake announces
/// the `Lux_WS` subprotocol and is bounded by [`HANDSHAKE_TIMEOUT`].
///
/// # Errors
///
/// - [`Error::Connection`] if the address is invalid
/// - [`Error::Timeout`] if the handshake does not finish in time
/// - [`Error::WebSocket`] if the handshake fails
pub(crate) async fn connect(address: &str) -> Result<(WsReader, WsWriter)> {
    let url = Url::parse(&format!("ws://{address}"))
        .map_err(|e| Error::connection(format!("invalid address {address:?}: {e}")))?;

    let mut request = url
        .as_str()
        .into_client_request()
        .map_err(Error::WebSocket)?;
    request
        .headers_mut()
        .insert("Sec-WebSocket-Protocol", HeaderValue::from_static(SUBPROTOCOL));

    let (stream, _response) = timeout(HANDSHAKE_TIMEOUT, connect_async(request))
        .await
        .map_err(|_| Error::timeout("websocket handshake", HANDSHAKE_TIMEOUT.as_millis() as u64))??;

    trace!(address, "websocket connected");

    let (sink, stream) = stream.split();

    Ok((WsReader { inner: stream }, WsWriter { inner: sink }))
}

// ============================================================================
// Tests
// ============================================================================
