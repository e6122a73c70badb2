//! LuxWS connection and receiver loop.
//!
//! This module implements the request/response engine on top of a
//! [`SocketReader`]/[`SocketWriter`] pair. The protocol is half-duplex:
//! one command is answered by the next matching text message, and the
//! controller interleaves unsolicited keepalive traffic that has to be
//! filtered out by the response handler.
//!
//! # Receiver Loop
//!
//! The connection spawns exactly one tokio task that reads messages for the
//! lifetime of the session. Incoming text messages are handed to the
//! currently installed response handler; while no round trip is in flight
//! they are dropped. There is no queue.
//!
//! # Session States
//!
//! | State | Meaning |
//! |-------|---------|
//! | `Idle` | No round trip in flight |
//! | `AwaitingResponse` | A handler is installed and waiting |
//! | `Closing` | [`Transport::close`] is shutting the socket down |
//! | `Closed` | The session is terminal |

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::transport::socket::{self, SocketReader, SocketWriter};

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for a single round trip.
const DEFAULT_ROUND_TRIP_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Types
// ============================================================================

/// Type-erased response handler installed for one round trip.
///
/// Invoked by the receiver task for every incoming text message while
/// installed. Completion is signalled through a oneshot channel captured by
/// the closure; once completed further invocations are no-ops.
type ActiveHandler = Box<dyn FnMut(&str) + Send>;

/// Why the session became terminal.
///
/// Kept separate from [`Error`] so it can be handed to every pending and
/// future caller.
#[derive(Debug, Clone)]
enum Terminal {
    /// The session was closed locally or by the remote end.
    Closed,
    /// The receiver loop failed with an error.
    Failed(String),
}

impl Terminal {
    fn to_error(&self) -> Error {
        match self {
            Self::Closed => Error::ConnectionClosed,
            Self::Failed(message) => Error::connection(message.clone()),
        }
    }

    fn from_read_error(err: &Error) -> Self {
        match err {
            Error::ConnectionClosed => Self::Closed,
            other => Self::Failed(other.to_string()),
        }
    }
}

/// Session state machine.
///
/// All transitions happen under the session mutex.
enum SessionState {
    Idle,
    AwaitingResponse(ActiveHandler),
    Closing,
    Closed,
}

impl SessionState {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingResponse(_) => "awaiting-response",
            Self::Closing => "closing",
            Self::Closed => "closed",
        }
    }
}

/// Shared session state between callers and the receiver task.
struct Session {
    state: SessionState,
    terminal: Option<Terminal>,
}

// ============================================================================
// Handler Guard
// ============================================================================

/// Uninstalls the active handler on every exit path.
///
/// Dropping the round-trip future (caller cancellation) must not leave the
/// session busy, so the reset lives in a guard rather than at the end of
/// `round_trip`. A concurrent `close()` replaces the handler with `Closing`;
/// the guard leaves that transition alone.
struct HandlerGuard<'a> {
    session: &'a Mutex<Session>,
}

impl Drop for HandlerGuard<'_> {
    fn drop(&mut self) {
        let mut session = self.session.lock();
        if matches!(session.state, SessionState::AwaitingResponse(_)) {
            session.state = SessionState::Idle;
        }
    }
}

// ============================================================================
// Transport
// ============================================================================

/// A LuxWS protocol session over a websocket.
///
/// Owns the socket exclusively. At most one round trip is in flight at any
/// instant; a second concurrent [`Transport::round_trip`] call fails with
/// [`Error::Busy`] without blocking.
///
/// # Lifecycle
///
/// Call [`Transport::close`] when done; it shuts down the socket and waits
/// for the receiver task to terminate. If the owner forgets, dropping the
/// transport aborts the receiver task and releases the socket as a
/// last-resort leak guard.
pub struct Transport {
    /// Session state (shared with the receiver task).
    session: Arc<Mutex<Session>>,

    /// Write half of the socket.
    writer: tokio::sync::Mutex<Box<dyn SocketWriter>>,

    /// Cancelled once the receiver task has terminated.
    recv_done: CancellationToken,

    /// Receiver task handle, used by the drop backstop.
    recv_task: JoinHandle<()>,
}

impl Transport {
    /// Connects to a LuxWS server.
    ///
    /// The address must have the format `host:port`.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] if the address is invalid
    /// - [`Error::Timeout`] if the handshake does not finish in time
    /// - [`Error::WebSocket`] if the handshake fails
    pub async fn dial(address: &str) -> Result<Self> {
        let (reader, writer) = socket::connect(address).await?;
        Ok(Self::new(reader, writer))
    }

    /// Creates a transport over an established socket.
    ///
    /// Spawns the receiver task internally.
    pub(crate) fn new<R, W>(reader: R, writer: W) -> Self
    where
        R: SocketReader + 'static,
        W: SocketWriter + 'static,
    {
        let session = Arc::new(Mutex::new(Session {
            state: SessionState::Idle,
            terminal: None,
        }));
        let recv_done = CancellationToken::new();

        let recv_task = tokio::spawn(Self::receiver_loop(
            reader,
            Arc::clone(&session),
            recv_done.clone(),
        ));

        Self {
            session,
            writer: tokio::sync::Mutex::new(Box::new(writer)),
            recv_done,
            recv_task,
        }
    }

    /// Sends a request and waits for the handler to accept a response.
    ///
    /// Uses the default timeout of 30 seconds. See
    /// [`Transport::round_trip_with_timeout`].
    pub async fn round_trip<T, F>(&self, request: &str, handler: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnMut(&str) -> Result<Option<T>> + Send + 'static,
    {
        self.round_trip_with_timeout(request, DEFAULT_ROUND_TRIP_TIMEOUT, handler)
            .await
    }

    /// Sends a request as a single message and waits for a response.
    ///
    /// Every incoming text message is passed to `handler` while the round
    /// trip is in flight:
    ///
    /// - `Ok(None)` means "not my response, keep waiting"
    /// - `Ok(Some(value))` completes the round trip with `value`
    /// - `Err(e)` completes the round trip with `e`
    ///
    /// The timeout bounds the socket write and the wait for a response.
    /// Dropping the returned future uninstalls the handler, so a later
    /// round trip is not wrongly rejected as busy.
    ///
    /// # Errors
    ///
    /// - [`Error::Busy`] if another round trip is in flight
    /// - [`Error::ConnectionClosed`] if the session is closed
    /// - [`Error::Connection`] if the receiver loop failed
    /// - [`Error::Timeout`] if no response arrives in time
    pub async fn round_trip_with_timeout<T, F>(
        &self,
        request: &str,
        timeout: Duration,
        mut handler: F,
    ) -> Result<T>
    where
        T: Send + 'static,
        F: FnMut(&str) -> Result<Option<T>> + Send + 'static,
    {
        let deadline = Instant::now() + timeout;
        let (result_tx, mut result_rx) = oneshot::channel::<Result<T>>();

        // Completion is one-shot; the ignore sentinel puts the sender back.
        let mut slot = Some(result_tx);
        let installed: ActiveHandler = Box::new(move |payload: &str| {
            let Some(sender) = slot.take() else {
                return;
            };

            match handler(payload) {
                Ok(None) => {
                    trace!("response handler ignored message");
                    slot = Some(sender);
                }
                Ok(Some(value)) => {
                    let _ = sender.send(Ok(value));
                }
                Err(e) => {
                    let _ = sender.send(Err(e));
                }
            }
        });

        {
            let mut session = self.session.lock();

            if let Some(terminal) = &session.terminal {
                return Err(terminal.to_error());
            }

            match session.state {
                SessionState::Idle => session.state = SessionState::AwaitingResponse(installed),
                SessionState::AwaitingResponse(_) => return Err(Error::Busy),
                SessionState::Closing | SessionState::Closed => {
                    return Err(Error::ConnectionClosed);
                }
            }
        }

        let _guard = HandlerGuard {
            session: &self.session,
        };

        trace!(request, "sending message");

        // The round-trip deadline doubles as the socket write deadline.
        let write = async {
            let mut writer = self.writer.lock().await;
            writer.write(request.to_string()).await
        };
        match tokio::time::timeout_at(deadline, write).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(Error::timeout("message write", timeout.as_millis() as u64)),
        }

        tokio::select! {
            biased;

            outcome = &mut result_rx => match outcome {
                Ok(result) => result,
                // close() replaced the handler and dropped the sender.
                Err(_) => Err(self.terminal_error()),
            },

            () = self.recv_done.cancelled() => Err(self.terminal_error()),

            () = tokio::time::sleep_until(deadline) => {
                Err(Error::timeout("round trip", timeout.as_millis() as u64))
            }
        }
    }

    /// Closes the session.
    ///
    /// Shuts down the socket and blocks until the receiver task has
    /// observed the closure and terminated. Any round trip outstanding at
    /// that point is unblocked with [`Error::ConnectionClosed`].
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] on a second call; the session is not
    ///   re-closed
    pub async fn close(&self) -> Result<()> {
        {
            let mut session = self.session.lock();
            match session.state {
                SessionState::Closing | SessionState::Closed => {
                    return Err(Error::ConnectionClosed);
                }
                _ => session.state = SessionState::Closing,
            }
        }

        debug!("closing connection");

        if let Err(e) = self.writer.lock().await.close().await {
            // The receiver may never observe a broken close; abort it
            // rather than waiting forever.
            warn!(error = %e, "socket close failed");
            self.recv_task.abort();
            self.recv_done.cancel();

            let mut session = self.session.lock();
            session.terminal = Some(Terminal::Closed);
            session.state = SessionState::Closed;

            return Err(e);
        }

        // Wait for the receiver to drain and terminate.
        self.recv_done.cancelled().await;

        let mut session = self.session.lock();
        session.terminal = Some(Terminal::Closed);
        session.state = SessionState::Closed;

        Ok(())
    }

    /// Returns the error all callers see once the session is terminal.
    fn terminal_error(&self) -> Error {
        let session = self.session.lock();
        session
            .terminal
            .as_ref()
            .map_or(Error::ConnectionClosed, Terminal::to_error)
    }

    /// Receiver loop; the only consumer of incoming messages.
    async fn receiver_loop(
        mut reader: impl SocketReader,
        session: Arc<Mutex<Session>>,
        recv_done: CancellationToken,
    ) {
        let reason = loop {
            match reader.read().await {
                Ok(Some(text)) => {
                    let mut session = session.lock();
                    match &mut session.state {
                        SessionState::AwaitingResponse(handler) => handler(&text),
                        state => {
                            // Keepalive traffic outside a round trip.
                            trace!(state = state.name(), "dropping unsolicited message");
                        }
                    }
                }

                // Non-text frame, already handled by the socket layer.
                Ok(None) => {}

                Err(e) => break Terminal::from_read_error(&e),
            }
        };

        {
            let mut session = session.lock();
            if session.terminal.is_none() {
                session.terminal = Some(reason);
            }
        }

        debug!("receiver loop terminated");
        recv_done.cancel();
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        let closed = matches!(self.session.lock().state, SessionState::Closed);

        if !closed {
            // Leak guard for owners that never called close(): abort the
            // receiver task so the socket halves are dropped and the file
            // descriptor is released.
            warn!("transport dropped without close(), aborting receiver");
            self.recv_task.abort();
            self.recv_done.cancel();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use tokio::sync::mpsc;
    use tokio::sync::Notify;

    /// Scripted write handler: receives the written payload and a channel
    /// feeding the read half.
    type WriteScript =
        Box<dyn FnMut(&str, &mpsc::UnboundedSender<Result<Option<String>>>) -> Result<()> + Send>;

    struct FakeReader {
        rx: mpsc::UnboundedReceiver<Result<Option<String>>>,
    }

    #[async_trait]
    impl SocketReader for FakeReader {
        async fn read(&mut self) -> Result<Option<String>> {
            match self.rx.recv().await {
                Some(msg) => msg,
                None => Err(Error::ConnectionClosed),
            }
        }
    }

    struct FakeWriter {
        tx: mpsc::UnboundedSender<Result<Option<String>>>,
        script: WriteScript,
        write_seen: Arc<Notify>,
    }

    #[async_trait]
    impl SocketWriter for FakeWriter {
        async fn write(&mut self, text: String) -> Result<()> {
            let result = (self.script)(&text, &self.tx);
            self.write_seen.notify_one();
            result
        }

        async fn close(&mut self) -> Result<()> {
            // The read half observes the closure as an error.
            let _ = self.tx.send(Err(Error::ConnectionClosed));
            Ok(())
        }
    }

    fn fake_transport<F>(
        script: F,
    ) -> (
        Transport,
        Arc<Notify>,
        mpsc::UnboundedSender<Result<Option<String>>>,
    )
    where
        F: FnMut(&str, &mpsc::UnboundedSender<Result<Option<String>>>) -> Result<()>
            + Send
            + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let write_seen = Arc::new(Notify::new());

        let reader = FakeReader { rx };
        let writer = FakeWriter {
            tx: tx.clone(),
            script: Box::new(script),
            write_seen: Arc::clone(&write_seen),
        };

        (Transport::new(reader, writer), write_seen, tx)
    }

    /// Echoes every comma-separated part of the request as its own message,
    /// preceded by noise the socket layer reports as `None`.
    fn echo_script(
        payload: &str,
        tx: &mpsc::UnboundedSender<Result<Option<String>>>,
    ) -> Result<()> {
        let _ = tx.send(Ok(None));
        for part in payload.split(',') {
            let _ = tx.send(Ok(Some(part.to_string())));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_round_trip_response() {
        let (tr, _, _feed) = fake_transport(echo_script);

        let got: String = tr
            .round_trip("foobar", |payload| Ok(Some(payload.to_string())))
            .await
            .expect("round trip");

        assert_eq!(got, "foobar");

        tr.close().await.expect("close");
    }

    #[tokio::test]
    async fn test_ignore_sentinel_keeps_waiting() {
        let (tr, _, _feed) = fake_transport(echo_script);

        let got: String = tr
            .round_trip("ignore,ignore,response", |payload| match payload {
                "ignore" => Ok(None),
                other => Ok(Some(other.to_string())),
            })
            .await
            .expect("round trip");

        assert_eq!(got, "response");

        tr.close().await.expect("close");
    }

    #[tokio::test]
    async fn test_handler_error_completes() {
        let (tr, _, _feed) = fake_transport(echo_script);

        let err = tr
            .round_trip::<String, _>("req", |_| Err(Error::item_not_found("nope")))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ItemNotFound { .. }));

        tr.close().await.expect("close");
    }

    #[tokio::test]
    async fn test_second_round_trip_is_busy() {
        // First request never receives a response.
        let (tr, write_seen, _feed) = fake_transport(|_, _| Ok(()));
        let tr = Arc::new(tr);

        let pending = {
            let tr = Arc::clone(&tr);
            tokio::spawn(async move {
                tr.round_trip::<String, _>("first", |p| Ok(Some(p.to_string())))
                    .await
            })
        };

        write_seen.notified().await;

        let err = tr
            .round_trip::<String, _>("second", |p| Ok(Some(p.to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Busy));

        // Closing unblocks the pending round trip with the terminal error.
        tr.close().await.expect("close");

        let err = pending.await.expect("join").unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_round_trip_after_close() {
        let (tr, _, _feed) = fake_transport(echo_script);

        tr.close().await.expect("close");

        let err = tr
            .round_trip::<String, _>("req", |p| Ok(Some(p.to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_second_close_fails() {
        let (tr, _, _feed) = fake_transport(echo_script);

        tr.close().await.expect("close");

        let err = tr.close().await.unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_round_trip_after_failed_read() {
        let (tr, _, _feed) = fake_transport(|payload, tx| {
            if payload == "first" {
                let _ = tx.send(Err(Error::connection("read failed")));
            }
            Ok(())
        });

        let err = tr
            .round_trip::<String, _>("first", |p| Ok(Some(p.to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Connection { .. }));

        // The terminal error is fixed and returned to later callers too.
        let err = tr
            .round_trip::<String, _>("second", |p| Ok(Some(p.to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Connection { .. }));
    }

    #[tokio::test]
    async fn test_round_trip_timeout() {
        let (tr, _, _feed) = fake_transport(|_, _| Ok(()));

        let err = tr
            .round_trip_with_timeout::<String, _>(
                "req",
                Duration::from_millis(50),
                |p| Ok(Some(p.to_string())),
            )
            .await
            .unwrap_err();
        assert!(err.is_timeout());

        // The handler was uninstalled; the session is usable again.
        let err = tr
            .round_trip_with_timeout::<String, _>(
                "again",
                Duration::from_millis(50),
                |p| Ok(Some(p.to_string())),
            )
            .await
            .unwrap_err();
        assert!(err.is_timeout());

        tr.close().await.expect("close");
    }

    #[tokio::test]
    async fn test_cancellation_uninstalls_handler() {
        let (tr, _, _feed) = fake_transport(|payload, tx| {
            if payload == "second" {
                let _ = tx.send(Ok(Some("second".to_string())));
            }
            Ok(())
        });

        // Drop the round-trip future before any response arrives.
        let cancelled = tokio::time::timeout(
            Duration::from_millis(50),
            tr.round_trip::<String, _>("first", |p| Ok(Some(p.to_string()))),
        )
        .await;
        assert!(cancelled.is_err());

        let got: String = tr
            .round_trip("second", |p| Ok(Some(p.to_string())))
            .await
            .expect("round trip after cancellation");
        assert_eq!(got, "second");

        tr.close().await.expect("close");
    }

    #[tokio::test]
    async fn test_unsolicited_message_dropped() {
        let (tr, _, feed) = fake_transport(echo_script);

        // No handler installed; the receiver must drop this silently.
        feed.send(Ok(Some("noise".to_string()))).expect("send");
        tokio::time::sleep(Duration::from_millis(20)).await;

        let got: String = tr
            .round_trip("req", |p| Ok(Some(p.to_string())))
            .await
            .expect("round trip");
        assert_eq!(got, "req");

        tr.close().await.expect("close");
    }
}
