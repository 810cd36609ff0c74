//! WebSocket transport: lifecycle, heartbeat, and reconnect supervision
//!
//! One transport owns one logical connection to the service. Concurrent
//! callers share it freely: all writes are serialized through a single sink
//! mutex, and inbound frames are routed by correlation identifier through
//! the handler registry.
//!
//! Three loops run per physical connection (read, processing, heartbeat),
//! plus one reconnect supervisor per session when auto-reconnect is enabled.
//! The loops watch two signals: the session-wide stop channel (set by
//! `disconnect`) and a per-connection stop channel (set whenever the
//! connection is declared dead), so loops from a stale connection can never
//! touch its replacement.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async_with_config, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};

use taskwire_core::envelope::{encode_auth_frame, encode_request_frame};
use taskwire_core::{Error, Result, TaskIdentifiable};

use crate::backoff::Backoff;
use crate::config::WsConfig;
use crate::registry::{HandlerRegistry, ResponseCallback};
use crate::router;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Inbound frames buffered between the read loop and the processing loop
const FRAME_CHANNEL_CAPACITY: usize = 100;

/// How long `disconnect` waits for the loops to wind down
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnState {
    Disconnected,
    Connecting,
    Connected,
}

/// Multiplexing WebSocket transport
///
/// Cheap to share behind `Arc`; every method takes `&self`.
pub struct WsTransport {
    config: WsConfig,
    api_key: String,
    state: Mutex<ConnState>,
    sink: Mutex<Option<WsSink>>,
    registry: HandlerRegistry,
    /// Session-wide stop signal, present while connected
    stop_tx: std::sync::Mutex<Option<watch::Sender<bool>>>,
    /// Stop signal for the loops of the current physical connection
    conn_stop_tx: std::sync::Mutex<Option<watch::Sender<bool>>>,
    /// Coalesced reconnect trigger, present while auto-reconnect is armed
    reconnect_tx: std::sync::Mutex<Option<mpsc::Sender<()>>>,
    tasks: std::sync::Mutex<Vec<JoinHandle<()>>>,
    /// Millis since `epoch` of the last inbound frame, for pong liveness
    last_rx_ms: AtomicU64,
    epoch: Instant,
}

impl WsTransport {
    pub fn new(config: WsConfig, api_key: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            config,
            api_key: api_key.into(),
            state: Mutex::new(ConnState::Disconnected),
            sink: Mutex::new(None),
            registry: HandlerRegistry::new(),
            stop_tx: std::sync::Mutex::new(None),
            conn_stop_tx: std::sync::Mutex::new(None),
            reconnect_tx: std::sync::Mutex::new(None),
            tasks: std::sync::Mutex::new(Vec::new()),
            last_rx_ms: AtomicU64::new(0),
            epoch: Instant::now(),
        })
    }

    /// Registry of pending requests, shared with the response waiter.
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub async fn is_connected(&self) -> bool {
        *self.state.lock().await == ConnState::Connected
    }

    /// Dial, authenticate, and start the connection loops.
    ///
    /// Returns `Error::AlreadyConnected` when a connection is already up and
    /// `Error::Authentication` when the auth frame cannot be delivered.
    pub async fn connect(self: &Arc<Self>) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            if *state != ConnState::Disconnected {
                return Err(Error::AlreadyConnected);
            }
            *state = ConnState::Connecting;
        }

        match self.dial_and_auth().await {
            Ok((sink, stream)) => {
                *self.sink.lock().await = Some(sink);

                let (stop_tx, stop_rx) = watch::channel(false);
                *lock(&self.stop_tx) = Some(stop_tx);

                self.touch_rx();
                self.spawn_connection_loops(stream, stop_rx.clone());

                if self.config.enable_auto_reconnect {
                    let (reconnect_tx, reconnect_rx) = mpsc::channel(1);
                    *lock(&self.reconnect_tx) = Some(reconnect_tx);
                    let transport = Arc::clone(self);
                    let handle = tokio::spawn(transport.supervise(reconnect_rx, stop_rx));
                    lock(&self.tasks).push(handle);
                }

                *self.state.lock().await = ConnState::Connected;
                info!(url = %self.config.url, "connected");
                Ok(())
            }
            Err(e) => {
                *self.state.lock().await = ConnState::Disconnected;
                Err(e)
            }
        }
    }

    /// Stop the loops, close the socket, and drop all pending handlers.
    ///
    /// Idempotent; safe to call while a reconnect is in flight. In-flight
    /// requests are abandoned and surface at their own waiters as timeouts.
    pub async fn disconnect(&self) -> Result<()> {
        // mark and take the stop signals under the state lock, the same
        // lock reestablish commits under, so a reconnect in flight either
        // sees the taken stop signal and bails or is fully torn down below.
        // The teardown is all no-ops on a second call.
        {
            let mut state = self.state.lock().await;
            *state = ConnState::Disconnected;
            if let Some(tx) = lock(&self.stop_tx).take() {
                let _ = tx.send(true);
            }
            if let Some(tx) = lock(&self.conn_stop_tx).take() {
                let _ = tx.send(true);
            }
            lock(&self.reconnect_tx).take();
        }

        let handles: Vec<JoinHandle<()>> = lock(&self.tasks).drain(..).collect();
        if timeout(SHUTDOWN_GRACE, futures::future::join_all(handles))
            .await
            .is_err()
        {
            warn!("connection loops did not exit within the shutdown grace");
        }

        {
            let mut sink = self.sink.lock().await;
            if let Some(mut sink) = sink.take() {
                let _ = timeout(self.config.write_timeout, sink.send(Message::Close(None))).await;
                let _ = sink.close().await;
            }
        }

        self.registry.clear();
        info!("disconnected");
        Ok(())
    }

    /// Register the callback and write the request as a single-element frame.
    ///
    /// The callback is registered before the wire write so a fast response
    /// cannot race past its handler. A failed write does not roll the entry
    /// back; the waiter's own deadline reclaims it.
    pub async fn send<R>(&self, request: &R, callback: ResponseCallback) -> Result<()>
    where
        R: Serialize + TaskIdentifiable,
    {
        if !self.is_connected().await {
            return Err(Error::NotConnected);
        }
        let task_uuid = request.task_uuid();
        if task_uuid.is_empty() {
            return Err(Error::InvalidRequest("empty taskUUID".into()));
        }

        let frame = encode_request_frame(request)?;
        self.registry.register(task_uuid, callback);

        let mut sink = self.sink.lock().await;
        let Some(sink) = sink.as_mut() else {
            return Err(Error::NotConnected);
        };
        match timeout(self.config.write_timeout, sink.send(Message::Text(frame))).await {
            Ok(Ok(())) => {
                debug!(task_uuid = %task_uuid, task_type = %request.task_type(), "request sent");
                Ok(())
            }
            Ok(Err(e)) => {
                self.trigger_reconnect();
                Err(Error::WebSocket(e.to_string()))
            }
            Err(_) => {
                self.trigger_reconnect();
                Err(Error::WebSocket(format!(
                    "write timed out after {:?}",
                    self.config.write_timeout
                )))
            }
        }
    }

    async fn dial_and_auth(&self) -> Result<(WsSink, WsStream)> {
        let mut ws_config = WebSocketConfig::default();
        ws_config.write_buffer_size = self.config.write_buffer_size;
        ws_config.max_message_size = Some(self.config.max_message_size);

        let dial = connect_async_with_config(self.config.url.as_str(), Some(ws_config), false);
        let (ws, _) = timeout(self.config.connect_timeout, dial)
            .await
            .map_err(|_| {
                Error::WebSocket(format!(
                    "connect timed out after {:?}",
                    self.config.connect_timeout
                ))
            })?
            .map_err(|e| Error::WebSocket(e.to_string()))?;

        let (mut sink, stream) = ws.split();

        // auth must be the first frame on every new connection
        let auth = encode_auth_frame(&self.api_key)?;
        let sent = timeout(self.config.write_timeout, sink.send(Message::Text(auth))).await;
        match sent {
            Ok(Ok(())) => Ok((sink, stream)),
            Ok(Err(e)) => {
                let _ = sink.close().await;
                Err(Error::Authentication(e.to_string()))
            }
            Err(_) => {
                let _ = sink.close().await;
                Err(Error::Authentication("auth frame write timed out".into()))
            }
        }
    }

    /// Spawn the read, processing, and heartbeat loops for one connection.
    fn spawn_connection_loops(self: &Arc<Self>, stream: WsStream, stop_rx: watch::Receiver<bool>) {
        let (conn_stop_tx, conn_stop_rx) = watch::channel(false);
        *lock(&self.conn_stop_tx) = Some(conn_stop_tx);

        let (frame_tx, frame_rx) = mpsc::channel::<String>(FRAME_CHANNEL_CAPACITY);

        let read = tokio::spawn(Arc::clone(self).read_loop(
            stream,
            frame_tx,
            stop_rx.clone(),
            conn_stop_rx.clone(),
        ));
        let process = tokio::spawn(Arc::clone(self).process_loop(
            frame_rx,
            stop_rx.clone(),
            conn_stop_rx.clone(),
        ));
        let heartbeat = tokio::spawn(Arc::clone(self).heartbeat_loop(stop_rx, conn_stop_rx));

        let mut tasks = lock(&self.tasks);
        tasks.push(read);
        tasks.push(process);
        tasks.push(heartbeat);
    }

    async fn read_loop(
        self: Arc<Self>,
        mut stream: WsStream,
        frame_tx: mpsc::Sender<String>,
        mut stop_rx: watch::Receiver<bool>,
        mut conn_stop_rx: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                _ = stop_rx.changed() => break,
                _ = conn_stop_rx.changed() => break,
                message = stream.next() => match message {
                    Some(Ok(Message::Text(text))) => {
                        self.touch_rx();
                        if frame_tx.send(text).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        // clean close from the service is not a failure
                        info!("connection closed by service");
                        self.handle_clean_close();
                        break;
                    }
                    Some(Ok(_)) => {
                        // pings, pongs, binary: liveness only
                        self.touch_rx();
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "read failed");
                        self.trigger_reconnect();
                        break;
                    }
                    None => {
                        warn!("connection dropped");
                        self.trigger_reconnect();
                        break;
                    }
                },
            }
        }
        trace!("read loop exited");
    }

    async fn process_loop(
        self: Arc<Self>,
        mut frame_rx: mpsc::Receiver<String>,
        mut stop_rx: watch::Receiver<bool>,
        mut conn_stop_rx: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                _ = stop_rx.changed() => break,
                _ = conn_stop_rx.changed() => break,
                frame = frame_rx.recv() => match frame {
                    Some(text) => router::handle_frame(&self.registry, &text),
                    None => break,
                },
            }
        }
        trace!("processing loop exited");
    }

    async fn heartbeat_loop(
        self: Arc<Self>,
        mut stop_rx: watch::Receiver<bool>,
        mut conn_stop_rx: watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(self.config.ping_interval);
        // the first tick fires immediately
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = stop_rx.changed() => break,
                _ = conn_stop_rx.changed() => break,
                _ = ticker.tick() => {
                    if self.since_last_rx() > self.config.pong_timeout {
                        warn!(
                            silence = ?self.since_last_rx(),
                            "no traffic within the pong timeout"
                        );
                        self.trigger_reconnect();
                        break;
                    }
                    let failed = {
                        let mut sink = self.sink.lock().await;
                        match sink.as_mut() {
                            Some(sink) => {
                                !matches!(
                                    timeout(self.config.write_timeout, sink.send(Message::Ping(Vec::new()))).await,
                                    Ok(Ok(()))
                                )
                            }
                            None => break,
                        }
                    };
                    if failed {
                        warn!("ping write failed");
                        self.trigger_reconnect();
                        break;
                    }
                    trace!("ping sent");
                }
            }
        }
        trace!("heartbeat loop exited");
    }

    /// Reconnect supervisor: one per session, consumes the coalesced trigger.
    async fn supervise(
        self: Arc<Self>,
        mut reconnect_rx: mpsc::Receiver<()>,
        mut stop_rx: watch::Receiver<bool>,
    ) {
        let mut backoff = Backoff::new(
            self.config.reconnect_delay,
            self.config.max_reconnect_delay,
        )
        .with_jitter();

        loop {
            tokio::select! {
                _ = stop_rx.changed() => break,
                trigger = reconnect_rx.recv() => {
                    if trigger.is_none() {
                        break;
                    }
                    let mut attempt: u32 = 0;
                    loop {
                        attempt += 1;
                        let delay = backoff.next_delay();
                        info!(attempt, delay = ?delay, "waiting before reconnect attempt");
                        tokio::select! {
                            _ = stop_rx.changed() => return,
                            _ = tokio::time::sleep(delay) => {}
                        }
                        if self.is_connected().await {
                            // something else restored the connection
                            backoff.reset();
                            break;
                        }
                        match self.reestablish(stop_rx.clone()).await {
                            Ok(()) => {
                                info!(attempt, "reconnected");
                                backoff.reset();
                                break;
                            }
                            Err(e) => {
                                warn!(attempt, error = %e, "reconnect attempt failed");
                            }
                        }
                    }
                }
            }
        }
        trace!("reconnect supervisor exited");
    }

    /// Close the stale sink, re-dial, re-authenticate, and respawn the
    /// connection loops. The supervisor itself is never respawned here.
    async fn reestablish(self: &Arc<Self>, stop_rx: watch::Receiver<bool>) -> Result<()> {
        {
            let mut sink = self.sink.lock().await;
            if let Some(mut stale) = sink.take() {
                let _ = stale.close().await;
            }
        }

        let (mut sink, stream) = self.dial_and_auth().await?;

        // commit under the state lock: disconnect takes the stop signal
        // under the same lock, so either it already ran and the fresh
        // socket is dropped here, or the commit lands first and disconnect
        // tears the fresh loops down afterwards
        let mut state = self.state.lock().await;
        if lock(&self.stop_tx).is_none() {
            drop(state);
            let _ = sink.close().await;
            return Err(Error::ConnectionClosed);
        }
        *self.sink.lock().await = Some(sink);
        self.touch_rx();
        self.spawn_connection_loops(stream, stop_rx);
        *state = ConnState::Connected;
        Ok(())
    }

    /// End the session after a clean close frame from the service.
    ///
    /// Stops the connection loops and marks the transport disconnected
    /// without arming the reconnect supervisor: a deliberate close is not a
    /// failure to recover from.
    fn handle_clean_close(&self) {
        if let Ok(mut state) = self.state.try_lock() {
            if *state == ConnState::Connected {
                *state = ConnState::Disconnected;
            }
        }
        if let Some(tx) = lock(&self.conn_stop_tx).take() {
            let _ = tx.send(true);
        }
    }

    /// Declare the current connection dead and arm the supervisor.
    ///
    /// Uses `try_lock` on the state so it can never deadlock against a
    /// concurrent `disconnect`, and `try_send` on the trigger so bursts of
    /// failures coalesce into one reconnect cycle.
    fn trigger_reconnect(&self) {
        if lock(&self.stop_tx).is_none() {
            // disconnect already ran
            return;
        }
        if let Ok(mut state) = self.state.try_lock() {
            if *state == ConnState::Connected {
                *state = ConnState::Disconnected;
            }
        }
        if let Some(tx) = lock(&self.conn_stop_tx).take() {
            let _ = tx.send(true);
        }
        match lock(&self.reconnect_tx).as_ref() {
            Some(tx) => {
                let _ = tx.try_send(());
                debug!("reconnect triggered");
            }
            None => {
                debug!("connection lost and auto-reconnect is disabled");
            }
        }
    }

    fn touch_rx(&self) {
        self.last_rx_ms
            .store(self.epoch.elapsed().as_millis() as u64, Ordering::Relaxed);
    }

    fn since_last_rx(&self) -> Duration {
        let now = self.epoch.elapsed().as_millis() as u64;
        let last = self.last_rx_ms.load(Ordering::Relaxed);
        Duration::from_millis(now.saturating_sub(last))
    }
}

/// Lock a control-plane mutex, ignoring poisoning: the guarded values are
/// plain channel handles that stay consistent under panic.
fn lock<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
