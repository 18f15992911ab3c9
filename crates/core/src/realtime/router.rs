//! The realtime event router.
//!
//! Owns the single process-wide realtime connection, normalizes events
//! from socket, push and poll into the request store, and fans them out
//! to per-consumer listeners.
//!
//! Ordering between the three channels is not guaranteed. The router
//! compensates with idempotent store operations, optimistic patches
//! treated as provisional, and an unconditional delayed authoritative
//! refetch after every event ("patch now, confirm soon").

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use momentum_domain::{RealtimeEvent, RealtimeEventKind};
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::backoff::ReconnectPolicy;
use super::ports::{CredentialProvider, MomentRequestApi, RealtimeTransport};
use super::wire::{PushPayload, WireEvent};
use crate::store::RequestStore;

/// Lifecycle of the shared realtime connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

/// Tunables for connection retries and reconciliation.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Connection attempts per connect cycle before giving up.
    pub max_connect_attempts: u32,
    pub reconnect: ReconnectPolicy,
    /// How long an optimistic patch may stand before the authoritative
    /// refetch that confirms or corrects it.
    pub reconcile_delay: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_connect_attempts: 5,
            reconnect: ReconnectPolicy::default(),
            reconcile_delay: Duration::from_secs(1),
        }
    }
}

/// Process-wide handle to the realtime sync machinery.
///
/// Cheap to clone; all clones share one connection. Any screen may call
/// [`initialize`](Self::initialize), listener registration is additive
/// per consumer, and [`teardown`](Self::teardown) is terminal.
#[derive(Clone)]
pub struct RealtimeRouter {
    inner: Arc<RouterInner>,
}

struct RouterInner {
    transport: Arc<dyn RealtimeTransport>,
    api: Arc<dyn MomentRequestApi>,
    store: Arc<RequestStore>,
    credentials: Arc<dyn CredentialProvider>,
    config: RouterConfig,
    state_tx: watch::Sender<ConnectionState>,
    listeners: Mutex<HashMap<u64, mpsc::UnboundedSender<RealtimeEvent>>>,
    next_listener_id: AtomicU64,
    /// Guards against concurrent connect cycles; re-entrant initialize
    /// calls while one is live are no-ops.
    running: AtomicBool,
    shutdown: CancellationToken,
}

impl RealtimeRouter {
    pub fn new(
        transport: Arc<dyn RealtimeTransport>,
        api: Arc<dyn MomentRequestApi>,
        store: Arc<RequestStore>,
        credentials: Arc<dyn CredentialProvider>,
        config: RouterConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            inner: Arc::new(RouterInner {
                transport,
                api,
                store,
                credentials,
                config,
                state_tx,
                listeners: Mutex::new(HashMap::new()),
                next_listener_id: AtomicU64::new(0),
                running: AtomicBool::new(false),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.inner.state_tx.borrow()
    }

    /// Watch connection state transitions.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state_tx.subscribe()
    }

    /// Shared request cache fed by this router.
    pub fn store(&self) -> Arc<RequestStore> {
        Arc::clone(&self.inner.store)
    }

    /// Start (or join) the realtime connection.
    ///
    /// Without a credential the router stays disconnected; that is the
    /// logged-out steady state, not an error. While a connect cycle is
    /// already live this is a no-op reporting the in-progress state.
    pub fn initialize(&self) -> ConnectionState {
        if self.inner.shutdown.is_cancelled() {
            return ConnectionState::Disconnected;
        }
        if self.inner.credentials.bearer_token().is_none() {
            debug!("no credential available, realtime connection not started");
            return self.state();
        }
        if self.inner.running.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
            return self.state();
        }

        self.inner.set_state(ConnectionState::Connecting);
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            run(&inner).await;
            inner.running.store(false, Ordering::SeqCst);
        });
        ConnectionState::Connecting
    }

    /// Register a listener for normalized events. The subscription
    /// unregisters itself on drop without touching the shared connection.
    pub fn subscribe(&self) -> EventSubscription {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.listeners.lock().insert(id, tx);
        EventSubscription { id, rx, router: Arc::downgrade(&self.inner) }
    }

    /// Entry point for the push-notification channel. The payload is
    /// normalized and applied exactly like a socket event.
    pub fn handle_push(&self, payload: PushPayload) {
        if self.inner.shutdown.is_cancelled() {
            return;
        }
        match payload.normalize() {
            Ok(event) => apply_event(&self.inner, event),
            Err(err) => warn!(error = %err, "dropping undecodable push payload"),
        }
    }

    /// Focus-triggered authoritative poll. This is the sole sync
    /// mechanism while the realtime connection is down.
    pub async fn refresh_now(&self) -> momentum_domain::Result<()> {
        let snapshot = self.inner.api.fetch_requests().await?;
        self.inner.store.replace_all(snapshot);
        Ok(())
    }

    /// Permanently stop the router. Scheduled reconciliations become
    /// no-ops and no reconnect will be attempted.
    pub fn teardown(&self) {
        self.inner.shutdown.cancel();
        self.inner.set_state(ConnectionState::Disconnected);
    }
}

impl RouterInner {
    fn set_state(&self, state: ConnectionState) {
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
    }

    async fn connect_with_retries(&self) -> Option<mpsc::Receiver<WireEvent>> {
        for attempt in 0..self.config.max_connect_attempts {
            if self.shutdown.is_cancelled() {
                return None;
            }
            // Re-read the credential each attempt; logout mid-retry stops
            // the cycle cleanly.
            let Some(token) = self.credentials.bearer_token() else {
                debug!("credential gone, abandoning realtime connect");
                return None;
            };
            match self.transport.connect(&token).await {
                Ok(rx) => return Some(rx),
                Err(err) => {
                    let delay = self.config.reconnect.delay_for(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max = self.config.max_connect_attempts,
                        error = %err,
                        ?delay,
                        "realtime connect failed"
                    );
                    if attempt + 1 < self.config.max_connect_attempts {
                        tokio::select! {
                            _ = self.shutdown.cancelled() => return None,
                            _ = tokio::time::sleep(delay) => {}
                        }
                    }
                }
            }
        }
        warn!("realtime connect attempts exhausted, falling back to polling");
        None
    }

    fn fan_out(&self, event: RealtimeEvent) {
        let mut listeners = self.listeners.lock();
        listeners.retain(|_, tx| tx.send(event.clone()).is_ok());
    }
}

/// Connect cycle: bounded attempts with capped exponential backoff, then
/// drain the session until the transport drops or the router is torn
/// down. A dropped transport re-enters the cycle as `Reconnecting`;
/// exhausted retries surface `Disconnected` and leave consumers on
/// poll-driven refresh.
async fn run(inner: &Arc<RouterInner>) {
    let mut reconnecting = false;
    loop {
        let Some(mut rx) = inner.connect_with_retries().await else {
            inner.set_state(ConnectionState::Disconnected);
            return;
        };
        if reconnecting {
            info!("realtime connection re-established");
        }
        inner.set_state(ConnectionState::Connected);

        // Drain this session. `rx` is dropped before the next connect,
        // so a reconnect never leaves a stale subscription behind.
        loop {
            tokio::select! {
                _ = inner.shutdown.cancelled() => {
                    inner.set_state(ConnectionState::Disconnected);
                    return;
                }
                event = rx.recv() => match event {
                    Some(wire) => apply_event(inner, wire.normalize()),
                    None => {
                        warn!("realtime transport dropped, reconnecting");
                        inner.set_state(ConnectionState::Reconnecting);
                        reconnecting = true;
                        break;
                    }
                }
            }
        }
    }
}

/// Apply one normalized event: optimistic store mutation, scheduled
/// authoritative reconciliation, then fan-out to listeners.
fn apply_event(inner: &Arc<RouterInner>, event: RealtimeEvent) {
    match event.kind {
        // No local copy exists yet; only the refetch can materialize it.
        RealtimeEventKind::Created => {}
        RealtimeEventKind::Approved | RealtimeEventKind::Rejected => {
            let status = match event.kind.status() {
                Some(status) => status,
                None => return,
            };
            if !inner.store.patch_status(&event.request_id, status) {
                debug!(
                    id = %event.request_id,
                    "status patch for unknown request deferred to refetch"
                );
            }
        }
        RealtimeEventKind::Canceled => inner.store.remove(&event.request_id),
    }

    // Scheduled regardless of whether the optimistic step found the
    // record; the record may only arrive with this refetch.
    schedule_reconcile(inner);
    inner.fan_out(event);
}

/// Delayed authoritative refetch. The cancellation token makes a callback
/// that fires after teardown a guaranteed no-op.
fn schedule_reconcile(inner: &Arc<RouterInner>) {
    let inner = Arc::clone(inner);
    tokio::spawn(async move {
        tokio::select! {
            _ = inner.shutdown.cancelled() => return,
            _ = tokio::time::sleep(inner.config.reconcile_delay) => {}
        }
        match inner.api.fetch_requests().await {
            Ok(snapshot) => inner.store.replace_all(snapshot),
            // Background refetches fail quietly; the next event or
            // focus poll retries.
            Err(err) if err.is_background_tolerable() => {
                debug!(error = %err, "background reconciliation fetch failed")
            }
            Err(err) => warn!(error = %err, "background reconciliation fetch failed"),
        }
    });
}

/// A consumer's registration for normalized realtime events.
///
/// Dropping the subscription removes only this consumer's listener; the
/// shared connection and other listeners are untouched.
pub struct EventSubscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<RealtimeEvent>,
    router: std::sync::Weak<RouterInner>,
}

impl EventSubscription {
    /// Receive the next event, or `None` once the router is gone.
    pub async fn recv(&mut self) -> Option<RealtimeEvent> {
        self.rx.recv().await
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.router.upgrade() {
            inner.listeners.lock().remove(&self.id);
        }
    }
}
