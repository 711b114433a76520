use std::future::pending;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Sleep};
use tracing::{debug, info, warn};

use backend_domain::{BroadcastKind, RealtimeMessage};

use crate::backoff::Backoff;
use crate::listeners::{notify, ListenerId, ListenerRegistry};
use crate::machine::{ConnectionMachine, ConnectionState, MachineAction, Signal};
use crate::transport::{Connection, Transport, TransportError};

type PendingConnect = BoxFuture<'static, Result<Box<dyn Connection>, TransportError>>;

/// The single push connection of a terminal, shared by every listener in it.
/// Dropping the manager closes the connection.
pub struct SubscriptionManager {
    signals: mpsc::UnboundedSender<Signal>,
    state: watch::Receiver<ConnectionState>,
    listeners: Arc<Mutex<ListenerRegistry>>,
    driver: Option<JoinHandle<()>>,
}

impl SubscriptionManager {
    /// Starts connecting right away. Must be called inside a tokio runtime.
    pub fn spawn(transport: Arc<dyn Transport>, backoff: Backoff) -> Self {
        let (signals, signal_rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(ConnectionState::Disconnected);
        let listeners = Arc::new(Mutex::new(ListenerRegistry::default()));
        let driver = Driver {
            machine: ConnectionMachine::new(backoff),
            transport,
            listeners: listeners.clone(),
            state: state_tx,
            connection: None,
            connecting: None,
            retry: None,
        };
        let driver = tokio::spawn(driver.run(signal_rx));
        Self {
            signals,
            state,
            listeners,
            driver: Some(driver),
        }
    }

    pub fn add_event_listener<F>(&self, kind: BroadcastKind, listener: F) -> ListenerId
    where
        F: Fn(&RealtimeMessage) + Send + Sync + 'static,
    {
        lock(&self.listeners).add(kind, listener)
    }

    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        lock(&self.listeners).remove(id)
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    pub fn set_visible(&self, visible: bool) {
        self.signal(if visible { Signal::Visible } else { Signal::Hidden });
    }

    pub fn set_online(&self, online: bool) {
        self.signal(if online { Signal::Online } else { Signal::Offline });
    }

    pub fn close(&self) {
        self.signal(Signal::Close);
    }

    fn signal(&self, signal: Signal) {
        if self.signals.send(signal).is_err() {
            debug!("subscription driver already stopped");
        }
    }
}

impl Drop for SubscriptionManager {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
    }
}

/// Listeners run outside the lock, so poisoning is recovered rather than propagated.
fn lock(listeners: &Mutex<ListenerRegistry>) -> MutexGuard<'_, ListenerRegistry> {
    listeners.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct Driver {
    machine: ConnectionMachine,
    transport: Arc<dyn Transport>,
    listeners: Arc<Mutex<ListenerRegistry>>,
    state: watch::Sender<ConnectionState>,
    connection: Option<Box<dyn Connection>>,
    connecting: Option<PendingConnect>,
    retry: Option<Pin<Box<Sleep>>>,
}

impl Driver {
    async fn run(mut self, mut signals: mpsc::UnboundedReceiver<Signal>) {
        self.apply(Signal::Start);
        while self.machine.state() != ConnectionState::Closed {
            tokio::select! {
                signal = signals.recv() => {
                    self.apply(signal.unwrap_or(Signal::Close));
                }
                outcome = next_connect(&mut self.connecting) => {
                    self.connecting = None;
                    match outcome {
                        Ok(connection) => {
                            self.connection = Some(connection);
                            self.apply(Signal::Opened);
                        }
                        Err(err) => {
                            warn!("realtime connect failed: {}", err);
                            self.apply(Signal::TransportFailed(err.to_string()));
                        }
                    }
                }
                incoming = next_message(&mut self.connection) => match incoming {
                    Ok(message) => {
                        let listeners = lock(&self.listeners).listeners_for(message.event);
                        for listener in &listeners {
                            notify(listener, &message);
                        }
                    }
                    Err(err) => {
                        warn!("realtime connection lost: {}", err);
                        self.connection = None;
                        self.apply(Signal::TransportFailed(err.to_string()));
                    }
                },
                _ = retry_due(&mut self.retry) => {
                    self.retry = None;
                    self.apply(Signal::RetryDue);
                }
            }
        }
        debug!("subscription driver stopped");
    }

    fn apply(&mut self, signal: Signal) {
        let action = self.machine.handle(signal);
        match action {
            MachineAction::Connect => {
                self.drop_connection();
                let transport = self.transport.clone();
                self.connecting = Some(async move { transport.connect().await }.boxed());
            }
            MachineAction::RetryAfter(delay) => {
                self.drop_connection();
                info!(delay_ms = delay.as_millis() as u64, "realtime reconnect scheduled");
                self.retry = Some(Box::pin(sleep(delay)));
            }
            MachineAction::Disconnect => self.drop_connection(),
            MachineAction::Nothing => {}
        }
        let state = self.machine.state();
        self.state.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
    }

    fn drop_connection(&mut self) {
        self.connection = None;
        self.connecting = None;
        self.retry = None;
    }
}

async fn next_connect(
    connecting: &mut Option<PendingConnect>,
) -> Result<Box<dyn Connection>, TransportError> {
    match connecting {
        Some(future) => future.await,
        None => pending().await,
    }
}

async fn next_message(
    connection: &mut Option<Box<dyn Connection>>,
) -> Result<RealtimeMessage, TransportError> {
    match connection {
        Some(connection) => connection.recv().await,
        None => pending().await,
    }
}

async fn retry_due(retry: &mut Option<Pin<Box<Sleep>>>) {
    match retry {
        Some(timer) => timer.await,
        None => pending().await,
    }
}
