//! Async driver for one remote connection.
//!
//! `connect` spawns a task that owns the connection's `WindowsBarrier` and
//! multiplexes three inputs: host created events, host removed events and
//! remote commands. Host events are always drained before the next command
//! so every notification caused by earlier host activity is posted first.
//! When a receiver lags behind the bus, the skipped events are recovered
//! from a full host listing.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use winbarrier_common::{
    new_correlation_id, BarrierError, ConnectionId, GetAllInfo, HostEventBus, Window, WindowId,
};
use winbarrier_config::ProxyConfig;

use crate::barrier::WindowsBarrier;
use crate::command::RemoteCommand;
use crate::forwarder::forward;
use crate::host::WindowHost;
use crate::port::MessagePort;

/// An error raised inside a connection task, reported to whoever owns the
/// connection. The connection keeps running.
#[derive(Debug)]
pub struct Fault {
    pub connection: String,
    pub error: BarrierError,
}

enum Control {
    Call(RemoteCommand),
    Disconnect(oneshot::Sender<()>),
}

enum Incoming {
    Created(Result<Option<Window>, RecvError>),
    Removed(Result<WindowId, RecvError>),
    Control(Option<Control>),
}

/// Owner side of a running connection.
pub struct ConnectionHandle {
    id: ConnectionId,
    name: String,
    origin: String,
    allowed: Vec<String>,
    control: mpsc::Sender<Control>,
    faults: mpsc::UnboundedReceiver<Fault>,
    task: JoinHandle<()>,
}

impl ConnectionHandle {
    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Decode and queue a remote call. Rejected methods never reach the
    /// connection task.
    pub async fn call(&self, method: &str, params: Value) -> Result<(), BarrierError> {
        let command = RemoteCommand::parse(method, params, &self.allowed)?;
        self.send(command).await
    }

    pub async fn send(&self, command: RemoteCommand) -> Result<(), BarrierError> {
        if !self.allowed.iter().any(|m| m == command.method()) {
            return Err(BarrierError::MethodNotAllowed(command.method().to_string()));
        }
        self.control
            .send(Control::Call(command))
            .await
            .map_err(|_| BarrierError::ConnectionClosed)
    }

    pub fn try_fault(&mut self) -> Option<Fault> {
        self.faults.try_recv().ok()
    }

    /// Wait for the next fault. `None` once the connection task is gone.
    pub async fn next_fault(&mut self) -> Option<Fault> {
        self.faults.recv().await
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Tear the connection down and wait until it has released its host
    /// subscriptions. Nothing is posted afterwards.
    pub async fn disconnect(self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.control.send(Control::Disconnect(done_tx)).await.is_ok() {
            let _ = done_rx.await;
        }
        if let Err(e) = self.task.await {
            warn!(connection = %self.name, "connection task ended abnormally: {e}");
        }
    }
}

/// Open a connection for `origin` and start serving it.
///
/// The created-event subscription is taken before this returns, so no
/// creation answering a later command can be missed. Must be called from
/// within a tokio runtime.
pub fn connect(
    host: Arc<dyn WindowHost>,
    origin: impl Into<String>,
    config: &ProxyConfig,
    port: Box<dyn MessagePort>,
) -> ConnectionHandle {
    let id = ConnectionId::new();
    let origin = origin.into();
    let barrier = WindowsBarrier::new(origin.clone(), &config.source_path, port);
    let name = barrier.name().to_string();

    let (control_tx, control_rx) = mpsc::channel(config.command_queue.max(1));
    let (fault_tx, fault_rx) = mpsc::unbounded_channel();

    let subscriptions = Subscriptions {
        created: Some(host.events().subscribe_created()),
        removed: None,
    };
    debug!(connection = %name, id = %id, "subscribed to window creation");

    let connection = Connection {
        host,
        barrier,
        subscriptions,
        control: control_rx,
        faults: fault_tx,
    };
    let task = tokio::spawn(connection.run());

    ConnectionHandle {
        id,
        name,
        origin,
        allowed: config.allowed_methods.clone(),
        control: control_tx,
        faults: fault_rx,
        task,
    }
}

struct Subscriptions {
    created: Option<broadcast::Receiver<Option<Window>>>,
    removed: Option<broadcast::Receiver<WindowId>>,
}

impl Subscriptions {
    /// Start receiving removals. Idempotent.
    fn arm_removed(&mut self, bus: &HostEventBus) -> bool {
        if self.removed.is_some() {
            return false;
        }
        self.removed = Some(bus.subscribe_removed());
        true
    }

    fn clear(&mut self) {
        self.created = None;
        self.removed = None;
    }
}

async fn recv_from<T: Clone>(rx: &mut Option<broadcast::Receiver<T>>) -> Result<T, RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

struct Connection {
    host: Arc<dyn WindowHost>,
    barrier: WindowsBarrier,
    subscriptions: Subscriptions,
    control: mpsc::Receiver<Control>,
    faults: mpsc::UnboundedSender<Fault>,
}

impl Connection {
    async fn run(mut self) {
        loop {
            let incoming = tokio::select! {
                biased;
                event = recv_from(&mut self.subscriptions.created) => Incoming::Created(event),
                event = recv_from(&mut self.subscriptions.removed) => Incoming::Removed(event),
                control = self.control.recv() => Incoming::Control(control),
            };

            match incoming {
                Incoming::Created(Ok(window)) => self.handle_created(window),
                Incoming::Removed(Ok(id)) => {
                    self.barrier.on_removed(id);
                }
                Incoming::Created(Err(RecvError::Lagged(n))) => {
                    warn!(connection = %self.barrier.name(), skipped = n, "created events lagged");
                    self.resync_created().await;
                }
                Incoming::Removed(Err(RecvError::Lagged(n))) => {
                    warn!(connection = %self.barrier.name(), skipped = n, "removed events lagged");
                    self.resync_removed().await;
                }
                Incoming::Created(Err(RecvError::Closed)) => {
                    debug!(connection = %self.barrier.name(), "created events closed");
                    self.subscriptions.created = None;
                }
                Incoming::Removed(Err(RecvError::Closed)) => {
                    debug!(connection = %self.barrier.name(), "removed events closed");
                    self.subscriptions.removed = None;
                }
                Incoming::Control(Some(Control::Call(command))) => self.handle_command(command).await,
                Incoming::Control(Some(Control::Disconnect(done))) => {
                    self.teardown();
                    let _ = done.send(());
                    break;
                }
                Incoming::Control(None) => {
                    self.teardown();
                    break;
                }
            }
        }
    }

    async fn handle_command(&mut self, command: RemoteCommand) {
        let request_id = new_correlation_id();
        let method = command.method();
        info!(connection = %self.barrier.name(), request_id = %request_id, method, "remote call");

        if matches!(command, RemoteCommand::Create(_))
            && self.subscriptions.arm_removed(self.host.events())
        {
            debug!(connection = %self.barrier.name(), "subscribed to window removal");
        }

        if let Err(e) = forward(self.host.as_ref(), &mut self.barrier, command).await {
            warn!(
                connection = %self.barrier.name(),
                request_id = %request_id,
                method,
                "remote call failed: {e}"
            );
            self.report(e);
        }
    }

    fn handle_created(&mut self, window: Option<Window>) {
        if let Err(e) = self.barrier.on_created(window) {
            error!(connection = %self.barrier.name(), "{e}");
            self.report(e);
        }
    }

    /// Our own created events may have been among the skipped ones.
    async fn resync_created(&mut self) {
        if self.barrier.pending_count() == 0 {
            return;
        }
        let Some(windows) = self.host_snapshot().await else {
            return;
        };
        for e in self.barrier.resync_created(windows) {
            error!(connection = %self.barrier.name(), "{e}");
            self.report(e);
        }
    }

    async fn resync_removed(&mut self) {
        if self.barrier.store().is_empty() {
            return;
        }
        let Some(windows) = self.host_snapshot().await else {
            return;
        };
        let released = self.barrier.resync_removed(&windows);
        debug!(connection = %self.barrier.name(), released = released.len(), "removals resynced");
    }

    async fn host_snapshot(&mut self) -> Option<Vec<Window>> {
        let filter = GetAllInfo {
            populate: Some(true),
            window_types: None,
        };
        match self.host.get_all(filter).await {
            Ok(windows) => Some(windows),
            Err(e) => {
                warn!(connection = %self.barrier.name(), "resync listing failed: {e}");
                self.report(e.into());
                None
            }
        }
    }

    fn report(&self, error: BarrierError) {
        let fault = Fault {
            connection: self.barrier.name().to_string(),
            error,
        };
        if self.faults.send(fault).is_err() {
            debug!(connection = %self.barrier.name(), "fault dropped, owner gone");
        }
    }

    fn teardown(&mut self) {
        self.barrier.disconnect();
        self.subscriptions.clear();
    }
}
