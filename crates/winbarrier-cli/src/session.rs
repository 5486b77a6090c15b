//! Applies script steps to a set of proxy connections over one host.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use winbarrier_common::BarrierError;
use winbarrier_config::BarrierConfig;
use winbarrier_proxy::{connect, ConnectionHandle, MemoryHost, PostMessage};

use crate::script::Step;

/// One line of output: a message some connection posted to its debugger.
#[derive(Debug, Serialize)]
pub struct OutputLine<'a> {
    pub origin: &'a str,
    pub message: &'a PostMessage,
}

pub struct Session {
    config: BarrierConfig,
    host: Arc<MemoryHost>,
    connections: HashMap<String, ConnectionHandle>,
    printers: Vec<JoinHandle<()>>,
    output: mpsc::UnboundedSender<String>,
}

impl Session {
    /// Posted messages are written to `output` as JSON lines.
    pub fn new(config: BarrierConfig, output: mpsc::UnboundedSender<String>) -> Self {
        let host = Arc::new(MemoryHost::new(config.bus.capacity));
        Self {
            config,
            host,
            connections: HashMap::new(),
            printers: Vec::new(),
            output,
        }
    }

    pub fn host(&self) -> &MemoryHost {
        &self.host
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub async fn apply(&mut self, step: Step) -> Result<(), BarrierError> {
        match step {
            Step::Connect { origin } => self.connect(origin),
            Step::Call {
                origin,
                method,
                params,
            } => {
                let handle = self.connection(&origin)?;
                handle.call(&method, params).await?;
            }
            Step::Open { create } => {
                let window = self.host.open(&create)?;
                info!(window_id = %window.id, "host window opened");
            }
            Step::Remove { window_id } => {
                if !self.host.remove(window_id)? {
                    warn!(window_id = %window_id, "no such host window");
                }
            }
            Step::Disconnect { origin } => {
                let mut handle = self
                    .connections
                    .remove(&origin)
                    .ok_or(BarrierError::ConnectionClosed)?;
                log_faults(&mut handle);
                handle.disconnect().await;
            }
            Step::Wait { ms } => tokio::time::sleep(Duration::from_millis(ms)).await,
        }
        self.drain_faults();
        Ok(())
    }

    /// Disconnect everything and wait until all posted output is flushed.
    pub async fn finish(mut self) {
        let mut origins: Vec<String> = self.connections.keys().cloned().collect();
        origins.sort();
        for origin in origins {
            if let Some(mut handle) = self.connections.remove(&origin) {
                log_faults(&mut handle);
                handle.disconnect().await;
            }
        }
        for printer in self.printers.drain(..) {
            let _ = printer.await;
        }
    }

    fn connect(&mut self, origin: String) {
        if self.connections.contains_key(&origin) {
            warn!(origin = %origin, "already connected");
            return;
        }

        let (port, mut inbox) = mpsc::unbounded_channel::<PostMessage>();
        let output = self.output.clone();
        let printer_origin = origin.clone();
        self.printers.push(tokio::spawn(async move {
            while let Some(message) = inbox.recv().await {
                let line = OutputLine {
                    origin: &printer_origin,
                    message: &message,
                };
                match serde_json::to_string(&line) {
                    Ok(line) => {
                        let _ = output.send(line);
                    }
                    Err(e) => warn!(origin = %printer_origin, "failed to encode message: {e}"),
                }
            }
        }));

        let handle = connect(
            self.host.clone(),
            origin.clone(),
            &self.config.proxy,
            Box::new(port),
        );
        self.connections.insert(origin, handle);
    }

    fn connection(&self, origin: &str) -> Result<&ConnectionHandle, BarrierError> {
        self.connections
            .get(origin)
            .ok_or(BarrierError::ConnectionClosed)
    }

    fn drain_faults(&mut self) {
        for handle in self.connections.values_mut() {
            log_faults(handle);
        }
    }
}

fn log_faults(handle: &mut ConnectionHandle) {
    while let Some(fault) = handle.try_fault() {
        warn!(connection = %fault.connection, origin = %handle.origin(), "{}", fault.error);
    }
}
