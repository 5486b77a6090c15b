//! Access-controlled proxy over a host windowing subsystem.
//!
//! One proxy per remote connection. The remote caller may create windows
//! and enumerate them, but only ever sees windows it created through its
//! own connection, even though the host broadcasts every lifecycle event
//! to everyone:
//! - `store`: the per-connection allow-list of real ids and opaque handles
//! - `barrier`: connection state plus the host event translator
//! - `forwarder` / `command`: the allow-listed remote command surface
//! - `connection`: the async driver that ties a barrier to the host bus
//! - `host`: the host contract and an in-memory host

pub mod barrier;
pub mod command;
pub mod connection;
pub mod forwarder;
pub mod host;
pub mod port;
pub mod sanitize;
pub mod store;

pub use barrier::{ScopedWindow, WindowsBarrier};
pub use command::{RemoteCall, RemoteCommand};
pub use connection::{connect, ConnectionHandle, Fault};
pub use host::{MemoryHost, WindowHost};
pub use port::{BufferedPort, MessagePort, PostMessage};
pub use store::{CapabilityStore, Grant, WindowHandle};
