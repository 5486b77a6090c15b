//! Contract with the host windowing subsystem.

use async_trait::async_trait;
use winbarrier_common::{CreateData, GetAllInfo, HostError, HostEventBus, Window, WindowId};

mod memory;

pub use memory::MemoryHost;

/// The host operations the proxy relies on. Lifecycle notifications are
/// not returned from calls; they arrive on the host's event bus.
#[async_trait]
pub trait WindowHost: Send + Sync {
    /// Create a window. Returns its id, or `None` when the host created
    /// something this caller cannot track. The window object itself is
    /// announced on the bus.
    async fn create_window(&self, request: CreateData) -> Result<Option<WindowId>, HostError>;

    /// Enumerate all host windows matching `filter`, unscoped.
    async fn get_all(&self, filter: GetAllInfo) -> Result<Vec<Window>, HostError>;

    fn events(&self) -> &HostEventBus;
}
