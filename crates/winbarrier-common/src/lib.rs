pub mod errors;
pub mod events;
pub mod id;
pub mod types;

pub use errors::{BarrierError, ConfigError, HostError};
pub use events::{HostEvent, HostEventBus, HostEventKind};
pub use id::{new_correlation_id, new_id, ConnectionId};
pub use types::{CreateData, CreateUrl, GetAllInfo, Tab, TabId, Window, WindowId, WindowType};

pub type Result<T> = std::result::Result<T, BarrierError>;
