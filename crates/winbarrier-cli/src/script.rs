//! Replay script format.
//!
//! One JSON object per line, tagged by `op`. Blank lines and lines starting
//! with `#` are skipped.
//!
//! ```text
//! {"op": "connect", "origin": "https://debugger.test"}
//! {"op": "call", "origin": "https://debugger.test", "method": "create", "params": {"url": "https://a.test"}}
//! {"op": "remove", "windowId": 1}
//! ```

use serde::Deserialize;
use serde_json::Value;
use winbarrier_common::{BarrierError, CreateData, WindowId};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Open a proxy connection for a debugger origin.
    Connect { origin: String },
    /// A remote call arriving on an open connection.
    Call {
        origin: String,
        method: String,
        #[serde(default)]
        params: Value,
    },
    /// A window opened on the host by someone other than a debugger.
    Open {
        #[serde(default)]
        create: CreateData,
    },
    /// A window closed on the host.
    Remove {
        #[serde(rename = "windowId")]
        window_id: WindowId,
    },
    Disconnect { origin: String },
    Wait { ms: u64 },
}

pub fn parse_line(line: &str) -> Result<Option<Step>, BarrierError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(|e| BarrierError::MalformedCommand(format!("script: {e}")))
}
