//! Remote command surface.
//!
//! The remote side addresses the proxy by method name. Only the names in
//! `KNOWN_METHODS` decode to a command at all, and a connection further
//! restricts them to its configured allow-list; nothing else on the host
//! is reachable.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use winbarrier_common::{BarrierError, CreateData, GetAllInfo};

/// A raw call as it arrives from the remote side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteCall {
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl RemoteCall {
    pub fn from_json(raw: &str) -> Result<Self, BarrierError> {
        serde_json::from_str(raw).map_err(|e| BarrierError::MalformedCommand(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCommand {
    Create(CreateData),
    GetAll(GetAllInfo),
}

impl RemoteCommand {
    pub fn method(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::GetAll(_) => "getAll",
        }
    }

    /// Decode a call, rejecting methods outside `allowed` before the
    /// params are looked at.
    ///
    /// Params may be the argument object itself or a positional array
    /// whose first element is the argument; missing params mean `{}`.
    pub fn parse(method: &str, params: Value, allowed: &[String]) -> Result<Self, BarrierError> {
        if !allowed.iter().any(|m| m == method) {
            return Err(BarrierError::MethodNotAllowed(method.to_string()));
        }

        let argument = match params {
            Value::Array(items) => items.into_iter().next().unwrap_or(Value::Null),
            other => other,
        };
        let argument = if argument.is_null() {
            Value::Object(Default::default())
        } else {
            argument
        };

        match method {
            "create" => serde_json::from_value(argument)
                .map(Self::Create)
                .map_err(|e| BarrierError::MalformedCommand(format!("create: {e}"))),
            "getAll" => serde_json::from_value(argument)
                .map(Self::GetAll)
                .map_err(|e| BarrierError::MalformedCommand(format!("getAll: {e}"))),
            other => Err(BarrierError::MethodNotAllowed(other.to_string())),
        }
    }
}
