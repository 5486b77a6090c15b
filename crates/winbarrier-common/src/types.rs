//! Host windowing types as they travel over the wire.
//!
//! Field names follow the host's camelCase JSON shape so window objects
//! can be forwarded to the remote caller without re-encoding.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The host's own, unscoped identifier for a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub i64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The host's own, unscoped identifier for a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    #[default]
    Normal,
    Popup,
    Panel,
    App,
    Devtools,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    pub id: TabId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Tab {
    pub fn new(id: TabId) -> Self {
        Self {
            id,
            url: None,
            title: None,
        }
    }
}

/// A window object as reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Window {
    pub id: WindowId,
    #[serde(default)]
    pub focused: bool,
    /// Private windows cannot be tracked and never enter a capability store.
    #[serde(default)]
    pub incognito: bool,
    #[serde(rename = "type", default)]
    pub kind: WindowType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    /// Only present when the host was asked to populate tabs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tabs: Option<Vec<Tab>>,
}

impl Window {
    pub fn new(id: WindowId) -> Self {
        Self {
            id,
            focused: false,
            incognito: false,
            kind: WindowType::Normal,
            left: None,
            top: None,
            width: None,
            height: None,
            tabs: None,
        }
    }

    pub fn with_tab(mut self, tab: Tab) -> Self {
        self.tabs.get_or_insert_with(Vec::new).push(tab);
        self
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.as_ref().map_or(0, Vec::len)
    }

    /// The id of the first tab, if the host populated any.
    pub fn first_tab(&self) -> Option<TabId> {
        self.tabs.as_ref().and_then(|t| t.first()).map(|t| t.id)
    }
}

/// Target location of a new window: one URL or a list of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreateUrl {
    Single(String),
    Many(Vec<String>),
}

/// Parameters of a window creation request.
///
/// Decoding ignores unknown fields; see the proxy's sanitizer for which of
/// these actually reach the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<CreateUrl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focused: Option<bool>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<WindowType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incognito: Option<bool>,
    /// Moves an existing tab into the new window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<TabId>,
}

/// Filter descriptor for enumerating host windows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetAllInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub populate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_types: Option<Vec<WindowType>>,
}
