//! The working session: classpath, open tabs and their navigation state.
//!
//! A session is stored as a JSON document with a single `workspace` root:
//!
//! ```json
//! {
//!   "workspace": {
//!     "config": [{ "kind": "directory", "path": "/out" }],
//!     "tabs": [{ "location": { "fileName": "/out/a/B.class" }, "history": { ... } }],
//!     "activeTabIndex": 0
//!   }
//! }
//! ```
//!
//! `config` and `tabs` are mandatory; everything else defaults when missing
//! and unknown fields are ignored.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

use crate::classpath::Classpath;
use crate::entry::{ClassLocation, ClasspathEntry};
use crate::error::BrowserError;
use crate::history::NavigationHistory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    None,
    Horizontal,
    Vertical,
}

impl SplitMode {
    pub fn layout(self) -> Value {
        match self {
            Self::None => Value::Null,
            Self::Horizontal => json!({ "split": "horizontal", "ratios": [0.5] }),
            Self::Vertical => json!({ "split": "vertical", "ratios": [0.5] }),
        }
    }

    pub fn from_layout(layout: &Value) -> Self {
        match layout.get("split").and_then(Value::as_str) {
            Some("horizontal") => Self::Horizontal,
            Some("vertical") => Self::Vertical,
            _ => Self::None,
        }
    }
}

/// One open tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSession {
    /// Class the tab was opened on.
    pub location: ClassLocation,
    #[serde(default)]
    pub history: NavigationHistory,
    /// Split descriptor owned by the viewer, passed through unchanged.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub layout: Value,
}

impl ViewSession {
    pub fn new(location: ClassLocation) -> Self {
        Self {
            history: NavigationHistory::with_initial(location.clone()),
            location,
            layout: Value::Null,
        }
    }

    /// Class currently shown, falling back to the opening location.
    pub fn current_location(&self) -> &ClassLocation {
        self.history
            .current()
            .map(|e| &e.location)
            .unwrap_or(&self.location)
    }

    /// Records a visit, seeding an empty history with the opening location.
    pub fn visit(&mut self, location: ClassLocation) {
        if self.history.is_empty() {
            self.history.visit(self.location.clone());
        }
        self.history.visit(location);
    }

    pub fn split(&mut self, mode: SplitMode) {
        self.layout = mode.layout();
    }

    pub fn split_mode(&self) -> SplitMode {
        SplitMode::from_layout(&self.layout)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub classpath: Classpath,
    tabs: Vec<ViewSession>,
    active_tab_index: usize,
}

#[derive(Serialize, Deserialize)]
struct SessionDocument {
    workspace: WorkspaceNode,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkspaceNode {
    config: Vec<ClasspathEntry>,
    tabs: Vec<ViewSession>,
    #[serde(default)]
    active_tab_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    module_root: Option<PathBuf>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tabs(&self) -> &[ViewSession] {
        &self.tabs
    }

    pub fn tab(&self, index: usize) -> Option<&ViewSession> {
        self.tabs.get(index)
    }

    pub fn tab_mut(&mut self, index: usize) -> Option<&mut ViewSession> {
        self.tabs.get_mut(index)
    }

    /// Opens a tab on `location`, makes it active and returns its index.
    pub fn open_tab(&mut self, location: ClassLocation) -> usize {
        self.tabs.push(ViewSession::new(location));
        self.active_tab_index = self.tabs.len() - 1;
        self.active_tab_index
    }

    pub fn close_tab(&mut self, index: usize) -> Option<ViewSession> {
        if index >= self.tabs.len() {
            return None;
        }
        let closed = self.tabs.remove(index);
        if self.active_tab_index > index || self.active_tab_index >= self.tabs.len() {
            self.active_tab_index = self.active_tab_index.saturating_sub(1);
        }
        Some(closed)
    }

    pub fn close_all_tabs(&mut self) {
        self.tabs.clear();
        self.active_tab_index = 0;
    }

    pub fn select_tab(&mut self, index: usize) -> bool {
        if index >= self.tabs.len() {
            return false;
        }
        self.active_tab_index = index;
        true
    }

    pub fn active_tab_index(&self) -> Option<usize> {
        (self.active_tab_index < self.tabs.len()).then_some(self.active_tab_index)
    }

    pub fn active_tab(&self) -> Option<&ViewSession> {
        self.tabs.get(self.active_tab_index)
    }

    pub fn active_tab_mut(&mut self) -> Option<&mut ViewSession> {
        self.tabs.get_mut(self.active_tab_index)
    }

    /// Resets to an empty workspace.
    pub fn clear(&mut self) {
        self.close_all_tabs();
        self.classpath.clear();
    }

    /// Serializes the session. Equal sessions produce identical documents.
    pub fn to_document(&self) -> Result<String, BrowserError> {
        let document = SessionDocument {
            workspace: WorkspaceNode {
                config: self.classpath.entries().to_vec(),
                tabs: self.tabs.clone(),
                active_tab_index: self.active_tab_index,
                module_root: self.classpath.module_root().map(PathBuf::from),
            },
        };
        let mut text = serde_json::to_string_pretty(&document)
            .map_err(|e| BrowserError::malformed(format!("cannot encode session: {e}")))?;
        text.push('\n');
        Ok(text)
    }

    pub fn from_document(text: &str) -> Result<Self, BrowserError> {
        let document: SessionDocument =
            serde_json::from_str(text).map_err(|e| BrowserError::malformed(e.to_string()))?;
        let WorkspaceNode {
            config,
            mut tabs,
            active_tab_index,
            module_root,
        } = document.workspace;

        let mut classpath = Classpath::from_entries(config);
        classpath.set_module_root(module_root.as_deref());

        for (i, tab) in tabs.iter_mut().enumerate() {
            if tab.history.clamp_index() {
                tracing::warn!(tab = i, "history index out of range, moved to last entry");
            }
        }

        let mut session = Self {
            classpath,
            tabs,
            active_tab_index,
        };
        if session.active_tab_index >= session.tabs.len() && session.active_tab_index != 0 {
            tracing::warn!(
                index = session.active_tab_index,
                tabs = session.tabs.len(),
                "active tab index out of range, reset to first tab"
            );
            session.active_tab_index = 0;
        }
        Ok(session)
    }

    /// SHA-256 of the serialized session, used to detect unsaved changes.
    pub fn fingerprint(&self) -> Result<String, BrowserError> {
        let mut hasher = Sha256::new();
        hasher.update(self.to_document()?.as_bytes());
        Ok(hex::encode(hasher.finalize()))
    }
}
