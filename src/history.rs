use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entry::ClassLocation;

/// A visited class plus whatever view state the viewer attached to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationEntry {
    pub location: ClassLocation,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub state: Value,
}

impl NavigationEntry {
    pub fn new(location: ClassLocation) -> Self {
        Self {
            location,
            state: Value::Null,
        }
    }
}

/// Enabled state of the back and forward controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct NavigationControls {
    pub back: bool,
    pub forward: bool,
}

/// Browser-style back/forward history of one view.
///
/// `index` always points at an existing entry while the history is
/// non-empty. Visiting a new location from the middle of the history drops
/// everything after the current entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationHistory {
    #[serde(default)]
    entries: Vec<NavigationEntry>,
    #[serde(default)]
    index: usize,
}

impl NavigationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial(location: ClassLocation) -> Self {
        let mut history = Self::new();
        history.visit(location);
        history
    }

    pub fn visit(&mut self, location: ClassLocation) {
        self.visit_with_state(location, Value::Null);
    }

    /// Drops forward history, then appends `location` unless it is already
    /// the current entry.
    pub fn visit_with_state(&mut self, location: ClassLocation, state: Value) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        if self.current().is_some_and(|e| e.location == location) {
            if !state.is_null() {
                self.update_current_state(state);
            }
            return;
        }
        self.entries.push(NavigationEntry { location, state });
        self.index = self.entries.len() - 1;
    }

    pub fn back(&mut self) -> Option<&NavigationEntry> {
        if !self.can_go_back() {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index)
    }

    pub fn forward(&mut self) -> Option<&NavigationEntry> {
        if !self.can_go_forward() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index)
    }

    pub fn can_go_back(&self) -> bool {
        self.index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn controls(&self) -> NavigationControls {
        NavigationControls {
            back: self.can_go_back(),
            forward: self.can_go_forward(),
        }
    }

    pub fn current(&self) -> Option<&NavigationEntry> {
        self.entries.get(self.index)
    }

    pub fn update_current_state(&mut self, state: Value) {
        if let Some(entry) = self.entries.get_mut(self.index) {
            entry.state = state;
        }
    }

    pub fn entries(&self) -> &[NavigationEntry] {
        &self.entries
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = 0;
    }

    /// Pulls an out-of-range index back onto the last entry.
    pub(crate) fn clamp_index(&mut self) -> bool {
        let max = self.entries.len().saturating_sub(1);
        if self.index > max {
            self.index = max;
            return true;
        }
        false
    }
}
