use std::collections::HashMap;

pub type WindowId = u64;

/// A live top-level view and the order in which it was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle {
    pub id: WindowId,
    pub seq: u64,
}

/// Live windows in creation order, for cyclic next/previous switching.
///
/// Slots are append-only; unregistering leaves a tombstone that is compacted
/// away once tombstones outnumber live windows.
#[derive(Debug, Default)]
pub struct WindowRegistry {
    slots: Vec<Option<WindowHandle>>,
    positions: HashMap<WindowId, usize>,
    next_id: WindowId,
    next_seq: u64,
    last_seq: Option<u64>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and registers a handle for a newly opened window.
    pub fn open(&mut self) -> WindowHandle {
        let handle = WindowHandle {
            id: self.next_id,
            seq: self.next_seq,
        };
        self.register(handle);
        handle
    }

    /// Registers `handle`. Handles must arrive in increasing `seq` order;
    /// an already registered id is ignored.
    pub fn register(&mut self, handle: WindowHandle) -> bool {
        if self.positions.contains_key(&handle.id) {
            return false;
        }
        if self.last_seq.is_some_and(|last| handle.seq <= last) {
            tracing::warn!(id = handle.id, seq = handle.seq, "window registered out of creation order");
            return false;
        }
        let (Some(next_id), Some(next_seq)) = (handle.id.checked_add(1), handle.seq.checked_add(1))
        else {
            tracing::warn!(id = handle.id, seq = handle.seq, "window handle exhausts id space");
            return false;
        };
        self.next_id = self.next_id.max(next_id);
        self.next_seq = self.next_seq.max(next_seq);
        self.last_seq = Some(handle.seq);
        self.positions.insert(handle.id, self.slots.len());
        self.slots.push(Some(handle));
        true
    }

    pub fn unregister(&mut self, id: WindowId) -> bool {
        let Some(pos) = self.positions.remove(&id) else {
            return false;
        };
        self.slots[pos] = None;
        if self.slots.len() > 2 * self.positions.len() {
            self.compact();
        }
        true
    }

    pub fn next(&self, current: WindowId) -> Option<WindowHandle> {
        let pos = *self.positions.get(&current)?;
        let n = self.slots.len();
        (1..=n).find_map(|step| self.slots[(pos + step) % n])
    }

    pub fn previous(&self, current: WindowId) -> Option<WindowHandle> {
        let pos = *self.positions.get(&current)?;
        let n = self.slots.len();
        (1..=n).find_map(|step| self.slots[(pos + n - step) % n])
    }

    pub fn get(&self, id: WindowId) -> Option<WindowHandle> {
        self.positions.get(&id).and_then(|pos| self.slots[*pos])
    }

    pub fn has_multiple(&self) -> bool {
        self.positions.len() > 1
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn live(&self) -> impl Iterator<Item = WindowHandle> + '_ {
        self.slots.iter().flatten().copied()
    }

    /// Most recently created live window.
    pub fn newest(&self) -> Option<WindowHandle> {
        self.slots.iter().rev().flatten().next().copied()
    }

    fn compact(&mut self) {
        self.slots.retain(Option::is_some);
        for (pos, slot) in self.slots.iter().enumerate() {
            if let Some(handle) = slot {
                self.positions.insert(handle.id, pos);
            }
        }
    }
}
