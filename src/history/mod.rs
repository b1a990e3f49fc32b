// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowstate-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowstate and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Bounded undo/redo over whole-state snapshots.
//!
//! Both stacks keep the most recent snapshot at the front. `current` is the snapshot taken after
//! the last completed edit or navigation; it is what the opposite stack receives on the next
//! undo/redo.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::model::FlowMap;

pub const DEFAULT_HISTORY_CAPACITY: usize = 25;

/// Point-in-time copy of the editable part of the store. Flows are shared, not deep-copied.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub current_flow: Option<String>,
    pub current_flow_node: Option<String>,
    pub flows: Arc<FlowMap>,
}

#[derive(Debug, Clone)]
pub struct History {
    capacity: usize,
    undo: VecDeque<Snapshot>,
    redo: VecDeque<Snapshot>,
    current: Option<Snapshot>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            current: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Undo snapshots, most recent first.
    pub fn undo_stack(&self) -> impl Iterator<Item = &Snapshot> {
        self.undo.iter()
    }

    /// Redo snapshots, most recent first.
    pub fn redo_stack(&self) -> impl Iterator<Item = &Snapshot> {
        self.redo.iter()
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.current.as_ref()
    }

    /// Records the state an edit is about to replace. Starts a new branch: redo is dropped.
    pub fn record_before(&mut self, snapshot: Snapshot) {
        push_bounded(&mut self.undo, snapshot, self.capacity);
        self.redo.clear();
    }

    /// Records the state after an edit or navigation completed.
    pub fn record_after(&mut self, snapshot: Snapshot) {
        self.current = Some(snapshot);
    }

    /// Pops the state to restore, parking the current snapshot on the redo stack.
    /// `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<Snapshot> {
        let target = self.undo.pop_front()?;
        if let Some(current) = self.current.take() {
            push_bounded(&mut self.redo, current, self.capacity);
        }
        Some(target)
    }

    /// Mirror of `undo`.
    pub fn redo(&mut self) -> Option<Snapshot> {
        let target = self.redo.pop_front()?;
        if let Some(current) = self.current.take() {
            push_bounded(&mut self.undo, current, self.capacity);
        }
        Some(target)
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.current = None;
    }
}

fn push_bounded(stack: &mut VecDeque<Snapshot>, snapshot: Snapshot, capacity: usize) {
    stack.push_front(snapshot);
    stack.truncate(capacity);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{History, Snapshot};
    use crate::model::FlowMap;

    fn snap(tag: &str) -> Snapshot {
        Snapshot {
            current_flow: Some(tag.to_owned()),
            current_flow_node: None,
            flows: Arc::new(FlowMap::new()),
        }
    }

    fn tags<'a>(stack: impl Iterator<Item = &'a Snapshot>) -> Vec<String> {
        stack.filter_map(|s| s.current_flow.clone()).collect()
    }

    #[test]
    fn undo_on_empty_history_is_a_no_op() {
        let mut history = History::default();
        history.record_after(snap("a"));
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), None);
        assert_eq!(history.current(), Some(&snap("a")));
    }

    #[test]
    fn undo_stack_is_bounded_and_keeps_most_recent_first() {
        let mut history = History::new(3);
        for tag in ["a", "b", "c", "d", "e"] {
            history.record_before(snap(tag));
        }
        assert_eq!(history.undo_len(), 3);
        assert_eq!(tags(history.undo_stack()), vec!["e", "d", "c"]);
    }

    #[test]
    fn undo_parks_current_on_redo_and_new_edits_clear_it() {
        let mut history = History::default();
        history.record_after(snap("s0"));
        history.record_before(snap("s0"));
        history.record_after(snap("s1"));

        assert_eq!(history.undo(), Some(snap("s0")));
        history.record_after(snap("s0"));
        assert_eq!(tags(history.redo_stack()), vec!["s1"]);
        assert!(!history.can_undo());

        assert_eq!(history.redo(), Some(snap("s1")));
        history.record_after(snap("s1"));
        assert_eq!(tags(history.undo_stack()), vec!["s0"]);
        assert!(!history.can_redo());

        history.undo();
        history.record_after(snap("s0"));
        history.record_before(snap("s0"));
        assert!(!history.can_redo());
    }
}
