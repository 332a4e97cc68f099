// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Priority-ordered backlog of pending computation requests, one per server.
//!
//! The backlog stays sorted by priority descending. A new entry is inserted
//! immediately before the first existing entry whose priority is strictly
//! lower, never before an equal-priority entry, so enqueue order is
//! preserved among equal priorities.

use parking_lot::Mutex;

use crate::domain::task::{TaskEntry, TaskId};

#[derive(Default)]
pub struct TaskQueue {
    entries: Mutex<Vec<TaskEntry>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, task: &str, input_data: serde_json::Value, priority: i32) -> TaskId {
        let entry = TaskEntry::new(task, input_data, priority);
        let id = entry.id;
        let mut entries = self.entries.lock();
        let position = entries
            .iter()
            .position(|existing| existing.priority < priority)
            .unwrap_or(entries.len());
        entries.insert(position, entry);
        id
    }

    /// Remove and return the head of the backlog.
    pub(crate) fn pop(&self) -> Option<TaskEntry> {
        let mut entries = self.entries.lock();
        if entries.is_empty() {
            None
        } else {
            Some(entries.remove(0))
        }
    }

    /// Remove a still-queued entry. A task already handed to the drain loop
    /// is out of reach.
    pub fn cancel(&self, id: TaskId) -> Option<TaskEntry> {
        let mut entries = self.entries.lock();
        let position = entries.iter().position(|entry| entry.id == id)?;
        Some(entries.remove(position))
    }

    /// Drop every queued entry, returning how many were dropped.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.lock();
        let dropped = entries.len();
        entries.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Queued entries in drain order.
    pub fn pending(&self) -> Vec<TaskEntry> {
        self.entries.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_higher_priority_drains_first() {
        let queue = TaskQueue::new();
        queue.enqueue("low", json!({}), 1);
        queue.enqueue("high", json!({}), 5);
        queue.enqueue("mid", json!({}), 3);

        let order: Vec<_> = queue.pending().iter().map(|e| e.task.clone()).collect();
        assert_eq!(order, ["high", "mid", "low"]);
    }

    #[test]
    fn test_equal_priorities_keep_enqueue_order() {
        let queue = TaskQueue::new();
        let first = queue.enqueue("first", json!({}), 2);
        let second = queue.enqueue("second", json!({}), 2);
        let third = queue.enqueue("third", json!({}), 2);

        let order: Vec<_> = queue.pending().iter().map(|e| e.id).collect();
        assert_eq!(order, [first, second, third]);
    }

    #[test]
    fn test_pop_returns_head_and_removes_it() {
        let queue = TaskQueue::new();
        queue.enqueue("only", json!({}), 0);

        let entry = queue.pop().unwrap();
        assert_eq!(entry.task, "only");
        assert!(queue.is_empty());
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_cancel_removes_only_the_named_entry() {
        let queue = TaskQueue::new();
        let keep = queue.enqueue("keep", json!({}), 0);
        let drop = queue.enqueue("drop", json!({}), 0);

        let removed = queue.cancel(drop).unwrap();
        assert_eq!(removed.id, drop);
        assert!(queue.cancel(drop).is_none());
        assert_eq!(queue.pending()[0].id, keep);
    }

    #[test]
    fn test_clear_reports_dropped_count() {
        let queue = TaskQueue::new();
        queue.enqueue("a", json!({}), 0);
        queue.enqueue("b", json!({}), 0);
        assert_eq!(queue.clear(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_negative_priorities_sort_below_default() {
        let queue = TaskQueue::new();
        queue.enqueue("late", json!({}), -1);
        queue.enqueue("normal", json!({}), 0);

        let order: Vec<_> = queue.pending().iter().map(|e| e.task.clone()).collect();
        assert_eq!(order, ["normal", "late"]);
    }
}
