// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Append-only bounded audit trail of governance decisions.
//!
//! Entries are immutable once appended. Retention is capped: when the log
//! grows past its capacity the oldest entries are dropped, so the log is a
//! bounded FIFO rather than a permanent store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use uuid::Uuid;

pub const DEFAULT_AUDIT_CAPACITY: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuditEntryId(pub Uuid);

impl AuditEntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AuditEntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AuditEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub details: serde_json::Value,
}

impl AuditEntry {
    pub fn new(event_type: impl Into<String>, details: serde_json::Value) -> Self {
        Self {
            id: AuditEntryId::new(),
            timestamp: Utc::now(),
            event_type: event_type.into(),
            details,
        }
    }
}

#[derive(Debug)]
pub struct AuditLog {
    entries: VecDeque<AuditEntry>,
    capacity: usize,
}

impl AuditLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_AUDIT_CAPACITY)),
            capacity,
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_AUDIT_CAPACITY)
    }

    pub fn append(&mut self, entry: AuditEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest-first iteration over the retained entries.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &AuditEntry> {
        self.entries.iter()
    }

    pub fn snapshot(&self) -> Vec<AuditEntry> {
        self.entries.iter().cloned().collect()
    }

    /// The most recent `count` entries, newest first.
    pub fn recent(&self, count: usize) -> Vec<AuditEntry> {
        self.entries.iter().rev().take(count).cloned().collect()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_append_within_capacity() {
        let mut log = AuditLog::new(3);
        log.append(AuditEntry::new("a", json!({})));
        log.append(AuditEntry::new("b", json!({})));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_oldest_evicted_at_capacity() {
        let mut log = AuditLog::new(3);
        for label in ["a", "b", "c", "d"] {
            log.append(AuditEntry::new(label, json!({})));
        }
        assert_eq!(log.len(), 3);
        let kinds: Vec<_> = log.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(kinds, ["b", "c", "d"]);
    }

    #[test]
    fn test_default_capacity_holds_exactly_one_thousand() {
        let mut log = AuditLog::with_default_capacity();
        for i in 0..1001 {
            log.append(AuditEntry::new("tick", json!({ "seq": i })));
        }
        assert_eq!(log.len(), DEFAULT_AUDIT_CAPACITY);
        // the first entry was evicted by the 1001st append
        assert_eq!(log.iter().next().unwrap().details["seq"], 1);
    }

    #[test]
    fn test_recent_is_newest_first() {
        let mut log = AuditLog::new(10);
        for label in ["a", "b", "c"] {
            log.append(AuditEntry::new(label, json!({})));
        }
        let recent = log.recent(2);
        assert_eq!(recent[0].event_type, "c");
        assert_eq!(recent[1].event_type, "b");
    }
}
