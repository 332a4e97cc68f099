// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::session::ComputationOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

/// One queued computation request. Owned exclusively by a single server's
/// task queue; once terminal it is discarded from the queue, so callers
/// needing history must capture the published entry at completion time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEntry {
    pub id: TaskId,
    pub task: String,
    pub input_data: serde_json::Value,
    pub priority: i32,
    pub enqueued_at: DateTime<Utc>,
    pub status: TaskStatus,
    pub result: Option<ComputationOutcome>,
    pub error: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskEntry {
    pub fn new(task: impl Into<String>, input_data: serde_json::Value, priority: i32) -> Self {
        Self {
            id: TaskId::new(),
            task: task.into(),
            input_data,
            priority,
            enqueued_at: Utc::now(),
            status: TaskStatus::Queued,
            result: None,
            error: None,
            completed_at: None,
        }
    }

    pub fn mark_processing(&mut self) {
        self.status = TaskStatus::Processing;
    }

    pub fn complete(&mut self, outcome: ComputationOutcome) {
        self.status = TaskStatus::Completed;
        self.result = Some(outcome);
        self.completed_at = Some(Utc::now());
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = TaskStatus::Failed;
        self.error = Some(error.into());
        self.completed_at = Some(Utc::now());
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, TaskStatus::Completed | TaskStatus::Failed)
    }
}
