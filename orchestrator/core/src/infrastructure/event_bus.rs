// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Task Event Bus - Pub/Sub for terminal task entries
//
// The task queue discards entries once they reach a terminal state, so the
// only way for callers to capture a completed or failed task is to observe
// it here at completion time. In-memory only; events are lost on restart.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::task::TaskEntry;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEvent {
    TaskCompleted { entry: TaskEntry },
    TaskFailed { entry: TaskEntry },
}

impl TaskEvent {
    pub fn entry(&self) -> &TaskEntry {
        match self {
            Self::TaskCompleted { entry } | Self::TaskFailed { entry } => entry,
        }
    }
}

/// Broadcast channel for terminal task entries, one per server.
#[derive(Clone)]
pub struct TaskEventBus {
    sender: Arc<broadcast::Sender<TaskEvent>>,
}

impl TaskEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(256)
    }

    pub fn publish(&self, event: TaskEvent) {
        debug!(task_id = %event.entry().id, "publishing task event");
        // send() only errors when nobody is subscribed
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> TaskEventReceiver {
        TaskEventReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for TaskEventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

pub struct TaskEventReceiver {
    receiver: broadcast::Receiver<TaskEvent>,
}

impl TaskEventReceiver {
    /// Receive the next task event, waiting until one is published.
    pub async fn recv(&mut self) -> Result<TaskEvent, TaskEventBusError> {
        self.receiver.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => TaskEventBusError::Closed,
            broadcast::error::RecvError::Lagged(n) => TaskEventBusError::Lagged(n),
        })
    }

    pub fn try_recv(&mut self) -> Result<TaskEvent, TaskEventBusError> {
        self.receiver.try_recv().map_err(|e| match e {
            broadcast::error::TryRecvError::Empty => TaskEventBusError::Empty,
            broadcast::error::TryRecvError::Closed => TaskEventBusError::Closed,
            broadcast::error::TryRecvError::Lagged(n) => TaskEventBusError::Lagged(n),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TaskEventBusError {
    #[error("task event bus is closed")]
    Closed,

    #[error("no task events available")]
    Empty,

    #[error("receiver lagged by {0} events (events were dropped)")]
    Lagged(u64),
}
