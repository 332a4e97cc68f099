// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Computation Server
//!
//! Owns a party roster, one task queue, and at most one live computation
//! session at a time. The single live-session slot is the cancellation
//! mechanism: starting a new computation supersedes the previous session's
//! identity, and an explicit cancel clears the slot. No abort signal is sent
//! to in-flight simulated steps; a superseded session simply loses the right
//! to write its aggregate back.
//!
//! In autonomous mode, enqueued tasks are drained and executed without
//! per-task caller action. The drain loop is guarded so only one runs per
//! server regardless of how many enqueues race to wake it.

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::sync::{Arc, Weak};
use tracing::{debug, info};

use crate::application::queue::TaskQueue;
use crate::application::session::SessionRunner;
use crate::config::OrchestratorConfig;
use crate::domain::party::{Party, PartyId};
use crate::domain::session::{ComputationId, ComputationOutcome, ComputationSession};
use crate::domain::task::TaskId;
use crate::infrastructure::event_bus::{TaskEvent, TaskEventBus, TaskEventReceiver};
use crate::infrastructure::protocol::{ProtocolStrategy, SimulatedSecretSharing};
use crate::infrastructure::transport::{PartyTransport, SimulatedPartyNetwork};

/// The most recently started session and, once it finishes, its aggregate.
#[derive(Debug, Clone, Copy)]
pub struct LiveSession {
    pub computation_id: ComputationId,
    pub aggregated_result: Option<f64>,
}

pub struct ComputationServer {
    name: String,
    autonomous: bool,
    parties: RwLock<Vec<Party>>,
    queue: TaskQueue,
    runner: SessionRunner,
    live: Mutex<Option<LiveSession>>,
    drain_guard: tokio::sync::Mutex<()>,
    events: TaskEventBus,
    queue_pacing: std::time::Duration,
    // handle back to the owning Arc, for spawning the drain loop
    self_handle: Weak<ComputationServer>,
}

impl ComputationServer {
    pub fn new(
        name: impl Into<String>,
        parties: Vec<Party>,
        autonomous: bool,
        config: &OrchestratorConfig,
    ) -> Arc<Self> {
        Self::with_collaborators(
            name,
            parties,
            autonomous,
            config,
            Arc::new(SimulatedPartyNetwork::from_config(config)),
            Arc::new(SimulatedSecretSharing),
        )
    }

    /// Construct with explicit transport/protocol collaborators. This is the
    /// seam that lets a real backend (or a scripted test double) replace the
    /// simulated one without touching the server.
    pub fn with_collaborators(
        name: impl Into<String>,
        parties: Vec<Party>,
        autonomous: bool,
        config: &OrchestratorConfig,
        transport: Arc<dyn PartyTransport>,
        protocol: Arc<dyn ProtocolStrategy>,
    ) -> Arc<Self> {
        let name = name.into();
        Arc::new_cyclic(|weak| Self {
            name,
            autonomous,
            parties: RwLock::new(parties),
            queue: TaskQueue::new(),
            runner: SessionRunner::new(protocol, transport, config.computation_delay()),
            live: Mutex::new(None),
            drain_guard: tokio::sync::Mutex::new(()),
            events: TaskEventBus::with_default_capacity(),
            queue_pacing: config.queue_pacing(),
            self_handle: weak.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_autonomous(&self) -> bool {
        self.autonomous
    }

    pub fn parties(&self) -> Vec<Party> {
        self.parties.read().clone()
    }

    pub fn party_count(&self) -> usize {
        self.parties.read().len()
    }

    pub fn add_party(&self, party: Party) {
        debug!(server = %self.name, party_id = %party.id, "party registered");
        self.parties.write().push(party);
    }

    pub fn remove_party(&self, party_id: PartyId) -> Option<Party> {
        let mut parties = self.parties.write();
        let position = parties.iter().position(|party| party.id == party_id)?;
        Some(parties.remove(position))
    }

    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    /// Identity of the most recently started session, if not cancelled.
    pub fn current_computation(&self) -> Option<ComputationId> {
        self.live.lock().as_ref().map(|live| live.computation_id)
    }

    /// Aggregate of the last completed session, if its slot survived.
    pub fn last_result(&self) -> Option<f64> {
        self.live.lock().as_ref().and_then(|live| live.aggregated_result)
    }

    /// Observe terminal task entries from the autonomous drain loop.
    pub fn subscribe_tasks(&self) -> TaskEventReceiver {
        self.events.subscribe()
    }

    /// Execute one secure computation against the current roster. Protocol
    /// failures are captured into the returned outcome, never raised.
    pub async fn execute_secure_computation(&self, task: &str, input: &Value) -> ComputationOutcome {
        let parties = self.parties.read().clone();
        let mut session = ComputationSession::new(task, parties);
        let computation_id = session.id();

        // Taking the slot supersedes any previous session and clears its
        // stored aggregate.
        *self.live.lock() = Some(LiveSession {
            computation_id,
            aggregated_result: None,
        });

        let outcome = self.runner.run(&mut session, input).await;

        // The aggregate is written back only if the slot still names this
        // session; a cancel or supersession in the meantime detached it.
        if let ComputationOutcome::Success { result, .. } = &outcome {
            let mut live = self.live.lock();
            match live.as_mut() {
                Some(slot) if slot.computation_id == computation_id => {
                    slot.aggregated_result = Some(*result);
                }
                _ => debug!(
                    server = %self.name,
                    computation_id = %computation_id,
                    "session detached before completion; aggregate discarded"
                ),
            }
        }
        outcome
    }

    /// Best-effort cancellation: clears the live-session slot when it names
    /// the given computation. In-flight simulated steps are not interrupted.
    pub fn cancel_session(&self, computation_id: ComputationId) -> bool {
        let mut live = self.live.lock();
        match *live {
            Some(slot) if slot.computation_id == computation_id => {
                info!(server = %self.name, computation_id = %computation_id, "session cancelled");
                *live = None;
                true
            }
            _ => false,
        }
    }

    /// Queue a computation for later execution. In autonomous mode this
    /// wakes the drain loop; a drain already running absorbs the new entry.
    pub fn enqueue(&self, task: &str, input_data: Value, priority: i32) -> TaskId {
        let id = self.queue.enqueue(task, input_data, priority);
        debug!(server = %self.name, task_id = %id, priority, "task enqueued");
        if self.autonomous {
            if let Some(server) = self.self_handle.upgrade() {
                tokio::spawn(async move {
                    server.drain().await;
                });
            }
        }
        id
    }

    /// Drain loop. The guard admits exactly one drain per server; wake-ups
    /// that lose the race exit immediately. After the backlog empties the
    /// guard is released and the queue re-checked, closing the window where
    /// a concurrent enqueue saw the guard still held.
    async fn drain(&self) {
        loop {
            let Ok(_guard) = self.drain_guard.try_lock() else {
                return;
            };
            while let Some(mut entry) = self.queue.pop() {
                entry.mark_processing();
                debug!(server = %self.name, task_id = %entry.id, "task processing");

                let task = entry.task.clone();
                let input = entry.input_data.clone();
                let outcome = self.execute_secure_computation(&task, &input).await;

                let event = match outcome {
                    ComputationOutcome::Error { ref error, .. } => {
                        entry.fail(error.clone());
                        TaskEvent::TaskFailed { entry }
                    }
                    success => {
                        entry.complete(success);
                        TaskEvent::TaskCompleted { entry }
                    }
                };
                self.events.publish(event);

                tokio::time::sleep(self.queue_pacing).await;
            }
            drop(_guard);
            if self.queue.is_empty() {
                return;
            }
        }
    }
}
