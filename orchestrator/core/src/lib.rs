// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # AEGIS MPC Core
//!
//! Orchestration, scheduling, and governance harness around a pluggable
//! (here, simulated) secure multi-party computation backend.
//!
//! # Architecture
//!
//! - **domain** — plain-data types: parties, sessions, policies, tasks,
//!   audit entries, errors
//! - **application** — services: the session state machine, per-server task
//!   queues with autonomous drain, security governance, and the manager
//! - **infrastructure** — pluggable collaborators: party transport,
//!   protocol strategy, task event bus

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::{OrchestrationManager, SecurityGovernance, ServerExecution};
pub use config::OrchestratorConfig;
