// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod governance;
pub mod manager;
pub mod queue;
pub mod server;
pub mod session;

// Re-export the service surface for convenience
pub use governance::SecurityGovernance;
pub use manager::{OrchestrationManager, ServerExecution};
pub use queue::TaskQueue;
pub use server::ComputationServer;
pub use session::SessionRunner;
