// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod event_bus;
pub mod protocol;
pub mod transport;

pub use event_bus::{TaskEvent, TaskEventBus, TaskEventReceiver};
pub use protocol::{ProtocolStrategy, SimulatedSecretSharing};
pub use transport::{PartyTransport, SimulatedPartyNetwork};
