// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartyId(pub Uuid);

impl PartyId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PartyId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A participant in a computation round. Identity is the id; the
/// authentication flag is asserted by whoever registered the party.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    pub id: PartyId,
    pub display_name: String,
    pub authenticated: bool,
}

impl Party {
    pub fn authenticated(display_name: impl Into<String>) -> Self {
        Self {
            id: PartyId::new(),
            display_name: display_name.into(),
            authenticated: true,
        }
    }

    pub fn unauthenticated(display_name: impl Into<String>) -> Self {
        Self {
            id: PartyId::new(),
            display_name: display_name.into(),
            authenticated: false,
        }
    }
}

impl PartialEq for Party {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Party {}
