// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Orchestration Manager
//!
//! Front door of the MPC core: owns the named computation servers and the
//! governance instance, validates every operation before it reaches a
//! server, and fans requests out to one or all servers. Policy blocks and
//! unknown names are raised to the caller; protocol failures stay inside
//! the per-server outcome so a batch keeps going.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::governance::SecurityGovernance;
use crate::application::server::ComputationServer;
use crate::config::OrchestratorConfig;
use crate::domain::audit::AuditEntry;
use crate::domain::errors::OrchestrationError;
use crate::domain::party::Party;
use crate::domain::policy::{SecurityPolicy, ValidationRequest, ValidationResult};
use crate::domain::security::{ComplianceReport, SecureKeys, SecurityReport};
use crate::domain::session::{ComputationId, ComputationOutcome};
use crate::infrastructure::protocol::ProtocolStrategy;
use crate::infrastructure::transport::PartyTransport;

/// Per-server record of an `execute_all` fan-out. A protocol failure still
/// lands in `Completed` (with an error-valued outcome); `Rejected` means the
/// operation never reached the session — a policy block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ServerExecution {
    Completed {
        server: String,
        outcome: ComputationOutcome,
    },
    Rejected {
        server: String,
        error: String,
    },
}

impl ServerExecution {
    pub fn server(&self) -> &str {
        match self {
            Self::Completed { server, .. } | Self::Rejected { server, .. } => server,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

pub struct OrchestrationManager {
    config: OrchestratorConfig,
    servers: RwLock<HashMap<String, Arc<ComputationServer>>>,
    governance: Arc<SecurityGovernance>,
}

impl OrchestrationManager {
    pub fn new() -> Self {
        Self::with_config(OrchestratorConfig::default())
    }

    pub fn with_config(config: OrchestratorConfig) -> Self {
        let governance = Arc::new(SecurityGovernance::new(config.audit_capacity));
        install_default_policies(&governance);
        Self {
            config,
            servers: RwLock::new(HashMap::new()),
            governance,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn governance(&self) -> &Arc<SecurityGovernance> {
        &self.governance
    }

    /// Register a server under a unique name; an existing server under the
    /// same name is replaced.
    pub fn create_server(
        &self,
        name: &str,
        parties: Vec<Party>,
        autonomous: bool,
    ) -> Arc<ComputationServer> {
        let server = ComputationServer::new(name, parties, autonomous, &self.config);
        self.register(name, Arc::clone(&server));
        server
    }

    /// Register a server with explicit transport/protocol collaborators.
    pub fn create_server_with(
        &self,
        name: &str,
        parties: Vec<Party>,
        autonomous: bool,
        transport: Arc<dyn PartyTransport>,
        protocol: Arc<dyn ProtocolStrategy>,
    ) -> Arc<ComputationServer> {
        let server = ComputationServer::with_collaborators(
            name,
            parties,
            autonomous,
            &self.config,
            transport,
            protocol,
        );
        self.register(name, Arc::clone(&server));
        server
    }

    fn register(&self, name: &str, server: Arc<ComputationServer>) {
        let replaced = self
            .servers
            .write()
            .insert(name.to_string(), server)
            .is_some();
        if replaced {
            warn!(server = %name, "existing computation server replaced");
        } else {
            info!(server = %name, "computation server registered");
        }
    }

    pub fn get_server(&self, name: &str) -> Option<Arc<ComputationServer>> {
        self.servers.read().get(name).cloned()
    }

    /// Registered server names, sorted.
    pub fn list_servers(&self) -> Vec<String> {
        let mut names: Vec<_> = self.servers.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn remove_server(&self, name: &str) -> Result<(), OrchestrationError> {
        self.servers
            .write()
            .remove(name)
            .map(|_| info!(server = %name, "computation server removed"))
            .ok_or_else(|| OrchestrationError::ServerNotFound(name.to_string()))
    }

    /// Validate the operation against the server's current roster, then run
    /// one secure computation on that server. A failing policy blocks the
    /// call before any session starts.
    pub async fn execute_on(
        &self,
        server_name: &str,
        task: &str,
        input: &Value,
        sensitivity: &str,
    ) -> Result<ComputationOutcome, OrchestrationError> {
        let server = self
            .get_server(server_name)
            .ok_or_else(|| OrchestrationError::ServerNotFound(server_name.to_string()))?;

        // Operations dispatched here run over the simulated secure channel,
        // so they are marked encrypted for policy purposes.
        let request =
            ValidationRequest::new(task, server.parties(), sensitivity).encrypted();
        let results = self.governance.validate(&request);
        let violations = collect_violations(&results);
        if !violations.is_empty() {
            warn!(
                server = %server_name,
                task,
                violation_count = violations.len(),
                "execution blocked by policy"
            );
            return Err(OrchestrationError::PolicyViolation { violations });
        }

        Ok(server.execute_secure_computation(task, input).await)
    }

    /// Run the validated flow independently against every registered
    /// server. One record per server; a failure on one never prevents
    /// attempting the others.
    pub async fn execute_all(
        &self,
        task: &str,
        input: &Value,
        sensitivity: &str,
    ) -> Vec<ServerExecution> {
        let names = self.list_servers();
        let executions = names.into_iter().map(|name| async move {
            match self.execute_on(&name, task, input, sensitivity).await {
                Ok(outcome) => ServerExecution::Completed {
                    server: name,
                    outcome,
                },
                Err(err) => ServerExecution::Rejected {
                    server: name,
                    error: err.to_string(),
                },
            }
        });
        futures::future::join_all(executions).await
    }

    /// Best-effort cancellation: detaches the server's live session. No
    /// abort reaches in-flight simulated steps; the call succeeds whenever
    /// the server exists.
    pub fn cancel_computation(
        &self,
        server_name: &str,
        computation_id: ComputationId,
    ) -> Result<(), OrchestrationError> {
        let server = self
            .get_server(server_name)
            .ok_or_else(|| OrchestrationError::ServerNotFound(server_name.to_string()))?;
        server.cancel_session(computation_id);
        Ok(())
    }

    // Governance pass-throughs.

    pub fn define_policy(&self, policy: SecurityPolicy) -> SecurityPolicy {
        self.governance.define_policy(policy)
    }

    pub fn remove_policy(&self, id: &str) -> Result<SecurityPolicy, OrchestrationError> {
        self.governance.remove_policy(id)
    }

    pub fn get_policy(&self, id: &str) -> Option<SecurityPolicy> {
        self.governance.get_policy(id)
    }

    pub fn list_policies(&self) -> Vec<SecurityPolicy> {
        self.governance.list_policies()
    }

    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.governance.audit_entries()
    }

    pub fn security_report(&self) -> SecurityReport {
        self.governance.generate_security_report()
    }

    pub fn generate_secure_keys(
        &self,
        key_type: &str,
        size: u32,
    ) -> Result<SecureKeys, OrchestrationError> {
        self.governance.generate_secure_keys(key_type, size)
    }

    pub fn check_compliance(&self, standard: &str) -> Result<ComplianceReport, OrchestrationError> {
        self.governance.check_compliance(standard)
    }
}

impl Default for OrchestrationManager {
    fn default() -> Self {
        Self::new()
    }
}

/// The policy set installed at startup: a baseline requiring authenticated
/// parties, plus minimum-party rules scoped to the medium and high/critical
/// sensitivity tiers.
fn install_default_policies(governance: &SecurityGovernance) {
    governance.define_policy(
        SecurityPolicy::new("default", "Default Security Policy")
            .with_description("Baseline applied to every operation")
            .require_authentication(true)
            .with_minimum_parties(2),
    );
    governance.define_policy(
        SecurityPolicy::new("medium-sensitivity", "Medium Sensitivity Data")
            .with_description("Minimum quorum for medium-sensitivity computations")
            .with_minimum_parties(2)
            .with_sensitivity_levels(["medium"]),
    );
    governance.define_policy(
        SecurityPolicy::new("high-sensitivity", "High Sensitivity Data")
            .with_description("Larger quorum for high and critical sensitivity computations")
            .with_minimum_parties(3)
            .with_sensitivity_levels(["high", "critical"]),
    );
}

fn collect_violations(results: &[ValidationResult]) -> Vec<String> {
    results
        .iter()
        .filter(|result| !result.passed)
        .flat_map(|result| {
            result
                .violations
                .iter()
                .map(move |violation| format!("{}: {}", result.policy_name, violation))
        })
        .collect()
}
