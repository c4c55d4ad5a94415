//! Command handlers behind the `infra-stack` binary.

pub mod profiles;
pub mod synth;
pub mod validate;

use anyhow::Result;
use infra_stack_core::{evaluate, ResourceGraph, SettingsSource, StackProfile};
use tracing::{info, warn};

/// Evaluates the descriptor and logs the graph summary. Setting values are
/// never logged.
pub fn describe(profile: &StackProfile, source: &SettingsSource) -> Result<ResourceGraph> {
    let graph = evaluate(profile, source)?;

    if graph.function_url.auth_type.is_public() {
        warn!(
            profile = %graph.profile,
            function = %graph.compute.logical_id,
            "function URL accepts unauthenticated requests"
        );
    }

    info!(
        profile = %graph.profile,
        tables = graph.tables.len(),
        grants = graph.grants.len(),
        managed_policies = graph.managed_policies.len(),
        fingerprint = %graph.fingerprint(),
        "resource graph declared"
    );
    Ok(graph)
}
