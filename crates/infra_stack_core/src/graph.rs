use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::resources::{
    ComputeEndpoint, FunctionUrl, GrantKind, ManagedPolicyAttachment, PolicyGrant, StackOutput,
    TableReference,
};

pub const GRAPH_SCHEMA_VERSION: &str = "v1";

/// Desired state handed to the provisioning engine. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceGraph {
    pub schema_version: String,
    pub profile: String,
    pub compute: ComputeEndpoint,
    pub tables: Vec<TableReference>,
    pub grants: Vec<PolicyGrant>,
    pub managed_policies: Vec<ManagedPolicyAttachment>,
    pub function_url: FunctionUrl,
    pub outputs: Vec<StackOutput>,
}

impl ResourceGraph {
    pub fn grants_of(&self, kind: GrantKind) -> impl Iterator<Item = &PolicyGrant> {
        self.grants.iter().filter(move |grant| grant.kind == kind)
    }

    pub fn output(&self, name: &str) -> Option<&StackOutput> {
        self.outputs.iter().find(|output| output.name == name)
    }

    pub fn fingerprint(&self) -> String {
        graph_fingerprint(self)
    }
}

pub fn graph_fingerprint(graph: &ResourceGraph) -> String {
    let mut hasher = Sha256::new();
    hasher.update(stable_graph_json(graph));
    format!("{:x}", hasher.finalize())
}

pub fn stable_graph_json(value: impl Serialize) -> String {
    serde_json::to_string(&value).expect("serialization of graph value should not fail")
}
