//! The deployment descriptor: one linear pass from settings to graph.

use crate::arn;
use crate::error::ConfigError;
use crate::graph::{ResourceGraph, GRAPH_SCHEMA_VERSION};
use crate::profile::{StackProfile, TableBinding};
use crate::resources::{
    Architecture, ComputeEndpoint, ContainerImage, FunctionUrl, GrantKind,
    ManagedPolicyAttachment, PolicyGrant, StackOutput, TableReference, UrlAuthType,
    DYNAMODB_INDEX_QUERY_ACTIONS, DYNAMODB_READ_WRITE_ACTIONS, FUNCTION_LOGICAL_ID,
    FUNCTION_URL_OUTPUT, FUNCTION_URL_OUTPUT_DESCRIPTION, IMAGE_ASSET_PATH, IMAGE_COMMAND,
    MEMORY_SIZE_MB, MODEL_INVOKE_ACTIONS, TIMEOUT_SECONDS,
};
use crate::settings::{validate_required, SettingsSource, ValidatedSettings};

/// Validates every required setting, then declares the full graph.
///
/// Nothing is declared until validation has passed, so a failure never
/// yields a partial graph.
pub fn evaluate(
    profile: &StackProfile,
    source: &SettingsSource,
) -> Result<ResourceGraph, ConfigError> {
    let settings = validate_required(source, &profile.required_keys)?;

    let tables = profile
        .tables
        .iter()
        .map(|binding| declare_table_reference(binding, &settings))
        .collect::<Result<Vec<_>, _>>()?;

    let compute = declare_compute_endpoint(&settings);

    let mut grants = declare_storage_grants(&tables);
    grants.push(declare_external_service_grant());

    let managed_policies = profile
        .managed_policies
        .iter()
        .map(|policy| ManagedPolicyAttachment::aws_managed(policy))
        .collect();

    let function_url = declare_public_endpoint(&compute, profile.public_url_auth);
    let outputs = emit_outputs(&function_url);

    Ok(ResourceGraph {
        schema_version: GRAPH_SCHEMA_VERSION.to_string(),
        profile: profile.name.clone(),
        compute,
        tables,
        grants,
        managed_policies,
        function_url,
        outputs,
    })
}

pub fn declare_compute_endpoint(settings: &ValidatedSettings) -> ComputeEndpoint {
    ComputeEndpoint {
        logical_id: FUNCTION_LOGICAL_ID.to_string(),
        image: ContainerImage {
            asset_path: IMAGE_ASSET_PATH.to_string(),
            command: vec![IMAGE_COMMAND.to_string()],
        },
        memory_mb: MEMORY_SIZE_MB,
        timeout_seconds: TIMEOUT_SECONDS,
        architecture: Architecture::Arm64,
        environment: settings.as_map().clone(),
    }
}

pub fn declare_table_reference(
    binding: &TableBinding,
    settings: &ValidatedSettings,
) -> Result<TableReference, ConfigError> {
    let table_name = settings.require(&binding.setting_key)?;
    Ok(TableReference {
        logical_id: binding.logical_id.clone(),
        setting_key: binding.setting_key.clone(),
        table_name: table_name.to_string(),
        arn: arn::table_arn(table_name),
    })
}

/// One read/write grant per table plus a single index-query grant covering
/// every table's secondary indexes.
pub fn declare_storage_grants(tables: &[TableReference]) -> Vec<PolicyGrant> {
    let mut grants: Vec<PolicyGrant> = tables
        .iter()
        .map(|table| {
            PolicyGrant::allow(
                GrantKind::TableReadWrite,
                &DYNAMODB_READ_WRITE_ACTIONS,
                vec![table.arn.clone()],
            )
        })
        .collect();

    // IAM rejects statements with an empty resource list.
    if !tables.is_empty() {
        grants.push(PolicyGrant::allow(
            GrantKind::TableIndexQuery,
            &DYNAMODB_INDEX_QUERY_ACTIONS,
            tables
                .iter()
                .map(|table| arn::table_index_arn(&table.table_name))
                .collect(),
        ));
    }

    grants
}

pub fn declare_external_service_grant() -> PolicyGrant {
    PolicyGrant::allow(
        GrantKind::ExternalModelInvoke,
        &MODEL_INVOKE_ACTIONS,
        vec![arn::EMBEDDING_MODEL_ARN.to_string()],
    )
}

pub fn declare_public_endpoint(compute: &ComputeEndpoint, auth_type: UrlAuthType) -> FunctionUrl {
    FunctionUrl {
        logical_id: format!("{}FunctionUrl", compute.logical_id),
        target_logical_id: compute.logical_id.clone(),
        auth_type,
    }
}

pub fn emit_outputs(function_url: &FunctionUrl) -> Vec<StackOutput> {
    vec![StackOutput {
        name: FUNCTION_URL_OUTPUT.to_string(),
        description: FUNCTION_URL_OUTPUT_DESCRIPTION.to_string(),
        source_logical_id: function_url.logical_id.clone(),
        attribute: "FunctionUrl".to_string(),
    }]
}
