//! CloudFormation rendering of a resource graph.
//!
//! Output is deterministic: `serde_json::Map` keeps keys sorted, and every
//! list follows graph order.

use serde_json::{json, Map, Value};

use crate::arn;
use crate::graph::ResourceGraph;
use crate::resources::PolicyGrant;

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";
pub const IMAGE_URI_PARAMETER: &str = "ApiFunctionImageUri";
pub const ASSEMBLY_MANIFEST_VERSION: &str = "1";

pub fn synthesize(graph: &ResourceGraph) -> Value {
    let function_id = graph.compute.logical_id.as_str();
    let role_id = format!("{function_id}ServiceRole");
    let policy_id = format!("{role_id}DefaultPolicy");

    let mut resources = Map::new();
    resources.insert(role_id.clone(), role_resource(graph));

    let mut depends_on = Vec::new();
    if !graph.grants.is_empty() {
        resources.insert(policy_id.clone(), policy_resource(graph, &role_id));
        depends_on.push(policy_id);
    }
    depends_on.push(role_id.clone());

    resources.insert(
        function_id.to_string(),
        function_resource(graph, &role_id, depends_on),
    );

    let url = &graph.function_url;
    resources.insert(
        url.logical_id.clone(),
        json!({
            "Type": "AWS::Lambda::Url",
            "Properties": {
                "AuthType": url.auth_type.as_lambda_str(),
                "TargetFunctionArn": { "Fn::GetAtt": [url.target_logical_id, "Arn"] },
            },
        }),
    );

    if url.auth_type.is_public() {
        resources.insert(
            format!("{}InvokeFunctionUrl", url.target_logical_id),
            json!({
                "Type": "AWS::Lambda::Permission",
                "Properties": {
                    "Action": "lambda:InvokeFunctionUrl",
                    "FunctionName": { "Fn::GetAtt": [url.target_logical_id, "Arn"] },
                    "FunctionUrlAuthType": url.auth_type.as_lambda_str(),
                    "Principal": "*",
                },
            }),
        );
    }

    let mut outputs = Map::new();
    for output in &graph.outputs {
        outputs.insert(
            output.name.clone(),
            json!({
                "Description": output.description,
                "Value": { "Fn::GetAtt": [output.source_logical_id, output.attribute] },
            }),
        );
    }

    json!({
        "AWSTemplateFormatVersion": TEMPLATE_FORMAT_VERSION,
        "Description": format!("Backend API stack ({} profile)", graph.profile),
        "Parameters": {
            IMAGE_URI_PARAMETER: {
                "Type": "String",
                "Description": format!(
                    "Image URI built from asset {}",
                    graph.compute.image.asset_path
                ),
            },
        },
        "Resources": resources,
        "Outputs": outputs,
    })
}

/// Manifest listing the stack template and the image asset it depends on.
pub fn assembly_manifest(graph: &ResourceGraph, template_file: &str) -> Value {
    json!({
        "version": ASSEMBLY_MANIFEST_VERSION,
        "profile": graph.profile,
        "fingerprint": graph.fingerprint(),
        "artifacts": {
            "stack": {
                "type": "aws:cloudformation:stack",
                "templateFile": template_file,
                "outputs": graph.outputs.iter().map(|output| output.name.as_str()).collect::<Vec<_>>(),
            },
            "image": {
                "type": "container-image",
                "path": graph.compute.image.asset_path,
                "command": graph.compute.image.command,
                "platform": format!("linux/{}", graph.compute.architecture.as_lambda_str()),
                "parameter": IMAGE_URI_PARAMETER,
            },
        },
    })
}

fn role_resource(graph: &ResourceGraph) -> Value {
    let mut managed_policy_arns = vec![arn_value(&arn::managed_policy_arn(
        arn::LAMBDA_BASIC_EXECUTION_POLICY,
    ))];
    managed_policy_arns.extend(
        graph
            .managed_policies
            .iter()
            .map(|policy| arn_value(&policy.arn)),
    );

    json!({
        "Type": "AWS::IAM::Role",
        "Properties": {
            "AssumeRolePolicyDocument": {
                "Version": "2012-10-17",
                "Statement": [{
                    "Action": "sts:AssumeRole",
                    "Effect": "Allow",
                    "Principal": { "Service": "lambda.amazonaws.com" },
                }],
            },
            "ManagedPolicyArns": managed_policy_arns,
        },
    })
}

fn policy_resource(graph: &ResourceGraph, role_id: &str) -> Value {
    json!({
        "Type": "AWS::IAM::Policy",
        "Properties": {
            "PolicyName": format!("{role_id}DefaultPolicy"),
            "PolicyDocument": {
                "Version": "2012-10-17",
                "Statement": graph.grants.iter().map(statement).collect::<Vec<_>>(),
            },
            "Roles": [{ "Ref": role_id }],
        },
    })
}

fn statement(grant: &PolicyGrant) -> Value {
    let resources: Vec<Value> = grant
        .resources
        .iter()
        .map(|resource| arn_value(resource))
        .collect();

    json!({
        "Action": grant.actions,
        "Effect": grant.effect,
        "Resource": resources,
    })
}

fn function_resource(graph: &ResourceGraph, role_id: &str, depends_on: Vec<String>) -> Value {
    let compute = &graph.compute;
    json!({
        "Type": "AWS::Lambda::Function",
        "Properties": {
            "PackageType": "Image",
            "Code": { "ImageUri": { "Ref": IMAGE_URI_PARAMETER } },
            "ImageConfig": { "Command": compute.image.command },
            "MemorySize": compute.memory_mb,
            "Timeout": compute.timeout_seconds,
            "Architectures": [compute.architecture.as_lambda_str()],
            "Environment": { "Variables": compute.environment },
            "Role": { "Fn::GetAtt": [role_id, "Arn"] },
        },
        "DependsOn": depends_on,
        "Metadata": {
            "aws:asset:path": compute.image.asset_path,
            "aws:asset:property": "Code.ImageUri",
        },
    })
}

fn arn_value(identifier: &str) -> Value {
    if arn::needs_substitution(identifier) {
        json!({ "Fn::Sub": identifier })
    } else {
        Value::String(identifier.to_string())
    }
}
