use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::arn;

pub const FUNCTION_LOGICAL_ID: &str = "ApiFunction";
pub const IMAGE_ASSET_PATH: &str = "../image";
pub const IMAGE_COMMAND: &str = "main.handler";
pub const MEMORY_SIZE_MB: u32 = 512;
pub const TIMEOUT_SECONDS: u32 = 60;
pub const FUNCTION_URL_OUTPUT: &str = "FunctionUrl";
pub const FUNCTION_URL_OUTPUT_DESCRIPTION: &str = "URL for the Lambda function";

pub const DYNAMODB_READ_WRITE_ACTIONS: [&str; 12] = [
    "dynamodb:BatchGetItem",
    "dynamodb:GetRecords",
    "dynamodb:GetShardIterator",
    "dynamodb:Query",
    "dynamodb:GetItem",
    "dynamodb:Scan",
    "dynamodb:ConditionCheckItem",
    "dynamodb:BatchWriteItem",
    "dynamodb:PutItem",
    "dynamodb:UpdateItem",
    "dynamodb:DeleteItem",
    "dynamodb:DescribeTable",
];

pub const DYNAMODB_INDEX_QUERY_ACTIONS: [&str; 2] = ["dynamodb:Query", "dynamodb:Scan"];

pub const MODEL_INVOKE_ACTIONS: [&str; 1] = ["bedrock:InvokeModel"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Architecture {
    Arm64,
}

impl Architecture {
    pub fn as_lambda_str(self) -> &'static str {
        match self {
            Self::Arm64 => "arm64",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContainerImage {
    pub asset_path: String,
    pub command: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComputeEndpoint {
    pub logical_id: String,
    pub image: ContainerImage,
    pub memory_mb: u32,
    pub timeout_seconds: u32,
    pub architecture: Architecture,
    pub environment: BTreeMap<String, String>,
}

/// Reference to a table that already exists; nothing is created for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableReference {
    pub logical_id: String,
    pub setting_key: String,
    pub table_name: String,
    pub arn: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Effect {
    Allow,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GrantKind {
    TableReadWrite,
    TableIndexQuery,
    ExternalModelInvoke,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyGrant {
    pub kind: GrantKind,
    pub effect: Effect,
    pub actions: Vec<String>,
    pub resources: Vec<String>,
}

impl PolicyGrant {
    pub fn allow(kind: GrantKind, actions: &[&str], resources: Vec<String>) -> Self {
        Self {
            kind,
            effect: Effect::Allow,
            actions: actions.iter().map(|action| action.to_string()).collect(),
            resources,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManagedPolicyAttachment {
    pub policy_name: String,
    pub arn: String,
}

impl ManagedPolicyAttachment {
    pub fn aws_managed(policy_name: &str) -> Self {
        Self {
            policy_name: policy_name.to_string(),
            arn: arn::managed_policy_arn(policy_name),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum UrlAuthType {
    /// Publicly invocable without credentials.
    #[default]
    #[serde(rename = "NONE")]
    None,
    #[serde(rename = "AWS_IAM")]
    AwsIam,
}

impl UrlAuthType {
    pub fn as_lambda_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::AwsIam => "AWS_IAM",
        }
    }

    pub fn is_public(self) -> bool {
        matches!(self, Self::None)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionUrl {
    pub logical_id: String,
    pub target_logical_id: String,
    pub auth_type: UrlAuthType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StackOutput {
    pub name: String,
    pub description: String,
    pub source_logical_id: String,
    pub attribute: String,
}
