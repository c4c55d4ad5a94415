//! Resource identifier builders.
//!
//! Identifiers that depend on the deploying account are rendered with
//! CloudFormation pseudo parameters and resolved by the provisioning engine
//! through `Fn::Sub`.

pub const EMBEDDING_MODEL_ARN: &str =
    "arn:aws:bedrock:us-east-1::foundation-model/amazon.titan-embed-text-v1";

pub const LAMBDA_BASIC_EXECUTION_POLICY: &str = "service-role/AWSLambdaBasicExecutionRole";

const PSEUDO_PARAMETER_MARKER: &str = "${";
const LITERAL_MARKER: &str = "${!";

/// The table name is kept literal under `Fn::Sub`.
pub fn table_arn(table_name: &str) -> String {
    let table_name = escape_literal(table_name);
    format!("arn:${{AWS::Partition}}:dynamodb:${{AWS::Region}}:${{AWS::AccountId}}:table/{table_name}")
}

/// Covers every secondary index of the table.
pub fn table_index_arn(table_name: &str) -> String {
    format!("{}/index/*", table_arn(table_name))
}

pub fn managed_policy_arn(policy_name: &str) -> String {
    let trimmed = policy_name.trim_matches('/');
    format!("arn:${{AWS::Partition}}:iam::aws:policy/{trimmed}")
}

pub fn needs_substitution(identifier: &str) -> bool {
    identifier.contains(PSEUDO_PARAMETER_MARKER)
}

/// `${` in user-supplied text becomes `${!`, which `Fn::Sub` renders as a
/// literal `${`.
pub fn escape_literal(value: &str) -> String {
    value.replace(PSEUDO_PARAMETER_MARKER, LITERAL_MARKER)
}
