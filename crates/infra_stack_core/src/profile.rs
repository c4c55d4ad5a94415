//! Declarative stack profiles.
//!
//! A profile lists the settings that must be present and the resources wired
//! from them. Variants of the stack differ only in their profile; the
//! descriptor itself is shared.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;
use crate::resources::UrlAuthType;

pub const MINIMAL_PROFILE: &str = "minimal";
pub const EXTENDED_PROFILE: &str = "extended";

pub const BASE_REQUIRED_KEYS: [&str; 5] = [
    "PRIVATE_AWS_ACCESS_KEY_ID",
    "PRIVATE_AWS_SECRET_ACCESS_KEY",
    "PRIVATE_AWS_REGION",
    "S3_BUCKET_NAME",
    "API_KEY",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TableBinding {
    pub logical_id: String,
    pub setting_key: String,
}

impl TableBinding {
    pub fn new(logical_id: impl Into<String>, setting_key: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
            setting_key: setting_key.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StackProfile {
    pub name: String,
    pub required_keys: Vec<String>,
    #[serde(default)]
    pub tables: Vec<TableBinding>,
    #[serde(default)]
    pub managed_policies: Vec<String>,
    #[serde(default)]
    pub public_url_auth: UrlAuthType,
}

impl StackProfile {
    pub fn minimal() -> Self {
        let mut required_keys = base_keys();
        required_keys.push("DYNAMODB_TABLE_NAME".to_string());

        Self {
            name: MINIMAL_PROFILE.to_string(),
            required_keys,
            tables: vec![TableBinding::new("Table", "DYNAMODB_TABLE_NAME")],
            managed_policies: Vec::new(),
            public_url_auth: UrlAuthType::None,
        }
    }

    pub fn extended() -> Self {
        let mut required_keys = base_keys();
        required_keys.extend(
            [
                "COGNITO_USER_POOL_ID",
                "COGNITO_APP_CLIENT_ID",
                "DYNAMODB_TABLE_NAME_USERS",
                "DYNAMODB_TABLE_NAME_PROCESSED_FILES",
                "DYNAMODB_TABLE_NAME_REQUESTS",
                "PINECONE_API_KEY",
                "PINECONE_INDEX_NAME",
            ]
            .map(String::from),
        );

        Self {
            name: EXTENDED_PROFILE.to_string(),
            required_keys,
            tables: vec![
                TableBinding::new("UsersTable", "DYNAMODB_TABLE_NAME_USERS"),
                TableBinding::new("ProcessedFilesTable", "DYNAMODB_TABLE_NAME_PROCESSED_FILES"),
                TableBinding::new("RequestsTable", "DYNAMODB_TABLE_NAME_REQUESTS"),
            ],
            managed_policies: vec!["AmazonCognitoPowerUser".to_string()],
            public_url_auth: UrlAuthType::None,
        }
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.name.trim().is_empty() {
            return Err(ProfileError::invalid(
                &self.name,
                "profile name cannot be empty",
            ));
        }

        if self.required_keys.is_empty() {
            return Err(ProfileError::invalid(
                &self.name,
                "required_keys must be a non-empty list",
            ));
        }

        let mut seen_keys = BTreeSet::new();
        for key in &self.required_keys {
            if key.trim().is_empty() {
                return Err(ProfileError::invalid(
                    &self.name,
                    "required key names must be non-empty strings",
                ));
            }
            if !seen_keys.insert(key.as_str()) {
                return Err(ProfileError::invalid(
                    &self.name,
                    format!("required key '{key}' is listed more than once"),
                ));
            }
        }

        let mut seen_tables = BTreeSet::new();
        for table in &self.tables {
            if table.logical_id.trim().is_empty() {
                return Err(ProfileError::invalid(
                    &self.name,
                    "table logical ids must be non-empty strings",
                ));
            }
            if !seen_tables.insert(table.logical_id.as_str()) {
                return Err(ProfileError::invalid(
                    &self.name,
                    format!("table '{}' is declared more than once", table.logical_id),
                ));
            }
            if !seen_keys.contains(table.setting_key.as_str()) {
                return Err(ProfileError::invalid(
                    &self.name,
                    format!(
                        "table '{}' reads '{}' which is not a required key",
                        table.logical_id, table.setting_key
                    ),
                ));
            }
        }

        if self
            .managed_policies
            .iter()
            .any(|policy| policy.trim().is_empty())
        {
            return Err(ProfileError::invalid(
                &self.name,
                "managed policy names must be non-empty strings",
            ));
        }

        Ok(())
    }
}

fn base_keys() -> Vec<String> {
    BASE_REQUIRED_KEYS.map(String::from).to_vec()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileDocument {
    profiles: Vec<StackProfile>,
}

/// Ordered set of profiles with unique names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileCatalog {
    profiles: Vec<StackProfile>,
}

impl ProfileCatalog {
    pub fn builtin() -> Self {
        Self {
            profiles: vec![StackProfile::minimal(), StackProfile::extended()],
        }
    }

    pub fn with_profiles(profiles: Vec<StackProfile>) -> Result<Self, ProfileError> {
        let mut names = BTreeSet::new();
        for profile in &profiles {
            profile.validate()?;
            if !names.insert(profile.name.as_str()) {
                return Err(ProfileError::invalid(
                    &profile.name,
                    "profile name is declared more than once",
                ));
            }
        }
        Ok(Self { profiles })
    }

    /// Parses `{"profiles": [...]}`.
    pub fn from_json(document: &str) -> Result<Self, ProfileError> {
        let parsed: ProfileDocument = serde_json::from_str(document)
            .map_err(|error| ProfileError::Malformed(error.to_string()))?;
        Self::with_profiles(parsed.profiles)
    }

    /// Adds `other`'s profiles, replacing any with the same name.
    pub fn merge(mut self, other: ProfileCatalog) -> Self {
        for profile in other.profiles {
            match self
                .profiles
                .iter_mut()
                .find(|existing| existing.name == profile.name)
            {
                Some(existing) => *existing = profile,
                None => self.profiles.push(profile),
            }
        }
        self
    }

    pub fn select(&self, name: &str) -> Result<&StackProfile, ProfileError> {
        self.profiles
            .iter()
            .find(|profile| profile.name == name)
            .ok_or_else(|| ProfileError::Unknown {
                name: name.to_string(),
                known: self.names().collect::<Vec<_>>().join(", "),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|profile| profile.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &StackProfile> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_profiles_are_valid() {
        for profile in ProfileCatalog::builtin().iter() {
            profile.validate().expect("builtin profile should validate");
        }
    }

    #[test]
    fn minimal_profile_matches_expected_keys() {
        let profile = StackProfile::minimal();
        assert_eq!(
            profile.required_keys,
            vec![
                "PRIVATE_AWS_ACCESS_KEY_ID",
                "PRIVATE_AWS_SECRET_ACCESS_KEY",
                "PRIVATE_AWS_REGION",
                "S3_BUCKET_NAME",
                "API_KEY",
                "DYNAMODB_TABLE_NAME",
            ]
        );
        assert_eq!(profile.tables.len(), 1);
    }

    #[test]
    fn extended_profile_shares_base_keys_with_minimal() {
        let extended = StackProfile::extended();
        assert_eq!(extended.required_keys.len(), 12);
        for key in BASE_REQUIRED_KEYS {
            assert!(extended.required_keys.iter().any(|value| value == key));
            assert!(StackProfile::minimal()
                .required_keys
                .iter()
                .any(|value| value == key));
        }
        assert_eq!(extended.managed_policies, vec!["AmazonCognitoPowerUser"]);
    }

    #[test]
    fn select_unknown_profile_lists_known_names() {
        let error = ProfileCatalog::builtin()
            .select("staging")
            .expect_err("selection should fail");
        assert_eq!(
            error.to_string(),
            "unknown profile 'staging' (known profiles: minimal, extended)"
        );
    }

    #[test]
    fn from_json_applies_defaults() {
        let catalog = ProfileCatalog::from_json(
            r#"{"profiles": [{"name": "tiny", "required_keys": ["API_KEY"]}]}"#,
        )
        .expect("document should parse");

        let profile = catalog.select("tiny").expect("profile should exist");
        assert!(profile.tables.is_empty());
        assert_eq!(profile.public_url_auth, UrlAuthType::None);
    }

    #[test]
    fn from_json_rejects_table_bound_to_unrequired_key() {
        let error = ProfileCatalog::from_json(
            r#"{"profiles": [{
                "name": "broken",
                "required_keys": ["API_KEY"],
                "tables": [{"logical_id": "Orders", "setting_key": "ORDERS_TABLE"}]
            }]}"#,
        )
        .expect_err("document should fail");

        assert_eq!(
            error,
            ProfileError::invalid(
                "broken",
                "table 'Orders' reads 'ORDERS_TABLE' which is not a required key"
            )
        );
    }

    #[test]
    fn from_json_rejects_duplicate_required_keys() {
        let error = ProfileCatalog::from_json(
            r#"{"profiles": [{"name": "dup", "required_keys": ["API_KEY", "API_KEY"]}]}"#,
        )
        .expect_err("document should fail");
        assert!(error.to_string().contains("listed more than once"));
    }

    #[test]
    fn from_json_reports_malformed_documents() {
        let error = ProfileCatalog::from_json("[]").expect_err("document should fail");
        assert!(matches!(error, ProfileError::Malformed(_)));
    }

    #[test]
    fn from_json_rejects_unknown_fields() {
        let misspelled_profile_field = ProfileCatalog::from_json(
            r#"{"profiles": [{
                "name": "orders",
                "required_keys": ["ORDERS_TABLE"],
                "table": [{"logical_id": "Orders", "setting_key": "ORDERS_TABLE"}]
            }]}"#,
        )
        .expect_err("document should fail");
        assert!(matches!(misspelled_profile_field, ProfileError::Malformed(_)));
        assert!(misspelled_profile_field.to_string().contains("table"));

        let misspelled_table_field = ProfileCatalog::from_json(
            r#"{"profiles": [{
                "name": "orders",
                "required_keys": ["ORDERS_TABLE"],
                "tables": [{"logical_id": "Orders", "setting": "ORDERS_TABLE"}]
            }]}"#,
        )
        .expect_err("document should fail");
        assert!(matches!(misspelled_table_field, ProfileError::Malformed(_)));

        let misspelled_document_field = ProfileCatalog::from_json(
            r#"{"profile": [], "profiles": []}"#,
        )
        .expect_err("document should fail");
        assert!(matches!(misspelled_document_field, ProfileError::Malformed(_)));
    }

    #[test]
    fn merge_replaces_profiles_by_name() {
        let custom = ProfileCatalog::from_json(
            r#"{"profiles": [
                {"name": "minimal", "required_keys": ["API_KEY"], "public_url_auth": "AWS_IAM"},
                {"name": "tiny", "required_keys": ["API_KEY"]}
            ]}"#,
        )
        .expect("document should parse");

        let merged = ProfileCatalog::builtin().merge(custom);
        assert_eq!(
            merged.names().collect::<Vec<_>>(),
            vec!["minimal", "extended", "tiny"]
        );
        let minimal = merged.select("minimal").expect("profile should exist");
        assert_eq!(minimal.public_url_auth, UrlAuthType::AwsIam);
    }
}
