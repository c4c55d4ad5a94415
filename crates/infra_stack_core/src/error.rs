use thiserror::Error;

/// Raised while resolving settings for a descriptor evaluation.
///
/// Always fatal: the evaluation stops at the first offending key and no
/// resource graph is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} environment variable is not set")]
    MissingConfiguration { key: String },
}

impl ConfigError {
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingConfiguration { key: key.into() }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::MissingConfiguration { key } => key,
        }
    }
}

/// Problems with a profile definition, detected before any evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("invalid profile '{profile}': {message}")]
    Invalid { profile: String, message: String },

    #[error("unknown profile '{name}' (known profiles: {known})")]
    Unknown { name: String, known: String },

    #[error("malformed profile document: {0}")]
    Malformed(String),
}

impl ProfileError {
    pub fn invalid(profile: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            profile: profile.into(),
            message: message.into(),
        }
    }
}
