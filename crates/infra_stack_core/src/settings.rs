use std::collections::BTreeMap;
use std::fmt;

use crate::error::ConfigError;

/// Explicit configuration source handed to the descriptor.
///
/// Built once at process start (see the CLI `config` module) and never read
/// from process-wide state inside this crate. `Debug` prints key names only so
/// credentials cannot leak through logs.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SettingsSource {
    values: BTreeMap<String, String>,
}

impl SettingsSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces a value. Later layers win.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for SettingsSource
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut source = Self::new();
        for (key, value) in iter {
            source.insert(key, value);
        }
        source
    }
}

impl fmt::Debug for SettingsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsSource")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Settings that passed required-key validation, exactly the requested keys.
#[derive(Clone, PartialEq, Eq)]
pub struct ValidatedSettings {
    values: BTreeMap<String, String>,
}

impl ValidatedSettings {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Looks up a key that must be part of the validated set.
    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::missing(key))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

impl fmt::Debug for ValidatedSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedSettings")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Resolves every key in order and fails on the first one that is absent or
/// empty. Whitespace-only values count as present.
pub fn validate_required<K: AsRef<str>>(
    source: &SettingsSource,
    keys: &[K],
) -> Result<ValidatedSettings, ConfigError> {
    let mut values = BTreeMap::new();
    for key in keys {
        let key = key.as_ref();
        match source.get(key) {
            Some(value) if !value.is_empty() => {
                values.insert(key.to_string(), value.to_string());
            }
            _ => return Err(ConfigError::missing(key)),
        }
    }
    Ok(ValidatedSettings { values })
}
