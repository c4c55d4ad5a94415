//! Process-start initialization: turns an env file plus the process
//! environment into the explicit settings source the descriptor consumes.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use infra_stack_core::{ProfileCatalog, SettingsSource, StackProfile};
use tracing::{debug, info, warn};

pub const DEFAULT_ENV_FILE: &str = ".env";
pub const DEFAULT_PROFILE: &str = "extended";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOptions {
    /// Explicit env file; it must exist.
    pub env_file: Option<PathBuf>,
    /// Read when no explicit file is given, only if it exists.
    pub default_env_file: PathBuf,
    pub include_process_env: bool,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            env_file: None,
            default_env_file: PathBuf::from(DEFAULT_ENV_FILE),
            include_process_env: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSelection {
    pub profile: String,
    pub profile_file: Option<PathBuf>,
    pub source: SourceOptions,
}

/// Env file entries first, process environment layered on top: a variable
/// already set in the process is never overridden by the file.
pub fn load_settings_source<I>(options: &SourceOptions, process_env: I) -> Result<SettingsSource>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut source = SettingsSource::new();

    let (path, explicit) = match &options.env_file {
        Some(path) => (path.clone(), true),
        None => (options.default_env_file.clone(), false),
    };

    if path.is_file() {
        let entries = dotenvy::from_path_iter(&path)
            .with_context(|| format!("failed to open env file {}", path.display()))?;
        let mut loaded = 0usize;
        for entry in entries {
            let (key, value) =
                entry.with_context(|| format!("failed to parse env file {}", path.display()))?;
            source.insert(key, value);
            loaded += 1;
        }
        debug!(path = %path.display(), entries = loaded, "env file loaded");
    } else if explicit {
        bail!("env file {} does not exist", path.display());
    } else {
        debug!(path = %path.display(), "no env file found");
    }

    if options.include_process_env {
        for (key, value) in process_env {
            source.insert(key, value);
        }
    }

    Ok(source)
}

/// Snapshot of the process environment. Non UTF-8 entries are skipped.
pub fn process_env() -> Vec<(String, String)> {
    utf8_entries(std::env::vars_os())
}

pub fn utf8_entries<I>(entries: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    entries
        .into_iter()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (Ok(key), Err(_)) => {
                warn!(key = %key, "environment variable contains invalid UTF-8, skipping");
                None
            }
            (Err(key), _) => {
                warn!(
                    key = %key.to_string_lossy(),
                    "environment variable name contains invalid UTF-8, skipping"
                );
                None
            }
        })
        .collect()
}

/// Builtin profiles, optionally merged with a JSON profile document.
pub fn load_catalog(profile_file: Option<&Path>) -> Result<ProfileCatalog> {
    let catalog = ProfileCatalog::builtin();
    let Some(path) = profile_file else {
        return Ok(catalog);
    };

    let document = fs::read_to_string(path)
        .with_context(|| format!("failed to read profile file {}", path.display()))?;
    let custom = ProfileCatalog::from_json(&document)
        .with_context(|| format!("invalid profile file {}", path.display()))?;
    info!(path = %path.display(), profiles = custom.len(), "custom profiles loaded");
    Ok(catalog.merge(custom))
}

impl StackSelection {
    pub fn resolve<I>(&self, process_env: I) -> Result<(StackProfile, SettingsSource)>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let catalog = load_catalog(self.profile_file.as_deref())?;
        let profile = catalog.select(&self.profile)?.clone();
        let source = load_settings_source(&self.source, process_env)?;
        info!(
            profile = %profile.name,
            settings = source.len(),
            required = profile.required_keys.len(),
            "settings source initialized"
        );
        Ok((profile, source))
    }
}
