use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

const STAGING_DIR: &str = ".staging";

/// Destination for rendered documents.
pub trait ArtifactSink {
    fn write_artifact(&self, name: &str, body: &str) -> Result<()>;

    /// Writes a set of documents that belong together.
    fn write_bundle(&self, artifacts: &[(&str, String)]) -> Result<()> {
        for (name, body) in artifacts {
            self.write_artifact(name, body)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl ArtifactSink for StdoutSink {
    fn write_artifact(&self, _name: &str, body: &str) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{body}").context("failed to write to stdout")
    }
}

/// Writes a single document to a fixed path, whatever its artifact name.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ArtifactSink for FileSink {
    fn write_artifact(&self, name: &str, body: &str) -> Result<()> {
        write_file(&self.path, body)?;
        info!(artifact = name, path = %self.path.display(), "artifact written");
        Ok(())
    }
}

/// Writes each artifact under its own name inside a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactSink for DirectorySink {
    fn write_artifact(&self, name: &str, body: &str) -> Result<()> {
        let path = self.dir.join(name);
        write_file(&path, body)?;
        info!(artifact = name, path = %path.display(), "artifact written");
        Ok(())
    }

    /// Every document is staged first; the directory is only touched once
    /// all of them were written.
    fn write_bundle(&self, artifacts: &[(&str, String)]) -> Result<()> {
        let staging = self.dir.join(STAGING_DIR);
        if staging.exists() {
            fs::remove_dir_all(&staging)
                .with_context(|| format!("failed to clear {}", staging.display()))?;
        }

        let staged = artifacts
            .iter()
            .try_for_each(|(name, body)| write_file(&staging.join(name), body));
        if let Err(error) = staged {
            if let Err(cleanup) = fs::remove_dir_all(&staging) {
                warn!(
                    path = %staging.display(),
                    error = %cleanup,
                    "failed to remove staging directory"
                );
            }
            return Err(error);
        }

        for (name, _) in artifacts {
            let path = self.dir.join(name);
            fs::rename(staging.join(name), &path)
                .with_context(|| format!("failed to move {} into place", path.display()))?;
            info!(artifact = *name, path = %path.display(), "artifact written");
        }
        fs::remove_dir_all(&staging)
            .with_context(|| format!("failed to remove {}", staging.display()))
    }
}

fn write_file(path: &Path, body: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    fs::write(path, format!("{body}\n"))
        .with_context(|| format!("failed to write {}", path.display()))
}
