//! Deploy-time descriptor for the backend API stack.
//!
//! This crate validates required settings and declares the desired resource
//! graph (container-backed function, table grants, model grant, public URL).
//! It never reads the process environment and never talks to AWS: loading
//! settings belongs to the CLI, reconciling the graph to the provisioning
//! engine.

pub mod arn;
pub mod descriptor;
pub mod error;
pub mod graph;
pub mod profile;
pub mod resources;
pub mod settings;
pub mod template;

pub use descriptor::evaluate;
pub use error::{ConfigError, ProfileError};
pub use graph::{graph_fingerprint, ResourceGraph};
pub use profile::{ProfileCatalog, StackProfile, TableBinding};
pub use settings::{validate_required, SettingsSource, ValidatedSettings};
