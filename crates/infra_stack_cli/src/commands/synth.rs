use anyhow::{Context, Result};
use clap::ValueEnum;
use infra_stack_core::template::{assembly_manifest, synthesize};
use infra_stack_core::{ResourceGraph, SettingsSource, StackProfile};
use serde_json::Value;

use crate::adapters::output::ArtifactSink;
use crate::commands::describe;

pub const GRAPH_FILE: &str = "graph.json";
pub const TEMPLATE_FILE: &str = "template.json";
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SynthFormat {
    /// The resource graph as declared
    Graph,
    /// CloudFormation template
    Template,
    /// Cloud assembly manifest
    Manifest,
}

impl SynthFormat {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Graph => GRAPH_FILE,
            Self::Template => TEMPLATE_FILE,
            Self::Manifest => MANIFEST_FILE,
        }
    }
}

pub fn render(graph: &ResourceGraph, format: SynthFormat) -> Result<String> {
    let document: Value = match format {
        SynthFormat::Graph => {
            serde_json::to_value(graph).context("failed to encode resource graph")?
        }
        SynthFormat::Template => synthesize(graph),
        SynthFormat::Manifest => assembly_manifest(graph, TEMPLATE_FILE),
    };
    serde_json::to_string_pretty(&document).context("failed to render document")
}

pub fn run_synth(
    profile: &StackProfile,
    source: &SettingsSource,
    format: SynthFormat,
    sink: &dyn ArtifactSink,
) -> Result<ResourceGraph> {
    let graph = describe(profile, source)?;
    let body = render(&graph, format)?;
    sink.write_artifact(format.file_name(), &body)?;
    Ok(graph)
}

/// Writes graph, template and manifest as one bundle; nothing is written if
/// evaluation or rendering fails.
pub fn run_assemble(
    profile: &StackProfile,
    source: &SettingsSource,
    sink: &dyn ArtifactSink,
) -> Result<ResourceGraph> {
    let graph = describe(profile, source)?;
    let mut documents = Vec::with_capacity(3);
    for format in [SynthFormat::Graph, SynthFormat::Template, SynthFormat::Manifest] {
        documents.push((format.file_name(), render(&graph, format)?));
    }

    sink.write_bundle(&documents)?;
    Ok(graph)
}
