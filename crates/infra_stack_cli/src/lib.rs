//! Command-line front end for the stack descriptor.
//!
//! This crate owns the process-facing concerns (env file and process
//! environment loading, profile selection, logging, artifact output) around
//! the pure `infra_stack_core` evaluation.

pub mod adapters;
pub mod commands;
pub mod config;
pub mod logging;
