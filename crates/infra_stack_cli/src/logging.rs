use std::env::{self, VarError};

use anyhow::{bail, Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_FILTER: &str = "info";

/// Logs go to stderr so stdout stays reserved for synthesized documents.
pub fn init_tracing(json: bool) -> Result<()> {
    let env_filter = build_env_filter(DEFAULT_FILTER)?;

    let json_layer = json.then(|| {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| {
        fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .context("failed to initialize tracing subscriber")
}

/// `RUST_LOG` wins; `fallback` applies only when it is unset.
pub fn build_env_filter(fallback: &str) -> Result<EnvFilter> {
    match env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) => parse_env_filter(Some(&directives), fallback),
        Err(VarError::NotPresent) => parse_env_filter(None, fallback),
        Err(VarError::NotUnicode(_)) => {
            bail!("{} contains invalid UTF-8", EnvFilter::DEFAULT_ENV)
        }
    }
}

pub fn parse_env_filter(directives: Option<&str>, fallback: &str) -> Result<EnvFilter> {
    match directives {
        Some(directives) => EnvFilter::try_new(directives).with_context(|| {
            format!("invalid {} filter '{directives}'", EnvFilter::DEFAULT_ENV)
        }),
        None => EnvFilter::try_new(fallback)
            .with_context(|| format!("invalid log filter '{fallback}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_directives_use_fallback() {
        assert!(parse_env_filter(None, DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn explicit_directives_are_parsed() {
        assert!(parse_env_filter(Some("infra_stack_cli=debug,warn"), DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn invalid_fallback_is_reported() {
        let error = parse_env_filter(None, "infra_stack_cli=verbose")
            .expect_err("fallback should be rejected");
        assert!(error.to_string().contains("invalid log filter"));
    }

    #[test]
    fn invalid_directives_are_reported() {
        let error = parse_env_filter(Some("infra_stack_cli=verbose"), DEFAULT_FILTER)
            .expect_err("filter should be rejected");
        assert!(error
            .to_string()
            .contains("invalid RUST_LOG filter 'infra_stack_cli=verbose'"));
    }
}

