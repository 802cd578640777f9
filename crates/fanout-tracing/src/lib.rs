//! Shared tracing configuration utilities for the fanout workspace.
//!
//! The helpers in this crate centralise how executables, integration tests,
//! and benchmarks install `tracing` subscribers. Routing setup through a
//! single crate avoids copy-pasting builder logic and keeps the logging
//! surface consistent across binaries.

pub mod performance;

#[macro_use]
pub mod macros;

use std::env;

pub use tracing::{debug, error, info, trace, warn};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as tracing_fmt, EnvFilter, Registry};

/// Output format for the formatter layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TracingOutput {
    /// Human-readable multi-line output for local development
    Pretty,
    /// Single-line output
    Compact,
    /// Machine-readable JSON for CI and log collection
    Json,
}

/// Configuration describing how the shared tracing subscriber should behave.
#[derive(Clone, Debug)]
pub struct TracingConfig {
    /// Optional tracing directives (e.g. `fanout_core=debug,info`). When
    /// absent the crate falls back to `RUST_LOG` and finally to
    /// [`default_directive`](Self::default_directive).
    pub directives: Option<String>,
    /// Fallback directive used when neither `directives` nor `RUST_LOG`
    /// resolve to a valid filter.
    pub default_directive: String,
    /// Controls whether event targets (module paths) appear in output.
    pub include_targets: bool,
    /// Controls ANSI formatting. Disable for CI logs that strip colour codes.
    pub ansi: bool,
    /// Output format for the formatter layer.
    pub output: TracingOutput,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::for_local()
    }
}

impl TracingConfig {
    /// Returns a configuration tuned for local development (pretty,
    /// ANSI-enabled output).
    pub fn for_local() -> Self {
        Self {
            directives: None,
            default_directive: "info".to_string(),
            include_targets: true,
            ansi: true,
            output: TracingOutput::Pretty,
        }
    }

    /// Returns a configuration tuned for CI or log collection environments
    /// (JSON, no ANSI).
    pub fn for_ci() -> Self {
        Self {
            directives: None,
            default_directive: "info".to_string(),
            include_targets: true,
            ansi: false,
            output: TracingOutput::Json,
        }
    }

    /// Build a configuration using environment hints.
    ///
    /// # Environment Variables
    ///
    /// - `FANOUT_TRACING_PROFILE` - Profile preset: `local` (default) or `ci`
    /// - `FANOUT_TRACING_DIRECTIVES` - Overrides tracing directives
    /// - `FANOUT_TRACING_FORMAT` - Output format: `pretty`, `compact`, or `json`
    pub fn from_env() -> Self {
        let mut config = match env::var("FANOUT_TRACING_PROFILE").as_deref() {
            Ok("ci") => Self::for_ci(),
            _ => Self::for_local(),
        };

        if let Ok(directives) = env::var("FANOUT_TRACING_DIRECTIVES") {
            if !directives.trim().is_empty() {
                config.directives = Some(directives);
            }
        }

        match env::var("FANOUT_TRACING_FORMAT").as_deref() {
            Ok("pretty") => config.output = TracingOutput::Pretty,
            Ok("compact") => config.output = TracingOutput::Compact,
            Ok("json") => config.output = TracingOutput::Json,
            _ => {}
        }

        config
    }

    fn env_filter(&self) -> EnvFilter {
        if let Some(directives) = &self.directives {
            if let Ok(filter) = EnvFilter::try_new(directives) {
                return filter;
            }
        }
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directive.clone()))
    }

    /// Install the subscriber described by this configuration as the global
    /// default.
    ///
    /// # Errors
    ///
    /// Fails if a global subscriber is already installed.
    pub fn init(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let filter = self.env_filter();
        let registry = Registry::default().with(filter);

        match self.output {
            TracingOutput::Pretty => {
                let layer = tracing_fmt::layer()
                    .with_ansi(self.ansi)
                    .with_target(self.include_targets)
                    .pretty();
                registry.with(layer).try_init()?;
            }
            TracingOutput::Compact => {
                let layer = tracing_fmt::layer()
                    .with_ansi(self.ansi)
                    .with_target(self.include_targets)
                    .compact();
                registry.with(layer).try_init()?;
            }
            TracingOutput::Json => {
                let layer = tracing_fmt::layer()
                    .with_ansi(false)
                    .with_target(self.include_targets)
                    .json();
                registry.with(layer).try_init()?;
            }
        }
        Ok(())
    }
}

/// Install the environment-derived subscriber, ignoring the error when one
/// is already installed. Intended for tests and benchmarks where multiple
/// entry points race to initialise logging.
pub fn init_for_tests() {
    let _ = TracingConfig::from_env().init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_preset_is_pretty_with_ansi() {
        let config = TracingConfig::for_local();
        assert!(config.ansi);
        assert_eq!(config.output, TracingOutput::Pretty);
    }

    #[test]
    fn ci_preset_is_json_without_ansi() {
        let config = TracingConfig::for_ci();
        assert!(!config.ansi);
        assert_eq!(config.output, TracingOutput::Json);
    }

    #[test]
    fn invalid_directives_fall_back() {
        let config = TracingConfig {
            directives: Some("][not-a-filter".to_string()),
            ..TracingConfig::for_local()
        };
        // Falls back without panicking
        let _ = config.env_filter();
    }
}
