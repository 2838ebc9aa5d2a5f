//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{Cli, CliOutputSize};
use crate::config::{ApiKey, ExtractConfig, OutputSize};
use anyhow::{Context, Result};

/// Convert CLI arguments to an `ExtractConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build and validate an `ExtractConfig` from CLI arguments
    ///
    /// The API key is optional here; the HTTP client reports a missing key
    /// when it is created.
    pub(crate) fn from_cli(cli: &Cli) -> Result<ExtractConfig> {
        let mut builder = ExtractConfig::builder()
            .output_size(Self::output_size(cli.size))
            .display_width(cli.width)
            .overlay_opacity(cli.opacity)
            .max_concurrent_requests(cli.concurrency)
            .request_timeout_secs(cli.timeout);

        if let Some(key) = &cli.api_key {
            builder = builder.api_key(ApiKey::new(key.clone()).context("Invalid --api-key")?);
        }

        if let Some(endpoint) = &cli.endpoint {
            builder = builder.endpoint(endpoint.clone());
        }

        builder.build().context("Invalid configuration")
    }

    fn output_size(size: CliOutputSize) -> OutputSize {
        match size {
            CliOutputSize::Auto => OutputSize::Auto,
            CliOutputSize::Preview => OutputSize::Preview,
            CliOutputSize::Full => OutputSize::Full,
        }
    }
}
