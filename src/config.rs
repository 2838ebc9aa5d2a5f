//! Configuration types for extraction operations

use crate::error::{ExtractError, Result};
use serde::{Deserialize, Serialize};

/// Default removal service endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.remove.bg/v1.0/removebg";

/// Environment variable holding the removal service credential
pub const API_KEY_ENV: &str = "REMOVE_BG_API_KEY";

/// Environment variable overriding the removal service endpoint
pub const ENDPOINT_ENV: &str = "REMOVE_BG_ENDPOINT";

/// Default name of the batch archive
pub const DEFAULT_ARCHIVE_NAME: &str = "masked_images.zip";

/// Removal service credential
///
/// `Debug` and `Display` never show the key itself.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a credential, rejecting blank values
    pub fn new<S: Into<String>>(key: S) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ExtractError::invalid_config("API key cannot be empty"));
        }
        Ok(Self(key))
    }

    /// The raw credential, for the request header only
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("***")
    }
}

/// Output sizing policy sent with each removal request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputSize {
    /// Highest resolution the account allows
    #[default]
    Auto,
    /// Reduced-resolution preview
    Preview,
    /// Full resolution
    Full,
}

impl OutputSize {
    /// Form value understood by the service
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Preview => "preview",
            Self::Full => "full",
        }
    }
}

impl std::fmt::Display for OutputSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutputSize {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "preview" => Ok(Self::Preview),
            "full" => Ok(Self::Full),
            other => Err(ExtractError::invalid_config(format!(
                "Unknown output size '{}'. Expected one of: auto, preview, full",
                other
            ))),
        }
    }
}

/// Configuration for extraction runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Removal service credential (never serialized)
    #[serde(skip)]
    pub api_key: Option<ApiKey>,

    /// Removal service endpoint
    pub endpoint: String,

    /// Sizing policy sent to the service
    pub output_size: OutputSize,

    /// Width of the display images (original, masked, overlay)
    pub display_width: u32,

    /// Default overlay opacity (0.0 = original, 1.0 = masked)
    pub overlay_opacity: f32,

    /// Upper bound on removal requests in flight (1 = sequential)
    pub max_concurrent_requests: usize,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// File name of the batch archive
    pub archive_name: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            output_size: OutputSize::default(),
            display_width: 800,
            overlay_opacity: 0.5,
            max_concurrent_requests: 1,
            request_timeout_secs: 60,
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
        }
    }
}

impl ExtractConfig {
    /// Create a new configuration builder
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bg_extract::{ExtractConfig, OutputSize};
    ///
    /// let config = ExtractConfig::builder()
    ///     .output_size(OutputSize::Preview)
    ///     .display_width(600)
    ///     .overlay_opacity(0.25)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.display_width, 600);
    /// ```
    #[must_use]
    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder::default()
    }

    /// Build a configuration from the process environment
    ///
    /// Reads the credential from `REMOVE_BG_API_KEY` and an optional endpoint
    /// override from `REMOVE_BG_ENDPOINT`. A missing key is not an error here;
    /// the HTTP client rejects it when it is created.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            builder = builder.api_key(ApiKey::new(key)?);
        }
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            builder = builder.endpoint(endpoint);
        }
        builder.build()
    }

    /// Validate all configuration parameters
    ///
    /// # Errors
    /// - Display width of zero
    /// - Overlay opacity outside 0.0-1.0
    /// - Zero concurrency or timeout
    /// - Endpoint that is not an http(s) URL
    /// - Empty archive name
    pub fn validate(&self) -> Result<()> {
        if self.display_width == 0 {
            return Err(ExtractError::config_value_error(
                "display width",
                self.display_width,
                "1+",
                Some(800),
            ));
        }

        validate_opacity(self.overlay_opacity)?;

        if self.max_concurrent_requests == 0 {
            return Err(ExtractError::config_value_error(
                "max concurrent requests",
                self.max_concurrent_requests,
                "1+",
                Some(1),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ExtractError::config_value_error(
                "request timeout",
                self.request_timeout_secs,
                "1+ seconds",
                Some(60),
            ));
        }

        if !(self.endpoint.starts_with("https://") || self.endpoint.starts_with("http://")) {
            return Err(ExtractError::invalid_config(format!(
                "Endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            )));
        }

        if self.archive_name.trim().is_empty() {
            return Err(ExtractError::invalid_config("Archive name cannot be empty"));
        }

        Ok(())
    }
}

/// Check that an overlay opacity lies in 0.0-1.0
pub(crate) fn validate_opacity(opacity: f32) -> Result<()> {
    if opacity.is_nan() || !(0.0..=1.0).contains(&opacity) {
        return Err(ExtractError::config_value_error(
            "overlay opacity",
            opacity,
            "0.0-1.0",
            Some(0.5),
        ));
    }
    Ok(())
}

/// Builder for `ExtractConfig`
#[derive(Debug, Default)]
pub struct ExtractConfigBuilder {
    config: ExtractConfig,
}

impl ExtractConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.config.api_key = Some(key);
        self
    }

    #[must_use]
    pub fn endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn output_size(mut self, size: OutputSize) -> Self {
        self.config.output_size = size;
        self
    }

    #[must_use]
    pub fn display_width(mut self, width: u32) -> Self {
        self.config.display_width = width;
        self
    }

    #[must_use]
    pub fn overlay_opacity(mut self, opacity: f32) -> Self {
        self.config.overlay_opacity = opacity;
        self
    }

    #[must_use]
    pub fn max_concurrent_requests(mut self, limit: usize) -> Self {
        self.config.max_concurrent_requests = limit;
        self
    }

    #[must_use]
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn archive_name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.archive_name = name.into();
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<ExtractConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
