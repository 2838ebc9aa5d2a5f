//! Background removal service client
//!
//! Segmentation is delegated to a remote HTTP API. The pipeline talks to it
//! through the `RemovalService` trait so hosts and tests can inject their own
//! implementation.

use crate::{
    config::{ApiKey, ExtractConfig, OutputSize},
    error::{ExtractError, Result},
    types::SourceImage,
};
use async_trait::async_trait;
use image::RgbaImage;
use reqwest::{
    multipart::{Form, Part},
    Client, StatusCode,
};
use std::time::Duration;
use tracing::instrument;

/// Request header carrying the credential
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Multipart field carrying the image
pub const IMAGE_FIELD: &str = "image_file";

/// Multipart field selecting the output size
pub const SIZE_FIELD: &str = "size";

/// Trait for background removal services
#[async_trait]
pub trait RemovalService: Send + Sync {
    /// Remove the background from a canonical image
    ///
    /// Returns the cut-out with background pixels at alpha 0.
    ///
    /// # Errors
    /// - `RemovalService` for a non-success response
    /// - `Transport` when the service cannot be reached
    /// - `InvalidServiceResponse` when the body is not an image
    async fn remove_background(&self, source: &SourceImage) -> Result<RgbaImage>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

/// Client for the remove.bg HTTP API
#[derive(Debug)]
pub struct RemoveBgClient {
    client: Client,
    endpoint: String,
    api_key: ApiKey,
    output_size: OutputSize,
}

impl RemoveBgClient {
    /// Create a client from configuration
    ///
    /// # Errors
    /// - Missing API key
    /// - Failed to create HTTP client
    pub fn new(config: &ExtractConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            ExtractError::invalid_config(format!(
                "No API key configured. Set {} or pass --api-key",
                crate::config::API_KEY_ENV
            ))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            output_size: config.output_size,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_form(&self, source: &SourceImage) -> Result<Form> {
        let part = Part::bytes(source.png.clone())
            .file_name(format!("{}.png", source.file_name))
            .mime_str("image/png")?;

        Ok(Form::new()
            .part(IMAGE_FIELD, part)
            .text(SIZE_FIELD, self.output_size.as_str()))
    }
}

#[async_trait]
impl RemovalService for RemoveBgClient {
    #[instrument(skip(self, source), fields(file = %source.file_name, size = %self.output_size))]
    async fn remove_background(&self, source: &SourceImage) -> Result<RgbaImage> {
        let form = self.build_form(source)?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, self.api_key.expose())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "Removal service responded");

        decode_response(status, &body)
    }

    fn name(&self) -> &str {
        "remove.bg"
    }
}

/// Map a service response onto a cut-out or an error
///
/// Only `200 OK` counts as success, matching the service contract.
pub fn decode_response(status: StatusCode, body: &[u8]) -> Result<RgbaImage> {
    if status != StatusCode::OK {
        return Err(ExtractError::removal_service(
            status.as_u16(),
            String::from_utf8_lossy(body).into_owned(),
        ));
    }

    image::load_from_memory(body)
        .map(|image| image.to_rgba8())
        .map_err(|e| ExtractError::InvalidServiceResponse(e.to_string()))
}
