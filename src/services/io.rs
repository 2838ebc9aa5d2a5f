//! Upload and output file I/O
//!
//! This module keeps filesystem access out of the pipeline. The processor
//! only sees in-memory `Upload`s; hosts use these helpers to read inputs and
//! write downloads.

use crate::{
    error::{ExtractError, Result},
    types::{encode_png, masked_file_name, Upload},
};
use image::{DynamicImage, RgbImage};
use std::path::{Path, PathBuf};

/// Prefix of overlay preview files written by hosts
pub const OVERLAY_PREFIX: &str = "overlay_";

/// Service for reading uploads and writing results
pub struct UploadIOService;

impl UploadIOService {
    /// Read a file into an `Upload` named after its final path component
    ///
    /// # Errors
    /// - File missing or unreadable
    pub fn read_upload<P: AsRef<Path>>(path: P) -> Result<Upload> {
        let path_ref = path.as_ref();
        let bytes = std::fs::read(path_ref).map_err(|e| {
            ExtractError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read upload '{}': {}", path_ref.display(), e),
            ))
        })?;

        let file_name = path_ref
            .file_name()
            .map_or_else(|| path_ref.display().to_string(), |n| n.to_string_lossy().into_owned());

        log::debug!("Read {} ({} bytes)", path_ref.display(), bytes.len());
        Ok(Upload::new(file_name, bytes))
    }

    /// Write bytes into `dir/name`, creating `dir` if needed
    pub fn write_output<P: AsRef<Path>>(dir: P, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let dir_ref = dir.as_ref();
        std::fs::create_dir_all(dir_ref).map_err(|e| {
            ExtractError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create output directory '{}': {}", dir_ref.display(), e),
            ))
        })?;

        let path = dir_ref.join(name);
        std::fs::write(&path, bytes).map_err(|e| {
            ExtractError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write '{}': {}", path.display(), e),
            ))
        })?;

        log::debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    /// Write the per-file download `masked_<file name>.png`
    pub fn write_masked<P: AsRef<Path>>(dir: P, file_name: &str, png: &[u8]) -> Result<PathBuf> {
        Self::write_output(dir, &masked_file_name(file_name), png)
    }

    /// Write an overlay preview as `overlay_<file name>.png`
    pub fn write_overlay<P: AsRef<Path>>(
        dir: P,
        file_name: &str,
        overlay: &RgbImage,
    ) -> Result<PathBuf> {
        let png = encode_png(&DynamicImage::ImageRgb8(overlay.clone()))?;
        Self::write_output(dir, &format!("{}{}.png", OVERLAY_PREFIX, file_name), &png)
    }
}
