//! Shared fixtures and mock removal services for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use bg_extract::{
    error::Result, services::decode_response, types::encode_png, RemovalService, SourceImage,
    Upload,
};
use image::{
    codecs::jpeg::JpegEncoder, DynamicImage, ExtendedColorType, ImageEncoder, Rgb, RgbImage,
    Rgba, RgbaImage,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Opaque JPEG upload filled with a single color
pub fn jpeg_upload(name: &str, width: u32, height: u32) -> Upload {
    let image = RgbImage::from_pixel(width, height, Rgb([180, 90, 40]));
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, 95)
        .write_image(image.as_raw(), width, height, ExtendedColorType::Rgb8)
        .expect("Failed to encode JPEG fixture");
    Upload::new(name, bytes)
}

/// Lossless PNG upload with a gradient so pixels are distinguishable
pub fn png_upload(name: &str, width: u32, height: u32) -> Upload {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let bytes = encode_png(&DynamicImage::ImageRgb8(image)).expect("Failed to encode PNG fixture");
    Upload::new(name, bytes)
}

/// Upload whose bytes are not an image
pub fn corrupt_upload(name: &str) -> Upload {
    Upload::new(name, b"this is not an image at all".to_vec())
}

/// Color the cut-out services paint opaque pixels with
pub const CUTOUT_COLOR: Rgba<u8> = Rgba([10, 200, 30, 255]);

/// Returns a cut-out with a fully transparent top-left square
pub struct CornerCutoutService {
    pub corner: u32,
}

impl CornerCutoutService {
    pub fn cutout(width: u32, height: u32, corner: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if x < corner && y < corner {
                Rgba([250, 250, 250, 0])
            } else {
                CUTOUT_COLOR
            }
        })
    }
}

#[async_trait]
impl RemovalService for CornerCutoutService {
    async fn remove_background(&self, source: &SourceImage) -> Result<RgbaImage> {
        let (width, height) = source.dimensions();
        Ok(Self::cutout(width, height, self.corner))
    }

    fn name(&self) -> &str {
        "corner-cutout"
    }
}

/// Answers every request with a fixed HTTP status and body
pub struct FailingService {
    pub status: u16,
    pub body: &'static str,
}

#[async_trait]
impl RemovalService for FailingService {
    async fn remove_background(&self, _source: &SourceImage) -> Result<RgbaImage> {
        let status = reqwest::StatusCode::from_u16(self.status).expect("valid status code");
        decode_response(status, self.body.as_bytes())
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Sleeps a per-file delay before answering and records completion order
#[derive(Default)]
pub struct DelayedService {
    pub delays_ms: HashMap<String, u64>,
    pub completed: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl DelayedService {
    pub fn new(delays: &[(&str, u64)]) -> Self {
        Self {
            delays_ms: delays
                .iter()
                .map(|(name, ms)| ((*name).to_string(), *ms))
                .collect(),
            ..Self::default()
        }
    }

    pub fn completion_order(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemovalService for DelayedService {
    async fn remove_background(&self, source: &SourceImage) -> Result<RgbaImage> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays_ms.get(&source.file_name).copied().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(delay)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.lock().unwrap().push(source.file_name.clone());

        let (width, height) = source.dimensions();
        Ok(RgbaImage::from_pixel(width, height, CUTOUT_COLOR))
    }

    fn name(&self) -> &str {
        "delayed"
    }
}

/// Read entry names of a ZIP buffer in archive order
pub fn archive_names(archive: &[u8]) -> Vec<String> {
    let mut zip = zip::ZipArchive::new(std::io::Cursor::new(archive)).expect("valid zip");
    (0..zip.len())
        .map(|i| zip.by_index(i).expect("zip entry").name().to_string())
        .collect()
}

/// Read one entry of a ZIP buffer
pub fn archive_entry(archive: &[u8], name: &str) -> Vec<u8> {
    use std::io::Read;
    let mut zip = zip::ZipArchive::new(std::io::Cursor::new(archive)).expect("valid zip");
    let mut entry = zip.by_name(name).expect("entry present");
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes).expect("readable entry");
    bytes
}
