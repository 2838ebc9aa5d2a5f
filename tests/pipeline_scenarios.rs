//! End-to-end pipeline tests against mock removal services

mod common;

use bg_extract::{
    ExtractConfig, ExtractError, ExtractionProcessor, FileOutcome, ImageResizer, MaskOrigin,
};
use common::{
    archive_entry, archive_names, corrupt_upload, jpeg_upload, png_upload, CornerCutoutService,
    FailingService, CUTOUT_COLOR,
};
use image::{DynamicImage, Rgba, RgbImage};
use std::sync::Arc;

fn processor_with(service: Arc<dyn bg_extract::RemovalService>) -> ExtractionProcessor {
    ExtractionProcessor::with_service(ExtractConfig::default(), service).unwrap()
}

#[tokio::test]
async fn test_transparent_corner_becomes_black() {
    let processor = processor_with(Arc::new(CornerCutoutService { corner: 10 }));
    let report = processor
        .process_batch(&[jpeg_upload("photo.jpg", 100, 50)])
        .await
        .unwrap();

    assert_eq!(report.processed_count(), 1);
    assert_eq!(report.skipped_count(), 0);
    let processed = report.outcomes[0].processed().unwrap();
    assert_eq!(processed.masked.origin, MaskOrigin::Service);
    assert!(processed.service_error.is_none());

    let masked = processed.masked.image.to_rgba8();
    assert_eq!(masked.dimensions(), (100, 50));
    for y in 0..50 {
        for x in 0..100 {
            let expected = if x < 10 && y < 10 {
                Rgba([0, 0, 0, 255])
            } else {
                CUTOUT_COLOR
            };
            assert_eq!(masked.get_pixel(x, y), &expected, "pixel ({x}, {y})");
        }
    }

    // 800 / 100 = 8x
    assert_eq!(processed.display.dimensions(), (800, 400));
    assert_eq!(processed.overlay.image.dimensions(), (800, 400));

    assert_eq!(report.archive_name, "masked_images.zip");
    assert_eq!(archive_names(&report.archive), vec!["masked_photo.jpg.png"]);
    let entry = archive_entry(&report.archive, "masked_photo.jpg.png");
    assert_eq!(entry, processed.masked_png);
    let reloaded = image::load_from_memory(&entry).unwrap().to_rgba8();
    assert_eq!(reloaded.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
    assert_eq!(reloaded.get_pixel(99, 49), &CUTOUT_COLOR);
}

#[tokio::test]
async fn test_service_failure_falls_back_to_original() {
    let processor = processor_with(Arc::new(FailingService {
        status: 503,
        body: "server busy",
    }));
    let report = processor
        .process_batch(&[jpeg_upload("photo.jpg", 100, 50)])
        .await
        .unwrap();

    assert_eq!(report.processed_count(), 1);
    assert_eq!(report.fallback_count(), 1);

    let outcome = &report.outcomes[0];
    let message = outcome.error_message().unwrap();
    assert!(message.contains("503"), "{message}");
    assert!(message.contains("server busy"), "{message}");

    let processed = outcome.processed().unwrap();
    assert!(processed.used_fallback());
    assert_eq!(processed.masked.image.to_rgb8(), processed.source.image);

    assert_eq!(archive_names(&report.archive), vec!["masked_photo.jpg.png"]);
    let entry = archive_entry(&report.archive, "masked_photo.jpg.png");
    let reloaded = image::load_from_memory(&entry).unwrap().to_rgb8();
    assert_eq!(reloaded, processed.source.image);
}

#[tokio::test]
async fn test_unreadable_service_body_falls_back() {
    let processor = processor_with(Arc::new(FailingService {
        status: 200,
        body: "<html>not an image</html>",
    }));
    let processed = processor
        .process_upload(&png_upload("page.png", 8, 8))
        .await
        .unwrap();
    assert!(processed.used_fallback());
    assert!(processed.service_error.is_some());
}

#[tokio::test]
async fn test_corrupt_upload_is_skipped_in_any_position() {
    let processor = processor_with(Arc::new(CornerCutoutService { corner: 2 }));

    for uploads in [
        vec![png_upload("valid.png", 20, 10), corrupt_upload("broken.jpg")],
        vec![corrupt_upload("broken.jpg"), png_upload("valid.png", 20, 10)],
    ] {
        let report = processor.process_batch(&uploads).await.unwrap();

        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.processed_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(archive_names(&report.archive), vec!["masked_valid.png.png"]);

        for (outcome, upload) in report.outcomes.iter().zip(&uploads) {
            assert_eq!(outcome.file_name(), upload.file_name);
        }

        let failed = report
            .outcomes
            .iter()
            .find(|o| o.file_name() == "broken.jpg")
            .unwrap();
        match failed {
            FileOutcome::DecodeFailed { error, .. } => {
                assert!(matches!(error, ExtractError::Decode { .. }));
                assert!(error.to_string().contains("Could not process broken.jpg"));
            },
            FileOutcome::Processed(_) => panic!("corrupt upload was processed"),
        }
    }
}

#[tokio::test]
async fn test_archive_follows_upload_order_around_failures() {
    let processor = processor_with(Arc::new(CornerCutoutService { corner: 1 }));
    let uploads = vec![
        png_upload("c.png", 4, 4),
        corrupt_upload("x.jpg"),
        png_upload("a.png", 4, 4),
        png_upload("b.png", 4, 4),
    ];
    let report = processor.process_batch(&uploads).await.unwrap();
    assert_eq!(
        archive_names(&report.archive),
        vec!["masked_c.png.png", "masked_a.png.png", "masked_b.png.png"]
    );
}

#[tokio::test]
async fn test_empty_batch_yields_empty_archive() {
    let processor = processor_with(Arc::new(CornerCutoutService { corner: 1 }));
    let report = processor.process_batch(&[]).await.unwrap();
    assert!(report.outcomes.is_empty());
    assert!(archive_names(&report.archive).is_empty());
}

#[test]
fn test_resize_300x200_to_600() {
    let image = DynamicImage::ImageRgb8(RgbImage::new(300, 200));
    let resized = ImageResizer::resize_to_width(&image, 600).unwrap();
    assert_eq!((resized.width(), resized.height()), (600, 400));
}

#[tokio::test]
async fn test_display_width_drives_display_pair() {
    let config = ExtractConfig::builder().display_width(600).build().unwrap();
    let processor =
        ExtractionProcessor::with_service(config, Arc::new(CornerCutoutService { corner: 5 }))
            .unwrap();
    let processed = processor
        .process_upload(&png_upload("wide.png", 300, 200))
        .await
        .unwrap();

    assert_eq!(processed.display.dimensions(), (600, 400));
    assert_eq!(processed.display.original().dimensions(), (600, 400));
    assert_eq!(processed.display.masked().to_rgb8().dimensions(), (600, 400));
    // Full-resolution download is not resized
    assert_eq!(processed.masked.dimensions(), (300, 200));
}

#[tokio::test]
async fn test_overlay_extremes_reproduce_inputs() {
    let processor = processor_with(Arc::new(CornerCutoutService { corner: 3 }));
    let processed = processor
        .process_upload(&png_upload("grad.png", 40, 20))
        .await
        .unwrap();

    let original = ExtractionProcessor::overlay_at(&processed, 0.0).unwrap();
    assert_eq!(&original.image, processed.display.original());
    assert_eq!(original.caption(), "Overlay (0%)");

    let masked = ExtractionProcessor::overlay_at(&processed, 1.0).unwrap();
    assert_eq!(masked.image, processed.display.masked().to_rgb8());

    assert_eq!(processed.overlay.caption(), "Overlay (50%)");
    assert!(matches!(
        ExtractionProcessor::overlay_at(&processed, -0.5),
        Err(ExtractError::InvalidConfig(_))
    ));
}
