//! Testing utilities for the picture tag workspace
//!
//! Shared fixture images, catalogs and tracing setup.

#![allow(missing_docs)]

use picture_rendition::{FocalPoint, InMemoryCatalog, SourceImage};
use std::sync::Once;

pub const MOCK_IMAGE_EXPR: &str = "mock_img";
pub const WIDE_IMAGE_EXPR: &str = "wide_img";

/// 100x100 JPEG without focal point
pub fn mock_image() -> SourceImage {
    SourceImage::new(1, "mock", "mock_img.jpg", "9f86d081884c7d65", 100, 100)
}

/// 1600x900 PNG with a focal point on the right third
pub fn wide_image() -> SourceImage {
    SourceImage::new(2, "Harbour at dusk", "harbour.png", "60303ae22b998861", 1600, 900)
        .with_focal_point(FocalPoint {
            x: 1200,
            y: 450,
            width: 200,
            height: 200,
        })
}

/// Catalog holding [`mock_image`] and [`wide_image`]
pub fn mock_catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with_image(MOCK_IMAGE_EXPR, mock_image())
        .with_image(WIDE_IMAGE_EXPR, wide_image())
}

/// Tag tokens with the image expression prepended
pub fn tokens(image_expr: &str, directives: &[&str]) -> Vec<String> {
    std::iter::once(image_expr)
        .chain(directives.iter().copied())
        .map(str::to_string)
        .collect()
}

/// Route tracing output to the test writer once per process
pub fn init_test_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
