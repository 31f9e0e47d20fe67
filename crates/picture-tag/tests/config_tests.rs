//! Loading renderer configuration from disk

use picture_rendition::{OutputFormat, SimulatedRenditionService};
use picture_tag::{ConfigError, PictureConfig, PictureError, PictureRenderer, SizesStrategy};
use pretty_assertions::assert_eq;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn loads_full_config() {
    let file = write_config(
        r#"
        strategy = "media_query"
        default_formats = ["webp", "jpeg"]
        avif_name_budget = 40

        [cache]
        enabled = true
        max_capacity = 50
        ttl_secs = 300
        "#,
    );
    let config = PictureConfig::load(file.path()).unwrap();

    assert_eq!(config.strategy, SizesStrategy::MediaQuery);
    assert_eq!(config.default_formats, [OutputFormat::Webp, OutputFormat::Jpeg]);
    assert_eq!(config.avif_name_budget, 40);
    assert_eq!(config.cache.max_capacity, 50);
    assert_eq!(config.cache.ttl(), Some(Duration::from_secs(300)));
}

#[test]
fn partial_config_keeps_defaults() {
    let file = write_config("[cache]\nenabled = false\n");
    let config = PictureConfig::load(file.path()).unwrap();

    assert_eq!(config.strategy, SizesStrategy::Srcset);
    assert_eq!(config.default_formats, PictureConfig::default().default_formats);
    assert!(!config.cache.enabled);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = PictureConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn invalid_values_are_rejected() {
    let file = write_config("default_formats = []\n");
    assert!(matches!(
        PictureConfig::load(file.path()),
        Err(ConfigError::Validation(_))
    ));

    let file = write_config("strategy = \"sideways\"\n");
    assert!(matches!(
        PictureConfig::load(file.path()),
        Err(ConfigError::Toml(_))
    ));
}

#[test]
fn loaded_config_drives_renderer() {
    let file = write_config("default_formats = [\"gif\"]\n[cache]\nenabled = false\n");
    let config = PictureConfig::load(file.path()).unwrap();
    let renderer = PictureRenderer::from_config(Arc::new(SimulatedRenditionService::new()), config);

    let request = renderer.parser().parse(&["img", "width-10"]).unwrap();
    assert_eq!(request.formats().as_slice(), &[OutputFormat::Gif]);
}

#[test]
fn unregistered_default_format_is_rejected() {
    let file = write_config("default_formats = [\"bmp\"]\n");
    let err = PictureConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("bmp")));
}

#[test]
fn renderer_loads_config_file() {
    let file = write_config("strategy = \"media_query\"\n[cache]\nenabled = false\n");
    let renderer =
        PictureRenderer::load(Arc::new(SimulatedRenditionService::new()), file.path()).unwrap();
    assert_eq!(renderer.config().strategy, SizesStrategy::MediaQuery);

    let bad = write_config("default_formats = [\"tiff\"]\n");
    let err = PictureRenderer::load(Arc::new(SimulatedRenditionService::new()), bad.path())
        .unwrap_err();
    assert!(matches!(err, PictureError::Config(ConfigError::Validation(_))));
}
