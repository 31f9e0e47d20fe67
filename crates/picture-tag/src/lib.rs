//! Picture Tag - responsive `<picture>` markup
//!
//! Compiles a compact template directive into a `<picture>` element with one
//! `<source>` per output format, an `<img>` fallback and `sizes`/`media`
//! hints, using whatever renditions the storage backend can produce.
//!
//! # Example
//!
//! ```rust,ignore
//! use picture_tag::prelude::*;
//! use std::sync::Arc;
//!
//! let catalog = InMemoryCatalog::new()
//!     .with_image("page.photo", SourceImage::new(1, "Harbour", "harbour.jpg", "c0ffee", 1600, 900));
//! let renderer = PictureRenderer::from_config(
//!     Arc::new(SimulatedRenditionService::new()),
//!     PictureConfig::default(),
//! );
//!
//! let html = renderer.render_tag(&["page.photo", "fill-400x300", "photo", "lazy"], &catalog)?;
//! ```
//!
//! # Pipeline
//!
//! ```text
//! tokens ─▶ DirectiveParser ─▶ PictureRequest
//!                                   │
//!              cache key ◀──────────┤ (hit: stored markup)
//!                                   ▼
//!          FormatResolver (+AVIF chain) ─▶ RenditionPlan ─▶ assemble ─▶ markup
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cache;
pub mod config;
pub mod directive;
pub mod error;
pub mod formats;
pub mod markup;
pub mod plan;
pub mod render;
pub mod resolve;
pub mod sizes;
pub mod telemetry;

pub use cache::{derive_cache_key, CacheKey, MarkupCache, MokaMarkupCache};
pub use config::{CacheConfig, PictureConfig, SizesStrategy};
pub use directive::{parse_directive, DirectiveParser, Loading, PictureRequest};
pub use error::{CacheError, ConfigError, DirectiveError, PictureError, PictureResult};
pub use formats::{group_formats, FormatSet, DEFAULT_FORMATS};
pub use markup::{assemble, escape_attr, mime_type, Attrs};
pub use plan::{sort_by_file_size, RenditionPlan};
pub use render::PictureRenderer;
pub use resolve::{avif_file_name, AvifError, FormatResolver, SpecRenditions};
pub use sizes::{derived_breakpoints, explicit_sizes, media_condition, parse_size, SizeSpec};
pub use telemetry::init_tracing;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for rendering picture tags
    pub use crate::{
        MarkupCache, MokaMarkupCache, PictureConfig, PictureRenderer, PictureRequest,
        SizesStrategy,
    };
    pub use picture_rendition::{
        ImageCatalog, InMemoryCatalog, RenditionService, SimulatedRenditionService, SourceImage,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
