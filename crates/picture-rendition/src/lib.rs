//! Picture Rendition Model
//!
//! The contract between the picture tag and the image storage layer it
//! renders against.
//!
//! # Core Types
//!
//! - [`SourceImage`]: a catalogued original image (content hash, geometry, alt text)
//! - [`FilterSpec`]: a parsed crop/resize directive such as `fill-200x200|format-webp`
//! - [`OutputFormat`]: an output encoding and the registry of accepted formats
//! - [`Rendition`]: a concrete generated variant (URL, geometry, byte size)
//! - [`RenditionService`]: the trait a storage backend implements
//!
//! # Architecture
//!
//! ```text
//! ImageCatalog ──resolve──▶ SourceImage ──(FilterSpec)──▶ RenditionService ──▶ Rendition
//! ```
//!
//! [`simulated::SimulatedRenditionService`] is a deterministic in-memory
//! backend for tests and the command line.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod catalog;
pub mod error;
pub mod filter;
pub mod format;
pub mod image;
pub mod rendition;
pub mod simulated;

pub use catalog::{ImageCatalog, InMemoryCatalog};
pub use error::{FilterSpecError, RenditionError};
pub use filter::{FilterSpec, Operation};
pub use format::{OutputFormat, SUPPORTED_FORMATS};
pub use image::{FocalPoint, SourceImage};
pub use rendition::{NewRendition, Rendition, RenditionService};
pub use simulated::{SimulatedRenditionService, SimulatorConfig};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
