//! Filter spec grammar
//!
//! A filter spec is a `|`-separated chain of operations:
//!
//! ```text
//! fill-200x200-c50|format-webp|webpquality-80
//! ```
//!
//! | Operation | Arguments | Effect |
//! |-----------|-----------|--------|
//! | `original` | - | no resize |
//! | `fill` | `WxH[-cN]` | crop to aspect, then resize to `WxH` |
//! | `max` | `WxH` | fit inside `WxH` |
//! | `min` | `WxH` | cover `WxH` |
//! | `width` / `height` | `N` | resize one side |
//! | `scale` | `N` | percentage |
//! | `format` | `X[-options]` | output format (see [`crate::SUPPORTED_FORMATS`]) |
//! | `jpegquality` / `webpquality` / `avifquality` | `N` | encoder quality |
//!
//! None of the operations upscale.

use crate::error::FilterSpecError;
use crate::format::OutputFormat;
use crate::image::SourceImage;
use sha2::{Digest, Sha256};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// One operation of a filter spec
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Keep original geometry
    Original,
    /// Crop and resize to exact dimensions
    Fill {
        /// Target width
        width: u32,
        /// Target height
        height: u32,
        /// Crop closeness to the focal point (0-100)
        crop_closeness: Option<u32>,
    },
    /// Fit inside a box
    Max {
        /// Box width
        width: u32,
        /// Box height
        height: u32,
    },
    /// Cover a box
    Min {
        /// Box width
        width: u32,
        /// Box height
        height: u32,
    },
    /// Resize to width
    Width(u32),
    /// Resize to height
    Height(u32),
    /// Resize by percentage
    Scale(u32),
    /// Output format
    Format(OutputFormat),
    /// Encoder quality for one format
    Quality {
        /// Format the quality applies to
        format: OutputFormat,
        /// Quality 0-100
        quality: u8,
    },
}

impl Operation {
    /// Parse a single operation
    ///
    /// # Errors
    /// Returns [`FilterSpecError`] for unknown names or malformed arguments.
    pub fn parse(raw: &str) -> Result<Self, FilterSpecError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(FilterSpecError::Empty);
        }
        let (name, args) = raw.split_once('-').unwrap_or((raw, ""));

        match name {
            "original" if args.is_empty() => Ok(Self::Original),
            "original" => Err(FilterSpecError::invalid_arguments(name, args)),
            "fill" => {
                let (dims, closeness) = match args.split_once("-c") {
                    Some((dims, closeness)) => (dims, Some(closeness)),
                    None => (args, None),
                };
                let (width, height) = parse_dims(name, dims)?;
                let crop_closeness = closeness
                    .map(|c| parse_number(name, args, c))
                    .transpose()?;
                if crop_closeness.is_some_and(|c| c > 100) {
                    return Err(FilterSpecError::invalid_arguments(name, args));
                }
                Ok(Self::Fill {
                    width,
                    height,
                    crop_closeness,
                })
            }
            "max" => {
                let (width, height) = parse_dims(name, args)?;
                Ok(Self::Max { width, height })
            }
            "min" => {
                let (width, height) = parse_dims(name, args)?;
                Ok(Self::Min { width, height })
            }
            "width" => Ok(Self::Width(parse_positive(name, args)?)),
            "height" => Ok(Self::Height(parse_positive(name, args)?)),
            "scale" => Ok(Self::Scale(parse_positive(name, args)?)),
            "format" => {
                let format_name = args.split('-').next().unwrap_or_default();
                let format = OutputFormat::from(format_name);
                if format_name.is_empty() || !format.is_registered() {
                    return Err(FilterSpecError::UnsupportedFormat(format_name.to_string()));
                }
                Ok(Self::Format(format))
            }
            "jpegquality" | "webpquality" | "avifquality" => {
                let quality = parse_number(name, args, args)?;
                let quality = u8::try_from(quality)
                    .ok()
                    .filter(|q| *q <= 100)
                    .ok_or_else(|| FilterSpecError::invalid_arguments(name, args))?;
                Ok(Self::Quality {
                    format: OutputFormat::from(name.trim_end_matches("quality")),
                    quality,
                })
            }
            other => Err(FilterSpecError::UnknownOperation(other.to_string())),
        }
    }

    /// The first numeric argument (`fill-200x100` → 200, `width-640` → 640)
    #[must_use]
    pub fn spec_size(&self) -> Option<u32> {
        match self {
            Self::Fill { width, .. } | Self::Max { width, .. } | Self::Min { width, .. } => {
                Some(*width)
            }
            Self::Width(n) | Self::Height(n) | Self::Scale(n) => Some(*n),
            Self::Original | Self::Format(_) | Self::Quality { .. } => None,
        }
    }

    /// Whether the operation changes geometry
    #[inline]
    #[must_use]
    pub fn is_geometric(&self) -> bool {
        !matches!(self, Self::Format(_) | Self::Quality { .. })
    }

    /// Output geometry for an input of `(width, height)`
    #[must_use]
    pub fn apply(&self, width: u32, height: u32) -> (u32, u32) {
        let (w, h) = (f64::from(width), f64::from(height));
        match *self {
            Self::Fill {
                width: tw,
                height: th,
                ..
            } => {
                if width >= tw && height >= th {
                    return (tw, th);
                }
                let ratio = f64::from(tw) / f64::from(th);
                let crop_w = w.min(h * ratio);
                (round_px(crop_w), round_px(crop_w / ratio))
            }
            Self::Max {
                width: bw,
                height: bh,
            } => {
                let scale = (f64::from(bw) / w).min(f64::from(bh) / h);
                scaled(width, height, scale)
            }
            Self::Min {
                width: bw,
                height: bh,
            } => {
                let scale = (f64::from(bw) / w).max(f64::from(bh) / h);
                scaled(width, height, scale)
            }
            Self::Width(n) => scaled(width, height, f64::from(n) / w),
            Self::Height(n) => scaled(width, height, f64::from(n) / h),
            Self::Scale(percent) => scaled(width, height, f64::from(percent) / 100.0),
            Self::Original | Self::Format(_) | Self::Quality { .. } => (width, height),
        }
    }
}

fn scaled(width: u32, height: u32, scale: f64) -> (u32, u32) {
    if scale >= 1.0 {
        return (width, height);
    }
    (
        round_px(f64::from(width) * scale),
        round_px(f64::from(height) * scale),
    )
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_px(value: f64) -> u32 {
    value.round().max(1.0) as u32
}

fn parse_number(operation: &str, args: &str, value: &str) -> Result<u32, FilterSpecError> {
    value
        .parse::<u32>()
        .map_err(|_| FilterSpecError::invalid_arguments(operation, args))
}

fn parse_positive(operation: &str, args: &str) -> Result<u32, FilterSpecError> {
    match parse_number(operation, args, args)? {
        0 => Err(FilterSpecError::invalid_arguments(operation, args)),
        n => Ok(n),
    }
}

fn parse_dims(operation: &str, args: &str) -> Result<(u32, u32), FilterSpecError> {
    let (w, h) = args
        .split_once('x')
        .ok_or_else(|| FilterSpecError::invalid_arguments(operation, args))?;
    let width = parse_number(operation, args, w)?;
    let height = parse_number(operation, args, h)?;
    if width == 0 || height == 0 {
        return Err(FilterSpecError::invalid_arguments(operation, args));
    }
    Ok((width, height))
}

/// A validated filter spec
///
/// Keeps the raw string verbatim: it is part of rendition names and cache
/// keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterSpec {
    raw: String,
    operations: Vec<Operation>,
}

impl FilterSpec {
    /// Parse and validate a spec
    ///
    /// # Errors
    /// Returns [`FilterSpecError`] if any operation is invalid.
    pub fn parse(raw: &str) -> Result<Self, FilterSpecError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(FilterSpecError::Empty);
        }
        let operations = raw
            .split('|')
            .map(Operation::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            raw: raw.to_string(),
            operations,
        })
    }

    /// Raw spec string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// First geometric operation
    #[must_use]
    pub fn primary(&self) -> Option<&Operation> {
        self.operations.iter().find(|op| op.is_geometric())
    }

    /// Last `format-X` operation, if any
    #[must_use]
    pub fn output_format(&self) -> Option<&OutputFormat> {
        self.operations.iter().rev().find_map(|op| match op {
            Operation::Format(format) => Some(format),
            _ => None,
        })
    }

    /// This spec with a `format-X` operation appended
    #[must_use]
    pub fn with_format(&self, format: &OutputFormat) -> String {
        format!("{}|format-{}", self.raw, format)
    }

    /// Spec as it appears in rendition file names (`|` → `.`)
    #[must_use]
    pub fn file_suffix(&self) -> String {
        self.raw.replace('|', ".")
    }

    /// Output geometry for an input of `(width, height)`
    #[must_use]
    pub fn output_size(&self, width: u32, height: u32) -> (u32, u32) {
        self.operations
            .iter()
            .fold((width, height), |(w, h), op| op.apply(w, h))
    }

    /// Whether renditions of this spec depend on the image's focal point
    #[must_use]
    pub fn varies_with_focal_point(&self) -> bool {
        self.operations
            .iter()
            .any(|op| matches!(op, Operation::Fill { .. }))
    }

    /// Key distinguishing renditions of this spec across focal points
    ///
    /// Empty when the spec does not depend on the focal point.
    #[must_use]
    pub fn focal_point_key(&self, image: &SourceImage) -> String {
        if !self.varies_with_focal_point() {
            return String::new();
        }
        let vary = match image.focal_point {
            Some(fp) => format!("{}-{}-{}-{}", fp.x, fp.y, fp.width, fp.height),
            None => "none".to_string(),
        };
        let digest = Sha256::digest(vary.as_bytes());
        hex::encode(&digest[..4])
    }
}

impl Display for FilterSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for FilterSpec {
    type Err = FilterSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
