// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for image ingestion and document assembly.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// PostScript points per millimetre (72 pt per inch, 25.4 mm per inch).
pub const PT_PER_MM: f32 = 72.0 / 25.4;

/// Media type of every assembled document.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Unique identifier for a decoded image resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub Uuid);

impl ResourceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Encoding of an uploaded raster image.
///
/// Determines how the image is embedded: JPEG can be passed through to the
/// PDF unchanged, everything else is re-encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    Jpeg,
    Png,
    /// Any other raster format the decoder understands (GIF, BMP, TIFF, WebP…).
    OtherRaster,
}

impl SourceFormat {
    /// Canonical MIME type. `OtherRaster` has no single type.
    pub fn mime_type(&self) -> Option<&'static str> {
        match self {
            Self::Jpeg => Some("image/jpeg"),
            Self::Png => Some("image/png"),
            Self::OtherRaster => None,
        }
    }

    /// Infer the source format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "jpe" | "jfif" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" | "bmp" | "tif" | "tiff" | "webp" | "ico" | "tga" | "pnm" | "pbm" | "pgm"
            | "ppm" | "qoi" => Some(Self::OtherRaster),
            _ => None,
        }
    }
}

/// Whether a declared MIME type names a raster image.
///
/// `image/svg+xml` is an image type but not a raster one.
pub fn is_raster_mime(mime: &str) -> bool {
    let lower = mime.trim().to_ascii_lowercase();
    lower.starts_with("image/") && !lower.starts_with("image/svg")
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height), portrait.
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Tabloid => (279, 432),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Dimensions in PDF points (width, height), portrait.
    pub fn dimensions_pt(&self) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        (w as f32 * PT_PER_MM, h as f32 * PT_PER_MM)
    }

    /// Parse a paper name as typed on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "a4" => Some(Self::A4),
            "a3" => Some(Self::A3),
            "a5" => Some(Self::A5),
            "letter" => Some(Self::Letter),
            "legal" => Some(Self::Legal),
            "tabloid" | "ledger" => Some(Self::Tabloid),
            _ => None,
        }
    }
}

/// Page orientation on fixed-size paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageOrientation {
    Portrait,
    Landscape,
    /// Landscape for images wider than tall, portrait otherwise.
    Auto,
}

/// How the size of each page is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PageSizePolicy {
    /// Every page has the same paper size; images are scaled to fit and centred.
    Fixed(PaperSize),
    /// Each page takes the size of its image rendered at `dpi`.
    ImageNative { dpi: u32 },
}

impl Default for PageSizePolicy {
    fn default() -> Self {
        Self::Fixed(PaperSize::A4)
    }
}
