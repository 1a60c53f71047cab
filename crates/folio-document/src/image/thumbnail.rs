// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Square thumbnails for the upload view.

use std::io::Cursor;

use ::image::imageops::FilterType;
use ::image::{DynamicImage, ImageFormat};
use folio_core::error::{FolioError, Result};

/// Render a square PNG thumbnail of `edge` × `edge` pixels.
///
/// The image is scaled to cover the square and the overflow is cropped
/// evenly from both sides, so the thumbnail is never letterboxed.
pub fn cover_thumbnail(image: &DynamicImage, edge: u32) -> Result<Vec<u8>> {
    let edge = edge.max(1);
    let thumb = image.resize_to_fill(edge, edge, FilterType::Triangle);

    let mut buffer = Vec::new();
    thumb
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|err| FolioError::EncodingError(format!("thumbnail encoding failed: {err}")))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::RgbImage;

    #[test]
    fn thumbnail_is_square() {
        let wide = DynamicImage::ImageRgb8(RgbImage::new(400, 100));
        let png = cover_thumbnail(&wide, 64).unwrap();
        let decoded = ::image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 64));
    }

    #[test]
    fn zero_edge_is_clamped() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(10, 10));
        let png = cover_thumbnail(&img, 0).unwrap();
        let decoded = ::image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), 1);
    }
}
