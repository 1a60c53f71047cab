// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Synthetic image files for unit tests.

use std::io::Cursor;

use ::image::codecs::jpeg::JpegEncoder;
use ::image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

use crate::image::ingest::RawFile;

/// Deterministic RGB pattern; `seed` makes images distinguishable.
pub fn pattern(width: u32, height: u32, seed: u8) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x as u8).wrapping_add(seed),
            (y as u8).wrapping_mul(3),
            seed.wrapping_mul(37),
        ])
    })
}

pub fn jpeg_bytes(width: u32, height: u32, seed: u8) -> Vec<u8> {
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, 85);
    pattern(width, height, seed)
        .write_with_encoder(encoder)
        .expect("encode test JPEG");
    buffer
}

pub fn png_bytes(image: &DynamicImage) -> Vec<u8> {
    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .expect("encode test PNG");
    buffer
}

pub fn jpeg_file(name: &str, width: u32, height: u32, seed: u8) -> RawFile {
    RawFile::new(name, jpeg_bytes(width, height, seed))
}

pub fn png_file(name: &str, width: u32, height: u32, seed: u8) -> RawFile {
    let image = DynamicImage::ImageRgb8(pattern(width, height, seed));
    RawFile::new(name, png_bytes(&image))
}

/// PNG with a horizontal alpha ramp.
pub fn rgba_png_file(name: &str, width: u32, height: u32) -> RawFile {
    let image = RgbaImage::from_fn(width, height, |x, _| {
        Rgba([200, 40, 90, (x * 255 / width.max(1)) as u8])
    });
    RawFile::new(name, png_bytes(&DynamicImage::ImageRgba8(image)))
}
