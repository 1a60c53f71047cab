// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image XObject encoding.
//
// Baseline and progressive 8-bit JPEGs with one or three components go into
// the PDF untouched behind /DCTDecode. Everything else is flattened to 8-bit
// gray or RGB samples and zlib-compressed behind /FlateDecode, with any alpha
// channel split off into a soft mask.

use std::io::Write;

use ::image::DynamicImage;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use folio_core::error::{FolioError, Result};
use lopdf::{Dictionary, Object, Stream, dictionary};

use crate::image::registry::DecodedImage;

/// Image streams ready to be added to a document.
#[derive(Debug)]
pub(crate) struct EmbeddedImage {
    pub image: Stream,
    /// Alpha channel as a /DeviceGray image; the caller links it via /SMask.
    pub smask: Option<Stream>,
    /// True when the JPEG bytes were copied verbatim.
    pub passthrough: bool,
}

/// Encode one decoded image as an image XObject.
pub(crate) fn embed_image(decoded: &DecodedImage, jpeg_passthrough: bool) -> Result<EmbeddedImage> {
    let width = decoded.pixels.width();
    let height = decoded.pixels.height();

    if jpeg_passthrough
        && let Some(jpeg) = decoded.jpeg.as_deref()
        && let Some(frame) = jpeg_frame_info(jpeg)
        && frame.embeddable()
        && (frame.width, frame.height) == (width, height)
    {
        return Ok(EmbeddedImage {
            image: dct_stream(jpeg, &frame),
            smask: None,
            passthrough: true,
        });
    }

    flate_image(&decoded.pixels)
}

fn dct_stream(jpeg: &[u8], frame: &JpegFrame) -> Stream {
    let color_space = if frame.components == 1 {
        "DeviceGray"
    } else {
        "DeviceRGB"
    };
    let mut dict = image_dict(frame.width, frame.height, color_space, "DCTDecode");

    // Adobe RGB JPEGs signal that no YCbCr transform was applied.
    if frame.components == 3 && frame.adobe_transform == Some(0) {
        dict.set("DecodeParms", dictionary! { "ColorTransform" => Object::Integer(0) });
    }

    Stream::new(dict, jpeg.to_vec())
}

fn flate_image(pixels: &DynamicImage) -> Result<EmbeddedImage> {
    let width = pixels.width();
    let height = pixels.height();
    let color = pixels.color();
    let channels: u64 = if color.has_color() { 3 } else { 1 };

    let sample_bytes = u64::from(width) * u64::from(height) * channels;
    if width == 0
        || height == 0
        || usize::try_from(sample_bytes).is_err()
        || sample_bytes > u64::from(u32::MAX)
    {
        return Err(FolioError::EncodingError(format!(
            "{width}x{height} image is too large to embed"
        )));
    }

    let (samples, color_space) = if color.has_color() {
        (pixels.to_rgb8().into_raw(), "DeviceRGB")
    } else {
        (pixels.to_luma8().into_raw(), "DeviceGray")
    };

    let image = Stream::new(
        image_dict(width, height, color_space, "FlateDecode"),
        deflate(&samples)?,
    );

    let smask = if color.has_alpha() {
        let alpha: Vec<u8> = pixels.to_rgba8().pixels().map(|p| p.0[3]).collect();
        // Fully opaque masks are dropped; they only cost bytes.
        if alpha.iter().all(|&a| a == u8::MAX) {
            None
        } else {
            Some(Stream::new(
                image_dict(width, height, "DeviceGray", "FlateDecode"),
                deflate(&alpha)?,
            ))
        }
    } else {
        None
    };

    Ok(EmbeddedImage {
        image,
        smask,
        passthrough: false,
    })
}

fn image_dict(width: u32, height: u32, color_space: &str, filter: &str) -> Dictionary {
    dictionary! {
        "Type" => Object::Name(b"XObject".to_vec()),
        "Subtype" => Object::Name(b"Image".to_vec()),
        "Width" => Object::Integer(i64::from(width)),
        "Height" => Object::Integer(i64::from(height)),
        "ColorSpace" => Object::Name(color_space.as_bytes().to_vec()),
        "BitsPerComponent" => Object::Integer(8),
        "Filter" => Object::Name(filter.as_bytes().to_vec()),
    }
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder.write_all(data).map_err(zlib_error)?;
    encoder.finish().map_err(zlib_error)
}

fn zlib_error(err: std::io::Error) -> FolioError {
    FolioError::EncodingError(format!("zlib compression failed: {err}"))
}

// -- JPEG frame header --------------------------------------------------------

/// Fields of a JPEG start-of-frame segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct JpegFrame {
    pub precision: u8,
    pub width: u32,
    pub height: u32,
    pub components: u8,
    /// Transform flag from an Adobe APP14 segment, if present.
    pub adobe_transform: Option<u8>,
}

impl JpegFrame {
    /// Whether /DCTDecode with a device gray or RGB space reproduces it.
    fn embeddable(&self) -> bool {
        self.precision == 8 && matches!(self.components, 1 | 3) && self.width > 0 && self.height > 0
    }
}

/// Walk the marker segments up to the first start-of-frame.
pub(crate) fn jpeg_frame_info(data: &[u8]) -> Option<JpegFrame> {
    if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
        return None;
    }

    let mut adobe_transform = None;
    let mut pos = 2;
    loop {
        // Markers may be preceded by any number of 0xFF fill bytes.
        while *data.get(pos)? != 0xFF {
            pos += 1;
        }
        while *data.get(pos)? == 0xFF {
            pos += 1;
        }
        let marker = *data.get(pos)?;
        pos += 1;

        match marker {
            // Standalone markers without a length field.
            0x01 | 0xD0..=0xD7 => continue,
            // Start of scan or end of image before any frame header.
            0xDA | 0xD9 => return None,
            _ => {}
        }

        let length = usize::from(u16::from_be_bytes([*data.get(pos)?, *data.get(pos + 1)?]));
        if length < 2 {
            return None;
        }
        let segment = data.get(pos + 2..pos + length)?;

        let is_sof = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof {
            if segment.len() < 6 {
                return None;
            }
            return Some(JpegFrame {
                precision: segment[0],
                height: u32::from(u16::from_be_bytes([segment[1], segment[2]])),
                width: u32::from(u16::from_be_bytes([segment[3], segment[4]])),
                components: segment[5],
                adobe_transform,
            });
        }

        if marker == 0xEE && segment.len() >= 12 && segment.starts_with(b"Adobe") {
            adobe_transform = Some(segment[11]);
        }

        pos += length;
    }
}
