// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared fixtures for service tests.

use std::io::Cursor;

use folio_document::{AssemblyOptions, DocumentAssembler, DocumentBlob, ImageIngestor, IngestSettings, RawFile};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

pub fn png_file(name: &str, width: u32, height: u32) -> RawFile {
    let image = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 90]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode test PNG");
    RawFile::new(name, bytes)
}

/// A two-page document.
pub async fn sample_blob() -> DocumentBlob {
    let ingestor = ImageIngestor::new(IngestSettings::default());
    let handles = ingestor
        .ingest_batch(vec![png_file("one.png", 20, 10), png_file("two.png", 10, 20)])
        .await
        .expect("ingest fixtures");
    let blob = DocumentAssembler::for_ingestor(&ingestor, AssemblyOptions::default())
        .assemble(&handles)
        .expect("assemble fixtures");
    ingestor.release_all(&handles);
    blob
}
