// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// folio-document — the document assembly engine.
//
// Provides image ingestion (sniff, decode, resource registry, thumbnails),
// PDF assembly (page geometry, image embedding, document finalisation), PDF
// inspection, and the explicit session state that ties a batch of images to
// the document built from it.

pub mod blob;
pub mod image;
pub mod integrity;
pub mod pdf;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

// Re-export the primary structs so callers can use `folio_document::ImageIngestor` etc.
pub use blob::DocumentBlob;
pub use image::ingest::{ImageHandle, ImageIngestor, IngestSettings, RawFile};
pub use image::registry::ResourceRegistry;
pub use pdf::assembler::{AssemblyOptions, DocumentAssembler};
pub use pdf::geometry::{PageGeometry, PageLayout};
pub use pdf::inspect::{ImageSummary, PageSummary, PdfInspector, verify_cross_references};
pub use session::Session;
