// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — page geometry, image embedding, document assembly, and
// read-back inspection.

pub mod assembler;
pub(crate) mod embed;
pub mod geometry;
pub mod inspect;

pub use assembler::{AssemblyOptions, DocumentAssembler};
pub use geometry::{MAX_PAGE_PT, PageGeometry, PageLayout};
pub use inspect::{ImageSummary, PageSummary, PdfInspector, verify_cross_references};
