// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — sniff and decode uploads, own the decoded resources, and
// render thumbnails for the upload view.

pub mod ingest;
pub mod registry;
pub mod thumbnail;

pub use ingest::{ImageHandle, ImageIngestor, RawFile};
pub use registry::ResourceRegistry;
