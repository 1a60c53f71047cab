// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DocumentBlob — the immutable, finished PDF produced by one assembly.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use folio_core::PDF_MEDIA_TYPE;
use folio_core::error::Result;
use tracing::info;

use crate::integrity::hash_bytes;

/// A complete PDF payload ready for preview or persistence.
///
/// The bytes are shared behind an `Arc`, so clones are cheap and every clone
/// sees the same immutable document.
#[derive(Debug, Clone)]
pub struct DocumentBlob {
    bytes: Arc<[u8]>,
    page_count: usize,
    sha256: String,
    /// Generation of the session batch this document was built from.
    batch_generation: u64,
    created_at: DateTime<Utc>,
}

impl DocumentBlob {
    pub(crate) fn new(bytes: Vec<u8>, page_count: usize) -> Self {
        let sha256 = hash_bytes(&bytes);
        Self {
            bytes: bytes.into(),
            page_count,
            sha256,
            batch_generation: 0,
            created_at: Utc::now(),
        }
    }

    pub(crate) fn with_generation(mut self, generation: u64) -> Self {
        self.batch_generation = generation;
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Always `application/pdf`.
    pub fn media_type(&self) -> &'static str {
        PDF_MEDIA_TYPE
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Lowercase hex SHA-256 of the document bytes.
    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    pub fn batch_generation(&self) -> u64 {
        self.batch_generation
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Write the document to `path`, replacing any existing file.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), &self.bytes)?;
        info!(
            path = %path.as_ref().display(),
            bytes = self.bytes.len(),
            pages = self.page_count,
            "Wrote PDF"
        );
        Ok(())
    }
}
