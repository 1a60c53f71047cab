// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preview references — a temporary on-disk copy of a document that a viewer
// can open by URL. Revoking the reference deletes the copy.

use std::io::Write;
use std::path::Path;

use folio_core::error::Result;
use folio_document::DocumentBlob;
use tempfile::NamedTempFile;
use tracing::debug;

use super::data_dir;

/// A `file://` URL to a temporary copy of a document.
///
/// The copy is deleted by [`revoke`](Self::revoke) or when the reference is
/// dropped, whichever comes first.
#[derive(Debug)]
pub struct PreviewReference {
    file: NamedTempFile,
    url: String,
}

impl PreviewReference {
    /// Preview in the application's data directory.
    pub fn create(blob: &DocumentBlob) -> Result<Self> {
        Self::create_in(blob, &data_dir::data_subdir("previews"))
    }

    pub fn create_in(blob: &DocumentBlob, dir: &Path) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("preview-")
            .suffix(".pdf")
            .tempfile_in(dir)?;
        file.write_all(blob.bytes())?;
        file.flush()?;

        let url = format!("file://{}", file.path().display());
        debug!(%url, bytes = blob.len(), "Preview created");
        Ok(Self { file, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the preview copy now, reporting any failure.
    pub fn revoke(self) -> Result<()> {
        debug!(url = %self.url, "Preview revoked");
        self.file.close()?;
        Ok(())
    }
}
