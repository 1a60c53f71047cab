// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Persistence — save a finished document under a `.pdf` file name.

use std::io::Write;
use std::path::{Path, PathBuf};

use folio_core::error::{FolioError, Result};
use folio_document::DocumentBlob;
use tempfile::NamedTempFile;
use tracing::{info, instrument};

const FALLBACK_FILE_NAME: &str = "document.pdf";

/// Normalise a requested file name.
///
/// Directory components are stripped, an empty name falls back to
/// `default_name`, and a `.pdf` extension is appended unless present.
pub fn pdf_file_name(requested: &str, default_name: &str) -> String {
    let base = Path::new(requested.trim())
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| default_name.to_string());

    let has_pdf_extension = Path::new(&base)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if has_pdf_extension {
        base
    } else {
        format!("{base}.pdf")
    }
}

/// Save `blob` into `dir` as `file_name` (normalised by [`pdf_file_name`]).
///
/// The bytes go to a temporary file in the same directory first and are
/// renamed into place, so an existing document is never half overwritten.
#[instrument(skip(blob), fields(bytes = blob.len()))]
pub fn save_blob(blob: &DocumentBlob, dir: &Path, file_name: &str) -> Result<PathBuf> {
    let path = dir.join(pdf_file_name(file_name, FALLBACK_FILE_NAME));

    std::fs::create_dir_all(dir)?;
    let mut staging = NamedTempFile::new_in(dir)?;
    staging.write_all(blob.bytes())?;
    staging.as_file().sync_all()?;
    staging
        .persist(&path)
        .map_err(|err| FolioError::Io(err.error))?;

    info!(
        path = %path.display(),
        pages = blob.page_count(),
        sha256 = blob.sha256(),
        "Document saved"
    );
    Ok(path)
}
