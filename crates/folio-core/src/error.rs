// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Folio.

use thiserror::Error;

use crate::types::ResourceId;

/// Top-level error type for all Folio operations.
#[derive(Debug, Error)]
pub enum FolioError {
    // -- Ingestion errors --
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to decode '{name}': {detail}")]
    DecodeError { name: String, detail: String },

    #[error("too many files in one batch: {count} (maximum {max})")]
    BatchTooLarge { count: usize, max: usize },

    // -- Assembly errors --
    #[error("no images to assemble")]
    EmptyInput,

    #[error("image cannot be embedded: {0}")]
    EncodingError(String),

    #[error("image resource {0} was already released")]
    ResourceInvalid(ResourceId),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    // -- Session state --
    #[error("an assembly is in progress for the current batch")]
    BatchBusy,

    #[error("batch was replaced before ingestion finished")]
    BatchSuperseded,

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FolioError {
    /// Shorthand for a decode failure on a named file.
    pub fn decode(name: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        Self::DecodeError {
            name: name.into(),
            detail: detail.to_string(),
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FolioError>;
