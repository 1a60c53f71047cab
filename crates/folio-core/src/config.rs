// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{PageOrientation, PageSizePolicy};

/// Persistent application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Page size policy for assembled documents.
    pub page_size: PageSizePolicy,
    /// Orientation of fixed-size pages.
    pub orientation: PageOrientation,
    /// Blank border kept around each image, in millimetres.
    pub margin_mm: f32,
    /// Embed JPEG sources unchanged instead of re-encoding them.
    pub jpeg_passthrough: bool,
    /// Title written to the document's /Info dictionary.
    pub title: Option<String>,
    /// Upper bound on the time spent decoding a single file.
    pub decode_timeout_secs: u64,
    /// Largest number of files accepted in one batch.
    pub max_batch_files: usize,
    /// The assembler yields to the runtime after this many pages.
    pub yield_every_pages: usize,
    /// File name used when saving without an explicit name.
    pub default_file_name: String,
}

impl AppConfig {
    pub fn decode_timeout(&self) -> Duration {
        Duration::from_secs(self.decode_timeout_secs.max(1))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            page_size: PageSizePolicy::default(),
            orientation: PageOrientation::Portrait,
            margin_mm: 0.0,
            jpeg_passthrough: true,
            title: None,
            decode_timeout_secs: 30,
            max_batch_files: 500,
            yield_every_pages: 16,
            default_file_name: "document.pdf".into(),
        }
    }
}
