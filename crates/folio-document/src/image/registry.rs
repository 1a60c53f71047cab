// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Resource registry — owns decoded pixel data until a handle is released.
//
// Handles only carry a `ResourceId`; the pixels live here. Releasing removes
// the entry and frees the memory once no in-flight assembly still holds the
// `Arc`. The registry never releases anything on its own.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ::image::DynamicImage;
use folio_core::types::{ResourceId, SourceFormat};

/// Decoded image data behind a handle.
#[derive(Debug)]
pub(crate) struct DecodedImage {
    pub pixels: DynamicImage,
    pub format: SourceFormat,
    /// Original file bytes, kept for JPEG sources so they can be embedded
    /// without re-compression.
    pub jpeg: Option<Vec<u8>>,
}

/// Shared table of live image resources.
///
/// Cloning is cheap; clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    entries: Arc<Mutex<HashMap<ResourceId, Arc<DecodedImage>>>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ResourceId, Arc<DecodedImage>>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn insert(&self, image: DecodedImage) -> ResourceId {
        let id = ResourceId::new();
        self.lock().insert(id, Arc::new(image));
        id
    }

    pub(crate) fn get(&self, id: &ResourceId) -> Option<Arc<DecodedImage>> {
        self.lock().get(id).cloned()
    }

    /// Drop the resource. Returns `false` if it was already gone.
    pub(crate) fn remove(&self, id: &ResourceId) -> bool {
        self.lock().remove(id).is_some()
    }

    pub fn contains(&self, id: &ResourceId) -> bool {
        self.lock().contains_key(id)
    }

    /// Number of resources not yet released.
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }
}
