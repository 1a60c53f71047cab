// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Session — the current batch of uploads and the document built from it.
//
// State lives behind a std `Mutex` that is never held across an `.await`.
// Replacing or clearing the batch is refused while an assembly runs, and an
// ingestion that finishes after a newer batch request loses: its handles are
// released instead of committed.

use std::sync::{Mutex, MutexGuard, PoisonError};

use folio_core::AppConfig;
use folio_core::error::{FolioError, Result};
use tracing::{debug, info, instrument, warn};

use crate::blob::DocumentBlob;
use crate::image::ingest::{ImageHandle, ImageIngestor, IngestSettings, RawFile};
use crate::pdf::assembler::{AssemblyOptions, DocumentAssembler};

#[derive(Debug, Default)]
struct SessionState {
    batch: Vec<ImageHandle>,
    /// Bumped whenever `batch` is replaced or cleared.
    generation: u64,
    /// Ticket of the most recent `load_batch` or `clear`.
    latest_request: u64,
    assembling: bool,
    blob: Option<DocumentBlob>,
}

/// One user's working set: uploaded images, then the PDF built from them.
#[derive(Debug)]
pub struct Session {
    ingestor: ImageIngestor,
    assembler: DocumentAssembler,
    state: Mutex<SessionState>,
}

impl Session {
    pub fn new(config: &AppConfig) -> Self {
        let ingestor = ImageIngestor::new(IngestSettings::from(config));
        let assembler = DocumentAssembler::for_ingestor(&ingestor, AssemblyOptions::from(config));
        Self {
            ingestor,
            assembler,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn ingestor(&self) -> &ImageIngestor {
        &self.ingestor
    }

    pub fn assembler(&self) -> &DocumentAssembler {
        &self.assembler
    }

    // -- Batch ----------------------------------------------------------------

    /// Ingest `files` and make them the current batch.
    ///
    /// The previous batch is released and its document dropped only once
    /// the new batch has been ingested successfully; on error the session is
    /// left as it was.
    #[instrument(skip_all, fields(files = files.len()))]
    pub async fn load_batch(&self, files: Vec<RawFile>) -> Result<Vec<ImageHandle>> {
        let ticket = {
            let mut state = self.lock();
            if state.assembling {
                return Err(FolioError::BatchBusy);
            }
            state.latest_request += 1;
            state.latest_request
        };

        let handles = self.ingestor.ingest_batch(files).await?;

        let previous = {
            let mut state = self.lock();
            let refusal = if state.latest_request != ticket {
                Some(FolioError::BatchSuperseded)
            } else if state.assembling {
                Some(FolioError::BatchBusy)
            } else {
                None
            };
            if let Some(err) = refusal {
                drop(state);
                warn!(%err, discarded = handles.len(), "Ingested batch not committed");
                self.ingestor.release_all(&handles);
                return Err(err);
            }

            state.generation += 1;
            state.blob = None;
            info!(
                images = handles.len(),
                generation = state.generation,
                "Batch loaded"
            );
            std::mem::replace(&mut state.batch, handles.clone())
        };

        self.ingestor.release_all(&previous);
        Ok(handles)
    }

    /// Release the batch and forget the document.
    pub fn clear(&self) -> Result<()> {
        let released = {
            let mut state = self.lock();
            if state.assembling {
                return Err(FolioError::BatchBusy);
            }
            Self::reset(&mut state)
        };
        self.ingestor.release_all(&released);
        Ok(())
    }

    /// Hand back the document after it has been saved and start over.
    pub fn finish_download(&self) -> Result<Option<DocumentBlob>> {
        let (blob, released) = {
            let mut state = self.lock();
            if state.assembling {
                return Err(FolioError::BatchBusy);
            }
            let blob = state.blob.take();
            (blob, Self::reset(&mut state))
        };
        self.ingestor.release_all(&released);
        debug!(had_document = blob.is_some(), "Download finished");
        Ok(blob)
    }

    // -- Assembly -------------------------------------------------------------

    /// Assemble the current batch and keep the result as the current blob.
    #[instrument(skip(self))]
    pub async fn assemble(&self) -> Result<DocumentBlob> {
        let (snapshot, generation) = {
            let mut state = self.lock();
            if state.assembling {
                return Err(FolioError::BatchBusy);
            }
            if state.batch.is_empty() {
                return Err(FolioError::EmptyInput);
            }
            state.assembling = true;
            (state.batch.clone(), state.generation)
        };
        let _guard = AssemblingGuard { session: self };

        let blob = self
            .assembler
            .assemble_async(&snapshot)
            .await?
            .with_generation(generation);

        self.lock().blob = Some(blob.clone());
        Ok(blob)
    }

    // -- Accessors ------------------------------------------------------------

    pub fn batch(&self) -> Vec<ImageHandle> {
        self.lock().batch.clone()
    }

    pub fn current_blob(&self) -> Option<DocumentBlob> {
        self.lock().blob.clone()
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn is_assembling(&self) -> bool {
        self.lock().assembling
    }

    /// Thumbnail of the `index`-th image in the batch.
    pub fn thumbnail(&self, index: usize, edge: u32) -> Option<Result<Vec<u8>>> {
        let handle = self.lock().batch.get(index).cloned()?;
        Some(self.ingestor.thumbnail(&handle, edge))
    }

    // -- Helpers --------------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Empty the batch under the lock; the caller releases what is returned.
    fn reset(state: &mut SessionState) -> Vec<ImageHandle> {
        state.latest_request += 1;
        state.generation += 1;
        state.blob = None;
        std::mem::take(&mut state.batch)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        let remaining = std::mem::take(&mut state.batch);
        if !remaining.is_empty() {
            warn!(images = remaining.len(), "Session dropped with a live batch; releasing");
            self.ingestor.release_all(&remaining);
        }
    }
}

/// Clears the assembling flag however `assemble` exits.
struct AssemblingGuard<'a> {
    session: &'a Session,
}

impl Drop for AssemblingGuard<'_> {
    fn drop(&mut self) {
        self.session.lock().assembling = false;
    }
}
