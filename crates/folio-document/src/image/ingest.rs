// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image ingestor — turns uploaded files into image handles.
//
// Decoding is CPU-bound, so each file is decoded on tokio's blocking pool
// under a per-file timeout. Batches fan out one decode per file and join them
// in input order; nothing is registered until every decode has resolved.

use std::path::Path;
use std::time::Duration;

use ::image::{ImageError, ImageFormat};
use folio_core::AppConfig;
use folio_core::error::{FolioError, Result};
use folio_core::types::{ResourceId, SourceFormat, is_raster_mime};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::registry::{DecodedImage, ResourceRegistry};
use super::thumbnail::cover_thumbnail;

/// Raw bytes of one uploaded file.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    pub bytes: Vec<u8>,
    /// MIME type declared by the upload source, if any.
    pub declared_mime: Option<String>,
}

impl RawFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            declared_mime: None,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.declared_mime = Some(mime.into());
        self
    }

    /// Read a file from disk, naming it after its final path component.
    ///
    /// Well-known image extensions declare their MIME type, the way a
    /// browser upload would.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let declared_mime = path
            .extension()
            .and_then(|ext| SourceFormat::from_extension(&ext.to_string_lossy()))
            .and_then(|format| format.mime_type());
        Ok(Self {
            name,
            bytes,
            declared_mime: declared_mime.map(str::to_owned),
        })
    }
}

/// Ownership token for one decoded image.
///
/// The pixels live in the ingestor's registry until
/// [`ImageIngestor::release`] is called with this handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageHandle {
    pub resource: ResourceId,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub source_format: SourceFormat,
    /// Size of the original encoded file.
    pub byte_len: usize,
}

/// Tunables for ingestion.
#[derive(Debug, Clone)]
pub struct IngestSettings {
    /// Upper bound on decoding a single file.
    pub decode_timeout: Duration,
    pub max_batch_files: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for IngestSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            decode_timeout: config.decode_timeout(),
            max_batch_files: config.max_batch_files,
        }
    }
}

/// A decoded file not yet registered.
struct PendingImage {
    name: String,
    byte_len: usize,
    decoded: DecodedImage,
}

/// Decodes uploads and owns the resulting resources.
///
/// Clones share the same registry, so a handle produced by one clone can be
/// released through another.
#[derive(Debug, Clone)]
pub struct ImageIngestor {
    registry: ResourceRegistry,
    settings: IngestSettings,
}

impl ImageIngestor {
    pub fn new(settings: IngestSettings) -> Self {
        Self {
            registry: ResourceRegistry::new(),
            settings,
        }
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    // -- Ingestion ------------------------------------------------------------

    /// Decode one file and register it.
    #[instrument(skip(self, file), fields(name = %file.name, bytes_len = file.bytes.len()))]
    pub async fn ingest(&self, file: RawFile) -> Result<ImageHandle> {
        let pending = self.decode(file).await?;
        Ok(self.register(pending))
    }

    /// Decode a batch concurrently and register it in input order.
    ///
    /// Fail-fast: if any file fails, no handle from the batch is registered
    /// and the error of the first failing file (in input order) is returned.
    /// Dropping the returned future before it resolves registers nothing.
    #[instrument(skip_all, fields(files = files.len()))]
    pub async fn ingest_batch(&self, files: Vec<RawFile>) -> Result<Vec<ImageHandle>> {
        if files.len() > self.settings.max_batch_files {
            return Err(FolioError::BatchTooLarge {
                count: files.len(),
                max: self.settings.max_batch_files,
            });
        }

        info!(files = files.len(), "Ingesting batch");

        let decodes = files.into_iter().map(|file| self.decode(file));
        let decoded = join_all(decodes)
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()
            .inspect_err(|err| warn!(%err, "Batch rejected"))?;

        let handles: Vec<ImageHandle> = decoded.into_iter().map(|p| self.register(p)).collect();
        debug!(live = self.registry.live_count(), "Batch registered");
        Ok(handles)
    }

    // -- Release --------------------------------------------------------------

    /// Free the pixels behind `handle`. Releasing twice is a no-op.
    pub fn release(&self, handle: &ImageHandle) {
        if self.registry.remove(&handle.resource) {
            debug!(resource = %handle.resource, name = %handle.name, "Image released");
        } else {
            debug!(resource = %handle.resource, "Image already released");
        }
    }

    pub fn release_all(&self, handles: &[ImageHandle]) {
        for handle in handles {
            self.release(handle);
        }
    }

    pub fn is_live(&self, handle: &ImageHandle) -> bool {
        self.registry.contains(&handle.resource)
    }

    /// Number of handles created by this ingestor and not yet released.
    pub fn live_resources(&self) -> usize {
        self.registry.live_count()
    }

    // -- Preview --------------------------------------------------------------

    /// Square PNG thumbnail of a live image.
    pub fn thumbnail(&self, handle: &ImageHandle, edge: u32) -> Result<Vec<u8>> {
        let decoded = self
            .registry
            .get(&handle.resource)
            .ok_or(FolioError::ResourceInvalid(handle.resource))?;
        cover_thumbnail(&decoded.pixels, edge)
    }

    // -- Helpers --------------------------------------------------------------

    async fn decode(&self, file: RawFile) -> Result<PendingImage> {
        let format = sniff_format(&file)?;
        let name = file.name.clone();
        let timeout = self.settings.decode_timeout;

        let task = tokio::task::spawn_blocking(move || decode_blocking(file, format));
        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(FolioError::decode(
                name,
                format!("decoder task failed: {join_err}"),
            )),
            Err(_) => {
                warn!(%name, ?timeout, "Decode timed out");
                Err(FolioError::decode(name, format!("timed out after {timeout:?}")))
            }
        }
    }

    fn register(&self, pending: PendingImage) -> ImageHandle {
        let width = pending.decoded.pixels.width();
        let height = pending.decoded.pixels.height();
        let source_format = pending.decoded.format;
        let resource = self.registry.insert(pending.decoded);

        debug!(%resource, name = %pending.name, width, height, ?source_format, "Image registered");

        ImageHandle {
            resource,
            name: pending.name,
            width,
            height,
            source_format,
            byte_len: pending.byte_len,
        }
    }
}

/// Check the declared MIME type and sniff the real format from magic bytes.
fn sniff_format(file: &RawFile) -> Result<ImageFormat> {
    if let Some(mime) = file.declared_mime.as_deref()
        && !is_raster_mime(mime)
    {
        return Err(FolioError::UnsupportedFormat(format!(
            "'{}' is declared as {mime}",
            file.name
        )));
    }

    ::image::guess_format(&file.bytes).map_err(|_| {
        FolioError::UnsupportedFormat(format!("'{}' is not a recognised raster image", file.name))
    })
}

fn decode_blocking(file: RawFile, format: ImageFormat) -> Result<PendingImage> {
    let pixels = ::image::load_from_memory_with_format(&file.bytes, format).map_err(|err| match err {
        ImageError::Unsupported(detail) => {
            FolioError::UnsupportedFormat(format!("'{}': {detail}", file.name))
        }
        other => FolioError::decode(&file.name, other),
    })?;

    if pixels.width() == 0 || pixels.height() == 0 {
        return Err(FolioError::decode(&file.name, "image has no pixels"));
    }

    let source_format = match format {
        ImageFormat::Jpeg => SourceFormat::Jpeg,
        ImageFormat::Png => SourceFormat::Png,
        _ => SourceFormat::OtherRaster,
    };

    let byte_len = file.bytes.len();
    let jpeg = (source_format == SourceFormat::Jpeg).then_some(file.bytes);

    Ok(PendingImage {
        name: file.name,
        byte_len,
        decoded: DecodedImage {
            pixels,
            format: source_format,
            jpeg,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{jpeg_file, png_file};

    fn ingestor() -> ImageIngestor {
        ImageIngestor::new(IngestSettings::default())
    }

    #[test]
    fn read_declares_mime_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("Photo.JPG");
        let notes = dir.path().join("notes.txt");
        std::fs::write(&photo, crate::testing::jpeg_bytes(8, 8, 1)).unwrap();
        std::fs::write(&notes, b"hello").unwrap();

        let file = RawFile::read(&photo).unwrap();
        assert_eq!(file.name, "Photo.JPG");
        assert_eq!(file.declared_mime.as_deref(), Some("image/jpeg"));
        assert_eq!(RawFile::read(&notes).unwrap().declared_mime, None);
        assert!(matches!(
            RawFile::read(dir.path().join("missing.png")),
            Err(FolioError::Io(_))
        ));
    }

    #[tokio::test]
    async fn ingest_png_reports_dimensions() {
        let ingestor = ingestor();
        let handle = ingestor.ingest(png_file("a.png", 40, 30, 1)).await.unwrap();

        assert_eq!((handle.width, handle.height), (40, 30));
        assert_eq!(handle.source_format, SourceFormat::Png);
        assert_eq!(handle.name, "a.png");
        assert!(ingestor.is_live(&handle));
    }

    #[tokio::test]
    async fn ingest_jpeg_keeps_original_bytes() {
        let ingestor = ingestor();
        let file = jpeg_file("b.jpg", 64, 48, 2);
        let original = file.bytes.clone();
        let handle = ingestor.ingest(file).await.unwrap();

        assert_eq!(handle.source_format, SourceFormat::Jpeg);
        assert_eq!(handle.byte_len, original.len());
        let decoded = ingestor.registry().get(&handle.resource).unwrap();
        assert_eq!(decoded.jpeg.as_deref(), Some(original.as_slice()));
    }

    #[tokio::test]
    async fn non_image_is_unsupported() {
        let ingestor = ingestor();
        let err = ingestor
            .ingest(RawFile::new("notes.txt", b"just some text".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::UnsupportedFormat(_)), "got {err}");
        assert_eq!(ingestor.live_resources(), 0);
    }

    #[tokio::test]
    async fn declared_non_raster_mime_is_unsupported() {
        let ingestor = ingestor();
        let file = png_file("drawing.svg", 8, 8, 3).with_mime("image/svg+xml");
        let err = ingestor.ingest(file).await.unwrap_err();
        assert!(matches!(err, FolioError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn truncated_png_is_decode_error() {
        let ingestor = ingestor();
        let mut file = png_file("cut.png", 32, 32, 4);
        file.bytes.truncate(40);
        let err = ingestor.ingest(file).await.unwrap_err();
        assert!(matches!(err, FolioError::DecodeError { .. }), "got {err}");
    }

    #[tokio::test]
    async fn batch_preserves_input_order() {
        let ingestor = ingestor();
        // Larger files first so later ones tend to finish decoding earlier.
        let files = vec![
            jpeg_file("1.jpg", 900, 700, 10),
            png_file("2.png", 20, 10, 11),
            jpeg_file("3.jpg", 300, 200, 12),
            png_file("4.png", 5, 9, 13),
        ];
        let handles = ingestor.ingest_batch(files).await.unwrap();

        let names: Vec<&str> = handles.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, ["1.jpg", "2.png", "3.jpg", "4.png"]);
        assert_eq!((handles[3].width, handles[3].height), (5, 9));
        assert_eq!(ingestor.live_resources(), 4);
    }

    #[tokio::test]
    async fn batch_with_non_image_is_rejected_whole() {
        let ingestor = ingestor();
        let files = vec![
            png_file("ok.png", 10, 10, 1),
            RawFile::new("report.pdf", b"%PDF-1.4\n".to_vec()),
            jpeg_file("ok.jpg", 10, 10, 2),
        ];
        let err = ingestor.ingest_batch(files).await.unwrap_err();

        assert!(matches!(err, FolioError::UnsupportedFormat(ref d) if d.contains("report.pdf")));
        assert_eq!(ingestor.live_resources(), 0, "no partial batch may be registered");
    }

    #[tokio::test]
    async fn batch_reports_first_failure_in_input_order() {
        let ingestor = ingestor();
        let mut broken = png_file("broken.png", 16, 16, 5);
        broken.bytes.truncate(30);
        let files = vec![
            png_file("fine.png", 4, 4, 6),
            broken,
            RawFile::new("later.txt", b"text".to_vec()),
        ];
        let err = ingestor.ingest_batch(files).await.unwrap_err();
        assert!(matches!(err, FolioError::DecodeError { ref name, .. } if name == "broken.png"));
    }

    #[tokio::test]
    async fn oversized_batch_is_refused() {
        let ingestor = ImageIngestor::new(IngestSettings {
            max_batch_files: 1,
            ..IngestSettings::default()
        });
        let files = vec![png_file("a.png", 2, 2, 1), png_file("b.png", 2, 2, 2)];
        let err = ingestor.ingest_batch(files).await.unwrap_err();
        assert!(matches!(err, FolioError::BatchTooLarge { count: 2, max: 1 }));
    }

    #[tokio::test]
    async fn slow_decode_times_out() {
        let ingestor = ImageIngestor::new(IngestSettings {
            decode_timeout: Duration::ZERO,
            ..IngestSettings::default()
        });
        let err = ingestor
            .ingest(jpeg_file("big.jpg", 1600, 1200, 7))
            .await
            .unwrap_err();
        assert!(
            matches!(err, FolioError::DecodeError { ref detail, .. } if detail.contains("timed out")),
            "got {err}"
        );
        assert_eq!(ingestor.live_resources(), 0);
    }

    #[tokio::test]
    async fn release_is_idempotent() {
        let ingestor = ingestor();
        let handle = ingestor.ingest(png_file("a.png", 3, 3, 1)).await.unwrap();

        ingestor.release(&handle);
        ingestor.release(&handle);

        assert!(!ingestor.is_live(&handle));
        assert_eq!(ingestor.live_resources(), 0);
    }

    #[tokio::test]
    async fn thumbnail_of_released_handle_is_invalid() {
        let ingestor = ingestor();
        let handle = ingestor.ingest(png_file("a.png", 30, 20, 1)).await.unwrap();
        assert!(ingestor.thumbnail(&handle, 16).is_ok());

        ingestor.release(&handle);
        let err = ingestor.thumbnail(&handle, 16).unwrap_err();
        assert!(matches!(err, FolioError::ResourceInvalid(id) if id == handle.resource));
    }
}
