// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document assembler — one page per image, in input order, using `lopdf`.
//
// The document is built in a local `PdfBuilder` and only turned into a
// `DocumentBlob` once every page has been added, so a failure part-way
// leaves nothing behind. Output contains no timestamps or random IDs: the
// same images with the same options always produce the same bytes.

use std::sync::Arc;

use folio_core::AppConfig;
use folio_core::error::{FolioError, Result};
use lopdf::content::{Content, Operation};
use lopdf::xref::XrefType;
use lopdf::{Document, Object, ObjectId, Stream, StringFormat, dictionary};
use tracing::{debug, info, instrument};

use super::embed::{EmbeddedImage, embed_image};
use super::geometry::{PageGeometry, PageLayout};
use crate::blob::DocumentBlob;
use crate::image::ingest::{ImageHandle, ImageIngestor};
use crate::image::registry::{DecodedImage, ResourceRegistry};

const PDF_VERSION: &str = "1.5";
const PRODUCER: &str = "Folio";
/// Resource name of the single image on each page.
const IMAGE_NAME: &str = "Im0";

/// Everything that shapes the output document.
#[derive(Debug, Clone)]
pub struct AssemblyOptions {
    pub layout: PageLayout,
    /// Embed JPEG sources without re-compression.
    pub jpeg_passthrough: bool,
    /// /Title in the document information dictionary.
    pub title: Option<String>,
    /// `assemble_async` yields to the runtime after this many pages.
    pub yield_every_pages: usize,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for AssemblyOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            layout: PageLayout::from(config),
            jpeg_passthrough: config.jpeg_passthrough,
            title: config.title.clone(),
            yield_every_pages: config.yield_every_pages,
        }
    }
}

/// Builds PDF documents from image handles.
///
/// Handles are resolved against the registry of the ingestor that created
/// them; a handle released before assembly fails the whole call.
#[derive(Debug, Clone)]
pub struct DocumentAssembler {
    options: AssemblyOptions,
    registry: ResourceRegistry,
}

impl DocumentAssembler {
    pub fn new(options: AssemblyOptions, registry: ResourceRegistry) -> Self {
        Self { options, registry }
    }

    /// Assembler sharing `ingestor`'s resources.
    pub fn for_ingestor(ingestor: &ImageIngestor, options: AssemblyOptions) -> Self {
        Self::new(options, ingestor.registry().clone())
    }

    pub fn options(&self) -> &AssemblyOptions {
        &self.options
    }

    /// Assemble `images` into one document, one page each, in order.
    #[instrument(skip_all, fields(images = images.len()))]
    pub fn assemble(&self, images: &[ImageHandle]) -> Result<DocumentBlob> {
        let resolved = self.resolve(images)?;
        let mut builder = PdfBuilder::new(&self.options);
        for (handle, decoded) in images.iter().zip(&resolved) {
            builder.push_page(handle, decoded)?;
        }
        builder.finish()
    }

    /// Like [`assemble`](Self::assemble), but encodes each image on the
    /// blocking pool and yields to the runtime every `yield_every_pages`
    /// pages, so long batches don't starve other tasks.
    ///
    /// Pages are still added one at a time by this task alone.
    #[instrument(skip_all, fields(images = images.len()))]
    pub async fn assemble_async(&self, images: &[ImageHandle]) -> Result<DocumentBlob> {
        let resolved = self.resolve(images)?;
        let every = self.options.yield_every_pages.max(1);
        let passthrough = self.options.jpeg_passthrough;
        let mut builder = PdfBuilder::new(&self.options);
        for (index, (handle, decoded)) in images.iter().zip(&resolved).enumerate() {
            let decoded = Arc::clone(decoded);
            let embedded = tokio::task::spawn_blocking(move || embed_image(&decoded, passthrough))
                .await
                .map_err(|err| {
                    FolioError::EncodingError(format!(
                        "encoder task for {} failed: {err}",
                        handle.name
                    ))
                })??;
            builder.add_page(handle, embedded)?;
            if (index + 1) % every == 0 && index + 1 < images.len() {
                tokio::task::yield_now().await;
            }
        }
        builder.finish()
    }

    /// Look up every handle before any work is done.
    fn resolve(&self, images: &[ImageHandle]) -> Result<Vec<Arc<DecodedImage>>> {
        if images.is_empty() {
            return Err(FolioError::EmptyInput);
        }
        images
            .iter()
            .map(|handle| {
                self.registry
                    .get(&handle.resource)
                    .ok_or(FolioError::ResourceInvalid(handle.resource))
            })
            .collect()
    }
}

/// Single-writer document under construction.
struct PdfBuilder<'a> {
    options: &'a AssemblyOptions,
    doc: Document,
    /// Reserved up front so pages can point at their parent.
    pages_id: ObjectId,
    kids: Vec<Object>,
    passthrough_count: usize,
}

impl<'a> PdfBuilder<'a> {
    fn new(options: &'a AssemblyOptions) -> Self {
        let mut doc = Document::with_version(PDF_VERSION);
        // Classic `xref` table; lopdf defaults to a cross-reference stream.
        doc.reference_table.cross_reference_type = XrefType::CrossReferenceTable;
        let pages_id = doc.new_object_id();
        Self {
            options,
            doc,
            pages_id,
            kids: Vec::new(),
            passthrough_count: 0,
        }
    }

    fn push_page(&mut self, handle: &ImageHandle, decoded: &DecodedImage) -> Result<()> {
        let embedded = embed_image(decoded, self.options.jpeg_passthrough)?;
        self.add_page(handle, embedded)
    }

    fn add_page(&mut self, handle: &ImageHandle, mut embedded: EmbeddedImage) -> Result<()> {
        let geometry = PageGeometry::compute(&self.options.layout, handle.width, handle.height);

        if let Some(smask) = embedded.smask.take() {
            let smask_id = self.doc.add_object(smask);
            embedded.image.dict.set("SMask", Object::Reference(smask_id));
        }
        let image_id = self.doc.add_object(embedded.image);
        if embedded.passthrough {
            self.passthrough_count += 1;
        }

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Real(geometry.image_width),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Real(geometry.image_height),
                        Object::Real(geometry.image_x),
                        Object::Real(geometry.image_y),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_bytes = content
            .encode()
            .map_err(|err| FolioError::PdfError(format!("failed to encode page content: {err}")))?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content_bytes));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => Object::Name(b"Page".to_vec()),
            "Parent" => Object::Reference(self.pages_id),
            "MediaBox" => Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(geometry.page_width),
                Object::Real(geometry.page_height),
            ]),
            "Resources" => dictionary! {
                "XObject" => dictionary! { IMAGE_NAME => Object::Reference(image_id) },
            },
            "Contents" => Object::Reference(content_id),
        });
        self.kids.push(Object::Reference(page_id));

        debug!(
            page = self.kids.len(),
            name = %handle.name,
            passthrough = embedded.passthrough,
            page_w = geometry.page_width,
            page_h = geometry.page_height,
            "Page added"
        );
        Ok(())
    }

    fn finish(mut self) -> Result<DocumentBlob> {
        let page_count = self.kids.len();

        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => Object::Name(b"Pages".to_vec()),
                "Kids" => Object::Array(self.kids),
                "Count" => Object::Integer(page_count as i64),
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => Object::Name(b"Catalog".to_vec()),
            "Pages" => Object::Reference(self.pages_id),
        });

        let mut info = dictionary! { "Producer" => Object::string_literal(PRODUCER) };
        if let Some(title) = self.options.title.as_deref() {
            info.set("Title", text_string(title));
        }
        let info_id = self.doc.add_object(info);

        self.doc.trailer.set("Root", Object::Reference(catalog_id));
        self.doc.trailer.set("Info", Object::Reference(info_id));

        let mut output = Vec::new();
        self.doc
            .save_to(&mut output)
            .map_err(|err| FolioError::PdfError(format!("failed to serialise PDF: {err}")))?;

        info!(
            pages = page_count,
            passthrough = self.passthrough_count,
            bytes = output.len(),
            "PDF assembled"
        );
        Ok(DocumentBlob::new(output, page_count))
    }
}

/// PDF text string: literal for ASCII, UTF-16BE with byte-order mark otherwise.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        Object::string_literal(text)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        bytes.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}
