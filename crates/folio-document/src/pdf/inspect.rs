// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF inspector — read back assembled documents using the `lopdf` crate.
//
// Used by the `inspect` command and by the tests that check what the
// assembler wrote: page sizes, the image on each page, and whether the
// cross-reference table points where it claims to.

use std::path::Path;

use ::image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use folio_core::error::{FolioError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::integrity::hash_bytes;

/// One page as the inspector sees it.
#[derive(Debug, Clone, Serialize)]
pub struct PageSummary {
    /// 1-based page number.
    pub number: u32,
    pub width: f32,
    pub height: f32,
    /// First image XObject on the page, if any.
    pub image: Option<ImageSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageSummary {
    pub object_id: ObjectId,
    pub width: u32,
    pub height: u32,
    pub filter: Option<String>,
    pub color_space: Option<String>,
    /// SHA-256 of the stream bytes as stored in the file.
    pub sha256: String,
    pub has_smask: bool,
}

/// Read-only view of a PDF document.
pub struct PdfInspector {
    document: Document,
}

impl PdfInspector {
    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            FolioError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");
        Ok(Self { document })
    }

    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data)
            .map_err(|err| FolioError::PdfError(format!("failed to load PDF from memory: {err}")))?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");
        Ok(Self { document })
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Document title from the information dictionary.
    pub fn title(&self) -> Option<String> {
        let info = self.document.trailer.get(b"Info").ok()?;
        let info = self.resolve(info)?.as_dict().ok()?;
        match self.resolve(info.get(b"Title").ok()?)? {
            Object::String(bytes, _) => Some(decode_text_string(bytes)),
            _ => None,
        }
    }

    /// Summaries of every page, in page order.
    pub fn pages(&self) -> Result<Vec<PageSummary>> {
        self.document
            .get_pages()
            .into_iter()
            .map(|(number, page_id)| self.page_summary(number, page_id))
            .collect()
    }

    /// Decode the image on `page_number` (1-based) back into pixels.
    #[instrument(skip(self))]
    pub fn extract_image(&self, page_number: u32) -> Result<DynamicImage> {
        let page_id = self.page_id(page_number)?;
        let (_, stream) = self
            .page_image(page_id)?
            .ok_or_else(|| FolioError::PdfError(format!("page {page_number} has no image")))?;

        let width = dict_u32(&stream.dict, b"Width")?;
        let height = dict_u32(&stream.dict, b"Height")?;

        match first_filter(&stream.dict).as_deref() {
            Some("DCTDecode") => {
                ::image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg).map_err(
                    |err| FolioError::PdfError(format!("page {page_number}: bad JPEG data: {err}")),
                )
            }
            Some("FlateDecode") | None => {
                let samples = if stream.dict.has(b"Filter") {
                    stream.decompressed_content().map_err(|err| {
                        FolioError::PdfError(format!("page {page_number}: bad image stream: {err}"))
                    })?
                } else {
                    stream.content.clone()
                };
                raw_samples_to_image(&stream.dict, width, height, samples).ok_or_else(|| {
                    FolioError::PdfError(format!(
                        "page {page_number}: sample count does not match {width}x{height}"
                    ))
                })
            }
            Some(other) => Err(FolioError::PdfError(format!(
                "page {page_number}: unsupported image filter {other}"
            ))),
        }
    }

    fn page_id(&self, page_number: u32) -> Result<ObjectId> {
        let pages = self.document.get_pages();
        pages.get(&page_number).copied().ok_or_else(|| {
            FolioError::PdfError(format!(
                "page {} out of range (document has {} pages)",
                page_number,
                pages.len()
            ))
        })
    }

    fn page_summary(&self, number: u32, page_id: ObjectId) -> Result<PageSummary> {
        let page = self
            .document
            .get_dictionary(page_id)
            .map_err(|err| FolioError::PdfError(format!("page {number}: {err}")))?;

        let media_box = page
            .get(b"MediaBox")
            .ok()
            .and_then(|obj| self.resolve(obj))
            .and_then(|obj| obj.as_array().ok())
            .filter(|values| values.len() == 4)
            .ok_or_else(|| FolioError::PdfError(format!("page {number}: missing /MediaBox")))?;
        let coords: Vec<f32> = media_box
            .iter()
            .map(|value| value.as_float())
            .collect::<std::result::Result<_, _>>()
            .map_err(|err| FolioError::PdfError(format!("page {number}: bad /MediaBox: {err}")))?;

        let image = match self.page_image(page_id)? {
            Some((object_id, stream)) => Some(ImageSummary {
                object_id,
                width: dict_u32(&stream.dict, b"Width")?,
                height: dict_u32(&stream.dict, b"Height")?,
                filter: first_filter(&stream.dict),
                color_space: stream
                    .dict
                    .get(b"ColorSpace")
                    .and_then(Object::as_name)
                    .ok()
                    .map(|name| String::from_utf8_lossy(name).into_owned()),
                sha256: hash_bytes(&stream.content),
                has_smask: stream.dict.has(b"SMask"),
            }),
            None => None,
        };

        Ok(PageSummary {
            number,
            width: coords[2] - coords[0],
            height: coords[3] - coords[1],
            image,
        })
    }

    /// First image XObject in the page's resources.
    fn page_image(&self, page_id: ObjectId) -> Result<Option<(ObjectId, &Stream)>> {
        let page = self
            .document
            .get_dictionary(page_id)
            .map_err(|err| FolioError::PdfError(format!("page object {page_id:?}: {err}")))?;

        let Some(xobjects) = page
            .get(b"Resources")
            .ok()
            .and_then(|obj| self.resolve(obj))
            .and_then(|obj| obj.as_dict().ok())
            .and_then(|resources| resources.get(b"XObject").ok())
            .and_then(|obj| self.resolve(obj))
            .and_then(|obj| obj.as_dict().ok())
        else {
            return Ok(None);
        };

        for (_, value) in xobjects.iter() {
            let Ok(id) = value.as_reference() else {
                continue;
            };
            if let Ok(Object::Stream(stream)) = self.document.get_object(id)
                && stream.dict.get(b"Subtype").and_then(Object::as_name).ok()
                    == Some(b"Image".as_slice())
            {
                return Ok(Some((id, stream)));
            }
        }
        Ok(None)
    }

    /// Follow a reference, if `object` is one.
    fn resolve<'a>(&'a self, object: &'a Object) -> Option<&'a Object> {
        match object {
            Object::Reference(id) => self.document.get_object(*id).ok(),
            other => Some(other),
        }
    }
}

/// Check that every in-use cross-reference entry points at the start of the
/// object it names. Returns the number of entries checked.
///
/// Only classic `xref` tables are understood; that is what the assembler
/// writes.
pub fn verify_cross_references(bytes: &[u8]) -> Result<usize> {
    let startxref = find_last(bytes, b"startxref")
        .ok_or_else(|| FolioError::PdfError("no startxref keyword".into()))?;
    let tail = String::from_utf8_lossy(&bytes[startxref + b"startxref".len()..]);
    let xref_offset: usize = tail
        .split_ascii_whitespace()
        .next()
        .and_then(|token| token.parse().ok())
        .ok_or_else(|| FolioError::PdfError("startxref offset is not a number".into()))?;

    let section = bytes
        .get(xref_offset..)
        .filter(|rest| rest.starts_with(b"xref"))
        .ok_or_else(|| {
            FolioError::PdfError(format!("no xref table at offset {xref_offset}"))
        })?;
    let section = String::from_utf8_lossy(&section[b"xref".len()..]);
    let mut tokens = section.split_ascii_whitespace();

    let mut checked = 0;
    loop {
        let first = tokens
            .next()
            .ok_or_else(|| FolioError::PdfError("xref table is not terminated".into()))?;
        if first == "trailer" {
            break;
        }
        let start: u32 = parse_token(Some(first), "subsection start")?;
        let count: u32 = parse_token(tokens.next(), "subsection count")?;

        let end = start.checked_add(count).ok_or_else(|| {
            FolioError::PdfError(format!(
                "xref subsection {start} {count} runs past the last object number"
            ))
        })?;

        for id in start..end {
            let offset: usize = parse_token(tokens.next(), "entry offset")?;
            let generation: u16 = parse_token(tokens.next(), "entry generation")?;
            match tokens.next() {
                Some("n") => {
                    let header = format!("{id} {generation} obj");
                    let found = bytes
                        .get(offset..)
                        .is_some_and(|rest| rest.starts_with(header.as_bytes()));
                    if !found {
                        return Err(FolioError::PdfError(format!(
                            "xref entry for object {id} points to offset {offset}, which does not start \"{header}\""
                        )));
                    }
                    checked += 1;
                }
                Some("f") => {}
                other => {
                    return Err(FolioError::PdfError(format!(
                        "xref entry for object {id} has bad type {other:?}"
                    )));
                }
            }
        }
    }

    debug!(entries = checked, "Cross-reference table verified");
    Ok(checked)
}

fn parse_token<T: std::str::FromStr>(token: Option<&str>, what: &str) -> Result<T> {
    token
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| FolioError::PdfError(format!("bad xref {what}: {token:?}")))
}

fn find_last(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|window| window == needle)
}

fn dict_u32(dict: &Dictionary, key: &[u8]) -> Result<u32> {
    dict.get(key)
        .and_then(Object::as_i64)
        .ok()
        .and_then(|value| u32::try_from(value).ok())
        .ok_or_else(|| {
            FolioError::PdfError(format!(
                "image /{} missing or invalid",
                String::from_utf8_lossy(key)
            ))
        })
}

/// First filter name; /Filter may be a name or an array of names.
fn first_filter(dict: &Dictionary) -> Option<String> {
    let name = match dict.get(b"Filter").ok()? {
        Object::Name(name) => name.as_slice(),
        Object::Array(filters) => filters.first()?.as_name().ok()?,
        _ => return None,
    };
    Some(String::from_utf8_lossy(name).into_owned())
}

fn raw_samples_to_image(
    dict: &Dictionary,
    width: u32,
    height: u32,
    samples: Vec<u8>,
) -> Option<DynamicImage> {
    let gray = dict
        .get(b"ColorSpace")
        .and_then(Object::as_name)
        .is_ok_and(|name| name == b"DeviceGray");
    if gray {
        GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8)
    } else {
        RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8)
    }
}

/// PDF text strings are UTF-16BE when they carry a byte-order mark and
/// PDFDocEncoding (close enough to Latin-1 here) otherwise.
fn decode_text_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}
