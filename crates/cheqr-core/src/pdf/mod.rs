//! Page images from scanned cheque PDFs.
//!
//! Scanned documents embed the scan as one image XObject per page; this
//! module pulls those images out so each page can be sent to the OCR
//! backend. JPEG streams pass through untouched, raw RGB/grayscale streams
//! are re-encoded as PNG. A document that yields no page images is rejected
//! as a whole before any per-page processing starts.

use std::io::Cursor;

use image::{DynamicImage, ImageBuffer, Luma, Rgb};
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, trace};

use crate::error::PdfError;
use crate::models::PageImage;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// A loaded scanned document.
pub struct ScannedDocument {
    doc: Document,
}

impl ScannedDocument {
    /// Parse a PDF from memory, handling empty-password encryption.
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("decrypted PDF with empty password");
        }

        if doc.get_pages().is_empty() {
            return Err(PdfError::NoPages);
        }
        Ok(Self { doc })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// One image per page, in page order.
    ///
    /// Pages without their own image XObject fall back to the document-wide
    /// image list when it lines up one-per-page; anything short of one
    /// image per page fails the whole document.
    pub fn page_images(&self) -> Result<Vec<PageImage>> {
        let pages = self.doc.get_pages();
        let mut images = Vec::with_capacity(pages.len());
        let mut missing = Vec::new();

        for (&page_number, &page_id) in &pages {
            match self.first_page_image(page_id) {
                Some((bytes, mime)) => images.push(PageImage {
                    page_number,
                    bytes,
                    mime,
                }),
                None => missing.push(page_number),
            }
        }

        if !missing.is_empty() {
            let document_wide = self.all_images();
            if document_wide.len() == pages.len() {
                debug!("no per-page XObjects, using document-wide image order");
                images = document_wide
                    .into_iter()
                    .zip(pages.keys())
                    .map(|((bytes, mime), &page_number)| PageImage {
                        page_number,
                        bytes,
                        mime,
                    })
                    .collect();
            } else {
                return Err(PdfError::ImageExtraction(format!(
                    "no scan image on page(s) {missing:?}"
                )));
            }
        }

        Ok(images)
    }

    /// First image XObject in a page's resources.
    fn first_page_image(&self, page_id: ObjectId) -> Option<(Vec<u8>, String)> {
        let page = self.doc.get_object(page_id).ok()?.as_dict().ok()?;
        let resources = match page.get(b"Resources").ok()? {
            Object::Reference(id) => self.doc.get_object(*id).ok()?.as_dict().ok()?,
            Object::Dictionary(dict) => dict,
            _ => return None,
        };
        let xobjects = match resources.get(b"XObject").ok()? {
            Object::Reference(id) => self.doc.get_object(*id).ok()?.as_dict().ok()?,
            Object::Dictionary(dict) => dict,
            _ => return None,
        };

        for (_, obj_ref) in xobjects.iter() {
            if let Ok((_, obj)) = self.doc.dereference(obj_ref) {
                if let Some(found) = decode_image_stream(obj) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Every image stream in the document, in object order.
    fn all_images(&self) -> Vec<(Vec<u8>, String)> {
        let mut found: Vec<(ObjectId, (Vec<u8>, String))> = self
            .doc
            .objects
            .iter()
            .filter_map(|(id, obj)| decode_image_stream(obj).map(|img| (*id, img)))
            .collect();
        found.sort_by_key(|(id, _)| *id);
        found.into_iter().map(|(_, img)| img).collect()
    }
}

/// Decode an image XObject stream into `(bytes, mime)`.
fn decode_image_stream(obj: &Object) -> Option<(Vec<u8>, String)> {
    let Object::Stream(stream) = obj else {
        return None;
    };
    let dict = &stream.dict;
    if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
        return None;
    }

    let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
    let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;
    trace!(width, height, "found image stream");

    let filter = dict.get(b"Filter").ok().and_then(|f| match f {
        Object::Name(name) => Some(name.as_slice()),
        Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
        _ => None,
    });

    match filter {
        // Already-compressed JPEG: pass the stream through untouched.
        Some(b"DCTDecode") => Some((stream.content.clone(), "image/jpeg".to_string())),
        // Fax, JBIG2 and JPEG 2000 scans are not supported.
        Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") | Some(b"JPXDecode") => None,
        _ => {
            let data = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());
            encode_raw_image(&data, width, height, dict)
        }
    }
}

/// Re-encode an uncompressed RGB or grayscale stream as PNG.
fn encode_raw_image(
    data: &[u8],
    width: u32,
    height: u32,
    dict: &lopdf::Dictionary,
) -> Option<(Vec<u8>, String)> {
    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);
    if bits != 8 {
        trace!(bits, "unsupported bits per component");
        return None;
    }

    let color_space = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|o| match o {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
            _ => None,
        })
        .unwrap_or(b"DeviceRGB");

    let img = match color_space {
        b"DeviceRGB" | b"RGB" => {
            let expected = (width * height * 3) as usize;
            if data.len() < expected {
                return None;
            }
            ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, data[..expected].to_vec())
                .map(DynamicImage::ImageRgb8)?
        }
        b"DeviceGray" | b"G" => {
            let expected = (width * height) as usize;
            if data.len() < expected {
                return None;
            }
            ImageBuffer::<Luma<u8>, _>::from_raw(width, height, data[..expected].to_vec())
                .map(DynamicImage::ImageLuma8)?
        }
        other => {
            trace!(color_space = %String::from_utf8_lossy(other), "unsupported color space");
            return None;
        }
    };

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .ok()?;
    Some((png, "image/png".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_rejects_garbage() {
        assert!(matches!(
            ScannedDocument::load(b"not a pdf"),
            Err(PdfError::Parse(_))
        ));
    }

    #[test]
    fn test_non_image_object_is_skipped() {
        assert!(decode_image_stream(&Object::Null).is_none());
        assert!(decode_image_stream(&Object::Integer(7)).is_none());
    }
}
