//! Section outline for exported PDFs, built on top of `lopdf`.

use std::collections::BTreeMap;
use std::io;

use lopdf::{Dictionary, Document, Object, ObjectId};
use thiserror::Error;

use crate::error::ReportError;
use crate::render::{Emphasis, PositionedLine};
use crate::writer::RenderedPdf;

/// Errors that can occur while embedding bookmarks into a rendered PDF document.
#[derive(Debug, Error)]
pub enum BookmarkError {
    /// The PDF bytes could not be parsed by `lopdf`.
    #[error("failed to parse PDF bytes: {0}")]
    Parse(#[from] lopdf::Error),
    /// Serializing the updated document failed.
    #[error("failed to write PDF bytes: {0}")]
    Io(#[from] io::Error),
    /// A required catalog entry was missing from the document trailer.
    #[error("PDF catalog entry is missing")]
    MissingCatalog,
    /// The catalog object was not a dictionary.
    #[error("PDF catalog entry is not a dictionary")]
    InvalidCatalog,
    /// A bookmark pointed at a page the document does not have.
    #[error("bookmark `{title}` refers to missing page {page_number}")]
    MissingPage {
        /// Title of the offending bookmark.
        title: String,
        /// The requested (1-indexed) page number.
        page_number: usize,
    },
}

/// Outline entry pointing at the page a heading landed on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bookmark {
    pub title: String,
    /// Zero-based page index.
    pub page_index: usize,
}

/// One bookmark per section heading, in document order.
pub fn section_bookmarks(lines: &[PositionedLine]) -> Vec<Bookmark> {
    lines
        .iter()
        .filter(|line| line.emphasis == Emphasis::Heading)
        .map(|line| Bookmark {
            title: line.text.clone(),
            page_index: line.page_index,
        })
        .collect()
}

impl RenderedPdf {
    /// Adds a flat outline with one entry per section heading in `lines`.
    pub fn with_section_bookmarks(self, lines: &[PositionedLine]) -> Result<Self, ReportError> {
        let bytes = apply_bookmarks(&self.bytes, &section_bookmarks(lines))?;
        Ok(Self { bytes, ..self })
    }
}

/// Applies a flat outline tree to `pdf_bytes`.
///
/// Each bookmark becomes an `/Outlines` entry with a `/Dest [page /Fit]` destination. The input
/// is returned untouched when there is nothing to add.
pub fn apply_bookmarks(pdf_bytes: &[u8], bookmarks: &[Bookmark]) -> Result<Vec<u8>, BookmarkError> {
    if bookmarks.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let mut document = Document::load_mem(pdf_bytes)?;
    let pages = document.get_pages();
    let mut entries = collect_outline_entries(&mut document, bookmarks, &pages)?;

    let outlines_id = document.new_object_id();
    link_outline_entries(outlines_id, &mut document, &mut entries);
    insert_outlines_root(outlines_id, &mut document, &entries)?;

    let mut buffer = Vec::new();
    document.save_to(&mut buffer)?;
    Ok(buffer)
}

struct OutlineEntry {
    object_id: ObjectId,
    page_ref: ObjectId,
    title: String,
}

fn collect_outline_entries(
    document: &mut Document,
    bookmarks: &[Bookmark],
    pages: &BTreeMap<u32, ObjectId>,
) -> Result<Vec<OutlineEntry>, BookmarkError> {
    bookmarks
        .iter()
        .map(|bookmark| -> Result<OutlineEntry, BookmarkError> {
            let page_number = bookmark.page_index + 1;
            let page_ref = u32::try_from(page_number)
                .ok()
                .and_then(|number| pages.get(&number).copied())
                .ok_or_else(|| BookmarkError::MissingPage {
                    title: bookmark.title.clone(),
                    page_number,
                })?;

            Ok(OutlineEntry {
                object_id: document.new_object_id(),
                page_ref,
                title: bookmark.title.clone(),
            })
        })
        .collect()
}

fn link_outline_entries(outlines_id: ObjectId, document: &mut Document, entries: &mut [OutlineEntry]) {
    for index in 0..entries.len() {
        let mut dictionary = Dictionary::new();
        dictionary.set("Title", Object::string_literal(entries[index].title.as_str()));
        dictionary.set(
            "Dest",
            Object::Array(vec![
                Object::Reference(entries[index].page_ref),
                Object::Name("Fit".into()),
            ]),
        );
        dictionary.set("Parent", Object::Reference(outlines_id));

        if index > 0 {
            dictionary.set("Prev", Object::Reference(entries[index - 1].object_id));
        }
        if index + 1 < entries.len() {
            dictionary.set("Next", Object::Reference(entries[index + 1].object_id));
        }

        document
            .objects
            .insert(entries[index].object_id, Object::Dictionary(dictionary));
    }
}

fn insert_outlines_root(
    outlines_id: ObjectId,
    document: &mut Document,
    entries: &[OutlineEntry],
) -> Result<(), BookmarkError> {
    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| BookmarkError::MissingCatalog)?;

    let mut dictionary = Dictionary::new();
    dictionary.set("Type", Object::Name("Outlines".into()));
    dictionary.set("Count", Object::Integer(entries.len() as i64));
    if let Some(first) = entries.first() {
        dictionary.set("First", Object::Reference(first.object_id));
    }
    if let Some(last) = entries.last() {
        dictionary.set("Last", Object::Reference(last.object_id));
    }

    let catalog = document
        .objects
        .get_mut(&catalog_id)
        .ok_or(BookmarkError::MissingCatalog)?
        .as_dict_mut()
        .map_err(|_| BookmarkError::InvalidCatalog)?;
    catalog.set("Outlines", Object::Reference(outlines_id));

    document
        .objects
        .insert(outlines_id, Object::Dictionary(dictionary));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PageLayout;
    use crate::render::{render, RenderInstruction};
    use crate::writer::{DocumentWriter, PdfWriter};

    fn long_report() -> Vec<PositionedLine> {
        let mut instructions = vec![RenderInstruction::title("Medical Report")];
        for section in ["Observations", "Recommendations"] {
            instructions.push(RenderInstruction::section(section));
            instructions.extend((0..30).map(|index| RenderInstruction::field("Entry", index)));
        }
        render(&instructions, &PageLayout::default())
    }

    #[test]
    fn bookmarks_follow_headings() {
        let bookmarks = section_bookmarks(&long_report());
        assert_eq!(
            bookmarks,
            [
                Bookmark {
                    title: "Observations".into(),
                    page_index: 0
                },
                Bookmark {
                    title: "Recommendations".into(),
                    page_index: 1
                },
            ]
        );
    }

    #[test]
    fn outline_is_added_to_rendered_pdf() {
        let lines = long_report();
        let pdf = PdfWriter::new("Medical Report")
            .write(&lines)
            .unwrap()
            .with_section_bookmarks(&lines)
            .unwrap();

        let document = Document::load_mem(&pdf.bytes).unwrap();
        let root = document
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .unwrap();
        let catalog = document.get_dictionary(root).unwrap();
        assert!(catalog.get(b"Outlines").is_ok());
        assert_eq!(pdf.page_count, 3);
    }

    #[test]
    fn missing_page_is_reported() {
        let pdf = PdfWriter::new("Medical Report").write(&long_report()).unwrap();
        let err = apply_bookmarks(
            &pdf.bytes,
            &[Bookmark {
                title: "Appendix".into(),
                page_index: 9,
            }],
        )
        .unwrap_err();
        assert!(matches!(err, BookmarkError::MissingPage { page_number: 10, .. }));
    }
}
