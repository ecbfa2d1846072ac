//! Document Metadata
//!
//! Reads the title block (`#header h1`, `#author`, `#revnumber`) and the
//! last-updated line at the end of `#footer-text`.

use crate::extractor::document::{Document, NodeId};
use crate::extractor::error::{ExtractError, ExtractResult, FragmentLocation};
use crate::extractor::model::Metadata;

const HEADER_ID: &str = "header";
const AUTHOR_ID: &str = "author";
const REVNUMBER_ID: &str = "revnumber";
const FOOTER_ID: &str = "footer-text";

/// Extract the metadata block.
///
/// # Errors
/// Returns a structural mismatch when the header or its title is missing.
/// Author, revision and footer are optional and default to empty strings.
pub fn extract_metadata(doc: &Document) -> ExtractResult<Metadata> {
    let header = doc.by_id(HEADER_ID).ok_or_else(|| {
        ExtractError::structural(
            "document has no #header block",
            FragmentLocation::section(HEADER_ID),
        )
    })?;
    let title = doc
        .descendants_named(header, "h1")
        .first()
        .map(|h1| doc.cell_text(*h1))
        .ok_or_else(|| {
            ExtractError::structural("#header has no title", FragmentLocation::section(HEADER_ID))
        })?;

    let text_of = |html_id: &str| {
        doc.by_id(html_id)
            .map(|node| doc.text_content(node).trim().to_string())
            .unwrap_or_default()
    };

    let metadata = Metadata {
        title,
        author: text_of(AUTHOR_ID),
        revnumber: text_of(REVNUMBER_ID),
        last_update: doc
            .by_id(FOOTER_ID)
            .map(|footer| last_update(doc, footer))
            .unwrap_or_default(),
    };
    log::debug!("Metadata: {:?}", metadata);
    Ok(metadata)
}

/// Text of the footer's last non-blank child.
fn last_update(doc: &Document, footer: NodeId) -> String {
    doc.children_of(footer)
        .iter()
        .rev()
        .map(|child| doc.text_content(*child).trim().to_string())
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}
