//! Enum Table Extractor
//!
//! Every numbered section of the enumeration chapter (`3.2. Source Language`,
//! `3.20. Decoration`, ...) documents one enumeration as a table. This module
//! turns each such table into an [`Enum`].
//!
//! # Row Shapes
//! Rows are classified by their raw column count, which counts the line-break
//! text between cells as well as the cells themselves:
//!
//! | Columns | Cells                                          |
//! |---------|------------------------------------------------|
//! | 5       | value, name (+ comment)                        |
//! | 7       | value, name (+ comment), capabilities          |
//! | > 8     | value, name (+ comment), extra operands, caps  |
//!
//! # Cell Kinds
//! Within a row, cells are walked left to right:
//! - a bare integer is the **value**
//! - a cell whose first child is wrapped in `<strong>` is the **name**, with
//!   whatever follows the emphasis as its comment
//! - an emphasized cell that links to a capability anchor lists
//!   **capabilities**; a name that links to its own definition stays a name
//! - in the widest shape, any other non-empty cell is an **extra operand**
//!
//! A cell that does not parse as an integer is not an error here; failing
//! the integer parse is what lets the cell be tried as an extra operand.
//! A data row of any other width, or one without a name, is a structural
//! mismatch for the whole section.

use crate::extractor::classifier::ID_MARKER;
use crate::extractor::document::{
    flatten_lines, parse_integer, trim_breaks, Document, NodeId, NodeKind,
};
use crate::extractor::error::{ExtractError, ExtractResult, FragmentLocation};
use crate::extractor::model::{Capabilities, Enum, EnumValue, ExtraOperand, RichText};
use crate::extractor::naming::normalize;
use crate::extractor::operand::OperandType;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// `<chapter>.<section>[.] <title>`
const HEADING_PATTERN: &str = r"^(\d+)\.(\d+)\.?\s+(.+)$";

fn heading_regex() -> Option<&'static Regex> {
    static HEADING: OnceLock<Option<Regex>> = OnceLock::new();
    HEADING.get_or_init(|| Regex::new(HEADING_PATTERN).ok()).as_ref()
}

/// Which headings name enumeration sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumSectionConfig {
    /// Chapter number of the enumeration sections
    pub chapter: u32,
    /// Section titles in that chapter that are not enumerations
    pub excluded: Vec<String>,
    /// `href` prefixes of links into the Capability section
    pub capability_links: Vec<String>,
}

impl Default for EnumSectionConfig {
    fn default() -> Self {
        Self {
            chapter: 3,
            excluded: vec!["Magic Number".to_string(), "Instructions".to_string()],
            capability_links: vec!["#Capability".to_string(), "#_a_id_capability".to_string()],
        }
    }
}

/// Row layout, derived from the raw column count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowShape {
    /// Value and name only
    Plain,
    /// Value, name and capabilities
    Capable,
    /// Value, name, capabilities and extra operands
    WithOperands,
}

impl RowShape {
    pub fn from_column_count(columns: usize) -> Option<Self> {
        match columns {
            5 => Some(Self::Plain),
            7 => Some(Self::Capable),
            c if c > 8 => Some(Self::WithOperands),
            _ => None,
        }
    }
}

/// What one enum table cell holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellKind {
    Value(u32),
    Name { name: String, comment: RichText },
    Capabilities(Capabilities),
    ExtraOperand(ExtraOperand),
    /// Blank, or not meaningful for the row shape
    Ignored,
}

/// Numbered enumeration headings in document order, with their titles.
pub fn enum_section_headings(doc: &Document, config: &EnumSectionConfig) -> Vec<(NodeId, String)> {
    doc.descendants(doc.root())
        .into_iter()
        .filter(|node| doc.is_heading(*node))
        .filter_map(|heading| {
            let text = flatten_lines(&doc.text_content(heading));
            let captures = heading_regex()?.captures(&text)?;
            let chapter: u32 = captures.get(1)?.as_str().parse().ok()?;
            let title = captures.get(3)?.as_str().trim().to_string();
            if chapter != config.chapter || config.excluded.iter().any(|e| *e == title) {
                return None;
            }
            Some((heading, title))
        })
        .collect()
}

/// Extract every enumeration section.
///
/// # Errors
/// Fails fast on the first section without a table.
pub fn extract_enums(doc: &Document, config: &EnumSectionConfig) -> ExtractResult<Vec<Enum>> {
    let headings = enum_section_headings(doc, config);
    log::info!("Found {} enumeration sections", headings.len());

    headings
        .iter()
        .map(|(heading, title)| {
            let enumeration = extract_enum_at(doc, *heading, title, config)?;
            log::debug!("  - {} ({} values)", enumeration.name, enumeration.values.len());
            Ok(enumeration)
        })
        .collect()
}

/// Extract the enumeration documented under `heading`.
///
/// # Errors
/// A missing table, a data row of unsupported width, and a row without a
/// name all fail with a [`ExtractError::StructuralMismatch`] naming the
/// section.
pub fn extract_enum_at(
    doc: &Document,
    heading: NodeId,
    title: &str,
    config: &EnumSectionConfig,
) -> ExtractResult<Enum> {
    let name = normalize(title);
    let table = table_after(doc, heading).ok_or_else(|| {
        ExtractError::structural("no table follows the heading", FragmentLocation::section(title))
    })?;

    let body = doc.children_named(table, "tbody").first().copied().unwrap_or(table);
    let mut values: Vec<EnumValue> = Vec::new();
    for (index, row) in doc.children_named(body, "tr").into_iter().enumerate() {
        // header rows hold `th` only
        if doc.cell_text(row).is_empty() || doc.children_named(row, "td").is_empty() {
            continue;
        }
        let columns = doc.children_of(row).len();
        let shape = RowShape::from_column_count(columns).ok_or_else(|| {
            ExtractError::structural(
                format!("row {} has an unsupported width of {} columns", index + 1, columns),
                FragmentLocation::section(title),
            )
        })?;
        let value = classify_row(doc, row, shape, config).ok_or_else(|| {
            ExtractError::structural(
                format!("row {} has no emphasized enumerant name", index + 1),
                FragmentLocation::section(title),
            )
        })?;
        values.push(value);
    }

    Ok(Enum {
        comment: prose_between(doc, heading, table),
        name,
        values,
    })
}

/// Classify the cells of one row and assemble the enumerant.
///
/// Returns `None` when no cell names the enumerant.
pub fn classify_row(
    doc: &Document,
    row: NodeId,
    shape: RowShape,
    config: &EnumSectionConfig,
) -> Option<EnumValue> {
    let mut numeric_value: Option<u32> = None;
    let mut named: Option<(String, RichText)> = None;
    let mut capabilities = Capabilities::new();
    let mut extra_operands: Vec<ExtraOperand> = Vec::new();

    for cell in doc.children_named(row, "td") {
        match classify_cell(doc, cell, shape, config) {
            CellKind::Value(value) if numeric_value.is_none() => numeric_value = Some(value),
            CellKind::Name { name, comment } if named.is_none() => named = Some((name, comment)),
            CellKind::Capabilities(found) if shape != RowShape::Plain => {
                capabilities.extend(found);
            }
            CellKind::ExtraOperand(operand) if shape == RowShape::WithOperands => {
                extra_operands.push(operand);
            }
            _ => {}
        }
    }

    let (name, comment) = named?;
    Some(EnumValue {
        name,
        numeric_value,
        comment,
        capabilities,
        extra_operands,
    })
}

/// Decide what a single cell holds.
pub fn classify_cell(
    doc: &Document,
    cell: NodeId,
    shape: RowShape,
    config: &EnumSectionConfig,
) -> CellKind {
    let text = doc.cell_text(cell);
    if text.is_empty() {
        return CellKind::Ignored;
    }
    if let Some(value) = parse_integer(&text) {
        return CellKind::Value(value);
    }
    if let Some(emphasis) = emphasized_lead(doc, cell) {
        if links_to_capability(doc, emphasis, config) {
            return CellKind::Capabilities(split_capabilities(&text));
        }
        let (name, comment) = name_and_comment(doc, cell, emphasis);
        return CellKind::Name { name, comment };
    }
    if shape == RowShape::WithOperands {
        return CellKind::ExtraOperand(parse_extra_operand(&text));
    }
    CellKind::Ignored
}

/// The `<strong>` element wrapping the first child of a cell, looking
/// through paragraph wrappers.
fn emphasized_lead(doc: &Document, cell: NodeId) -> Option<NodeId> {
    let mut node = cell;
    loop {
        let first = doc
            .children_of(node)
            .iter()
            .copied()
            .find(|child| !is_blank_text(doc, *child))?;
        match doc.element_name(first)? {
            "strong" | "b" => return Some(first),
            "p" | "div" | "span" => node = first,
            _ => return None,
        }
    }
}

fn links_to_capability(doc: &Document, emphasis: NodeId, config: &EnumSectionConfig) -> bool {
    doc.link_targets(emphasis).into_iter().any(|href| {
        config
            .capability_links
            .iter()
            .any(|prefix| href.starts_with(prefix.as_str()))
    })
}

fn is_blank_text(doc: &Document, node: NodeId) -> bool {
    matches!(doc.kind(node), NodeKind::Text(text) if text.trim().is_empty())
}

/// Name from the emphasis; comment from everything after it in the cell.
fn name_and_comment(doc: &Document, cell: NodeId, emphasis: NodeId) -> (String, RichText) {
    let name = flatten_lines(&doc.text_content(emphasis));

    let mut trailing: Vec<NodeId> = doc.following_siblings(emphasis).to_vec();
    let mut level = emphasis;
    while let Some(parent) = doc.parent_of(level) {
        if parent == cell {
            break;
        }
        trailing.extend_from_slice(doc.following_siblings(parent));
        level = parent;
    }

    let html: String = trailing.iter().map(|node| doc.outer_html(*node)).collect();
    let text: String = trailing.iter().map(|node| doc.text_content(*node)).collect();
    (name, RichText::new(trim_breaks(&html), flatten_lines(&text)))
}

/// Primary and alternative capability names from `"Shader, Kernel"`.
fn split_capabilities(text: &str) -> Capabilities {
    text.split(|c: char| c == ',' || c == '\n')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Type name from the first line, comment from the rest.
pub fn parse_extra_operand(text: &str) -> ExtraOperand {
    let mut lines = text.lines();
    let first = lines.next().unwrap_or_default();
    let type_name = if first.contains(ID_MARKER) {
        OperandType::Id.to_string()
    } else {
        normalize(first)
    };
    ExtraOperand {
        type_name,
        comment: lines.collect::<Vec<_>>().join(" "),
    }
}

/// First table after `heading`, before the next heading.
pub fn table_after(doc: &Document, heading: NodeId) -> Option<NodeId> {
    for sibling in doc.following_siblings(heading) {
        if doc.is_heading(*sibling) {
            return None;
        }
        if doc.is_element(*sibling, "table") {
            return Some(*sibling);
        }
        if let Some(nested) = doc.descendants_named(*sibling, "table").first() {
            return Some(*nested);
        }
    }
    None
}

/// Prose between a heading and its table.
fn prose_between(doc: &Document, heading: NodeId, table: NodeId) -> RichText {
    let mut html = String::new();
    let mut text = String::new();
    for sibling in doc.following_siblings(heading) {
        if *sibling == table || doc.descendants(*sibling).contains(&table) {
            break;
        }
        if doc.element_name(*sibling).is_none() {
            continue;
        }
        html.push_str(doc.inner_html(*sibling).trim());
        text.push_str(&doc.text_content(*sibling));
        text.push('\n');
    }
    RichText::new(html, flatten_lines(&text))
}
