//! Extended Instruction Set Extractor
//!
//! Extended instruction sets (`GLSL.std.450`, `OpenCL.std`) are documented in
//! separate files whose tables follow the same idea as the core instruction
//! tables but with their own column layout. The layout cannot be inferred
//! from the markup, so every document comes with an [`ExtendedLayout`].
//!
//! # Passes
//! 1. Enum sub-tables named by `enum_anchors` (image and sampler encodings)
//!    are extracted with the enum table extractor.
//! 2. Every remaining instruction anchor is extracted from its table, unless
//!    its category is listed in `skipped_categories`. Skipped entries are
//!    returned, never dropped silently.

use crate::extractor::classifier::{classify_with, ClassifierConfig};
use crate::extractor::config::ExtractConfig;
use crate::extractor::document::{flatten_lines, parse_integer, trim_breaks, Document, NodeId};
use crate::extractor::enums::{extract_enum_at, table_after, EnumSectionConfig};
use crate::extractor::error::{ExtractError, ExtractResult, FragmentLocation};
use crate::extractor::metadata::extract_metadata;
use crate::extractor::model::{
    Enum, ExtendedInstruction, ExtendedInstructionSet, Operands, RichText,
};
use crate::extractor::naming::{normalize, strip_numbering};
use crate::extractor::pipeline::{SkipReason, SkippedEntry, UnclassifiedCell};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Column layout and policy for one extended instruction set document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtendedLayout {
    pub language: String,
    pub version: u32,
    /// Cell of the layout row holding the instruction number
    pub number_column: usize,
    /// First cell of the layout row holding an operand
    pub operands_start: usize,
    /// Normalized categories whose entries are not extracted
    pub skipped_categories: Vec<String>,
    /// Anchor ids of the embedded enum sub-tables
    pub enum_anchors: Vec<String>,
}

impl Default for ExtendedLayout {
    fn default() -> Self {
        Self::glsl_std_450()
    }
}

impl ExtendedLayout {
    pub fn glsl_std_450() -> Self {
        Self {
            language: "GLSL.std".to_string(),
            version: 450,
            number_column: 0,
            operands_start: 1,
            skipped_categories: Vec::new(),
            enum_anchors: Vec::new(),
        }
    }

    pub fn opencl_std() -> Self {
        Self {
            language: "OpenCL.std".to_string(),
            version: 100,
            number_column: 0,
            operands_start: 1,
            skipped_categories: vec!["ImageEncoding".to_string(), "SamplerEncoding".to_string()],
            enum_anchors: vec![
                "Image_Channel_Order".to_string(),
                "Image_Channel_Data_Type".to_string(),
                "Sampler_Addressing_Mode".to_string(),
                "Sampler_Filter_Mode".to_string(),
            ],
        }
    }

    /// `language.version`, e.g. `GLSL.std.450`.
    pub fn key(&self) -> String {
        format!("{}.{}", self.language, self.version)
    }
}

/// One extended set plus what was left out of it.
#[derive(Debug, Clone)]
pub struct ExtendedOutcome {
    pub set: ExtendedInstructionSet,
    pub skipped: Vec<SkippedEntry>,
    pub unclassified: Vec<UnclassifiedCell>,
}

/// Extract one extended instruction set document.
///
/// # Errors
/// Fails fast on a structural mismatch in any extracted entry, and when two
/// entries claim the same instruction number.
pub fn extract_extended_set(
    doc: &Document,
    layout: &ExtendedLayout,
    config: &ExtractConfig,
) -> ExtractResult<ExtendedOutcome> {
    let key = layout.key();
    log::info!("Extracting extended instruction set {}", key);

    let metadata = extract_metadata(doc)?;
    let (enums, enum_tables) = extract_sub_enums(doc, layout, &config.enum_sections)?;

    let anchors: Vec<NodeId> = doc
        .descendants_named(doc.root(), "a")
        .into_iter()
        .filter(|node| is_extended_anchor(doc, *node, layout))
        .filter(|node| {
            doc.find_ancestor(*node, "table")
                .map(|table| !enum_tables.contains(&table))
                .unwrap_or(false)
        })
        .collect();
    log::info!("Found {} {} anchors", anchors.len(), key);

    let mut instructions: Vec<ExtendedInstruction> = Vec::with_capacity(anchors.len());
    let mut skipped: Vec<SkippedEntry> = Vec::new();
    let mut unclassified: Vec<UnclassifiedCell> = Vec::new();
    let mut numbers: HashMap<u32, String> = HashMap::with_capacity(anchors.len());

    for anchor in anchors {
        let original_name = doc.html_id(anchor).unwrap_or_default().to_string();
        let category = extended_category(doc, anchor).ok_or_else(|| {
            ExtractError::structural(
                "no section heading encloses the entry",
                FragmentLocation::anchor(original_name.as_str()),
            )
        })?;

        if layout.skipped_categories.iter().any(|c| *c == category) {
            log::warn!(
                "{}: skipping {} (category {} is unsupported)",
                key,
                original_name,
                category
            );
            skipped.push(SkippedEntry {
                set: key.clone(),
                name: original_name,
                category,
                reason: SkipReason::UnsupportedCategory,
            });
            continue;
        }

        let instruction = extract_entry(
            doc,
            anchor,
            category,
            layout,
            &config.classifier,
            &mut unclassified,
        )?;
        let claimed = numbers.insert(instruction.number, instruction.original_name.clone());
        if let Some(previous) = claimed {
            return Err(ExtractError::structural(
                format!(
                    "instruction number {} is claimed by both {} and {}",
                    instruction.number, previous, instruction.original_name
                ),
                FragmentLocation::anchor(instruction.original_name.as_str()),
            ));
        }
        log::debug!("  - {} ({})", instruction.name, instruction.number);
        instructions.push(instruction);
    }

    Ok(ExtendedOutcome {
        set: ExtendedInstructionSet {
            language: layout.language.clone(),
            version: layout.version,
            metadata,
            instructions,
            enums,
        },
        skipped,
        unclassified,
    })
}

/// Anchor followed by its own name, inside a table row, and not one of the
/// configured enum anchors.
pub fn is_extended_anchor(doc: &Document, node: NodeId, layout: &ExtendedLayout) -> bool {
    if !doc.is_element(node, "a") {
        return false;
    }
    let Some(id) = doc.html_id(node) else {
        return false;
    };
    if id.is_empty() || layout.enum_anchors.iter().any(|a| a == id) {
        return false;
    }
    doc.find_ancestor(node, "tr").is_some()
        && doc
            .next_sibling_of(node)
            .map(|next| doc.inner_html(next) == id)
            .unwrap_or(false)
}

/// Normalized heading of the section enclosing `node`.
pub fn extended_category(doc: &Document, node: NodeId) -> Option<String> {
    let heading = doc.nearest_heading(node)?;
    Some(normalize(strip_numbering(&doc.cell_text(heading))))
}

fn extract_entry(
    doc: &Document,
    anchor: NodeId,
    category: String,
    layout: &ExtendedLayout,
    config: &ClassifierConfig,
    unclassified: &mut Vec<UnclassifiedCell>,
) -> ExtractResult<ExtendedInstruction> {
    let original_name = doc.html_id(anchor).unwrap_or_default().to_string();
    let location = || FragmentLocation::anchor(original_name.as_str());

    let name_cell = doc
        .find_ancestor(anchor, "td")
        .ok_or_else(|| ExtractError::structural("anchor is not inside a table cell", location()))?;
    let row = doc
        .find_ancestor(name_cell, "tr")
        .ok_or_else(|| ExtractError::structural("anchor is not inside a table row", location()))?;
    let description = reassemble_comment(doc, name_cell, &original_name)?;

    let body = doc
        .parent_of(row)
        .ok_or_else(|| ExtractError::structural("table row has no parent", location()))?;
    let layout_row = doc
        .children_named(body, "tr")
        .get(1)
        .copied()
        .filter(|candidate| *candidate != row)
        .ok_or_else(|| ExtractError::structural("operand layout row is missing", location()))?;
    let cells = doc.children_named(layout_row, "td");

    let number_cell = cells.get(layout.number_column).ok_or_else(|| {
        ExtractError::structural(
            format!("layout row has no number column {}", layout.number_column),
            location(),
        )
    })?;
    let number_text = doc.cell_text(*number_cell);
    let number = parse_integer(&number_text).ok_or_else(|| {
        ExtractError::value_parse(
            number_text.as_str(),
            location().with_column(layout.number_column),
        )
    })?;

    let mut operands = Operands::new();
    for (column, cell) in cells.iter().enumerate().skip(layout.operands_start) {
        let text = doc.cell_text(*cell);
        if text.is_empty() {
            continue;
        }
        match classify_with(config, &text, doc.contains_link(*cell)).into_operand() {
            Some(operand) => operands.push(operand),
            None => {
                log::warn!(
                    "{}: operand cell {} is unclassified: {:?}",
                    original_name,
                    column,
                    text
                );
                unclassified.push(UnclassifiedCell {
                    anchor: original_name.clone(),
                    column,
                    text,
                });
            }
        }
    }

    Ok(ExtendedInstruction {
        name: normalize(&original_name),
        original_name,
        description,
        category,
        number,
        operands,
    })
}

/// Rebuild the description spread over the content blocks of a name cell.
///
/// The blocks are concatenated, the anchor-and-name boilerplate that opens
/// the first block is cut off, and surrounding line breaks are trimmed.
pub fn reassemble_comment(
    doc: &Document,
    name_cell: NodeId,
    name: &str,
) -> ExtractResult<RichText> {
    let blocks: Vec<NodeId> = doc.element_children(name_cell).collect();
    let html: String = blocks.iter().map(|block| doc.inner_html(*block)).collect();
    let boilerplate = format!("<a id=\"{name}\"></a><strong>{name}</strong>");
    let rest = html.strip_prefix(boilerplate.as_str()).ok_or_else(|| {
        ExtractError::structural(
            "name cell does not open with the anchor and name",
            FragmentLocation::anchor(name),
        )
    })?;

    let text = doc.text_content(name_cell);
    let plain = text.trim_start().strip_prefix(name).unwrap_or(&text);
    Ok(RichText::new(trim_breaks(rest), flatten_lines(plain)))
}

/// Extract the configured enum sub-tables. Returns the enums and the tables
/// they came from, so their rows are not mistaken for instructions.
fn extract_sub_enums(
    doc: &Document,
    layout: &ExtendedLayout,
    sections: &EnumSectionConfig,
) -> ExtractResult<(Option<Vec<Enum>>, HashSet<NodeId>)> {
    let mut enums: Vec<Enum> = Vec::new();
    let mut tables: HashSet<NodeId> = HashSet::new();

    for anchor_id in &layout.enum_anchors {
        let Some(anchor) = doc.by_id(anchor_id) else {
            log::warn!("{}: enum anchor '{}' not found", layout.key(), anchor_id);
            continue;
        };
        let heading = if doc.is_heading(anchor) {
            Some(anchor)
        } else {
            doc.ancestors(anchor)
                .find(|node| doc.is_heading(*node))
                .or_else(|| doc.nearest_heading(anchor))
        };
        let heading = heading.ok_or_else(|| {
            ExtractError::structural(
                "enum anchor has no heading",
                FragmentLocation::anchor(anchor_id.as_str()),
            )
        })?;
        let title = strip_numbering(&doc.cell_text(heading)).to_string();
        if let Some(table) = table_after(doc, heading) {
            tables.insert(table);
        }
        enums.push(extract_enum_at(doc, heading, &title, sections)?);
    }

    if enums.is_empty() {
        Ok((None, tables))
    } else {
        Ok((Some(enums), tables))
    }
}
