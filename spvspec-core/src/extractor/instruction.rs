//! Instruction Row Extractor
//!
//! Finds instruction anchors and turns the table around each one into an
//! [`Instruction`].
//!
//! # Table Layout
//! ```text
//! +---------------------------------------------+--------------------+
//! | <a id="OpX"></a><strong>OpX</strong>         | Capability:        |   row 1: description
//! | description ...                              | Kernel, Int64      |          (+ capabilities)
//! +------------+--------+-----------+-----------+--------------------+
//! | word count | opcode | operand 0 | operand 1 | ...                |   row 2: layout
//! +------------+--------+-----------+-----------+--------------------+
//! ```
//!
//! # Algorithm
//! 1. Accept `a` nodes whose id looks like an instruction name and whose next
//!    sibling's markup is exactly that id (rejects footnote back-references)
//! 2. Read capabilities from the description row when it has two cells
//! 3. Read the category from the nearest enclosing section heading
//! 4. Read word count, opcode and operands from the table's second row

use crate::extractor::classifier::{classify_with, Classification, ClassifierConfig, OperandRole};
use crate::extractor::document::{flatten_lines, parse_integer, Document, NodeId};
use crate::extractor::error::{ExtractError, ExtractResult, FragmentLocation};
use crate::extractor::model::{Capabilities, Instruction, Operands, RichText};
use crate::extractor::naming::{normalize, strip_numbering};
use crate::extractor::pipeline::UnclassifiedCell;
use std::collections::HashMap;

/// Prefix every instruction name starts with.
pub const INSTRUCTION_PREFIX: &str = "Op";

/// Words dropped from a heading before it becomes a category.
const CATEGORY_BOILERPLATE: &[&str] = &["Instructions", "(Removable)"];

/// Link text that labels the capability cell rather than naming a capability.
const CAPABILITY_LABEL: &str = "Capability";

const VARIABLE_SUFFIX: &str = "+variable";

/// Instructions and the cells no rule could classify.
#[derive(Debug, Clone, Default)]
pub struct InstructionOutcome {
    pub instructions: Vec<Instruction>,
    pub unclassified: Vec<UnclassifiedCell>,
}

/// Whether an id has the shape of an instruction name: `Op` prefix, no
/// spaces, longer than the prefix, upper-case third character.
pub fn is_instruction_name(id: &str) -> bool {
    id.starts_with(INSTRUCTION_PREFIX)
        && !id.contains(' ')
        && id.len() > 2
        && id.chars().nth(2).map(char::is_uppercase).unwrap_or(false)
}

/// Whether `node` anchors an instruction description.
pub fn is_instruction_anchor(doc: &Document, node: NodeId) -> bool {
    if !doc.is_element(node, "a") {
        return false;
    }
    match doc.html_id(node) {
        Some(id) if is_instruction_name(id) => doc
            .next_sibling_of(node)
            .map(|next| doc.inner_html(next) == id)
            .unwrap_or(false),
        _ => false,
    }
}

/// Extract every instruction in document order.
///
/// # Errors
/// Fails fast on the first instruction whose table does not have the
/// expected shape, and when two instructions claim the same opcode.
pub fn extract_instructions(
    doc: &Document,
    config: &ClassifierConfig,
) -> ExtractResult<InstructionOutcome> {
    let anchors: Vec<NodeId> = doc
        .descendants_named(doc.root(), "a")
        .into_iter()
        .filter(|node| is_instruction_anchor(doc, *node))
        .collect();
    log::info!("Found {} instruction anchors", anchors.len());

    let mut outcome = InstructionOutcome {
        instructions: Vec::with_capacity(anchors.len()),
        unclassified: Vec::new(),
    };
    let mut opcodes: HashMap<u32, String> = HashMap::with_capacity(anchors.len());

    for anchor in anchors {
        let instruction = extract_instruction(doc, anchor, config, &mut outcome.unclassified)?;
        let claimed = opcodes.insert(instruction.opcode_number, instruction.name.clone());
        if let Some(previous) = claimed {
            return Err(ExtractError::structural(
                format!(
                    "opcode {} is claimed by both {} and {}",
                    instruction.opcode_number, previous, instruction.name
                ),
                FragmentLocation::anchor(&instruction.name),
            ));
        }
        log::debug!(
            "  - {} (opcode {}, {} operands)",
            instruction.name,
            instruction.opcode_number,
            instruction.operands.len()
        );
        outcome.instructions.push(instruction);
    }

    Ok(outcome)
}

/// Extract the instruction anchored at `anchor`.
///
/// Cells that match no classifier rule are appended to `unclassified`;
/// blank cells are decorative and skipped silently.
pub fn extract_instruction(
    doc: &Document,
    anchor: NodeId,
    config: &ClassifierConfig,
    unclassified: &mut Vec<UnclassifiedCell>,
) -> ExtractResult<Instruction> {
    let name = doc.html_id(anchor).unwrap_or_default().to_string();
    let location = || FragmentLocation::anchor(name.as_str());

    let block = doc
        .parent_of(anchor)
        .ok_or_else(|| ExtractError::structural("anchor has no parent block", location()))?;
    let description = RichText::new(
        doc.inner_html(block).trim(),
        flatten_lines(&doc.text_content(block)),
    );

    let row = doc
        .find_ancestor(anchor, "tr")
        .ok_or_else(|| ExtractError::structural("anchor is not inside a table row", location()))?;
    let cells = doc.children_named(row, "td");
    let capabilities = if cells.len() == 2 {
        capability_links(doc, cells[1])
    } else {
        Capabilities::new()
    };

    let category = category_of(doc, row).ok_or_else(|| {
        ExtractError::structural("no section heading encloses the instruction", location())
    })?;

    let body = doc
        .parent_of(row)
        .ok_or_else(|| ExtractError::structural("table row has no parent", location()))?;
    let layout_row = doc
        .children_named(body, "tr")
        .get(1)
        .copied()
        .filter(|candidate| *candidate != row)
        .ok_or_else(|| ExtractError::structural("operand layout row is missing", location()))?;
    let layout = doc.children_named(layout_row, "td");
    if layout.len() < 2 {
        return Err(ExtractError::structural(
            format!("operand layout row has {} cells, expected at least 2", layout.len()),
            location(),
        ));
    }

    let word_count_text = doc.cell_text(layout[0]);
    let (word_count, has_variable_word_count) = parse_word_count(&word_count_text)
        .ok_or_else(|| {
            ExtractError::value_parse(word_count_text.as_str(), location().with_column(0))
        })?;

    let opcode_text = doc.cell_text(layout[1]);
    let opcode_number = parse_integer(&opcode_text)
        .ok_or_else(|| ExtractError::value_parse(opcode_text.as_str(), location().with_column(1)))?;

    let mut has_result = false;
    let mut has_result_type = false;
    let mut operands = Operands::new();
    for (column, cell) in layout.iter().enumerate().skip(2) {
        let text = doc.cell_text(*cell);
        if text.is_empty() {
            continue;
        }
        match classify_with(config, &text, doc.contains_link(*cell)) {
            Classification::Operand(classified) => {
                match classified.role {
                    OperandRole::Result => has_result = true,
                    OperandRole::ResultType => has_result_type = true,
                    OperandRole::Argument => {}
                }
                operands.push(classified.operand);
            }
            Classification::Unclassified => {
                log::warn!("{}: operand cell {} is unclassified: {:?}", name, column, text);
                unclassified.push(UnclassifiedCell {
                    anchor: name.clone(),
                    column,
                    text,
                });
            }
        }
    }

    Ok(Instruction {
        name,
        description,
        category,
        word_count,
        has_variable_word_count,
        opcode_number,
        has_result,
        has_result_type,
        capabilities,
        operands,
    })
}

/// Link texts of a capability cell, minus the column label.
fn capability_links(doc: &Document, cell: NodeId) -> Capabilities {
    doc.descendants_named(cell, "a")
        .into_iter()
        .map(|link| doc.text_content(link).trim().to_string())
        .filter(|text| !text.is_empty() && text != CAPABILITY_LABEL)
        .collect()
}

/// Normalized heading of the section enclosing `node`, with the numbering
/// and boilerplate words removed.
pub fn category_of(doc: &Document, node: NodeId) -> Option<String> {
    let heading = doc.nearest_heading(node)?;
    let text = doc.cell_text(heading);
    let words: Vec<&str> = strip_numbering(&text)
        .split_whitespace()
        .filter(|word| !CATEGORY_BOILERPLATE.contains(word))
        .collect();
    Some(normalize(&words.join(" ")))
}

/// Parse `N` or `N + variable`.
pub fn parse_word_count(text: &str) -> Option<(u32, bool)> {
    let squeezed: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    match squeezed.strip_suffix(VARIABLE_SUFFIX) {
        Some(fixed) => parse_integer(fixed).map(|count| (count, true)),
        None => parse_integer(&squeezed).map(|count| (count, false)),
    }
}
