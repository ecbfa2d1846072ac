//! Extracted Records
//!
//! The schema consumers depend on. Field names and nesting are part of the
//! output contract: renaming or reordering a field is a breaking change.
//!
//! Every record is built once by its extractor and owned by its containing
//! collection. The only cross-record link is by name: an operand of type
//! `Enum(kind)` names an [`Enum`] by its canonical name.
//!
//! # Memory Optimizations
//! - Capability lists use `SmallVec<[String; 2]>`: a row names at most a
//!   primary and an alternative capability.
//! - Operand lists use `SmallVec<[Operand; 4]>`, enough for most instructions.

use crate::extractor::operand::Operand;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub type Capabilities = SmallVec<[String; 2]>;
pub type Operands = SmallVec<[Operand; 4]>;

/// Text kept both as markup and as flattened plain text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichText {
    /// Markup with line breaks as `<br />`
    pub html: String,
    /// Text with line breaks flattened to single spaces
    pub plain: String,
}

impl RichText {
    pub fn new(html: impl Into<String>, plain: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            plain: plain.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.html.is_empty() && self.plain.is_empty()
    }
}

/// Document metadata from the title block and footer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub title: String,
    pub author: String,
    pub revnumber: String,
    pub last_update: String,
}

/// One instruction of the core instruction set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instruction {
    /// Canonical token, e.g. `OpIAdd`
    pub name: String,
    pub description: RichText,
    /// Normalized heading of the enclosing instruction group
    pub category: String,
    /// Fixed part of the word count
    pub word_count: u32,
    pub has_variable_word_count: bool,
    pub opcode_number: u32,
    pub has_result: bool,
    pub has_result_type: bool,
    pub capabilities: Capabilities,
    /// Operands in argument order
    pub operands: Operands,
}

/// Operand an enumerant carries after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraOperand {
    pub type_name: String,
    pub comment: String,
}

/// One enumerant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumValue {
    pub name: String,
    /// Absent when the row only carries text
    pub numeric_value: Option<u32>,
    pub comment: RichText,
    pub capabilities: Capabilities,
    pub extra_operands: Vec<ExtraOperand>,
}

/// One enumeration; values stay in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enum {
    pub name: String,
    pub comment: RichText,
    pub values: Vec<EnumValue>,
}

impl Enum {
    pub fn value(&self, name: &str) -> Option<&EnumValue> {
        self.values.iter().find(|value| value.name == name)
    }
}

/// One instruction of an extended instruction set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedInstruction {
    pub name: String,
    /// Spelling used by the document, e.g. `acos`
    pub original_name: String,
    pub description: RichText,
    pub category: String,
    pub number: u32,
    pub operands: Operands,
}

/// An auxiliary instruction vocabulary layered on the core set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedInstructionSet {
    pub language: String,
    pub version: u32,
    pub metadata: Metadata,
    pub instructions: Vec<ExtendedInstruction>,
    /// Only present for sets that define image or sampler encodings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enums: Option<Vec<Enum>>,
}

/// The complete extracted specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specification {
    pub metadata: Metadata,
    pub instructions: Vec<Instruction>,
    pub enums: Vec<Enum>,
    pub extensions: Vec<ExtendedInstructionSet>,
}

impl Specification {
    pub fn instruction(&self, name: &str) -> Option<&Instruction> {
        self.instructions.iter().find(|instruction| instruction.name == name)
    }

    pub fn enumeration(&self, name: &str) -> Option<&Enum> {
        self.enums.iter().find(|e| e.name == name)
    }
}
