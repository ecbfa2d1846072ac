//! Operand Text Classifier
//!
//! Decides what operand a single table cell describes. The document has no
//! grammar for operand cells, only recurring surface patterns, so the
//! classifier is an ordered decision list: the first rule whose predicate
//! matches produces the result, and later rules are never consulted.
//!
//! # Rule Order
//! 1. `result-id`: exactly `Result <id>`
//! 2. `result-type`: exactly `<id>` / `Result Type` on two lines
//! 3. `scalar-id`: contains `<id>`, no comma, no `Optional`
//! 4. `pair-list`: contains `literal, label <id>`
//! 5. `variadic-list`: contains a comma
//! 6. `linked-optional`: cell links somewhere and says `Optional`
//! 7. `linked`: cell links somewhere
//!
//! A cell no rule matches contributes no operand. Capability columns and
//! decorative cells rely on this.
//!
//! The order is load-bearing: moving `linked-optional` in front of
//! `scalar-id`, or `variadic-list` in front of `pair-list`, changes the
//! output for real instructions. `rule_order` exposes it for tests.

use crate::extractor::document::normalize_lines;
use crate::extractor::naming::{normalize, pluralize};
use crate::extractor::operand::{Operand, OperandType};
use serde::{Deserialize, Serialize};

/// Placeholder the document uses for result ids.
pub const ID_MARKER: &str = "<id>";
/// Word marking an operand that may be omitted.
pub const OPTIONAL_MARKER: &str = "Optional";

const RESULT_ID_TEXT: &str = "Result <id>";
const RESULT_TYPE_TEXT: &str = "<id>\nResult Type";
const PAIR_LIST_MARKER: &str = "literal, label <id>";
const LITERAL_WORD: &str = "literal";
const SEE_WORD: &str = "See";

const RESULT_NAME: &str = "Result";
const RESULT_TYPE_NAME: &str = "ResultType";
const DEFAULT_SCALAR_NAME: &str = "Object";
const DEFAULT_LIST_NAME: &str = "Operands";
const PAIR_LIST_NAME: &str = "Target";
const EXTRA_OPERANDS_NAME: &str = "ExtraOperands";

/// Tunables for the linked sub-classifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Leading tokens of a multi-line linked cell that form the type name
    pub linked_type_tokens: usize,
    /// Token count used instead when the cell contains `specialised_type_marker`
    pub specialised_type_tokens: usize,
    /// Word marking the longer linked type family
    pub specialised_type_marker: String,
    /// Parameters written as `[Name]` in optional cells; the brackets are dropped
    pub defaulted_parameters: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            linked_type_tokens: 2,
            specialised_type_tokens: 3,
            specialised_type_marker: "Kernel".to_string(),
            defaulted_parameters: vec!["Bias".to_string()],
        }
    }
}

/// What an operand means to its instruction beyond its name and type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandRole {
    /// The instruction produces a result id
    Result,
    /// The instruction is typed
    ResultType,
    /// Ordinary argument
    Argument,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedOperand {
    pub operand: Operand,
    pub role: OperandRole,
}

/// Outcome of classifying one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Operand(ClassifiedOperand),
    /// The cell contributes no operand
    Unclassified,
}

impl Classification {
    fn argument(name: impl Into<String>, operand_type: OperandType) -> Self {
        Self::Operand(ClassifiedOperand {
            operand: Operand::new(name, operand_type),
            role: OperandRole::Argument,
        })
    }

    pub fn operand(&self) -> Option<&Operand> {
        match self {
            Self::Operand(classified) => Some(&classified.operand),
            Self::Unclassified => None,
        }
    }

    pub fn role(&self) -> Option<OperandRole> {
        match self {
            Self::Operand(classified) => Some(classified.role),
            Self::Unclassified => None,
        }
    }

    pub fn into_operand(self) -> Option<Operand> {
        match self {
            Self::Operand(classified) => Some(classified.operand),
            Self::Unclassified => None,
        }
    }

    #[inline]
    pub fn is_unclassified(&self) -> bool {
        matches!(self, Self::Unclassified)
    }
}

/// One cell as the rules see it.
#[derive(Debug, Clone, Copy)]
pub struct CellInput<'a> {
    /// Decoded text, lines trimmed, blank lines dropped
    pub text: &'a str,
    /// Whether the cell markup contains a cross-reference link
    pub has_link: bool,
    pub config: &'a ClassifierConfig,
}

/// Ordered (predicate, handler) pair.
pub struct Rule {
    pub name: &'static str,
    pub matches: fn(&CellInput<'_>) -> bool,
    pub apply: fn(&CellInput<'_>) -> Classification,
}

/// Classification rules in evaluation order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "result-id",
        matches: is_result_id,
        apply: result_id,
    },
    Rule {
        name: "result-type",
        matches: is_result_type,
        apply: result_type,
    },
    Rule {
        name: "scalar-id",
        matches: is_scalar_id,
        apply: scalar_id,
    },
    Rule {
        name: "pair-list",
        matches: is_pair_list,
        apply: pair_list,
    },
    Rule {
        name: "variadic-list",
        matches: is_variadic_list,
        apply: variadic_list,
    },
    Rule {
        name: "linked-optional",
        matches: is_linked_optional,
        apply: linked_optional,
    },
    Rule {
        name: "linked",
        matches: is_linked,
        apply: linked,
    },
];

/// Rule names in evaluation order.
pub fn rule_order() -> Vec<&'static str> {
    RULES.iter().map(|rule| rule.name).collect()
}

/// Classify a cell with the default configuration.
///
/// # Examples
/// ```rust
/// use spvspec_core::extractor::classifier::classify;
/// use spvspec_core::extractor::operand::OperandType;
///
/// let operand = classify("<id>\nPointer", false).into_operand().unwrap();
/// assert_eq!(operand.name, "Pointer");
/// assert_eq!(operand.operand_type, OperandType::Id);
/// ```
pub fn classify(text: &str, has_link: bool) -> Classification {
    classify_with(&ClassifierConfig::default(), text, has_link)
}

/// Classify a cell with an explicit configuration.
pub fn classify_with(config: &ClassifierConfig, text: &str, has_link: bool) -> Classification {
    let text = normalize_lines(text);
    let input = CellInput {
        text: &text,
        has_link,
        config,
    };
    match RULES.iter().find(|rule| (rule.matches)(&input)) {
        Some(rule) => {
            let classification = (rule.apply)(&input);
            log::trace!("Cell {:?} matched rule '{}'", input.text, rule.name);
            classification
        }
        None => Classification::Unclassified,
    }
}

/// Name of the first rule that matches the cell, if any.
pub fn matching_rule(
    config: &ClassifierConfig,
    text: &str,
    has_link: bool,
) -> Option<&'static str> {
    let text = normalize_lines(text);
    let input = CellInput {
        text: &text,
        has_link,
        config,
    };
    RULES
        .iter()
        .find(|rule| (rule.matches)(&input))
        .map(|rule| rule.name)
}

fn is_result_id(input: &CellInput<'_>) -> bool {
    input.text == RESULT_ID_TEXT
}

fn result_id(_input: &CellInput<'_>) -> Classification {
    Classification::Operand(ClassifiedOperand {
        operand: Operand::new(RESULT_NAME, OperandType::Id),
        role: OperandRole::Result,
    })
}

fn is_result_type(input: &CellInput<'_>) -> bool {
    input.text == RESULT_TYPE_TEXT
}

fn result_type(_input: &CellInput<'_>) -> Classification {
    Classification::Operand(ClassifiedOperand {
        operand: Operand::new(RESULT_TYPE_NAME, OperandType::Id),
        role: OperandRole::ResultType,
    })
}

fn is_scalar_id(input: &CellInput<'_>) -> bool {
    input.text.contains(ID_MARKER)
        && !input.text.contains(',')
        && !input.text.contains(OPTIONAL_MARKER)
}

fn scalar_id(input: &CellInput<'_>) -> Classification {
    let name = or_default(normalize(&input.text.replace(ID_MARKER, "")), DEFAULT_SCALAR_NAME);
    Classification::argument(name, OperandType::Id)
}

fn is_pair_list(input: &CellInput<'_>) -> bool {
    input.text.contains(PAIR_LIST_MARKER)
}

fn pair_list(_input: &CellInput<'_>) -> Classification {
    Classification::argument(
        PAIR_LIST_NAME,
        OperandType::array(OperandType::PairLiteralNumberId),
    )
}

fn is_variadic_list(input: &CellInput<'_>) -> bool {
    input.text.contains(',')
}

/// Variadic list sub-classifier.
///
/// The id branch and the literal branch are checked independently; when a
/// cell triggers both, the literal branch runs second and its result stands.
fn variadic_list(input: &CellInput<'_>) -> Classification {
    let text = input.text;
    let mut derived: Option<(String, OperandType)> = None;

    if text.contains(ID_MARKER) {
        let base = first_name_token(text).unwrap_or(DEFAULT_LIST_NAME);
        derived = Some((
            normalize(&pluralize(base)),
            OperandType::array(OperandType::Id),
        ));
    }

    if has_word(text, LITERAL_WORD, false) {
        let name = if has_word(text, SEE_WORD, true) {
            EXTRA_OPERANDS_NAME.to_string()
        } else {
            normalize(&pluralize(first_name_token(text).unwrap_or(DEFAULT_LIST_NAME)))
        };
        derived = Some((name, OperandType::array(OperandType::LiteralNumber)));
    }

    match derived {
        Some((name, operand_type)) => Classification::argument(name, operand_type),
        None => Classification::Unclassified,
    }
}

fn is_linked_optional(input: &CellInput<'_>) -> bool {
    input.has_link && input.text.contains(OPTIONAL_MARKER)
}

/// Linked/optional sub-classifier. The type is always an optional id.
fn linked_optional(input: &CellInput<'_>) -> Classification {
    let rest = normalize_lines(&input.text.replace(OPTIONAL_MARKER, ""));
    let name = if rest.contains(ID_MARKER) {
        normalize(&rest.replace(ID_MARKER, ""))
    } else if rest.is_empty() {
        String::new()
    } else {
        linked_parts(&rest, input.config).0
    };
    let name = restore_defaulted(name, input.config);
    Classification::argument(
        or_default(name, DEFAULT_SCALAR_NAME),
        OperandType::optional(OperandType::Id),
    )
}

fn is_linked(input: &CellInput<'_>) -> bool {
    input.has_link
}

fn linked(input: &CellInput<'_>) -> Classification {
    let (name, operand_type) = linked_parts(input.text, input.config);
    Classification::argument(name, operand_type)
}

/// Linked sub-classifier: derive `(name, type)` from a cell that links to
/// another section.
///
/// A single line is an enum or id reference. Multiple lines put the type
/// name in the leading tokens and the operand name in the rest.
fn linked_parts(text: &str, config: &ClassifierConfig) -> (String, OperandType) {
    if !text.contains('\n') {
        if text.contains(ID_MARKER) {
            let name = or_default(normalize(&text.replace(ID_MARKER, "")), DEFAULT_SCALAR_NAME);
            return (name, OperandType::Id);
        }
        let name = normalize(text);
        return (name.clone(), OperandType::Enum(name));
    }

    let tokens: Vec<&str> = text
        .split_whitespace()
        .map(|token| if token == ID_MARKER { "Id" } else { token })
        .collect();
    let wanted = if text.contains(config.specialised_type_marker.as_str()) {
        config.specialised_type_tokens
    } else {
        config.linked_type_tokens
    };
    // Keep at least one token for the operand name.
    let split = wanted.min(tokens.len().saturating_sub(1)).max(1);
    let type_name = normalize(&tokens[..split].join(" "));
    let name = or_default(normalize(&tokens[split..].join(" ")), DEFAULT_SCALAR_NAME);
    (name, OperandType::from_type_name(&type_name))
}

/// First token that is not a placeholder, ellipsis or `literal`, with
/// commas removed.
fn first_name_token(text: &str) -> Option<&str> {
    text.split_whitespace()
        .map(|token| token.trim_matches(','))
        .find(|token| !is_placeholder_token(token))
}

fn is_placeholder_token(token: &str) -> bool {
    token.is_empty()
        || token == ID_MARKER
        || token == "…"
        || token == "..."
        || token.eq_ignore_ascii_case(LITERAL_WORD)
}

fn has_word(text: &str, word: &str, case_sensitive: bool) -> bool {
    text.split_whitespace()
        .map(|token| token.trim_matches(|c: char| c == ',' || c == '.'))
        .any(|token| {
            if case_sensitive {
                token == word
            } else {
                token.eq_ignore_ascii_case(word)
            }
        })
}

fn restore_defaulted(name: String, config: &ClassifierConfig) -> String {
    config
        .defaulted_parameters
        .iter()
        .find(|parameter| {
            name.strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
                .map(|inner| inner == parameter.as_str())
                .unwrap_or(false)
        })
        .cloned()
        .unwrap_or(name)
}

fn or_default(name: String, default: &str) -> String {
    if name.is_empty() {
        default.to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_name_token_skips_placeholders() {
        assert_eq!(first_name_token("<id>, <id>, …\nVariable, Parent, …"), Some("Variable"));
        assert_eq!(first_name_token("literal, literal, …"), None);
        assert_eq!(first_name_token("Argument 0 <id>, Argument 1 <id>, …"), Some("Argument"));
    }

    #[test]
    fn test_has_word() {
        assert!(has_word("Literal, literal, …", "literal", false));
        assert!(has_word("See Execution Mode.", "See", true));
        assert!(!has_word("Seed", "See", true));
    }

    #[test]
    fn test_restore_defaulted() {
        let config = ClassifierConfig::default();
        assert_eq!(restore_defaulted("[Bias]".into(), &config), "Bias");
        assert_eq!(restore_defaulted("[Lod]".into(), &config), "[Lod]");
        assert_eq!(restore_defaulted("Bias".into(), &config), "Bias");
    }

    #[test]
    fn test_linked_parts_keeps_a_name_token() {
        let config = ClassifierConfig::default();
        let (name, ty) = linked_parts("Decoration\nD", &config);
        assert_eq!(name, "D");
        assert_eq!(ty, OperandType::Enum("Decoration".into()));
    }
}
