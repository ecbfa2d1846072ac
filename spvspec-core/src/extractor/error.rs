//! Extraction Error Handling
//!
//! Error types for the document-to-schema extraction using `thiserror`.
//!
//! # Error Categories
//! - **Structural mismatches**: an assumed document shape does not hold
//!   (missing row, missing cell, missing heading). Fatal for the record.
//! - **Value parse failures**: a cell that must hold an integer does not.
//!   Fatal in the instruction extractor; the enum row classifier never raises
//!   it and instead retries the cell as an extra operand.
//! - **Document load errors**: the source markup could not be read.
//!
//! A cell that matches no classifier rule is not an error at all; it is
//! reported through [`crate::extractor::pipeline::ExtractionReport`].

use std::fmt;
use thiserror::Error;

/// Document fragment an error refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentLocation {
    /// Anchor id of the record being extracted (e.g. `OpIAdd`)
    pub anchor: Option<String>,
    /// Section heading the record belongs to
    pub section: Option<String>,
    /// Zero-based cell column inside the row, if known
    pub column: Option<usize>,
}

impl FragmentLocation {
    pub fn anchor(anchor: impl Into<String>) -> Self {
        Self {
            anchor: Some(anchor.into()),
            ..Self::default()
        }
    }

    pub fn section(section: impl Into<String>) -> Self {
        Self {
            section: Some(section.into()),
            ..Self::default()
        }
    }

    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    pub fn format(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(3);
        if let Some(anchor) = &self.anchor {
            parts.push(format!("anchor '{}'", anchor));
        }
        if let Some(section) = &self.section {
            parts.push(format!("section '{}'", section));
        }
        if let Some(column) = self.column {
            parts.push(format!("column {}", column));
        }
        if parts.is_empty() {
            "document".to_string()
        } else {
            parts.join(", ")
        }
    }
}

impl fmt::Display for FragmentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

/// Extraction error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The document does not have the shape the extractor relies on.
    #[error("Structural mismatch at {location}: {message}\nSuggestion: {suggestion}")]
    StructuralMismatch {
        message: String,
        location: FragmentLocation,
        suggestion: String,
    },

    /// A cell that must hold an integer does not.
    #[error("Value parse failure at {location}: expected an integer, found {text:?}")]
    ValueParse {
        text: String,
        location: FragmentLocation,
    },

    /// The source document could not be loaded.
    #[error("Document load error: {message}")]
    DocumentLoad { message: String },
}

pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

impl ExtractError {
    /// Create a structural mismatch error with context.
    #[cold]
    pub fn structural(message: impl Into<String>, location: FragmentLocation) -> Self {
        let suggestion = if location.anchor.is_some() {
            "The table around this anchor changed layout. Compare it with a known-good revision of the document."
        } else {
            "The section layout changed. Check the heading numbering and the table that follows it."
        };
        Self::StructuralMismatch {
            message: message.into(),
            location,
            suggestion: suggestion.to_string(),
        }
    }

    /// Create a value parse error with context.
    #[cold]
    pub fn value_parse(text: impl Into<String>, location: FragmentLocation) -> Self {
        Self::ValueParse {
            text: text.into(),
            location,
        }
    }

    /// Location of the failing fragment, if the error has one.
    pub fn location(&self) -> Option<&FragmentLocation> {
        match self {
            Self::StructuralMismatch { location, .. } | Self::ValueParse { location, .. } => {
                Some(location)
            }
            Self::DocumentLoad { .. } => None,
        }
    }
}

impl From<std::io::Error> for ExtractError {
    #[cold] // Error paths are cold
    fn from(err: std::io::Error) -> Self {
        ExtractError::DocumentLoad {
            message: format!("IO error: {}", err),
        }
    }
}
