//! Operand Model
//!
//! The closed set of operand type tags and their schema rendering.
//!
//! # Rendering
//! | Tag                    | Text                  |
//! |------------------------|-----------------------|
//! | `Id`                   | `ID`                  |
//! | `Enum(kind)`           | `Enum:<kind>`         |
//! | `LiteralNumber`        | `LiteralNumber`       |
//! | `LiteralString`        | `LiteralString`       |
//! | `PairLiteralNumberId`  | `PairLiteralNumberID` |
//! | `Array(t)`             | `<t>[]`               |
//! | `Optional(t)`          | `<t>?`                |
//!
//! Rendering followed by parsing is the identity for every tag whose enum
//! kind is a canonical identifier.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Operand type tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperandType {
    /// Reference to a result id
    Id,
    /// Enumerant of the named enumeration
    Enum(String),
    LiteralNumber,
    LiteralString,
    /// Literal number followed by an id, as one repeating unit
    PairLiteralNumberId,
    /// Variable-length list of the inner type
    Array(Box<OperandType>),
    /// Operand that may be omitted
    Optional(Box<OperandType>),
}

impl OperandType {
    pub fn array(inner: OperandType) -> Self {
        Self::Array(Box::new(inner))
    }

    pub fn optional(inner: OperandType) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Map a canonical type name taken from document text to a tag.
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "Id" | "ID" => Self::Id,
            "LiteralNumber" => Self::LiteralNumber,
            "LiteralString" => Self::LiteralString,
            other => Self::Enum(other.to_string()),
        }
    }

    /// Innermost tag with array and optional wrappers removed.
    pub fn base(&self) -> &OperandType {
        match self {
            Self::Array(inner) | Self::Optional(inner) => inner.base(),
            other => other,
        }
    }
}

impl fmt::Display for OperandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id => f.write_str("ID"),
            Self::Enum(kind) => write!(f, "Enum:{}", kind),
            Self::LiteralNumber => f.write_str("LiteralNumber"),
            Self::LiteralString => f.write_str("LiteralString"),
            Self::PairLiteralNumberId => f.write_str("PairLiteralNumberID"),
            Self::Array(inner) => write!(f, "{}[]", inner),
            Self::Optional(inner) => write!(f, "{}?", inner),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown operand type {0:?}")]
pub struct ParseOperandTypeError(pub String);

impl FromStr for OperandType {
    type Err = ParseOperandTypeError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if let Some(inner) = text.strip_suffix("[]") {
            return Ok(Self::array(inner.parse()?));
        }
        if let Some(inner) = text.strip_suffix('?') {
            return Ok(Self::optional(inner.parse()?));
        }
        match text {
            "ID" => Ok(Self::Id),
            "LiteralNumber" => Ok(Self::LiteralNumber),
            "LiteralString" => Ok(Self::LiteralString),
            "PairLiteralNumberID" => Ok(Self::PairLiteralNumberId),
            _ => match text.strip_prefix("Enum:") {
                Some(kind) if !kind.is_empty() => Ok(Self::Enum(kind.to_string())),
                _ => Err(ParseOperandTypeError(text.to_string())),
            },
        }
    }
}

impl Serialize for OperandType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OperandType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Named, typed operand of an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operand {
    pub name: String,
    #[serde(rename = "type")]
    pub operand_type: OperandType,
}

impl Operand {
    pub fn new(name: impl Into<String>, operand_type: OperandType) -> Self {
        Self {
            name: name.into(),
            operand_type,
        }
    }
}
