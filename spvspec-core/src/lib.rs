//! SPIR-V Specification Extractor
//!
//! Turns the HTML rendering of the SPIR-V specification (and its extended
//! instruction set documents) into a structured, serializable grammar.

pub mod extractor;

pub use extractor::error::{ExtractError, ExtractResult};
pub use extractor::pipeline::{Extraction, ExtractionPipeline};
