pub mod error;
pub mod document;
pub mod naming;
pub mod operand;
pub mod classifier;
pub mod model;
pub mod metadata;
pub mod instruction;
pub mod enums;
pub mod extended;
pub mod config;
pub mod pipeline;
