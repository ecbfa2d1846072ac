//! Extraction Pipeline
//!
//! Runs every extractor over the loaded documents and assembles the
//! [`Specification`].
//!
//! # Pipeline Stages
//! 1. **Metadata**: title block and footer of the core document
//! 2. **Instructions**: every instruction anchor of the core document
//! 3. **Enumerations**: every numbered section of the enumeration chapter
//! 4. **Extended Sets**: each extended document with its layout
//!
//! The first structural mismatch aborts the run. Cells no rule could classify
//! and deliberately skipped entries do not abort it; they are collected into
//! the [`ExtractionReport`].

use crate::extractor::config::ExtractConfig;
use crate::extractor::document::Document;
use crate::extractor::enums::extract_enums;
use crate::extractor::error::ExtractResult;
use crate::extractor::extended::{extract_extended_set, ExtendedLayout};
use crate::extractor::instruction::extract_instructions;
use crate::extractor::metadata::extract_metadata;
use crate::extractor::model::{ExtendedInstructionSet, Specification};
use serde::{Deserialize, Serialize};

/// Operand cell that matched no classifier rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnclassifiedCell {
    /// Anchor of the instruction the cell belongs to
    pub anchor: String,
    /// Cell index within the layout row
    pub column: usize,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    /// The entry's category is listed in the layout's skipped categories
    UnsupportedCategory,
}

/// Extended-set entry that was recognised but not extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedEntry {
    /// `language.version` of the set
    pub set: String,
    pub name: String,
    pub category: String,
    pub reason: SkipReason,
}

/// Everything the run left out, for review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionReport {
    pub unclassified: Vec<UnclassifiedCell>,
    pub skipped: Vec<SkippedEntry>,
}

impl ExtractionReport {
    pub fn is_clean(&self) -> bool {
        self.unclassified.is_empty() && self.skipped.is_empty()
    }
}

/// Statistics collected during extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionStats {
    pub instructions: usize,
    pub operands: usize,
    pub enums: usize,
    pub enum_values: usize,
    pub extended_sets: usize,
    pub extended_instructions: usize,
    pub skipped_entries: usize,
    pub unclassified_cells: usize,
}

impl ExtractionStats {
    fn collect(specification: &Specification, report: &ExtractionReport) -> Self {
        Self {
            instructions: specification.instructions.len(),
            operands: specification
                .instructions
                .iter()
                .map(|instruction| instruction.operands.len())
                .sum(),
            enums: specification.enums.len(),
            enum_values: specification.enums.iter().map(|e| e.values.len()).sum(),
            extended_sets: specification.extensions.len(),
            extended_instructions: specification
                .extensions
                .iter()
                .map(|set| set.instructions.len())
                .sum(),
            skipped_entries: report.skipped.len(),
            unclassified_cells: report.unclassified.len(),
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub specification: Specification,
    pub report: ExtractionReport,
    pub stats: ExtractionStats,
}

/// An extended instruction set document paired with its layout.
#[derive(Debug, Clone)]
pub struct ExtendedSource {
    pub layout: ExtendedLayout,
    pub document: Document,
}

impl ExtendedSource {
    pub fn new(layout: ExtendedLayout, document: Document) -> Self {
        Self { layout, document }
    }
}

/// Extraction pipeline orchestrator.
pub struct ExtractionPipeline;

impl ExtractionPipeline {
    /// Extract the core document and every extended document.
    ///
    /// # Errors
    /// Returns the first structural mismatch or value parse failure met by
    /// any stage.
    ///
    /// # Examples
    /// ```rust,no_run
    /// use spvspec_core::extractor::config::ExtractConfig;
    /// use spvspec_core::extractor::document::Document;
    /// use spvspec_core::ExtractionPipeline;
    ///
    /// let html = std::fs::read_to_string("SPIRV.html")?;
    /// let doc = Document::parse_html(&html)?;
    /// let extraction = ExtractionPipeline::run(&doc, &[], &ExtractConfig::default())?;
    /// println!("{} instructions", extraction.stats.instructions);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn run(
        spec_doc: &Document,
        extended: &[ExtendedSource],
        config: &ExtractConfig,
    ) -> ExtractResult<Extraction> {
        log::info!("Starting extraction pipeline...");
        let mut report = ExtractionReport::default();

        log::info!("Step 1: Reading metadata...");
        let metadata = extract_metadata(spec_doc)?;
        log::info!("  {} (revision {})", metadata.title, metadata.revnumber);

        log::info!("Step 2: Extracting instructions...");
        let outcome = extract_instructions(spec_doc, &config.classifier)?;
        report.unclassified.extend(outcome.unclassified);
        let instructions = outcome.instructions;

        log::info!("Step 3: Extracting enumerations...");
        let enums = extract_enums(spec_doc, &config.enum_sections)?;

        log::info!("Step 4: Extracting {} extended instruction sets...", extended.len());
        let mut extensions: Vec<ExtendedInstructionSet> = Vec::with_capacity(extended.len());
        for source in extended {
            let outcome = extract_extended_set(&source.document, &source.layout, config)?;
            log::info!(
                "  {}: {} instructions, {} skipped",
                source.layout.key(),
                outcome.set.instructions.len(),
                outcome.skipped.len()
            );
            report.unclassified.extend(outcome.unclassified);
            report.skipped.extend(outcome.skipped);
            extensions.push(outcome.set);
        }

        let specification = Specification {
            metadata,
            instructions,
            enums,
            extensions,
        };
        let stats = ExtractionStats::collect(&specification, &report);

        if !report.unclassified.is_empty() {
            log::warn!("{} operand cells could not be classified", report.unclassified.len());
        }
        log::info!(
            "Extraction complete: {} instructions, {} enums, {} extended instructions",
            stats.instructions,
            stats.enums,
            stats.extended_instructions
        );

        Ok(Extraction {
            specification,
            report,
            stats,
        })
    }
}
