//! End-to-end tests for the extraction pipeline

mod utils;

use spvspec_core::extractor::config::ExtractConfig;
use spvspec_core::extractor::extended::ExtendedLayout;
use spvspec_core::extractor::pipeline::ExtendedSource;
use spvspec_core::{ExtractError, ExtractionPipeline};
use utils::{
    capability_cell, enum_table, extended_instruction, headless_page, instruction, linked, name_cell, page,
    parse, section, text,
};

fn core_content() -> String {
    let storage_class = section(
        "h3",
        "3.7. Storage Class",
        &enum_table(
            "Class of storage for declared variables.",
            &[
                vec![text("0"), name_cell("UniformConstant", ""), text("")],
                vec![text("1"), name_cell("Input", ""), capability_cell(&["Shader"])],
            ],
        ),
    );
    let variable = instruction(
        "OpVariable",
        "Allocate an object in memory.",
        &[],
        "4 + variable",
        "59",
        &[
            text("<id>\nResult Type"),
            text("Result <id>"),
            linked("Storage Class"),
            linked("Optional\nInitializer"),
        ],
    );
    let nop = instruction("OpNop", "This has no semantic impact.", &[], "1", "0", &[text("See below")]);
    let memory = section("h4", "3.32.8. Memory Instructions", &format!("{}\n{}", variable, nop));
    format!("{}\n{}", storage_class, section("h3", "3.32. Instructions", &memory))
}

fn glsl_source() -> ExtendedSource {
    let round = extended_instruction("Round", &["Rounds <em>x</em>."], "1", &[text("<id>\nx")]);
    let doc = parse(&page(&section("h3", "2.1. Math Instructions", &round)));
    ExtendedSource::new(ExtendedLayout::glsl_std_450(), doc)
}

#[test]
fn test_run_assembles_specification() {
    let doc = parse(&page(&core_content()));
    let extraction = ExtractionPipeline::run(&doc, &[glsl_source()], &ExtractConfig::default()).unwrap();
    let spec = &extraction.specification;

    assert_eq!(spec.metadata.title, "SPIR-V Specification");
    assert_eq!(spec.metadata.author, "John Kessenich, Google and Boaz Ouriel, Intel");
    assert_eq!(spec.metadata.revnumber, "version 1.00,");
    assert_eq!(spec.metadata.last_update, "Last updated 2016-02-17 11:14:26 EST");

    assert_eq!(spec.instructions.len(), 2);
    assert_eq!(spec.instruction("OpVariable").unwrap().category, "Memory");
    assert_eq!(spec.enums.len(), 1);
    assert_eq!(spec.enumeration("StorageClass").unwrap().values.len(), 2);
    assert_eq!(spec.extensions.len(), 1);
    assert_eq!(spec.extensions[0].instructions[0].name, "Round");
}

#[test]
fn test_stats_and_report() {
    let doc = parse(&page(&core_content()));
    let extraction = ExtractionPipeline::run(&doc, &[glsl_source()], &ExtractConfig::default()).unwrap();

    let stats = &extraction.stats;
    assert_eq!(stats.instructions, 2);
    assert_eq!(stats.operands, 4);
    assert_eq!(stats.enums, 1);
    assert_eq!(stats.enum_values, 2);
    assert_eq!(stats.extended_sets, 1);
    assert_eq!(stats.extended_instructions, 1);
    assert_eq!(stats.skipped_entries, 0);
    assert_eq!(stats.unclassified_cells, 1);

    assert!(!extraction.report.is_clean());
    assert_eq!(extraction.report.unclassified[0].anchor, "OpNop");
    assert_eq!(extraction.report.unclassified[0].text, "See below");
}

#[test]
fn test_operand_references_name_extracted_enums() {
    let doc = parse(&page(&core_content()));
    let extraction = ExtractionPipeline::run(&doc, &[], &ExtractConfig::default()).unwrap();
    let spec = &extraction.specification;
    let variable = spec.instruction("OpVariable").unwrap();
    let kind = match variable.operands[2].operand_type.base() {
        spvspec_core::extractor::operand::OperandType::Enum(kind) => kind.clone(),
        other => panic!("expected an enum operand, found {}", other),
    };
    assert!(spec.enumeration(&kind).is_some());
}

#[test]
fn test_serialized_shape() {
    let doc = parse(&page(&core_content()));
    let extraction = ExtractionPipeline::run(&doc, &[glsl_source()], &ExtractConfig::default()).unwrap();
    let json = serde_json::to_value(&extraction.specification).unwrap();

    let variable = &json["instructions"][0];
    assert_eq!(variable["name"], "OpVariable");
    assert_eq!(variable["opcodeNumber"], 59);
    assert_eq!(variable["hasVariableWordCount"], true);
    assert_eq!(variable["operands"][2]["type"], "Enum:StorageClass");
    assert_eq!(variable["operands"][3]["type"], "ID?");
    assert_eq!(variable["operands"][3]["name"], "Initializer");

    let input = &json["enums"][0]["values"][1];
    assert_eq!(input["numericValue"], 1);
    assert_eq!(input["capabilities"][0], "Shader");

    let glsl = &json["extensions"][0];
    assert_eq!(glsl["language"], "GLSL.std");
    assert_eq!(glsl["version"], 450);
    assert!(glsl.get("enums").is_none());
}

#[test]
fn test_serialized_specification_reads_back() {
    let doc = parse(&page(&core_content()));
    let extraction = ExtractionPipeline::run(&doc, &[glsl_source()], &ExtractConfig::default()).unwrap();
    let json = serde_json::to_string(&extraction.specification).unwrap();
    let back: spvspec_core::extractor::model::Specification = serde_json::from_str(&json).unwrap();
    assert_eq!(back, extraction.specification);
}

#[test]
fn test_missing_header_aborts_the_run() {
    let doc = parse(&headless_page(&core_content()));
    let err = ExtractionPipeline::run(&doc, &[], &ExtractConfig::default()).unwrap_err();
    assert!(matches!(err, ExtractError::StructuralMismatch { .. }));
}

#[test]
fn test_empty_source_is_a_load_error() {
    let err = spvspec_core::extractor::document::Document::parse_html("  \n").unwrap_err();
    assert!(matches!(err, ExtractError::DocumentLoad { .. }));
}
