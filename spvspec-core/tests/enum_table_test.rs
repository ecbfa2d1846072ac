//! Tests for enum table extraction

mod utils;

use spvspec_core::extractor::enums::{enum_section_headings, extract_enums, EnumSectionConfig};
use spvspec_core::ExtractError;
use utils::{
    capability_cell, enum_table, linked_name_cell, name_cell, page, parse, section, text,
};

fn enum_chapter() -> String {
    let magic = section("h3", "3.1. Magic Number", "<div class=\"paragraph\"><p>0x07230203</p></div>");
    let source_language = section(
        "h3",
        "3.2. Source Language",
        &enum_table(
            "The source language is for debug purposes only.",
            &[
                vec![text("0"), name_cell("Unknown", "")],
                vec![text("1"), name_cell("ESSL", "")],
                vec![text("2"), name_cell("GLSL", "")],
            ],
        ),
    );
    let storage_class = section(
        "h3",
        "3.7. Storage Class",
        &enum_table(
            "Class of storage for declared variables.",
            &[
                vec![
                    text("0"),
                    name_cell("UniformConstant", "Shared externally, visible across all functions."),
                    text(""),
                ],
                vec![
                    text("2"),
                    name_cell("Uniform", "Shared externally, visible across all functions."),
                    capability_cell(&["Shader"]),
                ],
                vec![
                    text("5"),
                    name_cell("Generic", "For generic pointers."),
                    capability_cell(&["Shader", "Kernel"]),
                ],
            ],
        ),
    );
    let decoration = section(
        "h3",
        "3.20. Decoration",
        &enum_table(
            "",
            &[
                vec![
                    text("6"),
                    name_cell("ArrayStride", "Apply to an array type to specify the stride."),
                    text("Literal Number\nArray Stride"),
                    capability_cell(&["Shader"]),
                ],
                vec![
                    text("1"),
                    name_cell("SpecId", "Apply to a scalar specialization constant."),
                    text("<id>\nSpecialization Constant ID"),
                    capability_cell(&["Shader"]),
                ],
            ],
        ),
    );
    let memory_semantics = section(
        "h3",
        "3.25. Memory Semantics",
        &enum_table(
            "",
            &[
                vec![text("0x2"), name_cell("Acquire", "")],
                vec![text("0x4"), name_cell("Release", "")],
            ],
        ),
    );
    let instructions = section("h3", "3.32. Instructions", "<div class=\"paragraph\"><p>None.</p></div>");
    let appendix = section(
        "h3",
        "4.1. Changes",
        &enum_table("", &[vec![text("1"), name_cell("NotAnEnum", "")]]),
    );

    page(&[
        magic,
        source_language,
        storage_class,
        decoration,
        memory_semantics,
        instructions,
        appendix,
    ]
    .join("\n"))
}

#[test]
fn test_section_headings_skip_excluded_and_other_chapters() {
    let doc = parse(&enum_chapter());
    let titles: Vec<String> = enum_section_headings(&doc, &EnumSectionConfig::default())
        .into_iter()
        .map(|(_, title)| title)
        .collect();
    assert_eq!(
        titles,
        vec!["Source Language", "Storage Class", "Decoration", "Memory Semantics"]
    );
}

#[test]
fn test_plain_rows() {
    let doc = parse(&enum_chapter());
    let enums = extract_enums(&doc, &EnumSectionConfig::default()).unwrap();
    let language = &enums[0];
    assert_eq!(language.name, "SourceLanguage");
    assert_eq!(language.comment.plain, "The source language is for debug purposes only.");
    assert_eq!(language.values.len(), 3);

    let essl = language.value("ESSL").unwrap();
    assert_eq!(essl.numeric_value, Some(1));
    assert!(essl.capabilities.is_empty());
    assert!(essl.extra_operands.is_empty());
    assert!(essl.comment.is_empty());
}

#[test]
fn test_capability_rows() {
    let doc = parse(&enum_chapter());
    let enums = extract_enums(&doc, &EnumSectionConfig::default()).unwrap();
    let storage = &enums[1];
    assert_eq!(storage.name, "StorageClass");

    let constant = storage.value("UniformConstant").unwrap();
    assert!(constant.capabilities.is_empty());
    assert_eq!(constant.comment.html, "Shared externally, visible across all functions.");
    assert_eq!(constant.comment.plain, "Shared externally, visible across all functions.");

    let uniform = storage.value("Uniform").unwrap();
    assert_eq!(uniform.capabilities.as_slice(), ["Shader"]);

    let generic = storage.value("Generic").unwrap();
    assert_eq!(generic.numeric_value, Some(5));
    assert_eq!(generic.capabilities.as_slice(), ["Shader", "Kernel"]);
}

#[test]
fn test_rows_with_extra_operands() {
    let doc = parse(&enum_chapter());
    let enums = extract_enums(&doc, &EnumSectionConfig::default()).unwrap();
    let decoration = &enums[2];
    assert_eq!(decoration.name, "Decoration");

    let stride = decoration.value("ArrayStride").unwrap();
    assert_eq!(stride.numeric_value, Some(6));
    assert_eq!(stride.capabilities.as_slice(), ["Shader"]);
    assert_eq!(stride.extra_operands.len(), 1);
    assert_eq!(stride.extra_operands[0].type_name, "LiteralNumber");
    assert_eq!(stride.extra_operands[0].comment, "Array Stride");

    let spec_id = decoration.value("SpecId").unwrap();
    assert_eq!(spec_id.extra_operands[0].type_name, "ID");
    assert_eq!(spec_id.extra_operands[0].comment, "Specialization Constant ID");
}

#[test]
fn test_values_keep_document_order() {
    let doc = parse(&enum_chapter());
    let enums = extract_enums(&doc, &EnumSectionConfig::default()).unwrap();
    let names: Vec<&str> = enums[2].values.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["ArrayStride", "SpecId"]);
}

#[test]
fn test_hex_values() {
    let doc = parse(&enum_chapter());
    let enums = extract_enums(&doc, &EnumSectionConfig::default()).unwrap();
    let semantics = &enums[3];
    assert_eq!(semantics.name, "MemorySemantics");
    assert_eq!(semantics.value("Release").unwrap().numeric_value, Some(4));
}

#[test]
fn test_custom_exclusions() {
    let doc = parse(&enum_chapter());
    let config = EnumSectionConfig {
        excluded: vec![
            "Magic Number".to_string(),
            "Instructions".to_string(),
            "Memory Semantics".to_string(),
        ],
        ..EnumSectionConfig::default()
    };
    let enums = extract_enums(&doc, &config).unwrap();
    assert_eq!(enums.len(), 3);
}

#[test]
fn test_section_without_table_is_structural_mismatch() {
    let html = page(&section("h3", "3.4. Execution Model", "<div class=\"paragraph\"><p>Missing.</p></div>"));
    let doc = parse(&html);
    let err = extract_enums(&doc, &EnumSectionConfig::default()).unwrap_err();
    assert!(matches!(err, ExtractError::StructuralMismatch { .. }));
    assert_eq!(err.location().unwrap().section.as_deref(), Some("Execution Model"));
}

#[test]
fn test_multi_line_comment() {
    let html = page(&section(
        "h3",
        "3.3. Execution Model",
        &enum_table(
            "",
            &[vec![text("0"), name_cell("Vertex", "First line.\nSecond line.")]],
        ),
    ));
    let doc = parse(&html);
    let enums = extract_enums(&doc, &EnumSectionConfig::default()).unwrap();
    let vertex = enums[0].value("Vertex").unwrap();
    assert_eq!(vertex.comment.html, "First line.<br />\nSecond line.");
    assert_eq!(vertex.comment.plain, "First line. Second line.");
}

#[test]
fn test_linked_name_is_not_a_capability() {
    let html = page(&section(
        "h3",
        "3.7. Storage Class",
        &enum_table(
            "",
            &[
                vec![
                    text("0"),
                    name_cell("UniformConstant", ""),
                    capability_cell(&["Shader"]),
                ],
                vec![
                    text("1"),
                    linked_name_cell("Input", "Input from pipeline."),
                    capability_cell(&["Shader"]),
                ],
            ],
        ),
    ));
    let doc = parse(&html);
    let enums = extract_enums(&doc, &EnumSectionConfig::default()).unwrap();
    let names: Vec<&str> = enums[0].values.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["UniformConstant", "Input"]);

    let input = enums[0].value("Input").unwrap();
    assert_eq!(input.numeric_value, Some(1));
    assert_eq!(input.capabilities.as_slice(), ["Shader"]);
    assert_eq!(input.comment.plain, "Input from pipeline.");
}

#[test]
fn test_row_without_name_is_structural_mismatch() {
    let html = page(&section(
        "h3",
        "3.2. Source Language",
        &enum_table(
            "",
            &[
                vec![text("0"), name_cell("Unknown", "")],
                vec![text("1"), text("ESSL")],
            ],
        ),
    ));
    let doc = parse(&html);
    let err = extract_enums(&doc, &EnumSectionConfig::default()).unwrap_err();
    assert!(matches!(err, ExtractError::StructuralMismatch { .. }));
    assert_eq!(err.location().unwrap().section.as_deref(), Some("Source Language"));
}

#[test]
fn test_row_of_unsupported_width_is_structural_mismatch() {
    let table = "<table><tbody>\n<tr>\n<td>0</td>\n<td><strong>Unknown</strong></td>\n</tr>\n<tr>\n<td>1</td><td><strong>ESSL</strong></td>\n</tr>\n</tbody></table>";
    let doc = parse(&page(&section("h3", "3.2. Source Language", table)));
    let err = extract_enums(&doc, &EnumSectionConfig::default()).unwrap_err();
    assert!(matches!(err, ExtractError::StructuralMismatch { .. }));
    assert_eq!(err.location().unwrap().section.as_deref(), Some("Source Language"));
}
