//! Test Utilities
//!
//! HTML fixture builders shaped like the asciidoctor output the extractor
//! reads: a title block, numbered sections, instruction tables and enum
//! tables. Cell text uses `\n` for `<br>`.

#![allow(dead_code)]

use spvspec_core::extractor::document::Document;

const TD_OPEN: &str = r#"<td class="tableblock halign-left valign-top"><p class="tableblock">"#;
const TD_CLOSE: &str = "</p></td>";

/// Markup for the inside of one table cell.
pub struct Cell {
    html: String,
}

impl Cell {
    fn render(&self) -> String {
        format!("{}{}{}", TD_OPEN, self.html, TD_CLOSE)
    }
}

/// Escape text and turn line breaks into `<br>`.
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\n', "<br>\n")
}

/// Plain text cell.
pub fn text(cell_text: &str) -> Cell {
    Cell {
        html: escape(cell_text),
    }
}

/// Cell whose text links to another section.
pub fn linked(cell_text: &str) -> Cell {
    Cell {
        html: format!(r##"<a href="#{}">{}</a>"##, anchor_for(cell_text), escape(cell_text)),
    }
}

/// Enum name cell with an optional trailing comment.
pub fn name_cell(name: &str, comment: &str) -> Cell {
    let html = if comment.is_empty() {
        format!("<strong>{}</strong>", name)
    } else {
        format!("<strong>{}</strong><br>\n{}", name, escape(comment))
    };
    Cell { html }
}

/// Enum name cell whose name links to its own definition.
pub fn linked_name_cell(name: &str, comment: &str) -> Cell {
    let mut html = format!(r##"<strong><a href="#{name}">{name}</a></strong>"##, name = name);
    if !comment.is_empty() {
        html.push_str(&format!("<br>\n{}", escape(comment)));
    }
    Cell { html }
}

/// Enum capability cell.
pub fn capability_cell(capabilities: &[&str]) -> Cell {
    let links: Vec<String> = capabilities
        .iter()
        .map(|c| format!(r##"<strong><a href="#Capability">{}</a></strong>"##, c))
        .collect();
    Cell {
        html: links.join(", "),
    }
}

fn anchor_for(text: &str) -> String {
    text.split_whitespace()
        .filter(|word| !word.starts_with('<') && *word != "Optional")
        .collect::<Vec<_>>()
        .join("_")
}

/// Complete page with title block, content and footer.
pub fn page(content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>SPIR-V Specification</title>
</head>
<body class="book toc2 toc-left">
<div id="header">
<h1>SPIR-V Specification</h1>
<div class="details">
<span id="author" class="author">John Kessenich, Google and Boaz Ouriel, Intel</span><br>
<span id="revnumber">version 1.00,</span>
</div>
</div>
<div id="content">
{}
</div>
<div id="footer">
<div id="footer-text">
Version 1.00<br>
Last updated 2016-02-17 11:14:26 EST
</div>
</div>
</body>
</html>"#,
        content
    )
}

/// Page without the title block.
pub fn headless_page(content: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<body>\n<div id=\"content\">\n{}\n</div>\n</body>\n</html>",
        content
    )
}

/// Section with a heading and body.
pub fn section(heading_tag: &str, heading: &str, body: &str) -> String {
    format!(
        "<div class=\"sect\">\n<{tag}>{heading}</{tag}>\n{body}\n</div>",
        tag = heading_tag,
        heading = heading,
        body = body
    )
}

/// Section whose heading carries an id.
pub fn anchored_section(heading_tag: &str, id: &str, heading: &str, body: &str) -> String {
    format!(
        "<div class=\"sect\">\n<{tag} id=\"{id}\">{heading}</{tag}>\n{body}\n</div>",
        tag = heading_tag,
        id = id,
        heading = heading,
        body = body
    )
}

/// Instruction table: description row (+ capability cell) and layout row.
pub fn instruction(
    name: &str,
    description: &str,
    capabilities: &[&str],
    word_count: &str,
    opcode: &str,
    operands: &[Cell],
) -> String {
    let mut first_row = format!(
        "{}<a id=\"{name}\"></a><strong>{name}</strong><br>\n<br>\n{}{}",
        r#"<td class="tableblock halign-left valign-top" colspan="4"><p class="tableblock">"#,
        escape(description),
        TD_CLOSE,
        name = name
    );
    if !capabilities.is_empty() {
        let links: Vec<String> = capabilities
            .iter()
            .map(|c| format!(r##"<a href="#{0}">{0}</a>"##, c))
            .collect();
        first_row.push('\n');
        first_row.push_str(&format!(
            r##"{}<a href="#Capability">Capability</a>:<br>
{}{}"##,
            TD_OPEN,
            links.join(", "),
            TD_CLOSE
        ));
    }

    let mut layout = vec![text(word_count).render(), text(opcode).render()];
    layout.extend(operands.iter().map(Cell::render));

    format!(
        "<table class=\"tableblock frame-all grid-all\">\n<tbody>\n<tr>\n{}\n</tr>\n<tr>\n{}\n</tr>\n</tbody>\n</table>",
        first_row,
        layout.join("\n")
    )
}

/// Enum table preceded by a prose paragraph.
pub fn enum_table(prose: &str, rows: &[Vec<Cell>]) -> String {
    let rendered: Vec<String> = rows
        .iter()
        .map(|cells| {
            let cells: Vec<String> = cells.iter().map(Cell::render).collect();
            format!("<tr>\n{}\n</tr>", cells.join("\n"))
        })
        .collect();
    let mut out = String::new();
    if !prose.is_empty() {
        out.push_str(&format!("<div class=\"paragraph\"><p>{}</p></div>\n", prose));
    }
    out.push_str(&format!(
        "<table class=\"tableblock frame-all grid-all\">\n<thead>\n<tr>\n<th>Value</th>\n<th>Name</th>\n</tr>\n</thead>\n<tbody>\n{}\n</tbody>\n</table>",
        rendered.join("\n")
    ));
    out
}

/// Extended instruction table. The description may span several blocks.
pub fn extended_instruction(name: &str, blocks: &[&str], number: &str, operands: &[Cell]) -> String {
    let mut name_cell = format!(
        "{}<a id=\"{name}\"></a><strong>{name}</strong><br>\n<br>\n{}</p>",
        r#"<td class="tableblock halign-left valign-top" colspan="3"><p class="tableblock">"#,
        blocks.first().copied().unwrap_or_default(),
        name = name
    );
    for block in blocks.iter().skip(1) {
        name_cell.push_str(&format!("<p class=\"tableblock\">{}</p>", block));
    }
    name_cell.push_str("</td>");

    let mut layout = vec![text(number).render()];
    layout.extend(operands.iter().map(Cell::render));

    format!(
        "<table class=\"tableblock frame-all grid-all\">\n<tbody>\n<tr>\n{}\n</tr>\n<tr>\n{}\n</tr>\n</tbody>\n</table>",
        name_cell,
        layout.join("\n")
    )
}

pub fn parse(html: &str) -> Document {
    Document::parse_html(html).expect("fixture parses")
}
