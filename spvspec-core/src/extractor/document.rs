//! Document Arena
//!
//! This module provides the read-only document tree the extractors walk.
//! Nodes live in a single arena and are addressed by [`NodeId`]; every query
//! (`parent_of`, `children_of`, `next_sibling_of`, ...) takes `&self`, so the
//! classification code never holds mutable tree references.
//!
//! # Loading
//! [`Document::parse_html`] runs the markup through `scraper` (html5ever's
//! tree builder, which also decodes character entities) and copies the
//! result into the arena. Whitespace-only text nodes are kept: enum rows are
//! classified by their raw column count, which includes the line breaks
//! between cells.
//!
//! Tests and tools can build a tree directly with [`DocumentBuilder`].

use crate::extractor::error::{ExtractError, ExtractResult};
use scraper::{ElementRef, Html, Node};
use std::collections::HashMap;

/// Index of a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Payload of a document node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Markup element with its attributes in source order
    Element {
        name: String,
        attributes: Vec<(String, String)>,
    },
    /// Decoded character data
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed, immutable document tree.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    ids: HashMap<String, NodeId>,
}

const ROOT_NAME: &str = "#document";

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

impl Document {
    /// Parse HTML markup into a document arena.
    ///
    /// # Errors
    /// Returns [`ExtractError::DocumentLoad`] if the source is empty. Markup
    /// errors are tolerated the way a browser tolerates them.
    pub fn parse_html(source: &str) -> ExtractResult<Self> {
        if source.trim().is_empty() {
            return Err(ExtractError::DocumentLoad {
                message: "document source is empty".to_string(),
            });
        }

        let html = Html::parse_document(source);
        if !html.errors.is_empty() {
            log::debug!("Markup parsed with {} recoverable errors", html.errors.len());
        }

        let mut builder = DocumentBuilder::new();
        copy_element(&mut builder, html.root_element());
        let document = builder.finish();
        log::debug!("Document arena holds {} nodes", document.len());
        Ok(document)
    }

    /// Number of nodes, including the synthetic root.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Synthetic root element owning the top-level nodes.
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    #[inline]
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    #[inline]
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Element children only, skipping text nodes.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children_of(id)
            .iter()
            .copied()
            .filter(move |child| self.element_name(*child).is_some())
    }

    /// Element children with the given tag name.
    pub fn children_named(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        self.element_children(id)
            .filter(|child| self.is_element(*child, name))
            .collect()
    }

    /// Position of a node among its parent's children.
    fn position(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent_of(id)?;
        let index = self.children_of(parent).iter().position(|c| *c == id)?;
        Some((parent, index))
    }

    pub fn next_sibling_of(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.position(id)?;
        self.children_of(parent).get(index + 1).copied()
    }

    /// Siblings after `id`, in document order.
    pub fn following_siblings(&self, id: NodeId) -> &[NodeId] {
        match self.position(id) {
            Some((parent, index)) => &self.children_of(parent)[index + 1..],
            None => &[],
        }
    }

    /// Siblings before `id`, in document order.
    pub fn preceding_siblings(&self, id: NodeId) -> &[NodeId] {
        match self.position(id) {
            Some((parent, index)) => &self.children_of(parent)[..index],
            None => &[],
        }
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent_of(id), move |node| self.parent_of(*node))
    }

    /// Nearest ancestor element with the given tag name.
    pub fn find_ancestor(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.ancestors(id).find(|node| self.is_element(*node, name))
    }

    /// All nodes below `id` in document order (pre-order), excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result: Vec<NodeId> = Vec::new();
        let mut stack: Vec<NodeId> = self.children_of(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            result.push(node);
            stack.extend(self.children_of(node).iter().rev().copied());
        }
        result
    }

    /// Descendant elements with the given tag name, in document order.
    pub fn descendants_named(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|node| self.is_element(*node, name))
            .collect()
    }

    #[inline]
    pub fn element_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element { name, .. } => Some(name.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    #[inline]
    pub fn is_element(&self, id: NodeId, name: &str) -> bool {
        self.element_name(id) == Some(name)
    }

    pub fn is_heading(&self, id: NodeId) -> bool {
        self.element_name(id)
            .map(|name| HEADINGS.contains(&name))
            .unwrap_or(false)
    }

    pub fn attribute(&self, id: NodeId, key: &str) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    /// Value of the `id` attribute.
    #[inline]
    pub fn html_id(&self, id: NodeId) -> Option<&str> {
        self.attribute(id, "id")
    }

    /// Look up a node by its `id` attribute. The first occurrence wins.
    pub fn by_id(&self, html_id: &str) -> Option<NodeId> {
        self.ids.get(html_id).copied()
    }

    /// Decoded text below `id`. `<br>` renders as a line break.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.push_text(id, &mut out);
        out
    }

    fn push_text(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { name, .. } if name == "br" => out.push('\n'),
            NodeKind::Element { .. } => {
                for child in self.children_of(id) {
                    self.push_text(*child, out);
                }
            }
        }
    }

    /// Decoded text with each line trimmed and blank lines dropped.
    pub fn cell_text(&self, id: NodeId) -> String {
        normalize_lines(&self.text_content(id))
    }

    /// Re-serialized markup of the children of `id`.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children_of(id) {
            self.push_html(*child, &mut out);
        }
        out
    }

    /// Re-serialized markup of `id` itself.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.push_html(id, &mut out);
        out
    }

    fn push_html(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::Element { name, attributes } => {
                out.push('<');
                out.push_str(name);
                for (key, value) in attributes {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape_attribute(value));
                    out.push('"');
                }
                if VOID_ELEMENTS.contains(&name.as_str()) {
                    out.push_str(" />");
                    return;
                }
                out.push('>');
                for child in self.children_of(id) {
                    self.push_html(*child, out);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
    }

    /// `href` values of the links below `id`, in document order.
    pub fn link_targets(&self, id: NodeId) -> Vec<&str> {
        self.descendants_named(id, "a")
            .into_iter()
            .filter_map(|node| self.attribute(node, "href"))
            .collect()
    }

    /// Whether the markup below `id` contains a cross-reference link.
    pub fn contains_link(&self, id: NodeId) -> bool {
        self.descendants(id)
            .into_iter()
            .any(|node| self.is_element(node, "a") && self.attribute(node, "href").is_some())
    }

    /// Nearest heading that precedes `id` at its own level or at any
    /// enclosing level.
    pub fn nearest_heading(&self, id: NodeId) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find_map(|node| {
                if self.is_heading(node) {
                    return Some(node);
                }
                self.preceding_siblings(node)
                    .iter()
                    .rev()
                    .copied()
                    .find(|sibling| self.is_heading(*sibling))
            })
    }
}

/// Incremental, pre-order builder for a [`Document`].
#[derive(Debug)]
pub struct DocumentBuilder {
    nodes: Vec<NodeData>,
    stack: Vec<NodeId>,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBuilder {
    pub fn new() -> Self {
        let root = NodeData {
            kind: NodeKind::Element {
                name: ROOT_NAME.to_string(),
                attributes: Vec::new(),
            },
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            stack: vec![NodeId(0)],
        }
    }

    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(NodeId(0))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let parent = self.current();
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Open an element; following nodes become its children until `close`.
    pub fn open<'a, I>(&mut self, name: &str, attributes: I) -> NodeId
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let attributes = attributes
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        let id = self.push(NodeKind::Element {
            name: name.to_ascii_lowercase(),
            attributes,
        });
        self.stack.push(id);
        id
    }

    /// Close the innermost open element. The root is never closed.
    pub fn close(&mut self) -> &mut Self {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
        self
    }

    pub fn text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    /// Element with a single text child.
    pub fn leaf<'a, I>(&mut self, name: &str, attributes: I, text: &str) -> NodeId
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let id = self.open(name, attributes);
        if !text.is_empty() {
            self.text(text);
        }
        self.close();
        id
    }

    pub fn finish(self) -> Document {
        let mut ids: HashMap<String, NodeId> = HashMap::new();
        // Arena order is document order, so the first insert is the first occurrence.
        for (index, node) in self.nodes.iter().enumerate() {
            if let NodeKind::Element { attributes, .. } = &node.kind {
                if let Some((_, value)) = attributes.iter().find(|(key, _)| key == "id") {
                    ids.entry(value.clone()).or_insert(NodeId(index));
                }
            }
        }
        Document {
            nodes: self.nodes,
            ids,
        }
    }
}

fn copy_element(builder: &mut DocumentBuilder, element: ElementRef<'_>) {
    let value = element.value();
    builder.open(value.name(), value.attrs());
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                builder.text(&**text);
            }
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    copy_element(builder, child_element);
                }
            }
            _ => {}
        }
    }
    builder.close();
}

/// Trim every line and drop blank ones.
pub fn normalize_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Join the non-blank lines of `text` with single spaces.
pub fn flatten_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip leading and trailing `<br />` markers and whitespace from markup.
pub fn trim_breaks(html: &str) -> &str {
    const BREAK: &str = "<br />";
    let mut trimmed = html.trim();
    loop {
        let before = trimmed.len();
        trimmed = trimmed.trim_start_matches(BREAK).trim_end_matches(BREAK).trim();
        if trimmed.len() == before {
            return trimmed;
        }
    }
}

/// Parse a bare decimal or `0x`-prefixed hexadecimal integer.
pub fn parse_integer(text: &str) -> Option<u32> {
    let text = text.trim();
    match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => text.parse::<u32>().ok(),
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
