use std::collections::HashMap;

use markdown::{
    mdast::{AlignKind, Node},
    ParseOptions,
};
use serde::Serialize;
use tracing::warn;

mod html;

pub use html::to_html;

/// Subtrees nested deeper than this are flattened to plain text.
const MAX_NESTING: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ContentBlock {
    Heading {
        level: u8,
        content: Vec<Inline>,
    },
    Paragraph {
        content: Vec<Inline>,
    },
    List {
        ordered: bool,
        start: Option<u32>,
        items: Vec<ListItem>,
    },
    /// Every row, header included, has exactly `alignments.len()` cells.
    Table {
        alignments: Vec<Alignment>,
        header: Vec<Vec<Inline>>,
        rows: Vec<Vec<Vec<Inline>>>,
    },
    /// Fenced or indented code. `language` is a display hint only.
    CodeBlock {
        language: Option<String>,
        text: String,
    },
    BlockQuote {
        blocks: Vec<ContentBlock>,
    },
    ThematicBreak,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    /// `Some` for task-list items.
    pub checked: Option<bool>,
    pub blocks: Vec<ContentBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Inline {
    Text(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    /// Inline code span; distinct from [`ContentBlock::CodeBlock`].
    Code(String),
    Link { href: String, content: Vec<Inline> },
    Image { src: String, alt: String },
    LineBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    None,
    Left,
    Center,
    Right,
}

impl From<&AlignKind> for Alignment {
    fn from(value: &AlignKind) -> Self {
        match value {
            AlignKind::Left => Alignment::Left,
            AlignKind::Center => Alignment::Center,
            AlignKind::Right => Alignment::Right,
            AlignKind::None => Alignment::None,
        }
    }
}

impl Inline {
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.write_plain(&mut out);
        out
    }

    fn write_plain(&self, out: &mut String) {
        match self {
            Inline::Text(text) | Inline::Code(text) => out.push_str(text),
            Inline::Emphasis(children)
            | Inline::Strong(children)
            | Inline::Strikethrough(children)
            | Inline::Link {
                content: children, ..
            } => children.iter().for_each(|child| child.write_plain(out)),
            Inline::Image { alt, .. } => out.push_str(alt),
            Inline::LineBreak => out.push('\n'),
        }
    }
}

pub fn plain_text(inlines: &[Inline]) -> String {
    inlines.iter().map(Inline::plain_text).collect()
}

/// Rendered result. Blocks are produced eagerly by [`render`] and can be
/// iterated any number of times.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RenderedContent {
    blocks: Vec<ContentBlock>,
}

impl RenderedContent {
    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContentBlock> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl<'a> IntoIterator for &'a RenderedContent {
    type Item = &'a ContentBlock;
    type IntoIter = std::slice::Iter<'a, ContentBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

/// Parses GitHub-flavored markdown into content blocks. Never fails: raw
/// HTML stays literal and a parser error yields one plain paragraph.
pub fn render(text: &str) -> RenderedContent {
    let root = match markdown::to_mdast(text, &ParseOptions::gfm()) {
        Ok(root) => root,
        Err(error) => {
            warn!(%error, "markdown parse failed; rendering as plain text");
            return plain_fallback(text);
        }
    };

    let converter = Converter {
        definitions: collect_definitions(&root),
    };

    let children = root.children().map(Vec::as_slice).unwrap_or_default();
    RenderedContent {
        blocks: converter.blocks(children, 0),
    }
}

fn plain_fallback(text: &str) -> RenderedContent {
    if text.trim().is_empty() {
        return RenderedContent::default();
    }
    RenderedContent {
        blocks: vec![ContentBlock::Paragraph {
            content: vec![Inline::Text(text.to_string())],
        }],
    }
}

fn normalize_identifier(identifier: &str) -> String {
    identifier
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn collect_definitions(root: &Node) -> HashMap<String, String> {
    let mut definitions = HashMap::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if let Node::Definition(definition) = node {
            // First definition wins, as in CommonMark.
            definitions
                .entry(normalize_identifier(&definition.identifier))
                .or_insert_with(|| definition.url.clone());
        }
        if let Some(children) = node.children() {
            stack.extend(children.iter().rev());
        }
    }
    definitions
}

/// Plain text of a whole subtree, walked without recursion.
fn flatten_text(root: &Node) -> String {
    let mut out = String::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        match node {
            Node::Text(text) => out.push_str(&text.value),
            Node::InlineCode(code) => out.push_str(&code.value),
            Node::Code(code) => out.push_str(&code.value),
            Node::Html(html) => out.push_str(&html.value),
            Node::Image(image) => out.push_str(&image.alt),
            Node::ImageReference(reference) => out.push_str(&reference.alt),
            Node::Break(_) => out.push('\n'),
            Node::Paragraph(_) | Node::Heading(_) | Node::ListItem(_) => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            _ => {}
        }
        if let Some(children) = node.children() {
            stack.extend(children.iter().rev());
        }
    }
    out
}

struct Converter {
    definitions: HashMap<String, String>,
}

impl Converter {
    fn blocks(&self, nodes: &[Node], depth: usize) -> Vec<ContentBlock> {
        let mut out = Vec::new();
        for node in nodes {
            self.block(node, depth, &mut out);
        }
        out
    }

    fn block(&self, node: &Node, depth: usize, out: &mut Vec<ContentBlock>) {
        if depth > MAX_NESTING {
            let text = flatten_text(node);
            if !text.trim().is_empty() {
                out.push(ContentBlock::Paragraph {
                    content: vec![Inline::Text(text)],
                });
            }
            return;
        }
        let inner = depth + 1;
        match node {
            Node::Heading(heading) => out.push(ContentBlock::Heading {
                level: heading.depth,
                content: self.inlines(&heading.children, inner),
            }),
            Node::Paragraph(paragraph) => {
                let content = self.inlines(&paragraph.children, inner);
                if !content.is_empty() {
                    out.push(ContentBlock::Paragraph { content });
                }
            }
            Node::Code(code) => out.push(ContentBlock::CodeBlock {
                language: code.lang.clone().filter(|lang| !lang.trim().is_empty()),
                text: code.value.clone(),
            }),
            Node::List(list) => out.push(ContentBlock::List {
                ordered: list.ordered,
                start: if list.ordered { list.start } else { None },
                items: list
                    .children
                    .iter()
                    .map(|child| match child {
                        Node::ListItem(item) => ListItem {
                            checked: item.checked,
                            blocks: self.blocks(&item.children, inner),
                        },
                        other => ListItem {
                            checked: None,
                            blocks: self.blocks(std::slice::from_ref(other), inner),
                        },
                    })
                    .collect(),
            }),
            Node::Table(table) => out.push(self.table(&table.children, &table.align, inner)),
            Node::Blockquote(quote) => out.push(ContentBlock::BlockQuote {
                blocks: self.blocks(&quote.children, inner),
            }),
            Node::ThematicBreak(_) => out.push(ContentBlock::ThematicBreak),
            Node::Html(html) => {
                if !html.value.trim().is_empty() {
                    out.push(ContentBlock::Paragraph {
                        content: vec![Inline::Text(html.value.clone())],
                    });
                }
            }
            Node::Definition(_) | Node::Yaml(_) | Node::Toml(_) => {}
            Node::FootnoteDefinition(footnote) => {
                let label = footnote.label.as_deref().unwrap_or(&footnote.identifier);
                let mut blocks = self.blocks(&footnote.children, inner);
                if let Some(ContentBlock::Paragraph { content }) = blocks.first_mut() {
                    content.insert(0, Inline::Text(format!("[^{label}]: ")));
                }
                out.extend(blocks);
            }
            other => {
                // Stray inline content or a construct with no block form.
                let content = self.inlines(std::slice::from_ref(other), inner);
                if !content.is_empty() {
                    out.push(ContentBlock::Paragraph { content });
                }
            }
        }
    }

    fn table(&self, rows: &[Node], align: &[AlignKind], depth: usize) -> ContentBlock {
        let mut rows = rows.iter().map(|row| match row {
            Node::TableRow(row) => row
                .children
                .iter()
                .map(|cell| match cell {
                    Node::TableCell(cell) => self.inlines(&cell.children, depth),
                    other => self.inlines(std::slice::from_ref(other), depth),
                })
                .collect::<Vec<_>>(),
            other => vec![self.inlines(std::slice::from_ref(other), depth)],
        });

        let header = rows.next().unwrap_or_default();
        let width = header.len();
        let rows = rows
            .map(|mut cells| {
                cells.resize_with(width, Vec::new);
                cells
            })
            .collect();
        let mut alignments: Vec<Alignment> = align.iter().map(Alignment::from).collect();
        alignments.resize(width, Alignment::None);

        ContentBlock::Table {
            alignments,
            header,
            rows,
        }
    }

    fn inlines(&self, nodes: &[Node], depth: usize) -> Vec<Inline> {
        let mut out = Vec::new();
        for node in nodes {
            self.inline(node, depth, &mut out);
        }
        out
    }

    fn inline(&self, node: &Node, depth: usize, out: &mut Vec<Inline>) {
        if depth > MAX_NESTING {
            let text = flatten_text(node);
            if !text.is_empty() {
                push_text(out, &text);
            }
            return;
        }
        let inner = depth + 1;
        match node {
            Node::Text(text) => push_text(out, &text.value),
            Node::Html(html) => push_text(out, &html.value),
            Node::Emphasis(emphasis) => {
                out.push(Inline::Emphasis(self.inlines(&emphasis.children, inner)))
            }
            Node::Strong(strong) => out.push(Inline::Strong(self.inlines(&strong.children, inner))),
            Node::Delete(delete) => {
                out.push(Inline::Strikethrough(self.inlines(&delete.children, inner)))
            }
            Node::InlineCode(code) => out.push(Inline::Code(code.value.clone())),
            Node::Break(_) => out.push(Inline::LineBreak),
            Node::Link(link) => out.push(Inline::Link {
                href: link.url.clone(),
                content: self.inlines(&link.children, inner),
            }),
            Node::LinkReference(reference) => {
                let content = self.inlines(&reference.children, inner);
                match self.definitions.get(&normalize_identifier(&reference.identifier)) {
                    Some(href) => out.push(Inline::Link {
                        href: href.clone(),
                        content,
                    }),
                    None => out.extend(content),
                }
            }
            Node::Image(image) => out.push(Inline::Image {
                src: image.url.clone(),
                alt: image.alt.clone(),
            }),
            Node::ImageReference(reference) => {
                match self.definitions.get(&normalize_identifier(&reference.identifier)) {
                    Some(src) => out.push(Inline::Image {
                        src: src.clone(),
                        alt: reference.alt.clone(),
                    }),
                    None => push_text(out, &reference.alt),
                }
            }
            Node::FootnoteReference(reference) => {
                let label = reference.label.as_deref().unwrap_or(&reference.identifier);
                push_text(out, &format!("[^{label}]"));
            }
            other => match other.children() {
                Some(children) => {
                    for child in children {
                        self.inline(child, inner, out);
                    }
                }
                None => {
                    let text = other.to_string();
                    if !text.is_empty() {
                        push_text(out, &text);
                    }
                }
            },
        }
    }
}

fn push_text(out: &mut Vec<Inline>, value: &str) {
    if let Some(Inline::Text(last)) = out.last_mut() {
        last.push_str(value);
    } else {
        out.push(Inline::Text(value.to_string()));
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
