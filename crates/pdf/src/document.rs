//! # Layout Document Model
//!
//! The layout-parsing service returns a flat, ordered list of blocks (headers,
//! paragraphs, list items, tables). This module rebuilds the section hierarchy
//! from that list and renders it back to HTML.
//!
//! Tree rules:
//! - a `header` block opens a section; it first closes every open section whose
//!   level is the same or deeper;
//! - tables and paragraphs (and any unknown tag) attach to the innermost open
//!   section, or to the document root before the first header;
//! - a list item nests under the preceding paragraph or list item when its
//!   level is deeper, otherwise it becomes a sibling.

use serde::Deserialize;

// --- Wire format ---

/// One block as emitted by the layout-parsing service.
#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub level: usize,
    #[serde(default)]
    pub page_idx: usize,
    #[serde(default)]
    pub block_idx: usize,
    #[serde(default)]
    pub sentences: Vec<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub table_rows: Vec<RawTableRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTableRow {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub cells: Vec<RawTableCell>,
    /// Only present on `full_row` rows.
    #[serde(default)]
    pub cell_value: Option<CellValue>,
    #[serde(default)]
    pub col_span: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTableCell {
    #[serde(default)]
    pub cell_value: Option<CellValue>,
    #[serde(default)]
    pub col_span: Option<usize>,
}

/// A cell is either plain text or a nested paragraph block.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Block(Box<Block>),
    Other(serde_json::Value),
}

impl CellValue {
    fn to_text(&self) -> String {
        match self {
            CellValue::Text(text) => text.clone(),
            CellValue::Block(block) => block.sentences.join(" "),
            CellValue::Other(serde_json::Value::Null) => String::new(),
            CellValue::Other(value) => value.to_string(),
        }
    }
}

// --- Document tree ---

/// How much of a node's subtree to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildRendering {
    /// The node alone.
    None,
    /// The node and its direct children, each rendered alone.
    Direct,
    /// The node and its whole subtree.
    Recursive,
}

impl ChildRendering {
    fn for_children(self) -> Self {
        match self {
            ChildRendering::Recursive => ChildRendering::Recursive,
            ChildRendering::Direct | ChildRendering::None => ChildRendering::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Section(Section),
    Paragraph(TextBlock),
    ListItem(TextBlock),
    Table(Table),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub level: usize,
    pub page_idx: usize,
    pub block_idx: usize,
    pub children: Vec<Node>,
}

/// Body of a paragraph or list item.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub sentences: Vec<String>,
    pub level: usize,
    pub page_idx: usize,
    pub block_idx: usize,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub level: usize,
    pub page_idx: usize,
    pub block_idx: usize,
    pub headers: Vec<TableRow>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub text: String,
    pub col_span: usize,
}

impl Section {
    fn from_block(block: Block) -> Self {
        Self {
            title: block.sentences.join(" "),
            level: block.level,
            page_idx: block.page_idx,
            block_idx: block.block_idx,
            children: Vec::new(),
        }
    }

    pub fn to_html(&self, children: ChildRendering) -> String {
        let heading = (self.level + 1).min(6);
        let mut html = format!("<h{heading}>{}</h{heading}>", self.title);
        if children != ChildRendering::None {
            for child in &self.children {
                html.push_str(&child.to_html(children.for_children()));
            }
        }
        html
    }
}

impl TextBlock {
    fn from_block(block: Block) -> Self {
        Self {
            sentences: block.sentences,
            level: block.level,
            page_idx: block.page_idx,
            block_idx: block.block_idx,
            children: Vec::new(),
        }
    }

    pub fn text(&self) -> String {
        self.sentences.join("\n")
    }

    fn to_html(&self, tag: &str, children: ChildRendering) -> String {
        let mut html = format!("<{tag}>{}", self.text());
        if children != ChildRendering::None && !self.children.is_empty() {
            html.push_str("<ul>");
            for child in &self.children {
                html.push_str(&child.to_html(children.for_children()));
            }
            html.push_str("</ul>");
        }
        html.push_str(&format!("</{tag}>"));
        html
    }
}

impl Table {
    fn from_block(block: Block) -> Self {
        let mut headers = Vec::new();
        let mut rows = Vec::new();
        for raw in block.table_rows {
            let is_header = raw.kind == "table_header";
            let row = TableRow::from_raw(raw);
            if is_header {
                headers.push(row);
            } else {
                rows.push(row);
            }
        }
        Self {
            name: block.name,
            level: block.level,
            page_idx: block.page_idx,
            block_idx: block.block_idx,
            headers,
            rows,
        }
    }

    pub fn to_html(&self) -> String {
        let mut html = String::from("<table>");
        for header in &self.headers {
            html.push_str(&header.to_html("th"));
        }
        for row in &self.rows {
            html.push_str(&row.to_html("td"));
        }
        html.push_str("</table>");
        html
    }
}

impl TableRow {
    fn from_raw(raw: RawTableRow) -> Self {
        let cells = if raw.kind == "full_row" {
            vec![TableCell::new(raw.cell_value.as_ref(), raw.col_span)]
        } else {
            raw.cells
                .iter()
                .map(|cell| TableCell::new(cell.cell_value.as_ref(), cell.col_span))
                .collect()
        };
        Self { cells }
    }

    fn to_html(&self, cell_tag: &str) -> String {
        let mut html = String::from("<tr>");
        for cell in &self.cells {
            if cell.col_span > 1 {
                html.push_str(&format!(
                    "<{cell_tag} colSpan={}>{}</{cell_tag}>",
                    cell.col_span, cell.text
                ));
            } else {
                html.push_str(&format!("<{cell_tag}>{}</{cell_tag}>", cell.text));
            }
        }
        html.push_str("</tr>");
        html
    }
}

impl TableCell {
    fn new(value: Option<&CellValue>, col_span: Option<usize>) -> Self {
        Self {
            text: value.map(CellValue::to_text).unwrap_or_default(),
            col_span: col_span.unwrap_or(1).max(1),
        }
    }
}

impl Node {
    pub fn to_html(&self, children: ChildRendering) -> String {
        match self {
            Node::Section(section) => section.to_html(children),
            Node::Paragraph(paragraph) => paragraph.to_html("p", children),
            Node::ListItem(item) => item.to_html("li", children),
            Node::Table(table) => table.to_html(),
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Section(section) => &section.children,
            Node::Paragraph(block) | Node::ListItem(block) => &block.children,
            Node::Table(_) => &[],
        }
    }

    /// The child list a list item at `level` should join, if this node takes it.
    fn list_parent_mut(&mut self, level: usize) -> Option<&mut Vec<Node>> {
        match self {
            Node::Paragraph(block) | Node::ListItem(block) if block.level < level => {
                Some(&mut block.children)
            }
            _ => None,
        }
    }
}

/// A parsed document: the ordered root-level nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let mut builder = TreeBuilder::default();
        for block in blocks {
            builder.push(block);
        }
        Self {
            nodes: builder.finish(),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every section, nested ones included, depth-first in document order.
    pub fn sections(&self) -> Vec<&Section> {
        descendants(&self.nodes)
            .into_iter()
            .filter_map(|node| match node {
                Node::Section(section) => Some(section),
                _ => None,
            })
            .collect()
    }

    /// Sections that are not nested inside another section.
    pub fn top_level_sections(&self) -> Vec<&Section> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                Node::Section(section) => Some(section),
                _ => None,
            })
            .collect()
    }

    /// Every table, wherever it sits in the tree.
    pub fn tables(&self) -> Vec<&Table> {
        descendants(&self.nodes)
            .into_iter()
            .filter_map(|node| match node {
                Node::Table(table) => Some(table),
                _ => None,
            })
            .collect()
    }

    /// The whole document, root-level nodes included.
    pub fn to_html(&self) -> String {
        self.nodes
            .iter()
            .map(|node| node.to_html(ChildRendering::Recursive))
            .collect()
    }
}

/// Pre-order walk: each node, then its subtree.
fn descendants(nodes: &[Node]) -> Vec<&Node> {
    let mut out = Vec::new();
    for node in nodes {
        out.push(node);
        out.extend(descendants(node.children()));
    }
    out
}

fn nest_list_item(siblings: &mut Vec<Node>, item: TextBlock) {
    if let Some(parent) = siblings
        .last_mut()
        .and_then(|node| node.list_parent_mut(item.level))
    {
        nest_list_item(parent, item);
        return;
    }
    siblings.push(Node::ListItem(item));
}

#[derive(Default)]
struct TreeBuilder {
    roots: Vec<Node>,
    open: Vec<Section>,
}

impl TreeBuilder {
    fn push(&mut self, block: Block) {
        match block.tag.as_str() {
            "header" => {
                self.close_sections_from(block.level);
                self.open.push(Section::from_block(block));
            }
            "list_item" => {
                let item = TextBlock::from_block(block);
                nest_list_item(self.container(), item);
            }
            "table" => {
                let table = Table::from_block(block);
                self.container().push(Node::Table(table));
            }
            _ => {
                let paragraph = TextBlock::from_block(block);
                self.container().push(Node::Paragraph(paragraph));
            }
        }
    }

    fn close_sections_from(&mut self, level: usize) {
        while self.open.last().is_some_and(|s| s.level >= level) {
            if let Some(section) = self.open.pop() {
                self.container().push(Node::Section(section));
            }
        }
    }

    fn container(&mut self) -> &mut Vec<Node> {
        match self.open.last_mut() {
            Some(section) => &mut section.children,
            None => &mut self.roots,
        }
    }

    fn finish(mut self) -> Vec<Node> {
        self.close_sections_from(0);
        self.roots
    }
}
