//! Parsed HTML report documents.
//!
//! The tree mirrors the markup as written: no elements are synthesized
//! (a `<tr>` directly under `<table>` does not gain a `<tbody>`), and
//! table sections outside a table are kept where they appear. Each element
//! remembers its byte span so its markup can be returned verbatim.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::{debug, trace};

/// Elements that never have content or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose content is raw text rather than markup.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        name: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    /// Byte range of the element's markup in the source.
    start: usize,
    end: usize,
    /// Nodes are stored in document order, so descendants occupy the
    /// index range `id + 1..subtree_end`.
    subtree_end: usize,
}

/// An in-memory tree of one HTML report.
///
/// The tree is built once and never mutated; extractors and validation rules
/// only read from it.
pub struct ParsedDocument {
    markup: String,
    nodes: Vec<Node>,
    source: Option<PathBuf>,
}

impl ParsedDocument {
    /// Parse a document from markup.
    ///
    /// Parsing never fails: unreadable fragments are skipped.
    pub fn parse(markup: &str) -> Self {
        Self {
            nodes: TreeBuilder::new(markup).build(),
            markup: markup.to_string(),
            source: None,
        }
    }

    /// Read and parse a document from disk.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let markup = fs::read_to_string(path)?;
        trace!("Read {} bytes from {}", markup.len(), path.display());

        let mut document = Self::parse(&markup);
        document.source = Some(path.to_path_buf());
        Ok(document)
    }

    /// Path the document was read from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// The markup the document was parsed from.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// First element with the given tag name, in document order.
    pub fn find(&self, tag: &str) -> Option<ElementRef<'_>> {
        (0..self.nodes.len())
            .find(|&id| self.is_element(id, tag))
            .map(|id| ElementRef { document: self, id })
    }

    fn is_element(&self, id: usize, tag: &str) -> bool {
        matches!(&self.nodes[id].kind, NodeKind::Element { name, .. } if name.eq_ignore_ascii_case(tag))
    }
}

impl fmt::Debug for ParsedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedDocument")
            .field("source", &self.source)
            .field("nodes", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

/// A borrowed element of a [`ParsedDocument`].
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    document: &'a ParsedDocument,
    id: usize,
}

impl<'a> ElementRef<'a> {
    fn node(&self) -> &'a Node {
        &self.document.nodes[self.id]
    }

    /// Lowercased tag name.
    pub fn name(&self) -> &'a str {
        match &self.node().kind {
            NodeKind::Element { name, .. } => name,
            NodeKind::Text(_) => "",
        }
    }

    /// Value of an attribute; names compare case-insensitively.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        match &self.node().kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    /// The element's markup exactly as it appears in the source.
    pub fn html(&self) -> &'a str {
        let node = self.node();
        self.document.markup.get(node.start..node.end).unwrap_or_default()
    }

    fn descendants(&self) -> std::ops::Range<usize> {
        self.id + 1..self.node().subtree_end
    }
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("name", &self.name())
            .field("id", &self.id)
            .finish()
    }
}

/// First descendant of `element` with the given tag name.
pub fn find_within<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    let document = element.document;
    element
        .descendants()
        .find(|&id| document.is_element(id, tag))
        .map(|id| ElementRef { document, id })
}

/// All descendants of `element` with the given tag name, in document order.
pub fn find_all_within<'a>(element: ElementRef<'a>, tag: &str) -> Vec<ElementRef<'a>> {
    let document = element.document;
    element
        .descendants()
        .filter(|&id| document.is_element(id, tag))
        .map(|id| ElementRef { document, id })
        .collect()
}

/// Concatenated text content of an element and its descendants.
pub fn text_of(element: ElementRef<'_>) -> String {
    element
        .descendants()
        .filter_map(|id| match &element.document.nodes[id].kind {
            NodeKind::Text(text) => Some(text.as_str()),
            NodeKind::Element { .. } => None,
        })
        .collect()
}

/// Builds the node list from markup events.
struct TreeBuilder<'s> {
    markup: &'s str,
    reader: Reader<&'s [u8]>,
    /// Byte offset of the reader's input within `markup`.
    offset: usize,
    nodes: Vec<Node>,
    open: Vec<usize>,
}

fn lenient_reader(markup: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(markup);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.check_comments = false;
    reader
}

impl<'s> TreeBuilder<'s> {
    fn new(markup: &'s str) -> Self {
        Self {
            markup,
            reader: lenient_reader(markup),
            offset: 0,
            nodes: Vec::new(),
            open: Vec::new(),
        }
    }

    fn position(&self) -> usize {
        self.offset + self.reader.buffer_position() as usize
    }

    fn resume_at(&mut self, offset: usize) {
        let rest = self.markup.get(offset..).unwrap_or_default();
        self.reader = lenient_reader(rest);
        self.offset = offset;
    }

    fn build(mut self) -> Vec<Node> {
        loop {
            let start = self.position();
            match self.reader.read_event() {
                Ok(Event::Start(tag)) => {
                    let name = tag_name(&tag);
                    let end = self.position();
                    if VOID_ELEMENTS.contains(&name.as_str()) {
                        self.leaf(&tag, name, start, end);
                    } else if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                        self.raw_text(&tag, name, start);
                    } else {
                        self.open_element(&tag, name, start);
                    }
                }
                Ok(Event::Empty(tag)) => {
                    let name = tag_name(&tag);
                    let end = self.position();
                    self.leaf(&tag, name, start, end);
                }
                Ok(Event::End(tag)) => {
                    let name = String::from_utf8_lossy(tag.name().as_ref()).to_ascii_lowercase();
                    let end = self.position();
                    self.close_named(&name, start, end);
                }
                Ok(Event::Text(text)) => {
                    let content = match text.unescape() {
                        Ok(content) => content.into_owned(),
                        Err(_) => String::from_utf8_lossy(&text).into_owned(),
                    };
                    self.text(content, start);
                }
                Ok(Event::CData(data)) => {
                    let content = String::from_utf8_lossy(&data).into_owned();
                    self.text(content, start);
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    debug!("Skipping unreadable markup at byte {}: {}", start, e);
                    if self.position() == start {
                        break;
                    }
                }
            }
        }

        let end = self.markup.len();
        while let Some(id) = self.open.pop() {
            self.finish(id, end);
        }
        self.nodes
    }

    fn push(&mut self, kind: NodeKind, start: usize, end: usize) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            start,
            end,
            subtree_end: id + 1,
        });
        id
    }

    fn element(tag: &BytesStart<'_>, name: String) -> NodeKind {
        let attributes = tag
            .html_attributes()
            .filter_map(Result::ok)
            .map(|attr| {
                let key = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
                let value = match attr.unescape_value() {
                    Ok(value) => value.into_owned(),
                    Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
                };
                (key, value)
            })
            .collect();
        NodeKind::Element { name, attributes }
    }

    fn leaf(&mut self, tag: &BytesStart<'_>, name: String, start: usize, end: usize) {
        self.push(Self::element(tag, name), start, end);
    }

    fn open_element(&mut self, tag: &BytesStart<'_>, name: String, start: usize) {
        self.close_implied(&name, start);
        let id = self.push(Self::element(tag, name), start, start);
        self.open.push(id);
    }

    /// Script and style bodies are not markup: everything up to the matching
    /// end tag becomes a single text node.
    fn raw_text(&mut self, tag: &BytesStart<'_>, name: String, start: usize) {
        let closing = format!("</{name}");
        let id = self.push(Self::element(tag, name), start, start);
        let content_start = self.position();
        let len = self.markup.len();

        let rest = self.markup.get(content_start..).unwrap_or_default();
        let (content_end, end) = match rest.to_ascii_lowercase().find(&closing) {
            Some(at) => {
                let content_end = content_start + at;
                let end = self.markup[content_end..]
                    .find('>')
                    .map_or(len, |gt| content_end + gt + 1);
                (content_end, end)
            }
            None => (len, len),
        };

        let content = self.markup.get(content_start..content_end).unwrap_or_default();
        if !content.is_empty() {
            self.push(NodeKind::Text(content.to_string()), content_start, content_end);
        }
        self.finish(id, end);
        self.resume_at(end);
    }

    fn text(&mut self, content: String, start: usize) {
        let end = self.position();
        self.push(NodeKind::Text(content), start, end);
    }

    /// Close the innermost open element named `name`, along with anything
    /// still open inside it. Unmatched end tags are ignored.
    fn close_named(&mut self, name: &str, start: usize, end: usize) {
        let Some(depth) = self.open.iter().rposition(|&id| self.is_named(id, &[name])) else {
            trace!("Ignoring unmatched </{}>", name);
            return;
        };

        while self.open.len() > depth + 1 {
            if let Some(id) = self.open.pop() {
                self.finish(id, start);
            }
        }
        if let Some(id) = self.open.pop() {
            self.finish(id, end);
        }
    }

    /// Table cells, rows and sections end where the next sibling of the
    /// same kind begins, as they do in HTML.
    fn close_implied(&mut self, name: &str, start: usize) {
        let (closes, boundary): (&[&str], &[&str]) = match name {
            "td" | "th" => (&["td", "th"], &["tr", "table"]),
            "tr" => (&["tr"], &["thead", "tbody", "tfoot", "table"]),
            "thead" | "tbody" | "tfoot" => (&["thead", "tbody", "tfoot"], &["table"]),
            _ => return,
        };

        let nearest = self
            .open
            .iter()
            .rposition(|&id| self.is_named(id, closes) || self.is_named(id, boundary));

        if let Some(depth) = nearest {
            if self.is_named(self.open[depth], closes) {
                while self.open.len() > depth {
                    if let Some(id) = self.open.pop() {
                        self.finish(id, start);
                    }
                }
            }
        }
    }

    fn is_named(&self, id: usize, names: &[&str]) -> bool {
        matches!(&self.nodes[id].kind, NodeKind::Element { name, .. } if names.contains(&name.as_str()))
    }

    fn finish(&mut self, id: usize, end: usize) {
        let subtree_end = self.nodes.len();
        let node = &mut self.nodes[id];
        node.end = end;
        node.subtree_end = subtree_end;
    }
}

fn tag_name(tag: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(tag.name().as_ref()).to_ascii_lowercase()
}
