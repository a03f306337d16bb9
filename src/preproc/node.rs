//! YAML document tree.
//!
//! The tree is the intermediate representation of the whole preprocessing
//! pipeline: includes and templates are merged tree-to-tree, and only the
//! final normalized tree is decoded into the typed configuration.
//!
//! Mappings preserve authored key order. Scalars remember whether the author
//! quoted them (or tagged them with the non-specific `!` tag), because the
//! generator reproduces quoting verbatim in its output.

use yaml_rust2::parser::{Event, EventReceiver, Parser, Tag};
use yaml_rust2::scanner::{ScanError, TScalarStyle};

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Null,
    Scalar(Scalar),
    Sequence(Vec<Node>),
    /// Key-value pairs in authored order. Keys are raw strings and may carry
    /// a trailing attribute (`name:REPLACE`).
    Mapping(Vec<(String, Node)>),
}

/// A scalar value with its authored quoting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
    pub value: String,
    pub quoted: bool,
}

/// Split a mapping key into its base name and attribute (empty when absent).
pub fn key_attribute(key: &str) -> (&str, &str) {
    match key.find(':') {
        Some(pos) => (&key[..pos], &key[pos + 1..]),
        None => (key, ""),
    }
}

impl Node {
    /// Parse the first YAML document of `text`. Empty input yields `Null`.
    pub fn parse(text: &str) -> Result<Node, ScanError> {
        let mut parser = Parser::new_from_str(text);
        let mut builder = TreeBuilder::default();
        parser.load(&mut builder, false)?;
        Ok(builder.root.unwrap_or(Node::Null))
    }

    pub fn scalar(value: impl Into<String>, quoted: bool) -> Node {
        Node::Scalar(Scalar {
            value: value.into(),
            quoted,
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Node::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_sequence_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&[(String, Node)]> {
        match self {
            Node::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut Vec<(String, Node)>> {
        match self {
            Node::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a mapping value by exact key.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Look up a mapping value by exact key, mutably.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.as_mapping_mut()?
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Find a mapping entry by base name, ignoring any key attribute.
    ///
    /// An exact key match wins; otherwise the first entry whose base name
    /// matches is returned together with its attribute.
    pub fn find(&self, base: &str) -> Option<(usize, &str)> {
        let entries = self.as_mapping()?;

        if let Some(idx) = entries.iter().position(|(k, _)| k == base) {
            return Some((idx, ""));
        }

        entries
            .iter()
            .position(|(k, _)| key_attribute(k).0 == base)
            .map(|idx| (idx, key_attribute(&entries[idx].0).1))
    }

    /// Remove a mapping entry by exact key.
    pub fn remove(&mut self, key: &str) {
        if let Some(entries) = self.as_mapping_mut() {
            entries.retain(|(k, _)| k != key);
        }
    }

    /// Dump the tree in compact flow style, for tests and trace logging.
    pub fn dump(&self) -> String {
        match self {
            Node::Null => "~".to_string(),
            Node::Scalar(s) => {
                if s.quoted {
                    format!("\"{}\"", s.value)
                } else {
                    s.value.clone()
                }
            }
            Node::Sequence(items) => {
                let inner: Vec<String> = items.iter().map(Node::dump).collect();
                format!("[{}]", inner.join(", "))
            }
            Node::Mapping(entries) => {
                let inner: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v.dump()))
                    .collect();
                format!("{{{}}}", inner.join(", "))
            }
        }
    }
}

/// Event-stream loader building the tree bottom-up.
#[derive(Default)]
struct TreeBuilder {
    root: Option<Node>,
    stack: Vec<Frame>,
}

enum Frame {
    Sequence(Vec<Node>),
    Mapping(Vec<(String, Node)>, Option<String>),
}

impl TreeBuilder {
    fn insert(&mut self, node: Node) {
        match self.stack.last_mut() {
            None => self.root = Some(node),
            Some(Frame::Sequence(items)) => items.push(node),
            Some(Frame::Mapping(entries, pending)) => match pending.take() {
                Some(key) => entries.push((key, node)),
                None => {
                    // a non-scalar key has no base name to merge under
                    let key = match node {
                        Node::Scalar(s) => s.value,
                        other => other.dump(),
                    };
                    *pending = Some(key);
                }
            },
        }
    }
}

fn is_null_scalar(value: &str, style: TScalarStyle, tag: Option<&Tag>) -> bool {
    style == TScalarStyle::Plain
        && tag.is_none()
        && matches!(value, "" | "~" | "null" | "Null" | "NULL")
}

fn is_quote_tag(tag: Option<&Tag>) -> bool {
    tag.map(|t| t.handle == "!" && t.suffix.is_empty())
        .unwrap_or(false)
}

impl EventReceiver for TreeBuilder {
    fn on_event(&mut self, ev: Event) {
        match ev {
            Event::Scalar(value, style, _, tag) => {
                let node = if is_null_scalar(&value, style, tag.as_ref()) {
                    Node::Null
                } else {
                    let quoted = style != TScalarStyle::Plain || is_quote_tag(tag.as_ref());
                    Node::scalar(value, quoted)
                };
                self.insert(node);
            }
            Event::SequenceStart(..) => self.stack.push(Frame::Sequence(Vec::new())),
            Event::SequenceEnd => {
                if let Some(Frame::Sequence(items)) = self.stack.pop() {
                    self.insert(Node::Sequence(items));
                }
            }
            Event::MappingStart(..) => self.stack.push(Frame::Mapping(Vec::new(), None)),
            Event::MappingEnd => {
                if let Some(Frame::Mapping(entries, _)) = self.stack.pop() {
                    self.insert(Node::Mapping(entries));
                }
            }
            Event::Alias(_) => self.insert(Node::Null),
            _ => {}
        }
    }
}
