use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// Maximum allowed nesting depth for outline elements.
/// Prevents stack overflow from maliciously crafted deeply nested backups.
const MAX_OUTLINE_DEPTH: usize = 50;

/// Errors that can occur while parsing the outline markup.
#[derive(Debug, Error)]
pub enum TreeError {
    /// Outline nesting depth exceeds the safety limit.
    #[error("outline nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),

    /// XML parsing failed.
    #[error("XML parse error: {0}")]
    XmlParse(String),
}

/// One `<outline>` element: an ordered attribute bag plus child outlines.
///
/// Attribute order is document order — schema-drift reporting depends on it
/// to keep unknown names in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct OutlineNode {
    attrs: Vec<(String, String)>,
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    /// The value of the named attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All attributes in document order.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// All descendant outlines whose attribute `name` equals `value`, in
    /// depth-first document order. The node itself is never a match.
    pub fn select<'a>(&'a self, name: &str, value: &str) -> Vec<&'a OutlineNode> {
        let mut found = Vec::new();
        self.select_into(name, value, &mut found);
        found
    }

    fn select_into<'a>(&'a self, name: &str, value: &str, found: &mut Vec<&'a OutlineNode>) {
        for child in &self.children {
            if child.attr(name) == Some(value) {
                found.push(child);
            }
            child.select_into(name, value, found);
        }
    }
}

/// Parses outline markup into a tree rooted at a synthetic document node.
///
/// Only `<outline>` elements become nodes; everything else (the `opml`
/// wrapper, `head`, text content) is traversed and dropped. Outlines nested
/// under non-outline elements attach to the nearest open outline, or to the
/// root when none is open.
pub fn parse(content: &str) -> Result<OutlineNode, TreeError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut root = OutlineNode::default();
    let mut open: Vec<OutlineNode> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"outline" => {
                // Reject excessively nested outlines
                if open.len() >= MAX_OUTLINE_DEPTH {
                    return Err(TreeError::MaxDepthExceeded(MAX_OUTLINE_DEPTH));
                }
                open.push(node_from_element(&e, &reader)?);
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"outline" => {
                // Self-closing outline doesn't affect depth
                let node = node_from_element(&e, &reader)?;
                match open.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => root.children.push(node),
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"outline" => {
                if let Some(node) = open.pop() {
                    match open.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => root.children.push(node),
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(TreeError::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(root)
}

/// Collects an element's attributes into a node, preserving document order.
fn node_from_element(
    e: &BytesStart<'_>,
    reader: &Reader<&[u8]>,
) -> Result<OutlineNode, TreeError> {
    let decoder = reader.decoder();
    let mut node = OutlineNode::default();

    for attr_result in e.attributes() {
        let attr = match attr_result {
            Ok(attr) => attr,
            Err(err) => {
                tracing::warn!(error = %err, "Skipping malformed outline attribute");
                continue;
            }
        };
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .decode_and_unescape_value(decoder)
            .map_err(|err| TreeError::XmlParse(err.to_string()))?
            .into_owned();
        node.attrs.push((key, value));
    }

    Ok(node)
}
