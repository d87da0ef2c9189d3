use crate::document::{Attribute, Document, NodeId, NodeKind};
use crate::error::{QueryError, Result};
use tl::{NodeHandle, ParserOptions};

/// Parses markup with `tl` and copies the result into an owned [`Document`].
///
/// `tl` is lenient: unbalanced or unclosed tags still produce a best-effort
/// tree. Invalid UTF-8 sequences are replaced with U+FFFD before parsing.
/// Only input that `tl` itself refuses fails with [`QueryError::Parse`].
///
/// Tag names and attribute keys are ASCII-lowercased, and attributes keep
/// the order they were written in.
pub struct HtmlParser;

impl HtmlParser {
    pub fn parse(bytes: &[u8]) -> Result<Document> {
        let content = String::from_utf8_lossy(bytes);
        Self::parse_str(&content)
    }

    pub fn parse_str(content: &str) -> Result<Document> {
        let options = ParserOptions::default().track_ids();
        let vdom = tl::parse(content, options).map_err(|e| QueryError::Parse(format!("{e:?}")))?;
        let parser = vdom.parser();

        let mut document = Document::new();
        let root = document.root();

        // Popped in document order, so appends to a parent arrive in child order
        let mut stack: Vec<(NodeHandle, NodeId)> =
            vdom.children().iter().rev().cloned().map(|h| (h, root)).collect();

        while let Some((handle, parent)) = stack.pop() {
            let Some(node) = handle.get(parser) else {
                continue;
            };

            let id = match node {
                tl::Node::Tag(tag) => {
                    let name = tag.name().as_utf8_str().to_ascii_lowercase();
                    let mut attributes: Vec<Attribute> = tag
                        .attributes()
                        .iter()
                        .map(|(key, value)| {
                            Attribute::new(
                                key.to_ascii_lowercase(),
                                value.as_deref().unwrap_or_default(),
                            )
                        })
                        .collect();
                    // tl keeps attributes in a map, recover the written order
                    let order = attribute_order(&tag.raw().as_utf8_str());
                    attributes.sort_by_key(|attr| {
                        order
                            .iter()
                            .position(|key| *key == attr.key)
                            .unwrap_or(usize::MAX)
                    });
                    // <!DOCTYPE ...> and friends come through as tags
                    let kind = if name.starts_with('!') {
                        NodeKind::Other
                    } else {
                        NodeKind::Element
                    };
                    document.append(parent, kind, name, attributes)
                }
                tl::Node::Raw(bytes) => document.append_text(parent, bytes.as_utf8_str()),
                tl::Node::Comment(bytes) => {
                    let raw = bytes.as_utf8_str();
                    let text = raw
                        .trim_start_matches("<!--")
                        .trim_end_matches("-->")
                        .to_string();
                    document.append_comment(parent, text)
                }
            };

            if let Some(children) = node.children() {
                // Collect first, the inline child list has no rev()
                let handles: Vec<NodeHandle> = children.top().iter().cloned().collect();
                stack.extend(handles.into_iter().rev().map(|h| (h, id)));
            }
        }

        tracing::debug!(nodes = document.len(), "parsed document");
        Ok(document)
    }
}

/// Lowercased attribute keys of the opening tag in `raw`, in source order.
fn attribute_order(raw: &str) -> Vec<String> {
    let bytes = raw.as_bytes();
    let mut keys = Vec::new();

    // Skip "<" and the tag name
    let mut i = bytes.iter().position(|&b| b == b'<').map_or(0, |p| p + 1);
    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'>' | b'/') {
        i += 1;
    }

    loop {
        while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] == b'>' {
            break;
        }

        let start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        if i == start {
            // Stray '=' with no key
            i += 1;
            continue;
        }
        keys.push(raw[start..i].to_ascii_lowercase());

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            match bytes.get(i) {
                Some(&quote @ (b'"' | b'\'')) => {
                    i += 1;
                    while i < bytes.len() && bytes[i] != quote {
                        i += 1;
                    }
                    i += 1;
                }
                _ => {
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                        i += 1;
                    }
                }
            }
        }
    }

    keys
}
