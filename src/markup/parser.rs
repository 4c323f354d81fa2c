//! Streaming XHTML → [`MarkupNode`] tree builder.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::node::MarkupNode;
use crate::content::TagClass;
use crate::error::{Error, Result};
use crate::util::{local_name, named_entity, resolve_entity};

/// Parse a section document into a tree rooted at its document element.
///
/// `path` is only used to label errors. Whitespace-only character data is
/// dropped unless it separates two inline elements that carry text, where
/// it becomes a single space. Other runs have their whitespace collapsed to
/// single spaces.
pub fn parse_document(path: &str, content: &str) -> Result<MarkupNode> {
    let invalid = |reason: String| Error::InvalidMarkup {
        path: path.to_string(),
        reason,
    };

    let mut reader = Reader::from_str(content);
    reader.config_mut().check_end_names = true;

    // stack[0] is a synthetic document node collecting the root element
    let mut stack: Vec<MarkupNode> = vec![MarkupNode::new("#document")];
    let mut pending = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                flush_text(&mut stack, &mut pending);
                stack.push(element(&e));
            }
            Ok(Event::Empty(e)) => {
                flush_text(&mut stack, &mut pending);
                let node = element(&e);
                append(&mut stack, node);
            }
            Ok(Event::End(_)) => {
                flush_text(&mut stack, &mut pending);
                if stack.len() < 2 {
                    return Err(invalid("unexpected closing tag".into()));
                }
                if let Some(mut node) = stack.pop() {
                    settle_text(&mut node);
                    append(&mut stack, node);
                }
            }
            Ok(Event::Text(e)) => {
                pending.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::CData(e)) => {
                pending.push_str(&String::from_utf8_lossy(&e));
            }
            Ok(Event::GeneralRef(e)) => {
                let name = String::from_utf8_lossy(e.as_ref());
                match resolve_entity(&name) {
                    Some(resolved) => pending.push_str(&resolved),
                    None => {
                        pending.push('&');
                        pending.push_str(&name);
                        pending.push(';');
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(invalid(e.to_string())),
            _ => {}
        }
    }

    if stack.len() > 1 {
        let open = stack.last().map(|n| n.tag.clone()).unwrap_or_default();
        return Err(invalid(format!("unclosed element <{open}>")));
    }

    stack
        .pop()
        .and_then(|doc| doc.children.into_iter().find(|n| !n.is_text()))
        .ok_or_else(|| invalid("no root element".into()))
}

/// Top-level children of every `body` element, in document order.
pub fn body_children(root: &MarkupNode) -> Vec<&MarkupNode> {
    let direct: Vec<&MarkupNode> = root
        .children
        .iter()
        .filter(|n| n.tag.eq_ignore_ascii_case("body"))
        .flat_map(|body| body.children.iter())
        .filter(|n| !is_blank(n))
        .collect();

    if !direct.is_empty() {
        return direct;
    }

    root.find("body")
        .map(|body| body.children.iter().filter(|n| !is_blank(n)).collect())
        .unwrap_or_default()
}

fn element(e: &BytesStart<'_>) -> MarkupNode {
    let name = e.name();
    let tag = String::from_utf8_lossy(local_name(name.as_ref())).into_owned();

    let mut attributes = HashMap::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = quick_xml::escape::unescape_with(&raw, named_entity)
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| raw.to_string());
        attributes.insert(key, value);
    }

    MarkupNode {
        tag,
        attributes,
        ..Default::default()
    }
}

fn append(stack: &mut [MarkupNode], node: MarkupNode) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

fn flush_text(stack: &mut [MarkupNode], pending: &mut String) {
    if pending.is_empty() {
        return;
    }

    let text = collapse_whitespace(pending);
    pending.clear();

    if let Some(parent) = stack.last_mut() {
        // A leading blank run can never sit between two siblings
        if text.trim().is_empty() && parent.children.is_empty() {
            return;
        }
        parent.children.push(MarkupNode::text(text));
    }
}

fn is_blank(node: &MarkupNode) -> bool {
    node.is_text() && node.text.trim().is_empty()
}

fn is_inline_with_text(node: Option<&MarkupNode>) -> bool {
    node.is_some_and(|n| {
        !n.is_text() && !n.text.is_empty() && TagClass::of(&n.tag) == TagClass::Inline
    })
}

/// Drop blank leaves of a closed element, except between two inline
/// elements with text, then rebuild `text` from the remaining leaves.
fn settle_text(node: &mut MarkupNode) {
    let keep: Vec<bool> = (0..node.children.len())
        .map(|i| {
            !is_blank(&node.children[i])
                || (i > 0
                    && is_inline_with_text(node.children.get(i - 1))
                    && is_inline_with_text(node.children.get(i + 1)))
        })
        .collect();

    let mut keep = keep.into_iter();
    node.children.retain(|_| keep.next().unwrap_or(true));
    node.text = node
        .children
        .iter()
        .filter(|c| c.is_text())
        .map(|c| c.text.as_str())
        .collect();
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> MarkupNode {
        parse_document("test.xhtml", content).expect("valid markup")
    }

    #[test]
    fn test_parses_nested_elements_in_order() {
        let root = parse(r#"<html><body><div><p>One</p><p>Two</p></div></body></html>"#);
        assert_eq!(root.tag, "html");

        let body = body_children(&root);
        assert_eq!(body.len(), 1);
        let div = body[0];
        assert_eq!(div.tag, "div");
        assert_eq!(div.children.len(), 2);
        assert_eq!(div.children[0].text, "One");
        assert_eq!(div.children[1].text, "Two");
    }

    #[test]
    fn test_mixed_content_keeps_text_leaves() {
        let root = parse("<p>Some <em>bold</em> text</p>");
        let tags: Vec<_> = root.children.iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, vec!["#text", "em", "#text"]);
        assert_eq!(root.text, "Some  text");
        assert_eq!(root.children[1].text, "bold");
    }

    #[test]
    fn test_whitespace_only_text_is_dropped() {
        let root = parse("<div>\n  <p>A</p>\n  <p>B</p>\n</div>");
        assert_eq!(root.children.len(), 2);
        assert!(root.text.is_empty());
    }

    #[test]
    fn test_space_between_inline_elements_is_kept() {
        let root = parse("<p><b>Hello</b> <i>world</i></p>");
        let tags: Vec<_> = root.children.iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, vec!["b", "#text", "i"]);
        assert_eq!(root.children[1].text, " ");
        assert_eq!(root.text, " ");
    }

    #[test]
    fn test_space_next_to_blocks_or_empty_inlines_is_dropped() {
        let root = parse("<div><p>A</p> <b>B</b>\n<br/> <i>C</i> </div>");
        let tags: Vec<_> = root.children.iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, vec!["p", "b", "br", "i"]);
        assert!(root.text.is_empty());
    }

    #[test]
    fn test_body_children_skip_blank_leaves() {
        let root = parse("<html><body><span>a</span> <span>b</span></body></html>");
        let tags: Vec<_> = body_children(&root).iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, vec!["span", "span"]);
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        let root = parse("<p>Hello,\n    world</p>");
        assert_eq!(root.text, "Hello, world");
    }

    #[test]
    fn test_entities_are_resolved() {
        let root = parse("<p>Don&apos;t&nbsp;stop &#8212; &#x41;&amp;B &unknown;</p>");
        assert_eq!(root.text, "Don't\u{00A0}stop \u{2014} A&B &unknown;");
    }

    #[test]
    fn test_namespaced_tags_and_attributes() {
        let root = parse(
            r#"<svg xmlns:xlink="http://www.w3.org/1999/xlink"><svg:image xlink:href="../Images/c.jpg"/></svg>"#,
        );
        let image = &root.children[0];
        assert_eq!(image.tag, "image");
        assert_eq!(image.attr("xlink:href"), Some("../Images/c.jpg"));
    }

    #[test]
    fn test_attribute_values_are_unescaped() {
        let root = parse(r#"<img src="a&amp;b.jpg" alt="&ldquo;x&rdquo;"/>"#);
        assert_eq!(root.attr("src"), Some("a&b.jpg"));
        assert_eq!(root.attr("alt"), Some("\u{201C}x\u{201D}"));
    }

    #[test]
    fn test_cdata_is_text() {
        let root = parse("<p><![CDATA[a < b]]></p>");
        assert_eq!(root.text, "a < b");
    }

    #[test]
    fn test_doctype_and_declaration_are_ignored() {
        let root = parse(
            r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml"><head><title>T</title></head><body><p>x</p></body></html>"#,
        );
        assert_eq!(root.tag, "html");
        assert_eq!(body_children(&root).len(), 1);
    }

    #[test]
    fn test_mismatched_end_tag_is_an_error() {
        let err = parse_document("ch1.xhtml", "<div><p>x</div>").unwrap_err();
        assert!(matches!(err, Error::InvalidMarkup { ref path, .. } if path == "ch1.xhtml"));
    }

    #[test]
    fn test_unclosed_element_is_an_error() {
        let err = parse_document("ch1.xhtml", "<div><p>x</p>").unwrap_err();
        assert!(matches!(err, Error::InvalidMarkup { .. }));
    }

    #[test]
    fn test_empty_document_is_an_error() {
        assert!(parse_document("empty.xhtml", "").is_err());
    }

    #[test]
    fn test_body_children_includes_direct_text() {
        let root = parse("<html><body>loose<p>para</p></body></html>");
        let children = body_children(&root);
        assert_eq!(children.len(), 2);
        assert!(children[0].is_text());
        assert_eq!(children[0].text, "loose");
    }
}
