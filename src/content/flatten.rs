//! Markup tree → flat content sequence.
//!
//! Each tag class has its own reduction over the recursively flattened
//! children. Items carry the tag that produced them while flattening is in
//! progress; containers use it to tell block items (kept as siblings) from
//! inline text (merged into the current run).

use super::item::ContentItem;
use super::tag::{IMAGE_TAG, TagClass};
use crate::markup::MarkupNode;

/// Flatten one node's subtree into reading-order content items.
///
/// Pure and total: the same tree always yields the same sequence, and no
/// input makes it fail. Text items are never empty and image items always
/// carry a non-empty reference.
pub fn flatten(node: &MarkupNode) -> Vec<ContentItem> {
    flatten_node(node).into_iter().map(|f| f.item).collect()
}

/// Flatten several sibling nodes and concatenate the results.
pub fn flatten_all<'a, I>(nodes: I) -> Vec<ContentItem>
where
    I: IntoIterator<Item = &'a MarkupNode>,
{
    nodes.into_iter().flat_map(flatten).collect()
}

/// An item plus the tag that produced or last merged into it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fragment<'a> {
    item: ContentItem,
    origin: &'a str,
}

impl<'a> Fragment<'a> {
    fn text(value: String, origin: &'a str) -> Self {
        Self {
            item: ContentItem::Text { value },
            origin,
        }
    }

    fn is_boundary(&self) -> bool {
        self.item.is_image() || TagClass::of(self.origin).is_boundary()
    }
}

/// Inline text accumulator.
#[derive(Debug, Default)]
enum Run {
    #[default]
    Idle,
    Accumulating(String),
}

impl Run {
    fn push(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self {
            Run::Idle => *self = Run::Accumulating(text.to_string()),
            Run::Accumulating(buf) => buf.push_str(text),
        }
    }

    /// Emit the accumulated run, if any, and go back to idle.
    fn flush<'a>(&mut self, origin: &'a str) -> Option<Fragment<'a>> {
        match std::mem::take(self) {
            Run::Idle => None,
            Run::Accumulating(buf) => Some(Fragment::text(buf, origin)),
        }
    }
}

fn flatten_node(node: &MarkupNode) -> Vec<Fragment<'_>> {
    match TagClass::of(&node.tag) {
        TagClass::Container => flatten_container(node),
        TagClass::Paragraph => flatten_paragraph(node),
        TagClass::Graphic => node
            .children
            .iter()
            .flat_map(|child| flatten_node(child))
            .collect(),
        TagClass::Image => image(node).into_iter().collect(),
        TagClass::Inline => own_text(node).into_iter().collect(),
    }
}

fn flatten_container(node: &MarkupNode) -> Vec<Fragment<'_>> {
    if !node.has_children() {
        return own_text(node).into_iter().collect();
    }

    let mut out = Vec::new();
    let mut run = Run::Idle;

    for fragment in node.children.iter().flat_map(|child| flatten_node(child)) {
        if fragment.is_boundary() {
            out.extend(run.flush(&node.tag));
            out.push(fragment);
        } else {
            run.push(fragment.item.value());
        }
    }

    out.extend(run.flush(&node.tag));
    out
}

// Images split the run so the text on either side keeps its position.
fn flatten_paragraph(node: &MarkupNode) -> Vec<Fragment<'_>> {
    if !node.has_children() {
        return own_text(node).into_iter().collect();
    }

    let mut out = Vec::new();
    let mut run = Run::Idle;

    for fragment in node.children.iter().flat_map(|child| flatten_node(child)) {
        if fragment.item.is_image() {
            out.extend(run.flush(&node.tag));
            out.push(fragment);
        } else {
            run.push(fragment.item.value());
        }
    }

    out.extend(run.flush(&node.tag));
    out
}

fn image(node: &MarkupNode) -> Option<Fragment<'_>> {
    let reference = node
        .attr("src")
        .filter(|src| !src.is_empty())
        .or_else(|| node.attr_local("href"))
        .filter(|href| !href.is_empty())?;

    Some(Fragment {
        item: ContentItem::image(reference),
        origin: IMAGE_TAG,
    })
}

fn own_text(node: &MarkupNode) -> Option<Fragment<'_>> {
    if node.text.is_empty() {
        return None;
    }
    Some(Fragment::text(node.text.clone(), &node.tag))
}
