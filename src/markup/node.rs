use std::collections::HashMap;

/// Tag name given to character-data leaves.
pub const TEXT_TAG: &str = "#text";

/// One node of a parsed section document.
///
/// Elements keep their direct character data in `text` (concatenated, like
/// an XML-to-object mapper's text key) and also as [`TEXT_TAG`] leaves among
/// `children`, so consumers can walk mixed content in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupNode {
    /// Local tag name, without namespace prefix.
    pub tag: String,
    pub text: String,
    pub children: Vec<MarkupNode>,
    /// Attributes keyed by qualified name (`src`, `xlink:href`, ...).
    pub attributes: HashMap<String, String>,
}

impl MarkupNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// A character-data leaf.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            tag: TEXT_TAG.to_string(),
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_child(mut self, child: MarkupNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = MarkupNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn is_text(&self) -> bool {
        self.tag == TEXT_TAG
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Attribute by exact qualified name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Attribute by local name, ignoring any namespace prefix.
    ///
    /// An unprefixed attribute wins over prefixed ones; among prefixed
    /// matches the lexicographically smallest name is chosen so the result
    /// does not depend on map iteration order.
    pub fn attr_local(&self, local: &str) -> Option<&str> {
        if let Some(value) = self.attr(local) {
            return Some(value);
        }

        self.attributes
            .iter()
            .filter(|(name, _)| {
                name.rsplit_once(':')
                    .is_some_and(|(_, name_local)| name_local == local)
            })
            .min_by(|a, b| a.0.cmp(b.0))
            .map(|(_, value)| value.as_str())
    }

    /// First descendant element (depth-first, self included) with this tag.
    pub fn find(&self, tag: &str) -> Option<&MarkupNode> {
        if self.tag.eq_ignore_ascii_case(tag) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(tag))
    }
}
