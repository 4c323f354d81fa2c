//! Tag vocabulary recognised by the flattener.

const CONTAINER_TAGS: &[&str] = &["div", "section", "nav", "ol", "ul"];
const PARAGRAPH_TAGS: &[&str] = &["p", "a", "li", "h1", "h2", "h3", "h4", "h5", "h6"];
const GRAPHIC_TAGS: &[&str] = &["svg"];
const IMAGE_TAGS: &[&str] = &["img", "image"];

/// Tag recorded on every image item, whichever image-like tag produced it.
pub const IMAGE_TAG: &str = "img";

/// Flattening policy for a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagClass {
    /// Grouping block: children become sibling items, inline runs collapse
    /// around them.
    Container,
    /// Leaf-like content carrier: everything except images merges into one run.
    Paragraph,
    /// Vector-graphic wrapper, transparent to flattening.
    Graphic,
    /// Terminal image reference.
    Image,
    /// Anything else: emits its own literal text, if any.
    Inline,
}

impl TagClass {
    /// Classify a tag name. Matching is ASCII case-insensitive.
    pub fn of(tag: &str) -> Self {
        let is = |set: &[&str]| set.iter().any(|t| t.eq_ignore_ascii_case(tag));

        if is(CONTAINER_TAGS) {
            TagClass::Container
        } else if is(PARAGRAPH_TAGS) {
            TagClass::Paragraph
        } else if is(GRAPHIC_TAGS) {
            TagClass::Graphic
        } else if is(IMAGE_TAGS) {
            TagClass::Image
        } else {
            TagClass::Inline
        }
    }

    /// Whether items of this origin terminate a container's inline run.
    pub fn is_boundary(self) -> bool {
        matches!(
            self,
            TagClass::Container | TagClass::Paragraph | TagClass::Image
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_vocabulary() {
        for tag in ["div", "section", "nav", "ol", "ul"] {
            assert_eq!(TagClass::of(tag), TagClass::Container, "{tag}");
        }
        for tag in ["p", "a", "li", "h1", "h2", "h3", "h4", "h5", "h6"] {
            assert_eq!(TagClass::of(tag), TagClass::Paragraph, "{tag}");
        }
        assert_eq!(TagClass::of("svg"), TagClass::Graphic);
        assert_eq!(TagClass::of("img"), TagClass::Image);
        assert_eq!(TagClass::of("image"), TagClass::Image);
    }

    #[test]
    fn test_unknown_tags_are_inline() {
        for tag in ["span", "em", "br", "table", "h7", "#text", ""] {
            assert_eq!(TagClass::of(tag), TagClass::Inline, "{tag}");
        }
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(TagClass::of("DIV"), TagClass::Container);
        assert_eq!(TagClass::of("H2"), TagClass::Paragraph);
        assert_eq!(TagClass::of("IMG"), TagClass::Image);
    }

    #[test]
    fn test_boundaries() {
        assert!(TagClass::Container.is_boundary());
        assert!(TagClass::Paragraph.is_boundary());
        assert!(TagClass::Image.is_boundary());
        assert!(!TagClass::Graphic.is_boundary());
        assert!(!TagClass::Inline.is_boundary());
    }
}
