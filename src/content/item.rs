/// Discriminant of a [`ContentItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Text,
    Image,
}

/// One unit of flattened section content.
///
/// Sequences of items are produced per section in document order and are
/// not modified after the image pass.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(tag = "type", rename_all = "lowercase"))]
pub enum ContentItem {
    /// A maximal run of inline text.
    Text { value: String },
    /// An image reference, optionally with its bytes embedded.
    Image {
        /// Reference exactly as written in the markup (`src` or `xlink:href`).
        value: String,
        /// `data:` URI of the archive entry the reference resolved to.
        #[cfg_attr(
            feature = "cli",
            serde(rename = "base64", skip_serializing_if = "Option::is_none")
        )]
        data_uri: Option<String>,
    },
}

impl ContentItem {
    pub fn text(value: impl Into<String>) -> Self {
        ContentItem::Text {
            value: value.into(),
        }
    }

    /// An unresolved image reference.
    pub fn image(reference: impl Into<String>) -> Self {
        ContentItem::Image {
            value: reference.into(),
            data_uri: None,
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            ContentItem::Text { .. } => ContentKind::Text,
            ContentItem::Image { .. } => ContentKind::Image,
        }
    }

    /// Text of a run, or the reference of an image.
    pub fn value(&self) -> &str {
        match self {
            ContentItem::Text { value } | ContentItem::Image { value, .. } => value,
        }
    }

    pub fn is_image(&self) -> bool {
        self.kind() == ContentKind::Image
    }

    /// Embedded payload of a resolved image.
    pub fn data_uri(&self) -> Option<&str> {
        match self {
            ContentItem::Image { data_uri, .. } => data_uri.as_deref(),
            ContentItem::Text { .. } => None,
        }
    }
}
