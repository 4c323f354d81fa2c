//! Assembled book model.

use crate::content::ContentItem;

#[cfg(feature = "cli")]
use serde::Serialize;

/// A book read from an archive, with every section flattened.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "cli", derive(Serialize))]
pub struct Book {
    pub metadata: Metadata,
    pub cover: Option<ManifestEntry>,
    pub titlepage: Option<ManifestEntry>,
    /// Renderable documents, in the configured section order.
    pub sections: Vec<ManifestEntry>,
    pub images: Vec<ManifestEntry>,
    pub styles: Vec<ManifestEntry>,
    pub other: Vec<ManifestEntry>,
    pub spine: Vec<SpineItem>,
    pub toc: Vec<TocEntry>,
}

/// Book metadata (Dublin Core)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(Serialize))]
pub struct Metadata {
    pub title: String,
    pub authors: Vec<String>,
    pub language: String,
    pub identifier: String,
    pub publisher: Option<String>,
    pub description: Option<String>,
    pub subjects: Vec<String>,
    pub date: Option<String>,
    /// Manifest href of the cover image, when the package declares one.
    pub cover_image: Option<String>,
}

/// Kind of a manifest entry, decided by id and media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    Cover,
    TitlePage,
    Section,
    Image,
    Style,
    Other,
}

impl ManifestKind {
    /// Classify a manifest item. `is_cover` is set for the book's cover item.
    pub fn classify(id: &str, media_type: &str, is_cover: bool) -> Self {
        if is_cover {
            ManifestKind::Cover
        } else if id == "titlepage" {
            ManifestKind::TitlePage
        } else if media_type == "application/xhtml+xml" {
            ManifestKind::Section
        } else if media_type.starts_with("image/") {
            ManifestKind::Image
        } else if media_type == "text/css" {
            ManifestKind::Style
        } else {
            ManifestKind::Other
        }
    }
}

/// One manifest item and, for documents, its flattened content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(Serialize))]
pub struct ManifestEntry {
    pub id: String,
    pub href: String,
    pub media_type: String,
    /// Full path inside the archive.
    pub path: String,
    pub content: Vec<ContentItem>,
    /// Why `content` is empty, when the document could not be read.
    #[cfg_attr(feature = "cli", serde(skip_serializing_if = "Option::is_none"))]
    pub error: Option<String>,
}

/// An item in the reading order (spine)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(Serialize))]
pub struct SpineItem {
    pub idref: String,
    pub linear: bool,
}

/// A table of contents entry (hierarchical)
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "cli", derive(Serialize))]
pub struct TocEntry {
    pub title: String,
    pub href: String,
    pub children: Vec<TocEntry>,
    /// Play order for sorting (from NCX playOrder attribute)
    pub play_order: Option<usize>,
}

impl Book {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find a manifest entry of any kind by id.
    pub fn entry(&self, id: &str) -> Option<&ManifestEntry> {
        self.cover
            .iter()
            .chain(self.titlepage.iter())
            .chain(&self.sections)
            .chain(&self.images)
            .chain(&self.styles)
            .chain(&self.other)
            .find(|entry| entry.id == id)
    }

    /// All section content, section after section.
    pub fn content(&self) -> impl Iterator<Item = &ContentItem> {
        self.sections.iter().flat_map(|section| section.content.iter())
    }
}

impl Metadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// First listed creator.
    pub fn author(&self) -> Option<&str> {
        self.authors.first().map(String::as_str)
    }
}

impl ManifestEntry {
    pub fn new(
        id: impl Into<String>,
        href: impl Into<String>,
        media_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            media_type: media_type.into(),
            ..Default::default()
        }
    }
}

impl TocEntry {
    pub fn new(title: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            href: href.into(),
            children: Vec::new(),
            play_order: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_manifest_items() {
        use ManifestKind::*;

        assert_eq!(ManifestKind::classify("img1", "image/png", true), Cover);
        assert_eq!(ManifestKind::classify("cover", "image/jpeg", false), Image);
        assert_eq!(
            ManifestKind::classify("titlepage", "application/xhtml+xml", false),
            TitlePage
        );
        assert_eq!(
            ManifestKind::classify("ch1", "application/xhtml+xml", false),
            Section
        );
        assert_eq!(ManifestKind::classify("i", "image/png", false), Image);
        assert_eq!(ManifestKind::classify("css", "text/css", false), Style);
        assert_eq!(
            ManifestKind::classify("ncx", "application/x-dtbncx+xml", false),
            Other
        );
    }

    #[test]
    fn test_book_entry_lookup_and_content() {
        let mut book = Book::new();
        let mut ch1 = ManifestEntry::new("ch1", "ch1.xhtml", "application/xhtml+xml");
        ch1.content = vec![ContentItem::text("one")];
        let mut ch2 = ManifestEntry::new("ch2", "ch2.xhtml", "application/xhtml+xml");
        ch2.content = vec![ContentItem::image("a.jpg"), ContentItem::text("two")];
        book.sections = vec![ch1, ch2];
        book.styles = vec![ManifestEntry::new("css", "style.css", "text/css")];

        assert_eq!(book.entry("css").map(|e| e.href.as_str()), Some("style.css"));
        assert!(book.entry("missing").is_none());

        let values: Vec<_> = book.content().map(ContentItem::value).collect();
        assert_eq!(values, vec!["one", "a.jpg", "two"]);
    }

    #[test]
    fn test_metadata_author_is_first_creator() {
        let metadata = Metadata::new("T").with_author("A").with_author("B");
        assert_eq!(metadata.author(), Some("A"));
        assert_eq!(Metadata::default().author(), None);
    }
}
