//! Attach archive payloads to image items.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::percent_decode_str;

use super::item::ContentItem;
use crate::archive::{Archive, ArchiveEntry};
use crate::util::{detect_media_format, resolve_relative_path};

/// How an image reference is matched against archive paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageLookup {
    /// First entry whose path contains the reference's base name.
    ///
    /// Tolerates broken relative links, but two files with the same name in
    /// different directories resolve to whichever the archive lists first.
    #[default]
    BaseName,
    /// Resolve the reference against the section's path and require an
    /// exact entry.
    Exact,
}

/// Media type written into embedded data URIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageMediaType {
    Fixed(String),
    /// Sniff from the entry's extension, then its magic bytes.
    Detect,
}

impl Default for ImageMediaType {
    fn default() -> Self {
        ImageMediaType::Fixed(DEFAULT_IMAGE_MEDIA_TYPE.to_string())
    }
}

pub const DEFAULT_IMAGE_MEDIA_TYPE: &str = "image/jpeg";

/// Resolve one item against `archive` with the default lookup rules.
pub fn resolve(item: ContentItem, archive: &Archive) -> ContentItem {
    ImageResolver::new(archive).resolve(item)
}

/// Resolves image references of one section against the archive.
#[derive(Debug, Clone)]
pub struct ImageResolver<'a> {
    archive: &'a Archive,
    lookup: ImageLookup,
    media_type: ImageMediaType,
    section_path: Option<&'a str>,
}

impl<'a> ImageResolver<'a> {
    pub fn new(archive: &'a Archive) -> Self {
        Self {
            archive,
            lookup: ImageLookup::default(),
            media_type: ImageMediaType::default(),
            section_path: None,
        }
    }

    pub fn with_lookup(mut self, lookup: ImageLookup) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn with_media_type(mut self, media_type: ImageMediaType) -> Self {
        self.media_type = media_type;
        self
    }

    /// Archive path of the section the references appear in. Only used by
    /// [`ImageLookup::Exact`].
    pub fn relative_to(mut self, section_path: &'a str) -> Self {
        self.section_path = Some(section_path);
        self
    }

    /// Embed the payload of an image item.
    ///
    /// Text items and images that match nothing are returned unchanged.
    pub fn resolve(&self, item: ContentItem) -> ContentItem {
        let (value, data_uri) = match item {
            ContentItem::Image { value, data_uri } => (value, data_uri),
            text => return text,
        };

        match self.find(&value) {
            Some(entry) => {
                let media_type = match &self.media_type {
                    ImageMediaType::Fixed(media_type) => media_type.as_str(),
                    ImageMediaType::Detect => {
                        detect_media_format(&entry.path, &entry.data).mime_type()
                    }
                };
                ContentItem::Image {
                    data_uri: Some(data_uri_for(media_type, &entry.data)),
                    value,
                }
            }
            None => {
                log::debug!("image {value} not found in archive");
                ContentItem::Image { value, data_uri }
            }
        }
    }

    pub fn resolve_all(&self, items: Vec<ContentItem>) -> Vec<ContentItem> {
        items.into_iter().map(|item| self.resolve(item)).collect()
    }

    /// Archive entry a reference points at, if any.
    pub fn find(&self, reference: &str) -> Option<&'a ArchiveEntry> {
        match self.lookup {
            ImageLookup::BaseName => {
                let name = base_name(reference);
                self.archive.find_containing(name).or_else(|| {
                    // `my%20pic.jpg` is stored as `my pic.jpg`
                    let decoded = percent_decode_str(name).decode_utf8().ok()?;
                    if decoded == name {
                        return None;
                    }
                    self.archive.find_containing(&decoded)
                })
            }
            ImageLookup::Exact => {
                let path = match self.section_path {
                    Some(base) => resolve_relative_path(base, reference),
                    None => reference.to_string(),
                };
                self.archive.get(&path)
            }
        }
    }
}

/// Last path segment of a reference (`../Images/a.jpg` → `a.jpg`).
pub fn base_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

/// `data:<media type>;base64,<payload>`
pub fn data_uri_for(media_type: &str, data: &[u8]) -> String {
    format!("data:{media_type};base64,{}", STANDARD.encode(data))
}
