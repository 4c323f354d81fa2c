//! Reading options.

use crate::content::{ImageLookup, ImageMediaType};

/// Order in which sections appear in the assembled [`Book`](crate::Book).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionOrder {
    /// Order of declaration in the package manifest.
    #[default]
    Manifest,
    /// Spine (reading) order; sections missing from the spine follow in
    /// manifest order.
    Spine,
    /// Lexicographic by href.
    Href,
}

/// What to do when a section document fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionErrors {
    /// Fail the whole book.
    #[default]
    Abort,
    /// Log it, leave the section empty and record the error on it.
    Skip,
}

/// Options for [`read_epub_with`](crate::read_epub_with).
///
/// ```
/// use bookfold::{Options, SectionErrors, SectionOrder};
///
/// let options = Options::new()
///     .with_section_order(SectionOrder::Spine)
///     .with_section_errors(SectionErrors::Skip);
/// assert!(options.embed_images);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub section_order: SectionOrder,
    pub section_errors: SectionErrors,
    pub image_lookup: ImageLookup,
    pub image_media_type: ImageMediaType,
    /// When false, image items keep only their reference.
    pub embed_images: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            section_order: SectionOrder::default(),
            section_errors: SectionErrors::default(),
            image_lookup: ImageLookup::default(),
            image_media_type: ImageMediaType::default(),
            embed_images: true,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_section_order(mut self, order: SectionOrder) -> Self {
        self.section_order = order;
        self
    }

    pub fn with_section_errors(mut self, policy: SectionErrors) -> Self {
        self.section_errors = policy;
        self
    }

    pub fn with_image_lookup(mut self, lookup: ImageLookup) -> Self {
        self.image_lookup = lookup;
        self
    }

    pub fn with_image_media_type(mut self, media_type: ImageMediaType) -> Self {
        self.image_media_type = media_type;
        self
    }

    pub fn with_embed_images(mut self, embed: bool) -> Self {
        self.embed_images = embed;
        self
    }
}
