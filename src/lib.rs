//! # bookfold
//!
//! Reads EPUB books and flattens every section into an ordered list of text
//! runs and images.
//!
//! ## Features
//!
//! - Read EPUB 2/3 files: metadata, manifest, spine, and NCX table of contents
//! - Collapse nested markup into one text item per inline run, with block
//!   elements and images as boundaries
//! - Embed referenced images as base64 data URIs
//!
//! ## Quick Start
//!
//! ```no_run
//! use bookfold::{ContentItem, read_epub};
//!
//! let book = read_epub("input.epub").unwrap();
//! for section in &book.sections {
//!     for item in &section.content {
//!         match item {
//!             ContentItem::Text { value } => println!("{value}"),
//!             ContentItem::Image { value, .. } => println!("[image {value}]"),
//!         }
//!     }
//! }
//! ```
//!
//! ## Flattening markup directly
//!
//! ```
//! use bookfold::content::flatten;
//! use bookfold::markup::parse_document;
//! use bookfold::ContentItem;
//!
//! let root = parse_document("p.xhtml", "<p>Hel<b>lo</b><img src='a.jpg'/>world</p>").unwrap();
//! assert_eq!(
//!     flatten(&root),
//!     vec![
//!         ContentItem::text("Hello"),
//!         ContentItem::image("a.jpg"),
//!         ContentItem::text("world"),
//!     ]
//! );
//! ```

pub mod archive;
pub mod book;
pub mod content;
pub mod epub;
pub mod error;
pub mod markup;
pub mod options;
pub(crate) mod util;

pub use archive::{Archive, ArchiveEntry};
pub use book::{Book, ManifestEntry, ManifestKind, Metadata, SpineItem, TocEntry};
pub use content::{ContentItem, ContentKind};
pub use epub::{
    read_epub, read_epub_from_archive, read_epub_from_bytes, read_epub_from_reader,
    read_epub_with,
};
pub use error::{Error, Result};
pub use options::{Options, SectionErrors, SectionOrder};
