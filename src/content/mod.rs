//! Section content: flattening markup trees and resolving their images.
//!
//! ```
//! use bookfold::content::{ContentItem, flatten};
//! use bookfold::markup::MarkupNode;
//!
//! let div = MarkupNode::new("div")
//!     .with_child(MarkupNode::new("p").with_text("Hello"))
//!     .with_child(MarkupNode::new("p").with_text("World"));
//!
//! assert_eq!(
//!     flatten(&div),
//!     vec![ContentItem::text("Hello"), ContentItem::text("World")]
//! );
//! ```

mod flatten;
mod item;
mod resolve;
mod tag;

pub use flatten::{flatten, flatten_all};
pub use item::{ContentItem, ContentKind};
pub use resolve::{
    DEFAULT_IMAGE_MEDIA_TYPE, ImageLookup, ImageMediaType, ImageResolver, base_name,
    data_uri_for, resolve,
};
pub use tag::{IMAGE_TAG, TagClass};

use crate::markup::{MarkupNode, body_children};

/// Flatten a whole section document: every top-level `body` child in turn.
pub fn flatten_section(root: &MarkupNode) -> Vec<ContentItem> {
    flatten_all(body_children(root))
}
