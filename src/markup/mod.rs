//! Markup tree model and the XHTML tree builder that produces it.

mod node;
mod parser;

pub use node::{MarkupNode, TEXT_TAG};
pub use parser::{body_children, parse_document};
