//! EPUB reading: package parsing and book assembly.

mod parser;
mod reader;

pub use parser::{ManifestItem, Package, parse_container_xml, parse_ncx, parse_opf};
pub use reader::{
    read_epub, read_epub_from_archive, read_epub_from_bytes, read_epub_from_reader,
    read_epub_with,
};
