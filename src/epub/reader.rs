use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use super::parser::{Package, parse_container_xml, parse_ncx, parse_opf};
use crate::archive::{Archive, ArchiveEntry};
use crate::book::{Book, ManifestEntry, ManifestKind, SpineItem, TocEntry};
use crate::content::{ContentItem, ImageResolver, data_uri_for, flatten_section};
use crate::error::{Error, Result};
use crate::markup::parse_document;
use crate::options::{Options, SectionErrors, SectionOrder};
use crate::util::{decode_document, join_path};

const CONTAINER_PATH: &str = "META-INF/container.xml";
const XHTML_MEDIA_TYPE: &str = "application/xhtml+xml";

/// Read an EPUB file from disk into a [`Book`] with default [`Options`].
///
/// # Example
///
/// ```no_run
/// use bookfold::read_epub;
///
/// let book = read_epub("path/to/book.epub")?;
/// println!("Title: {}", book.metadata.title);
/// for item in book.content() {
///     println!("{:?}: {}", item.kind(), item.value());
/// }
/// # Ok::<(), bookfold::Error>(())
/// ```
pub fn read_epub<P: AsRef<Path>>(path: P) -> Result<Book> {
    read_epub_with(path, &Options::default())
}

/// Read an EPUB file from disk into a [`Book`].
pub fn read_epub_with<P: AsRef<Path>>(path: P, options: &Options) -> Result<Book> {
    let archive = Archive::open(path)?;
    read_epub_from_archive(&archive, options)
}

/// Read an EPUB from any [`Read`] + [`Seek`] source.
///
/// ```no_run
/// use std::io::Cursor;
/// use bookfold::{Options, epub::read_epub_from_reader};
///
/// let epub_data: Vec<u8> = std::fs::read("book.epub")?;
/// let book = read_epub_from_reader(Cursor::new(epub_data), &Options::default())?;
/// # Ok::<(), bookfold::Error>(())
/// ```
pub fn read_epub_from_reader<R: Read + Seek>(reader: R, options: &Options) -> Result<Book> {
    let archive = Archive::from_reader(reader)?;
    read_epub_from_archive(&archive, options)
}

/// Read an EPUB held in memory.
pub fn read_epub_from_bytes(bytes: &[u8], options: &Options) -> Result<Book> {
    read_epub_from_reader(Cursor::new(bytes), options)
}

/// Assemble a [`Book`] from an already-extracted archive.
///
/// Fails only when the container or package document is missing or
/// unparsable, or when a section fails to parse under
/// [`SectionErrors::Abort`]. Missing sections and images degrade in place.
pub fn read_epub_from_archive(archive: &Archive, options: &Options) -> Result<Book> {
    let container = archive.require(CONTAINER_PATH)?;
    let opf_path = parse_container_xml(&container.data)?;
    let opf_dir = opf_path
        .rsplit_once('/')
        .map(|(dir, _)| dir)
        .unwrap_or_default();

    let opf = archive.require(&opf_path)?;
    let package = parse_opf(&decode_document(&opf.data))?;
    log::debug!(
        "{opf_path}: {} manifest items, {} spine items",
        package.manifest.len(),
        package.spine.len()
    );

    let mut book = Book::new();

    for item in &package.manifest {
        let mut entry = ManifestEntry::new(&item.id, &item.href, &item.media_type);
        entry.path = join_path(opf_dir, &item.href);

        match package.kind_of(item) {
            ManifestKind::Cover => {
                load_standalone(&mut entry, archive, options)?;
                book.cover = Some(entry);
            }
            ManifestKind::TitlePage => {
                load_standalone(&mut entry, archive, options)?;
                book.titlepage = Some(entry);
            }
            ManifestKind::Section => {
                load_section(&mut entry, archive, options)?;
                book.sections.push(entry);
            }
            ManifestKind::Image => book.images.push(entry),
            ManifestKind::Style => book.styles.push(entry),
            ManifestKind::Other => book.other.push(entry),
        }
    }

    order_sections(&mut book.sections, &package.spine, options.section_order);
    book.toc = read_toc(archive, &package, opf_dir);

    let Package {
        metadata, spine, ..
    } = package;
    book.metadata = metadata;
    book.spine = spine;

    Ok(book)
}

/// Archive entry for a manifest item: the exact path, then the first entry
/// whose path contains the href.
fn locate<'a>(archive: &'a Archive, entry: &ManifestEntry) -> Option<&'a ArchiveEntry> {
    archive
        .get(&entry.path)
        .or_else(|| archive.find_containing(&entry.href))
}

/// Cover and title page: a document is flattened, an image becomes a single
/// image item embedded with its own media type.
fn load_standalone(entry: &mut ManifestEntry, archive: &Archive, options: &Options) -> Result<()> {
    if entry.media_type == XHTML_MEDIA_TYPE {
        return load_section(entry, archive, options);
    }
    if !entry.media_type.starts_with("image/") {
        return Ok(());
    }

    let mut item = ContentItem::image(entry.href.as_str());
    match locate(archive, entry) {
        Some(file) if options.embed_images => {
            if let ContentItem::Image { data_uri, .. } = &mut item {
                *data_uri = Some(data_uri_for(&entry.media_type, &file.data));
            }
        }
        Some(_) => {}
        None => {
            log::warn!("{} not found in archive", entry.path);
            entry.error = Some(Error::MissingEntry(entry.path.clone()).to_string());
        }
    }
    entry.content = vec![item];
    Ok(())
}

fn load_section(entry: &mut ManifestEntry, archive: &Archive, options: &Options) -> Result<()> {
    let Some(file) = locate(archive, entry) else {
        log::warn!("section {} not found in archive", entry.path);
        entry.error = Some(Error::MissingEntry(entry.path.clone()).to_string());
        return Ok(());
    };

    let text = decode_document(&file.data);
    let root = match parse_document(&file.path, &text) {
        Ok(root) => root,
        Err(err) => match options.section_errors {
            SectionErrors::Abort => return Err(err),
            SectionErrors::Skip => {
                log::warn!("skipping section {}: {err}", file.path);
                entry.error = Some(err.to_string());
                return Ok(());
            }
        },
    };

    let items = flatten_section(&root);
    entry.content = if options.embed_images {
        ImageResolver::new(archive)
            .with_lookup(options.image_lookup)
            .with_media_type(options.image_media_type.clone())
            .relative_to(&file.path)
            .resolve_all(items)
    } else {
        items
    };

    log::debug!("{}: {} content items", file.path, entry.content.len());
    Ok(())
}

fn order_sections(sections: &mut [ManifestEntry], spine: &[SpineItem], order: SectionOrder) {
    match order {
        SectionOrder::Manifest => {}
        SectionOrder::Href => sections.sort_by(|a, b| a.href.cmp(&b.href)),
        SectionOrder::Spine => {
            let position: HashMap<&str, usize> = spine
                .iter()
                .enumerate()
                .map(|(i, item)| (item.idref.as_str(), i))
                .collect();
            // Stable, so sections outside the spine keep manifest order at the end
            sections.sort_by_key(|section| {
                position
                    .get(section.id.as_str())
                    .copied()
                    .unwrap_or(usize::MAX)
            });
        }
    }
}

/// The NCX table of contents, or nothing if the package has none or it
/// cannot be read.
fn read_toc(archive: &Archive, package: &Package, opf_dir: &str) -> Vec<TocEntry> {
    let Some(href) = &package.ncx_href else {
        return Vec::new();
    };

    let path = join_path(opf_dir, href);
    let Some(file) = archive.get(&path) else {
        log::warn!("table of contents {path} not found in archive");
        return Vec::new();
    };

    match parse_ncx(&decode_document(&file.data)) {
        Ok(toc) => toc,
        Err(err) => {
            log::warn!("ignoring table of contents {path}: {err}");
            Vec::new()
        }
    }
}
