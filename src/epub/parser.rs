//! EPUB package parsing (container.xml, OPF, NCX).

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::book::{ManifestKind, Metadata, SpineItem, TocEntry};
use crate::error::{Error, Result};
use crate::util::{local_name, resolve_entity, strip_bom};

/// Parsed OPF package data.
#[derive(Debug, Clone, Default)]
pub struct Package {
    pub metadata: Metadata,
    /// Manifest items in declaration order.
    pub manifest: Vec<ManifestItem>,
    pub spine: Vec<SpineItem>,
    pub ncx_href: Option<String>,
}

/// Manifest item as declared in the package document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestItem {
    pub id: String,
    pub href: String,
    pub media_type: String,
    pub properties: Option<String>,
}

impl Package {
    /// Whether `item` is the book's cover.
    ///
    /// A declared cover image (`cover-image` property or EPUB2
    /// `<meta name="cover">`) wins; otherwise the item with id `cover`.
    pub fn is_cover(&self, item: &ManifestItem) -> bool {
        match self.metadata.cover_image.as_deref() {
            Some(href) => href == item.href,
            None => item.id == "cover",
        }
    }

    pub fn kind_of(&self, item: &ManifestItem) -> ManifestKind {
        ManifestKind::classify(&item.id, &item.media_type, self.is_cover(item))
    }
}

/// Parse META-INF/container.xml to find the OPF path.
pub fn parse_container_xml(bytes: &[u8]) -> Result<String> {
    let content = String::from_utf8(strip_bom(bytes).to_vec())?;

    let mut reader = Reader::from_str(&content);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if local_name(e.name().as_ref()) == b"rootfile" =>
            {
                if let Some(path) = attributes(&e).remove("full-path")
                    && !path.is_empty()
                {
                    return Ok(path);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    Err(Error::InvalidEpub(
        "No rootfile found in container.xml".into(),
    ))
}

/// Metadata values collected per source, so each field can fall back from
/// one source to the next.
#[derive(Debug, Default)]
struct MetadataSources {
    /// `<dc:title>`, `<opf:creator>`, ...: keyed by local name.
    elements: HashMap<String, Vec<String>>,
    /// `<meta name=".." content="..">` and `<meta property="..">..</meta>`,
    /// keyed by the local part of the name.
    meta: HashMap<String, Vec<String>>,
}

impl MetadataSources {
    /// Values of the first source that has any for `field`.
    fn all(&self, field: &str) -> Vec<String> {
        [&self.elements, &self.meta]
            .into_iter()
            .find_map(|source| source.get(field).filter(|values| !values.is_empty()))
            .cloned()
            .unwrap_or_default()
    }

    fn first(&self, field: &str) -> Option<String> {
        self.all(field).into_iter().next()
    }

    fn into_metadata(self) -> Metadata {
        Metadata {
            title: self.first("title").unwrap_or_default(),
            authors: self.all("creator"),
            language: self.first("language").unwrap_or_default(),
            identifier: self.first("identifier").unwrap_or_default(),
            publisher: self.first("publisher"),
            description: self.first("description"),
            subjects: self.all("subject"),
            date: self.first("date"),
            cover_image: None,
        }
    }
}

enum Capture {
    Element(String),
    Meta(String),
}

/// Parse OPF package document.
pub fn parse_opf(content: &str) -> Result<Package> {
    // Untrimmed: entity references arrive as separate events, so values are
    // trimmed as a whole when their element closes
    let mut reader = Reader::from_str(content);

    let mut sources = MetadataSources::default();
    let mut manifest: Vec<ManifestItem> = Vec::new();
    let mut spine: Vec<SpineItem> = Vec::new();
    let mut toc_id: Option<String> = None;

    let mut in_metadata = false;
    let mut capture: Option<Capture> = None;
    let mut buf_text = String::new();

    loop {
        let (e, is_empty) = match reader.read_event() {
            Ok(Event::Start(e)) => (e, false),
            Ok(Event::Empty(e)) => (e, true),
            Ok(Event::Text(e)) => {
                if capture.is_some() {
                    buf_text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
                continue;
            }
            Ok(Event::GeneralRef(e)) => {
                if capture.is_some()
                    && let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref()))
                {
                    buf_text.push_str(&resolved);
                }
                continue;
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                if local_name(name.as_ref()) == b"metadata" {
                    in_metadata = false;
                }
                if let Some(captured) = capture.take() {
                    let value = buf_text.trim().to_string();
                    if !value.is_empty() {
                        let (source, key) = match captured {
                            Capture::Element(key) => (&mut sources.elements, key),
                            Capture::Meta(key) => (&mut sources.meta, key),
                        };
                        source.entry(key).or_default().push(value);
                    }
                    buf_text.clear();
                }
                continue;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => continue,
        };

        let name = e.name();
        let local = local_name(name.as_ref());

        match local {
            b"metadata" if !is_empty => in_metadata = true,
            b"item" => {
                let mut attrs = attributes(&e);
                let id = attrs.remove("id").unwrap_or_default();
                if !id.is_empty() {
                    manifest.push(ManifestItem {
                        id,
                        href: attrs.remove("href").unwrap_or_default(),
                        media_type: attrs.remove("media-type").unwrap_or_default(),
                        properties: attrs.remove("properties"),
                    });
                }
            }
            b"itemref" => {
                let mut attrs = attributes(&e);
                if let Some(idref) = attrs.remove("idref") {
                    let linear = attrs.remove("linear").is_none_or(|v| v != "no");
                    spine.push(SpineItem { idref, linear });
                }
            }
            b"spine" => toc_id = attributes(&e).remove("toc"),
            b"meta" if in_metadata => {
                let mut attrs = attributes(&e);
                if let (Some(name), Some(content)) = (attrs.remove("name"), attrs.remove("content")) {
                    let key = String::from_utf8_lossy(local_name(name.as_bytes())).into_owned();
                    sources.meta.entry(key).or_default().push(content);
                } else if let Some(property) = attrs.remove("property")
                    && !is_empty
                {
                    let key = String::from_utf8_lossy(local_name(property.as_bytes())).into_owned();
                    capture = Some(Capture::Meta(key));
                    buf_text.clear();
                }
            }
            _ if in_metadata && !is_empty => {
                capture = Some(Capture::Element(
                    String::from_utf8_lossy(local).into_owned(),
                ));
                buf_text.clear();
            }
            _ => {}
        }
    }

    let cover_ids = sources.meta.get("cover").cloned().unwrap_or_default();
    let mut metadata = sources.into_metadata();

    let epub3_cover = manifest.iter().find(|item| {
        item.properties
            .as_ref()
            .is_some_and(|props| props.split_ascii_whitespace().any(|p| p == "cover-image"))
    });
    let epub2_cover = || {
        cover_ids
            .iter()
            .find_map(|id| manifest.iter().find(|item| &item.id == id))
    };

    metadata.cover_image = epub3_cover
        .or_else(epub2_cover)
        .map(|item| item.href.clone());

    let ncx_href = toc_id.and_then(|id| {
        manifest
            .iter()
            .find(|item| item.id == id)
            .map(|item| item.href.clone())
    });

    Ok(Package {
        metadata,
        manifest,
        spine,
        ncx_href,
    })
}

/// Parse NCX table of contents.
pub fn parse_ncx(content: &str) -> Result<Vec<TocEntry>> {
    let mut reader = Reader::from_str(content);

    // Saved per open navPoint, restored when it closes
    struct NavPointState {
        children: Vec<TocEntry>,
        text: Option<String>,
        src: Option<String>,
        play_order: Option<usize>,
    }

    let mut stack: Vec<NavPointState> = vec![NavPointState {
        children: Vec::new(),
        text: None,
        src: None,
        play_order: None,
    }];
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match local_name(e.name().as_ref()) {
                b"navPoint" => {
                    let play_order = attributes(&e)
                        .remove("playOrder")
                        .and_then(|order| order.parse().ok());
                    stack.push(NavPointState {
                        children: Vec::new(),
                        text: None,
                        src: None,
                        play_order,
                    });
                }
                b"text" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if local_name(e.name().as_ref()) == b"content"
                    && let Some(src) = attributes(&e).remove("src")
                    && let Some(state) = stack.last_mut()
                {
                    state.src = Some(src);
                }
            }
            Ok(Event::Text(e)) => {
                if in_text && let Some(state) = stack.last_mut() {
                    let raw = String::from_utf8_lossy(e.as_ref());
                    state.text.get_or_insert_with(String::new).push_str(&raw);
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if in_text
                    && let Some(state) = stack.last_mut()
                    && let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref()))
                {
                    state.text.get_or_insert_with(String::new).push_str(&resolved);
                }
            }
            Ok(Event::End(e)) => match local_name(e.name().as_ref()) {
                b"text" => in_text = false,
                b"navPoint" => {
                    if stack.len() > 1
                        && let Some(state) = stack.pop()
                        && let (Some(text), Some(src)) = (state.text, state.src)
                    {
                        let mut entry = TocEntry::new(text.trim(), src);
                        entry.children = state.children;
                        entry.play_order = state.play_order;

                        if let Some(parent) = stack.last_mut() {
                            parent.children.push(entry);
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    Ok(stack
        .into_iter()
        .next()
        .map(|root| root.children)
        .unwrap_or_default())
}

/// Attributes of an element, keyed by qualified name, values unescaped.
fn attributes(e: &BytesStart<'_>) -> HashMap<String, String> {
    e.attributes()
        .flatten()
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let raw = String::from_utf8_lossy(&attr.value);
            let value = quick_xml::escape::unescape(&raw)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| raw.to_string());
            (key, value)
        })
        .collect()
}
