//! In-memory EPUB fixtures.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const CONTAINER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

/// Wrap body markup in an XHTML document.
pub fn xhtml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:xlink="http://www.w3.org/1999/xlink">
<head><title>Section</title></head>
<body>
{body}
</body>
</html>"#
    )
}

/// Builds an EPUB whose package document lives at `OEBPS/content.opf`.
#[derive(Default)]
pub struct EpubBuilder {
    metadata: String,
    manifest: Vec<(String, String, String)>,
    spine: Vec<String>,
    files: Vec<(String, Vec<u8>)>,
    with_container: bool,
}

impl EpubBuilder {
    pub fn new() -> Self {
        Self {
            with_container: true,
            ..Default::default()
        }
    }

    pub fn metadata(mut self, xml: &str) -> Self {
        self.metadata = xml.to_string();
        self
    }

    /// Add a manifest item and its file (relative to `OEBPS/`).
    pub fn item(mut self, id: &str, href: &str, media_type: &str, data: impl Into<Vec<u8>>) -> Self {
        self.manifest
            .push((id.to_string(), href.to_string(), media_type.to_string()));
        self.files.push((format!("OEBPS/{href}"), data.into()));
        self
    }

    /// Add a manifest item without storing the file.
    pub fn dangling_item(mut self, id: &str, href: &str, media_type: &str) -> Self {
        self.manifest
            .push((id.to_string(), href.to_string(), media_type.to_string()));
        self
    }

    pub fn section(self, id: &str, href: &str, body: &str) -> Self {
        self.item(id, href, "application/xhtml+xml", xhtml(body))
    }

    /// Add a file that is not listed in the manifest.
    pub fn file(mut self, path: &str, data: impl Into<Vec<u8>>) -> Self {
        self.files.push((path.to_string(), data.into()));
        self
    }

    pub fn spine(mut self, idrefs: &[&str]) -> Self {
        self.spine = idrefs.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn without_container(mut self) -> Self {
        self.with_container = false;
        self
    }

    fn opf(&self) -> String {
        let items: String = self
            .manifest
            .iter()
            .map(|(id, href, media_type)| {
                format!(r#"    <item id="{id}" href="{href}" media-type="{media_type}"/>"#)
            })
            .collect::<Vec<_>>()
            .join("\n");
        let itemrefs: String = self
            .spine
            .iter()
            .map(|idref| format!(r#"    <itemref idref="{idref}"/>"#))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
{}
  </metadata>
  <manifest>
{items}
  </manifest>
  <spine toc="ncx">
{itemrefs}
  </spine>
</package>"#,
            self.metadata
        )
    }

    pub fn build(self) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut buf);
            let stored = SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);
            let deflated = SimpleFileOptions::default();

            zip.start_file("mimetype", stored).unwrap();
            zip.write_all(b"application/epub+zip").unwrap();

            if self.with_container {
                zip.start_file("META-INF/container.xml", deflated).unwrap();
                zip.write_all(CONTAINER.as_bytes()).unwrap();
            }

            zip.start_file("OEBPS/content.opf", deflated).unwrap();
            zip.write_all(self.opf().as_bytes()).unwrap();

            for (path, data) in &self.files {
                zip.start_file(path.as_str(), deflated).unwrap();
                zip.write_all(data).unwrap();
            }
            zip.finish().unwrap();
        }
        buf.into_inner()
    }
}
