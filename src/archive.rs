//! In-memory view of a book archive.
//!
//! The whole ZIP is decompressed once up front. Everything downstream works
//! on `(path, bytes)` pairs in the archive's own enumeration order.

use std::io::{Read, Seek};
use std::path::Path;

use zip::ZipArchive;

use crate::error::{Error, Result};

/// One file inside the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: String,
    pub data: Vec<u8>,
}

/// All entries of a book archive, in enumeration order.
#[derive(Debug, Clone, Default)]
pub struct Archive {
    entries: Vec<ArchiveEntry>,
}

impl Archive {
    /// Read every file entry of a ZIP archive on disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Read every file entry from any [`Read`] + [`Seek`] source.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut zip = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(zip.len());

        for i in 0..zip.len() {
            let mut file = zip.by_index(i)?;
            if file.is_dir() {
                continue;
            }

            // Declared sizes are untrusted
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            entries.push(ArchiveEntry {
                path: file.name().to_string(),
                data,
            });
        }

        log::debug!("read {} archive entries", entries.len());
        Ok(Self { entries })
    }

    /// Build an archive from already-extracted entries.
    pub fn from_entries<I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, Vec<u8>)>,
        P: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(path, data)| ArchiveEntry {
                    path: path.into(),
                    data,
                })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by its exact path.
    ///
    /// Falls back to the percent-decoded path, since some packagers write
    /// escaped hrefs into the manifest but store the raw name in the ZIP.
    pub fn get(&self, path: &str) -> Option<&ArchiveEntry> {
        if let Some(entry) = self.entries.iter().find(|e| e.path == path) {
            return Some(entry);
        }

        let decoded = percent_encoding::percent_decode_str(path)
            .decode_utf8()
            .ok()?;
        if decoded == path {
            return None;
        }
        self.entries.iter().find(|e| e.path == decoded)
    }

    /// Like [`Archive::get`], but a missing entry is an error.
    pub fn require(&self, path: &str) -> Result<&ArchiveEntry> {
        self.get(path)
            .ok_or_else(|| Error::MissingEntry(path.to_string()))
    }

    /// First entry (in enumeration order) whose path contains `needle`.
    pub fn find_containing(&self, needle: &str) -> Option<&ArchiveEntry> {
        if needle.is_empty() {
            return None;
        }
        self.entries.iter().find(|e| e.path.contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    use super::*;

    fn sample() -> Archive {
        Archive::from_entries([
            ("OEBPS/Images/cover.jpg", b"cover".to_vec()),
            ("OEBPS/Text/chapter%201.xhtml", b"escaped".to_vec()),
            ("OEBPS/Text/chapter 2.xhtml", b"raw".to_vec()),
            ("Extras/Images/cover.jpg", b"other".to_vec()),
        ])
    }

    #[test]
    fn test_get_exact_path() {
        let archive = sample();
        assert_eq!(archive.get("OEBPS/Images/cover.jpg").unwrap().data, b"cover");
        assert!(archive.get("Images/cover.jpg").is_none());
    }

    #[test]
    fn test_get_prefers_literal_over_decoded() {
        let archive = sample();
        assert_eq!(
            archive.get("OEBPS/Text/chapter%201.xhtml").unwrap().data,
            b"escaped"
        );
        assert_eq!(
            archive.get("OEBPS/Text/chapter%202.xhtml").unwrap().data,
            b"raw"
        );
    }

    #[test]
    fn test_require_reports_missing_path() {
        let archive = sample();
        let err = archive.require("META-INF/container.xml").unwrap_err();
        assert!(matches!(err, Error::MissingEntry(p) if p == "META-INF/container.xml"));
    }

    #[test]
    fn test_find_containing_uses_enumeration_order() {
        let archive = sample();
        let found = archive.find_containing("cover.jpg").unwrap();
        assert_eq!(found.path, "OEBPS/Images/cover.jpg");
        assert!(archive.find_containing("").is_none());
        assert!(archive.find_containing("missing.png").is_none());
    }

    #[test]
    fn test_from_reader_ignores_declared_size() {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut buf);
            let stored = SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);
            zip.start_file("a.txt", stored).unwrap();
            zip.write_all(b"alpha").unwrap();
            zip.finish().unwrap();
        }
        let mut bytes = buf.into_inner();

        // Claim ~4 GiB uncompressed in both the local and central headers
        let huge = 0xFFFF_FFF0u32.to_le_bytes();
        bytes[22..26].copy_from_slice(&huge);
        let central = bytes
            .windows(4)
            .position(|w| w == [0x50, 0x4B, 0x01, 0x02])
            .unwrap();
        bytes[central + 24..central + 28].copy_from_slice(&huge);

        match Archive::from_reader(Cursor::new(bytes)) {
            Ok(archive) => assert_eq!(archive.entries()[0].data, b"alpha"),
            Err(err) => assert!(matches!(err, Error::Zip(_) | Error::Io(_))),
        }
    }

    #[test]
    fn test_from_reader_skips_directories() {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut buf);
            let options = SimpleFileOptions::default();
            zip.add_directory("OEBPS/", options).unwrap();
            zip.start_file("OEBPS/a.txt", options).unwrap();
            zip.write_all(b"alpha").unwrap();
            zip.start_file("mimetype", options).unwrap();
            zip.write_all(b"application/epub+zip").unwrap();
            zip.finish().unwrap();
        }
        buf.set_position(0);

        let archive = Archive::from_reader(buf).unwrap();
        let paths: Vec<_> = archive.entries().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["OEBPS/a.txt", "mimetype"]);
        assert_eq!(archive.len(), 2);
    }
}
