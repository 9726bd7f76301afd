//! Provides a general interface to a physical OPC package (ZIP file).
//!
//! The reader decompresses every member up front into `Bytes`, so the
//! relationship-graph walk in `pkgreader` works purely in memory and can move
//! blobs into parts without copying. The writer always produces a fresh
//! archive with deflate compression.

use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PackURI};
use bytes::Bytes;
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Physical package reader holding the decompressed members of a ZIP archive.
#[derive(Debug)]
pub struct PhysPkgReader {
    /// Member name (no leading slash) to content
    members: HashMap<String, Bytes>,
}

impl PhysPkgReader {
    /// Read all members from the bytes of a ZIP archive.
    ///
    /// Directory entries are skipped. Fails if the data isn't a ZIP archive or
    /// doesn't carry a `[Content_Types].xml` member.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let mut members = HashMap::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut buf = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut buf)?;
            members.insert(name, Bytes::from(buf));
        }

        let reader = Self { members };
        if !reader.contains_member(CONTENT_TYPES_URI.trim_start_matches('/')) {
            return Err(OpcError::PartNotFound("[Content_Types].xml".to_string()));
        }
        Ok(reader)
    }

    /// Get the binary content for a part by its PackURI.
    pub fn blob_for(&self, pack_uri: &PackURI) -> Result<Bytes> {
        self.member(pack_uri.membername())
            .ok_or_else(|| OpcError::PartNotFound(pack_uri.to_string()))
    }

    /// Get a member by its ZIP name.
    ///
    /// Falls back to a case-insensitive match, since some producers write
    /// member names whose case differs from the relationship targets.
    pub fn member(&self, name: &str) -> Option<Bytes> {
        if let Some(blob) = self.members.get(name) {
            return Some(blob.clone());
        }
        self.members
            .iter()
            .find(|(member, _)| member.eq_ignore_ascii_case(name))
            .map(|(_, blob)| blob.clone())
    }

    /// Get the [Content_Types].xml content.
    pub fn content_types_xml(&self) -> Result<Bytes> {
        self.member(CONTENT_TYPES_URI.trim_start_matches('/'))
            .ok_or_else(|| OpcError::PartNotFound("[Content_Types].xml".to_string()))
    }

    /// Get the relationships XML for a source URI, `None` when the source has
    /// no relationships part.
    pub fn rels_xml_for(&self, source_uri: &PackURI) -> Result<Option<Bytes>> {
        let rels_uri = source_uri.rels_uri().map_err(OpcError::InvalidPackUri)?;
        Ok(self.member(rels_uri.membername()))
    }

    pub fn contains_member(&self, name: &str) -> bool {
        self.member(name).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Physical package writer producing an in-memory ZIP archive.
pub struct PhysPkgWriter {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl PhysPkgWriter {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
        }
    }

    /// Write a member for the part at `pack_uri`.
    pub fn write(&mut self, pack_uri: &PackURI, blob: &[u8]) -> Result<()> {
        self.write_member(pack_uri.membername(), blob)
    }

    /// Write a member by its ZIP name.
    pub fn write_member(&mut self, name: &str, blob: &[u8]) -> Result<()> {
        self.writer.start_file(name, self.options)?;
        self.writer.write_all(blob)?;
        Ok(())
    }

    /// Finish the archive and return its bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self.writer.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for PhysPkgWriter {
    fn default() -> Self {
        Self::new()
    }
}
