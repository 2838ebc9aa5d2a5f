//! In-memory ZIP packaging of masked results

use crate::{error::Result, types::masked_file_name};
use std::io::{Cursor, Write};
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

/// One file inside the batch archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Ordered accumulator for the batch archive
///
/// Entries keep insertion order. Adding a name that already exists replaces
/// the earlier bytes in place, so the archive never holds duplicate names.
#[derive(Debug, Default)]
pub struct ArchivePackager {
    entries: Vec<ArchiveEntry>,
}

impl ArchivePackager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry under an explicit name
    pub fn add_entry<S: Into<String>>(&mut self, name: S, bytes: Vec<u8>) {
        let name = name.into();
        if let Some(existing) = self.entries.iter_mut().find(|e| e.name == name) {
            log::warn!("Archive entry '{}' added twice; keeping the latest", name);
            existing.bytes = bytes;
            return;
        }
        self.entries.push(ArchiveEntry { name, bytes });
    }

    /// Add a masked PNG under `masked_<file name>.png`
    pub fn add_masked(&mut self, file_name: &str, png: Vec<u8>) {
        self.add_entry(masked_file_name(file_name), png);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry names in archive order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Write all entries into a deflate-compressed ZIP buffer
    pub fn finish(self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in &self.entries {
            writer.start_file(entry.name.as_str(), options)?;
            writer.write_all(&entry.bytes)?;
        }

        let cursor = writer.finish()?;
        log::debug!("Packaged {} archive entr(ies)", self.entries.len());
        Ok(cursor.into_inner())
    }
}
