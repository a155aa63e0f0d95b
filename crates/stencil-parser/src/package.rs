//! Read-only access to the parts of a `.vsdx` package.
//!
//! A package is a ZIP archive. The parts this crate cares about are:
//!
//! ```text
//! visio/document.xml          document descriptor (required)
//! visio/pages/pages.xml       page index (optional)
//! visio/pages/page<N>.xml     one part per page
//! visio/media/*               embedded image payloads
//! ```

use std::{
    fs::File,
    io::{BufReader, Read, Seek},
    path::Path,
};

use log::trace;
use zip::{ZipArchive, result::ZipError};

use crate::error::DecodeError;

/// Path of the document descriptor part.
pub const DOCUMENT_PART: &str = "visio/document.xml";

/// Path of the page index part.
pub const PAGE_INDEX_PART: &str = "visio/pages/pages.xml";

/// Prefix shared by all per-page parts.
pub const PAGE_PART_PREFIX: &str = "visio/pages/page";

/// Directory holding embedded media.
pub const MEDIA_DIR: &str = "visio/media/";

/// Returns the conventional part path of the page at 0-based `index`.
///
/// # Examples
///
/// ```
/// assert_eq!(stencil_parser::package::page_part(0), "visio/pages/page1.xml");
/// ```
pub fn page_part(index: usize) -> String {
    format!("{PAGE_PART_PREFIX}{}.xml", index + 1)
}

/// A package opened for reading.
pub struct Package<R> {
    archive: ZipArchive<R>,
}

impl Package<BufReader<File>> {
    /// Opens the package at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Open`] if the file cannot be opened and
    /// [`DecodeError::Archive`] if it is not a ZIP archive.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DecodeError::Open {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> Package<R> {
    /// Opens a package from any seekable reader.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Archive`] if the data is not a ZIP archive.
    pub fn from_reader(reader: R) -> Result<Self, DecodeError> {
        let archive = ZipArchive::new(reader)?;
        trace!(parts = archive.len(); "Opened package archive");
        Ok(Self { archive })
    }

    /// Reads a whole part.
    ///
    /// Returns `Ok(None)` when the part does not exist.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`ZipError`] if the part exists but cannot be
    /// read (corrupt or unsupported compression).
    pub fn read_part(&mut self, name: &str) -> Result<Option<Vec<u8>>, ZipError> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(err) => return Err(err),
        };

        let mut buf = Vec::with_capacity(usize::try_from(file.size()).unwrap_or_default());
        file.read_to_end(&mut buf)?;
        Ok(Some(buf))
    }

    /// Returns `true` if the package has a part called `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.archive.file_names().any(|candidate| candidate == name)
    }

    /// Iterates over the names of all parts, in archive order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.archive.file_names()
    }
}
