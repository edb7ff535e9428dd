pub mod walkdir_source;

use crate::backup::result_error::result::Result;
use dyn_iter::DynIter;
use std::path::PathBuf;

/// A single regular file to be written into a backup archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Source file path on the filesystem
    pub src: PathBuf,

    /// Path of the entry inside the archive, relative to the archived directory
    pub dst: PathBuf,
}

impl ArchiveEntry {
    pub fn new<A: Into<PathBuf>, B: Into<PathBuf>>(src: A, dst: B) -> ArchiveEntry {
        Self {
            src: src.into(),
            dst: dst.into(),
        }
    }
}

/// Trait for generating archive entries from a backup source
///
/// The iterator yields Results so that a failure while scanning the source
/// (permission denied, vanished directory, ...) reaches the archive writer,
/// which aborts on the first one.
pub trait ArchiveEntryIterable {
    fn archive_entry_iterator<'a>(&self) -> Result<DynIter<'a, Result<ArchiveEntry>>>;
}
