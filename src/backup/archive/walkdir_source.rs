use crate::backup::archive::{ArchiveEntry, ArchiveEntryIterable};
use crate::backup::function_path;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::{AddFunctionName, AddMsg};

use bon::Builder;
use dyn_iter::{DynIter, IntoDynIterator};
use function_name::named;
use walkdir::{DirEntry, WalkDir};

use std::path::{Path, PathBuf};

/// Recursively walks a source directory and yields every regular file whose
/// own name does not start with `.`.
///
/// Only the final path component is checked, so files inside a hidden
/// directory are still included. Directories and symlinks are never entries.
#[derive(Clone, Debug, Builder, PartialEq, Eq)]
pub struct WalkdirSource {
    #[builder(into)]
    src_dir: PathBuf,
}

impl ArchiveEntryIterable for WalkdirSource {
    #[named]
    fn archive_entry_iterator<'a>(&self) -> Result<DynIter<'a, Result<ArchiveEntry>>> {
        if !self.src_dir.is_dir() {
            tracing::error!(
                "Source directory does not exist or is not a directory: {:?}",
                self.src_dir
            );
            return Err(Error::from(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{:?} is not a directory", self.src_dir),
            ))
            .add_fn_name(function_path!()));
        }

        tracing::debug!("Scanning directory {:?}", self.src_dir);
        let src_dir = self.src_dir.clone();

        let entries = WalkDir::new(&self.src_dir)
            .into_iter()
            .filter_map(move |res| match res {
                Ok(de) => process_dir_entry(de, &src_dir),
                Err(e) => Some(Err(e.into())),
            })
            .map(move |res| res.add_fn_name(function_path!()));

        Ok(entries.into_dyn_iter())
    }
}

fn is_hidden(de: &DirEntry) -> bool {
    de.file_name().as_encoded_bytes().starts_with(b".")
}

fn process_dir_entry<P: AsRef<Path>>(de: DirEntry, base_src_dir: P) -> Option<Result<ArchiveEntry>> {
    if de.file_type().is_dir() {
        return None;
    }
    if is_hidden(&de) {
        tracing::trace!("Skipping hidden {:?}", de.path());
        return None;
    }
    if !de.file_type().is_file() {
        tracing::debug!("Skipping {:?}, not a regular file", de.path());
        return None;
    }

    let p = de.into_path();
    let res = match p.strip_prefix(base_src_dir.as_ref()) {
        Ok(stripped_path) => Ok(stripped_path.to_path_buf()),
        Err(e) => Err(Error::from(e).add_msg(format!(
            "Stripping {:?} from {:?} failed",
            base_src_dir.as_ref(),
            p
        ))),
    };

    Some(res.map(|dst| {
        let entry = ArchiveEntry::new(p, dst);
        tracing::trace!("Including file: {:?} -> {:?}", entry.src, entry.dst);
        entry
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use std::path::Path;
    use tempfile::TempDir;

    fn create_test_files(dir: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(dir.join("subdir/deeper"))?;
        std::fs::create_dir_all(dir.join(".hidden_dir"))?;
        std::fs::write(dir.join("file1.txt"), "content1")?;
        std::fs::write(dir.join(".env"), "SECRET=1")?;
        std::fs::write(dir.join("subdir/file2.json"), "content2")?;
        std::fs::write(dir.join("subdir/.gitkeep"), "")?;
        std::fs::write(dir.join("subdir/deeper/file3.log"), "content3")?;
        std::fs::write(dir.join(".hidden_dir/visible.txt"), "content4")?;
        Ok(())
    }

    fn collect_dsts(source: &WalkdirSource) -> Vec<PathBuf> {
        source
            .archive_entry_iterator()
            .unwrap()
            .map(|r| r.unwrap().dst)
            .sorted()
            .collect()
    }

    #[test]
    fn test_includes_regular_files_with_relative_names() {
        let temp_dir = TempDir::new().unwrap();
        create_test_files(temp_dir.path()).unwrap();

        let source = WalkdirSource::builder().src_dir(temp_dir.path()).build();

        assert_eq!(
            collect_dsts(&source),
            vec![
                PathBuf::from(".hidden_dir/visible.txt"),
                PathBuf::from("file1.txt"),
                PathBuf::from("subdir/deeper/file3.log"),
                PathBuf::from("subdir/file2.json"),
            ]
        );
    }

    #[test]
    fn test_entry_src_points_at_file() {
        let temp_dir = TempDir::new().unwrap();
        create_test_files(temp_dir.path()).unwrap();

        let source = WalkdirSource::builder().src_dir(temp_dir.path()).build();
        for entry in source.archive_entry_iterator().unwrap() {
            let entry = entry.unwrap();
            assert!(entry.src.is_file());
            assert_eq!(entry.src, temp_dir.path().join(&entry.dst));
        }
    }

    #[test]
    fn test_empty_directory_yields_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let source = WalkdirSource::builder().src_dir(temp_dir.path()).build();
        assert!(collect_dsts(&source).is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn test_symlinks_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("real.txt"), "data").unwrap();
        std::os::unix::fs::symlink(
            temp_dir.path().join("real.txt"),
            temp_dir.path().join("link.txt"),
        )
        .unwrap();

        let source = WalkdirSource::builder().src_dir(temp_dir.path()).build();
        assert_eq!(collect_dsts(&source), vec![PathBuf::from("real.txt")]);
    }

    #[test]
    fn test_nonexistent_directory_fails() {
        let source = WalkdirSource::builder()
            .src_dir("/nonexistent/directory")
            .build();
        assert!(source.archive_entry_iterator().is_err());
    }

    #[test]
    fn test_file_as_src_dir_fails() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("not_a_directory.txt");
        std::fs::write(&file_path, "content").unwrap();

        let source = WalkdirSource::builder().src_dir(file_path).build();
        assert!(source.archive_entry_iterator().is_err());
    }
}
