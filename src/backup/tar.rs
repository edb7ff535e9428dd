use crate::backup::archive::ArchiveEntry;
use crate::backup::compress::GzipConfig;
use crate::backup::finish::Finish;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::AddMsg;
use std::fs::File;
use std::io::{BufWriter, IntoInnerError};
use std::path::Path;

/// Writes entries into a new gzip-compressed TAR file at `dest`.
///
/// Stops at the first failing entry. The partially written file is left on
/// disk in that case. Returns the number of entries written.
pub fn create_tar_gz<I>(dest: &Path, compressor: &GzipConfig, entries: I) -> Result<usize>
where
    I: IntoIterator<Item = Result<ArchiveEntry>>,
{
    let mut writer = File::create_new(dest)
        .map(BufWriter::new)
        .map(|f| compressor.build_compressor(f))
        .map(tar::Builder::new)
        .map_err(Error::from)
        .add_msg(format!("Creating archive file {:?} failed", dest))?;
    writer.follow_symlinks(false);

    let mut entry_count = 0;
    for entry in entries {
        let entry = entry?;
        writer
            .append_path_with_name(&entry.src, &entry.dst)
            .map_err(Error::from)
            .add_msg(format!("Adding {:?} to archive failed", entry.src))?;
        entry_count += 1;
    }

    // tar, then gzip, then the file itself
    let compressor = Finish::finish(writer)?;
    let file = Finish::finish(compressor)?
        .into_inner()
        .map_err(IntoInnerError::into_error)?;
    file.sync_all()?;

    tracing::info!("Wrote {} archive entries to {:?}", entry_count, dest);
    Ok(entry_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use itertools::Itertools;
    use std::io::Read;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn read_archive(path: &Path) -> Vec<(PathBuf, String)> {
        let mut archive = tar::Archive::new(GzDecoder::new(File::open(path).unwrap()));
        archive
            .entries()
            .unwrap()
            .map(|e| {
                let mut e = e.unwrap();
                let name = e.path().unwrap().into_owned();
                let mut content = String::new();
                e.read_to_string(&mut content).unwrap();
                (name, content)
            })
            .sorted()
            .collect()
    }

    #[test]
    fn test_create_tar_gz_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        std::fs::create_dir_all(src.join("nested")).unwrap();
        std::fs::write(src.join("a.txt"), "alpha").unwrap();
        std::fs::write(src.join("nested/b.txt"), "beta").unwrap();

        let dest = temp_dir.path().join("out.tar.gz");
        let entries = vec![
            Ok(ArchiveEntry::new(src.join("a.txt"), "a.txt")),
            Ok(ArchiveEntry::new(src.join("nested/b.txt"), "nested/b.txt")),
        ];

        let count = create_tar_gz(&dest, &GzipConfig::default(), entries).unwrap();
        assert_eq!(count, 2);
        assert_eq!(
            read_archive(&dest),
            vec![
                (PathBuf::from("a.txt"), "alpha".to_string()),
                (PathBuf::from("nested/b.txt"), "beta".to_string()),
            ]
        );
    }

    #[test]
    fn test_header_mirrors_file_metadata() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("data.bin");
        std::fs::write(&src, vec![7u8; 1500]).unwrap();
        let mtime = std::fs::metadata(&src)
            .unwrap()
            .modified()
            .unwrap()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs();

        let dest = temp_dir.path().join("out.tar.gz");
        create_tar_gz(
            &dest,
            &GzipConfig::default(),
            vec![Ok(ArchiveEntry::new(&src, "data.bin"))],
        )
        .unwrap();

        let mut archive = tar::Archive::new(GzDecoder::new(File::open(&dest).unwrap()));
        let entry = archive.entries().unwrap().next().unwrap().unwrap();
        assert_eq!(entry.header().size().unwrap(), 1500);
        assert_eq!(entry.header().mtime().unwrap(), mtime);
    }

    #[test]
    fn test_entry_error_aborts_and_leaves_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("out.tar.gz");
        let entries = vec![Err(Error::from(std::io::Error::other("walk failed")))];

        let err = create_tar_gz(&dest, &GzipConfig::default(), entries).unwrap_err();
        assert!(err.to_string().contains("walk failed"));
        assert!(dest.exists());
    }

    #[test]
    fn test_existing_destination_is_not_overwritten() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("out.tar.gz");
        std::fs::write(&dest, "previous").unwrap();

        assert!(create_tar_gz(&dest, &GzipConfig::default(), Vec::new()).is_err());
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "previous");
    }
}
