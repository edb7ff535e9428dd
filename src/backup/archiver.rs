use crate::backup::archive::walkdir_source::WalkdirSource;
use crate::backup::archive::ArchiveEntryIterable;
use crate::backup::backup_config::BackupConfig;
use crate::backup::compress::GzipConfig;
use crate::backup::encrypt::gpg::GpgCommand;
use crate::backup::encrypt::EncryptionProvider;
use crate::backup::file_ext::FileExtProvider;
use crate::backup::function_path;
use crate::backup::redacted::RedactedString;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::{AddFunctionName, AddMsg};
use crate::backup::tar::create_tar_gz;
use bon::Builder;
use chrono::{DateTime, TimeZone};
use function_name::named;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Span;

static TIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
static TAR_FILE_EXT: &str = "tar";

/// Writes one compressed (and optionally encrypted) archive per call.
#[derive(Builder)]
pub struct Archiver {
    config: Arc<BackupConfig>,
    #[builder(default)]
    compressor: GzipConfig,
    #[builder(default = Arc::new(GpgCommand::default()) as Arc<dyn EncryptionProvider>)]
    encryptor: Arc<dyn EncryptionProvider>,
    #[builder(default = tracing::info_span!("archiver"))]
    span: Span,
}

impl FileExtProvider for Archiver {
    fn file_ext(&self) -> Option<&str> {
        self.compressor.file_ext()
    }
}

impl Archiver {
    /// `<base name>_<YYYY-MM-DD_HH-MM-SS>.tar.gz`
    pub fn archive_file_name<Tz>(&self, base_name: &str, dt: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let ext = std::iter::once(TAR_FILE_EXT)
            .chain(self.file_ext())
            .collect::<Vec<_>>()
            .join(".");
        format!("{}_{}.{}", base_name, dt.format(TIME_FORMAT), ext)
    }

    /// Archives `source_dir` into its backup directory and returns the final file.
    ///
    /// A non-empty `passphrase` overrides the configured encryption key. When a
    /// key is in effect the plaintext archive is replaced by the encrypted one.
    #[named]
    pub fn create_backup<P, Tz>(
        &self,
        source_dir: P,
        passphrase: Option<&RedactedString>,
        now: &DateTime<Tz>,
    ) -> Result<PathBuf>
    where
        P: AsRef<Path>,
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let _entered = self.span.enter();
        let source_dir = source_dir.as_ref();
        let key = self.config.effective_key(passphrase);
        tracing::info!("Backing up {:?}", source_dir);

        let base_name = source_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::from(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("{:?} has no base name", source_dir),
                ))
            })
            .add_fn_name(function_path!())?;

        let backup_dir = self.config.backup_dir(source_dir);
        std::fs::create_dir_all(&backup_dir)
            .map_err(Error::from)
            .add_msg(format!("Creating backup directory {:?} failed", backup_dir))
            .add_fn_name(function_path!())?;

        let entries = WalkdirSource::builder()
            .src_dir(source_dir)
            .build()
            .archive_entry_iterator()?;
        let archive_path = backup_dir.join(self.archive_file_name(&base_name, now));
        create_tar_gz(&archive_path, &self.compressor, entries)
            .add_msg(format!("Archiving {:?} into {:?} failed", source_dir, archive_path))
            .add_fn_name(function_path!())?;

        let Some(key) = key else {
            tracing::info!(
                "Backup created successfully! Archive saved to {:?}",
                archive_path
            );
            return Ok(archive_path);
        };

        let encrypted_path = self
            .encryptor
            .encrypt(&archive_path, key)
            .add_msg(format!("Encrypting {:?} failed", archive_path))?;
        if let Err(e) = std::fs::remove_file(&archive_path) {
            tracing::warn!(
                "Error removing unencrypted backup file {:?}: {}",
                archive_path,
                e
            );
        }
        tracing::info!(
            "Backup created successfully! Encrypted archive saved to {:?}",
            encrypted_path
        );
        Ok(encrypted_path)
    }
}
