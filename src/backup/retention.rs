use crate::backup::backup_config::BackupConfig;
use crate::backup::function_path;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::{AddFunctionName, AddMsg};
use bon::Builder;
use chrono::{DateTime, Days, Local};
use function_name::named;
use std::path::Path;
use tracing::Span;
use walkdir::WalkDir;

/// Deletes archives whose modification time is older than the retention window.
#[derive(Builder)]
pub struct RetentionCleaner {
    #[builder(default = tracing::info_span!("retention"))]
    span: Span,
}

impl Default for RetentionCleaner {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub deleted: usize,
    pub kept: usize,
}

/// `now` minus `retention_days` calendar days.
///
/// `None` when that instant is not representable, so no file can be older.
pub fn cutoff(now: DateTime<Local>, retention_days: i64) -> Option<DateTime<Local>> {
    now.checked_sub_days(Days::new(retention_days.max(0) as u64))
}

impl RetentionCleaner {
    /// Reloads the configuration from `config_path`, then cleans with it.
    pub fn clean_from_path<P: AsRef<Path>>(
        &self,
        config_path: P,
        now: DateTime<Local>,
    ) -> Result<CleanReport> {
        let config = BackupConfig::load(config_path)?;
        self.clean(&config, now)
    }

    /// Walks the backup directory of every source directory in order.
    ///
    /// The first walk or delete failure aborts the whole call; directories
    /// after the failing one are not visited.
    pub fn clean(&self, config: &BackupConfig, now: DateTime<Local>) -> Result<CleanReport> {
        let _entered = self.span.enter();
        let cutoff = cutoff(now, config.retention_days());
        match cutoff {
            Some(cutoff) => tracing::info!("Cutoff time: {}", cutoff),
            None => tracing::info!(
                "Retention of {} days reaches past the earliest representable time, keeping everything",
                config.retention_days()
            ),
        }

        let mut report = CleanReport::default();
        for backup_dir in config.backup_dirs() {
            tracing::info!("Processing backup directory: {:?}", backup_dir);
            self.clean_dir(&backup_dir, cutoff, &mut report)
                .inspect_err(|e| tracing::error!("Error walking the path {:?}: {}", backup_dir, e))?;
        }

        if report.deleted == 0 {
            tracing::info!("No old backups found. Cleanup not needed.");
        }
        Ok(report)
    }

    #[named]
    fn clean_dir(
        &self,
        backup_dir: &Path,
        cutoff: Option<DateTime<Local>>,
        report: &mut CleanReport,
    ) -> Result<()> {
        for entry in WalkDir::new(backup_dir) {
            let entry = entry.map_err(Error::from).add_fn_name(function_path!())?;
            if entry.file_type().is_dir() {
                continue;
            }

            let modified: DateTime<Local> = entry
                .metadata()
                .map_err(Error::from)
                .and_then(|md| md.modified().map_err(Error::from))
                .add_msg(format!("Reading modification time of {:?} failed", entry.path()))?
                .into();

            if cutoff.is_some_and(|cutoff| modified < cutoff) {
                tracing::info!(
                    "File {:?} is older than retention period. Deleting...",
                    entry.path()
                );
                std::fs::remove_file(entry.path())
                    .map_err(Error::from)
                    .add_msg(format!("Removing {:?} failed", entry.path()))
                    .add_fn_name(function_path!())?;
                report.deleted += 1;
            } else {
                tracing::debug!(
                    "File {:?} is within retention period. Skipping...",
                    entry.path()
                );
                report.kept += 1;
            }
        }
        Ok(())
    }
}
