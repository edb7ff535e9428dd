use crate::backup::archiver::Archiver;
use crate::backup::backup_config::BackupConfig;
use crate::backup::function_path;
use crate::backup::notifications::discord::DiscordWebhook;
use crate::backup::notifications::Notification;
use crate::backup::redacted::RedactedString;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::{AddFunctionName, AddMsg};
use crate::backup::retention::RetentionCleaner;
use bon::Builder;
use chrono::{DateTime, Duration, Local};
use function_name::named;
use itertools::Itertools;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, Span};

static NEXT_RUN_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Outcome of one pass over every configured source directory
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// `(source_dir, new archive path)` in configured order
    pub created: Vec<(PathBuf, PathBuf)>,
    /// Source directories whose backup failed or produced no new file
    pub skipped: Vec<PathBuf>,
}

/// Runs backup cycles: archive every source, notify, clean up, sleep.
#[derive(Builder)]
pub struct Orchestrator {
    #[builder(into)]
    config_path: PathBuf,
    config: Arc<BackupConfig>,
    #[builder(into)]
    passphrase: Option<RedactedString>,
    archiver: Archiver,
    #[builder(default)]
    cleaner: RetentionCleaner,
    notifier: Option<Box<dyn Notification>>,
    /// Text substituted with `~` in notification lines
    #[builder(into)]
    home_dir: Option<String>,
    #[builder(default = tracing::info_span!("orchestrator"))]
    span: Span,
}

impl Orchestrator {
    /// Wires the archiver, cleaner and (if configured) Discord notifier for `config`.
    ///
    /// Fails if both the config file and `passphrase` carry an encryption key.
    pub fn from_config(
        config_path: PathBuf,
        config: BackupConfig,
        passphrase: Option<RedactedString>,
    ) -> Result<Self> {
        config.check_passphrase(passphrase.as_ref())?;
        let config = Arc::new(config);
        let notifier = config
            .discord_webhook_url()
            .cloned()
            .map(DiscordWebhook::new)
            .transpose()?
            .map(|n| Box::new(n) as Box<dyn Notification>);

        Ok(Self::builder()
            .config_path(config_path)
            .config(config.clone())
            .maybe_passphrase(passphrase)
            .archiver(Archiver::builder().config(config).build())
            .maybe_notifier(notifier)
            .maybe_home_dir(std::env::var("HOME").ok())
            .build())
    }

    fn encrypted(&self) -> bool {
        self.config.effective_key(self.passphrase.as_ref()).is_some()
    }

    /// Creates every backup directory up front.
    #[named]
    pub fn prepare_backup_dirs(&self) -> Result<()> {
        for backup_dir in self.config.backup_dirs() {
            std::fs::create_dir_all(&backup_dir)
                .map_err(Error::from)
                .add_msg(format!("Error creating backup directory {:?}", backup_dir))
                .add_fn_name(function_path!())?;
        }
        Ok(())
    }

    /// Backs up one source directory and returns the file that appeared in its
    /// backup directory.
    pub fn backup_source(&self, source_dir: &Path) -> Result<PathBuf> {
        let backup_dir = self.config.backup_dir(source_dir);
        let before = list_backup_files(&backup_dir)?;
        self.archiver
            .create_backup(source_dir, self.passphrase.as_ref(), &Local::now())
            .add_msg(format!("Error creating backup of {:?}", source_dir))?;
        let after = list_backup_files(&backup_dir)?;

        after
            .into_iter()
            .find(|name| !before.contains(name))
            .map(|name| backup_dir.join(name))
            .ok_or(Error::NoNewArchive(backup_dir))
    }

    /// One pass over all source directories, in configured order.
    pub fn run_cycle(&self) -> CycleReport {
        let _entered = self.span.enter();
        let mut report = CycleReport::default();
        for source_dir in self.config.source_dirs() {
            match self.backup_source(source_dir) {
                Ok(archive) => report.created.push((source_dir.clone(), archive)),
                Err(e @ Error::NoNewArchive(_)) => {
                    debug!("{e}");
                    report.skipped.push(source_dir.clone());
                }
                Err(e) => {
                    error!("{e}");
                    report.skipped.push(source_dir.clone());
                }
            }
        }
        report
    }

    /// Notification text for a finished cycle.
    pub fn compose_message(
        &self,
        report: &CycleReport,
        next_run: Option<DateTime<Local>>,
    ) -> String {
        let saved_as = if self.encrypted() {
            "Encrypted archive saved to"
        } else {
            "Archive saved to"
        };

        let lines = report
            .created
            .iter()
            .map(|(source_dir, archive)| {
                let line = format!(
                    "Backup of **`{}`** created successfully! {} **`{}`**\n",
                    source_dir.display(),
                    saved_as,
                    archive.display()
                );
                match self.home_dir.as_deref().filter(|h| !h.is_empty()) {
                    Some(home) => line.replace(home, "~"),
                    None => line,
                }
            })
            .join("");

        match next_run {
            Some(next_run) => format!(
                "{}\nNext backup will run at **`{}`**\n",
                lines,
                next_run.format(NEXT_RUN_FORMAT)
            ),
            None => lines,
        }
    }

    fn notify(&self, message: &str) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        if message.trim().is_empty() {
            debug!("Nothing to notify");
            return;
        }
        if let Err(e) = notifier.send(message) {
            error!("Error sending message to Discord: {e}");
        }
    }

    fn next_run(&self) -> Option<DateTime<Local>> {
        let interval = self.config.interval();
        if interval <= 0 {
            return None;
        }
        Duration::try_hours(interval).and_then(|d| Local::now().checked_add_signed(d))
    }

    /// Cycle, notify, clean, then sleep `interval` hours; returns after one
    /// cycle when the interval is 0.
    pub fn start_loop(&self) -> Result<()> {
        self.prepare_backup_dirs()?;
        loop {
            let report = self.run_cycle();
            let _entered = self.span.enter();
            info!(
                "Cycle finished: {} archive(s) created, {} source(s) skipped",
                report.created.len(),
                report.skipped.len()
            );

            let next_run = self.next_run();
            self.notify(&self.compose_message(&report, next_run));

            if let Err(e) = self.cleaner.clean_from_path(&self.config_path, Local::now()) {
                error!("Error cleaning up old backups: {e}");
            }

            let Some(next_run) = next_run else {
                return Ok(());
            };
            info!("Next backup will run at {}", next_run.format(NEXT_RUN_FORMAT));
            let wait = (next_run - Local::now()).to_std().unwrap_or_default();
            drop(_entered);
            std::thread::sleep(wait);
        }
    }
}

/// Names of the regular files directly inside `backup_dir`, in listing order.
#[named]
pub fn list_backup_files(backup_dir: &Path) -> Result<Vec<OsString>> {
    let list = || -> std::io::Result<Vec<OsString>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(backup_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name());
            }
        }
        Ok(names)
    };
    list()
        .map_err(Error::from)
        .add_msg(format!("Error listing backup files in {:?}", backup_dir))
        .add_fn_name(function_path!())
}
