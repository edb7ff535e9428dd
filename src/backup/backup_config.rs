use crate::backup::function_path;
use crate::backup::redacted::RedactedString;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::{AddFunctionName, AddMsg};
use crate::backup::validate::{validate_not_a_file, validate_source_dir_base_names};
use bon::Builder;
use function_name::named;
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fs::File;
use std::path::{Path, PathBuf};
use validator::Validate;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Backup settings, loaded once per process (and once per retention cleanup).
#[skip_serializing_none]
#[derive(Clone, Serialize, Deserialize, Debug, Validate, Builder, Getters, CopyGetters)]
#[serde(deny_unknown_fields)]
pub struct BackupConfig {
    #[validate(custom(function = validate_source_dir_base_names))]
    #[getset(get = "pub")]
    #[builder(into)]
    source_dirs: Vec<PathBuf>,
    #[validate(custom(function = validate_not_a_file))]
    #[getset(get = "pub")]
    #[builder(into)]
    output_dir: PathBuf,
    #[serde(default)]
    #[builder(into)]
    encryption_key: Option<RedactedString>,
    /// Days an archive is kept before cleanup deletes it
    #[validate(range(min = 0))]
    #[serde(default)]
    #[getset(get_copy = "pub")]
    #[builder(default)]
    retention_days: i64,
    /// Hours between cycles, 0 runs a single cycle
    #[validate(range(min = 0))]
    #[serde(default)]
    #[getset(get_copy = "pub")]
    #[builder(default)]
    interval: i64,
    #[serde(default, rename = "discord")]
    #[builder(into)]
    discord_webhook_url: Option<RedactedString>,
}

impl BackupConfig {
    #[named]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config = File::open(path)
            .map_err(Error::from)
            .and_then(|f| serde_yml::from_reader::<_, BackupConfig>(f).map_err(Error::from))
            .add_msg(format!("Parse YAML config failed: {:?}", path))
            .add_fn_name(function_path!())?;

        config
            .check()
            .add_msg(format!("Config validation failed: {:?}", path))?;
        if let Ok(yaml) = config.redacted_yaml() {
            tracing::debug!("Loaded config {:?}:\n{}", path, yaml);
        }
        Ok(config)
    }

    /// YAML rendering with the encryption key and webhook URL redacted.
    pub fn redacted_yaml(&self) -> Result<String> {
        serde_yml::to_string(self).map_err(Error::from)
    }

    /// Runs field validation, reporting negative numbers as their own error kinds.
    pub fn check(&self) -> Result<()> {
        self.validate().map_err(|errors| {
            if self.retention_days < 0 {
                Error::InvalidRetention(self.retention_days)
            } else if self.interval < 0 {
                Error::InvalidInterval(self.interval)
            } else {
                Error::from(errors)
            }
        })
    }

    pub fn encryption_key(&self) -> Option<&RedactedString> {
        self.encryption_key.as_ref().filter(|k| !k.is_empty())
    }

    pub fn discord_webhook_url(&self) -> Option<&RedactedString> {
        self.discord_webhook_url.as_ref().filter(|u| !u.is_empty())
    }

    /// A passphrase given on the command line may not also be set in the file.
    pub fn check_passphrase(&self, passphrase: Option<&RedactedString>) -> Result<()> {
        match (self.encryption_key(), passphrase.filter(|p| !p.is_empty())) {
            (Some(_), Some(_)) => Err(Error::ConflictingEncryptionKey),
            _ => Ok(()),
        }
    }

    /// Passphrase wins over the configured key; `None` means no encryption.
    pub fn effective_key<'a>(
        &'a self,
        passphrase: Option<&'a RedactedString>,
    ) -> Option<&'a RedactedString> {
        passphrase
            .filter(|p| !p.is_empty())
            .or_else(|| self.encryption_key())
    }

    /// `<output_dir>/<base name of source_dir>`
    pub fn backup_dir<P: AsRef<Path>>(&self, source_dir: P) -> PathBuf {
        match source_dir.as_ref().file_name() {
            Some(base_name) => self.output_dir.join(base_name),
            None => self.output_dir.clone(),
        }
    }

    pub fn backup_dirs(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.source_dirs.iter().map(|d| self.backup_dir(d))
    }
}
