//! # backubrr
//!
//! A small backup daemon: archives directories on a fixed interval and prunes old archives.
//!
//! ## Features
//!
//! - **Multiple Sources**: one `.tar.gz` per source directory, hidden files skipped
//! - **Encryption**: optional symmetric GPG (AES256) with a passphrase from config or CLI
//! - **Retention Management**: archives older than `retention_days` are deleted after each cycle
//! - **Notifications**: cycle summary posted to a Discord webhook
//!
//! ## Quick Start
//!
//! ```no_run
//! use backubrr::backup::backup_config::BackupConfig;
//! use backubrr::backup::orchestrator::Orchestrator;
//!
//! let config = BackupConfig::load("config.yaml")?;
//! let orchestrator = Orchestrator::from_config("config.yaml".into(), config, None)?;
//! orchestrator.start_loop()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backup;
