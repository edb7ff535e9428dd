use backubrr::backup::backup_config::{BackupConfig, DEFAULT_CONFIG_PATH};
use backubrr::backup::orchestrator::Orchestrator;
use backubrr::backup::redacted::RedactedString;
use backubrr::backup::result_error::result::Result;
use backubrr::backup::result_error::AddMsg;
use backubrr::backup::version::VersionInfo;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::exit;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Back up directories on an interval, optionally encrypted, and prune old archives
#[derive(Parser, Debug)]
#[command(about, long_about = None, disable_version_flag = true)]
struct Args {
    /// Path to config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Encryption key passphrase, conflicts with `encryption_key` in the config file
    #[arg(short, long, env = "BACKUBRR_PASSPHRASE", hide_env_values = true)]
    passphrase: Option<String>,

    /// Print version information and exit
    #[arg(short = 'v', long = "version", action = ArgAction::SetTrue)]
    version: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print version information and exit
    Version,
}

fn run(args: Args) -> Result<()> {
    let passphrase = args
        .passphrase
        .map(RedactedString::from)
        .filter(|p| !p.is_empty());
    let config = BackupConfig::load(&args.config).add_msg(
        "Error loading config file, check if the file exists and is valid".to_string(),
    )?;
    Orchestrator::from_config(args.config, config, passphrase)?.start_loop()
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    if args.version || matches!(args.command, Some(Command::Version)) {
        println!("{}", VersionInfo::from_env());
        return;
    }

    if let Err(e) = run(args) {
        error!("{e}");
        exit(1);
    }
}
