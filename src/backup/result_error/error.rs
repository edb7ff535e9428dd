use crate::backup::result_error::{AddFunctionName, AddMsg};
use itertools::Itertools;
use std::fmt::Debug;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    ValidationError(#[from] validator::ValidationErrors),
    #[error(transparent)]
    SerdeYml(#[from] serde_yml::Error),
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),
    #[error(transparent)]
    StripPrefix(#[from] std::path::StripPrefixError),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error("retention_days must be a non-negative number, got {0}")]
    InvalidRetention(i64),
    #[error("interval must be a non-negative number of hours, got {0}")]
    InvalidInterval(i64),
    #[error(
        "encryption key is already set in config, remove the --passphrase argument or unset encryption_key in the config file"
    )]
    ConflictingEncryptionKey,
    #[error("{program} exited with {status}:\n{}", indent::indent_all_with("  ", .stderr))]
    EncryptionFailed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("webhook responded with {status}: {body}")]
    WebhookRejected {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("no new archive appeared in {0:?}")]
    NoNewArchive(PathBuf),
    #[error("{}:\n{}", .msg, indent::indent_all_with("  ", .error.to_string()))]
    WithMsg { msg: String, error: Box<Error> },
    #[error("{} failed:\n{}", .fn_name, indent::indent_all_with("  ", .error.to_string()))]
    WithFnName { fn_name: String, error: Box<Error> },
    #[error("{}", itertools::join(.0, "\n\n"))]
    LotsOfError(Vec<Error>),
}

impl<S: Into<String>> AddFunctionName<S> for Error {
    fn add_fn_name(self, fn_name: S) -> Self {
        Error::WithFnName {
            fn_name: fn_name.into(),
            error: Box::new(self),
        }
    }
}

impl<S: Into<String>> AddMsg<S> for Error {
    fn add_msg(self, msg: S) -> Self {
        Self::WithMsg {
            msg: msg.into(),
            error: Box::new(self),
        }
    }
}

impl Error {
    pub fn lots_of_error<I: IntoIterator<Item = Error>>(errors: I) -> Self {
        Self::LotsOfError(errors.into_iter().flat_map(Error::into_iter).collect_vec())
    }

    pub fn into_iter(self) -> Box<dyn Iterator<Item = Error>> {
        match self {
            Error::LotsOfError(v) => Box::new(v.into_iter().flat_map(Error::into_iter)),
            e => Box::new(std::iter::once(e)),
        }
    }

    /// Strips `WithMsg` / `WithFnName` wrappers down to the error that caused them.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::WithMsg { error, .. } | Error::WithFnName { error, .. } => error.root_cause(),
            e => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn not_found() -> Error {
        Error::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ))
    }

    #[test]
    fn test_error_from_io_error() {
        match not_found() {
            Error::Io(_) => (),
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_error_add_msg() {
        match not_found().add_msg("Custom message") {
            Error::WithMsg { msg, .. } => assert_eq!(msg, "Custom message"),
            _ => panic!("Expected WithMsg error"),
        }
    }

    #[test]
    fn test_error_add_fn_name_display() {
        let error_str = not_found().add_fn_name("create_backup").to_string();
        assert!(error_str.contains("create_backup failed"));
        assert!(error_str.contains("  file not found"));
    }

    #[test]
    fn test_lots_of_error_flattens_nested() {
        let nested = Error::lots_of_error(vec![not_found(), not_found()]);
        let combined = Error::lots_of_error(vec![nested, not_found()]);
        match combined {
            Error::LotsOfError(errors) => assert_eq!(errors.len(), 3),
            _ => panic!("Expected LotsOfError"),
        }
    }

    #[test]
    fn test_root_cause_unwraps_context() {
        let error = Error::InvalidRetention(-3)
            .add_msg("loading config")
            .add_fn_name("load");
        assert!(matches!(error.root_cause(), Error::InvalidRetention(-3)));
    }

    #[test]
    fn test_invalid_values_display() {
        assert!(Error::InvalidRetention(-2).to_string().contains("-2"));
        assert!(Error::InvalidInterval(-5)
            .to_string()
            .contains("non-negative number of hours"));
    }
}
