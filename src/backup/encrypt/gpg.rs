use crate::backup::encrypt::EncryptionProvider;
use crate::backup::file_ext::FileExtProvider;
use crate::backup::function_path;
use crate::backup::redacted::RedactedString;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::{AddFunctionName, AddMsg};
use bon::Builder;
use function_name::named;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

static DEFAULT_GPG_PROGRAM: &str = "gpg";

/// Symmetric AES-256 encryption by running the `gpg` program.
///
/// The passphrase is handed over as a command line argument.
#[derive(Clone, Debug, Builder, PartialEq, Eq)]
pub struct GpgCommand {
    #[builder(default = PathBuf::from(DEFAULT_GPG_PROGRAM), into)]
    program: PathBuf,
    /// Passed as `--homedir`, otherwise gpg uses its own default
    #[builder(into)]
    homedir: Option<PathBuf>,
}

impl Default for GpgCommand {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl FileExtProvider for GpgCommand {
    fn file_ext(&self) -> Option<&str> {
        Some("gpg")
    }
}

impl EncryptionProvider for GpgCommand {
    #[named]
    fn encrypt(&self, plaintext: &Path, key: &RedactedString) -> Result<PathBuf> {
        let output_path = self.ciphertext_path(plaintext);
        tracing::debug!("Encrypting {:?} into {:?}", plaintext, output_path);

        let mut command = Command::new(&self.program);
        if let Some(homedir) = &self.homedir {
            command.arg("--homedir").arg(homedir);
        }
        let output = command
            .args(["--batch", "--yes", "--symmetric", "--cipher-algo", "AES256"])
            .arg("--passphrase")
            .arg(key.inner())
            .arg("--output")
            .arg(&output_path)
            .arg(plaintext)
            .stdin(Stdio::null())
            .output()
            .map_err(Error::from)
            .add_msg(format!("Running {:?} failed", self.program))
            .add_fn_name(function_path!())?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::error!("Error running {:?}: {}", self.program, output.status);
            return Err(Error::EncryptionFailed {
                program: self.program.display().to_string(),
                status: output.status,
                stderr,
            }
            .add_fn_name(function_path!()));
        }

        Ok(output_path)
    }
}
