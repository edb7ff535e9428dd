pub mod gpg;

use crate::backup::file_ext::FileExtProvider;
use crate::backup::redacted::RedactedString;
use crate::backup::result_error::result::Result;
use std::ffi::OsString;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

/// Turns a finished plaintext archive into an encrypted sibling file.
///
/// Implementations must leave the plaintext untouched; deleting it is the
/// caller's decision once encryption has succeeded.
pub trait EncryptionProvider: FileExtProvider + Debug + Send + Sync {
    fn encrypt(&self, plaintext: &Path, key: &RedactedString) -> Result<PathBuf>;

    /// Path the ciphertext for `plaintext` is written to
    fn ciphertext_path(&self, plaintext: &Path) -> PathBuf {
        match self.file_ext() {
            Some(ext) => {
                let mut path = OsString::from(plaintext.as_os_str());
                path.push(".");
                path.push(ext);
                path.into()
            }
            None => plaintext.to_path_buf(),
        }
    }
}
