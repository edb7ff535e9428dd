//! Validation functions for configuration values.
//!
//! Provides custom validation functions for the source directory list and the
//! output directory.

use itertools::Itertools;
use validator::ValidationError;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Every source directory needs a final path component, and no two may share one,
/// since the component names the backup directory under `output_dir`.
pub fn validate_source_dir_base_names(dirs: &Vec<PathBuf>) -> Result<(), ValidationError> {
    if let Some(dir) = dirs.iter().find(|d| d.file_name().is_none()) {
        return Err(ValidationError::new("InvalidSourceDir")
            .with_message(format!("{:?} has no base name to name its backups by", dir).into()));
    }

    let mut by_base_name: HashMap<_, Vec<&PathBuf>> = HashMap::new();
    for dir in dirs {
        if let Some(base_name) = dir.file_name() {
            by_base_name.entry(base_name).or_default().push(dir);
        }
    }

    let collisions = by_base_name
        .into_values()
        .filter(|same| same.len() > 1)
        .map(|same| format!("{:?}", same))
        .sorted()
        .collect_vec();
    if !collisions.is_empty() {
        return Err(ValidationError::new("SourceDirBaseNameCollision").with_message(
            format!(
                "source directories share a base name and would share a backup directory: {}",
                collisions.join(", ")
            )
            .into(),
        ));
    }

    Ok(())
}

pub fn validate_not_a_file<P: AsRef<Path>>(dir: P) -> Result<(), ValidationError> {
    let dir = dir.as_ref();
    if dir.exists() && !dir.is_dir() {
        return Err(ValidationError::new("InvalidDirectory")
            .with_message(format!("{:?} is not a directory", dir).into()));
    }

    Ok(())
}
