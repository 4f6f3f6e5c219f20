//! Temporary file management utilities.
//!
//! This module provides helper functions for creating and managing temporary
//! files and directories. It leverages the tempfile crate to handle automatic
//! cleanup via the Drop trait, so working files of a failed conversion or an
//! abandoned frame dump are removed on every exit path.

use crate::config::CoreConfig;
use crate::error::CoreResult;
use std::path::{Path, PathBuf};
use tempfile::{self, Builder as TempFileBuilder, TempDir};

/// Creates a temporary directory with prefix. Auto-cleaned when dropped.
pub fn create_temp_dir(config: &CoreConfig, prefix: &str) -> CoreResult<TempDir> {
    let builder = {
        let mut b = TempFileBuilder::new();
        b.prefix(prefix);
        b
    };

    match &config.temp_dir {
        Some(base) => {
            std::fs::create_dir_all(base)?;
            Ok(builder.tempdir_in(base)?)
        }
        None => Ok(builder.tempdir()?),
    }
}

/// Returns a temporary file path with random suffix. Does not create the file.
pub fn create_temp_file_path(dir: &Path, prefix: &str, extension: &str) -> PathBuf {
    use rand::distributions::Alphanumeric;
    use rand::{Rng, thread_rng};

    let random_suffix: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();

    let filename = format!("{prefix}_{random_suffix}.{extension}");
    dir.join(filename)
}
