//! Utility functions for formatting and path manipulation.
//!
//! This module provides general-purpose helpers used throughout the
//! video-helper-core library: timecode formatting for error messages and
//! folder/stem/extension handling for default output paths.

use std::path::{Path, PathBuf};

/// Formats seconds as HH:MM:SS.mmm (e.g., 3725.5 -> "01:02:05.500").
/// Returns "??:??:??.???" for invalid inputs.
#[must_use]
pub fn format_timecode(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??.???".to_string();
    }

    let total_millis = (seconds * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;
    format!("{hours:02}:{minutes:02}:{secs:02}.{millis:03}")
}

/// Splits a path into (folder, stem, extension). Missing parts are empty.
#[must_use]
pub fn folder_name_ext(path: &Path) -> (PathBuf, String, String) {
    let folder = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    (folder, stem, ext)
}

/// True when the path's extension equals `ext` (case-insensitive, no dot).
#[must_use]
pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Builds `<folder>/<stem><suffix>.<ext>` next to `path`, keeping its extension
/// unless `ext` is given.
#[must_use]
pub fn sibling_path(path: &Path, suffix: &str, ext: Option<&str>) -> PathBuf {
    let (folder, stem, original_ext) = folder_name_ext(path);
    let ext = ext.unwrap_or(&original_ext);
    let name = if ext.is_empty() {
        format!("{stem}{suffix}")
    } else {
        format!("{stem}{suffix}.{ext}")
    };
    folder.join(name)
}
