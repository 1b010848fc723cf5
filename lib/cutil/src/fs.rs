//! File system utilities for output directory management.

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Removes `path` with all of its contents if it exists, then creates it empty.
///
/// # Examples
///
/// ```no_run
/// use cutil::fs::recreate_dir;
///
/// recreate_dir("images").unwrap();
/// ```
pub fn recreate_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("remove directory {} failed", path.display()))?;
    }

    fs::create_dir_all(path).with_context(|| format!("create directory {} failed", path.display()))
}

/// Builds `<dir>/<prefix>_<index>.<ext>`.
///
/// # Examples
///
/// ```
/// use cutil::fs::sequential_file_path;
///
/// let path = sequential_file_path("images", "image", 3, "jpg");
/// assert_eq!(path.to_str(), Some("images/image_3.jpg"));
/// ```
pub fn sequential_file_path(
    dir: impl AsRef<Path>,
    prefix: &str,
    index: u64,
    ext: &str,
) -> PathBuf {
    dir.as_ref().join(format!("{prefix}_{index}.{ext}"))
}

/// Lists the file names directly inside `dir`, sorted.
pub fn list_file_names(dir: impl AsRef<Path>) -> Result<Vec<String>> {
    let dir = dir.as_ref();
    let mut names = vec![];

    for entry in fs::read_dir(dir).with_context(|| format!("read {} failed", dir.display()))? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    names.sort();
    Ok(names)
}
