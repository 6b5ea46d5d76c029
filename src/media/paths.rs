use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::error::ScreenCapError;

/// Names ending in one of these are used verbatim instead of getting an index
pub const MEDIA_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".webp", ".gif", ".webm"];

/// Lexically normalizes a path. `/` works as a separator on every platform.
pub fn normalize(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    #[cfg(windows)]
    let converted = PathBuf::from(path.to_string_lossy().replace('/', "\\"));
    #[cfg(windows)]
    let path = converted.as_path();

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

pub fn has_media_extension(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    MEDIA_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Resolves where a capture named `basename` is written.
///
/// A basename that already carries a media extension is used as-is. Otherwise
/// `<basename>_<n>.<extension>` is returned for the first `n` starting at 1
/// that does not exist yet. Absolute basenames ignore `directory`.
pub fn screenshot_path(basename: &str, extension: &str, directory: &Path) -> PathBuf {
    let base = normalize(basename);
    if has_media_extension(basename) {
        return directory.join(base);
    }
    let mut index: u64 = 0;
    loop {
        index += 1;
        let mut name = OsString::from(base.as_os_str());
        name.push(format!("_{}.{}", index, extension));
        let candidate = directory.join(PathBuf::from(name));
        if !candidate.exists() {
            return candidate;
        }
    }
}

/// Makes the path absolute and checks that its parent directory exists
pub fn validate_save_path(path: &Path) -> Result<PathBuf, ScreenCapError> {
    let path = normalize(std::path::absolute(path)?);
    match path.parent() {
        Some(parent) if parent.is_dir() => Ok(path),
        Some(parent) => Err(ScreenCapError::SaveDirectoryMissing(parent.to_path_buf())),
        None => Err(ScreenCapError::SaveDirectoryMissing(path)),
    }
}
