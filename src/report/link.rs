use std::path::Path;
use url::Url;

use crate::media::paths::normalize;

/// Link to `path` as seen from a report in `log_dir`.
///
/// Relative, `/`-separated and percent-encoded when possible; otherwise the
/// absolute `file://` URL.
pub fn link_path(path: &Path, log_dir: &Path) -> String {
    let absolute = |p: &Path| std::path::absolute(p).map(normalize).ok();

    let file_url = absolute(path).and_then(|p| Url::from_file_path(p).ok());
    let dir_url = absolute(log_dir).and_then(|p| Url::from_directory_path(p).ok());

    match (dir_url, file_url) {
        (Some(dir), Some(file)) => dir
            .make_relative(&file)
            .filter(|relative| !relative.is_empty())
            .unwrap_or_else(|| file.to_string()),
        (None, Some(file)) => file.to_string(),
        (_, None) => path.to_string_lossy().replace('\\', "/"),
    }
}
