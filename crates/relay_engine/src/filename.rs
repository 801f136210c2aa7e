use std::path::{Path, PathBuf};

use chrono::Utc;
use relay_core::{candidate_name, disambiguate};

/// Collision-free target path for `url` inside `target_dir`: `{dir}/{name}`.
///
/// The name is the URL's last path segment, or a timestamp when there is none.
/// If that name is already taken a timestamp is inserted before the extension.
/// Resolving has no side effects; use [`crate::claim_and_write`] to actually
/// take the name.
pub fn resolve_name(url: &str, target_dir: &Path) -> PathBuf {
    let base = base_name(url);
    if target_dir.join(&base).exists() {
        target_dir.join(disambiguate(&base, &timestamp()))
    } else {
        target_dir.join(base)
    }
}

pub(crate) fn base_name(url: &str) -> String {
    candidate_name(url).unwrap_or_else(timestamp)
}

/// Alternative name used after a lost race for `base`.
pub(crate) fn retry_path(base: &str, target_dir: &Path, attempt: u32) -> PathBuf {
    let stamp = format!("{}_{attempt}", timestamp());
    target_dir.join(disambiguate(base, &stamp))
}

/// Microseconds since the Unix epoch.
fn timestamp() -> String {
    Utc::now().timestamp_micros().to_string()
}
