//! Data root scanning and path helpers for loaded records.

use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// Image formats picked up in raw mode
pub const RAW_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".bmp", ".eps", ".ps", ".svg", ".gif"];

/// Record files parsed in structured mode
pub const RECORD_EXTENSIONS: &[&str] = &[".txt", ".yaml", ".yml"];

/// Check a file name against a list of extensions, case-insensitively
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    extensions.iter().any(|ext| name.ends_with(ext))
}

/// Every non-hidden file under `root` with one of `extensions`.
///
/// Symlinks are followed, hidden files and directories are skipped, and
/// entries come out sorted by name at each level so builds are reproducible.
pub fn iter_all_files(root: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(root)
        .hidden(true)
        .follow_links(true)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .parents(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    walker
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .map(|entry| entry.into_path())
        .filter(|path| has_extension(path, extensions))
        .collect()
}

/// Lexically resolve `.` and `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Path of `target` as seen from `base`, computed without touching the disk
pub fn relative_to(target: &Path, base: &Path) -> PathBuf {
    let target = normalize(target);
    let base = normalize(base);

    let target_parts: Vec<Component> = target.components().collect();
    let base_parts: Vec<Component> = base.components().collect();
    let common = target_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..base_parts.len() {
        rel.push("..");
    }
    for part in &target_parts[common..] {
        rel.push(part.as_os_str());
    }
    if rel.as_os_str().is_empty() {
        rel.push(".");
    }
    rel
}

/// Rewrite a resource locator found in `record_file` relative to the data root
pub fn rebase(locator: &str, record_file: &Path, root: &Path) -> String {
    let dir = record_file.parent().unwrap_or(root);
    relative_to(&dir.join(locator), root)
        .to_string_lossy()
        .into_owned()
}
