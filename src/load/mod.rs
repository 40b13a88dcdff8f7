//! Building the family tree from a data root.
//!
//! Two ingestion modes are supported:
//!
//! - [`LoadMode::Raw`]: every image under the root becomes an item, grouped
//!   into synthetic families of [`GROUP_SIZE`] in discovery order
//! - [`LoadMode::Structured`]: every YAML record file becomes an item placed
//!   in the family named by its `family` key
//!
//! Family-level metadata is applied afterwards with
//! [`families::load_family_metadata`]. Malformed records are skipped with a
//! warning; loading never fails as a whole.

pub mod discover;
pub mod families;
pub mod records;

use crate::load::discover::{iter_all_files, relative_to, RAW_EXTENSIONS, RECORD_EXTENSIONS};
use crate::load::records::{item_from_record, read_record, take_family};
use crate::tree::{Item, PathTree};
use crate::utils::progress;
use serde_norway::Value;
use std::path::Path;
use tracing::{info, warn};

pub use families::{export_families, find_default_families_file, load_family_metadata};

/// Number of items per synthetic family in raw mode
pub const GROUP_SIZE: usize = 10;

/// How records are discovered under the data root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Images only, metadata ignored
    Raw,
    /// YAML records describing each item
    #[default]
    Structured,
}

/// Build the tree for `root` without progress display
pub fn build_tree(root: &Path, mode: LoadMode) -> PathTree {
    build_tree_with_progress(root, mode, true)
}

/// Build the tree for `root`, optionally showing progress on the terminal
pub fn build_tree_with_progress(root: &Path, mode: LoadMode, silent: bool) -> PathTree {
    if !root.is_dir() {
        warn!(root = %root.display(), "data root is not a directory");
        return PathTree::new();
    }

    let extensions = match mode {
        LoadMode::Raw => RAW_EXTENSIONS,
        LoadMode::Structured => RECORD_EXTENSIONS,
    };

    let discovering = progress::spinner("Discovering files...", silent);
    let files = iter_all_files(root, extensions);
    if let Some(spinner) = discovering {
        spinner.finish_with_message(format!("Found {} files", files.len()));
    }

    let tree = match mode {
        LoadMode::Raw => load_raw(root, &files),
        LoadMode::Structured => load_structured(root, &files, silent),
    };

    info!(
        items = tree.item_count(),
        root = %root.display(),
        "items loaded"
    );
    tree
}

/// Family name covering the 1-based range of the `count`-th item
fn raw_family_name(count: usize) -> String {
    let start = (count / GROUP_SIZE) * GROUP_SIZE;
    format!("Graphs {:6}-{:6}", start + 1, start + GROUP_SIZE)
}

fn load_raw(root: &Path, files: &[std::path::PathBuf]) -> PathTree {
    let mut tree = PathTree::new();

    for (count, file) in files.iter().enumerate() {
        let item = Item {
            name: Some(relative_to(file, root).to_string_lossy().into_owned()),
            loose: crate::tree::Loose {
                title: file
                    .file_name()
                    .map(|n| Value::String(n.to_string_lossy().into_owned())),
                ..Default::default()
            },
            ..Item::default()
        };

        let node = tree.create_from_path(&[raw_family_name(count)]);
        tree[node].attrs.items.push(item);
    }

    tree
}

fn load_structured(root: &Path, files: &[std::path::PathBuf], silent: bool) -> PathTree {
    let mut tree = PathTree::new();
    let bar = progress::bar(files.len(), silent);

    for file in files {
        if let Some(ref bar) = bar {
            bar.inc(1);
        }

        let mut record = match read_record(file) {
            Ok(record) => record,
            Err(err) => {
                warn!(error = %format!("{:#}", err), "skipping record");
                continue;
            }
        };

        let family = take_family(&mut record).unwrap_or_default();
        if !record.contains_key("name") {
            info!(file = %file.display(), "no \"name\" attribute, processing as text entry");
        }

        let item = item_from_record(&record, file, root);
        let node = tree.create_from_path(&family);
        tree[node].attrs.items.push(item);
    }

    if let Some(bar) = bar {
        bar.finish_with_message(format!("Loaded {} records", tree.item_count()));
    }

    tree
}
