//! Family-level metadata: applying a families file to a built tree, and
//! exporting the current family attributes as a families file skeleton.

use crate::load::records::{family_path, merge_family_record, read_yaml};
use crate::tree::{FamilyAttrs, PathTree};
use anyhow::{Context, Result};
use globset::Glob;
use serde_norway::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Families file picked up from the data root when none is configured
pub const DEFAULT_FAMILIES_GLOB: &str = ".FAMILIES.*";

/// First file directly under `root` matching [`DEFAULT_FAMILIES_GLOB`]
pub fn find_default_families_file(root: &Path) -> Option<PathBuf> {
    let matcher = Glob::new(DEFAULT_FAMILIES_GLOB).ok()?.compile_matcher();
    let mut candidates: Vec<PathBuf> = fs::read_dir(root)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| path.file_name().is_some_and(|name| matcher.is_match(name)))
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

/// Apply a families file to the tree. A missing or malformed file is a
/// warning; so is every entry that does not name an existing family.
pub fn load_family_metadata(tree: &mut PathTree, path: &Path) {
    info!(file = %path.display(), "loading families");

    if !path.is_file() {
        warn!(file = %path.display(), "families file does not exist");
        return;
    }

    match read_yaml(path) {
        Ok(document) => {
            let applied = apply_family_records(tree, &document, &path.display().to_string());
            info!(file = %path.display(), applied, "families applied");
        }
        Err(err) => warn!(error = %format!("{:#}", err), "skipping families file"),
    }
}

/// Apply a parsed families document (a list of mappings).
/// Returns the number of families updated.
pub fn apply_family_records(tree: &mut PathTree, document: &Value, origin: &str) -> usize {
    let Value::Sequence(entries) = document else {
        warn!(origin, "families file did not contain a YAML list");
        return 0;
    };

    let mut applied = 0;
    for entry in entries {
        let Value::Mapping(entry) = entry else {
            warn!(origin, entry = ?entry, "families entry is not a YAML dict");
            continue;
        };

        let mut entry = entry.clone();
        let Some(family) = entry.remove("family") else {
            warn!(origin, entry = ?entry, "missing \"family\" key, skipping");
            continue;
        };

        let path = family_path(&family);
        let Some(node) = tree.get_from_path(&path) else {
            warn!(origin, family = ?path, "family was not found in data");
            continue;
        };

        merge_family_record(&mut tree[node].attrs, &entry, origin);
        applied += 1;
    }
    applied
}

fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Sequence(s) => !s.is_empty(),
        Value::Mapping(m) => !m.is_empty(),
        _ => true,
    }
}

/// Non-default attributes of a family, whether normalized yet or not
fn family_fields(attrs: &FamilyAttrs) -> Mapping {
    let mut fields = Mapping::new();

    let text = match &attrs.loose.text {
        Some(value) => value.clone(),
        None => Value::String(attrs.text.clone()),
    };
    if is_set(&text) {
        fields.insert("text".into(), text);
    }

    if let Some(rank) = &attrs.rank {
        fields.insert("rank".into(), rank.to_value());
    }

    let alias = match (&attrs.loose.alias, &attrs.alias) {
        (Some(value), _) => value.clone(),
        (None, Some(alias)) => Value::String(alias.clone()),
        (None, None) => Value::Null,
    };
    if is_set(&alias) {
        fields.insert("alias".into(), alias);
    }

    let labels = match &attrs.loose.labels {
        Some(value) => value.clone(),
        None => Value::Sequence(
            attrs
                .labels
                .iter()
                .filter_map(|label| serde_norway::to_value(label).ok())
                .collect(),
        ),
    };
    if is_set(&labels) {
        fields.insert("labels".into(), labels);
    }

    fields
}

/// Write every family (sorted by path) with its non-default attributes.
/// Items are never exported. An existing file is left untouched.
pub fn export_families(tree: &PathTree, path: &Path) -> Result<()> {
    if path.is_file() {
        warn!(file = %path.display(), "file exists, skipping export");
        return Ok(());
    }

    let mut nodes: Vec<_> = tree.iter_all_nodes().collect();
    nodes.sort_by(|a, b| a.0.cmp(b.0));

    let families: Vec<Value> = nodes
        .into_iter()
        .map(|(family, id)| {
            let mut dumped = Mapping::new();
            dumped.insert(
                "family".into(),
                Value::Sequence(family.iter().cloned().map(Value::String).collect()),
            );
            dumped.extend(family_fields(&tree[id].attrs));
            Value::Mapping(dumped)
        })
        .collect();

    let yaml = serde_norway::to_string(&families).context("Failed to serialize families")?;
    fs::write(path, yaml).with_context(|| format!("Failed to write {}", path.display()))?;

    info!(file = %path.display(), "families file created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::capture::capture_warnings;
    use crate::tree::Rank;

    fn tree_with(paths: &[&[&str]]) -> PathTree {
        let mut tree = PathTree::new();
        for &path in paths {
            tree.create_from_path(path);
        }
        tree
    }

    #[test]
    fn test_apply_updates_matching_families() {
        let mut tree = tree_with(&[&["Sales", "Q1"]]);
        let doc: Value = serde_norway::from_str(
            "- family: [Sales]\n  alias: Sales team\n  rank: 2\n- family: [Missing]\n  text: nope\n- just a string\n- text: no family",
        )
        .unwrap();

        let (applied, logs) = capture_warnings(|| apply_family_records(&mut tree, &doc, "test"));
        assert_eq!(applied, 1);
        assert!(logs.contains("family was not found in data"));
        assert!(logs.contains("Missing"));
        assert!(logs.contains("families entry is not a YAML dict"));
        assert!(logs.contains("missing \"family\" key, skipping"));

        let sales = tree.get_from_path(&["Sales"]).unwrap();
        assert_eq!(tree[sales].attrs.rank, Some(Rank::Int(2)));
        assert!(tree[sales].attrs.loose.alias.is_some());
        assert!(tree.get_from_path(&["Missing"]).is_none());
    }

    #[test]
    fn test_apply_rejects_non_list() {
        let mut tree = tree_with(&[&["A"]]);
        let doc: Value = serde_norway::from_str("family: A").unwrap();
        let (applied, logs) = capture_warnings(|| apply_family_records(&mut tree, &doc, "test"));
        assert_eq!(applied, 0);
        assert!(logs.contains("families file did not contain a YAML list"));
    }

    #[test]
    fn test_find_default_families_file() {
        let dir = tempfile::Builder::new().prefix("famdex").tempdir().unwrap();
        assert!(find_default_families_file(dir.path()).is_none());

        fs::write(dir.path().join(".FAMILIES.yml"), "[]").unwrap();
        let found = find_default_families_file(dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), ".FAMILIES.yml");
    }

    #[test]
    fn test_export_then_reload() {
        let dir = tempfile::Builder::new().prefix("famdex").tempdir().unwrap();
        let out = dir.path().join("families.yml");

        let mut tree = tree_with(&[&["A", "B"]]);
        let a = tree.get_from_path(&["A"]).unwrap();
        tree[a].attrs.loose.alias = Some(Value::String("Alpha".into()));
        tree[a].attrs.rank = Some(Rank::Int(5));

        export_families(&tree, &out).unwrap();
        let content = fs::read_to_string(&out).unwrap();
        assert!(content.contains("Alpha"));
        assert!(!content.contains("graphs"));

        let mut fresh = tree_with(&[&["A", "B"]]);
        load_family_metadata(&mut fresh, &out);
        let a = fresh.get_from_path(&["A"]).unwrap();
        assert_eq!(fresh[a].attrs.rank, Some(Rank::Int(5)));
        assert_eq!(fresh[a].attrs.loose.alias, Some(Value::String("Alpha".into())));
    }

    #[test]
    fn test_export_does_not_overwrite() {
        let dir = tempfile::Builder::new().prefix("famdex").tempdir().unwrap();
        let out = dir.path().join("families.yml");
        fs::write(&out, "keep me").unwrap();

        export_families(&tree_with(&[&["A"]]), &out).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "keep me");
    }
}
