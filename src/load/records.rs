//! Field-by-field merging of loosely typed YAML records over the fixed
//! item and family schemas.

use crate::load::discover::rebase;
use crate::tree::types::{value_to_text, FamilyAttrs, Item, Rank};
use anyhow::{Context, Result};
use serde_norway::{Mapping, Value};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Keys an item record may carry
pub const ITEM_KEYS: &[&str] = &[
    "family", "name", "title", "index", "pretext", "text", "file", "export", "rank", "showtitle",
    "labels", "other",
];

/// Keys a family record may carry
pub const FAMILY_KEYS: &[&str] = &["family", "text", "rank", "alias", "labels"];

/// Read and parse a YAML document
pub fn read_yaml(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_norway::from_str(&content)
        .with_context(|| format!("{} parsing failed (YAML expected)", path.display()))
}

/// Read a YAML file that must hold a single mapping
pub fn read_record(path: &Path) -> Result<Mapping> {
    match read_yaml(path)? {
        Value::Mapping(mapping) => Ok(mapping),
        _ => anyhow::bail!("{} did not contain a YAML dict", path.display()),
    }
}

/// Replace `old` in a name, warning when it was present
pub fn replace_char(name: &str, old: char, new: char) -> String {
    if !name.contains(old) {
        return name.to_string();
    }
    let replaced = name.replace(old, &new.to_string());
    warn!(
        name,
        replaced = %replaced,
        "illegal char {:?}, replacing with {:?}",
        old,
        new
    );
    replaced
}

/// Turn a scalar-or-list value into a list, dropping nulls
pub fn sanitize(value: &Value) -> Vec<&Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Sequence(seq) => seq.iter().filter(|v| !v.is_null()).collect(),
        other => vec![other],
    }
}

/// Family path from a `family` value; `/` inside a segment becomes `-`
pub fn family_path(value: &Value) -> Vec<String> {
    sanitize(value)
        .into_iter()
        .map(|segment| replace_char(&value_to_text(segment), '/', '-'))
        .collect()
}

/// Name of a mapping key, for scalar keys only
fn key_name(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value_to_text(key)),
        _ => None,
    }
}

fn optional_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => Some(value_to_text(other)),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|x| x != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Sequence(s) => !s.is_empty(),
        Value::Mapping(m) => !m.is_empty(),
        Value::Tagged(t) => truthy(&t.value),
    }
}

fn warn_unknown(key: &str, origin: &str, allowed: &[&str]) {
    warn!(
        key,
        origin,
        allowed = ?allowed,
        "preventing addition of unknown key"
    );
}

/// Take the `family` entry out of a record
pub fn take_family(record: &mut Mapping) -> Option<Vec<String>> {
    record
        .remove(Value::String("family".to_string()))
        .map(|value| family_path(&value))
}

/// Build an item from a record whose `family` has already been taken out.
///
/// Path-like fields are rebased from `record_file` to `root`.
pub fn item_from_record(record: &Mapping, record_file: &Path, root: &Path) -> Item {
    let origin = record_file.display().to_string();
    let mut item = Item::default();

    for (key, value) in record {
        let Some(key) = key_name(key) else {
            warn!(origin = %origin, "ignoring non-scalar key");
            continue;
        };

        match key.as_str() {
            "name" => item.name = optional_text(value),
            "file" => item.file = optional_text(value),
            "export" => item.export = optional_text(value),
            "title" => item.loose.title = Some(value.clone()),
            "index" => item.loose.index = Some(value.clone()),
            "pretext" => item.loose.pretext = Some(value.clone()),
            "text" => item.loose.text = Some(value.clone()),
            "labels" => item.loose.labels = Some(value.clone()),
            "rank" => item.rank = Rank::from_value(value),
            "showtitle" => item.showtitle = truthy(value),
            "other" => item.other = (!value.is_null()).then(|| value.clone()),
            _ => warn_unknown(&key, &origin, ITEM_KEYS),
        }
    }

    for locator in [&mut item.name, &mut item.file, &mut item.export] {
        if let Some(path) = locator.as_mut().filter(|p| !p.is_empty()) {
            *path = rebase(path, record_file, root);
        }
    }

    item
}

/// Overwrite family attributes with the fields present in `record`.
/// Items are never read from family records.
pub fn merge_family_record(attrs: &mut FamilyAttrs, record: &Mapping, origin: &str) {
    for (key, value) in record {
        let Some(key) = key_name(key) else {
            warn!(origin, "ignoring non-scalar key");
            continue;
        };

        match key.as_str() {
            "text" => attrs.loose.text = Some(value.clone()),
            "alias" => attrs.loose.alias = Some(value.clone()),
            "labels" => attrs.loose.labels = Some(value.clone()),
            "rank" => attrs.rank = Rank::from_value(value),
            _ => warn_unknown(&key, origin, FAMILY_KEYS),
        }
    }
}
