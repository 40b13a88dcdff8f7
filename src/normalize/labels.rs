//! Type enforcement: loose record values become canonical text, keyword
//! sets and [`Label`] sets.

use crate::load::records::{replace_char, sanitize};
use crate::normalize::preorder_ids;
use crate::tree::{value_to_text, Label, PathTree};
use serde_norway::Value;
use std::collections::BTreeSet;
use tracing::warn;

/// Solarized palette used by the label presets
pub mod solarized {
    pub const BASE01: &str = "#586e75";
    pub const YELLOW: &str = "#b58900";
    pub const ORANGE: &str = "#cb4b16";
    pub const RED: &str = "#dc322f";
    pub const BLUE: &str = "#268bd2";
    pub const GREEN: &str = "#859900";
}

/// Well-known label names: `(name, text, text_color, color)`
pub const KNOWN_LABELS: &[(&str, &str, &str, &str)] = &[
    ("ongoing", "ON-GOING", "white", solarized::GREEN),
    ("new", "NEW", "white", solarized::BLUE),
    ("update", "UPDATE", "white", solarized::BLUE),
    ("obsolete", "OBSOLETE", "white", solarized::BASE01),
    ("bugfix", "BUGFIX", "white", solarized::ORANGE),
    ("warning", "WARNING", "white", solarized::ORANGE),
    ("error", "ERROR", "white", solarized::RED),
    ("important", "IMPORTANT", "white", solarized::YELLOW),
];

const DEFAULT_LABEL_NAME: &str = "no_name_provided";
const DEFAULT_LABEL_TEXT: &str = "No text provided";
const DEFAULT_LABEL_COLOR: &str = solarized::BLUE;
const DEFAULT_LABEL_TEXT_COLOR: &str = "white";

/// Keyword token form: spaces become `_`, and a leading `#` is ensured
pub fn handle_index(raw: &str) -> String {
    let token = replace_char(raw, ' ', '_');
    if token.starts_with('#') {
        token
    } else {
        format!("#{}", token)
    }
}

/// Resolve one loose label value.
///
/// Mappings are merged over the default label, known preset names are
/// expanded, and anything else is used as both name and text.
pub fn handle_label(value: &Value) -> Label {
    let mut name = DEFAULT_LABEL_NAME.to_string();
    let mut text = DEFAULT_LABEL_TEXT.to_string();
    let mut color = DEFAULT_LABEL_COLOR.to_string();
    let mut text_color = DEFAULT_LABEL_TEXT_COLOR.to_string();
    let mut tooltip = None;

    match value {
        Value::Mapping(fields) => {
            for (key, value) in fields {
                match key.as_str() {
                    Some("name") => name = value_to_text(value),
                    Some("text") => text = value_to_text(value),
                    Some("color") => color = value_to_text(value),
                    Some("text_color") => text_color = value_to_text(value),
                    // null means unset
                    Some("tooltip") if value.is_null() => tooltip = None,
                    Some("tooltip") => tooltip = Some(value_to_text(value)),
                    _ => warn!(key = ?key, "unknown label key ignored"),
                }
            }
        }
        scalar => {
            let raw = value_to_text(scalar);
            match KNOWN_LABELS.iter().find(|(known, ..)| *known == raw) {
                Some((_, preset_text, preset_text_color, preset_color)) => {
                    text = preset_text.to_string();
                    text_color = preset_text_color.to_string();
                    color = preset_color.to_string();
                }
                None => {
                    warn!(
                        label = %raw,
                        known = ?KNOWN_LABELS.iter().map(|l| l.0).collect::<Vec<_>>(),
                        "label not in known labels, using defaults"
                    );
                    text = raw.clone();
                }
            }
            name = raw;
        }
    }

    // Label names double as keywords
    let name = handle_index(&name);
    let tooltip = tooltip.unwrap_or_else(|| format!("Use {} to search for this label.", name));

    Label {
        name,
        text,
        color,
        text_color,
        tooltip,
    }
}

fn label_set(value: &Value) -> BTreeSet<Label> {
    sanitize(value).into_iter().map(handle_label).collect()
}

fn index_set(value: &Value) -> BTreeSet<String> {
    sanitize(value)
        .into_iter()
        .map(|token| handle_index(&value_to_text(token)))
        .collect()
}

/// Settle every loose value on families and items
pub fn enforce_types(tree: &mut PathTree) {
    for id in preorder_ids(tree) {
        let attrs = &mut tree[id].attrs;

        if let Some(alias) = attrs.loose.alias.take() {
            attrs.alias = (!alias.is_null()).then(|| value_to_text(&alias));
        }
        if let Some(text) = attrs.loose.text.take() {
            attrs.text = value_to_text(&text);
        }
        if let Some(labels) = attrs.loose.labels.take() {
            attrs.labels = label_set(&labels);
            attrs.own_labels = None;
        }

        for item in &mut attrs.items {
            let loose = std::mem::take(&mut item.loose);

            if let Some(title) = loose.title {
                item.title = value_to_text(&title);
            }
            if let Some(text) = loose.text {
                item.text = value_to_text(&text);
            }
            if let Some(pretext) = loose.pretext {
                item.pretext = value_to_text(&pretext);
            }
            if let Some(index) = loose.index {
                item.index = index_set(&index);
            }
            if let Some(labels) = loose.labels {
                item.labels = label_set(&labels);
            }
        }
    }
}

/// Labels in display order: by color, then name
pub fn sort_labels<'a>(labels: impl IntoIterator<Item = &'a Label>) -> Vec<&'a Label> {
    let mut sorted: Vec<&Label> = labels.into_iter().collect();
    sorted.sort_by(|a, b| (&a.color, &a.name).cmp(&(&b.color, &b.name)));
    sorted
}

/// Keyword tokens in display order: shortest first, then alphabetical
pub fn sort_indexes<'a>(index: impl IntoIterator<Item = &'a String>) -> Vec<&'a str> {
    let mut sorted: Vec<&str> = index.into_iter().map(String::as_str).collect();
    sorted.sort_by(|a, b| (a.len(), *a).cmp(&(b.len(), *b)));
    sorted
}
