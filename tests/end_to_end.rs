//! End-to-end tests: records on disk, loaded, normalized and searched.

use famdex::config::Config;
use famdex::load::{build_tree, export_families, load_family_metadata, LoadMode};
use famdex::normalize::normalize;
use famdex::query::SearchEngine;
use famdex::tags::rank_tags;
use famdex::tree::{PathTree, SINK};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn data_root() -> TempDir {
    tempfile::Builder::new()
        .prefix("famdex")
        .tempdir()
        .expect("Failed to create temp dir")
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Sales/Q1 and Ops (with a stray item next to its sub-family)
fn sample_root() -> TempDir {
    let dir = data_root();
    let root = dir.path();

    write(
        root,
        "sales/revenue.yaml",
        "family: [Sales]\nname: revenue.png\ntitle: Revenue Report\nindex: [finance]\n",
    );
    write(
        root,
        "sales/pipeline.yaml",
        "family: [Sales]\nname: pipeline.png\ntitle: Pipeline\nindex: [crm, weekly]\nlabels: [new]\n",
    );
    write(
        root,
        "ops/incidents.yaml",
        "family: [Ops, Q1]\ntitle: Incidents\nindex: weekly\nrank: 2\n",
    );
    write(
        root,
        "ops/uptime.yaml",
        "family: [Ops, Q1]\ntitle: Uptime\nrank: 1\nunknown_key: kept out\n",
    );
    write(root, "ops/stray.yaml", "family: Ops\ntitle: Stray\n");
    write(root, "ops/.hidden.yaml", "family: Hidden\ntitle: Never loaded\n");
    write(root, "ops/broken.yaml", "title: [unclosed\n");
    write(
        root,
        ".FAMILIES.yml",
        "- family: [Ops]\n  alias: Operations\n  labels: [important]\n- family: [Nowhere]\n  text: skipped\n",
    );

    dir
}

fn load(root: &Path) -> PathTree {
    let mut tree = build_tree(root, LoadMode::Structured);
    let config = Config {
        root: root.to_path_buf(),
        ..Config::default()
    };
    if let Some(families) = config.families_file() {
        load_family_metadata(&mut tree, &families);
    }
    normalize(&mut tree);
    tree
}

#[test]
fn test_search_example() {
    let dir = sample_root();
    let engine = SearchEngine::new(load(dir.path()));

    let result = engine.search(&engine.parse("#finance"), false);
    assert_eq!(result.nb_matches, 1);
    assert_eq!(result.families, vec!["Sales"]);
    assert_eq!(result.matches["Sales"][0].title, "Revenue Report");

    let result = engine.search(&engine.parse("#marketing"), false);
    assert_eq!(result.nb_matches, 0);
    assert!(result.families.is_empty());
}

#[test]
fn test_loading_skips_hidden_and_malformed() {
    let dir = sample_root();
    let tree = load(dir.path());

    assert_eq!(tree.item_count(), 5);
    assert!(tree.get_from_path(&["Hidden"]).is_none());
    assert!(tree.get_from_path(&["Nowhere"]).is_none());
}

#[test]
fn test_exclusivity_and_ids() {
    let dir = sample_root();
    let tree = load(dir.path());

    let ops = tree.get_from_path(&["Ops"]).unwrap();
    assert!(tree[ops].items().is_empty());
    let sink = tree.get_from_path(&["Ops", SINK]).unwrap();
    assert_eq!(tree[sink].items()[0].title, "Stray");

    for (_, id) in tree.iter_all_nodes() {
        let node = &tree[id];
        assert!(!node.has_sons() || node.items().is_empty());

        let ids: Vec<usize> = node.items().iter().filter_map(|item| item.id).collect();
        let expected: Vec<usize> = (1..=node.items().len()).collect();
        assert_eq!(ids, expected);
    }

    let q1 = tree.get_from_path(&["Ops", "Q1"]).unwrap();
    let titles: Vec<&str> = tree[q1].items().iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["Uptime", "Incidents"]);
}

#[test]
fn test_family_labels_propagate() {
    let dir = sample_root();
    let tree = load(dir.path());

    let q1 = tree.get_from_path(&["Ops", "Q1"]).unwrap();
    for item in tree[q1].items() {
        assert!(item.labels.iter().any(|label| label.name == "#important"));
        assert!(item.index.contains("#important"));
    }

    let root = &tree[tree.root()];
    let names: Vec<&str> = root.attrs.labels.iter().map(|l| l.name.as_str()).collect();
    assert!(names.contains(&"#important"));
    assert!(names.contains(&"#new"));

    let sales = tree.get_from_path(&["Sales"]).unwrap();
    assert!(!tree[sales].attrs.labels.iter().any(|l| l.name == "#important"));
}

#[test]
fn test_alias_search_and_breadcrumbs() {
    let dir = sample_root();
    let engine = SearchEngine::new(load(dir.path()));

    let result = engine.search(&engine.parse("operations -uptime"), false);
    assert_eq!(result.nb_matches, 2);
    assert_eq!(result.aliases.get("Ops").map(String::as_str), Some("Operations"));
}

#[test]
fn test_ratio_bounds() {
    let dir = sample_root();
    let engine = SearchEngine::new(load(dir.path()));

    for raw in ["", "#weekly", "#weekly | sales", "x | #nothing", "| ops", "#weekly | #weekly"] {
        let result = engine.search_ratio(raw, false);
        if result.nb_total == 0 {
            assert_eq!(result.ratio, 0.0, "{}", raw);
        } else {
            assert!((0.0..=100.0).contains(&result.ratio), "{}", raw);
        }
    }

    let result = engine.search_ratio("#weekly | sales", true);
    assert_eq!(result.nb_total, 2);
    assert_eq!(result.result.nb_matches, 1);
    assert!(result.result.matches.is_empty());
}

#[test]
fn test_json_payload() {
    let dir = sample_root();
    let engine = SearchEngine::new(load(dir.path()));

    let result = engine.search_ratio("#crm", false);
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["nb_matches"], 1);
    assert_eq!(json["families"][0], "Sales");
    assert_eq!(json["matches"]["Sales"][0]["labels"][0]["text"], "NEW");
    assert_eq!(json["inner_value"], "#crm");
}

#[test]
fn test_tags_include_keywords() {
    let dir = sample_root();
    let tree = load(dir.path());

    let tags = rank_tags(&tree, 0.0);
    for keyword in ["#finance", "#crm", "#weekly", "#important", "#new"] {
        assert!(tags.iter().any(|t| t == keyword), "{}", keyword);
    }
}

#[test]
fn test_normalize_twice_is_stable() {
    let dir = sample_root();
    let mut tree = load(dir.path());
    let before = tree.prettify(true);
    let labels_before: Vec<_> = tree
        .iter_all_nodes()
        .map(|(_, id)| tree[id].attrs.labels.clone())
        .collect();

    normalize(&mut tree);

    assert_eq!(tree.prettify(true), before);
    let labels_after: Vec<_> = tree
        .iter_all_nodes()
        .map(|(_, id)| tree[id].attrs.labels.clone())
        .collect();
    assert_eq!(labels_after, labels_before);
}

#[test]
fn test_export_families_round_trip() {
    let dir = sample_root();
    let root = dir.path();

    let mut tree = build_tree(root, LoadMode::Structured);
    load_family_metadata(&mut tree, &root.join(".FAMILIES.yml"));

    let out = root.join("exported.yml");
    export_families(&tree, &out).unwrap();
    let exported = fs::read_to_string(&out).unwrap();
    assert!(exported.contains("Operations"));
    assert!(!exported.contains("Stray"));

    let mut fresh = build_tree(root, LoadMode::Structured);
    load_family_metadata(&mut fresh, &out);
    normalize(&mut fresh);
    let ops = fresh.get_from_path(&["Ops"]).unwrap();
    assert_eq!(fresh[ops].attrs.alias.as_deref(), Some("Operations"));
}

#[test]
fn test_raw_mode() {
    let dir = data_root();
    for i in 0..3 {
        write(dir.path(), &format!("img/{}.svg", i), "<svg/>");
    }

    let mut tree = build_tree(dir.path(), LoadMode::Raw);
    normalize(&mut tree);
    let engine = SearchEngine::new(tree);

    let result = engine.search(&engine.parse("graphs"), false);
    assert_eq!(result.nb_matches, 3);
    assert_eq!(result.families.len(), 1);
}

#[test]
fn test_missing_root_is_empty() {
    let tree = build_tree(Path::new("/definitely/not/here"), LoadMode::Structured);
    assert!(!tree.has_items());
    assert_eq!(SearchEngine::new(tree).search_ratio("anything", false).ratio, 0.0);
}
