use crate::normalize::labels::sort_labels;
use crate::query::cache::MemoCache;
use crate::query::parser::{parse_query, Query};
use crate::tree::{Label, PathTree};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

/// One matched item, as shown to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedItem {
    pub title: String,
    pub text: String,
    /// In display order (color, then name)
    pub labels: Vec<Label>,
    pub id: Option<usize>,
}

/// Matches grouped by family
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResult {
    /// Family path (segments joined with `/`) to its matched items
    pub matches: BTreeMap<String, Vec<MatchedItem>>,
    /// Keys of `matches`, sorted case-insensitively
    pub families: Vec<String>,
    /// Alias of every ancestor family of a matched family, by joined path
    pub aliases: BTreeMap<String, String>,
    /// Number of matched items
    pub nb_matches: usize,
}

/// Result of a two-part `inner | outer` search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioResult {
    #[serde(flatten)]
    pub result: SearchResult,
    pub inner_value: String,
    pub outer_value: String,
    pub nb_total: usize,
    /// Percentage of `nb_total` matched by the full query
    pub ratio: f64,
}

/// Search over a frozen, normalized tree.
///
/// Owns the tree so that nothing can mutate it once searches have been
/// cached. Safe to share between threads.
pub struct SearchEngine {
    tree: PathTree,
    total_items: usize,
    queries: MemoCache<String, Query>,
    results: MemoCache<(Query, bool), SearchResult>,
}

impl SearchEngine {
    pub fn new(tree: PathTree) -> Self {
        let total_items = tree.item_count();
        Self {
            tree,
            total_items,
            queries: MemoCache::new(),
            results: MemoCache::new(),
        }
    }

    pub fn tree(&self) -> &PathTree {
        &self.tree
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// Parse a query string, memoized on the exact input
    pub fn parse(&self, raw: &str) -> Arc<Query> {
        self.queries.get_or_insert_with(raw, || parse_query(raw))
    }

    /// Items matching `query`, memoized on the query value.
    ///
    /// With `headless` only `nb_matches` is filled in.
    pub fn search(&self, query: &Query, headless: bool) -> Arc<SearchResult> {
        let key = (query.clone(), headless);
        self.results
            .get_or_insert_with(&key, || execute(&self.tree, query, headless))
    }

    /// Two-part search: `inner | outer` reports which share of the items
    /// matching `outer` also match `inner`. Without `|`, the share is taken
    /// over every item.
    pub fn search_ratio(&self, raw: &str, headless: bool) -> RatioResult {
        let (inner, outer) = match raw.split_once('|') {
            Some((inner, outer)) => (inner.trim(), outer.replace('|', " ").trim().to_string()),
            None => (raw.trim(), String::new()),
        };

        let full = format!("{} {}", inner, outer);
        let result = self.search(&self.parse(&full), headless);

        let nb_total = if outer.is_empty() {
            self.total_items
        } else {
            self.search(&self.parse(&outer), true).nb_matches
        };

        let ratio = if nb_total == 0 {
            0.0
        } else {
            100.0 * result.nb_matches as f64 / nb_total as f64
        };

        debug!(inner, outer = %outer, nb_total, ratio, "ratio search");

        RatioResult {
            result: SearchResult::clone(&result),
            inner_value: inner.to_string(),
            outer_value: outer,
            nb_total,
            ratio,
        }
    }
}

fn contained_in_any(word: &str, haystack: &[&str]) -> bool {
    haystack.iter().any(|text| text.contains(word))
}

/// Uncached evaluation of a query against every item of the tree
fn execute(tree: &PathTree, query: &Query, headless: bool) -> SearchResult {
    let mut result = SearchResult::default();

    for (family, id) in tree.iter_all_nodes() {
        let items = tree[id].items();
        if items.is_empty() {
            continue;
        }

        let family_path = family.join("/");
        let family_path_low = family_path.to_lowercase();
        let family_alias_low = PathTree::iter_upper_paths(family, false)
            .filter_map(|upper| tree.get_from_path(upper))
            .map(|upper| tree[upper].attrs.alias_or_empty())
            .collect::<Vec<_>>()
            .join("/")
            .to_lowercase();

        for item in items {
            let title_low = item.title.to_lowercase();
            let keywords: BTreeSet<String> = item
                .index
                .iter()
                .map(|token| token.strip_prefix('#').unwrap_or(token).to_lowercase())
                .collect();
            let haystack = [
                family_path_low.as_str(),
                family_alias_low.as_str(),
                title_low.as_str(),
            ];

            let matched = keywords.is_superset(&query.keywords.include)
                && keywords.is_disjoint(&query.keywords.exclude)
                && query
                    .freetext
                    .include
                    .iter()
                    .all(|word| contained_in_any(word, &haystack))
                && !query
                    .freetext
                    .exclude
                    .iter()
                    .any(|word| contained_in_any(word, &haystack));

            if !matched {
                continue;
            }

            result.nb_matches += 1;
            if headless {
                continue;
            }

            if !result.matches.contains_key(&family_path) {
                for upper in PathTree::iter_upper_paths(family, false) {
                    if let Some(upper_id) = tree.get_from_path(upper) {
                        result.aliases.insert(
                            upper.join("/"),
                            tree[upper_id].attrs.alias_or_empty().to_string(),
                        );
                    }
                }
            }

            result
                .matches
                .entry(family_path.clone())
                .or_default()
                .push(MatchedItem {
                    title: item.title.clone(),
                    text: item.text.clone(),
                    labels: sort_labels(&item.labels).into_iter().cloned().collect(),
                    id: item.id,
                });
        }
    }

    result.families = result.matches.keys().cloned().collect();
    result
        .families
        .sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::labels::handle_label;
    use crate::normalize::normalize;
    use crate::tree::Item;
    use serde_norway::Value;

    fn item(title: &str, index: &[&str]) -> Item {
        Item {
            title: title.to_string(),
            index: index.iter().map(|s| s.to_string()).collect(),
            ..Item::default()
        }
    }

    fn engine() -> SearchEngine {
        let mut tree = PathTree::new();
        let sales = tree.create_from_path(&["Sales"]);
        tree[sales].attrs.items.push(item("Revenue Report", &["#finance"]));
        tree[sales].attrs.items.push(item("Pipeline", &["#crm", "#Weekly"]));

        let q1 = tree.create_from_path(&["Ops", "Q1"]);
        tree[q1].attrs.items.push(item("Incidents", &["#weekly"]));
        tree[q1].attrs.labels.insert(handle_label(&Value::String("important".into())));
        let ops = tree.get_from_path(&["Ops"]).unwrap();
        tree[ops].attrs.alias = Some("Operations".into());

        normalize(&mut tree);
        SearchEngine::new(tree)
    }

    fn search(engine: &SearchEngine, raw: &str) -> Arc<SearchResult> {
        engine.search(&engine.parse(raw), false)
    }

    #[test]
    fn test_keyword_search() {
        let engine = engine();

        let result = search(&engine, "#finance");
        assert_eq!(result.nb_matches, 1);
        assert_eq!(result.families, vec!["Sales"]);
        assert_eq!(result.matches["Sales"][0].title, "Revenue Report");

        assert_eq!(search(&engine, "#marketing").nb_matches, 0);
    }

    #[test]
    fn test_keywords_case_insensitive() {
        let engine = engine();
        assert_eq!(search(&engine, "#weekly").nb_matches, 2);
        assert_eq!(search(&engine, "#weekly -#crm").nb_matches, 1);
    }

    #[test]
    fn test_freetext_matches_path_alias_and_title() {
        let engine = engine();
        assert_eq!(search(&engine, "revenue").nb_matches, 1);
        assert_eq!(search(&engine, "ops/q1").nb_matches, 1);
        assert_eq!(search(&engine, "operations").nb_matches, 1);
        assert_eq!(search(&engine, "sales -pipe").nb_matches, 1);
    }

    #[test]
    fn test_label_names_are_keywords() {
        let engine = engine();
        let result = search(&engine, "#important");
        assert_eq!(result.nb_matches, 1);
        assert_eq!(result.matches["Ops/Q1"][0].labels[0].name, "#important");
    }

    #[test]
    fn test_aliases_of_ancestors() {
        let engine = engine();
        let result = search(&engine, "incidents");
        assert_eq!(result.aliases.get("Ops").map(String::as_str), Some("Operations"));
        assert_eq!(result.aliases.get("Ops/Q1").map(String::as_str), Some("Q1"));
    }

    #[test]
    fn test_headless_only_counts() {
        let engine = engine();
        let result = engine.search(&engine.parse(""), true);
        assert_eq!(result.nb_matches, 3);
        assert!(result.matches.is_empty());
    }

    #[test]
    fn test_results_are_memoized() {
        let engine = engine();
        let a = search(&engine, "#weekly");
        let b = search(&engine, "#weekly");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&engine.parse("x"), &engine.parse("x")));
    }

    #[test]
    fn test_ratio() {
        let engine = engine();

        let ratio = engine.search_ratio("#finance | sales", false);
        assert_eq!(ratio.inner_value, "#finance");
        assert_eq!(ratio.outer_value, "sales");
        assert_eq!(ratio.nb_total, 2);
        assert_eq!(ratio.result.nb_matches, 1);
        assert!((ratio.ratio - 50.0).abs() < 1e-9);

        let ratio = engine.search_ratio("#weekly", false);
        assert_eq!(ratio.nb_total, 3);
        assert!(ratio.ratio > 66.0 && ratio.ratio < 67.0);

        let ratio = engine.search_ratio("x | #nothing | more", false);
        assert_eq!(ratio.outer_value, "#nothing   more");
        assert_eq!(ratio.nb_total, 0);
        assert_eq!(ratio.ratio, 0.0);
    }
}
