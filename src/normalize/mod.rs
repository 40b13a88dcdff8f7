//! Post-load passes establishing the tree invariants.
//!
//! [`normalize`] runs, in this exact order:
//!
//! 1. [`resolve_exclusivity`] - a family holds sub-families or items, not both
//! 2. [`enforce_types`] - loose record values become text, sets and labels
//! 3. [`fill_defaults`] - missing aliases and ranks
//! 4. [`propagate_labels`] - label inheritance down and aggregation up
//! 5. [`sort_and_number`] - item ordering, ids, family rank homogeneity
//!
//! Later passes rely on earlier ones (propagation reads the labels built by
//! type enforcement, sorting reads the ranks filled by defaults), so the
//! order is fixed. Re-running [`normalize`] on a normalized tree is a no-op.

pub mod labels;
pub mod propagate;
pub mod sort;

use crate::tree::{NodeId, PathTree, Rank, SINK};
use tracing::warn;

pub use labels::enforce_types;
pub use propagate::propagate_labels;
pub use sort::sort_and_number;

/// Run the five passes in order
pub fn normalize(tree: &mut PathTree) {
    resolve_exclusivity(tree);
    enforce_types(tree);
    fill_defaults(tree);
    propagate_labels(tree);
    sort_and_number(tree);
}

/// Ids of every node in pre-order (parents before their descendants)
pub(crate) fn preorder_ids(tree: &PathTree) -> Vec<NodeId> {
    tree.iter_all_nodes().map(|(_, id)| id).collect()
}

/// Move the items of every family that also has sub-families into its
/// [`SINK`] sub-family, creating it when needed.
pub fn resolve_exclusivity(tree: &mut PathTree) {
    for id in preorder_ids(tree) {
        if !tree[id].has_sons() || tree[id].items().is_empty() {
            continue;
        }

        warn!(
            family = ?tree[id].path(),
            sink = SINK,
            "family had both sub-families and graphs, moving graphs to sub-family"
        );

        let sink = tree.create_below(id, &[SINK]);
        let items = std::mem::take(&mut tree[id].attrs.items);
        tree[sink].attrs.items.extend(items);
    }
}

/// Alias defaults to the last path segment (empty for the root), family
/// rank to the lowercase alias, item rank to the lowercase title.
pub fn fill_defaults(tree: &mut PathTree) {
    for id in preorder_ids(tree) {
        let name = tree[id].name().unwrap_or_default().to_string();
        let attrs = &mut tree[id].attrs;

        let alias = attrs.alias.get_or_insert(name);
        if attrs.rank.is_none() {
            attrs.rank = Some(Rank::Text(alias.to_lowercase()));
        }

        for item in &mut attrs.items {
            if item.rank.is_none() {
                item.rank = Some(Rank::Text(item.title.to_lowercase()));
            }
        }
    }
}
