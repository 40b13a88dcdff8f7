//! Item ordering, id assignment and family rank homogeneity.

use crate::normalize::preorder_ids;
use crate::tree::{PathTree, RankKind};
use std::collections::BTreeSet;
use tracing::warn;

/// Sort the items of every family by rank and number them 1..k.
///
/// A family whose item ranks mix types keeps its load order. Families whose
/// direct sub-families mix rank types get every sub-family rank turned into
/// text, so that sibling families stay comparable.
pub fn sort_and_number(tree: &mut PathTree) {
    for id in preorder_ids(tree) {
        let path = tree[id].path().to_vec();
        let items = &mut tree[id].attrs.items;

        let kinds: BTreeSet<Option<RankKind>> = items
            .iter()
            .map(|item| item.rank.as_ref().map(|rank| rank.kind()))
            .collect();

        if kinds.len() > 1 {
            warn!(
                family = ?path,
                ranks = ?items.iter().map(|item| &item.rank).collect::<Vec<_>>(),
                "mix of types found in graph ranks, skipping sort"
            );
        } else {
            // Stable: equal ranks keep their load order
            items.sort_by(|a, b| a.rank.cmp(&b.rank));
        }

        for (position, item) in items.iter_mut().enumerate() {
            item.id = Some(position + 1);
        }

        let sons: Vec<_> = tree[id].sons().values().copied().collect();
        let kinds: BTreeSet<Option<RankKind>> = sons
            .iter()
            .map(|&son| tree[son].attrs.rank.as_ref().map(|rank| rank.kind()))
            .collect();

        if kinds.len() > 1 {
            warn!(
                family = ?path,
                ranks = ?sons.iter().map(|&son| &tree[son].attrs.rank).collect::<Vec<_>>(),
                "mix of types found in family ranks, using ranks as strings"
            );
            for son in sons {
                let attrs = &mut tree[son].attrs;
                attrs.rank = attrs.rank.as_ref().map(|rank| rank.to_text());
            }
        }
    }
}
