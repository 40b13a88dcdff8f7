//! Label propagation.
//!
//! After this pass:
//! - every item carries its own labels plus the explicit labels of its
//!   family and of every ancestor family
//! - every family carries its explicit labels, its ancestors' explicit
//!   labels, and every label found on an item or family below it
//! - every item's index contains the name of each of its labels
//!
//! Computed in two linear sweeps: a top-down broadcast of explicit labels,
//! then a bottom-up aggregation.

use crate::normalize::preorder_ids;
use crate::tree::{Label, PathTree};
use std::collections::BTreeSet;

pub fn propagate_labels(tree: &mut PathTree) {
    let order = preorder_ids(tree);

    // Down: explicit labels of the node and its ancestors
    let mut inherited: Vec<BTreeSet<Label>> = vec![BTreeSet::new(); tree.family_count()];
    for &id in &order {
        let parent = tree[id].parent();
        let attrs = &mut tree[id].attrs;

        let mut labels = attrs
            .own_labels
            .get_or_insert_with(|| attrs.labels.clone())
            .clone();
        if let Some(parent) = parent {
            labels.extend(inherited[parent].iter().cloned());
        }

        attrs.labels = labels.clone();
        for item in &mut attrs.items {
            item.labels.extend(labels.iter().cloned());
            item.index.extend(item.labels.iter().map(|label| label.name.clone()));
            attrs.labels.extend(item.labels.iter().cloned());
        }

        inherited[id] = labels;
    }

    // Up: reversed pre-order reaches every node after all its descendants
    for &id in order.iter().rev() {
        if let Some(parent) = tree[id].parent() {
            let labels = tree[id].attrs.labels.clone();
            tree[parent].attrs.labels.extend(labels);
        }
    }
}
