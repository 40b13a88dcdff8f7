use crate::tree::types::{FamilyAttrs, Item};
use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

/// Index of a node in a [`PathTree`] (arena).
pub type NodeId = usize;

const ROOT: NodeId = 0;

/// One family of the taxonomy.
///
/// Children are owned through the tree arena; `parent` is a plain index
/// used for walking up, never for ownership.
#[derive(Debug, Clone)]
pub struct TreeNode {
    path: Vec<String>,
    sons: BTreeMap<String, NodeId>,
    parent: Option<NodeId>,
    pub attrs: FamilyAttrs,
}

impl TreeNode {
    fn new(path: Vec<String>, parent: Option<NodeId>) -> Self {
        Self {
            path,
            sons: BTreeMap::new(),
            parent,
            attrs: FamilyAttrs::default(),
        }
    }

    /// Full path of this family, empty for the root
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Last path segment, `None` for the root
    pub fn name(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    pub fn sons(&self) -> &BTreeMap<String, NodeId> {
        &self.sons
    }

    pub fn son(&self, name: &str) -> Option<NodeId> {
        self.sons.get(name).copied()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn has_sons(&self) -> bool {
        !self.sons.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.attrs.items
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Hierarchical container of families keyed by ordered path segments.
///
/// Nodes live in a contiguous arena and reference each other by
/// [`NodeId`]. The root always exists and has the empty path.
#[derive(Debug, Clone)]
pub struct PathTree {
    nodes: Vec<TreeNode>,
}

impl Default for PathTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PathTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![TreeNode::new(Vec::new(), None)],
        }
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// Number of families, root included
    pub fn family_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether any family holds at least one item
    pub fn has_items(&self) -> bool {
        self.nodes.iter().any(|node| !node.attrs.items.is_empty())
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id]
    }

    /// Walk the path from the root, creating missing families.
    /// Repeated calls with the same path return the same node.
    pub fn create_from_path<S: AsRef<str>>(&mut self, path: &[S]) -> NodeId {
        self.create_below(ROOT, path)
    }

    /// Same as [`create_from_path`](Self::create_from_path), relative to `from`
    pub fn create_below<S: AsRef<str>>(&mut self, from: NodeId, path: &[S]) -> NodeId {
        let mut current = from;
        for segment in path {
            let segment = segment.as_ref();
            current = match self.nodes[current].son(segment) {
                Some(son) => son,
                None => {
                    let mut son_path = self.nodes[current].path.clone();
                    son_path.push(segment.to_string());

                    let id = self.nodes.len();
                    self.nodes.push(TreeNode::new(son_path, Some(current)));
                    self.nodes[current].sons.insert(segment.to_string(), id);
                    id
                }
            };
        }
        current
    }

    /// Pure lookup: `None` as soon as one segment is missing
    pub fn get_from_path<S: AsRef<str>>(&self, path: &[S]) -> Option<NodeId> {
        path.iter()
            .try_fold(ROOT, |current, segment| self.nodes[current].son(segment.as_ref()))
    }

    /// Depth-first walk over every family, root first
    pub fn iter_all_nodes(&self) -> AllNodes<'_> {
        self.iter_subtree(ROOT)
    }

    /// Depth-first walk over `id` and all its descendants
    pub fn iter_subtree(&self, id: NodeId) -> AllNodes<'_> {
        AllNodes {
            tree: self,
            stack: vec![id],
        }
    }

    /// Ancestors of `id`, innermost first, root last
    pub fn iter_all_parents(&self, id: NodeId) -> Parents<'_> {
        Parents {
            tree: self,
            next: self.nodes[id].parent,
        }
    }

    /// `()` then every increasing prefix of `path`, the path itself included.
    /// With `include_root == false` the empty prefix is skipped.
    pub fn iter_upper_paths<S>(path: &[S], include_root: bool) -> impl Iterator<Item = &[S]> {
        let start = if include_root { 0 } else { 1 };
        (start..=path.len()).map(move |i| &path[..i])
    }

    /// Total number of items across all families
    pub fn item_count(&self) -> usize {
        self.nodes.iter().map(|n| n.attrs.items.len()).sum()
    }

    /// Children of `id` ordered by rank, then name
    pub fn sorted_sons(&self, id: NodeId) -> Vec<(&str, NodeId)> {
        let mut sons: Vec<(&str, NodeId)> = self.nodes[id]
            .sons
            .iter()
            .map(|(name, &son)| (name.as_str(), son))
            .collect();
        sons.sort_by(|a, b| {
            self.nodes[a.1]
                .attrs
                .rank
                .cmp(&self.nodes[b.1].attrs.rank)
                .then_with(|| a.0.cmp(b.0))
        });
        sons
    }

    /// Indented outline of the tree: `(position) name [items,children]`,
    /// and with `details` every item title under its family.
    pub fn prettify(&self, details: bool) -> String {
        let mut lines = Vec::new();
        self.prettify_node(ROOT, 1, "", "", details, &mut lines);
        lines.join("\n")
    }

    fn prettify_node(
        &self,
        id: NodeId,
        position: usize,
        name: &str,
        indent: &str,
        details: bool,
        lines: &mut Vec<String>,
    ) {
        let node = &self.nodes[id];
        lines.push(format!(
            "{}({}) {} [{},{}]",
            indent,
            position,
            name,
            node.attrs.items.len(),
            node.sons.len()
        ));

        let indent = format!("{}  ", indent);
        if details {
            for (i, item) in node.attrs.items.iter().enumerate() {
                lines.push(format!("{}  |{:2}| {}", indent, i + 1, item.title));
            }
        }

        for (i, (son_name, son)) in self.sorted_sons(id).into_iter().enumerate() {
            self.prettify_node(son, i + 1, son_name, &indent, details, lines);
        }
    }
}

impl Index<NodeId> for PathTree {
    type Output = TreeNode;

    fn index(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }
}

impl IndexMut<NodeId> for PathTree {
    fn index_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id]
    }
}

/// Lazy pre-order traversal yielding `(path, id)` pairs
pub struct AllNodes<'a> {
    tree: &'a PathTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for AllNodes<'a> {
    type Item = (&'a [String], NodeId);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = &self.tree.nodes[id];
        // Reversed so that sons come out in map order
        self.stack.extend(node.sons.values().rev().copied());
        Some((node.path.as_slice(), id))
    }
}

/// Lazy walk from a node's parent up to the root
pub struct Parents<'a> {
    tree: &'a PathTree,
    next: Option<NodeId>,
}

impl Iterator for Parents<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.tree.nodes[id].parent;
        Some(id)
    }
}
