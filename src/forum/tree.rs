//! Hierarchical post model.
//!
//! Posts live in a flat arena keyed by id. Each node stores its parent id and
//! the ids of its children in creation order. Nodes can only be appended
//! under a parent that already exists, so the arena is always a forest.

use std::collections::HashMap;

use super::clock::Timestamp;

/// One post (thread root or reply) and its links.
#[derive(Debug, Clone)]
pub struct ContentNode<T> {
    id: String,
    parent: Option<String>,
    children: Vec<String>,
    date: Timestamp,
    data: T,
}

impl<T> ContentNode<T> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> Timestamp {
        self.date
    }

    pub fn data(&self) -> &T {
        &self.data
    }
}

/// Reasons a node cannot be attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForestError {
    DuplicateId(String),
    UnknownParent { id: String, parent: String },
}

impl std::fmt::Display for ForestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForestError::DuplicateId(id) => write!(f, "post {} already exists", id),
            ForestError::UnknownParent { id, parent } => {
                write!(f, "post {} references unknown parent {}", id, parent)
            }
        }
    }
}

impl std::error::Error for ForestError {}

/// Arena of content nodes.
#[derive(Debug, Clone)]
pub struct Forest<T> {
    nodes: HashMap<String, ContentNode<T>>,
    roots: Vec<String>,
}

impl<T> Default for Forest<T> {
    fn default() -> Self {
        Self {
            nodes: HashMap::new(),
            roots: Vec::new(),
        }
    }
}

impl<T> Forest<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Append a node. Roots go to the end of the root list, replies to the
    /// end of their parent's children.
    pub fn insert(
        &mut self,
        id: impl Into<String>,
        parent: Option<&str>,
        date: Timestamp,
        data: T,
    ) -> Result<(), ForestError> {
        let id = id.into();
        if self.nodes.contains_key(&id) {
            return Err(ForestError::DuplicateId(id));
        }

        match parent {
            Some(parent_id) => {
                let parent_node =
                    self.nodes
                        .get_mut(parent_id)
                        .ok_or_else(|| ForestError::UnknownParent {
                            id: id.clone(),
                            parent: parent_id.to_string(),
                        })?;
                parent_node.children.push(id.clone());
            }
            None => self.roots.push(id.clone()),
        }

        self.nodes.insert(
            id.clone(),
            ContentNode {
                id,
                parent: parent.map(str::to_string),
                children: Vec::new(),
                date,
                data,
            },
        );
        Ok(())
    }

    /// Look a node up by id.
    pub fn get(&self, id: &str) -> Option<&ContentNode<T>> {
        self.nodes.get(id)
    }

    /// Thread roots in insertion order.
    pub fn roots(&self) -> Vec<&ContentNode<T>> {
        self.roots.iter().filter_map(|id| self.nodes.get(id)).collect()
    }

    /// Every node below `id`, depth-first pre-order, children in stored order.
    /// The node itself is not included; unknown ids yield nothing.
    pub fn descendants(&self, id: &str) -> Vec<&ContentNode<T>> {
        let mut out = Vec::new();
        let Some(start) = self.nodes.get(id) else {
            return out;
        };

        let mut stack: Vec<&str> = start.children.iter().rev().map(String::as_str).collect();
        while let Some(next) = stack.pop() {
            let Some(node) = self.nodes.get(next) else {
                continue;
            };
            out.push(node);
            stack.extend(node.children.iter().rev().map(String::as_str));
            debug_assert!(out.len() <= self.nodes.len(), "cycle in content forest");
        }
        out
    }

    /// Number of ancestors of `id` (0 for roots and unknown ids).
    pub fn depth(&self, id: &str) -> usize {
        let mut depth = 0;
        let mut current = self.nodes.get(id).and_then(|n| n.parent.as_deref());
        while let Some(parent) = current {
            depth += 1;
            current = self.nodes.get(parent).and_then(|n| n.parent.as_deref());
        }
        depth
    }

    /// Thread root that `id` belongs to.
    pub fn root_of(&self, id: &str) -> Option<&ContentNode<T>> {
        let mut node = self.nodes.get(id)?;
        while let Some(parent) = node.parent.as_deref() {
            node = self.nodes.get(parent)?;
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// ```text
    /// a ─┬─ a1 ─── a1x
    ///    └─ a2
    /// b
    /// c ─── c1
    /// ```
    fn sample() -> Forest<()> {
        let mut forest = Forest::new();
        forest.insert("a", None, 1, ()).unwrap();
        forest.insert("b", None, 2, ()).unwrap();
        forest.insert("a1", Some("a"), 3, ()).unwrap();
        forest.insert("c", None, 4, ()).unwrap();
        forest.insert("a2", Some("a"), 5, ()).unwrap();
        forest.insert("a1x", Some("a1"), 6, ()).unwrap();
        forest.insert("c1", Some("c"), 7, ()).unwrap();
        forest
    }

    fn ids<T>(nodes: &[&ContentNode<T>]) -> Vec<String> {
        nodes.iter().map(|n| n.id().to_string()).collect()
    }

    #[test]
    fn test_descendants_pre_order() {
        let forest = sample();
        assert_eq!(ids(&forest.descendants("a")), vec!["a1", "a1x", "a2"]);
        assert_eq!(ids(&forest.descendants("c")), vec!["c1"]);
    }

    #[test]
    fn test_descendants_of_leaf_is_empty() {
        let forest = sample();
        assert!(forest.descendants("b").is_empty());
        assert!(forest.descendants("a1x").is_empty());
        assert!(forest.descendants("missing").is_empty());
    }

    #[test]
    fn test_roots_keep_insertion_order() {
        let forest = sample();
        assert_eq!(ids(&forest.roots()), vec!["a", "b", "c"]);
        assert!(forest.roots().iter().all(|r| r.parent.is_none()));
    }

    #[test]
    fn test_flattening_covers_forest_without_duplicates() {
        let forest = sample();
        let mut seen = HashSet::new();
        let mut total = 0;

        for root in forest.roots() {
            assert!(seen.insert(root.id().to_string()));
            total += 1;
            for node in forest.descendants(root.id()) {
                assert_ne!(node.id(), root.id());
                assert!(seen.insert(node.id().to_string()), "duplicate {}", node.id());
                total += 1;
            }
        }

        assert_eq!(total, forest.len());
    }

    #[test]
    fn test_insert_rejects_unknown_parent() {
        let mut forest = sample();
        let err = forest.insert("x", Some("nope"), 9, ()).unwrap_err();
        assert_eq!(
            err,
            ForestError::UnknownParent {
                id: "x".to_string(),
                parent: "nope".to_string()
            }
        );
        assert!(forest.get("x").is_none());
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let mut forest = sample();
        let err = forest.insert("a1", Some("b"), 9, ()).unwrap_err();
        assert_eq!(err, ForestError::DuplicateId("a1".to_string()));
        assert!(forest.get("b").unwrap().children.is_empty());
    }

    #[test]
    fn test_depth_and_root_of() {
        let forest = sample();
        assert_eq!(forest.depth("a"), 0);
        assert_eq!(forest.depth("a1"), 1);
        assert_eq!(forest.depth("a1x"), 2);
        assert_eq!(forest.root_of("a1x").unwrap().id(), "a");
        assert_eq!(forest.get("a1x").unwrap().parent.as_deref(), Some("a1"));
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let mut forest = Forest::new();
        forest.insert("0", None, 0, ()).unwrap();
        for i in 1..50_000 {
            let parent = (i - 1).to_string();
            forest.insert(i.to_string(), Some(parent.as_str()), i, ()).unwrap();
        }
        assert_eq!(forest.descendants("0").len(), 49_999);
    }
}
