//! Thread ordering by most recent activity.

use super::clock::Timestamp;
use super::tree::{ContentNode, Forest};

/// A node paired with the latest date found in its subtree.
#[derive(Debug)]
pub struct Ranked<'a, T> {
    pub node: &'a ContentNode<T>,
    pub recency: Timestamp,
}

/// Latest date among `node` and all of its descendants.
pub fn recency<T>(forest: &Forest<T>, node: &ContentNode<T>) -> Timestamp {
    forest
        .descendants(node.id())
        .iter()
        .map(|d| d.date())
        .fold(node.date(), Timestamp::max)
}

/// Rank `roots` by subtree recency, most recently active first.
///
/// Equal recency falls back to the newer own date, then to the smaller id,
/// so the result does not depend on the input order.
pub fn rank_by_recency<'a, T, I>(forest: &'a Forest<T>, roots: I) -> Vec<Ranked<'a, T>>
where
    I: IntoIterator<Item = &'a ContentNode<T>>,
{
    let mut ranked: Vec<Ranked<'a, T>> = roots
        .into_iter()
        .map(|node| Ranked {
            node,
            recency: recency(forest, node),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.recency
            .cmp(&a.recency)
            .then_with(|| b.node.date().cmp(&a.node.date()))
            .then_with(|| a.node.id().cmp(b.node.id()))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids<T>(nodes: &[&ContentNode<T>]) -> Vec<String> {
        nodes.iter().map(|n| n.id().to_string()).collect()
    }

    fn ordered<'a, T>(
        forest: &'a Forest<T>,
        roots: impl IntoIterator<Item = &'a ContentNode<T>>,
    ) -> Vec<&'a ContentNode<T>> {
        rank_by_recency(forest, roots)
            .into_iter()
            .map(|ranked| ranked.node)
            .collect()
    }

    #[test]
    fn test_recency_without_descendants_is_own_date() {
        let mut forest = Forest::new();
        forest.insert("solo", None, 42, ()).unwrap();
        assert_eq!(recency(&forest, forest.get("solo").unwrap()), 42);
    }

    #[test]
    fn test_later_child_lifts_root() {
        let mut forest = Forest::new();
        forest.insert("old", None, 10, ()).unwrap();
        forest.insert("new", None, 20, ()).unwrap();
        forest.insert("reply", Some("old"), 30, ()).unwrap();

        let old = forest.get("old").unwrap();
        assert_eq!(recency(&forest, old), 30);

        let ordered = ordered(&forest, forest.roots());
        assert_eq!(ids(&ordered), vec!["old", "new"]);
    }

    #[test]
    fn test_deep_descendant_counts() {
        let mut forest = Forest::new();
        forest.insert("a", None, 1, ()).unwrap();
        forest.insert("b", None, 5, ()).unwrap();
        forest.insert("a1", Some("a"), 2, ()).unwrap();
        forest.insert("a11", Some("a1"), 3, ()).unwrap();
        forest.insert("a111", Some("a11"), 9, ()).unwrap();

        let ranked = rank_by_recency(&forest, forest.roots());
        assert_eq!(ranked[0].node.id(), "a");
        assert_eq!(ranked[0].recency, 9);
        assert_eq!(ranked[1].node.id(), "b");
        assert_eq!(ranked[1].recency, 5);
    }

    #[test]
    fn test_tie_break_prefers_newer_root_then_id() {
        let mut forest = Forest::new();
        forest.insert("x", None, 1, ()).unwrap();
        forest.insert("y", None, 3, ()).unwrap();
        forest.insert("b", None, 2, ()).unwrap();
        forest.insert("a", None, 2, ()).unwrap();
        forest.insert("x1", Some("x"), 7, ()).unwrap();
        forest.insert("y1", Some("y"), 7, ()).unwrap();
        forest.insert("b1", Some("b"), 7, ()).unwrap();
        forest.insert("a1", Some("a"), 7, ()).unwrap();

        let first = ordered(&forest, forest.roots());
        assert_eq!(ids(&first), vec!["y", "a", "b", "x"]);

        let mut reversed = forest.roots();
        reversed.reverse();
        assert_eq!(ids(&ordered(&forest, reversed)), vec!["y", "a", "b", "x"]);
    }

    #[test]
    fn test_ordering_twice_is_stable() {
        let mut forest = Forest::new();
        for (i, id) in ["p", "q", "r", "s"].iter().enumerate() {
            forest.insert(*id, None, i as Timestamp, ()).unwrap();
        }
        forest.insert("p1", Some("p"), 10, ()).unwrap();
        forest.insert("r1", Some("r"), 10, ()).unwrap();

        let once = ordered(&forest, forest.roots());
        let twice = ordered(&forest, once.clone());
        assert_eq!(ids(&once), ids(&twice));
        assert_eq!(ids(&once), vec!["r", "p", "s", "q"]);
    }

    #[test]
    fn test_empty_input() {
        let forest: Forest<()> = Forest::new();
        assert!(ordered(&forest, forest.roots()).is_empty());
    }
}
