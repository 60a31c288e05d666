//! Category and product-type hierarchies.
//!
//! Categories carry nested-set numbering so that a single ordered scan returns the whole forest
//! depth-first with siblings sorted by name.  The write path renumbers after every category
//! insert or update with [`number_forest`]; both hierarchies refuse parents that would close a
//! loop ([`creates_cycle`]).

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Nested-set coordinates of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreePosition {
    /// 1-based index of the root this node descends from, roots ordered by name.
    pub tree_id: i32,
    /// Left bound; smaller than every descendant's bound.
    pub lft: i32,
    /// Right bound; larger than every descendant's bound.
    pub rght: i32,
    /// Depth below the root (roots are 0).
    pub level: i32,
}

/// A node handed to [`number_forest`].
#[derive(Debug, Clone, Copy)]
pub struct TreeNode<'a, I> {
    /// Node id.
    pub id: I,
    /// Parent id; `None` for a root.
    pub parent: Option<I>,
    /// Sort key among siblings.
    pub name: &'a str,
}

/// Computes nested-set coordinates for every node.
///
/// Roots and siblings are ordered by name, ties broken by id.  A node whose parent is not among
/// `nodes` is numbered as a root.
pub fn number_forest<I>(nodes: &[TreeNode<'_, I>]) -> HashMap<I, TreePosition>
where
    I: Copy + Eq + Hash + Ord,
{
    let known: HashSet<I> = nodes.iter().map(|node| node.id).collect();
    let mut roots = Vec::new();
    let mut children: HashMap<I, Vec<(&str, I)>> = HashMap::new();
    for node in nodes {
        match node.parent {
            Some(parent) if known.contains(&parent) && parent != node.id => {
                children.entry(parent).or_default().push((node.name, node.id));
            }
            _ => roots.push((node.name, node.id)),
        }
    }
    roots.sort();
    for siblings in children.values_mut() {
        siblings.sort();
    }

    let mut positions = HashMap::with_capacity(nodes.len());
    for (index, (_, root)) in roots.iter().enumerate() {
        let tree_id = index as i32 + 1;
        let mut counter = 1;
        // (node, level, children already visited)
        let mut stack = vec![(*root, 0, false)];
        let mut lefts = HashMap::new();
        while let Some((id, level, visited)) = stack.pop() {
            if visited {
                let lft = lefts.get(&id).copied().unwrap_or(counter);
                positions.insert(
                    id,
                    TreePosition {
                        tree_id,
                        lft,
                        rght: counter,
                        level,
                    },
                );
                counter += 1;
                continue;
            }
            if positions.contains_key(&id) || lefts.contains_key(&id) {
                continue;
            }
            lefts.insert(id, counter);
            counter += 1;
            stack.push((id, level, true));
            if let Some(kids) = children.get(&id) {
                for (_, child) in kids.iter().rev() {
                    stack.push((*child, level + 1, false));
                }
            }
        }
    }
    positions
}

/// Returns true when making `new_parent` the parent of `id` would close a loop.
///
/// `parent_of` looks up the current parent of a node.
pub fn creates_cycle<I, F>(id: I, new_parent: Option<I>, parent_of: F) -> bool
where
    I: Copy + Eq + Hash,
    F: Fn(I) -> Option<I>,
{
    let mut seen = HashSet::new();
    let mut cursor = new_parent;
    while let Some(node) = cursor {
        if node == id {
            return true;
        }
        if !seen.insert(node) {
            // an existing loop that does not pass through `id`
            return false;
        }
        cursor = parent_of(node);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i64, parent: Option<i64>, name: &str) -> TreeNode<'_, i64> {
        TreeNode { id, parent, name }
    }

    #[test]
    fn single_root() {
        let positions = number_forest(&[node(1, None, "Shoes")]);
        assert_eq!(
            positions[&1],
            TreePosition {
                tree_id: 1,
                lft: 1,
                rght: 2,
                level: 0
            }
        );
    }

    #[test]
    fn roots_are_trees_ordered_by_name() {
        let positions = number_forest(&[node(1, None, "Shoes"), node(2, None, "Bags")]);
        assert_eq!(positions[&2].tree_id, 1);
        assert_eq!(positions[&1].tree_id, 2);
    }

    #[test]
    fn children_nest_inside_their_parent_by_name() {
        let nodes = [
            node(1, None, "Clothing"),
            node(2, Some(1), "Shirts"),
            node(3, Some(1), "Jackets"),
            node(4, Some(3), "Rain"),
        ];
        let positions = number_forest(&nodes);
        let root = positions[&1];
        let shirts = positions[&2];
        let jackets = positions[&3];
        let rain = positions[&4];

        assert_eq!((root.lft, root.rght), (1, 8));
        assert_eq!((jackets.lft, jackets.rght, jackets.level), (2, 5, 1));
        assert_eq!((rain.lft, rain.rght, rain.level), (3, 4, 2));
        assert_eq!((shirts.lft, shirts.rght, shirts.level), (6, 7, 1));
    }

    #[test]
    fn orphans_become_roots() {
        let positions = number_forest(&[node(5, Some(99), "Lost")]);
        assert_eq!(positions[&5].level, 0);
        assert_eq!(positions[&5].tree_id, 1);
    }

    #[test]
    fn cycles() {
        let parents: HashMap<i64, i64> = [(2, 1), (3, 2)].into_iter().collect();
        let parent_of = |id: i64| parents.get(&id).copied();
        assert!(creates_cycle(1, Some(3), parent_of));
        assert!(creates_cycle(1, Some(1), parent_of));
        assert!(!creates_cycle(3, Some(1), parent_of));
        assert!(!creates_cycle(1, None, parent_of));
    }
}
