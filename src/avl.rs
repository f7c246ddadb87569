//! An ordered key-value collection backed by an AVL tree.

use std::cmp::{self, Ordering};
use std::fmt;
use std::iter::FromIterator;

use crate::collection::{Collection, Sequence};
use crate::error::InvariantViolation;
use crate::print::print_tree;

/// An ordered key-value collection implemented with an AVL tree.
///
/// Every node stores the height of its subtree. After each insertion or removal the
/// heights along the changed path are recomputed and rotations keep the heights of
/// sibling subtrees within one of each other.
///
/// ```
/// use balanced_collections::AvlCollection;
///
/// let mut avl = AvlCollection::new();
/// avl.add(5, "a");
/// avl.add(3, "b");
/// avl.add(8, "c");
/// assert_eq!(avl.find(&3), Some(&"b"));
///
/// let mut keys = Vec::new();
/// avl.find_range(&4, &8, &mut keys);
/// assert_eq!(keys, [5, 8]);
/// ```
#[derive(Clone)]
pub struct AvlCollection<K, V> {
    root: Link<K, V>,
    num_nodes: usize,
}

#[derive(Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
    height: usize,
}

type Link<K, V> = Option<Box<Node<K, V>>>;

/// An in-order iterator over the entries of an [`AvlCollection`].
pub struct Iter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
    remaining: usize,
}

impl<K: Ord, V> AvlCollection<K, V> {
    /// Creates an empty collection.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self {
            root: None,
            num_nodes: 0,
        }
    }

    /// Returns true if the collection contains no elements.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of elements in the collection.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns the height of the tree: 0 when empty, 1 for a single node.
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    /// Clears the collection, deallocating all nodes.
    pub fn clear(&mut self) {
        self.root = None;
        self.num_nodes = 0;
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn find(&self, key: &K) -> Option<&V> {
        self.find_node(key).map(|node| &node.value)
    }

    /// Returns references to the key-value pair corresponding to the key.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.find_node(key).map(|node| (&node.key, &node.value))
    }

    /// Returns true if the collection contains a value for the key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.find_node(key).is_some()
    }

    /// Inserts a key-value pair into the collection.
    /// Returns false, keeping the stored value, if the key was already present.
    pub fn add(&mut self, key: K, value: V) -> bool {
        let mut added = false;
        self.root = Some(Self::add_node(self.root.take(), key, value, &mut added));
        if added {
            self.num_nodes += 1;
        }
        #[cfg(feature = "consistency_check")]
        self.check_consistency();
        added
    }

    /// Removes a key from the collection.
    /// Returns the value at the key if the key was previously in the collection.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let mut removed = None;
        self.root = Self::remove_node(self.root.take(), key, &mut removed);
        if removed.is_some() {
            debug_assert!(self.num_nodes >= 1);
            self.num_nodes -= 1;
        }
        #[cfg(feature = "consistency_check")]
        self.check_consistency();
        removed
    }

    /// Appends every key in `[k1, k2]` to `keys` in ascending order.
    pub fn find_range<S>(&self, k1: &K, k2: &K, keys: &mut S)
    where
        K: Clone,
        S: Sequence<K> + ?Sized,
    {
        Self::find_range_node(&self.root, k1, k2, keys);
    }

    /// Appends all keys to `all_keys` in ascending order.
    pub fn keys<S>(&self, all_keys: &mut S)
    where
        K: Clone,
        S: Sequence<K> + ?Sized,
    {
        for (key, _) in self.iter() {
            all_keys.append(key.clone());
        }
    }

    /// Gets an iterator over the entries of the collection, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter {
            stack: Vec::with_capacity(self.height()),
            remaining: self.num_nodes,
        };
        iter.push_left_spine(self.root.as_deref());
        iter
    }

    /// Checks ordering, stored heights, AVL balance and the element count.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let mut num_nodes = 0;
        let mut prev_key = None;
        Self::validate_node(&self.root, &mut num_nodes, &mut prev_key)?;
        if num_nodes != self.num_nodes {
            return Err(InvariantViolation::SizeMismatch {
                counted: num_nodes,
                recorded: self.num_nodes,
            });
        }
        Ok(())
    }

    /// Renders the tree shape, one node per line with its height.
    pub fn print(&self) -> String
    where
        K: fmt::Debug,
    {
        print_tree(
            self.root.as_deref(),
            &|node: &Node<K, V>| format!("{:?} (h={})", node.key, node.height),
            &Node::children,
        )
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub(crate) fn check_consistency(&self) {
        if let Err(violation) = self.validate() {
            panic!("AVL tree is inconsistent: {violation}\n{}", self.debug_shape());
        }
    }

    #[cfg(any(test, feature = "consistency_check"))]
    fn debug_shape(&self) -> String {
        print_tree(
            self.root.as_deref(),
            &|node: &Node<K, V>| format!("(h={})", node.height),
            &Node::children,
        )
    }

    fn find_node(&self, key: &K) -> Option<&Node<K, V>> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(&node.key) {
                Ordering::Equal => return Some(node),
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            };
        }
        None
    }

    /// Inserts below `link` and returns the rebalanced subtree root.
    fn add_node(link: Link<K, V>, key: K, value: V, added: &mut bool) -> Box<Node<K, V>> {
        let mut node = match link {
            None => {
                *added = true;
                return Node::create(key, value);
            }
            Some(node) => node,
        };
        match key.cmp(&node.key) {
            Ordering::Equal => return node,
            Ordering::Less => node.left = Some(Self::add_node(node.left.take(), key, value, added)),
            Ordering::Greater => {
                node.right = Some(Self::add_node(node.right.take(), key, value, added))
            }
        }
        Self::rebalance_node(node)
    }

    /// Removes `key` below `link` and returns the rebalanced subtree root.
    fn remove_node(link: Link<K, V>, key: &K, removed: &mut Option<V>) -> Link<K, V> {
        let mut node = link?;
        match key.cmp(&node.key) {
            Ordering::Less => node.left = Self::remove_node(node.left.take(), key, removed),
            Ordering::Greater => node.right = Self::remove_node(node.right.take(), key, removed),
            Ordering::Equal => {
                let target = *node;
                *removed = Some(target.value);
                node = match (target.left, target.right) {
                    // Leaf or stem, the remaining child subtree is already balanced
                    (None, None) => return None,
                    (Some(child), None) | (None, Some(child)) => return Some(child),
                    (Some(left), Some(mut right)) if right.left.is_none() => {
                        // Right child takes over the left subtree
                        right.left = Some(left);
                        right
                    }
                    (Some(left), Some(right)) => {
                        // In-order successor takes the place of the removed node
                        let (rest, mut successor) = Self::take_min(right);
                        successor.left = Some(left);
                        successor.right = rest;
                        successor
                    }
                };
            }
        }
        Some(Self::rebalance_node(node))
    }

    /// Detaches the left-most node of a subtree.
    /// Returns the rebalanced remainder and the detached node.
    fn take_min(mut node: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
        match node.left.take() {
            None => (node.right.take(), node),
            Some(left) => {
                let (rest, min) = Self::take_min(left);
                node.left = rest;
                (Some(Self::rebalance_node(node)), min)
            }
        }
    }

    fn find_range_node<S>(link: &Link<K, V>, k1: &K, k2: &K, keys: &mut S)
    where
        K: Clone,
        S: Sequence<K> + ?Sized,
    {
        let Some(node) = link else {
            return;
        };
        if *k1 < node.key {
            Self::find_range_node(&node.left, k1, k2, keys);
        }
        if *k1 <= node.key && node.key <= *k2 {
            keys.append(node.key.clone());
        }
        if node.key < *k2 {
            Self::find_range_node(&node.right, k1, k2, keys);
        }
    }

    fn rotate_left(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
        match node.right.take() {
            None => node,
            Some(mut right) => {
                node.right = right.left.take();
                node.adjust_height();
                right.left = Some(node);
                right.adjust_height();
                right
            }
        }
    }

    fn rotate_right(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
        match node.left.take() {
            None => node,
            Some(mut left) => {
                node.left = left.right.take();
                node.adjust_height();
                left.right = Some(node);
                left.adjust_height();
                left
            }
        }
    }

    /// Restores AVL condition (balance) at given node if necessary and adjusts height.
    /// Resulting balance will be +1, 0 or -1 height difference between left and right subtree.
    /// Initial balance must not exceed +2 or -2, which always holds after a single update.
    /// Returns the new subtree root.
    fn rebalance_node(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
        let left_height = height(&node.left);
        let right_height = height(&node.right);
        debug_assert!(left_height <= right_height + 2);
        debug_assert!(right_height <= left_height + 2);
        if left_height > right_height + 1 {
            // Rebalance right, left-right case first turns the left child
            if let Some(left) = node.left.take() {
                node.left = Some(if height(&left.right) > height(&left.left) {
                    Self::rotate_left(left)
                } else {
                    left
                });
            }
            Self::rotate_right(node)
        } else if right_height > left_height + 1 {
            // Rebalance left, right-left case first turns the right child
            if let Some(right) = node.right.take() {
                node.right = Some(if height(&right.left) > height(&right.right) {
                    Self::rotate_right(right)
                } else {
                    right
                });
            }
            Self::rotate_left(node)
        } else {
            node.adjust_height();
            node
        }
    }

    /// Checks a subtree and returns its height.
    fn validate_node<'a>(
        link: &'a Link<K, V>,
        num_nodes: &mut usize,
        prev_key: &mut Option<&'a K>,
    ) -> Result<usize, InvariantViolation> {
        let Some(node) = link else {
            return Ok(0);
        };

        let left_height = Self::validate_node(&node.left, num_nodes, prev_key)?;
        if let Some(prev_key) = *prev_key {
            if *prev_key >= node.key {
                return Err(InvariantViolation::Unordered {
                    position: *num_nodes,
                });
            }
        }
        *prev_key = Some(&node.key);
        *num_nodes += 1;
        let right_height = Self::validate_node(&node.right, num_nodes, prev_key)?;

        let computed = 1 + cmp::max(left_height, right_height);
        if node.height != computed {
            return Err(InvariantViolation::HeightMismatch {
                stored: node.height,
                computed,
            });
        }
        if left_height > right_height + 1 || right_height > left_height + 1 {
            return Err(InvariantViolation::Unbalanced {
                left: left_height,
                right: right_height,
            });
        }
        Ok(computed)
    }
}

fn height<K, V>(link: &Link<K, V>) -> usize {
    link.as_ref().map_or(0, |node| node.height)
}

impl<K, V> Node<K, V> {
    fn create(key: K, value: V) -> Box<Self> {
        Box::new(Node {
            key,
            value,
            left: None,
            right: None,
            height: 1,
        })
    }

    fn children(&self) -> [Option<&Self>; 2] {
        [self.left.as_deref(), self.right.as_deref()]
    }

    fn adjust_height(&mut self) {
        self.height = 1 + cmp::max(height(&self.left), height(&self.right));
    }
}

impl<K: Ord, V> Collection<K, V> for AvlCollection<K, V>
where
    K: Clone,
{
    fn add(&mut self, key: K, value: V) -> bool {
        AvlCollection::add(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        AvlCollection::remove(self, key)
    }

    fn find(&self, key: &K) -> Option<&V> {
        AvlCollection::find(self, key)
    }

    fn find_range(&self, k1: &K, k2: &K, keys: &mut dyn Sequence<K>) {
        AvlCollection::find_range(self, k1, k2, keys)
    }

    fn keys(&self, all_keys: &mut dyn Sequence<K>) {
        AvlCollection::keys(self, all_keys)
    }

    fn size(&self) -> usize {
        self.len()
    }

    fn height(&self) -> usize {
        AvlCollection::height(self)
    }
}

impl<K: Ord, V> Default for AvlCollection<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + fmt::Debug, V: fmt::Debug> fmt::Debug for AvlCollection<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlCollection<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut avl = Self::new();
        avl.extend(iter);
        avl
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlCollection<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.add(key, value);
        }
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a AvlCollection<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> Iter<'a, K, V> {
    fn push_left_spine(&mut self, mut current: Option<&'a Node<K, V>>) {
        while let Some(node) = current {
            self.stack.push(node);
            current = node.left.as_deref();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

#[cfg(test)]
mod tests {
    use super::{AvlCollection, Node};
    use crate::InvariantViolation;

    #[test]
    fn test_rebalance() {
        {
            //     3 ->   2
            //    /      / \
            //   2      1   3
            //  /
            // 1
            let mut avl = AvlCollection::new();
            avl.add(3, ());
            avl.add(2, ());
            avl.add(1, ());
            avl.check_consistency();
            assert_eq!(avl.height(), 2);
        }
        {
            //     3   ->     3 ->   2
            //    / \        /      / \
            //   2   4      2      1   3
            //  /          /
            // 1          1
            let mut avl = AvlCollection::new();
            avl.add(3, ());
            avl.add(2, ());
            avl.add(4, ());
            avl.add(1, ());
            avl.check_consistency();
            assert_eq!(avl.height(), 3);
            avl.remove(&4);
            avl.check_consistency();
            assert_eq!(avl.height(), 2);
        }
        {
            //   3  ->   2
            //  /       / \
            // 1       1   3
            //  \
            //   2
            let mut avl = AvlCollection::new();
            avl.add(3, ());
            avl.add(1, ());
            avl.add(2, ());
            avl.check_consistency();
            assert_eq!(avl.height(), 2);
        }
        {
            //   3   ->   3  ->   2
            //  / \      /       / \
            // 1   4    1       1   3
            //  \        \
            //   2        2
            let mut avl = AvlCollection::new();
            avl.add(3, ());
            avl.add(1, ());
            avl.add(4, ());
            avl.add(2, ());
            avl.check_consistency();
            assert_eq!(avl.height(), 3);
            avl.remove(&4);
            avl.check_consistency();
            assert_eq!(avl.height(), 2);
        }
        {
            // 1 ->    2
            //  \     / \
            //   2   1   3
            //    \
            //     3
            let mut avl = AvlCollection::new();
            avl.add(1, ());
            avl.add(2, ());
            avl.add(3, ());
            avl.check_consistency();
            assert_eq!(avl.height(), 2);
        }
        {
            // 1   ->  2
            //  \     / \
            //   3   1   3
            //  /
            // 2
            let mut avl = AvlCollection::new();
            avl.add(1, ());
            avl.add(3, ());
            avl.add(2, ());
            avl.check_consistency();
            assert_eq!(avl.height(), 2);
        }
        {
            //   1   ->  1   ->  2
            //  / \       \     / \
            // 0   3       3   1   3
            //    /       /
            //   2       2
            let mut avl = AvlCollection::new();
            avl.add(1, ());
            avl.add(0, ());
            avl.add(3, ());
            avl.add(2, ());
            avl.check_consistency();
            assert_eq!(avl.height(), 3);
            avl.remove(&0);
            avl.check_consistency();
            assert_eq!(avl.height(), 2);
        }
    }

    #[test]
    fn test_remove_cases() {
        //       4
        //     /   \
        //    2     6
        //   / \   / \
        //  1   3 5   8
        //           /
        //          7
        let build = || -> AvlCollection<i32, i32> {
            [4, 2, 6, 1, 3, 5, 8, 7].iter().map(|&k| (k, k * 10)).collect()
        };

        // Leaf
        let mut avl = build();
        assert_eq!(avl.remove(&7), Some(70));
        avl.check_consistency();

        // Single child
        let mut avl = build();
        assert_eq!(avl.remove(&8), Some(80));
        avl.check_consistency();
        assert_eq!(avl.find(&7), Some(&70));

        // Two children, right child has no left child
        let mut avl = build();
        assert_eq!(avl.remove(&2), Some(20));
        avl.check_consistency();
        assert_eq!(avl.find(&3), Some(&30));

        // Two children, in-order successor deeper down
        let mut avl = build();
        assert_eq!(avl.remove(&6), Some(60));
        avl.check_consistency();
        assert_eq!(avl.find(&7), Some(&70));
        assert_eq!(avl.find(&5), Some(&50));

        // Root
        let mut avl = build();
        assert_eq!(avl.remove(&4), Some(40));
        avl.check_consistency();
        let mut keys = Vec::new();
        avl.keys(&mut keys);
        assert_eq!(keys, [1, 2, 3, 5, 6, 7, 8]);
    }

    #[test]
    fn test_add_duplicate_keeps_value() {
        let mut avl = AvlCollection::new();
        assert!(avl.add(1, "first"));
        assert!(!avl.add(1, "second"));
        assert_eq!(avl.len(), 1);
        assert_eq!(avl.find(&1), Some(&"first"));
        avl.check_consistency();
    }

    #[test]
    fn test_print() {
        let avl: AvlCollection<_, _> = (1..=3).map(|k| (k, ())).collect();
        assert_eq!(avl.print(), "2 (h=2)\n├─ 1 (h=1)\n└─ 3 (h=1)");
        assert_eq!(AvlCollection::<i32, ()>::new().print(), "∅");
    }

    #[test]
    fn test_iter_exact_size() {
        let avl: AvlCollection<_, _> = (0..10).map(|k| (k, k)).collect();
        let mut iter = avl.iter();
        assert_eq!(iter.len(), 10);
        iter.next();
        assert_eq!(iter.len(), 9);

        let avl: AvlCollection<_, _> = (0..2).map(|k| (k, k)).collect();
        assert_eq!(format!("{avl:?}"), "{0: 0, 1: 1}");
    }

    #[test]
    fn test_validate_height_mismatch() {
        let mut avl: AvlCollection<_, _> = (1..=3).map(|k| (k, ())).collect();
        assert_eq!(avl.validate(), Ok(()));
        if let Some(root) = avl.root.as_mut() {
            root.height = 5;
        }
        assert_eq!(
            avl.validate(),
            Err(InvariantViolation::HeightMismatch {
                stored: 5,
                computed: 2
            })
        );
    }

    #[test]
    fn test_validate_unbalanced() {
        // 1
        //  \
        //   2
        //    \
        //     3
        let mut middle = Node::create(2, ());
        middle.right = Some(Node::create(3, ()));
        middle.adjust_height();
        let mut root = Node::create(1, ());
        root.right = Some(middle);
        root.adjust_height();
        let avl = AvlCollection {
            root: Some(root),
            num_nodes: 3,
        };
        assert_eq!(
            avl.validate(),
            Err(InvariantViolation::Unbalanced { left: 0, right: 2 })
        );
    }

    #[test]
    fn test_validate_unordered() {
        let mut avl: AvlCollection<_, _> = (1..=3).map(|k| (k, ())).collect();
        if let Some(left) = avl.root.as_mut().and_then(|root| root.left.as_mut()) {
            left.key = 7;
        }
        assert_eq!(
            avl.validate(),
            Err(InvariantViolation::Unordered { position: 1 })
        );
    }

    #[test]
    fn test_validate_size_mismatch() {
        let mut avl: AvlCollection<_, _> = (1..=3).map(|k| (k, ())).collect();
        avl.num_nodes = 2;
        assert_eq!(
            avl.validate(),
            Err(InvariantViolation::SizeMismatch {
                counted: 3,
                recorded: 2
            })
        );
    }

    #[test]
    #[should_panic(expected = "AVL tree is inconsistent: subtree heights 0 and 2")]
    fn test_check_consistency_panics() {
        let mut avl = AvlCollection::new();
        avl.add(1, ());
        if let Some(root) = avl.root.as_mut() {
            root.right = Some(Node::create(2, ()));
            if let Some(right) = root.right.as_mut() {
                right.right = Some(Node::create(3, ()));
                right.adjust_height();
            }
            root.adjust_height();
        }
        avl.num_nodes = 3;
        avl.check_consistency();
    }
}
