//! An ordered key-value collection backed by a red-black tree.

mod arena;
mod balance;

use std::cmp::{self, Ordering};
use std::fmt;
use std::iter::FromIterator;
use std::mem;

use crate::collection::{Collection, Sequence};
use crate::error::InvariantViolation;
use crate::print::print_tree;

use arena::{Arena, Color, Dir, Node, NodeId};

/// An ordered key-value collection implemented with a red-black tree.
///
/// Nodes live in an arena and refer to their children and parent by index. Both
/// insertion and removal rebalance top-down, on the way from the root to the
/// affected leaf, so no second pass back up the tree is needed.
///
/// ```
/// use balanced_collections::RbtCollection;
///
/// let mut rbt = RbtCollection::new();
/// for key in [10, 20, 30, 40] {
///     rbt.add(key, key * 2);
///     assert!(rbt.valid());
/// }
/// assert_eq!(rbt.remove(&20), Some(40));
/// assert!(rbt.valid());
/// ```
#[derive(Clone)]
pub struct RbtCollection<K, V> {
    arena: Arena<K, V>,
    root: Option<NodeId>,
    num_nodes: usize,
}

/// An in-order iterator over the entries of an [`RbtCollection`].
pub struct Iter<'a, K, V> {
    arena: &'a Arena<K, V>,
    stack: Vec<NodeId>,
    remaining: usize,
}

impl<K: Ord, V> RbtCollection<K, V> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
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

    /// Returns the number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        self.subtree_height(self.root)
    }

    /// Returns the number of black nodes on every root-to-leaf path.
    pub fn black_height(&self) -> usize {
        let mut black_nodes = 0;
        let mut current = self.root;
        while let Some(id) = current {
            if self.arena[id].color == Color::Black {
                black_nodes += 1;
            }
            current = self.arena[id].left();
        }
        black_nodes
    }

    /// Clears the collection, releasing all nodes.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.num_nodes = 0;
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn find(&self, key: &K) -> Option<&V> {
        self.find_node(key).map(|id| &self.arena[id].value)
    }

    /// Returns references to the key-value pair corresponding to the key.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.find_node(key).map(|id| {
            let node = &self.arena[id];
            (&node.key, &node.value)
        })
    }

    /// Returns true if the collection contains a value for the key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.find_node(key).is_some()
    }

    /// Inserts a key-value pair into the collection.
    /// Returns false, leaving the tree untouched, if the key was already present.
    pub fn add(&mut self, key: K, value: V) -> bool {
        if self.contains_key(&key) {
            return false;
        }

        let Some(mut root) = self.root else {
            self.root = Some(self.arena.alloc(Node::new(key, value, None, Color::Black)));
            self.num_nodes = 1;
            return true;
        };

        // Split nodes with two red children on the way down
        let mut current = root;
        let (parent, dir) = loop {
            root = balance::split(&mut self.arena, root, current);
            let dir = if key < self.arena[current].key {
                Dir::Left
            } else {
                Dir::Right
            };
            match self.arena[current].child(dir) {
                Some(child) => current = child,
                None => break (current, dir),
            }
        };

        let id = self.arena.alloc(Node::new(key, value, Some(parent), Color::Red));
        self.arena.set_child(parent, dir, Some(id));
        root = balance::resolve_red_pair(&mut self.arena, root, id);
        self.arena[root].color = Color::Black;
        self.root = Some(root);
        self.num_nodes += 1;

        #[cfg(feature = "consistency_check")]
        self.check_consistency();
        true
    }

    /// Removes a key from the collection.
    /// Returns the value at the key if the key was previously in the collection.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let mut root = self.root?;
        if !self.contains_key(key) {
            return None;
        }

        // Descend past the key down to its in-order successor, making sure the
        // node finally unlinked is red or the root.
        let mut found = None;
        let mut last = root;
        loop {
            let dir = match key.cmp(&self.arena[last].key) {
                Ordering::Less => Dir::Left,
                Ordering::Equal => {
                    found = Some(last);
                    Dir::Right
                }
                Ordering::Greater => Dir::Right,
            };
            root = balance::push_red_down(&mut self.arena, root, last, dir);
            match self.arena[last].child(dir) {
                Some(child) => last = child,
                None => break,
            }
        }

        // Unlink the last node on the path, splicing in its only child
        let parent = self.arena[last].parent;
        let child = self.arena[last].left().or(self.arena[last].right());
        let mut new_root = Some(root);
        match parent {
            Some(parent) => {
                let side = self.arena.side_of(parent, last);
                self.arena.set_child(parent, side, child);
            }
            None => {
                if let Some(child) = child {
                    self.arena[child].parent = None;
                }
                new_root = child;
            }
        }
        let unlinked = self.arena.free(last);
        self.num_nodes -= 1;

        // Successor contents replace the removed entry
        debug_assert!(found.is_some());
        let removed = match found {
            Some(found) if found != last => {
                let node = &mut self.arena[found];
                node.key = unlinked.key;
                mem::replace(&mut node.value, unlinked.value)
            }
            _ => unlinked.value,
        };

        if let Some(root) = new_root {
            self.arena[root].color = Color::Black;
        }
        self.root = new_root;

        #[cfg(feature = "consistency_check")]
        self.check_consistency();
        Some(removed)
    }

    /// Appends every key in `[k1, k2]` to `keys` in ascending order.
    pub fn find_range<S>(&self, k1: &K, k2: &K, keys: &mut S)
    where
        K: Clone,
        S: Sequence<K> + ?Sized,
    {
        self.find_range_node(self.root, k1, k2, keys);
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
            arena: &self.arena,
            stack: Vec::new(),
            remaining: self.num_nodes,
        };
        iter.push_left_spine(self.root);
        iter
    }

    /// Returns true if the tree satisfies the red-black constraints.
    pub fn valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Checks ordering, parent links, the red-black coloring rules and the
    /// element count.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        if let Some(root) = self.root {
            if self.arena[root].color == Color::Red {
                return Err(InvariantViolation::RedRoot);
            }
            if self.arena[root].parent.is_some() {
                return Err(InvariantViolation::BrokenParentLink);
            }
        }

        let mut num_nodes = 0;
        let mut prev_key = None;
        self.validate_node(self.root, &mut num_nodes, &mut prev_key)?;
        if num_nodes != self.num_nodes {
            return Err(InvariantViolation::SizeMismatch {
                counted: num_nodes,
                recorded: self.num_nodes,
            });
        }
        Ok(())
    }

    /// Renders the tree shape, one node per line with its color.
    pub fn print(&self) -> String
    where
        K: fmt::Debug,
    {
        print_tree(
            self.root,
            &|id: NodeId| {
                let node = &self.arena[id];
                let color = match node.color {
                    Color::Red => "RED",
                    Color::Black => "BLACK",
                };
                format!("{:?} [{color}]", node.key)
            },
            &|id: NodeId| self.arena[id].children(),
        )
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub(crate) fn check_consistency(&self) {
        if let Err(violation) = self.validate() {
            panic!("red-black tree is inconsistent: {violation}\n{}", self.debug_shape());
        }
    }

    #[cfg(any(test, feature = "consistency_check"))]
    fn debug_shape(&self) -> String {
        print_tree(
            self.root,
            &|id: NodeId| {
                let node = &self.arena[id];
                let color = match node.color {
                    Color::Red => "R",
                    Color::Black => "B",
                };
                format!("#{id} {color} parent={:?}", node.parent)
            },
            &|id: NodeId| self.arena[id].children(),
        )
    }

    fn find_node(&self, key: &K) -> Option<NodeId> {
        let mut current = self.root;
        while let Some(id) = current {
            current = match key.cmp(&self.arena[id].key) {
                Ordering::Equal => return Some(id),
                Ordering::Less => self.arena[id].left(),
                Ordering::Greater => self.arena[id].right(),
            };
        }
        None
    }

    fn find_range_node<S>(&self, node: Option<NodeId>, k1: &K, k2: &K, keys: &mut S)
    where
        K: Clone,
        S: Sequence<K> + ?Sized,
    {
        let Some(id) = node else {
            return;
        };
        let node = &self.arena[id];
        if *k1 < node.key {
            self.find_range_node(node.left(), k1, k2, keys);
        }
        if *k1 <= node.key && node.key <= *k2 {
            keys.append(node.key.clone());
        }
        if node.key < *k2 {
            self.find_range_node(node.right(), k1, k2, keys);
        }
    }

    fn subtree_height(&self, node: Option<NodeId>) -> usize {
        match node {
            None => 0,
            Some(id) => {
                let node = &self.arena[id];
                1 + cmp::max(
                    self.subtree_height(node.left()),
                    self.subtree_height(node.right()),
                )
            }
        }
    }

    /// Checks a subtree and returns its black height, counting absent leaves as black.
    fn validate_node<'a>(
        &'a self,
        node: Option<NodeId>,
        num_nodes: &mut usize,
        prev_key: &mut Option<&'a K>,
    ) -> Result<usize, InvariantViolation> {
        let Some(id) = node else {
            return Ok(1);
        };
        let node = &self.arena[id];
        for child in node.children().into_iter().flatten() {
            if self.arena[child].parent != Some(id) {
                return Err(InvariantViolation::BrokenParentLink);
            }
            if node.color == Color::Red && self.arena[child].color == Color::Red {
                return Err(InvariantViolation::RedRed);
            }
        }

        let left = self.validate_node(node.left(), num_nodes, prev_key)?;
        if let Some(prev_key) = *prev_key {
            if *prev_key >= node.key {
                return Err(InvariantViolation::Unordered {
                    position: *num_nodes,
                });
            }
        }
        *prev_key = Some(&node.key);
        *num_nodes += 1;
        let right = self.validate_node(node.right(), num_nodes, prev_key)?;

        if left != right {
            return Err(InvariantViolation::BlackHeight { left, right });
        }
        Ok(match node.color {
            Color::Black => left + 1,
            Color::Red => left,
        })
    }
}

impl<K: Ord, V> Collection<K, V> for RbtCollection<K, V>
where
    K: Clone,
{
    fn add(&mut self, key: K, value: V) -> bool {
        RbtCollection::add(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        RbtCollection::remove(self, key)
    }

    fn find(&self, key: &K) -> Option<&V> {
        RbtCollection::find(self, key)
    }

    fn find_range(&self, k1: &K, k2: &K, keys: &mut dyn Sequence<K>) {
        RbtCollection::find_range(self, k1, k2, keys)
    }

    fn keys(&self, all_keys: &mut dyn Sequence<K>) {
        RbtCollection::keys(self, all_keys)
    }

    fn size(&self) -> usize {
        self.len()
    }

    fn height(&self) -> usize {
        RbtCollection::height(self)
    }
}

impl<K: Ord, V> Default for RbtCollection<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + fmt::Debug, V: fmt::Debug> fmt::Debug for RbtCollection<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for RbtCollection<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut rbt = Self::new();
        rbt.extend(iter);
        rbt
    }
}

impl<K: Ord, V> Extend<(K, V)> for RbtCollection<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.add(key, value);
        }
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a RbtCollection<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> Iter<'_, K, V> {
    fn push_left_spine(&mut self, mut current: Option<NodeId>) {
        while let Some(id) = current {
            self.stack.push(id);
            current = self.arena[id].left();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let arena: &'a Arena<K, V> = self.arena;
        let node = &arena[id];
        self.push_left_spine(node.right());
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
