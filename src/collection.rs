use std::collections::VecDeque;

/// An append-only output buffer the collections write keys into.
///
/// Range queries and key enumeration only ever call [`append`](Sequence::append),
/// in ascending key order. The indexed read and length accessors are for the
/// caller that owns the buffer.
pub trait Sequence<T> {
    /// Appends an item at the end of the sequence.
    fn append(&mut self, item: T);

    /// Returns the item at `index`, if any.
    fn get(&self, index: usize) -> Option<&T>;

    /// Returns the number of items in the sequence.
    fn len(&self) -> usize;

    /// Returns true if the sequence holds no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Sequence<T> for Vec<T> {
    fn append(&mut self, item: T) {
        self.push(item);
    }

    fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }
}

impl<T> Sequence<T> for VecDeque<T> {
    fn append(&mut self, item: T) {
        self.push_back(item);
    }

    fn get(&self, index: usize) -> Option<&T> {
        VecDeque::get(self, index)
    }

    fn len(&self) -> usize {
        VecDeque::len(self)
    }
}

/// The operation set shared by every tree engine.
///
/// Callers holding a `Box<dyn Collection<K, V>>` do not need to know which
/// balancing strategy backs the instance.
///
/// ```
/// use balanced_collections::{AvlCollection, Collection, RbtCollection};
///
/// let engines: Vec<Box<dyn Collection<i32, &str>>> = vec![
///     Box::new(AvlCollection::<i32, &str>::new()),
///     Box::new(RbtCollection::<i32, &str>::new()),
/// ];
/// for mut engine in engines {
///     engine.add(2, "two");
///     engine.add(1, "one");
///     let mut keys: Vec<i32> = Vec::new();
///     engine.keys(&mut keys);
///     assert_eq!(keys, [1, 2]);
/// }
/// ```
pub trait Collection<K, V> {
    /// Inserts a key-value pair.
    /// Returns false and leaves the stored value untouched if the key is already present.
    fn add(&mut self, key: K, value: V) -> bool;

    /// Removes a key, returning its value if it was present.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Returns a reference to the value stored for the key.
    fn find(&self, key: &K) -> Option<&V>;

    /// Appends every key `k` with `k1 <= k <= k2` to `keys`, in ascending order.
    fn find_range(&self, k1: &K, k2: &K, keys: &mut dyn Sequence<K>);

    /// Appends all keys to `all_keys`, in ascending order.
    fn keys(&self, all_keys: &mut dyn Sequence<K>);

    /// Appends all keys to `all_keys_sorted`, in ascending order.
    ///
    /// In-order traversal of a search tree is already sorted, so this is the same as
    /// [`keys`](Collection::keys).
    fn sorted_keys(&self, all_keys_sorted: &mut dyn Sequence<K>) {
        self.keys(all_keys_sorted);
    }

    /// Returns the number of stored key-value pairs.
    fn size(&self) -> usize;

    /// Returns the height of the tree, 0 when empty.
    fn height(&self) -> usize;
}
