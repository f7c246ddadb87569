//! Ordered key-value collections backed by self-balancing binary search trees.
//!
//! Two engines implement the same [`Collection`] contract:
//!
//! - [`AvlCollection`] keeps the heights of sibling subtrees within one of each other.
//! - [`RbtCollection`] colors nodes red or black so that every root-to-leaf path has
//!   the same number of black nodes and no red node has a red child.
//!
//! Both guarantee logarithmic height, so lookup, insertion and removal are `O(log n)`.
//! Range queries and key enumeration append keys in ascending order to any
//! [`Sequence`], such as a `Vec`.
//!
//! ```
//! use balanced_collections::{AvlCollection, Collection, RbtCollection};
//!
//! fn fill(collection: &mut dyn Collection<i32, &'static str>) {
//!     collection.add(5, "a");
//!     collection.add(3, "b");
//!     collection.add(8, "c");
//!     collection.add(1, "d");
//!     collection.add(4, "e");
//! }
//!
//! let mut avl: AvlCollection<i32, &str> = AvlCollection::new();
//! let mut rbt: RbtCollection<i32, &str> = RbtCollection::new();
//! fill(&mut avl);
//! fill(&mut rbt);
//!
//! let mut keys = Vec::new();
//! avl.find_range(&3, &8, &mut keys);
//! assert_eq!(keys, [3, 4, 5, 8]);
//! assert_eq!(rbt.find(&4), Some(&"e"));
//! assert!(rbt.find(&99).is_none());
//! ```

pub mod avl;
mod collection;
mod error;
mod print;
pub mod rbt;

pub use avl::AvlCollection;
pub use collection::{Collection, Sequence};
pub use error::InvariantViolation;
pub use rbt::RbtCollection;

#[cfg(test)]
mod proptests;
