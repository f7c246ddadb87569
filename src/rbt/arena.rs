use std::ops::{Index, IndexMut, Not};

/// Stable handle of a node inside an [`Arena`].
pub(crate) type NodeId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Color {
    Red,
    Black,
}

/// Side of a child below its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Dir {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) color: Color,
    pub(crate) parent: Option<NodeId>,
    links: [Option<NodeId>; 2],
}

impl<K, V> Node<K, V> {
    pub(crate) fn new(key: K, value: V, parent: Option<NodeId>, color: Color) -> Self {
        Self {
            key,
            value,
            color,
            parent,
            links: [None, None],
        }
    }

    pub(crate) fn child(&self, dir: Dir) -> Option<NodeId> {
        self.links[dir as usize]
    }

    pub(crate) fn left(&self) -> Option<NodeId> {
        self.links[Dir::Left as usize]
    }

    pub(crate) fn right(&self) -> Option<NodeId> {
        self.links[Dir::Right as usize]
    }

    pub(crate) fn children(&self) -> [Option<NodeId>; 2] {
        self.links
    }
}

/// Node storage addressed by [`NodeId`].
///
/// Freed slots are recycled, so ids stay small and a clone of the arena is a
/// structurally identical, fully independent tree.
#[derive(Debug, Clone)]
pub(crate) struct Arena<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<NodeId>,
}

impl<K, V> Arena<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.slots[id as usize] = Some(node);
                id
            }
            None => {
                let id = slot_id(self.slots.len());
                self.slots.push(Some(node));
                id
            }
        }
    }

    /// Releases a node, handing back its contents. Links to it must already be gone.
    pub(crate) fn free(&mut self, id: NodeId) -> Node<K, V> {
        match self.slots[id as usize].take() {
            Some(node) => {
                self.free.push(id);
                node
            }
            None => panic!("node {id} freed twice"),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    /// Absent nodes count as black.
    pub(crate) fn is_red(&self, id: Option<NodeId>) -> bool {
        id.is_some_and(|id| self[id].color == Color::Red)
    }

    pub(crate) fn side_of(&self, parent: NodeId, child: NodeId) -> Dir {
        if self[parent].left() == Some(child) {
            Dir::Left
        } else {
            Dir::Right
        }
    }

    /// Links `child` below `parent` on the given side, fixing the back-reference.
    pub(crate) fn set_child(&mut self, parent: NodeId, dir: Dir, child: Option<NodeId>) {
        self[parent].links[dir as usize] = child;
        if let Some(child) = child {
            self[child].parent = Some(parent);
        }
    }

    /// Moves `x` down towards `dir`; its child on the opposite side takes its place.
    ///
    /// The former parent of `x`, if any, is relinked to the new top. Returns the new
    /// top, whose parent is `None` when `x` was the root.
    pub(crate) fn rotate(&mut self, x: NodeId, dir: Dir) -> NodeId {
        let Some(top) = self[x].child(!dir) else {
            return x;
        };
        let parent = self[x].parent;
        let inner = self[top].child(dir);

        self.set_child(x, !dir, inner);
        self.set_child(top, dir, Some(x));
        self[top].parent = parent;
        if let Some(parent) = parent {
            let side = self.side_of(parent, x);
            self[parent].links[side as usize] = Some(top);
        }
        top
    }
}

fn slot_id(index: usize) -> NodeId {
    match NodeId::try_from(index) {
        Ok(id) => id,
        Err(_) => panic!("arena holds at most {} nodes", u64::from(NodeId::MAX) + 1),
    }
}

impl<K, V> Index<NodeId> for Arena<K, V> {
    type Output = Node<K, V>;

    fn index(&self, id: NodeId) -> &Node<K, V> {
        match &self.slots[id as usize] {
            Some(node) => node,
            None => panic!("node {id} is not allocated"),
        }
    }
}

impl<K, V> IndexMut<NodeId> for Arena<K, V> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        match &mut self.slots[id as usize] {
            Some(node) => node,
            None => panic!("node {id} is not allocated"),
        }
    }
}
