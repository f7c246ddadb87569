//! Top-down rebalancing steps of the red-black tree.
//!
//! Every step takes the current root and returns the root afterwards, which differs
//! only when a rotation lifted a new node to the top.

use super::arena::{Arena, Color, Dir, NodeId};

fn root_after<K, V>(arena: &Arena<K, V>, root: NodeId, top: NodeId) -> NodeId {
    if arena[top].parent.is_none() {
        top
    } else {
        root
    }
}

/// Splits a node with two red children on the way down an insertion.
///
/// The node turns red and its children black, leaving black height unchanged. A
/// resulting red pair with the parent is repaired right away.
pub(crate) fn split<K, V>(arena: &mut Arena<K, V>, root: NodeId, x: NodeId) -> NodeId {
    let [left, right] = arena[x].children();
    if arena[x].color == Color::Black && arena.is_red(left) && arena.is_red(right) {
        arena[x].color = Color::Red;
        if let (Some(left), Some(right)) = (left, right) {
            arena[left].color = Color::Black;
            arena[right].color = Color::Black;
        }
    }
    resolve_red_pair(arena, root, x)
}

/// Repairs a red node `x` below a red parent by rotating around the grandparent.
///
/// The splits done on the way down guarantee that the parent's sibling is black, so
/// one rotation (outside grandchild) or two (inside grandchild) always suffice.
pub(crate) fn resolve_red_pair<K, V>(arena: &mut Arena<K, V>, root: NodeId, x: NodeId) -> NodeId {
    let Some(p) = arena[x].parent else {
        arena[x].color = Color::Black;
        return root;
    };
    if arena[x].color == Color::Black || arena[p].color == Color::Black {
        return root;
    }
    let Some(g) = arena[p].parent else {
        arena[p].color = Color::Black;
        return root;
    };

    let p_side = arena.side_of(g, p);
    let top = if arena.side_of(p, x) == p_side {
        arena.rotate(g, !p_side)
    } else {
        arena.rotate(p, p_side);
        arena.rotate(g, !p_side)
    };
    arena[top].color = Color::Black;
    arena[g].color = Color::Red;
    root_after(arena, root, top)
}

/// Makes sure the next node on a removal path can lose a black node.
///
/// Applied to every node `q` on the way down, `dir` being the side the descent
/// continues on. Afterwards `q` is red, or the root, or has a red child on `dir`.
pub(crate) fn push_red_down<K, V>(
    arena: &mut Arena<K, V>,
    root: NodeId,
    q: NodeId,
    dir: Dir,
) -> NodeId {
    if arena.is_red(Some(q)) || arena.is_red(arena[q].child(dir)) {
        return root;
    }

    if arena.is_red(arena[q].child(!dir)) {
        // Red child off the path: rotate it above q
        let top = arena.rotate(q, dir);
        arena[q].color = Color::Red;
        arena[top].color = Color::Black;
        return root_after(arena, root, top);
    }

    let Some(p) = arena[q].parent else {
        return root;
    };
    let last = arena.side_of(p, q);
    let Some(t) = arena[p].child(!last) else {
        return root;
    };

    let outer = arena[t].child(!last);
    let inner = arena[t].child(last);
    if !arena.is_red(outer) && !arena.is_red(inner) {
        // Sibling has no red child: color flip
        arena[p].color = Color::Black;
        arena[t].color = Color::Red;
        arena[q].color = Color::Red;
        return root;
    }

    let top = if arena.is_red(inner) {
        arena.rotate(t, !last);
        arena.rotate(p, last)
    } else {
        arena.rotate(p, last)
    };
    arena[q].color = Color::Red;
    arena[top].color = Color::Red;
    for child in arena[top].children().into_iter().flatten() {
        arena[child].color = Color::Black;
    }
    root_after(arena, root, top)
}
