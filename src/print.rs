/// Prints a binary tree, one node per line, with box-drawing branches.
///
/// `label` renders a single node, `children` returns its left and right child.
/// A missing child is shown as `∅` when its sibling exists; leaves print no branches.
pub(crate) fn print_tree<N, L, C>(node: Option<N>, label: &L, children: &C) -> String
where
    N: Copy,
    L: Fn(N) -> String,
    C: Fn(N) -> [Option<N>; 2],
{
    let mut out = String::new();
    match node {
        None => out.push('∅'),
        Some(node) => {
            out.push_str(&label(node));
            print_children(&mut out, "", node, label, children);
        }
    }
    out
}

fn print_children<N, L, C>(out: &mut String, tab: &str, node: N, label: &L, children: &C)
where
    N: Copy,
    L: Fn(N) -> String,
    C: Fn(N) -> [Option<N>; 2],
{
    let kids = children(node);
    if kids.iter().all(Option::is_none) {
        return;
    }

    for (i, child) in kids.iter().enumerate() {
        let is_last = i == kids.len() - 1;
        out.push('\n');
        out.push_str(tab);
        out.push_str(if is_last { "└─ " } else { "├─ " });
        match *child {
            None => out.push('∅'),
            Some(child) => {
                out.push_str(&label(child));
                let child_tab = format!("{tab}{}  ", if is_last { " " } else { "│" });
                print_children(out, &child_tab, child, label, children);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::print_tree;

    // Nodes are indices into a heap-ordered array; 0 means absent.
    fn children(heap: &[u8]) -> impl Fn(usize) -> [Option<usize>; 2] + '_ {
        move |i| {
            let child = |j: usize| (j < heap.len() && heap[j] != 0).then_some(j);
            [child(2 * i + 1), child(2 * i + 2)]
        }
    }

    #[test]
    fn test_print_empty() {
        let heap: [u8; 0] = [];
        assert_eq!(print_tree(None, &|i: usize| heap[i].to_string(), &children(&heap)), "∅");
    }

    #[test]
    fn test_print_tree() {
        let heap = [2, 1, 4, 0, 0, 3, 0];
        let printed = print_tree(Some(0), &|i: usize| heap[i].to_string(), &children(&heap));
        assert_eq!(printed, "2\n├─ 1\n└─ 4\n   ├─ 3\n   └─ ∅");
    }
}
