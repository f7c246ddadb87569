use balanced_collections::{AvlCollection, RbtCollection};

fn main() {
    let mut avl = AvlCollection::new();
    let mut rbt = RbtCollection::new();
    for key in [50, 20, 80, 10, 30, 70, 90, 25, 35, 5] {
        avl.add(key, ());
        rbt.add(key, ());
    }

    println!("AVL tree:\n{}\n", avl.print());
    println!("Red-black tree:\n{}\n", rbt.print());

    for key in [50, 20, 5] {
        avl.remove(&key);
        rbt.remove(&key);
    }

    println!("AVL tree after removing 50, 20 and 5:\n{}\n", avl.print());
    println!("Red-black tree after removing 50, 20 and 5:\n{}", rbt.print());
}
