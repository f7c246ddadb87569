use balanced_collections::{AvlCollection, Collection, RbtCollection};

fn fill(collection: &mut dyn Collection<i32, &'static str>) {
    collection.add(0, "zero");
    collection.add(1, "one");
    collection.add(2, "two");
    collection.add(2, "deux");
    collection.add(3, "three");
    collection.add(4, "four");
    collection.add(5, "five");
}

fn main() {
    let mut engines: Vec<(&str, Box<dyn Collection<i32, &'static str>>)> = vec![
        ("avl", Box::new(AvlCollection::<i32, &str>::new())),
        ("rbt", Box::new(RbtCollection::<i32, &str>::new())),
    ];

    for (name, collection) in &mut engines {
        fill(collection.as_mut());
        assert_eq!(collection.find(&2), Some(&"two"));
        assert_eq!(collection.remove(&1), Some("one"));
        assert!(collection.find(&1).is_none());

        let mut keys: Vec<i32> = Vec::new();
        collection.find_range(&2, &4, &mut keys);
        println!(
            "{name}: size {}, height {}, keys in [2, 4]: {keys:?}",
            collection.size(),
            collection.height()
        );
    }

    let avl: AvlCollection<_, _> = (0..5).map(|k| (k, k * k)).collect();
    for (k, v) in &avl {
        println!("{k} => {v}");
    }
}
