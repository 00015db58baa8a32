use std::fs;
use textcluster::finalize::Finalizer;
use textcluster::index::{InvertedIndex, INDEX_FILE_NAME};
use textcluster::store::{is_temporary, ClusterStore, DirStore, MemoryStore};

#[test]
fn ranks_by_size_with_ties_in_creation_order() {
    let mut store = MemoryStore::new(1);
    let a = store.create().unwrap();
    let b = store.create().unwrap();
    let c = store.create().unwrap();
    store.append(&a, "a").unwrap();
    store.append(&b, "b1").unwrap();
    store.append(&b, "b2").unwrap();
    store.append(&c, "c").unwrap();

    let mut index = InvertedIndex::new();
    index.record("a", &a);
    index.record("b", &b);
    index.record("shared", &c);
    index.record("shared", &a);

    let done = Finalizer::new(1).rank(&mut store, index).unwrap();
    let ids: Vec<&str> = done.clusters.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["0", "1", "2"]);
    assert_eq!(done.id_map[&b], "0");
    assert_eq!(done.id_map[&a], "1");
    assert_eq!(done.id_map[&c], "2");
    assert_eq!(store.lines("0").unwrap().len(), 2);
    assert_eq!(done.index.lookup("shared"), ["2", "1"]);
    assert!(store.clusters().iter().all(|id| !is_temporary(id)));
}

#[test]
fn sizes_are_non_increasing_and_ids_dense() {
    let mut store = MemoryStore::new(2);
    let sizes = [1usize, 4, 2, 4, 3, 1];
    for n in sizes {
        let id = store.create().unwrap();
        for i in 0..n {
            store.append(&id, &format!("{id} {i}")).unwrap();
        }
    }
    let done = Finalizer::new(2).rank(&mut store, InvertedIndex::new()).unwrap();
    assert!(done.clusters.windows(2).all(|w| w[0].size >= w[1].size));
    for (rank, c) in done.clusters.iter().enumerate() {
        assert_eq!(c.id, format!("{rank:02}"));
        assert_eq!(store.size(&c.id), c.size);
    }
    assert_eq!(done.clusters.iter().map(|c| c.size).sum::<usize>(), sizes.iter().sum::<usize>());
}

#[test]
fn finalize_renames_files_and_persists_index() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DirStore::open(dir.path(), 3).unwrap();
    let small = store.create().unwrap();
    let big = store.create().unwrap();
    store.append(&small, "one").unwrap();
    store.append(&big, "two a").unwrap();
    store.append(&big, "two b").unwrap();
    let mut index = InvertedIndex::new();
    index.record("one", &small);
    index.record("two", &big);

    let (done, path) = Finalizer::new(3).finalize(&mut store, index, dir.path()).unwrap();
    assert_eq!(path, dir.path().join(INDEX_FILE_NAME));
    assert_eq!(fs::read_to_string(dir.path().join("000")).unwrap(), "two a\ntwo b\n");
    assert_eq!(fs::read_to_string(dir.path().join("001")).unwrap(), "one\n");
    assert!(!dir.path().join(&small).exists());

    let loaded = InvertedIndex::load(&path).unwrap();
    assert_eq!(loaded, done.index);
    assert_eq!(loaded.lookup("two"), ["000"]);
    assert_eq!(loaded.lookup("one"), ["001"]);
    let known = store.clusters();
    assert!(loaded.referenced_clusters().iter().all(|id| known.iter().any(|k| k == id)));
}
