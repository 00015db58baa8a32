use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use textcluster::error::{ClusterError, StorageOp};
use textcluster::store::{count_lines, is_temporary, ClusterStore, DirStore, MemoryStore};

#[test]
fn creates_sequential_temporary_clusters() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DirStore::open(dir.path(), 3).unwrap();
    let a = store.create().unwrap();
    let b = store.create().unwrap();
    assert_eq!(a, "tmp000");
    assert_eq!(b, "tmp001");
    assert!(is_temporary(&a));
    assert!(dir.path().join("tmp000").is_file());
    assert_eq!(store.clusters(), vec![a, b]);
}

#[test]
fn append_writes_lines_and_counts() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DirStore::open(dir.path(), 2).unwrap();
    let id = store.create().unwrap();
    store.append(&id, "first line").unwrap();
    store.append(&id, "second line\twith payload").unwrap();
    assert_eq!(store.size(&id), 2);
    let content = fs::read_to_string(store.path_of(&id)).unwrap();
    assert_eq!(content, "first line\nsecond line\twith payload\n");
    assert_eq!(count_lines(&store.path_of(&id)).unwrap(), 2);
}

#[test]
fn sample_reads_back_stored_lines() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DirStore::open(dir.path(), 2).unwrap();
    let id = store.create().unwrap();
    for i in 0..10 {
        store.append(&id, &format!("line {i}")).unwrap();
    }
    let mut rng = StdRng::seed_from_u64(5);
    let small = store.sample(&id, 3, &mut rng).unwrap();
    assert_eq!(small.len(), 3);
    assert!(small.iter().all(|l| l.starts_with("line ")));
    let all = store.sample(&id, 50, &mut rng).unwrap();
    assert_eq!(all.len(), 10);
}

#[test]
fn rename_refuses_existing_target() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DirStore::open(dir.path(), 1).unwrap();
    let a = store.create().unwrap();
    let b = store.create().unwrap();
    store.append(&a, "x").unwrap();
    store.rename(&a, "0").unwrap();
    assert!(dir.path().join("0").is_file());
    assert!(!dir.path().join(&a).exists());
    assert_eq!(store.size("0"), 1);

    let err = store.rename(&b, "0").unwrap_err();
    assert!(matches!(err, ClusterError::Storage { op: StorageOp::Rename, .. }));
    assert_eq!(store.clusters(), vec!["0".to_string(), b]);
}

#[test]
fn unknown_cluster_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DirStore::open(dir.path(), 1).unwrap();
    assert!(matches!(store.append("tmp9", "x"), Err(ClusterError::UnknownCluster(_))));
    assert_eq!(store.size("tmp9"), 0);
}

#[test]
fn append_fails_when_backing_file_vanishes() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DirStore::open(dir.path(), 1).unwrap();
    let id = store.create().unwrap();
    fs::remove_file(store.path_of(&id)).unwrap();
    let err = store.append(&id, "lost").unwrap_err();
    assert!(matches!(err, ClusterError::Storage { op: StorageOp::Append, .. }));
    assert_eq!(store.size(&id), 0);
}

#[test]
fn open_removes_previous_run_artifacts_only() {
    let dir = tempfile::tempdir().unwrap();
    let stale = ["tmp0001", "0003", "index.json"];
    let foreign = ["12", "00001", "tmp12", "notes.txt", "tmpfile.txt"];
    for name in stale.iter().chain(&foreign) {
        fs::write(dir.path().join(name), "old\n").unwrap();
    }
    let _store = DirStore::open(dir.path(), 4).unwrap();
    let mut left: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    left.sort();
    assert_eq!(left, ["00001", "12", "notes.txt", "tmp12", "tmpfile.txt"]);
}

#[test]
fn open_creates_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let store = DirStore::open(&nested, 2).unwrap();
    assert!(nested.is_dir());
    assert!(store.clusters().is_empty());
}

#[test]
fn count_lines_counts_unterminated_tail() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("f");
    fs::write(&p, "a\nb\nc").unwrap();
    assert_eq!(count_lines(&p).unwrap(), 3);
    fs::write(&p, "").unwrap();
    assert_eq!(count_lines(&p).unwrap(), 0);
}

#[test]
fn memory_store_follows_same_rules() {
    let mut store = MemoryStore::new(2);
    let a = store.create().unwrap();
    assert_eq!(a, "tmp00");
    store.append(&a, "hello").unwrap();
    assert_eq!(store.size(&a), 1);
    store.rename(&a, "00").unwrap();
    assert_eq!(store.lines("00").unwrap(), ["hello".to_string()]);
    let b = store.create().unwrap();
    assert!(store.rename(&b, "00").is_err());
}
