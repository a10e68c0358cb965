use std::sync::Arc;

use jv_model::BytecodeArtifact;
use jv_store::{BytecodeStore, Clock};

struct MockClock;
impl Clock for MockClock {
    fn unix_millis(&self) -> i64 {
        1234567890123
    }
}

fn artifact(name: &str, bytes: &[u8]) -> Arc<BytecodeArtifact> {
    Arc::new(BytecodeArtifact::new(name, bytes.to_vec()))
}

#[test]
fn filed_artifacts_are_listed_before_promotion() {
    let store = BytecodeStore::new();
    let a = artifact("org.javelin.pages.index_jsp", b"one");
    store.file(a.clone());

    let listed = store.list_package("org.javelin.pages");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].class_name, "org.javelin.pages.index_jsp");
    // Not durable until promoted.
    assert!(store.bytecode("org.javelin.pages.index_jsp").is_none());
}

#[test]
fn unfile_removes_only_the_same_artifact() {
    let store = BytecodeStore::new();
    let failed = artifact("p.C", b"failed attempt");
    let winner = artifact("p.C", b"concurrent winner");

    store.file(failed.clone());
    store.file(winner.clone());
    store.unfile(&failed);

    let listed = store.list_package("p");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].bytes, b"concurrent winner");

    store.unfile(&winner);
    assert!(store.list_package("p").is_empty());
    assert!(store.package_names().is_empty());
}

#[test]
fn unfile_restores_the_promoted_artifact() {
    let store = BytecodeStore::new();
    let v1 = artifact("p.C", b"promoted v1");
    store.file(v1.clone());
    store.promote("p.C", &[v1.clone()]);

    // A recompile files its output over the registry entry, then fails.
    let pending = artifact("p.C", b"failed v2");
    store.file(pending.clone());
    store.unfile(&pending);

    // The registry must still resolve what the durable store serves.
    let listed = store.list_package("p");
    assert_eq!(listed.len(), 1);
    assert!(Arc::ptr_eq(&listed[0], &v1));
    assert_eq!(store.bytecode("p.C").unwrap().bytes, b"promoted v1");
}

#[test]
fn promotion_makes_bytecode_durable_with_birth_time() {
    let store = BytecodeStore::with_clock(Box::new(MockClock));
    let a = artifact("p.C", b"bytes");
    store.file(a.clone());
    store.promote("p.C", &[a]);

    assert_eq!(store.bytecode("p.C").unwrap().bytes, b"bytes");
    assert_eq!(store.birth_time("p.C"), Some(1234567890123));
    assert_eq!(store.birth_time("p.Other"), None);
}

#[test]
fn promotion_replaces_the_whole_class_family() {
    let store = BytecodeStore::new();
    let outer_v1 = artifact("p.Outer", b"v1");
    let inner_v1 = artifact("p.Outer$Inner", b"v1-inner");
    store.file(outer_v1.clone());
    store.file(inner_v1.clone());
    store.promote("p.Outer", &[outer_v1, inner_v1]);

    // Recompile: the new source no longer defines the nested class.
    let outer_v2 = artifact("p.Outer", b"v2");
    store.file(outer_v2.clone());
    store.promote("p.Outer", &[outer_v2]);

    assert_eq!(store.bytecode("p.Outer").unwrap().bytes, b"v2");
    assert!(store.bytecode("p.Outer$Inner").is_none());
    let names: Vec<String> = store
        .list_package("p")
        .into_iter()
        .map(|a| a.class_name.clone())
        .collect();
    assert_eq!(names, vec!["p.Outer".to_string()]);
}

#[test]
fn promotion_leaves_unrelated_units_alone() {
    let store = BytecodeStore::new();
    let other = artifact("p.OuterMost", b"other");
    store.file(other.clone());
    store.promote("p.OuterMost", &[other]);

    let outer = artifact("p.Outer", b"outer");
    store.file(outer.clone());
    store.promote("p.Outer", &[outer]);

    assert!(store.bytecode("p.OuterMost").is_some());
    assert_eq!(store.list_package("p").len(), 2);
}

#[test]
fn export_writes_top_level_and_siblings() {
    let dir = tempfile::tempdir().unwrap();
    let store = BytecodeStore::new();
    let outer = artifact("p.Outer", b"outer-bytes");
    let inner = artifact("p.Outer$Inner", b"inner-bytes");
    store.file(outer.clone());
    store.file(inner.clone());
    store.promote("p.Outer", &[outer, inner]);

    let target = dir.path().join("classes").join("Outer.class");
    store.export("p.Outer", &target).unwrap();

    assert_eq!(std::fs::read(&target).unwrap(), b"outer-bytes");
    let sibling = dir.path().join("classes").join("Outer$Inner.class");
    assert_eq!(std::fs::read(&sibling).unwrap(), b"inner-bytes");
}

#[test]
fn export_of_unknown_class_fails() {
    let dir = tempfile::tempdir().unwrap();
    let store = BytecodeStore::new();
    let err = store
        .export("p.Missing", &dir.path().join("Missing.class"))
        .unwrap_err();
    assert!(err.contains("p.Missing"), "{err}");
}

#[test]
fn concurrent_filing_and_listing() {
    let store = Arc::new(BytecodeStore::new());
    let mut handles = Vec::new();
    for t in 0..4 {
        let store = store.clone();
        handles.push(std::thread::spawn(move || {
            for i in 0..50 {
                let name = format!("p{t}.C{i}");
                let a = artifact(&name, name.as_bytes());
                store.file(a.clone());
                store.promote(&name, &[a]);
                // Reads from another unit's package must not block on us.
                let _ = store.list_package("p0");
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }
    for t in 0..4 {
        assert_eq!(store.list_package(&format!("p{t}")).len(), 50);
    }
}
