//! Tests for the in-memory tree store.

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;

fn path(raw: &str) -> StorePath {
    StorePath::parse(raw).expect("valid path")
}

#[fixture]
fn store() -> MemoryTreeStore {
    MemoryTreeStore::new()
}

#[rstest]
#[tokio::test]
async fn set_then_get_round_trips_subtrees(store: MemoryTreeStore) {
    store
        .set(&path("users/u1"), json!({"displayName": "Ada", "pushToken": null}))
        .await
        .expect("set");

    let user = store.get(&path("users/u1")).await.expect("get");
    assert_eq!(user, Some(json!({"displayName": "Ada"})));
    let name = store.get(&path("users/u1/displayName")).await.expect("get");
    assert_eq!(name, Some(json!("Ada")));
    assert_eq!(store.get(&path("users/u2")).await.expect("get"), None);
}

#[rstest]
#[tokio::test]
async fn removing_the_last_child_prunes_empty_parents(store: MemoryTreeStore) {
    store
        .set(&path("sent/u1/r1"), json!(true))
        .await
        .expect("set");
    store.remove(&path("sent/u1/r1")).await.expect("remove");

    assert_eq!(store.get(&path("sent")).await.expect("get"), None);
    assert_eq!(store.snapshot(), json!({}));
}

#[rstest]
#[tokio::test]
async fn writing_null_removes(store: MemoryTreeStore) {
    store.set(&path("a/b"), json!(1)).await.expect("set");
    store.set(&path("a/b"), Value::Null).await.expect("set null");
    assert_eq!(store.get(&path("a")).await.expect("get"), None);
}

#[rstest]
#[tokio::test]
async fn update_merges_shallowly(store: MemoryTreeStore) {
    store
        .set(&path("requests/r1"), json!({"status": "pending", "message": "hi"}))
        .await
        .expect("set");
    let partial = json!({"status": "accepted", "message": null})
        .as_object()
        .cloned()
        .expect("object");
    store
        .update(&path("requests/r1"), partial)
        .await
        .expect("update");

    assert_eq!(
        store.get(&path("requests/r1")).await.expect("get"),
        Some(json!({"status": "accepted"}))
    );
}

#[rstest]
#[tokio::test]
async fn set_if_absent_only_writes_once(store: MemoryTreeStore) {
    let claim = path("request_pairs/a_b");
    assert!(store.set_if_absent(&claim, json!("r1")).await.expect("claim"));
    assert!(!store.set_if_absent(&claim, json!("r2")).await.expect("claim"));
    assert_eq!(store.get(&claim).await.expect("get"), Some(json!("r1")));

    store.remove(&claim).await.expect("release");
    assert!(store.set_if_absent(&claim, json!("r3")).await.expect("reclaim"));
}

#[rstest]
#[tokio::test]
async fn compare_and_set_writes_only_over_the_expected_value(store: MemoryTreeStore) {
    let claim = path("request_pairs/a_b");
    store.set(&claim, json!({"requestId": "r1"})).await.expect("set");

    let stale = json!({"requestId": "r0"});
    assert!(!store.compare_and_set(&claim, &stale, json!({"requestId": "r2"})).await.expect("cas"));
    let current = json!({"requestId": "r1"});
    assert!(store.compare_and_set(&claim, &current, json!({"requestId": "r2"})).await.expect("cas"));
    assert_eq!(store.get(&claim).await.expect("get"), Some(json!({"requestId": "r2"})));

    let replaced = json!({"requestId": "r2"});
    assert!(store.compare_and_set(&claim, &replaced, Value::Null).await.expect("cas"));
    assert_eq!(store.snapshot(), json!({}));
    assert!(store.compare_and_set(&claim, &Value::Null, json!({"requestId": "r3"})).await.expect("cas"));
}

#[rstest]
#[tokio::test]
async fn children_are_listed_in_key_order(store: MemoryTreeStore) {
    for key in ["c", "a", "b"] {
        store
            .set(&path("notifications/u1").child(key), json!({"id": key}))
            .await
            .expect("set");
    }
    let keys: Vec<_> = store
        .children(&path("notifications/u1"))
        .await
        .expect("children")
        .into_iter()
        .map(|(key, _)| key)
        .collect();
    assert_eq!(keys, ["a", "b", "c"]);
    assert!(store.children(&path("missing")).await.expect("children").is_empty());
}

#[rstest]
#[tokio::test]
async fn pushed_keys_are_unique_and_ordered(store: MemoryTreeStore) {
    let prefix = path("places");
    let first = store.push(&prefix).await.expect("push");
    let second = store.push(&prefix).await.expect("push");
    assert_ne!(first, second);
    assert!(first < second);
    assert_eq!(store.get(&prefix).await.expect("get"), None);
}

#[rstest]
#[tokio::test]
async fn subscribers_see_committed_writes(store: MemoryTreeStore) {
    let mut places = store.subscribe(&path("places"));
    store.set(&path("users/u1"), json!({"x": 1})).await.expect("set");
    store
        .set(&path("places/p1"), json!({"placeName": "Dog park"}))
        .await
        .expect("set");
    store.remove(&path("places/p1")).await.expect("remove");

    let created = places.next().await.expect("created");
    assert_eq!(created.path, path("places/p1"));
    assert_eq!(created.value, Some(json!({"placeName": "Dog park"})));
    let removed = places.next().await.expect("removed");
    assert_eq!(removed.value, None);
}

#[rstest]
#[tokio::test]
async fn injected_faults_apply_beneath_their_prefix(store: MemoryTreeStore) {
    store.inject_fault(path("notifications"), TreeStoreError::connection("offline"));

    let err = store
        .set(&path("notifications/u1/n1"), json!({}))
        .await
        .expect_err("faulted");
    assert_eq!(err, TreeStoreError::connection("offline"));
    store
        .set(&path("places/p1"), json!(1))
        .await
        .expect("other prefixes unaffected");

    store.clear_faults();
    store
        .set(&path("notifications/u1/n1"), json!({"read": false}))
        .await
        .expect("fault cleared");
}

#[rstest]
#[tokio::test]
async fn root_accepts_only_objects(store: MemoryTreeStore) {
    let err = store
        .set(&StorePath::root(), json!(3))
        .await
        .expect_err("scalar root");
    assert!(matches!(err, TreeStoreError::InvalidPath { .. }));
}

#[test]
fn seeded_trees_drop_empty_nodes() {
    let store = MemoryTreeStore::from_value(json!({"users": {}, "pets": {"u1": {"p1": {"name": "Rex"}}}}));
    assert_eq!(
        store.snapshot(),
        json!({"pets": {"u1": {"p1": {"name": "Rex"}}}})
    );
}
