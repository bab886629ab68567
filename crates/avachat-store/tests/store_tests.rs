//! Tests for avachat-store: named chat persistence.

use avachat_core::{Error, Role, TranscriptEntry};
use avachat_store::ChatStore;
use std::path::PathBuf;

struct TempStore {
    dir: PathBuf,
    store: ChatStore,
}

impl TempStore {
    fn new(tag: &str) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "avachat-store-{}-{}",
            tag,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        Self {
            store: ChatStore::new(&dir),
            dir,
        }
    }
}

impl Drop for TempStore {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

#[test]
fn test_create_and_list() {
    let t = TempStore::new("create");
    assert!(t.store.list().is_empty());

    t.store.create("alpha").unwrap();
    t.store.create("beta").unwrap();
    assert_eq!(t.store.list(), vec!["alpha", "beta"]);
    assert!(t.store.load("alpha").unwrap().is_empty());
}

#[test]
fn test_create_duplicate_rejected() {
    let t = TempStore::new("dup");
    t.store.create("alpha").unwrap();
    match t.store.create("alpha") {
        Err(Error::ChatExists(name)) => assert_eq!(name, "alpha"),
        other => panic!("expected duplicate error, got {:?}", other),
    }
}

#[test]
fn test_append_and_load() {
    let t = TempStore::new("append");
    t.store.create("talk").unwrap();
    t.store.append("talk", Role::User, "hello").unwrap();
    t.store.append("talk", Role::Assistant, "hi there").unwrap();

    let messages = t.store.load("talk").unwrap();
    assert_eq!(
        messages,
        vec![
            TranscriptEntry::user("hello"),
            TranscriptEntry::assistant("hi there"),
        ]
    );
}

#[test]
fn test_append_to_missing_chat() {
    let t = TempStore::new("missing");
    match t.store.append("nowhere", Role::User, "text") {
        Err(Error::ChatNotFound(name)) => assert_eq!(name, "nowhere"),
        other => panic!("expected not-found error, got {:?}", other),
    }
}

#[test]
fn test_select_sets_current() {
    let t = TempStore::new("select");
    t.store.create("a").unwrap();
    t.store.create("b").unwrap();
    assert_eq!(t.store.current(), None);

    t.store.append("b", Role::User, "in b").unwrap();
    let messages = t.store.select("b").unwrap();
    assert_eq!(messages, vec![TranscriptEntry::user("in b")]);
    assert_eq!(t.store.current().as_deref(), Some("b"));

    t.store.select("a").unwrap();
    assert_eq!(t.store.current().as_deref(), Some("a"));
}

#[test]
fn test_rename_carries_history_and_selection() {
    let t = TempStore::new("rename");
    t.store.create("old").unwrap();
    t.store.append("old", Role::User, "kept").unwrap();
    t.store.select("old").unwrap();

    t.store.rename("old", "new").unwrap();
    assert_eq!(t.store.list(), vec!["new"]);
    assert_eq!(t.store.current().as_deref(), Some("new"));
    assert_eq!(t.store.load("new").unwrap(), vec![TranscriptEntry::user("kept")]);
    assert!(matches!(t.store.load("old"), Err(Error::ChatNotFound(_))));
}

#[test]
fn test_rename_collision_rejected() {
    let t = TempStore::new("rename-collide");
    t.store.create("a").unwrap();
    t.store.create("b").unwrap();
    assert!(matches!(t.store.rename("a", "b"), Err(Error::ChatExists(_))));
    assert!(matches!(
        t.store.rename("ghost", "c"),
        Err(Error::ChatNotFound(_))
    ));
}

#[test]
fn test_delete_clears_selection() {
    let t = TempStore::new("delete");
    t.store.create("a").unwrap();
    t.store.create("b").unwrap();
    t.store.select("a").unwrap();

    t.store.delete("a").unwrap();
    assert_eq!(t.store.list(), vec!["b"]);
    assert_eq!(t.store.current(), None);
    assert!(matches!(t.store.delete("a"), Err(Error::ChatNotFound(_))));
}

#[test]
fn test_delete_keeps_unrelated_selection() {
    let t = TempStore::new("delete-other");
    t.store.create("a").unwrap();
    t.store.create("b").unwrap();
    t.store.select("b").unwrap();

    t.store.delete("a").unwrap();
    assert_eq!(t.store.current().as_deref(), Some("b"));
}

#[test]
fn test_export_is_pretty_json() {
    let t = TempStore::new("export");
    t.store.create("talk").unwrap();
    t.store.append("talk", Role::User, "question").unwrap();

    let json = t.store.export("talk").unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["messages"][0]["role"], "user");
    assert_eq!(parsed["messages"][0]["content"], "question");
}

#[test]
fn test_invalid_chat_names_rejected() {
    let t = TempStore::new("invalid");
    for name in ["", "a/b", "a\\b", "..", "../escape", "chats"] {
        assert!(
            matches!(t.store.create(name), Err(Error::InvalidChatName(_))),
            "name {:?} should be rejected",
            name
        );
    }
    // the store root stays untouched by rejected names
    assert!(t.store.list().is_empty());
}
