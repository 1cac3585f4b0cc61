use reposhift::error::StateError;
use reposhift::fixtures::descriptor::{create_batch, create_descriptor, names};
use reposhift::state::MigrationStateStore;

#[tokio::test]
async fn seeds_pending_from_batch_and_empty_lists() {
    let workdir = tempfile::tempdir().unwrap();
    let store = MigrationStateStore::new(workdir.path());
    store.write_batch(&create_batch(&["a", "b"])).await.unwrap();

    let state = store.load().await.unwrap();

    assert_eq!(
        names(&state.pending.iter().cloned().collect::<Vec<_>>()),
        vec!["a", "b"]
    );
    assert!(state.done.is_empty());
    assert!(state.failed.is_empty());

    let paths = store.paths();
    assert!(paths.pending.exists());
    assert_eq!(std::fs::read_to_string(&paths.done).unwrap(), "[]");
    assert_eq!(std::fs::read_to_string(&paths.failed).unwrap(), "[]");
}

#[tokio::test]
async fn existing_pending_is_not_reseeded() {
    let workdir = tempfile::tempdir().unwrap();
    let store = MigrationStateStore::new(workdir.path());
    store.write_batch(&create_batch(&["a", "b"])).await.unwrap();
    store
        .persist_pending(&create_batch(&["b"]).into())
        .await
        .unwrap();

    let state = store.load().await.unwrap();

    assert_eq!(state.pending.len(), 1);
    assert_eq!(state.pending[0].name, "b");
}

#[tokio::test]
async fn files_are_pretty_printed() {
    let workdir = tempfile::tempdir().unwrap();
    let store = MigrationStateStore::new(workdir.path());

    store
        .persist_failed(&[create_descriptor("a")])
        .await
        .unwrap();

    let content = std::fs::read_to_string(&store.paths().failed).unwrap();
    assert!(content.starts_with("[\n  {\n    \"name\": \"a\""));
}

#[tokio::test]
async fn missing_batch_is_a_precondition_failure() {
    let workdir = tempfile::tempdir().unwrap();
    let store = MigrationStateStore::new(workdir.path());

    let error = store.load().await.unwrap_err();

    assert!(matches!(
        error.downcast_ref::<StateError>(),
        Some(StateError::BatchMissing(_))
    ));
}

#[tokio::test]
async fn duplicate_batch_names_are_rejected() {
    let workdir = tempfile::tempdir().unwrap();
    let store = MigrationStateStore::new(workdir.path());
    store
        .write_batch(&create_batch(&["a", "b", "a"]))
        .await
        .unwrap();

    let error = store.load().await.unwrap_err();

    assert!(matches!(
        error.downcast_ref::<StateError>(),
        Some(StateError::DuplicateName(name)) if name == "a"
    ));
}

#[tokio::test]
async fn recorded_entries_are_dropped_from_pending() {
    let workdir = tempfile::tempdir().unwrap();
    let store = MigrationStateStore::new(workdir.path());
    store
        .write_batch(&create_batch(&["a", "b", "c"]))
        .await
        .unwrap();
    store
        .persist_pending(&create_batch(&["a", "b", "c"]).into())
        .await
        .unwrap();
    store.persist_done(&[create_descriptor("a")]).await.unwrap();
    store
        .persist_failed(&[create_descriptor("b")])
        .await
        .unwrap();

    let state = store.load().await.unwrap();

    assert_eq!(state.pending.len(), 1);
    assert_eq!(state.pending[0].name, "c");

    let reloaded = store.load().await.unwrap();
    assert_eq!(reloaded, state);
}

#[tokio::test]
async fn malformed_state_file_is_an_error() {
    let workdir = tempfile::tempdir().unwrap();
    let store = MigrationStateStore::new(workdir.path());
    store.write_batch(&create_batch(&["a"])).await.unwrap();
    std::fs::write(&store.paths().done, "{not json").unwrap();

    let error = store.load().await.unwrap_err();

    assert!(format!("{:#}", error).contains("could not parse file"));
}

#[tokio::test]
async fn duplicate_pending_entries_are_rejected() {
    let workdir = tempfile::tempdir().unwrap();
    let store = MigrationStateStore::new(workdir.path());
    store.write_batch(&create_batch(&["a", "b"])).await.unwrap();
    store
        .persist_pending(&create_batch(&["a", "a", "b"]).into())
        .await
        .unwrap();

    let error = store.load().await.unwrap_err();

    match error.downcast_ref::<StateError>() {
        Some(StateError::DuplicateEntry { path, name }) => {
            assert_eq!(path, &store.paths().pending);
            assert_eq!(name, "a");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn duplicate_done_entries_are_rejected() {
    let workdir = tempfile::tempdir().unwrap();
    let store = MigrationStateStore::new(workdir.path());
    store.write_batch(&create_batch(&["a", "b"])).await.unwrap();
    store
        .persist_done(&create_batch(&["a", "a"]))
        .await
        .unwrap();

    let error = store.load().await.unwrap_err();

    assert!(matches!(
        error.downcast_ref::<StateError>(),
        Some(StateError::DuplicateEntry { name, .. }) if name == "a"
    ));
}

#[tokio::test]
async fn repository_in_done_and_failed_is_rejected() {
    let workdir = tempfile::tempdir().unwrap();
    let store = MigrationStateStore::new(workdir.path());
    store.write_batch(&create_batch(&["a", "b"])).await.unwrap();
    store
        .persist_pending(&create_batch(&["a", "b"]).into())
        .await
        .unwrap();
    store.persist_done(&[create_descriptor("b")]).await.unwrap();
    store
        .persist_failed(&[create_descriptor("b")])
        .await
        .unwrap();

    let error = store.load().await.unwrap_err();

    assert!(matches!(
        error.downcast_ref::<StateError>(),
        Some(StateError::RecordedTwice(name)) if name == "b"
    ));
    // Nothing is rewritten on a rejected load.
    let pending = std::fs::read_to_string(&store.paths().pending).unwrap();
    assert!(pending.contains("\"b\""));
}
