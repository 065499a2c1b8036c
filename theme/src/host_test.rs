use super::*;

#[test]
fn memory_store_reads_back_writes() {
    let mut store = MemoryStore::new();
    assert_eq!(store.read("k"), None);
    store.write("k", "dark").unwrap();
    assert_eq!(store.read("k").as_deref(), Some("dark"));
}

#[test]
fn memory_store_with_entry_is_seeded() {
    let store = MemoryStore::with_entry("np-theme-preference", "light");
    assert_eq!(store.read("np-theme-preference").as_deref(), Some("light"));
}

#[test]
fn memory_store_failing_writes_leave_entries_untouched() {
    let mut store = MemoryStore::with_entry("k", "light");
    store.fail_writes = true;
    let err = store.write("k", "dark").unwrap_err();
    assert!(matches!(err, HostError::StorageWrite(_)));
    assert_eq!(store.read("k").as_deref(), Some("light"));
}

#[test]
fn recording_document_without_meta_ignores_colour() {
    let mut doc = RecordingDocument::without_meta();
    doc.set_meta_theme_color("#0D1520");
    assert_eq!(doc.meta_color, None);
}

#[test]
fn recording_document_tracks_attribute_writes() {
    let mut doc = RecordingDocument::new();
    doc.set_theme_attribute(Some(Theme::Dark));
    doc.set_theme_attribute(None);
    assert_eq!(doc.theme_attribute, None);
    assert_eq!(doc.attribute_writes, 2);
}

#[test]
fn host_error_messages_are_readable() {
    assert_eq!(HostError::StorageUnavailable.to_string(), "preference storage unavailable");
    assert_eq!(
        HostError::StorageWrite("quota".into()).to_string(),
        "preference write rejected: quota"
    );
}
