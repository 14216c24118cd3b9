//! End-to-end collection discovery: a data directory containing a TSV
//! document list and a separately-built BM25 corpus file should come
//! together into one usable collection, while a bare TSV with no sparse or
//! dense sibling stays merely present but unusable.

use lexrag_index::IndexStore;

fn fixture_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("lexrag-index-it-{name}-{}", std::process::id()))
}

#[test]
fn tsv_plus_bm25_sidecar_becomes_one_usable_collection() {
    let dir = fixture_dir("usable");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("acts.tsv"),
        "name\ttype\tcontent\nact-1\tacts\tThe council shall meet quarterly.\n",
    )
    .unwrap();
    let corpus: Vec<Vec<String>> = vec![vec!["council".into(), "shall".into(), "meet".into(), "quarterly".into()]];
    std::fs::write(dir.join("acts_bm25.bin"), bincode::serialize(&corpus).unwrap()).unwrap();

    let store = IndexStore::new(&dir);
    let snapshot = store.initialize();

    assert_eq!(snapshot.len(), 1);
    let collection = snapshot.get("acts").expect("acts collection discovered");
    assert!(collection.is_usable());
    assert_eq!(collection.len(), 1);
    let status = store.status();
    assert_eq!(status.total_collections, 1);
    assert_eq!(status.usable_collections, 1);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn bare_tsv_without_a_retrieval_sidecar_is_present_but_not_usable() {
    let dir = fixture_dir("bare");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("gazettes.tsv"),
        "name\ttype\tcontent\ngaz-1\tgazettes\tNotice of appointment.\n",
    )
    .unwrap();

    let store = IndexStore::new(&dir);
    store.initialize();
    let status = store.status();

    assert_eq!(status.total_collections, 1);
    assert_eq!(status.usable_collections, 0);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn force_reload_picks_up_a_collection_added_after_the_first_initialize() {
    let dir = fixture_dir("reload");
    std::fs::create_dir_all(&dir).unwrap();
    let store = IndexStore::new(&dir);
    assert_eq!(store.initialize().len(), 0);

    std::fs::write(
        dir.join("bills.tsv"),
        "name\ttype\tcontent\nbill-1\tbills\tReading scheduled for May.\n",
    )
    .unwrap();
    let corpus: Vec<Vec<String>> = vec![vec!["reading".into(), "scheduled".into(), "for".into(), "may".into()]];
    std::fs::write(dir.join("bills_bm25.bin"), bincode::serialize(&corpus).unwrap()).unwrap();

    // A plain `initialize()` is a no-op once already initialized...
    assert_eq!(store.initialize().len(), 0);
    // ...only `force_reload` re-scans the data directory.
    assert_eq!(store.force_reload().len(), 1);

    std::fs::remove_dir_all(&dir).ok();
}
