//! Round table files on disk: save, load, validation and the rebuild fallback.

use std::fs;

use risk_odds::context::RiskContext;
use risk_odds::error::RiskError;
use risk_odds::round_table::build_round_probability_table;
use risk_odds::storage::{
    load_or_build_round_table, load_round_table, save_round_table, table_file_path,
    TABLE_FILE_BYTES,
};

#[test]
fn saved_table_loads_identical() {
    let dir = tempfile::tempdir().unwrap();
    let table = build_round_probability_table(12).unwrap();
    let path = table_file_path(dir.path(), 12);
    save_round_table(&table, &path).unwrap();

    assert_eq!(fs::metadata(&path).unwrap().len() as usize, TABLE_FILE_BYTES);
    assert_eq!(load_round_table(&path).unwrap(), table);
}

#[test]
fn truncated_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = table_file_path(dir.path(), 6);
    save_round_table(&build_round_probability_table(6).unwrap(), &path).unwrap();

    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() - 8]).unwrap();
    assert!(matches!(
        load_round_table(&path),
        Err(RiskError::InvalidTableFile { .. })
    ));
}

#[test]
fn bad_magic_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = table_file_path(dir.path(), 6);
    save_round_table(&build_round_probability_table(6).unwrap(), &path).unwrap();

    let mut bytes = fs::read(&path).unwrap();
    bytes[0] ^= 0xFF;
    fs::write(&path, &bytes).unwrap();
    assert!(matches!(
        load_round_table(&path),
        Err(RiskError::InvalidTableFile { .. })
    ));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = table_file_path(dir.path(), 6);
    assert!(matches!(load_round_table(&path), Err(RiskError::Io(_))));
}

#[test]
fn load_or_build_writes_then_reuses() {
    let dir = tempfile::tempdir().unwrap();
    let path = table_file_path(dir.path(), 8);
    assert!(!path.exists());

    let built = load_or_build_round_table(dir.path(), 8, true).unwrap();
    assert!(path.exists());
    let loaded = load_or_build_round_table(dir.path(), 8, true).unwrap();
    assert_eq!(built, loaded);
}

#[test]
fn load_or_build_without_save_leaves_dir_empty() {
    let dir = tempfile::tempdir().unwrap();
    load_or_build_round_table(dir.path(), 4, false).unwrap();
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn mislabeled_file_is_rebuilt() {
    let dir = tempfile::tempdir().unwrap();
    // A 20-sided table stored under the 6-sided name.
    let d20 = build_round_probability_table(20).unwrap();
    save_round_table(&d20, &table_file_path(dir.path(), 6)).unwrap();

    let table = load_or_build_round_table(dir.path(), 6, true).unwrap();
    assert_eq!(table, build_round_probability_table(6).unwrap());
    assert_eq!(
        load_round_table(&table_file_path(dir.path(), 6)).unwrap().face_count(),
        6
    );
}

#[test]
fn context_reads_tables_from_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    save_round_table(
        &build_round_probability_table(6).unwrap(),
        &table_file_path(dir.path(), 6),
    )
    .unwrap();
    let ctx = RiskContext::new(Some(dir.path().to_path_buf()), 10);

    let first = ctx.round_table(6).unwrap();
    let second = ctx.round_table(6).unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert!((ctx.win_probability(6, 1, 1).unwrap() - 15.0 / 36.0).abs() < 1e-12);

    // Missing tables are built in memory, never written by the context.
    ctx.round_table(8).unwrap();
    assert!(!table_file_path(dir.path(), 8).exists());
}
