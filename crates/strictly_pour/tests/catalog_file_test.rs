//! Loading level catalogs from disk.

use std::io::Write;
use strictly_pour::{Color, LevelCatalog, LevelErrorKind, LevelKind, LevelType};
use tempfile::Builder;

const TOML_CATALOG: &str = r#"
[[levels]]
tubes = [[1, 2, 1, 2], [2, 1, 2, 1], [], []]
empty_tube_count = 2

[[levels]]
tubes = [[3, 3], [3, 3]]
max_moves = 5
time_limit_seconds = 30.0
locked_tubes = [1]
"#;

const JSON_CATALOG: &str = r#"{
  "levels": [
    { "tubes": [[4, 4, 4], [4], []], "max_moves": 2 }
  ]
}"#;

fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file
}

#[test]
fn test_load_toml_catalog_from_disk() {
    let file = write_temp(".toml", TOML_CATALOG);

    let catalog = LevelCatalog::from_file(file.path()).unwrap();

    assert_eq!(catalog.len(), 2);
    let first = catalog.level(0).unwrap();
    assert_eq!(first.level_type(), &LevelType::Unlimited);
    assert_eq!(first.tube_count(), 4);

    let second = catalog.level(1).unwrap();
    assert_eq!(second.level_type().kind(), LevelKind::TimerAndMoves);
    assert!(second.is_locked(1));
    assert!(!second.is_locked(0));
}

#[test]
fn test_load_json_catalog_from_disk() {
    let file = write_temp(".json", JSON_CATALOG);

    let catalog = LevelCatalog::from_file(file.path()).unwrap();

    let level = catalog.level(0).unwrap();
    assert_eq!(level.level_type(), &LevelType::Moves { budget: 2 });
    assert_eq!(level.tubes()[0], vec![Color(4); 3]);
}

#[test]
fn test_unknown_extension_rejected() {
    let file = write_temp(".yaml", "levels: []");

    let err = LevelCatalog::from_file(file.path()).unwrap_err();

    assert_eq!(err.kind, LevelErrorKind::UnsupportedFormat("yaml".to_string()));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();

    let err = LevelCatalog::from_file(dir.path().join("absent.toml")).unwrap_err();

    assert!(matches!(err.kind, LevelErrorKind::Io(_)));
}

#[test]
fn test_validate_all_flags_bad_levels() {
    let content = r#"
[[levels]]
tubes = [[1, 1], [1, 1]]

[[levels]]
tubes = [[1, 1, 1, 1, 1]]

[[levels]]
tubes = [[1], []]
max_moves = -3
"#;
    let file = write_temp(".toml", content);
    let catalog = LevelCatalog::from_file(file.path()).unwrap();

    let reports = catalog.validate_all();

    assert_eq!(reports.len(), 3);
    assert!(reports[0].is_valid());
    assert_eq!(
        reports[1].outcome().as_ref().unwrap_err().kind,
        LevelErrorKind::TubeOverCapacity { tube: 0, count: 5 }
    );
    assert_eq!(
        reports[2].outcome().as_ref().unwrap_err().kind,
        LevelErrorKind::NegativeMoveBudget(-3)
    );
}
