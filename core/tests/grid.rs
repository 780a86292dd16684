use grid_core::core::db::Database;
use grid_core::core::error::GridError;
use grid_core::core::{Grid, PutOptions};
use grid_core::types::{Config, FileId, Metadata};
use std::sync::Arc;
use tempfile::TempDir;

fn open_grid(temp_dir: &TempDir, prefix: &str) -> Grid {
    let config = Config {
        base_path: temp_dir.path().to_path_buf(),
    };
    let db = Arc::new(Database::new(&config).unwrap());
    Grid::new(db, prefix).unwrap()
}

fn photos_metadata() -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("app".to_string(), "photos".into());
    metadata
}

/// Store, read back, and delete a multi-chunk file.
#[test]
fn test_put_get_delete() {
    let temp_dir = TempDir::new().unwrap();
    let grid = open_grid(&temp_dir, "fs");
    let data = b"GRIDDATA".repeat(50_000);

    let id = grid
        .put_bytes(&data, "sample", PutOptions::new().metadata(photos_metadata()))
        .unwrap();

    let file = grid.get(&id).unwrap();
    assert_eq!(file.data().unwrap(), data);
    assert_eq!(file.filename(), "sample");
    assert_eq!(file.metadata()["app"], "photos");

    grid.delete(&id).unwrap();
    assert!(matches!(grid.get(&id), Err(GridError::NotFound(_))));
}

/// Files written before a reopen are readable after it.
#[test]
fn test_files_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let data: Vec<u8> = (0..=255u8).cycle().take(70_000).collect();

    let id = {
        let grid = open_grid(&temp_dir, "fs");
        grid.put_bytes(&data, "persisted.bin", PutOptions::new())
            .unwrap()
    };

    let grid = open_grid(&temp_dir, "fs");
    let file = grid.get(&id).unwrap();
    assert_eq!(file.data().unwrap(), data);
    assert!(file.verify().unwrap());
}

/// Two grids on one database do not see each other's files.
#[test]
fn test_grids_share_database_by_prefix() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config {
        base_path: temp_dir.path().to_path_buf(),
    };
    let db = Arc::new(Database::new(&config).unwrap());
    let first = Grid::new(Arc::clone(&db), "first").unwrap();
    let second = Grid::new(db, "second").unwrap();

    let id = FileId::generate();
    first
        .put_bytes(b"one", "x", PutOptions::new().id(id))
        .unwrap();
    second
        .put_bytes(b"two", "x", PutOptions::new().id(id))
        .unwrap();

    assert_eq!(first.get(&id).unwrap().data().unwrap(), b"one");
    assert_eq!(second.get(&id).unwrap().data().unwrap(), b"two");

    first.delete(&id).unwrap();
    assert!(second.exists(&id).unwrap());
}

/// Concurrent writers each get their own file.
#[test]
fn test_concurrent_puts() {
    let temp_dir = TempDir::new().unwrap();
    let grid = Arc::new(open_grid(&temp_dir, "fs"));

    let handles: Vec<_> = (0..4u8)
        .map(|n| {
            let grid = Arc::clone(&grid);
            std::thread::spawn(move || {
                let data = vec![n; 10_000];
                let id = grid
                    .put_bytes(&data, &format!("file-{n}"), PutOptions::new())
                    .unwrap();
                (id, data)
            })
        })
        .collect();

    for handle in handles {
        let (id, data) = handle.join().unwrap();
        assert_eq!(grid.get(&id).unwrap().data().unwrap(), data);
    }
    assert_eq!(grid.list().unwrap().len(), 4);
}
