mod common {
    use crate::core::db::Database;
    use crate::types::Config;
    use crate::types::record::versioned_record::latest_record::FileRecord;
    use std::time::SystemTime;
    use tempfile::TempDir;

    pub(super) fn create_test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            base_path: temp_dir.path().to_path_buf(),
        };
        let db = Database::new(&config).unwrap();
        (db, temp_dir)
    }

    pub(super) fn make_record(filename: &str, data: &[u8], chunk_size: u32) -> FileRecord {
        FileRecord {
            filename: filename.to_string(),
            length: data.len() as u64,
            chunk_size,
            upload_date: SystemTime::now(),
            content_type: "text/plain".to_string(),
            checksum: blake3::hash(data),
            metadata: "{}".to_string(),
        }
    }
}

mod bucket {
    use super::common::create_test_db;

    #[test]
    fn test_bucket_names_collections_by_prefix() {
        let (db, _temp) = create_test_db();

        let bucket = db.bucket("test-fs").unwrap();
        assert_eq!(bucket.prefix(), "test-fs");
        assert_eq!(bucket.files_name(), "test-fs.files");
        assert_eq!(bucket.chunks_name(), "test-fs.chunks");
    }

    #[test]
    fn test_bucket_idempotent() {
        let (db, _temp) = create_test_db();

        db.bucket("fs").unwrap();
        let bucket = db.bucket("fs").unwrap();
        assert!(db.files(&bucket).unwrap().is_empty());
    }

    #[test]
    fn test_reopen_keeps_data() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = crate::types::Config {
            base_path: temp_dir.path().to_path_buf(),
        };
        let id = crate::types::FileId::generate();

        {
            let db = crate::core::db::Database::new(&config).unwrap();
            let bucket = db.bucket("fs").unwrap();
            let mut upload = db.begin_upload(&bucket, id).unwrap();
            upload.push_chunk(b"persisted".to_vec()).unwrap();
            upload
                .commit(super::common::make_record("p", b"persisted", 16))
                .unwrap();
        }

        let db = crate::core::db::Database::new(&config).unwrap();
        let bucket = db.bucket("fs").unwrap();
        assert_eq!(db.file(&bucket, &id).unwrap().unwrap().filename, "p");
        assert_eq!(db.chunk_count(&bucket, &id).unwrap(), 1);
    }
}

mod upload {
    use super::common::{create_test_db, make_record};
    use crate::core::db::error::DatabaseError;
    use crate::types::FileId;

    #[test]
    fn test_commit_makes_file_visible() {
        let (db, _temp) = create_test_db();
        let bucket = db.bucket("fs").unwrap();
        let id = FileId::generate();

        let mut upload = db.begin_upload(&bucket, id).unwrap();
        upload.push_chunk(b"he".to_vec()).unwrap();
        upload.push_chunk(b"ll".to_vec()).unwrap();
        upload.push_chunk(b"o".to_vec()).unwrap();
        assert_eq!(upload.chunk_count(), 3);
        upload.commit(make_record("hello.txt", b"hello", 2)).unwrap();

        let record = db.file(&bucket, &id).unwrap().unwrap();
        assert_eq!(record.filename, "hello.txt");
        assert_eq!(record.length, 5);
        assert_eq!(db.chunk_count(&bucket, &id).unwrap(), 3);
    }

    #[test]
    fn test_dropped_upload_leaves_nothing() {
        let (db, _temp) = create_test_db();
        let bucket = db.bucket("fs").unwrap();
        let id = FileId::generate();

        {
            let mut upload = db.begin_upload(&bucket, id).unwrap();
            upload.push_chunk(b"abandoned".to_vec()).unwrap();
        }

        assert!(db.file(&bucket, &id).unwrap().is_none());
        assert_eq!(db.chunk_count(&bucket, &id).unwrap(), 0);
    }

    #[test]
    fn test_begin_upload_rejects_existing_id() {
        let (db, _temp) = create_test_db();
        let bucket = db.bucket("fs").unwrap();
        let id = FileId::generate();

        db.begin_upload(&bucket, id)
            .unwrap()
            .commit(make_record("first", b"", 4))
            .unwrap();

        let result = db.begin_upload(&bucket, id);
        assert!(matches!(result, Err(DatabaseError::AlreadyExists)));
    }

    #[test]
    fn test_empty_file_has_no_chunks() {
        let (db, _temp) = create_test_db();
        let bucket = db.bucket("fs").unwrap();
        let id = FileId::generate();

        db.begin_upload(&bucket, id)
            .unwrap()
            .commit(make_record("empty", b"", 4))
            .unwrap();

        assert_eq!(db.file(&bucket, &id).unwrap().unwrap().length, 0);
        assert_eq!(db.chunk_count(&bucket, &id).unwrap(), 0);
    }
}

mod read {
    use super::common::{create_test_db, make_record};
    use crate::types::FileId;

    #[test]
    fn test_open_file_missing_returns_none() {
        let (db, _temp) = create_test_db();
        let bucket = db.bucket("fs").unwrap();

        assert!(
            db.open_file(&bucket, &FileId::generate())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_open_file_snapshot_survives_removal() {
        let (db, _temp) = create_test_db();
        let bucket = db.bucket("fs").unwrap();
        let id = FileId::generate();

        let mut upload = db.begin_upload(&bucket, id).unwrap();
        upload.push_chunk(b"snap".to_vec()).unwrap();
        upload.commit(make_record("snap", b"snap", 4)).unwrap();

        let (record, chunks) = db.open_file(&bucket, &id).unwrap().unwrap();
        db.remove_file(&bucket, &id).unwrap();

        assert_eq!(record.length, 4);
        assert_eq!(chunks.get(0).unwrap().unwrap(), b"snap");
        assert!(db.file(&bucket, &id).unwrap().is_none());
    }

    #[test]
    fn test_files_lists_every_record() {
        let (db, _temp) = create_test_db();
        let bucket = db.bucket("fs").unwrap();
        let ids = [FileId::generate(), FileId::generate(), FileId::generate()];

        for (i, id) in ids.iter().enumerate() {
            db.begin_upload(&bucket, *id)
                .unwrap()
                .commit(make_record(&format!("file-{i}"), b"", 4))
                .unwrap();
        }

        let mut listed: Vec<FileId> = db
            .files(&bucket)
            .unwrap()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        let mut expected = ids.to_vec();
        listed.sort();
        expected.sort();
        assert_eq!(listed, expected);
    }

    #[test]
    fn test_buckets_are_isolated() {
        let (db, _temp) = create_test_db();
        let photos = db.bucket("photos").unwrap();
        let docs = db.bucket("docs").unwrap();
        let id = FileId::generate();

        db.begin_upload(&photos, id)
            .unwrap()
            .commit(make_record("cat.png", b"", 4))
            .unwrap();

        assert!(db.file(&photos, &id).unwrap().is_some());
        assert!(db.file(&docs, &id).unwrap().is_none());
        assert!(db.files(&docs).unwrap().is_empty());
    }
}

mod remove {
    use super::common::{create_test_db, make_record};
    use crate::core::db::RemoveOutcome;
    use crate::types::FileId;

    #[test]
    fn test_remove_file_removes_record_and_chunks() {
        let (db, _temp) = create_test_db();
        let bucket = db.bucket("fs").unwrap();
        let id = FileId::generate();

        let mut upload = db.begin_upload(&bucket, id).unwrap();
        upload.push_chunk(b"ab".to_vec()).unwrap();
        upload.push_chunk(b"c".to_vec()).unwrap();
        upload.commit(make_record("abc", b"abc", 2)).unwrap();

        let outcome = db.remove_file(&bucket, &id).unwrap();
        assert_eq!(
            outcome,
            RemoveOutcome {
                file_removed: true,
                chunks_removed: 2,
            }
        );
        assert!(db.file(&bucket, &id).unwrap().is_none());
        assert_eq!(db.chunk_count(&bucket, &id).unwrap(), 0);
    }

    #[test]
    fn test_remove_missing_file_is_noop() {
        let (db, _temp) = create_test_db();
        let bucket = db.bucket("fs").unwrap();

        let outcome = db.remove_file(&bucket, &FileId::generate()).unwrap();
        assert_eq!(outcome, RemoveOutcome::default());
    }

    #[test]
    fn test_remove_leaves_other_files() {
        let (db, _temp) = create_test_db();
        let bucket = db.bucket("fs").unwrap();
        let keep = FileId::generate();
        let removed = FileId::generate();

        for id in [keep, removed] {
            let mut upload = db.begin_upload(&bucket, id).unwrap();
            upload.push_chunk(b"xy".to_vec()).unwrap();
            upload.commit(make_record("xy", b"xy", 2)).unwrap();
        }

        db.remove_file(&bucket, &removed).unwrap();

        assert!(db.file(&bucket, &keep).unwrap().is_some());
        assert_eq!(db.chunk_count(&bucket, &keep).unwrap(), 1);
    }
}

mod maintenance {
    use super::common::{create_test_db, make_record};
    use crate::types::{ChunkKey, FileId};
    use redb::ReadableDatabase;

    #[test]
    fn test_remove_orphaned_chunks() {
        let (db, _temp) = create_test_db();
        let bucket = db.bucket("fs").unwrap();
        let kept = FileId::generate();
        let orphan = FileId::generate();

        let mut upload = db.begin_upload(&bucket, kept).unwrap();
        upload.push_chunk(b"kept".to_vec()).unwrap();
        upload.commit(make_record("kept", b"kept", 4)).unwrap();

        // Chunks written without a record, as a non-transactional writer would leave them
        let write_txn = db.db.begin_write().unwrap();
        for sequence in 0..3 {
            bucket
                .chunks
                .insert(&write_txn, &ChunkKey::new(orphan, sequence), vec![1, 2])
                .unwrap();
        }
        write_txn.commit().unwrap();

        let removed = db.remove_orphaned_chunks(&bucket).unwrap();
        assert_eq!(removed, vec![(orphan, 3)]);
        assert_eq!(db.chunk_count(&bucket, &orphan).unwrap(), 0);
        assert_eq!(db.chunk_count(&bucket, &kept).unwrap(), 1);

        // Reading back through a fresh snapshot still sees the kept file
        let read_txn = db.db.begin_read().unwrap();
        assert!(bucket.files.get(&read_txn, &kept).unwrap().is_some());
    }

    #[test]
    fn test_remove_orphaned_chunks_without_orphans() {
        let (db, _temp) = create_test_db();
        let bucket = db.bucket("fs").unwrap();

        assert!(db.remove_orphaned_chunks(&bucket).unwrap().is_empty());
    }
}
