use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::FunctionDatabase;

/// Cache metadata header (§4.2.4): identifies what a cache file was built
/// from, so a stale or foreign cache is rejected rather than silently
/// reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheMetadata {
    created_at: DateTime<Utc>,
    source_root: PathBuf,
    file_count: usize,
    parser_identifier: String,
}

#[derive(Serialize, Deserialize)]
struct CachePayload {
    metadata: CacheMetadata,
    database: FunctionDatabase,
}

fn cache_path(source_root: &Path) -> PathBuf {
    let dir = source_root.join(".act_cache");
    dir.join("function_database.bin")
}

/// Loads and validates the cache for `source_root`. Returns `Ok(None)` for
/// any kind of miss (absent file, schema mismatch, stale identity) — never
/// an error the caller must handle specially, matching §4.2.4's "any
/// deserialization error is caught and treated as a miss."
pub fn load(source_root: &Path, parser_identifier: &str) -> io::Result<Option<FunctionDatabase>> {
    let path = cache_path(source_root);
    let bytes = match std::fs::read(&path) {
        Ok(b) => b,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    let payload: CachePayload = match bincode::deserialize(&bytes) {
        Ok(p) => p,
        Err(_) => return Ok(None),
    };

    let canonical_root = source_root
        .canonicalize()
        .unwrap_or_else(|_| source_root.to_path_buf());
    if payload.metadata.source_root != canonical_root {
        return Ok(None);
    }
    if payload.metadata.parser_identifier != parser_identifier {
        return Ok(None);
    }

    Ok(Some(payload.database))
}

/// Writes the cache atomically: a sibling temp file, then a rename
/// (§4.2.4). Directory creation failures, serialization failures, and
/// rename failures are all surfaced to the caller, which treats them as
/// non-fatal ("cache errors MUST NOT crash the build").
pub fn save(db: &FunctionDatabase, source_root: &Path, parser_identifier: &str) -> io::Result<()> {
    let path = cache_path(source_root);
    let dir = path.parent().expect("cache path always has a parent");
    std::fs::create_dir_all(dir)?;

    let canonical_root = source_root
        .canonicalize()
        .unwrap_or_else(|_| source_root.to_path_buf());
    let file_count = db.by_file_count();

    let payload = CachePayload {
        metadata: CacheMetadata {
            created_at: Utc::now(),
            source_root: canonical_root,
            file_count,
            parser_identifier: parser_identifier.to_string(),
        },
        database: db.clone(),
    };

    let encoded = bincode::serialize(&payload)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let tmp_path = dir.join(".function_database.bin.tmp");
    std::fs::write(&tmp_path, &encoded)?;
    std::fs::rename(&tmp_path, &path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use act_types::{FunctionInfo, FunctionType};

    fn sample_db() -> FunctionDatabase {
        let mut db = FunctionDatabase::new();
        db.insert(FunctionInfo::new(
            "Demo_Init",
            PathBuf::from("demo.c"),
            1,
            FunctionType::AutosarFunc,
            "void",
        ));
        db
    }

    #[test]
    fn round_trips_through_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let db = sample_db();
        save(&db, dir.path(), "test-parser-v1").unwrap();

        let loaded = load(dir.path(), "test-parser-v1").unwrap().unwrap();
        assert_eq!(loaded.statistics().total_functions, db.statistics().total_functions);
    }

    #[test]
    fn rejects_cache_with_different_parser_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let db = sample_db();
        save(&db, dir.path(), "test-parser-v1").unwrap();

        let loaded = load(dir.path(), "test-parser-v2").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn missing_cache_file_is_a_plain_miss() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load(dir.path(), "test-parser-v1").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn corrupt_cache_file_is_treated_as_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"not a valid bincode payload at all").unwrap();

        let loaded = load(dir.path(), "test-parser-v1").unwrap();
        assert!(loaded.is_none());
    }
}
