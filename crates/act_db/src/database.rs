use std::path::{Path, PathBuf};
use std::sync::Arc;

use act_types::{CoreError, FunctionInfo, ModuleMapper, NullModuleMapper, NullSink, ProgressSink};
use rustc_hash::FxHashMap;
use walkdir::WalkDir;

use crate::cache;
use crate::smart_select::select;

/// Embedded in the cache so mixed parser identities never share a cache
/// (§6: "Implementations MUST embed their parser identifier so mixed runs
/// cannot reuse caches").
pub const PARSER_IDENTIFIER: &str = "act_parser/hybrid-regex-v1";

/// Snapshot returned by [`FunctionDatabase::statistics`] (§4.2.6).
#[derive(Debug, Clone, Default)]
pub struct DatabaseStatistics {
    pub total_functions: usize,
    pub static_functions: usize,
    pub rte_functions: usize,
    pub autosar_functions: usize,
    pub module_counts: FxHashMap<String, usize>,
    pub parse_errors: Vec<String>,
    pub parser_identifier: String,
}

/// Indexes every [`FunctionInfo`] produced by the parser across a source
/// tree. Three parallel indexes are kept in sync (invariant D1); records are
/// reference-counted so the builder can hold them without copying.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct FunctionDatabase {
    pub(crate) by_name: FxHashMap<String, Vec<Arc<FunctionInfo>>>,
    pub(crate) by_qualified: FxHashMap<String, Arc<FunctionInfo>>,
    pub(crate) by_file: FxHashMap<PathBuf, Vec<Arc<FunctionInfo>>>,
    module_stats: FxHashMap<String, usize>,
    parse_errors: Vec<String>,
    source_root: Option<PathBuf>,
}

impl FunctionDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every record from all three indexes (invariant D1: the only
    /// way to remove is `clear_cache`, and it empties all three together).
    pub fn clear_cache(&mut self) {
        self.by_name.clear();
        self.by_qualified.clear();
        self.by_file.clear();
        self.module_stats.clear();
        self.parse_errors.clear();
        self.source_root = None;
    }

    /// Builds the database from `source_root` (§4.2.2). Only a missing or
    /// non-directory source root is a fatal error; everything else degrades
    /// to a recorded parse error or a cache miss.
    pub fn build(
        &mut self,
        source_root: &Path,
        use_cache: bool,
        rebuild_cache: bool,
    ) -> Result<(), CoreError> {
        self.build_with(source_root, use_cache, rebuild_cache, &NullModuleMapper, &NullSink)
    }

    pub fn build_with(
        &mut self,
        source_root: &Path,
        use_cache: bool,
        rebuild_cache: bool,
        mapper: &dyn ModuleMapper,
        sink: &dyn ProgressSink,
    ) -> Result<(), CoreError> {
        if !source_root.exists() {
            return Err(CoreError::SourceRootNotFound(source_root.to_path_buf()));
        }
        if !source_root.is_dir() {
            return Err(CoreError::SourceRootNotADirectory(source_root.to_path_buf()));
        }

        if use_cache && !rebuild_cache {
            match cache::load(source_root, PARSER_IDENTIFIER) {
                Ok(Some(loaded)) => {
                    *self = loaded;
                    sink.message("loaded function database from cache");
                    return Ok(());
                }
                Ok(None) => {
                    log::debug!("no usable cache at {}, rebuilding", source_root.display());
                }
                Err(e) => {
                    log::debug!("cache load failed, rebuilding: {e}");
                }
            }
        }

        self.clear_cache();
        self.source_root = Some(source_root.to_path_buf());

        let mut files: Vec<PathBuf> = WalkDir::new(source_root)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| entry.path().extension().map(|ext| ext == "c").unwrap_or(false))
            .map(|entry| entry.path().to_path_buf())
            .collect();
        // §5(b): deterministic insertion order independent of the
        // filesystem's own iteration order.
        files.sort();

        for file in &files {
            sink.message(&format!("parsing {}", file.display()));
            if std::fs::metadata(file).is_err() {
                self.parse_errors.push(format!("unreadable file: {}", file.display()));
                continue;
            }
            let functions = act_parser::parse_file(file);
            for mut info in functions {
                info.sw_module = mapper.module_for(&info.file_path);
                self.insert(info);
            }
        }

        if use_cache {
            if let Err(e) = cache::save(self, source_root, PARSER_IDENTIFIER) {
                log::error!("failed to write function database cache: {e}");
            }
        }

        Ok(())
    }

    /// Inserts one parsed function, enforcing invariants I2 and D2.
    pub(crate) fn insert(&mut self, info: FunctionInfo) {
        // I2: (name, line_number) must be unique within one file.
        if let Some(existing) = self.by_file.get(&info.file_path) {
            if existing
                .iter()
                .any(|f| f.name == info.name && f.line_number == info.line_number)
            {
                self.parse_errors.push(format!(
                    "duplicate (name, line) in {}: {} at line {}",
                    info.file_path.display(),
                    info.name,
                    info.line_number
                ));
                return;
            }
        }

        let mut qualified_name = info.qualified_name.clone();
        if self.by_qualified.contains_key(&qualified_name) {
            let suffixed = format!("{}::{}", qualified_name, info.line_number);
            self.parse_errors.push(format!(
                "qualified name collision on {}, suffixing with line number as {}",
                qualified_name, suffixed
            ));
            qualified_name = suffixed;
        }

        if let Some(module) = info.sw_module.clone() {
            *self.module_stats.entry(module).or_insert(0) += 1;
        }

        let record = Arc::new(info);
        self.by_name
            .entry(record.name.clone())
            .or_default()
            .push(record.clone());
        self.by_file
            .entry(record.file_path.clone())
            .or_default()
            .push(record.clone());
        self.by_qualified.insert(qualified_name, record);
    }

    /// Four-level smart selection (§4.2.3).
    pub fn lookup(&self, name: &str, context_file: Option<&Path>) -> Option<Arc<FunctionInfo>> {
        let candidates = self.by_name.get(name)?;
        select(candidates, name, context_file)
    }

    pub fn by_qualified_name(&self, qualified_name: &str) -> Option<Arc<FunctionInfo>> {
        self.by_qualified.get(qualified_name).cloned()
    }

    /// Case-insensitive substring search over function names, sorted.
    pub fn search(&self, pattern: &str) -> Vec<String> {
        let needle = pattern.to_lowercase();
        let mut names: Vec<String> = self
            .by_name
            .keys()
            .filter(|n| n.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn all_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.by_name.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn functions_in_file(&self, file_path: &Path) -> Vec<Arc<FunctionInfo>> {
        self.by_file.get(file_path).cloned().unwrap_or_default()
    }

    pub fn statistics(&self) -> DatabaseStatistics {
        let mut stats = DatabaseStatistics {
            parser_identifier: PARSER_IDENTIFIER.to_string(),
            parse_errors: self.parse_errors.clone(),
            module_counts: self.module_stats.clone(),
            ..Default::default()
        };
        for records in self.by_file.values() {
            for f in records {
                stats.total_functions += 1;
                if f.is_static {
                    stats.static_functions += 1;
                }
                if f.is_rte() {
                    stats.rte_functions += 1;
                }
                if f.function_type.is_autosar() {
                    stats.autosar_functions += 1;
                }
            }
        }
        stats
    }

    pub fn source_root(&self) -> Option<&Path> {
        self.source_root.as_deref()
    }

    pub(crate) fn by_file_count(&self) -> usize {
        self.by_file.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn build_rejects_missing_source_root() {
        let mut db = FunctionDatabase::new();
        let err = db
            .build(Path::new("/definitely/not/a/real/path"), false, false)
            .unwrap_err();
        assert!(matches!(err, CoreError::SourceRootNotFound(_)));
    }

    #[test]
    fn build_rejects_file_as_source_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_file(dir.path(), "not_a_dir.c", "");
        let mut db = FunctionDatabase::new();
        let err = db.build(&file, false, false).unwrap_err();
        assert!(matches!(err, CoreError::SourceRootNotADirectory(_)));
    }

    #[test]
    fn indexes_stay_consistent_across_a_small_tree() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "demo.c",
            "FUNC(void, RTE_CODE) Demo_Init(void)\n{\n  HW_InitHardware();\n}\n",
        );
        write_file(
            dir.path(),
            "hardware.c",
            "FUNC(void, RTE_CODE) HW_InitHardware(void)\n{\n}\n",
        );

        let mut db = FunctionDatabase::new();
        db.build(dir.path(), false, false).unwrap();

        let stats = db.statistics();
        assert_eq!(stats.total_functions, 2);
        assert_eq!(stats.autosar_functions, 2);

        let demo = db.by_qualified_name("demo::Demo_Init").unwrap();
        assert_eq!(demo.name, "Demo_Init");
        assert_eq!(db.functions_in_file(&dir.path().join("demo.c")).len(), 1);
        assert!(db.all_names().contains(&"HW_InitHardware".to_string()));
    }

    #[test]
    fn distinct_file_stems_do_not_spuriously_collide() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "a.c", "FUNC(void, RTE_CODE) Shared_Name(void)\n{\n}\n");
        write_file(dir.path(), "a_alt.c", "FUNC(void, RTE_CODE) Shared_Name(void)\n{\n}\n");
        let mut db = FunctionDatabase::new();
        db.build(dir.path(), false, false).unwrap();
        assert!(db.by_qualified_name("a::Shared_Name").is_some());
        assert!(db.by_qualified_name("a_alt::Shared_Name").is_some());
        assert!(db.statistics().parse_errors.is_empty());
    }

    #[test]
    fn qualified_name_collision_across_same_stem_files_is_suffixed_and_recorded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub1")).unwrap();
        std::fs::create_dir(dir.path().join("sub2")).unwrap();
        write_file(&dir.path().join("sub1"), "demo.c", "FUNC(void, RTE_CODE) Demo_Init(void)\n{\n}\n");
        write_file(&dir.path().join("sub2"), "demo.c", "FUNC(void, RTE_CODE) Demo_Init(void)\n{\n}\n");

        let mut db = FunctionDatabase::new();
        db.build(dir.path(), false, false).unwrap();

        assert!(db.by_qualified_name("demo::Demo_Init").is_some());
        assert!(db.by_qualified_name("demo::Demo_Init::1").is_some());
        assert_eq!(db.statistics().parse_errors.len(), 1);
    }
}
