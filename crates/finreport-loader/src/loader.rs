//! Report definition loading with a modification-time cache.

use crate::error::LoadError;
use finreport_core::ReportDefinition;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, trace};

#[derive(Debug)]
struct CacheEntry {
    modified: Option<SystemTime>,
    report: Arc<ReportDefinition>,
}

/// Loads report definitions from JSON files.
///
/// Parsed definitions are cached per canonical path and reused until the
/// file's modification time changes.
#[derive(Debug, Default)]
pub struct ReportLoader {
    cache: HashMap<PathBuf, CacheEntry>,
    validate: bool,
}

impl ReportLoader {
    /// Create a loader that does not validate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the full report validator on every freshly read definition.
    ///
    /// Definitions with errors fail with [`LoadError::Invalid`]; warnings are ignored.
    #[must_use]
    pub const fn with_validation(mut self, enabled: bool) -> Self {
        self.validate = enabled;
        self
    }

    /// Load a report definition.
    ///
    /// # Errors
    ///
    /// - [`LoadError::Io`] - the file cannot be read
    /// - [`LoadError::Json`] - the file is not a report definition
    /// - [`LoadError::Invalid`] - validation is enabled and the definition has errors
    pub fn load(&mut self, path: &Path) -> Result<Arc<ReportDefinition>, LoadError> {
        let canonical = path.canonicalize().map_err(|error| LoadError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        let modified = fs::metadata(&canonical)
            .map_err(|error| LoadError::Io {
                path: canonical.clone(),
                error,
            })?
            .modified()
            .ok();

        if let Some(entry) = self.cache.get(&canonical) {
            if modified.is_some() && entry.modified == modified {
                trace!(path = %canonical.display(), "report cache hit");
                return Ok(Arc::clone(&entry.report));
            }
        }

        let report = Arc::new(self.read(&canonical)?);
        debug!(
            path = %canonical.display(),
            report_id = %report.report_id,
            "loaded report definition"
        );
        self.cache.insert(
            canonical,
            CacheEntry {
                modified,
                report: Arc::clone(&report),
            },
        );
        Ok(report)
    }

    fn read(&self, path: &Path) -> Result<ReportDefinition, LoadError> {
        let source = fs::read_to_string(path).map_err(|error| LoadError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        let report = ReportDefinition::from_json(&source).map_err(|error| LoadError::Json {
            path: path.to_path_buf(),
            error,
        })?;

        if self.validate {
            let result = finreport_validate::validate(&report);
            if !result.is_valid() {
                return Err(LoadError::Invalid {
                    path: path.to_path_buf(),
                    diagnostics: result.errors,
                });
            }
        }
        Ok(report)
    }

    /// Load every `*.json` file in `dir`, in file-name order.
    ///
    /// Stops at the first file that fails to load.
    pub fn load_dir(&mut self, dir: &Path) -> Result<Vec<Arc<ReportDefinition>>, LoadError> {
        let io_error = |error| LoadError::Io {
            path: dir.to_path_buf(),
            error,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        paths.iter().map(|path| self.load(path)).collect()
    }

    /// Drop the cached definition for `path`. Returns whether one was cached.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.cache.remove(&key).is_some()
    }

    /// Drop every cached definition.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Number of cached definitions.
    #[must_use]
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;

    const INCOME: &str = r#"{
        "reportId": "income",
        "name": "Income",
        "version": "1.0.0",
        "statementType": "income",
        "layout": [{ "order": 10, "type": "spacer" }]
    }"#;

    fn touch(path: &Path, seconds: u64) {
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(seconds))
            .unwrap();
    }

    #[test]
    fn test_cache_hit_returns_same_arc() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("income.json");
        fs::write(&path, INCOME).unwrap();

        let mut loader = ReportLoader::new();
        let first = loader.load(&path).unwrap();
        let second = loader.load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.cache_size(), 1);
    }

    #[test]
    fn test_changed_mtime_rereads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("income.json");
        fs::write(&path, INCOME).unwrap();
        touch(&path, 1_000);

        let mut loader = ReportLoader::new();
        let first = loader.load(&path).unwrap();

        fs::write(&path, INCOME.replace("\"Income\"", "\"Renamed\"")).unwrap();
        touch(&path, 2_000);

        let second = loader.load(&path).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.name, "Renamed");
        assert_eq!(loader.cache_size(), 1);
    }

    #[test]
    fn test_invalidate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("income.json");
        fs::write(&path, INCOME).unwrap();

        let mut loader = ReportLoader::new();
        loader.load(&path).unwrap();
        assert!(loader.invalidate(&path));
        assert!(!loader.invalidate(&path));
        assert_eq!(loader.cache_size(), 0);
    }

    #[test]
    fn test_missing_file() {
        let err = ReportLoader::new()
            .load(Path::new("/nonexistent/report.json"))
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
