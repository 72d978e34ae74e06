use crate::routes::RouteParser;
use crate::scan::{self, FileRoutes, ScannedFile};
use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Parsed routes per file, keyed by absolute path and stamped with the
/// blake3 hash of the contents they were parsed from.
#[derive(Debug, Default)]
pub struct RouteCache {
    entries: HashMap<PathBuf, FileRoutes>,
}

impl RouteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &Path) -> Option<&FileRoutes> {
        self.entries.get(path)
    }

    /// Re-parse `file` unless the cached stamp matches. Returns whether the
    /// cached routes changed.
    pub fn refresh(&mut self, file: &ScannedFile, parser: &mut RouteParser) -> Result<bool> {
        if let Some(cached) = self.entries.get(&file.abs_path)
            && cached.hash == file.hash
        {
            return Ok(false);
        }
        let report = scan::scan_file(file, parser)?;
        let changed = self
            .entries
            .get(&file.abs_path)
            .is_none_or(|cached| cached.result != report.result || cached.path != report.path);
        tracing::debug!(
            path = %file.display_path,
            routes = report.result.routes.len(),
            changed,
            "refreshed file"
        );
        self.entries.insert(file.abs_path.clone(), report);
        Ok(changed)
    }

    pub fn remove(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    /// Keep only the given paths; returns whether anything was dropped.
    pub fn retain_paths(&mut self, keep: &[PathBuf]) -> bool {
        let before = self.entries.len();
        self.entries.retain(|path, _| keep.contains(path));
        before != self.entries.len()
    }

    /// Files that register at least one route, ordered by display path.
    pub fn reports(&self) -> Vec<FileRoutes> {
        let mut reports: Vec<FileRoutes> = self
            .entries
            .values()
            .filter(|report| !report.result.routes.is_empty())
            .cloned()
            .collect();
        reports.sort_by(|a, b| a.path.cmp(&b.path));
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{ScanOptions, scan_path};
    use std::fs;

    fn scanned(root: &Path, path: &Path) -> ScannedFile {
        scan_path(root, path, ScanOptions::default()).unwrap().unwrap()
    }

    #[test]
    fn reparses_only_when_contents_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.go");
        fs::write(&path, "package main\n\nfunc main() {\n\te.GET(\"/a\", h)\n}\n").unwrap();

        let mut cache = RouteCache::new();
        let mut parser = RouteParser::default();
        assert!(cache.refresh(&scanned(dir.path(), &path), &mut parser).unwrap());
        assert!(!cache.refresh(&scanned(dir.path(), &path), &mut parser).unwrap());

        // A trailing comment changes the stamp but not the routes.
        fs::write(&path, "package main\n\nfunc main() {\n\te.GET(\"/a\", h)\n}\n// done\n").unwrap();
        assert!(!cache.refresh(&scanned(dir.path(), &path), &mut parser).unwrap());

        fs::write(&path, "package main\n\nfunc main() {\n\te.GET(\"/b\", h)\n}\n").unwrap();
        assert!(cache.refresh(&scanned(dir.path(), &path), &mut parser).unwrap());
        let reports = cache.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].path, "routes.go");
        assert_eq!(reports[0].result.routes[0].path, "/b");
    }

    #[test]
    fn files_without_routes_are_not_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.go");
        fs::write(&path, "package main\n").unwrap();

        let mut cache = RouteCache::new();
        let mut parser = RouteParser::default();
        cache.refresh(&scanned(dir.path(), &path), &mut parser).unwrap();
        assert_eq!(cache.len(), 1);
        assert!(cache.reports().is_empty());
        assert!(cache.remove(&path));
        assert!(cache.is_empty());
    }
}
