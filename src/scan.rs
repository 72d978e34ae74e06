use crate::model::ParseResult;
use crate::routes::RouteParser;
use crate::util;
use anyhow::{Context, Result, bail};
use blake3::Hasher;
use ignore::WalkBuilder;
use serde::Serialize;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

const GO_EXTENSION: &str = "go";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Path relative to the root it was found under, `/`-separated.
    pub display_path: String,
    pub abs_path: PathBuf,
    /// blake3 of the contents at scan time.
    pub hash: String,
    pub size: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    pub no_ignore: bool,
    pub max_file_bytes: u64,
}

impl ScanOptions {
    pub fn new(no_ignore: bool, max_file_bytes: u64) -> Self {
        Self {
            no_ignore,
            max_file_bytes,
        }
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            no_ignore: false,
            max_file_bytes: crate::config::Config::default().max_file_bytes,
        }
    }
}

/// Routes found in one file.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct FileRoutes {
    pub path: String,
    #[serde(skip)]
    pub abs_path: PathBuf,
    #[serde(skip)]
    pub hash: String,
    /// Text the result was parsed from, for mapping offsets to positions.
    #[serde(skip)]
    pub source: String,
    #[serde(flatten)]
    pub result: ParseResult,
}

pub fn is_go_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(GO_EXTENSION))
}

/// Collect Go files from a mix of file and directory roots.
pub fn scan_paths(roots: &[PathBuf], options: ScanOptions) -> Result<Vec<ScannedFile>> {
    let mut files = Vec::new();
    for root in roots {
        if root.is_file() {
            if let Some(file) = scan_path(root, root, options)? {
                files.push(file);
            }
        } else if root.is_dir() {
            files.extend(scan_dir(root, options)?);
        } else {
            bail!("no such file or directory: {}", root.display());
        }
    }
    // Overlapping roots reach the same file through different spellings.
    let mut seen = HashSet::new();
    files.retain(|file| {
        let key = fs::canonicalize(&file.abs_path).unwrap_or_else(|_| file.abs_path.clone());
        seen.insert(key)
    });
    files.sort_by(|a, b| a.display_path.cmp(&b.display_path));
    Ok(files)
}

fn scan_dir(root: &Path, options: ScanOptions) -> Result<Vec<ScannedFile>> {
    let mut files = Vec::new();
    let mut builder = WalkBuilder::new(root);
    if options.no_ignore {
        builder
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .parents(false);
    } else {
        builder
            .ignore(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .parents(true)
            .require_git(false);
    }
    let walker = builder
        .hidden(false)
        .filter_entry(|entry| !is_ignored_entry(entry))
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("walk error: {err}");
                continue;
            }
        };
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }
        if let Some(file) = scan_path(root, entry.path(), options)? {
            files.push(file);
        }
    }
    Ok(files)
}

fn is_ignored_entry(entry: &ignore::DirEntry) -> bool {
    entry.file_name() == OsStr::new(".git")
}

/// Stat and hash one candidate file; `None` when it is not a Go file or is
/// over the size limit.
pub fn scan_path(root: &Path, path: &Path, options: ScanOptions) -> Result<Option<ScannedFile>> {
    if !path.is_file() || !is_go_file(path) {
        return Ok(None);
    }
    let metadata = fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
    let size = metadata.len();
    if size > options.max_file_bytes {
        tracing::warn!(
            path = %path.display(),
            size,
            limit = options.max_file_bytes,
            "skipping file over size limit"
        );
        return Ok(None);
    }
    let hash = hash_file(path).with_context(|| format!("hash {}", path.display()))?;
    Ok(Some(ScannedFile {
        display_path: util::display_path(root, path),
        abs_path: path.to_path_buf(),
        hash,
        size,
    }))
}

/// Read and parse one scanned file.
pub fn scan_file(file: &ScannedFile, parser: &mut RouteParser) -> Result<FileRoutes> {
    let source = util::read_to_string(&file.abs_path)?;
    let result = parser.parse(&source);
    Ok(FileRoutes {
        path: file.display_path.clone(),
        abs_path: file.abs_path.clone(),
        hash: hash_str(&source),
        source,
        result,
    })
}

/// Parse every scanned file, keeping only files that register routes.
pub fn collect_routes(files: &[ScannedFile], parser: &mut RouteParser) -> Vec<FileRoutes> {
    let mut reports = Vec::new();
    for file in files {
        match scan_file(file, parser) {
            Ok(report) if !report.result.routes.is_empty() => reports.push(report),
            Ok(_) => {}
            Err(err) => tracing::warn!("skipping {}: {err:#}", file.display_path),
        }
    }
    reports
}

fn hash_file(path: &Path) -> Result<String> {
    let data = fs::read(path)?;
    let mut hasher = Hasher::new();
    hasher.update(&data);
    Ok(hasher.finalize().to_hex().to_string())
}

pub fn hash_str(source: &str) -> String {
    blake3::hash(source.as_bytes()).to_hex().to_string()
}
