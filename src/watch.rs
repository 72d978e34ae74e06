use crate::cache::RouteCache;
use crate::routes::{ParserOptions, RouteParser};
use crate::scan::{self, FileRoutes, ScanOptions};
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::BTreeSet;
use std::fs;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

const IDLE_POLL: Duration = Duration::from_millis(200);

#[derive(Clone, Copy, Debug)]
pub struct WatchConfig {
    pub debounce: Duration,
    pub scan_options: ScanOptions,
    pub parser_options: ParserOptions,
}

impl WatchConfig {
    pub fn new(debounce_ms: u64, scan_options: ScanOptions, parser_options: ParserOptions) -> Self {
        Self {
            debounce: Duration::from_millis(debounce_ms.max(1)),
            scan_options,
            parser_options,
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        let config = crate::config::Config::default();
        Self::new(
            config.watch_debounce_ms,
            ScanOptions::default(),
            ParserOptions::default(),
        )
    }
}

/// Scan `roots`, hand the report to `on_update`, then keep re-parsing
/// changed Go files until `on_update` breaks or the watcher goes away.
///
/// `on_update` sees the full set of files that currently register routes,
/// and is only called again when that set changes.
pub fn run<F>(roots: &[PathBuf], config: WatchConfig, mut on_update: F) -> Result<()>
where
    F: FnMut(&[FileRoutes]) -> ControlFlow<()>,
{
    // Event paths are absolute, so cache keys must be too.
    let roots = roots
        .iter()
        .map(|root| fs::canonicalize(root).with_context(|| format!("resolve {}", root.display())))
        .collect::<Result<Vec<_>>>()?;
    let mut parser = RouteParser::new(config.parser_options);
    let mut cache = RouteCache::new();
    refresh_all(&roots, &config, &mut cache, &mut parser)?;
    if on_update(&cache.reports()).is_break() {
        return Ok(());
    }

    let (_watcher, event_rx) = start_watcher(&roots)?;
    tracing::info!(roots = roots.len(), "watching for changes");

    let mut pending = PendingChanges::default();
    let mut last_event = Instant::now();
    loop {
        let timeout = if pending.is_empty() {
            IDLE_POLL
        } else {
            config.debounce
        };
        match event_rx.recv_timeout(timeout) {
            Ok(Ok(event)) => {
                if pending.record(&event) {
                    tracing::trace!(kind = ?event.kind, paths = ?event.paths, "change event");
                    last_event = Instant::now();
                }
            }
            Ok(Err(err)) => tracing::warn!("watch error: {err}"),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                tracing::info!("watcher disconnected, stopping");
                return Ok(());
            }
        }

        if !pending.is_empty() && last_event.elapsed() >= config.debounce {
            let changes = std::mem::take(&mut pending);
            match apply_changes(changes, &roots, &config, &mut cache, &mut parser) {
                Ok(true) => {
                    if on_update(&cache.reports()).is_break() {
                        return Ok(());
                    }
                }
                Ok(false) => tracing::debug!("no route changes"),
                Err(err) => tracing::warn!("watch refresh failed: {err:#}"),
            }
        }
    }
}

/// Go files touched since the last flush, or a request to re-walk everything.
#[derive(Debug, Default)]
struct PendingChanges {
    paths: BTreeSet<PathBuf>,
    rescan: bool,
}

impl PendingChanges {
    fn is_empty(&self) -> bool {
        !self.rescan && self.paths.is_empty()
    }

    /// Queue the parts of `event` that can affect routes; returns whether
    /// anything was queued.
    fn record(&mut self, event: &Event) -> bool {
        if event.need_rescan() {
            self.rescan = true;
            return true;
        }
        if is_noise_event(event) {
            return false;
        }
        let mut queued = false;
        for path in &event.paths {
            if path.components().any(|part| part.as_os_str() == ".git") {
                continue;
            }
            if scan::is_go_file(path) {
                self.paths.insert(path.clone());
                queued = true;
            } else if path.extension().is_none() {
                // Directory events carry no extension; renames and removals of
                // a directory can take Go files with them.
                self.rescan = true;
                queued = true;
            }
        }
        queued
    }
}

/// Re-parse the queued files. Falls back to a full walk when asked to, or
/// when a file is new to the cache, since only the walk applies ignore rules.
fn apply_changes(
    changes: PendingChanges,
    roots: &[PathBuf],
    config: &WatchConfig,
    cache: &mut RouteCache,
    parser: &mut RouteParser,
) -> Result<bool> {
    if changes.rescan {
        return refresh_all(roots, config, cache, parser);
    }
    let mut changed = false;
    for path in &changes.paths {
        if !path.is_file() {
            changed |= cache.remove(path);
            continue;
        }
        if cache.get(path).is_none() {
            tracing::debug!(path = %path.display(), "new file, rescanning roots");
            return refresh_all(roots, config, cache, parser).map(|rescanned| rescanned || changed);
        }
        let Some(root) = roots.iter().find(|root| path.starts_with(root)) else {
            changed |= cache.remove(path);
            continue;
        };
        match scan::scan_path(root, path, config.scan_options) {
            Ok(Some(file)) => match cache.refresh(&file, parser) {
                Ok(updated) => changed |= updated,
                Err(err) => {
                    tracing::warn!("skipping {}: {err:#}", file.display_path);
                    changed |= cache.remove(path);
                }
            },
            Ok(None) => changed |= cache.remove(path),
            Err(err) => {
                tracing::warn!("skipping {}: {err:#}", path.display());
                changed |= cache.remove(path);
            }
        }
    }
    Ok(changed)
}

/// Re-scan the roots and re-parse files whose stamp moved. Returns whether
/// any file's routes changed.
fn refresh_all(
    roots: &[PathBuf],
    config: &WatchConfig,
    cache: &mut RouteCache,
    parser: &mut RouteParser,
) -> Result<bool> {
    let files = scan::scan_paths(roots, config.scan_options)?;
    let mut changed = false;
    for file in &files {
        match cache.refresh(file, parser) {
            Ok(updated) => changed |= updated,
            Err(err) => {
                tracing::warn!("skipping {}: {err:#}", file.display_path);
                changed |= cache.remove(&file.abs_path);
            }
        }
    }
    let present: Vec<PathBuf> = files.into_iter().map(|file| file.abs_path).collect();
    changed |= cache.retain_paths(&present);
    Ok(changed)
}

fn start_watcher(roots: &[PathBuf]) -> Result<(RecommendedWatcher, Receiver<notify::Result<Event>>)> {
    let (event_tx, event_rx) = mpsc::channel();
    let handler = move |res| {
        let _ = event_tx.send(res);
    };
    let mut watcher = notify::recommended_watcher(handler).context("create file watcher")?;
    for root in roots {
        let mode = if root.is_dir() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher
            .watch(root, mode)
            .with_context(|| format!("watch {}", root.display()))?;
    }
    Ok((watcher, event_rx))
}

fn is_noise_event(event: &Event) -> bool {
    matches!(event.kind, EventKind::Access(_))
}
