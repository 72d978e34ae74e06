use echoroutes::RouteParser;
use echoroutes::scan::{ScanOptions, collect_routes, scan_file, scan_paths};
use std::fs;
use std::path::Path;

const ROUTES: &str = r#"package main

func main() {
	api := e.Group("/api")
	api.GET("/health", h)
}
"#;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn display_paths(root: &Path, options: ScanOptions) -> Vec<String> {
    scan_paths(&[root.to_path_buf()], options)
        .unwrap()
        .into_iter()
        .map(|file| file.display_path)
        .collect()
}

#[test]
fn walks_go_files_in_order() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "z.go", ROUTES);
    write(dir.path(), "cmd/server/main.go", ROUTES);
    write(dir.path(), "README.md", "api.GET(\"/docs\", h)");
    write(dir.path(), "legacy/OLD.GO", ROUTES);
    write(dir.path(), ".git/hooks/fake.go", ROUTES);

    assert_eq!(
        display_paths(dir.path(), ScanOptions::default()),
        vec!["cmd/server/main.go", "legacy/OLD.GO", "z.go"]
    );
}

#[test]
fn honours_gitignore_unless_disabled() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), ".gitignore", "vendor/\n");
    write(dir.path(), "main.go", ROUTES);
    write(dir.path(), "vendor/lib/routes.go", ROUTES);

    assert_eq!(display_paths(dir.path(), ScanOptions::default()), vec!["main.go"]);
    assert_eq!(
        display_paths(dir.path(), ScanOptions::new(true, 1 << 20)),
        vec!["main.go", "vendor/lib/routes.go"]
    );
}

#[test]
fn skips_files_over_the_size_limit() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "small.go", "package main\n");
    write(dir.path(), "large.go", ROUTES);

    assert_eq!(
        display_paths(dir.path(), ScanOptions::new(false, 20)),
        vec!["small.go"]
    );
}

#[test]
fn accepts_single_files_and_rejects_missing_roots() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "main.go", ROUTES);
    let file = dir.path().join("main.go");

    let files = scan_paths(&[file.clone()], ScanOptions::default()).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].abs_path, file);
    assert_eq!(files[0].hash, blake3::hash(ROUTES.as_bytes()).to_hex().to_string());

    assert!(scan_paths(&[dir.path().join("missing")], ScanOptions::default()).is_err());
}

#[test]
fn reports_only_files_with_routes() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "routes.go", ROUTES);
    write(dir.path(), "model.go", "package main\n\ntype User struct{}\n");

    let files = scan_paths(&[dir.path().to_path_buf()], ScanOptions::default()).unwrap();
    assert_eq!(files.len(), 2);

    let mut parser = RouteParser::default();
    let reports = collect_routes(&files, &mut parser);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].path, "routes.go");
    assert_eq!(reports[0].result.routes[0].full_path(), "/api/health");

    let single = scan_file(&files[1], &mut parser).unwrap();
    assert_eq!(single.path, "routes.go");
    assert_eq!(single.hash, files[1].hash);
}

#[test]
fn overlapping_roots_report_each_file_once() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.go", ROUTES);
    write(dir.path(), "pkg/b.go", ROUTES);
    let file = dir.path().join("a.go");
    let dotted = dir.path().join("pkg").join("..").join("a.go");

    let roots = vec![
        file.clone(),
        dir.path().to_path_buf(),
        dotted,
        dir.path().join("pkg"),
    ];
    let files = scan_paths(&roots, ScanOptions::default()).unwrap();
    assert_eq!(files.len(), 2);
    // The first root to reach a file names it.
    assert!(files.iter().any(|f| f.abs_path == file));
    assert!(files.iter().any(|f| f.display_path == "pkg/b.go"));
}
