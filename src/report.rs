use crate::routes::outline::build_outline;
use crate::scan::FileRoutes;
use crate::util::line_col;
use anyhow::Result;
use std::fmt::Write as _;

/// One block per file: the file path, each group prefix in outline order,
/// then the group's routes with absolute paths and 1-based positions.
pub fn render_text(reports: &[FileRoutes]) -> String {
    let mut out = String::new();
    for (idx, report) in reports.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "{}", report.path);
        for node in build_outline(&report.result) {
            let _ = writeln!(out, "  {}", node.prefix);
            for route in &node.routes {
                let (line, col) = line_col(&report.source, route.offset);
                let _ = writeln!(
                    out,
                    "    {:<7} {}  ({line}:{col})",
                    route.method.as_str(),
                    route.full_path()
                );
            }
        }
    }
    out
}

pub fn render_json(reports: &[FileRoutes]) -> Result<String> {
    Ok(serde_json::to_string_pretty(reports)?)
}
