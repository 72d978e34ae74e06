use crate::model::HttpMethod;
use crate::routes::expr::{Expr, literal_len};
use crate::routes::extract::{DeclarationExtractor, Declarations, RawGroupDecl, RawRouteDecl};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static SHORT_VAR_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\w+(?:[ \t]*,[ \t]*\w+)*)[ \t]*:=").expect("short var declaration pattern")
});

static GROUP_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)\s*\.\s*Group\s*\(").expect("group call pattern"));

static ROUTE_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\w+)\.(GET|POST|PUT|PATCH|DELETE|OPTIONS|HEAD)\s*\(")
        .expect("route call pattern")
});

/// Trailing characters that continue a statement onto the next line.
const CONTINUATION: &[u8] = b",+-*/%&|^<>=!.:";

/// Text-only extractor for when no syntax tree is available.
///
/// Produces the same declaration shapes as the structural extractor, but
/// also reports matches that sit inside comments or string literals.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexicalExtractor;

impl LexicalExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl DeclarationExtractor for LexicalExtractor {
    fn extract(&mut self, source: &str) -> Declarations {
        Declarations {
            groups: group_decls(source),
            routes: route_decls(source),
        }
    }
}

fn group_decls(source: &str) -> Vec<RawGroupDecl> {
    let mut groups = Vec::new();
    for caps in SHORT_VAR_DECL.captures_iter(source) {
        let (Some(whole), Some(names)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Some(values) = scan_list(source, whole.end(), None) else {
            continue;
        };
        for (name, range) in names.as_str().split(',').map(str::trim).zip(values.items) {
            let value = source[range].trim();
            if let Some((parent, expr)) = group_call(value) {
                groups.push(RawGroupDecl {
                    child: name.to_string(),
                    parent,
                    expr,
                    offset: whole.start(),
                });
            }
        }
    }
    groups
}

/// `parent.Group(first, ...)` spanning the whole of `value`.
fn group_call(value: &str) -> Option<(String, Expr)> {
    let caps = GROUP_CALL.captures(value)?;
    let open = caps.get(0)?.end();
    let args = scan_list(value, open, Some(b')'))?;
    if !is_blank_or_comment(&value[args.end + 1..]) {
        return None;
    }
    let first = args.items.into_iter().next()?;
    Some((caps[1].to_string(), Expr::parse(&value[first])))
}

fn is_blank_or_comment(text: &str) -> bool {
    let rest = text.trim_start();
    if rest.is_empty() || rest.starts_with("//") {
        return true;
    }
    match rest.strip_prefix("/*").and_then(|body| body.split_once("*/")) {
        Some((_, after)) => is_blank_or_comment(after),
        None => false,
    }
}

fn route_decls(source: &str) -> Vec<RawRouteDecl> {
    let mut routes = Vec::new();
    for caps in ROUTE_CALL.captures_iter(source) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        // `a.b.GET(...)` has a compound receiver.
        if source[..whole.start()].ends_with('.') {
            continue;
        }
        let Some(method) = HttpMethod::from_selector(&caps[2]) else {
            continue;
        };
        let Some(args) = scan_list(source, whole.end(), Some(b')')) else {
            continue;
        };
        let Some(first) = args.items.into_iter().next() else {
            continue;
        };
        routes.push(RawRouteDecl {
            receiver: caps[1].to_string(),
            method,
            expr: Expr::parse(&source[first]),
            offset: whole.start(),
        });
    }
    routes
}

#[derive(Debug)]
struct ListScan {
    items: Vec<Range<usize>>,
    /// Index of the closing bracket, or of the end of the statement.
    end: usize,
}

/// Split a comma-separated list beginning at `start`.
///
/// With `closing` set, the list ends at the matching bracket and `None` is
/// returned if it never closes. Without it, the list ends where the statement
/// does: a top-level `;`, an unbalanced closing bracket, or a newline that
/// does not follow a continuation character.
fn scan_list(text: &str, start: usize, closing: Option<u8>) -> Option<ListScan> {
    let bytes = text.as_bytes();
    let mut items = Vec::new();
    let mut item_start = start;
    let mut depth = 0usize;
    let mut last_significant: Option<u8> = None;
    let mut idx = start;

    let finish = |mut items: Vec<Range<usize>>, item: Range<usize>, end: usize| {
        items.push(item);
        items.retain(|range: &Range<usize>| !text[range.clone()].trim().is_empty());
        Some(ListScan { items, end })
    };

    while idx < bytes.len() {
        let byte = bytes[idx];
        match byte {
            b'"' | b'`' | b'\'' => {
                idx += literal_len(&text[idx..])?;
                last_significant = Some(byte);
                continue;
            }
            b'/' if bytes.get(idx + 1) == Some(&b'/') => {
                idx = text[idx..].find('\n').map_or(bytes.len(), |pos| idx + pos);
                continue;
            }
            b'/' if bytes.get(idx + 1) == Some(&b'*') => {
                idx += text[idx + 2..].find("*/")? + 4;
                continue;
            }
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' if depth == 0 => {
                return match closing {
                    Some(expected) if expected == byte => finish(items, item_start..idx, idx),
                    Some(_) => None,
                    None => finish(items, item_start..idx, idx),
                };
            }
            b')' | b']' | b'}' => depth -= 1,
            b',' if depth == 0 => {
                items.push(item_start..idx);
                item_start = idx + 1;
            }
            b';' if depth == 0 && closing.is_none() => {
                return finish(items, item_start..idx, idx);
            }
            b'\n' if depth == 0 && closing.is_none() => {
                let continues = last_significant.is_some_and(|last| CONTINUATION.contains(&last));
                if !continues {
                    return finish(items, item_start..idx, idx);
                }
            }
            _ => {}
        }
        if !byte.is_ascii_whitespace() {
            last_significant = Some(byte);
        }
        idx += 1;
    }

    match closing {
        Some(_) => None,
        None => finish(items, item_start..bytes.len(), bytes.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::expr::evaluate;

    #[test]
    fn scans_statement_lists() {
        let text = r#"e.Group("/a", mw(1, 2)), e.Group(`/b`) // trailing
next := 1"#;
        let scan = scan_list(text, 0, None).unwrap();
        let items: Vec<_> = scan.items.iter().map(|r| text[r.clone()].trim()).collect();
        assert_eq!(items, vec![r#"e.Group("/a", mw(1, 2))"#, "e.Group(`/b`) // trailing"]);
        assert_eq!(&text[scan.end..scan.end + 1], "\n");

        let (parent, expr) = group_call(items[1]).unwrap();
        assert_eq!(parent, "e");
        assert_eq!(evaluate(&expr).as_deref(), Some("/b"));
    }

    #[test]
    fn scan_continues_after_operators() {
        let text = "\"/a\" +\n\t\"/b\"\nrest";
        let scan = scan_list(text, 0, None).unwrap();
        assert_eq!(scan.items.len(), 1);
        assert_eq!(evaluate(&Expr::parse(&text[scan.items[0].clone()])).as_deref(), Some("/a/b"));
    }

    #[test]
    fn scan_argument_list_handles_quoted_brackets() {
        let text = r#""/a)", h, ')')tail"#;
        let scan = scan_list(text, 0, Some(b')')).unwrap();
        assert_eq!(scan.items.len(), 3);
        assert_eq!(&text[scan.end..], ")tail");
        assert!(scan_list(r#""/open", h"#, 0, Some(b')')).is_none());
    }

    #[test]
    fn extracts_multi_assignment_and_rejects_chains() {
        let source = r#"
	a, b := e.Group("/a"), root.Group("/b", auth)
	c := e.Group("/c").Use(mw)
	if d := e.Group("/d"); d != nil {
	}
"#;
        let groups = group_decls(source);
        let got: Vec<_> = groups
            .iter()
            .map(|g| (g.child.as_str(), g.parent.as_str(), evaluate(&g.expr).unwrap()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("a", "e", "/a".to_string()),
                ("b", "root", "/b".to_string()),
                ("d", "e", "/d".to_string()),
            ]
        );
        assert_eq!(groups[0].offset, source.find("a, b").unwrap());
    }

    #[test]
    fn route_receivers_must_be_bare() {
        let source = r#"
	s.api.GET("/qualified", h)
	api.POST("/kept", h)
	api.Patch("/lowercase", h)
	api.OPTIONS()
"#;
        let routes = route_decls(source);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].receiver, "api");
        assert_eq!(routes[0].method, HttpMethod::Post);
        assert_eq!(routes[0].offset, source.find("api.POST").unwrap());
    }
}
