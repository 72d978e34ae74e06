use crate::model::Route;
use crate::routes::expr::evaluate;
use crate::routes::extract::RawRouteDecl;
use crate::routes::http::normalize_path;
use std::collections::HashMap;

const ROOT_PREFIX: &str = "/";

/// Attach each route registration to its receiver's group prefix.
///
/// Routes whose path is not a constant string are dropped. The result is
/// ordered by source offset; equal offsets keep discovery order.
pub fn assemble_routes(decls: &[RawRouteDecl], prefix_by_var: &HashMap<String, String>) -> Vec<Route> {
    let mut routes: Vec<Route> = decls
        .iter()
        .filter_map(|decl| {
            let Some(path) = evaluate(&decl.expr) else {
                tracing::debug!(
                    receiver = %decl.receiver,
                    method = %decl.method,
                    offset = decl.offset,
                    expr = ?decl.expr,
                    "route path is not a constant string, skipping"
                );
                return None;
            };
            let group_prefix = prefix_by_var
                .get(&decl.receiver)
                .filter(|prefix| !prefix.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| ROOT_PREFIX.to_string());
            Some(Route {
                receiver: decl.receiver.clone(),
                group_prefix,
                method: decl.method,
                path: normalize_path(&path),
                offset: decl.offset,
            })
        })
        .collect();
    routes.sort_by_key(|route| route.offset);
    routes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HttpMethod;
    use crate::routes::expr::Expr;

    fn route(receiver: &str, method: HttpMethod, expr: Expr, offset: usize) -> RawRouteDecl {
        RawRouteDecl {
            receiver: receiver.to_string(),
            method,
            expr,
            offset,
        }
    }

    #[test]
    fn orders_by_offset_and_keeps_ties_stable() {
        let decls = vec![
            route("e", HttpMethod::Get, Expr::Str("/c".into()), 300),
            route("e", HttpMethod::Get, Expr::Str("/a".into()), 45),
            route("e", HttpMethod::Post, Expr::Str("/b1".into()), 120),
            route("e", HttpMethod::Put, Expr::Str("/b2".into()), 120),
        ];
        let routes = assemble_routes(&decls, &HashMap::new());
        let order: Vec<_> = routes.iter().map(|r| (r.offset, r.path.as_str())).collect();
        assert_eq!(order, vec![(45, "/a"), (120, "/b1"), (120, "/b2"), (300, "/c")]);
    }

    #[test]
    fn unknown_receivers_fall_back_to_root() {
        let mut prefixes = HashMap::new();
        prefixes.insert("v1".to_string(), "/api/v1".to_string());
        prefixes.insert("blank".to_string(), "  ".to_string());
        let decls = vec![
            route("v1", HttpMethod::Get, Expr::Str("info/".into()), 0),
            route("r", HttpMethod::Delete, Expr::Str("/x".into()), 10),
            route("blank", HttpMethod::Head, Expr::Str("/y".into()), 20),
        ];
        let routes = assemble_routes(&decls, &prefixes);
        assert_eq!(routes[0].group_prefix, "/api/v1");
        assert_eq!(routes[0].path, "/info");
        assert_eq!(routes[0].full_path(), "/api/v1/info");
        assert_eq!(routes[1].group_prefix, "/");
        assert_eq!(routes[2].group_prefix, "/");
    }

    #[test]
    fn unresolved_paths_are_dropped() {
        let decls = vec![
            route("e", HttpMethod::Get, Expr::Opaque("path".into()), 0),
            route(
                "e",
                HttpMethod::Get,
                Expr::concat(Expr::Str("/a".into()), Expr::Opaque("id".into())),
                5,
            ),
            route("e", HttpMethod::Get, Expr::Str("/kept".into()), 9),
        ];
        let routes = assemble_routes(&decls, &HashMap::new());
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].path, "/kept");
    }
}
