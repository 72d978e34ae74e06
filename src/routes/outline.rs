use crate::model::{ParseResult, Route};
use serde::Serialize;
use std::collections::HashMap;

/// Routes sharing one group prefix, as shown in a navigation tree.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct GroupNode {
    pub prefix: String,
    /// Where to jump for the group itself: its declaration if one is known,
    /// else its first route.
    pub offset: usize,
    pub routes: Vec<Route>,
}

/// Group routes by prefix, ordering groups by the earliest offset known for
/// each prefix. Prefixes without routes are left out.
pub fn build_outline(result: &ParseResult) -> Vec<GroupNode> {
    let mut nodes: Vec<GroupNode> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for route in &result.routes {
        let slot = *index.entry(route.group_prefix.as_str()).or_insert_with(|| {
            nodes.push(GroupNode {
                prefix: route.group_prefix.clone(),
                offset: route.offset,
                routes: Vec::new(),
            });
            nodes.len() - 1
        });
        nodes[slot].routes.push(route.clone());
    }

    let mut keyed: Vec<(usize, GroupNode)> = nodes
        .into_iter()
        .map(|mut node| {
            // Routes arrive in source order, so the node offset is the first route's.
            let first_route = node.offset;
            let first_seen = match result.groups_by_prefix.get(&node.prefix) {
                Some(group) => {
                    node.offset = group.offset;
                    group.offset.min(first_route)
                }
                None => first_route,
            };
            (first_seen, node)
        })
        .collect();
    keyed.sort_by_key(|(first_seen, _)| *first_seen);
    keyed.into_iter().map(|(_, node)| node).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Group, HttpMethod};

    fn route(prefix: &str, path: &str, offset: usize) -> Route {
        Route {
            receiver: "g".to_string(),
            group_prefix: prefix.to_string(),
            method: HttpMethod::Get,
            path: path.to_string(),
            offset,
        }
    }

    #[test]
    fn groups_routes_and_orders_by_first_offset() {
        let mut result = ParseResult::default();
        result.groups_by_prefix.insert(
            "/admin".to_string(),
            Group {
                variable: "admin".to_string(),
                prefix: "/admin".to_string(),
                offset: 5,
            },
        );
        result.groups_by_prefix.insert(
            "/unused".to_string(),
            Group {
                variable: "unused".to_string(),
                prefix: "/unused".to_string(),
                offset: 1,
            },
        );
        result.routes = vec![
            route("/", "/health", 20),
            route("/admin", "/users", 40),
            route("/", "/ready", 60),
        ];

        let outline = build_outline(&result);
        let prefixes: Vec<_> = outline.iter().map(|n| n.prefix.as_str()).collect();
        assert_eq!(prefixes, vec!["/admin", "/"]);
        assert_eq!(outline[0].offset, 5);
        assert_eq!(outline[1].offset, 20);
        assert_eq!(outline[1].routes.len(), 2);
        assert_eq!(outline[1].routes[1].path, "/ready");
    }

    #[test]
    fn empty_result_has_empty_outline() {
        assert!(build_outline(&ParseResult::default()).is_empty());
    }
}
