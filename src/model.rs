use crate::routes::http;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// HTTP verbs recognised as route registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Head,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
    ];

    /// Exact, case-sensitive match against the selector name (`GET`, not `Get`).
    pub fn from_selector(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|method| method.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical group declaration: the first declaration that produced `prefix`.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Group {
    pub variable: String,
    pub prefix: String,
    pub offset: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Route {
    pub receiver: String,
    pub group_prefix: String,
    pub method: HttpMethod,
    /// The route's own path, normalized but not joined with `group_prefix`.
    pub path: String,
    pub offset: usize,
}

impl Route {
    /// Absolute endpoint path: the group prefix joined with the route path.
    pub fn full_path(&self) -> String {
        http::join_paths(&self.group_prefix, &self.path)
    }
}

#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
pub struct ParseResult {
    pub groups_by_prefix: IndexMap<String, Group>,
    pub routes: Vec<Route>,
}

impl ParseResult {
    pub fn is_empty(&self) -> bool {
        self.groups_by_prefix.is_empty() && self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_match_is_case_sensitive() {
        assert_eq!(HttpMethod::from_selector("GET"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::from_selector("HEAD"), Some(HttpMethod::Head));
        assert_eq!(HttpMethod::from_selector("Get"), None);
        assert_eq!(HttpMethod::from_selector("ANY"), None);
        assert_eq!(HttpMethod::from_selector("Group"), None);
    }

    #[test]
    fn full_path_joins_prefix_and_path() {
        let route = Route {
            receiver: "v1".to_string(),
            group_prefix: "/api/v1".to_string(),
            method: HttpMethod::Post,
            path: "/info".to_string(),
            offset: 0,
        };
        assert_eq!(route.full_path(), "/api/v1/info");

        let root = Route {
            group_prefix: "/".to_string(),
            ..route
        };
        assert_eq!(root.full_path(), "/info");
    }

    #[test]
    fn method_serializes_as_token() {
        let value = serde_json::to_value(HttpMethod::Options).unwrap();
        assert_eq!(value, serde_json::json!("OPTIONS"));
    }
}
