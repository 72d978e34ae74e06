//! Group resolution: turns `child := parent.Group(segment)` declarations into
//! absolute prefixes.
//!
//! Two modes are available. [`ResolveMode::FixedPoint`] sweeps all
//! declarations a fixed number of times so that a child declared before its
//! parent picks up the parent's prefix on a later sweep; chains deeper than
//! the sweep count may end up resolved against an incomplete ancestor.
//! [`ResolveMode::Topological`] follows each variable's parent chain to the
//! root instead, which has no depth limit and reports cycles.

use crate::model::Group;
use crate::routes::expr::evaluate;
use crate::routes::extract::RawGroupDecl;
use crate::routes::http::join_paths;
use clap::ValueEnum;
use indexmap::IndexMap;
use std::collections::HashMap;

pub const DEFAULT_PASSES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    FixedPoint { passes: usize },
    Topological,
}

impl Default for ResolveMode {
    fn default() -> Self {
        ResolveMode::FixedPoint {
            passes: DEFAULT_PASSES,
        }
    }
}

/// Resolver selection as exposed on the command line and in the environment.
#[derive(ValueEnum, Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ResolverKind {
    #[default]
    FixedPoint,
    Topological,
}

impl ResolverKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fixed-point" | "fixed" | "passes" => Some(ResolverKind::FixedPoint),
            "topological" | "topo" | "graph" => Some(ResolverKind::Topological),
            _ => None,
        }
    }

    pub fn mode(self, passes: usize) -> ResolveMode {
        match self {
            ResolverKind::FixedPoint => ResolveMode::FixedPoint {
                passes: passes.max(1),
            },
            ResolverKind::Topological => ResolveMode::Topological,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupResolution {
    /// Last prefix assigned to each group variable.
    pub prefix_by_var: HashMap<String, String>,
    /// First declaration that produced each prefix.
    pub groups_by_prefix: IndexMap<String, Group>,
    /// Variables whose parent chain loops back on itself. Only the
    /// topological mode detects these.
    pub cycles: Vec<Vec<String>>,
}

pub fn resolve_groups(decls: &[RawGroupDecl], mode: ResolveMode) -> GroupResolution {
    let segments: Vec<Option<String>> = decls
        .iter()
        .map(|decl| {
            let segment = evaluate(&decl.expr);
            if segment.is_none() {
                tracing::debug!(
                    child = %decl.child,
                    offset = decl.offset,
                    expr = ?decl.expr,
                    "group segment is not a constant string, skipping"
                );
            }
            segment
        })
        .collect();
    match mode {
        ResolveMode::FixedPoint { passes } => fixed_point(decls, &segments, passes),
        ResolveMode::Topological => topological(decls, &segments),
    }
}

fn fixed_point(decls: &[RawGroupDecl], segments: &[Option<String>], passes: usize) -> GroupResolution {
    let mut resolution = GroupResolution::default();
    for _ in 0..passes {
        for (decl, segment) in decls.iter().zip(segments) {
            let Some(segment) = segment else {
                continue;
            };
            let parent_prefix = resolution
                .prefix_by_var
                .get(&decl.parent)
                .map(String::as_str)
                .unwrap_or("");
            let candidate = join_paths(parent_prefix, segment);
            register(&mut resolution.groups_by_prefix, decl, &candidate);
            resolution.prefix_by_var.insert(decl.child.clone(), candidate);
        }
    }
    resolution
}

fn topological(decls: &[RawGroupDecl], segments: &[Option<String>]) -> GroupResolution {
    // The last resolvable declaration of a variable defines its parent edge.
    let mut defining: HashMap<&str, usize> = HashMap::new();
    for (idx, (decl, segment)) in decls.iter().zip(segments).enumerate() {
        if segment.is_some() {
            defining.insert(decl.child.as_str(), idx);
        }
    }

    // `None` marks a variable that sits on, or hangs off, a cycle.
    let mut resolved: HashMap<&str, Option<String>> = HashMap::new();
    let mut cycles = Vec::new();

    for decl in decls {
        let start = decl.child.as_str();
        if resolved.contains_key(start) || !defining.contains_key(start) {
            continue;
        }
        let mut chain: Vec<&str> = Vec::new();
        let mut position: HashMap<&str, usize> = HashMap::new();
        let mut current = start;
        let base = loop {
            if let Some(done) = resolved.get(current) {
                break done.clone();
            }
            let Some(&idx) = defining.get(current) else {
                // No declaration of its own: an engine/router root.
                break Some(String::new());
            };
            if let Some(&pos) = position.get(current) {
                let members: Vec<String> = chain[pos..].iter().map(|v| v.to_string()).collect();
                tracing::debug!(?members, "group declarations form a cycle");
                for &member in &chain[pos..] {
                    resolved.insert(member, None);
                }
                cycles.push(members);
                chain.truncate(pos);
                break None;
            }
            position.insert(current, chain.len());
            chain.push(current);
            current = decls[idx].parent.as_str();
        };

        let mut prefix = base;
        for &var in chain.iter().rev() {
            prefix = match (prefix, &segments[defining[var]]) {
                (Some(parent), Some(segment)) => Some(join_paths(&parent, segment)),
                _ => None,
            };
            resolved.insert(var, prefix.clone());
        }
    }

    let mut resolution = GroupResolution {
        cycles,
        ..GroupResolution::default()
    };
    for (decl, segment) in decls.iter().zip(segments) {
        let Some(segment) = segment else {
            continue;
        };
        let parent_prefix = match resolved.get(decl.parent.as_str()) {
            Some(Some(prefix)) => prefix.as_str(),
            Some(None) => continue,
            None => "",
        };
        let candidate = join_paths(parent_prefix, segment);
        register(&mut resolution.groups_by_prefix, decl, &candidate);
    }
    resolution.prefix_by_var = resolved
        .into_iter()
        .filter_map(|(var, prefix)| prefix.map(|prefix| (var.to_string(), prefix)))
        .collect();
    resolution
}

fn register(groups: &mut IndexMap<String, Group>, decl: &RawGroupDecl, prefix: &str) {
    if groups.contains_key(prefix) {
        return;
    }
    groups.insert(
        prefix.to_string(),
        Group {
            variable: decl.child.clone(),
            prefix: prefix.to_string(),
            offset: decl.offset,
        },
    );
}
