//! Route topology recovery for the Go router-group idiom.
//!
//! Source text flows through extraction ([`extract`]), group resolution
//! ([`resolve`]) and route assembly ([`assemble`]) into a [`ParseResult`].
//! Every step works on a single declaration at a time: anything that cannot
//! be evaluated statically is left out rather than reported.

use crate::model::ParseResult;
use crate::routes::extract::{DeclarationExtractor, Declarations, Strategy};
use crate::routes::go::GoSyntaxExtractor;
use crate::routes::lexical::LexicalExtractor;
use crate::routes::resolve::ResolveMode;

pub mod assemble;
pub mod expr;
pub mod extract;
pub mod go;
pub mod http;
pub mod lexical;
pub mod outline;
pub mod resolve;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserOptions {
    pub strategy: Strategy,
    pub resolve: ResolveMode,
}

/// Reusable pipeline; keeps the tree-sitter parser alive between files.
pub struct RouteParser {
    extractor: Box<dyn DeclarationExtractor + Send>,
    options: ParserOptions,
}

impl RouteParser {
    pub fn new(options: ParserOptions) -> Self {
        let extractor: Box<dyn DeclarationExtractor + Send> = match options.strategy {
            Strategy::Syntax => match GoSyntaxExtractor::new() {
                Ok(extractor) => Box::new(extractor),
                Err(err) => {
                    tracing::warn!("go grammar unavailable, using lexical extraction: {err}");
                    Box::new(LexicalExtractor::new())
                }
            },
            Strategy::Lexical => Box::new(LexicalExtractor::new()),
        };
        Self { extractor, options }
    }

    pub fn options(&self) -> ParserOptions {
        self.options
    }

    pub fn extract(&mut self, source: &str) -> Declarations {
        self.extractor.extract(source)
    }

    pub fn parse(&mut self, source: &str) -> ParseResult {
        let decls = self.extract(source);
        let resolution = resolve::resolve_groups(&decls.groups, self.options.resolve);
        if !resolution.cycles.is_empty() {
            tracing::debug!(cycles = ?resolution.cycles, "unresolvable group cycles");
        }
        let routes = assemble::assemble_routes(&decls.routes, &resolution.prefix_by_var);
        tracing::trace!(
            groups = resolution.groups_by_prefix.len(),
            routes = routes.len(),
            "parsed source"
        );
        ParseResult {
            groups_by_prefix: resolution.groups_by_prefix,
            routes,
        }
    }
}

impl Default for RouteParser {
    fn default() -> Self {
        Self::new(ParserOptions::default())
    }
}

/// Parse one file with the structural extractor and fixed-point resolution.
pub fn parse_source(source: &str) -> ParseResult {
    RouteParser::default().parse(source)
}
