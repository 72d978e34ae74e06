use crate::model::HttpMethod;
use crate::routes::expr::Expr;
use clap::ValueEnum;

/// `child := parent.Group(expr)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawGroupDecl {
    pub child: String,
    pub parent: String,
    pub expr: Expr,
    /// Start of the enclosing `:=` statement.
    pub offset: usize,
}

/// `receiver.METHOD(expr, ...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRouteDecl {
    pub receiver: String,
    pub method: HttpMethod,
    pub expr: Expr,
    /// Start of the call expression.
    pub offset: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
    pub groups: Vec<RawGroupDecl>,
    pub routes: Vec<RawRouteDecl>,
}

impl Declarations {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.routes.is_empty()
    }
}

/// Finds group assignments and route registrations in one file.
///
/// Declarations are reported in source order. Lexical scoping is ignored: an
/// identifier names the same thing everywhere in the file.
pub trait DeclarationExtractor {
    fn extract(&mut self, source: &str) -> Declarations;
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Strategy {
    /// Structural matching over a tree-sitter syntax tree.
    #[default]
    Syntax,
    /// Regular-expression matching over raw text. May match inside comments
    /// and string literals.
    Lexical,
}

impl Strategy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "syntax" | "tree-sitter" | "ast" => Some(Strategy::Syntax),
            "lexical" | "regex" | "text" => Some(Strategy::Lexical),
            _ => None,
        }
    }
}
