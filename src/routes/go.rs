use crate::model::HttpMethod;
use crate::routes::expr::Expr;
use crate::routes::extract::{DeclarationExtractor, Declarations, RawGroupDecl, RawRouteDecl};
use crate::routes::lexical::LexicalExtractor;
use anyhow::Result;
use tree_sitter::{Node, Parser};

const GROUP_SELECTOR: &str = "Group";

/// Structural extractor over the tree-sitter Go grammar.
///
/// Falls back to [`LexicalExtractor`] only when the parser produces no tree.
pub struct GoSyntaxExtractor {
    parser: Parser,
    fallback: LexicalExtractor,
}

impl GoSyntaxExtractor {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_go::LANGUAGE;
        parser.set_language(&language.into())?;
        Ok(Self {
            parser,
            fallback: LexicalExtractor::new(),
        })
    }
}

impl DeclarationExtractor for GoSyntaxExtractor {
    fn extract(&mut self, source: &str) -> Declarations {
        let tree = match self.parser.parse(source, None) {
            Some(tree) => tree,
            None => {
                tracing::warn!("go parser produced no tree, using lexical extraction");
                return self.fallback.extract(source);
            }
        };
        let mut output = Declarations::default();
        walk_tree(tree.root_node(), source, &mut output);
        output
    }
}

// Pre-order walk driven by a cursor so deeply nested files cannot exhaust the stack.
fn walk_tree(root: Node<'_>, source: &str, output: &mut Declarations) {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        match node.kind() {
            "short_var_declaration" => handle_short_var(node, source, output),
            "call_expression" => handle_call(node, source, output),
            _ => {}
        }
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

fn handle_short_var(node: Node<'_>, source: &str, output: &mut Declarations) {
    let (Some(left), Some(right)) = (
        node.child_by_field_name("left"),
        node.child_by_field_name("right"),
    ) else {
        return;
    };
    let names = named_children(left);
    let values = named_children(right);
    // Extra names or values without a counterpart are ignored.
    for (name_node, value) in names.into_iter().zip(values) {
        if name_node.kind() != "identifier" {
            continue;
        }
        let Some((parent, selector, args)) = split_selector_call(value, source) else {
            continue;
        };
        if selector != GROUP_SELECTOR {
            continue;
        }
        let Some(arg) = args.first() else {
            continue;
        };
        output.groups.push(RawGroupDecl {
            child: node_text(name_node, source),
            parent,
            expr: lower_expr(*arg, source),
            offset: node.start_byte(),
        });
    }
}

fn handle_call(node: Node<'_>, source: &str, output: &mut Declarations) {
    let Some((receiver, selector, args)) = split_selector_call(node, source) else {
        return;
    };
    let Some(method) = HttpMethod::from_selector(&selector) else {
        return;
    };
    let Some(arg) = args.first() else {
        return;
    };
    output.routes.push(RawRouteDecl {
        receiver,
        method,
        expr: lower_expr(*arg, source),
        offset: node.start_byte(),
    });
}

/// `ident.Selector(args...)` with a bare identifier as receiver.
fn split_selector_call<'tree>(
    node: Node<'tree>,
    source: &str,
) -> Option<(String, String, Vec<Node<'tree>>)> {
    if node.kind() != "call_expression" {
        return None;
    }
    let function = node.child_by_field_name("function")?;
    if function.kind() != "selector_expression" {
        return None;
    }
    let operand = function.child_by_field_name("operand")?;
    if operand.kind() != "identifier" {
        return None;
    }
    let field = function.child_by_field_name("field")?;
    let args = node
        .child_by_field_name("arguments")
        .map(named_children)
        .unwrap_or_default();
    Some((node_text(operand, source), node_text(field, source), args))
}

fn lower_expr(node: Node<'_>, source: &str) -> Expr {
    match node.kind() {
        "interpreted_string_literal" | "raw_string_literal" => {
            Expr::literal(&node_text(node, source))
        }
        "binary_expression" => {
            let operator = node.child_by_field_name("operator").map(|op| op.kind());
            match (
                node.child_by_field_name("left"),
                operator,
                node.child_by_field_name("right"),
            ) {
                (Some(left), Some("+"), Some(right)) => {
                    Expr::concat(lower_expr(left, source), lower_expr(right, source))
                }
                _ => Expr::Opaque(node_text(node, source)),
            }
        }
        "parenthesized_expression" => match named_children(node).first() {
            Some(inner) => lower_expr(*inner, source),
            None => Expr::Opaque(node_text(node, source)),
        },
        _ => Expr::Opaque(node_text(node, source)),
    }
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

fn node_text(node: Node<'_>, source: &str) -> String {
    let start = node.start_byte();
    let end = node.end_byte();
    source.get(start..end).unwrap_or("").trim().to_string()
}
