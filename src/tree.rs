//! Groups a flat token list into a nested AND/OR tree.
//!
//! `and` binds tighter than `or`. A parenthesised operand is a single leaf to
//! the enclosing fold and gets its own tree in [`LeafExpression::nested`].

use std::ops::Range;

use crate::ast::{
    ExpressionGroup, ExpressionNode, GroupOperator, LeafExpression, Operator, Span, Token,
    TokenKind,
};

/// Build the tree for `tokens`; `None` when there are no tokens.
pub fn build(tokens: &[Token]) -> Option<ExpressionNode> {
    if tokens.is_empty() {
        return None;
    }
    Some(build_range(tokens, 0..tokens.len()))
}

fn build_range(tokens: &[Token], range: Range<usize>) -> ExpressionNode {
    let disjuncts = split(tokens, range, Operator::Or)
        .into_iter()
        .map(|disjunct| {
            let leaves = split(tokens, disjunct, Operator::And)
                .into_iter()
                .map(|conjunct| leaf(tokens, conjunct))
                .collect();
            fold(GroupOperator::And, leaves)
        })
        .collect();
    fold(GroupOperator::Or, disjuncts)
}

fn fold(operator: GroupOperator, mut elements: Vec<ExpressionNode>) -> ExpressionNode {
    if elements.len() == 1 {
        if let Some(only) = elements.pop() {
            return only;
        }
    }
    ExpressionNode::Group(ExpressionGroup { operator, elements })
}

/// Split `range` at every `separator` outside parentheses.
fn split(tokens: &[Token], range: Range<usize>, separator: Operator) -> Vec<Range<usize>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = range.start;
    for index in range.clone() {
        match &tokens[index].kind {
            TokenKind::OpenBrace => depth += 1,
            TokenKind::CloseBrace => depth = depth.saturating_sub(1),
            TokenKind::Operator(op) if depth == 0 && *op == separator => {
                parts.push(start..index);
                start = index + 1;
            }
            _ => {}
        }
    }
    parts.push(start..range.end);
    parts
}

fn leaf(tokens: &[Token], range: Range<usize>) -> ExpressionNode {
    let span = match (tokens.get(range.start), range.end.checked_sub(1).and_then(|i| tokens.get(i))) {
        (Some(first), Some(last)) if !range.is_empty() => Span::between(first.span.pos, last.span.end()),
        _ => Span::default(),
    };
    let nested = enclosing_braces(tokens, &range)
        .then(|| Box::new(build_range(tokens, range.start + 1..range.end - 1)));
    ExpressionNode::Leaf(LeafExpression {
        tokens: range,
        span,
        nested,
    })
}

/// Whether the first token opens a brace that the last token closes.
fn enclosing_braces(tokens: &[Token], range: &Range<usize>) -> bool {
    if range.len() < 3 || tokens[range.start].kind != TokenKind::OpenBrace {
        return false;
    }
    let mut depth = 0usize;
    for index in range.clone() {
        match tokens[index].kind {
            TokenKind::OpenBrace => depth += 1,
            TokenKind::CloseBrace => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return index == range.end - 1;
                }
            }
            _ => {}
        }
    }
    false
}
