use std::ops::Range;

use crate::ast::tokens::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOperator {
    And,
    Or,
}

/// Operands joined by one logical operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionGroup {
    pub operator: GroupOperator,
    pub elements: Vec<ExpressionNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionNode {
    Group(ExpressionGroup),
    Leaf(LeafExpression),
}

/// A run of tokens between logical operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafExpression {
    /// Indices into the token list the tree was built from.
    pub tokens: Range<usize>,
    pub span: Span,
    /// Tree of the inside when the leaf is one parenthesised sub-expression.
    pub nested: Option<Box<ExpressionNode>>,
}

impl ExpressionNode {
    pub fn span(&self) -> Span {
        match self {
            ExpressionNode::Leaf(leaf) => leaf.span,
            ExpressionNode::Group(group) => {
                let first = group.elements.first().map(ExpressionNode::span);
                let last = group.elements.last().map(ExpressionNode::span);
                match (first, last) {
                    (Some(first), Some(last)) => Span::between(first.pos, last.end()),
                    _ => Span::default(),
                }
            }
        }
    }

    /// Top-level disjuncts: the elements of a root `or` group, or the node itself.
    pub fn disjuncts(&self) -> Vec<&ExpressionNode> {
        match self {
            ExpressionNode::Group(group) if group.operator == GroupOperator::Or => {
                group.elements.iter().collect()
            }
            node => vec![node],
        }
    }

    /// Whether the node is a single leaf wrapped in one pair of parentheses.
    pub fn is_parenthesized(&self) -> bool {
        matches!(self, ExpressionNode::Leaf(leaf) if leaf.nested.is_some())
    }
}
