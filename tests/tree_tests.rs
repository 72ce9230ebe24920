// tests/tree_tests.rs

use trigger_expr::{ExpressionNode, ExpressionParser, GroupOperator, ParserOptions, Span};

fn tree_of(source: &str) -> ExpressionNode {
    ExpressionParser::new(ParserOptions::default())
        .parse(source)
        .into_result()
        .unwrap()
        .tree()
        .unwrap()
}

fn leaf_text(source: &str, node: &ExpressionNode) -> String {
    let span = node.span();
    source.chars().skip(span.pos).take(span.length).collect()
}

// ============================================================================
// Grouping
// ============================================================================

#[test]
fn test_single_leaf() {
    let node = tree_of("last(/h/k) > 5");
    match node {
        ExpressionNode::Leaf(leaf) => {
            assert_eq!(leaf.tokens, 0..3);
            assert_eq!(leaf.span, Span::new(0, 14));
            assert!(leaf.nested.is_none());
        }
        other => panic!("expected a leaf, got {other:?}"),
    }
}

#[test]
fn test_same_operator_is_flat() {
    let source = "1 and 2 and 3";
    let ExpressionNode::Group(group) = tree_of(source) else {
        panic!("expected a group");
    };
    assert_eq!(group.operator, GroupOperator::And);
    assert_eq!(group.elements.len(), 3);
    assert_eq!(leaf_text(source, &group.elements[2]), "3");
}

#[test]
fn test_or_of_ands() {
    let source = "a() = 1 and b() = 2 or not c() = 3";
    let ExpressionNode::Group(root) = tree_of(source) else {
        panic!("expected a group");
    };
    assert_eq!(root.operator, GroupOperator::Or);
    assert_eq!(root.elements.len(), 2);

    let ExpressionNode::Group(conjunction) = &root.elements[0] else {
        panic!("expected an and group");
    };
    assert_eq!(conjunction.operator, GroupOperator::And);
    assert_eq!(leaf_text(source, &conjunction.elements[1]), "b() = 2");
    assert_eq!(leaf_text(source, &root.elements[1]), "not c() = 3");
    assert_eq!(root.span(), Span::new(0, source.chars().count()));
}

#[test]
fn test_parenthesized_group_is_nested() {
    let source = "(1 or 2) and 3";
    let ExpressionNode::Group(root) = tree_of(source) else {
        panic!("expected a group");
    };
    assert_eq!(root.operator, GroupOperator::And);

    let ExpressionNode::Leaf(first) = &root.elements[0] else {
        panic!("expected a leaf");
    };
    assert_eq!(first.span, Span::new(0, 8));
    let nested = first.nested.as_deref().unwrap();
    assert!(matches!(nested, ExpressionNode::Group(g) if g.operator == GroupOperator::Or));
}

#[test]
fn test_parentheses_not_enclosing_whole_leaf() {
    let node = tree_of("(1) + (2)");
    assert!(!node.is_parenthesized());
    let ExpressionNode::Leaf(leaf) = node else {
        panic!("expected a leaf");
    };
    assert!(leaf.nested.is_none());
}

// ============================================================================
// Disjuncts
// ============================================================================

#[test]
fn test_disjuncts() {
    assert_eq!(tree_of("1 or 2 or 3 and 4").disjuncts().len(), 3);
    assert_eq!(tree_of("1 and 2").disjuncts().len(), 1);
    assert_eq!(tree_of("(1 or 2)").disjuncts().len(), 1);
}

#[test]
fn test_keywords_inside_functions_do_not_split() {
    let node = tree_of("max(1 or 2, 3) and 4");
    let ExpressionNode::Group(root) = node else {
        panic!("expected a group");
    };
    assert_eq!(root.elements.len(), 2);
}
