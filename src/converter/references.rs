//! Keeps every host/item pair of the input referenced by the output.

use tracing::debug;

use crate::ast::Query;
use crate::parser::ExpressionParser;

/// Pairs of `before` that appear nowhere in `after`, in their original order.
pub(crate) fn missing_pairs(
    before: &[(String, String)],
    after: &[(String, String)],
) -> Vec<(String, String)> {
    before
        .iter()
        .filter(|pair| !after.contains(pair))
        .cloned()
        .collect()
}

/// Append `or (last(q)<>last(q))` for each missing pair.
///
/// The expression is parenthesised first unless it already is one
/// parenthesised group.
pub(crate) fn append_references(
    text: &str,
    missing: &[(String, String)],
    parser: &ExpressionParser,
) -> String {
    let mut out = if is_parenthesized(text, parser) {
        text.to_string()
    } else {
        format!("({text})")
    };
    for (host, key) in missing {
        let query = Query::new(host.as_str(), key.as_str());
        debug!(%query, "appending reference");
        out.push_str(&format!(" or (last({query})<>last({query}))"));
    }
    out
}

fn is_parenthesized(text: &str, parser: &ExpressionParser) -> bool {
    parser
        .parse(text)
        .into_result()
        .ok()
        .and_then(|result| result.tree())
        .is_some_and(|tree| tree.is_parenthesized())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(host: &str, key: &str) -> (String, String) {
        (host.to_string(), key.to_string())
    }

    #[test]
    fn test_missing_pairs_keeps_order() {
        let before = vec![pair("a", "k"), pair("b", "k"), pair("c", "k")];
        let after = vec![pair("b", "k")];
        assert_eq!(missing_pairs(&before, &after), vec![pair("a", "k"), pair("c", "k")]);
    }

    #[test]
    fn test_append_wraps_once() {
        let parser = ExpressionParser::default();
        let missing = vec![pair("h", "k")];
        assert_eq!(
            append_references("date()>0", &missing, &parser),
            "(date()>0) or (last(/h/k)<>last(/h/k))"
        );
        assert_eq!(
            append_references("(date()>0 or 1)", &missing, &parser),
            "(date()>0 or 1) or (last(/h/k)<>last(/h/k))"
        );
        assert_eq!(
            append_references("(1) or (2)", &missing, &parser),
            "((1) or (2)) or (last(/h/k)<>last(/h/k))"
        );
    }
}
