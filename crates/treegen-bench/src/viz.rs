//! Graphviz DOT rendering of a search tree.
//!
//! Debug aid for inspecting what the search actually explored: pipe the
//! output through `dot -Tsvg` and look at where the visits went.

use treegen_mcts::SearchTree;

/// Render the whole tree as a DOT digraph, one node per arena slot.
///
/// Each node shows its token label, accumulated value, visit count, and
/// the selection score it carried the last time its parent was scored.
pub fn render_dot(tree: &SearchTree) -> String {
    let arena = tree.arena();
    let mut out = String::from("digraph search_tree {\n");
    out.push_str("  node [shape=box, fontname=\"monospace\"];\n");

    let mut stack = vec![tree.root()];
    while let Some(idx) = stack.pop() {
        let node = &arena[idx];
        out.push_str(&format!(
            "  n{} [label=\"{}\\nvalue={:.3} visits={}\\nscore={:.3}\"];\n",
            idx.as_usize(),
            escape_label(node.label()),
            node.value(),
            node.visits(),
            node.last_score(),
        ));
        for &child in node.children() {
            out.push_str(&format!(
                "  n{} -> n{};\n",
                idx.as_usize(),
                child.as_usize()
            ));
            stack.push(child);
        }
    }

    out.push_str("}\n");
    out
}

/// Escape a token for use inside a double-quoted DOT label. Tokens are
/// arbitrary model output, so quotes, backslashes, and newlines all occur.
fn escape_label(token: &str) -> String {
    let mut escaped = String::with_capacity(token.len());
    for ch in token.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\\\n"),
            '\r' => escaped.push_str("\\\\r"),
            '\t' => escaped.push_str("\\\\t"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
