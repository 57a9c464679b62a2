//! Tag-per-node rendering of a parameter tree.

use crate::tree::{ParameterNode, RootNode};
use std::fmt::Write as _;

const INDENT: &str = "  ";

/// Escape markup special characters.
fn escape_markup(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render the whole tree, one line per tag or text line.
///
/// ```
/// use baremes_core::{render_tree, ExtractConfig, RootNode};
///
/// let root = RootNode::new(&ExtractConfig {
///     root_text: String::new(),
///     ..ExtractConfig::default()
/// });
/// assert_eq!(render_tree(&root), "<NODE name=\"root\" title=\"Barème IPP\"/>\n");
/// ```
pub fn render_tree(root: &RootNode) -> String {
    let mut out = String::new();
    write_node(&mut out, ParameterNode::Root(root), 0);
    out
}

fn write_node(out: &mut String, node: ParameterNode<'_>, depth: usize) {
    let indent = INDENT.repeat(depth);
    let text = trim_blank_lines(node.text());
    let children = node.children();
    let open = !children.is_empty() || !text.is_empty();

    let _ = write!(out, "{indent}<{}", node.tag());
    for (name, value) in node.attributes() {
        let _ = write!(out, " {name}=\"{}\"", escape_markup(&value));
    }
    out.push_str(if open { ">\n" } else { "/>\n" });
    if !open {
        return;
    }

    for line in text {
        if !line.trim().is_empty() {
            let _ = write!(out, "{indent}{INDENT}{}", escape_markup(line));
        }
        out.push('\n');
    }
    for child in children {
        write_node(out, child, depth + 1);
    }
    let _ = writeln!(out, "{indent}</{}>", node.tag());
}

/// Drop leading and trailing blank lines
fn trim_blank_lines(lines: &[String]) -> &[String] {
    let is_blank = |line: &String| line.trim().is_empty();
    let start = lines.iter().position(|line| !is_blank(line)).unwrap_or(lines.len());
    let end = lines.iter().rposition(|line| !is_blank(line)).map_or(start, |end| end + 1);
    &lines[start..end]
}
