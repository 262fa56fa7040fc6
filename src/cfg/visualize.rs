//! Renders a [`FlowGraph`] as Graphviz DOT text.
//!
//! The text is what gets handed to the external layout engine (the
//! [`crate::pipeline::GraphRenderer`] capability); this module never runs
//! the engine itself. Output is deterministic: nodes in id order, edges in
//! insertion order.

use std::fmt::{self, Display, Write};

use crate::graph::{Edge, FlowGraph, Node, NodeShape};

impl NodeShape {
    /// Graphviz `shape` and `style` attributes for this shape.
    fn dot_attrs(self) -> (&'static str, &'static str) {
        match self {
            NodeShape::Process => ("box", "filled,rounded"),
            NodeShape::Decision => ("diamond", "filled"),
            NodeShape::Terminal => ("ellipse", "filled"),
            NodeShape::Io => ("parallelogram", "filled"),
        }
    }
}

struct DotNode<'a>(&'a Node);

impl Display for DotNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (shape, style) = self.0.shape.dot_attrs();
        write!(f, "{} [label=\"", self.0.id)?;
        write_quoted(f, &self.0.label)?;
        write!(
            f,
            "\" shape={shape} style=\"{style}\" fillcolor={} color=black]",
            self.0.fill
        )
    }
}

struct DotEdge<'a>(&'a Edge);

impl Display for DotEdge<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.0.from, self.0.to)?;
        if let Some(label) = &self.0.label {
            write!(f, " [label=\"")?;
            write_quoted(f, label)?;
            write!(f, "\"]")?;
        }
        Ok(())
    }
}

/// Escapes a label for use inside a double-quoted DOT string.
fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    for c in value.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            _ => f.write_char(c)?,
        }
    }
    Ok(())
}

/// Builds the full digraph text, graph attributes first, then every node,
/// then every edge.
pub fn to_dot(graph: &FlowGraph) -> String {
    let mut lines = vec![
        "digraph flowchart {".to_string(),
        "  rankdir=TB".to_string(),
        "  bgcolor=transparent".to_string(),
        "  nodesep=0.5".to_string(),
        "  ranksep=0.5".to_string(),
        "  node [fontname=Arial fontsize=12 fontcolor=black]".to_string(),
        "  edge [fontname=Arial fontsize=10 color=\"#333333\"]".to_string(),
    ];
    for node in graph.nodes() {
        lines.push(format!("  {}", DotNode(node)));
    }
    for edge in graph.edges() {
        lines.push(format!("  {}", DotEdge(edge)));
    }
    lines.push("}".to_string());
    lines.join("\n")
}
