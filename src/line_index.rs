//! Bidirectional mapping between source lines and graph nodes.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::graph::NodeId;

type LineList = SmallVec<[u32; 2]>;

/// Records which node each source line contributed to, and vice versa.
///
/// Purely observational: recording never affects graph topology. When two
/// nodes claim the same line, the later write wins on the line→node side
/// while the node→lines side keeps every contribution, duplicates included.
#[derive(Debug, Default)]
pub struct LineIndex {
    line_to_node: FxHashMap<u32, NodeId>,
    node_to_lines: FxHashMap<NodeId, LineList>,
}

impl LineIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, node: NodeId, lines: impl IntoIterator<Item = u32>) {
        let entry = self.node_to_lines.entry(node).or_default();
        for line in lines {
            self.line_to_node.insert(line, node);
            entry.push(line);
        }
    }

    pub fn node_for_line(&self, line: u32) -> Option<NodeId> {
        self.line_to_node.get(&line).copied()
    }

    pub fn lines_for_node(&self, node: NodeId) -> &[u32] {
        self.node_to_lines
            .get(&node)
            .map_or(&[], |lines| lines.as_slice())
    }

    /// All `(line, node)` entries.
    pub fn line_entries(&self) -> impl Iterator<Item = (u32, NodeId)> + '_ {
        self.line_to_node.iter().map(|(&line, &node)| (line, node))
    }

    /// All `(node, lines)` entries.
    pub fn node_entries(&self) -> impl Iterator<Item = (NodeId, &[u32])> + '_ {
        self.node_to_lines
            .iter()
            .map(|(&node, lines)| (node, lines.as_slice()))
    }
}
