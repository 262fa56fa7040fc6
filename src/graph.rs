//! Flowchart nodes, edges, and the graph they live in.
//!
//! Nodes are append-only: ids are handed out sequentially starting at zero
//! and a node is never mutated or removed once created. Edges are a flat
//! list, so parallel edges and cycles (loop back-edges) are representable.

use std::fmt;

use is_macro::Is;

/// Identifies a node within one [`FlowGraph`].
///
/// The boundary form, used in serialized output, is `node_<N>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node_{}", self.0)
    }
}

/// What a node represents, fixed at creation time.
///
/// The kind drives the shape and fill used when drawing, and tags loop
/// anchors structurally so the final "Done" edge check never has to inspect
/// rendered attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Is)]
pub enum NodeKind {
    Start,
    End,
    Assign,
    If,
    While,
    For,
    FunctionDef,
    Return,
    Break,
    Continue,
    Call,
    Input,
    Output,
}

impl NodeKind {
    /// Loop anchors: the nodes a back-edge or "Done" edge targets.
    pub const fn is_loop(self) -> bool {
        matches!(self, NodeKind::While | NodeKind::For)
    }

    pub const fn shape(self) -> NodeShape {
        match self {
            NodeKind::Start
            | NodeKind::End
            | NodeKind::Return
            | NodeKind::Break
            | NodeKind::Continue => NodeShape::Terminal,
            NodeKind::If | NodeKind::While | NodeKind::For => NodeShape::Decision,
            NodeKind::Input | NodeKind::Output => NodeShape::Io,
            NodeKind::Assign | NodeKind::FunctionDef | NodeKind::Call => NodeShape::Process,
        }
    }

    /// Graphviz fill color for this kind of node.
    pub const fn fill(self) -> &'static str {
        match self {
            NodeKind::Start => "lightgreen",
            NodeKind::End => "salmon",
            NodeKind::Assign => "lightblue",
            NodeKind::If => "lightcoral",
            NodeKind::While | NodeKind::For => "lightcyan",
            NodeKind::FunctionDef => "lightyellow",
            NodeKind::Return => "lightpink",
            NodeKind::Break | NodeKind::Continue => "orange",
            NodeKind::Call => "lavender",
            NodeKind::Input => "lightblue",
            NodeKind::Output => "lightgray",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Process,
    Decision,
    Terminal,
    Io,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    pub kind: NodeKind,
    pub shape: NodeShape,
    pub fill: &'static str,
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub label: Option<String>,
}

/// The finished control-flow diagram: every node and edge one traversal
/// produced. Unreachable or dead-ending paths are kept as-is.
#[derive(Debug, Default)]
pub struct FlowGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a node with the next sequential id and kind-derived visual
    /// attributes.
    pub fn create_node(&mut self, label: impl Into<String>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            label: label.into(),
            kind,
            shape: kind.shape(),
            fill: kind.fill(),
        });
        id
    }

    /// Draws an edge between two nodes. A missing endpoint is a silent
    /// no-op: the visitor routinely connects from a severed path.
    pub fn connect(&mut self, from: Option<NodeId>, to: Option<NodeId>, label: Option<&str>) {
        if let (Some(from), Some(to)) = (from, to) {
            self.edges.push(Edge {
                from,
                to,
                label: label.map(str::to_owned),
            });
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }
}
