//! Turns a parsed Python program into a flowchart-style control-flow graph:
//! shaped nodes (process, decision, terminal, I/O) joined by optionally
//! labeled edges, with a bidirectional mapping between source lines and
//! nodes for click-through tooling.
//!
//! The interesting part is [`cfg::builder`]: the traversal that threads a
//! "current control point" through sequential statements, branches, loops,
//! and early exits. Parsing source text and laying out the finished graph
//! are both capability interfaces ([`pipeline::SourceParser`],
//! [`pipeline::GraphRenderer`]) so the core stays pure and deterministic.
//!
//! ```
//! use codeflow::ast::{Expr, Literal, Module, Stmt, StmtAssign};
//!
//! let module = Module {
//!     body: vec![Stmt::Assign(StmtAssign {
//!         targets: vec![Expr::Name("x".to_string())],
//!         value: Expr::Literal(Literal::Int(1)),
//!         line: 1,
//!     })],
//! };
//! let chart = codeflow::build_flowchart(&module);
//! assert_eq!(chart.graph.num_nodes(), 3); // Start, x = 1, End
//! ```

pub mod ast;
pub mod cfg;
pub mod graph;
pub mod labels;
pub mod line_index;
pub mod pipeline;

pub use cfg::{build_flowchart, FlowChart};
pub use graph::{Edge, FlowGraph, Node, NodeId, NodeKind, NodeShape};
pub use line_index::LineIndex;
