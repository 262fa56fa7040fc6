//! # Overview
//! To build a flowchart we step through the statement list in order,
//! threading a *current* pointer: the most recently produced node that is
//! still waiting for a successor edge. A plain statement (assignment, call)
//! becomes a node attached to the current pointer and then takes its place.
//! Statements that invoke control flow fork, sever, or redirect the pointer:
//!
//! | Branching | Loops   | Jumps      |
//! |-----------|---------|------------|
//! | `if`      | `for`   | `break`    |
//! |           | `while` | `continue` |
//! |           |         | `return`   |
//!
//! A severed pointer (`None`) means the path terminated and must not grow an
//! automatic successor; edge drawing tolerates this by treating a missing
//! endpoint as a no-op.
//!
//! ## Branching
//!
//! An `if` produces a decision node. Each branch is visited from a severed
//! pointer and the decision node gains a labeled edge to the first node the
//! branch produces:
//!
//! ```text
//!        +------------+
//!        | if x > 0   |
//!        +------------+
//!        |True    |False
//!        v        v
//!     +-----+  +-----+
//!     |x = 1|  |x = 2|
//!     +-----+  +-----+
//! ```
//!
//! Without an `else`, the decision node itself carries the fallthrough:
//! the next statement attaches to it with an unlabeled edge. With both
//! branches present only the true branch's end is carried forward (the
//! false end dangles) — see DESIGN.md for the rationale behind keeping
//! this asymmetric join.
//!
//! ## Loops
//!
//! A `while` turns its test into a decision node that anchors the loop: the
//! body's first node hangs off a `True` edge, the body's surviving end loops
//! back with an unlabeled back-edge, and the decision node itself becomes
//! current again so the statement after the loop attaches to it (the exit
//! path). A `for` anchors on a single `for x in xs` node instead and reaches
//! its body through a `Next item` edge; the anchor stays current throughout
//! the body. When a loop anchor is the node that finally connects to `End`,
//! that closing edge is labeled `Done`.
//!
//! ## Jumps
//!
//! `return`, `break`, and `continue` each produce a terminal node and sever
//! the pointer. `continue` additionally draws an edge back to the innermost
//! open loop anchor, tracked on a stack pushed/popped around each loop body.
//! A jump outside any loop simply omits that edge; the builder never
//! rejects malformed input.
//!
//! The walk is a single recursive pass; every invocation starts a fresh
//! graph with ids from zero and shares no state with previous runs.

pub mod builder;
pub mod visualize;

pub use builder::{build_flowchart, FlowChart};
pub use visualize::to_dot;
