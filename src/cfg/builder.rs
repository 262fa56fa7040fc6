//! The control-flow visitor: one traversal of the tree per flowchart.

use crate::ast::{
    Expr, Module, Stmt, StmtAssign, StmtBreak, StmtContinue, StmtExpr, StmtFor, StmtFunctionDef,
    StmtIf, StmtReturn, StmtWhile,
};
use crate::graph::{FlowGraph, NodeId, NodeKind};
use crate::labels;
use crate::line_index::LineIndex;

/// The result of one traversal: the graph plus line provenance.
#[derive(Debug)]
pub struct FlowChart {
    pub graph: FlowGraph,
    pub lines: LineIndex,
}

/// Builds a flowchart for a parsed module.
///
/// Infallible by contract: malformed control flow (a stray `continue`, an
/// unrenderable expression) degrades the output, never aborts it.
pub fn build_flowchart(module: &Module) -> FlowChart {
    tracing::trace!(statements = module.body.len(), "build_flowchart");
    FlowChartBuilder::new().build(module)
}

/// Per-traversal state. Created fresh for every [`build_flowchart`] call so
/// node ids restart at zero and nothing leaks between invocations.
struct FlowChartBuilder {
    graph: FlowGraph,
    lines: LineIndex,
    /// The open predecessor awaiting its successor edge; `None` means the
    /// path was severed by a jump and nothing may attach automatically.
    current: Option<NodeId>,
    /// Innermost-last anchors of the loops currently being visited.
    loop_stack: Vec<NodeId>,
    /// How many function-definition bodies enclose the walk right now.
    def_depth: u32,
}

impl FlowChartBuilder {
    fn new() -> Self {
        Self {
            graph: FlowGraph::new(),
            lines: LineIndex::new(),
            current: None,
            loop_stack: Vec::new(),
            def_depth: 0,
        }
    }

    fn build(mut self, module: &Module) -> FlowChart {
        let start = self.graph.create_node("Start", NodeKind::Start);
        self.current = Some(start);

        // The top level keeps the main flow alive across severed statements:
        // after a jump the walk resumes from the pre-statement node.
        let mut last_valid = start;
        for stmt in &module.body {
            let before = self.current;
            self.visit_stmt(stmt);
            match self.current {
                Some(node) => last_valid = node,
                None => self.current = before,
            }
        }

        let end = self.graph.create_node("End", NodeKind::End);
        let closing = self.current.unwrap_or(last_valid);
        let label = self.graph.node(closing).kind.is_loop().then_some("Done");
        self.graph.connect(Some(closing), Some(end), label);

        FlowChart {
            graph: self.graph,
            lines: self.lines,
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::FunctionDef(def) => self.visit_function_def(def),
            Stmt::Assign(assign) => self.visit_assign(assign),
            Stmt::If(stmt_if) => self.visit_if(stmt_if),
            Stmt::While(stmt_while) => self.visit_while(stmt_while),
            Stmt::For(stmt_for) => self.visit_for(stmt_for),
            Stmt::Return(ret) => self.visit_return(ret),
            Stmt::Expr(expr) => self.visit_expr_stmt(expr),
            Stmt::Break(br) => self.visit_break(br),
            Stmt::Continue(cont) => self.visit_continue(cont),
        }
    }

    /// Visits a branch body from a severed pointer, drawing a labeled edge
    /// from `anchor` to the node the first statement leaves current (none is
    /// drawn if that statement severed the path). Leaves `self.current` at
    /// the branch's end.
    fn visit_branch(&mut self, anchor: NodeId, label: &str, body: &[Stmt]) {
        self.current = None;
        for (i, stmt) in body.iter().enumerate() {
            self.visit_stmt(stmt);
            if i == 0 {
                self.graph.connect(Some(anchor), self.current, Some(label));
            }
        }
    }

    fn visit_function_def(&mut self, def: &StmtFunctionDef) {
        let label = format!("def {}({})", def.name, def.params.join(", "));
        let node = self.graph.create_node(label, NodeKind::FunctionDef);
        // Nested definitions stay detached from the enclosing flow.
        if self.def_depth == 0 {
            self.graph.connect(self.current, Some(node), None);
        }
        self.lines.record(node, [def.line]);

        self.def_depth += 1;
        self.current = Some(node);
        for stmt in &def.body {
            self.visit_stmt(stmt);
        }
        self.def_depth -= 1;

        // At top level the definition node resumes the main flow; inside
        // another definition the path stays severed.
        self.current = (self.def_depth == 0).then_some(node);
    }

    fn visit_assign(&mut self, stmt: &StmtAssign) {
        let label = format!(
            "{} = {}",
            labels::assign_targets_text(&stmt.targets),
            labels::expr_text(&stmt.value)
        );
        let node = self.graph.create_node(label, NodeKind::Assign);
        self.graph.connect(self.current, Some(node), None);
        self.lines.record(node, [stmt.line]);
        self.current = Some(node);
    }

    fn visit_if(&mut self, stmt: &StmtIf) {
        let test = labels::expr_text(&stmt.test);
        let decision = self.graph.create_node(format!("if {test}"), NodeKind::If);
        self.graph.connect(self.current, Some(decision), None);
        self.lines.record(decision, [stmt.line]);

        self.visit_branch(decision, "True", &stmt.body);
        let true_end = self.current;

        if stmt.orelse.is_empty() {
            // No else: the decision node itself is the fallthrough
            // continuation for whatever follows.
            self.current = Some(decision);
        } else {
            self.visit_branch(decision, "False", &stmt.orelse);
            let false_end = self.current;
            // Asymmetric join: the true end wins when it survived, the
            // false end otherwise; both severed leaves the path severed.
            self.current = true_end.or(false_end);
        }
    }

    fn visit_while(&mut self, stmt: &StmtWhile) {
        let test = labels::expr_text(&stmt.test);
        let decision = self
            .graph
            .create_node(format!("while {test}"), NodeKind::While);
        self.graph.connect(self.current, Some(decision), None);
        self.lines.record(decision, [stmt.line]);

        self.loop_stack.push(decision);
        self.visit_branch(decision, "True", &stmt.body);
        // A surviving body end loops back to the test.
        self.graph.connect(self.current, Some(decision), None);
        self.loop_stack.pop();

        // The decision node carries the loop's exit continuation.
        self.current = Some(decision);
    }

    fn visit_for(&mut self, stmt: &StmtFor) {
        let label = format!(
            "for {} in {}",
            labels::target_text(&stmt.target),
            labels::expr_text(&stmt.iter)
        );
        let anchor = self.graph.create_node(label, NodeKind::For);
        self.graph.connect(self.current, Some(anchor), None);
        self.lines.record(anchor, [stmt.line]);

        self.loop_stack.push(anchor);
        // Unlike while, the anchor itself stays current through the body.
        self.current = Some(anchor);
        let mut first_in_body = true;
        let mut last_body_node = None;
        for body_stmt in &stmt.body {
            if first_in_body && self.current == Some(anchor) {
                self.visit_stmt(body_stmt);
                if let Some(node) = self.current {
                    if node != anchor {
                        self.graph
                            .connect(Some(anchor), Some(node), Some("Next item"));
                        first_in_body = false;
                    }
                }
            } else {
                self.visit_stmt(body_stmt);
            }
            if self.current.is_some() {
                last_body_node = self.current;
            }
        }
        if let Some(last) = last_body_node {
            if last != anchor {
                self.graph.connect(Some(last), Some(anchor), None);
            }
        }
        self.loop_stack.pop();

        self.current = Some(anchor);
    }

    fn visit_return(&mut self, stmt: &StmtReturn) {
        let label = match &stmt.value {
            Some(value) => format!("return {}", labels::expr_text(value)),
            None => "return".to_string(),
        };
        let node = self.graph.create_node(label, NodeKind::Return);
        self.graph.connect(self.current, Some(node), None);
        self.lines.record(node, [stmt.line]);
        self.current = None;
    }

    fn visit_expr_stmt(&mut self, stmt: &StmtExpr) {
        // Only call expressions materialize; other bare expressions drop.
        let Expr::Call { func, .. } = &stmt.value else {
            return;
        };
        let kind = match labels::callee_text(func).as_str() {
            "input" => NodeKind::Input,
            "print" => NodeKind::Output,
            _ => NodeKind::Call,
        };
        let node = self.graph.create_node(labels::expr_text(&stmt.value), kind);
        self.graph.connect(self.current, Some(node), None);
        self.lines.record(node, [stmt.line]);
        self.current = Some(node);
    }

    fn visit_break(&mut self, stmt: &StmtBreak) {
        let node = self.graph.create_node("break", NodeKind::Break);
        self.graph.connect(self.current, Some(node), None);
        self.lines.record(node, [stmt.line]);
        // No edge toward the loop exit: convergence happens implicitly
        // because nothing downstream attaches to this node.
        self.current = None;
    }

    fn visit_continue(&mut self, stmt: &StmtContinue) {
        let node = self.graph.create_node("continue", NodeKind::Continue);
        self.graph.connect(self.current, Some(node), None);
        self.lines.record(node, [stmt.line]);
        // Back to the innermost loop anchor; silently omitted outside one.
        let innermost = self.loop_stack.last().copied();
        self.graph.connect(Some(node), innermost, None);
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CmpOp, Literal, Operator};
    use crate::graph::NodeShape;

    fn module(body: Vec<Stmt>) -> Module {
        Module { body }
    }

    fn name(text: &str) -> Expr {
        Expr::Name(text.to_string())
    }

    fn int(value: i64) -> Expr {
        Expr::Literal(Literal::Int(value))
    }

    fn assign(target: &str, value: Expr, line: u32) -> Stmt {
        Stmt::Assign(StmtAssign {
            targets: vec![name(target)],
            value,
            line,
        })
    }

    fn call_stmt(func: &str, args: Vec<Expr>, line: u32) -> Stmt {
        Stmt::Expr(StmtExpr {
            value: Expr::Call {
                func: Box::new(name(func)),
                args,
            },
            line,
        })
    }

    fn gt(left: Expr, right: Expr) -> Expr {
        Expr::Compare {
            left: Box::new(left),
            ops: vec![CmpOp::Gt],
            comparators: vec![right],
        }
    }

    /// Edges as `(from, to, label)` index triples for easy assertions.
    fn edges(chart: &FlowChart) -> Vec<(usize, usize, Option<&str>)> {
        chart
            .graph
            .edges()
            .iter()
            .map(|edge| (edge.from.index(), edge.to.index(), edge.label.as_deref()))
            .collect()
    }

    fn node_id(chart: &FlowChart, index: usize) -> NodeId {
        chart.graph.nodes()[index].id
    }

    #[test]
    fn single_assignment() {
        let chart = build_flowchart(&module(vec![assign("x", int(1), 1)]));

        assert_eq!(chart.graph.num_nodes(), 3);
        assert_eq!(chart.graph.nodes()[0].label, "Start");
        assert_eq!(chart.graph.nodes()[1].label, "x = 1");
        assert_eq!(chart.graph.nodes()[2].label, "End");
        assert_eq!(edges(&chart), vec![(0, 1, None), (1, 2, None)]);
    }

    #[test]
    fn if_without_else_falls_through_the_decision() {
        let body = vec![Stmt::If(StmtIf {
            test: gt(name("a"), int(0)),
            body: vec![assign("x", int(1), 2)],
            orelse: vec![],
            line: 1,
        })];
        let chart = build_flowchart(&module(body));

        // Start, decision, assignment, End.
        assert_eq!(chart.graph.num_nodes(), 4);
        assert_eq!(chart.graph.nodes()[1].label, "if a > 0");
        assert_eq!(
            edges(&chart),
            vec![(0, 1, None), (1, 2, Some("True")), (1, 3, None)]
        );
    }

    #[test]
    fn if_else_keeps_the_true_end() {
        let body = vec![Stmt::If(StmtIf {
            test: gt(name("a"), int(0)),
            body: vec![assign("x", int(1), 2)],
            orelse: vec![assign("x", int(2), 4)],
            line: 1,
        })];
        let chart = build_flowchart(&module(body));

        assert_eq!(chart.graph.num_nodes(), 5);
        assert_eq!(
            edges(&chart),
            vec![
                (0, 1, None),
                (1, 2, Some("True")),
                (1, 3, Some("False")),
                // The asymmetric join: the true end reaches End, the false
                // end dangles.
                (2, 4, None),
            ]
        );
    }

    #[test]
    fn if_with_severed_true_branch_continues_from_false_end() {
        let body = vec![Stmt::If(StmtIf {
            test: name("c"),
            body: vec![Stmt::Return(StmtReturn {
                value: Some(int(1)),
                line: 2,
            })],
            orelse: vec![assign("x", int(2), 4)],
            line: 1,
        })];
        let chart = build_flowchart(&module(body));

        // The return severed the true branch before its entry edge could be
        // drawn, so the return node is a dead end with no incoming edge.
        assert_eq!(
            edges(&chart),
            vec![(0, 1, None), (1, 3, Some("False")), (3, 4, None)]
        );
        assert_eq!(chart.graph.nodes()[2].label, "return 1");
    }

    #[test]
    fn while_loop_back_edge_and_done_label() {
        let body = vec![Stmt::While(StmtWhile {
            test: Expr::Compare {
                left: Box::new(name("x")),
                ops: vec![CmpOp::Lt],
                comparators: vec![int(3)],
            },
            body: vec![assign(
                "x",
                Expr::BinOp {
                    left: Box::new(name("x")),
                    op: Operator::Add,
                    right: Box::new(int(1)),
                },
                2,
            )],
            line: 1,
        })];
        let chart = build_flowchart(&module(body));

        assert_eq!(chart.graph.nodes()[1].label, "while x < 3");
        assert_eq!(
            edges(&chart),
            vec![
                (0, 1, None),
                (1, 2, Some("True")),
                (2, 1, None), // single back-edge from the body's last node
                (1, 3, Some("Done")),
            ]
        );
    }

    #[test]
    fn break_severs_without_loop_exit_edge() {
        let body = vec![Stmt::While(StmtWhile {
            test: Expr::Literal(Literal::Bool(true)),
            body: vec![
                call_stmt("step", vec![], 2),
                Stmt::Break(StmtBreak { line: 3 }),
            ],
            line: 1,
        })];
        let chart = build_flowchart(&module(body));

        let break_id = node_id(&chart, 3);
        assert_eq!(chart.graph.node(break_id).label, "break");
        // The break node has no outgoing edges and the body has no back-edge.
        assert!(chart.graph.edges().iter().all(|e| e.from != break_id));
        assert_eq!(
            edges(&chart),
            vec![
                (0, 1, None),
                (1, 2, Some("True")),
                (2, 3, None),
                (1, 4, Some("Done")),
            ]
        );
    }

    #[test]
    fn continue_targets_the_innermost_loop() {
        let inner = Stmt::For(StmtFor {
            target: name("j"),
            iter: name("ys"),
            body: vec![Stmt::Continue(StmtContinue { line: 3 })],
            line: 2,
        });
        let body = vec![Stmt::For(StmtFor {
            target: name("i"),
            iter: name("xs"),
            body: vec![inner],
            line: 1,
        })];
        let chart = build_flowchart(&module(body));

        let outer_id = node_id(&chart, 1);
        let inner_id = node_id(&chart, 2);
        let continue_id = node_id(&chart, 3);
        assert_eq!(chart.graph.node(continue_id).label, "continue");

        let continue_targets: Vec<NodeId> = chart
            .graph
            .edges()
            .iter()
            .filter(|e| e.from == continue_id)
            .map(|e| e.to)
            .collect();
        assert_eq!(continue_targets, vec![inner_id]);
        assert!(!continue_targets.contains(&outer_id));

        // The outer loop still closes normally with a Done edge to End.
        assert_eq!(
            edges(&chart).last(),
            Some(&(outer_id.index(), 4, Some("Done")))
        );
    }

    #[test]
    fn for_loop_reaches_body_via_next_item() {
        let body = vec![Stmt::For(StmtFor {
            target: name("i"),
            iter: Expr::Call {
                func: Box::new(name("range")),
                args: vec![int(3)],
            },
            body: vec![call_stmt("print", vec![name("i")], 2)],
            line: 1,
        })];
        let chart = build_flowchart(&module(body));

        assert_eq!(chart.graph.nodes()[1].label, "for i in range(3)");
        assert_eq!(chart.graph.nodes()[2].shape, NodeShape::Io);
        // The anchor connects to the body twice: once as the current-pointer
        // edge, once labeled, then the body loops back.
        assert_eq!(
            edges(&chart),
            vec![
                (0, 1, None),
                (1, 2, None),
                (1, 2, Some("Next item")),
                (2, 1, None),
                (1, 3, Some("Done")),
            ]
        );
    }

    #[test]
    fn function_definition_resumes_main_flow() {
        let body = vec![
            Stmt::FunctionDef(StmtFunctionDef {
                name: "f".to_string(),
                params: vec!["a".to_string(), "b".to_string()],
                body: vec![Stmt::Return(StmtReturn {
                    value: Some(name("a")),
                    line: 2,
                })],
                line: 1,
            }),
            assign("y", int(2), 3),
        ];
        let chart = build_flowchart(&module(body));

        assert_eq!(chart.graph.nodes()[1].label, "def f(a, b)");
        assert_eq!(
            edges(&chart),
            vec![(0, 1, None), (1, 2, None), (1, 3, None), (3, 4, None)]
        );
    }

    #[test]
    fn nested_definition_stays_detached() {
        let inner = Stmt::FunctionDef(StmtFunctionDef {
            name: "inner".to_string(),
            params: vec![],
            body: vec![assign("x", int(1), 3)],
            line: 2,
        });
        let body = vec![
            Stmt::FunctionDef(StmtFunctionDef {
                name: "outer".to_string(),
                params: vec![],
                body: vec![inner],
                line: 1,
            }),
            assign("y", int(2), 4),
        ];
        let chart = build_flowchart(&module(body));

        let inner_id = node_id(&chart, 2);
        assert!(chart.graph.edges().iter().all(|e| e.to != inner_id));
        // The outer definition resumes the top-level flow afterwards.
        assert_eq!(
            edges(&chart),
            vec![(0, 1, None), (2, 3, None), (1, 4, None), (4, 5, None)]
        );
    }

    #[test]
    fn stray_continue_omits_the_back_edge() {
        let chart = build_flowchart(&module(vec![Stmt::Continue(StmtContinue { line: 1 })]));

        let continue_id = node_id(&chart, 1);
        assert!(chart.graph.edges().iter().all(|e| e.from != continue_id));
        // The main flow resumes from Start and still reaches End.
        assert_eq!(edges(&chart), vec![(0, 1, None), (0, 2, None)]);
    }

    #[test]
    fn bare_expression_statements_produce_no_node() {
        let body = vec![Stmt::Expr(StmtExpr {
            value: name("x"),
            line: 1,
        })];
        let chart = build_flowchart(&module(body));

        assert_eq!(chart.graph.num_nodes(), 2);
        assert_eq!(edges(&chart), vec![(0, 1, None)]);
    }

    #[test]
    fn designated_io_calls_use_io_nodes() {
        let body = vec![
            call_stmt("input", vec![], 1),
            call_stmt("print", vec![name("x")], 2),
            call_stmt("helper", vec![], 3),
        ];
        let chart = build_flowchart(&module(body));

        let nodes = chart.graph.nodes();
        assert_eq!(nodes[1].kind, NodeKind::Input);
        assert_eq!(nodes[1].shape, NodeShape::Io);
        assert_eq!(nodes[2].kind, NodeKind::Output);
        assert_eq!(nodes[2].label, "print(x)");
        assert_eq!(nodes[3].kind, NodeKind::Call);
        assert_eq!(nodes[3].shape, NodeShape::Process);
    }

    #[test]
    fn line_index_closure() {
        let body = vec![
            assign("x", int(1), 1),
            Stmt::While(StmtWhile {
                test: gt(name("x"), int(0)),
                body: vec![assign(
                    "x",
                    Expr::BinOp {
                        left: Box::new(name("x")),
                        op: Operator::Sub,
                        right: Box::new(int(1)),
                    },
                    3,
                )],
                line: 2,
            }),
        ];
        let chart = build_flowchart(&module(body));

        for (_, node) in chart.lines.line_entries() {
            assert!(node.index() < chart.graph.num_nodes());
        }
        for (node, lines) in chart.lines.node_entries() {
            assert!(node.index() < chart.graph.num_nodes());
            assert!(!lines.is_empty());
        }
        assert_eq!(chart.lines.node_for_line(2), Some(node_id(&chart, 2)));
    }

    #[test]
    fn later_node_wins_a_shared_line() {
        let body = vec![assign("x", int(1), 1), call_stmt("print", vec![], 1)];
        let chart = build_flowchart(&module(body));

        assert_eq!(chart.lines.node_for_line(1), Some(node_id(&chart, 2)));
        assert_eq!(chart.lines.lines_for_node(node_id(&chart, 1)), [1]);
    }

    /// A search function plus a small driver, the shape this tooling most
    /// often sees: definition, loop, branch, early return, then I/O.
    #[test]
    fn realistic_program() {
        let subscript_eq = Expr::Compare {
            left: Box::new(Expr::Subscript {
                value: Box::new(name("nums")),
                index: Box::new(name("i")),
            }),
            ops: vec![CmpOp::Eq],
            comparators: vec![name("target")],
        };
        let body = vec![
            Stmt::FunctionDef(StmtFunctionDef {
                name: "f".to_string(),
                params: vec!["nums".to_string(), "target".to_string()],
                body: vec![
                    assign(
                        "n",
                        Expr::Call {
                            func: Box::new(name("len")),
                            args: vec![name("nums")],
                        },
                        2,
                    ),
                    Stmt::For(StmtFor {
                        target: name("i"),
                        iter: Expr::Call {
                            func: Box::new(name("range")),
                            args: vec![name("n")],
                        },
                        body: vec![Stmt::If(StmtIf {
                            test: subscript_eq,
                            body: vec![Stmt::Return(StmtReturn {
                                value: Some(name("i")),
                                line: 5,
                            })],
                            orelse: vec![],
                            line: 4,
                        })],
                        line: 3,
                    }),
                    Stmt::Return(StmtReturn {
                        value: Some(int(-1)),
                        line: 6,
                    }),
                ],
                line: 1,
            }),
            assign(
                "x",
                Expr::Call {
                    func: Box::new(name("input")),
                    args: vec![],
                },
                7,
            ),
            call_stmt(
                "print",
                vec![Expr::Call {
                    func: Box::new(name("f")),
                    args: vec![name("x"), int(3)],
                }],
                8,
            ),
        ];
        let chart = build_flowchart(&module(body));

        let labels: Vec<&str> = chart
            .graph
            .nodes()
            .iter()
            .map(|n| n.label.as_str())
            .collect();
        assert_eq!(
            labels,
            vec![
                "Start",
                "def f(nums, target)",
                "n = len(nums)",
                "for i in range(n)",
                "if nums[i] == target",
                "return i",
                "return -1",
                "x = input()",
                "print(f(x, 3))",
                "End",
            ]
        );
        assert_eq!(
            edges(&chart),
            vec![
                (0, 1, None),
                (1, 2, None),
                (2, 3, None),
                (3, 4, None),
                (3, 4, Some("Next item")),
                (4, 3, None),
                (3, 6, None),
                (1, 7, None),
                (7, 8, None),
                (8, 9, None),
            ]
        );
        // The early return lives inside a severed branch: present, dead-end.
        let early = node_id(&chart, 5);
        assert!(chart
            .graph
            .edges()
            .iter()
            .all(|e| e.from != early && e.to != early));
    }

    #[test]
    fn repeated_builds_are_isomorphic() {
        let body = vec![
            assign("x", int(0), 1),
            Stmt::While(StmtWhile {
                test: gt(name("x"), int(0)),
                body: vec![Stmt::Break(StmtBreak { line: 3 })],
                line: 2,
            }),
        ];
        let first = build_flowchart(&module(body.clone()));
        let second = build_flowchart(&module(body));

        assert_eq!(first.graph.num_nodes(), second.graph.num_nodes());
        assert_eq!(first.graph.nodes()[0].id.index(), 0);
        assert_eq!(second.graph.nodes()[0].id.index(), 0);
        let shapes = |chart: &FlowChart| {
            chart
                .graph
                .nodes()
                .iter()
                .map(|n| n.shape)
                .collect::<Vec<_>>()
        };
        assert_eq!(shapes(&first), shapes(&second));
        assert_eq!(edges(&first), edges(&second));
    }
}
