//! The parsed-program tree consumed by the flowchart builder.
//!
//! The crate does not parse source text itself; a [`crate::pipeline::SourceParser`]
//! produces this tree. The shapes mirror Python's statement grammar closely
//! enough that a real parser binding can populate them mechanically: an
//! `elif` chain arrives as a nested [`Stmt::If`] inside `orelse`, and any
//! expression the parser cannot model arrives as [`Expr::Unsupported`].

/// A whole program: the top-level statement list.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    FunctionDef(StmtFunctionDef),
    Assign(StmtAssign),
    If(StmtIf),
    While(StmtWhile),
    For(StmtFor),
    Return(StmtReturn),
    Expr(StmtExpr),
    Break(StmtBreak),
    Continue(StmtContinue),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StmtFunctionDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StmtAssign {
    /// Assignment targets: plain names, or tuples for unpacking.
    pub targets: Vec<Expr>,
    pub value: Expr,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StmtIf {
    pub test: Expr,
    pub body: Vec<Stmt>,
    /// Empty when there is no `else`; holds a single nested `If` for `elif`.
    pub orelse: Vec<Stmt>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StmtWhile {
    pub test: Expr,
    pub body: Vec<Stmt>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StmtFor {
    pub target: Expr,
    pub iter: Expr,
    pub body: Vec<Stmt>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StmtReturn {
    pub value: Option<Expr>,
    pub line: u32,
}

/// A bare expression statement. Only call expressions become graph nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct StmtExpr {
    pub value: Expr,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StmtBreak {
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StmtContinue {
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Name(String),
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    BinOp {
        left: Box<Expr>,
        op: Operator,
        right: Box<Expr>,
    },
    /// Chained comparison: `left ops[0] comparators[0] ops[1] comparators[1] ...`
    Compare {
        left: Box<Expr>,
        ops: Vec<CmpOp>,
        comparators: Vec<Expr>,
    },
    BoolOp {
        op: BoolOp,
        values: Vec<Expr>,
    },
    UnaryOp {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Subscript {
        value: Box<Expr>,
        index: Box<Expr>,
    },
    /// Anything the parser could not model. Renders as a placeholder token.
    Unsupported,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mult,
    Div,
    Mod,
    Pow,
    FloorDiv,
}

impl Operator {
    pub const fn as_str(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mult => "*",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::Pow => "**",
            Operator::FloorDiv => "//",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

impl CmpOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::NotEq => "!=",
            CmpOp::Lt => "<",
            CmpOp::LtE => "<=",
            CmpOp::Gt => ">",
            CmpOp::GtE => ">=",
            CmpOp::Is => "is",
            CmpOp::IsNot => "is not",
            CmpOp::In => "in",
            CmpOp::NotIn => "not in",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            BoolOp::And => "and",
            BoolOp::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
}
