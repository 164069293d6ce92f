//! The input syntax tree consumed by the translator.
//!
//! The tree mirrors the classical Python 2 grammar: statements, expressions,
//! assignment targets and operator kinds are closed unions, and every node
//! carries the source line it came from. The parser that produces this tree is
//! an external collaborator; the serde derives let it hand the tree over as
//! plain data (for example as JSON) from another process or language.

/// A whole Python module: the unit of translation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Module {
    /// Top-level statements in source order.
    pub body: Vec<StmtLoc>,
}

/// A statement with the line number it starts on.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StmtLoc {
    pub stmt: Stmt,
    pub lineno: u32,
}

impl StmtLoc {
    pub fn new(stmt: Stmt, lineno: u32) -> Self {
        Self { stmt, lineno }
    }
}

/// An expression with the line number it starts on.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ExprLoc {
    pub expr: Expr,
    pub lineno: u32,
}

impl ExprLoc {
    pub fn new(expr: Expr, lineno: u32) -> Self {
        Self { expr, lineno }
    }

    /// Shorthand for a name expression.
    pub fn name(name: impl Into<String>, lineno: u32) -> Self {
        Self::new(Expr::Name(name.into()), lineno)
    }

    /// Shorthand for a constant expression.
    pub fn constant(value: Literal, lineno: u32) -> Self {
        Self::new(Expr::Const(value), lineno)
    }

    /// Returns true when this is the `None` constant.
    pub fn is_none(&self) -> bool {
        matches!(self.expr, Expr::Const(Literal::None))
    }
}

/// A statement in the AST.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Stmt {
    /// Function definition (`def name(...): ...`).
    Function(FunctionDef),
    /// Class definition (`class Name(bases): ...`).
    Class(ClassDef),
    /// `return value`. A bare `return` carries the `None` constant.
    Return(ExprLoc),
    Break,
    Continue,
    Pass,
    /// `global a, b` declarations.
    Global(Vec<String>),
    /// `if`/`elif` chain with an optional `else` suite.
    ///
    /// Each entry in `tests` is one `(condition, suite)` arm.
    If {
        tests: Vec<(ExprLoc, Vec<StmtLoc>)>,
        orelse: Option<Vec<StmtLoc>>,
    },
    /// `for target in iter: body` with an optional (unsupported) `else` suite.
    For {
        target: Target,
        iter: ExprLoc,
        body: Vec<StmtLoc>,
        orelse: Option<Vec<StmtLoc>>,
    },
    /// `while test: body` with an optional (unsupported) `else` suite.
    While {
        test: ExprLoc,
        body: Vec<StmtLoc>,
        orelse: Option<Vec<StmtLoc>>,
    },
    /// `try` with one or more `except` clauses and an optional `else` suite.
    TryExcept(TryExcept),
    /// `try: body finally: cleanup`.
    ///
    /// When `body` consists of a single [`Stmt::TryExcept`] the two constructs
    /// came from one combined `try/except/finally` statement.
    TryFinally {
        body: Vec<StmtLoc>,
        finally: Vec<StmtLoc>,
    },
    /// `raise`, `raise exc`, `raise exc, value` or `raise exc, value, tb`.
    Raise {
        exc_type: Option<ExprLoc>,
        value: Option<ExprLoc>,
        traceback: Option<ExprLoc>,
    },
    /// `assert test` or `assert test, message`.
    Assert {
        test: ExprLoc,
        fail: Option<ExprLoc>,
    },
    /// `import a.b.c` / `import a.b.c as name`.
    Import { names: Vec<ImportName> },
    /// `from module import a, b as c`.
    From {
        module: String,
        names: Vec<ImportName>,
    },
    /// `print a, b` (`newline` distinguishes the trailing-comma form).
    Print { args: Vec<ExprLoc>, newline: bool },
    /// An expression evaluated for its effect and discarded.
    Discard(ExprLoc),
    /// `a = value`, `a = b = value`, `a, b = value` and friends.
    Assign { targets: Vec<Target>, value: ExprLoc },
    /// `target op= value`.
    AugAssign {
        target: AugTarget,
        op: AugOp,
        value: ExprLoc,
    },
    /// `del target`.
    Delete(Target),
}

/// One name in an `import`/`from` statement with its optional alias.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ImportName {
    pub name: String,
    pub alias: Option<String>,
}

impl ImportName {
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }
}

/// A function definition as exposed by the parser.
///
/// When `varargs`/`kwargs` are set the corresponding names occupy the tail of
/// `argnames` (the `*args` name before the `**kwargs` name), exactly as the
/// classical grammar lays them out. Tuple parameters arrive pre-flattened.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub argnames: Vec<String>,
    /// Default expressions for the trailing parameters of `argnames`.
    pub defaults: Vec<ExprLoc>,
    pub varargs: bool,
    pub kwargs: bool,
    pub code: Vec<StmtLoc>,
    pub decorators: Vec<ExprLoc>,
}

/// A class definition.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ClassDef {
    pub name: String,
    pub bases: Vec<ExprLoc>,
    pub code: Vec<StmtLoc>,
}

/// `try` body plus its `except` clauses and optional `else` suite.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TryExcept {
    pub body: Vec<StmtLoc>,
    pub handlers: Vec<ExceptHandler>,
    pub orelse: Option<Vec<StmtLoc>>,
}

/// One `except` clause.
///
/// Both the old `except E, name:` and the newer `except E as name:` surface
/// forms map onto the same optional binding target; the parser's distinction
/// does not survive into the tree and the emitted code is identical for both.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ExceptHandler {
    /// Exception class expression, or a tuple of classes. `None` catches all.
    pub exc_type: Option<ExprLoc>,
    /// Binding name for the caught exception, when one was written.
    pub name: Option<String>,
    pub body: Vec<StmtLoc>,
    pub lineno: u32,
}

/// An assignment (or deletion) target.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Target {
    /// Plain name: `a = ...`
    Name(String),
    /// Attribute: `obj.attr = ...`
    Attr { object: ExprLoc, attr: String },
    /// Subscript: `obj[key] = ...`
    Subscript { object: ExprLoc, index: ExprLoc },
    /// Tuple destructuring: `a, b = ...`
    Tuple(Vec<Target>),
    /// List destructuring: `[a, b] = ...`
    List(Vec<Target>),
}

/// The left-hand side of an augmented assignment.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum AugTarget {
    Name(String),
    Attr { object: ExprLoc, attr: String },
    Subscript { object: ExprLoc, index: ExprLoc },
}

/// Operator of an augmented assignment (`a op= b`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AugOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    FloorDiv,
    Power,
    BitAnd,
    BitOr,
    BitXor,
    LeftShift,
    RightShift,
}

impl AugOp {
    /// The native JavaScript compound-assignment token.
    pub(crate) fn js_token(self) -> &'static str {
        match self {
            Self::Add => "+=",
            Self::Sub => "-=",
            Self::Mul => "*=",
            Self::Div | Self::FloorDiv => "/=",
            Self::Mod => "%=",
            Self::Power => "**=",
            Self::BitAnd => "&=",
            Self::BitOr => "|=",
            Self::BitXor => "^=",
            Self::LeftShift => "<<=",
            Self::RightShift => ">>=",
        }
    }

    /// The binary operator this augmented form expands to, for the operator
    /// lowering path. Only the arithmetic operators have a lowered form.
    pub(crate) fn bin_op(self) -> Option<BinOp> {
        match self {
            Self::Add => Some(BinOp::Add),
            Self::Sub => Some(BinOp::Sub),
            Self::Mul => Some(BinOp::Mul),
            Self::Div => Some(BinOp::Div),
            Self::Mod => Some(BinOp::Mod),
            _ => None,
        }
    }
}

/// An expression in the AST.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Expr {
    Const(Literal),
    Name(String),
    /// Attribute access: `obj.attr` (chains nest through `object`).
    Getattr { object: Box<ExprLoc>, attr: String },
    /// Item access: `obj[index]`.
    Subscript {
        object: Box<ExprLoc>,
        index: Box<ExprLoc>,
    },
    /// Slice: `obj[lower:upper]`.
    Slice {
        object: Box<ExprLoc>,
        lower: Option<Box<ExprLoc>>,
        upper: Option<Box<ExprLoc>>,
    },
    Tuple(Vec<ExprLoc>),
    List(Vec<ExprLoc>),
    /// Dict literal with `key: value` entries in source order.
    Dict(Vec<(ExprLoc, ExprLoc)>),
    Call(CallFunc),
    Lambda(Box<LambdaDef>),
    /// List comprehension: `[expr for target in iter if cond]`.
    ListComp {
        expr: Box<ExprLoc>,
        generators: Vec<CompFor>,
    },
    /// Comparison chain. Only single-operator chains are translatable.
    Compare {
        left: Box<ExprLoc>,
        ops: Vec<(CompareOp, ExprLoc)>,
    },
    Not(Box<ExprLoc>),
    And(Vec<ExprLoc>),
    Or(Vec<ExprLoc>),
    /// Binary arithmetic or shift operation.
    Op {
        op: BinOp,
        left: Box<ExprLoc>,
        right: Box<ExprLoc>,
    },
    /// Variadic bitwise operation (`a & b & c`).
    BitOp { op: BitOp, operands: Vec<ExprLoc> },
    Unary {
        op: UnaryOp,
        operand: Box<ExprLoc>,
    },
    /// `yield value`; a bare `yield` carries no value.
    Yield(Option<Box<ExprLoc>>),
}

/// A call expression, including keyword and star arguments.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CallFunc {
    pub func: Box<ExprLoc>,
    pub args: Vec<CallArg>,
    pub star_args: Option<Box<ExprLoc>>,
    pub dstar_args: Option<Box<ExprLoc>>,
}

impl CallFunc {
    /// A plain positional call with no star or keyword arguments.
    pub fn positional(func: ExprLoc, args: Vec<ExprLoc>) -> Self {
        Self {
            func: Box::new(func),
            args: args.into_iter().map(CallArg::Positional).collect(),
            star_args: None,
            dstar_args: None,
        }
    }
}

/// One argument at a call site.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum CallArg {
    Positional(ExprLoc),
    Keyword { name: String, value: ExprLoc },
}

/// A lambda: an anonymous function whose body is a single expression.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LambdaDef {
    pub argnames: Vec<String>,
    pub defaults: Vec<ExprLoc>,
    pub varargs: bool,
    pub kwargs: bool,
    pub body: ExprLoc,
}

/// One `for target in iter [if cond]` clause of a list comprehension.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CompFor {
    pub target: Target,
    pub iter: ExprLoc,
    pub ifs: Vec<ExprLoc>,
    pub lineno: u32,
}

/// A constant value.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    None,
}

/// Binary operators with left and right operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Power,
    LeftShift,
    RightShift,
}

/// Variadic bitwise operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BitOp {
    And,
    Or,
    Xor,
}

impl BitOp {
    pub(crate) fn js_token(self) -> &'static str {
        match self {
            Self::And => "&",
            Self::Or => "|",
            Self::Xor => "^",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum UnaryOp {
    Plus,
    Minus,
    Invert,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    In,
    NotIn,
    Is,
    IsNot,
}
