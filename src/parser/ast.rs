//! # Abstract Syntax Tree (AST)
//!
//! Defines the data structures representing parsed `.step` source code —
//! the stand-in AST that C2 rewrites, C3 merges, and C4 pretty-prints.
//!
//! ## Design Philosophy
//!
//! The AST is deliberately small: one function kind, one block kind, and a
//! handful of statement shapes (assignment, call, branch, loop, multi-way
//! dispatch, rendezvous-select, return). Each statement carries the
//! `Position` the transform (C2) needs to synthesize its `LINE` trace call.
//! Statement kinds the transform doesn't recognize fall into `Other`, which
//! is treated as a leaf (traced, never recursed into) per the "AST walks as
//! pattern matching" design note.

use crate::position::Position;

/// One parsed (and, after C3, possibly merged) compilation unit.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    pub package_name: String,
    pub imports: Vec<Import>,
    pub functions: Vec<FunctionDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<String>,
    pub body: Block,
}

/// A block is just an ordered list of statements. Nested blocks (branch
/// arms, loop bodies, switch/select arms) reuse this type directly rather
/// than a separate "scope" wrapper — matching how LineContent/SourceLine
/// kept instruction representation flat in the teacher's AST.
pub type Block = Vec<Stmt>;

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub position: Position,
}

impl Stmt {
    pub fn new(kind: StmtKind, position: Position) -> Self {
        Self { kind, position }
    }

    /// A statement is a "bare call statement" (§4.2) when its outermost
    /// form is a call expression with no surrounding assignment or
    /// control construct.
    pub fn as_bare_call(&self) -> Option<&Expr> {
        match &self.kind {
            StmtKind::Expr(expr @ Expr::Call { .. }) => Some(expr),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// A bare expression statement — most commonly a call (`f(x)` or
    /// `pkg.Fn(x)`), which is what makes ENTER/EXIT emission possible.
    Expr(Expr),
    /// `targets := value` (define) or `targets = value` (plain assign).
    Assign {
        targets: Vec<String>,
        define: bool,
        value: Expr,
    },
    If {
        cond: Expr,
        then_block: Block,
        else_block: Option<Block>,
    },
    For {
        cond: Option<Expr>,
        body: Block,
    },
    Switch {
        tag: Expr,
        cases: Vec<SwitchCase>,
    },
    Select {
        cases: Vec<SelectCase>,
    },
    Return(Option<Expr>),
    /// Any statement shape the transform doesn't recognize. Traced like
    /// any other statement but never recursed into — see Design Notes
    /// ("Treat unknown statement kinds as leaf statements").
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub values: Vec<Expr>,
    pub is_default: bool,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectCase {
    /// The communication clause (`x := <-ch`, `ch <- x`, ...) is kept as
    /// raw source text: its internal shape is language-specific and not
    /// part of what the transform needs to reason about.
    pub comm: String,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(String),
    Number(i64),
    Str(String),
    Selector { base: Box<Expr>, sel: String },
    Call { callee: Box<Expr>, args: Vec<Expr> },
}

impl Expr {
    /// The rightmost identifier in a call target: `Fn` for `Fn(...)`,
    /// `Fn` for `pkg.Fn(...)` — used by C2 to name the ENTER/EXIT callee.
    pub fn rightmost_ident(&self) -> Option<&str> {
        match self {
            Expr::Ident(name) => Some(name),
            Expr::Selector { sel, .. } => Some(sel),
            Expr::Call { callee, .. } => callee.rightmost_ident(),
            _ => None,
        }
    }
}
