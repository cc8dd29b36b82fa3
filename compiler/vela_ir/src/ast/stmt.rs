//! Statement types and the top-level unit.

use std::fmt;

use crate::{ExprId, Name, Span};

/// Statement node.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

impl fmt::Debug for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.kind, self.span)
    }
}

/// Statement variants.
///
/// Statements own their nested statement lists directly; only expression
/// children live in the arena.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum StmtKind {
    /// Namespace import: import module as alias.
    /// `alias` equals `module` when the import is unaliased.
    Import { module: Name, alias: Name },

    /// Single-name assignment: target = value
    Assign { target: Name, value: ExprId },

    /// Return statement; `ExprId::INVALID` for a bare `return`.
    Return { value: ExprId },

    /// Expression statement.
    Expr { value: ExprId },

    /// Function definition.
    FunctionDef {
        name: Name,
        params: Vec<Name>,
        body: Vec<Stmt>,
    },
}

/// A program unit: the ordered top-level statement sequence that passes
/// consume and produce. Hoisted declarations are prepended to `body`.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Unit {
    pub body: Vec<Stmt>,
}

impl Unit {
    /// Create a unit from its top-level statements.
    pub fn new(body: Vec<Stmt>) -> Self {
        Unit { body }
    }
}
