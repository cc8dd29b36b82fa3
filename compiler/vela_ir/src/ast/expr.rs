//! Expression types.
//!
//! All children are indices into the [`ExprArena`](crate::ExprArena), not
//! boxes; multi-child positions use compact range types over the arena's
//! side tables.

use std::fmt;

use super::operators::{BinaryOp, UnaryOp};
use super::ranges::{ClauseRange, NameRange};
use crate::{ExprId, ExprRange, Name, Span};

/// Expression node.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.kind, self.span)
    }
}

/// Expression variants.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    /// Integer literal: 42
    Int(i64),

    /// Float literal: 0.5 (stored as bits for Hash)
    Float(u64),

    /// String literal (interned)
    Str(Name),

    /// Boolean literal: true, false
    Bool(bool),

    /// Absent-value literal
    NoneLit,

    /// Variable or builtin reference
    Ident(Name),

    /// Attribute access: value.attr
    Attribute { value: ExprId, attr: Name },

    /// Subscript access: `value[index]`
    Subscript { value: ExprId, index: ExprId },

    /// Call: func(args...)
    Call { func: ExprId, args: ExprRange },

    /// Binary operation: left op right
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },

    /// Unary operation: op operand
    Unary { op: UnaryOp, operand: ExprId },

    /// Anonymous function: lambda params: body
    Lambda { params: NameRange, body: ExprId },

    /// Tuple display: (a, b, c)
    Tuple(ExprRange),

    /// List display: [a, b, c]
    List(ExprRange),

    /// List comprehension: [elt for ... in ... if ...]
    ListComp { elt: ExprId, clauses: ClauseRange },

    /// Generator expression: (elt for ... in ... if ...)
    Generator { elt: ExprId, clauses: ClauseRange },
}

impl ExprKind {
    /// Float literal from an `f64` value.
    #[inline]
    pub fn float(value: f64) -> Self {
        ExprKind::Float(value.to_bits())
    }
}

crate::static_assert_size!(ExprKind, 16);
