//! Vela IR - Intermediate Representation Types
//!
//! This crate contains the core data structures shared by the Vela compiler
//! passes:
//! - Spans for source locations
//! - Names for interned identifiers
//! - AST nodes (Expr, Stmt, Unit)
//! - Arena allocation for expressions
//! - Read-only visitor traversal
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: Strings → Name(u32)
//! - **Flatten Everything**: No Box<Expr> in program trees, use ExprId(u32)
//!   indices into a contiguous arena
//!
//! Types that contain floats store them as u64 bits for Hash compatibility.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod arena;
pub mod ast;
mod expr_id;
mod interner;
mod name;
mod span;
pub mod visitor;

pub use arena::ExprArena;
pub use ast::{
    BinaryOp, ClauseRange, CompClause, Expr, ExprKind, NameRange, Stmt, StmtKind, UnaryOp, Unit,
};
pub use expr_id::{ExprId, ExprRange};
pub use interner::{InternError, StringInterner};
pub use name::Name;
pub use span::Span;
