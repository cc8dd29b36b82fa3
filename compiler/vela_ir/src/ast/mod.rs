//! Flat AST types using arena allocation.
//!
//! # Module Structure
//!
//! - `expr`: Core expression types (Expr, `ExprKind`)
//! - `operators`: Binary and unary operators
//! - `stmt`: Statement types and the top-level `Unit`
//! - `ranges`: Arena range types for side-table lists
//! - `comprehension`: Comprehension generator clauses

mod comprehension;
mod expr;
mod operators;
mod ranges;
mod stmt;

pub use comprehension::CompClause;
pub use expr::{Expr, ExprKind};
pub use operators::{BinaryOp, UnaryOp};
pub use ranges::{ClauseRange, NameRange};
pub use stmt::{Stmt, StmtKind, Unit};
