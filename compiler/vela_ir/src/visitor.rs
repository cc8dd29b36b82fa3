//! AST visitor.
//!
//! Read-only traversal over the arena-allocated AST. Override `visit_*`
//! methods to add behavior at specific nodes; call the matching `walk_*`
//! function to continue into children. The visitor can mutate its own
//! state, the AST stays immutable.

use crate::ast::{Stmt, StmtKind, Unit};
use crate::{ExprArena, ExprId, ExprKind};

/// AST visitor trait.
pub trait Visitor {
    /// Visit a program unit.
    fn visit_unit(&mut self, unit: &Unit, arena: &ExprArena) {
        walk_unit(self, unit, arena);
    }

    /// Visit a statement.
    fn visit_stmt(&mut self, stmt: &Stmt, arena: &ExprArena) {
        walk_stmt(self, stmt, arena);
    }

    /// Visit an expression by ID.
    fn visit_expr(&mut self, id: ExprId, arena: &ExprArena) {
        walk_expr(self, id, arena);
    }
}

/// Walk all statements of a unit.
pub fn walk_unit<V: Visitor + ?Sized>(visitor: &mut V, unit: &Unit, arena: &ExprArena) {
    for stmt in &unit.body {
        visitor.visit_stmt(stmt, arena);
    }
}

/// Walk the expression and statement children of a statement.
pub fn walk_stmt<V: Visitor + ?Sized>(visitor: &mut V, stmt: &Stmt, arena: &ExprArena) {
    match &stmt.kind {
        StmtKind::Import { .. } => {}
        StmtKind::Assign { value, .. } | StmtKind::Expr { value } => {
            visitor.visit_expr(*value, arena);
        }
        StmtKind::Return { value } => {
            if value.is_valid() {
                visitor.visit_expr(*value, arena);
            }
        }
        StmtKind::FunctionDef { body, .. } => {
            for stmt in body {
                visitor.visit_stmt(stmt, arena);
            }
        }
    }
}

/// Walk the children of an expression.
pub fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, id: ExprId, arena: &ExprArena) {
    match arena.kind(id) {
        ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Str(_)
        | ExprKind::Bool(_)
        | ExprKind::NoneLit
        | ExprKind::Ident(_) => {}
        ExprKind::Attribute { value, .. } => visitor.visit_expr(value, arena),
        ExprKind::Subscript { value, index } => {
            visitor.visit_expr(value, arena);
            visitor.visit_expr(index, arena);
        }
        ExprKind::Call { func, args } => {
            visitor.visit_expr(func, arena);
            for &arg in arena.get_expr_list(args) {
                visitor.visit_expr(arg, arena);
            }
        }
        ExprKind::Binary { left, right, .. } => {
            visitor.visit_expr(left, arena);
            visitor.visit_expr(right, arena);
        }
        ExprKind::Unary { operand, .. } => visitor.visit_expr(operand, arena),
        ExprKind::Lambda { body, .. } => visitor.visit_expr(body, arena),
        ExprKind::Tuple(elements) | ExprKind::List(elements) => {
            for &element in arena.get_expr_list(elements) {
                visitor.visit_expr(element, arena);
            }
        }
        ExprKind::ListComp { elt, clauses } | ExprKind::Generator { elt, clauses } => {
            for clause in arena.get_clauses(clauses) {
                visitor.visit_expr(clause.target, arena);
                visitor.visit_expr(clause.iter, arena);
                for &pred in arena.get_expr_list(clause.ifs) {
                    visitor.visit_expr(pred, arena);
                }
            }
            visitor.visit_expr(elt, arena);
        }
    }
}
