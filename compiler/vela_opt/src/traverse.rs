//! Shared pre-order traversal for rewriting passes.
//!
//! Both the idiom engine and the comprehension lowering walk a unit the
//! same way: statements in order, then expressions top-down. A pass
//! implements [`Rewriter`] for its per-node decision and calls
//! [`rewrite_children`] to continue downward; this module owns statement
//! walking and the child write-back that repoints a parent at replaced
//! children.
//!
//! Replacement is wholesale: a pass returns a (possibly new) root ID for
//! the node it visited, and the parent slot is overwritten with it. Nodes
//! are never partially edited in place by a rewrite.

use vela_ir::{CompClause, ExprArena, ExprId, ExprKind, ExprRange, Stmt, StmtKind, Unit};

use crate::error::PassError;

/// A pass that rewrites expressions during a unit traversal.
pub(crate) trait Rewriter {
    /// Rewrite the subtree rooted at `id`, returning its replacement ID
    /// (the same ID when nothing fired at or below this node).
    fn rewrite_expr(&mut self, arena: &mut ExprArena, id: ExprId) -> Result<ExprId, PassError>;
}

/// Rewrite every expression reachable from the unit's statements.
pub(crate) fn rewrite_unit<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    arena: &mut ExprArena,
    unit: &mut Unit,
) -> Result<(), PassError> {
    for stmt in &mut unit.body {
        rewrite_stmt(rewriter, arena, stmt)?;
    }
    Ok(())
}

fn rewrite_stmt<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    arena: &mut ExprArena,
    stmt: &mut Stmt,
) -> Result<(), PassError> {
    match &mut stmt.kind {
        StmtKind::Import { .. } => {}
        StmtKind::Assign { value, .. } | StmtKind::Expr { value } => {
            *value = rewriter.rewrite_expr(arena, *value)?;
        }
        StmtKind::Return { value } => {
            if value.is_valid() {
                *value = rewriter.rewrite_expr(arena, *value)?;
            }
        }
        StmtKind::FunctionDef { body, .. } => {
            for stmt in body {
                rewrite_stmt(rewriter, arena, stmt)?;
            }
        }
    }
    Ok(())
}

/// Rewrite the children of `id`, repointing the node at any replaced child.
///
/// The node keeps its own ID; only child slots change. Comprehension loop
/// targets are binding sites and are left alone.
pub(crate) fn rewrite_children<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    arena: &mut ExprArena,
    id: ExprId,
) -> Result<(), PassError> {
    match arena.kind(id) {
        ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Str(_)
        | ExprKind::Bool(_)
        | ExprKind::NoneLit
        | ExprKind::Ident(_) => {}
        ExprKind::Attribute { value, attr } => {
            let new_value = rewriter.rewrite_expr(arena, value)?;
            if new_value != value {
                arena.set_kind(
                    id,
                    ExprKind::Attribute {
                        value: new_value,
                        attr,
                    },
                );
            }
        }
        ExprKind::Subscript { value, index } => {
            let new_value = rewriter.rewrite_expr(arena, value)?;
            let new_index = rewriter.rewrite_expr(arena, index)?;
            if new_value != value || new_index != index {
                arena.set_kind(
                    id,
                    ExprKind::Subscript {
                        value: new_value,
                        index: new_index,
                    },
                );
            }
        }
        ExprKind::Call { func, args } => {
            let new_func = rewriter.rewrite_expr(arena, func)?;
            if new_func != func {
                arena.set_kind(
                    id,
                    ExprKind::Call {
                        func: new_func,
                        args,
                    },
                );
            }
            rewrite_list(rewriter, arena, args)?;
        }
        ExprKind::Binary { op, left, right } => {
            let new_left = rewriter.rewrite_expr(arena, left)?;
            let new_right = rewriter.rewrite_expr(arena, right)?;
            if new_left != left || new_right != right {
                arena.set_kind(
                    id,
                    ExprKind::Binary {
                        op,
                        left: new_left,
                        right: new_right,
                    },
                );
            }
        }
        ExprKind::Unary { op, operand } => {
            let new_operand = rewriter.rewrite_expr(arena, operand)?;
            if new_operand != operand {
                arena.set_kind(
                    id,
                    ExprKind::Unary {
                        op,
                        operand: new_operand,
                    },
                );
            }
        }
        ExprKind::Lambda { params, body } => {
            let new_body = rewriter.rewrite_expr(arena, body)?;
            if new_body != body {
                arena.set_kind(
                    id,
                    ExprKind::Lambda {
                        params,
                        body: new_body,
                    },
                );
            }
        }
        ExprKind::Tuple(elements) | ExprKind::List(elements) => {
            rewrite_list(rewriter, arena, elements)?;
        }
        ExprKind::ListComp { elt, clauses } => {
            rewrite_clauses(rewriter, arena, clauses)?;
            let new_elt = rewriter.rewrite_expr(arena, elt)?;
            if new_elt != elt {
                arena.set_kind(
                    id,
                    ExprKind::ListComp {
                        elt: new_elt,
                        clauses,
                    },
                );
            }
        }
        ExprKind::Generator { elt, clauses } => {
            rewrite_clauses(rewriter, arena, clauses)?;
            let new_elt = rewriter.rewrite_expr(arena, elt)?;
            if new_elt != elt {
                arena.set_kind(
                    id,
                    ExprKind::Generator {
                        elt: new_elt,
                        clauses,
                    },
                );
            }
        }
    }
    Ok(())
}

fn rewrite_list<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    arena: &mut ExprArena,
    range: ExprRange,
) -> Result<(), PassError> {
    for index in 0..range.len() {
        let old = arena.get_expr_list(range)[index];
        let new = rewriter.rewrite_expr(arena, old)?;
        if new != old {
            arena.set_expr_list_item(range, index, new);
        }
    }
    Ok(())
}

fn rewrite_clauses<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    arena: &mut ExprArena,
    range: vela_ir::ClauseRange,
) -> Result<(), PassError> {
    for index in 0..range.len() {
        let clause = arena.get_clauses(range)[index];
        let new_iter = rewriter.rewrite_expr(arena, clause.iter)?;
        if new_iter != clause.iter {
            arena.set_clause(
                range,
                index,
                CompClause {
                    iter: new_iter,
                    ..clause
                },
            );
        }
        rewrite_list(rewriter, arena, clause.ifs)?;
    }
    Ok(())
}
