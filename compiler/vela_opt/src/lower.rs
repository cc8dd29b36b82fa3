//! Comprehension lowering.
//!
//! Turns comprehensions and generator expressions into explicit
//! filter/map/product combinator pipelines:
//!
//! - each generator clause with predicates becomes `filter(lambda, iterable)`;
//! - a single clause maps directly over its iterator;
//! - N clauses combine through an N-ary `product(...)`, with every reference
//!   to the i-th loop variable rewritten to an indexed projection on one
//!   merged variable;
//! - list comprehensions materialize with a `list(...)` wrapper, generator
//!   expressions stay lazy.
//!
//! Only nodes flagged optimizable by the upstream purity analysis are
//! touched; the flag set arrives as node IDs. Clauses whose loop target is
//! not a simple name are rejected — the pre-filter should never let one
//! through, and mis-rewriting it would be far worse than failing loudly.

use rustc_hash::{FxHashMap, FxHashSet};

use vela_ir::ast::ClauseRange;
use vela_ir::{
    BinaryOp, CompClause, Expr, ExprArena, ExprId, ExprKind, Name, Span, StringInterner, Unit,
};

use crate::config::{mangle, CombinatorNamespace};
use crate::error::PassError;
use crate::hoist::{self, Hoist};
use crate::traverse::{self, Rewriter};

/// Interned names the lowering emits.
struct LoweredNames {
    map: Name,
    filter: Name,
    product: Name,
    list: Name,
    iter: Name,
    iter_alias: Name,
}

/// The comprehension-lowering pass.
///
/// Holds configuration only; traversal state lives in a per-`apply` run.
pub struct ComprehensionLowering<'a> {
    optimizable: &'a FxHashSet<ExprId>,
    namespace: CombinatorNamespace,
    names: LoweredNames,
}

impl<'a> ComprehensionLowering<'a> {
    /// Create the pass.
    ///
    /// `optimizable` is the set of comprehension/generator nodes the
    /// upstream analysis cleared for fusion; everything else is left alone.
    pub fn new(
        interner: &StringInterner,
        optimizable: &'a FxHashSet<ExprId>,
        namespace: CombinatorNamespace,
    ) -> Self {
        ComprehensionLowering {
            optimizable,
            namespace,
            names: LoweredNames {
                map: interner.intern("map"),
                filter: interner.intern("filter"),
                product: interner.intern("product"),
                list: interner.intern("list"),
                iter: interner.intern("iter"),
                iter_alias: mangle(interner, "iter"),
            },
        }
    }

    /// Run one traversal over the unit.
    ///
    /// Returns whether any comprehension was lowered. If anything in the
    /// unit used an `iter`-module combinator, the module import is
    /// prepended exactly once after the traversal.
    pub fn apply(&self, unit: &mut Unit, arena: &mut ExprArena) -> Result<bool, PassError> {
        let mut run = Run {
            pass: self,
            changed: false,
            uses_iter_module: false,
        };
        traverse::rewrite_unit(&mut run, arena, unit)?;
        if run.uses_iter_module {
            hoist::prepend_hoists(
                unit,
                &[Hoist {
                    module: self.names.iter,
                    alias: self.names.iter_alias,
                }],
            );
        }
        Ok(run.changed)
    }
}

/// Accumulated effects of one traversal.
struct Run<'p, 'a> {
    pass: &'p ComprehensionLowering<'a>,
    changed: bool,
    uses_iter_module: bool,
}

impl Rewriter for Run<'_, '_> {
    fn rewrite_expr(&mut self, arena: &mut ExprArena, id: ExprId) -> Result<ExprId, PassError> {
        let optimizable = self.pass.optimizable.contains(&id);
        match arena.kind(id) {
            ExprKind::ListComp { .. } if optimizable => {
                // Children first, so nested comprehensions lower inside-out.
                traverse::rewrite_children(self, arena, id)?;
                let ExprKind::ListComp { elt, clauses } = arena.kind(id) else {
                    return Ok(id);
                };
                self.lower(arena, id, elt, clauses, true)
            }
            ExprKind::Generator { .. } if optimizable => {
                traverse::rewrite_children(self, arena, id)?;
                let ExprKind::Generator { elt, clauses } = arena.kind(id) else {
                    return Ok(id);
                };
                self.lower(arena, id, elt, clauses, false)
            }
            _ => {
                traverse::rewrite_children(self, arena, id)?;
                Ok(id)
            }
        }
    }
}

impl Run<'_, '_> {
    /// Build the combinator pipeline replacing the comprehension at `id`.
    fn lower(
        &mut self,
        arena: &mut ExprArena,
        id: ExprId,
        elt: ExprId,
        clauses: ClauseRange,
        materialize: bool,
    ) -> Result<ExprId, PassError> {
        let span = arena.span(id);
        let clause_list: Vec<CompClause> = arena.get_clauses(clauses).to_vec();

        // Every loop target must be a simple name.
        let mut targets = Vec::with_capacity(clause_list.len());
        for clause in &clause_list {
            match arena.kind(clause.target) {
                ExprKind::Ident(name) => targets.push(name),
                _ => {
                    return Err(PassError::UnsupportedTarget {
                        span: arena.span(clause.target),
                    })
                }
            }
        }

        let mut iterators = Vec::with_capacity(clause_list.len());
        for (clause, &target) in clause_list.iter().zip(&targets) {
            iterators.push(self.clause_iterator(arena, clause, target));
        }

        let (param, source, body) = if let [iterator] = iterators[..] {
            // Single generator: no product, the element expression is the
            // map body unmodified.
            (targets[0], iterator, elt)
        } else {
            // N generators: one merged variable drives an N-ary product.
            // The first loop variable's name is free to retarget, since
            // every reference to a loop variable is about to be replaced
            // by a projection.
            self.uses_iter_module = true;
            let merged = targets[0];
            let mut renames: FxHashMap<Name, i64> = FxHashMap::default();
            let mut index = 0i64;
            for &target in &targets {
                renames.insert(target, index);
                index += 1;
            }
            project_names(arena, elt, &renames, merged);

            let module = arena.alloc_expr(Expr::new(
                ExprKind::Ident(self.pass.names.iter_alias),
                span,
            ));
            let callee = arena.alloc_expr(Expr::new(
                ExprKind::Attribute {
                    value: module,
                    attr: self.pass.names.product,
                },
                span,
            ));
            let args = arena.push_expr_list(&iterators);
            let product = arena.alloc_expr(Expr::new(ExprKind::Call { func: callee, args }, span));
            (merged, product, elt)
        };

        let params = arena.push_names(&[param]);
        let lambda = arena.alloc_expr(Expr::new(ExprKind::Lambda { params, body }, span));
        let map_callee = self.combinator(arena, self.pass.names.map, span);
        let args = arena.push_expr_list(&[lambda, source]);
        let mapped = arena.alloc_expr(Expr::new(
            ExprKind::Call {
                func: map_callee,
                args,
            },
            span,
        ));

        let result = if materialize {
            let list_callee =
                arena.alloc_expr(Expr::new(ExprKind::Ident(self.pass.names.list), span));
            let args = arena.push_expr_list(&[mapped]);
            arena.alloc_expr(Expr::new(
                ExprKind::Call {
                    func: list_callee,
                    args,
                },
                span,
            ))
        } else {
            mapped
        };
        self.changed = true;
        tracing::debug!(generators = clause_list.len(), "comprehension lowered");
        Ok(result)
    }

    /// Per-clause iterator: the source iterable, filter-wrapped when the
    /// clause has predicates. Multiple predicates fold into one condition
    /// with `and`.
    fn clause_iterator(
        &mut self,
        arena: &mut ExprArena,
        clause: &CompClause,
        target: Name,
    ) -> ExprId {
        let predicates = arena.get_expr_list(clause.ifs).to_vec();
        let Some((&first, rest)) = predicates.split_first() else {
            return clause.iter;
        };
        let span = arena.span(clause.iter);
        let mut condition = first;
        for &predicate in rest {
            condition = arena.alloc_expr(Expr::new(
                ExprKind::Binary {
                    op: BinaryOp::And,
                    left: condition,
                    right: predicate,
                },
                span,
            ));
        }
        let params = arena.push_names(&[target]);
        let guard = arena.alloc_expr(Expr::new(
            ExprKind::Lambda {
                params,
                body: condition,
            },
            span,
        ));
        let callee = self.combinator(arena, self.pass.names.filter, span);
        let args = arena.push_expr_list(&[guard, clause.iter]);
        arena.alloc_expr(Expr::new(ExprKind::Call { func: callee, args }, span))
    }

    /// Callee for a `filter`/`map` combinator in the configured namespace.
    fn combinator(&mut self, arena: &mut ExprArena, name: Name, span: Span) -> ExprId {
        match self.pass.namespace {
            CombinatorNamespace::Builtins => {
                arena.alloc_expr(Expr::new(ExprKind::Ident(name), span))
            }
            CombinatorNamespace::IterModule => {
                self.uses_iter_module = true;
                let module = arena.alloc_expr(Expr::new(
                    ExprKind::Ident(self.pass.names.iter_alias),
                    span,
                ));
                arena.alloc_expr(Expr::new(
                    ExprKind::Attribute {
                        value: module,
                        attr: name,
                    },
                    span,
                ))
            }
        }
    }
}

/// Rewrite every reference to a renamed loop variable inside `id` into an
/// indexed projection `merged[i]`.
///
/// Touches only `Ident` reference nodes; binding sites (lambda parameters,
/// comprehension targets) are name fields, not expression nodes, and stay
/// as they are.
fn project_names(arena: &mut ExprArena, id: ExprId, renames: &FxHashMap<Name, i64>, merged: Name) {
    match arena.kind(id) {
        ExprKind::Ident(name) => {
            if let Some(&index) = renames.get(&name) {
                let span = arena.span(id);
                let value = arena.alloc_expr(Expr::new(ExprKind::Ident(merged), span));
                let index = arena.alloc_expr(Expr::new(ExprKind::Int(index), span));
                arena.set_kind(id, ExprKind::Subscript { value, index });
            }
        }
        ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Str(_)
        | ExprKind::Bool(_)
        | ExprKind::NoneLit => {}
        ExprKind::Attribute { value, .. } => project_names(arena, value, renames, merged),
        ExprKind::Subscript { value, index } => {
            project_names(arena, value, renames, merged);
            project_names(arena, index, renames, merged);
        }
        ExprKind::Call { func, args } => {
            project_names(arena, func, renames, merged);
            for child in arena.get_expr_list(args).to_vec() {
                project_names(arena, child, renames, merged);
            }
        }
        ExprKind::Binary { left, right, .. } => {
            project_names(arena, left, renames, merged);
            project_names(arena, right, renames, merged);
        }
        ExprKind::Unary { operand, .. } => project_names(arena, operand, renames, merged),
        ExprKind::Lambda { body, .. } => project_names(arena, body, renames, merged),
        ExprKind::Tuple(elements) | ExprKind::List(elements) => {
            for child in arena.get_expr_list(elements).to_vec() {
                project_names(arena, child, renames, merged);
            }
        }
        ExprKind::ListComp { elt, clauses } | ExprKind::Generator { elt, clauses } => {
            for clause in arena.get_clauses(clauses).to_vec() {
                project_names(arena, clause.iter, renames, merged);
                for predicate in arena.get_expr_list(clause.ifs).to_vec() {
                    project_names(arena, predicate, renames, merged);
                }
            }
            project_names(arena, elt, renames, merged);
        }
    }
}
