//! Expression arena.
//!
//! [`ExprArena`] uses struct-of-arrays layout for cache locality: parallel
//! `kinds`/`spans` arrays indexed by [`ExprId`], plus flattened side tables
//! for expression lists, comprehension clauses, and lambda parameter names.
//!
//! Rewriting passes allocate replacement subtrees into the same arena and
//! repoint the parent; abandoned nodes stay in place and are never reused,
//! so an ID captured before a replacement remains valid afterwards.

use crate::ast::{ClauseRange, CompClause, NameRange};
use crate::{Expr, ExprId, ExprKind, ExprRange, Name, Span};

/// Convert a length to a u32 index, panicking on overflow.
///
/// # Panics
/// Panics if `n` exceeds `u32::MAX`; arenas are bounded by the 32-bit ID
/// space.
pub(crate) fn to_u32(n: usize, what: &str) -> u32 {
    match u32::try_from(n) {
        Ok(v) => v,
        Err(_) => panic!("{what} exceeded u32 index space ({n})"),
    }
}

/// Convert a list length to a u16 range length, panicking on overflow.
pub(crate) fn to_u16(n: usize, what: &str) -> u16 {
    match u16::try_from(n) {
        Ok(v) => v,
        Err(_) => panic!("{what} exceeded u16 length space ({n})"),
    }
}

/// Arena for expressions.
///
/// # Index Spaces
///
/// - `kinds`/`spans`: parallel arrays indexed by [`ExprId`]
/// - `expr_lists`: flat `Vec<ExprId>` indexed by [`ExprRange`]
/// - `clauses`: comprehension clauses indexed by [`ClauseRange`]
/// - `names`: lambda parameter names indexed by [`NameRange`]
#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    /// Expression kinds (parallel with spans).
    kinds: Vec<ExprKind>,
    /// Source spans (parallel with kinds).
    spans: Vec<Span>,
    /// Flattened expression ID lists (args, elements, filter predicates).
    expr_lists: Vec<ExprId>,
    /// Comprehension generator clauses.
    clauses: Vec<CompClause>,
    /// Lambda parameter names.
    names: Vec<Name>,
}

impl ExprArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an arena pre-allocated for roughly `expr_count` expressions.
    pub fn with_capacity(expr_count: usize) -> Self {
        ExprArena {
            kinds: Vec::with_capacity(expr_count),
            spans: Vec::with_capacity(expr_count),
            expr_lists: Vec::with_capacity(expr_count),
            clauses: Vec::new(),
            names: Vec::new(),
        }
    }

    /// Allocate an expression, returning its ID.
    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::new(to_u32(self.kinds.len(), "expressions"));
        self.kinds.push(expr.kind);
        self.spans.push(expr.span);
        id
    }

    /// Get the expression kind for a node.
    #[inline]
    pub fn kind(&self, id: ExprId) -> ExprKind {
        self.kinds[id.index()]
    }

    /// Get the source span for a node.
    #[inline]
    pub fn span(&self, id: ExprId) -> Span {
        self.spans[id.index()]
    }

    /// Reconstruct a full `Expr` from the parallel arrays.
    pub fn get_expr(&self, id: ExprId) -> Expr {
        Expr {
            kind: self.kinds[id.index()],
            span: self.spans[id.index()],
        }
    }

    /// Overwrite the kind of an existing node.
    ///
    /// Used by traversal write-back to repoint child IDs after a child was
    /// replaced; never used to partially edit a node a rewrite matched on.
    pub fn set_kind(&mut self, id: ExprId, kind: ExprKind) {
        self.kinds[id.index()] = kind;
    }

    /// Number of allocated expressions.
    pub fn expr_count(&self) -> usize {
        self.kinds.len()
    }

    /// Returns `true` if no expressions have been allocated.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    // Expression lists

    /// Allocate a contiguous range of expression IDs.
    pub fn push_expr_list(&mut self, ids: &[ExprId]) -> ExprRange {
        if ids.is_empty() {
            return ExprRange::EMPTY;
        }
        let start = to_u32(self.expr_lists.len(), "expression lists");
        self.expr_lists.extend_from_slice(ids);
        ExprRange::new(start, to_u16(ids.len(), "expression list"))
    }

    /// Get expression IDs from a range.
    pub fn get_expr_list(&self, range: ExprRange) -> &[ExprId] {
        if range.is_empty() {
            return &[];
        }
        let start = range.start as usize;
        &self.expr_lists[start..start + range.len()]
    }

    /// Overwrite one slot of an expression list (traversal write-back).
    ///
    /// # Panics
    /// Panics if `index` is out of bounds for the range.
    pub fn set_expr_list_item(&mut self, range: ExprRange, index: usize, id: ExprId) {
        assert!(index < range.len(), "expression list index out of bounds");
        self.expr_lists[range.start as usize + index] = id;
    }

    // Comprehension clauses

    /// Allocate a contiguous range of comprehension clauses.
    pub fn push_clauses(&mut self, clauses: &[CompClause]) -> ClauseRange {
        if clauses.is_empty() {
            return ClauseRange::EMPTY;
        }
        let start = to_u32(self.clauses.len(), "clauses");
        self.clauses.extend_from_slice(clauses);
        ClauseRange::new(start, to_u16(clauses.len(), "clause list"))
    }

    /// Get comprehension clauses from a range.
    pub fn get_clauses(&self, range: ClauseRange) -> &[CompClause] {
        if range.is_empty() {
            return &[];
        }
        let start = range.start as usize;
        &self.clauses[start..start + range.len()]
    }

    /// Overwrite one clause of a clause range (traversal write-back).
    ///
    /// # Panics
    /// Panics if `index` is out of bounds for the range.
    pub fn set_clause(&mut self, range: ClauseRange, index: usize, clause: CompClause) {
        assert!(index < range.len(), "clause index out of bounds");
        self.clauses[range.start as usize + index] = clause;
    }

    // Name lists

    /// Allocate a contiguous range of names (lambda parameters).
    pub fn push_names(&mut self, names: &[Name]) -> NameRange {
        if names.is_empty() {
            return NameRange::EMPTY;
        }
        let start = to_u32(self.names.len(), "name lists");
        self.names.extend_from_slice(names);
        NameRange::new(start, to_u16(names.len(), "name list"))
    }

    /// Get names from a range.
    pub fn get_names(&self, range: NameRange) -> &[Name] {
        if range.is_empty() {
            return &[];
        }
        let start = range.start as usize;
        &self.names[start..start + range.len()]
    }

    // Subtree operations

    /// Deep-copy a subtree into fresh nodes, returning the new root.
    ///
    /// The copy shares no node, list, clause, or name storage with the
    /// original, so the two trees can be rewritten independently.
    pub fn deep_copy(&mut self, id: ExprId) -> ExprId {
        let Expr { kind, span } = self.get_expr(id);
        let kind = match kind {
            leaf @ (ExprKind::Int(_)
            | ExprKind::Float(_)
            | ExprKind::Str(_)
            | ExprKind::Bool(_)
            | ExprKind::NoneLit
            | ExprKind::Ident(_)) => leaf,
            ExprKind::Attribute { value, attr } => ExprKind::Attribute {
                value: self.deep_copy(value),
                attr,
            },
            ExprKind::Subscript { value, index } => ExprKind::Subscript {
                value: self.deep_copy(value),
                index: self.deep_copy(index),
            },
            ExprKind::Call { func, args } => ExprKind::Call {
                func: self.deep_copy(func),
                args: self.copy_expr_list(args),
            },
            ExprKind::Binary { op, left, right } => ExprKind::Binary {
                op,
                left: self.deep_copy(left),
                right: self.deep_copy(right),
            },
            ExprKind::Unary { op, operand } => ExprKind::Unary {
                op,
                operand: self.deep_copy(operand),
            },
            ExprKind::Lambda { params, body } => {
                let params = {
                    let names: Vec<Name> = self.get_names(params).to_vec();
                    self.push_names(&names)
                };
                ExprKind::Lambda {
                    params,
                    body: self.deep_copy(body),
                }
            }
            ExprKind::Tuple(elements) => ExprKind::Tuple(self.copy_expr_list(elements)),
            ExprKind::List(elements) => ExprKind::List(self.copy_expr_list(elements)),
            ExprKind::ListComp { elt, clauses } => ExprKind::ListComp {
                elt: self.deep_copy(elt),
                clauses: self.copy_clauses(clauses),
            },
            ExprKind::Generator { elt, clauses } => ExprKind::Generator {
                elt: self.deep_copy(elt),
                clauses: self.copy_clauses(clauses),
            },
        };
        self.alloc_expr(Expr::new(kind, span))
    }

    fn copy_expr_list(&mut self, range: ExprRange) -> ExprRange {
        let ids: Vec<ExprId> = self.get_expr_list(range).to_vec();
        let copied: Vec<ExprId> = ids.into_iter().map(|id| self.deep_copy(id)).collect();
        self.push_expr_list(&copied)
    }

    fn copy_clauses(&mut self, range: ClauseRange) -> ClauseRange {
        let clauses: Vec<CompClause> = self.get_clauses(range).to_vec();
        let copied: Vec<CompClause> = clauses
            .into_iter()
            .map(|clause| CompClause {
                target: self.deep_copy(clause.target),
                iter: self.deep_copy(clause.iter),
                ifs: self.copy_expr_list(clause.ifs),
            })
            .collect();
        self.push_clauses(&copied)
    }

    /// Span-insensitive structural comparison of two subtrees.
    ///
    /// Two trees are structurally equal when their kinds agree at every
    /// position and all literal-valued fields (operators, constants,
    /// attribute and parameter names) are equal by value.
    pub fn structural_eq(&self, a: ExprId, b: ExprId) -> bool {
        match (self.kind(a), self.kind(b)) {
            (ExprKind::Int(x), ExprKind::Int(y)) => x == y,
            (ExprKind::Float(x), ExprKind::Float(y)) => x == y,
            (ExprKind::Str(x), ExprKind::Str(y)) => x == y,
            (ExprKind::Bool(x), ExprKind::Bool(y)) => x == y,
            (ExprKind::NoneLit, ExprKind::NoneLit) => true,
            (ExprKind::Ident(x), ExprKind::Ident(y)) => x == y,
            (
                ExprKind::Attribute { value: v1, attr: a1 },
                ExprKind::Attribute { value: v2, attr: a2 },
            ) => a1 == a2 && self.structural_eq(v1, v2),
            (
                ExprKind::Subscript { value: v1, index: i1 },
                ExprKind::Subscript { value: v2, index: i2 },
            ) => self.structural_eq(v1, v2) && self.structural_eq(i1, i2),
            (ExprKind::Call { func: f1, args: r1 }, ExprKind::Call { func: f2, args: r2 }) => {
                self.structural_eq(f1, f2) && self.eq_expr_lists(r1, r2)
            }
            (
                ExprKind::Binary {
                    op: o1,
                    left: l1,
                    right: r1,
                },
                ExprKind::Binary {
                    op: o2,
                    left: l2,
                    right: r2,
                },
            ) => o1 == o2 && self.structural_eq(l1, l2) && self.structural_eq(r1, r2),
            (
                ExprKind::Unary { op: o1, operand: e1 },
                ExprKind::Unary { op: o2, operand: e2 },
            ) => o1 == o2 && self.structural_eq(e1, e2),
            (
                ExprKind::Lambda { params: p1, body: b1 },
                ExprKind::Lambda { params: p2, body: b2 },
            ) => self.get_names(p1) == self.get_names(p2) && self.structural_eq(b1, b2),
            (ExprKind::Tuple(r1), ExprKind::Tuple(r2))
            | (ExprKind::List(r1), ExprKind::List(r2)) => self.eq_expr_lists(r1, r2),
            (
                ExprKind::ListComp { elt: e1, clauses: c1 },
                ExprKind::ListComp { elt: e2, clauses: c2 },
            )
            | (
                ExprKind::Generator { elt: e1, clauses: c1 },
                ExprKind::Generator { elt: e2, clauses: c2 },
            ) => self.structural_eq(e1, e2) && self.eq_clauses(c1, c2),
            _ => false,
        }
    }

    /// Elementwise structural comparison of two expression lists.
    pub fn eq_expr_lists(&self, a: ExprRange, b: ExprRange) -> bool {
        if a.len() != b.len() {
            return false;
        }
        // Ranges index disjoint or identical storage; compare by element.
        (0..a.len()).all(|i| {
            let x = self.expr_lists[a.start as usize + i];
            let y = self.expr_lists[b.start as usize + i];
            self.structural_eq(x, y)
        })
    }

    fn eq_clauses(&self, a: ClauseRange, b: ClauseRange) -> bool {
        if a.len() != b.len() {
            return false;
        }
        (0..a.len()).all(|i| {
            let x = self.clauses[a.start as usize + i];
            let y = self.clauses[b.start as usize + i];
            self.structural_eq(x.target, y.target)
                && self.structural_eq(x.iter, y.iter)
                && self.eq_expr_lists(x.ifs, y.ifs)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, UnaryOp};
    use pretty_assertions::assert_eq;

    fn int(arena: &mut ExprArena, value: i64) -> ExprId {
        arena.alloc_expr(Expr::new(ExprKind::Int(value), Span::DUMMY))
    }

    #[test]
    fn alloc_and_get_round_trip() {
        let mut arena = ExprArena::new();
        let id = arena.alloc_expr(Expr::new(ExprKind::Int(7), Span::new(0, 1)));
        assert_eq!(arena.kind(id), ExprKind::Int(7));
        assert_eq!(arena.span(id), Span::new(0, 1));
        assert_eq!(arena.expr_count(), 1);
    }

    #[test]
    fn expr_list_round_trip() {
        let mut arena = ExprArena::new();
        let a = int(&mut arena, 1);
        let b = int(&mut arena, 2);
        let range = arena.push_expr_list(&[a, b]);
        assert_eq!(arena.get_expr_list(range), &[a, b]);
        assert_eq!(arena.push_expr_list(&[]), ExprRange::EMPTY);
    }

    #[test]
    fn structural_eq_ignores_spans() {
        let mut arena = ExprArena::new();
        let a = arena.alloc_expr(Expr::new(ExprKind::Int(3), Span::new(0, 1)));
        let b = arena.alloc_expr(Expr::new(ExprKind::Int(3), Span::new(10, 11)));
        let c = int(&mut arena, 4);
        assert!(arena.structural_eq(a, b));
        assert!(!arena.structural_eq(a, c));
    }

    #[test]
    fn structural_eq_compares_nested_trees() {
        let mut arena = ExprArena::new();
        let l1 = int(&mut arena, 1);
        let r1 = int(&mut arena, 2);
        let sum1 = arena.alloc_expr(Expr::new(
            ExprKind::Binary {
                op: BinaryOp::Add,
                left: l1,
                right: r1,
            },
            Span::DUMMY,
        ));
        let l2 = int(&mut arena, 1);
        let r2 = int(&mut arena, 2);
        let sum2 = arena.alloc_expr(Expr::new(
            ExprKind::Binary {
                op: BinaryOp::Add,
                left: l2,
                right: r2,
            },
            Span::DUMMY,
        ));
        let diff = arena.alloc_expr(Expr::new(
            ExprKind::Binary {
                op: BinaryOp::Sub,
                left: l2,
                right: r2,
            },
            Span::DUMMY,
        ));
        assert!(arena.structural_eq(sum1, sum2));
        assert!(!arena.structural_eq(sum1, diff));
    }

    #[test]
    fn deep_copy_shares_no_nodes() {
        let mut arena = ExprArena::new();
        let operand = int(&mut arena, 5);
        let original = arena.alloc_expr(Expr::new(
            ExprKind::Unary {
                op: UnaryOp::Neg,
                operand,
            },
            Span::DUMMY,
        ));

        let copy = arena.deep_copy(original);
        assert_ne!(copy, original);
        assert!(arena.structural_eq(copy, original));

        // Mutating the copy's child leaves the original untouched.
        let copied_operand = match arena.kind(copy) {
            ExprKind::Unary { operand, .. } => operand,
            other => panic!("expected Unary, got {other:?}"),
        };
        arena.set_kind(copied_operand, ExprKind::Int(99));
        assert_eq!(arena.kind(operand), ExprKind::Int(5));
        assert!(!arena.structural_eq(copy, original));
    }

    #[test]
    fn deep_copy_copies_lists_and_clauses() {
        let mut arena = ExprArena::new();
        let target = arena.alloc_expr(Expr::new(ExprKind::Ident(Name::from_raw(1)), Span::DUMMY));
        let iter = arena.alloc_expr(Expr::new(ExprKind::Ident(Name::from_raw(2)), Span::DUMMY));
        let pred = arena.alloc_expr(Expr::new(ExprKind::Bool(true), Span::DUMMY));
        let ifs = arena.push_expr_list(&[pred]);
        let clauses = arena.push_clauses(&[CompClause { target, iter, ifs }]);
        let elt = arena.deep_copy(target);
        let comp = arena.alloc_expr(Expr::new(ExprKind::ListComp { elt, clauses }, Span::DUMMY));

        let copy = arena.deep_copy(comp);
        assert!(arena.structural_eq(copy, comp));
        let copied_clauses = match arena.kind(copy) {
            ExprKind::ListComp { clauses, .. } => clauses,
            other => panic!("expected ListComp, got {other:?}"),
        };
        assert_ne!(copied_clauses, clauses);
        assert_ne!(arena.get_clauses(copied_clauses)[0].target, target);
    }
}
