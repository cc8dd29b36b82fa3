//! Structural tree matcher.
//!
//! Compares a candidate subtree against a [`Pattern`], producing a
//! [`BindingMap`] of placeholder captures on success. Matching is purely
//! syntactic: variant kinds must agree, literal-valued fields (operators,
//! constants, attribute names) must be equal by value, and placeholders
//! capture whatever subtree they face. Matching never mutates either tree.

use rustc_hash::FxHashMap;

use vela_ir::{ExprArena, ExprId, ExprKind, ExprRange};

use crate::pattern::{Constraint, Pattern, PlaceholderId};

/// A subtree (or element sequence) captured by a placeholder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Captured {
    /// A single expression subtree.
    Node(ExprId),
    /// An element sequence bound by a sequence capture.
    Seq(Vec<ExprId>),
}

/// Placeholder captures of one successful match.
///
/// Holds a binding for every placeholder id in the pattern; an id occurring
/// at several pattern positions maps to one entry whose occurrences were all
/// structurally equal.
pub type BindingMap = FxHashMap<PlaceholderId, Captured>;

/// Structural pattern matcher over arena subtrees.
pub struct Matcher<'a> {
    arena: &'a ExprArena,
}

impl<'a> Matcher<'a> {
    /// Create a matcher over an arena.
    pub fn new(arena: &'a ExprArena) -> Self {
        Matcher { arena }
    }

    /// Attempt to match `pattern` against the subtree rooted at `candidate`.
    ///
    /// Returns the capture map on success, `None` on structural mismatch.
    /// A mismatch is the normal outcome for most (pattern, node) pairs, not
    /// an error.
    pub fn try_match(&self, pattern: &Pattern, candidate: ExprId) -> Option<BindingMap> {
        let mut bindings = BindingMap::default();
        if self.match_expr(pattern, candidate, &mut bindings) {
            Some(bindings)
        } else {
            None
        }
    }

    fn match_expr(&self, pattern: &Pattern, id: ExprId, bindings: &mut BindingMap) -> bool {
        match pattern {
            Pattern::Capture(pid, constraint) => {
                self.satisfies(*constraint, id) && self.bind(*pid, Captured::Node(id), bindings)
            }
            // Sequence captures are only meaningful inside an element list;
            // in a single-expression position the pattern cannot match.
            Pattern::CaptureSeq(_) => false,
            Pattern::Int(expected) => {
                matches!(self.arena.kind(id), ExprKind::Int(value) if value == *expected)
            }
            Pattern::Float(expected) => {
                matches!(self.arena.kind(id), ExprKind::Float(bits) if bits == expected.to_bits())
            }
            Pattern::Ident(expected) => {
                matches!(self.arena.kind(id), ExprKind::Ident(name) if name == *expected)
            }
            Pattern::Attribute { value, attr } => match self.arena.kind(id) {
                ExprKind::Attribute {
                    value: candidate_value,
                    attr: candidate_attr,
                } => candidate_attr == *attr && self.match_expr(value, candidate_value, bindings),
                _ => false,
            },
            Pattern::Call { func, args } => match self.arena.kind(id) {
                ExprKind::Call {
                    func: candidate_func,
                    args: candidate_args,
                } => {
                    self.match_expr(func, candidate_func, bindings)
                        && self.match_elements(args, candidate_args, bindings)
                }
                _ => false,
            },
            Pattern::Binary { op, left, right } => match self.arena.kind(id) {
                ExprKind::Binary {
                    op: candidate_op,
                    left: candidate_left,
                    right: candidate_right,
                } => {
                    candidate_op == *op
                        && self.match_expr(left, candidate_left, bindings)
                        && self.match_expr(right, candidate_right, bindings)
                }
                _ => false,
            },
            Pattern::List(elements) => match self.arena.kind(id) {
                ExprKind::List(candidate_elements) => {
                    self.match_elements(elements, candidate_elements, bindings)
                }
                _ => false,
            },
        }
    }

    fn match_elements(
        &self,
        patterns: &[Pattern],
        range: ExprRange,
        bindings: &mut BindingMap,
    ) -> bool {
        // A sole sequence capture binds the entire element list.
        if let [Pattern::CaptureSeq(pid)] = patterns {
            let elements = self.arena.get_expr_list(range).to_vec();
            return self.bind(*pid, Captured::Seq(elements), bindings);
        }
        let ids = self.arena.get_expr_list(range);
        patterns.len() == ids.len()
            && patterns
                .iter()
                .zip(ids)
                .all(|(pattern, &id)| self.match_expr(pattern, id, bindings))
    }

    /// Record a capture, or check it against an earlier capture of the same
    /// id. Re-captures must be structurally equal or the match fails.
    fn bind(&self, pid: PlaceholderId, capture: Captured, bindings: &mut BindingMap) -> bool {
        match bindings.get(&pid) {
            Some(existing) => self.captures_eq(existing, &capture),
            None => {
                bindings.insert(pid, capture);
                true
            }
        }
    }

    fn captures_eq(&self, a: &Captured, b: &Captured) -> bool {
        match (a, b) {
            (Captured::Node(x), Captured::Node(y)) => self.arena.structural_eq(*x, *y),
            (Captured::Seq(xs), Captured::Seq(ys)) => {
                xs.len() == ys.len()
                    && xs
                        .iter()
                        .zip(ys)
                        .all(|(&x, &y)| self.arena.structural_eq(x, y))
            }
            _ => false,
        }
    }

    fn satisfies(&self, constraint: Constraint, id: ExprId) -> bool {
        match constraint {
            Constraint::Any => true,
            Constraint::StrLit => matches!(self.arena.kind(id), ExprKind::Str(_)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Ctx;
    use vela_ir::BinaryOp;

    #[test]
    fn literal_fields_must_agree() {
        let mut ctx = Ctx::new();
        let x = ctx.ident("x");
        let two = ctx.int(2);
        let pow = ctx.binary(BinaryOp::Pow, x, two);

        let pattern = Pattern::binary(BinaryOp::Pow, Pattern::capture(0), Pattern::Int(2));
        let matcher = Matcher::new(&ctx.arena);
        let bindings = match matcher.try_match(&pattern, pow) {
            Some(bindings) => bindings,
            None => panic!("expected match"),
        };
        assert_eq!(bindings.get(&PlaceholderId::new(0)), Some(&Captured::Node(x)));

        // Wrong constant: no match.
        let three = ctx.int(3);
        let pow3 = ctx.binary(BinaryOp::Pow, x, three);
        assert!(Matcher::new(&ctx.arena).try_match(&pattern, pow3).is_none());
    }

    #[test]
    fn repeated_placeholder_requires_identical_subtrees() {
        let mut ctx = Ctx::new();
        let pattern = Pattern::binary(BinaryOp::Mul, Pattern::capture(0), Pattern::capture(0));

        // x * x: both occurrences structurally equal, binds once.
        let x1 = ctx.ident("x");
        let x2 = ctx.ident("x");
        let same = ctx.binary(BinaryOp::Mul, x1, x2);
        let bindings = match Matcher::new(&ctx.arena).try_match(&pattern, same) {
            Some(bindings) => bindings,
            None => panic!("expected match"),
        };
        assert_eq!(bindings.len(), 1);

        // x * y: structurally different, whole match fails.
        let x3 = ctx.ident("x");
        let y = ctx.ident("y");
        let different = ctx.binary(BinaryOp::Mul, x3, y);
        assert!(Matcher::new(&ctx.arena)
            .try_match(&pattern, different)
            .is_none());
    }

    #[test]
    fn repeated_placeholder_accepts_equal_composite_subtrees() {
        let mut ctx = Ctx::new();
        let pattern = Pattern::binary(BinaryOp::Mul, Pattern::capture(0), Pattern::capture(0));

        // f(a) * f(a): equal by structure, not by node identity.
        let a1 = ctx.ident("a");
        let call1 = ctx.call("f", &[a1]);
        let a2 = ctx.ident("a");
        let call2 = ctx.call("f", &[a2]);
        let product = ctx.binary(BinaryOp::Mul, call1, call2);
        assert!(Matcher::new(&ctx.arena).try_match(&pattern, product).is_some());
    }

    #[test]
    fn constraint_restricts_capture() {
        let mut ctx = Ctx::new();
        let pattern = Pattern::capture_str(0);

        let lit = ctx.str_lit("sep");
        assert!(Matcher::new(&ctx.arena).try_match(&pattern, lit).is_some());

        let not_a_string = ctx.int(1);
        assert!(Matcher::new(&ctx.arena)
            .try_match(&pattern, not_a_string)
            .is_none());
    }

    #[test]
    fn sequence_capture_binds_whole_element_list() {
        let mut ctx = Ctx::new();
        let a = ctx.ident("a");
        let b = ctx.ident("b");
        let list = ctx.list(&[a, b]);
        let call = ctx.call("tuple", &[list]);

        let tuple = ctx.name("tuple");
        let pattern = Pattern::call(
            Pattern::Ident(tuple),
            vec![Pattern::List(vec![Pattern::seq(0)])],
        );
        let bindings = match Matcher::new(&ctx.arena).try_match(&pattern, call) {
            Some(bindings) => bindings,
            None => panic!("expected match"),
        };
        assert_eq!(
            bindings.get(&PlaceholderId::new(0)),
            Some(&Captured::Seq(vec![a, b]))
        );
    }

    #[test]
    fn arity_mismatch_fails() {
        let mut ctx = Ctx::new();
        let a = ctx.ident("a");
        let b = ctx.ident("b");
        let call = ctx.call("f", &[a, b]);

        let f = ctx.name("f");
        let pattern = Pattern::call(Pattern::Ident(f), vec![Pattern::capture(0)]);
        assert!(Matcher::new(&ctx.arena).try_match(&pattern, call).is_none());
    }

    #[test]
    fn matching_does_not_mutate_the_tree() {
        let mut ctx = Ctx::new();
        let x = ctx.ident("x");
        let two = ctx.int(2);
        let pow = ctx.binary(BinaryOp::Pow, x, two);
        let before = ctx.arena.expr_count();

        let pattern = Pattern::binary(BinaryOp::Pow, Pattern::capture(0), Pattern::Int(2));
        let _ = Matcher::new(&ctx.arena).try_match(&pattern, pow);
        assert_eq!(ctx.arena.expr_count(), before);
    }
}
