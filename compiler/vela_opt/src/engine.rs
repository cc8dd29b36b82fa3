//! Idiom rewrite engine.
//!
//! Drives the catalog over a unit in a single pre-order traversal. At each
//! node the rules are tried in catalog order; a hit replaces the node and
//! the remaining rules are tried against the replacement, so one visit can
//! chain rewrites that feed later rules. A rewrite that only becomes
//! applicable after a *descendant* changes is not caught in the same
//! traversal — the ancestor was already visited — which is why the external
//! driver re-runs the pass until it reports no change.

use vela_ir::{ExprArena, ExprId, Unit};

use crate::error::PassError;
use crate::hoist::{self, Hoist};
use crate::instantiate::instantiate;
use crate::matcher::Matcher;
use crate::rules::Catalog;
use crate::traverse::{self, Rewriter};

/// The idiom-rewriting pass.
///
/// Holds only configuration; all traversal state lives in a per-`apply`
/// run, so nothing leaks between invocations.
pub struct IdiomRewrite<'a> {
    catalog: &'a Catalog,
}

impl<'a> IdiomRewrite<'a> {
    /// Create the pass over a catalog.
    pub fn new(catalog: &'a Catalog) -> Self {
        IdiomRewrite { catalog }
    }

    /// Run one traversal over the unit.
    ///
    /// Returns whether any rule fired. Hoisted imports are prepended once,
    /// after the traversal, deduplicated by module identity.
    pub fn apply(&self, unit: &mut Unit, arena: &mut ExprArena) -> Result<bool, PassError> {
        let mut run = Run {
            catalog: self.catalog,
            changed: false,
            hoists: Vec::new(),
        };
        traverse::rewrite_unit(&mut run, arena, unit)?;
        hoist::prepend_hoists(unit, &run.hoists);
        Ok(run.changed)
    }
}

/// Accumulated effects of one traversal.
struct Run<'a> {
    catalog: &'a Catalog,
    changed: bool,
    hoists: Vec<Hoist>,
}

impl Rewriter for Run<'_> {
    fn rewrite_expr(&mut self, arena: &mut ExprArena, id: ExprId) -> Result<ExprId, PassError> {
        let mut current = id;
        for rule in self.catalog.rules() {
            let bindings = match Matcher::new(arena).try_match(rule.pattern(), current) {
                Some(bindings) => bindings,
                None => continue,
            };
            let span = arena.span(current);
            current = instantiate(arena, rule.template(), &bindings, span, rule.name())?;
            self.hoists.extend_from_slice(rule.hoists());
            self.changed = true;
            tracing::debug!(rule = rule.name(), "idiom rewritten");
        }
        traverse::rewrite_children(self, arena, current)?;
        Ok(current)
    }
}
