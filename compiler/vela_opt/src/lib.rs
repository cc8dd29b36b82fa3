//! Idiom optimization pass for the Vela compiler.
//!
//! Rewrites a unit's syntax tree in place, replacing recognizably costly
//! idioms with cheaper primitive calls and lowering comprehensions into
//! explicit filter/map/product combinator pipelines.
//!
//! # Pipeline Position
//!
//! ```text
//! Source → Parse → Analyze → **Optimize** → Codegen
//! ```
//!
//! # What Happens During Optimization
//!
//! 1. **Idiom rewriting** ([`IdiomRewrite`]): a fixed ordered catalog of
//!    (pattern, substitution) rules is applied in one pre-order traversal.
//!    Patterns match structurally with placeholder capture; substitutions
//!    are instantiated with deep copies of the captures.
//!
//! 2. **Comprehension lowering** ([`ComprehensionLowering`]): comprehensions
//!    flagged optimizable by the upstream purity analysis become combinator
//!    pipelines, with N nested generators collapsing into a single `product`
//!    and tuple-projected variable references.
//!
//! 3. **Import hoisting**: namespace imports the rewrites require are
//!    prepended to the unit exactly once, after traversal.
//!
//! Each traversal is a pure function from one tree to another plus a
//! `changed` flag; the driver re-runs the pass until nothing changes. A
//! rewrite exposed only by a descendant's rewrite is deliberately left for
//! the next traversal.

mod config;
mod engine;
mod error;
mod hoist;
mod instantiate;
mod lower;
mod matcher;
mod pattern;
mod rules;
#[cfg(test)]
pub(crate) mod test_support;
mod traverse;

pub use config::{mangle, CombinatorNamespace};
pub use engine::IdiomRewrite;
pub use error::{PassError, PassResult};
pub use hoist::Hoist;
pub use instantiate::instantiate;
pub use lower::ComprehensionLowering;
pub use matcher::{BindingMap, Captured, Matcher};
pub use pattern::{Constraint, Pattern, PlaceholderId, Template};
pub use rules::{Catalog, Rule};

use rustc_hash::FxHashSet;
use vela_ir::{ExprArena, ExprId, StringInterner, Unit};

/// Run both transforms once over a unit.
///
/// Convenience for drivers: applies the idiom catalog, then comprehension
/// lowering, and reports whether either changed anything. Reaching a global
/// fixpoint may take several calls; the driver owns that loop and its
/// iteration bound.
pub fn optimize(
    unit: &mut Unit,
    arena: &mut ExprArena,
    catalog: &Catalog,
    optimizable: &FxHashSet<ExprId>,
    namespace: CombinatorNamespace,
    interner: &StringInterner,
) -> PassResult<bool> {
    let idioms_changed = IdiomRewrite::new(catalog).apply(unit, arena)?;
    let lowering = ComprehensionLowering::new(interner, optimizable, namespace);
    let comps_changed = lowering.apply(unit, arena)?;
    Ok(idioms_changed || comps_changed)
}
