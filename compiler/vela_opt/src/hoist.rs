//! Import hoisting.
//!
//! Rewrites may require a namespace import (the numeric module for `sqrt`,
//! the iterator module for `product`). Requests accumulate during a
//! traversal and are prepended to the unit once, after the whole unit has
//! been processed.

use rustc_hash::FxHashSet;

use vela_ir::{Span, Stmt, StmtKind, Unit};

/// A namespace import to hoist to the top of the unit.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Hoist {
    pub module: vela_ir::Name,
    pub alias: vela_ir::Name,
}

/// Prepend hoisted imports to the unit.
///
/// Deduplicated by (module, alias) identity, both among the requests and
/// against imports already present at the top level of the unit, so a rule
/// firing at many sites adds its import exactly once.
pub(crate) fn prepend_hoists(unit: &mut Unit, hoists: &[Hoist]) {
    if hoists.is_empty() {
        return;
    }
    let mut seen: FxHashSet<Hoist> = unit
        .body
        .iter()
        .filter_map(|stmt| match stmt.kind {
            StmtKind::Import { module, alias } => Some(Hoist { module, alias }),
            _ => None,
        })
        .collect();
    let mut fresh: Vec<Stmt> = Vec::new();
    for &hoist in hoists {
        if seen.insert(hoist) {
            fresh.push(Stmt::new(
                StmtKind::Import {
                    module: hoist.module,
                    alias: hoist.alias,
                },
                Span::DUMMY,
            ));
        }
    }
    unit.body.splice(0..0, fresh);
}
