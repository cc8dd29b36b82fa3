//! Template instantiation.
//!
//! Rebuilds a fresh subtree from a [`Template`] plus the captures of a
//! successful match. Every spliced capture is deep-copied: the matched
//! original is about to be abandoned, and a replacement that aliased it
//! would let a later rewrite of one tree corrupt the other.

use vela_ir::{Expr, ExprArena, ExprId, ExprKind, Span};

use crate::error::PassError;
use crate::matcher::{BindingMap, Captured};
use crate::pattern::Template;

/// Build a replacement subtree from `template` and `bindings`.
///
/// New nodes carry `span` (the span of the node being replaced) so
/// diagnostics keep pointing at the original source site; spliced subtrees
/// keep their own spans.
///
/// Fails with [`PassError::UnboundPlaceholder`] if the template references
/// an id absent from `bindings` — a malformed rule, surfaced at catalog
/// construction and self-test time, never expected against well-formed
/// input.
pub fn instantiate(
    arena: &mut ExprArena,
    template: &Template,
    bindings: &BindingMap,
    span: Span,
    rule: &'static str,
) -> Result<ExprId, PassError> {
    let kind = match template {
        Template::Splice(pid) => {
            return match bindings.get(pid) {
                Some(Captured::Node(id)) => Ok(arena.deep_copy(*id)),
                Some(Captured::Seq(_)) => Err(PassError::MisplacedSequence {
                    rule,
                    placeholder: *pid,
                }),
                None => Err(PassError::UnboundPlaceholder {
                    rule,
                    placeholder: *pid,
                }),
            };
        }
        Template::Int(value) => ExprKind::Int(*value),
        Template::Ident(name) => ExprKind::Ident(*name),
        Template::Attribute { value, attr } => ExprKind::Attribute {
            value: instantiate(arena, value, bindings, span, rule)?,
            attr: *attr,
        },
        Template::Call { func, args } => {
            let func = instantiate(arena, func, bindings, span, rule)?;
            let ids = instantiate_elements(arena, args, bindings, span, rule)?;
            ExprKind::Call {
                func,
                args: arena.push_expr_list(&ids),
            }
        }
        Template::Binary { op, left, right } => ExprKind::Binary {
            op: *op,
            left: instantiate(arena, left, bindings, span, rule)?,
            right: instantiate(arena, right, bindings, span, rule)?,
        },
        Template::Tuple(elements) => {
            let ids = instantiate_elements(arena, elements, bindings, span, rule)?;
            ExprKind::Tuple(arena.push_expr_list(&ids))
        }
    };
    Ok(arena.alloc_expr(Expr::new(kind, span)))
}

/// Instantiate an element list, expanding sequence captures in place.
fn instantiate_elements(
    arena: &mut ExprArena,
    templates: &[Template],
    bindings: &BindingMap,
    span: Span,
    rule: &'static str,
) -> Result<Vec<ExprId>, PassError> {
    let mut ids = Vec::with_capacity(templates.len());
    for template in templates {
        if let Template::Splice(pid) = template {
            if let Some(Captured::Seq(elements)) = bindings.get(pid) {
                let elements = elements.clone();
                for element in elements {
                    ids.push(arena.deep_copy(element));
                }
                continue;
            }
        }
        ids.push(instantiate(arena, template, bindings, span, rule)?);
    }
    Ok(ids)
}
