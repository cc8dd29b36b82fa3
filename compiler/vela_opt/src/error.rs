//! Error types for the optimization pass.
//!
//! A pattern that fails to match is not an error; the matcher returns
//! `None` and the node is left alone. The variants here are defects: a
//! malformed catalog rule, or a construct the lowering was asked to handle
//! that its pre-filter should have excluded. Both abort the pass with a
//! diagnostic naming the offender instead of producing a corrupted tree.

use std::fmt;

use vela_ir::Span;

use crate::pattern::PlaceholderId;

/// Result of running a pass over a unit.
pub type PassResult<T> = Result<T, PassError>;

/// Fatal conditions surfaced while rewriting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PassError {
    /// A substitution template references a placeholder its rule's pattern
    /// never captures.
    UnboundPlaceholder {
        rule: &'static str,
        placeholder: PlaceholderId,
    },
    /// A sequence capture was spliced into a single-expression position.
    MisplacedSequence {
        rule: &'static str,
        placeholder: PlaceholderId,
    },
    /// Comprehension lowering reached a clause whose loop target is not a
    /// simple name.
    UnsupportedTarget { span: Span },
}

impl fmt::Display for PassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassError::UnboundPlaceholder { rule, placeholder } => write!(
                f,
                "rule `{rule}`: substitution references placeholder {placeholder} \
                 that the pattern never captures"
            ),
            PassError::MisplacedSequence { rule, placeholder } => write!(
                f,
                "rule `{rule}`: sequence capture {placeholder} spliced into a \
                 single-expression position"
            ),
            PassError::UnsupportedTarget { span } => write!(
                f,
                "comprehension loop target at {span:?} is not a simple name"
            ),
        }
    }
}

impl std::error::Error for PassError {}
