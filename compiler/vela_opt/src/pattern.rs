//! Pattern and substitution template trees.
//!
//! Both types mirror the expression shapes the catalog needs, plus
//! placeholders. They are deliberately distinct from [`vela_ir::ExprKind`]:
//! a placeholder is a match-time metavariable and must never appear in a
//! finished program tree, so the type system keeps it out of one.
//!
//! Patterns are tiny and constructed once at catalog build time, so they use
//! plain boxed children rather than arena indices.

use std::fmt;

use vela_ir::{BinaryOp, Name};

/// Identifier of a placeholder within one rule.
///
/// Scoped to a single rule: the same id in a rule's pattern and template
/// refers to the same capture.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct PlaceholderId(u32);

impl PlaceholderId {
    /// Create a new placeholder id.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        PlaceholderId(raw)
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PlaceholderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// Extra requirement a placeholder imposes on the subtree it captures.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Constraint {
    /// Any expression.
    Any,
    /// A string literal.
    StrLit,
}

/// A shape to search for: an expression tree that may contain placeholders.
#[derive(Clone, Debug)]
pub enum Pattern {
    /// Capture the candidate subtree under the given placeholder id.
    Capture(PlaceholderId, Constraint),
    /// Capture an entire element sequence. Valid only as the sole entry of
    /// a `Call` argument list or `List` element list.
    CaptureSeq(PlaceholderId),
    /// Integer literal equal by value.
    Int(i64),
    /// Float literal equal by bit pattern.
    Float(f64),
    /// Exact identifier.
    Ident(Name),
    /// Attribute access with an exact attribute name.
    Attribute { value: Box<Pattern>, attr: Name },
    /// Call with positionally matched arguments.
    Call { func: Box<Pattern>, args: Vec<Pattern> },
    /// Binary operation with an exact operator.
    Binary {
        op: BinaryOp,
        left: Box<Pattern>,
        right: Box<Pattern>,
    },
    /// List display with positionally matched elements.
    List(Vec<Pattern>),
}

impl Pattern {
    /// Unconstrained capture.
    pub fn capture(id: u32) -> Pattern {
        Pattern::Capture(PlaceholderId::new(id), Constraint::Any)
    }

    /// Capture constrained to a string literal.
    pub fn capture_str(id: u32) -> Pattern {
        Pattern::Capture(PlaceholderId::new(id), Constraint::StrLit)
    }

    /// Sequence capture.
    pub fn seq(id: u32) -> Pattern {
        Pattern::CaptureSeq(PlaceholderId::new(id))
    }

    /// Call pattern.
    pub fn call(func: Pattern, args: Vec<Pattern>) -> Pattern {
        Pattern::Call {
            func: Box::new(func),
            args,
        }
    }

    /// Attribute pattern.
    pub fn attr(value: Pattern, attr: Name) -> Pattern {
        Pattern::Attribute {
            value: Box::new(value),
            attr,
        }
    }

    /// Binary pattern.
    pub fn binary(op: BinaryOp, left: Pattern, right: Pattern) -> Pattern {
        Pattern::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Collect every placeholder id captured by this pattern.
    pub fn placeholder_ids(&self, out: &mut Vec<PlaceholderId>) {
        match self {
            Pattern::Capture(id, _) | Pattern::CaptureSeq(id) => out.push(*id),
            Pattern::Int(_) | Pattern::Float(_) | Pattern::Ident(_) => {}
            Pattern::Attribute { value, .. } => value.placeholder_ids(out),
            Pattern::Call { func, args } => {
                func.placeholder_ids(out);
                for arg in args {
                    arg.placeholder_ids(out);
                }
            }
            Pattern::Binary { left, right, .. } => {
                left.placeholder_ids(out);
                right.placeholder_ids(out);
            }
            Pattern::List(elements) => {
                for element in elements {
                    element.placeholder_ids(out);
                }
            }
        }
    }
}

/// A replacement to build: an expression tree whose placeholders splice in
/// subtrees captured by the same rule's pattern.
#[derive(Clone, Debug)]
pub enum Template {
    /// Splice a deep copy of the captured subtree (or element sequence,
    /// when this entry sits in an element list).
    Splice(PlaceholderId),
    /// Integer literal.
    Int(i64),
    /// Identifier.
    Ident(Name),
    /// Attribute access.
    Attribute { value: Box<Template>, attr: Name },
    /// Call.
    Call {
        func: Box<Template>,
        args: Vec<Template>,
    },
    /// Binary operation.
    Binary {
        op: BinaryOp,
        left: Box<Template>,
        right: Box<Template>,
    },
    /// Tuple display.
    Tuple(Vec<Template>),
}

impl Template {
    /// Splice of a captured subtree.
    pub fn splice(id: u32) -> Template {
        Template::Splice(PlaceholderId::new(id))
    }

    /// Call template.
    pub fn call(func: Template, args: Vec<Template>) -> Template {
        Template::Call {
            func: Box::new(func),
            args,
        }
    }

    /// Attribute template.
    pub fn attr(value: Template, attr: Name) -> Template {
        Template::Attribute {
            value: Box::new(value),
            attr,
        }
    }

    /// Binary template.
    pub fn binary(op: BinaryOp, left: Template, right: Template) -> Template {
        Template::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Collect every placeholder id referenced by this template.
    pub fn placeholder_ids(&self, out: &mut Vec<PlaceholderId>) {
        match self {
            Template::Splice(id) => out.push(*id),
            Template::Int(_) | Template::Ident(_) => {}
            Template::Attribute { value, .. } => value.placeholder_ids(out),
            Template::Call { func, args } => {
                func.placeholder_ids(out);
                for arg in args {
                    arg.placeholder_ids(out);
                }
            }
            Template::Binary { left, right, .. } => {
                left.placeholder_ids(out);
                right.placeholder_ids(out);
            }
            Template::Tuple(elements) => {
                for element in elements {
                    element.placeholder_ids(out);
                }
            }
        }
    }
}
