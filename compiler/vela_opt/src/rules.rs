//! The idiom rewrite catalog.
//!
//! A fixed, ordered list of rules, each replacing a recognizably costly
//! source idiom with a cheaper primitive call. The catalog is built once at
//! startup and never mutated; extending it means adding a rule constructor
//! here.
//!
//! Rule order matters: after a rule fires, the engine keeps trying the
//! *following* rules against the replaced node, so a rewrite can feed a rule
//! that appears later in the list within the same visit.

use vela_ir::{BinaryOp, Name, StringInterner};

use crate::config::mangle;
use crate::hoist::Hoist;
use crate::pattern::{Pattern, PlaceholderId, Template};

/// One rewrite: a shape to find, a replacement to build, and the imports
/// the replacement needs hoisted.
pub struct Rule {
    name: &'static str,
    pattern: Pattern,
    template: Template,
    hoists: Vec<Hoist>,
}

impl Rule {
    /// Short diagnostic name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The shape this rule searches for.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// The replacement this rule builds.
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Imports the replacement requires at the top of the unit.
    pub fn hoists(&self) -> &[Hoist] {
        &self.hoists
    }
}

/// Interned names the catalog's patterns and templates refer to.
struct CatalogNames {
    len: Name,
    set: Name,
    tuple: Name,
    list: Name,
    abs: Name,
    reversed: Name,
    range: Name,
    join: Name,
    count_distinct: Name,
    abs_square: Name,
    sqrt: Name,
    cbrt: Name,
    num: Name,
    num_alias: Name,
}

impl CatalogNames {
    fn new(interner: &StringInterner) -> Self {
        CatalogNames {
            len: interner.intern("len"),
            set: interner.intern("set"),
            tuple: interner.intern("tuple"),
            list: interner.intern("list"),
            abs: interner.intern("abs"),
            reversed: interner.intern("reversed"),
            range: interner.intern("range"),
            join: interner.intern("join"),
            count_distinct: interner.intern("count_distinct"),
            abs_square: interner.intern("abs_square"),
            sqrt: interner.intern("sqrt"),
            cbrt: interner.intern("cbrt"),
            num: interner.intern("num"),
            num_alias: mangle(interner, "num"),
        }
    }
}

/// The fixed, ordered rewrite catalog.
pub struct Catalog {
    rules: Vec<Rule>,
}

impl Catalog {
    /// Build the catalog, interning the names its rules refer to.
    pub fn new(interner: &StringInterner) -> Self {
        let names = CatalogNames::new(interner);
        let catalog = Catalog {
            rules: vec![
                len_set(&names),
                tuple_list(&names),
                abs_square(&names),
                abs_square_num(&names),
                sqrt(&names),
                cbrt(&names),
                literal_tuple(&names),
                reversed_range(&names),
                square(&names),
                str_join(&names),
            ],
        };
        #[cfg(debug_assertions)]
        catalog.validate();
        catalog
    }

    /// The rules, in application order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Check that every rule's template references only placeholders its
    /// pattern captures.
    ///
    /// # Panics
    /// Panics naming the offending rule; a violation is a construction
    /// defect, not a runtime condition.
    pub fn validate(&self) {
        for rule in &self.rules {
            let mut captured: Vec<PlaceholderId> = Vec::new();
            rule.pattern.placeholder_ids(&mut captured);
            let mut referenced: Vec<PlaceholderId> = Vec::new();
            rule.template.placeholder_ids(&mut referenced);
            for id in referenced {
                assert!(
                    captured.contains(&id),
                    "rule `{}`: template references uncaptured placeholder {id}",
                    rule.name
                );
            }
        }
    }
}

// Rule constructors, one per idiom, in catalog order.

/// len(set(X)) => count_distinct(X)
fn len_set(names: &CatalogNames) -> Rule {
    Rule {
        name: "len-set",
        pattern: Pattern::call(
            Pattern::Ident(names.len),
            vec![Pattern::call(
                Pattern::Ident(names.set),
                vec![Pattern::capture(0)],
            )],
        ),
        template: Template::call(
            Template::Ident(names.count_distinct),
            vec![Template::splice(0)],
        ),
        hoists: Vec::new(),
    }
}

/// tuple(list(X)) => tuple(X)
fn tuple_list(names: &CatalogNames) -> Rule {
    Rule {
        name: "tuple-list",
        pattern: Pattern::call(
            Pattern::Ident(names.tuple),
            vec![Pattern::call(
                Pattern::Ident(names.list),
                vec![Pattern::capture(0)],
            )],
        ),
        template: Template::call(Template::Ident(names.tuple), vec![Template::splice(0)]),
        hoists: Vec::new(),
    }
}

/// abs(X) ** 2 => abs_square(X)
fn abs_square(names: &CatalogNames) -> Rule {
    Rule {
        name: "abs-square",
        pattern: Pattern::binary(
            BinaryOp::Pow,
            Pattern::call(Pattern::Ident(names.abs), vec![Pattern::capture(0)]),
            Pattern::Int(2),
        ),
        template: Template::call(
            Template::Ident(names.abs_square),
            vec![Template::splice(0)],
        ),
        hoists: Vec::new(),
    }
}

/// num.abs(X) ** 2 => abs_square(X)
fn abs_square_num(names: &CatalogNames) -> Rule {
    Rule {
        name: "abs-square-num",
        pattern: Pattern::binary(
            BinaryOp::Pow,
            Pattern::call(
                Pattern::attr(Pattern::Ident(names.num), names.abs),
                vec![Pattern::capture(0)],
            ),
            Pattern::Int(2),
        ),
        template: Template::call(
            Template::Ident(names.abs_square),
            vec![Template::splice(0)],
        ),
        hoists: Vec::new(),
    }
}

/// X ** 0.5 => num.sqrt(X), hoisting the numeric-module import
fn sqrt(names: &CatalogNames) -> Rule {
    Rule {
        name: "sqrt",
        pattern: Pattern::binary(BinaryOp::Pow, Pattern::capture(0), Pattern::Float(0.5)),
        template: Template::call(
            Template::attr(Template::Ident(names.num_alias), names.sqrt),
            vec![Template::splice(0)],
        ),
        hoists: vec![Hoist {
            module: names.num,
            alias: names.num_alias,
        }],
    }
}

/// X ** (1/3) => num.cbrt(X), hoisting the numeric-module import
fn cbrt(names: &CatalogNames) -> Rule {
    Rule {
        name: "cbrt",
        pattern: Pattern::binary(
            BinaryOp::Pow,
            Pattern::capture(0),
            Pattern::Float(1.0 / 3.0),
        ),
        template: Template::call(
            Template::attr(Template::Ident(names.num_alias), names.cbrt),
            vec![Template::splice(0)],
        ),
        hoists: vec![Hoist {
            module: names.num,
            alias: names.num_alias,
        }],
    }
}

/// tuple([X, ..., Z]) => (X, ..., Z)
fn literal_tuple(names: &CatalogNames) -> Rule {
    Rule {
        name: "literal-tuple",
        pattern: Pattern::call(
            Pattern::Ident(names.tuple),
            vec![Pattern::List(vec![Pattern::seq(0)])],
        ),
        template: Template::Tuple(vec![Template::splice(0)]),
        hoists: Vec::new(),
    }
}

/// reversed(range(X)) => range(X - 1, -1, -1)
fn reversed_range(names: &CatalogNames) -> Rule {
    Rule {
        name: "reversed-range",
        pattern: Pattern::call(
            Pattern::Ident(names.reversed),
            vec![Pattern::call(
                Pattern::Ident(names.range),
                vec![Pattern::capture(0)],
            )],
        ),
        template: Template::call(
            Template::Ident(names.range),
            vec![
                Template::binary(BinaryOp::Sub, Template::splice(0), Template::Int(1)),
                Template::Int(-1),
                Template::Int(-1),
            ],
        ),
        hoists: Vec::new(),
    }
}

/// X * X => X ** 2
fn square(_names: &CatalogNames) -> Rule {
    Rule {
        name: "square",
        pattern: Pattern::binary(BinaryOp::Mul, Pattern::capture(0), Pattern::capture(0)),
        template: Template::binary(BinaryOp::Pow, Template::splice(0), Template::Int(2)),
        hoists: Vec::new(),
    }
}

/// A + "lit" + B => "lit".join((A, B))
fn str_join(names: &CatalogNames) -> Rule {
    Rule {
        name: "str-join",
        pattern: Pattern::binary(
            BinaryOp::Add,
            Pattern::binary(BinaryOp::Add, Pattern::capture(0), Pattern::capture_str(1)),
            Pattern::capture(2),
        ),
        template: Template::call(
            Template::attr(Template::splice(1), names.join),
            vec![Template::Tuple(vec![
                Template::splice(0),
                Template::splice(2),
            ])],
        ),
        hoists: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instantiate::instantiate;
    use crate::matcher::Matcher;
    use crate::test_support::Ctx;
    use vela_ir::Span;

    #[test]
    fn catalog_is_well_formed() {
        let interner = StringInterner::new();
        Catalog::new(&interner).validate();
    }

    #[test]
    fn catalog_order_is_fixed() {
        let interner = StringInterner::new();
        let catalog = Catalog::new(&interner);
        let order: Vec<&str> = catalog.rules().iter().map(Rule::name).collect();
        assert_eq!(
            order,
            [
                "len-set",
                "tuple-list",
                "abs-square",
                "abs-square-num",
                "sqrt",
                "cbrt",
                "literal-tuple",
                "reversed-range",
                "square",
                "str-join",
            ]
        );
    }

    /// No rule's output re-matches its own pattern.
    #[test]
    fn no_rule_retriggers_itself() {
        let mut ctx = Ctx::new();
        let catalog = Catalog::new(&ctx.interner);

        for rule in catalog.rules() {
            let input = ctx.example_input(rule.name());
            let bindings = match Matcher::new(&ctx.arena).try_match(rule.pattern(), input) {
                Some(bindings) => bindings,
                None => panic!("rule `{}`: example input does not match", rule.name()),
            };
            let output = match instantiate(
                &mut ctx.arena,
                rule.template(),
                &bindings,
                Span::DUMMY,
                rule.name(),
            ) {
                Ok(id) => id,
                Err(err) => panic!("rule `{}`: {err}", rule.name()),
            };
            assert!(
                Matcher::new(&ctx.arena)
                    .try_match(rule.pattern(), output)
                    .is_none(),
                "rule `{}` re-matches its own output {}",
                rule.name(),
                ctx.render(output)
            );
        }
    }
}
