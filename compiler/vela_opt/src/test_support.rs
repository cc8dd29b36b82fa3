//! Builders and renderers shared by the pass tests.
//!
//! `Ctx` bundles an interner and an arena with shorthand constructors, plus
//! a compact textual rendering used to assert on rewritten tree shapes
//! without spelling out node-by-node expectations.

use vela_ir::ast::ClauseRange;
use vela_ir::{
    BinaryOp, CompClause, Expr, ExprArena, ExprId, ExprKind, ExprRange, Name, Span, Stmt, StmtKind,
    StringInterner, UnaryOp, Unit,
};

pub(crate) struct Ctx {
    pub(crate) interner: StringInterner,
    pub(crate) arena: ExprArena,
}

impl Ctx {
    pub(crate) fn new() -> Self {
        Ctx {
            interner: StringInterner::new(),
            arena: ExprArena::new(),
        }
    }

    pub(crate) fn name(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    fn alloc(&mut self, kind: ExprKind) -> ExprId {
        self.arena.alloc_expr(Expr::new(kind, Span::DUMMY))
    }

    pub(crate) fn ident(&mut self, name: &str) -> ExprId {
        let name = self.name(name);
        self.alloc(ExprKind::Ident(name))
    }

    pub(crate) fn int(&mut self, value: i64) -> ExprId {
        self.alloc(ExprKind::Int(value))
    }

    pub(crate) fn float(&mut self, value: f64) -> ExprId {
        self.alloc(ExprKind::float(value))
    }

    pub(crate) fn str_lit(&mut self, text: &str) -> ExprId {
        let name = self.name(text);
        self.alloc(ExprKind::Str(name))
    }

    pub(crate) fn call(&mut self, func: &str, args: &[ExprId]) -> ExprId {
        let func = self.ident(func);
        self.call_expr(func, args)
    }

    pub(crate) fn call_expr(&mut self, func: ExprId, args: &[ExprId]) -> ExprId {
        let args = self.arena.push_expr_list(args);
        self.alloc(ExprKind::Call { func, args })
    }

    pub(crate) fn attr(&mut self, value: ExprId, attr: &str) -> ExprId {
        let attr = self.name(attr);
        self.alloc(ExprKind::Attribute { value, attr })
    }

    pub(crate) fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        self.alloc(ExprKind::Binary { op, left, right })
    }

    pub(crate) fn list(&mut self, elements: &[ExprId]) -> ExprId {
        let elements = self.arena.push_expr_list(elements);
        self.alloc(ExprKind::List(elements))
    }

    pub(crate) fn tuple(&mut self, elements: &[ExprId]) -> ExprId {
        let elements = self.arena.push_expr_list(elements);
        self.alloc(ExprKind::Tuple(elements))
    }

    pub(crate) fn clause(&mut self, target: &str, iter: ExprId, ifs: &[ExprId]) -> CompClause {
        let target = self.ident(target);
        let ifs = self.arena.push_expr_list(ifs);
        CompClause { target, iter, ifs }
    }

    pub(crate) fn list_comp(&mut self, elt: ExprId, clauses: &[CompClause]) -> ExprId {
        let clauses = self.arena.push_clauses(clauses);
        self.alloc(ExprKind::ListComp { elt, clauses })
    }

    pub(crate) fn generator(&mut self, elt: ExprId, clauses: &[CompClause]) -> ExprId {
        let clauses = self.arena.push_clauses(clauses);
        self.alloc(ExprKind::Generator { elt, clauses })
    }

    pub(crate) fn unit_of_expr(&mut self, value: ExprId) -> Unit {
        Unit::new(vec![Stmt::new(StmtKind::Expr { value }, Span::DUMMY)])
    }

    /// A canonical input matching the named catalog rule's pattern.
    pub(crate) fn example_input(&mut self, rule: &str) -> ExprId {
        match rule {
            "len-set" => {
                let xs = self.ident("xs");
                let set = self.call("set", &[xs]);
                self.call("len", &[set])
            }
            "tuple-list" => {
                let xs = self.ident("xs");
                let list = self.call("list", &[xs]);
                self.call("tuple", &[list])
            }
            "abs-square" => {
                let x = self.ident("x");
                let abs = self.call("abs", &[x]);
                let two = self.int(2);
                self.binary(BinaryOp::Pow, abs, two)
            }
            "abs-square-num" => {
                let num = self.ident("num");
                let abs = self.attr(num, "abs");
                let x = self.ident("x");
                let call = self.call_expr(abs, &[x]);
                let two = self.int(2);
                self.binary(BinaryOp::Pow, call, two)
            }
            "sqrt" => {
                let x = self.ident("x");
                let half = self.float(0.5);
                self.binary(BinaryOp::Pow, x, half)
            }
            "cbrt" => {
                let x = self.ident("x");
                let third = self.float(1.0 / 3.0);
                self.binary(BinaryOp::Pow, x, third)
            }
            "literal-tuple" => {
                let a = self.ident("a");
                let b = self.ident("b");
                let list = self.list(&[a, b]);
                self.call("tuple", &[list])
            }
            "reversed-range" => {
                let n = self.ident("n");
                let range = self.call("range", &[n]);
                self.call("reversed", &[range])
            }
            "square" => {
                let x1 = self.ident("x");
                let x2 = self.ident("x");
                self.binary(BinaryOp::Mul, x1, x2)
            }
            "str-join" => {
                let a = self.ident("a");
                let sep = self.str_lit(" ");
                let inner = self.binary(BinaryOp::Add, a, sep);
                let b = self.ident("b");
                self.binary(BinaryOp::Add, inner, b)
            }
            other => panic!("no example input for rule `{other}`"),
        }
    }

    /// Compact source-like rendering of an expression subtree.
    pub(crate) fn render(&self, id: ExprId) -> String {
        match self.arena.kind(id) {
            ExprKind::Int(value) => value.to_string(),
            ExprKind::Float(bits) => f64::from_bits(bits).to_string(),
            ExprKind::Str(name) => format!("\"{}\"", self.interner.resolve(name)),
            ExprKind::Bool(value) => if value { "true" } else { "false" }.to_string(),
            ExprKind::NoneLit => "None".to_string(),
            ExprKind::Ident(name) => self.interner.resolve(name).to_string(),
            ExprKind::Attribute { value, attr } => {
                format!("{}.{}", self.render(value), self.interner.resolve(attr))
            }
            ExprKind::Subscript { value, index } => {
                format!("{}[{}]", self.render(value), self.render(index))
            }
            ExprKind::Call { func, args } => {
                format!("{}({})", self.render(func), self.render_list(args))
            }
            ExprKind::Binary { op, left, right } => format!(
                "({} {} {})",
                self.render(left),
                op.as_symbol(),
                self.render(right)
            ),
            ExprKind::Unary { op, operand } => match op {
                UnaryOp::Neg => format!("(-{})", self.render(operand)),
                UnaryOp::Not => format!("(not {})", self.render(operand)),
            },
            ExprKind::Lambda { params, body } => {
                let params: Vec<&str> = self
                    .arena
                    .get_names(params)
                    .iter()
                    .map(|&name| self.interner.resolve(name))
                    .collect();
                format!("(lambda {}: {})", params.join(", "), self.render(body))
            }
            ExprKind::Tuple(elements) => {
                let items = self.arena.get_expr_list(elements);
                if let [single] = items {
                    format!("({},)", self.render(*single))
                } else {
                    format!("({})", self.render_list(elements))
                }
            }
            ExprKind::List(elements) => format!("[{}]", self.render_list(elements)),
            ExprKind::ListComp { elt, clauses } => {
                format!("[{}{}]", self.render(elt), self.render_clauses(clauses))
            }
            ExprKind::Generator { elt, clauses } => {
                format!("({}{})", self.render(elt), self.render_clauses(clauses))
            }
        }
    }

    fn render_list(&self, range: ExprRange) -> String {
        let rendered: Vec<String> = self
            .arena
            .get_expr_list(range)
            .iter()
            .map(|&id| self.render(id))
            .collect();
        rendered.join(", ")
    }

    fn render_clauses(&self, range: ClauseRange) -> String {
        let mut out = String::new();
        for clause in self.arena.get_clauses(range) {
            out.push_str(&format!(
                " for {} in {}",
                self.render(clause.target),
                self.render(clause.iter)
            ));
            for &predicate in self.arena.get_expr_list(clause.ifs) {
                out.push_str(&format!(" if {}", self.render(predicate)));
            }
        }
        out
    }

    /// Compact source-like rendering of a statement.
    pub(crate) fn render_stmt(&self, stmt: &Stmt) -> String {
        match &stmt.kind {
            StmtKind::Import { module, alias } => {
                let module = self.interner.resolve(*module);
                let alias = self.interner.resolve(*alias);
                if module == alias {
                    format!("import {module}")
                } else {
                    format!("import {module} as {alias}")
                }
            }
            StmtKind::Assign { target, value } => {
                format!("{} = {}", self.interner.resolve(*target), self.render(*value))
            }
            StmtKind::Return { value } => {
                if value.is_valid() {
                    format!("return {}", self.render(*value))
                } else {
                    "return".to_string()
                }
            }
            StmtKind::Expr { value } => self.render(*value),
            StmtKind::FunctionDef { name, params, body } => {
                let params: Vec<&str> = params
                    .iter()
                    .map(|&param| self.interner.resolve(param))
                    .collect();
                format!(
                    "def {}({}): [{} stmts]",
                    self.interner.resolve(*name),
                    params.join(", "),
                    body.len()
                )
            }
        }
    }
}
