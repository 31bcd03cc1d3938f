//! Canonical single-line rendering of the AST.
//!
//! Used by tests to compare rewritten functions against expected source and
//! by debug logging. Output is deterministic; both sides of a comparison go
//! through the same renderer, so formatting is canonical rather than pretty.

use super::*;
use std::fmt;

pub fn program_to_string(program: &Program) -> String {
    let mut p = Printer::new();
    p.stmt_list(&program.body);
    p.out
}

pub fn function_to_string(func: &Function) -> String {
    let mut p = Printer::new();
    p.function(func);
    p.out
}

pub fn stmt_to_string(stmt: &Stmt) -> String {
    let mut p = Printer::new();
    p.stmt(stmt);
    p.out
}

pub fn expr_to_string(expr: &Expr) -> String {
    let mut p = Printer::new();
    p.expr(expr, 0);
    p.out
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&program_to_string(self))
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&function_to_string(self))
    }
}

/// Binding strength used for parenthesization decisions.
fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Seq(_) => 0,
        Expr::Assign { .. } => 1,
        Expr::Cond { .. } => 2,
        Expr::Binary { op, .. } => match op {
            BinaryOp::Or => 3,
            BinaryOp::And => 4,
            BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::StrictEq | BinaryOp::StrictNotEq => 5,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge | BinaryOp::In => 6,
            BinaryOp::Add | BinaryOp::Sub => 7,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 8,
        },
        Expr::Unary { .. } => 9,
        Expr::Update { .. } => 10,
        Expr::Call { .. } | Expr::Member { .. } => 11,
        Expr::Fn(_) => 1,
        _ => 12,
    }
}

struct Printer {
    out: String,
}

impl Printer {
    fn new() -> Self {
        Printer { out: String::new() }
    }

    fn push(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn stmt_list(&mut self, stmts: &[Stmt]) {
        for (i, stmt) in stmts.iter().enumerate() {
            if i > 0 {
                self.push(" ");
            }
            self.stmt(stmt);
        }
    }

    fn block(&mut self, stmts: &[Stmt]) {
        if stmts.is_empty() {
            self.push("{}");
        } else {
            self.push("{ ");
            self.stmt_list(stmts);
            self.push(" }");
        }
    }

    fn function(&mut self, func: &Function) {
        if func.arrow {
            self.push("(");
            self.push(&func.params.join(", "));
            self.push(") => ");
        } else {
            self.push("function");
            if let Some(name) = &func.name {
                self.push(" ");
                self.push(name);
            }
            self.push("(");
            self.push(&func.params.join(", "));
            self.push(") ");
        }
        self.block(&func.body);
    }

    fn var_decl(&mut self, decl: &VarDecl) {
        let kw = match decl.kind {
            DeclKind::Var => "var",
            DeclKind::Let => "let",
            DeclKind::Const => "const",
        };
        self.push(kw);
        self.push(" ");
        self.push(&decl.name);
        if let Some(init) = &decl.init {
            self.push(" = ");
            self.expr(init, 1);
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Decl(decl) => {
                self.var_decl(decl);
                self.push(";");
            }
            Stmt::Expr(expr) => {
                self.expr(expr, 0);
                self.push(";");
            }
            Stmt::Block(stmts) => self.block(stmts),
            Stmt::If { test, cons, alt } => {
                self.push("if (");
                self.expr(test, 0);
                self.push(") ");
                self.stmt(cons);
                if let Some(alt) = alt {
                    self.push(" else ");
                    self.stmt(alt);
                }
            }
            Stmt::While { test, body } => {
                self.push("while (");
                self.expr(test, 0);
                self.push(") ");
                self.stmt(body);
            }
            Stmt::DoWhile { body, test } => {
                self.push("do ");
                self.stmt(body);
                self.push(" while (");
                self.expr(test, 0);
                self.push(");");
            }
            Stmt::For {
                init,
                test,
                update,
                body,
            } => {
                self.push("for (");
                match init {
                    Some(ForInit::Decl(decl)) => self.var_decl(decl),
                    Some(ForInit::Expr(e)) => self.expr(e, 0),
                    None => {}
                }
                self.push(";");
                if let Some(test) = test {
                    self.push(" ");
                    self.expr(test, 0);
                }
                self.push(";");
                if let Some(update) = update {
                    self.push(" ");
                    self.expr(update, 0);
                }
                self.push(") ");
                self.stmt(body);
            }
            Stmt::ForEach {
                head,
                iteration,
                object,
                body,
            } => {
                self.push("for (");
                match head {
                    ForHead::Decl { kind, name } => {
                        let kw = match kind {
                            DeclKind::Var => "var",
                            DeclKind::Let => "let",
                            DeclKind::Const => "const",
                        };
                        self.push(kw);
                        self.push(" ");
                        self.push(name);
                    }
                    ForHead::Ident(name) => self.push(name),
                }
                self.push(match iteration {
                    IterationKind::In => " in ",
                    IterationKind::Of => " of ",
                });
                self.expr(object, 0);
                self.push(") ");
                self.stmt(body);
            }
            Stmt::Switch {
                discriminant,
                cases,
            } => {
                self.push("switch (");
                self.expr(discriminant, 0);
                self.push(") { ");
                for case in cases {
                    match &case.test {
                        Some(test) => {
                            self.push("case ");
                            self.expr(test, 0);
                            self.push(":");
                        }
                        None => self.push("default:"),
                    }
                    if !case.body.is_empty() {
                        self.push(" ");
                        self.stmt_list(&case.body);
                    }
                    self.push(" ");
                }
                self.push("}");
            }
            Stmt::Try {
                body,
                catch,
                finally,
            } => {
                self.push("try ");
                self.block(body);
                if let Some(catch) = catch {
                    self.push(" catch ");
                    if let Some(param) = &catch.param {
                        self.push("(");
                        self.push(param);
                        self.push(") ");
                    }
                    self.block(&catch.body);
                }
                if let Some(finally) = finally {
                    self.push(" finally ");
                    self.block(finally);
                }
            }
            Stmt::Return(expr) => {
                match expr {
                    Some(expr) => {
                        self.push("return ");
                        self.expr(expr, 0);
                        self.push(";");
                    }
                    None => self.push("return;"),
                }
            }
            Stmt::Break(label) => {
                match label {
                    Some(label) => {
                        self.push("break ");
                        self.push(label);
                        self.push(";");
                    }
                    None => self.push("break;"),
                }
            }
            Stmt::Continue(label) => {
                match label {
                    Some(label) => {
                        self.push("continue ");
                        self.push(label);
                        self.push(";");
                    }
                    None => self.push("continue;"),
                }
            }
            Stmt::Labeled { label, body } => {
                self.push(label);
                self.push(": ");
                self.stmt(body);
            }
            Stmt::FnDecl(func) => self.function(func),
            Stmt::Empty => self.push(";"),
        }
    }

    /// Print `expr`, parenthesizing when its precedence is below `min`.
    fn expr(&mut self, expr: &Expr, min: u8) {
        let prec = precedence(expr);
        if prec < min {
            self.push("(");
            self.expr_inner(expr);
            self.push(")");
        } else {
            self.expr_inner(expr);
        }
    }

    fn expr_inner(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(name) => self.push(name),
            Expr::Number(n) => self.number(*n),
            Expr::Str(s) => {
                self.push("'");
                for c in s.chars() {
                    match c {
                        '\'' => self.push("\\'"),
                        '\\' => self.push("\\\\"),
                        '\n' => self.push("\\n"),
                        _ => self.out.push(c),
                    }
                }
                self.push("'");
            }
            Expr::Bool(true) => self.push("true"),
            Expr::Bool(false) => self.push("false"),
            Expr::Null => self.push("null"),
            Expr::This => self.push("this"),
            Expr::Array(items) => {
                self.push("[");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.expr(item, 1);
                }
                self.push("]");
            }
            Expr::Object(props) => {
                if props.is_empty() {
                    self.push("{}");
                } else {
                    self.push("{");
                    for (i, (key, value)) in props.iter().enumerate() {
                        if i > 0 {
                            self.push(", ");
                        }
                        self.push(key);
                        self.push(": ");
                        self.expr(value, 1);
                    }
                    self.push("}");
                }
            }
            Expr::Fn(func) => self.function(func),
            Expr::Assign { op, target, value } => {
                match target {
                    AssignTarget::Ident(name) => self.push(name),
                    AssignTarget::Member { object, prop } => {
                        self.expr(object, 11);
                        self.member_prop(prop);
                    }
                }
                self.push(" ");
                self.push(op.as_str());
                self.push(" ");
                self.expr(value, 1);
            }
            Expr::Update { op, prefix, name } => {
                if *prefix {
                    self.push(op.as_str());
                    self.push(name);
                } else {
                    self.push(name);
                    self.push(op.as_str());
                }
            }
            Expr::Binary { op, left, right } => {
                let prec = precedence(expr);
                self.expr(left, prec);
                self.push(" ");
                self.push(op.as_str());
                self.push(" ");
                // Left-associative: a right operand of equal precedence
                // keeps its parentheses.
                self.expr(right, prec + 1);
            }
            Expr::Unary { op, arg } => {
                self.push(op.as_str());
                if matches!(op, UnaryOp::Void | UnaryOp::TypeOf) {
                    self.push(" ");
                }
                self.expr(arg, 9);
            }
            Expr::Cond { test, cons, alt } => {
                self.expr(test, 3);
                self.push(" ? ");
                self.expr(cons, 1);
                self.push(" : ");
                self.expr(alt, 1);
            }
            Expr::Seq(exprs) => {
                for (i, e) in exprs.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.expr(e, 1);
                }
            }
            Expr::Call { callee, args } => {
                self.expr(callee, 11);
                self.push("(");
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.expr(arg, 1);
                }
                self.push(")");
            }
            Expr::Member { object, prop } => {
                self.expr(object, 11);
                self.member_prop(prop);
            }
        }
    }

    fn member_prop(&mut self, prop: &MemberProp) {
        match prop {
            MemberProp::Name(name) => {
                self.push(".");
                self.push(name);
            }
            MemberProp::Computed(e) => {
                self.push("[");
                self.expr(e, 0);
                self.push("]");
            }
        }
    }

    fn number(&mut self, n: f64) {
        if n.fract() == 0.0 && n.abs() < 1e15 {
            self.push(&format!("{}", n as i64));
        } else {
            self.push(&format!("{}", n));
        }
    }
}
