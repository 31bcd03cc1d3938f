//! Read-only AST traversal in source order.
//!
//! Implementors override the hooks they care about; `walk_*` provide the
//! default descent. Identifier hooks distinguish reference positions
//! (`visit_ident`) from declaration positions (`visit_decl_name`), and
//! property names are never reported as identifiers.

use super::*;

pub trait Visit: Sized {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    /// A variable reference (read or write position).
    fn visit_ident(&mut self, _name: &str) {}

    /// A declaration position: `var`/`let`/`const` name or a for-head binding.
    fn visit_decl_name(&mut self, _kind: DeclKind, _name: &str) {}

    fn visit_catch_param(&mut self, _name: &str) {}

    /// A nested function literal (function expression or arrow).
    fn visit_function(&mut self, func: &Function) {
        walk_function(self, func);
    }

    /// A nested function declaration; its name binds in the enclosing scope.
    fn visit_fn_decl(&mut self, func: &Function) {
        self.visit_function(func);
    }
}

pub fn walk_function<V: Visit>(v: &mut V, func: &Function) {
    for stmt in &func.body {
        v.visit_stmt(stmt);
    }
}

pub fn walk_stmt<V: Visit>(v: &mut V, stmt: &Stmt) {
    match stmt {
        Stmt::Decl(decl) => {
            v.visit_decl_name(decl.kind, &decl.name);
            if let Some(init) = &decl.init {
                v.visit_expr(init);
            }
        }
        Stmt::Expr(expr) => v.visit_expr(expr),
        Stmt::Block(stmts) => {
            for s in stmts {
                v.visit_stmt(s);
            }
        }
        Stmt::If { test, cons, alt } => {
            v.visit_expr(test);
            v.visit_stmt(cons);
            if let Some(alt) = alt {
                v.visit_stmt(alt);
            }
        }
        Stmt::While { test, body } => {
            v.visit_expr(test);
            v.visit_stmt(body);
        }
        Stmt::DoWhile { body, test } => {
            v.visit_stmt(body);
            v.visit_expr(test);
        }
        Stmt::For {
            init,
            test,
            update,
            body,
        } => {
            match init {
                Some(ForInit::Decl(decl)) => {
                    v.visit_decl_name(decl.kind, &decl.name);
                    if let Some(e) = &decl.init {
                        v.visit_expr(e);
                    }
                }
                Some(ForInit::Expr(e)) => v.visit_expr(e),
                None => {}
            }
            if let Some(test) = test {
                v.visit_expr(test);
            }
            if let Some(update) = update {
                v.visit_expr(update);
            }
            v.visit_stmt(body);
        }
        Stmt::ForEach {
            head, object, body, ..
        } => {
            match head {
                ForHead::Decl { kind, name } => v.visit_decl_name(*kind, name),
                ForHead::Ident(name) => v.visit_ident(name),
            }
            v.visit_expr(object);
            v.visit_stmt(body);
        }
        Stmt::Switch {
            discriminant,
            cases,
        } => {
            v.visit_expr(discriminant);
            for case in cases {
                if let Some(test) = &case.test {
                    v.visit_expr(test);
                }
                for s in &case.body {
                    v.visit_stmt(s);
                }
            }
        }
        Stmt::Try {
            body,
            catch,
            finally,
        } => {
            for s in body {
                v.visit_stmt(s);
            }
            if let Some(catch) = catch {
                if let Some(param) = &catch.param {
                    v.visit_catch_param(param);
                }
                for s in &catch.body {
                    v.visit_stmt(s);
                }
            }
            if let Some(finally) = finally {
                for s in finally {
                    v.visit_stmt(s);
                }
            }
        }
        Stmt::Return(expr) => {
            if let Some(expr) = expr {
                v.visit_expr(expr);
            }
        }
        Stmt::Labeled { body, .. } => v.visit_stmt(body),
        Stmt::FnDecl(func) => v.visit_fn_decl(func),
        Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty => {}
    }
}

pub fn walk_expr<V: Visit>(v: &mut V, expr: &Expr) {
    match expr {
        Expr::Ident(name) => v.visit_ident(name),
        Expr::Number(_) | Expr::Str(_) | Expr::Bool(_) | Expr::Null | Expr::This => {}
        Expr::Array(items) => {
            for item in items {
                v.visit_expr(item);
            }
        }
        Expr::Object(props) => {
            for (_, value) in props {
                v.visit_expr(value);
            }
        }
        Expr::Fn(func) => v.visit_function(func),
        Expr::Assign { target, value, .. } => {
            match target {
                AssignTarget::Ident(name) => v.visit_ident(name),
                AssignTarget::Member { object, prop } => {
                    v.visit_expr(object);
                    if let MemberProp::Computed(e) = prop {
                        v.visit_expr(e);
                    }
                }
            }
            v.visit_expr(value);
        }
        Expr::Update { name, .. } => v.visit_ident(name),
        Expr::Binary { left, right, .. } => {
            v.visit_expr(left);
            v.visit_expr(right);
        }
        Expr::Unary { arg, .. } => v.visit_expr(arg),
        Expr::Cond { test, cons, alt } => {
            v.visit_expr(test);
            v.visit_expr(cons);
            v.visit_expr(alt);
        }
        Expr::Seq(exprs) => {
            for e in exprs {
                v.visit_expr(e);
            }
        }
        Expr::Call { callee, args } => {
            v.visit_expr(callee);
            for arg in args {
                v.visit_expr(arg);
            }
        }
        Expr::Member { object, prop } => {
            v.visit_expr(object);
            if let MemberProp::Computed(e) = prop {
                v.visit_expr(e);
            }
        }
    }
}
