//! Pass orchestration.
//!
//! Each function runs the four analysis stages strictly in order: liveness,
//! escape exclusion, interference, coloring, then the rewrite. Functions are
//! independent units with no shared state, so the program driver fans out
//! across top-level statements with rayon; nested functions are processed
//! after their enclosing function has been rewritten.

use crate::ast::{Expr, ForInit, Function, MemberProp, Program, Stmt};
use crate::options::CoalesceOptions;
use crate::scope::FunctionScope;
use crate::{cfg, coloring, escape, interference, liveness, rewrite};
use rayon::prelude::*;
use std::collections::HashSet;

/// Coalesce every function in the program. Global bindings are never touched.
pub fn coalesce_program(program: &mut Program, options: &CoalesceOptions) {
    program
        .body
        .par_iter_mut()
        .for_each(|stmt| process_stmt(stmt, options));
}

/// Coalesce one function, then its nested functions, each independently.
pub fn coalesce_function(func: &mut Function, options: &CoalesceOptions) {
    let scope = FunctionScope::collect(func);
    if scope.len() > options.max_analyzed_vars {
        log::debug!(
            "function {} declares {} variables (limit {}); left untouched",
            func.name.as_deref().unwrap_or("<anonymous>"),
            scope.len(),
            options.max_analyzed_vars
        );
    } else {
        let escaped = escape::compute(func, &scope, options);
        run_stages(func, &scope, &escaped, options);
    }
    for stmt in &mut func.body {
        process_stmt(stmt, options);
    }
}

/// Like [`coalesce_function`], but unions an externally supplied escape
/// predicate into the computed set. This is the seam for a caller that runs
/// its own escape analysis; nested functions fall back to the built-in one.
pub fn coalesce_function_with_escapes(
    func: &mut Function,
    options: &CoalesceOptions,
    is_escaped: &dyn Fn(&str) -> bool,
) {
    let scope = FunctionScope::collect(func);
    if scope.len() <= options.max_analyzed_vars {
        let mut escaped = escape::compute(func, &scope, options);
        escaped.extend(scope.ids().filter(|&id| is_escaped(scope.name(id))));
        run_stages(func, &scope, &escaped, options);
    }
    for stmt in &mut func.body {
        process_stmt(stmt, options);
    }
}

fn run_stages(
    func: &mut Function,
    scope: &FunctionScope,
    escaped: &HashSet<crate::scope::VarId>,
    options: &CoalesceOptions,
) {
    let cfg = cfg::builder::build(func, scope);
    let live = match liveness::analyze(&cfg) {
        Ok(live) => live,
        Err(err) => {
            // Correctness over optimization: an unanalyzable function is
            // left exactly as it was.
            log::warn!("coalescing skipped: {err}");
            return;
        }
    };
    let graph = interference::build(&cfg, &live, scope, escaped);
    let coloring = coloring::color(&graph);
    if coloring.merged_any() {
        rewrite::apply(func, scope, &coloring, options);
    }
}

fn process_stmt(stmt: &mut Stmt, options: &CoalesceOptions) {
    match stmt {
        Stmt::FnDecl(func) => coalesce_function(func, options),
        Stmt::Decl(decl) => {
            if let Some(init) = &mut decl.init {
                process_expr(init, options);
            }
        }
        Stmt::Expr(expr) => process_expr(expr, options),
        Stmt::Block(list) => {
            for s in list {
                process_stmt(s, options);
            }
        }
        Stmt::If { test, cons, alt } => {
            process_expr(test, options);
            process_stmt(cons, options);
            if let Some(alt) = alt {
                process_stmt(alt, options);
            }
        }
        Stmt::While { test, body } => {
            process_expr(test, options);
            process_stmt(body, options);
        }
        Stmt::DoWhile { body, test } => {
            process_stmt(body, options);
            process_expr(test, options);
        }
        Stmt::For {
            init,
            test,
            update,
            body,
        } => {
            match init {
                Some(ForInit::Decl(decl)) => {
                    if let Some(e) = &mut decl.init {
                        process_expr(e, options);
                    }
                }
                Some(ForInit::Expr(e)) => process_expr(e, options),
                None => {}
            }
            if let Some(test) = test {
                process_expr(test, options);
            }
            if let Some(update) = update {
                process_expr(update, options);
            }
            process_stmt(body, options);
        }
        Stmt::ForEach { object, body, .. } => {
            process_expr(object, options);
            process_stmt(body, options);
        }
        Stmt::Switch {
            discriminant,
            cases,
        } => {
            process_expr(discriminant, options);
            for case in cases {
                if let Some(test) = &mut case.test {
                    process_expr(test, options);
                }
                for s in &mut case.body {
                    process_stmt(s, options);
                }
            }
        }
        Stmt::Try {
            body,
            catch,
            finally,
        } => {
            for s in body {
                process_stmt(s, options);
            }
            if let Some(catch) = catch {
                for s in &mut catch.body {
                    process_stmt(s, options);
                }
            }
            if let Some(finally) = finally {
                for s in finally {
                    process_stmt(s, options);
                }
            }
        }
        Stmt::Return(expr) => {
            if let Some(expr) = expr {
                process_expr(expr, options);
            }
        }
        Stmt::Labeled { body, .. } => process_stmt(body, options),
        Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty => {}
    }
}

fn process_expr(expr: &mut Expr, options: &CoalesceOptions) {
    match expr {
        Expr::Fn(func) => coalesce_function(func, options),
        Expr::Ident(_)
        | Expr::Number(_)
        | Expr::Str(_)
        | Expr::Bool(_)
        | Expr::Null
        | Expr::This
        | Expr::Update { .. } => {}
        Expr::Array(items) => {
            for item in items {
                process_expr(item, options);
            }
        }
        Expr::Object(props) => {
            for (_, value) in props {
                process_expr(value, options);
            }
        }
        Expr::Assign { target, value, .. } => {
            if let crate::ast::AssignTarget::Member { object, prop } = target {
                process_expr(object, options);
                if let MemberProp::Computed(e) = prop {
                    process_expr(e, options);
                }
            }
            process_expr(value, options);
        }
        Expr::Binary { left, right, .. } => {
            process_expr(left, options);
            process_expr(right, options);
        }
        Expr::Unary { arg, .. } => process_expr(arg, options),
        Expr::Cond { test, cons, alt } => {
            process_expr(test, options);
            process_expr(cons, options);
            process_expr(alt, options);
        }
        Expr::Seq(exprs) => {
            for e in exprs {
                process_expr(e, options);
            }
        }
        Expr::Call { callee, args } => {
            process_expr(callee, options);
            for arg in args {
                process_expr(arg, options);
            }
        }
        Expr::Member { object, prop } => {
            process_expr(object, options);
            if let MemberProp::Computed(e) = prop {
                process_expr(e, options);
            }
        }
    }
}
