//! Applies a coloring back onto the AST.
//!
//! Every member of a multi-member class is renamed to the class name. The
//! representative's declaration survives; a surviving `let`/`const` is
//! widened to `var` so the shared slot is visible across the block boundaries
//! of the other members. Non-representative declarations become plain
//! assignments, or disappear entirely when they carry no initializer.
//! Declarations are never moved, so anything that was a temporal-dead-zone
//! error before the rewrite still is one.

use crate::ast::visit::{self, Visit};
use crate::ast::{
    AssignOp, AssignTarget, DeclKind, Expr, ForHead, ForInit, Function, MemberProp, Stmt,
};
use crate::coloring::Coloring;
use crate::options::CoalesceOptions;
use crate::scope::{FunctionScope, VarId};
use std::collections::{HashMap, HashSet};

/// Rewrite `func` in place according to `coloring`. Never fails; a coloring
/// without multi-member classes leaves the tree untouched.
pub fn apply(
    func: &mut Function,
    scope: &FunctionScope,
    coloring: &Coloring,
    options: &CoalesceOptions,
) {
    let plan = Plan::build(func, scope, coloring, options);
    if plan.renames.is_empty() {
        return;
    }

    for param in func.params.iter_mut() {
        if let Some(var) = scope.lookup(param) {
            if let Some(new) = plan.renames.get(&var) {
                if new != param {
                    *param = new.clone();
                }
            }
        }
    }

    let mut rewriter = Rewriter {
        scope,
        plan: &plan,
        in_loop: false,
    };
    rewriter.stmts(&mut func.body);
}

struct Plan {
    /// Output name for every member of a multi-member class.
    renames: HashMap<VarId, String>,
    /// Representatives: the declarations that survive.
    survivors: HashSet<VarId>,
}

impl Plan {
    fn build(
        func: &Function,
        scope: &FunctionScope,
        coloring: &Coloring,
        options: &CoalesceOptions,
    ) -> Plan {
        let mut renames = HashMap::new();
        let mut survivors = HashSet::new();
        let mut used = options.use_pseudo_names.then(|| used_names(func));

        for class in coloring.classes() {
            if class.len() < 2 {
                continue;
            }
            let representative = class.iter().copied().min().expect("class is non-empty");
            let name = match &mut used {
                Some(used) => {
                    let mut members = class.to_vec();
                    members.sort();
                    let mut name = members
                        .iter()
                        .map(|&m| scope.name(m))
                        .collect::<Vec<_>>()
                        .join("_");
                    while !used.insert(name.clone()) {
                        name.push('$');
                    }
                    name
                }
                None => scope.name(representative).to_string(),
            };
            survivors.insert(representative);
            for &member in class {
                renames.insert(member, name.clone());
            }
        }
        Plan { renames, survivors }
    }
}

/// Every name mentioned anywhere in the function, at any depth. Synthesized
/// pseudo names must not collide with any of these.
fn used_names(func: &Function) -> HashSet<String> {
    let mut collector = NameCollector {
        names: func.params.iter().cloned().collect(),
    };
    if let Some(name) = &func.name {
        collector.names.insert(name.clone());
    }
    visit::walk_function(&mut collector, func);
    collector.names
}

struct NameCollector {
    names: HashSet<String>,
}

impl Visit for NameCollector {
    fn visit_ident(&mut self, name: &str) {
        self.names.insert(name.to_string());
    }

    fn visit_decl_name(&mut self, _kind: DeclKind, name: &str) {
        self.names.insert(name.to_string());
    }

    fn visit_catch_param(&mut self, name: &str) {
        self.names.insert(name.to_string());
    }

    fn visit_function(&mut self, func: &Function) {
        self.names.extend(func.params.iter().cloned());
        if let Some(name) = &func.name {
            self.names.insert(name.clone());
        }
        visit::walk_function(self, func);
    }
}

struct Rewriter<'a> {
    scope: &'a FunctionScope,
    plan: &'a Plan,
    in_loop: bool,
}

impl Rewriter<'_> {
    /// Output name and survivor flag for a mentioned variable, if its class
    /// merged at all.
    fn role(&self, name: &str) -> Option<(&str, bool)> {
        let var = self.scope.lookup(name)?;
        let new = self.plan.renames.get(&var)?;
        Some((new.as_str(), self.plan.survivors.contains(&var)))
    }

    fn rename(&self, name: &mut String) {
        if let Some((new, _)) = self.role(name) {
            if name != new {
                *name = new.to_string();
            }
        }
    }

    fn stmts(&mut self, list: &mut Vec<Stmt>) {
        list.retain_mut(|stmt| self.stmt(stmt));
    }

    /// Rewrite a statement in a context that can absorb its removal; the
    /// return value is false when the statement should be dropped.
    fn stmt(&mut self, stmt: &mut Stmt) -> bool {
        match stmt {
            Stmt::Decl(decl) => {
                let role = self.role(&decl.name).map(|(n, s)| (n.to_string(), s));
                match role {
                    // Merged away: the declaration folds into an assignment,
                    // or vanishes when there is nothing to assign.
                    Some((new, false)) => match decl.init.take() {
                        Some(mut value) => {
                            self.expr(&mut value);
                            *stmt = Stmt::Expr(Expr::Assign {
                                op: AssignOp::Assign,
                                target: AssignTarget::Ident(new),
                                value: Box::new(value),
                            });
                            true
                        }
                        None => false,
                    },
                    // Surviving declaration of a merged class.
                    Some((new, true)) => {
                        decl.name = new;
                        if decl.kind == DeclKind::Let && decl.init.is_none() && self.in_loop {
                            // `let x;` re-initializes on every iteration;
                            // as a `var` it has to do so explicitly.
                            decl.init = Some(Expr::undefined());
                        }
                        if decl.kind.is_block_scoped() {
                            decl.kind = DeclKind::Var;
                        }
                        if let Some(init) = &mut decl.init {
                            self.expr(init);
                        }
                        true
                    }
                    None => {
                        if let Some(init) = &mut decl.init {
                            self.expr(init);
                        }
                        true
                    }
                }
            }
            Stmt::Expr(expr) => {
                self.expr(expr);
                true
            }
            Stmt::Block(list) => {
                self.stmts(list);
                true
            }
            Stmt::If { test, cons, alt } => {
                self.expr(test);
                self.boxed(cons);
                if let Some(alt) = alt {
                    self.boxed(alt);
                }
                true
            }
            Stmt::While { test, body } => {
                self.expr(test);
                self.loop_body(body);
                true
            }
            Stmt::DoWhile { body, test } => {
                self.loop_body(body);
                self.expr(test);
                true
            }
            Stmt::For {
                init,
                test,
                update,
                body,
            } => {
                self.for_init(init);
                if let Some(test) = test {
                    self.expr(test);
                }
                if let Some(update) = update {
                    self.expr(update);
                }
                self.loop_body(body);
                true
            }
            Stmt::ForEach {
                head, object, body, ..
            } => {
                self.for_head(head);
                self.expr(object);
                self.loop_body(body);
                true
            }
            Stmt::Switch {
                discriminant,
                cases,
            } => {
                self.expr(discriminant);
                for case in cases.iter_mut() {
                    if let Some(test) = &mut case.test {
                        self.expr(test);
                    }
                    self.stmts(&mut case.body);
                }
                true
            }
            Stmt::Try {
                body,
                catch,
                finally,
            } => {
                self.stmts(body);
                if let Some(catch) = catch {
                    self.stmts(&mut catch.body);
                }
                if let Some(finally) = finally {
                    self.stmts(finally);
                }
                true
            }
            Stmt::Return(expr) => {
                if let Some(expr) = expr {
                    self.expr(expr);
                }
                true
            }
            Stmt::Labeled { body, .. } => {
                self.boxed(body);
                true
            }
            // Nested functions are separate scopes with their own pass run;
            // nothing they mention is in our rename plan.
            Stmt::FnDecl(_) => true,
            Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty => true,
        }
    }

    /// A statement slot that cannot be removed outright (loop body, labeled
    /// statement, if branch) degrades to an empty statement instead.
    fn boxed(&mut self, stmt: &mut Box<Stmt>) {
        if !self.stmt(stmt) {
            **stmt = Stmt::Empty;
        }
    }

    fn loop_body(&mut self, body: &mut Box<Stmt>) {
        let saved = self.in_loop;
        self.in_loop = true;
        self.boxed(body);
        self.in_loop = saved;
    }

    fn for_init(&mut self, init: &mut Option<ForInit>) {
        match init {
            Some(ForInit::Decl(decl)) => {
                let role = self.role(&decl.name).map(|(n, s)| (n.to_string(), s));
                match role {
                    Some((new, false)) => match decl.init.take() {
                        Some(mut value) => {
                            self.expr(&mut value);
                            *init = Some(ForInit::Expr(Expr::Assign {
                                op: AssignOp::Assign,
                                target: AssignTarget::Ident(new),
                                value: Box::new(value),
                            }));
                        }
                        None => *init = None,
                    },
                    Some((new, true)) => {
                        decl.name = new;
                        if decl.kind.is_block_scoped() {
                            decl.kind = DeclKind::Var;
                        }
                        if let Some(e) = &mut decl.init {
                            self.expr(e);
                        }
                    }
                    None => {
                        if let Some(e) = &mut decl.init {
                            self.expr(e);
                        }
                    }
                }
            }
            Some(ForInit::Expr(expr)) => self.expr(expr),
            None => {}
        }
    }

    fn for_head(&mut self, head: &mut ForHead) {
        match head {
            ForHead::Decl { kind, name } => match self.role(name).map(|(n, s)| (n.to_string(), s)) {
                Some((new, false)) => *head = ForHead::Ident(new),
                Some((new, true)) => {
                    *name = new;
                    if kind.is_block_scoped() {
                        *kind = DeclKind::Var;
                    }
                }
                None => {}
            },
            ForHead::Ident(name) => self.rename(name),
        }
    }

    fn expr(&mut self, expr: &mut Expr) {
        match expr {
            Expr::Ident(name) => self.rename(name),
            Expr::Number(_) | Expr::Str(_) | Expr::Bool(_) | Expr::Null | Expr::This => {}
            Expr::Array(items) => {
                for item in items {
                    self.expr(item);
                }
            }
            Expr::Object(props) => {
                for (_, value) in props {
                    self.expr(value);
                }
            }
            // Separate scope; handled by its own pass run.
            Expr::Fn(_) => {}
            Expr::Assign { target, value, .. } => {
                match target {
                    AssignTarget::Ident(name) => self.rename(name),
                    AssignTarget::Member { object, prop } => {
                        self.expr(object);
                        if let MemberProp::Computed(e) = prop {
                            self.expr(e);
                        }
                    }
                }
                self.expr(value);
            }
            Expr::Update { name, .. } => self.rename(name),
            Expr::Binary { left, right, .. } => {
                self.expr(left);
                self.expr(right);
            }
            Expr::Unary { arg, .. } => self.expr(arg),
            Expr::Cond { test, cons, alt } => {
                self.expr(test);
                self.expr(cons);
                self.expr(alt);
            }
            Expr::Seq(exprs) => {
                for e in exprs {
                    self.expr(e);
                }
            }
            Expr::Call { callee, args } => {
                self.expr(callee);
                for arg in args {
                    self.expr(arg);
                }
            }
            Expr::Member { object, prop } => {
                self.expr(object);
                if let MemberProp::Computed(e) = prop {
                    self.expr(e);
                }
            }
        }
    }
}
