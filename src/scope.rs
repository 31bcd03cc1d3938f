//! Per-function variable arena.
//!
//! Variables are indexed by [`VarId`] in *first-appearance* order: parameters
//! first, then every declared name in the order it is first mentioned in the
//! source. Appearance order decides which member of a merged class donates
//! its name, so names that appear earlier in the code win.

use crate::ast::visit::{self, Visit};
use crate::ast::{DeclKind, Expr, Function};
use std::collections::HashMap;
use std::fmt;

/// Stable identity of a variable within one function scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Declaring construct of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Param,
    Var,
    /// `let` or `const`; block-scoped, widened to `var` when its slot
    /// survives a merge.
    LetConst,
    /// A nested function declaration's name. Never coalesced.
    FnName,
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub kind: VarKind,
}

/// All variables declared by one function, the unit of analysis. Dropped
/// when the function's pass completes; nothing is shared across functions.
#[derive(Debug, Default)]
pub struct FunctionScope {
    vars: Vec<Variable>,
    by_name: HashMap<String, VarId>,
}

impl FunctionScope {
    /// Gather the function's parameters and declared locals, ordered by
    /// first appearance. Nested function bodies belong to other scopes and
    /// are not entered; a nested function *declaration* still contributes
    /// its name to this scope.
    pub fn collect(func: &Function) -> Self {
        let mut kinds = KindCollector {
            kinds: HashMap::new(),
        };
        for param in &func.params {
            kinds.declare(param, VarKind::Param);
        }
        visit::walk_function(&mut kinds, func);

        let mut scope = FunctionScope::default();
        for param in &func.params {
            scope.insert(param, VarKind::Param);
        }
        let mut order = AppearanceCollector {
            scope: &mut scope,
            kinds: &kinds.kinds,
        };
        visit::walk_function(&mut order, func);
        scope
    }

    fn insert(&mut self, name: &str, kind: VarKind) {
        if !self.by_name.contains_key(name) {
            let id = VarId(self.vars.len());
            self.vars.push(Variable {
                name: name.to_string(),
                kind,
            });
            self.by_name.insert(name.to_string(), id);
        }
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn lookup(&self, name: &str) -> Option<VarId> {
        self.by_name.get(name).copied()
    }

    pub fn var(&self, id: VarId) -> &Variable {
        &self.vars[id.0]
    }

    pub fn name(&self, id: VarId) -> &str {
        &self.vars[id.0].name
    }

    pub fn ids(&self) -> impl Iterator<Item = VarId> {
        (0..self.vars.len()).map(VarId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarId, &Variable)> {
        self.vars.iter().enumerate().map(|(i, v)| (VarId(i), v))
    }

    pub fn params(&self) -> impl Iterator<Item = VarId> + '_ {
        self.iter()
            .filter(|(_, v)| v.kind == VarKind::Param)
            .map(|(id, _)| id)
    }

    pub fn is_param(&self, id: VarId) -> bool {
        self.vars[id.0].kind == VarKind::Param
    }
}

/// First walk: which names are declared here, and how.
struct KindCollector {
    kinds: HashMap<String, VarKind>,
}

impl KindCollector {
    fn declare(&mut self, name: &str, kind: VarKind) {
        self.kinds.entry(name.to_string()).or_insert(kind);
    }
}

impl Visit for KindCollector {
    fn visit_decl_name(&mut self, kind: DeclKind, name: &str) {
        let kind = match kind {
            DeclKind::Var => VarKind::Var,
            DeclKind::Let | DeclKind::Const => VarKind::LetConst,
        };
        self.declare(name, kind);
    }

    fn visit_fn_decl(&mut self, func: &Function) {
        if let Some(name) = &func.name {
            self.declare(name, VarKind::FnName);
        }
    }

    fn visit_function(&mut self, _func: &Function) {
        // nested scope
    }

    fn visit_expr(&mut self, expr: &Expr) {
        if !matches!(expr, Expr::Fn(_)) {
            visit::walk_expr(self, expr);
        }
    }
}

/// Second walk: assign ordinals by first mention.
struct AppearanceCollector<'a> {
    scope: &'a mut FunctionScope,
    kinds: &'a HashMap<String, VarKind>,
}

impl AppearanceCollector<'_> {
    fn mention(&mut self, name: &str) {
        if let Some(kind) = self.kinds.get(name) {
            self.scope.insert(name, *kind);
        }
    }
}

impl Visit for AppearanceCollector<'_> {
    fn visit_ident(&mut self, name: &str) {
        self.mention(name);
    }

    fn visit_decl_name(&mut self, _kind: DeclKind, name: &str) {
        self.mention(name);
    }

    fn visit_fn_decl(&mut self, func: &Function) {
        if let Some(name) = &func.name {
            self.mention(name);
        }
    }

    fn visit_function(&mut self, _func: &Function) {
        // nested scope
    }

    fn visit_expr(&mut self, expr: &Expr) {
        if !matches!(expr, Expr::Fn(_)) {
            visit::walk_expr(self, expr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse::parse_function;

    fn names_in_order(src: &str) -> Vec<String> {
        let func = parse_function(src).unwrap();
        let scope = FunctionScope::collect(&func);
        scope.iter().map(|(_, v)| v.name.clone()).collect()
    }

    #[test]
    fn params_come_first() {
        assert_eq!(
            names_in_order("function f(a, b) { var c = a + b; c; }"),
            ["a", "b", "c"]
        );
    }

    #[test]
    fn ordinals_follow_first_appearance() {
        // `y` is assigned before either declaration is reached.
        assert_eq!(
            names_in_order("function f() { y = 0; var x; var y; y; x = 0; x; }"),
            ["y", "x"]
        );
    }

    #[test]
    fn nested_function_bodies_are_foreign() {
        assert_eq!(
            names_in_order("function f() { var a = 1; function g() { var b; } g(); }"),
            ["a", "g"]
        );
        let func = parse_function("function f() { var a = 1; function g() { var b; } }").unwrap();
        let scope = FunctionScope::collect(&func);
        assert_eq!(scope.var(scope.lookup("g").unwrap()).kind, VarKind::FnName);
        assert!(scope.lookup("b").is_none());
    }

    #[test]
    fn catch_params_are_not_scope_variables() {
        let func = parse_function("function f() { try { g(); } catch (e) { e; } }").unwrap();
        let scope = FunctionScope::collect(&func);
        assert!(scope.lookup("e").is_none());
    }

    #[test]
    fn for_heads_declare() {
        assert_eq!(
            names_in_order("function f(k) { for (var i = 0; i < 10; i++) {} for (var p in k) p; }"),
            ["k", "i", "p"]
        );
    }
}
