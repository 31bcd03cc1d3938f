//! Ordered variable accesses within one CFG node.
//!
//! Live ranges can begin and end inside a single statement (comma sequences,
//! compound assignments, declaration initializers), so every node carries its
//! accesses as an ordered list of micro-steps in evaluation order. The
//! liveness analyzer derives use/def sets from them and the interference
//! builder derives within-node live-range crossings. Evaluation order is what
//! lets `y = x` style copies coalesce: the read of `x` precedes the write of
//! `y`, so no crossing is recorded.

use crate::ast::{AssignTarget, Expr, MemberProp, VarDecl};
use crate::scope::{FunctionScope, VarId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// One variable access at a fixed position inside a CFG node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub var: VarId,
    pub access: Access,
}

impl Step {
    pub fn read(var: VarId) -> Step {
        Step {
            var,
            access: Access::Read,
        }
    }

    pub fn write(var: VarId) -> Step {
        Step {
            var,
            access: Access::Write,
        }
    }
}

pub struct StepRecorder<'a> {
    scope: &'a FunctionScope,
    steps: Vec<Step>,
}

impl<'a> StepRecorder<'a> {
    pub fn new(scope: &'a FunctionScope) -> Self {
        StepRecorder {
            scope,
            steps: Vec::new(),
        }
    }

    pub fn finish(self) -> Vec<Step> {
        self.steps
    }

    fn read(&mut self, name: &str) {
        if let Some(var) = self.scope.lookup(name) {
            self.steps.push(Step::read(var));
        }
    }

    fn write(&mut self, name: &str) {
        if let Some(var) = self.scope.lookup(name) {
            self.steps.push(Step::write(var));
        }
    }

    /// Record a declaration. An initializer-free declaration has no runtime
    /// effect and records nothing.
    pub fn decl(&mut self, decl: &VarDecl) {
        if let Some(init) = &decl.init {
            self.expr(init);
            self.write(&decl.name);
        }
    }

    /// Record the per-iteration binding write of a for-in/for-of head. The
    /// read is deliberate over-approximation: the loop may iterate zero
    /// times, in which case the previous value survives on the exit edge, so
    /// the binding must stay live across the head.
    pub fn iteration_binding(&mut self, name: &str) {
        self.read(name);
        self.write(name);
    }

    pub fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(name) => self.read(name),
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
            // A nested function literal evaluates to a closure without
            // touching locals; anything it captures is escaped and excluded
            // from the analysis entirely.
            Expr::Fn(_) => {}
            Expr::Assign { op, target, value } => match target {
                AssignTarget::Ident(name) => {
                    self.expr(value);
                    if op.reads_target() {
                        self.read(name);
                    }
                    self.write(name);
                }
                AssignTarget::Member { object, prop } => {
                    self.expr(object);
                    if let MemberProp::Computed(e) = prop {
                        self.expr(e);
                    }
                    self.expr(value);
                }
            },
            Expr::Update { name, .. } => {
                self.read(name);
                self.write(name);
            }
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

pub fn expr_steps(expr: &Expr, scope: &FunctionScope) -> Vec<Step> {
    let mut r = StepRecorder::new(scope);
    r.expr(expr);
    r.finish()
}

pub fn decl_steps(decl: &VarDecl, scope: &FunctionScope) -> Vec<Step> {
    let mut r = StepRecorder::new(scope);
    r.decl(decl);
    r.finish()
}
