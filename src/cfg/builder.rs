//! Builds the statement-level CFG for one function.
//!
//! Every node created inside a `try` gets an `Exception` edge to the
//! innermost handler, including a dedicated try-entry node: any statement may
//! throw before completing, so the handler must see the state from *before*
//! the statement as well as after. This is what keeps a declaration whose
//! initializer may throw interfering with variables the handler reads.

use super::steps::{Step, StepRecorder};
use super::{Cfg, CfgNode, EdgeKind};
use crate::ast::{print, Expr, ForHead, ForInit, Function, Stmt};
use crate::scope::FunctionScope;
use petgraph::graph::{DiGraph, NodeIndex};

/// Dangling out-edges of a partially built region, waiting for their target.
type Preds = Vec<(NodeIndex, EdgeKind)>;

pub struct CfgBuilder<'a> {
    scope: &'a FunctionScope,
    graph: DiGraph<CfgNode, EdgeKind>,
    exit: NodeIndex,
    /// Innermost exception handler last.
    handlers: Vec<NodeIndex>,
    breakables: Vec<Breakable>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakableKind {
    Loop,
    Switch,
    LabeledBlock,
}

struct Breakable {
    kind: BreakableKind,
    label: Option<String>,
    breaks: Vec<NodeIndex>,
    continues: Vec<NodeIndex>,
}

impl<'a> CfgBuilder<'a> {
    pub fn new(scope: &'a FunctionScope) -> Self {
        let mut graph = DiGraph::new();
        let exit = graph.add_node(CfgNode::new(Vec::new(), "exit"));
        CfgBuilder {
            scope,
            graph,
            exit,
            handlers: Vec::new(),
            breakables: Vec::new(),
        }
    }

    pub fn build(mut self, func: &Function) -> Cfg {
        let param_writes: Vec<Step> = func
            .params
            .iter()
            .filter_map(|p| self.scope.lookup(p))
            .map(Step::write)
            .collect();
        let entry = self.node(param_writes, "entry");
        let out = self.stmts(&func.body, vec![(entry, EdgeKind::Fall)]);
        self.connect(&out, self.exit);
        Cfg {
            graph: self.graph,
            entry,
            exit: self.exit,
        }
    }

    fn node(&mut self, steps: Vec<Step>, desc: impl Into<String>) -> NodeIndex {
        let id = self.graph.add_node(CfgNode::new(steps, desc));
        if let Some(&handler) = self.handlers.last() {
            self.graph.add_edge(id, handler, EdgeKind::Exception);
        }
        id
    }

    fn connect(&mut self, preds: &Preds, to: NodeIndex) {
        for &(from, kind) in preds {
            self.graph.add_edge(from, to, kind);
        }
    }

    fn expr_node(&mut self, expr: &Expr, preds: Preds) -> NodeIndex {
        let mut r = StepRecorder::new(self.scope);
        r.expr(expr);
        let id = self.node(r.finish(), clip(&print::expr_to_string(expr)));
        self.connect(&preds, id);
        id
    }

    fn stmts(&mut self, stmts: &[Stmt], mut preds: Preds) -> Preds {
        for stmt in stmts {
            preds = self.stmt(stmt, preds);
        }
        preds
    }

    fn stmt(&mut self, stmt: &Stmt, preds: Preds) -> Preds {
        self.labeled_stmt(stmt, preds, None)
    }

    fn labeled_stmt(&mut self, stmt: &Stmt, preds: Preds, label: Option<&str>) -> Preds {
        match stmt {
            Stmt::Empty => preds,
            Stmt::Decl(decl) => {
                let mut r = StepRecorder::new(self.scope);
                r.decl(decl);
                let id = self.node(r.finish(), clip(&print::stmt_to_string(stmt)));
                self.connect(&preds, id);
                vec![(id, EdgeKind::Fall)]
            }
            Stmt::Expr(expr) => {
                let id = self.expr_node(expr, preds);
                vec![(id, EdgeKind::Fall)]
            }
            Stmt::Block(stmts) => self.stmts(stmts, preds),
            Stmt::If { test, cons, alt } => {
                let test_id = self.expr_node(test, preds);
                let mut out = self.stmt(cons, vec![(test_id, EdgeKind::True)]);
                match alt {
                    Some(alt) => out.extend(self.stmt(alt, vec![(test_id, EdgeKind::False)])),
                    None => out.push((test_id, EdgeKind::False)),
                }
                out
            }
            Stmt::While { test, body } => {
                let test_id = self.expr_node(test, preds);
                self.push_breakable(BreakableKind::Loop, label);
                let body_out = self.stmt(body, vec![(test_id, EdgeKind::True)]);
                self.connect(&body_out, test_id);
                let ctx = self.pop_breakable();
                self.connect_jumps(&ctx.continues, test_id);
                let mut out = vec![(test_id, EdgeKind::False)];
                out.extend(ctx.breaks.into_iter().map(|n| (n, EdgeKind::Uncond)));
                out
            }
            Stmt::DoWhile { body, test } => {
                let head = self.node(Vec::new(), "do");
                self.connect(&preds, head);
                self.push_breakable(BreakableKind::Loop, label);
                let body_out = self.stmt(body, vec![(head, EdgeKind::Fall)]);
                let test_id = self.expr_node(test, body_out);
                self.graph.add_edge(test_id, head, EdgeKind::True);
                let ctx = self.pop_breakable();
                self.connect_jumps(&ctx.continues, test_id);
                let mut out = vec![(test_id, EdgeKind::False)];
                out.extend(ctx.breaks.into_iter().map(|n| (n, EdgeKind::Uncond)));
                out
            }
            Stmt::For {
                init,
                test,
                update,
                body,
            } => self.for_stmt(init, test, update, body, preds, label),
            Stmt::ForEach {
                head, object, body, ..
            } => self.for_each_stmt(head, object, body, preds, label),
            Stmt::Switch {
                discriminant,
                cases,
            } => self.switch_stmt(discriminant, cases, preds, label),
            Stmt::Try {
                body,
                catch,
                finally,
            } => self.try_stmt(body, catch, finally, preds),
            Stmt::Return(expr) => {
                let mut r = StepRecorder::new(self.scope);
                if let Some(expr) = expr {
                    r.expr(expr);
                }
                let id = self.node(r.finish(), clip(&print::stmt_to_string(stmt)));
                self.connect(&preds, id);
                self.graph.add_edge(id, self.exit, EdgeKind::Uncond);
                Vec::new()
            }
            Stmt::Break(target) => {
                let id = self.node(Vec::new(), "break");
                self.connect(&preds, id);
                match self.find_breakable(target.as_deref(), false) {
                    Some(ctx) => ctx.breaks.push(id),
                    None => {
                        log::warn!("break without an enclosing target; routing to exit");
                        self.graph.add_edge(id, self.exit, EdgeKind::Uncond);
                    }
                }
                Vec::new()
            }
            Stmt::Continue(target) => {
                let id = self.node(Vec::new(), "continue");
                self.connect(&preds, id);
                match self.find_breakable(target.as_deref(), true) {
                    Some(ctx) => ctx.continues.push(id),
                    None => {
                        log::warn!("continue without an enclosing loop; routing to exit");
                        self.graph.add_edge(id, self.exit, EdgeKind::Uncond);
                    }
                }
                Vec::new()
            }
            Stmt::Labeled { label, body } => {
                if matches!(
                    body.as_ref(),
                    Stmt::While { .. }
                        | Stmt::DoWhile { .. }
                        | Stmt::For { .. }
                        | Stmt::ForEach { .. }
                        | Stmt::Switch { .. }
                ) {
                    self.labeled_stmt(body, preds, Some(label))
                } else {
                    self.push_breakable(BreakableKind::LabeledBlock, Some(label));
                    let mut out = self.stmt(body, preds);
                    let ctx = self.pop_breakable();
                    out.extend(ctx.breaks.into_iter().map(|n| (n, EdgeKind::Uncond)));
                    out
                }
            }
            Stmt::FnDecl(func) => {
                let desc = match &func.name {
                    Some(name) => format!("function {name}"),
                    None => "function".to_string(),
                };
                let id = self.node(Vec::new(), desc);
                self.connect(&preds, id);
                vec![(id, EdgeKind::Fall)]
            }
        }
    }

    fn for_stmt(
        &mut self,
        init: &Option<ForInit>,
        test: &Option<Expr>,
        update: &Option<Expr>,
        body: &Stmt,
        preds: Preds,
        label: Option<&str>,
    ) -> Preds {
        let preds = match init {
            Some(ForInit::Decl(decl)) => {
                let mut r = StepRecorder::new(self.scope);
                r.decl(decl);
                let id = self.node(r.finish(), clip(&format!("for-init {}", decl.name)));
                self.connect(&preds, id);
                vec![(id, EdgeKind::Fall)]
            }
            Some(ForInit::Expr(expr)) => {
                let id = self.expr_node(expr, preds);
                vec![(id, EdgeKind::Fall)]
            }
            None => preds,
        };
        let (head, body_edge) = match test {
            Some(test) => (self.expr_node(test, preds), EdgeKind::True),
            None => {
                let head = self.node(Vec::new(), "for");
                self.connect(&preds, head);
                (head, EdgeKind::Fall)
            }
        };
        self.push_breakable(BreakableKind::Loop, label);
        let body_out = self.stmt(body, vec![(head, body_edge)]);
        let pending_breaks;
        match update {
            Some(update) => {
                let update_id = self.expr_node(update, body_out);
                self.graph.add_edge(update_id, head, EdgeKind::Uncond);
                let ctx = self.pop_breakable();
                self.connect_jumps(&ctx.continues, update_id);
                pending_breaks = ctx.breaks;
            }
            None => {
                self.connect(&body_out, head);
                let ctx = self.pop_breakable();
                self.connect_jumps(&ctx.continues, head);
                pending_breaks = ctx.breaks;
            }
        }
        let mut out: Preds = if test.is_some() {
            vec![(head, EdgeKind::False)]
        } else {
            Vec::new()
        };
        out.extend(pending_breaks.into_iter().map(|n| (n, EdgeKind::Uncond)));
        out
    }

    fn for_each_stmt(
        &mut self,
        head: &ForHead,
        object: &Expr,
        body: &Stmt,
        preds: Preds,
        label: Option<&str>,
    ) -> Preds {
        let object_id = self.expr_node(object, preds);
        let name = match head {
            ForHead::Decl { name, .. } => name,
            ForHead::Ident(name) => name,
        };
        let mut r = StepRecorder::new(self.scope);
        r.iteration_binding(name);
        let head_id = self.node(r.finish(), clip(&format!("for-each {name}")));
        self.graph.add_edge(object_id, head_id, EdgeKind::Fall);
        self.push_breakable(BreakableKind::Loop, label);
        let body_out = self.stmt(body, vec![(head_id, EdgeKind::True)]);
        self.connect(&body_out, head_id);
        let ctx = self.pop_breakable();
        self.connect_jumps(&ctx.continues, head_id);
        let mut out = vec![(head_id, EdgeKind::False)];
        out.extend(ctx.breaks.into_iter().map(|n| (n, EdgeKind::Uncond)));
        out
    }

    fn switch_stmt(
        &mut self,
        discriminant: &Expr,
        cases: &[crate::ast::SwitchCase],
        preds: Preds,
        label: Option<&str>,
    ) -> Preds {
        let disc_id = self.expr_node(discriminant, preds);
        if cases.is_empty() {
            return vec![(disc_id, EdgeKind::Fall)];
        }

        // Case heads exist up front: dispatch tests chain in source order
        // (default last), while bodies fall through in source order.
        let heads: Vec<NodeIndex> = cases
            .iter()
            .map(|case| match &case.test {
                Some(test) => {
                    let mut r = StepRecorder::new(self.scope);
                    r.expr(test);
                    self.node(r.finish(), clip(&format!("case {}", print::expr_to_string(test))))
                }
                None => self.node(Vec::new(), "default"),
            })
            .collect();

        let mut dispatch: Preds = vec![(disc_id, EdgeKind::Fall)];
        for (case, &head) in cases.iter().zip(&heads) {
            if case.test.is_some() {
                self.connect(&dispatch, head);
                dispatch = vec![(head, EdgeKind::False)];
            }
        }
        let default_head = cases
            .iter()
            .position(|c| c.test.is_none())
            .map(|i| heads[i]);
        if let Some(head) = default_head {
            self.connect(&dispatch, head);
            dispatch = Vec::new();
        }

        self.push_breakable(BreakableKind::Switch, label);
        let mut fall: Preds = Vec::new();
        for (case, &head) in cases.iter().zip(&heads) {
            let enter = if case.test.is_some() {
                EdgeKind::True
            } else {
                EdgeKind::Fall
            };
            fall.push((head, enter));
            fall = self.stmts(&case.body, fall);
        }
        let ctx = self.pop_breakable();

        let mut out = fall;
        out.extend(dispatch);
        out.extend(ctx.breaks.into_iter().map(|n| (n, EdgeKind::Uncond)));
        out
    }

    fn try_stmt(
        &mut self,
        body: &[Stmt],
        catch: &Option<crate::ast::CatchClause>,
        finally: &Option<Vec<Stmt>>,
        preds: Preds,
    ) -> Preds {
        let finally_head = finally
            .as_ref()
            .map(|_| self.node(Vec::new(), "finally"));
        if let Some(head) = finally_head {
            self.handlers.push(head);
        }
        let catch_head = catch.as_ref().map(|_| self.node(Vec::new(), "catch"));
        if let Some(head) = catch_head {
            self.handlers.push(head);
        }

        let entry = self.node(Vec::new(), "try");
        self.connect(&preds, entry);
        let try_out = self.stmts(body, vec![(entry, EdgeKind::Fall)]);

        if catch_head.is_some() {
            self.handlers.pop();
        }
        let mut joined = try_out;
        if let (Some(head), Some(catch)) = (catch_head, catch) {
            joined.extend(self.stmts(&catch.body, vec![(head, EdgeKind::Fall)]));
        }
        if finally_head.is_some() {
            self.handlers.pop();
        }

        match (finally_head, finally) {
            (Some(head), Some(finally)) => {
                self.connect(&joined, head);
                self.stmts(finally, vec![(head, EdgeKind::Fall)])
            }
            _ => joined,
        }
    }

    fn push_breakable(&mut self, kind: BreakableKind, label: Option<&str>) {
        self.breakables.push(Breakable {
            kind,
            label: label.map(str::to_string),
            breaks: Vec::new(),
            continues: Vec::new(),
        });
    }

    fn pop_breakable(&mut self) -> Breakable {
        self.breakables.pop().expect("breakable stack underflow")
    }

    fn find_breakable(&mut self, label: Option<&str>, for_continue: bool) -> Option<&mut Breakable> {
        self.breakables.iter_mut().rev().find(|b| match label {
            Some(label) => {
                b.label.as_deref() == Some(label) && (!for_continue || b.kind == BreakableKind::Loop)
            }
            None => {
                if for_continue {
                    b.kind == BreakableKind::Loop
                } else {
                    matches!(b.kind, BreakableKind::Loop | BreakableKind::Switch)
                }
            }
        })
    }

    fn connect_jumps(&mut self, nodes: &[NodeIndex], to: NodeIndex) {
        for &node in nodes {
            self.graph.add_edge(node, to, EdgeKind::Uncond);
        }
    }
}

/// Build the CFG for one function.
pub fn build(func: &Function, scope: &FunctionScope) -> Cfg {
    CfgBuilder::new(scope).build(func)
}

fn clip(s: &str) -> String {
    const MAX: usize = 40;
    if s.chars().count() > MAX {
        let prefix: String = s.chars().take(MAX).collect();
        format!("{prefix}…")
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse::parse_function;
    use crate::cfg::EdgeKind;
    use petgraph::visit::EdgeRef;

    fn build_for(src: &str) -> (Cfg, FunctionScope) {
        let func = parse_function(src).unwrap();
        let scope = FunctionScope::collect(&func);
        let cfg = CfgBuilder::new(&scope).build(&func);
        (cfg, scope)
    }

    #[test]
    fn straight_line_chain() {
        let (cfg, _) = build_for("function f() { var x = 1; x; }");
        // entry, two statements, exit
        assert_eq!(cfg.graph().node_count(), 4);
        assert_eq!(cfg.graph().edge_count(), 3);
    }

    #[test]
    fn if_has_true_and_false_edges() {
        let (cfg, _) = build_for("function f(a) { if (a) { a; } }");
        let kinds: Vec<EdgeKind> = cfg
            .graph()
            .edge_references()
            .map(|e| *e.weight())
            .collect();
        assert!(kinds.contains(&EdgeKind::True));
        assert!(kinds.contains(&EdgeKind::False));
    }

    #[test]
    fn loop_has_back_edge() {
        let (cfg, _) = build_for("function f() { for (var i = 0; i < 3; i++) { i; } }");
        let has_back = cfg
            .graph()
            .edge_references()
            .any(|e| e.target().index() < e.source().index() && *e.weight() != EdgeKind::Exception);
        assert!(has_back);
    }

    #[test]
    fn try_nodes_reach_handler() {
        let (cfg, _) = build_for(
            "function f() { try { var a = g(); } catch (e) { h(); } finally { k(); } }",
        );
        let exception_edges = cfg
            .graph()
            .edge_references()
            .filter(|e| *e.weight() == EdgeKind::Exception)
            .count();
        // try-entry and the declaration both report to the catch head; the
        // catch head and catch body report to the finally head.
        assert!(exception_edges >= 4);
    }

    #[test]
    fn dot_export_covers_every_node() {
        let (cfg, _) = build_for("function f(a) { if (a) { a; } }");
        let dot = cfg.to_dot();
        assert!(dot.starts_with("digraph cfg {"));
        for id in cfg.graph().node_indices() {
            assert!(dot.contains(&format!("n{}", id.index())));
        }
    }

    #[test]
    fn return_leads_to_exit() {
        let (cfg, _) = build_for("function f(a) { if (a) return a; a = 1; return a; }");
        let exit = cfg.exit();
        let returns = cfg
            .graph()
            .edge_references()
            .filter(|e| e.target() == exit && *e.weight() == EdgeKind::Uncond)
            .count();
        assert_eq!(returns, 2);
    }
}
