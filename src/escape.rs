//! Escape computation: which variables the pass must not touch.
//!
//! A variable escapes when a nested function literal can observe it, or when
//! the `arguments` object may alias it (parameters only). Escaped variables
//! keep their name and their slot; the rest of the pass treats this purely as
//! an exclusion predicate, as does the surrounding compiler when it supplies
//! its own oracle.

use crate::ast::visit::{self, Visit};
use crate::ast::{Expr, Function};
use crate::options::{CoalesceOptions, OutputTarget};
use crate::scope::{FunctionScope, VarId};
use std::collections::HashSet;

const ARGUMENTS: &str = "arguments";

/// Compute the escaped-variable set for one function.
pub fn compute(
    func: &Function,
    scope: &FunctionScope,
    options: &CoalesceOptions,
) -> HashSet<VarId> {
    let mut scan = EscapeScan {
        scope,
        escaped: HashSet::new(),
        uses_arguments: false,
    };
    visit::walk_function(&mut scan, func);

    let mut escaped = scan.escaped;

    // `arguments[i]` can alias any parameter, so a function that touches
    // `arguments` forfeits coalescing on all of its parameters.
    let mut escape_params = scan.uses_arguments;

    // Legacy hosts miscompile writes to the parameters of two-argument
    // callbacks, so under that target both parameter slots stay untouched.
    if options.output_target == OutputTarget::Legacy && func.params.len() == 2 {
        escape_params = true;
    }

    if escape_params {
        escaped.extend(scope.params());
    }
    escaped
}

struct EscapeScan<'a> {
    scope: &'a FunctionScope,
    escaped: HashSet<VarId>,
    uses_arguments: bool,
}

impl Visit for EscapeScan<'_> {
    fn visit_ident(&mut self, name: &str) {
        if name == ARGUMENTS {
            self.uses_arguments = true;
        }
    }

    fn visit_function(&mut self, func: &Function) {
        // Everything a nested literal references escapes. Normalized input
        // has globally unique names, so shadowing cannot produce false hits.
        let mut refs = RefCollector {
            names: HashSet::new(),
        };
        visit::walk_function(&mut refs, func);
        self.escaped
            .extend(refs.names.iter().filter_map(|n| self.scope.lookup(n)));

        // Arrows share the enclosing function's `arguments` object, so keep
        // scanning for it through arrow bodies (but not ordinary functions,
        // which bind their own).
        if func.arrow {
            visit::walk_function(self, func);
        }
    }
}

/// Every identifier referenced anywhere below a node, at any nesting depth.
struct RefCollector {
    names: HashSet<String>,
}

impl Visit for RefCollector {
    fn visit_ident(&mut self, name: &str) {
        self.names.insert(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse::parse_function;

    fn escaped_names(src: &str, options: &CoalesceOptions) -> Vec<String> {
        let func = parse_function(src).unwrap();
        let scope = FunctionScope::collect(&func);
        let mut names: Vec<String> = compute(&func, &scope, options)
            .into_iter()
            .map(|id| scope.name(id).to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn closure_capture_escapes() {
        let names = escaped_names(
            "function f() { var x = 1; var y = 2; use(() => { return x; }); y; }",
            &CoalesceOptions::default(),
        );
        assert_eq!(names, ["x"]);
    }

    #[test]
    fn nested_declaration_capture_escapes() {
        let names = escaped_names(
            "function f() { function g() { x; } var x = 1; x; var y = 0; y; g(); }",
            &CoalesceOptions::default(),
        );
        // `g` resolves too: the nested body mentions no other locals.
        assert!(names.contains(&"x".to_string()));
    }

    #[test]
    fn arguments_escapes_all_parameters() {
        let names = escaped_names(
            "function f(a, b, c) { var i = 0; return arguments[i]; }",
            &CoalesceOptions::default(),
        );
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn arguments_inside_arrow_counts() {
        let names = escaped_names(
            "function f(a) { use(() => { return arguments; }); }",
            &CoalesceOptions::default(),
        );
        assert!(names.contains(&"a".to_string()));
    }

    #[test]
    fn legacy_target_escapes_two_param_functions() {
        let legacy = CoalesceOptions {
            output_target: OutputTarget::Legacy,
            ..CoalesceOptions::default()
        };
        assert_eq!(
            escaped_names("function f(x, y) { var a; a = 0; a; }", &legacy),
            ["x", "y"]
        );
        // Only exactly-two-parameter functions are affected.
        assert_eq!(
            escaped_names("function f(x, y, z) { var a; a = 0; a; }", &legacy),
            Vec::<String>::new()
        );
    }
}
