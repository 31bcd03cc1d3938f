//! Shared harness: run the pass over source text and compare canonical
//! renderings, so expectations read as before/after source pairs.

// Each test binary compiles this module on its own and uses a subset of it.
#![allow(dead_code)]

use varcoalesce::ast::parse::parse_function;
use varcoalesce::ast::print::function_to_string;
use varcoalesce::{coalesce_function, CoalesceOptions};

/// `RUST_LOG=debug cargo test` dumps the per-stage analysis logs.
fn logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Canonical rendering of a function-body source snippet.
fn canon(body: &str) -> String {
    let func = parse_function(&format!("function FUNC() {{ {body} }}"))
        .unwrap_or_else(|e| panic!("parse failed for `{body}`: {e}"));
    function_to_string(&func)
}

/// Coalesce `src` (a function body) and expect `expected`.
pub fn in_function_with(src: &str, expected: &str, options: &CoalesceOptions) {
    logging();
    let mut func = parse_function(&format!("function FUNC() {{ {src} }}"))
        .unwrap_or_else(|e| panic!("parse failed for `{src}`: {e}"));
    coalesce_function(&mut func, options);
    assert_eq!(
        function_to_string(&func),
        canon(expected),
        "coalescing `{src}`"
    );
}

pub fn in_function(src: &str, expected: &str) {
    in_function_with(src, expected, &CoalesceOptions::default());
}

/// Coalescing must be a no-op for this function body.
pub fn same_in_function(src: &str) {
    in_function(src, src);
}

/// Coalesce a whole function (signature included) and expect `expected`.
pub fn transform_with(src: &str, expected: &str, options: &CoalesceOptions) {
    logging();
    let mut func =
        parse_function(src).unwrap_or_else(|e| panic!("parse failed for `{src}`: {e}"));
    coalesce_function(&mut func, options);
    let expected_func =
        parse_function(expected).unwrap_or_else(|e| panic!("parse failed for `{expected}`: {e}"));
    assert_eq!(
        function_to_string(&func),
        function_to_string(&expected_func),
        "coalescing `{src}`"
    );
}

pub fn transform(src: &str, expected: &str) {
    transform_with(src, expected, &CoalesceOptions::default());
}

pub fn same(src: &str) {
    transform(src, src);
}
