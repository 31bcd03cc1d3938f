//! The analyzable-variable ceiling: a function declaring more variables than
//! the configured maximum is left byte-identical, while its nested functions
//! are still processed on their own.

mod common;
use common::{in_function_with, transform_with};
use varcoalesce::{CoalesceOptions, DEFAULT_MAX_ANALYZED_VARS};

fn with_max(max_analyzed_vars: usize) -> CoalesceOptions {
    CoalesceOptions {
        max_analyzed_vars,
        ..CoalesceOptions::default()
    }
}

#[test]
fn at_the_ceiling_still_coalesces() {
    in_function_with(
        "var x; var y; var z; x = 1; x; y = 1; y; z = 1; z;",
        "var x; x = 1; x; x = 1; x; x = 1; x;",
        &with_max(3),
    );
}

#[test]
fn one_above_the_ceiling_is_untouched() {
    let src = "var x; var y; var z; x = 1; x; y = 1; y; z = 1; z;";
    in_function_with(src, src, &with_max(2));
}

#[test]
fn default_ceiling_matches_the_documented_constant() {
    let mut src = String::new();
    for i in 0..=DEFAULT_MAX_ANALYZED_VARS {
        src.push_str(&format!("var x{i} = 0; print(x{i});"));
    }
    in_function_with(&src, &src, &CoalesceOptions::default());
}

#[test]
fn nested_functions_are_processed_despite_an_oversized_parent() {
    transform_with(
        "function FUNC() { var a; var b; var c; a = 1; a; b = 1; b; c = 1; c; function inner() { var x = 1; var y = 2; y; } }",
        "function FUNC() { var a; var b; var c; a = 1; a; b = 1; b; c = 1; c; function inner() { var x = 1; x = 2; x; } }",
        &with_max(2),
    );
}
