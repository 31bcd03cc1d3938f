//! Pseudo-name mode: merged classes take a combined name built from every
//! member, with a `$` suffix when the combination collides with a name that
//! is already in use. Debug builds only; the output is larger, not smaller.

mod common;
use common::in_function_with;
use varcoalesce::CoalesceOptions;

fn pseudo() -> CoalesceOptions {
    CoalesceOptions {
        use_pseudo_names: true,
        ..CoalesceOptions::default()
    }
}

#[test]
fn merged_names_combine() {
    in_function_with(
        "var x = 0; print(x); var y = 1; print(y);",
        "var x_y = 0; print(x_y); x_y = 1; print(x_y);",
        &pseudo(),
    );
}

#[test]
fn colliding_combination_gains_a_suffix() {
    in_function_with(
        "var x_y = 1; var x = 0; print(x); var y = 1; print(y); print(x_y);",
        "var x_y = 1; var x_y$ = 0; print(x_y$); x_y$ = 1; print(x_y$); print(x_y);",
        &pseudo(),
    );
}

#[test]
fn free_names_count_as_collisions() {
    // `x_y` is a global here; the synthesized name still has to dodge it.
    in_function_with(
        "let x = 0; print(x); let y = 1; print(y); print(x_y);",
        "var x_y$ = 0; print(x_y$); x_y$ = 1; print(x_y$); print(x_y);",
        &pseudo(),
    );
}

#[test]
fn escaped_variables_keep_their_names() {
    in_function_with(
        "var x = 0; print(x); var y = 1; print(y); var closure_var; function bar() { print(closure_var); }",
        "var x_y = 0; print(x_y); x_y = 1; print(x_y); var closure_var; function bar() { print(closure_var); }",
        &pseudo(),
    );
}
