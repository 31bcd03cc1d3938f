//! Block-scoped bindings: a surviving `let`/`const` declaration widens to
//! `var` so the shared slot outlives its original block, and the widened
//! lifetime (not the lexical one) is what interference is judged against.

mod common;
use common::{in_function, same_in_function};

#[test]
fn sequential_lets_merge_and_widen() {
    in_function(
        "let x = 0; x; let y = 5; y;",
        "var x = 0; x;     x = 5; x;",
    );

    in_function(
        "var x = 1; var y = 2; { let z = 3; y; }",
        "var x = 1;     x = 2; { let z = 3; x; }",
    );
}

#[test]
fn first_let_in_block_widens_in_place() {
    // Keeping the declaration a `let` would leave the slot dead outside the
    // block; widening to `var` in place preserves every use site.
    in_function(
        "{ let x = 0; x; } let y = 5; y;",
        "{ var x = 0; x; }     x = 5; x;",
    );
}

#[test]
fn lets_in_sibling_blocks() {
    in_function(
        "var x = 0; if (1) { let y = 1; x; } else { let z = 1; x; }",
        "var x = 0; if (1) { var y = 1; x; } else {     y = 1; x; }",
    );

    in_function(
        "var x = 0; if (1) { let y = 1; y; } else { let z = 1 + x; z; }",
        "var x = 0; if (1) {     x = 1; x; } else {     x = 1 + x; x; }",
    );

    in_function(
        "var x = 0; if (1) { let y = 1; y; } else { let z = 1; z; } x;",
        "var x = 0; if (1) { var y = 1; y; } else {     y = 1; y; } x;",
    );

    in_function(
        "if (a) { return a; } else { let b = a; let c = 1; return c; } return a;",
        "if (a) { return a; } else { var b = a;     b = 1; return b; } return a;",
    );
}

#[test]
fn loop_carried_lets_stay_separate() {
    // Folding `y` into `x` would overwrite the value `x` carries into the
    // next iteration.
    same_in_function("let x = 1; for (; 1; ) { x; x = 2; let y = 0; y; }");

    same_in_function("let x = 1; for (; 1; ) { x = 2; x; let y = 0; y; } x;");
}

#[test]
fn let_in_for_head_widens() {
    in_function(
        "for (let x = 1; x < 10; x++) { let y = 2; x + y; } let z = 3;",
        "for (var x = 1; x < 10; x++) { let y = 2; x + y; }     x = 3;",
    );

    in_function(
        "var w = 0; for (let x = 1; x < 10; x++) { let y = 2; x + y; } var z = 3;",
        "var w = 0; for (    w = 1; w < 10; w++) { let y = 2; w + y; }     w = 3;",
    );
}

#[test]
fn captured_loop_lets_are_excluded() {
    same_in_function("let x = 3; for (let z = 1; z < 10; z++) { use(() => { return z; }); }");

    same_in_function("for (let x = 1; x < 10; x++) { use(() => { return x; }); } let z = 3;");
}

#[test]
fn bare_let_in_loop_body_gains_an_initializer() {
    // `let y;` resets the binding each iteration; once widened to `var` the
    // reset has to be spelled out.
    in_function(
        "for (; 1; ) { let y; y = 2; y; let z = 3; z; }",
        "for (; 1; ) { var y = void 0; y = 2; y; y = 3; y; }",
    );
}

#[test]
fn arrow_bodies_widen_their_own_lets() {
    in_function(
        "var x = 1; var y = () => { let z = 0; z; };",
        "var x = 1;     x = () => { let z = 0; z; };",
    );

    in_function(
        "var x = 1; var y = () => { let z = 0; z; }; y();",
        "var x = 1;     x = () => { let z = 0; z; }; x();",
    );

    same_in_function("var x = 1; var y = () => { let z = 0; z; }; x;");

    in_function(
        "var x = () => { let z = 0; let y = 1; y; };",
        "var x = () => { var z = 0;     z = 1; z; };",
    );

    in_function(
        "var x = 1; var y = 2; var f = () => { return x + 1; };",
        "var x = 1; var y = 2;     y = () => { return x + 1; };",
    );
}
