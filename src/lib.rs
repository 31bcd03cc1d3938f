//! varcoalesce: function-local variable coalescing for a minifying compiler
//!
//! Reuses variable names where live ranges allow it: from
//! `var x = 1; print(x); var y = 2; print(y)` to
//! `var x = 1; print(x); x = 2; print(x)`. Fewer distinct bindings means
//! shorter output and better downstream renaming.
//!
//! The pass works like a register allocator: a backward liveness analysis
//! over the function's CFG, an interference graph between variables that are
//! alive at overlapping times, and a deterministic greedy coloring that
//! assigns non-interfering variables to a shared slot. The rewrite is purely
//! local to one function and never changes program behavior.

pub mod ast;
pub mod cfg;
pub mod coloring;
pub mod error;
pub mod escape;
pub mod interference;
pub mod liveness;
pub mod options;
pub mod pass;
pub mod rewrite;
pub mod scope;

pub use error::{Error, Result};
pub use options::{CoalesceOptions, OutputTarget, DEFAULT_MAX_ANALYZED_VARS};
pub use pass::{coalesce_function, coalesce_function_with_escapes, coalesce_program};

// Re-export commonly used types
pub use ast::{Function, Program};
pub use cfg::Cfg;
pub use coloring::Coloring;
pub use interference::InterferenceGraph;
pub use scope::{FunctionScope, VarId};
