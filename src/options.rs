//! Pass configuration.

use serde::{Deserialize, Serialize};

/// Ceiling on the number of variables a function may declare and still be
/// analyzed. Functions above the ceiling are left untouched; the dataflow
/// cost grows quadratically with the variable count.
pub const DEFAULT_MAX_ANALYZED_VARS: usize = 100;

/// Language target the surrounding compiler emits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputTarget {
    /// Pre-ES5 hosts. Functions with exactly two parameters keep both
    /// parameter slots to themselves: some legacy engines miscompile writes
    /// to the parameters of two-argument callbacks (the array-sort bug), so
    /// no local may reuse either slot.
    Legacy,
    /// ES5 and later; no parameter work-around needed.
    Standard,
}

/// Configuration for the coalescing pass, threaded explicitly through every
/// stage so tests can exercise the boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoalesceOptions {
    /// Rename merged variables to a combined name (`x_y`) instead of reusing
    /// the representative's name. Debug aid only; output is larger.
    pub use_pseudo_names: bool,
    pub output_target: OutputTarget,
    /// Functions declaring more variables than this are skipped whole.
    pub max_analyzed_vars: usize,
}

impl Default for CoalesceOptions {
    fn default() -> Self {
        CoalesceOptions {
            use_pseudo_names: false,
            output_target: OutputTarget::Standard,
            max_analyzed_vars: DEFAULT_MAX_ANALYZED_VARS,
        }
    }
}
