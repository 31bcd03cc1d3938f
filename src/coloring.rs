//! Greedy graph coloring of the interference graph.
//!
//! Variables are processed by descending conflict count, ties broken by
//! appearance order, and each lands in the first existing class with no edge
//! to any member. The earliest-appearing member of a class is its
//! representative: the name every merged member takes over, so names from
//! earlier in the code win. The order is total, so the partition is
//! identical across runs for identical input.

use crate::interference::InterferenceGraph;
use crate::scope::VarId;
use std::collections::HashMap;

/// A partition of the eligible variables into mutually non-interfering
/// classes. Members are kept in the order coloring assigned them; the
/// representative is the member with the lowest ordinal.
#[derive(Debug, Default)]
pub struct Coloring {
    classes: Vec<Vec<VarId>>,
    class_of: HashMap<VarId, usize>,
}

impl Coloring {
    pub fn classes(&self) -> &[Vec<VarId>] {
        &self.classes
    }

    pub fn class_of(&self, var: VarId) -> Option<usize> {
        self.class_of.get(&var).copied()
    }

    /// The variable whose name the whole class shares: the member that
    /// appears earliest in the source.
    pub fn representative(&self, var: VarId) -> Option<VarId> {
        self.classes[self.class_of(var)?].iter().copied().min()
    }

    pub fn members(&self, var: VarId) -> &[VarId] {
        match self.class_of(var) {
            Some(c) => &self.classes[c],
            None => &[],
        }
    }

    pub fn class_size(&self, var: VarId) -> usize {
        self.members(var).len()
    }

    /// Whether any slot sharing happened at all.
    pub fn merged_any(&self) -> bool {
        self.classes.iter().any(|c| c.len() > 1)
    }
}

/// Partition the graph's variables into color classes.
pub fn color(graph: &InterferenceGraph) -> Coloring {
    let mut order: Vec<VarId> = graph.variables().collect();
    order.sort_by(|a, b| {
        graph
            .degree(*b)
            .cmp(&graph.degree(*a))
            .then_with(|| a.cmp(b))
    });

    let mut coloring = Coloring::default();
    for var in order {
        let fit = coloring
            .classes
            .iter()
            .position(|members| members.iter().all(|&m| !graph.interferes(var, m)));
        match fit {
            Some(class) => {
                coloring.classes[class].push(var);
                coloring.class_of.insert(var, class);
            }
            None => {
                coloring.class_of.insert(var, coloring.classes.len());
                coloring.classes.push(vec![var]);
            }
        }
    }
    log::debug!(
        "colored {} variables into {} classes",
        coloring.class_of.len(),
        coloring.classes.len()
    );
    coloring
}
