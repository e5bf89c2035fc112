pub mod formula;
pub mod graph;
pub mod heuristic;
mod solver;

#[cfg(test)]
mod brute_force;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum SatResult {
    Satisfiable,
    Unsatisfiable,
}

pub use formula::dimacs::DimacsParseError;
pub use formula::{Clause, Formula, Literal, Variable};
pub use graph::{DecisionLevel, GraphError, ImplicationGraph, Node};
pub use heuristic::{Heuristic, InputOrder, Lexicographic};
pub use solver::{Solver, SolverError, TrailEntry};
