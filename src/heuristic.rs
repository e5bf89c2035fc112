use crate::formula::{Formula, Literal, Variable};
use std::collections::HashMap;

/// Picks the next variable to branch on, returned as a positive literal.
pub trait Heuristic {
    /// Choose one of `unassigned`, or `None` if it is empty. Must be deterministic.
    fn choose(&mut self, unassigned: &[Variable]) -> Option<Literal>;
}

/// Branch on the unassigned variable whose name sorts first.
#[derive(Debug, Default, Clone, Copy)]
pub struct Lexicographic;

impl Heuristic for Lexicographic {
    fn choose(&mut self, unassigned: &[Variable]) -> Option<Literal> {
        unassigned.iter().min().cloned().map(Literal::Positive)
    }
}

/// Branch on the unassigned variable that appears first in the formula.
#[derive(Debug, Clone)]
pub struct InputOrder {
    rank: HashMap<Variable, usize>,
}

impl InputOrder {
    pub fn new(formula: &Formula) -> Self {
        let rank = formula
            .variables()
            .into_iter()
            .enumerate()
            .map(|(i, v)| (v, i))
            .collect();
        Self { rank }
    }
}

impl Heuristic for InputOrder {
    fn choose(&mut self, unassigned: &[Variable]) -> Option<Literal> {
        unassigned
            .iter()
            .min_by_key(|v| (self.rank.get(*v).copied().unwrap_or(usize::MAX), *v))
            .cloned()
            .map(Literal::Positive)
    }
}
