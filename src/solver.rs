use crate::formula::{resolve, Clause, Formula, Literal, Variable};
use crate::graph::{DecisionLevel, GraphError, ImplicationGraph, Node};
use crate::heuristic::{Heuristic, Lexicographic};
use crate::SatResult;
use log::{debug, trace};
use std::collections::HashSet;
use thiserror::Error;

/// One assignment on the trail. Decisions carry the empty clause as their antecedent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailEntry {
    pub literal: Literal,
    pub antecedent: Clause,
    pub level: DecisionLevel,
}

impl TrailEntry {
    pub fn is_decision(&self) -> bool {
        self.antecedent.is_empty()
    }
}

/// The solver's internal bookkeeping was found inconsistent. Never expected in practice.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("none of the literals of clause ({0}) is assigned")]
    UnassignedClause(Clause),
    #[error("variable {0} is not on the trail")]
    UnassignedVariable(Variable),
    #[error("variable {0} was decided and has no antecedent to resolve with")]
    MissingAntecedent(Variable),
    #[error("{0} cannot be a unique implication point")]
    InvalidUip(Node),
    #[error("conflict analysis produced the empty clause")]
    EmptyLearnedClause,
    #[error("backtracking removed {graph} graph nodes but {trail} trail entries")]
    BacktrackMismatch { graph: usize, trail: usize },
}

/// How a clause stands under the current trail.
#[derive(Debug, PartialEq, Eq)]
enum ClauseStatus<'a> {
    Satisfied,
    Conflict,
    Unit(&'a Literal),
    Unresolved,
}

fn classify<'a>(clause: &'a Clause, assigned: &HashSet<&Literal>) -> ClauseStatus<'a> {
    let mut unresolved: Vec<&Literal> = vec![];
    for literal in clause.literals() {
        if assigned.contains(literal) {
            return ClauseStatus::Satisfied;
        }
        if assigned.contains(&literal.negated()) || unresolved.contains(&literal) {
            continue;
        }
        unresolved.push(literal);
    }
    match unresolved.len() {
        0 => ClauseStatus::Conflict,
        1 => ClauseStatus::Unit(unresolved[0]),
        _ => ClauseStatus::Unresolved,
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum BcpResult {
    Conflict,
    NoConflict,
}

enum Propagation {
    Conflict(Clause),
    Unit(Literal, Clause),
}

pub struct Solver {
    clauses: Vec<Clause>,
    learned: Vec<Clause>,
    trail: Vec<TrailEntry>,
    unassigned: Vec<Variable>,
    decision_level: DecisionLevel,
    graph: ImplicationGraph,
    heuristic: Box<dyn Heuristic>,
}

impl Solver {
    pub fn new(formula: Formula) -> Self {
        Self::with_heuristic(formula, Box::new(Lexicographic))
    }

    pub fn with_heuristic(formula: Formula, heuristic: Box<dyn Heuristic>) -> Self {
        Self {
            unassigned: formula.variables(),
            clauses: formula.into_clauses(),
            learned: vec![],
            trail: vec![],
            decision_level: DecisionLevel(0),
            graph: ImplicationGraph::new(),
            heuristic,
        }
    }

    /// Run CDCL search to completion. An `Err` means the solver's own invariants broke; it is
    /// never a verdict.
    pub fn solve(&mut self) -> Result<SatResult, SolverError> {
        loop {
            while let BcpResult::Conflict = self.bcp()? {
                match self.analyze_conflict()? {
                    None => {
                        debug!("conflict at level 0, unsatisfiable");
                        return Ok(SatResult::Unsatisfiable);
                    }
                    Some(level) => self.backtrack(level)?,
                }
            }
            if !self.decide()? {
                debug!("all variables assigned, satisfiable");
                return Ok(SatResult::Satisfiable);
            }
        }
    }

    /// The trail literals in chronological order. A model once `solve` returned satisfiable.
    pub fn model(&self) -> Vec<Literal> {
        self.trail.iter().map(|e| e.literal.clone()).collect()
    }

    pub fn trail(&self) -> &[TrailEntry] {
        &self.trail
    }

    pub fn learned_clauses(&self) -> &[Clause] {
        &self.learned
    }

    pub fn decision_level(&self) -> DecisionLevel {
        self.decision_level
    }

    pub fn implication_graph(&self) -> &ImplicationGraph {
        &self.graph
    }

    /// Unit-propagate to a fixpoint, learned clauses first. Stops at the first falsified clause.
    fn bcp(&mut self) -> Result<BcpResult, SolverError> {
        loop {
            let next = {
                let assigned: HashSet<&Literal> = self.trail.iter().map(|e| &e.literal).collect();
                self.learned
                    .iter()
                    .chain(self.clauses.iter())
                    .find_map(|clause| match classify(clause, &assigned) {
                        ClauseStatus::Satisfied | ClauseStatus::Unresolved => None,
                        ClauseStatus::Conflict => Some(Propagation::Conflict(clause.clone())),
                        ClauseStatus::Unit(l) => Some(Propagation::Unit(l.clone(), clause.clone())),
                    })
            };
            match next {
                None => return Ok(BcpResult::NoConflict),
                Some(Propagation::Conflict(clause)) => {
                    self.record_conflict(&clause)?;
                    return Ok(BcpResult::Conflict);
                }
                Some(Propagation::Unit(literal, clause)) => self.propagate(literal, clause)?,
            }
        }
    }

    fn propagate(&mut self, literal: Literal, clause: Clause) -> Result<(), SolverError> {
        trace!("implied {} by ({}) at level {}", literal, clause, self.decision_level);
        let tail = Node::new(literal.clone(), self.decision_level);
        let mut justified = false;
        for other in clause.distinct_literals() {
            if *other == literal {
                continue;
            }
            let head = self.graph.node_of_literal(&other.negated())?;
            self.graph.add_edge(&head, &tail, &clause)?;
            justified = true;
        }
        if self.decision_level == DecisionLevel(0) || !justified {
            self.graph.add_edge(&Node::Root, &tail, &clause)?;
        }
        self.unassigned.retain(|v| v != literal.variable());
        self.trail.push(TrailEntry {
            literal,
            antecedent: clause,
            level: self.decision_level,
        });
        Ok(())
    }

    fn record_conflict(&mut self, clause: &Clause) -> Result<(), SolverError> {
        trace!("conflict on ({}) at level {}", clause, self.decision_level);
        for literal in clause.distinct_literals() {
            let node = self.graph.node_of_literal(&literal.negated())?;
            self.graph.add_conflict_edge(&node, clause)?;
        }
        Ok(())
    }

    fn decide(&mut self) -> Result<bool, SolverError> {
        match self.heuristic.choose(&self.unassigned) {
            Some(literal) => {
                self.decide_literal(literal)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn decide_literal(&mut self, literal: Literal) -> Result<(), SolverError> {
        self.decision_level = self.decision_level.next();
        trace!("decision {} at level {}", literal, self.decision_level);
        self.unassigned.retain(|v| v != literal.variable());
        self.graph.add_decision_node(literal.clone(), self.decision_level)?;
        self.trail.push(TrailEntry {
            literal,
            antecedent: Clause::empty(),
            level: self.decision_level,
        });
        Ok(())
    }

    /// Learn a clause from the current conflict and return the level to backtrack to, or `None`
    /// if the conflict happened at level 0.
    fn analyze_conflict(&mut self) -> Result<Option<DecisionLevel>, SolverError> {
        if self.decision_level == DecisionLevel(0) {
            return Ok(None);
        }

        let mut clause = self.graph.current_conflict_clause()?.clone();
        let uip = self.graph.get_first_uip(self.decision_level)?;
        trace!("first UIP is {}", uip);

        while !self.stop_criterion_met(&clause, &uip)? {
            let literal = self.last_assigned_literal(&clause)?;
            let antecedent = self.antecedent_clause(literal.variable())?;
            if antecedent.is_empty() {
                return Err(SolverError::MissingAntecedent(literal.variable().clone()));
            }
            let resolvent = resolve(&clause, antecedent, literal.variable());
            trace!("resolved ({}) with ({}) on {}: ({})", clause, antecedent, literal.variable(), resolvent);
            clause = resolvent;
        }

        let level = self.backtrack_level(&clause)?;
        debug!("learned ({}), backtracking to level {}", clause, level);
        self.learned.push(clause);
        Ok(Some(level))
    }

    /// The clause has exactly one literal at the UIP's level, and that literal is the UIP negated.
    fn stop_criterion_met(&self, clause: &Clause, uip: &Node) -> Result<bool, SolverError> {
        let uip_literal = uip.literal().ok_or_else(|| SolverError::InvalidUip(uip.clone()))?;
        let mut count = 0;
        for literal in clause.distinct_literals() {
            if self.graph.get_decision_level_of_literal(literal)? == uip.level() {
                count += 1;
            }
        }
        Ok(count == 1 && clause.contains(&uip_literal.negated()))
    }

    /// The literal of `clause` whose variable was assigned most recently.
    fn last_assigned_literal(&self, clause: &Clause) -> Result<Literal, SolverError> {
        self.trail
            .iter()
            .rev()
            .find_map(|entry| clause.literals().find(|l| l.variable() == entry.literal.variable()))
            .cloned()
            .ok_or_else(|| SolverError::UnassignedClause(clause.clone()))
    }

    fn antecedent_clause(&self, variable: &Variable) -> Result<&Clause, SolverError> {
        self.trail
            .iter()
            .find(|entry| entry.literal.variable() == variable)
            .map(|entry| &entry.antecedent)
            .ok_or_else(|| SolverError::UnassignedVariable(variable.clone()))
    }

    /// Second-highest decision level among the clause's literals, 0 for a unit clause.
    fn backtrack_level(&self, clause: &Clause) -> Result<DecisionLevel, SolverError> {
        let mut levels = clause
            .distinct_literals()
            .into_iter()
            .map(|l| self.graph.get_decision_level_of_literal(l))
            .collect::<Result<Vec<_>, _>>()?;
        levels.sort();
        match levels.len() {
            0 => Err(SolverError::EmptyLearnedClause),
            1 => Ok(DecisionLevel(0)),
            len => Ok(levels[len - 2]),
        }
    }

    /// Undo every assignment above `level`. The graph and the trail must drop the same
    /// assignments.
    fn backtrack(&mut self, level: DecisionLevel) -> Result<(), SolverError> {
        let removed = self.graph.backtrack(level)?;
        let before = self.trail.len();
        let mut kept = Vec::with_capacity(before);
        for entry in self.trail.drain(..) {
            if entry.level > level {
                self.unassigned.push(entry.literal.variable().clone());
            } else {
                kept.push(entry);
            }
        }
        self.trail = kept;
        let dropped = before - self.trail.len();
        if removed.len() != dropped {
            return Err(SolverError::BacktrackMismatch {
                graph: removed.len(),
                trail: dropped,
            });
        }
        debug!(
            "backtrack: level {} -> {}, dropped {} assignments",
            self.decision_level, level, dropped
        );
        self.decision_level = level;
        trace!("implication graph after backtrack:\n{}", self.graph);
        Ok(())
    }
}
