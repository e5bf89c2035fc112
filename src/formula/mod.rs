pub mod dimacs;

use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Not;

/// A named boolean unknown. Two variables are the same variable iff they have the same name.
#[derive(Clone, PartialOrd, Ord, PartialEq, Eq, Hash, Debug)]
pub struct Variable(String);

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The variable DIMACS index `k` refers to.
    pub fn numbered(k: usize) -> Self {
        Self(format!("x{}", k))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Literal {
    Positive(Variable),
    Negative(Variable),
}

impl Literal {
    pub fn variable(&self) -> &Variable {
        match self {
            Literal::Positive(v) => v,
            Literal::Negative(v) => v,
        }
    }

    pub fn is_positive(&self) -> bool {
        match self {
            Literal::Positive(_) => true,
            Literal::Negative(_) => false,
        }
    }

    pub fn negated(&self) -> Self {
        match self {
            Literal::Positive(v) => Literal::Negative(v.clone()),
            Literal::Negative(v) => Literal::Positive(v.clone()),
        }
    }

    /// Same variable, opposite polarity.
    pub fn is_complement_of(&self, other: &Literal) -> bool {
        self.variable() == other.variable() && self.is_positive() != other.is_positive()
    }
}

impl Not for Literal {
    type Output = Literal;

    fn not(self) -> Literal {
        match self {
            Literal::Positive(v) => Literal::Negative(v),
            Literal::Negative(v) => Literal::Positive(v),
        }
    }
}

impl Not for &Literal {
    type Output = Literal;

    fn not(self) -> Literal {
        self.negated()
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Literal::Positive(v) => write!(f, "{}", v),
            Literal::Negative(v) => write!(f, "!{}", v),
        }
    }
}

/// A disjunction of literals. Literal order is significant for equality and hashing, and
/// duplicates are kept as given. The empty clause doubles as the "no justification" antecedent
/// of a decision.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Clause {
    literals: Vec<Literal>,
}

impl Clause {
    pub fn new(disjuncts: impl IntoIterator<Item = Literal>) -> Self {
        Self {
            literals: disjuncts.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn literals(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn contains(&self, literal: &Literal) -> bool {
        self.literals.contains(literal)
    }

    /// The literals of this clause with repeated occurrences dropped, in first-occurrence order.
    pub fn distinct_literals(&self) -> Vec<&Literal> {
        let mut seen = HashSet::new();
        self.literals.iter().filter(|l| seen.insert(*l)).collect()
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut first = true;
        for literal in &self.literals {
            if !first {
                f.write_str(" | ")?;
            }
            first = false;
            write!(f, "{}", literal)?;
        }
        Ok(())
    }
}

/// Resolve `c1` with `c2` on `variable`: every literal of either clause except those on
/// `variable`, with duplicates removed. Literals of `c1` come first. Tautologies are not filtered.
pub fn resolve(c1: &Clause, c2: &Clause, variable: &Variable) -> Clause {
    let mut literals: Vec<Literal> = vec![];
    for literal in c1.literals().chain(c2.literals()) {
        if literal.variable() != variable && !literals.contains(literal) {
            literals.push(literal.clone());
        }
    }
    Clause::new(literals)
}

/// A conjunction of clauses, kept in the order they were given.
#[derive(Clone, Debug, Default)]
pub struct Formula {
    clauses: Vec<Clause>,
    next_fresh: usize,
}

impl Formula {
    pub fn new(conjuncts: impl IntoIterator<Item = Clause>) -> Self {
        Self {
            clauses: conjuncts.into_iter().collect(),
            next_fresh: 0,
        }
    }

    pub fn clauses(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    pub fn add_clause(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    /// Distinct variables of the formula in order of first appearance.
    pub fn variables(&self) -> Vec<Variable> {
        let mut seen = HashSet::new();
        let mut variables = vec![];
        for literal in self.clauses.iter().flat_map(|c| c.literals()) {
            if seen.insert(literal.variable()) {
                variables.push(literal.variable().clone());
            }
        }
        variables
    }

    pub fn num_variables(&self) -> usize {
        self.variables().len()
    }

    /// A new anonymous variable `v<n>` that does not occur in the formula yet.
    pub fn fresh_variable(&mut self) -> Variable {
        let used: HashSet<Variable> = self.variables().into_iter().collect();
        loop {
            let candidate = Variable::new(format!("v{}", self.next_fresh));
            self.next_fresh += 1;
            if !used.contains(&candidate) {
                return candidate;
            }
        }
    }

    pub(crate) fn into_clauses(self) -> Vec<Clause> {
        self.clauses
    }
}

/// Two formulas are equal when they hold the same clauses in the same order.
impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        self.clauses == other.clauses
    }
}

impl Eq for Formula {}

impl Hash for Formula {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.clauses.hash(state);
    }
}

impl Display for Formula {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut first_clause = true;
        for clause in &self.clauses {
            if first_clause {
                first_clause = false;
            } else {
                f.write_str(" & ")?;
            }
            if clause.len() > 1 {
                write!(f, "({})", clause)?;
            } else {
                write!(f, "{}", clause)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn p(x: usize) -> Literal {
    Literal::Positive(Variable::numbered(x))
}

#[cfg(test)]
pub(crate) fn n(x: usize) -> Literal {
    Literal::Negative(Variable::numbered(x))
}

/// Random formulas over at most `max_vars` variables (`x1..`), 1-3 literals per clause.
#[cfg(test)]
pub(crate) fn formula_strategy(max_vars: usize, max_clauses: usize) -> impl proptest::strategy::Strategy<Value = Formula> {
    use proptest::prelude::*;

    let literal = (1..=max_vars, any::<bool>()).prop_map(|(x, positive)| if positive { p(x) } else { n(x) });
    let clause = proptest::collection::vec(literal, 1..=3).prop_map(Clause::new);
    proptest::collection::vec(clause, 1..=max_clauses).prop_map(Formula::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of<T: Hash>(t: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        t.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn negation_flips_polarity() {
        assert_eq!(!p(1), n(1));
        assert_eq!(!&n(1), p(1));
        assert!(p(1).is_complement_of(&n(1)));
        assert!(!p(1).is_complement_of(&p(1)));
        assert!(!p(1).is_complement_of(&n(2)));
    }

    #[test]
    fn clause_equality_is_order_sensitive() {
        let c1 = Clause::new(vec![p(1), n(2)]);
        let c2 = Clause::new(vec![p(1), n(2)]);
        let c3 = Clause::new(vec![n(2), p(1)]);
        assert_eq!(c1, c2);
        assert_eq!(hash_of(&c1), hash_of(&c2));
        assert_ne!(c1, c3);
    }

    #[test]
    fn formula_equality_ignores_fresh_counter() {
        let c1 = Clause::new(vec![p(1), n(2)]);
        let c2 = Clause::new(vec![p(3)]);
        let f1 = Formula::new(vec![c1.clone(), c2.clone()]);
        let mut f2 = Formula::new(vec![c1.clone(), c2.clone()]);
        assert_eq!(f1, f2);
        assert_eq!(hash_of(&f1), hash_of(&f2));

        let _ = f2.fresh_variable();
        assert_eq!(f1, f2);
        assert_eq!(hash_of(&f1), hash_of(&f2));

        assert_ne!(f1, Formula::new(vec![c2, c1]));

        let formulas: HashSet<Formula> = vec![f1.clone(), f2].into_iter().collect();
        assert_eq!(formulas.len(), 1);
        assert!(formulas.contains(&f1));
    }

    #[test]
    fn variable_and_literal_hashes_agree_with_equality() {
        assert_eq!(Variable::numbered(4), Variable::new("x4"));
        assert_eq!(hash_of(&Variable::numbered(4)), hash_of(&Variable::new("x4")));
        assert_ne!(Variable::numbered(4), Variable::numbered(40));

        assert_eq!(p(4), Literal::Positive(Variable::new("x4")));
        assert_eq!(hash_of(&n(4)), hash_of(&!p(4)));
        assert_ne!(p(4), n(4));
    }

    #[test]
    fn resolve_drops_variable_and_dedups() {
        let c1 = Clause::new(vec![n(2), n(4), p(5)]);
        let c2 = Clause::new(vec![n(2), n(3), p(4)]);
        let r = resolve(&c1, &c2, &Variable::numbered(4));
        assert_eq!(r, Clause::new(vec![n(2), p(5), n(3)]));
    }

    #[test]
    fn resolve_keeps_tautologies() {
        let c1 = Clause::new(vec![p(1), p(2)]);
        let c2 = Clause::new(vec![n(1), n(2), p(3)]);
        let r = resolve(&c1, &c2, &Variable::numbered(1));
        assert_eq!(r, Clause::new(vec![p(2), n(2), p(3)]));
    }

    #[test]
    fn variables_in_first_appearance_order() {
        let f = Formula::new(vec![Clause::new(vec![p(3), n(1)]), Clause::new(vec![p(1), p(2)])]);
        assert_eq!(
            f.variables(),
            vec![Variable::numbered(3), Variable::numbered(1), Variable::numbered(2)]
        );
    }

    #[test]
    fn fresh_variables_avoid_existing_names() {
        let mut f = Formula::new(vec![Clause::new(vec![Literal::Positive(Variable::new("v0"))])]);
        let a = f.fresh_variable();
        let b = f.fresh_variable();
        assert_eq!(a, Variable::new("v1"));
        assert_eq!(b, Variable::new("v2"));
    }

    #[test]
    fn display() {
        let f = Formula::new(vec![Clause::new(vec![p(1), n(2)]), Clause::new(vec![n(1)])]);
        assert_eq!(format!("{}", f), "(x1 | !x2) & !x1");
    }

    proptest::proptest! {
        #[test]
        fn resolution_excludes_pivot(c1 in formula_strategy(4, 1), c2 in formula_strategy(4, 1), x in 1..=4usize) {
            let c1 = c1.clauses().next().unwrap().clone();
            let c2 = c2.clauses().next().unwrap().clone();
            let v = Variable::numbered(x);
            let r = resolve(&c1, &c2, &v);
            proptest::prop_assert!(r.literals().all(|l| l.variable() != &v));
            for l in c1.literals().chain(c2.literals()).filter(|l| l.variable() != &v) {
                proptest::prop_assert!(r.contains(l));
            }
            proptest::prop_assert_eq!(r.distinct_literals().len(), r.len());
        }
    }
}
