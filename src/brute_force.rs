use crate::*;
use std::collections::HashMap;

// Simple truth-table oracle for checking the solver in tests
pub(crate) fn solve_brute_force(f: &Formula) -> SatResult {
    let variables = f.variables();
    assert!(variables.len() <= 16); // just for safety
    let index: HashMap<&Variable, usize> = variables.iter().enumerate().map(|(i, v)| (v, i)).collect();

    fn assignment_for(assignment: u32, x: usize) -> bool {
        assignment & (1 << x) == 0
    }

    'search: for assignment in 0..2u32.pow(variables.len() as u32) {
        'clauses: for clause in f.clauses() {
            for literal in clause.literals() {
                if assignment_for(assignment, index[literal.variable()]) == literal.is_positive() {
                    // this clause is satisfied, let's go to the next one
                    continue 'clauses;
                }
            }
            // if we got here, this clause was not satisfied, so this assignment is bogus
            continue 'search;
        }
        // if we got here, every clause was satisfied, so we're done and satisfiable
        return SatResult::Satisfiable;
    }
    // no assignment is valid
    SatResult::Unsatisfiable
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::{n, p};

    #[test]
    fn brute_force_sat() {
        let c1 = Clause::new(vec![p(0), p(1)]);
        let c2 = Clause::new(vec![n(0)]);
        let f = Formula::new(vec![c1, c2]);

        assert_eq!(solve_brute_force(&f), SatResult::Satisfiable);
    }

    #[test]
    fn brute_force_unsat() {
        let c1 = Clause::new(vec![p(0), p(1)]);
        let c2 = Clause::new(vec![n(0)]);
        let c3 = Clause::new(vec![n(1)]);
        let f = Formula::new(vec![c1, c2, c3]);

        assert_eq!(solve_brute_force(&f), SatResult::Unsatisfiable);
    }

    #[test]
    fn brute_force_empty_clause() {
        let f = Formula::new(vec![Clause::empty()]);
        assert_eq!(solve_brute_force(&f), SatResult::Unsatisfiable);
        assert_eq!(solve_brute_force(&Formula::default()), SatResult::Satisfiable);
    }
}
