use crate::formula::{Clause, Formula, Literal, Variable};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;

/// Parse a DIMACS CNF problem. Variable `k` becomes the variable named `x<k>`.
///
/// Clauses may span lines; each `0` closes one. A line starting with `%` ends the input.
pub fn parse<R: Read>(reader: R) -> Result<Formula, DimacsParseError> {
    let reader = BufReader::new(reader);

    let mut formula = Formula::default();
    let mut seen_problem_line = false;
    let mut pending = vec![];

    for line in reader.lines() {
        let line = line?;
        let mut line = line.split_whitespace().peekable();
        let first = line.peek().copied();

        match first {
            None => continue,
            Some(s) if s.starts_with('c') => continue,
            Some(s) if s.starts_with('%') => break,
            Some("p") => {
                let _ = line.next();

                if line.next() != Some("cnf") {
                    return Err(DimacsParseError::Format("missing 'cnf'".into()));
                }

                let _num_variables = line
                    .next()
                    .and_then(|c| c.parse::<usize>().ok())
                    .ok_or_else(|| DimacsParseError::Format("invalid num_variables".into()))?;
                let _num_clauses = line
                    .next()
                    .and_then(|c| c.parse::<usize>().ok())
                    .ok_or_else(|| DimacsParseError::Format("invalid num_clauses".into()))?;
                seen_problem_line = true;
            }
            Some(_) => {
                if !seen_problem_line {
                    return Err(DimacsParseError::Format("missing 'p' line before clauses".into()));
                }

                for x in line {
                    match parse_literal(x)? {
                        Some(l) => pending.push(l),
                        None => formula.add_clause(Clause::new(pending.drain(..))),
                    }
                }
            }
        }
    }

    if !seen_problem_line {
        return Err(DimacsParseError::Format("missing 'p' line".into()));
    }
    if !pending.is_empty() {
        formula.add_clause(Clause::new(pending));
    }

    Ok(formula)
}

pub fn parse_file(path: impl AsRef<Path>) -> Result<Formula, DimacsParseError> {
    let file = File::open(path)?;
    parse(file)
}

fn parse_literal(s: &str) -> Result<Option<Literal>, DimacsParseError> {
    let l = s
        .parse::<isize>()
        .map_err(|_| DimacsParseError::Format(format!("invalid literal '{}'", s)))?;
    if l > 0 {
        Ok(Some(Literal::Positive(Variable::numbered(l as usize))))
    } else if l < 0 {
        Ok(Some(Literal::Negative(Variable::numbered(l.unsigned_abs()))))
    } else {
        Ok(None)
    }
}

#[derive(Debug, Error)]
pub enum DimacsParseError {
    #[error("cannot read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed DIMACS input: {0}")]
    Format(String),
}
