use cdclsat::formula::dimacs::{parse, parse_file, DimacsParseError};
use cdclsat::*;
use clap::{App, Arg};
use log::{error, info, LevelFilter};
use std::fs::OpenOptions;
use std::io::{self, Write};

fn main() {
    let matches = App::new("cdclsat")
        .version(env!("CARGO_PKG_VERSION"))
        .about("CDCL SAT solver for DIMACS CNF benchmarks")
        .arg(
            Arg::with_name("dump-to-file")
                .long("dump-to-file")
                .short("o")
                .value_name("FILE")
                .takes_value(true)
                .help("append models to FILE instead of stdout"),
        )
        .arg(
            Arg::with_name("verbose")
                .long("verbose")
                .short("v")
                .help("trace every decision, propagation and learned clause"),
        )
        .arg(
            Arg::with_name("INPUT")
                .help("input files (in CNF); reads stdin if none")
                .multiple(true)
                .index(1),
        )
        .get_matches();

    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if matches.is_present("verbose") {
        logger.filter_level(LevelFilter::Trace);
    }
    logger.init();

    let dump = matches.value_of("dump-to-file");
    let mut failed = false;

    match matches.values_of("INPUT") {
        Some(paths) => {
            for path in paths {
                if let Err(e) = run(path, parse_file(path), dump) {
                    error!("{}: {}", path, e);
                    failed = true;
                }
            }
        }
        None => {
            if let Err(e) = run("<stdin>", parse(io::stdin()), dump) {
                error!("<stdin>: {}", e);
                failed = true;
            }
        }
    }

    std::process::exit(if failed { 1 } else { 0 });
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Parse(#[from] DimacsParseError),
    #[error("solver failed: {0}")]
    Solver(#[from] SolverError),
    #[error("cannot write model: {0}")]
    Output(#[from] io::Error),
}

fn run(name: &str, formula: Result<Formula, DimacsParseError>, dump: Option<&str>) -> Result<(), RunError> {
    let formula = formula?;
    info!("{}: {} variables, {} clauses", name, formula.num_variables(), formula.clauses().count());

    let mut solver = Solver::new(formula);
    let result = solver.solve()?;
    println!(
        "Benchmark {}: {}",
        name,
        match result {
            SatResult::Satisfiable => "SAT",
            SatResult::Unsatisfiable => "UNSAT",
        }
    );

    if result == SatResult::Satisfiable {
        let model = solver.model();
        match dump {
            Some(file) => {
                let file = OpenOptions::new().create(true).append(true).open(file)?;
                write_model(file, &model)?;
            }
            None => write_model(io::stdout().lock(), &model)?,
        }
    }
    Ok(())
}

fn write_model<W: Write>(mut w: W, model: &[Literal]) -> io::Result<()> {
    let line = model.iter().map(|l| l.to_string()).collect::<Vec<_>>().join(" ");
    writeln!(w, "{}", line)?;
    w.flush()
}
