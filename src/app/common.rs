use super::{
    app_helper::AppHelper, command::Command, CheckCommand, EncodeCommand, SolveCommand,
};
use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgMatches};
use log::{debug, info, warn};
use schedsat::{
    io::ProblemReader,
    model::Problem,
    sat::{
        DefaultSatSolverFactory, ExternalSatSolverFactory, SatSolverFactory, SolvingListener,
        SolvingResult,
    },
};
use std::{
    cell::Cell,
    fs::{self, File},
    io::{BufReader, Read},
    path::PathBuf,
    time::Instant,
};

pub(crate) fn create_app_helper() -> AppHelper<'static> {
    let app_name = option_env!("CARGO_PKG_NAME").unwrap_or("unknown app name");
    let app_version = option_env!("CARGO_PKG_VERSION").unwrap_or("unknown version");
    let authors = option_env!("CARGO_PKG_AUTHORS").unwrap_or("unknown authors");
    let mut app = AppHelper::new(
        app_name,
        app_version,
        authors,
        "Schedsat, a SAT-based solver for component-to-slot scheduling problems.",
    );
    let commands: Vec<Box<dyn Command>> = vec![
        Box::new(CheckCommand::new()),
        Box::new(EncodeCommand::new()),
        Box::new(SolveCommand::new()),
    ];
    for c in commands {
        app.add_command(c);
    }
    app
}

pub(crate) const ARG_INPUT: &str = "INPUT";

pub(crate) fn input_args() -> Arg<'static, 'static> {
    Arg::with_name(ARG_INPUT)
        .short("f")
        .empty_values(false)
        .multiple(false)
        .help("the input file that contains the scheduling problem")
        .required(true)
}

pub(crate) fn read_input_problem(arg_matches: &ArgMatches<'_>) -> Result<Problem> {
    let file_path = arg_matches
        .value_of(ARG_INPUT)
        .ok_or_else(|| anyhow!("missing input file"))?;
    let mut reader = ProblemReader::default();
    reader.add_warning_handler(Box::new(|line, msg| warn!("at line {}: {}", line, msg)));
    let problem = read_file_path_with(file_path, &|r| reader.read(r))?;
    info!(
        "the problem has {} component(s), {} assignment(s) and {} rule(s)",
        problem.components().len(),
        problem.assignments().len(),
        problem.rules().len(),
    );
    Ok(problem)
}

pub(crate) fn read_file_path_with<F, R>(file_path: &str, reader: &F) -> Result<R>
where
    F: Fn(&mut dyn Read) -> Result<R>,
{
    let canonicalized = canonicalize_file_path(file_path)?;
    info!("reading input file {:?}", canonicalized);
    let file = File::open(&canonicalized)
        .with_context(|| format!(r#"while opening file "{}""#, file_path))?;
    let mut file_reader = BufReader::new(file);
    (reader)(&mut file_reader)
}

/// Canonicalize a path given by the user.
pub(crate) fn canonicalize_file_path(file_path: &str) -> Result<PathBuf> {
    fs::canonicalize(PathBuf::from(file_path))
        .with_context(|| format!(r#"while opening file "{}""#, file_path))
}

const ARG_EXTERNAL_SAT_SOLVER: &str = "EXTERNAL_SAT_SOLVER";
const ARG_EXTERNAL_SAT_SOLVER_OPTIONS: &str = "EXTERNAL_SAT_SOLVER_OPTIONS";

pub(crate) fn external_sat_solver_args() -> Vec<Arg<'static, 'static>> {
    vec![
        Arg::with_name(ARG_EXTERNAL_SAT_SOLVER)
            .long("external-sat-solver")
            .empty_values(false)
            .multiple(false)
            .help("a path to an external SAT solver to replace the embedded one")
            .required(false),
        Arg::with_name(ARG_EXTERNAL_SAT_SOLVER_OPTIONS)
            .long("external-sat-solver-opt")
            .requires(ARG_EXTERNAL_SAT_SOLVER)
            .empty_values(false)
            .multiple(true)
            .number_of_values(1)
            .allow_hyphen_values(true)
            .help("an option to give to the external SAT solver")
            .required(false),
    ]
}

pub(crate) fn create_sat_solver_factory(
    arg_matches: &ArgMatches<'_>,
) -> Result<Box<dyn SatSolverFactory>> {
    let listener_factory = || Box::new(|| {
        Box::<SatSolvingLogger>::default() as Box<dyn SolvingListener>
    });
    if let Some(s) = arg_matches.value_of(ARG_EXTERNAL_SAT_SOLVER) {
        let path = canonicalize_file_path(s)?;
        let program = path
            .to_str()
            .ok_or_else(|| anyhow!("the path to the external SAT solver is not valid UTF-8"))?
            .to_string();
        let options = arg_matches
            .values_of(ARG_EXTERNAL_SAT_SOLVER_OPTIONS)
            .map(|v| v.map(|o| o.to_string()).collect::<Vec<String>>())
            .unwrap_or_default();
        info!("using {:?} as the SAT solver", path);
        let mut factory = ExternalSatSolverFactory::new(program, options);
        factory.add_solver_listener(listener_factory());
        Ok(Box::new(factory))
    } else {
        info!("using the default SAT solver");
        let mut factory = DefaultSatSolverFactory::default();
        factory.add_solver_listener(listener_factory());
        Ok(Box::new(factory))
    }
}

/// Logs the calls to a SAT solver, with their durations.
#[derive(Default)]
struct SatSolvingLogger {
    n_calls: Cell<usize>,
    start: Cell<Option<Instant>>,
}

impl SolvingListener for SatSolvingLogger {
    fn solving_start(&self, n_vars: usize, n_clauses: usize) {
        self.n_calls.set(self.n_calls.get() + 1);
        self.start.set(Some(Instant::now()));
        debug!(
            "SAT solver call #{} on {} variable(s) and {} clause(s)",
            self.n_calls.get(),
            n_vars,
            n_clauses
        );
    }

    fn solving_end(&self, result: &SolvingResult) {
        let r = match result {
            SolvingResult::Satisfiable(_) => "SAT",
            SolvingResult::Unsatisfiable => "UNSAT",
            SolvingResult::Unknown => "UNKNOWN",
        };
        match self.start.take() {
            Some(t) => debug!(
                "SAT solver call #{} returned {} after {:?}",
                self.n_calls.get(),
                r,
                t.elapsed()
            ),
            None => debug!("SAT solver call #{} returned {}", self.n_calls.get(), r),
        }
    }
}
