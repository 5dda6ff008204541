use super::{cli_manager, command::Command, common};
use anyhow::{anyhow, Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use log::info;
use schedsat::{
    io::ScheduleWriter,
    solvers::{ScheduleSolver, SolverOptions},
};
use std::time::Duration;

const CMD_NAME: &str = "solve";

const ARG_ALL: &str = "ALL";
const ARG_OPTIMAL_ONLY: &str = "OPTIMAL_ONLY";
const ARG_NO_EXPLAIN: &str = "NO_EXPLAIN";
const ARG_NO_OPTIMIZE: &str = "NO_OPTIMIZE";
const ARG_TIME_LIMIT: &str = "TIME_LIMIT";
const ARG_SYMMETRY_BREAKING: &str = "SYMMETRY_BREAKING";
const ARG_ALL_OR_NOTHING: &str = "ALL_OR_NOTHING";

pub(crate) struct SolveCommand;

impl SolveCommand {
    pub(crate) fn new() -> Self {
        SolveCommand
    }
}

impl<'a> Command<'a> for SolveCommand {
    fn name(&self) -> &str {
        CMD_NAME
    }

    fn clap_subcommand(&self) -> App<'a, 'a> {
        SubCommand::with_name(CMD_NAME)
            .about("Solves a scheduling problem")
            .setting(AppSettings::DisableVersion)
            .arg(common::input_args())
            .arg(
                Arg::with_name(ARG_ALL)
                    .long("all")
                    .help("enumerate all the models instead of a single one"),
            )
            .arg(
                Arg::with_name(ARG_OPTIMAL_ONLY)
                    .long("optimal-only")
                    .requires(ARG_ALL)
                    .help("only enumerate the models of minimal cost"),
            )
            .arg(
                Arg::with_name(ARG_ALL_OR_NOTHING)
                    .long("all-or-nothing")
                    .requires(ARG_ALL)
                    .help("fail instead of returning a partial enumeration"),
            )
            .arg(
                Arg::with_name(ARG_NO_EXPLAIN)
                    .long("no-explain")
                    .help("do not compute an explanation when there is no model"),
            )
            .arg(
                Arg::with_name(ARG_NO_OPTIMIZE)
                    .long("no-optimize")
                    .help("return the first model found without minimizing its cost"),
            )
            .arg(
                Arg::with_name(ARG_SYMMETRY_BREAKING)
                    .long("symmetry-breaking")
                    .help("skip the rule instantiations which are symmetric to other ones"),
            )
            .arg(
                Arg::with_name(ARG_TIME_LIMIT)
                    .long("time-limit")
                    .empty_values(false)
                    .multiple(false)
                    .help("the time limit of each SAT solver call, in seconds")
                    .required(false),
            )
            .args(&common::external_sat_solver_args())
            .arg(cli_manager::logging_level_cli_arg())
    }

    fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()> {
        let problem = common::read_input_problem(arg_matches)?;
        let options = read_solver_options(arg_matches)?;
        info!("solver options: {:?}", options);
        let mut solver = ScheduleSolver::new_with_sat_solver_factory(
            &problem,
            options,
            common::create_sat_solver_factory(arg_matches)?,
        );
        let writer = ScheduleWriter::default();
        let mut out = std::io::stdout();
        if arg_matches.is_present(ARG_ALL) {
            let enumeration = solver
                .enumerate_all(arg_matches.is_present(ARG_OPTIMAL_ONLY))
                .context("while enumerating the models")?;
            info!("found {} model(s)", enumeration.models().len());
            writer.write_enumeration(&mut out, &enumeration)
        } else {
            let outcome = solver.solve().context("while solving the problem")?;
            writer.write_outcome(&mut out, &outcome)
        }
    }
}

fn read_solver_options(arg_matches: &ArgMatches<'_>) -> Result<SolverOptions> {
    Ok(SolverOptions {
        time_limit: arg_matches
            .value_of(ARG_TIME_LIMIT)
            .map(parse_time_limit)
            .transpose()?,
        explain: !arg_matches.is_present(ARG_NO_EXPLAIN),
        optimize: !arg_matches.is_present(ARG_NO_OPTIMIZE),
        all_or_nothing: arg_matches.is_present(ARG_ALL_OR_NOTHING),
        symmetry_breaking: arg_matches.is_present(ARG_SYMMETRY_BREAKING),
    })
}

fn parse_time_limit(s: &str) -> Result<Duration> {
    let seconds = s
        .parse::<f64>()
        .with_context(|| format!(r#"while parsing the time limit "{}""#, s))?;
    if !seconds.is_finite() || seconds <= 0. {
        return Err(anyhow!("the time limit must be a positive number of seconds"));
    }
    Duration::try_from_secs_f64(seconds)
        .with_context(|| format!(r#"while converting the time limit "{}""#, s))
}
