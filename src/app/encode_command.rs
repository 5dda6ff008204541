use super::{cli_manager, command::Command, common};
use anyhow::{anyhow, Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use log::info;
use schedsat::{
    encodings::{CompiledProblem, ConstraintCompiler},
    error::SchedError,
    instantiation::SymmetryBreaking,
    model::{Labeled, Problem},
    sat::{BufferedSatSolver, DimacsInstanceRead},
};
use std::{cell::RefCell, fmt::Write as _, fs, io::Read, rc::Rc};

const CMD_NAME: &str = "encode";

const ARG_OUT: &str = "OUT";
const ARG_SYMMETRY_BREAKING: &str = "SYMMETRY_BREAKING";

pub(crate) struct EncodeCommand;

impl EncodeCommand {
    pub(crate) fn new() -> Self {
        EncodeCommand
    }
}

impl<'a> Command<'a> for EncodeCommand {
    fn name(&self) -> &str {
        CMD_NAME
    }

    fn clap_subcommand(&self) -> App<'a, 'a> {
        SubCommand::with_name(CMD_NAME)
            .about("Writes the SAT encoding of a scheduling problem in the DIMACS format")
            .setting(AppSettings::DisableVersion)
            .arg(common::input_args())
            .arg(
                Arg::with_name(ARG_OUT)
                    .short("o")
                    .long("output")
                    .empty_values(false)
                    .multiple(false)
                    .help("the output file for the encoding")
                    .required(false),
            )
            .arg(
                Arg::with_name(ARG_SYMMETRY_BREAKING)
                    .long("symmetry-breaking")
                    .help("skip the rule instantiations which are symmetric to other ones"),
            )
            .arg(cli_manager::logging_level_cli_arg())
    }

    fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()> {
        let problem = common::read_input_problem(arg_matches)?;
        let compiler = if arg_matches.is_present(ARG_SYMMETRY_BREAKING) {
            ConstraintCompiler::new_with_viability_predicate(
                &problem,
                Box::new(SymmetryBreaking::default()),
            )
        } else {
            ConstraintCompiler::new(&problem)
        };
        let instance = Rc::new(RefCell::new(Vec::new()));
        let mut compiled = compiler
            .compile(Box::new(capturing_solver(Rc::clone(&instance))))
            .context("while compiling the problem")?;
        let selectors = compiled.selector_literals();
        compiled
            .encoder_mut()
            .solve_under_assumptions(&selectors)
            .context("while writing the encoding")?;
        info!(
            "the encoding has {} variable(s) and {} clause(s)",
            compiled.encoder().n_vars(),
            compiled.encoder().n_clauses() + selectors.len()
        );
        let mut content = legend(&problem, &compiled);
        let dimacs = String::from_utf8(instance.take())
            .map_err(|_| anyhow!("the encoding is not valid UTF-8"))?;
        content.push_str(&dimacs);
        match arg_matches.value_of(ARG_OUT) {
            Some(output_file) => fs::write(output_file, content)
                .with_context(|| format!(r#"while writing file "{}""#, output_file)),
            None => {
                print!("{}", content);
                Ok(())
            }
        }
    }
}

/// A solver which copies the instance it is given and never decides it.
fn capturing_solver(instance: Rc<RefCell<Vec<u8>>>) -> BufferedSatSolver {
    BufferedSatSolver::new(Box::new(move |mut r: DimacsInstanceRead| {
        r.read_to_end(&mut instance.borrow_mut())
            .map_err(|e| SchedError::BackendFailure(e.to_string()))?;
        Ok(Box::new(std::io::empty()) as Box<dyn Read>)
    }))
}

/// Comment lines mapping literals to the assignments, assertions and soft terms of the problem.
fn legend(problem: &Problem, compiled: &CompiledProblem) -> String {
    let mut legend = String::new();
    for a in problem.assignments().iter() {
        let _ = writeln!(
            legend,
            "c fulfilled {} {}",
            a.label(),
            compiled.fulfillment_literal(a.id())
        );
    }
    for (lit, tag) in compiled.selectors() {
        let _ = writeln!(legend, "c selector {} {}", lit, tag);
    }
    for (weight, lit) in compiled.soft_terms() {
        let _ = writeln!(legend, "c soft {} {}", weight, lit);
    }
    legend
}
