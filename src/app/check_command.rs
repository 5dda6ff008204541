use super::{cli_manager, command::Command, common};
use anyhow::Result;
use clap::{App, AppSettings, ArgMatches, SubCommand};
use log::info;
use schedsat::{
    instantiation::InstantiationEngine,
    model::{Labeled, Problem},
};

const CMD_NAME: &str = "check";

pub(crate) struct CheckCommand;

impl CheckCommand {
    pub(crate) fn new() -> Self {
        CheckCommand
    }
}

impl<'a> Command<'a> for CheckCommand {
    fn name(&self) -> &str {
        CMD_NAME
    }

    fn clap_subcommand(&self) -> App<'a, 'a> {
        SubCommand::with_name(CMD_NAME)
            .about("Checks a scheduling problem file for errors")
            .setting(AppSettings::DisableVersion)
            .arg(common::input_args())
            .arg(cli_manager::logging_level_cli_arg())
    }

    fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()> {
        let problem = common::read_input_problem(arg_matches)?;
        log_instantiations(&problem);
        println!("c the problem is well-formed");
        Ok(())
    }
}

fn log_instantiations(problem: &Problem) {
    let engine = InstantiationEngine::new(problem);
    for rule in problem.rules().iter() {
        info!(
            "rule {} has {} instantiation(s)",
            rule.label(),
            engine.instantiate(rule).len()
        );
    }
}
