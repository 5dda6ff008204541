use anyhow::Result;
use clap::{App, ArgMatches};

/// A subcommand of the app.
///
/// A command declares its CLI arguments as a clap subcommand, and runs itself on the matching arguments.
/// Command names must be unique among the commands registered in a [`CliManager`](super::cli_manager::CliManager).
pub(crate) trait Command<'a> {
    /// Returns the name of the command, as typed on the command line.
    fn name(&self) -> &str;

    /// Returns the clap subcommand declaring the arguments of this command.
    fn clap_subcommand(&self) -> App<'a, 'a>;

    /// Runs the command.
    ///
    /// An error makes the app print the error chain and exit with a failure status code.
    fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()>;
}
