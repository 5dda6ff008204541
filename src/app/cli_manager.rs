use super::{app_helper, command::Command};
use anyhow::{anyhow, Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches};
use log::{info, LevelFilter};
use std::{ffi::OsString, str::FromStr};
use sysinfo::System;

pub(crate) const ARG_LOGGING_LEVEL: &str = "LOGGING_LEVEL";

pub(crate) fn logging_level_cli_arg<'a>() -> Arg<'a, 'a> {
    Arg::with_name(ARG_LOGGING_LEVEL)
        .long("logging-level")
        .multiple(false)
        .default_value("info")
        .possible_values(&["trace", "debug", "info", "warn", "error", "off"])
        .help("set the minimal logging level")
}

/// Dispatches the CLI arguments to the registered commands.
pub(crate) struct CliManager<'a> {
    app_name: &'a str,
    version: &'a str,
    author: &'a str,
    about: &'a str,
    commands: Vec<Box<dyn Command<'a>>>,
}

impl<'a> CliManager<'a> {
    pub(crate) fn new(app_name: &'a str, version: &'a str, author: &'a str, about: &'a str) -> Self {
        CliManager {
            app_name,
            version,
            author,
            about,
            commands: vec![],
        }
    }

    pub(crate) fn add_command(&mut self, command: Box<dyn Command<'a>>) {
        self.commands.push(command);
    }

    fn clap_app(&self) -> App<'a, 'a> {
        let mut app = App::new(self.app_name)
            .global_setting(AppSettings::DisableVersion)
            .global_setting(AppSettings::VersionlessSubcommands)
            .setting(AppSettings::SubcommandRequiredElseHelp)
            .version(self.version)
            .author(self.author)
            .about(self.about);
        for c in self.commands.iter() {
            app = app.subcommand(c.clap_subcommand());
        }
        app
    }

    /// Parses the arguments and executes the selected command.
    ///
    /// Help requests print the help message on the standard output and succeed.
    pub(crate) fn parse_cli<I, T>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = match self.clap_app().get_matches_from_safe(args) {
            Ok(m) => m,
            Err(clap::Error {
                kind: clap::ErrorKind::HelpDisplayed,
                message,
                ..
            }) => {
                println!("{}", message);
                return Ok(());
            }
            Err(e) => {
                app_helper::init_logger();
                return Err(anyhow!("{}", e.message));
            }
        };
        let (name, sub_matches) = matches.subcommand();
        let command = self
            .commands
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| anyhow!("no such command: {}", name))?;
        let sub_matches = sub_matches.ok_or_else(|| anyhow!("missing arguments for {}", name))?;
        app_helper::init_logger_with_level(logging_level(sub_matches)?);
        info!("{} {}", self.app_name, self.version);
        sys_info();
        command.execute(sub_matches)
    }
}

fn logging_level(arg_matches: &ArgMatches<'_>) -> Result<LevelFilter> {
    match arg_matches.value_of(ARG_LOGGING_LEVEL) {
        Some(l) => LevelFilter::from_str(l).context("while reading the logging level"),
        None => Ok(LevelFilter::Info),
    }
}

fn sys_info() {
    let unknown = || "[unknown]".to_string();
    let mut sys = System::new();
    sys.refresh_cpu();
    sys.refresh_memory();
    info!("running on {}", System::host_name().unwrap_or_else(unknown));
    info!(
        "OS is {} {} with kernel {}",
        System::name().unwrap_or_else(unknown),
        System::os_version().unwrap_or_else(unknown),
        System::kernel_version().unwrap_or_else(unknown)
    );
    let mut brands = sys.cpus().iter().map(|c| c.brand()).collect::<Vec<&str>>();
    brands.sort_unstable();
    brands.dedup();
    match sys.physical_core_count() {
        Some(n) => info!("{} physical core(s) {:?}", n, brands),
        None => info!("unknown physical core count {:?}", brands),
    }
    info!("total memory: {} MB", sys.total_memory() >> 20);
}
