//! Shell
//!
//! Builds the two-level argument parser from the command registry and routes
//! one invocation to its handler.
//!
//! Flow for a single run:
//!
//! 1. Global options before the subcommand are parsed permissively. No
//!    arguments or `-h/--help` print the top-level help and stop there.
//! 2. The full argument vector is parsed strictly; bad input is a usage error.
//! 3. Built-in commands run immediately. Everything else gets a
//!    [`Session`] and [`Client`] built from the global options first. The
//!    config file is read at this point, once logging is installed.

pub mod output;
pub mod registry;

use crate::commands;
use crate::config::Config;
use crate::craton::client::Client;
use crate::craton::session::Session;
use crate::error::{CratonError, CratonResult};
use crate::logging::{self, LogLevel};
use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{Arg, ArgMatches, Args, Command, FromArgMatches};
use registry::{Action, ActionModule, Callback, Registry};
use std::ffi::OsString;

/// Program name shown in usage lines
pub const PROG: &str = "craton";

/// Project used when nothing else selects one
pub const DEFAULT_PROJECT_ID: i64 = 1;

const ABOUT: &str = "Main shell for parsing arguments directed toward Craton.";
const EPILOG: &str = "See \"craton help COMMAND\" for help on a specific command.";

// Options accepted before the subcommand
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue, hide = true)]
    pub help: bool,

    /// Defaults to env[CRATON_URL]
    #[arg(long = "craton-url", env = "CRATON_URL", value_name = "CRATON_URL")]
    pub craton_url: Option<String>,

    /// Defaults to 1
    #[arg(
        long = "craton-project-id",
        value_name = "CRATON_PROJECT_ID",
        default_value_t = DEFAULT_PROJECT_ID
    )]
    pub craton_project_id: i64,

    /// Defaults to env[OS_USERNAME]
    #[arg(long = "os-username", env = "OS_USERNAME", value_name = "OS_USERNAME")]
    pub os_username: Option<String>,

    /// Defaults to env[OS_PASSWORD]
    #[arg(
        long = "os-password",
        env = "OS_PASSWORD",
        value_name = "OS_PASSWORD",
        hide_env_values = true
    )]
    pub os_password: Option<String>,

    /// Log level for debugging, written to the craton log file
    #[arg(long, value_enum, default_value = "off")]
    pub log_level: LogLevel,
}

/// How a successful dispatch ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Help or version text was printed; nothing else ran
    Help,
    /// The named command ran to completion
    Completed { command: String },
}

/// Command-line front end
pub struct Shell {
    registry: Registry,
    // `None` reads the user's config file when a client is first needed
    config: Option<Config>,
}

impl Shell {
    /// Shell with every command module plus the shell's own built-ins
    pub fn new(config: Config) -> Self {
        Self::with_registry(default_registry(), config)
    }

    /// Shell that reads `config.json` from the user's config directory
    /// after logging is set up, so problems with the file are logged
    pub fn from_config_file() -> Self {
        Self {
            registry: default_registry(),
            config: None,
        }
    }

    pub fn with_registry(registry: Registry, config: Config) -> Self {
        Self {
            registry,
            config: Some(config),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Parser for the global options only, tolerant of anything else
    fn base_parser() -> Command {
        GlobalArgs::augment_args(Command::new(PROG))
            .disable_help_flag(true)
            .disable_version_flag(true)
            .ignore_errors(true)
    }

    /// Assemble the full parser: global options plus one sub-parser per
    /// registered command. Also returns the registry snapshot it was built
    /// from.
    pub fn build_parser(&self) -> (Command, Registry) {
        let snapshot = self.registry.clone();
        let parser = GlobalArgs::augment_args(Command::new(PROG))
            .version(crate::VERSION)
            .about(ABOUT)
            .after_help(EPILOG)
            .disable_help_flag(true)
            .disable_help_subcommand(true)
            .subcommand_required(true)
            .subcommand_value_name("subcommand")
            .subcommands(snapshot.iter().map(|c| c.to_command()));
        (parser, snapshot)
    }

    /// Top-level help text
    pub fn render_help(&self) -> String {
        self.build_parser().0.render_help().to_string()
    }

    /// Help text of one command, if it exists
    pub fn render_command_help(&self, name: &str) -> Option<String> {
        let (mut parser, _) = self.build_parser();
        parser.build();
        parser
            .find_subcommand_mut(name)
            .map(|command| command.render_help().to_string())
    }

    /// Parse `argv` (without the program name) and run the selected command
    pub async fn dispatch<I, T>(&self, argv: I) -> CratonResult<Outcome>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
        let (mut parser, registry) = self.build_parser();

        // Only tokens before the subcommand belong to the global options
        let globals_end = argv
            .iter()
            .position(|arg| arg.to_str().is_some_and(|s| registry.contains(s)))
            .unwrap_or(argv.len());
        let options = Self::base_parser().try_get_matches_from(
            std::iter::once(OsString::from(PROG)).chain(argv[..globals_end].iter().cloned()),
        )?;

        let log_level = options
            .get_one::<LogLevel>("log_level")
            .copied()
            .unwrap_or(LogLevel::Off);
        let _log_guard = logging::setup_logging(log_level)
            .map_err(|e| CratonError::Config(format!("{:#}", e)))?;

        let wants_help = options.get_one::<bool>("help").copied().unwrap_or(false);
        if wants_help || argv.is_empty() {
            parser.print_help()?;
            return Ok(Outcome::Help);
        }

        let matches = match parser
            .try_get_matches_from_mut(std::iter::once(OsString::from(PROG)).chain(argv))
        {
            Ok(matches) => matches,
            Err(e) if is_display(&e) => {
                e.print()?;
                return Ok(Outcome::Help);
            }
            Err(e) => return Err(e.into()),
        };

        let Some((name, sub_matches)) = matches.subcommand() else {
            return Err(CratonError::Config("no subcommand given".to_string()));
        };
        let Some(command) = registry.get(name) else {
            return Err(CratonError::Config(format!(
                "'{}' is not a valid subcommand",
                name
            )));
        };

        tracing::info!("Dispatching {}", name);

        match command.callback {
            Callback::Help => {
                print_command_help(&mut parser, &registry, sub_matches)?;
                Ok(Outcome::Help)
            }
            Callback::Client(handler) => {
                let config = self.config.clone().unwrap_or_else(Config::load);
                let client = build_client(&config, &matches)?;
                handler(&client, sub_matches).await?;
                Ok(Outcome::Completed {
                    command: name.to_string(),
                })
            }
        }
    }
}

/// Resolve the global options into a session and client.
/// Flags and environment win over the config file.
fn build_client(config: &Config, matches: &ArgMatches) -> CratonResult<Client> {
    let globals = GlobalArgs::from_arg_matches(matches)?;

    let explicit_project = match matches.value_source("craton_project_id") {
        Some(ValueSource::DefaultValue) | None => None,
        Some(_) => Some(globals.craton_project_id),
    };
    let project_id = config.effective_project_id(explicit_project, DEFAULT_PROJECT_ID);

    let session = Session::new(
        config.effective_username(globals.os_username),
        globals.os_password,
        project_id,
    )?;

    let url = config.effective_url(globals.craton_url).ok_or_else(|| {
        CratonError::Config(
            "no Craton URL configured: pass --craton-url or set CRATON_URL".to_string(),
        )
    })?;

    tracing::debug!("Using {} (project {})", url, project_id);
    Client::new(session, &url)
}

fn is_display(err: &clap::Error) -> bool {
    matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
}

/// `help [COMMAND]`
fn print_command_help(
    parser: &mut Command,
    registry: &Registry,
    args: &ArgMatches,
) -> CratonResult<()> {
    let Some(name) = args.get_one::<String>("command") else {
        parser.print_help()?;
        return Ok(());
    };

    if !registry.contains(name) {
        return Err(CratonError::Config(format!(
            "'{}' is not a valid subcommand",
            name
        )));
    }

    match parser.try_get_matches_from_mut([PROG, name.as_str(), "--help"]) {
        Err(e) if is_display(&e) => {
            e.print()?;
            Ok(())
        }
        Err(e) => Err(e.into()),
        Ok(_) => Ok(()),
    }
}

/// Every command module followed by the shell's own built-ins.
/// The built-ins register last and win any name collision.
fn default_registry() -> Registry {
    let mut registry = Registry::new();
    for module in commands::command_modules() {
        registry.register(module);
    }
    registry.register(shell_actions());
    registry
}

/// Commands provided by the shell itself
fn shell_actions() -> ActionModule {
    ActionModule::new("shell").action(
        Action::with_callback("do_help", Callback::Help)
            .description("Display help about this program or one of its subcommands.")
            .arg(
                Arg::new("command")
                    .value_name("COMMAND")
                    .help("Display help for <COMMAND>."),
            ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell() -> Shell {
        Shell::new(Config::default())
    }

    #[test]
    fn test_builtin_help_is_registered_last() {
        let shell = shell();
        assert_eq!(shell.registry().names().last(), Some(&"help"));
        assert!(shell.registry().contains("region-list"));
    }

    #[test]
    fn test_config_file_is_read_lazily() {
        assert!(Shell::from_config_file().config.is_none());
        assert_eq!(shell().config, Some(Config::default()));
    }

    #[test]
    fn test_top_level_help_lists_commands_and_globals() {
        let help = shell().render_help();
        assert!(help.contains("region-create"));
        assert!(help.contains("region-list"));
        assert!(help.contains("--craton-url"));
        assert!(help.contains("--craton-project-id"));
        assert!(help.contains("--os-username"));
        assert!(help.contains(EPILOG));
    }

    #[test]
    fn test_command_help_shows_schema() {
        let help = shell().render_command_help("region-create").unwrap();
        assert!(help.contains("--name"));
        assert!(help.contains("--note"));
        assert!(!help.contains("--craton-url"));
        assert!(shell().render_command_help("no-such-command").is_none());
    }

    #[test]
    fn test_parser_rejects_unknown_flags() {
        let (mut parser, _) = shell().build_parser();
        let err = parser
            .try_get_matches_from_mut([PROG, "region-list", "--bogus"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_parser_requires_subcommand() {
        let (mut parser, _) = shell().build_parser();
        let err = parser
            .try_get_matches_from_mut([PROG, "--craton-project-id", "3"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingSubcommand);
    }

    #[test]
    fn test_global_defaults() {
        let (mut parser, _) = shell().build_parser();
        let matches = parser
            .try_get_matches_from_mut([PROG, "--craton-url", "http://x/v1", "region-list"])
            .unwrap();
        let globals = GlobalArgs::from_arg_matches(&matches).unwrap();
        assert_eq!(globals.craton_project_id, DEFAULT_PROJECT_ID);
        assert_eq!(globals.craton_url.as_deref(), Some("http://x/v1"));
        assert_eq!(
            matches.value_source("craton_project_id"),
            Some(ValueSource::DefaultValue)
        );
    }

    #[test]
    fn test_config_file_fills_project_and_url() {
        let config = Config {
            craton_url: Some("http://from-file/v1".to_string()),
            project_id: Some(5),
            username: Some("file-user".to_string()),
        };
        let shell = Shell::new(config.clone());
        let (mut parser, _) = shell.build_parser();

        let matches = parser
            .try_get_matches_from_mut([PROG, "region-list"])
            .unwrap();
        let client = build_client(&config, &matches).unwrap();
        assert_eq!(client.session().project_id(), 5);

        let matches = parser
            .try_get_matches_from_mut([PROG, "--craton-project-id", "8", "region-list"])
            .unwrap();
        let client = build_client(&config, &matches).unwrap();
        assert_eq!(client.session().project_id(), 8);
    }
}
