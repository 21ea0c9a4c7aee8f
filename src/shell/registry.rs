//! Command Registry
//!
//! Commands are contributed by action modules: ordered lists of [`Action`]s
//! built at program start. Registration turns each action into an immutable
//! [`CommandDescriptor`] keyed by its visible command name.

use crate::craton::client::Client;
use crate::error::CratonResult;
use clap::{Arg, ArgAction, ArgMatches, Command};
use futures::future::BoxFuture;

/// Prefix marking an identifier as a user-invocable command
pub const ACTION_MARKER: &str = "do";

/// Async command callback
pub type Handler = for<'a> fn(&'a Client, &'a ArgMatches) -> BoxFuture<'a, CratonResult<()>>;

/// What runs when a command is selected
#[derive(Clone, Copy)]
pub enum Callback {
    /// Needs a live client: the session and client are built first
    Client(Handler),
    /// Shell built-in `help`, runs without touching the network
    Help,
}

impl std::fmt::Debug for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Callback::Client(_) => f.write_str("Client(..)"),
            Callback::Help => f.write_str("Help"),
        }
    }
}

/// Derive the visible command name from a handler identifier.
///
/// `do_region_list` and `do-region-list` both become `region-list`.
/// Extra separators after the marker are dropped, so `do__list` is `list`.
/// Returns `None` when the identifier does not carry the action marker.
pub fn command_name(identifier: &str) -> Option<String> {
    let rest = identifier.strip_prefix(ACTION_MARKER)?;
    if !rest.starts_with(['_', '-']) {
        return None;
    }
    let rest = rest.trim_start_matches(['_', '-']);
    if rest.is_empty() {
        return None;
    }
    Some(rest.replace('_', "-"))
}

/// First non-empty paragraph of a description, folded onto one line
pub fn help_summary(description: &str) -> String {
    let mut lines = Vec::new();
    for line in description.lines().map(str::trim) {
        if line.is_empty() {
            if lines.is_empty() {
                continue;
            }
            break;
        }
        lines.push(line);
    }
    lines.join(" ")
}

/// Immutable, ordered argument schema of one command
#[derive(Debug, Clone, Default)]
pub struct ArgSchema(Vec<Arg>);

impl ArgSchema {
    pub fn iter(&self) -> impl Iterator<Item = &Arg> {
        self.0.iter()
    }
}

/// A command handler plus its metadata, prior to registration
pub struct Action {
    identifier: &'static str,
    description: &'static str,
    arguments: Vec<Arg>,
    callback: Callback,
}

impl Action {
    pub fn new(identifier: &'static str, handler: Handler) -> Self {
        Self::with_callback(identifier, Callback::Client(handler))
    }

    pub fn with_callback(identifier: &'static str, callback: Callback) -> Self {
        Self {
            identifier,
            description: "",
            arguments: Vec::new(),
            callback,
        }
    }

    /// Attach the command description; its first paragraph is the summary
    pub fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Append an argument declaration. Declaration order is kept.
    pub fn arg(mut self, arg: Arg) -> Self {
        self.arguments.push(arg);
        self
    }
}

/// Named, ordered group of actions
pub struct ActionModule {
    name: &'static str,
    actions: Vec<Action>,
}

impl ActionModule {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            actions: Vec::new(),
        }
    }

    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }
}

/// A registered command
#[derive(Debug, Clone)]
pub struct CommandDescriptor {
    pub name: String,
    pub help: String,
    pub description: String,
    pub schema: ArgSchema,
    pub callback: Callback,
}

impl CommandDescriptor {
    fn from_action(name: String, action: Action) -> Self {
        Self {
            name,
            help: help_summary(action.description),
            description: action.description.trim().to_string(),
            schema: ArgSchema(action.arguments),
            callback: action.callback,
        }
    }

    /// Build the sub-parser for this command
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(self.name.clone())
            .about(self.help.clone())
            .disable_help_flag(true)
            .arg(
                Arg::new("help")
                    .short('h')
                    .long("help")
                    .action(ArgAction::Help)
                    .hide(true),
            );
        if self.description != self.help {
            command = command.long_about(self.description.clone());
        }
        for arg in self.schema.iter() {
            command = command.arg(arg.clone());
        }
        command
    }
}

/// Commands keyed by visible name, in registration order
#[derive(Debug, Clone, Default)]
pub struct Registry {
    commands: Vec<CommandDescriptor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every marked action of `module`.
    ///
    /// A name that is already registered is replaced in place: the last
    /// registration wins.
    pub fn register(&mut self, module: ActionModule) {
        let module_name = module.name;
        for action in module.actions {
            let Some(name) = command_name(action.identifier) else {
                tracing::debug!(
                    "Skipping {}::{}: not an action",
                    module_name,
                    action.identifier
                );
                continue;
            };

            let descriptor = CommandDescriptor::from_action(name, action);
            match self.commands.iter_mut().find(|c| c.name == descriptor.name) {
                Some(existing) => {
                    tracing::warn!(
                        "Command '{}' from {} overrides an earlier registration",
                        descriptor.name,
                        module_name
                    );
                    *existing = descriptor;
                }
                None => self.commands.push(descriptor),
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    fn noop<'a>(_client: &'a Client, _args: &'a ArgMatches) -> BoxFuture<'a, CratonResult<()>> {
        async { Ok(()) }.boxed()
    }

    #[test]
    fn test_command_name_derivation() {
        assert_eq!(command_name("do_region_list"), Some("region-list".to_string()));
        assert_eq!(command_name("do-list-regions"), Some("list-regions".to_string()));
        assert_eq!(command_name("do_help"), Some("help".to_string()));
        assert_eq!(command_name("region_list"), None);
        assert_eq!(command_name("download"), None);
        assert_eq!(command_name("do_"), None);
        assert_eq!(command_name("do__list"), Some("list".to_string()));
        assert_eq!(command_name("do-_region_show"), Some("region-show".to_string()));
        assert_eq!(command_name("do__"), None);
    }

    #[test]
    fn test_help_summary() {
        assert_eq!(help_summary("Show a region."), "Show a region.");
        assert_eq!(
            help_summary("\n  List regions\n  in a project.\n\n  Extra details.\n"),
            "List regions in a project."
        );
        assert_eq!(help_summary(""), "");
    }

    #[test]
    fn test_register_skips_unmarked_actions() {
        let mut registry = Registry::new();
        registry.register(
            ActionModule::new("test")
                .action(Action::new("do_region_show", noop))
                .action(Action::new("helper", noop)),
        );
        assert_eq!(registry.names(), vec!["region-show"]);
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = Registry::new();
        registry.register(
            ActionModule::new("first")
                .action(Action::new("do_region_list", noop).description("First."))
                .action(Action::new("do_region_show", noop)),
        );
        registry.register(
            ActionModule::new("second")
                .action(Action::new("do-region-list", noop).description("Second.")),
        );

        assert_eq!(registry.names(), vec!["region-list", "region-show"]);
        assert_eq!(registry.get("region-list").unwrap().help, "Second.");
    }

    #[test]
    fn test_schema_preserves_declaration_order() {
        let mut registry = Registry::new();
        registry.register(
            ActionModule::new("test").action(
                Action::new("do_region_update", noop)
                    .arg(Arg::new("id").required(true))
                    .arg(Arg::new("name").long("name"))
                    .arg(Arg::new("note").long("note")),
            ),
        );

        let descriptor = registry.get("region-update").unwrap();
        let ids: Vec<&str> = descriptor.schema.iter().map(|a| a.get_id().as_str()).collect();
        assert_eq!(ids, vec!["id", "name", "note"]);
    }

    #[test]
    fn test_sub_parser_help_flag() {
        let mut registry = Registry::new();
        registry.register(
            ActionModule::new("test").action(
                Action::new("do_region_show", noop)
                    .description("Show detailed information about a region.")
                    .arg(Arg::new("id").value_name("REGION").required(true)),
            ),
        );

        let mut command = registry.get("region-show").unwrap().to_command();
        let err = command
            .try_get_matches_from_mut(["region-show", "-h"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);

        let help = command.render_help().to_string();
        assert!(help.contains("Show detailed information about a region."));
        assert!(help.contains("<REGION>"));
    }
}
