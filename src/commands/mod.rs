//! Command modules
//!
//! Each module contributes an [`ActionModule`] of user-invocable commands.
//! Modules are registered in the order returned by [`command_modules`].

pub mod regions;

use crate::error::{CratonError, CratonResult};
use crate::resource::Fields;
use crate::shell::registry::ActionModule;
use clap::ArgMatches;
use serde_json::Value;

/// All command modules shipped with the client
pub fn command_modules() -> Vec<ActionModule> {
    vec![regions::actions()]
}

/// Fetch an argument clap has already validated as required
pub(crate) fn required<T>(args: &ArgMatches, id: &str) -> CratonResult<T>
where
    T: Clone + Send + Sync + 'static,
{
    args.get_one::<T>(id)
        .cloned()
        .ok_or_else(|| CratonError::Config(format!("missing required argument '{}'", id)))
}

/// Collect the string arguments that were supplied into a field map
pub(crate) fn string_fields(args: &ArgMatches, ids: &[&str]) -> Fields {
    ids.iter()
        .filter_map(|id| {
            args.get_one::<String>(id)
                .map(|value| (id.to_string(), Value::String(value.clone())))
        })
        .collect()
}
