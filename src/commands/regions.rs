//! Region commands

use super::{required, string_fields};
use crate::craton::client::Client;
use crate::error::{CratonError, CratonResult};
use crate::shell::output;
use crate::shell::registry::{Action, ActionModule};
use clap::{value_parser, Arg, ArgMatches};
use futures::future::BoxFuture;
use futures::{FutureExt, TryStreamExt};
use serde_json::Value;
use std::io::{self, Write};

/// Fields a user may set on a region
const EDITABLE_FIELDS: &[&str] = &["name", "note"];

pub fn actions() -> ActionModule {
    ActionModule::new("regions")
        .action(
            Action::new("do_region_create", do_region_create)
                .description("Register a new region with the Craton service.")
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .value_name("NAME")
                        .required(true)
                        .help("Name of the region."),
                )
                .arg(
                    Arg::new("note")
                        .long("note")
                        .value_name("NOTE")
                        .help("Note about the region."),
                ),
        )
        .action(
            Action::new("do_region_show", do_region_show)
                .description("Show detailed information about a region.")
                .arg(region_id_arg("ID of the region.")),
        )
        .action(
            Action::new("do_region_list", do_region_list)
                .description(
                    "List all regions in the current project.\n\n\
                     Results are fetched page by page until the service reports no more.",
                )
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_name("LIMIT")
                        .value_parser(value_parser!(u32).range(1..))
                        .help("Maximum number of regions per page."),
                )
                .arg(
                    Arg::new("name")
                        .long("name")
                        .value_name("NAME")
                        .help("Only list regions with this name."),
                ),
        )
        .action(
            Action::new("do_region_update", do_region_update)
                .description("Update information about a region.")
                .arg(region_id_arg("ID of the region."))
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .value_name("NAME")
                        .help("New name for the region."),
                )
                .arg(
                    Arg::new("note")
                        .long("note")
                        .value_name("NOTE")
                        .help("New note for the region."),
                ),
        )
        .action(
            Action::new("do_region_delete", do_region_delete)
                .description("Delete a region that is registered with the Craton service.")
                .arg(region_id_arg("ID of the region to delete.")),
        )
}

fn region_id_arg(help: &'static str) -> Arg {
    Arg::new("id")
        .value_name("REGION")
        .required(true)
        .value_parser(value_parser!(i64))
        .help(help)
}

fn do_region_create<'a>(client: &'a Client, args: &'a ArgMatches) -> BoxFuture<'a, CratonResult<()>> {
    async move {
        let fields = string_fields(args, EDITABLE_FIELDS);
        let region = client.regions.create(fields).await?;
        output::print_resource(&mut io::stdout().lock(), &region)?;
        Ok(())
    }
    .boxed()
}

fn do_region_show<'a>(client: &'a Client, args: &'a ArgMatches) -> BoxFuture<'a, CratonResult<()>> {
    async move {
        let id: i64 = required(args, "id")?;
        let region = client.regions.get(id).await?;
        output::print_resource(&mut io::stdout().lock(), &region)?;
        Ok(())
    }
    .boxed()
}

fn do_region_list<'a>(client: &'a Client, args: &'a ArgMatches) -> BoxFuture<'a, CratonResult<()>> {
    async move {
        let mut filters = string_fields(args, &["name"]);
        if let Some(limit) = args.get_one::<u32>("limit") {
            filters.insert("limit".to_string(), Value::from(*limit));
        }

        let regions: Vec<_> = client.regions.list(filters).try_collect().await?;
        output::print_list(&mut io::stdout().lock(), &regions)?;
        Ok(())
    }
    .boxed()
}

fn do_region_update<'a>(client: &'a Client, args: &'a ArgMatches) -> BoxFuture<'a, CratonResult<()>> {
    async move {
        let id: i64 = required(args, "id")?;
        let fields = string_fields(args, EDITABLE_FIELDS);
        if fields.is_empty() {
            return Err(CratonError::Config(
                "nothing to update: pass at least one of --name, --note".to_string(),
            ));
        }

        let region = client.regions.update(id, fields).await?;
        output::print_resource(&mut io::stdout().lock(), &region)?;
        Ok(())
    }
    .boxed()
}

fn do_region_delete<'a>(client: &'a Client, args: &'a ArgMatches) -> BoxFuture<'a, CratonResult<()>> {
    async move {
        let id: i64 = required(args, "id")?;
        client.regions.delete(id).await?;
        writeln!(io::stdout().lock(), "Region {} was deleted.", id)?;
        Ok(())
    }
    .boxed()
}
