//! Command dispatcher
//!
//! Routes CLI commands to their appropriate handlers.

use crate::cli::args::{Cli, Command};
use crate::commands;
use crate::error::Result;
use crate::ui as output;

/// Dispatch the parsed CLI command to the appropriate handler
pub fn dispatch(args: &Cli) -> Result<()> {
    match &args.command {
        Some(Command::Managers) => commands::managers::run(),

        Some(Command::List {
            manager,
            sizes,
            json,
        }) => commands::list::run(commands::list::ListOptions {
            manager: manager.clone(),
            sizes: *sizes,
            json: *json,
        }),

        Some(Command::Info {
            name,
            manager,
            tree,
        }) => commands::info::run(commands::info::InfoOptions {
            name: name.clone(),
            manager: manager.clone(),
            tree: *tree,
        }),

        Some(Command::Clean {
            packages,
            manager,
            dry_run,
        }) => commands::clean::run(commands::clean::CleanOptions {
            packages: packages.clone(),
            manager: manager.clone(),
            dry_run: *dry_run,
            yes: args.global.yes,
        }),

        Some(Command::Outdated { all }) => {
            commands::outdated::run(commands::outdated::OutdatedOptions { all: *all })
        }

        Some(Command::Upgrade { name, manager, to }) => {
            commands::upgrade::run(commands::upgrade::UpgradeOptions {
                name: name.clone(),
                manager: manager.clone(),
                to: to.clone(),
            })
        }

        Some(Command::Watch { name, remove }) => commands::watch::run(commands::watch::WatchOptions {
            name: name.clone(),
            remove: *remove,
            list: commands::watch::TrackedList::Watched,
        }),

        Some(Command::Ignore { name, remove }) => {
            commands::watch::run(commands::watch::WatchOptions {
                name: name.clone(),
                remove: *remove,
                list: commands::watch::TrackedList::Ignored,
            })
        }

        None => {
            output::info("No command provided.");
            output::info("Quick start:");
            output::indent("pkgsweep list --sizes", 2);
            output::indent("pkgsweep info typescript --tree", 2);
            output::indent("pkgsweep clean wget htop --dry-run", 2);
            output::indent("pkgsweep watch node", 2);
            output::info("Use `pkgsweep --help` for the full command list.");
            Ok(())
        }
    }
}
