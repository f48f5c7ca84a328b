use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "pkgsweep",
    about = "Inventory and clean up packages across system package managers",
    long_about = "Scans Homebrew, npm, pnpm, yarn and pip inventories, previews the impact \
                  of removals, and bulk-uninstalls or upgrades packages.",
    version,
    next_line_help = false,
    term_width = 80
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalFlags,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug)]
pub struct GlobalFlags {
    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Quiet mode
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(short = 'y', long = "yes", global = true)]
    pub yes: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show which package managers are installed on this machine
    Managers,

    /// List installed packages across managers
    List {
        /// Only this manager (brew, brew-cask, npm, pnpm, yarn, pip)
        #[arg(short, long, value_name = "MANAGER")]
        manager: Option<String>,

        /// Compute disk usage per package
        #[arg(long)]
        sizes: bool,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show details for one installed package
    Info {
        /// Package name, optionally prefixed MANAGER:NAME
        name: String,

        /// Only look in this manager
        #[arg(short, long, value_name = "MANAGER")]
        manager: Option<String>,

        /// Render the dependency tree
        #[arg(short, long)]
        tree: bool,
    },

    /// Uninstall packages, with an impact preview first
    Clean {
        /// Package names, each optionally prefixed MANAGER:NAME
        #[arg(required = true)]
        packages: Vec<String>,

        /// Only look in this manager
        #[arg(short, long, value_name = "MANAGER")]
        manager: Option<String>,

        /// Preview only, do not uninstall anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Check watched packages for newer upstream versions
    Outdated {
        /// Check every installed package, not just the watch list
        #[arg(short, long)]
        all: bool,
    },

    /// Upgrade one package to the latest (or a given) version
    Upgrade {
        /// Package name, optionally prefixed MANAGER:NAME
        name: String,

        /// Only look in this manager
        #[arg(short, long, value_name = "MANAGER")]
        manager: Option<String>,

        /// Target version, where the manager supports one
        #[arg(long, value_name = "VERSION")]
        to: Option<String>,
    },

    /// Add or remove a package on the update watch list
    Watch {
        /// Package name
        name: String,

        /// Remove instead of add
        #[arg(short, long)]
        remove: bool,
    },

    /// Add or remove a package on the update ignore list
    Ignore {
        /// Package name
        name: String,

        /// Remove instead of add
        #[arg(short, long)]
        remove: bool,
    },
}
