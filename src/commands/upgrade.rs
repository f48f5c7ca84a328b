//! Upgrade command
//!
//! Upgrades one package to the latest published version, or to an explicit
//! version where the manager supports targeting one.

use colored::Colorize;

use crate::commands::selection;
use crate::core::types::ManagerKind;
use crate::error::{Result, SweepError};
use crate::services::Scanner;
use crate::ui as output;

pub struct UpgradeOptions {
    pub name: String,
    pub manager: Option<String>,
    pub to: Option<String>,
}

pub fn run(options: UpgradeOptions) -> Result<()> {
    let scanner = Scanner::new();
    let default_kind: Option<ManagerKind> =
        options.manager.as_deref().map(str::parse).transpose()?;
    let spec = selection::parse_spec(&options.name, default_kind.as_ref())?;

    let inventory = match &spec.manager {
        Some(kind) => scanner.scan_by_manager(kind)?,
        None => scanner.scan_all(),
    };
    let specs = [spec];
    let mut selected = selection::resolve_packages(&inventory, &specs)?;
    let pkg = selected.remove(0);

    let Some(adapter) = scanner.manager(&pkg.manager) else {
        return Err(SweepError::UnknownManager(pkg.manager.to_string()));
    };

    if options.to.is_some()
        && matches!(pkg.manager, ManagerKind::Brew | ManagerKind::BrewCask)
    {
        output::warning("Homebrew always upgrades to the latest version; ignoring --to");
    }

    match &options.to {
        Some(version) => output::info(&format!(
            "Upgrading {} {} to {}...",
            pkg.name,
            pkg.version.dimmed(),
            version
        )),
        None => output::info(&format!(
            "Upgrading {} {} to the latest version...",
            pkg.name,
            pkg.version.dimmed()
        )),
    }

    adapter.upgrade(&pkg.name, options.to.as_deref())?;

    match adapter.package_info(&pkg.name) {
        Ok(Some(updated)) if updated.version != pkg.version => output::success(&format!(
            "{} upgraded from {} to {}",
            pkg.name, pkg.version, updated.version
        )),
        Ok(Some(updated)) => {
            output::success(&format!("{} is at {}", pkg.name, updated.version))
        }
        _ => output::success(&format!("{} upgraded", pkg.name)),
    }
    Ok(())
}
