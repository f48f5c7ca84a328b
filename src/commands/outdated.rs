//! Outdated command
//!
//! Checks watched packages (or everything with --all) for newer upstream
//! versions.

use std::sync::{Arc, Mutex};

use colored::Colorize;

use crate::core::types::{Package, UpdateInfo};
use crate::error::Result;
use crate::prefs::{FilePreferences, Preferences};
use crate::services::{Scanner, VersionChecker};
use crate::ui as output;

pub struct OutdatedOptions {
    pub all: bool,
}

pub fn run(options: OutdatedOptions) -> Result<()> {
    let prefs: Arc<dyn Preferences> = Arc::new(FilePreferences::load()?);

    if !prefs.should_check_updates() {
        output::info("Update checks are disabled in preferences");
        return Ok(());
    }

    if !options.all && prefs.watched_packages().is_empty() {
        output::info("The watch list is empty.");
        output::indent("pkgsweep watch <package>   add a package to the list", 2);
        output::indent("pkgsweep outdated --all    check every installed package", 2);
        return Ok(());
    }

    let scanner = Scanner::new();
    let packages = scanner.scan_all();
    if packages.is_empty() {
        output::info("No packages found");
        return Ok(());
    }

    output::header(if options.all {
        "Checking all packages"
    } else {
        "Checking watched packages"
    });

    let checker = VersionChecker::new(scanner.registry(), Arc::clone(&prefs));
    let updates = Mutex::new(0usize);
    let on_update = |pkg: &Package, info: &UpdateInfo| {
        if info.update_available {
            println!(
                "  {} {:<32} {} -> {}",
                "↑".yellow().bold(),
                pkg.name,
                pkg.version.dimmed(),
                info.latest_version.green()
            );
            if let Ok(mut count) = updates.lock() {
                *count += 1;
            }
        } else {
            output::verbose(&format!("{} is current", pkg.name));
        }
    };

    if options.all {
        checker.check_packages(&packages, on_update);
    } else {
        checker.check_all(&packages, on_update);
    }

    let count = updates.lock().map(|c| *c).unwrap_or(0);
    output::separator();
    if count == 0 {
        output::success("Everything is up to date");
    } else {
        output::info(&format!("{} update(s) available", count));
    }
    if let Some(when) = prefs.last_check_time() {
        output::keyval("Last checked", &when.format("%Y-%m-%d %H:%M").to_string());
    }
    Ok(())
}
