//! List command
//!
//! Scans the requested managers and prints the installed inventory.

use std::collections::HashMap;

use colored::Colorize;

use crate::core::types::{ManagerKind, Package, ScanState};
use crate::error::Result;
use crate::services::Scanner;
use crate::ui as output;
use crate::utils::format::{format_bytes, truncate};

pub struct ListOptions {
    pub manager: Option<String>,
    pub sizes: bool,
    pub json: bool,
}

pub fn run(options: ListOptions) -> Result<()> {
    let scanner = Scanner::new();

    let mut packages = match &options.manager {
        Some(raw) => scanner.scan_by_manager(&raw.parse()?)?,
        // Progress lines would interleave with the JSON document, so the
        // machine-readable path scans silently.
        None if options.json => scanner.scan_all(),
        None => scan_with_progress(&scanner),
    };

    if options.sizes {
        scanner.compute_sizes(&mut packages);
    }

    if options.json {
        let json = serde_json::to_string_pretty(&packages)?;
        println!("{}", json);
        return Ok(());
    }

    display_packages(&packages, options.sizes);
    Ok(())
}

fn scan_with_progress(scanner: &Scanner) -> Vec<Package> {
    scanner.scan_all_with_progress(|status| match status.state {
        ScanState::Scanning => output::verbose(&format!("Scanning {}...", status.manager)),
        ScanState::Completed => {
            output::verbose(&format!("{}: {} packages", status.manager, status.count));
        }
        _ => {}
    })
}

fn display_packages(packages: &[Package], with_sizes: bool) {
    if packages.is_empty() {
        output::info("No packages found");
        return;
    }

    let mut grouped: HashMap<ManagerKind, Vec<&Package>> = HashMap::new();
    for pkg in packages {
        grouped.entry(pkg.manager.clone()).or_default().push(pkg);
    }

    output::header(&format!("Installed Packages ({})", packages.len()));

    for kind in ManagerKind::ALL {
        let Some(pkgs) = grouped.get(&kind) else {
            continue;
        };
        println!();
        println!("{}", format!("Manager: {}", kind).bold().cyan());
        for pkg in pkgs {
            let desc = pkg
                .description
                .as_deref()
                .map(|d| format!("  {}", truncate(d, 40).dimmed()))
                .unwrap_or_default();
            if with_sizes {
                println!(
                    "  {} {:<32} {:>14} {:>10}{}",
                    "✓".green(),
                    pkg.name,
                    pkg.version.dimmed(),
                    format_bytes(pkg.size),
                    desc
                );
            } else {
                println!(
                    "  {} {:<32} {:>14}{}",
                    "✓".green(),
                    pkg.name,
                    pkg.version.dimmed(),
                    desc
                );
            }
        }
    }

    if with_sizes {
        let total: u64 = packages.iter().map(|p| p.size).sum();
        println!();
        output::keyval("Total size", &format_bytes(total));
    }
}
