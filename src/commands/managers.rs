//! Managers command
//!
//! Shows which supported package managers are installed on this machine.

use colored::Colorize;

use crate::core::types::ManagerKind;
use crate::error::Result;
use crate::services::Scanner;
use crate::ui as output;

pub fn run() -> Result<()> {
    let scanner = Scanner::new();
    let registry = scanner.registry();
    let available = scanner.available_managers();

    output::header("Package Managers");
    let mut installed = 0;
    for kind in ManagerKind::ALL {
        let Some(adapter) = registry.get(&kind) else {
            continue;
        };
        // The cask kind shares the Homebrew adapter, so its availability
        // follows the brew probe.
        let present = available.contains(&adapter.kind());
        let status = if present {
            installed += 1;
            "✓".green().bold()
        } else {
            "✗".red().bold()
        };
        println!(
            "  {} {:<10} {}",
            status,
            kind.to_string(),
            adapter.display_name().dimmed()
        );
    }

    println!();
    output::info(&format!(
        "{} of {} managers available",
        installed,
        ManagerKind::ALL.len()
    ));
    Ok(())
}
