//! Clean command
//!
//! Previews the impact of removing the selected packages, asks for
//! confirmation, then uninstalls them one at a time.

use colored::Colorize;

use crate::commands::selection;
use crate::core::types::{ManagerKind, Severity, UninstallLog, UninstallPreview};
use crate::error::{Result, SweepError};
use crate::services::{Cleaner, Scanner};
use crate::ui as output;
use crate::ui::prompt_yes_no;
use crate::utils::format::{format_bytes, format_duration};

pub struct CleanOptions {
    pub packages: Vec<String>,
    pub manager: Option<String>,
    pub dry_run: bool,
    pub yes: bool,
}

pub fn run(options: CleanOptions) -> Result<()> {
    let scanner = Scanner::new();
    let default_kind: Option<ManagerKind> =
        options.manager.as_deref().map(str::parse).transpose()?;

    let specs = options
        .packages
        .iter()
        .map(|raw| selection::parse_spec(raw, default_kind.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    let inventory = match &default_kind {
        Some(kind) => scanner.scan_by_manager(kind)?,
        None => scanner.scan_all(),
    };
    let mut selected = selection::resolve_packages(&inventory, &specs)?;
    scanner.compute_sizes(&mut selected);

    let cleaner = Cleaner::new(scanner.registry());
    let preview = cleaner.preview_uninstall_deep(&selected);
    render_preview(&preview);

    if options.dry_run {
        output::info("Dry run, nothing was uninstalled");
        return Ok(());
    }

    if !options.yes
        && !prompt_yes_no(&format!(
            "Uninstall {} package(s)?",
            preview.packages.len()
        ))
    {
        output::info("Aborted");
        return Ok(());
    }

    let results = cleaner.execute_uninstall(&preview.packages);
    let log = cleaner.generate_log(&preview.packages, &results);
    render_results(&log);

    let failures = log.results.iter().filter(|r| !r.success).count();
    if failures > 0 {
        return Err(SweepError::Other(format!(
            "{} package(s) failed to uninstall",
            failures
        )));
    }
    Ok(())
}

fn render_preview(preview: &UninstallPreview) {
    output::header(&format!("Removal Preview ({})", preview.packages.len()));
    for pkg in &preview.packages {
        println!(
            "  {} {:<32} {:>14} {:>10}",
            "✗".red(),
            pkg.name,
            pkg.version.dimmed(),
            format_bytes(pkg.size)
        );
    }
    output::keyval("Total size", &format_bytes(preview.total_size));

    if !preview.affected_packages.is_empty() {
        output::header(&format!(
            "Affected Packages ({})",
            preview.affected_packages.len()
        ));
        for affected in &preview.affected_packages {
            let glyph = match affected.severity {
                Severity::Warning => "⚠".yellow(),
                Severity::Error => "✗".red(),
            };
            println!(
                "  {} {:<32} {}",
                glyph,
                affected.package,
                affected.reason.dimmed()
            );
        }
    }

    if !preview.dependencies.is_empty() {
        output::header(&format!("Dependencies ({})", preview.dependencies.len()));
        for dep in &preview.dependencies {
            let note = if dep.is_shared { "(shared)" } else { "" };
            println!(
                "  • {:<32} {:>10} {}",
                dep.name,
                format_bytes(dep.size),
                note.dimmed()
            );
        }
        output::keyval(
            "Dependencies size",
            &format_bytes(preview.dependencies_total_size),
        );
        output::info("Dependencies are not removed automatically");
    }
}

fn render_results(log: &UninstallLog) {
    output::separator();
    for result in &log.results {
        if result.success {
            output::success(&format!(
                "{} removed, freed {}",
                result.package.name,
                format_bytes(result.freed_space)
            ));
        } else {
            let reason = result.error.as_deref().unwrap_or("unknown error");
            output::error(&format!("{}: {}", result.package.name, reason));
        }
    }
    output::separator();
    output::keyval("Freed", &format_bytes(log.total_freed_space));
    output::keyval("Duration", &format_duration(log.total_duration));
    output::keyval("Success rate", &format!("{:.0}%", log.success_rate));
}
