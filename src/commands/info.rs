//! Info command
//!
//! Shows details for one installed package, optionally with its
//! dependency tree.

use colored::Colorize;

use crate::commands::selection::{self, PackageSpec};
use crate::core::types::{DependencyTreeNode, ManagerKind, Package};
use crate::error::{Result, SweepError};
use crate::services::Scanner;
use crate::ui as output;
use crate::utils::format::{format_bytes, format_date};

pub struct InfoOptions {
    pub name: String,
    pub manager: Option<String>,
    pub tree: bool,
}

pub fn run(options: InfoOptions) -> Result<()> {
    let scanner = Scanner::new();
    let default_kind: Option<ManagerKind> =
        options.manager.as_deref().map(str::parse).transpose()?;
    let spec = selection::parse_spec(&options.name, default_kind.as_ref())?;

    let mut pkg = find_package(&scanner, &spec)?;

    let Some(adapter) = scanner.manager(&pkg.manager) else {
        return Err(SweepError::UnknownManager(pkg.manager.to_string()));
    };

    // Listings leave sizes at 0; fill it in for the one package shown.
    if pkg.size == 0 {
        pkg.size = adapter.calculate_size(&pkg.name)?;
    }

    output::header(&pkg.name);
    output::keyval("Manager", &pkg.manager.to_string());
    output::keyval("Version", &pkg.version);
    if let Some(desc) = &pkg.description {
        output::keyval("Description", desc);
    }
    output::keyval("Path", &pkg.install_path.display().to_string());
    output::keyval("Size", &format_bytes(pkg.size));
    output::keyval("Installed", &format_date(&pkg.installed_date));
    output::keyval("Modified", &format_date(&pkg.modified_date));
    if let Some(true) = pkg.is_global {
        output::keyval("Scope", "global");
    }

    if options.tree {
        let tree = adapter.dependency_tree(&pkg.name)?;
        output::header("Dependency Tree");
        print_tree(&tree, "");
        return Ok(());
    }

    let deps = adapter.dependencies(&pkg.name)?;
    if !deps.is_empty() {
        output::header(&format!("Dependencies ({})", deps.len()));
        for dep in &deps {
            let note = if dep.is_shared {
                format!("shared with {}", dep.used_by.join(", "))
            } else {
                String::new()
            };
            println!(
                "  • {:<32} {:>14} {:>10} {}",
                dep.name,
                dep.version.dimmed(),
                format_bytes(dep.size),
                note.dimmed()
            );
        }
        let deps_total: u64 = deps.iter().map(|d| d.size).sum();
        println!();
        output::keyval("Dependencies size", &format_bytes(deps_total));
    }

    Ok(())
}

/// Looks the package up under its manager, or probes every available
/// manager in registry order when none was given.
fn find_package(scanner: &Scanner, spec: &PackageSpec) -> Result<Package> {
    match &spec.manager {
        Some(kind) => {
            let Some(adapter) = scanner.manager(kind) else {
                return Err(SweepError::UnknownManager(kind.to_string()));
            };
            if !adapter.is_available() {
                return Err(SweepError::ManagerUnavailable(kind.clone()));
            }
            adapter
                .package_info(&spec.name)?
                .ok_or_else(|| SweepError::PackageNotFound(spec.name.clone()))
        }
        None => {
            for adapter in scanner.registry().scan_targets() {
                if !adapter.is_available() {
                    continue;
                }
                if let Ok(Some(pkg)) = adapter.package_info(&spec.name) {
                    return Ok(pkg);
                }
            }
            Err(SweepError::PackageNotFound(spec.name.clone()))
        }
    }
}

fn print_tree(node: &DependencyTreeNode, prefix: &str) {
    if node.depth == 0 {
        println!("{} {}", node.name.bold(), node.version.dimmed());
    }
    for (i, child) in node.children.iter().enumerate() {
        let last = i + 1 == node.children.len();
        let connector = if last { "└── " } else { "├── " };
        let shared = if child.is_shared { " (shared)" } else { "" };
        println!(
            "{}{}{} {}{}",
            prefix,
            connector,
            child.name,
            child.version.dimmed(),
            shared.dimmed()
        );
        let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
        print_tree(child, &child_prefix);
    }
}
