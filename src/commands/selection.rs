//! Resolves command-line package arguments against the scanned inventory.
//!
//! Arguments are bare names ("wget") or manager-qualified ("brew:wget").
//! A bare name that exists under several managers is ambiguous and must be
//! qualified.

use crate::core::types::{ManagerKind, Package};
use crate::error::{Result, SweepError};
use crate::ui;

/// One package request from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageSpec {
    pub manager: Option<ManagerKind>,
    pub name: String,
}

/// Parses `MANAGER:NAME` or a bare name. The `--manager` flag, when given,
/// becomes the default for unqualified names; an explicit prefix wins.
/// An unrecognized prefix is an error.
pub fn parse_spec(raw: &str, default_manager: Option<&ManagerKind>) -> Result<PackageSpec> {
    if let Some((prefix, name)) = raw.split_once(':')
        && !prefix.is_empty()
        && !name.is_empty()
    {
        let kind = prefix.parse::<ManagerKind>()?;
        return Ok(PackageSpec {
            manager: Some(kind),
            name: name.to_string(),
        });
    }
    Ok(PackageSpec {
        manager: default_manager.cloned(),
        name: raw.to_string(),
    })
}

/// Matches specs against the inventory. Names that resolve nowhere are
/// reported and skipped; if nothing resolves, that is an error. Duplicate
/// requests collapse to one entry.
pub fn resolve_packages(inventory: &[Package], specs: &[PackageSpec]) -> Result<Vec<Package>> {
    let mut selection: Vec<Package> = Vec::new();
    let mut missing: Vec<String> = Vec::new();

    for spec in specs {
        let matches: Vec<&Package> = inventory
            .iter()
            .filter(|p| {
                p.name == spec.name
                    && spec.manager.as_ref().is_none_or(|kind| &p.manager == kind)
            })
            .collect();

        match matches.len() {
            0 => {
                ui::warning(&format!("Package not found: {}", spec.name));
                missing.push(spec.name.clone());
            }
            1 => {
                let pkg = matches[0];
                let already = selection
                    .iter()
                    .any(|p| p.name == pkg.name && p.manager == pkg.manager);
                if !already {
                    selection.push(pkg.clone());
                }
            }
            _ => {
                let managers: Vec<String> =
                    matches.iter().map(|p| p.manager.to_string()).collect();
                return Err(SweepError::Other(format!(
                    "'{}' is installed under several managers ({}); qualify it as MANAGER:{}",
                    spec.name,
                    managers.join(", "),
                    spec.name
                )));
            }
        }
    }

    if selection.is_empty() {
        return Err(SweepError::PackageNotFound(missing.join(", ")));
    }
    Ok(selection)
}
