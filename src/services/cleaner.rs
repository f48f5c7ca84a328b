//! Bulk uninstall: impact preview, sequential execution, run log.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use crate::core::types::{
    AffectedPackage, Dependency, Package, Severity, UninstallLog, UninstallPreview,
    UninstallResult,
};
use crate::error::Result;
use crate::managers::{ManagerRegistry, PackageManager};
use crate::ui;

/// Plans and executes bulk uninstalls through the registry's adapters.
pub struct Cleaner {
    registry: Arc<ManagerRegistry>,
}

impl Cleaner {
    pub fn new(registry: Arc<ManagerRegistry>) -> Self {
        Self { registry }
    }

    /// Totals-only preview: the selection and how much disk it holds.
    pub fn preview_uninstall(&self, packages: &[Package]) -> UninstallPreview {
        UninstallPreview {
            packages: packages.to_vec(),
            total_size: packages.iter().map(|p| p.size).sum(),
            affected_packages: Vec::new(),
            dependencies: Vec::new(),
            dependencies_total_size: 0,
        }
    }

    /// Full impact preview. On top of the totals this collects, per selected
    /// package, the installed packages outside the selection that depend on
    /// it, and the union of its dependency edges with their disk footprint.
    /// A package whose analysis fails is reported and skipped; the preview
    /// still covers the rest.
    pub fn preview_uninstall_deep(&self, packages: &[Package]) -> UninstallPreview {
        let mut preview = self.preview_uninstall(packages);
        let mut dependencies: Vec<Dependency> = Vec::new();

        for pkg in packages {
            let Some(manager) = self.registry.get(&pkg.manager) else {
                continue;
            };
            if let Err(e) = analyze_package(
                manager.as_ref(),
                pkg,
                packages,
                &mut preview.affected_packages,
                &mut dependencies,
            ) {
                ui::warning(&format!("Failed to analyze {}: {e}", pkg.name));
            }
        }

        preview.dependencies_total_size = dependencies.iter().map(|d| d.size).sum();
        preview.dependencies = dependencies;
        preview
    }

    /// Uninstalls strictly in input order, one result per package. A missing
    /// adapter or a failed command becomes a failure entry; later packages
    /// still run.
    pub fn execute_uninstall(&self, packages: &[Package]) -> Vec<UninstallResult> {
        let mut results = Vec::with_capacity(packages.len());
        for pkg in packages {
            let start = Instant::now();
            let Some(manager) = self.registry.get(&pkg.manager) else {
                results.push(UninstallResult {
                    success: false,
                    package: pkg.clone(),
                    error: Some(format!("Package manager not found: {}", pkg.manager)),
                    freed_space: 0,
                    duration: start.elapsed(),
                });
                continue;
            };
            match manager.uninstall(&pkg.name) {
                Ok(()) => results.push(UninstallResult {
                    success: true,
                    package: pkg.clone(),
                    error: None,
                    freed_space: pkg.size,
                    duration: start.elapsed(),
                }),
                Err(e) => results.push(UninstallResult {
                    success: false,
                    package: pkg.clone(),
                    error: Some(e.to_string()),
                    freed_space: 0,
                    duration: start.elapsed(),
                }),
            }
        }
        results
    }

    /// Aggregates a finished run into a timestamped log entry.
    pub fn generate_log(&self, packages: &[Package], results: &[UninstallResult]) -> UninstallLog {
        let successes = results.iter().filter(|r| r.success).count();
        let success_rate = if results.is_empty() {
            0.0
        } else {
            successes as f64 / results.len() as f64 * 100.0
        };
        UninstallLog {
            timestamp: Utc::now(),
            packages: packages.to_vec(),
            results: results.to_vec(),
            total_freed_space: results.iter().map(|r| r.freed_space).sum(),
            total_duration: results.iter().map(|r| r.duration).sum(),
            success_rate,
        }
    }
}

fn analyze_package(
    manager: &dyn PackageManager,
    pkg: &Package,
    selection: &[Package],
    affected: &mut Vec<AffectedPackage>,
    dependencies: &mut Vec<Dependency>,
) -> Result<()> {
    for dependent in manager.reverse_dependencies(&pkg.name)? {
        if selection.iter().any(|p| p.name == dependent) {
            continue;
        }
        affected.push(AffectedPackage {
            package: dependent,
            reason: format!("Depends on {}", pkg.name),
            severity: Severity::Warning,
        });
    }
    for dep in manager.dependencies(&pkg.name)? {
        // Name-keyed union: a later edge for the same name replaces the
        // earlier one, first-seen order is kept.
        if let Some(existing) = dependencies.iter_mut().find(|d| d.name == dep.name) {
            *existing = dep;
        } else {
            dependencies.push(dep);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ManagerKind;
    use std::path::PathBuf;
    use std::time::Duration;

    fn cleaner() -> Cleaner {
        Cleaner::new(Arc::new(ManagerRegistry::new()))
    }

    fn pkg(name: &str, size: u64) -> Package {
        let mut p = Package::new(
            name.to_string(),
            "1.0.0".to_string(),
            ManagerKind::Npm,
            PathBuf::from("/tmp"),
        );
        p.size = size;
        p
    }

    fn result(name: &str, success: bool, freed: u64, ms: u64) -> UninstallResult {
        UninstallResult {
            success,
            package: pkg(name, freed),
            error: if success { None } else { Some("boom".into()) },
            freed_space: freed,
            duration: Duration::from_millis(ms),
        }
    }

    #[test]
    fn empty_selection_previews_to_zero() {
        let preview = cleaner().preview_uninstall(&[]);
        assert!(preview.packages.is_empty());
        assert_eq!(preview.total_size, 0);
        assert!(preview.affected_packages.is_empty());
        assert!(preview.dependencies.is_empty());
    }

    #[test]
    fn preview_sums_selection_sizes() {
        let preview = cleaner().preview_uninstall(&[pkg("a", 100), pkg("b", 250)]);
        assert_eq!(preview.total_size, 350);
    }

    #[test]
    fn log_of_no_results_has_zero_rate() {
        let log = cleaner().generate_log(&[], &[]);
        assert_eq!(log.success_rate, 0.0);
        assert_eq!(log.total_freed_space, 0);
        assert_eq!(log.total_duration, Duration::ZERO);
    }

    #[test]
    fn log_aggregates_mixed_results() {
        let packages = vec![pkg("a", 100), pkg("b", 200)];
        let results = vec![result("a", true, 100, 30), result("b", false, 0, 10)];
        let log = cleaner().generate_log(&packages, &results);
        assert_eq!(log.success_rate, 50.0);
        assert_eq!(log.total_freed_space, 100);
        assert_eq!(log.total_duration, Duration::from_millis(40));
        assert_eq!(log.results.len(), 2);
    }

    #[test]
    fn all_successes_rate_is_one_hundred() {
        let packages = vec![pkg("a", 1)];
        let results = vec![result("a", true, 1, 5)];
        let log = cleaner().generate_log(&packages, &results);
        assert_eq!(log.success_rate, 100.0);
    }

    #[test]
    fn missing_adapter_is_a_failure_entry() {
        let results = cleaner().execute_uninstall(&[pkg("orphan", 10)]);
        assert_eq!(results.len(), 1);
        assert!(!results[0].success);
        assert_eq!(results[0].freed_space, 0);
        assert_eq!(
            results[0].error.as_deref(),
            Some("Package manager not found: npm")
        );
    }
}
