//! Parallel inventory scan across every detected package manager.

use std::sync::Arc;

use rayon::prelude::*;

use crate::core::types::{ManagerKind, ManagerStatus, Package, ScanState};
use crate::error::{Result, SweepError};
use crate::managers::{ManagerRegistry, PackageManager};
use crate::ui;
use crate::utils::paths;

/// How many size computations run at once. Disk walks are I/O bound and
/// hammering the filesystem with dozens of concurrent traversals makes
/// every one of them slower.
pub const SIZE_BATCH: usize = 5;

/// Discovers installed packages by fanning out over the registry.
pub struct Scanner {
    registry: Arc<ManagerRegistry>,
}

impl Scanner {
    pub fn new() -> Self {
        Self::with_registry(Arc::new(ManagerRegistry::default()))
    }

    pub fn with_registry(registry: Arc<ManagerRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> Arc<ManagerRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn manager(&self, kind: &ManagerKind) -> Option<Arc<dyn PackageManager>> {
        self.registry.get(kind)
    }

    /// Probes every scan target in parallel and reports the ones that are
    /// actually installed on this machine.
    pub fn available_managers(&self) -> Vec<ManagerKind> {
        self.registry
            .scan_targets()
            .par_iter()
            .filter(|adapter| adapter.is_available())
            .map(|adapter| adapter.kind())
            .collect()
    }

    /// Scans every available manager and concatenates the results in
    /// registry order.
    pub fn scan_all(&self) -> Vec<Package> {
        self.scan_all_with_progress(|_| {})
    }

    /// Like [`scan_all`](Self::scan_all), but streams a [`ManagerStatus`]
    /// before and after each manager so callers can render progress.
    /// Managers that are not installed are skipped without a status.
    pub fn scan_all_with_progress<F>(&self, on_status: F) -> Vec<Package>
    where
        F: Fn(ManagerStatus) + Send + Sync,
    {
        let per_manager: Vec<Vec<Package>> = self
            .registry
            .scan_targets()
            .par_iter()
            .map(|adapter| self.scan_one(adapter.as_ref(), &on_status))
            .collect();
        per_manager.into_iter().flatten().collect()
    }

    fn scan_one<F>(&self, adapter: &dyn PackageManager, on_status: &F) -> Vec<Package>
    where
        F: Fn(ManagerStatus) + Send + Sync,
    {
        let kind = adapter.kind();
        if !adapter.is_available() {
            return Vec::new();
        }
        on_status(ManagerStatus {
            manager: kind.clone(),
            state: ScanState::Scanning,
            count: 0,
            message: None,
        });
        match adapter.list_packages(global_scope(&kind)) {
            Ok(packages) => {
                on_status(ManagerStatus {
                    manager: kind,
                    state: ScanState::Completed,
                    count: packages.len(),
                    message: None,
                });
                packages
            }
            Err(e) => {
                ui::warning(&format!("Failed to scan {kind}: {e}"));
                on_status(ManagerStatus {
                    manager: kind,
                    state: ScanState::Failed,
                    count: 0,
                    message: Some(e.to_string()),
                });
                Vec::new()
            }
        }
    }

    /// Scans a single manager, failing loudly when it is not registered or
    /// not installed. Results are narrowed to the requested kind, so asking
    /// for `brew-cask` returns only casks even though the Homebrew adapter
    /// lists both inventories.
    pub fn scan_by_manager(&self, kind: &ManagerKind) -> Result<Vec<Package>> {
        let Some(adapter) = self.registry.get(kind) else {
            return Err(SweepError::UnknownManager(kind.to_string()));
        };
        if !adapter.is_available() {
            return Err(SweepError::ManagerUnavailable(kind.clone()));
        }
        let mut packages = adapter.list_packages(global_scope(&adapter.kind()))?;
        packages.retain(|p| &p.manager == kind);
        Ok(packages)
    }

    /// Fills in missing disk sizes by walking each install path, at most
    /// [`SIZE_BATCH`] packages at a time. Packages that already carry a size
    /// are left alone.
    pub fn compute_sizes(&self, packages: &mut [Package]) {
        for chunk in packages.chunks_mut(SIZE_BATCH) {
            chunk.par_iter_mut().for_each(|pkg| {
                if pkg.size != 0 {
                    return;
                }
                pkg.size = paths::directory_size(&pkg.install_path);
            });
        }
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Node and Python managers list their global inventories; Homebrew has no
/// local scope and lists formulae and casks together.
fn global_scope(kind: &ManagerKind) -> bool {
    !matches!(kind, ManagerKind::Brew)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Package;
    use std::path::PathBuf;

    #[test]
    fn compute_sizes_leaves_known_sizes_alone() {
        let scanner = Scanner::with_registry(Arc::new(ManagerRegistry::new()));
        let mut packages = vec![
            {
                let mut p = Package::new(
                    "cached".to_string(),
                    "1.0.0".to_string(),
                    ManagerKind::Npm,
                    PathBuf::from("/nonexistent/cached"),
                );
                p.size = 42;
                p
            },
            Package::new(
                "missing".to_string(),
                "1.0.0".to_string(),
                ManagerKind::Npm,
                PathBuf::from("/nonexistent/missing"),
            ),
        ];
        scanner.compute_sizes(&mut packages);
        assert_eq!(packages[0].size, 42);
        assert_eq!(packages[1].size, 0);
    }

    #[test]
    fn brew_scans_both_inventories_others_scan_global() {
        assert!(!global_scope(&ManagerKind::Brew));
        assert!(global_scope(&ManagerKind::BrewCask));
        assert!(global_scope(&ManagerKind::Npm));
        assert!(global_scope(&ManagerKind::Pip));
    }
}
