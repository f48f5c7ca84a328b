//! Update checks against the upstream registries, gated by preferences.

use std::sync::Arc;

use chrono::Utc;
use rayon::prelude::*;

use crate::core::types::{Package, UpdateInfo};
use crate::managers::ManagerRegistry;
use crate::prefs::Preferences;
use crate::ui;

/// How many registry lookups run at once. Each one is a subprocess hitting
/// the network; unbounded fan-out trips rate limits.
pub const CONCURRENT_CHECKS: usize = 5;

/// Resolves latest published versions for installed packages.
pub struct VersionChecker {
    registry: Arc<ManagerRegistry>,
    prefs: Arc<dyn Preferences>,
}

impl VersionChecker {
    pub fn new(registry: Arc<ManagerRegistry>, prefs: Arc<dyn Preferences>) -> Self {
        Self { registry, prefs }
    }

    /// Looks up one package. Returns `None` when checking is disabled, the
    /// package is on the ignore list, its manager is unknown, or the
    /// upstream lookup comes back empty. Lookup failures are reported and
    /// also collapse to `None`.
    pub fn check_package(&self, pkg: &Package) -> Option<UpdateInfo> {
        if !self.prefs.should_check_updates() {
            return None;
        }
        if self.prefs.is_ignored(&pkg.name) {
            return None;
        }
        let manager = self.registry.get(&pkg.manager)?;
        match manager.latest_version(&pkg.name) {
            Ok(Some(latest)) => {
                let update_available = latest != pkg.version;
                Some(UpdateInfo {
                    latest_version: latest,
                    update_available,
                })
            }
            Ok(None) => None,
            Err(e) => {
                ui::warning(&format!("Version check failed for {}: {e}", pkg.name));
                None
            }
        }
    }

    /// Checks the packages on the watch list, skipping ignored ones, in
    /// batches of [`CONCURRENT_CHECKS`]. Each resolved update is streamed
    /// through `on_update` as it arrives. Stamps the last-check time when
    /// the pass finishes.
    pub fn check_all<F>(&self, packages: &[Package], on_update: F)
    where
        F: Fn(&Package, &UpdateInfo) + Send + Sync,
    {
        let candidates: Vec<&Package> = packages
            .iter()
            .filter(|p| self.prefs.is_watched(&p.name) && !self.prefs.is_ignored(&p.name))
            .collect();
        self.run_checks(&candidates, &on_update);
    }

    /// Checks every given package regardless of the watch list. The ignore
    /// list still applies.
    pub fn check_packages<F>(&self, packages: &[Package], on_update: F)
    where
        F: Fn(&Package, &UpdateInfo) + Send + Sync,
    {
        let candidates: Vec<&Package> = packages.iter().collect();
        self.run_checks(&candidates, &on_update);
    }

    fn run_checks<F>(&self, candidates: &[&Package], on_update: &F)
    where
        F: Fn(&Package, &UpdateInfo) + Send + Sync,
    {
        for chunk in candidates.chunks(CONCURRENT_CHECKS) {
            chunk.par_iter().for_each(|pkg| {
                if let Some(info) = self.check_package(pkg) {
                    on_update(pkg, &info);
                }
            });
        }
        if let Err(e) = self.prefs.set_last_check_time(Utc::now()) {
            ui::warning(&format!("Failed to record check time: {e}"));
        }
    }
}
