use std::collections::HashMap;
use std::sync::Arc;

use crate::core::types::ManagerKind;
use crate::managers::brew::BrewAdapter;
use crate::managers::node::NodeAdapter;
use crate::managers::pip::PipAdapter;
use crate::managers::traits::PackageManager;

/// Lookup table of manager adapters keyed by [`ManagerKind`].
///
/// All six kinds resolve; `BrewCask` aliases the brew adapter instance since
/// both inventories are served by the same binary.
pub struct ManagerRegistry {
    managers: HashMap<ManagerKind, Arc<dyn PackageManager>>,
}

impl ManagerRegistry {
    pub fn new() -> Self {
        Self {
            managers: HashMap::new(),
        }
    }

    pub fn register(&mut self, kind: ManagerKind, manager: Arc<dyn PackageManager>) {
        self.managers.insert(kind, manager);
    }

    pub fn get(&self, kind: &ManagerKind) -> Option<Arc<dyn PackageManager>> {
        self.managers.get(kind).cloned()
    }

    pub fn has(&self, kind: &ManagerKind) -> bool {
        self.managers.contains_key(kind)
    }

    /// Distinct adapters in scan order. `BrewCask` is not a separate target;
    /// cask packages come out of the brew adapter's listing already tagged.
    pub fn scan_targets(&self) -> Vec<Arc<dyn PackageManager>> {
        [
            ManagerKind::Brew,
            ManagerKind::Npm,
            ManagerKind::Pnpm,
            ManagerKind::Yarn,
            ManagerKind::Pip,
        ]
        .iter()
        .filter_map(|kind| self.get(kind))
        .collect()
    }

    pub fn register_defaults(&mut self) {
        let brew: Arc<dyn PackageManager> = Arc::new(BrewAdapter::new());
        self.register(ManagerKind::Brew, brew.clone());
        self.register(ManagerKind::BrewCask, brew);
        self.register(ManagerKind::Npm, Arc::new(NodeAdapter::npm()));
        self.register(ManagerKind::Pnpm, Arc::new(NodeAdapter::pnpm()));
        self.register(ManagerKind::Yarn, Arc::new(NodeAdapter::yarn()));
        self.register(ManagerKind::Pip, Arc::new(PipAdapter::new()));
    }
}

impl Default for ManagerRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register_defaults();
        registry
    }
}
