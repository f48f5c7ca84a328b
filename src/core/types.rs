use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::SweepError;

// Supported package managers.
// Homebrew surfaces two inventories (formulae and casks) through one binary,
// so Brew and BrewCask resolve to the same adapter in the registry.
// To add a new manager (e.g. Cargo), add a variant here and update:
// - ManagerKind::fmt() / from_str()
// - ManagerRegistry::register_defaults()
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManagerKind {
    Brew,     // Homebrew formulae (CLI tools)
    BrewCask, // Homebrew casks (application bundles)
    Npm,
    Pnpm,
    Yarn,
    Pip,
}

impl ManagerKind {
    /// Every supported kind, in display order.
    pub const ALL: [ManagerKind; 6] = [
        ManagerKind::Brew,
        ManagerKind::BrewCask,
        ManagerKind::Npm,
        ManagerKind::Pnpm,
        ManagerKind::Yarn,
        ManagerKind::Pip,
    ];
}

impl fmt::Display for ManagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Brew => write!(f, "brew"),
            Self::BrewCask => write!(f, "brew-cask"),
            Self::Npm => write!(f, "npm"),
            Self::Pnpm => write!(f, "pnpm"),
            Self::Yarn => write!(f, "yarn"),
            Self::Pip => write!(f, "pip"),
        }
    }
}

// Parsing is centralized here. Accepts the canonical identifiers plus the
// aliases people actually type ("cask", "pip3").
impl FromStr for ManagerKind {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "brew" => Ok(Self::Brew),
            "brew-cask" | "cask" => Ok(Self::BrewCask),
            "npm" => Ok(Self::Npm),
            "pnpm" => Ok(Self::Pnpm),
            "yarn" => Ok(Self::Yarn),
            "pip" | "pip3" => Ok(Self::Pip),
            other => Err(SweepError::UnknownManager(other.to_string())),
        }
    }
}

// One installed package as reported by its manager.
// Identity is (name, manager); the same name may appear under several managers.
// size stays 0 until the dedicated size pass fills it in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub version: String,
    pub manager: ManagerKind,
    pub install_path: PathBuf,
    pub size: u64,
    pub dependencies_size: u64,
    pub installed_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    pub description: Option<String>,
    pub is_dev: Option<bool>,
    pub is_global: Option<bool>,
    pub latest_version: Option<String>,
    pub update_available: Option<bool>,
    pub is_checking: Option<bool>,
}

impl Package {
    // Dates come from filesystem metadata of the install path, falling back
    // to now when the path does not exist (e.g. stale listings).
    pub fn new(name: String, version: String, manager: ManagerKind, install_path: PathBuf) -> Self {
        let (installed_date, modified_date) = crate::utils::paths::file_dates(&install_path);
        Package {
            name,
            version,
            manager,
            install_path,
            size: 0,
            dependencies_size: 0,
            installed_date,
            modified_date,
            description: None,
            is_dev: None,
            is_global: None,
            latest_version: None,
            update_available: None,
            is_checking: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Direct,
    Indirect,
    Optional,
    Dev,
}

// Flat dependency edge, produced on demand for previews. Not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub version: String,
    pub kind: DependencyKind,
    pub is_shared: bool,
    pub used_by: Vec<String>,
    pub size: u64,
}

// Node in a resolved dependency tree. depth is 0 for the root and never
// exceeds tree::MAX_DEPTH; a name@version already on the root-to-node path
// is emitted once more as a leaf and not expanded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyTreeNode {
    pub name: String,
    pub version: String,
    pub kind: DependencyKind,
    pub is_shared: bool,
    pub children: Vec<DependencyTreeNode>,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

// A package outside the uninstall selection that would be impacted by it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffectedPackage {
    pub package: String,
    pub reason: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UninstallPreview {
    pub packages: Vec<Package>,
    pub total_size: u64,
    pub affected_packages: Vec<AffectedPackage>,
    pub dependencies: Vec<Dependency>,
    pub dependencies_total_size: u64,
}

// Outcome of one uninstall attempt. freed_space equals the package size
// only on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UninstallResult {
    pub success: bool,
    pub package: Package,
    pub error: Option<String>,
    pub freed_space: u64,
    pub duration: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UninstallLog {
    pub timestamp: DateTime<Utc>,
    pub packages: Vec<Package>,
    pub results: Vec<UninstallResult>,
    pub total_freed_space: u64,
    pub total_duration: Duration,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanState {
    Pending,
    Scanning,
    Completed,
    Failed,
}

// Progress snapshot streamed to the scanner's caller while a fan-out runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerStatus {
    pub manager: ManagerKind,
    pub state: ScanState,
    pub count: usize,
    pub message: Option<String>,
}

// Result of a single version check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateInfo {
    pub latest_version: String,
    pub update_available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manager_kind_display_round_trips() {
        let kinds = [
            ManagerKind::Brew,
            ManagerKind::BrewCask,
            ManagerKind::Npm,
            ManagerKind::Pnpm,
            ManagerKind::Yarn,
            ManagerKind::Pip,
        ];
        for kind in kinds {
            let parsed: ManagerKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn manager_kind_aliases() {
        assert_eq!("cask".parse::<ManagerKind>().unwrap(), ManagerKind::BrewCask);
        assert_eq!("pip3".parse::<ManagerKind>().unwrap(), ManagerKind::Pip);
    }

    #[test]
    fn unknown_manager_is_loud() {
        let err = "cargo".parse::<ManagerKind>().unwrap_err();
        assert!(err.to_string().contains("cargo"));
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&ManagerKind::BrewCask).unwrap();
        assert_eq!(json, "\"brew-cask\"");
        let back: ManagerKind = serde_json::from_str("\"pnpm\"").unwrap();
        assert_eq!(back, ManagerKind::Pnpm);
    }
}
