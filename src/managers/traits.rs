use crate::core::types::{Dependency, DependencyTreeNode, ManagerKind, Package};
use crate::error::{Result, SweepError};
use crate::exec::{self, COMMAND_TIMEOUT};
use crate::managers::tree;
use crate::utils::paths;

pub trait PackageManager: Send + Sync {
    fn kind(&self) -> ManagerKind;
    fn display_name(&self) -> &str;
    fn command(&self) -> &str;
    fn list_packages(&self, global_only: bool) -> Result<Vec<Package>>;
    fn package_info(&self, name: &str) -> Result<Option<Package>>;
    fn dependencies(&self, name: &str) -> Result<Vec<Dependency>>;
    fn uninstall(&self, name: &str) -> Result<()>;
    fn upgrade(&self, name: &str, version: Option<&str>) -> Result<()>;

    /// Latest published version of a package.
    /// `Ok(None)` when the lookup fails or the registry knows nothing;
    /// adapters only return `Err` for broken plumbing (spawn failures).
    fn latest_version(&self, name: &str) -> Result<Option<String>>;

    /// Probe for the manager binary on PATH. Never fails.
    fn is_available(&self) -> bool {
        which::which(self.command()).is_ok()
    }

    /// Installed packages that depend on the given package.
    /// Default: managers without a reverse lookup report none.
    fn reverse_dependencies(&self, _name: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    /// Dependency tree rooted at `name`, bounded in depth and cycle-safe.
    fn dependency_tree(&self, name: &str) -> Result<DependencyTreeNode> {
        tree::build(self, name)
    }

    /// On-disk footprint of an installed package in bytes.
    /// Default: walk the install path; unknown packages are 0.
    fn calculate_size(&self, name: &str) -> Result<u64> {
        match self.package_info(name)? {
            Some(pkg) => Ok(paths::directory_size(&pkg.install_path)),
            None => Ok(0),
        }
    }

    /// Run the manager binary and require a zero exit, returning stdout.
    /// Non-zero exit becomes `CommandFailed` carrying trimmed stderr.
    fn execute(&self, args: &[&str]) -> Result<String> {
        let output = exec::run_command(self.command(), args, None, COMMAND_TIMEOUT)?;
        if !output.success() {
            let stderr = output.stderr.trim();
            let reason = if stderr.is_empty() {
                format!("exit code {}", output.exit_code)
            } else {
                stderr.to_string()
            };
            return Err(SweepError::CommandFailed {
                command: format!("{} {}", self.command(), args.join(" ")),
                reason,
            });
        }
        Ok(output.stdout)
    }
}
