//! # Package Manager Adapters
//!
//! Every supported package manager implements the [`PackageManager`] trait
//! and is registered in the [`ManagerRegistry`] keyed by
//! [`ManagerKind`](crate::core::types::ManagerKind).
//!
//! ## Adapters
//!
//! - **Homebrew** (`brew.rs`): one adapter serving two inventories, formulae
//!   and casks. `ManagerKind::Brew` and `ManagerKind::BrewCask` resolve to
//!   the same instance; cask-tagged packages get `--cask` flagged commands.
//! - **Node** (`node.rs`): npm, pnpm and yarn share one flavor-parameterised
//!   adapter since they differ only in command spelling and list format.
//! - **pip** (`pip.rs`): Python packages from `pip3 list`.
//!
//! ## Adding a New Adapter
//!
//! 1. Add a `ManagerKind` variant in `core/types.rs`
//! 2. Create the adapter and implement `PackageManager`
//! 3. Register it in `ManagerRegistry::register_defaults()`

pub mod brew;
pub mod node;
pub mod pip;
pub mod registry;
pub mod traits;
pub mod tree;

pub use registry::ManagerRegistry;
pub use traits::PackageManager;
