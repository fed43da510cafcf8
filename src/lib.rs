//! # catalog-resolver
//!
//! Hierarchical dependency catalogs for Yarn workspaces.
//!
//! A monorepo that pins the same dependency in dozens of workspaces ends up
//! with drifting versions. Catalogs fix that: versions live in one place and
//! workspaces reference them with `catalog:<group>` ranges.
//!
//! `catalog-resolver` layers a hierarchy on top of the package manager's flat
//! catalogs. Groups are named by `/`-delimited paths and inherit from their
//! ancestors, so `stable/next` only lists what differs from `stable`.
//!
//! ## Features
//!
//! - **Inheritance**: groups merge their ancestors' entries, most specific wins
//! - **Default groups**: new dependencies are rewritten to a catalog alias,
//!   either from an ordered list or from the group the workspace uses most
//! - **Validation**: `off`, `warn` or `strict`, per group or globally
//! - **Workspace filters**: glob-based include, ignore and skip-validation sets
//! - **Apply**: flatten the hierarchy into `.yarnrc.yml` without touching the
//!   rest of the file
//!
//! ## Example
//!
//! ```rust
//! use catalog_resolver::{CatalogDefinition, CatalogHooks, DependencyKind, GroupName, Workspace};
//! use catalog_resolver::host::hooks::AddOutcome;
//!
//! let yaml = "
//! options:
//!   defaultGroups: [stable]
//! list:
//!   stable:
//!     react: ^18.3.1
//! ";
//! let definition = CatalogDefinition::from_yaml(yaml).unwrap();
//! let hooks = CatalogHooks::new(&definition);
//!
//! let range = hooks.resolve_range(&GroupName::new("stable"), "react").unwrap();
//! assert_eq!(range, "npm:^18.3.1");
//!
//! let outcome = hooks
//!     .on_dependency_added(&Workspace::new("@app/web"), DependencyKind::Dependencies, "react", "^18.0.0")
//!     .unwrap();
//! assert_eq!(outcome, AddOutcome::Rewrite("catalog:stable".to_string()));
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Definition loading, inheritance and the native catalog surface
//! - [`core`]: Group names, options and workspace manifests
//! - [`policy`]: Workspace filters, default groups and validation levels
//! - [`host`]: Hooks for the package manager
//! - [`cli`]: Command-line interface implementation

pub mod catalog;
pub mod cli;
pub mod core;
pub mod host;
pub mod policy;
pub mod utils;

// Re-export commonly used types for convenience
pub use catalog::definition::{CatalogDefinition, CatalogGroup};
pub use catalog::store::{AliasError, CatalogError, ConfigStore};
pub use core::types::*;
pub use core::workspace::{DependencyKind, Workspace};
pub use host::hooks::{CatalogHooks, PolicyError};
