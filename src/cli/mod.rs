//! Command-line interface for catalog-resolver.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **apply**: Write the resolved catalogs into the package manager configuration
//! - **list**: List catalog groups with their resolved sizes and validation levels
//! - **show**: Show the resolved packages of one group
//! - **resolve**: Resolve a `catalog:` alias for a package
//! - **validate**: Check workspace manifests against the catalog policy
//! - **add**: Show how a new dependency would be recorded
//!
//! ## Usage
//!
//! ```text
//! # Sync .yarnrc.yml with catalogs.yml
//! catalogs apply
//!
//! # Fail in CI when the two are out of sync
//! catalogs apply --check
//!
//! # Inspect a group
//! catalogs show stable/next --format json
//!
//! # Check workspaces
//! catalogs validate packages/*/package.json
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::catalog::store::{ConfigStore, DEFINITION_FILE, NATIVE_FILE};

pub mod apply;
pub mod catalog;
pub mod workspace;

#[derive(Parser)]
#[command(name = "catalogs")]
#[command(version)]
#[command(about = "Hierarchical dependency catalogs for Yarn workspaces")]
#[command(
    long_about = "catalogs keeps dependency versions for a monorepo in one hierarchical catalogs.yml.\n\nGroups inherit from their `/`-delimited ancestors and are flattened into the catalogs of .yarnrc.yml. Workspaces reference them with `catalog:<group>` ranges, and a per-group policy decides how strictly that is enforced."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Project root holding the catalog definition
    #[arg(short, long, global = true, default_value = ".")]
    pub project: PathBuf,

    /// Catalog definition file, relative to the project root
    #[arg(long, global = true, default_value = DEFINITION_FILE)]
    pub definition_file: PathBuf,

    /// Package manager configuration file, relative to the project root
    #[arg(long, global = true, default_value = NATIVE_FILE)]
    pub native_file: PathBuf,
}

impl Cli {
    /// Project context for the configured root and file names
    #[must_use]
    pub fn project(&self) -> Project {
        Project {
            root: self.project.clone(),
            store: ConfigStore::new()
                .with_definition_file(&self.definition_file)
                .with_native_file(&self.native_file),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write resolved catalogs into the package manager configuration
    Apply(apply::ApplyArgs),

    /// List catalog groups
    List(catalog::ListArgs),

    /// Show the resolved packages of a catalog group
    Show(catalog::ShowArgs),

    /// Resolve the range behind a catalog alias
    Resolve(catalog::ResolveArgs),

    /// Validate workspace manifests against the catalog policy
    Validate(workspace::ValidateArgs),

    /// Show how a new dependency would be recorded
    Add(workspace::AddArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// A project root together with its configuration store
#[derive(Debug)]
pub struct Project {
    pub root: PathBuf,
    pub store: ConfigStore,
}
