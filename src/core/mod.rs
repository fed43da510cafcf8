//! Core types shared by the catalog, policy and host layers.
//!
//! - [`types::GroupName`]: `/`-delimited catalog group path
//! - [`types::ValidationLevel`]: `off`, `warn` or `strict`
//! - [`options::Options`]: validated `options` block of the definition file
//! - [`workspace::Workspace`]: the dependency sections of a workspace manifest

pub mod options;
pub mod types;
pub mod workspace;
