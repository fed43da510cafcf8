use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use super::definition::CatalogDefinition;
use super::native::NativeSurface;
use super::projection::Projection;
use crate::core::types::GroupName;

/// Default definition file name, relative to the project root
pub const DEFINITION_FILE: &str = "catalogs.yml";

/// Default host configuration file holding the applied catalogs
pub const NATIVE_FILE: &str = ".yarnrc.yml";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog definition not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Invalid catalog format: {0}")]
    InvalidFormat(String),

    #[error(transparent)]
    InvalidAlias(#[from] AliasError),

    #[error("Failed to serialize catalogs: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A reference to a group or package the definition does not provide
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AliasError {
    #[error("Group '{child}' inherits from '{ancestor}', which is not defined")]
    MissingAncestor { ancestor: GroupName, child: GroupName },

    #[error("Catalog group '{0}' is not defined")]
    UnknownGroup(GroupName),

    #[error("Package '{package}' is not defined in catalog group '{group}'")]
    MissingPackage { group: GroupName, package: String },
}

/// Loads and caches catalog configuration per project root.
///
/// Each root holds at most one parsed definition and one applied-catalogs
/// snapshot. Entries live until [`ConfigStore::invalidate`] is called.
#[derive(Debug)]
pub struct ConfigStore {
    definition_file: PathBuf,
    native: NativeSurface,
    definitions: HashMap<PathBuf, Arc<CatalogDefinition>>,
    applied: HashMap<PathBuf, Arc<Projection>>,
}

impl ConfigStore {
    /// Create a store using the default file names
    #[must_use]
    pub fn new() -> Self {
        Self {
            definition_file: PathBuf::from(DEFINITION_FILE),
            native: NativeSurface::new(NATIVE_FILE),
            definitions: HashMap::new(),
            applied: HashMap::new(),
        }
    }

    /// Use a different definition file (relative to each project root)
    #[must_use]
    pub fn with_definition_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.definition_file = file.into();
        self
    }

    /// Use a different host configuration file (relative to each project root)
    #[must_use]
    pub fn with_native_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.native = NativeSurface::new(file);
        self
    }

    #[must_use]
    pub fn definition_path(&self, root: &Path) -> PathBuf {
        root.join(&self.definition_file)
    }

    #[must_use]
    pub fn native_path(&self, root: &Path) -> PathBuf {
        self.native.path(root)
    }

    /// Load the definition for a project root.
    ///
    /// Returns `Ok(None)` when the project has no definition file.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` or `InvalidAlias` when the file is malformed,
    /// and `Io` when it exists but cannot be read.
    pub fn load(&mut self, root: &Path) -> Result<Option<Arc<CatalogDefinition>>, CatalogError> {
        if let Some(cached) = self.definitions.get(&cache_key(root)) {
            tracing::debug!("Catalog definition cache hit for {}", root.display());
            return Ok(Some(Arc::clone(cached)));
        }

        let path = self.definition_path(root);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No catalog definition at {}", path.display());
                return Ok(None);
            }
            Err(source) => return Err(CatalogError::Io { path, source }),
        };

        let definition = CatalogDefinition::from_yaml(&text).map_err(|e| match e {
            CatalogError::InvalidFormat(msg) => {
                CatalogError::InvalidFormat(format!("{}: {msg}", path.display()))
            }
            other => other,
        })?;

        tracing::debug!(
            "Loaded {} catalog groups from {}",
            definition.len(),
            path.display()
        );

        let definition = Arc::new(definition);
        self.definitions
            .insert(cache_key(root), Arc::clone(&definition));
        Ok(Some(definition))
    }

    /// Load the definition, treating a missing file as an error
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` when the project has no definition file, plus
    /// every error [`ConfigStore::load`] can return.
    pub fn require(&mut self, root: &Path) -> Result<Arc<CatalogDefinition>, CatalogError> {
        self.load(root)?
            .ok_or_else(|| CatalogError::FileNotFound(self.definition_path(root)))
    }

    /// Load the catalogs currently applied to the host configuration.
    ///
    /// A missing host file yields an empty snapshot.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if the host file's catalog keys are malformed
    /// and `Io` if it cannot be read.
    pub fn load_applied(&mut self, root: &Path) -> Result<Arc<Projection>, CatalogError> {
        if let Some(cached) = self.applied.get(&cache_key(root)) {
            return Ok(Arc::clone(cached));
        }

        let applied = Arc::new(self.native.read(root)?);
        self.applied.insert(cache_key(root), Arc::clone(&applied));
        Ok(applied)
    }

    /// Write a projection into the host configuration and drop cached state
    /// for the root.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the host file cannot be read or replaced.
    pub fn apply(&mut self, root: &Path, projection: &Projection) -> Result<(), CatalogError> {
        self.native.write(root, projection)?;
        tracing::info!("Wrote catalogs to {}", self.native_path(root).display());
        self.invalidate(root);
        Ok(())
    }

    /// Forget everything cached for a project root
    pub fn invalidate(&mut self, root: &Path) {
        let key = cache_key(root);
        self.definitions.remove(&key);
        self.applied.remove(&key);
    }
}

/// Canonical form of a root; falls back to the path as given
fn cache_key(root: &Path) -> PathBuf {
    std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf())
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}
