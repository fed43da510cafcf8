use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{range_protocol, GroupName, CATALOG_PROTOCOL, DEFAULT_PROTOCOL};

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read manifest: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse manifest: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Dependency sections of a workspace manifest that catalogs apply to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DependencyKind {
    Dependencies,
    DevDependencies,
    OptionalDependencies,
}

impl DependencyKind {
    pub const ALL: [Self; 3] = [
        Self::Dependencies,
        Self::DevDependencies,
        Self::OptionalDependencies,
    ];
}

impl std::fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dependencies => write!(f, "dependencies"),
            Self::DevDependencies => write!(f, "devDependencies"),
            Self::OptionalDependencies => write!(f, "optionalDependencies"),
        }
    }
}

/// A single dependency declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency<'a> {
    pub kind: DependencyKind,
    pub name: &'a str,
    pub range: &'a str,
}

impl Dependency<'_> {
    /// Group referenced through the catalog protocol, if any
    #[must_use]
    pub fn catalog_group(&self) -> Option<GroupName> {
        GroupName::from_alias(self.range)
    }

    /// True for plain registry ranges (`^1.2.3`, `npm:^1.2.3`), the only kind
    /// a catalog can stand in for
    #[must_use]
    pub fn is_registry_range(&self) -> bool {
        match range_protocol(self.range) {
            None => true,
            Some(protocol) => protocol == DEFAULT_PROTOCOL && !self.range.contains('@'),
        }
    }

    #[must_use]
    pub fn uses_catalog(&self) -> bool {
        self.range.starts_with(CATALOG_PROTOCOL)
    }
}

/// The parts of a workspace manifest catalogs care about
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    /// Package identifier (`name` or `@scope/name`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dev_dependencies: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub optional_dependencies: BTreeMap<String, String>,
}

impl Workspace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Workspace without a package identifier
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Add a dependency (builder style, mostly for tests)
    #[must_use]
    pub fn with_dependency(
        mut self,
        kind: DependencyKind,
        name: impl Into<String>,
        range: impl Into<String>,
    ) -> Self {
        self.section_mut(kind).insert(name.into(), range.into());
        self
    }

    /// Read a `package.json`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_manifest(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse manifest JSON
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid manifest.
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn ident(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn section(&self, kind: DependencyKind) -> &BTreeMap<String, String> {
        match kind {
            DependencyKind::Dependencies => &self.dependencies,
            DependencyKind::DevDependencies => &self.dev_dependencies,
            DependencyKind::OptionalDependencies => &self.optional_dependencies,
        }
    }

    pub fn section_mut(&mut self, kind: DependencyKind) -> &mut BTreeMap<String, String> {
        match kind {
            DependencyKind::Dependencies => &mut self.dependencies,
            DependencyKind::DevDependencies => &mut self.dev_dependencies,
            DependencyKind::OptionalDependencies => &mut self.optional_dependencies,
        }
    }

    /// Every declared dependency, section by section
    pub fn dependencies(&self) -> impl Iterator<Item = Dependency<'_>> {
        DependencyKind::ALL.into_iter().flat_map(move |kind| {
            self.section(kind).iter().map(move |(name, range)| Dependency {
                kind,
                name,
                range,
            })
        })
    }

    /// Display label: the identifier, or a placeholder
    #[must_use]
    pub fn label(&self) -> &str {
        self.ident().unwrap_or("<unnamed workspace>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_ignores_unrelated_fields() {
        let json = r#"{
            "name": "@app/web",
            "version": "1.0.0",
            "scripts": {"build": "tsc"},
            "dependencies": {"react": "catalog:stable"},
            "devDependencies": {"typescript": "^5.4.0"},
            "peerDependencies": {"react-dom": "*"}
        }"#;
        let ws = Workspace::from_json(json).unwrap();
        assert_eq!(ws.ident(), Some("@app/web"));
        assert_eq!(ws.dependencies.len(), 1);
        assert_eq!(ws.dev_dependencies["typescript"], "^5.4.0");
        assert_eq!(ws.dependencies().count(), 2);
    }

    #[test]
    fn test_from_json_without_name() {
        let ws = Workspace::from_json("{}").unwrap();
        assert_eq!(ws.ident(), None);
        assert_eq!(ws.label(), "<unnamed workspace>");
    }

    #[test]
    fn test_dependency_classification() {
        let dep = |range| Dependency {
            kind: DependencyKind::Dependencies,
            name: "pkg",
            range,
        };

        assert!(dep("^1.0.0").is_registry_range());
        assert!(dep("npm:^1.0.0").is_registry_range());
        assert!(!dep("npm:other-pkg@^1.0.0").is_registry_range());
        assert!(!dep("workspace:*").is_registry_range());
        assert!(!dep("catalog:stable").is_registry_range());

        assert!(dep("catalog:").uses_catalog());
        assert_eq!(dep("catalog:").catalog_group(), Some(GroupName::root()));
        assert_eq!(
            dep("catalog:beta").catalog_group(),
            Some(GroupName::new("beta"))
        );
    }

    #[test]
    fn test_dependencies_iterates_sections_in_order() {
        let ws = Workspace::new("@app/web")
            .with_dependency(DependencyKind::DevDependencies, "b", "^1.0.0")
            .with_dependency(DependencyKind::Dependencies, "a", "^1.0.0")
            .with_dependency(DependencyKind::OptionalDependencies, "c", "^1.0.0");
        let kinds: Vec<_> = ws.dependencies().map(|d| d.kind).collect();
        assert_eq!(kinds, DependencyKind::ALL);
    }
}
