//! Flattening the hierarchy into the host's two-tier catalog form.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::definition::{CatalogDefinition, CatalogGroup};
use super::hierarchical::InheritanceResolver;
use super::store::CatalogError;
use crate::core::types::GroupName;
use crate::utils::validation::compute_signature;

/// Catalog state in the host's native shape
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Projection {
    /// The root group (host "default catalog")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<CatalogGroup>,
    /// Every other group, fully resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub named: Option<BTreeMap<GroupName, CatalogGroup>>,
}

impl Projection {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none() && self.named.is_none()
    }

    /// Order-independent digest of the state
    ///
    /// # Errors
    ///
    /// Returns `Serialize` if the state cannot be written as JSON.
    pub fn signature(&self) -> Result<String, CatalogError> {
        // BTreeMap keys serialize sorted, so equal states give equal JSON
        let canonical = serde_json::to_string(self)?;
        Ok(compute_signature(&canonical))
    }

    fn group(&self, name: &GroupName) -> Option<&CatalogGroup> {
        if name.is_root() {
            self.root.as_ref()
        } else {
            self.named.as_ref().and_then(|named| named.get(name))
        }
    }

    fn group_names(&self) -> BTreeSet<&GroupName> {
        self.named
            .iter()
            .flat_map(BTreeMap::keys)
            .collect()
    }
}

/// What happened to one package in one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeKind {
    Added { range: String },
    Removed { range: String },
    Changed { from: String, to: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub group: GroupName,
    pub package: String,
    #[serde(flatten)]
    pub kind: ChangeKind,
}

impl std::fmt::Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let target = format!("{}:{}", self.group, self.package);
        match &self.kind {
            ChangeKind::Added { range } => write!(f, "+ {target} {range}"),
            ChangeKind::Removed { range } => write!(f, "- {target} {range}"),
            ChangeKind::Changed { from, to } => write!(f, "~ {target} {from} -> {to}"),
        }
    }
}

/// Result of comparing existing catalog state with a fresh projection
#[derive(Debug, Clone, Serialize)]
pub struct ProjectionDiff {
    pub changed: bool,
    pub changes: Vec<Change>,
}

/// Projects a definition into the host's native shape
#[derive(Debug, Clone, Copy)]
pub struct ApplyProjector<'a> {
    definition: &'a CatalogDefinition,
}

impl<'a> ApplyProjector<'a> {
    #[must_use]
    pub fn new(definition: &'a CatalogDefinition) -> Self {
        Self { definition }
    }

    /// Resolve every group; empty groups are left out entirely
    #[must_use]
    pub fn project(&self) -> Projection {
        let resolver = InheritanceResolver::new(self.definition);
        let mut projection = Projection::default();
        let mut named = BTreeMap::new();

        for (name, resolved) in resolver.resolve_all() {
            if resolved.is_empty() {
                tracing::debug!("Omitting empty catalog group '{name}'");
                continue;
            }
            if name.is_root() {
                projection.root = Some(resolved);
            } else {
                named.insert(name, resolved);
            }
        }

        if !named.is_empty() {
            projection.named = Some(named);
        }
        projection
    }
}

/// Compare two states.
///
/// `changed` comes from canonical signatures; the change list is for display.
///
/// # Errors
///
/// Returns `Serialize` if either state cannot be signed.
pub fn diff(existing: &Projection, projected: &Projection) -> Result<ProjectionDiff, CatalogError> {
    let changed = existing.signature()? != projected.signature()?;
    let mut changes = Vec::new();

    if changed {
        let root = GroupName::root();
        let mut names: Vec<&GroupName> = vec![&root];
        names.extend(
            existing
                .group_names()
                .union(&projected.group_names())
                .copied(),
        );

        let empty = CatalogGroup::new();
        for name in names {
            let old = existing.group(name).unwrap_or(&empty);
            let new = projected.group(name).unwrap_or(&empty);
            diff_group(name, old, new, &mut changes);
        }
    }

    Ok(ProjectionDiff { changed, changes })
}

fn diff_group(name: &GroupName, old: &CatalogGroup, new: &CatalogGroup, out: &mut Vec<Change>) {
    let packages: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
    for package in packages {
        let kind = match (old.get(package), new.get(package)) {
            (None, Some(range)) => ChangeKind::Added {
                range: range.clone(),
            },
            (Some(range), None) => ChangeKind::Removed {
                range: range.clone(),
            },
            (Some(from), Some(to)) if from != to => ChangeKind::Changed {
                from: from.clone(),
                to: to.clone(),
            },
            _ => continue,
        };
        out.push(Change {
            group: name.clone(),
            package: package.clone(),
            kind,
        });
    }
}
