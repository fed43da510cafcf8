//! Picking the catalog group a newly added dependency should reference.

use std::collections::HashMap;

use super::workspace::WorkspaceFilter;
use crate::catalog::definition::CatalogDefinition;
use crate::catalog::hierarchical::InheritanceResolver;
use crate::core::options::DefaultGroups;
use crate::core::types::GroupName;
use crate::core::workspace::Workspace;

/// Selects the default alias group for a package in a workspace
#[derive(Debug, Clone, Copy)]
pub struct DefaultAliasSelector<'a> {
    definition: &'a CatalogDefinition,
}

impl<'a> DefaultAliasSelector<'a> {
    #[must_use]
    pub fn new(definition: &'a CatalogDefinition) -> Self {
        Self { definition }
    }

    /// Group to alias `package` to, or `None` to leave the range untouched.
    ///
    /// With an ordered list the first group offering the package is chosen.
    /// In `most-used` mode the group the workspace already references most
    /// often wins, with ties going to the group declared first.
    #[must_use]
    pub fn select(&self, workspace: &Workspace, package: &str) -> Option<GroupName> {
        let options = &self.definition.options;
        let default_groups = options.default_groups.as_ref()?;

        if WorkspaceFilter::new(options).is_ignored(workspace.ident()) {
            tracing::debug!("{} is excluded from catalogs", workspace.label());
            return None;
        }

        let resolver = InheritanceResolver::new(self.definition);
        let providing = resolver.groups_providing(package);

        let selected = match default_groups {
            DefaultGroups::Ordered(list) => list.iter().find(|g| providing.contains(g)).cloned(),
            DefaultGroups::MostUsed => {
                let counts = self.usage_counts(workspace);
                let mut best: Option<(&GroupName, usize)> = None;
                for group in &providing {
                    let count = counts.get(group).copied().unwrap_or(0);
                    if best.map_or(true, |(_, top)| count > top) {
                        best = Some((group, count));
                    }
                }
                best.map(|(group, _)| group.clone())
            }
        };

        if let Some(group) = &selected {
            tracing::debug!("Default group for {package} in {}: {group}", workspace.label());
        }
        selected
    }

    /// How often each group is referenced through `catalog:` by the workspace
    #[must_use]
    pub fn usage_counts(&self, workspace: &Workspace) -> HashMap<GroupName, usize> {
        let mut counts = HashMap::new();
        for group in workspace.dependencies().filter_map(|dep| dep.catalog_group()) {
            *counts.entry(group).or_insert(0) += 1;
        }
        counts
    }
}
