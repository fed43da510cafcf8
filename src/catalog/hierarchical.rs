//! Inheritance between catalog groups.
//!
//! A group `a/b/c` inherits from `a/b`, which inherits from `a`. Resolving a
//! group merges its chain from the most general ancestor to the group itself,
//! so the most specific definition of a package wins.

use super::definition::{CatalogDefinition, CatalogGroup};
use super::store::AliasError;
use crate::core::types::{with_default_protocol, GroupName};

/// Resolves groups of one definition, following inheritance
#[derive(Debug, Clone, Copy)]
pub struct InheritanceResolver<'a> {
    definition: &'a CatalogDefinition,
}

impl<'a> InheritanceResolver<'a> {
    #[must_use]
    pub fn new(definition: &'a CatalogDefinition) -> Self {
        Self { definition }
    }

    /// Ancestor chain of a group, most general first
    #[must_use]
    pub fn chain(name: &GroupName) -> Vec<GroupName> {
        name.chain()
    }

    /// Effective mapping of a group.
    ///
    /// Ancestors are assumed present (the definition was validated on load);
    /// an undefined group resolves to whatever of its chain exists.
    #[must_use]
    pub fn resolve(&self, name: &GroupName) -> CatalogGroup {
        let mut merged = CatalogGroup::new();
        for group in self.definition.lineage(name) {
            merged.extend(group.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        merged
    }

    /// Effective mapping of every group, in declaration order
    #[must_use]
    pub fn resolve_all(&self) -> Vec<(GroupName, CatalogGroup)> {
        self.definition
            .group_names()
            .map(|name| (name.clone(), self.resolve(name)))
            .collect()
    }

    /// Groups whose effective mapping offers `package`, in declaration order
    #[must_use]
    pub fn groups_providing(&self, package: &str) -> Vec<GroupName> {
        self.definition
            .group_names()
            .filter(|name| {
                self.definition
                    .lineage(name)
                    .any(|group| group.contains_key(package))
            })
            .cloned()
            .collect()
    }

    /// Range a `catalog:<group>` dependency on `package` resolves to,
    /// with the default protocol applied.
    ///
    /// # Errors
    ///
    /// Returns `UnknownGroup` if the group is not defined and
    /// `MissingPackage` if its effective mapping lacks the package.
    pub fn resolve_range(&self, name: &GroupName, package: &str) -> Result<String, AliasError> {
        if !self.definition.contains(name) {
            return Err(AliasError::UnknownGroup(name.clone()));
        }

        // The most specific definition wins, so search from the group upwards
        let lineage: Vec<_> = self.definition.lineage(name).collect();
        let range = lineage
            .iter()
            .rev()
            .find_map(|group| group.get(package))
            .ok_or_else(|| AliasError::MissingPackage {
                group: name.clone(),
                package: package.to_string(),
            })?;

        let resolved = with_default_protocol(range, &self.definition.options.default_protocol);
        tracing::debug!("Resolved {package}@{} to {resolved}", name.to_alias());
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::Options;

    fn group(entries: &[(&str, &str)]) -> CatalogGroup {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn make_definition() -> CatalogDefinition {
        CatalogDefinition::new(
            vec![
                (GroupName::new("a"), group(&[("x", "1"), ("y", "1")])),
                (GroupName::new("a/b"), group(&[("y", "2")])),
                (GroupName::new("a/b/c"), group(&[("z", "3")])),
                (GroupName::new("other"), group(&[("x", "9")])),
            ],
            Options::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_chain_is_pure_prefix_list() {
        let chain = InheritanceResolver::chain(&GroupName::new("a/b/c"));
        let names: Vec<_> = chain.iter().map(GroupName::as_str).collect();
        assert_eq!(names, ["a", "a/b", "a/b/c"]);
    }

    #[test]
    fn test_resolve_merges_descendant_over_ancestor() {
        let def = make_definition();
        let resolved = InheritanceResolver::new(&def).resolve(&GroupName::new("a/b/c"));
        assert_eq!(resolved, group(&[("x", "1"), ("y", "2"), ("z", "3")]));
    }

    #[test]
    fn test_resolve_top_level_group_is_own_entries() {
        let def = make_definition();
        let resolved = InheritanceResolver::new(&def).resolve(&GroupName::new("a"));
        assert_eq!(resolved, group(&[("x", "1"), ("y", "1")]));
    }

    #[test]
    fn test_named_groups_do_not_inherit_root() {
        let def = CatalogDefinition::new(
            vec![
                (GroupName::root(), group(&[("lodash", "^4.0.0")])),
                (GroupName::new("stable"), group(&[("react", "^18.0.0")])),
            ],
            Options::default(),
        )
        .unwrap();
        let resolved = InheritanceResolver::new(&def).resolve(&GroupName::new("stable"));
        assert!(!resolved.contains_key("lodash"));
    }

    #[test]
    fn test_groups_providing() {
        let def = make_definition();
        let resolver = InheritanceResolver::new(&def);

        let names: Vec<_> = resolver
            .groups_providing("x")
            .into_iter()
            .map(|g| g.0)
            .collect();
        assert_eq!(names, ["a", "a/b", "a/b/c", "other"]);

        let names: Vec<_> = resolver
            .groups_providing("z")
            .into_iter()
            .map(|g| g.0)
            .collect();
        assert_eq!(names, ["a/b/c"]);

        assert!(resolver.groups_providing("nope").is_empty());
    }

    #[test]
    fn test_resolve_range_applies_default_protocol() {
        let def = CatalogDefinition::new(
            vec![(
                GroupName::new("stable"),
                group(&[("react", "^18.0.0"), ("patched", "patch:patched@1.0.0")]),
            )],
            Options::default(),
        )
        .unwrap();
        let resolver = InheritanceResolver::new(&def);

        assert_eq!(
            resolver
                .resolve_range(&GroupName::new("stable"), "react")
                .unwrap(),
            "npm:^18.0.0"
        );
        assert_eq!(
            resolver
                .resolve_range(&GroupName::new("stable"), "patched")
                .unwrap(),
            "patch:patched@1.0.0"
        );
    }

    #[test]
    fn test_resolve_range_inherited() {
        let def = make_definition();
        let resolver = InheritanceResolver::new(&def);
        assert_eq!(
            resolver
                .resolve_range(&GroupName::new("a/b/c"), "y")
                .unwrap(),
            "npm:2"
        );
    }

    #[test]
    fn test_resolve_range_errors() {
        let def = make_definition();
        let resolver = InheritanceResolver::new(&def);

        assert_eq!(
            resolver.resolve_range(&GroupName::new("missing"), "x"),
            Err(AliasError::UnknownGroup(GroupName::new("missing")))
        );
        assert_eq!(
            resolver.resolve_range(&GroupName::new("a"), "z"),
            Err(AliasError::MissingPackage {
                group: GroupName::new("a"),
                package: "z".to_string(),
            })
        );
    }
}
