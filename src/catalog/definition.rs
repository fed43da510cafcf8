//! Parsed, validated catalog definition.
//!
//! The definition file looks like:
//!
//! ```yaml
//! options:
//!   defaultGroups: [stable]
//!   validation: warn
//! list:
//!   root:
//!     lodash: ^4.17.21
//!   stable:
//!     react: ^18.3.1
//!   stable/next:
//!     react: ^19.0.0
//!   typescript: ^5.4.0   # shortcut, belongs to root
//! ```
//!
//! Groups keep their declaration order and are additionally indexed by a
//! segment trie so ancestor lookups cost O(depth).

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use serde_yaml_ng::{Mapping, Value};

use super::store::{AliasError, CatalogError};
use crate::core::options::{DefaultGroups, Options, RawOptions, ValidationConfig};
use crate::core::types::GroupName;

/// Package name -> range expression
pub type CatalogGroup = BTreeMap<String, String>;

/// Top-level layout of the definition file
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DefinitionFile {
    #[serde(default)]
    options: Option<RawOptions>,
    list: Mapping,
}

#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: HashMap<String, usize>,
    group: Option<usize>,
}

/// Groups indexed by path segment. Node 0 is the unnamed top of the tree.
#[derive(Debug, Clone)]
struct GroupTrie {
    nodes: Vec<TrieNode>,
}

impl GroupTrie {
    fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
        }
    }

    fn insert(&mut self, name: &GroupName, index: usize) {
        let mut node = 0;
        for segment in name.segments() {
            node = if let Some(&child) = self.nodes[node].children.get(segment) {
                child
            } else {
                let child = self.nodes.len();
                self.nodes.push(TrieNode::default());
                self.nodes[node].children.insert(segment.to_string(), child);
                child
            };
        }
        self.nodes[node].group = Some(index);
    }

    /// Group slots along the path of `name`, one per segment, most general first.
    /// Stops early when the path leaves the trie.
    fn walk<'a>(&'a self, name: &'a GroupName) -> impl Iterator<Item = Option<usize>> + 'a {
        let mut node = Some(0);
        name.segments().map_while(move |segment| {
            let next = *self.nodes[node?].children.get(segment)?;
            node = Some(next);
            Some(self.nodes[next].group)
        })
    }

    fn lookup(&self, name: &GroupName) -> Option<usize> {
        let depth = name.segments().count();
        let slots: Vec<_> = self.walk(name).collect();
        if slots.len() == depth {
            slots.last().copied().flatten()
        } else {
            None
        }
    }
}

/// The full hierarchical catalog source
#[derive(Debug, Clone)]
pub struct CatalogDefinition {
    groups: Vec<(GroupName, CatalogGroup)>,
    trie: GroupTrie,
    pub options: Options,
}

impl CatalogDefinition {
    /// Build a definition from groups in declaration order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` for malformed or duplicate group names and
    /// `InvalidAlias` when a group's ancestor is missing or `defaultGroups`
    /// names an unknown group.
    pub fn new(
        groups: Vec<(GroupName, CatalogGroup)>,
        options: Options,
    ) -> Result<Self, CatalogError> {
        let mut trie = GroupTrie::new();
        for (index, (name, _)) in groups.iter().enumerate() {
            if !name.is_well_formed() {
                return Err(CatalogError::InvalidFormat(format!(
                    "group name '{name}' has an empty path segment"
                )));
            }
            if trie.lookup(name).is_some() {
                return Err(CatalogError::InvalidFormat(format!(
                    "group '{name}' is declared more than once"
                )));
            }
            trie.insert(name, index);
        }

        let definition = Self {
            groups,
            trie,
            options,
        };
        definition.check_ancestors()?;
        definition.check_options()?;
        Ok(definition)
    }

    /// Parse and validate a definition from YAML text
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` for schema violations and `InvalidAlias` for
    /// broken inheritance.
    pub fn from_yaml(text: &str) -> Result<Self, CatalogError> {
        let file: DefinitionFile = serde_yaml_ng::from_str(text)
            .map_err(|e| CatalogError::InvalidFormat(e.to_string()))?;

        let options = file
            .options
            .unwrap_or_default()
            .compile()
            .map_err(|e| CatalogError::InvalidFormat(e.to_string()))?;

        let groups = parse_list(file.list)?;
        Self::new(groups, options)
    }

    fn check_ancestors(&self) -> Result<(), CatalogError> {
        for (name, _) in &self.groups {
            let chain = name.chain();
            let slots: Vec<_> = self.trie.walk(name).collect();
            for (ancestor, slot) in chain.iter().zip(&slots).take(chain.len() - 1) {
                if slot.is_none() && !ancestor.is_root() {
                    return Err(AliasError::MissingAncestor {
                        ancestor: ancestor.clone(),
                        child: name.clone(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    fn check_options(&self) -> Result<(), CatalogError> {
        if let Some(DefaultGroups::Ordered(list)) = &self.options.default_groups {
            if let Some(unknown) = list.iter().find(|g| !self.contains(g)) {
                return Err(AliasError::UnknownGroup(unknown.clone()).into());
            }
        }

        if let Some(ValidationConfig::PerGroup(map)) = &self.options.validation {
            for name in map.keys().filter(|g| !self.contains(g)) {
                tracing::warn!("validation level set for undefined group '{name}'");
            }
        }

        Ok(())
    }

    /// Groups in declaration order
    pub fn groups(&self) -> impl Iterator<Item = (&GroupName, &CatalogGroup)> {
        self.groups.iter().map(|(name, group)| (name, group))
    }

    pub fn group_names(&self) -> impl Iterator<Item = &GroupName> {
        self.groups.iter().map(|(name, _)| name)
    }

    /// The group's own entries, without inherited ones
    #[must_use]
    pub fn get(&self, name: &GroupName) -> Option<&CatalogGroup> {
        self.trie.lookup(name).map(|idx| &self.groups[idx].1)
    }

    #[must_use]
    pub fn contains(&self, name: &GroupName) -> bool {
        self.trie.lookup(name).is_some()
    }

    /// Declared groups along the chain of `name`, most general first
    pub(crate) fn lineage<'a>(
        &'a self,
        name: &'a GroupName,
    ) -> impl Iterator<Item = &'a CatalogGroup> + 'a {
        self.trie
            .walk(name)
            .flatten()
            .map(move |idx| &self.groups[idx].1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Convert the raw `list` mapping into declaration-ordered groups.
///
/// Scalar entries are package shortcuts for the root group; an explicit
/// `root` group wins over a shortcut for the same package.
fn parse_list(list: Mapping) -> Result<Vec<(GroupName, CatalogGroup)>, CatalogError> {
    let mut groups: Vec<(GroupName, CatalogGroup)> = Vec::new();
    let mut shortcuts = CatalogGroup::new();
    let mut explicit_root: Option<CatalogGroup> = None;
    let mut root_position: Option<usize> = None;

    for (key, value) in list {
        let Value::String(key) = key else {
            return Err(CatalogError::InvalidFormat(format!(
                "list keys must be strings, got {}",
                describe(&key)
            )));
        };

        match value {
            Value::String(range) => {
                reserve_root(&mut groups, &mut root_position);
                shortcuts.insert(key, range);
            }
            Value::Mapping(entries) => {
                let name = GroupName::new(key);
                let group = parse_group(&name, entries)?;
                if name.is_root() {
                    if explicit_root.is_some() {
                        return Err(CatalogError::InvalidFormat(
                            "group 'root' is declared more than once".to_string(),
                        ));
                    }
                    explicit_root = Some(group);
                    reserve_root(&mut groups, &mut root_position);
                } else {
                    groups.push((name, group));
                }
            }
            Value::Null => {
                let name = GroupName::new(key);
                if name.is_root() {
                    explicit_root.get_or_insert_with(CatalogGroup::new);
                    reserve_root(&mut groups, &mut root_position);
                } else {
                    groups.push((name, CatalogGroup::new()));
                }
            }
            other => {
                return Err(CatalogError::InvalidFormat(format!(
                    "entry '{key}' must be a group mapping or a version string, got {}",
                    describe(&other)
                )));
            }
        }
    }

    if let Some(position) = root_position {
        let mut root = shortcuts;
        root.extend(explicit_root.unwrap_or_default());
        groups[position].1 = root;
    }

    Ok(groups)
}

/// Keep a slot for the root group at the position it is first mentioned
fn reserve_root(groups: &mut Vec<(GroupName, CatalogGroup)>, position: &mut Option<usize>) {
    if position.is_none() {
        *position = Some(groups.len());
        groups.push((GroupName::root(), CatalogGroup::new()));
    }
}

fn parse_group(name: &GroupName, entries: Mapping) -> Result<CatalogGroup, CatalogError> {
    let mut group = CatalogGroup::new();
    for (package, range) in entries {
        match (package, range) {
            (Value::String(package), Value::String(range)) => {
                group.insert(package, range);
            }
            (Value::String(package), other) => {
                return Err(CatalogError::InvalidFormat(format!(
                    "range for '{package}' in group '{name}' must be a string, got {}",
                    describe(&other)
                )));
            }
            (other, _) => {
                return Err(CatalogError::InvalidFormat(format!(
                    "package names in group '{name}' must be strings, got {}",
                    describe(&other)
                )));
            }
        }
    }
    Ok(group)
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
