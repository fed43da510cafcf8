//! The `options` block of a catalog definition.
//!
//! Options arrive as loosely-typed YAML and are validated once, at load time,
//! into [`Options`]. Downstream code never sees raw pattern strings or the
//! `most-used` keyword.

use std::collections::BTreeMap;

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{GroupName, ValidationLevel, DEFAULT_PROTOCOL};

/// Keyword selecting the most-used group as the default
pub const MOST_USED: &str = "most-used";

#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("invalid pattern '{pattern}' in {field}: {source}")]
    InvalidPattern {
        field: &'static str,
        pattern: String,
        source: glob::PatternError,
    },

    #[error("invalid group name '{0}' in validation")]
    InvalidGroupName(String),
}

/// How a bare dependency picks its default group
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawDefaultGroups")]
pub enum DefaultGroups {
    /// First listed group that offers the package
    Ordered(Vec<GroupName>),
    /// The group the workspace already references most often
    MostUsed,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDefaultGroups {
    Keyword(String),
    List(Vec<String>),
}

impl TryFrom<RawDefaultGroups> for DefaultGroups {
    type Error = String;

    fn try_from(raw: RawDefaultGroups) -> Result<Self, Self::Error> {
        match raw {
            RawDefaultGroups::Keyword(k) if k == MOST_USED => Ok(Self::MostUsed),
            RawDefaultGroups::Keyword(k) => Err(format!(
                "defaultGroups must be a list of groups or \"{MOST_USED}\", got \"{k}\""
            )),
            RawDefaultGroups::List(list) if list.len() == 1 && list[0] == MOST_USED => {
                Ok(Self::MostUsed)
            }
            RawDefaultGroups::List(list) => {
                if list.iter().any(|g| g == MOST_USED) {
                    return Err(format!(
                        "\"{MOST_USED}\" cannot be combined with explicit groups"
                    ));
                }
                Ok(Self::Ordered(list.into_iter().map(GroupName::new).collect()))
            }
        }
    }
}

/// Validation level, either global or per group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidationConfig {
    Global(ValidationLevel),
    PerGroup(BTreeMap<GroupName, ValidationLevel>),
}

/// Workspace gates evaluated by workspace validation, in configured order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkspaceGate {
    /// The included/ignored workspace filter
    Filter,
    /// The `skipValidationWorkspaces` exemption list
    SkipValidation,
}

/// Default gate order: filter first, then the validation exemption
pub const DEFAULT_GATES: [WorkspaceGate; 2] = [WorkspaceGate::Filter, WorkspaceGate::SkipValidation];

/// Options as written in the definition file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawOptions {
    #[serde(default)]
    pub default_groups: Option<DefaultGroups>,
    #[serde(default)]
    pub included_workspaces: Vec<String>,
    #[serde(default)]
    pub ignored_workspaces: Vec<String>,
    #[serde(default)]
    pub skip_validation_workspaces: Vec<String>,
    #[serde(default)]
    pub validation: Option<ValidationConfig>,
    #[serde(default)]
    pub default_protocol: Option<String>,
    #[serde(default)]
    pub workspace_gates: Option<Vec<WorkspaceGate>>,
}

impl RawOptions {
    /// Compile patterns and normalize group names.
    ///
    /// # Errors
    ///
    /// Returns an error if a workspace pattern is not a valid glob or a
    /// per-group validation key is not a well-formed group name.
    pub fn compile(self) -> Result<Options, OptionsError> {
        let validation = match self.validation {
            Some(ValidationConfig::PerGroup(map)) => {
                let mut normalized = BTreeMap::new();
                for (name, level) in map {
                    let name = GroupName::new(name.0);
                    if !name.is_well_formed() {
                        return Err(OptionsError::InvalidGroupName(name.0));
                    }
                    normalized.insert(name, level);
                }
                Some(ValidationConfig::PerGroup(normalized))
            }
            other => other,
        };

        let mut gates = Vec::new();
        for gate in self.workspace_gates.unwrap_or_else(|| DEFAULT_GATES.to_vec()) {
            if !gates.contains(&gate) {
                gates.push(gate);
            }
        }

        Ok(Options {
            default_groups: self.default_groups,
            included_workspaces: PatternSet::compile(
                "includedWorkspaces",
                &self.included_workspaces,
            )?,
            ignored_workspaces: PatternSet::compile("ignoredWorkspaces", &self.ignored_workspaces)?,
            skip_validation_workspaces: PatternSet::compile(
                "skipValidationWorkspaces",
                &self.skip_validation_workspaces,
            )?,
            validation,
            default_protocol: self
                .default_protocol
                .unwrap_or_else(|| DEFAULT_PROTOCOL.to_string()),
            workspace_gates: gates,
        })
    }
}

/// Validated options
#[derive(Debug, Clone)]
pub struct Options {
    pub default_groups: Option<DefaultGroups>,
    pub included_workspaces: PatternSet,
    pub ignored_workspaces: PatternSet,
    pub skip_validation_workspaces: PatternSet,
    pub validation: Option<ValidationConfig>,
    pub default_protocol: String,
    pub workspace_gates: Vec<WorkspaceGate>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            default_groups: None,
            included_workspaces: PatternSet::default(),
            ignored_workspaces: PatternSet::default(),
            skip_validation_workspaces: PatternSet::default(),
            validation: None,
            default_protocol: DEFAULT_PROTOCOL.to_string(),
            workspace_gates: DEFAULT_GATES.to_vec(),
        }
    }
}

impl Options {
    #[must_use]
    pub fn with_default_groups(mut self, groups: DefaultGroups) -> Self {
        self.default_groups = Some(groups);
        self
    }

    #[must_use]
    pub fn with_validation(mut self, validation: ValidationConfig) -> Self {
        self.validation = Some(validation);
        self
    }
}

/// Compiled set of shell-glob patterns over workspace identifiers
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    const MATCH_OPTIONS: MatchOptions = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    /// Compile a list of glob patterns.
    ///
    /// # Errors
    ///
    /// Returns `OptionsError::InvalidPattern` for the first pattern that fails to compile.
    pub fn compile(field: &'static str, patterns: &[String]) -> Result<Self, OptionsError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|source| OptionsError::InvalidPattern {
                    field,
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// True if any pattern matches the whole identifier
    #[must_use]
    pub fn matches(&self, ident: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_with(ident, Self::MATCH_OPTIONS))
    }
}
