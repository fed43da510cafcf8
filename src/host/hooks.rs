//! Hooks the package manager calls while editing and checking workspaces.

use serde::Serialize;
use thiserror::Error;

use crate::catalog::definition::CatalogDefinition;
use crate::catalog::hierarchical::InheritanceResolver;
use crate::catalog::store::CatalogError;
use crate::core::types::{GroupName, ValidationLevel};
use crate::core::workspace::{Dependency, DependencyKind, Workspace};
use crate::policy::defaults::DefaultAliasSelector;
use crate::policy::validation::ValidationEngine;
use crate::policy::workspace::{SkipReason, WorkspaceFilter};

/// A dependency that bypasses a catalog offering its package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub workspace: String,
    pub kind: DependencyKind,
    pub package: String,
    pub range: String,
    pub level: ValidationLevel,
    /// Groups that offer the package, in declaration order
    pub groups: Vec<GroupName>,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let aliases: Vec<String> = self.groups.iter().map(GroupName::to_alias).collect();
        write!(
            f,
            "{}: {} {}@{} should use {}",
            self.workspace,
            self.kind,
            self.package,
            self.range,
            aliases.join(" or ")
        )
    }
}

/// Strict-level policy violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("{0}")]
    Strict(Violation),

    #[error("{workspace} has {} dependencies that must use a catalog", violations.len())]
    StrictViolations {
        workspace: String,
        violations: Vec<Violation>,
    },
}

#[derive(Error, Debug)]
pub enum HookError {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// What to record for a newly added dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum AddOutcome {
    /// Record the range as given
    Keep,
    /// Record this range instead
    Rewrite(String),
    /// Record the range as given, but it bypasses a catalog
    Warning(Violation),
}

/// Result of checking every dependency of a workspace
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub workspace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,
    pub warnings: Vec<Violation>,
    pub errors: Vec<Violation>,
}

impl ValidationReport {
    fn skipped(workspace: &Workspace, reason: SkipReason) -> Self {
        Self {
            workspace: workspace.label().to_string(),
            skipped: Some(reason),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }

    /// Turn strict findings into an error
    ///
    /// # Errors
    ///
    /// Returns `StrictViolations` if any dependency broke a strict rule.
    pub fn into_result(self) -> Result<Self, PolicyError> {
        if self.errors.is_empty() {
            Ok(self)
        } else {
            Err(PolicyError::StrictViolations {
                workspace: self.workspace,
                violations: self.errors,
            })
        }
    }
}

/// Catalog behavior exposed to the package manager
#[derive(Debug, Clone, Copy)]
pub struct CatalogHooks<'a> {
    definition: &'a CatalogDefinition,
}

impl<'a> CatalogHooks<'a> {
    #[must_use]
    pub fn new(definition: &'a CatalogDefinition) -> Self {
        Self { definition }
    }

    /// Concrete range behind `catalog:<group>` for a package
    ///
    /// # Errors
    ///
    /// Returns `InvalidAlias` if the group is unknown or lacks the package.
    pub fn resolve_range(&self, group: &GroupName, package: &str) -> Result<String, CatalogError> {
        Ok(InheritanceResolver::new(self.definition).resolve_range(group, package)?)
    }

    /// Decide how a dependency being added to a workspace is recorded.
    ///
    /// Catalog aliases are checked and kept. Registry ranges are rewritten to
    /// the default group when one applies, and otherwise checked against the
    /// validation level of the groups offering the package. Whether that check
    /// runs is decided by the configured workspace gates, exactly as in
    /// [`CatalogHooks::validate_workspace`].
    ///
    /// # Errors
    ///
    /// Returns `HookError::Catalog` for an alias the definition cannot satisfy
    /// and `HookError::Policy` when a strict rule forbids the range.
    pub fn on_dependency_added(
        &self,
        workspace: &Workspace,
        kind: DependencyKind,
        package: &str,
        range: &str,
    ) -> Result<AddOutcome, HookError> {
        let dependency = Dependency {
            kind,
            name: package,
            range,
        };

        if let Some(group) = dependency.catalog_group() {
            self.resolve_range(&group, package)?;
            return Ok(AddOutcome::Keep);
        }
        if !dependency.is_registry_range() {
            return Ok(AddOutcome::Keep);
        }

        // The selector returns nothing for filtered-out workspaces
        if let Some(group) = DefaultAliasSelector::new(self.definition).select(workspace, package) {
            return Ok(AddOutcome::Rewrite(group.to_alias()));
        }

        let filter = WorkspaceFilter::new(&self.definition.options);
        if let Some(reason) = filter.validation_gate(workspace.ident()) {
            tracing::debug!("Not validating {package} in {}: {reason}", workspace.label());
            return Ok(AddOutcome::Keep);
        }

        match self.check(workspace, &dependency) {
            None => Ok(AddOutcome::Keep),
            Some(violation) if violation.level == ValidationLevel::Strict => {
                Err(PolicyError::Strict(violation).into())
            }
            Some(violation) => {
                tracing::warn!("{violation}");
                Ok(AddOutcome::Warning(violation))
            }
        }
    }

    /// Check every declared dependency of a workspace.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAlias` for the first `catalog:` dependency the
    /// definition cannot satisfy.
    pub fn validate_workspace(&self, workspace: &Workspace) -> Result<ValidationReport, CatalogError> {
        let filter = WorkspaceFilter::new(&self.definition.options);
        if let Some(reason) = filter.validation_gate(workspace.ident()) {
            tracing::debug!("Skipping {}: {reason}", workspace.label());
            return Ok(ValidationReport::skipped(workspace, reason));
        }

        let mut report = ValidationReport {
            workspace: workspace.label().to_string(),
            skipped: None,
            warnings: Vec::new(),
            errors: Vec::new(),
        };

        for dependency in workspace.dependencies() {
            if let Some(group) = dependency.catalog_group() {
                self.resolve_range(&group, dependency.name)?;
                continue;
            }
            if !dependency.is_registry_range() {
                continue;
            }
            match self.check(workspace, &dependency) {
                Some(v) if v.level == ValidationLevel::Strict => report.errors.push(v),
                Some(v) => report.warnings.push(v),
                None => {}
            }
        }

        tracing::debug!(
            "Validated {}: {} warnings, {} errors",
            report.workspace,
            report.warnings.len(),
            report.errors.len()
        );
        Ok(report)
    }

    fn check(&self, workspace: &Workspace, dependency: &Dependency<'_>) -> Option<Violation> {
        let groups = InheritanceResolver::new(self.definition).groups_providing(dependency.name);
        let level = ValidationEngine::new(&self.definition.options).level_for_package(&groups);
        if level == ValidationLevel::Off {
            return None;
        }

        Some(Violation {
            workspace: workspace.label().to_string(),
            kind: dependency.kind,
            package: dependency.name.to_string(),
            range: dependency.range.to_string(),
            level,
            groups,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::store::AliasError;

    fn definition(yaml: &str) -> CatalogDefinition {
        CatalogDefinition::from_yaml(yaml).unwrap()
    }

    const LIST: &str = "
list:
  lodash: ^4.17.21
  stable:
    react: ^18.3.1
  beta:
    react: ^19.0.0
";

    fn with_options(options: &str) -> CatalogDefinition {
        definition(&format!("options:\n{options}\n{LIST}"))
    }

    #[test]
    fn test_resolve_range() {
        let def = definition(LIST);
        let hooks = CatalogHooks::new(&def);
        assert_eq!(
            hooks.resolve_range(&GroupName::root(), "lodash").unwrap(),
            "npm:^4.17.21"
        );
        assert!(matches!(
            hooks.resolve_range(&GroupName::new("nope"), "react"),
            Err(CatalogError::InvalidAlias(AliasError::UnknownGroup(_)))
        ));
    }

    #[test]
    fn test_add_rewrites_to_default_group() {
        let def = with_options("  defaultGroups: [beta]");
        let hooks = CatalogHooks::new(&def);
        let outcome = hooks
            .on_dependency_added(&Workspace::new("@app/web"), DependencyKind::Dependencies, "react", "^19.0.0")
            .unwrap();
        assert_eq!(outcome, AddOutcome::Rewrite("catalog:beta".to_string()));
    }

    #[test]
    fn test_add_warns_without_default_group() {
        let def = definition(LIST);
        let hooks = CatalogHooks::new(&def);
        let outcome = hooks
            .on_dependency_added(&Workspace::new("@app/web"), DependencyKind::Dependencies, "react", "^18.0.0")
            .unwrap();
        let AddOutcome::Warning(violation) = outcome else {
            panic!("expected a warning, got {outcome:?}");
        };
        assert_eq!(violation.level, ValidationLevel::Warn);
        assert_eq!(violation.groups, [GroupName::new("stable"), GroupName::new("beta")]);
    }

    #[test]
    fn test_add_strict_is_policy_error() {
        let def = with_options("  validation: {beta: strict}");
        let hooks = CatalogHooks::new(&def);
        let err = hooks
            .on_dependency_added(&Workspace::new("@app/web"), DependencyKind::DevDependencies, "react", "^18.0.0")
            .unwrap_err();
        assert!(matches!(err, HookError::Policy(PolicyError::Strict(v)) if v.package == "react"));
    }

    #[test]
    fn test_add_unlisted_package_is_kept() {
        let def = with_options("  validation: strict");
        let hooks = CatalogHooks::new(&def);
        let outcome = hooks
            .on_dependency_added(&Workspace::new("@app/web"), DependencyKind::Dependencies, "left-pad", "^1.0.0")
            .unwrap();
        assert_eq!(outcome, AddOutcome::Keep);
    }

    #[test]
    fn test_add_keeps_other_protocols() {
        let def = with_options("  validation: strict");
        let hooks = CatalogHooks::new(&def);
        let ws = Workspace::new("@app/web");
        for range in ["workspace:*", "link:../react", "patch:react@npm%3A18.0.0#./fix.patch"] {
            let outcome = hooks
                .on_dependency_added(&ws, DependencyKind::Dependencies, "react", range)
                .unwrap();
            assert_eq!(outcome, AddOutcome::Keep, "{range}");
        }
    }

    #[test]
    fn test_add_checks_aliases() {
        let def = definition(LIST);
        let hooks = CatalogHooks::new(&def);
        let ws = Workspace::new("@app/web");

        assert_eq!(
            hooks
                .on_dependency_added(&ws, DependencyKind::Dependencies, "react", "catalog:stable")
                .unwrap(),
            AddOutcome::Keep
        );
        let err = hooks
            .on_dependency_added(&ws, DependencyKind::Dependencies, "react", "catalog:")
            .unwrap_err();
        assert!(matches!(
            err,
            HookError::Catalog(CatalogError::InvalidAlias(AliasError::MissingPackage { .. }))
        ));
    }

    #[test]
    fn test_skip_validation_still_rewrites() {
        let def = with_options("  defaultGroups: [stable]\n  skipValidationWorkspaces: ['@app/*']\n  validation: strict");
        let hooks = CatalogHooks::new(&def);
        let ws = Workspace::new("@app/web");

        assert_eq!(
            hooks
                .on_dependency_added(&ws, DependencyKind::Dependencies, "react", "^18.0.0")
                .unwrap(),
            AddOutcome::Rewrite("catalog:stable".to_string())
        );
        assert_eq!(
            hooks
                .on_dependency_added(&ws, DependencyKind::Dependencies, "lodash", "^4.0.0")
                .unwrap(),
            AddOutcome::Keep
        );
    }

    #[test]
    fn test_add_follows_configured_gates() {
        let def = with_options(
            "  ignoredWorkspaces: ['@app/web']\n  workspaceGates: [skip-validation]\n  validation: strict\n  defaultGroups: [stable]",
        );
        let hooks = CatalogHooks::new(&def);
        let ws = Workspace::new("@app/web")
            .with_dependency(DependencyKind::Dependencies, "react", "^18.0.0");

        // Filtered out of default groups, but the filter gate is not consulted
        let report = hooks.validate_workspace(&ws).unwrap();
        assert_eq!(report.errors.len(), 1);
        let err = hooks
            .on_dependency_added(&ws, DependencyKind::Dependencies, "react", "^18.0.0")
            .unwrap_err();
        assert!(matches!(err, HookError::Policy(PolicyError::Strict(v)) if v.package == "react"));
    }

    #[test]
    fn test_add_keeps_for_filtered_workspace_with_default_gates() {
        let def = with_options("  ignoredWorkspaces: ['@app/web']\n  validation: strict\n  defaultGroups: [stable]");
        let hooks = CatalogHooks::new(&def);
        let outcome = hooks
            .on_dependency_added(&Workspace::new("@app/web"), DependencyKind::Dependencies, "react", "^18.0.0")
            .unwrap();
        assert_eq!(outcome, AddOutcome::Keep);
    }

    #[test]
    fn test_validate_workspace_sorts_findings() {
        let def = with_options("  validation: {stable: strict, root: warn}");
        let hooks = CatalogHooks::new(&def);
        let ws = Workspace::new("@app/web")
            .with_dependency(DependencyKind::Dependencies, "react", "^18.0.0")
            .with_dependency(DependencyKind::Dependencies, "lodash", "^4.0.0")
            .with_dependency(DependencyKind::DevDependencies, "left-pad", "^1.0.0")
            .with_dependency(DependencyKind::DevDependencies, "local", "workspace:*");

        let report = hooks.validate_workspace(&ws).unwrap();
        assert_eq!(report.skipped, None);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].package, "react");
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].package, "lodash");

        let err = report.into_result().unwrap_err();
        assert!(matches!(err, PolicyError::StrictViolations { violations, .. } if violations.len() == 1));
    }

    #[test]
    fn test_validate_workspace_clean() {
        let def = definition(LIST);
        let hooks = CatalogHooks::new(&def);
        let ws = Workspace::new("@app/web")
            .with_dependency(DependencyKind::Dependencies, "react", "catalog:beta")
            .with_dependency(DependencyKind::Dependencies, "lodash", "catalog:");

        let report = hooks.validate_workspace(&ws).unwrap();
        assert!(report.is_clean());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_validate_workspace_unknown_alias() {
        let def = definition(LIST);
        let hooks = CatalogHooks::new(&def);
        let ws = Workspace::new("@app/web")
            .with_dependency(DependencyKind::Dependencies, "react", "catalog:nightly");

        assert!(matches!(
            hooks.validate_workspace(&ws),
            Err(CatalogError::InvalidAlias(AliasError::UnknownGroup(g))) if g.as_str() == "nightly"
        ));
    }

    #[test]
    fn test_validate_workspace_gates() {
        let def = with_options("  ignoredWorkspaces: ['@app/legacy']\n  skipValidationWorkspaces: ['@app/*']");
        let hooks = CatalogHooks::new(&def);
        let dep = |name: &str| {
            Workspace::new(name).with_dependency(DependencyKind::Dependencies, "react", "^1.0.0")
        };

        let report = hooks.validate_workspace(&dep("@app/legacy")).unwrap();
        assert_eq!(report.skipped, Some(SkipReason::Ignored));
        let report = hooks.validate_workspace(&dep("@app/web")).unwrap();
        assert_eq!(report.skipped, Some(SkipReason::ValidationSkipped));
        let report = hooks.validate_workspace(&dep("@lib/core")).unwrap();
        assert_eq!(report.skipped, None);
        assert_eq!(report.warnings.len(), 1);
    }
}
