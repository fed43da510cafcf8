use serde::Serialize;

use crate::core::options::{Options, WorkspaceGate};

/// Decides whether a workspace takes part in catalog processing
#[derive(Debug, Clone, Copy)]
pub struct WorkspaceFilter<'a> {
    options: &'a Options,
}

impl<'a> WorkspaceFilter<'a> {
    #[must_use]
    pub fn new(options: &'a Options) -> Self {
        Self { options }
    }

    /// True if the workspace is excluded from catalog processing.
    ///
    /// Ignore patterns always win over include patterns. A non-empty include
    /// list excludes every workspace it does not match. Workspaces without an
    /// identifier are never ignored.
    #[must_use]
    pub fn is_ignored(&self, ident: Option<&str>) -> bool {
        let Some(ident) = ident else {
            return false;
        };

        if self.options.ignored_workspaces.matches(ident) {
            return true;
        }

        !self.options.included_workspaces.is_empty()
            && !self.options.included_workspaces.matches(ident)
    }

    /// True if the workspace is exempt from dependency validation
    #[must_use]
    pub fn skips_validation(&self, ident: Option<&str>) -> bool {
        ident.is_some_and(|ident| self.options.skip_validation_workspaces.matches(ident))
    }

    /// Run the configured gates in order and report the first that excludes
    /// the workspace from validation
    #[must_use]
    pub fn validation_gate(&self, ident: Option<&str>) -> Option<SkipReason> {
        self.options.workspace_gates.iter().find_map(|gate| match gate {
            WorkspaceGate::Filter if self.is_ignored(ident) => Some(SkipReason::Ignored),
            WorkspaceGate::SkipValidation if self.skips_validation(ident) => {
                Some(SkipReason::ValidationSkipped)
            }
            _ => None,
        })
    }
}

/// Why a workspace was left out of validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Excluded by `includedWorkspaces` / `ignoredWorkspaces`
    Ignored,
    /// Listed in `skipValidationWorkspaces`
    ValidationSkipped,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ignored => write!(f, "workspace is excluded from catalogs"),
            Self::ValidationSkipped => write!(f, "workspace skips catalog validation"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::RawOptions;

    fn options(yaml: &str) -> Options {
        serde_yaml_ng::from_str::<RawOptions>(yaml)
            .unwrap()
            .compile()
            .unwrap()
    }

    #[test]
    fn test_no_patterns_includes_everything() {
        let opts = Options::default();
        let filter = WorkspaceFilter::new(&opts);
        assert!(!filter.is_ignored(Some("@app/web")));
    }

    #[test]
    fn test_ignored_pattern() {
        let opts = options("ignoredWorkspaces: ['@app/legacy-*']");
        let filter = WorkspaceFilter::new(&opts);
        assert!(filter.is_ignored(Some("@app/legacy-admin")));
        assert!(!filter.is_ignored(Some("@app/web")));
    }

    #[test]
    fn test_included_patterns_restrict() {
        let opts = options("includedWorkspaces: ['@app/*']");
        let filter = WorkspaceFilter::new(&opts);
        assert!(!filter.is_ignored(Some("@app/web")));
        assert!(filter.is_ignored(Some("@lib/utils")));
    }

    #[test]
    fn test_ignore_wins_over_include() {
        let opts = options("includedWorkspaces: ['@app/*']\nignoredWorkspaces: ['@app/web']");
        let filter = WorkspaceFilter::new(&opts);
        assert!(filter.is_ignored(Some("@app/web")));
        assert!(!filter.is_ignored(Some("@app/admin")));
    }

    #[test]
    fn test_anonymous_workspace_never_ignored() {
        let opts = options("includedWorkspaces: ['@app/*']\nignoredWorkspaces: ['*']");
        let filter = WorkspaceFilter::new(&opts);
        assert!(!filter.is_ignored(None));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let opts = options("ignoredWorkspaces: ['@app/Web']");
        let filter = WorkspaceFilter::new(&opts);
        assert!(!filter.is_ignored(Some("@app/web")));
    }

    #[test]
    fn test_gate_order_decides_reason() {
        let yaml = "ignoredWorkspaces: ['@app/web']\nskipValidationWorkspaces: ['@app/*']";
        let opts = options(yaml);
        assert_eq!(
            WorkspaceFilter::new(&opts).validation_gate(Some("@app/web")),
            Some(SkipReason::Ignored)
        );

        let opts = options(&format!("{yaml}\nworkspaceGates: [skip-validation, filter]"));
        assert_eq!(
            WorkspaceFilter::new(&opts).validation_gate(Some("@app/web")),
            Some(SkipReason::ValidationSkipped)
        );
        assert_eq!(
            WorkspaceFilter::new(&opts).validation_gate(Some("@lib/core")),
            None
        );
    }

    #[test]
    fn test_gate_can_be_disabled() {
        let opts = options("ignoredWorkspaces: ['@app/web']\nworkspaceGates: [skip-validation]");
        let filter = WorkspaceFilter::new(&opts);
        assert_eq!(filter.validation_gate(Some("@app/web")), None);
        assert!(filter.is_ignored(Some("@app/web")));
    }
}
