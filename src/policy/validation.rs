use crate::core::options::{Options, ValidationConfig};
use crate::core::types::{GroupName, ValidationLevel};

/// Computes how strictly catalog usage is enforced
#[derive(Debug, Clone, Copy)]
pub struct ValidationEngine<'a> {
    options: &'a Options,
}

impl<'a> ValidationEngine<'a> {
    #[must_use]
    pub fn new(options: &'a Options) -> Self {
        Self { options }
    }

    /// Level configured for a group.
    ///
    /// A per-group map is searched from the group itself up through its
    /// ancestors; the first explicit entry applies. Without one the level is
    /// `warn`.
    #[must_use]
    pub fn level_for_group(&self, name: &GroupName) -> ValidationLevel {
        match &self.options.validation {
            None => ValidationLevel::default(),
            Some(ValidationConfig::Global(level)) => *level,
            Some(ValidationConfig::PerGroup(levels)) => name
                .chain()
                .iter()
                .rev()
                .find_map(|ancestor| levels.get(ancestor).copied())
                .unwrap_or_default(),
        }
    }

    /// Strictest level among the groups offering a package; `off` when none do
    #[must_use]
    pub fn level_for_package<'g, I>(&self, applicable_groups: I) -> ValidationLevel
    where
        I: IntoIterator<Item = &'g GroupName>,
    {
        applicable_groups
            .into_iter()
            .map(|group| self.level_for_group(group))
            .max()
            .unwrap_or(ValidationLevel::Off)
    }
}
