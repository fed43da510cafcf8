use serde::{Deserialize, Serialize};

/// Protocol prefix that defers version resolution to a catalog
pub const CATALOG_PROTOCOL: &str = "catalog:";

/// Protocol prepended to ranges that do not carry one
pub const DEFAULT_PROTOCOL: &str = "npm:";

/// Slash-delimited path naming a catalog group (e.g. "stable/next")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupName(pub String);

impl GroupName {
    /// Reserved name of the top-level, unnamed group
    pub const ROOT: &'static str = "root";

    pub fn new(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            Self::root()
        } else {
            Self(s)
        }
    }

    #[must_use]
    pub fn root() -> Self {
        Self(Self::ROOT.to_string())
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == Self::ROOT
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments, in order. The root group has the single segment "root".
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// True when every segment is non-empty
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty() && self.segments().all(|s| !s.is_empty())
    }

    /// Ancestor chain, most general first and `self` last.
    ///
    /// ```
    /// use catalog_resolver::core::types::GroupName;
    ///
    /// let chain = GroupName::new("a/b/c").chain();
    /// let names: Vec<&str> = chain.iter().map(GroupName::as_str).collect();
    /// assert_eq!(names, ["a", "a/b", "a/b/c"]);
    /// ```
    #[must_use]
    pub fn chain(&self) -> Vec<GroupName> {
        if self.is_root() {
            return vec![Self::root()];
        }

        let mut chain = Vec::new();
        let mut prefix = String::with_capacity(self.0.len());
        for segment in self.segments().filter(|s| !s.is_empty()) {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            chain.push(GroupName(prefix.clone()));
        }

        if chain.is_empty() {
            chain.push(Self::root());
        }
        chain
    }

    /// The `catalog:` range that references this group
    #[must_use]
    pub fn to_alias(&self) -> String {
        if self.is_root() {
            CATALOG_PROTOCOL.to_string()
        } else {
            format!("{CATALOG_PROTOCOL}{}", self.0)
        }
    }

    /// Parse a dependency range of the form `catalog:<group>`.
    ///
    /// `catalog:` and `catalog:root` both address the root group.
    #[must_use]
    pub fn from_alias(range: &str) -> Option<Self> {
        range
            .strip_prefix(CATALOG_PROTOCOL)
            .map(|alias| Self::new(alias.trim()))
    }
}

impl std::fmt::Display for GroupName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GroupName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Enforcement strength applied when a dependency bypasses the catalog protocol
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ValidationLevel {
    Off,
    #[default]
    Warn,
    Strict,
}

impl std::fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Warn => write!(f, "warn"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

/// Return the protocol prefix of a range (including the colon), if any.
///
/// A protocol is a leading ASCII letter followed by letters, digits, `+`, `-`
/// or `.`, terminated by `:`.
#[must_use]
pub fn range_protocol(range: &str) -> Option<&str> {
    let colon = range.find(':')?;
    let scheme = &range[..colon];
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Some(&range[..=colon])
    } else {
        None
    }
}

/// Prepend `protocol` unless the range already carries one
#[must_use]
pub fn with_default_protocol(range: &str, protocol: &str) -> String {
    if range_protocol(range).is_some() {
        range.to_string()
    } else {
        format!("{protocol}{range}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_nested() {
        let chain = GroupName::new("a/b/c").chain();
        assert_eq!(
            chain,
            vec![
                GroupName::new("a"),
                GroupName::new("a/b"),
                GroupName::new("a/b/c")
            ]
        );
    }

    #[test]
    fn test_chain_root_and_empty() {
        assert_eq!(GroupName::root().chain(), vec![GroupName::root()]);
        assert_eq!(GroupName::new("").chain(), vec![GroupName::root()]);
    }

    #[test]
    fn test_chain_repeated_segments() {
        let chain = GroupName::new("a/b/a").chain();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain[2].as_str(), "a/b/a");
        assert_ne!(chain[2], GroupName::new("a"));
    }

    #[test]
    fn test_well_formed() {
        assert!(GroupName::new("stable/next").is_well_formed());
        assert!(!GroupName::new("stable//next").is_well_formed());
        assert!(!GroupName::new("/stable").is_well_formed());
        assert!(!GroupName::new("stable/").is_well_formed());
    }

    #[test]
    fn test_alias_roundtrip() {
        assert_eq!(GroupName::root().to_alias(), "catalog:");
        assert_eq!(GroupName::new("beta").to_alias(), "catalog:beta");
        assert_eq!(GroupName::from_alias("catalog:"), Some(GroupName::root()));
        assert_eq!(GroupName::from_alias("catalog:root"), Some(GroupName::root()));
        assert_eq!(
            GroupName::from_alias("catalog:beta/next"),
            Some(GroupName::new("beta/next"))
        );
        assert_eq!(GroupName::from_alias("^1.0.0"), None);
    }

    #[test]
    fn test_level_ordering() {
        assert!(ValidationLevel::Strict > ValidationLevel::Warn);
        assert!(ValidationLevel::Warn > ValidationLevel::Off);
        assert_eq!(ValidationLevel::default(), ValidationLevel::Warn);
    }

    #[test]
    fn test_range_protocol() {
        assert_eq!(range_protocol("npm:^1.0.0"), Some("npm:"));
        assert_eq!(range_protocol("workspace:*"), Some("workspace:"));
        assert_eq!(range_protocol("^1.0.0"), None);
        assert_eq!(range_protocol(">=1.0.0 <2.0.0"), None);
        assert_eq!(range_protocol("1:2"), None);
    }

    #[test]
    fn test_with_default_protocol() {
        assert_eq!(with_default_protocol("^18.0.0", "npm:"), "npm:^18.0.0");
        assert_eq!(with_default_protocol("npm:^18.0.0", "npm:"), "npm:^18.0.0");
        assert_eq!(
            with_default_protocol("patch:react@1.0.0", "npm:"),
            "patch:react@1.0.0"
        );
    }
}
