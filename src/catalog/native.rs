//! The host's native catalog configuration.
//!
//! The host file holds a flat `catalog` mapping for the root group and a
//! two-level `catalogs` mapping for named groups. Writing replaces those two
//! top-level blocks and leaves every other line of the file untouched.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_yaml_ng::{Mapping, Value};

use super::definition::CatalogGroup;
use super::projection::Projection;
use super::store::CatalogError;
use crate::core::types::GroupName;

const ROOT_KEY: &str = "catalog";
const NAMED_KEY: &str = "catalogs";

#[derive(Serialize)]
struct NativeBlocks<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    catalog: Option<&'a CatalogGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    catalogs: Option<&'a BTreeMap<GroupName, CatalogGroup>>,
}

/// Location and format of the host configuration file
#[derive(Debug, Clone)]
pub struct NativeSurface {
    file: PathBuf,
}

impl NativeSurface {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    #[must_use]
    pub fn path(&self, root: &Path) -> PathBuf {
        root.join(&self.file)
    }

    /// Read the applied catalogs; a missing file is an empty projection
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file exists but cannot be read and
    /// `InvalidFormat` if the catalog keys are malformed.
    pub fn read(&self, root: &Path) -> Result<Projection, CatalogError> {
        let path = self.path(root);
        match std::fs::read_to_string(&path) {
            Ok(text) => parse(&text).map_err(|e| match e {
                CatalogError::InvalidFormat(msg) => {
                    CatalogError::InvalidFormat(format!("{}: {msg}", path.display()))
                }
                other => other,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Projection::default()),
            Err(source) => Err(CatalogError::Io { path, source }),
        }
    }

    /// Replace the catalog blocks of the host file with `projection`.
    ///
    /// The file is replaced atomically; it is created if missing.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read or replaced.
    pub fn write(&self, root: &Path, projection: &Projection) -> Result<(), CatalogError> {
        let path = self.path(root);
        let existing = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(source) => return Err(CatalogError::Io { path, source }),
        };

        let updated = splice(&existing, projection)?;

        let dir = path.parent().unwrap_or(root);
        let io_err = |source| CatalogError::Io {
            path: path.clone(),
            source,
        };
        let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        temp.write_all(updated.as_bytes()).map_err(io_err)?;

        // The temp file is created 0600; keep the mode of the file it replaces
        match std::fs::metadata(&path) {
            Ok(meta) => temp
                .as_file()
                .set_permissions(meta.permissions())
                .map_err(io_err)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => return Err(io_err(source)),
        }
        temp.persist(&path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

/// Extract the applied catalogs from host configuration text.
///
/// Scalar ranges written as numbers or booleans are read back as strings;
/// empty groups are dropped so the result compares equal to a projection.
///
/// # Errors
///
/// Returns `InvalidFormat` when the text is not YAML or the catalog keys do
/// not have the expected shape.
pub fn parse(text: &str) -> Result<Projection, CatalogError> {
    let value: Value =
        serde_yaml_ng::from_str(text).map_err(|e| CatalogError::InvalidFormat(e.to_string()))?;

    let mapping = match value {
        Value::Mapping(m) => m,
        Value::Null => return Ok(Projection::default()),
        _ => {
            return Err(CatalogError::InvalidFormat(
                "host configuration must be a mapping".to_string(),
            ))
        }
    };

    let root = match mapping.get(ROOT_KEY) {
        Some(value) => parse_group(ROOT_KEY, value)?,
        None => CatalogGroup::new(),
    };

    let mut named = BTreeMap::new();
    match mapping.get(NAMED_KEY) {
        Some(Value::Mapping(groups)) => {
            for (name, value) in groups {
                let Value::String(name) = name else {
                    return Err(CatalogError::InvalidFormat(format!(
                        "'{NAMED_KEY}' keys must be group names"
                    )));
                };
                if GroupName::new(name.as_str()).is_root() {
                    return Err(CatalogError::InvalidFormat(format!(
                        "'{NAMED_KEY}' cannot hold the root group; use '{ROOT_KEY}'"
                    )));
                }
                let group = parse_group(name, value)?;
                if !group.is_empty() {
                    named.insert(GroupName::new(name.as_str()), group);
                }
            }
        }
        Some(Value::Null) | None => {}
        Some(_) => {
            return Err(CatalogError::InvalidFormat(format!(
                "'{NAMED_KEY}' must be a mapping of groups"
            )))
        }
    }

    Ok(Projection {
        root: (!root.is_empty()).then_some(root),
        named: (!named.is_empty()).then_some(named),
    })
}

fn parse_group(label: &str, value: &Value) -> Result<CatalogGroup, CatalogError> {
    let entries: &Mapping = match value {
        Value::Mapping(m) => m,
        Value::Null => return Ok(CatalogGroup::new()),
        _ => {
            return Err(CatalogError::InvalidFormat(format!(
                "catalog '{label}' must be a mapping"
            )))
        }
    };

    let mut group = CatalogGroup::new();
    for (package, range) in entries {
        let Value::String(package) = package else {
            return Err(CatalogError::InvalidFormat(format!(
                "package names in catalog '{label}' must be strings"
            )));
        };
        let range = match range {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => {
                return Err(CatalogError::InvalidFormat(format!(
                    "range for '{package}' in catalog '{label}' must be a scalar"
                )))
            }
        };
        group.insert(package.clone(), range);
    }
    Ok(group)
}

/// Rewrite host configuration text so its catalog blocks hold `projection`.
///
/// Lines outside the `catalog` and `catalogs` blocks are kept byte-for-byte;
/// the new blocks are appended at the end of the file.
///
/// # Errors
///
/// Returns `InvalidFormat` if the projection cannot be serialized.
pub fn splice(text: &str, projection: &Projection) -> Result<String, CatalogError> {
    let mut out = strip_catalog_blocks(text);

    if projection.is_empty() {
        return Ok(out);
    }

    let blocks = NativeBlocks {
        catalog: projection.root.as_ref(),
        catalogs: projection.named.as_ref(),
    };
    let yaml =
        serde_yaml_ng::to_string(&blocks).map_err(|e| CatalogError::InvalidFormat(e.to_string()))?;

    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&yaml);
    Ok(out)
}

/// Remove the top-level `catalog` / `catalogs` blocks.
///
/// Blank and comment lines between a catalog block and the next top-level
/// key are kept; those inside a block are dropped with it.
fn strip_catalog_blocks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending = String::new();
    let mut skipping = false;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            if skipping {
                pending.push_str(line);
            } else {
                out.push_str(line);
            }
            continue;
        }

        let top_level = !line.starts_with(|c: char| c == ' ' || c == '\t');
        if top_level {
            skipping = is_catalog_key(line);
            if !skipping {
                out.push_str(&pending);
            }
            pending.clear();
        } else if skipping {
            pending.clear();
        }

        if !skipping {
            out.push_str(line);
        }
    }

    out.push_str(&pending);
    out
}

fn is_catalog_key(line: &str) -> bool {
    [ROOT_KEY, NAMED_KEY].iter().any(|key| {
        [
            (*key).to_string(),
            format!("\"{key}\""),
            format!("'{key}'"),
        ]
        .iter()
        .any(|form| {
            line.strip_prefix(form.as_str())
                .and_then(|rest| rest.trim_start_matches(|c: char| c == ' ' || c == '\t').strip_prefix(':'))
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
        })
    })
}
