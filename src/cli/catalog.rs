use clap::Args;

use crate::catalog::hierarchical::InheritanceResolver;
use crate::catalog::store::AliasError;
use crate::cli::{OutputFormat, Project};
use crate::core::types::{GroupName, CATALOG_PROTOCOL};
use crate::policy::validation::ValidationEngine;
use crate::utils::validation::is_valid_package_name;

#[derive(Args)]
pub struct ListArgs {
    /// Only list groups at or below this group
    #[arg(long)]
    pub under: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Group name (e.g., "stable/next", or "root")
    #[arg(required = true)]
    pub group: String,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Group name or alias (e.g., "stable" or "catalog:stable")
    #[arg(required = true)]
    pub group: String,

    /// Package name (e.g., "react" or "@types/node")
    #[arg(required = true)]
    pub package: String,
}

/// Accept both a bare group name and a `catalog:` alias
fn parse_group(arg: &str) -> GroupName {
    if arg.starts_with(CATALOG_PROTOCOL) {
        GroupName::from_alias(arg).unwrap_or_else(GroupName::root)
    } else {
        GroupName::new(arg)
    }
}

pub fn run_list(
    args: ListArgs,
    project: &mut Project,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let definition = project.store.require(&project.root)?;
    if verbose {
        eprintln!("Loaded catalog with {} groups", definition.len());
    }

    let under = args.under.as_deref().map(GroupName::new);
    let resolver = InheritanceResolver::new(&definition);
    let engine = ValidationEngine::new(&definition.options);

    let rows: Vec<_> = definition
        .group_names()
        .filter(|name| {
            under
                .as_ref()
                .map_or(true, |prefix| name.chain().contains(prefix))
        })
        .map(|name| {
            let packages = resolver.resolve(name).len();
            let level = engine.level_for_group(name);
            (name, packages, level)
        })
        .collect();

    match format {
        OutputFormat::Text => {
            let name_width = rows
                .iter()
                .map(|(name, _, _)| name.as_str().len())
                .max()
                .unwrap_or(5)
                .max(5);

            println!("Catalog Groups ({} groups)\n", rows.len());
            println!(
                "{:<name_w$} {:>8} {}",
                "Group",
                "Packages",
                "Validation",
                name_w = name_width
            );
            println!("{}", "-".repeat(name_width + 20));
            for (name, packages, level) in &rows {
                println!(
                    "{:<name_w$} {packages:>8} {}",
                    name.as_str(),
                    level,
                    name_w = name_width
                );
            }
        }
        OutputFormat::Json => {
            let output: Vec<_> = rows
                .iter()
                .map(|(name, packages, level)| {
                    serde_json::json!({
                        "group": name,
                        "alias": name.to_alias(),
                        "packages": packages,
                        "validation": level,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

pub fn run_show(args: ShowArgs, project: &mut Project, format: OutputFormat) -> anyhow::Result<()> {
    let definition = project.store.require(&project.root)?;
    let name = parse_group(&args.group);
    if !definition.contains(&name) {
        return Err(AliasError::UnknownGroup(name).into());
    }

    let chain = name.chain();
    let resolved = InheritanceResolver::new(&definition).resolve(&name);
    let level = ValidationEngine::new(&definition.options).level_for_group(&name);

    // Group each package was last defined by along the chain
    let origin = |package: &str| {
        chain
            .iter()
            .rev()
            .find(|group| {
                definition
                    .get(group)
                    .is_some_and(|entries| entries.contains_key(package))
            })
            .cloned()
            .unwrap_or_else(|| name.clone())
    };

    match format {
        OutputFormat::Text => {
            let chain_display: Vec<&str> = chain.iter().map(GroupName::as_str).collect();
            println!("Group: {name}\n");
            println!("Alias:      {}", name.to_alias());
            println!("Chain:      {}", chain_display.join(" -> "));
            println!("Validation: {level}");
            println!("Packages:   {}", resolved.len());

            if !resolved.is_empty() {
                let pkg_width = resolved.keys().map(String::len).max().unwrap_or(7).max(7);
                let range_width = resolved.values().map(String::len).max().unwrap_or(5).max(5);
                println!();
                println!(
                    "{:<pkg_w$} {:<range_w$} From",
                    "Package",
                    "Range",
                    pkg_w = pkg_width,
                    range_w = range_width
                );
                println!("{}", "-".repeat(pkg_width + range_width + 20));
                for (package, range) in &resolved {
                    println!(
                        "{:<pkg_w$} {:<range_w$} {}",
                        package,
                        range,
                        origin(package),
                        pkg_w = pkg_width,
                        range_w = range_width
                    );
                }
            }
        }
        OutputFormat::Json => {
            let packages: Vec<_> = resolved
                .iter()
                .map(|(package, range)| {
                    serde_json::json!({
                        "package": package,
                        "range": range,
                        "from": origin(package),
                    })
                })
                .collect();
            let output = serde_json::json!({
                "group": name,
                "alias": name.to_alias(),
                "chain": chain,
                "validation": level,
                "packages": packages,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

pub fn run_resolve(
    args: ResolveArgs,
    project: &mut Project,
    format: OutputFormat,
) -> anyhow::Result<()> {
    if !is_valid_package_name(&args.package) {
        anyhow::bail!("Invalid package name: '{}'", args.package);
    }

    let definition = project.store.require(&project.root)?;
    let name = parse_group(&args.group);
    let range = InheritanceResolver::new(&definition).resolve_range(&name, &args.package)?;

    match format {
        OutputFormat::Text => println!("{range}"),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "group": name,
                "alias": name.to_alias(),
                "package": args.package,
                "range": range,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_group_accepts_aliases() {
        assert_eq!(parse_group("stable"), GroupName::new("stable"));
        assert_eq!(parse_group("catalog:stable"), GroupName::new("stable"));
        assert_eq!(parse_group("catalog:"), GroupName::root());
        assert_eq!(parse_group("root"), GroupName::root());
    }
}
