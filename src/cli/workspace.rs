use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use crate::cli::{OutputFormat, Project};
use crate::core::workspace::{DependencyKind, Workspace};
use crate::host::hooks::{AddOutcome, CatalogHooks, ValidationReport};
use crate::utils::validation::is_valid_package_name;

#[derive(Args)]
pub struct ValidateArgs {
    /// Workspace manifests (package.json files or their directories)
    #[arg(required = true, num_args = 1..)]
    pub manifests: Vec<PathBuf>,
}

#[derive(Args)]
pub struct AddArgs {
    /// Workspace manifest (package.json file or its directory)
    #[arg(required = true)]
    pub manifest: PathBuf,

    /// Package being added
    #[arg(required = true)]
    pub package: String,

    /// Range requested for the package (e.g., "^18.3.1")
    #[arg(required = true)]
    pub range: String,

    /// Add as a development dependency
    #[arg(short = 'D', long, conflicts_with = "optional")]
    pub dev: bool,

    /// Add as an optional dependency
    #[arg(short = 'O', long)]
    pub optional: bool,
}

fn load_workspace(path: &Path) -> anyhow::Result<Workspace> {
    let manifest = if path.is_dir() {
        path.join("package.json")
    } else {
        path.to_path_buf()
    };
    Workspace::from_manifest(&manifest)
        .with_context(|| format!("Failed to load workspace {}", manifest.display()))
}

pub fn run_validate(
    args: ValidateArgs,
    project: &mut Project,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let definition = project.store.require(&project.root)?;
    let hooks = CatalogHooks::new(&definition);

    let mut reports = Vec::with_capacity(args.manifests.len());
    for path in &args.manifests {
        let workspace = load_workspace(path)?;
        if verbose {
            eprintln!(
                "Checking {} ({} dependencies)",
                workspace.label(),
                workspace.dependencies().count()
            );
        }
        reports.push(hooks.validate_workspace(&workspace)?);
    }

    match format {
        OutputFormat::Text => print_reports(&reports),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }

    let mut failures = reports.into_iter().filter_map(|r| r.into_result().err());
    if let Some(first) = failures.next() {
        let others = failures.count();
        if others == 0 {
            return Err(first.into());
        }
        anyhow::bail!("{first} (and {others} more workspaces)");
    }

    Ok(())
}

fn print_reports(reports: &[ValidationReport]) {
    println!("Catalog Validation");
    println!("{}", "=".repeat(60));

    for report in reports {
        if let Some(reason) = report.skipped {
            println!("\n{}: skipped ({reason})", report.workspace);
            continue;
        }
        if report.is_clean() {
            println!("\n{}: ok", report.workspace);
            continue;
        }

        println!(
            "\n{}: {} warnings, {} errors",
            report.workspace,
            report.warnings.len(),
            report.errors.len()
        );
        for violation in &report.errors {
            println!("  [ERROR] {violation}");
        }
        for violation in &report.warnings {
            println!("  [WARN]  {violation}");
        }
    }
}

pub fn run_add(args: AddArgs, project: &mut Project, format: OutputFormat) -> anyhow::Result<()> {
    if !is_valid_package_name(&args.package) {
        anyhow::bail!("Invalid package name: '{}'", args.package);
    }

    let kind = if args.dev {
        DependencyKind::DevDependencies
    } else if args.optional {
        DependencyKind::OptionalDependencies
    } else {
        DependencyKind::Dependencies
    };

    let definition = project.store.require(&project.root)?;
    let workspace = load_workspace(&args.manifest)?;
    let outcome = CatalogHooks::new(&definition).on_dependency_added(
        &workspace,
        kind,
        &args.package,
        &args.range,
    )?;

    let recorded = match &outcome {
        AddOutcome::Rewrite(range) => range.as_str(),
        AddOutcome::Keep | AddOutcome::Warning(_) => args.range.as_str(),
    };

    match format {
        OutputFormat::Text => {
            println!("{kind}: {}@{recorded}", args.package);
            if let AddOutcome::Warning(violation) = &outcome {
                println!("[WARN] {violation}");
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "workspace": workspace.label(),
                "kind": kind,
                "package": args.package,
                "requested": args.range,
                "recorded": recorded,
                "result": outcome,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
