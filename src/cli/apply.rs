use clap::Args;

use crate::catalog::projection::{diff, ApplyProjector, ProjectionDiff};
use crate::cli::{OutputFormat, Project};

#[derive(Args)]
pub struct ApplyArgs {
    /// Report pending changes without writing; fail if there are any
    #[arg(long)]
    pub check: bool,
}

pub fn run(
    args: ApplyArgs,
    project: &mut Project,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let definition = project.store.require(&project.root)?;
    let definition_path = project.store.definition_path(&project.root);
    let native_path = project.store.native_path(&project.root);

    if verbose {
        eprintln!(
            "Loaded {} catalog groups from {}",
            definition.len(),
            definition_path.display()
        );
    }

    let projection = ApplyProjector::new(&definition).project();
    let existing = project.store.load_applied(&project.root)?;
    let result = diff(&existing, &projection)?;

    let written = !args.check && result.changed;
    if written {
        project.store.apply(&project.root, &projection)?;
    }

    match format {
        OutputFormat::Text => print_text(&result, args.check, written, &native_path.display().to_string()),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "definition": definition_path.display().to_string(),
                "target": native_path.display().to_string(),
                "check": args.check,
                "changed": result.changed,
                "written": written,
                "changes": result.changes,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    if args.check && result.changed {
        anyhow::bail!(
            "{} is out of date with the catalog definition ({} changes pending)",
            native_path.display(),
            result.changes.len()
        );
    }

    Ok(())
}

fn print_text(result: &ProjectionDiff, check: bool, written: bool, target: &str) {
    println!("Catalog Apply");
    println!("{}", "=".repeat(60));
    println!("Target: {target}");

    if !result.changed {
        println!("\nCatalogs are up to date.");
        return;
    }

    println!("\nChanges ({}):", result.changes.len());
    for change in &result.changes {
        println!("  {change}");
    }

    if check {
        println!("\nRun `catalogs apply` to write these changes.");
    } else if written {
        println!("\nUpdated {target}.");
    }
}
