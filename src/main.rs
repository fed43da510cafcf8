use clap::Parser;
use tracing_subscriber::EnvFilter;

use catalog_resolver::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("catalog_resolver=debug,info")
    } else {
        EnvFilter::new("catalog_resolver=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let mut project = cli.project();

    match cli.command {
        cli::Commands::Apply(args) => {
            cli::apply::run(args, &mut project, cli.format, cli.verbose)?;
        }
        cli::Commands::List(args) => {
            cli::catalog::run_list(args, &mut project, cli.format, cli.verbose)?;
        }
        cli::Commands::Show(args) => {
            cli::catalog::run_show(args, &mut project, cli.format)?;
        }
        cli::Commands::Resolve(args) => {
            cli::catalog::run_resolve(args, &mut project, cli.format)?;
        }
        cli::Commands::Validate(args) => {
            cli::workspace::run_validate(args, &mut project, cli.format, cli.verbose)?;
        }
        cli::Commands::Add(args) => {
            cli::workspace::run_add(args, &mut project, cli.format)?;
        }
    }

    Ok(())
}
