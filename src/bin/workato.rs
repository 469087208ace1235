use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recipe_validator::config::Config;
use recipe_validator::files::{collect_recipe_files, validate_path};
use recipe_validator::pill::{self, PillOutcome};
use recipe_validator::report::{self, OutputFormat};
use recipe_validator::{SchemaCatalog, ValidationReport};

#[derive(Parser)]
#[command(name = "workato")]
#[command(about = "Static checks for Workato recipe JSON", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work with recipe files
    Recipes {
        #[command(subcommand)]
        action: RecipeActions,
    },
    /// Inspect the connector catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogActions,
    },
}

#[derive(Subcommand)]
enum RecipeActions {
    /// Validate recipe files (directories expand to their *.json files)
    Validate {
        /// Recipe file or directory
        #[arg(short, long = "path", required = true)]
        paths: Vec<PathBuf>,
        /// Extra catalog file merged over the built-in catalog
        #[arg(short, long = "catalog")]
        catalogs: Vec<PathBuf>,
        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
        /// Treat warnings as failures
        #[arg(long)]
        strict: bool,
    },
    /// List every data pill in a recipe
    Pills {
        /// Recipe file
        #[arg(short, long)]
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum CatalogActions {
    /// List known providers and their operations
    Providers {
        /// Extra catalog file merged over the built-in catalog
        #[arg(short, long = "catalog")]
        catalogs: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "recipe_validator=warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = Config::load().context("loading configuration")?;

    match cli.command {
        Commands::Recipes { action } => match action {
            RecipeActions::Validate {
                paths,
                catalogs,
                format,
                strict,
            } => {
                config.catalog.paths.extend(catalogs);
                if let Some(format) = format {
                    config.output.format = format;
                }
                config.output.strict |= strict;
                cmd_recipes_validate(&paths, &config)
            }
            RecipeActions::Pills { path } => cmd_recipes_pills(&path),
        },
        Commands::Catalog { action } => match action {
            CatalogActions::Providers { catalogs } => {
                config.catalog.paths.extend(catalogs);
                cmd_catalog_providers(&config)
            }
        },
    }
}

fn cmd_recipes_validate(paths: &[PathBuf], config: &Config) -> anyhow::Result<ExitCode> {
    let catalog = config.catalog()?;
    let files = collect_recipe_files(paths)?;
    if files.is_empty() {
        anyhow::bail!("no recipe files found");
    }

    let reports: Vec<(String, ValidationReport)> = files
        .iter()
        .map(|path| (path.display().to_string(), validate_path(path, &catalog)))
        .collect();

    print!("{}", report::render(&reports, config.output.format)?);

    let failed = reports.iter().any(|(_, r)| {
        !r.is_valid() || (config.output.strict && r.warning_count() > 0)
    });
    Ok(if failed {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

fn cmd_recipes_pills(path: &Path) -> anyhow::Result<ExitCode> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let recipe = match recipe_validator::parse::parse(&json) {
        Ok(recipe) => recipe,
        Err(finding) => {
            println!("{}: {}", path.display(), finding);
            return Ok(ExitCode::from(1));
        }
    };

    let pills = pill::scan_recipe(&recipe);
    if pills.is_empty() {
        println!("No data pills found.");
        return Ok(ExitCode::SUCCESS);
    }

    for (block, located) in &pills {
        let block = block.as_deref().unwrap_or("-");
        match &located.outcome {
            PillOutcome::Reference(r) => {
                println!("{} [{}] {} ({})", located.pointer, block, r, r.syntax_form)
            }
            PillOutcome::Other { pill_type } => {
                println!("{} [{}] <{}>", located.pointer, block, pill_type)
            }
            PillOutcome::Malformed(m) => {
                println!("{} [{}] malformed: {}", located.pointer, block, m.message)
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_catalog_providers(config: &Config) -> anyhow::Result<ExitCode> {
    let catalog: SchemaCatalog = config.catalog()?;

    for provider in catalog.providers() {
        let mut flags = Vec::new();
        if provider.exhaustive {
            flags.push("exhaustive");
        }
        if !provider.requires_connection {
            flags.push("no connection");
        }
        if flags.is_empty() {
            println!("{}", provider.name);
        } else {
            println!("{} ({})", provider.name, flags.join(", "));
        }
        for op in &provider.operations {
            let required: Vec<&str> = op.required_fields().map(|f| f.name.as_str()).collect();
            if required.is_empty() {
                println!("  {:<7} {}", op.keyword.to_string(), op.name);
            } else {
                println!(
                    "  {:<7} {} (requires {})",
                    op.keyword.to_string(),
                    op.name,
                    required.join(", ")
                );
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
