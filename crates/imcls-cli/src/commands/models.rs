//! Models command - inspect the configured models.

use std::fs;

use clap::{Args, Subcommand};
use console::style;
use serde::Serialize;

use imcls_core::{ModelCatalog, ModelRegistry, ModelStatus, OrtBackend, OrtModelLoader};

use super::{format_size, load_config};

/// Arguments for the models command.
#[derive(Args)]
pub struct ModelsArgs {
    #[command(subcommand)]
    command: ModelsCommand,
}

#[derive(Subcommand)]
enum ModelsCommand {
    /// List configured models
    List,

    /// Check model assets on disk
    Status(StatusArgs),
}

#[derive(Args)]
struct StatusArgs {
    /// Also try to load every model and report readiness
    #[arg(long)]
    load: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct StatusRow {
    name: &'static str,
    path: String,
    size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<ModelStatus>,
}

pub async fn run(args: ModelsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let catalog = ModelCatalog::from_config(&config)?;

    match args.command {
        ModelsCommand::List => list_models(&catalog),
        ModelsCommand::Status(status_args) => {
            check_status(&catalog, status_args, config.models.num_threads).await
        }
    }
}

fn list_models(catalog: &ModelCatalog) -> anyhow::Result<()> {
    println!("{}", style("Available Models").bold());
    println!();

    for spec in catalog.iter() {
        println!(
            "{} {}",
            style(format!("▸ {:<12}", spec.name())).bold().cyan(),
            style(format!("{0}x{0}", spec.input_size)).dim()
        );
        println!("    {}", spec.path.display());
    }

    println!();
    println!("Commands:");
    println!("  imcls classify <image> -m <model>    Classify an image");
    println!("  imcls models status --load           Check that every model loads");

    Ok(())
}

async fn check_status(catalog: &ModelCatalog, args: StatusArgs, threads: usize) -> anyhow::Result<()> {
    let statuses = if args.load {
        let registry: ModelRegistry<OrtBackend> = ModelRegistry::new(catalog);
        let catalog_owned = catalog.clone();
        let registry = tokio::task::spawn_blocking(move || {
            registry.load_all(&catalog_owned, &OrtModelLoader::new(threads));
            registry
        })
        .await?;
        Some(registry.statuses())
    } else {
        None
    };

    let mut rows = Vec::with_capacity(catalog.len());
    for spec in catalog.iter() {
        let size_bytes = if spec.path.exists() {
            Some(fs::metadata(&spec.path)?.len())
        } else {
            None
        };
        let status = statuses.as_ref().and_then(|all| {
            all.iter()
                .find(|(kind, _)| *kind == spec.kind)
                .map(|(_, status)| status.clone())
        });

        rows.push(StatusRow {
            name: spec.name(),
            path: spec.path.display().to_string(),
            size_bytes,
            status,
        });
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{}", style("Model Status").bold());
    println!();

    let mut missing = 0;
    for row in &rows {
        let (marker, size) = match row.size_bytes {
            Some(size) => (style("✓").green(), format_size(size)),
            None => {
                missing += 1;
                (style("✗").red(), "missing".to_string())
            }
        };

        println!("  {} {:<12} {:>10}  {}", marker, row.name, size, row.path);

        match &row.status {
            Some(ModelStatus::Ready) => println!("      {}", style("loads").green()),
            Some(ModelStatus::Failed(reason)) => {
                println!("      {} {}", style("failed:").red(), reason)
            }
            Some(other) => println!("      {:?}", other),
            None => {}
        }
    }

    println!();
    if missing == 0 {
        println!("{} All model files present", style("✓").green().bold());
    } else {
        println!(
            "{} {} of {} model files missing",
            style("⚠").yellow().bold(),
            missing,
            rows.len()
        );
    }

    Ok(())
}
