//! Classify command - rank labels for a single image.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info, warn};

use imcls_core::registry::{LoadSummary, ModelStatus};
use imcls_core::{AppState, Classifier, OrtBackend, OrtModelLoader, Prediction, SelectedImage};

use super::load_config;

/// Arguments for the classify command.
#[derive(Args)]
pub struct ClassifyArgs {
    /// Image file to classify
    #[arg(required = true)]
    input: PathBuf,

    /// Model to use (InceptionV3, ResNet50, Xception)
    #[arg(short, long)]
    model: Option<String>,

    /// Number of predictions to show
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Directory holding one sub-directory per model
    #[arg(long)]
    asset_dir: Option<PathBuf>,

    /// Load only the selected model instead of every configured one
    #[arg(long)]
    lazy: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Ranked plain text
    Text,
}

#[derive(Serialize)]
struct ClassifyReport<'a> {
    image: String,
    model: &'a str,
    predictions: &'a [Prediction],
    processing_time_ms: u64,
}

pub async fn run(args: ClassifyArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(dir) = &args.asset_dir {
        config.models.asset_dir = dir.clone();
    }
    if let Some(top_k) = args.top_k {
        config.prediction.top_k = top_k;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let classifier: Classifier<OrtBackend> = Classifier::from_config(&config)?;
    let model = args
        .model
        .clone()
        .unwrap_or_else(|| config.prediction.default_model.clone());

    // Unknown names abort before anything is loaded
    let spec = classifier.catalog().resolve(&model)?.clone();

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(if args.lazy {
        format!("Loading {}...", spec.kind)
    } else {
        "Loading models...".to_string()
    });

    let registry = Arc::clone(classifier.registry());
    let catalog = classifier.catalog().clone();
    let loader = OrtModelLoader::new(config.models.num_threads);
    let lazy = args.lazy;

    let loading = tokio::task::spawn_blocking(move || {
        if lazy {
            let mut summary = LoadSummary::default();
            match registry.load(&spec, &loader) {
                Ok(()) => summary.loaded.push(spec.kind),
                Err(e) => summary.failed.push((spec.kind, e.to_string())),
            }
            summary
        } else {
            registry.load_all(&catalog, &loader)
        }
    });

    // Read the image while the models load
    let image = SelectedImage::from_path(&args.input)?;

    let summary = loading.await?;
    debug!("Loaded {:?}, failed {:?}", summary.loaded, summary.failed);
    for (kind, reason) in &summary.failed {
        warn!("{} unavailable: {}", kind, reason);
    }

    if let ModelStatus::Failed(reason) = classifier.model_status(&model)? {
        pb.finish_and_clear();
        anyhow::bail!("Model {} failed to load: {}", model, reason);
    }

    pb.set_message(format!("Classifying with {}...", model));

    let state = AppState::new().with_image(image).with_model(&model);
    let state = classifier.predict(&state)?;

    pb.finish_and_clear();

    let elapsed = start.elapsed();
    info!("Classified {} in {:?}", args.input.display(), elapsed);

    let report = ClassifyReport {
        image: args.input.display().to_string(),
        model: &model,
        predictions: state.predictions(),
        processing_time_ms: elapsed.as_millis() as u64,
    };

    let output = format_report(&report, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", output);
    }

    Ok(())
}

fn format_report(report: &ClassifyReport<'_>, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)? + "\n"),
        OutputFormat::Csv => format_csv(report.predictions),
        OutputFormat::Text => Ok(format_text(report)),
    }
}

fn format_csv(predictions: &[Prediction]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["rank", "class_name", "probability"])?;

    for (rank, prediction) in predictions.iter().enumerate() {
        writer.write_record([
            (rank + 1).to_string(),
            prediction.class_name.clone(),
            format!("{:.6}", prediction.probability),
        ])?;
    }

    Ok(String::from_utf8(writer.into_inner()?)?)
}

fn format_text(report: &ClassifyReport<'_>) -> String {
    let mut out = format!(
        "{} {} ({})\n",
        style("▸").cyan(),
        style(&report.image).bold(),
        report.model
    );

    for (rank, prediction) in report.predictions.iter().enumerate() {
        out.push_str(&format!(
            "  {:>2}. {:<40} {:>7.2}%\n",
            rank + 1,
            prediction.class_name,
            prediction.probability * 100.0
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(predictions: &[Prediction]) -> ClassifyReport<'_> {
        ClassifyReport {
            image: "cat.jpg".to_string(),
            model: "ResNet50",
            predictions,
            processing_time_ms: 12,
        }
    }

    #[test]
    fn test_csv_output() {
        let predictions = vec![
            Prediction::new("tabby", 0.75),
            Prediction::new("tiger cat, striped", 0.25),
        ];
        let csv = format_csv(&predictions).unwrap();

        assert_eq!(
            csv,
            "rank,class_name,probability\n1,tabby,0.750000\n2,\"tiger cat, striped\",0.250000\n"
        );
    }

    #[test]
    fn test_json_output() {
        let predictions = vec![Prediction::new("tabby", 0.75)];
        let json = format_report(&report(&predictions), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["model"], "ResNet50");
        assert_eq!(value["predictions"][0]["className"], "tabby");
        assert_eq!(value["predictions"][0]["probability"], 0.75);
    }

    #[test]
    fn test_text_output_ranks() {
        let predictions = vec![Prediction::new("tabby", 0.75), Prediction::new("lynx", 0.2)];
        let text = format_text(&report(&predictions));

        assert!(text.contains(" 1. tabby"));
        assert!(text.contains(" 2. lynx"));
        assert!(text.contains("75.00%"));
    }
}
