//! Labels command - look up entries of the class label table.

use clap::Args;
use console::style;

use imcls_core::ClassLabelTable;

use super::load_config;

/// Arguments for the labels command.
#[derive(Args)]
pub struct LabelsArgs {
    /// Only show labels containing this text (case-insensitive)
    #[arg(short, long, conflicts_with = "index")]
    search: Option<String>,

    /// Show the label at this class index
    #[arg(short, long)]
    index: Option<usize>,
}

pub async fn run(args: LabelsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let custom;
    let table = match &config.prediction.labels_file {
        Some(path) => {
            custom = ClassLabelTable::from_file(path)?;
            &custom
        }
        None => ClassLabelTable::imagenet(),
    };

    if let Some(index) = args.index {
        let label = table.get(index).ok_or_else(|| {
            anyhow::anyhow!(
                "Class index {} out of range (table has {} labels)",
                index,
                table.len()
            )
        })?;
        println!("{}", label);
        return Ok(());
    }

    let rows: Vec<(usize, &str)> = match &args.search {
        Some(needle) => table.search(needle),
        None => table.iter().enumerate().collect(),
    };

    if rows.is_empty() {
        println!("{} No matching labels", style("ℹ").blue());
        return Ok(());
    }

    for (index, label) in rows {
        println!("{:>4}  {}", style(index).dim(), label);
    }

    Ok(())
}
