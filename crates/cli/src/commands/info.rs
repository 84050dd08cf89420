//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{RecorderBlueprint, KNOWN_ADDRESSES};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

#[derive(Serialize)]
struct InfoOutput {
    config_path: Option<String>,
    addresses: Vec<String>,
    known_addresses: Vec<String>,
    duration_secs: u64,
    precision: usize,
    separator: String,
    bind: String,
    column_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    columns: Option<Vec<String>>,
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    let (blueprint, config_path) = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            let blueprint = config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            (blueprint, Some(path.display().to_string()))
        }
        None => (RecorderBlueprint::default(), None),
    };

    let schema = blueprint.row_schema();
    let output = InfoOutput {
        config_path,
        addresses: blueprint.session.addresses.clone(),
        known_addresses: KNOWN_ADDRESSES.iter().map(|s| s.to_string()).collect(),
        duration_secs: blueprint.session.duration_secs,
        precision: blueprint.session.precision,
        separator: blueprint.session.separator.clone(),
        bind: format!(
            "{}:{}",
            blueprint.network.bind_ip, blueprint.network.bind_port
        ),
        column_count: schema.column_count(),
        columns: args.columns.then(|| schema.column_names()),
        sinks: blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
                queue_capacity: s.queue_capacity,
            })
            .collect(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_info(&output);
    }

    Ok(())
}

fn print_info(output: &InfoOutput) {
    match &output.config_path {
        Some(path) => println!("Configuration: {}", path),
        None => println!("Configuration: built-in defaults"),
    }
    println!("  Addresses: {}", output.addresses.join(", "));
    println!("  Known patterns: {}", output.known_addresses.join(", "));
    println!(
        "  Duration: {}",
        if output.duration_secs == 0 {
            "until stopped".to_string()
        } else {
            format!("{} s", output.duration_secs)
        }
    );
    println!("  Precision: {}", output.precision);
    println!("  Separator: {:?}", output.separator);
    println!("  Listen: {}", output.bind);
    println!("  Columns: {}", output.column_count);

    if let Some(ref columns) = output.columns {
        println!("\nRow schema:");
        for (idx, column) in columns.iter().enumerate() {
            println!("  {:>3}  {}", idx, column);
        }
    }

    println!("\nSinks ({}):", output.sinks.len());
    for sink in &output.sinks {
        println!(
            "  - {} ({}, queue {})",
            sink.name, sink.sink_type, sink.queue_capacity
        );
    }
}
