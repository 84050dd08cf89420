//! Mock Session Demo
//!
//! Records five seconds of synthetic HMD, controller and hand telemetry to
//! a CSV file, logging a marker message once per second. Runs without any
//! OSC transport.
//!
//! Run with: cargo run --bin mock_session

use std::sync::Arc;
use std::time::Duration;

use config_loader::ConfigLoader;
use contracts::{LocalClock, RecorderBlueprint, SinkType};
use dispatcher::{create_dispatcher, DispatcherConfig};
use ingestion::{IngestionPipeline, MockDeviceSource};
use observability::SessionMetricsAggregator;
use row_engine::RecorderEngine;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("Starting Mock Session Demo");

    // ==== Stage 1: Use default config or load from file ====
    let mut blueprint = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading blueprint config");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        RecorderBlueprint::default()
    };
    for sink in &mut blueprint.sinks {
        if sink.sink_type == SinkType::Csv {
            sink.params
                .insert("path".to_string(), "demo_output.csv".to_string());
        }
    }

    let schema = blueprint.row_schema();
    let clock = LocalClock::new();

    // ==== Stage 2: Setup Ingestion Pipeline (mock sources) ====
    tracing::info!("Setting up mock ingestion pipeline...");
    let mut ingestion = IngestionPipeline::new(100, clock);
    for address in &blueprint.session.addresses {
        ingestion.register_source(Box::new(MockDeviceSource::with_defaults(address.as_str())), None);
        tracing::info!(address = %address, "Registered mock source");
    }

    // ==== Stage 3: Setup Row Engine and Dispatcher ====
    let engine = Arc::new(RecorderEngine::new(schema, clock));
    engine.start_session();

    let (row_tx, row_rx) = mpsc::channel(100);
    let dispatcher = create_dispatcher(
        DispatcherConfig {
            sinks: blueprint.sinks.clone(),
            schema,
            precision: blueprint.session.precision,
            separator: blueprint.session.separator.clone(),
        },
        row_rx,
    )?;
    let dispatcher_handle = dispatcher.spawn();

    // ==== Stage 4: Record for five seconds ====
    ingestion.start_all();
    let rx = ingestion
        .take_receiver()
        .ok_or("ingestion receiver already taken")?;

    tracing::info!("Waiting for packet data...");
    let mut aggregator = SessionMetricsAggregator::new();
    let mut marker = tokio::time::interval(Duration::from_secs(1));
    marker.tick().await;
    let mut marker_count = 0u32;

    loop {
        tokio::select! {
            _ = marker.tick() => {
                marker_count += 1;
                let row = engine.log_message(&format!("Test {marker_count}"));
                row_tx.send(row).await?;
                if marker_count == 5 {
                    tracing::info!("Recording window elapsed");
                    break;
                }
            }
            packet = rx.recv() => {
                let Ok(packet) = packet else { break };
                let row = engine.process_packet(packet);
                aggregator.update(&row);
                row_tx.send(row).await?;
            }
        }
    }

    // ==== Stage 5: Shutdown ====
    ingestion.stop_all();
    drop(row_tx);
    dispatcher_handle.await?;

    print!("{}", aggregator.summary());
    tracing::info!("Mock session demo finished");
    Ok(())
}
