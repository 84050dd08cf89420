//! Session orchestrator - coordinates all components.
//!
//! Wires ingestion sources, the row engine and the dispatcher together,
//! pumps packets into rows, and merges stdin log messages onto the same
//! timeline.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{LocalClock, RecorderBlueprint, SinkConfig, SinkType};
use dispatcher::DispatcherConfig;
use ingestion::{IngestionPipeline, MockDeviceSource, ReplaySource};
use observability::{record_packet_received, SessionMetricsAggregator};
use row_engine::RecorderEngine;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::SessionStats;

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The recorder blueprint
    pub blueprint: RecorderBlueprint,

    /// Channel buffer size
    pub buffer_size: usize,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,

    /// Replay a captured session instead of live sources
    pub replay_path: Option<PathBuf>,

    /// Replay speed multiplier (0 = as fast as possible)
    pub replay_speed: f64,

    /// Add a console echo sink
    pub echo: bool,

    /// Read log messages from stdin
    pub read_stdin: bool,
}

/// Main session orchestrator
pub struct Session {
    config: SessionConfig,
}

impl Session {
    /// Create a new session with the given configuration
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Run the session to completion
    pub async fn run(self) -> Result<SessionStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // One clock for ingestion receive stamps and log-message stamps
        let clock = LocalClock::new();
        let schema = blueprint.row_schema();

        // Setup Ingestion Pipeline
        info!("Setting up ingestion pipeline...");
        let mut ingestion = IngestionPipeline::new(self.config.buffer_size, clock);

        for address in &blueprint.session.addresses {
            match &self.config.replay_path {
                Some(path) => {
                    let source = ReplaySource::from_file(address.as_str(), path)
                        .with_context(|| format!("Failed to load replay for {address}"))?
                        .with_speed(self.config.replay_speed);
                    info!(
                        address = %address,
                        events = source.event_count(),
                        "Registered replay source"
                    );
                    ingestion.register_source(Box::new(source), None);
                }
                None => {
                    // The OSC/UDP transport binds outside this process; a
                    // mock source stands in for each subscription.
                    warn!(
                        address = %address,
                        bind = format!("{}:{}", blueprint.network.bind_ip, blueprint.network.bind_port),
                        "No transport attached, using mock source"
                    );
                    ingestion
                        .register_source(Box::new(MockDeviceSource::with_defaults(address.as_str())), None);
                }
            }
        }

        let active_sources = ingestion.source_count();
        info!(active_sources, "Ingestion pipeline configured");

        // Setup Row Engine
        let engine = Arc::new(RecorderEngine::new(schema.clone(), clock));
        engine.start_session();

        // Setup Dispatcher
        info!("Setting up dispatcher...");
        let (row_tx, row_rx) = mpsc::channel(self.config.buffer_size);

        let mut sinks = blueprint.sinks.clone();
        if self.config.echo && !sinks.iter().any(|s| s.sink_type == SinkType::Log) {
            sinks.push(SinkConfig {
                name: "echo".to_string(),
                sink_type: SinkType::Log,
                queue_capacity: self.config.buffer_size,
                params: Default::default(),
            });
        }
        let active_sinks = sinks.len();

        let dispatcher = dispatcher::create_dispatcher(
            DispatcherConfig {
                sinks,
                schema,
                precision: blueprint.session.precision,
                separator: blueprint.session.separator.clone(),
            },
            row_rx,
        )
        .context("Failed to create dispatcher")?;
        let dispatcher_handle = dispatcher.spawn();

        info!(active_sinks, "Dispatcher started");

        // Start Pipeline
        info!("Starting packet ingestion...");
        ingestion.start_all();
        let ingestion_rx = ingestion
            .take_receiver()
            .context("Failed to get ingestion receiver")?;

        // Stdin task: each line becomes a message row on the same timeline
        let message_count = Arc::new(std::sync::atomic::AtomicU64::new(0));
        let stdin_task = if self.config.read_stdin {
            let engine = Arc::clone(&engine);
            let row_tx = row_tx.clone();
            let message_count = Arc::clone(&message_count);
            Some(tokio::spawn(async move {
                let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    let text = line.trim();
                    if text.is_empty() {
                        continue;
                    }
                    let row = engine.log_message(text);
                    if row_tx.send(row).await.is_err() {
                        break;
                    }
                    message_count.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                }
            }))
        } else {
            None
        };

        let duration_secs = blueprint.session.duration_secs;

        // Packet processing loop
        let mut stats = SessionStats {
            active_sources,
            active_sinks,
            ..Default::default()
        };
        let mut aggregator = SessionMetricsAggregator::new();

        let deadline = async {
            if duration_secs > 0 {
                tokio::time::sleep(Duration::from_secs(duration_secs)).await;
            } else {
                std::future::pending::<()>().await;
            }
        };
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => {
                    info!(duration_secs, "Recording duration reached");
                    break;
                }
                packet = ingestion_rx.recv() => {
                    let Ok(packet) = packet else {
                        info!("Ingestion channel closed");
                        break;
                    };

                    stats.packets_received += 1;
                    record_packet_received(&packet.address);

                    let row = engine.process_packet(packet);
                    aggregator.update(&row);

                    if row_tx.send(row).await.is_err() {
                        warn!("Dispatcher channel closed");
                        break;
                    }
                    stats.rows_emitted += 1;
                }
            }
        }

        // Shutdown: stop sources, close the row channel, drain sinks
        ingestion.stop_all();
        if let Some(task) = stdin_task {
            task.abort();
            let _ = task.await;
        }
        stats.message_rows = message_count.load(std::sync::atomic::Ordering::Relaxed);
        stats.rows_emitted += stats.message_rows;
        drop(row_tx);
        dispatcher_handle
            .await
            .context("Dispatcher task panicked")?;

        let ingestion_snapshot = ingestion.metrics().snapshot();
        stats.packets_dropped = ingestion_snapshot.packets_dropped;
        stats.malformed_payloads = engine.malformed_payloads();
        stats.duration = start_time.elapsed();
        stats.session_metrics = aggregator;

        Ok(stats)
    }
}
