//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::{RecorderBlueprint, SinkType};
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Session, SessionConfig};

/// Execute the `run` command
pub async fn run_session(args: &RunArgs) -> Result<()> {
    let blueprint = load_blueprint(args)?;

    info!(
        addresses = blueprint.session.addresses.len(),
        duration_secs = blueprint.session.duration_secs,
        bind = format!("{}:{}", blueprint.network.bind_ip, blueprint.network.bind_port),
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    // Build session configuration
    let session_config = SessionConfig {
        blueprint,
        buffer_size: args.buffer_size,
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
        replay_path: args.replay.clone(),
        replay_speed: args.replay_speed,
        echo: args.echo,
        read_stdin: !args.no_stdin,
    };

    let session = Session::new(session_config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting recording session...");

    tokio::select! {
        result = session.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        rows = stats.rows_emitted,
                        packets = stats.packets_received,
                        duration_secs = stats.duration.as_secs_f64(),
                        "Session completed"
                    );
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Recording session failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping session...");
        }
    }

    info!("OpenVR Recorder finished");
    Ok(())
}

/// Load the blueprint (config file or defaults) and apply CLI overrides
fn load_blueprint(args: &RunArgs) -> Result<RecorderBlueprint> {
    let mut blueprint = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => {
            info!("No configuration file given, using built-in defaults");
            RecorderBlueprint::default()
        }
    };

    if let Some(ref file) = args.file {
        info!(file = %file.display(), "Overriding output file from CLI");
        for sink in blueprint
            .sinks
            .iter_mut()
            .filter(|s| s.sink_type == SinkType::Csv)
        {
            sink.params
                .insert("path".to_string(), file.display().to_string());
        }
    }
    if !args.addresses.is_empty() {
        info!(addresses = ?args.addresses, "Overriding address patterns from CLI");
        blueprint.session.addresses = args.addresses.clone();
    }
    if let Some(duration) = args.duration {
        blueprint.session.duration_secs = duration;
    }
    if let Some(ref ip) = args.ip {
        blueprint.network.bind_ip = ip.clone();
    }
    if let Some(port) = args.port {
        blueprint.network.bind_port = port;
    }
    if let Some(precision) = args.precision {
        blueprint.session.precision = precision;
    }

    // Overrides bypass the parser, re-validate the final blueprint
    config_loader::ConfigLoader::validate(&blueprint)
        .context("Configuration invalid after CLI overrides")?;

    Ok(blueprint)
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &RecorderBlueprint) {
    let schema = blueprint.row_schema();

    println!("\n=== Configuration Summary ===\n");
    println!("Session:");
    println!("  Addresses: {}", blueprint.session.addresses.join(", "));
    println!(
        "  Duration: {}",
        if blueprint.session.duration_secs == 0 {
            "until stopped".to_string()
        } else {
            format!("{} s", blueprint.session.duration_secs)
        }
    );
    println!("  Precision: {}", blueprint.session.precision);
    println!("  Columns: {}", schema.column_count());

    println!("\nNetwork:");
    println!(
        "  Listen: {}:{}",
        blueprint.network.bind_ip, blueprint.network.bind_port
    );

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::RunArgs;
    use clap::Parser;

    fn args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["run"];
        full.extend(argv);
        RunArgs::parse_from(full)
    }

    #[test]
    fn test_defaults_without_config_file() {
        let blueprint = load_blueprint(&args(&[])).unwrap();
        assert_eq!(blueprint.session.addresses.len(), 4);
        assert_eq!(blueprint.network.bind_port, 7775);
    }

    #[test]
    fn test_cli_overrides_apply() {
        let blueprint = load_blueprint(&args(&[
            "--file",
            "run01.csv",
            "--address",
            "/HMD",
            "--duration",
            "30",
            "--port",
            "9000",
            "--precision",
            "6",
        ]))
        .unwrap();

        assert_eq!(blueprint.session.addresses, vec!["/HMD"]);
        assert_eq!(blueprint.session.duration_secs, 30);
        assert_eq!(blueprint.network.bind_port, 9000);
        assert_eq!(blueprint.session.precision, 6);
        assert_eq!(
            blueprint.sinks[0].params.get("path").map(String::as_str),
            Some("run01.csv")
        );
    }

    #[test]
    fn test_invalid_override_rejected() {
        let result = load_blueprint(&args(&["--address", "/Treadmill"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_config_file_rejected() {
        let result = load_blueprint(&args(&["--config", "/nonexistent/recorder.toml"]));
        assert!(result.is_err());
    }
}
