use clap::Parser;
use ferrous_rpz_application::ports::ZoneSourcePort;
use ferrous_rpz_infrastructure::{ConsoleServer, JsonUdpListener};
use ferrous_rpz_jobs::{JobRunner, ZoneRefreshJob};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod di;

#[derive(Parser)]
#[command(name = "ferrous-rpz")]
#[command(version)]
#[command(about = "Ferrous RPZ - PTR synthesis from live DNS telemetry")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// RPZ zone name receiving the synthesized records
    #[arg(short = 'z', long)]
    zone: Option<String>,

    /// Zone master address for dynamic updates (host:port)
    #[arg(short = 'u', long)]
    update_target: Option<String>,

    /// Telemetry listener bind address (host:port)
    #[arg(short = 't', long)]
    telemetry_bind: Option<String>,

    /// Diagnostic console bind address (host:port)
    #[arg(long)]
    console_bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = ferrous_rpz_domain::CliOverrides {
        zone_name: cli.zone.clone(),
        update_target: cli.update_target.clone(),
        telemetry_bind: cli.telemetry_bind.clone(),
        console_bind: cli.console_bind.clone(),
        log_level: cli.log_level.clone(),
    };

    let config = ferrous_rpz_domain::Config::load(cli.config.as_deref(), cli_overrides)?;
    config.validate()?;

    let log_level = config.logging.level.parse().unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true)
        .with_max_level(log_level)
        .with_ansi(true)
        .init();

    info!("Starting Ferrous RPZ v{}", env!("CARGO_PKG_VERSION"));
    info!(
        config_file = cli.config.as_deref().unwrap_or("default"),
        zone = %config.zone.name,
        update_target = %config.zone.update_target,
        telemetry = %config.telemetry.bind_address,
        cache_size = config.cache.size,
        "Configuration loaded"
    );

    let engine = di::engine::build_engine(&config);

    // one-shot zone read seeds both views before any telemetry flows
    let zone_source = di::engine::build_zone_source(&config);
    let snapshot = zone_source.load().await?;
    engine.bootstrap(snapshot).await;

    let shutdown = CancellationToken::new();

    let listener = Arc::new(
        JsonUdpListener::new(config.telemetry.bind_address.clone(), engine.clone())
            .with_cancellation(shutdown.clone()),
    );
    let telemetry_task = tokio::spawn(listener.run());

    if config.console.enabled {
        let console = Arc::new(
            ConsoleServer::new(config.console.bind_address.clone(), engine.clone())
                .with_cancellation(shutdown.clone()),
        );
        tokio::spawn(async move {
            if let Err(e) = console.run().await {
                error!(error = %e, "Diagnostic console failed");
            }
        });
    }

    JobRunner::new()
        .with_zone_refresh(ZoneRefreshJob::new(engine.clone()))
        .with_shutdown_token(shutdown.clone())
        .start()
        .await;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        result = telemetry_task => {
            match result {
                Ok(Err(e)) => error!(error = %e, "Telemetry listener terminated"),
                Ok(Ok(())) => info!("Telemetry listener stopped"),
                Err(e) => error!(error = %e, "Telemetry task panicked"),
            }
        }
    }

    // no flush of pending batches: the zone is the durable view and the
    // next telemetry reconstructs the rest
    shutdown.cancel();
    info!("Ferrous RPZ stopped");
    Ok(())
}
