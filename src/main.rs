use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use oncall_exporter::aggregators::default_aggregators;
use oncall_exporter::config::AppConfig;
use oncall_exporter::metrics::ExporterMetrics;
use oncall_exporter::scheduler::Scheduler;
use oncall_exporter::server;
use oncall_exporter::transport::OncallClient;

#[tokio::main]
async fn main() -> Result<()> {
    let config = match AppConfig::load().context("load configuration from environment") {
        Ok(config) => config,
        Err(err) => {
            // tracing is not up yet
            eprintln!("fatal configuration error: {err:#}");
            std::process::exit(1);
        }
    };
    init_tracing(&config).context("initialize tracing subscriber")?;

    if let Err(err) = run(config).await {
        tracing::error!(error = ?err, "fatal exporter error");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(config: AppConfig) -> Result<()> {
    let metrics = Arc::new(ExporterMetrics::new().context("declare exporter metrics")?);

    let client = OncallClient::new(
        &config.oncall_exporter_api_url,
        config.api_timeout(),
        metrics.clone(),
    )?;

    let _server = server::spawn(config.bind_addr()?, metrics.clone()).await?;

    info!(
        api = %client.endpoint(),
        period_secs = config.oncall_exporter_update_period,
        timeout_secs = config.oncall_exporter_api_timeout,
        "oncall exporter online"
    );

    let scheduler = Scheduler::new(default_aggregators(client, metrics), config.update_period());
    scheduler
        .run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "ctrl_c listener error");
            }
        })
        .await;

    info!("Terminating");
    Ok(())
}

fn init_tracing(config: &AppConfig) -> Result<()> {
    let env_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => format!("{},hyper=warn,reqwest=warn", config.log_level()?),
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("tracing subscriber init: {err}"))
}
