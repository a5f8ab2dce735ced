mod config;
mod wiring;

use std::error::Error;

use core_sim::StrategyParams;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "dashboard_server=info,runtime=info,api=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = config::Config::from_env()?;
    info!(
        mode = config.mode.as_str(),
        symbol = %config.symbol,
        start = %config.start_date,
        output = %config.snapshot_output_path.display(),
        "configuration loaded"
    );
    let runner = wiring::build_runner(&config)?;

    match config.mode {
        config::RunMode::Serve => {
            let listener = TcpListener::bind(config.listen_addr).await?;
            info!(addr = %config.listen_addr, "dashboard listening");
            axum::serve(listener, wiring::build_app(runner)).await?;
        }
        config::RunMode::Once => {
            let report = runner.run(1, StrategyParams::default()).await?;
            info!(
                months = report.summary.months,
                final_total = report.summary.final_total,
                return_pct = report.summary.return_pct,
                dip_months = report.summary.dip_months,
                "single run finished"
            );
        }
    }

    Ok(())
}
