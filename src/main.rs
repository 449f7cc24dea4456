//! EDGEWISE: binary UP/DOWN edge scorer.
//!
//! Entry point. Loads configuration, initialises structured logging on
//! stderr, then reads newline-delimited JSON ticks from stdin and writes one
//! JSON snapshot per tick to stdout until the input ends or Ctrl+C.

use anyhow::Result;
use tokio::io::BufReader;
use tracing::{info, warn};

use edgewise::config::AppConfig;
use edgewise::engine::{run_stream, StreamReport};
use edgewise::strategy::EdgePipeline;

const BANNER: &str = r#"
           _
  ___  ___| | __ _  _____      _(_)___  ___
 / _ \/ _` |/ _` |/ _ \ \ /\ / / / __|/ _ \
|  __/ (_| | (_| |  __/\ V  V /| \__ \  __/
 \___|\__,_|\__, |\___| \_/\_/ |_|___/\___|
            |___/

  Binary UP/DOWN edge scoring engine
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path = AppConfig::path_from_env();
    let loaded = AppConfig::load_optional(&config_path)?;
    let from_file = loaded.is_some();
    let cfg = loaded.unwrap_or_default();

    init_logging(&cfg);

    // stdout carries snapshots, so the banner goes to stderr
    eprintln!("{BANNER}");
    if from_file {
        info!(path = %config_path, "Configuration loaded");
    } else {
        warn!(path = %config_path, "Config file not found, using defaults");
    }
    info!(
        lookback_minutes = cfg.engine.lookback_minutes,
        base_interval_minutes = cfg.engine.base_interval_minutes,
        fee_pct = cfg.robust.fee_pct,
        slippage_pct = cfg.robust.slippage_pct,
        min_robust_roi = cfg.robust.min_robust_roi,
        "EDGEWISE starting up"
    );

    let pipeline = EdgePipeline::from_config(&cfg);
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    info!("Reading ticks from stdin. Press Ctrl+C to stop.");

    tokio::select! {
        result = run_stream(&pipeline, stdin, stdout) => {
            let report = result?;
            log_stream_report(&report);
        }
        _ = tokio::signal::ctrl_c() => {
            let (up, down) = pipeline.history_len();
            info!(history_up = up, history_down = down, "Shutdown signal received.");
        }
    }

    info!("EDGEWISE shut down cleanly.");
    Ok(())
}

fn log_stream_report(report: &StreamReport) {
    info!(
        processed = report.ticks_processed,
        malformed = report.ticks_malformed,
        robust_buys = report.buys,
        phase_enters = report.enters,
        "Input exhausted"
    );
    if report.ticks_malformed > 0 {
        warn!(malformed = report.ticks_malformed, "Some ticks were skipped");
    }
}

fn init_logging(cfg: &AppConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.logging.filter));

    let json_logging = cfg.logging.json || std::env::var("EDGEWISE_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .init();
    }
}
