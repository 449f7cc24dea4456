//! Tick driver.
//!
//! Reads newline-delimited JSON ticks, runs each through the
//! [`EdgePipeline`], and writes one JSON [`Snapshot`] per tick. A malformed
//! line is logged and skipped; I/O failures end the run.

pub mod snapshot;

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error};

use crate::strategy::edge::Action;
use crate::strategy::robust::{RobustDecision, RobustOverrides};
use crate::strategy::{EdgePipeline, Tick};
use crate::types::EdgewiseError;
use snapshot::{MarketInfo, Snapshot};

/// One input line: the tick plus optional market identity and per-tick
/// robust-config overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickEnvelope {
    #[serde(default)]
    pub market: Option<MarketInfo>,
    #[serde(flatten)]
    pub tick: Tick,
    #[serde(default)]
    pub overrides: Option<RobustOverrides>,
}

/// Summary of a completed stream run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamReport {
    pub ticks_processed: usize,
    pub ticks_malformed: usize,
    /// Ticks where the robust strategy said BUY.
    pub buys: usize,
    /// Ticks where the phase-threshold strategy said ENTER.
    pub enters: usize,
}

/// Parse one input line.
pub fn parse_tick(line: &str, line_no: usize) -> Result<TickEnvelope, EdgewiseError> {
    serde_json::from_str(line).map_err(|e| EdgewiseError::MalformedTick {
        line: line_no,
        message: e.to_string(),
    })
}

/// Evaluate one tick, applying its overrides on top of the pipeline defaults.
pub fn evaluate_envelope(pipeline: &EdgePipeline, envelope: &TickEnvelope) -> Snapshot {
    let evaluation = match &envelope.overrides {
        Some(overrides) => {
            let config = pipeline.robust_config().with_overrides(overrides);
            pipeline.evaluate_with(&envelope.tick, &config)
        }
        None => pipeline.evaluate(&envelope.tick),
    };
    Snapshot::build(envelope.market.as_ref(), &envelope.tick, evaluation)
}

/// Process ticks until the reader is exhausted.
pub async fn run_stream<R, W>(pipeline: &EdgePipeline, reader: R, mut writer: W) -> Result<StreamReport>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut report = StreamReport::default();
    let mut lines = reader.lines();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await.context("Failed to read tick")? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let envelope = match parse_tick(line, line_no) {
            Ok(envelope) => envelope,
            Err(e) => {
                error!(error = %e, "Skipping malformed tick");
                report.ticks_malformed += 1;
                continue;
            }
        };

        let snapshot = evaluate_envelope(pipeline, &envelope);
        report.ticks_processed += 1;
        if snapshot.robust_edge.decision == RobustDecision::Buy {
            report.buys += 1;
        }
        if snapshot.recommendation.action == Action::Enter {
            report.enters += 1;
        }

        let mut json = serde_json::to_string(&snapshot).context("Failed to serialise snapshot")?;
        json.push('\n');
        writer
            .write_all(json.as_bytes())
            .await
            .context("Failed to write snapshot")?;
        writer.flush().await.context("Failed to flush snapshot")?;

        debug!(line = line_no, id = %snapshot.id, "Snapshot written");
    }

    Ok(report)
}
