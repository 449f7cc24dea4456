//! Stream driver tests against mock async I/O.

use std::io;

use serde_json::Value;
use tokio::io::BufReader;
use tokio_test::io::Builder;

use edgewise::engine::{run_stream, StreamReport};
use edgewise::strategy::EdgePipeline;

const STRONG_TICK: &str = r#"{"market":{"slug":"btc-updown-15m","title":"Bitcoin Up or Down"},"quote":{"up":0.45,"down":0.55},"forecast":{"modelUp":0.75,"modelDown":0.25},"strike":{"price":100000.0,"priceToBeat":100010.0,"timeLeftMinutes":12.0},"spread":0.01}"#;

const NO_QUOTE_TICK: &str = r#"{"forecast":{"modelUp":0.6,"modelDown":0.4},"strike":{"timeLeftMinutes":4.0}}"#;

fn parse_lines(out: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(out)
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[tokio::test]
async fn test_lines_split_across_reads() {
    let (head, tail) = STRONG_TICK.split_at(40);
    let mock = Builder::new()
        .read(head.as_bytes())
        .read(tail.as_bytes())
        .read(b"\n")
        .read(NO_QUOTE_TICK.as_bytes())
        .read(b"\n")
        .build();

    let pipeline = EdgePipeline::default();
    let mut out = Vec::new();
    let report = run_stream(&pipeline, BufReader::new(mock), &mut out)
        .await
        .unwrap();

    assert_eq!(
        report,
        StreamReport {
            ticks_processed: 2,
            ticks_malformed: 0,
            buys: 1,
            enters: 1,
        }
    );

    let snapshots = parse_lines(&out);
    assert_eq!(snapshots.len(), 2);

    let first = &snapshots[0];
    assert_eq!(first["market"]["slug"], "btc-updown-15m");
    assert_eq!(first["market"]["timeLeftSec"], 720);
    assert_eq!(first["prices"]["spread"], 0.01);
    assert_eq!(first["strike"]["diff"], -10.0);
    assert_eq!(first["recommendation"]["action"], "ENTER");
    assert_eq!(first["recommendation"]["phase"], "EARLY");
    assert_eq!(first["robustEdge"]["decision"], "BUY");
    assert_eq!(first["robustEdge"]["side"], "UP");

    let second = &snapshots[1];
    assert_eq!(second["recommendation"]["reason"], "missing_market_data");
    assert_eq!(second["recommendation"]["phase"], "LATE");
    assert_eq!(second["robustEdge"]["reason"], "missing_market_data");
    assert!(second["edge"]["edgeUp"].is_null());
}

#[tokio::test]
async fn test_malformed_lines_are_counted_and_skipped() {
    let input = format!("not json at all\n\n   \n{STRONG_TICK}\n{{\"quote\": 5}}\n");
    let mock = Builder::new().read(input.as_bytes()).build();

    let pipeline = EdgePipeline::default();
    let mut out = Vec::new();
    let report = run_stream(&pipeline, BufReader::new(mock), &mut out)
        .await
        .unwrap();

    assert_eq!(report.ticks_processed, 1);
    assert_eq!(report.ticks_malformed, 2);
    assert_eq!(parse_lines(&out).len(), 1);
}

#[tokio::test]
async fn test_per_tick_overrides() {
    let strict = STRONG_TICK.replacen('{', r#"{"overrides":{"minRobustRoi":3.0},"#, 1);
    let input = format!("{strict}\n{STRONG_TICK}\n");
    let mock = Builder::new().read(input.as_bytes()).build();

    let pipeline = EdgePipeline::default();
    let mut out = Vec::new();
    let report = run_stream(&pipeline, BufReader::new(mock), &mut out)
        .await
        .unwrap();

    let snapshots = parse_lines(&out);
    assert_eq!(snapshots[0]["robustEdge"]["reason"], "robust_roi_below_threshold");
    assert_eq!(snapshots[1]["robustEdge"]["decision"], "BUY");
    assert_eq!(report.buys, 1);
    assert_eq!(report.enters, 2);
}

#[tokio::test]
async fn test_read_error_aborts_run() {
    let mock = Builder::new()
        .read(format!("{STRONG_TICK}\n").as_bytes())
        .read_error(io::Error::new(io::ErrorKind::BrokenPipe, "upstream closed"))
        .build();

    let pipeline = EdgePipeline::default();
    let mut out = Vec::new();
    let err = run_stream(&pipeline, BufReader::new(mock), &mut out)
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("upstream closed"));
    // The tick before the failure was still written.
    assert_eq!(parse_lines(&out).len(), 1);
    assert_eq!(pipeline.history_len(), (1, 1));
}
