//! Report pipeline orchestration and output tests.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::*;
use hyphae_core::output::{write_output, AnalyticsReport};
use hyphae_core::pipeline::{run_report, ProgressCallback};
use pretty_assertions::assert_eq;

// ===========================================================================
// Pipeline orchestration
// ===========================================================================

#[test]
fn report_fills_every_section() {
    let engine = widgets_engine();
    let report = run_report(&engine, WIDGETS, None).unwrap();
    assert_eq!(report.version, "1.0");
    assert!(report.summary.is_some());
    assert_eq!(report.jacks.len(), 1);
    assert_eq!(report.mavens.len(), 1);
    assert_eq!(report.connectors.len(), 7);
    assert!(report.knowledge_distribution.is_some());
    assert_eq!(report.bus_factor.as_ref().unwrap().high_risk_files.len(), 3);
    assert_eq!(report.collaborations.len(), 3);
    assert_eq!(report.critical_files.len(), 10);
    assert_eq!(report.contributions.len(), 7);
}

#[test]
fn report_progress_callback_sees_each_phase() {
    let engine = widgets_engine();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let callback: ProgressCallback = Box::new(move |phase, _label| {
        sink.borrow_mut().push(phase.to_string());
    });
    run_report(&engine, WIDGETS, Some(callback)).unwrap();
    assert_eq!(
        *seen.borrow(),
        vec![
            "summary",
            "roles",
            "distribution",
            "bus_factor",
            "collaboration",
            "critical_files",
            "contributions",
        ]
    );
}

#[test]
fn report_metadata_and_stats() {
    let engine = widgets_engine();
    let report = run_report(&engine, WIDGETS, None).unwrap();
    for key in [
        "repository",
        "analysed_at",
        "hyphae_version",
        "analysis_duration_ms",
        "phase_timings",
    ] {
        assert!(report.metadata.contains_key(key), "Missing metadata key: {key}");
    }
    let timings = report
        .metadata
        .get("phase_timings")
        .and_then(|v| v.as_object())
        .unwrap();
    assert_eq!(timings.len(), 7);

    assert_eq!(report.stats["developers"], serde_json::json!(7));
    assert_eq!(report.stats["commits"], serde_json::json!(10));
    assert_eq!(report.stats["files"], serde_json::json!(10));
    assert_eq!(report.stats["distribution_type"], serde_json::json!("hero"));
}

#[test]
fn report_on_missing_repository_is_not_found() {
    let engine = widgets_engine();
    let err = run_report(&engine, "acme/nothing", None).unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

// ===========================================================================
// Output
// ===========================================================================

#[test]
fn report_written_as_json() {
    let engine = widgets_engine();
    let report = run_report(&engine, WIDGETS, None).unwrap();

    let tmp = tempfile::NamedTempFile::new().unwrap();
    let out_path = tmp.path().to_string_lossy().to_string();
    write_output(&report, &out_path).unwrap();

    let content = std::fs::read_to_string(&out_path).unwrap();
    let parsed: AnalyticsReport = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed.jacks, report.jacks);
    assert_eq!(parsed.summary, report.summary);

    let raw: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(
        raw["knowledge_distribution"]["distribution_type"],
        serde_json::json!("hero")
    );
    assert_eq!(raw["jacks"][0]["handle"], serde_json::json!("alice"));
}
