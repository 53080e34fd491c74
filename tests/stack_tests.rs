//! Stack workflow tests - rows, setup, analysis, Pareto, report and CSV transfer

mod common;

use common::{
    add_row, assert_close, json_output, read_json, read_stack, setup_sample_stack, setup_stack,
    tolstack_in,
};
use predicates::prelude::*;
use tempfile::TempDir;

fn scenario_a() -> TempDir {
    let tmp = setup_stack();
    add_row(&tmp, "A", "10", "+", "0.1");
    add_row(&tmp, "B", "10", "+", "0.2");
    add_row(&tmp, "C", "10", "+", "0.3");
    tmp
}

// ============================================================================
// Row editing
// ============================================================================

#[test]
fn test_row_add_writes_contributor() {
    let tmp = setup_stack();
    tolstack_in(&tmp)
        .args(["row", "add", "-d", "Housing", "-n", "20", "-t", "0.2", "--cpk", "1.67"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added item 1"));

    let stack = read_stack(&tmp);
    let row = &stack["stackData"][0];
    assert_eq!(row["description"], "Housing");
    assert_eq!(row["nominal"], 20.0);
    assert_eq!(row["direction"], "+");
    assert_eq!(row["tol"], 0.2);
    assert_eq!(row["cpk"], 1.67);
}

#[test]
fn test_row_add_creates_missing_file() {
    let tmp = TempDir::new().unwrap();
    add_row(&tmp, "First", "1", "-", "0.05");
    let stack = read_stack(&tmp);
    assert_eq!(stack["stackData"][0]["direction"], "-");
    assert_eq!(stack["analysisSetup"]["metadata"]["title"], "stack");
}

#[test]
fn test_row_edit_move_and_remove() {
    let tmp = scenario_a();

    tolstack_in(&tmp)
        .args(["row", "move", "3", "1"])
        .assert()
        .success();
    tolstack_in(&tmp)
        .args(["row", "rm", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed item 2"));
    tolstack_in(&tmp)
        .args(["row", "edit", "1", "--tol", "5 +0.2/-0.1", "--direction", "-"])
        .assert()
        .success();

    let stack = read_stack(&tmp);
    let rows = stack["stackData"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["description"], "C");
    assert_eq!(rows[0]["tol"], "5 +0.2/-0.1");
    assert_eq!(rows[0]["direction"], "-");
    assert_eq!(rows[1]["description"], "B");
}

#[test]
fn test_row_out_of_range() {
    let tmp = scenario_a();
    tolstack_in(&tmp)
        .args(["row", "rm", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
    tolstack_in(&tmp)
        .args(["row", "edit", "0", "--nominal", "1"])
        .assert()
        .failure();
}

// ============================================================================
// Analysis
// ============================================================================

#[test]
fn test_analyze_three_equal_nominals() {
    let tmp = scenario_a();
    let json = json_output(&tmp, &["analyze"]);

    assert_close(&json["stack"]["stack_mean"], 30.0);
    assert_close(&json["stack"]["worst_case"], 0.6);
    assert_close(&json["stack"]["rss"], 0.14f64.sqrt());
    assert_eq!(json["stack"]["count"], 3);
    assert_eq!(json["mode"], "basic");
    assert_eq!(json["judgement"]["criterion"], "worst-case");
    assert_eq!(json["judgement"]["verdict"], "indeterminate");
    assert!(json["capability"]["cpk"].is_null());
}

#[test]
fn test_analyze_single_negative_contributor_advanced() {
    let tmp = TempDir::new().unwrap();
    tolstack_in(&tmp).args(["new", "--advanced"]).assert().success();
    tolstack_in(&tmp)
        .args(["row", "add", "-d", "Only", "-n", "5", "-D", "-", "-t", "1", "--cpk", "1"])
        .assert()
        .success();
    tolstack_in(&tmp)
        .args(["setup", "limits", "--lsl", "-7", "--usl", "-3"])
        .assert()
        .success();

    let json = json_output(&tmp, &["analyze"]);
    assert_close(&json["stack"]["stack_mean"], -5.0);
    assert_close(&json["stack"]["stack_sigma"], 1.0 / 3.0);
    let cpk = json["capability"]["cpk"].as_f64().unwrap();
    assert!((cpk - 2.0).abs() < 1e-9, "cpk {}", cpk);
    assert_eq!(json["judgement"]["criterion"], "cpk-1.33");
    assert_eq!(json["judgement"]["verdict"], "pass");
}

#[test]
fn test_analyze_zero_sigma_with_limits_set() {
    let tmp = TempDir::new().unwrap();
    tolstack_in(&tmp).args(["new", "--advanced"]).assert().success();
    add_row(&tmp, "Gauge block", "1", "+", "0");
    tolstack_in(&tmp)
        .args(["setup", "limits", "--lsl", "0", "--usl", "2"])
        .assert()
        .success();

    let json = json_output(&tmp, &["analyze"]);
    assert_eq!(json["judgement"]["verdict"], "indeterminate");
    assert_eq!(json["judgement"]["reason"], "zero-sigma");

    tolstack_in(&tmp)
        .arg("analyze")
        .assert()
        .success()
        .stdout(predicate::str::contains("Stack sigma is zero"))
        .stdout(predicate::str::contains("setup limits").not());

    tolstack_in(&tmp)
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("N/A (stack sigma is zero, Cpk undefined)"))
        .stdout(predicate::str::contains("spec limits not set").not());
}

#[test]
fn test_analyze_missing_limits_reason() {
    let tmp = scenario_a();
    let json = json_output(&tmp, &["analyze"]);
    assert_eq!(json["judgement"]["verdict"], "indeterminate");
    assert_eq!(json["judgement"]["reason"], "missing-limits");
    tolstack_in(&tmp)
        .arg("analyze")
        .assert()
        .success()
        .stdout(predicate::str::contains("tolstack setup limits"));
}

#[test]
fn test_analyze_empty_stack() {
    let tmp = setup_stack();
    let json = json_output(&tmp, &["analyze"]);
    assert_eq!(json["stack"]["stack_mean"], 0.0);
    assert_eq!(json["stack"]["worst_case"], 0.0);
    assert_eq!(json["pareto"]["status"], "no_data");
}

#[test]
fn test_analyze_text_summary() {
    let tmp = scenario_a();
    tolstack_in(&tmp)
        .args(["setup", "limits", "--lsl", "29", "--usl", "31"])
        .assert()
        .success();
    tolstack_in(&tmp)
        .args(["analyze", "--pareto"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Worst-Case"))
        .stdout(predicate::str::contains("30.000"))
        .stdout(predicate::str::contains("PASS"))
        .stdout(predicate::str::contains("Sensitivity Analysis"));
}

#[test]
fn test_analyze_check_fails_outside_limits() {
    let tmp = scenario_a();
    tolstack_in(&tmp)
        .args(["setup", "limits", "--lsl", "29.9", "--usl", "30.1"])
        .assert()
        .success();
    tolstack_in(&tmp)
        .args(["analyze", "--check"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("FAIL"))
        .stderr(predicate::str::contains("fails acceptance criterion"));

    // rss band is ±0.374, still outside
    tolstack_in(&tmp)
        .args(["setup", "criterion", "rss"])
        .assert()
        .success();
    tolstack_in(&tmp).args(["analyze", "--check"]).assert().failure();

    tolstack_in(&tmp)
        .args(["setup", "limits", "--lsl", "29.5", "--usl", "30.5"])
        .assert()
        .success();
    tolstack_in(&tmp).args(["analyze", "--check"]).assert().success();
}

#[test]
fn test_analyze_csv_metrics() {
    let tmp = scenario_a();
    tolstack_in(&tmp)
        .args(["analyze", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("metric,value"))
        .stdout(predicate::str::contains("stack_mean,30"))
        .stdout(predicate::str::contains("criterion,worst-case"));
}

// ============================================================================
// Setup
// ============================================================================

#[test]
fn test_mode_switch_reconciles_criterion() {
    let tmp = setup_stack();
    tolstack_in(&tmp)
        .args(["setup", "criterion", "rss"])
        .assert()
        .success();

    tolstack_in(&tmp)
        .args(["setup", "mode", "advanced"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cpk-1.33"));
    let stack = read_stack(&tmp);
    assert_eq!(stack["settings"]["advancedStatisticalMode"], true);
    assert_eq!(
        stack["analysisSetup"]["criticalRequirement"]["acceptanceCriteria"],
        "cpk-1.33"
    );

    tolstack_in(&tmp)
        .args(["setup", "criterion", "cpk-2"])
        .assert()
        .success();
    tolstack_in(&tmp)
        .args(["setup", "mode", "basic"])
        .assert()
        .success()
        .stdout(predicate::str::contains("worst-case"));
}

#[test]
fn test_criterion_must_match_mode() {
    let tmp = setup_stack();
    tolstack_in(&tmp)
        .args(["setup", "criterion", "cpk-2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not available in basic mode"));
    tolstack_in(&tmp)
        .args(["setup", "criterion", "bogus"])
        .assert()
        .failure();
}

#[test]
fn test_stale_stored_criterion_ignored_in_basic_mode() {
    let tmp = scenario_a();
    let path = tmp.path().join("stack.json");
    let mut stack = read_stack(&tmp);
    stack["analysisSetup"]["criticalRequirement"]["acceptanceCriteria"] = "cpk-1.67".into();
    std::fs::write(&path, serde_json::to_string(&stack).unwrap()).unwrap();

    let json = json_output(&tmp, &["analyze"]);
    assert_eq!(json["judgement"]["criterion"], "worst-case");
}

#[test]
fn test_inverted_limits_warn() {
    let tmp = setup_stack();
    tolstack_in(&tmp)
        .args(["setup", "limits", "--lsl", "2", "--usl", "1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("LSL"));
    let stack = read_stack(&tmp);
    assert_eq!(stack["analysisSetup"]["criticalRequirement"]["lsl"], 2.0);
}

#[test]
fn test_setup_meta_and_display() {
    let tmp = setup_stack();
    tolstack_in(&tmp)
        .args([
            "setup",
            "meta",
            "--project",
            "Gearbox",
            "--part-nr",
            "PN-42",
            "--feature",
            "Axial gap",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated 3 field(s)"));
    tolstack_in(&tmp)
        .args(["setup", "display", "--tol-type", "on"])
        .assert()
        .success();

    let stack = read_stack(&tmp);
    assert_eq!(stack["analysisSetup"]["metadata"]["project"], "Gearbox");
    assert_eq!(stack["analysisSetup"]["metadata"]["partNr"], "PN-42");
    assert_eq!(
        stack["analysisSetup"]["criticalRequirement"]["criticalFeature"],
        "Axial gap"
    );
    assert_eq!(stack["settings"]["showToleranceType"], true);

    tolstack_in(&tmp).args(["setup", "meta"]).assert().failure();
}

// ============================================================================
// Pareto
// ============================================================================

#[test]
fn test_pareto_json_ranks_descending() {
    let tmp = setup_sample_stack();
    let json = json_output(&tmp, &["pareto"]);
    assert_eq!(json["status"], "ranked");

    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 10);
    let total: f64 = entries.iter().map(|e| e["percent"].as_f64().unwrap()).sum();
    assert!((total - 100.0).abs() < 1e-6);
    for pair in entries.windows(2) {
        assert!(pair[0]["percent"].as_f64() >= pair[1]["percent"].as_f64());
    }
    assert_eq!(entries[0]["class"], "vital_few");
    assert_eq!(entries[9]["class"], "trivial_many");
}

#[test]
fn test_pareto_text() {
    let tmp = setup_sample_stack();
    tolstack_in(&tmp)
        .arg("pareto")
        .assert()
        .success()
        .stdout(predicate::str::contains("Vital few"))
        .stdout(predicate::str::contains("Cumulative share"));
}

#[test]
fn test_pareto_empty() {
    let tmp = setup_stack();
    tolstack_in(&tmp)
        .arg("pareto")
        .assert()
        .success()
        .stdout(predicate::str::contains("No variance to rank"));
}

// ============================================================================
// Report
// ============================================================================

#[test]
fn test_report_to_stdout() {
    let tmp = setup_sample_stack();
    tolstack_in(&tmp)
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("# Sample"))
        .stdout(predicate::str::contains("## Contributors"))
        .stdout(predicate::str::contains("Overall Assembly Height"))
        .stdout(predicate::str::contains("## Pareto"));
}

#[test]
fn test_report_to_file() {
    let tmp = setup_sample_stack();
    tolstack_in(&tmp)
        .args(["report", "--output", "report.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote report"));
    let text = std::fs::read_to_string(tmp.path().join("report.md")).unwrap();
    assert!(text.contains("163.200"));
}

// ============================================================================
// Import / Export
// ============================================================================

#[test]
fn test_export_then_import_into_new_file() {
    let tmp = setup_sample_stack();
    tolstack_in(&tmp)
        .args(["export", "rows.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 10"));

    tolstack_in(&tmp)
        .args(["--file", "copy.json", "import", "rows.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 10"));

    let original = read_stack(&tmp);
    let copy = read_json(&tmp.path().join("copy.json"));
    assert_eq!(original["stackData"], copy["stackData"]);
}

#[test]
fn test_import_replace_needs_confirmation() {
    let tmp = setup_sample_stack();
    std::fs::write(
        tmp.path().join("more.csv"),
        "description,nominal,direction,tol\nExtra,1,-,0.01\n",
    )
    .unwrap();

    tolstack_in(&tmp)
        .args(["import", "more.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));

    tolstack_in(&tmp)
        .args(["import", "more.csv", "--append"])
        .assert()
        .success();
    assert_eq!(read_stack(&tmp)["stackData"].as_array().unwrap().len(), 11);

    tolstack_in(&tmp)
        .args(["import", "more.csv", "--yes"])
        .assert()
        .success();
    let stack = read_stack(&tmp);
    assert_eq!(stack["stackData"].as_array().unwrap().len(), 1);
    assert_eq!(stack["stackData"][0]["direction"], "-");
}

#[test]
fn test_export_to_stdout() {
    let tmp = scenario_a();
    tolstack_in(&tmp)
        .args(["export", "-"])
        .assert()
        .success()
        .stdout(predicate::str::contains("A,10,+,0.1,Linear,,false"));
}
