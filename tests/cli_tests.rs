//! CLI surface tests - help, stack creation, display and single-entry tools

mod common;

use common::{json_output, read_stack, setup_sample_stack, setup_stack, tolstack, tolstack_in};
use predicates::prelude::*;
use tempfile::TempDir;

// ============================================================================
// Help & Version
// ============================================================================

#[test]
fn test_help_lists_commands() {
    tolstack()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("pareto"))
        .stdout(predicate::str::contains("setup"));
}

#[test]
fn test_version() {
    tolstack()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tolstack"));
}

#[test]
fn test_completions_bash() {
    tolstack()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tolstack"));
}

// ============================================================================
// new
// ============================================================================

#[test]
fn test_new_creates_stack_file() {
    let tmp = TempDir::new().unwrap();
    tolstack_in(&tmp)
        .args(["new", "--title", "Gap Analysis"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created stack"));

    let stack = read_stack(&tmp);
    assert_eq!(stack["version"], "1.0");
    assert_eq!(stack["analysisSetup"]["metadata"]["title"], "Gap Analysis");
    assert_eq!(stack["analysisSetup"]["metadata"]["analyst"], "Test Analyst");
    assert_eq!(stack["stackData"].as_array().unwrap().len(), 0);
    assert!(stack["timestamp"].is_string());
}

#[test]
fn test_new_refuses_to_overwrite() {
    let tmp = setup_stack();
    tolstack_in(&tmp)
        .args(["new"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    tolstack_in(&tmp)
        .args(["new", "--force", "--title", "Replaced"])
        .assert()
        .success();
    assert_eq!(
        read_stack(&tmp)["analysisSetup"]["metadata"]["title"],
        "Replaced"
    );
}

#[test]
fn test_new_sample_has_ten_rows() {
    let tmp = setup_sample_stack();
    let stack = read_stack(&tmp);
    let rows = stack["stackData"].as_array().unwrap();
    assert_eq!(rows.len(), 10);
    assert_eq!(rows[0]["description"], "Base Plate Thickness");
    assert_eq!(rows[2]["tolType"], "GD&T");
}

#[test]
fn test_new_advanced_sets_cpk_criterion() {
    let tmp = TempDir::new().unwrap();
    tolstack_in(&tmp)
        .args(["new", "--advanced"])
        .assert()
        .success();
    let stack = read_stack(&tmp);
    assert_eq!(stack["settings"]["advancedStatisticalMode"], true);
    assert_eq!(
        stack["analysisSetup"]["criticalRequirement"]["acceptanceCriteria"],
        "cpk-1.33"
    );
}

#[test]
fn test_new_with_custom_file() {
    let tmp = TempDir::new().unwrap();
    tolstack_in(&tmp)
        .args(["--file", "gap.json", "new"])
        .assert()
        .success();
    let stack = common::read_json(&tmp.path().join("gap.json"));
    assert_eq!(stack["analysisSetup"]["metadata"]["title"], "gap");
}

// ============================================================================
// show
// ============================================================================

#[test]
fn test_show_missing_file_fails() {
    let tmp = TempDir::new().unwrap();
    tolstack_in(&tmp)
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_show_lists_contributors() {
    let tmp = setup_sample_stack();
    tolstack_in(&tmp)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sample"))
        .stdout(predicate::str::contains("Shaft Length"))
        .stdout(predicate::str::contains("worst-case"));
}

#[test]
fn test_show_json_is_stack_document() {
    let tmp = setup_sample_stack();
    let json = json_output(&tmp, &["show"]);
    assert_eq!(json["stackData"].as_array().unwrap().len(), 10);
}

#[test]
fn test_show_csv_rows() {
    let tmp = setup_sample_stack();
    tolstack_in(&tmp)
        .args(["show", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "description,nominal,direction,tol,tolType,cpk,floatShifted",
        ))
        .stdout(predicate::str::contains("Spacer Block,8.3,+,0.08,Linear,1.67,false"));
}

#[test]
fn test_invalid_json_reports_diagnostic() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("stack.json"),
        "{\n  \"stackData\": [\n    {\"nominal\": 1,}\n  ]\n}\n",
    )
    .unwrap();
    tolstack_in(&tmp)
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid stack file"));
}

#[test]
fn test_loose_file_loads() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("stack.json"),
        r#"{"stackData": [{"description": "Loose", "nominal": "12", "tol": "abc", "cpk": ""}],
            "annotations": [{"kind": "arrow"}], "canvasImage": "data:image/png;base64,AAAA"}"#,
    )
    .unwrap();
    tolstack_in(&tmp).arg("show").assert().success();

    // a save keeps the opaque fields
    tolstack_in(&tmp)
        .args(["setup", "meta", "--project", "P-1"])
        .assert()
        .success();
    let stack = read_stack(&tmp);
    assert_eq!(stack["annotations"][0]["kind"], "arrow");
    assert_eq!(stack["canvasImage"], "data:image/png;base64,AAAA");
    assert_eq!(stack["stackData"][0]["tol"], "abc");
    assert_eq!(stack["stackData"][0]["nominal"], 12.0);
}

#[test]
fn test_null_sections_load_as_defaults() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("stack.json"),
        r#"{"stackData": [{"description": "Kept", "nominal": 3, "direction": "down",
            "tolType": "Profile", "tol": 0.1}],
            "annotations": {}, "settings": null,
            "analysisSetup": {"metadata": null, "criticalRequirement": null}}"#,
    )
    .unwrap();

    let json = json_output(&tmp, &["analyze"]);
    assert_eq!(json["stack"]["stack_mean"], 3.0);

    tolstack_in(&tmp)
        .args(["setup", "limits", "--lsl", "2", "--usl", "4"])
        .assert()
        .success();
    let stack = read_stack(&tmp);
    assert_eq!(stack["stackData"][0]["direction"], "down");
    assert_eq!(stack["stackData"][0]["tolType"], "Profile");
    assert_eq!(stack["annotations"], serde_json::json!([]));
    assert_eq!(stack["analysisSetup"]["criticalRequirement"]["usl"], 4.0);
}

// ============================================================================
// tol
// ============================================================================

#[test]
fn test_tol_asymmetric() {
    let tmp = TempDir::new().unwrap();
    let json = json_output(&tmp, &["tol", "10+0.3/-0.1"]);
    assert_eq!(json["kind"], "asymmetric");
    common::assert_close(&json["nominal_adj"], 10.1);
    common::assert_close(&json["tol_adj"], 0.4);
}

#[test]
fn test_tol_numeric_and_unparseable() {
    let tmp = TempDir::new().unwrap();
    let json = json_output(&tmp, &["tol", "-0.25", "--nominal", "4"]);
    assert_eq!(json["kind"], "symmetric");
    common::assert_close(&json["nominal_adj"], 4.0);
    common::assert_close(&json["tol_adj"], 0.25);

    tolstack_in(&tmp)
        .args(["tol", "abc", "--nominal", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unparseable"))
        .stdout(predicate::str::contains("3.000"));
}
