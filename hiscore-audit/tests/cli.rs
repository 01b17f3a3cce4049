use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "hiscore-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

fn write_fixture(label: &str, contents: &str) -> std::path::PathBuf {
    let path = temp_path(label);
    std::fs::write(&path, contents).expect("write fixture");
    path
}

const HISTORY: &str = r#"[
  { "id": 1, "playerId": 1, "createdAt": "2023-01-01T00:00:00Z",
    "overallExperience": 1000, "overallRank": 50, "ehpValue": 1.0, "ehpRank": 10 },
  { "id": 2, "playerId": 1, "createdAt": "2023-02-01T00:00:00Z",
    "overallExperience": 2000, "overallRank": 40, "ehpValue": 5.0, "ehpRank": 9 },
  { "id": 3, "playerId": 2, "createdAt": "2023-01-15T00:00:00Z",
    "overallExperience": 9000, "overallRank": 2, "zulrahKills": 40, "zulrahRank": 100 }
]"#;

const REGRESSION: &str = r#"[
  { "id": 1, "playerId": 1, "createdAt": "2023-01-01T00:00:00Z",
    "overallExperience": 1000, "overallRank": 50 },
  { "id": 2, "playerId": 1, "createdAt": "2023-01-02T00:00:00Z",
    "overallExperience": 10, "overallRank": 90 }
]"#;

#[test]
fn cli_audit_of_clean_history_succeeds() {
    let exe = env!("CARGO_BIN_EXE_hiscore-audit");
    let snapshots = write_fixture("clean", HISTORY);
    let output_path = temp_path("clean-report");
    let status = Command::new(exe)
        .args(["--mode", "audit", "--report", "json", "--snapshots"])
        .arg(&snapshots)
        .arg("--output")
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());

    let content = std::fs::read_to_string(output_path).expect("read output");
    let report: serde_json::Value = serde_json::from_str(&content).expect("json report");
    assert_eq!(report["players"], serde_json::json!(2));
    assert_eq!(report["transitions"].as_array().map(Vec::len), Some(3));
}

#[test]
fn cli_audit_exits_nonzero_on_rejection() {
    let exe = env!("CARGO_BIN_EXE_hiscore-audit");
    let snapshots = write_fixture("regression", REGRESSION);
    let output = Command::new(exe)
        .args(["--report", "markdown", "--snapshots"])
        .arg(&snapshots)
        .output()
        .expect("run cli");
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("negative gains"));
}

#[test]
fn cli_leaders_names_players() {
    let exe = env!("CARGO_BIN_EXE_hiscore-audit");
    let snapshots = write_fixture("leaders", HISTORY);
    let players = write_fixture(
        "players",
        r#"[{ "id": 2, "username": "zezima", "displayName": "Zezima" }]"#,
    );
    let output = Command::new(exe)
        .args([
            "--mode",
            "leaders",
            "--report",
            "markdown",
            "--metrics",
            "overall,zulrah",
            "--snapshots",
        ])
        .arg(&snapshots)
        .arg("--players")
        .arg(&players)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("| overall | 9000 | 2 |"));
    assert!(stdout.contains("Zezima"));
    assert!(!stdout.contains("| attack |"));
}

#[test]
fn cli_average_uses_fixed_clock() {
    let exe = env!("CARGO_BIN_EXE_hiscore-audit");
    let snapshots = write_fixture("average", HISTORY);
    let output = Command::new(exe)
        .args([
            "--mode",
            "average",
            "--report",
            "json",
            "--exclude-unranked",
            "--now",
            "2024-01-01T00:00:00Z",
            "--snapshots",
        ])
        .arg(&snapshots)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json report");
    assert_eq!(report["id"], serde_json::json!(-1));
    assert_eq!(report["createdAt"], serde_json::json!("2024-01-01T00:00:00Z"));
    assert_eq!(
        report["data"]["skills"]["overall"]["experience"],
        serde_json::json!(4000)
    );
}

#[test]
fn cli_rejects_missing_snapshot_file() {
    let exe = env!("CARGO_BIN_EXE_hiscore-audit");
    let output = Command::new(exe)
        .args(["--snapshots"])
        .arg(temp_path("missing"))
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read"));
}
