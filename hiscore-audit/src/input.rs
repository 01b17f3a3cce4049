use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use hiscore_core::{GainRules, Metric, Player, Snapshot};
use std::fs;
use std::path::Path;

use crate::util::split_csv;

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Load a JSON array of flat snapshot records.
pub fn load_snapshots(path: &Path) -> Result<Vec<Snapshot>> {
    let json = read_file(path)?;
    serde_json::from_str(&json)
        .with_context(|| format!("failed to parse snapshots from {}", path.display()))
}

/// Load a JSON array of player records.
pub fn load_players(path: &Path) -> Result<Vec<Player>> {
    let json = read_file(path)?;
    serde_json::from_str(&json)
        .with_context(|| format!("failed to parse players from {}", path.display()))
}

/// Gain rules from `path`, or the embedded defaults when no path is given.
pub fn load_rules(path: Option<&Path>) -> Result<GainRules> {
    let Some(path) = path else {
        return Ok(GainRules::default_rules().clone());
    };
    let json = read_file(path)?;
    let rules = GainRules::from_json(&json)
        .with_context(|| format!("failed to parse gain rules from {}", path.display()))?;
    rules
        .validate()
        .with_context(|| format!("invalid gain rules in {}", path.display()))?;
    Ok(rules)
}

/// Fixed clock from an RFC 3339 timestamp, or the current time.
pub fn resolve_now(raw: Option<&str>) -> Result<DateTime<Utc>> {
    let Some(raw) = raw else {
        return Ok(Utc::now());
    };
    let parsed = DateTime::parse_from_rfc3339(raw.trim())
        .with_context(|| format!("invalid --now timestamp: {raw}"))?;
    Ok(parsed.with_timezone(&Utc))
}

/// Parse a comma-separated metric filter. `None` keeps every metric.
pub fn parse_metrics(raw: Option<&str>) -> Result<Option<Vec<Metric>>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let mut metrics = Vec::new();
    for token in split_csv(raw) {
        let metric = token
            .parse::<Metric>()
            .with_context(|| format!("unrecognized metric in --metrics: {token}"))?;
        if !metrics.contains(&metric) {
            metrics.push(metric);
        }
    }
    if metrics.is_empty() {
        bail!("--metrics was given but names no metric");
    }
    Ok(Some(metrics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hiscore_core::{Boss, Skill};

    fn temp_file(label: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "hiscore-input-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        fs::write(&path, contents).expect("write temp file");
        path
    }

    #[test]
    fn loads_snapshot_records() {
        let path = temp_file(
            "snapshots",
            r#"[{ "id": 1, "playerId": 9, "createdAt": "2023-01-01T00:00:00Z",
                  "overallExperience": 42, "overallRank": -1 }]"#,
        );
        let snapshots = load_snapshots(&path).unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].experience(Skill::Overall), Some(42));
        assert_eq!(snapshots[0].rank(Metric::OVERALL), None);
    }

    #[test]
    fn malformed_snapshots_report_the_path() {
        let path = temp_file("bad", r#"[{ "id": 1, "playerId": 1, "zulrahKills": "many" }]"#);
        let err = load_snapshots(&path).unwrap_err();
        assert!(format!("{err:#}").contains("zulrahKills"));
        assert!(format!("{err:#}").contains("failed to parse snapshots"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = std::env::temp_dir().join("hiscore-input-does-not-exist.json");
        assert!(load_players(&path).is_err());
    }

    #[test]
    fn rules_default_without_path_and_validate_with_one() {
        assert_eq!(load_rules(None).unwrap(), GainRules::default());

        let path = temp_file("rules", r#"{ "min_elapsed_hours": -5 }"#);
        let err = load_rules(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("min_elapsed_hours"));
    }

    #[test]
    fn now_parses_rfc3339() {
        let now = resolve_now(Some("2024-02-29T10:00:00+02:00")).unwrap();
        assert_eq!(now.to_rfc3339(), "2024-02-29T08:00:00+00:00");
        assert!(resolve_now(Some("yesterday")).is_err());
    }

    #[test]
    fn metric_filter_is_parsed_and_deduplicated() {
        assert_eq!(parse_metrics(None).unwrap(), None);
        let metrics = parse_metrics(Some("overall, Zulrah ,overall")).unwrap().unwrap();
        assert_eq!(metrics, vec![Metric::OVERALL, Metric::Boss(Boss::Zulrah)]);
        assert!(parse_metrics(Some("overall,sailing")).is_err());
        assert!(parse_metrics(Some(" , ")).is_err());
    }
}
