use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Serialize)]
pub struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    pub timestamp_ms: u64,
    pub level: String,
    pub event: String,
    #[serde(rename = "runId")]
    pub run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
    pub details: Value,
}

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

pub fn default_run_id(prefix: &str, seed: u32, timestamp_ms: u64) -> String {
    format!("{prefix}-{seed}-{timestamp_ms}")
}

pub fn build_log_line(
    level: &str,
    event: &str,
    run_id: &str,
    seed: Option<u32>,
    details: Value,
) -> StructuredLogLine {
    StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        seed,
        details,
    }
}

pub fn emit_log(level: &str, event: &str, run_id: &str, seed: Option<u32>, details: Value) {
    let log_line = build_log_line(level, event, run_id, seed, details);
    match serde_json::to_string(&log_line) {
        Ok(text) => eprintln!("{text}"),
        Err(error) => eprintln!("[log] failed to encode {event}: {error}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn log_line_uses_camel_case_keys() {
        let line = build_log_line("warn", "level_degraded", "gen-1-2", Some(7), json!({"n": 1}));
        let value = serde_json::to_value(&line).expect("log line should serialize");
        assert_eq!(value["runId"], "gen-1-2");
        assert_eq!(value["seed"], 7);
        assert_eq!(value["details"]["n"], 1);
        assert!(value["timestampMs"].as_u64().is_some());
    }

    #[test]
    fn seed_is_omitted_when_absent() {
        let line = build_log_line("info", "listening", "srv", None, json!({}));
        let value = serde_json::to_value(&line).expect("log line should serialize");
        assert!(value.get("seed").is_none());
    }

    #[test]
    fn default_run_id_contains_seed_and_timestamp() {
        assert_eq!(default_run_id("gen", 42, 123456789), "gen-42-123456789");
    }
}
