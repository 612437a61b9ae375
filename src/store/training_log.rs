//! Best-effort JSON Lines training logs.
//!
//! Grounded on `original_source/.../ml/rsvp_model.py`'s impression/RSVP
//! logging: failures here are logged and swallowed, never surfaced as
//! `EngineError` (spec §4.7 — these logs feed an out-of-process
//! training script, not the serving path).

use std::fs::OpenOptions;
use std::io::Write;

use serde::Serialize;

fn append_line(path: &str, line: &str) {
    let result = (|| -> std::io::Result<()> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{line}")
    })();

    if let Err(err) = result {
        tracing::warn!(path, error = %err, "failed to append training log line");
    }
}

#[derive(Serialize)]
struct ImpressionLine<'a> {
    user_id: &'a str,
    opp_id: &'a str,
    features: &'a std::collections::BTreeMap<&'static str, f64>,
    ts_iso: String,
}

pub fn log_impression(
    path: &str,
    user_id: &str,
    opp_id: &str,
    features: &std::collections::BTreeMap<&'static str, f64>,
) {
    let line = ImpressionLine {
        user_id,
        opp_id,
        features,
        ts_iso: crate::time::now_iso(),
    };
    match serde_json::to_string(&line) {
        Ok(json) => append_line(path, &json),
        Err(err) => tracing::warn!(error = %err, "failed to serialize impression log line"),
    }
}

#[derive(Serialize)]
struct RsvpLine<'a> {
    user_id: &'a str,
    opp_id: &'a str,
    event: &'a str,
    ts_iso: String,
}

pub fn log_rsvp(path: &str, user_id: &str, opp_id: &str, event: &str) {
    let line = RsvpLine {
        user_id,
        opp_id,
        event,
        ts_iso: crate::time::now_iso(),
    };
    match serde_json::to_string(&line) {
        Ok(json) => append_line(path, &json),
        Err(err) => tracing::warn!(error = %err, "failed to serialize rsvp log line"),
    }
}
