//! Fixture loading: `{"users": [...], "opps": [...]}` payloads, with the
//! source's alternate key names accepted too (spec §6).
//!
//! Unlike the predictor's model artifact, a bad fixture *is* surfaced
//! to the caller — seeding is an explicit, caller-initiated operation,
//! not a background load with a safe default to fall back to.

use serde::Deserialize;

use crate::domain::{Opportunity, User};
use crate::error::{EngineError, Result};

#[derive(Deserialize)]
struct FixturePayload {
    #[serde(default, alias = "user")]
    users: Vec<User>,
    #[serde(default, alias = "opportunities")]
    opps: Vec<Opportunity>,
}

pub fn load_fixture(path: &str) -> Result<(Vec<User>, Vec<Opportunity>)> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| EngineError::IoFailure(format!("reading fixture {path}: {e}")))?;
    let payload: FixturePayload = serde_json::from_str(&raw)
        .map_err(|e| EngineError::IoFailure(format!("parsing fixture {path}: {e}")))?;
    Ok((payload.users, payload.opps))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, contents: &str) -> String {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, contents).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn loads_users_and_opps_from_canonical_keys() {
        let path = write_temp(
            "fitpulse_fixture_canonical.json",
            r#"{"users":[{"id":"u0","lat":0,"lng":0,"max_travel_mins":30,"group_pref":"small","intensity_pref":"med"}],
                "opps":[{"id":"o0","time_bucket":"weeknights","lat":0,"lng":0,"capacity":5,"group_size":"small","intensity":"med"}]}"#,
        );

        let (users, opps) = load_fixture(&path).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(opps.len(), 1);
    }

    #[test]
    fn accepts_alternate_singular_key_names() {
        let path = write_temp(
            "fitpulse_fixture_alternate.json",
            r#"{"user":[{"id":"u0","lat":0,"lng":0,"max_travel_mins":30,"group_pref":"small","intensity_pref":"med"}],
                "opportunities":[{"id":"o0","time_bucket":"weeknights","lat":0,"lng":0,"capacity":5,"group_size":"small","intensity":"med"}]}"#,
        );

        let (users, opps) = load_fixture(&path).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(opps.len(), 1);
    }

    #[test]
    fn missing_file_is_a_surfaced_error() {
        let result = load_fixture("/nonexistent/fixture.json");
        assert!(matches!(result, Err(EngineError::IoFailure(_))));
    }
}
