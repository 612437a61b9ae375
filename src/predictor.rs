//! Calibrated logistic predictor over a fixed feature order.
//!
//! Grounded on `original_source/.../ml/rsvp_model.py`: weights+bias load
//! from a JSON artifact at startup; a missing or malformed file degrades
//! to a zero-weight model (`sigmoid(0) == 0.5`) rather than failing the
//! serving path, per spec §7 `IOFailure`.

use std::path::Path;

use serde::Deserialize;

/// Fixed feature ordering, spec §4.2.
pub const FEATURE_ORDER: [&str; 8] = [
    "interest",
    "goal_match",
    "group_match",
    "travel_penalty",
    "intensity_mismatch",
    "novelty_bonus",
    "pulse_centered",
    "availability_ok",
];

#[derive(Debug, Deserialize)]
struct ModelArtifact {
    feature_order: Vec<String>,
    weights: Vec<f64>,
    bias: f64,
}

#[derive(Clone, Debug)]
pub struct Predictor {
    weights: [f64; 8],
    bias: f64,
}

impl Default for Predictor {
    fn default() -> Self {
        Self {
            weights: [0.0; 8],
            bias: 0.0,
        }
    }
}

impl Predictor {
    /// Loads weights from `path`. Any failure (missing file, bad JSON,
    /// or a `feature_order` that doesn't match `FEATURE_ORDER`) degrades
    /// softly to the zero-weight default and is logged, never returned
    /// as an error — this predictor never fails the request path.
    pub fn load(path: &str) -> Self {
        let p = Path::new(path);
        if !p.exists() {
            tracing::debug!(path, "rsvp model artifact not found; using zero-weight default");
            return Self::default();
        }
        match std::fs::read_to_string(p).and_then(|raw| {
            serde_json::from_str::<ModelArtifact>(&raw)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        }) {
            Ok(artifact) => {
                if artifact.feature_order != FEATURE_ORDER {
                    tracing::warn!(
                        path,
                        "rsvp model feature_order mismatch; using zero-weight default"
                    );
                    return Self::default();
                }
                if artifact.weights.len() != FEATURE_ORDER.len() {
                    tracing::warn!(path, "rsvp model weights length mismatch; using zero-weight default");
                    return Self::default();
                }
                let mut weights = [0.0; 8];
                weights.copy_from_slice(&artifact.weights);
                tracing::info!(path, "loaded rsvp model artifact");
                Self {
                    weights,
                    bias: artifact.bias,
                }
            }
            Err(err) => {
                tracing::warn!(path, error = %err, "failed to read rsvp model artifact; using zero-weight default");
                Self::default()
            }
        }
    }

    /// `predict(x) = sigma(b + sum w_i * x_i)` over `FEATURE_ORDER`.
    pub fn predict(&self, features: &std::collections::BTreeMap<&'static str, f64>) -> f64 {
        let mut z = self.bias;
        for (idx, name) in FEATURE_ORDER.iter().enumerate() {
            z += self.weights[idx] * features.get(name).copied().unwrap_or(0.0);
        }
        sigmoid(z)
    }
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
