use serde::{Deserialize, Serialize};

use super::user::{GroupSize, Intensity};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: String,
    pub time_bucket: String,
    /// Optional absolute event time; not interpreted by the core engine
    /// (no real-time latency bound is promised — spec §1 Non-goals),
    /// carried through only for display.
    #[serde(default)]
    pub starts_at: Option<chrono::DateTime<chrono::Utc>>,
    pub lat: f64,
    pub lng: f64,
    pub capacity: u32,
    pub group_size: GroupSize,
    pub intensity: Intensity,
    #[serde(default = "default_true")]
    pub beginner_friendly: bool,
}

fn default_true() -> bool {
    true
}

impl Opportunity {
    /// Lowercased `category + tags` haystack used by `goal_match` (§4.2).
    pub fn goal_haystack(&self) -> String {
        let mut s = self.category.to_lowercase();
        for t in &self.tags {
            s.push(' ');
            s.push_str(&t.to_lowercase());
        }
        s
    }
}
