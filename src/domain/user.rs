use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupSize {
    Small,
    Medium,
    Large,
}

impl GroupSize {
    /// small=0.0, medium=0.5, large=1.0 (spec §4.1 group encoding).
    pub fn as_num(self) -> f64 {
        match self {
            GroupSize::Small => 0.0,
            GroupSize::Medium => 0.5,
            GroupSize::Large => 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    Med,
    High,
}

impl Intensity {
    /// low=0.0, med=0.5, high=1.0 (spec §4.1 intensity encoding).
    pub fn as_num(self) -> f64 {
        match self {
            Intensity::Low => 0.0,
            Intensity::Med => 0.5,
            Intensity::High => 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Friends,
    Active,
    Volunteer,
    Learn,
}

impl Goal {
    /// Substring hint vocabulary used by `goal_match` (spec §4.2).
    pub fn hints(self) -> &'static [&'static str] {
        match self {
            Goal::Friends => &["social", "community", "hangout", "meetup"],
            Goal::Active => &["fitness", "sports", "outdoor", "active"],
            Goal::Volunteer => &["volunteer", "service", "community"],
            Goal::Learn => &["learn", "education", "workshop", "class", "training"],
        }
    }
}

/// Cohort tags recognized as "newcomer" by the scorer's newcomer boost
/// (spec §4.4 step 5). Matching is case-insensitive against the user's
/// free-form cohort string.
pub const NEWCOMER_COHORT_ALIASES: &[&str] = &["newcomer", "first_time", "first-time", "new"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default, alias = "interest_tags")]
    pub interests: BTreeSet<String>,
    pub lat: f64,
    pub lng: f64,
    pub max_travel_mins: i64,
    #[serde(default)]
    pub availability: BTreeSet<String>,
    pub group_pref: GroupSize,
    pub intensity_pref: Intensity,
    #[serde(default)]
    pub goal: Option<Goal>,
    #[serde(default)]
    pub cohort: Option<String>,
}

impl User {
    /// Case-insensitive, lowercased view of the interest tags, per §4.1
    /// ("Jaccard similarity of case-insensitive tag sets").
    pub fn interests_lower(&self) -> BTreeSet<String> {
        self.interests.iter().map(|t| t.to_lowercase()).collect()
    }

    pub fn is_newcomer_cohort(&self) -> bool {
        match &self.cohort {
            Some(c) => {
                let lower = c.to_lowercase();
                NEWCOMER_COHORT_ALIASES.contains(&lower.as_str())
            }
            None => false,
        }
    }
}
