use serde::{Deserialize, Serialize};

/// Tagged variant over the feedback event vocabulary, replacing the
/// source's dynamic "feedback events" dictionary (spec §9 Design Notes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackEvent {
    Shown,
    Clicked,
    Accepted,
    Declined,
    Attended,
}

impl FeedbackEvent {
    /// Net-demand delta applied by the pulse engine on each recorded
    /// interaction (spec §4.3): accepted=+1.0, clicked=+0.2,
    /// declined=-0.5, other=0.
    pub fn demand_delta(self) -> f64 {
        match self {
            FeedbackEvent::Accepted => 1.0,
            FeedbackEvent::Clicked => 0.2,
            FeedbackEvent::Declined => -0.5,
            FeedbackEvent::Shown | FeedbackEvent::Attended => 0.0,
        }
    }

    /// Whether this event bumps `shown_window` (spec §4.7).
    pub fn counts_toward_shown_window(self) -> bool {
        matches!(
            self,
            FeedbackEvent::Shown
                | FeedbackEvent::Clicked
                | FeedbackEvent::Accepted
                | FeedbackEvent::Declined
        )
    }

    /// Whether this event drives the decayed demand accumulator at all
    /// (spec §4.7: "apply decayed-demand update for events in
    /// {accepted, declined, clicked}").
    pub fn drives_demand(self) -> bool {
        matches!(
            self,
            FeedbackEvent::Accepted | FeedbackEvent::Declined | FeedbackEvent::Clicked
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Interaction {
    pub user_id: String,
    pub opp_id: String,
    pub event: FeedbackEvent,
    pub ts_ms: u64,
}
