pub mod interaction;
pub mod opportunity;
pub mod user;

pub use interaction::{FeedbackEvent, Interaction};
pub use opportunity::Opportunity;
pub use user::{Goal, GroupSize, Intensity, User};
