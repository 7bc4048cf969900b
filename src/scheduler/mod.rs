//! Homework status polling loop.
//!
//! Fetches statuses on a fixed interval and forwards changes to the user.

mod runner;
mod state;

pub use runner::{CycleError, CycleOutcome, HomeworkPoller};
pub use state::PollState;
