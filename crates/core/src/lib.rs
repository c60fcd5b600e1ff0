#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod leaderboard;
pub mod model;
pub mod progress;
pub mod state;
pub mod time;

pub use error::Error;
pub use state::AppState;
pub use time::{Clock, FIXED_TEST_TIMESTAMP, fixed_clock, fixed_now};
