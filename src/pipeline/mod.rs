//! Long-running loops.
//!
//! - `PollLoop`: scrape search pages, announce new listings
//! - `ActionListener`: answer "contact seller" presses
//! - `RetryPolicy`: fixed pause after a failure

pub mod listen;
pub mod poll;
pub mod retry;

pub use listen::{ActionListener, UpdateFeed};
pub use poll::{CycleReport, PollLoop};
pub use retry::RetryPolicy;
