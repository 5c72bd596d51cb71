//! State kept between poll cycles.
//!
//! - `LinkStore`: normalized links already announced, backed by a text file
//! - `PendingActions`: in-memory map consulted when a contact action fires

pub mod links;
pub mod pending;

// Re-export for convenience
pub use links::LinkStore;
pub use pending::PendingActions;
