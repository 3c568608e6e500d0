//! Optimistic overlay for the card board.
//!
//! Pending insertions and moves are registered the moment the user acts and
//! merged over the last server snapshot until the caller clears them.
pub mod confirm;
pub mod fingerprint;
pub mod merge;
pub mod store;
pub mod temp_id;

pub use confirm::PruneSummary;
pub use merge::{merge_pending, MergeOutcome, SkipReason, SkippedEntry};
pub use store::{PendingCardInsertion, PendingCardMove, ReconciliationState, ReconciliationStore};
