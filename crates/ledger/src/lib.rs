//! Usage ledger — durably records a resolved discount outcome.
//!
//! The underlying store offers single-document atomic writes only, so the
//! commit is an ordered saga: forward actions paired with compensations,
//! unwound in reverse on first failure.

pub mod ledger;
pub mod saga;

pub use ledger::{CommitError, CommitResult, UsageLedger};
