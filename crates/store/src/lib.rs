//! Shared document store for promotions and appointments.
//!
//! Single-document atomic writes only — no multi-document transactions.
//! The usage ledger layers a compensating-write protocol on top.

pub mod store;

pub use store::{CommitStore, DocumentStore, StoreError, UsageJournalEntry};
