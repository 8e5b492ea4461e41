//! In-memory document store backed by DashMap.
//!
//! Production: replace with the platform's document DB (single-document
//! atomic writes, no multi-document transactions). This provides the same
//! API surface for development and testing: every operation touches exactly
//! one document, and counter increments are optimistic compare-and-swap
//! against a per-document version.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use salon_core::booking::{AppointmentRecord, DiscountOutcome};
use salon_core::promotion::Promotion;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("version conflict on {0}")]
    VersionConflict(String),

    #[error("global usage cap reached")]
    GlobalCapReached,

    #[error("per-customer usage cap reached")]
    PerCustomerCapReached,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Conflicts and cap refusals are expected under contention and resolve
    /// by retrying or re-evaluating; anything else is a hard failure.
    pub fn is_contention(&self) -> bool {
        matches!(
            self,
            StoreError::VersionConflict(_)
                | StoreError::GlobalCapReached
                | StoreError::PerCustomerCapReached
        )
    }
}

/// The single-document operations the usage ledger commits through.
pub trait CommitStore: Send + Sync {
    fn appointment(&self, id: Uuid) -> Option<AppointmentRecord>;

    /// Write the discount outcome onto the appointment document.
    fn write_outcome(&self, id: Uuid, outcome: &DiscountOutcome) -> Result<(), StoreError>;

    /// Compensation for `write_outcome`: restore pre-discount pricing.
    fn restore_pricing(&self, id: Uuid) -> Result<(), StoreError>;

    /// One optimistic attempt to increment a promotion's usage counters,
    /// re-validating both caps against the freshly read document.
    fn try_increment_usage(
        &self,
        promotion_id: Uuid,
        customer_id: Uuid,
        amount_cents: i64,
    ) -> Result<(), StoreError>;

    /// Compensation for `try_increment_usage`.
    fn decrement_usage(
        &self,
        promotion_id: Uuid,
        customer_id: Uuid,
        amount_cents: i64,
    ) -> Result<(), StoreError>;
}

/// One counter mutation, kept so operators can reconcile a reported
/// partial commit failure against what actually landed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageJournalEntry {
    pub promotion_id: Uuid,
    pub customer_id: Uuid,
    /// +1 for an increment, -1 for a compensating decrement.
    pub delta: i32,
    pub amount_cents: i64,
    pub at: DateTime<Utc>,
}

struct Versioned<T> {
    doc: T,
    version: u64,
}

/// Thread-safe in-memory store for promotion and appointment documents.
pub struct DocumentStore {
    promotions: DashMap<Uuid, Versioned<Promotion>>,
    appointments: DashMap<Uuid, Versioned<AppointmentRecord>>,
    journal: Mutex<Vec<UsageJournalEntry>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        info!("Document store initialized (in-memory, development mode)");
        Self {
            promotions: DashMap::new(),
            appointments: DashMap::new(),
            journal: Mutex::new(Vec::new()),
        }
    }

    // ─── Promotions ────────────────────────────────────────────────────────

    pub fn upsert_promotion(&self, promotion: Promotion) {
        let id = promotion.id;
        match self.promotions.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(mut entry) => {
                let versioned = entry.get_mut();
                versioned.doc = promotion;
                versioned.version += 1;
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(Versioned {
                    doc: promotion,
                    version: 1,
                });
            }
        }
        debug!(promotion_id = %id, "Promotion upserted");
    }

    pub fn promotion(&self, id: Uuid) -> Option<Promotion> {
        self.promotions.get(&id).map(|p| p.doc.clone())
    }

    pub fn list_promotions(&self) -> Vec<Promotion> {
        let mut promotions: Vec<Promotion> =
            self.promotions.iter().map(|p| p.doc.clone()).collect();
        promotions.sort_by_key(|p| p.id);
        promotions
    }

    pub fn remove_promotion(&self, id: Uuid) -> bool {
        self.promotions.remove(&id).is_some()
    }

    // ─── Appointments ──────────────────────────────────────────────────────

    pub fn upsert_appointment(&self, record: AppointmentRecord) {
        let id = record.id;
        match self.appointments.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(mut entry) => {
                let versioned = entry.get_mut();
                versioned.doc = record;
                versioned.version += 1;
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(Versioned {
                    doc: record,
                    version: 1,
                });
            }
        }
    }

    // ─── Journal ───────────────────────────────────────────────────────────

    pub fn usage_journal(&self) -> Vec<UsageJournalEntry> {
        self.journal.lock().clone()
    }

    fn record_usage(&self, promotion_id: Uuid, customer_id: Uuid, delta: i32, amount_cents: i64) {
        self.journal.lock().push(UsageJournalEntry {
            promotion_id,
            customer_id,
            delta,
            amount_cents,
            at: Utc::now(),
        });
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CommitStore for DocumentStore {
    fn appointment(&self, id: Uuid) -> Option<AppointmentRecord> {
        self.appointments.get(&id).map(|a| a.doc.clone())
    }

    fn write_outcome(&self, id: Uuid, outcome: &DiscountOutcome) -> Result<(), StoreError> {
        let mut entry = self
            .appointments
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("appointment {id}")))?;
        let versioned = entry.value_mut();
        versioned.doc.outcome = Some(outcome.clone());
        versioned.doc.total_cents = outcome.final_total_cents;
        versioned.doc.updated_at = Utc::now();
        versioned.version += 1;
        debug!(appointment_id = %id, final_total = outcome.final_total_cents, "Outcome written");
        Ok(())
    }

    fn restore_pricing(&self, id: Uuid) -> Result<(), StoreError> {
        let mut entry = self
            .appointments
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("appointment {id}")))?;
        let versioned = entry.value_mut();
        versioned.doc.outcome = None;
        versioned.doc.total_cents = versioned.doc.subtotal_cents;
        versioned.doc.updated_at = Utc::now();
        versioned.version += 1;
        warn!(appointment_id = %id, "Appointment pricing restored to pre-discount state");
        Ok(())
    }

    fn try_increment_usage(
        &self,
        promotion_id: Uuid,
        customer_id: Uuid,
        amount_cents: i64,
    ) -> Result<(), StoreError> {
        // Snapshot read: version plus everything the cap re-validation needs.
        let (version, used_count, customer_count, max_uses, max_uses_per_customer) = {
            let entry = self
                .promotions
                .get(&promotion_id)
                .ok_or_else(|| StoreError::NotFound(format!("promotion {promotion_id}")))?;
            (
                entry.version,
                entry.doc.used_count,
                entry.doc.customer_usage.get(&customer_id).copied().unwrap_or(0),
                entry.doc.max_uses,
                entry.doc.max_uses_per_customer,
            )
        };

        if let Some(cap) = max_uses {
            if used_count >= cap {
                return Err(StoreError::GlobalCapReached);
            }
        }
        if let Some(cap) = max_uses_per_customer {
            if customer_count >= cap {
                return Err(StoreError::PerCustomerCapReached);
            }
        }

        // Conditional write: fails if another booking won the race.
        let mut entry = self
            .promotions
            .get_mut(&promotion_id)
            .ok_or_else(|| StoreError::NotFound(format!("promotion {promotion_id}")))?;
        let versioned = entry.value_mut();
        if versioned.version != version {
            return Err(StoreError::VersionConflict(format!(
                "promotion {promotion_id}"
            )));
        }
        versioned.doc.used_count += 1;
        *versioned.doc.customer_usage.entry(customer_id).or_insert(0) += 1;
        versioned.doc.total_discount_given_cents += amount_cents;
        versioned.doc.updated_at = Utc::now();
        versioned.version += 1;
        drop(entry);

        self.record_usage(promotion_id, customer_id, 1, amount_cents);
        Ok(())
    }

    fn decrement_usage(
        &self,
        promotion_id: Uuid,
        customer_id: Uuid,
        amount_cents: i64,
    ) -> Result<(), StoreError> {
        let mut entry = self
            .promotions
            .get_mut(&promotion_id)
            .ok_or_else(|| StoreError::NotFound(format!("promotion {promotion_id}")))?;
        let versioned = entry.value_mut();
        versioned.doc.used_count = versioned.doc.used_count.saturating_sub(1);
        if let Some(count) = versioned.doc.customer_usage.get_mut(&customer_id) {
            *count = count.saturating_sub(1);
        }
        versioned.doc.total_discount_given_cents -= amount_cents;
        versioned.doc.updated_at = Utc::now();
        versioned.version += 1;
        drop(entry);

        self.record_usage(promotion_id, customer_id, -1, amount_cents);
        Ok(())
    }
}
