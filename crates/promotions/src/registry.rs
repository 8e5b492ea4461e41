//! Promotion registry — answers "which promotions are structurally active
//! at time T". Status and date-range filtering only; no business
//! eligibility logic.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use salon_core::promotion::{Promotion, PromotionStatus};
use salon_store::DocumentStore;

/// Read-facing view over the promotion documents in the shared store.
pub struct PromotionRegistry {
    store: Arc<DocumentStore>,
}

impl PromotionRegistry {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Register or replace a promotion. Used by seeding, tests, and the
    /// administrative edit flow; the engine itself never writes here.
    pub fn register(&self, promotion: Promotion) {
        info!(promotion_id = %promotion.id, name = %promotion.name, "Promotion registered");
        self.store.upsert_promotion(promotion);
    }

    pub fn get(&self, id: Uuid) -> Option<Promotion> {
        self.store.promotion(id)
    }

    pub fn list(&self) -> Vec<Promotion> {
        self.store.list_promotions()
    }

    /// Promotions structurally active at `at`: status `active`, or
    /// `scheduled` with `valid_from <= at`, and `valid_until` unset or
    /// `>= at`. Sorted by id for determinism. Absent data yields an empty
    /// list, never an error.
    pub fn active_candidates(&self, at: DateTime<Utc>) -> Vec<Promotion> {
        let candidates: Vec<Promotion> = self
            .store
            .list_promotions()
            .into_iter()
            .filter(|p| Self::structurally_active(p, at))
            .collect();
        debug!(count = candidates.len(), %at, "Active promotion candidates");
        candidates
    }

    /// Case-insensitive code lookup among code-based promotions. Lowest id
    /// wins if two active promotions ever share a code.
    pub fn by_code(&self, code: &str) -> Option<Promotion> {
        self.store
            .list_promotions()
            .into_iter()
            .filter(|p| p.application_method.is_code_based())
            .find(|p| {
                p.promo_code
                    .as_deref()
                    .map(|c| c.eq_ignore_ascii_case(code))
                    .unwrap_or(false)
            })
    }

    fn structurally_active(promotion: &Promotion, at: DateTime<Utc>) -> bool {
        let status_ok = match promotion.status {
            PromotionStatus::Active => true,
            PromotionStatus::Scheduled => {
                promotion.valid_from.map(|from| from <= at).unwrap_or(false)
            }
            _ => false,
        };
        status_ok && promotion.valid_until.map(|until| until >= at).unwrap_or(true)
    }
}
