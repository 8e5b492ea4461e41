//! Commit protocol for discount outcomes.
//!
//! Phase 1 writes the outcome onto the appointment; phase 2 increments the
//! usage counters of every applied promotion. The store re-validates both
//! usage caps inside each increment, so the eligibility check is not
//! trusted from evaluation time. Version conflicts are retried up to a
//! configured bound; anything that fails after phase 1 is compensated in
//! reverse and surfaced, never silently dropped.

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use salon_core::booking::DiscountOutcome;
use salon_core::config::PromotionsConfig;
use salon_store::{CommitStore, StoreError};

use crate::saga::{self, SagaStep};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitResult {
    Committed,
    /// The appointment already carries a committed outcome; nothing was
    /// touched. Makes retrying a commit safe.
    AlreadyCommitted,
}

#[derive(Error, Debug)]
pub enum CommitError {
    #[error("appointment {0} not found")]
    AppointmentMissing(Uuid),

    /// A counter write raced or a cap filled up between evaluation and
    /// commit. Fully compensated; the caller should re-run evaluation
    /// against fresh counters.
    #[error("commit conflict on promotion {promotion_id}: {reason}")]
    Conflict { promotion_id: Uuid, reason: String },

    /// The commit failed partway and could not be classified as a clean
    /// conflict. `compensated` reports whether the unwind fully restored
    /// the pre-commit state; if false, operator reconciliation is needed.
    #[error(
        "partial commit failure on step {step_label} (compensated: {compensated}): {detail}"
    )]
    PartialFailure {
        promotion_id: Option<Uuid>,
        step_label: String,
        compensated: bool,
        detail: String,
    },
}

/// Commits discount outcomes. The only component that mutates shared state.
pub struct UsageLedger {
    max_attempts: u32,
}

impl UsageLedger {
    pub fn new(config: &PromotionsConfig) -> Self {
        Self {
            max_attempts: config.commit_max_attempts.max(1),
        }
    }

    /// Persist `outcome` for the appointment and count one use of every
    /// applied promotion for the appointment's customer.
    pub fn commit(
        &self,
        store: &dyn CommitStore,
        appointment_id: Uuid,
        outcome: &DiscountOutcome,
    ) -> Result<CommitResult, CommitError> {
        let record = store
            .appointment(appointment_id)
            .ok_or(CommitError::AppointmentMissing(appointment_id))?;

        // Idempotency: an applied_at marker on the stored outcome means a
        // prior commit already counted these promotions.
        if record.outcome.is_some() {
            info!(
                appointment_id = %appointment_id,
                "Outcome already committed; skipping"
            );
            return Ok(CommitResult::AlreadyCommitted);
        }
        let customer_id = record.customer_id;

        let mut steps = Vec::with_capacity(outcome.applied.len() + 1);
        steps.push(SagaStep::new(
            "write-outcome",
            move || store.write_outcome(appointment_id, outcome),
            move || store.restore_pricing(appointment_id),
        ));
        for applied in &outcome.applied {
            let promotion_id = applied.promotion_id;
            let amount_cents = applied.amount_cents;
            let max_attempts = self.max_attempts;
            steps.push(SagaStep::new(
                format!("increment-usage:{promotion_id}"),
                move || {
                    increment_with_retry(store, promotion_id, customer_id, amount_cents, max_attempts)
                },
                move || store.decrement_usage(promotion_id, customer_id, amount_cents),
            ));
        }

        let run = saga::run(steps);
        let compensated = run.fully_compensated();
        let Some(failure) = run.failure else {
            metrics::counter!("ledger.commits").increment(1);
            info!(
                appointment_id = %appointment_id,
                promotions = outcome.applied.len(),
                discount_cents = outcome.total_discount_cents(),
                "Discount outcome committed"
            );
            return Ok(CommitResult::Committed);
        };

        metrics::counter!("ledger.rollbacks").increment(1);
        // Step 0 is the outcome write; counter steps map back to the
        // promotion they were incrementing.
        let promotion_id = failure
            .step
            .checked_sub(1)
            .map(|i| outcome.applied[i].promotion_id);

        if compensated && failure.error.is_contention() {
            if let Some(promotion_id) = promotion_id {
                metrics::counter!("ledger.conflicts").increment(1);
                warn!(
                    appointment_id = %appointment_id,
                    promotion_id = %promotion_id,
                    error = %failure.error,
                    "Commit conflict; caller should re-evaluate"
                );
                return Err(CommitError::Conflict {
                    promotion_id,
                    reason: failure.error.to_string(),
                });
            }
        }

        metrics::counter!("ledger.partial_failures").increment(1);
        let mut detail = failure.error.to_string();
        for comp in &run.compensation_failures {
            detail.push_str(&format!("; compensation {} failed: {}", comp.label, comp.error));
        }
        Err(CommitError::PartialFailure {
            promotion_id,
            step_label: failure.label,
            compensated,
            detail,
        })
    }
}

fn increment_with_retry(
    store: &dyn CommitStore,
    promotion_id: Uuid,
    customer_id: Uuid,
    amount_cents: i64,
    max_attempts: u32,
) -> Result<(), StoreError> {
    let mut last = None;
    for attempt in 1..=max_attempts {
        match store.try_increment_usage(promotion_id, customer_id, amount_cents) {
            Ok(()) => return Ok(()),
            Err(error @ StoreError::VersionConflict(_)) => {
                warn!(
                    promotion_id = %promotion_id,
                    attempt,
                    "Usage increment raced; retrying"
                );
                last = Some(error);
            }
            Err(error) => return Err(error),
        }
    }
    Err(last.unwrap_or_else(|| StoreError::VersionConflict(format!("promotion {promotion_id}"))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use parking_lot::Mutex;
    use salon_core::booking::{
        AppliedDiscount, AppointmentRecord, DraftAppointment, LineItem,
    };
    use salon_core::promotion::Promotion;
    use salon_store::DocumentStore;

    fn ledger() -> UsageLedger {
        UsageLedger::new(&PromotionsConfig::default())
    }

    fn promo() -> Promotion {
        Promotion {
            discount_value: 10.0,
            ..Default::default()
        }
    }

    fn seeded_appointment(store: &DocumentStore, customer_id: Uuid) -> Uuid {
        let draft = DraftAppointment::from_items(
            customer_id,
            vec![LineItem {
                service_id: "gel-manicure".into(),
                price_cents: 5000,
                category: "nails".into(),
            }],
            Utc::now(),
            None,
        );
        let id = Uuid::new_v4();
        store.upsert_appointment(AppointmentRecord::from_draft(id, &draft));
        id
    }

    fn outcome_for(promotion_ids: &[Uuid]) -> DiscountOutcome {
        let applied: Vec<AppliedDiscount> = promotion_ids
            .iter()
            .map(|&promotion_id| AppliedDiscount {
                promotion_id,
                amount_cents: 500,
                targeted_service_ids: vec!["gel-manicure".into()],
            })
            .collect();
        let total: i64 = applied.iter().map(|a| a.amount_cents).sum();
        DiscountOutcome {
            applied,
            final_total_cents: 5000 - total,
            applied_at: Utc::now(),
        }
    }

    #[test]
    fn commit_writes_outcome_and_counters() {
        let store = DocumentStore::new();
        let customer_id = Uuid::new_v4();
        let promo = promo();
        let promo_id = promo.id;
        store.upsert_promotion(promo);
        let appointment_id = seeded_appointment(&store, customer_id);

        let result = ledger()
            .commit(&store, appointment_id, &outcome_for(&[promo_id]))
            .unwrap();
        assert_eq!(result, CommitResult::Committed);

        let record = CommitStore::appointment(&store, appointment_id).unwrap();
        assert_eq!(record.total_cents, 4500);
        assert!(record.outcome.is_some());

        let stored = store.promotion(promo_id).unwrap();
        assert_eq!(stored.used_count, 1);
        assert_eq!(stored.customer_usage.get(&customer_id), Some(&1));
        assert_eq!(stored.total_discount_given_cents, 500);
    }

    #[test]
    fn second_commit_is_a_noop() {
        let store = DocumentStore::new();
        let customer_id = Uuid::new_v4();
        let promo = promo();
        let promo_id = promo.id;
        store.upsert_promotion(promo);
        let appointment_id = seeded_appointment(&store, customer_id);
        let outcome = outcome_for(&[promo_id]);

        ledger().commit(&store, appointment_id, &outcome).unwrap();
        let result = ledger().commit(&store, appointment_id, &outcome).unwrap();
        assert_eq!(result, CommitResult::AlreadyCommitted);

        let stored = store.promotion(promo_id).unwrap();
        assert_eq!(stored.used_count, 1);
        assert_eq!(store.usage_journal().len(), 1);
    }

    #[test]
    fn cap_filled_between_evaluation_and_commit_is_a_conflict() {
        let store = DocumentStore::new();
        let customer_id = Uuid::new_v4();
        let mut promo = promo();
        promo.max_uses = Some(1);
        promo.used_count = 1; // another booking won the race
        let promo_id = promo.id;
        store.upsert_promotion(promo);
        let appointment_id = seeded_appointment(&store, customer_id);

        let err = ledger()
            .commit(&store, appointment_id, &outcome_for(&[promo_id]))
            .unwrap_err();
        assert!(matches!(
            err,
            CommitError::Conflict { promotion_id, .. } if promotion_id == promo_id
        ));

        // Phase 1 was compensated.
        let record = CommitStore::appointment(&store, appointment_id).unwrap();
        assert!(record.outcome.is_none());
        assert_eq!(record.total_cents, 5000);
    }

    #[test]
    fn missing_appointment_is_reported() {
        let store = DocumentStore::new();
        let err = ledger()
            .commit(&store, Uuid::new_v4(), &outcome_for(&[Uuid::new_v4()]))
            .unwrap_err();
        assert!(matches!(err, CommitError::AppointmentMissing(_)));
    }

    // ─── Fault injection ───────────────────────────────────────────────────

    /// Wraps a DocumentStore and injects failures for specific operations.
    struct FlakyStore {
        inner: DocumentStore,
        fail_increment_for: Option<Uuid>,
        fail_restore: bool,
        conflicts_before_success: Mutex<u32>,
    }

    impl FlakyStore {
        fn new(inner: DocumentStore) -> Self {
            Self {
                inner,
                fail_increment_for: None,
                fail_restore: false,
                conflicts_before_success: Mutex::new(0),
            }
        }
    }

    impl CommitStore for FlakyStore {
        fn appointment(&self, id: Uuid) -> Option<AppointmentRecord> {
            self.inner.appointment(id)
        }

        fn write_outcome(&self, id: Uuid, outcome: &DiscountOutcome) -> Result<(), StoreError> {
            self.inner.write_outcome(id, outcome)
        }

        fn restore_pricing(&self, id: Uuid) -> Result<(), StoreError> {
            if self.fail_restore {
                return Err(StoreError::Unavailable("restore failed".into()));
            }
            self.inner.restore_pricing(id)
        }

        fn try_increment_usage(
            &self,
            promotion_id: Uuid,
            customer_id: Uuid,
            amount_cents: i64,
        ) -> Result<(), StoreError> {
            if self.fail_increment_for == Some(promotion_id) {
                return Err(StoreError::Unavailable("document write failed".into()));
            }
            let mut conflicts = self.conflicts_before_success.lock();
            if *conflicts > 0 {
                *conflicts -= 1;
                return Err(StoreError::VersionConflict(format!(
                    "promotion {promotion_id}"
                )));
            }
            drop(conflicts);
            self.inner
                .try_increment_usage(promotion_id, customer_id, amount_cents)
        }

        fn decrement_usage(
            &self,
            promotion_id: Uuid,
            customer_id: Uuid,
            amount_cents: i64,
        ) -> Result<(), StoreError> {
            self.inner
                .decrement_usage(promotion_id, customer_id, amount_cents)
        }
    }

    #[test]
    fn counter_failure_rolls_back_outcome_and_names_promotion() {
        let inner = DocumentStore::new();
        let customer_id = Uuid::new_v4();
        let good = promo();
        let bad = promo();
        let good_id = good.id;
        let bad_id = bad.id;
        inner.upsert_promotion(good);
        inner.upsert_promotion(bad);
        let appointment_id = seeded_appointment(&inner, customer_id);

        let mut store = FlakyStore::new(inner);
        store.fail_increment_for = Some(bad_id);

        let err = ledger()
            .commit(&store, appointment_id, &outcome_for(&[good_id, bad_id]))
            .unwrap_err();
        match err {
            CommitError::PartialFailure {
                promotion_id,
                compensated,
                ..
            } => {
                assert_eq!(promotion_id, Some(bad_id));
                assert!(compensated);
            }
            other => panic!("expected partial failure, got {other:?}"),
        }

        // Appointment restored to pre-discount state.
        let record = store.appointment(appointment_id).unwrap();
        assert!(record.outcome.is_none());
        assert_eq!(record.total_cents, 5000);

        // The successful increment was compensated.
        let stored = store.inner.promotion(good_id).unwrap();
        assert_eq!(stored.used_count, 0);
        assert_eq!(stored.total_discount_given_cents, 0);
    }

    #[test]
    fn failed_compensation_is_reported_unreconciled() {
        let inner = DocumentStore::new();
        let customer_id = Uuid::new_v4();
        let bad = promo();
        let bad_id = bad.id;
        inner.upsert_promotion(bad);
        let appointment_id = seeded_appointment(&inner, customer_id);

        let mut store = FlakyStore::new(inner);
        store.fail_increment_for = Some(bad_id);
        store.fail_restore = true;

        let err = ledger()
            .commit(&store, appointment_id, &outcome_for(&[bad_id]))
            .unwrap_err();
        match err {
            CommitError::PartialFailure { compensated, .. } => assert!(!compensated),
            other => panic!("expected partial failure, got {other:?}"),
        }
    }

    #[test]
    fn version_conflicts_are_retried_within_bound() {
        let inner = DocumentStore::new();
        let customer_id = Uuid::new_v4();
        let promo = promo();
        let promo_id = promo.id;
        inner.upsert_promotion(promo);
        let appointment_id = seeded_appointment(&inner, customer_id);

        let store = FlakyStore {
            inner,
            fail_increment_for: None,
            fail_restore: false,
            conflicts_before_success: Mutex::new(2),
        };

        let result = ledger()
            .commit(&store, appointment_id, &outcome_for(&[promo_id]))
            .unwrap();
        assert_eq!(result, CommitResult::Committed);
        assert_eq!(store.inner.promotion(promo_id).unwrap().used_count, 1);
    }

    #[test]
    fn exhausted_retries_surface_as_conflict() {
        let inner = DocumentStore::new();
        let customer_id = Uuid::new_v4();
        let promo = promo();
        let promo_id = promo.id;
        inner.upsert_promotion(promo);
        let appointment_id = seeded_appointment(&inner, customer_id);

        let store = FlakyStore {
            inner,
            fail_increment_for: None,
            fail_restore: false,
            conflicts_before_success: Mutex::new(10),
        };

        let err = ledger()
            .commit(&store, appointment_id, &outcome_for(&[promo_id]))
            .unwrap_err();
        assert!(matches!(err, CommitError::Conflict { .. }));

        let record = store.appointment(appointment_id).unwrap();
        assert!(record.outcome.is_none());
    }
}
