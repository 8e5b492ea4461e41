//! Conflict resolution — selects the final applied set from independently
//! eligible promotions, honoring stackability, explicit mutual exclusions,
//! and priority ordering.

use std::cmp::Ordering;

use tracing::debug;

use salon_core::booking::{EligibilityResult, RejectionReason};

use crate::evaluator::EligibleCandidate;

/// The winning subset, in acceptance order, plus the candidates dropped
/// during resolution with their reasons.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub applied: Vec<EligibleCandidate>,
    pub dropped: Vec<EligibilityResult>,
}

/// Deterministic greedy resolver.
#[derive(Debug, Clone, Default)]
pub struct ConflictResolver;

impl ConflictResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, mut eligible: Vec<EligibleCandidate>) -> Resolution {
        // Priority descending, then discount value descending (tie favors
        // the customer), then id ascending as the deterministic final
        // tie-break.
        eligible.sort_by(|a, b| {
            b.promotion
                .priority
                .cmp(&a.promotion.priority)
                .then(
                    b.promotion
                        .discount_value
                        .partial_cmp(&a.promotion.discount_value)
                        .unwrap_or(Ordering::Equal),
                )
                .then(a.promotion.id.cmp(&b.promotion.id))
        });

        let mut applied: Vec<EligibleCandidate> = Vec::new();
        let mut dropped: Vec<EligibilityResult> = Vec::new();
        let mut code_accepted = false;

        for candidate in eligible {
            match Self::refusal(&candidate, &applied, code_accepted) {
                Some(reason) => {
                    debug!(
                        promotion_id = %candidate.promotion.id,
                        reason = %reason,
                        "Promotion dropped during resolution"
                    );
                    dropped.push(EligibilityResult::rejected(candidate.promotion.id, reason));
                }
                None => {
                    if candidate.promotion.application_method.is_code_based() {
                        code_accepted = true;
                    }
                    applied.push(candidate);
                }
            }
        }

        debug!(
            applied = applied.len(),
            dropped = dropped.len(),
            "Conflict resolution complete"
        );
        Resolution { applied, dropped }
    }

    fn refusal(
        candidate: &EligibleCandidate,
        accepted: &[EligibleCandidate],
        code_accepted: bool,
    ) -> Option<RejectionReason> {
        // A winning non-stackable promotion applies alone; everything after
        // it is superseded.
        if accepted.iter().any(|a| !a.promotion.stackable) {
            return Some(RejectionReason::SupersededByNonStackable);
        }
        // A non-stackable candidate can only be the first acceptance.
        if !accepted.is_empty() && !candidate.promotion.stackable {
            return Some(RejectionReason::NotStackable);
        }
        // Mutual exclusion is symmetric regardless of which side declared it.
        for a in accepted {
            if a.promotion
                .exclude_promotion_ids
                .contains(&candidate.promotion.id)
                || candidate
                    .promotion
                    .exclude_promotion_ids
                    .contains(&a.promotion.id)
            {
                return Some(RejectionReason::ExcludedByConflict);
            }
        }
        // Only one promo code is honored per appointment.
        if code_accepted && candidate.promotion.application_method.is_code_based() {
            return Some(RejectionReason::CodeExclusive);
        }
        None
    }
}
