//! Pipeline facade: registry → evaluator → resolver → calculator.
//!
//! This is the entry point the booking and administrative-edit flows call
//! for price previews. It is read-only; committing the outcome is the
//! usage ledger's job.

use std::sync::Arc;

use tracing::info;

use salon_core::booking::{CustomerSnapshot, DiscountOutcome, DraftAppointment, EligibilityResult};
use salon_core::catalog::ServiceCatalog;
use salon_core::config::PromotionsConfig;
use salon_core::error::SalonResult;
use salon_store::DocumentStore;

use crate::calculator::DiscountCalculator;
use crate::evaluator::{EligibilityEvaluator, EligibleCandidate};
use crate::registry::PromotionRegistry;
use crate::resolver::ConflictResolver;

/// The full evaluation of a draft appointment: the computed outcome plus
/// the per-promotion results behind it.
#[derive(Debug, Clone)]
pub struct PreviewResult {
    pub outcome: DiscountOutcome,
    /// Results of the promotions that made it into the outcome, in
    /// acceptance order.
    pub applied: Vec<EligibilityResult>,
    /// Evaluator rejections and resolver drops, with reasons.
    pub rejected: Vec<EligibilityResult>,
}

pub struct PromotionEngine {
    registry: PromotionRegistry,
    evaluator: EligibilityEvaluator,
    resolver: ConflictResolver,
    calculator: DiscountCalculator,
}

impl PromotionEngine {
    pub fn new(
        config: &PromotionsConfig,
        store: Arc<DocumentStore>,
        catalog: Arc<ServiceCatalog>,
    ) -> Self {
        Self {
            registry: PromotionRegistry::new(store),
            evaluator: EligibilityEvaluator::new(config, catalog.clone()),
            resolver: ConflictResolver::new(),
            calculator: DiscountCalculator::new(catalog),
        }
    }

    pub fn registry(&self) -> &PromotionRegistry {
        &self.registry
    }

    /// Evaluate every structurally active promotion against the draft and
    /// compute the final discounted price. Safe to call repeatedly and
    /// concurrently; mutates nothing.
    pub fn preview(
        &self,
        customer: &CustomerSnapshot,
        draft: &DraftAppointment,
    ) -> SalonResult<PreviewResult> {
        let candidates = self.registry.active_candidates(draft.at);

        let mut eligible: Vec<EligibleCandidate> = Vec::new();
        let mut rejected: Vec<EligibilityResult> = Vec::new();
        for promotion in candidates {
            let result = self.evaluator.evaluate(customer, draft, &promotion)?;
            if result.admissible {
                eligible.push(EligibleCandidate { promotion, result });
            } else {
                rejected.push(result);
            }
        }

        let resolution = self.resolver.resolve(eligible);
        rejected.extend(resolution.dropped.iter().cloned());

        let outcome = self.calculator.calculate(draft, &resolution.applied);
        info!(
            customer_id = %customer.id,
            applied = resolution.applied.len(),
            rejected = rejected.len(),
            subtotal_cents = draft.subtotal_cents,
            final_total_cents = outcome.final_total_cents,
            "Draft appointment priced"
        );

        Ok(PreviewResult {
            outcome,
            applied: resolution
                .applied
                .iter()
                .map(|c| c.result.clone())
                .collect(),
            rejected,
        })
    }
}
