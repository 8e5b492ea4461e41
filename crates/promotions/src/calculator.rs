//! Discount computation — turns the resolved promotion set into a
//! deterministic `DiscountOutcome`.
//!
//! Composition rules: promotions are processed in the resolver's acceptance
//! order. Percentage-family discounts (percentage, bundle) compound
//! multiplicatively against an item's percentage-discounted price;
//! amount-family discounts (fixed amount, free service, buy-x-get-y)
//! compose additively and are clamped against the item's remaining
//! discountable value so an item can never be discounted past its price.
//! Monetary results round half-up to cents once per promotion, never per
//! line item.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use salon_core::booking::{AppliedDiscount, DiscountOutcome, DraftAppointment};
use salon_core::catalog::ServiceCatalog;
use salon_core::promotion::DiscountRule;

use crate::evaluator::EligibleCandidate;

pub struct DiscountCalculator {
    catalog: Arc<ServiceCatalog>,
}

impl DiscountCalculator {
    pub fn new(catalog: Arc<ServiceCatalog>) -> Self {
        Self { catalog }
    }

    pub fn calculate(
        &self,
        draft: &DraftAppointment,
        resolved: &[EligibleCandidate],
    ) -> DiscountOutcome {
        let item_count = draft.items.len();
        // Price after percentage compounding, per item.
        let mut pct_base: Vec<f64> = draft.items.iter().map(|i| i.price_cents as f64).collect();
        // Undiscounted value still available on the item, across all
        // discount families.
        let mut available: Vec<f64> = pct_base.clone();

        let mut applied = Vec::with_capacity(resolved.len());
        let mut total_discount: i64 = 0;

        for candidate in resolved {
            let Some(rules) = candidate.promotion.rules() else {
                // A record that no longer parses contributes nothing.
                continue;
            };
            let targeted: Vec<usize> = candidate
                .result
                .targeted
                .iter()
                .copied()
                .filter(|&i| i < item_count)
                .collect();

            let raw = self.apply_rule(
                &rules.discount,
                draft,
                &targeted,
                &mut pct_base,
                &mut available,
            );

            // Round once per promotion; never discount past the subtotal.
            let amount = round_half_up_cents(raw)
                .min(draft.subtotal_cents - total_discount)
                .max(0);
            total_discount += amount;

            debug!(
                promotion_id = %candidate.promotion.id,
                amount_cents = amount,
                "Discount computed"
            );
            applied.push(AppliedDiscount {
                promotion_id: candidate.promotion.id,
                amount_cents: amount,
                targeted_service_ids: targeted
                    .iter()
                    .map(|&i| draft.items[i].service_id.clone())
                    .collect(),
            });
        }

        let final_total_cents = (draft.subtotal_cents - total_discount).max(0);
        metrics::counter!("promotions.applied").increment(applied.len() as u64);
        metrics::counter!("promotions.discount_cents").increment(total_discount as u64);

        DiscountOutcome {
            applied,
            final_total_cents,
            applied_at: Utc::now(),
        }
    }

    fn apply_rule(
        &self,
        rule: &DiscountRule,
        draft: &DraftAppointment,
        targeted: &[usize],
        pct_base: &mut [f64],
        available: &mut [f64],
    ) -> f64 {
        match rule {
            DiscountRule::Percentage { percent } => {
                percent_off(targeted, *percent, pct_base, available)
            }
            DiscountRule::FixedAmount { amount_cents } => {
                take_amount(targeted, *amount_cents as f64, available)
            }
            DiscountRule::FreeService { service_id } => {
                // One already-booked instance at full catalog price.
                let Some(&index) = targeted.first() else {
                    return 0.0;
                };
                let price = self
                    .catalog
                    .price_cents(service_id)
                    .unwrap_or(draft.items[index].price_cents) as f64;
                let taken = price.min(available[index]).max(0.0);
                available[index] -= taken;
                pct_base[index] = 0.0;
                taken
            }
            DiscountRule::BuyXGetY { buy, get } => {
                let group = (*buy + *get) as usize;
                let order = by_ascending_price(targeted, draft);
                let free = (order.len() / group) * *get as usize;
                let mut raw = 0.0;
                for &index in order.iter().take(free) {
                    raw += available[index];
                    available[index] = 0.0;
                    pct_base[index] = 0.0;
                }
                raw
            }
            DiscountRule::BundleDiscount { size, percent } => {
                let order = by_ascending_price(targeted, draft);
                let covered = (order.len() / *size as usize) * *size as usize;
                percent_off(&order[..covered], *percent, pct_base, available)
            }
        }
    }
}

fn percent_off(targeted: &[usize], percent: f64, pct_base: &mut [f64], available: &mut [f64]) -> f64 {
    let fraction = percent / 100.0;
    let mut raw = 0.0;
    for &index in targeted {
        let taken = (pct_base[index] * fraction).min(available[index]).max(0.0);
        pct_base[index] *= 1.0 - fraction;
        available[index] -= taken;
        raw += taken;
    }
    raw
}

fn take_amount(targeted: &[usize], amount: f64, available: &mut [f64]) -> f64 {
    let mut remaining = amount;
    let mut raw = 0.0;
    for &index in targeted {
        if remaining <= 0.0 {
            break;
        }
        let taken = available[index].min(remaining);
        available[index] -= taken;
        remaining -= taken;
        raw += taken;
    }
    raw
}

/// Targeted indices sorted by original price ascending, index as the
/// deterministic tie-break.
fn by_ascending_price(targeted: &[usize], draft: &DraftAppointment) -> Vec<usize> {
    let mut order = targeted.to_vec();
    order.sort_by_key(|&i| (draft.items[i].price_cents, i));
    order
}

/// Round to whole cents, half away from zero-point-five upward.
fn round_half_up_cents(raw: f64) -> i64 {
    (raw + 0.5).floor() as i64
}
