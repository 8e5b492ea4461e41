//! Eligibility evaluation — decides, for one (customer, draft, promotion)
//! triple, whether the promotion is admissible and which line items it
//! would touch.
//!
//! Evaluation is read-only and side-effect-free, so it can back a live
//! price preview and be re-run at will. Usage caps checked here are
//! re-validated at commit time by the ledger; this pass only filters out
//! promotions that are already visibly exhausted.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use tracing::debug;

use salon_core::booking::{
    CustomerSnapshot, DraftAppointment, EligibilityResult, RejectionReason,
};
use salon_core::catalog::ServiceCatalog;
use salon_core::config::PromotionsConfig;
use salon_core::error::{SalonError, SalonResult};
use salon_core::promotion::{
    CodeGate, DiscountRule, Promotion, PromotionRules, Schedule, SegmentRule, TargetingRule,
};

/// An admissible promotion paired with its evaluation result, handed from
/// the evaluator to the resolver.
#[derive(Debug, Clone)]
pub struct EligibleCandidate {
    pub promotion: Promotion,
    pub result: EligibilityResult,
}

/// Stateless eligibility checker.
pub struct EligibilityEvaluator {
    config: PromotionsConfig,
    catalog: Arc<ServiceCatalog>,
}

impl EligibilityEvaluator {
    pub fn new(config: &PromotionsConfig, catalog: Arc<ServiceCatalog>) -> Self {
        Self {
            config: config.clone(),
            catalog,
        }
    }

    /// Evaluate one promotion against a draft appointment.
    ///
    /// Returns `Err` only for caller precondition violations (programmer
    /// error at the call site); every promotion-side problem is an
    /// inadmissible result with a reason, so one bad promotion can never
    /// block evaluation of the others.
    pub fn evaluate(
        &self,
        customer: &CustomerSnapshot,
        draft: &DraftAppointment,
        promotion: &Promotion,
    ) -> SalonResult<EligibilityResult> {
        Self::validate_input(customer, draft)?;
        metrics::counter!("promotions.evaluated").increment(1);

        let result = self.check(customer, draft, promotion);
        if let Some(reason) = result.rejection {
            metrics::counter!("promotions.rejected").increment(1);
            debug!(
                promotion_id = %promotion.id,
                reason = %reason,
                "Promotion inadmissible"
            );
        }
        Ok(result)
    }

    fn validate_input(customer: &CustomerSnapshot, draft: &DraftAppointment) -> SalonResult<()> {
        if customer.id.is_nil() {
            return Err(SalonError::Validation("customer id is nil".into()));
        }
        if draft.items.is_empty() {
            return Err(SalonError::Validation(
                "draft appointment has no line items".into(),
            ));
        }
        if draft.customer_id != customer.id {
            return Err(SalonError::Validation(
                "draft customer does not match customer snapshot".into(),
            ));
        }
        Ok(())
    }

    fn check(
        &self,
        customer: &CustomerSnapshot,
        draft: &DraftAppointment,
        promotion: &Promotion,
    ) -> EligibilityResult {
        let rejected = |reason| EligibilityResult::rejected(promotion.id, reason);

        let Some(rules) = promotion.rules() else {
            return rejected(RejectionReason::MalformedPromotion);
        };
        if customer.blocked {
            return rejected(RejectionReason::CustomerBlocked);
        }

        // 1. Temporal window, day-of-week, time-of-day.
        if let Some(reason) = Self::check_schedule(promotion, &rules.schedule, draft.at) {
            return rejected(reason);
        }

        // 2. Minimum purchase.
        if draft.subtotal_cents < promotion.min_purchase_cents {
            return rejected(RejectionReason::MinPurchaseNotMet);
        }

        // 3. Global usage cap.
        if let Some(cap) = promotion.max_uses {
            if promotion.used_count >= cap {
                return rejected(RejectionReason::GlobalCapExceeded);
            }
        }

        // 4. Per-customer cap.
        let customer_uses = promotion
            .customer_usage
            .get(&customer.id)
            .copied()
            .unwrap_or(0);
        if let Some(cap) = promotion.max_uses_per_customer {
            if customer_uses >= cap {
                return rejected(RejectionReason::PerCustomerCapExceeded);
            }
        }

        // 5. Application-method gate.
        if let Some(reason) = Self::check_gate(&rules.gate, draft, customer_uses) {
            return rejected(reason);
        }

        // 6. Customer segment.
        if let Some(reason) = self.check_segment(&rules.segment, customer, draft.at) {
            return rejected(reason);
        }

        // 7. Targeting.
        match self.targeted_items(&rules, promotion, draft) {
            Ok(targeted) => EligibilityResult::admissible(promotion.id, targeted),
            Err(reason) => rejected(reason),
        }
    }

    fn check_schedule(
        promotion: &Promotion,
        schedule: &Schedule,
        at: DateTime<Utc>,
    ) -> Option<RejectionReason> {
        if let Some(from) = promotion.valid_from {
            if at < from {
                return Some(RejectionReason::OutsideValidityWindow);
            }
        }
        if let Some(until) = promotion.valid_until {
            if at > until {
                return Some(RejectionReason::OutsideValidityWindow);
            }
        }
        if !schedule.days_of_week.is_empty() {
            let weekday = at.weekday().num_days_from_sunday() as u8;
            if !schedule.days_of_week.contains(&weekday) {
                return Some(RejectionReason::DayOfWeekRestricted);
            }
        }
        if !schedule.time_ranges.is_empty() {
            let minute = (at.hour() * 60 + at.minute()) as u16;
            if !schedule.time_ranges.iter().any(|r| r.contains(minute)) {
                return Some(RejectionReason::TimeOfDayRestricted);
            }
        }
        None
    }

    fn check_gate(
        gate: &CodeGate,
        draft: &DraftAppointment,
        customer_uses: u32,
    ) -> Option<RejectionReason> {
        match gate {
            CodeGate::Auto => None,
            // Manual promotions require an explicit admin override and are
            // never admissible through this evaluator.
            CodeGate::Manual => Some(RejectionReason::ManualOnly),
            CodeGate::Code { code, one_time } => match draft.promo_code.as_deref() {
                Some(submitted) if submitted.eq_ignore_ascii_case(code) => {
                    if *one_time && customer_uses > 0 {
                        Some(RejectionReason::CodeAlreadyRedeemed)
                    } else {
                        None
                    }
                }
                _ => Some(RejectionReason::CodeMismatch),
            },
        }
    }

    fn check_segment(
        &self,
        segment: &SegmentRule,
        customer: &CustomerSnapshot,
        at: DateTime<Utc>,
    ) -> Option<RejectionReason> {
        let matches = match segment {
            SegmentRule::All => true,
            SegmentRule::NewCustomers => customer.visit_count == 0,
            SegmentRule::ReturningCustomers => customer.visit_count >= 1,
            // Fires exactly once, on the qualifying visit.
            SegmentRule::LoyaltyMilestone { visit_count } => {
                customer.visit_count + 1 == *visit_count
            }
            SegmentRule::InactiveCustomers => match customer.last_visit {
                Some(last) => (at - last).num_days() > self.config.inactivity_days as i64,
                None => false,
            },
            SegmentRule::Birthday {
                days_before,
                days_after,
            } => match customer.birthday {
                Some(birthday) => {
                    birthday_window_contains(birthday, *days_before, *days_after, at.date_naive())
                }
                None => false,
            },
            SegmentRule::SpecificCustomers { customer_ids } => {
                customer_ids.contains(&customer.id)
            }
        };
        (!matches).then_some(RejectionReason::SegmentMismatch)
    }

    fn targeted_items(
        &self,
        rules: &PromotionRules,
        promotion: &Promotion,
        draft: &DraftAppointment,
    ) -> Result<Vec<usize>, RejectionReason> {
        // Free-service promotions are validated against the catalog entry,
        // not the draft; only an already-booked instance gets discounted.
        if let DiscountRule::FreeService { service_id } = &rules.discount {
            if !self.catalog.contains(service_id) {
                return Err(RejectionReason::MalformedPromotion);
            }
            return Ok(draft
                .items
                .iter()
                .enumerate()
                .filter(|(_, item)| item.service_id == *service_id)
                .map(|(index, _)| index)
                .collect());
        }

        let targeted: Vec<usize> = draft
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| match &rules.targeting {
                TargetingRule::All => true,
                TargetingRule::Services { ids } => ids.contains(&item.service_id),
                TargetingRule::Categories { names } => names.contains(&item.category),
            })
            .filter(|(_, item)| {
                !promotion.exclude_service_ids.contains(&item.service_id)
                    && !promotion.exclude_category_names.contains(&item.category)
            })
            .map(|(index, _)| index)
            .collect();

        if targeted.is_empty() {
            return Err(RejectionReason::NoTargetedItems);
        }
        Ok(targeted)
    }
}

/// Year-agnostic birthday window check: compares month/day only, probing
/// the anniversary in the adjacent years so windows straddling New Year
/// work. Feb 29 anniversaries are observed on Mar 1 in non-leap years.
fn birthday_window_contains(
    birthday: NaiveDate,
    days_before: u32,
    days_after: u32,
    today: NaiveDate,
) -> bool {
    for year in [today.year() - 1, today.year(), today.year() + 1] {
        let anniversary = NaiveDate::from_ymd_opt(year, birthday.month(), birthday.day())
            .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1));
        let Some(anniversary) = anniversary else {
            continue;
        };
        let start = anniversary - Duration::days(days_before as i64);
        let end = anniversary + Duration::days(days_after as i64);
        if today >= start && today <= end {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use salon_core::booking::LineItem;
    use salon_core::catalog::CatalogService;
    use salon_core::promotion::{
        ApplicationMethod, AppliesTo, CustomerSegment, DiscountConfig, DiscountType,
        PromotionStatus, SegmentConfig, TimeRange,
    };
    use uuid::Uuid;

    fn catalog() -> Arc<ServiceCatalog> {
        let catalog = ServiceCatalog::new();
        for (id, name, price, category) in [
            ("gel-manicure", "Gel Manicure", 4500, "nails"),
            ("classic-facial", "Classic Facial", 9000, "skin"),
            ("brow-shaping", "Brow Shaping", 2500, "brows"),
            ("swedish-massage", "Swedish Massage", 12_000, "massage"),
        ] {
            catalog.insert(CatalogService {
                id: id.into(),
                name: name.into(),
                price_cents: price,
                category: category.into(),
            });
        }
        Arc::new(catalog)
    }

    fn evaluator() -> EligibilityEvaluator {
        EligibilityEvaluator::new(&PromotionsConfig::default(), catalog())
    }

    fn customer() -> CustomerSnapshot {
        CustomerSnapshot {
            visit_count: 3,
            ..CustomerSnapshot::new(Uuid::new_v4())
        }
    }

    // 2026-03-10 is a Tuesday.
    fn tuesday_morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 10, 30, 0).unwrap()
    }

    fn draft_for(customer: &CustomerSnapshot, promo_code: Option<&str>) -> DraftAppointment {
        DraftAppointment::from_items(
            customer.id,
            vec![
                LineItem {
                    service_id: "gel-manicure".into(),
                    price_cents: 4500,
                    category: "nails".into(),
                },
                LineItem {
                    service_id: "classic-facial".into(),
                    price_cents: 9000,
                    category: "skin".into(),
                },
            ],
            tuesday_morning(),
            promo_code.map(String::from),
        )
    }

    fn auto_promo() -> Promotion {
        Promotion {
            status: PromotionStatus::Active,
            discount_type: DiscountType::Percentage,
            discount_value: 10.0,
            ..Default::default()
        }
    }

    fn reason(result: &EligibilityResult) -> RejectionReason {
        result.rejection.expect("expected a rejection")
    }

    #[test]
    fn auto_apply_all_is_admissible() {
        let customer = customer();
        let draft = draft_for(&customer, None);
        let result = evaluator()
            .evaluate(&customer, &draft, &auto_promo())
            .unwrap();
        assert!(result.admissible);
        assert_eq!(result.targeted, vec![0, 1]);
    }

    #[test]
    fn empty_draft_is_a_precondition_error() {
        let customer = customer();
        let draft = DraftAppointment::from_items(customer.id, Vec::new(), tuesday_morning(), None);
        let err = evaluator()
            .evaluate(&customer, &draft, &auto_promo())
            .unwrap_err();
        assert!(matches!(err, SalonError::Validation(_)));
    }

    #[test]
    fn blocked_customer_is_rejected() {
        let mut customer = customer();
        customer.blocked = true;
        let draft = draft_for(&customer, None);
        let result = evaluator()
            .evaluate(&customer, &draft, &auto_promo())
            .unwrap();
        assert_eq!(reason(&result), RejectionReason::CustomerBlocked);
    }

    #[test]
    fn malformed_promotion_never_errors() {
        let customer = customer();
        let draft = draft_for(&customer, None);
        let promo = Promotion {
            discount_value: 0.0,
            ..auto_promo()
        };
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert_eq!(reason(&result), RejectionReason::MalformedPromotion);
    }

    #[test]
    fn validity_window_is_enforced() {
        let customer = customer();
        let draft = draft_for(&customer, None);
        let promo = Promotion {
            valid_from: Some(tuesday_morning() + Duration::days(1)),
            ..auto_promo()
        };
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert_eq!(reason(&result), RejectionReason::OutsideValidityWindow);
    }

    #[test]
    fn day_of_week_restriction() {
        let customer = customer();
        let draft = draft_for(&customer, None);
        // Sunday + Monday only; the draft is on a Tuesday.
        let promo = Promotion {
            valid_days_of_week: vec![0, 1],
            ..auto_promo()
        };
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert_eq!(reason(&result), RejectionReason::DayOfWeekRestricted);

        let promo = Promotion {
            valid_days_of_week: vec![2],
            ..auto_promo()
        };
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert!(result.admissible);
    }

    #[test]
    fn time_of_day_restriction() {
        let customer = customer();
        let draft = draft_for(&customer, None); // 10:30
        let promo = Promotion {
            valid_time_ranges: vec![TimeRange {
                start: "14:00".into(),
                end: "17:00".into(),
            }],
            ..auto_promo()
        };
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert_eq!(reason(&result), RejectionReason::TimeOfDayRestricted);

        let promo = Promotion {
            valid_time_ranges: vec![TimeRange {
                start: "09:00".into(),
                end: "12:00".into(),
            }],
            ..auto_promo()
        };
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert!(result.admissible);
    }

    #[test]
    fn minimum_purchase_gate() {
        let customer = customer();
        let draft = draft_for(&customer, None); // 13_500 subtotal
        let promo = Promotion {
            min_purchase_cents: 20_000,
            ..auto_promo()
        };
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert_eq!(reason(&result), RejectionReason::MinPurchaseNotMet);
    }

    #[test]
    fn global_cap_exceeded() {
        let customer = customer();
        let draft = draft_for(&customer, None);
        let promo = Promotion {
            max_uses: Some(100),
            used_count: 100,
            ..auto_promo()
        };
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert_eq!(reason(&result), RejectionReason::GlobalCapExceeded);
    }

    #[test]
    fn per_customer_cap_trumps_available_global_budget() {
        let customer = customer();
        let draft = draft_for(&customer, None);
        let mut promo = Promotion {
            max_uses: Some(100),
            used_count: 10,
            max_uses_per_customer: Some(1),
            ..auto_promo()
        };
        promo.customer_usage.insert(customer.id, 1);
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert_eq!(reason(&result), RejectionReason::PerCustomerCapExceeded);
    }

    #[test]
    fn promo_code_gate_is_case_insensitive() {
        let customer = customer();
        let promo = Promotion {
            application_method: ApplicationMethod::PromoCode,
            promo_code: Some("SAVE5".into()),
            ..auto_promo()
        };

        let draft = draft_for(&customer, Some("save5"));
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert!(result.admissible);

        let draft = draft_for(&customer, Some("OTHER"));
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert_eq!(reason(&result), RejectionReason::CodeMismatch);

        let draft = draft_for(&customer, None);
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert_eq!(reason(&result), RejectionReason::CodeMismatch);
    }

    #[test]
    fn one_time_code_requires_no_prior_redemption() {
        let customer = customer();
        let draft = draft_for(&customer, Some("WELCOME"));
        let mut promo = Promotion {
            application_method: ApplicationMethod::OneTimeCode,
            promo_code: Some("WELCOME".into()),
            ..auto_promo()
        };

        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert!(result.admissible);

        promo.customer_usage.insert(customer.id, 1);
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert_eq!(reason(&result), RejectionReason::CodeAlreadyRedeemed);
    }

    #[test]
    fn manual_promotions_never_pass() {
        let customer = customer();
        let draft = draft_for(&customer, None);
        let promo = Promotion {
            application_method: ApplicationMethod::Manual,
            ..auto_promo()
        };
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert_eq!(reason(&result), RejectionReason::ManualOnly);
    }

    #[test]
    fn new_customer_segment() {
        let mut customer = customer();
        customer.visit_count = 0;
        let draft = draft_for(&customer, None);
        let promo = Promotion {
            customer_segment: CustomerSegment::NewCustomers,
            ..auto_promo()
        };
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert!(result.admissible);

        customer.visit_count = 1;
        let draft = draft_for(&customer, None);
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert_eq!(reason(&result), RejectionReason::SegmentMismatch);
    }

    #[test]
    fn loyalty_milestone_fires_on_qualifying_visit_only() {
        let mut customer = customer();
        let promo = Promotion {
            customer_segment: CustomerSegment::LoyaltyMilestone,
            segment_config: SegmentConfig {
                visit_count: Some(5),
                ..Default::default()
            },
            ..auto_promo()
        };

        customer.visit_count = 4; // this booking is visit #5
        let draft = draft_for(&customer, None);
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert!(result.admissible);

        customer.visit_count = 5;
        let draft = draft_for(&customer, None);
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert_eq!(reason(&result), RejectionReason::SegmentMismatch);
    }

    #[test]
    fn inactive_customer_segment_uses_configured_threshold() {
        let mut customer = customer();
        let promo = Promotion {
            customer_segment: CustomerSegment::InactiveCustomers,
            ..auto_promo()
        };

        customer.last_visit = Some(tuesday_morning() - Duration::days(120));
        let draft = draft_for(&customer, None);
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert!(result.admissible);

        customer.last_visit = Some(tuesday_morning() - Duration::days(30));
        let draft = draft_for(&customer, None);
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert_eq!(reason(&result), RejectionReason::SegmentMismatch);
    }

    #[test]
    fn birthday_segment_is_year_agnostic() {
        let mut customer = customer();
        customer.birthday = NaiveDate::from_ymd_opt(1990, 3, 12);
        let draft = draft_for(&customer, None); // 2026-03-10
        let promo = Promotion {
            customer_segment: CustomerSegment::Birthday,
            segment_config: SegmentConfig {
                birthday_days_before: Some(3),
                birthday_days_after: Some(3),
                ..Default::default()
            },
            ..auto_promo()
        };
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert!(result.admissible);

        customer.birthday = NaiveDate::from_ymd_opt(1990, 7, 1);
        let draft = draft_for(&customer, None);
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert_eq!(reason(&result), RejectionReason::SegmentMismatch);
    }

    #[test]
    fn birthday_window_straddles_new_year() {
        assert!(birthday_window_contains(
            NaiveDate::from_ymd_opt(1990, 1, 2).unwrap(),
            7,
            7,
            NaiveDate::from_ymd_opt(2025, 12, 29).unwrap(),
        ));
        assert!(birthday_window_contains(
            NaiveDate::from_ymd_opt(1990, 12, 30).unwrap(),
            7,
            7,
            NaiveDate::from_ymd_opt(2026, 1, 3).unwrap(),
        ));
    }

    #[test]
    fn specific_customers_allow_list() {
        let customer = customer();
        let draft = draft_for(&customer, None);
        let promo = Promotion {
            customer_segment: CustomerSegment::SpecificCustomers,
            segment_config: SegmentConfig {
                customer_ids: vec![customer.id],
                ..Default::default()
            },
            ..auto_promo()
        };
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert!(result.admissible);

        let outsider = CustomerSnapshot::new(Uuid::new_v4());
        let draft = draft_for(&outsider, None);
        let result = evaluator().evaluate(&outsider, &draft, &promo).unwrap();
        assert_eq!(reason(&result), RejectionReason::SegmentMismatch);
    }

    #[test]
    fn category_targeting_with_exclusions() {
        let customer = customer();
        let draft = draft_for(&customer, None);
        let promo = Promotion {
            applies_to: AppliesTo::Categories,
            category_names: vec!["nails".into(), "skin".into()],
            exclude_service_ids: vec!["classic-facial".into()],
            ..auto_promo()
        };
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert!(result.admissible);
        assert_eq!(result.targeted, vec![0]);
    }

    #[test]
    fn fully_excluded_targeting_is_inadmissible() {
        let customer = customer();
        let draft = draft_for(&customer, None);
        let promo = Promotion {
            applies_to: AppliesTo::Services,
            service_ids: vec!["swedish-massage".into()],
            ..auto_promo()
        };
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert_eq!(reason(&result), RejectionReason::NoTargetedItems);
    }

    #[test]
    fn free_service_targets_booked_instance() {
        let customer = customer();
        let draft = draft_for(&customer, None);
        let promo = Promotion {
            discount_type: DiscountType::FreeService,
            discount_config: DiscountConfig {
                free_service_id: Some("classic-facial".into()),
                ..Default::default()
            },
            ..auto_promo()
        };
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert!(result.admissible);
        assert_eq!(result.targeted, vec![1]);
    }

    #[test]
    fn free_service_without_booking_is_still_admissible() {
        let customer = customer();
        let draft = draft_for(&customer, None);
        let promo = Promotion {
            discount_type: DiscountType::FreeService,
            discount_config: DiscountConfig {
                free_service_id: Some("brow-shaping".into()),
                ..Default::default()
            },
            ..auto_promo()
        };
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert!(result.admissible);
        assert!(result.targeted.is_empty());
    }

    #[test]
    fn free_service_unknown_in_catalog_is_malformed() {
        let customer = customer();
        let draft = draft_for(&customer, None);
        let promo = Promotion {
            discount_type: DiscountType::FreeService,
            discount_config: DiscountConfig {
                free_service_id: Some("no-such-service".into()),
                ..Default::default()
            },
            ..auto_promo()
        };
        let result = evaluator().evaluate(&customer, &draft, &promo).unwrap();
        assert_eq!(reason(&result), RejectionReason::MalformedPromotion);
    }
}
