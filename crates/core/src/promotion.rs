//! Promotion domain types — the persisted marketing-campaign record and the
//! typed rules parsed from its dynamically-shaped config payloads.
//!
//! The persisted record mirrors the document-store schema: the
//! type-conditional fields live in loose `*_config` payloads keyed by the
//! `discount_type` / `customer_segment` discriminants. `Promotion::rules`
//! parses the record into tagged sum types in one place, so a record missing
//! a required conditional field is caught there and nowhere else.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Discriminants ──────────────────────────────────────────────────────────

/// Lifecycle status of a promotion record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PromotionStatus {
    Draft,
    Scheduled,
    Active,
    Paused,
    Ended,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    FixedAmount,
    FreeService,
    BuyXGetY,
    BundleDiscount,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationMethod {
    AutoApply,
    PromoCode,
    OneTimeCode,
    Manual,
}

impl ApplicationMethod {
    pub fn is_code_based(&self) -> bool {
        matches!(self, ApplicationMethod::PromoCode | ApplicationMethod::OneTimeCode)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppliesTo {
    All,
    Services,
    Categories,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CustomerSegment {
    All,
    NewCustomers,
    ReturningCustomers,
    LoyaltyMilestone,
    InactiveCustomers,
    Birthday,
    SpecificCustomers,
}

// ─── Config payloads ────────────────────────────────────────────────────────

/// Discount fields whose presence depends on `discount_type`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscountConfig {
    pub free_service_id: Option<String>,
    pub buy_quantity: Option<u32>,
    pub get_quantity: Option<u32>,
    pub bundle_size: Option<u32>,
}

/// Segment fields whose presence depends on `customer_segment`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentConfig {
    pub visit_count: Option<u32>,
    pub birthday_days_before: Option<u32>,
    pub birthday_days_after: Option<u32>,
    #[serde(default)]
    pub customer_ids: Vec<Uuid>,
}

/// Wall-clock time-of-day range in `HH:MM` form, inclusive on both ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

// ─── Promotion record ───────────────────────────────────────────────────────

/// A persisted marketing promotion: discount shape, targeting, conditions,
/// validity windows, and usage counters.
///
/// Counters (`used_count`, `total_discount_given_cents`, `customer_usage`)
/// are mutated only by the usage ledger at booking-commit time; every other
/// field is owned by the administrative edit flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promotion {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: PromotionStatus,

    pub discount_type: DiscountType,
    /// Numeric magnitude; meaning depends on `discount_type` (percent for
    /// percentage/bundle discounts, cents for fixed amounts).
    pub discount_value: f64,
    #[serde(default)]
    pub discount_config: DiscountConfig,

    pub application_method: ApplicationMethod,
    pub promo_code: Option<String>,

    pub applies_to: AppliesTo,
    #[serde(default)]
    pub service_ids: Vec<String>,
    #[serde(default)]
    pub category_names: Vec<String>,
    #[serde(default)]
    pub exclude_service_ids: Vec<String>,
    #[serde(default)]
    pub exclude_category_names: Vec<String>,

    pub customer_segment: CustomerSegment,
    #[serde(default)]
    pub segment_config: SegmentConfig,

    #[serde(default)]
    pub min_purchase_cents: i64,
    pub max_uses: Option<u32>,
    pub max_uses_per_customer: Option<u32>,
    #[serde(default)]
    pub stackable: bool,
    /// 1–100, higher wins ties during conflict resolution.
    #[serde(default = "default_priority")]
    pub priority: u8,
    /// Promotions that may never co-apply with this one, regardless of
    /// stackability. Enforced symmetrically by the resolver.
    #[serde(default)]
    pub exclude_promotion_ids: Vec<Uuid>,

    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    /// Weekdays the promotion is valid on, 0 = Sunday. Empty = unrestricted.
    #[serde(default)]
    pub valid_days_of_week: Vec<u8>,
    /// Time-of-day windows. Empty = unrestricted.
    #[serde(default)]
    pub valid_time_ranges: Vec<TimeRange>,

    #[serde(default)]
    pub used_count: u32,
    #[serde(default)]
    pub total_discount_given_cents: i64,
    #[serde(default)]
    pub customer_usage: HashMap<Uuid, u32>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_priority() -> u8 {
    50
}

impl Default for Promotion {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            description: None,
            status: PromotionStatus::Draft,
            discount_type: DiscountType::Percentage,
            discount_value: 0.0,
            discount_config: DiscountConfig::default(),
            application_method: ApplicationMethod::AutoApply,
            promo_code: None,
            applies_to: AppliesTo::All,
            service_ids: Vec::new(),
            category_names: Vec::new(),
            exclude_service_ids: Vec::new(),
            exclude_category_names: Vec::new(),
            customer_segment: CustomerSegment::All,
            segment_config: SegmentConfig::default(),
            min_purchase_cents: 0,
            max_uses: None,
            max_uses_per_customer: None,
            stackable: false,
            priority: default_priority(),
            exclude_promotion_ids: Vec::new(),
            valid_from: None,
            valid_until: None,
            valid_days_of_week: Vec::new(),
            valid_time_ranges: Vec::new(),
            used_count: 0,
            total_discount_given_cents: 0,
            customer_usage: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

// ─── Typed rules ────────────────────────────────────────────────────────────

/// Discount shape with its type-conditional fields statically known.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscountRule {
    Percentage { percent: f64 },
    FixedAmount { amount_cents: i64 },
    FreeService { service_id: String },
    BuyXGetY { buy: u32, get: u32 },
    BundleDiscount { size: u32, percent: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SegmentRule {
    All,
    NewCustomers,
    ReturningCustomers,
    LoyaltyMilestone { visit_count: u32 },
    InactiveCustomers,
    Birthday { days_before: u32, days_after: u32 },
    SpecificCustomers { customer_ids: Vec<Uuid> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TargetingRule {
    All,
    Services { ids: Vec<String> },
    Categories { names: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CodeGate {
    Auto,
    Code { code: String, one_time: bool },
    Manual,
}

/// Time-of-day window in minutes since midnight, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinuteRange {
    pub start: u16,
    pub end: u16,
}

impl MinuteRange {
    pub fn contains(&self, minute: u16) -> bool {
        minute >= self.start && minute <= self.end
    }
}

/// Parsed validity schedule. Empty vectors mean unrestricted.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub days_of_week: Vec<u8>,
    pub time_ranges: Vec<MinuteRange>,
}

/// Every rule of a promotion, parsed once.
#[derive(Debug, Clone)]
pub struct PromotionRules {
    pub discount: DiscountRule,
    pub segment: SegmentRule,
    pub targeting: TargetingRule,
    pub gate: CodeGate,
    pub schedule: Schedule,
}

impl Promotion {
    /// Parse the loose record into typed rules.
    ///
    /// `None` means the record is malformed (a type-conditional required
    /// field is missing or out of range) and must be treated as permanently
    /// inadmissible, never as an error.
    pub fn rules(&self) -> Option<PromotionRules> {
        Some(PromotionRules {
            discount: self.discount_rule()?,
            segment: self.segment_rule()?,
            targeting: self.targeting_rule()?,
            gate: self.code_gate()?,
            schedule: self.schedule()?,
        })
    }

    fn discount_rule(&self) -> Option<DiscountRule> {
        match self.discount_type {
            DiscountType::Percentage => {
                in_percent_range(self.discount_value).then(|| DiscountRule::Percentage {
                    percent: self.discount_value,
                })
            }
            DiscountType::FixedAmount => (self.discount_value > 0.0).then(|| {
                DiscountRule::FixedAmount {
                    amount_cents: self.discount_value as i64,
                }
            }),
            DiscountType::FreeService => {
                let service_id = self.discount_config.free_service_id.clone()?;
                (!service_id.is_empty()).then_some(DiscountRule::FreeService { service_id })
            }
            DiscountType::BuyXGetY => {
                let buy = self.discount_config.buy_quantity?;
                let get = self.discount_config.get_quantity?;
                (buy >= 1 && get >= 1).then_some(DiscountRule::BuyXGetY { buy, get })
            }
            DiscountType::BundleDiscount => {
                let size = self.discount_config.bundle_size?;
                (size >= 2 && in_percent_range(self.discount_value)).then(|| {
                    DiscountRule::BundleDiscount {
                        size,
                        percent: self.discount_value,
                    }
                })
            }
        }
    }

    fn segment_rule(&self) -> Option<SegmentRule> {
        match self.customer_segment {
            CustomerSegment::All => Some(SegmentRule::All),
            CustomerSegment::NewCustomers => Some(SegmentRule::NewCustomers),
            CustomerSegment::ReturningCustomers => Some(SegmentRule::ReturningCustomers),
            CustomerSegment::LoyaltyMilestone => {
                let visit_count = self.segment_config.visit_count?;
                (visit_count >= 1).then_some(SegmentRule::LoyaltyMilestone { visit_count })
            }
            CustomerSegment::InactiveCustomers => Some(SegmentRule::InactiveCustomers),
            CustomerSegment::Birthday => Some(SegmentRule::Birthday {
                days_before: self.segment_config.birthday_days_before?,
                days_after: self.segment_config.birthday_days_after?,
            }),
            CustomerSegment::SpecificCustomers => {
                let ids = &self.segment_config.customer_ids;
                (!ids.is_empty()).then(|| SegmentRule::SpecificCustomers {
                    customer_ids: ids.clone(),
                })
            }
        }
    }

    fn targeting_rule(&self) -> Option<TargetingRule> {
        match self.applies_to {
            AppliesTo::All => Some(TargetingRule::All),
            AppliesTo::Services => (!self.service_ids.is_empty()).then(|| TargetingRule::Services {
                ids: self.service_ids.clone(),
            }),
            AppliesTo::Categories => {
                (!self.category_names.is_empty()).then(|| TargetingRule::Categories {
                    names: self.category_names.clone(),
                })
            }
        }
    }

    fn code_gate(&self) -> Option<CodeGate> {
        match self.application_method {
            ApplicationMethod::AutoApply => Some(CodeGate::Auto),
            ApplicationMethod::Manual => Some(CodeGate::Manual),
            ApplicationMethod::PromoCode | ApplicationMethod::OneTimeCode => {
                let code = self.promo_code.clone()?;
                (!code.is_empty()).then(|| CodeGate::Code {
                    code,
                    one_time: self.application_method == ApplicationMethod::OneTimeCode,
                })
            }
        }
    }

    fn schedule(&self) -> Option<Schedule> {
        if self.valid_days_of_week.iter().any(|d| *d > 6) {
            return None;
        }
        let mut time_ranges = Vec::with_capacity(self.valid_time_ranges.len());
        for range in &self.valid_time_ranges {
            let start = parse_minute_of_day(&range.start)?;
            let end = parse_minute_of_day(&range.end)?;
            if start > end {
                return None;
            }
            time_ranges.push(MinuteRange { start, end });
        }
        Some(Schedule {
            days_of_week: self.valid_days_of_week.clone(),
            time_ranges,
        })
    }
}

fn in_percent_range(value: f64) -> bool {
    value > 0.0 && value <= 100.0
}

/// Parse `HH:MM` into minutes since midnight.
fn parse_minute_of_day(text: &str) -> Option<u16> {
    let (hours, minutes) = text.split_once(':')?;
    let hours: u16 = hours.parse().ok()?;
    let minutes: u16 = minutes.parse().ok()?;
    (hours <= 23 && minutes <= 59).then_some(hours * 60 + minutes)
}
