//! Booking-side value types exchanged with the promotion engine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One booked service inside a draft appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub service_id: String,
    pub price_cents: i64,
    pub category: String,
}

/// A prospective appointment being priced. Ephemeral engine input; never
/// persisted in this form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftAppointment {
    pub customer_id: Uuid,
    pub items: Vec<LineItem>,
    pub subtotal_cents: i64,
    pub at: DateTime<Utc>,
    /// Code the customer submitted at booking time, if any.
    pub promo_code: Option<String>,
}

impl DraftAppointment {
    /// Build a draft from line items, deriving the subtotal.
    pub fn from_items(
        customer_id: Uuid,
        items: Vec<LineItem>,
        at: DateTime<Utc>,
        promo_code: Option<String>,
    ) -> Self {
        let subtotal_cents = items.iter().map(|i| i.price_cents).sum();
        Self {
            customer_id,
            items,
            subtotal_cents,
            at,
            promo_code,
        }
    }
}

/// Snapshot of a customer supplied by the Customer Directory collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    pub id: Uuid,
    /// Completed prior visits.
    pub visit_count: u32,
    pub last_visit: Option<DateTime<Utc>>,
    pub birthday: Option<NaiveDate>,
    pub blocked: bool,
}

impl CustomerSnapshot {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            visit_count: 0,
            last_visit: None,
            birthday: None,
            blocked: false,
        }
    }
}

// ─── Eligibility ────────────────────────────────────────────────────────────

/// Why a promotion did not apply to a draft appointment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RejectionReason {
    MalformedPromotion,
    CustomerBlocked,
    OutsideValidityWindow,
    DayOfWeekRestricted,
    TimeOfDayRestricted,
    MinPurchaseNotMet,
    GlobalCapExceeded,
    PerCustomerCapExceeded,
    CodeMismatch,
    CodeAlreadyRedeemed,
    ManualOnly,
    SegmentMismatch,
    NoTargetedItems,
    // Resolver-side drops
    CodeExclusive,
    SupersededByNonStackable,
    NotStackable,
    ExcludedByConflict,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::MalformedPromotion => "malformed-promotion",
            RejectionReason::CustomerBlocked => "customer-blocked",
            RejectionReason::OutsideValidityWindow => "outside-validity-window",
            RejectionReason::DayOfWeekRestricted => "day-of-week-restricted",
            RejectionReason::TimeOfDayRestricted => "time-of-day-restricted",
            RejectionReason::MinPurchaseNotMet => "min-purchase-not-met",
            RejectionReason::GlobalCapExceeded => "global-cap-exceeded",
            RejectionReason::PerCustomerCapExceeded => "per-customer-cap-exceeded",
            RejectionReason::CodeMismatch => "code-mismatch",
            RejectionReason::CodeAlreadyRedeemed => "code-already-redeemed",
            RejectionReason::ManualOnly => "manual-only",
            RejectionReason::SegmentMismatch => "segment-mismatch",
            RejectionReason::NoTargetedItems => "no-targeted-items",
            RejectionReason::CodeExclusive => "code-exclusive",
            RejectionReason::SupersededByNonStackable => "superseded-by-non-stackable",
            RejectionReason::NotStackable => "not-stackable",
            RejectionReason::ExcludedByConflict => "excluded-by-conflict",
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of evaluating one (customer, draft, promotion) triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub promotion_id: Uuid,
    pub admissible: bool,
    /// Indices into the draft's line items the promotion would touch.
    pub targeted: Vec<usize>,
    pub rejection: Option<RejectionReason>,
}

impl EligibilityResult {
    pub fn admissible(promotion_id: Uuid, targeted: Vec<usize>) -> Self {
        Self {
            promotion_id,
            admissible: true,
            targeted,
            rejection: None,
        }
    }

    pub fn rejected(promotion_id: Uuid, reason: RejectionReason) -> Self {
        Self {
            promotion_id,
            admissible: false,
            targeted: Vec::new(),
            rejection: Some(reason),
        }
    }
}

// ─── Discount outcome ───────────────────────────────────────────────────────

/// One promotion's contribution to a committed discount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppliedDiscount {
    pub promotion_id: Uuid,
    pub amount_cents: i64,
    pub targeted_service_ids: Vec<String>,
}

/// The resolved, computed discount for an appointment. Persisted on the
/// appointment record once committed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscountOutcome {
    pub applied: Vec<AppliedDiscount>,
    pub final_total_cents: i64,
    pub applied_at: DateTime<Utc>,
}

impl DiscountOutcome {
    pub fn total_discount_cents(&self) -> i64 {
        self.applied.iter().map(|a| a.amount_cents).sum()
    }
}

// ─── Appointment record ─────────────────────────────────────────────────────

/// Persisted appointment document, as far as the engine sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub items: Vec<LineItem>,
    pub subtotal_cents: i64,
    /// Price after discounts; equals the subtotal until an outcome commits.
    pub total_cents: i64,
    pub outcome: Option<DiscountOutcome>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AppointmentRecord {
    pub fn from_draft(id: Uuid, draft: &DraftAppointment) -> Self {
        let now = Utc::now();
        Self {
            id,
            customer_id: draft.customer_id,
            items: draft.items.clone(),
            subtotal_cents: draft.subtotal_cents,
            total_cents: draft.subtotal_cents,
            outcome: None,
            created_at: now,
            updated_at: now,
        }
    }
}
