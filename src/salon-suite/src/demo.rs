//! Demo seed data: a small service catalog, a set of representative
//! promotions, and a few customer profiles, so the preview runs out of
//! the box without a database.

use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, Utc};
use uuid::Uuid;

use salon_core::booking::CustomerSnapshot;
use salon_core::catalog::{CatalogService, ServiceCatalog};
use salon_core::promotion::{
    ApplicationMethod, AppliesTo, CustomerSegment, DiscountConfig, DiscountType, Promotion,
    PromotionStatus, SegmentConfig,
};
use salon_promotions::PromotionRegistry;

pub fn seed_catalog() -> Arc<ServiceCatalog> {
    let catalog = ServiceCatalog::new();
    let services = [
        ("gel-manicure", "Gel Manicure", 4500, "nails"),
        ("spa-pedicure", "Spa Pedicure", 5500, "nails"),
        ("classic-facial", "Classic Facial", 9000, "skin"),
        ("deep-cleanse-facial", "Deep Cleanse Facial", 12_000, "skin"),
        ("brow-shaping", "Brow Shaping", 2500, "brows"),
        ("swedish-massage", "Swedish Massage", 12_000, "massage"),
        ("hot-stone-massage", "Hot Stone Massage", 15_000, "massage"),
    ];
    for (id, name, price_cents, category) in services {
        catalog.insert(CatalogService {
            id: id.into(),
            name: name.into(),
            price_cents,
            category: category.into(),
        });
    }
    Arc::new(catalog)
}

pub fn seed_promotions(registry: &PromotionRegistry) {
    let now = Utc::now();

    registry.register(Promotion {
        name: "Spring Treat".into(),
        description: Some("10% off everything during the spring campaign".into()),
        status: PromotionStatus::Active,
        discount_type: DiscountType::Percentage,
        discount_value: 10.0,
        stackable: true,
        priority: 60,
        valid_from: Some(now - Duration::days(14)),
        valid_until: Some(now + Duration::days(30)),
        ..Default::default()
    });

    registry.register(Promotion {
        name: "Five Off".into(),
        description: Some("$5 off with code SAVE5".into()),
        status: PromotionStatus::Active,
        discount_type: DiscountType::FixedAmount,
        discount_value: 500.0,
        application_method: ApplicationMethod::PromoCode,
        promo_code: Some("SAVE5".into()),
        stackable: true,
        priority: 40,
        ..Default::default()
    });

    registry.register(Promotion {
        name: "Welcome".into(),
        description: Some("20% off a first visit with code WELCOME".into()),
        status: PromotionStatus::Active,
        discount_type: DiscountType::Percentage,
        discount_value: 20.0,
        application_method: ApplicationMethod::OneTimeCode,
        promo_code: Some("WELCOME".into()),
        customer_segment: CustomerSegment::NewCustomers,
        stackable: false,
        priority: 80,
        max_uses_per_customer: Some(1),
        ..Default::default()
    });

    registry.register(Promotion {
        name: "Birthday Brows".into(),
        description: Some("Free brow shaping in your birthday week".into()),
        status: PromotionStatus::Active,
        discount_type: DiscountType::FreeService,
        discount_config: DiscountConfig {
            free_service_id: Some("brow-shaping".into()),
            ..Default::default()
        },
        customer_segment: CustomerSegment::Birthday,
        segment_config: SegmentConfig {
            birthday_days_before: Some(7),
            birthday_days_after: Some(7),
            ..Default::default()
        },
        stackable: true,
        priority: 70,
        ..Default::default()
    });

    registry.register(Promotion {
        name: "Nail Bundle".into(),
        description: Some("15% off when booking two nail services".into()),
        status: PromotionStatus::Active,
        discount_type: DiscountType::BundleDiscount,
        discount_value: 15.0,
        discount_config: DiscountConfig {
            bundle_size: Some(2),
            ..Default::default()
        },
        applies_to: AppliesTo::Categories,
        category_names: vec!["nails".into()],
        stackable: true,
        priority: 55,
        ..Default::default()
    });

    registry.register(Promotion {
        name: "Massage Loyalty".into(),
        description: Some("Book two massages, the cheapest third is free".into()),
        status: PromotionStatus::Active,
        discount_type: DiscountType::BuyXGetY,
        discount_config: DiscountConfig {
            buy_quantity: Some(2),
            get_quantity: Some(1),
            ..Default::default()
        },
        applies_to: AppliesTo::Categories,
        category_names: vec!["massage".into()],
        stackable: false,
        priority: 75,
        max_uses: Some(500),
        ..Default::default()
    });
}

/// Deterministic demo customer profiles.
pub fn customer(kind: &str) -> Option<CustomerSnapshot> {
    let now = Utc::now();
    match kind {
        "new" => Some(CustomerSnapshot::new(Uuid::from_u128(0x1001))),
        "regular" => Some(CustomerSnapshot {
            visit_count: 6,
            last_visit: Some(now - Duration::days(20)),
            birthday: NaiveDate::from_ymd_opt(1991, 6, 14),
            ..CustomerSnapshot::new(Uuid::from_u128(0x1002))
        }),
        "vip" => Some(CustomerSnapshot {
            visit_count: 42,
            last_visit: Some(now - Duration::days(6)),
            birthday: now.date_naive().with_year(1988),
            ..CustomerSnapshot::new(Uuid::from_u128(0x1003))
        }),
        "inactive" => Some(CustomerSnapshot {
            visit_count: 3,
            last_visit: Some(now - Duration::days(200)),
            ..CustomerSnapshot::new(Uuid::from_u128(0x1004))
        }),
        _ => None,
    }
}
