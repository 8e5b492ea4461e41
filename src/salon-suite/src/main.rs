//! Salon Suite — salon-booking admin platform.
//!
//! This binary drives the promotion engine against seeded demo data: it
//! prices a draft appointment, prints the outcome, and commits the usage
//! counters through the ledger.

mod demo;

use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::Utc;
use clap::Parser;
use salon_core::booking::{AppointmentRecord, DraftAppointment, LineItem};
use salon_core::config::AppConfig;
use salon_ledger::UsageLedger;
use salon_promotions::PromotionEngine;
use salon_store::DocumentStore;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "salon-suite")]
#[command(about = "Salon booking admin platform — promotion engine preview")]
#[command(version)]
struct Cli {
    /// Promo code to submit with the draft appointment
    #[arg(long, env = "SALON_SUITE__PROMO_CODE")]
    promo_code: Option<String>,

    /// Demo customer profile: new, regular, vip, or inactive
    #[arg(long, default_value = "regular")]
    customer: String,

    /// Comma-separated service ids to book
    #[arg(long, default_value = "gel-manicure,classic-facial")]
    services: String,

    /// List seeded promotions and services, then exit
    #[arg(long, default_value_t = false)]
    list: bool,

    /// Price the draft without committing usage counters
    #[arg(long, default_value_t = false)]
    preview_only: bool,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "salon_suite=info".into()),
        )
        .init();

    let cli = Cli::parse();

    info!("Salon Suite starting up");

    let config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    info!(
        node_id = %config.node_id,
        inactivity_days = config.promotions.inactivity_days,
        commit_max_attempts = config.promotions.commit_max_attempts,
        "Configuration loaded"
    );

    let store = Arc::new(DocumentStore::new());
    let catalog = demo::seed_catalog();
    let engine = PromotionEngine::new(&config.promotions, store.clone(), catalog.clone());
    let ledger = UsageLedger::new(&config.promotions);
    demo::seed_promotions(engine.registry());

    if cli.list {
        for promotion in engine.registry().list() {
            println!(
                "{}  {:<18} {:?} {:?} code={}",
                promotion.id,
                promotion.name,
                promotion.status,
                promotion.discount_type,
                promotion.promo_code.as_deref().unwrap_or("-"),
            );
        }
        return Ok(());
    }

    let Some(customer) = demo::customer(&cli.customer) else {
        bail!("unknown demo customer profile: {}", cli.customer);
    };

    let mut items = Vec::new();
    for service_id in cli.services.split(',').map(str::trim) {
        let service = catalog
            .get(service_id)
            .with_context(|| format!("unknown service id: {service_id}"))?;
        items.push(LineItem {
            service_id: service.id,
            price_cents: service.price_cents,
            category: service.category,
        });
    }
    let draft =
        DraftAppointment::from_items(customer.id, items, Utc::now(), cli.promo_code.clone());

    let preview = engine.preview(&customer, &draft)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "customer": customer.id,
            "subtotal_cents": draft.subtotal_cents,
            "outcome": preview.outcome,
            "rejected": preview.rejected,
        }))?
    );

    if cli.preview_only {
        return Ok(());
    }

    let appointment_id = Uuid::new_v4();
    store.upsert_appointment(AppointmentRecord::from_draft(appointment_id, &draft));
    let result = ledger.commit(store.as_ref(), appointment_id, &preview.outcome)?;
    info!(
        appointment_id = %appointment_id,
        result = ?result,
        "Booking committed"
    );
    println!("committed appointment {appointment_id}: {result:?}");

    Ok(())
}
