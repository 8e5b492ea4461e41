//! In-memory service catalog — `service_id -> {price, category}` lookup.
//!
//! Production: fed from the services collection of the document DB. The
//! engine only ever reads it.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// A bookable salon service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogService {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub category: String,
}

/// Thread-safe service lookup backed by `DashMap`.
pub struct ServiceCatalog {
    services: DashMap<String, CatalogService>,
}

impl ServiceCatalog {
    pub fn new() -> Self {
        Self {
            services: DashMap::new(),
        }
    }

    pub fn insert(&self, service: CatalogService) {
        self.services.insert(service.id.clone(), service);
    }

    pub fn get(&self, service_id: &str) -> Option<CatalogService> {
        self.services.get(service_id).map(|s| s.value().clone())
    }

    pub fn price_cents(&self, service_id: &str) -> Option<i64> {
        self.services.get(service_id).map(|s| s.price_cents)
    }

    pub fn contains(&self, service_id: &str) -> bool {
        self.services.contains_key(service_id)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        Self::new()
    }
}
