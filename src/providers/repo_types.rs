use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// How a provider prices their work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PricingType {
    PerHour,
    #[default]
    PerService,
    PerDay,
    PerProject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pricing {
    pub min: u32,
    pub max: u32,
    pub currency: String,
    #[serde(rename = "type")]
    pub kind: PricingType,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            min: 50,
            max: 150,
            currency: "USD".into(),
            kind: PricingType::PerService,
        }
    }
}

/// Service-provider listing. Rating is a running average over review_count
/// reviews.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: String,
    pub location: String,
    pub rating: f64,
    pub review_count: u32,
    pub pricing: Pricing,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
}

#[derive(Debug)]
pub struct NewProvider {
    pub name: String,
    pub category: String,
    pub description: String,
    pub location: String,
    pub pricing: Pricing,
    pub user_id: Option<Uuid>,
}
