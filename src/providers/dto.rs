use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::providers::repo_types::{Pricing, Provider};

/// Query parameters for the provider listing.
#[derive(Debug, Deserialize, Default)]
pub struct ListProvidersQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
}

/// Request body for creating a provider listing.
#[derive(Debug, Deserialize)]
pub struct CreateProviderRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub location: Option<String>,
    pub pricing: Option<Pricing>,
}

#[derive(Debug, Serialize)]
pub struct ProviderListResponse {
    pub providers: Vec<Provider>,
}

#[derive(Debug, Serialize)]
pub struct ProviderResponse {
    pub provider: Provider,
}

/// Request body for reviewing a provider.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub provider_id: Uuid,
    pub rating: u8,
    pub comment: Option<String>,
}

/// A submitted review echoed back with the re-rated provider. Reviews are not
/// stored; only their effect on the provider's average survives.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub customer_id: Uuid,
    pub rating: u8,
    pub comment: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub review: Review,
    pub provider: Provider,
}
