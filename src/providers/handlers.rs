use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::{AuthUser, MaybeUser},
    auth::repo_types::Role,
    error::ApiError,
    providers::{
        dto::{
            CreateProviderRequest, CreateReviewRequest, ListProvidersQuery, ProviderListResponse,
            ProviderResponse, Review, ReviewResponse,
        },
        repo::ProviderFilter,
        repo_types::NewProvider,
    },
    state::AppState,
};

const MIN_DESCRIPTION_LEN: usize = 10;

pub fn provider_routes() -> Router<AppState> {
    Router::new()
        .route("/providers", get(list_providers).post(create_provider))
        .route("/providers/:id", get(get_provider))
        .route("/reviews", post(create_review))
}

#[instrument(skip(state))]
async fn list_providers(
    State(state): State<AppState>,
    MaybeUser(identity): MaybeUser,
    Query(query): Query<ListProvidersQuery>,
) -> Result<Json<ProviderListResponse>, ApiError> {
    let filter = ProviderFilter {
        q: query.q,
        category: query.category,
        location: query.location,
    };
    let mut providers = state.providers.search(&filter);

    // Logged-in callers with a stored location and no explicit location
    // filter see matching providers first. Anonymous callers get the plain
    // listing.
    if filter.location.is_none() {
        if let Some(identity) = identity {
            if let Some(home) = state
                .users
                .find_by_id(identity.id)
                .await
                .and_then(|u| u.location)
            {
                let home = home.to_lowercase();
                providers.sort_by_key(|p| !p.location.to_lowercase().contains(&home));
            }
        }
    }

    Ok(Json(ProviderListResponse { providers }))
}

#[instrument(skip(state))]
async fn get_provider(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProviderResponse>, ApiError> {
    let provider = state
        .providers
        .get(id)
        .ok_or_else(|| ApiError::NotFound("Provider not found".into()))?;
    Ok(Json(ProviderResponse { provider }))
}

#[instrument(skip(state, payload))]
async fn create_provider(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreateProviderRequest>,
) -> Result<(StatusCode, Json<ProviderResponse>), ApiError> {
    if !matches!(identity.role, Role::Provider | Role::Admin) {
        return Err(ApiError::Forbidden(
            "Only provider accounts can create listings".into(),
        ));
    }

    let name = payload.name.trim();
    let category = payload.category.trim();
    let description = payload.description.trim();
    if name.is_empty() || category.is_empty() {
        return Err(ApiError::Validation(
            "Name and category are required".into(),
        ));
    }
    if description.len() < MIN_DESCRIPTION_LEN {
        return Err(ApiError::Validation(format!(
            "Description must be at least {MIN_DESCRIPTION_LEN} characters"
        )));
    }

    let provider = state.providers.create(NewProvider {
        name: name.to_string(),
        category: category.to_string(),
        description: description.to_string(),
        location: payload
            .location
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| "Unknown Location".into()),
        pricing: payload.pricing.unwrap_or_default(),
        user_id: Some(identity.id),
    });

    info!(provider_id = %provider.id, user_id = %identity.id, "provider listing created");
    Ok((StatusCode::CREATED, Json(ProviderResponse { provider })))
}

#[instrument(skip(state, payload))]
async fn create_review(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), ApiError> {
    if !(1..=5).contains(&payload.rating) {
        return Err(ApiError::Validation(
            "Rating must be between 1 and 5".into(),
        ));
    }

    let provider = state
        .providers
        .add_review(payload.provider_id, payload.rating)
        .ok_or_else(|| ApiError::NotFound("Provider not found".into()))?;

    let review = Review {
        id: Uuid::new_v4(),
        provider_id: provider.id,
        customer_id: identity.id,
        rating: payload.rating,
        comment: payload.comment.unwrap_or_default(),
        created_at: OffsetDateTime::now_utc(),
    };

    info!(provider_id = %provider.id, rating = payload.rating, "review submitted");
    Ok((StatusCode::CREATED, Json(ReviewResponse { review, provider })))
}
