use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    models::{Filters, RestaurantSnapshot, VisitRecord, DEFAULT_LOCATION},
    services::{favorites, visits},
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct ToggleFavoriteRequest {
    pub restaurant: Option<RestaurantSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<RestaurantSnapshot>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitRequest {
    #[serde(default)]
    pub restaurant_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rating: Option<i16>,
    #[serde(default)]
    pub review: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

impl From<VisitRequest> for visits::VisitInput {
    fn from(request: VisitRequest) -> Self {
        Self {
            restaurant_id: request.restaurant_id,
            name: request.name,
            rating: request.rating,
            review: request.review,
            images: request.images,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LocationUpdate {
    pub location: String,
}

#[derive(Debug, Deserialize)]
pub struct FiltersUpdate {
    pub filters: Filters,
}

#[derive(Debug, Deserialize)]
pub struct GuestLocationQuery {
    #[serde(default)]
    pub location: Option<String>,
}

// Handlers

/// The caller's favorites, in insertion order.
pub async fn get_favorites(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> AppResult<Json<Vec<RestaurantSnapshot>>> {
    let favorites = state.store.favorites(&auth.username).await?;
    Ok(Json(favorites))
}

/// Toggles a restaurant in the caller's favorites and returns the new list.
pub async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(request): Json<ToggleFavoriteRequest>,
) -> AppResult<Json<FavoritesResponse>> {
    let restaurant = request
        .restaurant
        .ok_or_else(|| AppError::InvalidInput("Restaurant data is required".to_string()))?;

    let favorites =
        favorites::toggle_favorite(state.store.as_ref(), &auth.username, restaurant).await?;

    Ok(Json(FavoritesResponse { favorites }))
}

/// Visited restaurants, most recent first.
pub async fn get_visited(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> AppResult<Json<Vec<VisitRecord>>> {
    let visited = visits::list_visits(state.store.as_ref(), &auth.username).await?;
    Ok(Json(visited))
}

/// Adds or replaces a visit record, returning the full updated ledger.
pub async fn record_visit(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(request): Json<VisitRequest>,
) -> AppResult<Json<Vec<VisitRecord>>> {
    let visited =
        visits::record_visit(state.store.as_ref(), &auth.username, request.into()).await?;
    Ok(Json(visited))
}

/// Update-only path; 404s when no record exists for the restaurant id.
pub async fn update_visit(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(request): Json<VisitRequest>,
) -> AppResult<Json<Vec<VisitRecord>>> {
    let visited =
        visits::update_visit(state.store.as_ref(), &auth.username, request.into()).await?;
    Ok(Json(visited))
}

pub async fn get_location(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> AppResult<Json<Value>> {
    let location = state
        .store
        .location(&auth.username)
        .await?
        .unwrap_or_else(|| DEFAULT_LOCATION.to_string());

    Ok(Json(json!({ "location": location })))
}

pub async fn set_location(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(update): Json<LocationUpdate>,
) -> AppResult<Json<Value>> {
    state
        .store
        .set_location(&auth.username, &update.location)
        .await?;

    Ok(Json(json!({
        "message": "Location updated successfully",
        "location": update.location,
    })))
}

pub async fn get_filters(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> AppResult<Json<Value>> {
    let filters = state.store.filters(&auth.username).await?;
    Ok(Json(json!({ "filters": filters })))
}

pub async fn set_filters(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(update): Json<FiltersUpdate>,
) -> AppResult<Json<Value>> {
    state.store.set_filters(&auth.username, &update.filters).await?;

    Ok(Json(json!({
        "message": "Filters updated successfully",
        "filters": update.filters,
    })))
}

/// Guest sessions get a location from the query string or the default.
pub async fn guest_location(Query(query): Query<GuestLocationQuery>) -> Json<Value> {
    let location = query
        .location
        .unwrap_or_else(|| DEFAULT_LOCATION.to_string());
    Json(json!({ "location": location }))
}

/// Guest sessions get empty default filters.
pub async fn guest_filters() -> Json<Value> {
    Json(json!({ "filters": Filters::default() }))
}
