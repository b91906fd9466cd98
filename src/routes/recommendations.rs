use std::sync::Arc;

use axum::{extract::Path, extract::State, Json};

use crate::{
    auth::AuthUser,
    error::AppResult,
    models::RecommendationResult,
    services::reconcile,
};

use super::AppState;

/// Runs the external recommendation computation for a location and returns
/// the reconciled result.
///
/// The caller's bearer token is forwarded verbatim so the computation can
/// fetch the same user's favorites through the public API. A failure here is
/// terminal for this request only; favorites and visited state are untouched.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(location): Path<String>,
) -> AppResult<Json<RecommendationResult>> {
    tracing::info!(user = %auth.username, location = %location, "Recommendation requested");

    let raw = state.bridge.get_recommendations(&location, &auth.token).await?;
    let result = reconcile::reconcile(raw);

    tracing::info!(
        user = %auth.username,
        count = result.recommendations.len(),
        "Recommendations reconciled"
    );

    Ok(Json(result))
}
