use chrono::Utc;

use crate::{
    db::UserStore,
    error::{AppError, AppResult},
    models::VisitRecord,
};

/// Upper bound on review length, enforced on both the create and update
/// paths. (The system this replaces only checked it on update; that gap was
/// judged a bug.)
pub const MAX_REVIEW_CHARS: usize = 300;

/// Unvalidated visit fields as they arrive from the client.
#[derive(Debug, Default, Clone)]
pub struct VisitInput {
    pub restaurant_id: Option<String>,
    pub name: Option<String>,
    pub rating: Option<i16>,
    pub review: Option<String>,
    pub images: Option<Vec<String>>,
}

/// Validates visit input and stamps it with the current time.
///
/// `restaurant_id`, `name` and `rating` are required; rating is the one
/// field with no implicit default. `visit_date` is always refreshed so an
/// upsert of an old record moves it to the front of the ledger.
fn validate(input: VisitInput) -> AppResult<VisitRecord> {
    let restaurant_id = input
        .restaurant_id
        .filter(|id| !id.is_empty())
        .ok_or_else(missing_field)?;
    let name = input.name.filter(|n| !n.is_empty()).ok_or_else(missing_field)?;
    let rating = input.rating.ok_or_else(missing_field)?;

    if !(1..=5).contains(&rating) {
        return Err(AppError::InvalidInput(
            "Rating must be between 1 and 5".to_string(),
        ));
    }

    let review = input.review.unwrap_or_default();
    if review.chars().count() > MAX_REVIEW_CHARS {
        return Err(AppError::InvalidInput(format!(
            "Review must be {} characters or less",
            MAX_REVIEW_CHARS
        )));
    }

    Ok(VisitRecord {
        restaurant_id,
        name,
        rating,
        review,
        images: input.images.unwrap_or_default(),
        visit_date: Utc::now(),
    })
}

fn missing_field() -> AppError {
    AppError::InvalidInput("Missing required fields".to_string())
}

/// Records a visit, replacing any existing record for the same restaurant.
///
/// An existing record is matched by restaurant id OR name, so a restaurant
/// renamed client-side cannot produce a duplicate entry. Returns the full
/// updated ledger, most recent first.
pub async fn record_visit(
    store: &dyn UserStore,
    user: &str,
    input: VisitInput,
) -> AppResult<Vec<VisitRecord>> {
    let record = validate(input)?;

    store.upsert_visit(user, &record).await?;
    tracing::info!(
        user = %user,
        restaurant_id = %record.restaurant_id,
        rating = record.rating,
        "Visit recorded"
    );

    store.visits(user).await
}

/// Update-only path: the record must already exist under this restaurant id.
pub async fn update_visit(
    store: &dyn UserStore,
    user: &str,
    input: VisitInput,
) -> AppResult<Vec<VisitRecord>> {
    let record = validate(input)?;

    if !store.update_visit(user, &record).await? {
        return Err(AppError::NotFound(
            "Restaurant review not found".to_string(),
        ));
    }

    tracing::info!(
        user = %user,
        restaurant_id = %record.restaurant_id,
        "Visit review updated"
    );

    store.visits(user).await
}

/// The visit ledger, sorted descending by visit date.
pub async fn list_visits(store: &dyn UserStore, user: &str) -> AppResult<Vec<VisitRecord>> {
    store.visits(user).await
}
