use crate::{
    db::UserStore,
    error::{AppError, AppResult},
    models::RestaurantSnapshot,
};

/// Toggles a restaurant in the user's favorites list.
///
/// Membership is keyed by restaurant name: if no favorite with that name
/// exists the snapshot is appended, otherwise every favorite carrying the
/// name is removed. Repeated identical calls alternate state.
///
/// Returns the full updated list so the caller can render it without a
/// second fetch.
pub async fn toggle_favorite(
    store: &dyn UserStore,
    user: &str,
    snapshot: RestaurantSnapshot,
) -> AppResult<Vec<RestaurantSnapshot>> {
    if snapshot.name.is_empty() {
        return Err(AppError::InvalidInput(
            "Restaurant name is required".to_string(),
        ));
    }

    // The delete is the membership test: a zero count means it wasn't there.
    // Two concurrent toggles of an absent name can both see zero and both
    // insert; the duplicate lasts until the next toggle removes the pair.
    let removed = store.remove_favorites_by_name(user, &snapshot.name).await?;

    if removed == 0 {
        store.add_favorite(user, &snapshot).await?;
        tracing::info!(user = %user, restaurant = %snapshot.name, "Favorite added");
    } else {
        tracing::info!(user = %user, restaurant = %snapshot.name, removed, "Favorite removed");
    }

    store.favorites(user).await
}
