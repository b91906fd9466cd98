use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::{
    db::UserStore,
    error::{AppError, AppResult},
    models::{Filters, RestaurantSnapshot, VisitRecord},
};

#[derive(Debug, Default, Clone)]
struct UserEntry {
    location: Option<String>,
    filters: Filters,
    favorites: Vec<RestaurantSnapshot>,
    visits: Vec<VisitRecord>,
}

/// In-memory user store.
///
/// Backs the integration tests and local development without a database.
/// Every mutation holds the single write lock for its whole duration, which
/// gives the same per-statement atomicity the Postgres store gets from
/// targeted SQL.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<HashMap<String, UserEntry>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(user: &str) -> AppError {
    AppError::NotFound(format!("User {} not found", user))
}

#[async_trait::async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, name: &str) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if inner.contains_key(name) {
            return Err(AppError::InvalidInput("Username already taken".to_string()));
        }
        inner.insert(name.to_string(), UserEntry::default());
        Ok(())
    }

    async fn favorites(&self, user: &str) -> AppResult<Vec<RestaurantSnapshot>> {
        let inner = self.inner.read().await;
        let entry = inner.get(user).ok_or_else(|| not_found(user))?;
        Ok(entry.favorites.clone())
    }

    async fn add_favorite(&self, user: &str, snapshot: &RestaurantSnapshot) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let entry = inner.get_mut(user).ok_or_else(|| not_found(user))?;
        entry.favorites.push(snapshot.clone());
        Ok(())
    }

    async fn remove_favorites_by_name(&self, user: &str, name: &str) -> AppResult<u64> {
        let mut inner = self.inner.write().await;
        let entry = inner.get_mut(user).ok_or_else(|| not_found(user))?;
        let before = entry.favorites.len();
        entry.favorites.retain(|fav| fav.name != name);
        Ok((before - entry.favorites.len()) as u64)
    }

    async fn visits(&self, user: &str) -> AppResult<Vec<VisitRecord>> {
        let inner = self.inner.read().await;
        let entry = inner.get(user).ok_or_else(|| not_found(user))?;
        let mut visits = entry.visits.clone();
        // Defensive sort on read; insertion order alone is not trusted.
        visits.sort_by(|a, b| b.visit_date.cmp(&a.visit_date));
        Ok(visits)
    }

    async fn upsert_visit(&self, user: &str, record: &VisitRecord) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let entry = inner.get_mut(user).ok_or_else(|| not_found(user))?;

        // Remove every match by id OR name before inserting, so a record
        // matching one row by id and another by name leaves one entry, not
        // two sharing a restaurant id.
        entry
            .visits
            .retain(|v| v.restaurant_id != record.restaurant_id && v.name != record.name);

        // New and replaced visits go to the front: most-recent-first by
        // construction.
        entry.visits.insert(0, record.clone());

        Ok(())
    }

    async fn update_visit(&self, user: &str, record: &VisitRecord) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let entry = inner.get_mut(user).ok_or_else(|| not_found(user))?;

        match entry
            .visits
            .iter_mut()
            .find(|v| v.restaurant_id == record.restaurant_id)
        {
            Some(visit) => {
                *visit = record.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn location(&self, user: &str) -> AppResult<Option<String>> {
        let inner = self.inner.read().await;
        let entry = inner.get(user).ok_or_else(|| not_found(user))?;
        Ok(entry.location.clone())
    }

    async fn set_location(&self, user: &str, location: &str) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let entry = inner.get_mut(user).ok_or_else(|| not_found(user))?;
        entry.location = Some(location.to_string());
        Ok(())
    }

    async fn filters(&self, user: &str) -> AppResult<Filters> {
        let inner = self.inner.read().await;
        let entry = inner.get(user).ok_or_else(|| not_found(user))?;
        Ok(entry.filters.clone())
    }

    async fn set_filters(&self, user: &str, filters: &Filters) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let entry = inner.get_mut(user).ok_or_else(|| not_found(user))?;
        entry.filters = filters.clone();
        Ok(())
    }
}
