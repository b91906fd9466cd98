use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use uuid::Uuid;

use crate::{
    db::UserStore,
    error::{AppError, AppResult},
    models::{Filters, RestaurantSnapshot, VisitRecord},
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// PostgreSQL-backed user store.
///
/// Favorites and visits live in their own tables, so every mutation is a
/// targeted statement (or a short transaction) rather than a read/modify/write
/// of a whole user document.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn user_id(&self, name: &str) -> AppResult<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        id.ok_or_else(|| AppError::NotFound(format!("User {} not found", name)))
    }

    fn decode_snapshot(value: serde_json::Value) -> AppResult<RestaurantSnapshot> {
        serde_json::from_value(value)
            .map_err(|e| AppError::Internal(format!("Corrupt favorite snapshot: {}", e)))
    }

    fn decode_visit_row(row: &sqlx::postgres::PgRow) -> AppResult<VisitRecord> {
        let images: serde_json::Value = row.try_get("images")?;
        Ok(VisitRecord {
            restaurant_id: row.try_get("restaurant_id")?,
            name: row.try_get("restaurant_name")?,
            rating: row.try_get("rating")?,
            review: row.try_get("review")?,
            images: serde_json::from_value(images)
                .map_err(|e| AppError::Internal(format!("Corrupt visit images: {}", e)))?,
            visit_date: row.try_get("visit_date")?,
        })
    }
}

#[async_trait::async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, name: &str) -> AppResult<()> {
        let result = sqlx::query("INSERT INTO users (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::InvalidInput("Username already taken".to_string()));
        }

        Ok(())
    }

    async fn favorites(&self, user: &str) -> AppResult<Vec<RestaurantSnapshot>> {
        let user_id = self.user_id(user).await?;

        let rows = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT snapshot FROM favorites WHERE user_id = $1 ORDER BY position",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::decode_snapshot).collect()
    }

    async fn add_favorite(&self, user: &str, snapshot: &RestaurantSnapshot) -> AppResult<()> {
        let user_id = self.user_id(user).await?;
        let json = serde_json::to_value(snapshot)
            .map_err(|e| AppError::Internal(format!("Snapshot serialization error: {}", e)))?;

        sqlx::query(
            "INSERT INTO favorites (user_id, restaurant_name, snapshot) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(&snapshot.name)
        .bind(json)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_favorites_by_name(&self, user: &str, name: &str) -> AppResult<u64> {
        let user_id = self.user_id(user).await?;

        let result =
            sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND restaurant_name = $2")
                .bind(user_id)
                .bind(name)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    async fn visits(&self, user: &str) -> AppResult<Vec<VisitRecord>> {
        let user_id = self.user_id(user).await?;

        let rows = sqlx::query(
            "SELECT restaurant_id, restaurant_name, rating, review, images, visit_date \
             FROM visits WHERE user_id = $1 ORDER BY visit_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::decode_visit_row).collect()
    }

    async fn upsert_visit(&self, user: &str, record: &VisitRecord) -> AppResult<()> {
        let images = serde_json::to_value(&record.images)
            .map_err(|e| AppError::Internal(format!("Image serialization error: {}", e)))?;

        let mut tx = self.pool.begin().await?;

        let user_id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE name = $1")
            .bind(user)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user)))?;

        // Either an id or a name match counts as "already visited". A delete
        // followed by one insert collapses the case where the id matches one
        // row and the name another; an update there would rewrite both rows
        // onto the same primary key.
        sqlx::query(
            "DELETE FROM visits WHERE user_id = $1 \
             AND (restaurant_id = $2 OR restaurant_name = $3)",
        )
        .bind(user_id)
        .bind(&record.restaurant_id)
        .bind(&record.name)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO visits (user_id, restaurant_id, restaurant_name, rating, review, \
             images, visit_date) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user_id)
        .bind(&record.restaurant_id)
        .bind(&record.name)
        .bind(record.rating)
        .bind(&record.review)
        .bind(&images)
        .bind(record.visit_date)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn update_visit(&self, user: &str, record: &VisitRecord) -> AppResult<bool> {
        let user_id = self.user_id(user).await?;
        let images = serde_json::to_value(&record.images)
            .map_err(|e| AppError::Internal(format!("Image serialization error: {}", e)))?;

        let result = sqlx::query(
            "UPDATE visits SET restaurant_name = $3, rating = $4, review = $5, images = $6, \
             visit_date = $7 WHERE user_id = $1 AND restaurant_id = $2",
        )
        .bind(user_id)
        .bind(&record.restaurant_id)
        .bind(&record.name)
        .bind(record.rating)
        .bind(&record.review)
        .bind(&images)
        .bind(record.visit_date)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn location(&self, user: &str) -> AppResult<Option<String>> {
        let row = sqlx::query_scalar::<_, Option<String>>("SELECT location FROM users WHERE name = $1")
            .bind(user)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(location) => Ok(location),
            None => Err(AppError::NotFound(format!("User {} not found", user))),
        }
    }

    async fn set_location(&self, user: &str, location: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET location = $2 WHERE name = $1")
            .bind(user)
            .bind(location)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", user)));
        }

        Ok(())
    }

    async fn filters(&self, user: &str) -> AppResult<Filters> {
        let row = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT filters FROM users WHERE name = $1",
        )
        .bind(user)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| AppError::Internal(format!("Corrupt filters: {}", e))),
            None => Err(AppError::NotFound(format!("User {} not found", user))),
        }
    }

    async fn set_filters(&self, user: &str, filters: &Filters) -> AppResult<()> {
        let json = serde_json::to_value(filters)
            .map_err(|e| AppError::Internal(format!("Filter serialization error: {}", e)))?;

        let result = sqlx::query("UPDATE users SET filters = $2 WHERE name = $1")
            .bind(user)
            .bind(json)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", user)));
        }

        Ok(())
    }
}
