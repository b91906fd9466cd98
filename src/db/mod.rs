use crate::{
    error::AppResult,
    models::{Filters, RestaurantSnapshot, VisitRecord},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::{create_pool, PgUserStore};

/// Persistence seam for per-user state.
///
/// Every method is a targeted mutation or read against one user's record;
/// there is deliberately no "fetch whole record / save whole record" pair, so
/// concurrent callers cannot overwrite each other's list edits wholesale.
/// All user-keyed operations fail with `NotFound` when the user is absent.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user with an empty record. Names are unique, case-sensitive.
    async fn create_user(&self, name: &str) -> AppResult<()>;

    /// Favorites in insertion order (oldest first).
    async fn favorites(&self, user: &str) -> AppResult<Vec<RestaurantSnapshot>>;

    /// Append a snapshot to the favorites list.
    async fn add_favorite(&self, user: &str, snapshot: &RestaurantSnapshot) -> AppResult<()>;

    /// Remove every favorite whose name matches exactly; returns how many
    /// were removed. A zero count is the toggle's "wasn't there, add it" signal.
    async fn remove_favorites_by_name(&self, user: &str, name: &str) -> AppResult<u64>;

    /// Visit records, most recent first.
    async fn visits(&self, user: &str) -> AppResult<Vec<VisitRecord>>;

    /// Insert or replace the visit matching by restaurant id OR name.
    /// When the id matches one existing row and the name another, both are
    /// replaced by the single new record — the ledger never holds two
    /// entries for one restaurant.
    async fn upsert_visit(&self, user: &str, record: &VisitRecord) -> AppResult<()>;

    /// Replace the visit matching by restaurant id only. Returns false if no
    /// existing record matched.
    async fn update_visit(&self, user: &str, record: &VisitRecord) -> AppResult<bool>;

    /// Stored location, if the user ever set one.
    async fn location(&self, user: &str) -> AppResult<Option<String>>;

    async fn set_location(&self, user: &str, location: &str) -> AppResult<()>;

    async fn filters(&self, user: &str) -> AppResult<Filters>;

    async fn set_filters(&self, user: &str, filters: &Filters) -> AppResult<()>;
}
