use async_trait::async_trait;
use thiserror::Error;
use crate::models::reservation::Reservation;

pub mod memory_repo;
pub mod postgres_repo;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a reservation named '{0}' already exists")]
    DuplicateName(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Keyed storage for reservations. Implementations reject a save that would
/// give two records the same name; lookups of missing keys yield `None`.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// All records ordered by id.
    async fn find_all(&self) -> StoreResult<Vec<Reservation>>;

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Reservation>>;

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Reservation>>;

    /// True when a record carrying `candidate.name` is already stored.
    async fn exists(&self, candidate: &Reservation) -> StoreResult<bool> {
        Ok(self.find_by_name(&candidate.name).await?.is_some())
    }

    async fn count(&self) -> StoreResult<u64>;

    /// Inserts when `record.id` is unset or unknown, otherwise replaces the record with that id.
    async fn save(&self, record: Reservation) -> StoreResult<Reservation>;

    /// Not exported over HTTP.
    async fn delete(&self, id: i64) -> StoreResult<Option<Reservation>>;
}
