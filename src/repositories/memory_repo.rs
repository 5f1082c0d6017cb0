use std::collections::BTreeMap;
use async_trait::async_trait;
use tokio::sync::RwLock;
use crate::models::reservation::Reservation;
use crate::repositories::{ReservationRepository, StoreError, StoreResult};

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, String>,
}

impl Table {
    fn name_taken_by_other(&self, name: &str, id: Option<i64>) -> bool {
        self.rows
            .iter()
            .any(|(row_id, row_name)| row_name == name && Some(*row_id) != id)
    }

    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Process-local table used when no database is configured. The uniqueness
/// check and the write happen under one lock.
#[derive(Default)]
pub struct InMemoryRepo {
    table: RwLock<Table>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReservationRepository for InMemoryRepo {
    async fn find_all(&self) -> StoreResult<Vec<Reservation>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .map(|(id, name)| Reservation::with_id(*id, name.clone()))
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Reservation>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .get(&id)
            .map(|name| Reservation::with_id(id, name.clone())))
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Reservation>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .find(|(_, row_name)| row_name.as_str() == name)
            .map(|(id, row_name)| Reservation::with_id(*id, row_name.clone())))
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.table.read().await.rows.len() as u64)
    }

    async fn save(&self, record: Reservation) -> StoreResult<Reservation> {
        let mut table = self.table.write().await;
        if table.name_taken_by_other(&record.name, record.id) {
            return Err(StoreError::DuplicateName(record.name));
        }

        let id = match record.id {
            Some(id) => {
                table.next_id = table.next_id.max(id);
                id
            }
            None => table.allocate_id(),
        };
        table.rows.insert(id, record.name.clone());

        Ok(Reservation::with_id(id, record.name))
    }

    async fn delete(&self, id: i64) -> StoreResult<Option<Reservation>> {
        let mut table = self.table.write().await;
        Ok(table
            .rows
            .remove(&id)
            .map(|name| Reservation::with_id(id, name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_assigns_increasing_ids() {
        let repo = InMemoryRepo::new();
        let first = repo.save(Reservation::new("Bartek")).await.unwrap();
        let second = repo.save(Reservation::new("Marcel")).await.unwrap();
        assert_eq!(first.id, Some(1));
        assert_eq!(second.id, Some(2));
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn save_rejects_duplicate_name_without_mutation() {
        let repo = InMemoryRepo::new();
        repo.save(Reservation::new("Bartek")).await.unwrap();

        let err = repo.save(Reservation::new("Bartek")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName(name) if name == "Bartek"));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn names_are_case_sensitive() {
        let repo = InMemoryRepo::new();
        repo.save(Reservation::new("daniel")).await.unwrap();
        repo.save(Reservation::new("Daniel")).await.unwrap();
        assert!(repo.find_by_name("DANIEL").await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn update_keeps_id_and_checks_other_rows() {
        let repo = InMemoryRepo::new();
        let bartek = repo.save(Reservation::new("Bartek")).await.unwrap();
        let marcel = repo.save(Reservation::new("Marcel")).await.unwrap();

        let renamed = repo
            .save(Reservation::with_id(bartek.id.unwrap(), "Bartosz"))
            .await
            .unwrap();
        assert_eq!(renamed.id, bartek.id);
        assert!(repo.find_by_name("Bartek").await.unwrap().is_none());

        let clash = repo
            .save(Reservation::with_id(marcel.id.unwrap(), "Bartosz"))
            .await;
        assert!(matches!(clash, Err(StoreError::DuplicateName(_))));

        // re-saving a record under its own name is not a clash
        repo.save(Reservation::with_id(marcel.id.unwrap(), "Marcel"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn explicit_id_advances_sequence() {
        let repo = InMemoryRepo::new();
        repo.save(Reservation::with_id(10, "Wojtek")).await.unwrap();
        let next = repo.save(Reservation::new("Krzysztof")).await.unwrap();
        assert_eq!(next.id, Some(11));
    }

    #[tokio::test]
    async fn delete_and_missing_lookups() {
        let repo = InMemoryRepo::new();
        let saved = repo.save(Reservation::new("Daniel")).await.unwrap();
        let removed = repo.delete(saved.id.unwrap()).await.unwrap();
        assert_eq!(removed, Some(saved.clone()));
        assert!(repo.delete(saved.id.unwrap()).await.unwrap().is_none());
        assert!(repo.find_by_id(saved.id.unwrap()).await.unwrap().is_none());
        assert!(!repo.exists(&Reservation::new("Daniel")).await.unwrap());
    }
}
