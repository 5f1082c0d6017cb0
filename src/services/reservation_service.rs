use std::sync::Arc;
use tracing::{info, warn};
use crate::models::reservation::Reservation;
use crate::repositories::{ReservationRepository, StoreError, StoreResult};
use crate::services::event_handler::ReservationEventHandler;

pub const DEMO_NAMES: [&str; 6] = ["Bartek", "Marcel", "Bartosz", "Wojtek", "Krzysztof", "Daniel"];

#[derive(Debug, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(Reservation),
    Conflict,
    BlankName,
}

#[derive(Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated(Reservation),
    NotFound,
    Conflict,
    BlankName,
}

/// Reservation operations shared by every HTTP surface. Duplicate names are
/// reported as outcomes, never as errors.
#[derive(Clone)]
pub struct ReservationService {
    repository: Arc<dyn ReservationRepository>,
    events: ReservationEventHandler,
}

impl ReservationService {
    pub fn new(
        repository: Arc<dyn ReservationRepository>,
        events: ReservationEventHandler,
    ) -> Self {
        Self {
            repository,
            events,
        }
    }

    pub fn events(&self) -> &ReservationEventHandler {
        &self.events
    }

    pub async fn list(&self) -> StoreResult<Vec<Reservation>> {
        self.repository.find_all().await
    }

    pub async fn find_by_id(&self, id: i64) -> StoreResult<Option<Reservation>> {
        self.repository.find_by_id(id).await
    }

    pub async fn find_by_name(&self, name: &str) -> StoreResult<Option<Reservation>> {
        self.repository.find_by_name(name).await
    }

    /// The `exists` check gives the early conflict; a duplicate rejected by
    /// the store itself (two creates racing on one name) is a conflict too.
    pub async fn create(&self, candidate: Reservation) -> StoreResult<CreateOutcome> {
        info!("Creating: {:?}", candidate);
        if candidate.name.trim().is_empty() {
            return Ok(CreateOutcome::BlankName);
        }
        if self.repository.exists(&candidate).await? {
            return Ok(CreateOutcome::Conflict);
        }

        let record = Reservation {
            id: None,
            name: candidate.name,
        };
        match self.repository.save(record).await {
            Ok(saved) => Ok(CreateOutcome::Created(saved)),
            Err(StoreError::DuplicateName(name)) => {
                warn!("Reservation {} was created concurrently", name);
                Ok(CreateOutcome::Conflict)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn update(&self, id: i64, name: String) -> StoreResult<UpdateOutcome> {
        if name.trim().is_empty() {
            return Ok(UpdateOutcome::BlankName);
        }
        if self.repository.find_by_id(id).await?.is_none() {
            return Ok(UpdateOutcome::NotFound);
        }

        match self.repository.save(Reservation::with_id(id, name)).await {
            Ok(saved) => {
                self.events.after_save(&saved);
                Ok(UpdateOutcome::Updated(saved))
            }
            Err(StoreError::DuplicateName(_)) => Ok(UpdateOutcome::Conflict),
            Err(e) => Err(e),
        }
    }

    /// Administrative removal; no HTTP route reaches it.
    pub async fn delete(&self, id: i64) -> StoreResult<Option<Reservation>> {
        let removed = self.repository.delete(id).await?;
        if let Some(reservation) = &removed {
            self.events.after_delete(reservation);
        }
        Ok(removed)
    }

    /// Stores every demo name that is not already present.
    pub async fn seed_demo_data(&self) -> StoreResult<usize> {
        let mut seeded = 0;
        for name in DEMO_NAMES {
            match self.create(Reservation::new(name)).await? {
                CreateOutcome::Created(_) => seeded += 1,
                CreateOutcome::Conflict => info!("Demo reservation {} already present, skipping", name),
                CreateOutcome::BlankName => warn!("Demo reservation name is blank, skipping"),
            }
        }

        info!(
            "Seeded {} demo reservations, store now holds {}",
            seeded,
            self.repository.count().await?
        );
        Ok(seeded)
    }
}
