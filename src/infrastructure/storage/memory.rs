//! In-memory reservation store for development and testing

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use crate::domain::{
    DomainError, DomainResult, NewReservation, ObjectId, Reservation, ReservationFilter,
    ReservationRepository,
};

pub struct InMemoryReservationRepository {
    reservations: DashMap<ObjectId, Reservation>,
}

impl InMemoryReservationRepository {
    pub fn new() -> Self {
        Self {
            reservations: DashMap::new(),
        }
    }

    fn collect(&self, filter: ReservationFilter) -> Vec<Reservation> {
        let mut out: Vec<Reservation> = self
            .reservations
            .iter()
            .filter(|e| filter.matches(e.value()))
            .map(|e| e.value().clone())
            .collect();
        // second, then process counter: creation order within one process
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }
}

impl Default for InMemoryReservationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReservationRepository for InMemoryReservationRepository {
    async fn create(&self, new: NewReservation) -> DomainResult<Reservation> {
        let reservation = Reservation::create(new, Utc::now());
        self.reservations.insert(reservation.id, reservation.clone());
        Ok(reservation)
    }

    async fn get(&self, id: &ObjectId) -> DomainResult<Reservation> {
        self.reservations
            .get(id)
            .map(|r| r.clone())
            .ok_or_else(|| DomainError::reservation_not_found(id.to_hex()))
    }

    async fn list(&self) -> DomainResult<Vec<Reservation>> {
        Ok(self.collect(ReservationFilter::default()))
    }

    async fn list_filtered(&self, filter: ReservationFilter) -> DomainResult<Vec<Reservation>> {
        Ok(self.collect(filter))
    }

    async fn update(&self, id: &ObjectId, from: String, to: String) -> DomainResult<()> {
        let mut entry = self
            .reservations
            .get_mut(id)
            .ok_or_else(|| DomainError::reservation_not_found(id.to_hex()))?;
        entry.reschedule(from, to, Utc::now());
        Ok(())
    }

    async fn delete(&self, id: &ObjectId) -> DomainResult<()> {
        self.reservations
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::reservation_not_found(id.to_hex()))
    }
}
