//! Reservation repository interface

use async_trait::async_trait;

use super::model::{NewReservation, Reservation};
use crate::domain::ids::ObjectId;
use crate::domain::DomainResult;

/// Optional equality filters; `None` means "any".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReservationFilter {
    pub charger_id: Option<ObjectId>,
    pub user_id: Option<ObjectId>,
}

impl ReservationFilter {
    pub fn is_empty(&self) -> bool {
        self.charger_id.is_none() && self.user_id.is_none()
    }

    pub fn matches(&self, reservation: &Reservation) -> bool {
        self.charger_id.map_or(true, |c| reservation.charger_id == c)
            && self.user_id.map_or(true, |u| reservation.user_id == u)
    }
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Persist a new reservation, assigning its id and timestamps.
    async fn create(&self, new: NewReservation) -> DomainResult<Reservation>;

    /// Fails with `NotFound` when absent.
    async fn get(&self, id: &ObjectId) -> DomainResult<Reservation>;

    async fn list(&self) -> DomainResult<Vec<Reservation>>;

    async fn list_filtered(&self, filter: ReservationFilter) -> DomainResult<Vec<Reservation>>;

    /// Replace the time window and refresh `modified`. Fails with `NotFound`
    /// when absent.
    async fn update(&self, id: &ObjectId, from: String, to: String) -> DomainResult<()>;

    /// Hard delete. Fails with `NotFound` when absent.
    async fn delete(&self, id: &ObjectId) -> DomainResult<()>;
}
