//! Per-operation deadlines for any reservation store
//!
//! Single-record operations share the write bound, listings get the read
//! bound. When a deadline passes the in-flight call is dropped; whether a
//! write reached the backend is unknown to the caller.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::{
    DomainError, DomainResult, NewReservation, ObjectId, Reservation, ReservationFilter,
    ReservationRepository,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreTimeouts {
    /// create / get / update / delete
    pub single: Duration,
    /// list / list_filtered
    pub listing: Duration,
}

impl Default for StoreTimeouts {
    fn default() -> Self {
        Self {
            single: Duration::from_secs(5),
            listing: Duration::from_secs(10),
        }
    }
}

pub struct TimedReservationRepository {
    inner: Arc<dyn ReservationRepository>,
    timeouts: StoreTimeouts,
}

impl TimedReservationRepository {
    pub fn new(inner: Arc<dyn ReservationRepository>, timeouts: StoreTimeouts) -> Self {
        Self { inner, timeouts }
    }
}

async fn bounded<T>(
    operation: &'static str,
    after: Duration,
    fut: impl Future<Output = DomainResult<T>>,
) -> DomainResult<T> {
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, timeout_ms = after.as_millis() as u64, "Store operation timed out");
            Err(DomainError::Timeout { operation, after })
        }
    }
}

#[async_trait]
impl ReservationRepository for TimedReservationRepository {
    async fn create(&self, new: NewReservation) -> DomainResult<Reservation> {
        bounded("create", self.timeouts.single, self.inner.create(new)).await
    }

    async fn get(&self, id: &ObjectId) -> DomainResult<Reservation> {
        bounded("get", self.timeouts.single, self.inner.get(id)).await
    }

    async fn list(&self) -> DomainResult<Vec<Reservation>> {
        bounded("list", self.timeouts.listing, self.inner.list()).await
    }

    async fn list_filtered(&self, filter: ReservationFilter) -> DomainResult<Vec<Reservation>> {
        bounded("list_filtered", self.timeouts.listing, self.inner.list_filtered(filter)).await
    }

    async fn update(&self, id: &ObjectId, from: String, to: String) -> DomainResult<()> {
        bounded("update", self.timeouts.single, self.inner.update(id, from, to)).await
    }

    async fn delete(&self, id: &ObjectId) -> DomainResult<()> {
        bounded("delete", self.timeouts.single, self.inner.delete(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::InMemoryReservationRepository;

    /// Delegates to memory but sleeps before every listing.
    struct SlowListings {
        inner: InMemoryReservationRepository,
        delay: Duration,
    }

    #[async_trait]
    impl ReservationRepository for SlowListings {
        async fn create(&self, new: NewReservation) -> DomainResult<Reservation> {
            self.inner.create(new).await
        }
        async fn get(&self, id: &ObjectId) -> DomainResult<Reservation> {
            self.inner.get(id).await
        }
        async fn list(&self) -> DomainResult<Vec<Reservation>> {
            tokio::time::sleep(self.delay).await;
            self.inner.list().await
        }
        async fn list_filtered(&self, filter: ReservationFilter) -> DomainResult<Vec<Reservation>> {
            tokio::time::sleep(self.delay).await;
            self.inner.list_filtered(filter).await
        }
        async fn update(&self, id: &ObjectId, from: String, to: String) -> DomainResult<()> {
            self.inner.update(id, from, to).await
        }
        async fn delete(&self, id: &ObjectId) -> DomainResult<()> {
            self.inner.delete(id).await
        }
    }

    fn sample() -> NewReservation {
        NewReservation {
            charger_id: ObjectId::new(),
            user_id: ObjectId::new(),
            from: "2024-05-01T10:00:00Z".into(),
            to: "2024-05-01T11:00:00Z".into(),
        }
    }

    #[test]
    fn defaults_are_five_and_ten_seconds() {
        let t = StoreTimeouts::default();
        assert_eq!(t.single, Duration::from_secs(5));
        assert_eq!(t.listing, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn slow_listing_times_out() {
        let slow = Arc::new(SlowListings {
            inner: InMemoryReservationRepository::new(),
            delay: Duration::from_millis(200),
        });
        let timed = TimedReservationRepository::new(
            slow,
            StoreTimeouts {
                single: Duration::from_millis(50),
                listing: Duration::from_millis(20),
            },
        );

        // single-record operations are unaffected
        let created = timed.create(sample()).await.unwrap();
        assert_eq!(timed.get(&created.id).await.unwrap(), created);

        let err = timed.list().await.unwrap_err();
        assert!(matches!(err, DomainError::Timeout { operation: "list", .. }));

        let err = timed.list_filtered(ReservationFilter::default()).await.unwrap_err();
        assert!(matches!(err, DomainError::Timeout { operation: "list_filtered", .. }));
    }

    #[tokio::test]
    async fn errors_from_inner_pass_through() {
        let timed = TimedReservationRepository::new(
            Arc::new(InMemoryReservationRepository::new()),
            StoreTimeouts::default(),
        );
        let err = timed.delete(&ObjectId::new()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
