//! Reservation use cases
//!
//! HTTP handlers stay thin and delegate here. Identity failures on the
//! create paths are reported through [`ReservationOutcome`], every other
//! failure is returned as a [`DomainError`].

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::{
    select_nearest, ChargerDirectory, DomainError, DomainResult, IdentityResolver, Location,
    NewReservation, ObjectId, Reservation, ReservationFilter, ReservationRepository,
};

pub const STATUS_OK: &str = "Ok";
pub const STATUS_AUTHORIZATION_FAILED: &str = "Authorization failed";

/// Result of a use case that requires an authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationOutcome {
    Reserved(Reservation),
    AuthorizationFailed,
}

impl ReservationOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            Self::Reserved(_) => STATUS_OK,
            Self::AuthorizationFailed => STATUS_AUTHORIZATION_FAILED,
        }
    }

    pub fn reservation(&self) -> Option<&Reservation> {
        match self {
            Self::Reserved(r) => Some(r),
            Self::AuthorizationFailed => None,
        }
    }

    pub fn into_reservation(self) -> Option<Reservation> {
        match self {
            Self::Reserved(r) => Some(r),
            Self::AuthorizationFailed => None,
        }
    }
}

pub struct ReservationService {
    store: Arc<dyn ReservationRepository>,
    directory: Arc<dyn ChargerDirectory>,
    identity: Arc<dyn IdentityResolver>,
}

impl ReservationService {
    pub fn new(
        store: Arc<dyn ReservationRepository>,
        directory: Arc<dyn ChargerDirectory>,
        identity: Arc<dyn IdentityResolver>,
    ) -> Self {
        Self {
            store,
            directory,
            identity,
        }
    }

    // ── Create ──────────────────────────────────────────────────

    /// Reserve `charger_id` for the caller identified by `credential`.
    pub async fn create_reservation(
        &self,
        from: &str,
        to: &str,
        credential: &str,
        charger_id: &str,
    ) -> DomainResult<ReservationOutcome> {
        let Some(user_id) = self.authenticate("CreateReservation", credential).await else {
            return Ok(ReservationOutcome::AuthorizationFailed);
        };

        let new = parse_reference("chargerID", charger_id)
            .and_then(|charger_id| new_reservation(charger_id, &user_id, from, to))
            .map_err(|e| log_failure("CreateReservation", e))?;

        let reservation = self
            .store
            .create(new)
            .await
            .map_err(|e| log_failure("CreateReservation", e))?;

        metrics::counter!("reservations_created_total", "path" => "explicit").increment(1);
        info!(method = "CreateReservation", id = %reservation.id, charger = %reservation.charger_id, "Reservation created");
        Ok(ReservationOutcome::Reserved(reservation))
    }

    /// Reserve whichever charger from the directory is closest to `location`.
    pub async fn create_reservation_at_nearest(
        &self,
        credential: &str,
        from: &str,
        to: &str,
        location: Location,
    ) -> DomainResult<ReservationOutcome> {
        const METHOD: &str = "ReservationClosest";

        let Some(user_id) = self.authenticate(METHOD, credential).await else {
            return Ok(ReservationOutcome::AuthorizationFailed);
        };

        let chargers = self
            .directory
            .fetch_chargers()
            .await
            .map_err(|e| log_failure(METHOD, e))?;

        let nearest = select_nearest(location, &chargers).map_err(|e| log_failure(METHOD, e))?;

        let new = new_reservation(nearest.id, &user_id, from, to).map_err(|e| log_failure(METHOD, e))?;

        let reservation = self
            .store
            .create(new)
            .await
            .map_err(|e| log_failure(METHOD, e))?;

        metrics::counter!("reservations_created_total", "path" => "nearest").increment(1);
        info!(
            method = METHOD,
            id = %reservation.id,
            charger = %reservation.charger_id,
            candidates = chargers.len(),
            "Reservation created at nearest charger"
        );
        Ok(ReservationOutcome::Reserved(reservation))
    }

    // ── Read ────────────────────────────────────────────────────

    pub async fn get_reservation(&self, id: &str) -> DomainResult<Reservation> {
        let id = parse_reservation_id(id).map_err(|e| log_failure("GetReservation", e))?;
        let reservation = self
            .store
            .get(&id)
            .await
            .map_err(|e| log_failure("GetReservation", e))?;
        info!(method = "GetReservation", id = %reservation.id);
        Ok(reservation)
    }

    pub async fn get_reservations(&self) -> DomainResult<Vec<Reservation>> {
        let reservations = self
            .store
            .list()
            .await
            .map_err(|e| log_failure("GetReservations", e))?;
        info!(method = "GetReservations", count = reservations.len());
        Ok(reservations)
    }

    /// Empty or absent filters match everything.
    pub async fn get_reservations_filter(
        &self,
        charger_id: Option<&str>,
        user_id: Option<&str>,
    ) -> DomainResult<Vec<Reservation>> {
        const METHOD: &str = "GetReservationsFilter";

        let filter = ReservationFilter {
            charger_id: parse_optional_reference("chargerID", charger_id).map_err(|e| log_failure(METHOD, e))?,
            user_id: parse_optional_reference("userID", user_id).map_err(|e| log_failure(METHOD, e))?,
        };
        let reservations = self
            .store
            .list_filtered(filter)
            .await
            .map_err(|e| log_failure(METHOD, e))?;
        info!(method = METHOD, count = reservations.len());
        Ok(reservations)
    }

    // ── Mutate ──────────────────────────────────────────────────

    pub async fn update_reservation(&self, id: &str, from: &str, to: &str) -> DomainResult<&'static str> {
        let id = parse_reservation_id(id).map_err(|e| log_failure("UpdateReservation", e))?;
        self.store
            .update(&id, from.to_string(), to.to_string())
            .await
            .map_err(|e| log_failure("UpdateReservation", e))?;
        info!(method = "UpdateReservation", id = %id, "Reservation updated");
        Ok(STATUS_OK)
    }

    pub async fn delete_reservation(&self, id: &str) -> DomainResult<&'static str> {
        let id = parse_reservation_id(id).map_err(|e| log_failure("DeleteReservation", e))?;
        self.store
            .delete(&id)
            .await
            .map_err(|e| log_failure("DeleteReservation", e))?;
        info!(method = "DeleteReservation", id = %id, "Reservation deleted");
        Ok(STATUS_OK)
    }

    // ── Helpers ─────────────────────────────────────────────────

    async fn authenticate(&self, method: &'static str, credential: &str) -> Option<String> {
        match self.identity.resolve_identity(credential).await {
            Ok(user_id) => Some(user_id),
            Err(reason) => {
                warn!(method, %reason, "Authorization failed");
                None
            }
        }
    }
}

fn log_failure(method: &'static str, err: DomainError) -> DomainError {
    metrics::counter!("reservation_errors_total", "method" => method).increment(1);
    if err.is_transient() {
        warn!(method, error = %err, "Upstream dependency failed");
    } else {
        error!(method, error = %err);
    }
    err
}

fn new_reservation(charger_id: ObjectId, user_id: &str, from: &str, to: &str) -> DomainResult<NewReservation> {
    Ok(NewReservation {
        charger_id,
        user_id: parse_reference("userID", user_id)?,
        from: from.to_string(),
        to: to.to_string(),
    })
}

fn parse_reference(field: &'static str, value: &str) -> DomainResult<ObjectId> {
    ObjectId::parse(value).map_err(|_| DomainError::InvalidReference {
        field,
        value: value.to_string(),
    })
}

fn parse_optional_reference(field: &'static str, value: Option<&str>) -> DomainResult<Option<ObjectId>> {
    match value {
        None | Some("") => Ok(None),
        Some(v) => parse_reference(field, v).map(Some),
    }
}

/// A malformed reservation id cannot name a stored record.
fn parse_reservation_id(id: &str) -> DomainResult<ObjectId> {
    ObjectId::parse(id).map_err(|_| DomainError::reservation_not_found(id))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::domain::Charger;
    use crate::infrastructure::crypto::jwt::issue_token;
    use crate::infrastructure::{InMemoryReservationRepository, JwtIdentityResolver, StaticRegistry};

    const SECRET: &str = "service-secret";
    const USER: &str = "64b7f0c2a1b2c3d4e5f60719";
    const CHARGER_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaa";
    const CHARGER_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbb";

    /// Counts every call that reaches the store.
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryReservationRepository,
        calls: AtomicUsize,
    }

    impl CountingStore {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
        fn hit(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ReservationRepository for CountingStore {
        async fn create(&self, new: NewReservation) -> DomainResult<Reservation> {
            self.hit();
            self.inner.create(new).await
        }
        async fn get(&self, id: &ObjectId) -> DomainResult<Reservation> {
            self.hit();
            self.inner.get(id).await
        }
        async fn list(&self) -> DomainResult<Vec<Reservation>> {
            self.hit();
            self.inner.list().await
        }
        async fn list_filtered(&self, filter: ReservationFilter) -> DomainResult<Vec<Reservation>> {
            self.hit();
            self.inner.list_filtered(filter).await
        }
        async fn update(&self, id: &ObjectId, from: String, to: String) -> DomainResult<()> {
            self.hit();
            self.inner.update(id, from, to).await
        }
        async fn delete(&self, id: &ObjectId) -> DomainResult<()> {
            self.hit();
            self.inner.delete(id).await
        }
    }

    enum FakeDirectory {
        Chargers(Vec<Charger>),
        Down,
    }

    #[async_trait]
    impl ChargerDirectory for FakeDirectory {
        async fn fetch_chargers(&self) -> DomainResult<Vec<Charger>> {
            match self {
                FakeDirectory::Chargers(c) => Ok(c.clone()),
                FakeDirectory::Down => Err(DomainError::DirectoryUnavailable("connection refused".into())),
            }
        }
    }

    fn charger(id: &str, lat: f64, lon: f64) -> Charger {
        Charger {
            id: ObjectId::parse(id).unwrap(),
            name: id.to_string(),
            location: Location::new(lat, lon),
            average_rating: 0.0,
        }
    }

    fn service_with(directory: FakeDirectory) -> (ReservationService, Arc<CountingStore>) {
        let store = Arc::new(CountingStore::default());
        let registry = StaticRegistry::default().with("jwtSecret", SECRET);
        let identity = JwtIdentityResolver::new(Arc::new(registry), "jwtSecret");
        let service = ReservationService::new(store.clone(), Arc::new(directory), Arc::new(identity));
        (service, store)
    }

    fn service() -> (ReservationService, Arc<CountingStore>) {
        service_with(FakeDirectory::Chargers(vec![
            charger(CHARGER_A, 40.1, -3.0),
            charger(CHARGER_B, 41.0, -3.0),
        ]))
    }

    fn bearer(user: &str) -> String {
        format!("Bearer {}", issue_token(user, SECRET, None).unwrap())
    }

    #[tokio::test]
    async fn bad_credential_is_a_soft_failure_without_store_call() {
        let (service, store) = service();
        let outcome = service
            .create_reservation("2024-05-01T10:00:00Z", "2024-05-01T11:00:00Z", "Bearer badtoken", CHARGER_A)
            .await
            .unwrap();
        assert_eq!(outcome, ReservationOutcome::AuthorizationFailed);
        assert_eq!(outcome.status(), "Authorization failed");
        assert_eq!(store.calls(), 0);

        let outcome = service
            .create_reservation("a", "b", "no-scheme", CHARGER_A)
            .await
            .unwrap();
        assert_eq!(outcome.status(), STATUS_AUTHORIZATION_FAILED);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn create_persists_for_authenticated_user() {
        let (service, _store) = service();
        let outcome = service
            .create_reservation("2024-05-01T10:00:00Z", "2024-05-01T11:00:00Z", &bearer(USER), CHARGER_B)
            .await
            .unwrap();
        assert_eq!(outcome.status(), STATUS_OK);

        let created = outcome.into_reservation().unwrap();
        assert_eq!(created.charger_id.to_hex(), CHARGER_B);
        assert_eq!(created.user_id.to_hex(), USER);

        let fetched = service.get_reservation(&created.id.to_hex()).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn create_with_malformed_charger_is_invalid_reference() {
        let (service, store) = service();
        let err = service
            .create_reservation("a", "b", &bearer(USER), "not-an-id")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidReference { field: "chargerID", .. }));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn token_with_malformed_user_id_is_invalid_reference() {
        let (service, _) = service();
        let err = service
            .create_reservation("a", "b", &bearer("alice"), CHARGER_A)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidReference { field: "userID", .. }));
    }

    #[tokio::test]
    async fn nearest_assigns_closest_charger() {
        let (service, _) = service();
        let outcome = service
            .create_reservation_at_nearest(
                &bearer(USER),
                "2024-05-01T10:00:00Z",
                "2024-05-01T11:00:00Z",
                Location::new(40.0, -3.0),
            )
            .await
            .unwrap();
        assert_eq!(outcome.status(), STATUS_OK);
        let r = outcome.reservation().unwrap();
        assert_eq!(r.charger_id.to_hex(), CHARGER_A);
        assert_eq!(r.from, "2024-05-01T10:00:00Z");
    }

    #[tokio::test]
    async fn nearest_with_bad_credential_skips_directory_and_store() {
        let (service, store) = service_with(FakeDirectory::Down);
        let outcome = service
            .create_reservation_at_nearest("Bearer badtoken", "a", "b", Location::new(0.0, 0.0))
            .await
            .unwrap();
        assert_eq!(outcome, ReservationOutcome::AuthorizationFailed);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn nearest_without_candidates_creates_nothing() {
        let (service, store) = service_with(FakeDirectory::Chargers(vec![]));
        let err = service
            .create_reservation_at_nearest(&bearer(USER), "a", "b", Location::new(0.0, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NoCandidates));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn nearest_propagates_directory_failure() {
        let (service, store) = service_with(FakeDirectory::Down);
        let err = service
            .create_reservation_at_nearest(&bearer(USER), "a", "b", Location::new(0.0, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::DirectoryUnavailable(_)));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn filter_treats_empty_strings_as_absent() {
        let (service, _) = service();
        let token = bearer(USER);
        service.create_reservation("a", "b", &token, CHARGER_A).await.unwrap();
        service.create_reservation("a", "b", &token, CHARGER_B).await.unwrap();

        let all = service.get_reservations().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(service.get_reservations_filter(None, None).await.unwrap(), all);
        assert_eq!(service.get_reservations_filter(Some(""), Some("")).await.unwrap(), all);

        let only_a = service.get_reservations_filter(Some(CHARGER_A), None).await.unwrap();
        assert_eq!(only_a.len(), 1);
        assert_eq!(only_a[0].charger_id.to_hex(), CHARGER_A);

        let err = service.get_reservations_filter(None, Some("bob")).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidReference { field: "userID", .. }));
    }

    #[tokio::test]
    async fn update_and_delete_report_ok_and_not_found() {
        let (service, _) = service();
        let created = service
            .create_reservation("a", "b", &bearer(USER), CHARGER_A)
            .await
            .unwrap()
            .into_reservation()
            .unwrap();
        let id = created.id.to_hex();

        assert_eq!(service.update_reservation(&id, "c", "d").await.unwrap(), STATUS_OK);
        let updated = service.get_reservation(&id).await.unwrap();
        assert_eq!((updated.from.as_str(), updated.to.as_str()), ("c", "d"));
        assert!(updated.modified > created.modified);

        assert_eq!(service.delete_reservation(&id).await.unwrap(), STATUS_OK);
        assert!(matches!(service.get_reservation(&id).await, Err(DomainError::NotFound { .. })));
        assert!(matches!(service.delete_reservation(&id).await, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn malformed_reservation_id_is_not_found() {
        let (service, store) = service();
        assert!(matches!(service.get_reservation("xyz").await, Err(DomainError::NotFound { .. })));
        assert!(matches!(service.update_reservation("xyz", "a", "b").await, Err(DomainError::NotFound { .. })));
        assert!(matches!(service.delete_reservation("xyz").await, Err(DomainError::NotFound { .. })));
        assert_eq!(store.calls(), 0);
    }
}
