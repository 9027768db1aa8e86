//! SeaORM implementation of ReservationRepository

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::{
    DomainError, DomainResult, NewReservation, ObjectId, Reservation, ReservationFilter,
    ReservationRepository,
};
use crate::infrastructure::database::entities::reservation;

pub struct SeaOrmReservationRepository {
    db: DatabaseConnection,
}

impl SeaOrmReservationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find(&self, id: &ObjectId) -> DomainResult<reservation::Model> {
        reservation::Entity::find_by_id(id.to_hex())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::reservation_not_found(id.to_hex()))
    }

    /// Write the new window over a previously read row. The row may have
    /// been deleted since it was read; that surfaces as `NotFound`.
    async fn reschedule(&self, existing: reservation::Model, from: String, to: String) -> DomainResult<()> {
        let id = existing.id.clone();
        let mut r = model_to_domain(existing.clone())?;
        r.reschedule(from, to, Utc::now());

        let mut active: reservation::ActiveModel = existing.into();
        active.from_time = Set(r.from);
        active.to_time = Set(r.to);
        active.modified = Set(r.modified);
        active.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated | DbErr::RecordNotFound(_) => DomainError::reservation_not_found(id),
            other => db_err(other),
        })?;
        Ok(())
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn stored_id(column: &str, value: &str) -> DomainResult<ObjectId> {
    ObjectId::parse(value)
        .map_err(|e| DomainError::Storage(format!("corrupt {} column: {}", column, e)))
}

fn model_to_domain(m: reservation::Model) -> DomainResult<Reservation> {
    Ok(Reservation {
        id: stored_id("id", &m.id)?,
        charger_id: stored_id("charger_id", &m.charger_id)?,
        user_id: stored_id("user_id", &m.user_id)?,
        from: m.from_time,
        to: m.to_time,
        created: m.created,
        modified: m.modified,
    })
}

fn models_to_domain(models: Vec<reservation::Model>) -> DomainResult<Vec<Reservation>> {
    models.into_iter().map(model_to_domain).collect()
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(format!("Database error: {}", e))
}

// ── ReservationRepository impl ──────────────────────────────────

#[async_trait]
impl ReservationRepository for SeaOrmReservationRepository {
    async fn create(&self, new: NewReservation) -> DomainResult<Reservation> {
        let r = Reservation::create(new, Utc::now());
        debug!("Saving reservation: {}", r.id);

        let model = reservation::ActiveModel {
            id: Set(r.id.to_hex()),
            charger_id: Set(r.charger_id.to_hex()),
            user_id: Set(r.user_id.to_hex()),
            from_time: Set(r.from.clone()),
            to_time: Set(r.to.clone()),
            created: Set(r.created.clone()),
            modified: Set(r.modified.clone()),
        };
        model.insert(&self.db).await.map_err(db_err)?;
        Ok(r)
    }

    async fn get(&self, id: &ObjectId) -> DomainResult<Reservation> {
        model_to_domain(self.find(id).await?)
    }

    async fn list(&self) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .order_by_asc(reservation::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn list_filtered(&self, filter: ReservationFilter) -> DomainResult<Vec<Reservation>> {
        let mut query = reservation::Entity::find();
        if let Some(charger_id) = filter.charger_id {
            query = query.filter(reservation::Column::ChargerId.eq(charger_id.to_hex()));
        }
        if let Some(user_id) = filter.user_id {
            query = query.filter(reservation::Column::UserId.eq(user_id.to_hex()));
        }
        let models = query
            .order_by_asc(reservation::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn update(&self, id: &ObjectId, from: String, to: String) -> DomainResult<()> {
        debug!("Updating reservation: {}", id);

        let existing = self.find(id).await?;
        self.reschedule(existing, from, to).await
    }

    async fn delete(&self, id: &ObjectId) -> DomainResult<()> {
        debug!("Deleting reservation: {}", id);

        let result = reservation::Entity::delete_by_id(id.to_hex())
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::reservation_not_found(id.to_hex()));
        }
        Ok(())
    }
}
