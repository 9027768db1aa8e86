//! Reservation entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    /// 24 hex character identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub charger_id: String,
    pub user_id: String,

    /// RFC3339 window boundaries, stored as given
    pub from_time: String,
    pub to_time: String,

    pub created: String,
    pub modified: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
