//! `SeaORM` Entity for open_balances table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "open_balances")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: String,
    pub party: String,
    pub document_number: String,
    pub invoice_date: Date,
    pub due_date: Date,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))")]
    pub remaining: Decimal,
    pub branch_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::ageing_records::Entity")]
    AgeingRecords,
}

impl Related<super::ageing_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AgeingRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
