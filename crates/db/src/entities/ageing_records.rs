//! `SeaORM` Entity for ageing_records table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ageing_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub open_balance_id: Uuid,
    pub invoice_date: Date,
    pub due_date: Date,
    pub days_outstanding: i64,
    pub bucket: String,
    pub computed_as_of: Date,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::open_balances::Entity",
        from = "Column::OpenBalanceId",
        to = "super::open_balances::Column::Id"
    )]
    OpenBalances,
}

impl Related<super::open_balances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OpenBalances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
