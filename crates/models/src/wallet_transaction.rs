use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::ModelError;
use crate::wallet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum TxnKind {
    #[sea_orm(string_value = "credit")]
    Credit,
    #[sea_orm(string_value = "debit")]
    Debit,
    #[sea_orm(string_value = "refund")]
    Refund,
}

impl TxnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxnKind::Credit => "credit",
            TxnKind::Debit => "debit",
            TxnKind::Refund => "refund",
        }
    }
}

impl FromStr for TxnKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "credit" => Ok(TxnKind::Credit),
            "debit" => Ok(TxnKind::Debit),
            "refund" => Ok(TxnKind::Refund),
            other => Err(ModelError::Validation(format!("invalid transaction kind: {}", other))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallet_transaction")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub kind: TxnKind,
    pub amount_cents: i64,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub related_payment_id: Option<Uuid>,
    #[sea_orm(unique)]
    pub reference: Option<String>,
    pub balance_after_cents: i64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Wallet }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Wallet => Entity::belongs_to(wallet::Entity).from(Column::WalletId).to(wallet::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug)]
pub struct NewEntry {
    pub wallet_id: Uuid,
    pub kind: TxnKind,
    pub amount_cents: i64,
    pub description: String,
    pub related_payment_id: Option<Uuid>,
    pub reference: Option<String>,
    pub balance_after_cents: i64,
}

pub async fn append<C: ConnectionTrait>(db: &C, entry: NewEntry) -> Result<Model, ModelError> {
    if entry.amount_cents <= 0 {
        return Err(ModelError::Validation("amount must be positive".into()));
    }
    if entry.balance_after_cents < 0 {
        return Err(ModelError::Validation("balance cannot go negative".into()));
    }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        wallet_id: Set(entry.wallet_id),
        kind: Set(entry.kind),
        amount_cents: Set(entry.amount_cents),
        description: Set(entry.description),
        related_payment_id: Set(entry.related_payment_id),
        reference: Set(entry.reference),
        balance_after_cents: Set(entry.balance_after_cents),
        created_at: Set(Utc::now().into()),
    };
    Ok(am.insert(db).await?)
}
