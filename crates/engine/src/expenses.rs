//! Expense ledger entity and snapshot types.
//!
//! Amounts are stored as integer minor units (`i64`). Attachment URLs live in
//! a JSON column. Every expense carries an approval sub-record that starts at
//! `requested` and is resolved by an admin.

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApprovalStatus, EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner: String,
    pub category_id: Uuid,
    pub amount_minor: i64,
    pub description: String,
    pub date: Date,
    pub payment_method: String,
    pub recurring: bool,
    pub frequency: Option<String>,
    pub attachments: Json,
    pub approval_status: String,
    pub approval_note: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Category,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    Mobile,
    Other,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::BankTransfer => "bank_transfer",
            Self::Mobile => "mobile",
            Self::Other => "other",
        }
    }
}

impl TryFrom<&str> for PaymentMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "cash" => Ok(Self::Cash),
            "card" => Ok(Self::Card),
            "bank_transfer" => Ok(Self::BankTransfer),
            "mobile" => Ok(Self::Mobile),
            "other" => Ok(Self::Other),
            other => Err(EngineError::Validation(format!(
                "invalid payment method: {other}"
            ))),
        }
    }
}

/// Recurrence frequency for recurring expenses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl TryFrom<&str> for Frequency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(EngineError::Validation(format!(
                "invalid frequency: {other}"
            ))),
        }
    }
}

/// Approval sub-record of an expense.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Approval {
    pub status: ApprovalStatus,
    pub note: Option<String>,
}

/// An expense snapshot returned by the engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub owner: String,
    pub category_id: Uuid,
    pub amount_minor: i64,
    pub description: String,
    pub date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub recurring: bool,
    pub frequency: Option<Frequency>,
    pub attachments: Vec<String>,
    pub approval: Approval,
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        let attachments: Vec<String> = serde_json::from_value(model.attachments)
            .map_err(|_| EngineError::Validation("invalid attachments column".to_string()))?;
        Ok(Self {
            id: model.id,
            payment_method: PaymentMethod::try_from(model.payment_method.as_str())?,
            frequency: model
                .frequency
                .as_deref()
                .map(Frequency::try_from)
                .transpose()?,
            approval: Approval {
                status: ApprovalStatus::try_from(model.approval_status.as_str())?,
                note: model.approval_note,
            },
            owner: model.owner,
            category_id: model.category_id,
            amount_minor: model.amount_minor,
            description: model.description,
            date: model.date,
            recurring: model.recurring,
            attachments,
        })
    }
}
