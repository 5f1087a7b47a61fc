//! Budget ledger entity and the period/window arithmetic.
//!
//! A budget tracks cumulative spend over an active window. `spent_minor` is a
//! denormalized aggregate: it is always recomputed from the matching expenses,
//! never incremented in place, so edits and deletes cannot drift it.

use chrono::{Days, Months, NaiveDate};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Percentage of the target amount at which a budget turns `Warning`.
pub const WARNING_THRESHOLD_PCT: i64 = 80;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner: String,
    pub name: String,
    pub amount_minor: i64,
    pub spent_minor: i64,
    pub period: String,
    pub category_id: Option<Uuid>,
    pub start_date: Date,
    pub end_date: Date,
    pub active: bool,
    pub threshold_pct: i32,
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

/// Budget accumulation period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// End of the window that starts at `start`.
    ///
    /// Daily and weekly windows are fixed-length; monthly and yearly windows
    /// follow the calendar (Jan 31 + 1 month = Feb 28/29).
    pub fn window_end(self, start: NaiveDate) -> NaiveDate {
        match self {
            Self::Daily => start + Days::new(1),
            Self::Weekly => start + Days::new(7),
            Self::Monthly => start + Months::new(1),
            Self::Yearly => start + Months::new(12),
        }
    }
}

impl TryFrom<&str> for Period {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(EngineError::Validation(format!("invalid period: {other}"))),
        }
    }
}

/// Derived health of a budget, computed from `spent_minor / amount_minor`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    Good,
    Warning,
    Exceeded,
}

/// A budget snapshot returned by the engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub owner: String,
    pub name: String,
    pub amount_minor: i64,
    pub spent_minor: i64,
    pub period: Period,
    pub category_id: Option<Uuid>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub active: bool,
    pub threshold_pct: i32,
}

impl Budget {
    pub fn status(&self) -> BudgetStatus {
        if self.spent_minor >= self.amount_minor {
            BudgetStatus::Exceeded
        } else if self.spent_minor * 100 >= self.amount_minor * WARNING_THRESHOLD_PCT {
            BudgetStatus::Warning
        } else {
            BudgetStatus::Good
        }
    }
}

impl TryFrom<Model> for Budget {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            period: Period::try_from(model.period.as_str())?,
            owner: model.owner,
            name: model.name,
            amount_minor: model.amount_minor,
            spent_minor: model.spent_minor,
            category_id: model.category_id,
            start_date: model.start_date,
            end_date: model.end_date,
            active: model.active,
            threshold_pct: model.threshold_pct,
        })
    }
}
