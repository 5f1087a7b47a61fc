//! Category registry with an explicit lifecycle tag.
//!
//! Categories are shared across users but gated by their state:
//!
//! - `active`: visible to everyone.
//! - `pending`: created by a regular user, waiting for an admin decision.
//! - `inactive`: soft-deleted. The row is never removed because expenses keep
//!   referencing it.
//!
//! The uniqueness invariant holds on `name_norm` among non-inactive rows: at
//! most one active-or-pending category per normalized name.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub name_norm: String,
    pub color: String,
    pub icon: Option<String>,
    pub state: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Lifecycle tag of a category.
///
/// A soft delete moves a category to `Inactive` instead of dropping the row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryState {
    Active,
    Pending,
    Inactive,
}

impl CategoryState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Inactive => "inactive",
        }
    }
}

impl TryFrom<&str> for CategoryState {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "pending" => Ok(Self::Pending),
            "inactive" => Ok(Self::Inactive),
            other => Err(EngineError::Validation(format!(
                "invalid category state: {other}"
            ))),
        }
    }
}

/// A category snapshot returned by the engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub icon: Option<String>,
    pub state: CategoryState,
}

impl TryFrom<Model> for Category {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            state: CategoryState::try_from(model.state.as_str())?,
            name: model.name,
            color: model.color,
            icon: model.icon,
        })
    }
}
