//! Approval threads.
//!
//! A notification is an append-only message thread plus a status. The status
//! is a small state machine: it starts at `requested` and an admin moves it to
//! `approved` or `denied` exactly once. Replies stay possible after the thread
//! is resolved; threads are never deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApprovalStatus, EngineError, ResultEngine, notification_messages::Message};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner: String,
    pub kind: String,
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::notification_messages::Entity")]
    Messages,
}

impl Related<super::notification_messages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// What an approval thread is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Category,
    Expense,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for NotificationKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "category" => Ok(Self::Category),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::Validation(format!(
                "invalid notification kind: {other}"
            ))),
        }
    }
}

/// A notification snapshot with its messages in append order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub owner: String,
    pub kind: NotificationKind,
    pub status: ApprovalStatus,
    pub created_at: DateTimeUtc,
    pub messages: Vec<Message>,
}

impl Notification {
    pub(crate) fn try_from_parts(
        model: Model,
        messages: Vec<Message>,
    ) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            kind: NotificationKind::try_from(model.kind.as_str())?,
            status: ApprovalStatus::try_from(model.status.as_str())?,
            owner: model.owner,
            created_at: model.created_at,
            messages,
        })
    }
}
