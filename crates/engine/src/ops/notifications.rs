//! Approval thread state machine.
//!
//! Status moves only `requested -> approved` and `requested -> denied`, by an
//! admin, and each transition appends exactly one admin message in the same
//! transaction. Replies are allowed at any status; threads are never deleted.

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    ApprovalStatus, EngineError, Message, Notification, NotificationKind, ResultEngine,
    Sender, notification_messages, notifications, util::normalize_required,
};

use super::{Engine, Identity, Role, with_tx};

fn sender_for(identity: &Identity) -> Sender {
    match identity.role {
        Role::Admin => Sender::Admin,
        Role::User => Sender::User,
    }
}

impl Engine {
    /// Open an approval thread with its first message.
    pub async fn open_notification(
        &self,
        identity: &Identity,
        kind: NotificationKind,
        body: &str,
    ) -> ResultEngine<Notification> {
        let body = normalize_required(body, "message")?;

        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, &identity.username).await?;

            let now = Utc::now();
            let notification = notifications::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                owner: ActiveValue::Set(identity.username.clone()),
                kind: ActiveValue::Set(kind.as_str().to_string()),
                status: ActiveValue::Set(ApprovalStatus::Requested.as_str().to_string()),
                created_at: ActiveValue::Set(now),
            };
            let model = notification.insert(&db_tx).await?;

            let message = self
                .append_message(&db_tx, model.id, 0, sender_for(identity), &body)
                .await?;

            Notification::try_from_parts(model, vec![message])
        })
    }

    /// Resolve a thread: `requested -> approved | denied`, admin only.
    ///
    /// Appends one admin message carrying the decision note atomically with
    /// the status flip. Terminal threads reject further transitions.
    pub async fn resolve_notification(
        &self,
        identity: &Identity,
        notification_id: Uuid,
        status: ApprovalStatus,
        note: &str,
    ) -> ResultEngine<Notification> {
        self.require_admin(identity)?;
        if !status.is_terminal() {
            return Err(EngineError::Validation(
                "resolution status must be approved or denied".to_string(),
            ));
        }
        let note = normalize_required(note, "resolution message")?;

        with_tx!(self, |db_tx| {
            let model = notifications::Entity::find_by_id(notification_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("notification not exists".to_string()))?;

            let current = ApprovalStatus::try_from(model.status.as_str())?;
            if current.is_terminal() {
                return Err(EngineError::InvalidState(format!(
                    "notification already {}",
                    current.as_str()
                )));
            }

            let next_seq = self.next_seq(&db_tx, notification_id).await?;

            let mut active: notifications::ActiveModel = model.into();
            active.status = ActiveValue::Set(status.as_str().to_string());
            let model = active.update(&db_tx).await?;

            self.append_message(&db_tx, notification_id, next_seq, Sender::Admin, &note)
                .await?;

            let messages = self.thread_messages(&db_tx, notification_id).await?;
            Notification::try_from_parts(model, messages)
        })
    }

    /// Append a reply to a thread. Permitted for the owning user and admins,
    /// at any status including terminal ones.
    pub async fn add_reply(
        &self,
        identity: &Identity,
        notification_id: Uuid,
        body: &str,
    ) -> ResultEngine<Notification> {
        let body = normalize_required(body, "message")?;

        with_tx!(self, |db_tx| {
            let model = notifications::Entity::find_by_id(notification_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("notification not exists".to_string()))?;

            if model.owner != identity.username && !identity.can_administer() {
                return Err(EngineError::Forbidden(
                    "only the owner or an admin may reply".to_string(),
                ));
            }

            let next_seq = self.next_seq(&db_tx, notification_id).await?;
            self.append_message(&db_tx, notification_id, next_seq, sender_for(identity), &body)
                .await?;

            let messages = self.thread_messages(&db_tx, notification_id).await?;
            Notification::try_from_parts(model, messages)
        })
    }

    /// The caller's threads, newest first, messages in append order.
    pub async fn list_notifications(&self, identity: &Identity) -> ResultEngine<Vec<Notification>> {
        with_tx!(self, |db_tx| {
            let models = notifications::Entity::find()
                .filter(notifications::Column::Owner.eq(identity.username.clone()))
                .order_by_desc(notifications::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            self.load_threads(&db_tx, models).await
        })
    }

    /// Every thread, newest first. Admin only.
    pub async fn list_all_notifications(
        &self,
        identity: &Identity,
    ) -> ResultEngine<Vec<Notification>> {
        self.require_admin(identity)?;

        with_tx!(self, |db_tx| {
            let models = notifications::Entity::find()
                .order_by_desc(notifications::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            self.load_threads(&db_tx, models).await
        })
    }

    /// Fetch a single thread; visible to the owner and to admins.
    pub async fn notification(
        &self,
        identity: &Identity,
        notification_id: Uuid,
    ) -> ResultEngine<Notification> {
        with_tx!(self, |db_tx| {
            let model = notifications::Entity::find_by_id(notification_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("notification not exists".to_string()))?;
            if model.owner != identity.username && !identity.can_administer() {
                return Err(EngineError::KeyNotFound(
                    "notification not exists".to_string(),
                ));
            }
            let messages = self.thread_messages(&db_tx, notification_id).await?;
            Notification::try_from_parts(model, messages)
        })
    }

    async fn load_threads(
        &self,
        db_tx: &DatabaseTransaction,
        models: Vec<notifications::Model>,
    ) -> ResultEngine<Vec<Notification>> {
        let mut out = Vec::with_capacity(models.len());
        for model in models {
            let messages = self.thread_messages(db_tx, model.id).await?;
            out.push(Notification::try_from_parts(model, messages)?);
        }
        Ok(out)
    }

    async fn thread_messages(
        &self,
        db_tx: &DatabaseTransaction,
        notification_id: Uuid,
    ) -> ResultEngine<Vec<Message>> {
        let models = notification_messages::Entity::find()
            .filter(notification_messages::Column::NotificationId.eq(notification_id))
            .order_by_asc(notification_messages::Column::Seq)
            .all(db_tx)
            .await?;
        models.into_iter().map(Message::try_from).collect()
    }

    async fn next_seq(
        &self,
        db_tx: &DatabaseTransaction,
        notification_id: Uuid,
    ) -> ResultEngine<i32> {
        let last = notification_messages::Entity::find()
            .filter(notification_messages::Column::NotificationId.eq(notification_id))
            .order_by_desc(notification_messages::Column::Seq)
            .one(db_tx)
            .await?;
        Ok(last.map_or(0, |m| m.seq + 1))
    }

    async fn append_message(
        &self,
        db_tx: &DatabaseTransaction,
        notification_id: Uuid,
        seq: i32,
        sender: Sender,
        body: &str,
    ) -> ResultEngine<Message> {
        let active = notification_messages::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            notification_id: ActiveValue::Set(notification_id),
            seq: ActiveValue::Set(seq),
            sender: ActiveValue::Set(sender.as_str().to_string()),
            body: ActiveValue::Set(body.to_string()),
            sent_at: ActiveValue::Set(Utc::now()),
        };
        let model = active.insert(db_tx).await?;
        Message::try_from(model)
    }
}
