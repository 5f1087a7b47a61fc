//! Approval-thread API endpoints.

use api_types::ApprovalStatus;
use api_types::notification::{
    MessageView, NotificationKind, NotificationListResponse, NotificationOpen, NotificationReply,
    NotificationResolve, NotificationView, Sender,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

pub(crate) fn approval_status(status: ApprovalStatus) -> engine::ApprovalStatus {
    match status {
        ApprovalStatus::Requested => engine::ApprovalStatus::Requested,
        ApprovalStatus::Approved => engine::ApprovalStatus::Approved,
        ApprovalStatus::Denied => engine::ApprovalStatus::Denied,
    }
}

pub(crate) fn map_approval_status(status: engine::ApprovalStatus) -> ApprovalStatus {
    match status {
        engine::ApprovalStatus::Requested => ApprovalStatus::Requested,
        engine::ApprovalStatus::Approved => ApprovalStatus::Approved,
        engine::ApprovalStatus::Denied => ApprovalStatus::Denied,
    }
}

fn kind(kind: NotificationKind) -> engine::NotificationKind {
    match kind {
        NotificationKind::Category => engine::NotificationKind::Category,
        NotificationKind::Expense => engine::NotificationKind::Expense,
    }
}

fn map_kind(value: engine::NotificationKind) -> NotificationKind {
    match value {
        engine::NotificationKind::Category => NotificationKind::Category,
        engine::NotificationKind::Expense => NotificationKind::Expense,
    }
}

fn map_sender(sender: engine::Sender) -> Sender {
    match sender {
        engine::Sender::User => Sender::User,
        engine::Sender::Admin => Sender::Admin,
    }
}

fn map_message(message: engine::Message) -> MessageView {
    MessageView {
        seq: message.seq,
        sender: map_sender(message.sender),
        body: message.body,
        sent_at: message.sent_at,
    }
}

fn map_notification(notification: engine::Notification) -> NotificationView {
    NotificationView {
        id: notification.id,
        owner: notification.owner,
        kind: map_kind(notification.kind),
        status: map_approval_status(notification.status),
        created_at: notification.created_at,
        messages: notification.messages.into_iter().map(map_message).collect(),
    }
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<NotificationListResponse>, ServerError> {
    let identity = user::identity(&user)?;
    let notifications = state
        .engine
        .list_notifications(&identity)
        .await?
        .into_iter()
        .map(map_notification)
        .collect();

    Ok(Json(NotificationListResponse { notifications }))
}

pub async fn list_all(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<NotificationListResponse>, ServerError> {
    let identity = user::identity(&user)?;
    let notifications = state
        .engine
        .list_all_notifications(&identity)
        .await?
        .into_iter()
        .map(map_notification)
        .collect();

    Ok(Json(NotificationListResponse { notifications }))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<NotificationView>, ServerError> {
    let identity = user::identity(&user)?;
    let notification = state.engine.notification(&identity, notification_id).await?;
    Ok(Json(map_notification(notification)))
}

pub async fn open(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<NotificationOpen>,
) -> Result<(StatusCode, Json<NotificationView>), ServerError> {
    let identity = user::identity(&user)?;
    let notification = state
        .engine
        .open_notification(&identity, kind(payload.kind), &payload.message)
        .await?;

    Ok((StatusCode::CREATED, Json(map_notification(notification))))
}

pub async fn reply(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(notification_id): Path<Uuid>,
    Json(payload): Json<NotificationReply>,
) -> Result<Json<NotificationView>, ServerError> {
    let identity = user::identity(&user)?;
    let notification = state
        .engine
        .add_reply(&identity, notification_id, &payload.message)
        .await?;

    Ok(Json(map_notification(notification)))
}

pub async fn resolve(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(notification_id): Path<Uuid>,
    Json(payload): Json<NotificationResolve>,
) -> Result<Json<NotificationView>, ServerError> {
    let identity = user::identity(&user)?;
    let notification = state
        .engine
        .resolve_notification(
            &identity,
            notification_id,
            approval_status(payload.status),
            &payload.message,
        )
        .await?;

    Ok(Json(map_notification(notification)))
}
