//! Categories API endpoints.
//!
//! Non-admin creations land in `pending` state; this handler raises the
//! companion approval thread so an admin can activate the category later.

use api_types::category::{
    CategoryCreate, CategoryCreated, CategoryListResponse, CategoryState, CategoryStateSet,
    CategoryUpdate, CategoryView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::NotificationKind;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn map_state(state: engine::CategoryState) -> CategoryState {
    match state {
        engine::CategoryState::Active => CategoryState::Active,
        engine::CategoryState::Pending => CategoryState::Pending,
        engine::CategoryState::Inactive => CategoryState::Inactive,
    }
}

fn map_category(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        color: category.color,
        icon: category.icon,
        state: map_state(category.state),
    }
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<CategoryListResponse>, ServerError> {
    let identity = user::identity(&user)?;
    let categories = state
        .engine
        .list_categories(&identity)
        .await?
        .into_iter()
        .map(map_category)
        .collect();

    Ok(Json(CategoryListResponse { categories }))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(category_id): Path<Uuid>,
) -> Result<Json<CategoryView>, ServerError> {
    user::identity(&user)?;
    let category = state.engine.category(category_id).await?;
    Ok(Json(map_category(category)))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> Result<(StatusCode, Json<CategoryCreated>), ServerError> {
    let identity = user::identity(&user)?;
    let category = state
        .engine
        .create_category(
            &identity,
            &payload.name,
            &payload.color,
            payload.icon.as_deref(),
        )
        .await?;

    // Pending categories need an admin decision; open the approval thread on
    // the creator's behalf.
    let notification_id = if category.state == engine::CategoryState::Pending {
        let message = payload
            .note
            .filter(|note| !note.trim().is_empty())
            .unwrap_or_else(|| format!("please approve category '{}'", category.name));
        let notification = state
            .engine
            .open_notification(&identity, NotificationKind::Category, &message)
            .await?;
        Some(notification.id)
    } else {
        None
    };

    Ok((
        StatusCode::CREATED,
        Json(CategoryCreated {
            id: category.id,
            name: category.name,
            state: map_state(category.state),
            notification_id,
        }),
    ))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(category_id): Path<Uuid>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<CategoryView>, ServerError> {
    user::identity(&user)?;
    if payload.name.is_none() && payload.color.is_none() && payload.icon.is_none() {
        return Err(ServerError::Generic(
            "provide at least one of name, color or icon".to_string(),
        ));
    }

    let category = state
        .engine
        .update_category(
            category_id,
            payload.name.as_deref(),
            payload.color.as_deref(),
            payload.icon.as_ref().map(|icon| icon.as_deref()),
        )
        .await?;
    Ok(Json(map_category(category)))
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(category_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    user::identity(&user)?;
    state.engine.soft_delete_category(category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_state(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(category_id): Path<Uuid>,
    Json(payload): Json<CategoryStateSet>,
) -> Result<Json<CategoryView>, ServerError> {
    let identity = user::identity(&user)?;
    let category = state
        .engine
        .set_category_active(&identity, category_id, payload.active)
        .await?;
    Ok(Json(map_category(category)))
}
