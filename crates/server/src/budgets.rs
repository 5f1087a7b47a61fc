//! Budgets API endpoints.

use api_types::budget::{
    BudgetCreate, BudgetListResponse, BudgetStatus, BudgetUpdate, BudgetView, Period,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn period(period: Period) -> engine::Period {
    match period {
        Period::Daily => engine::Period::Daily,
        Period::Weekly => engine::Period::Weekly,
        Period::Monthly => engine::Period::Monthly,
        Period::Yearly => engine::Period::Yearly,
    }
}

fn map_period(period: engine::Period) -> Period {
    match period {
        engine::Period::Daily => Period::Daily,
        engine::Period::Weekly => Period::Weekly,
        engine::Period::Monthly => Period::Monthly,
        engine::Period::Yearly => Period::Yearly,
    }
}

fn map_status(status: engine::BudgetStatus) -> BudgetStatus {
    match status {
        engine::BudgetStatus::Good => BudgetStatus::Good,
        engine::BudgetStatus::Warning => BudgetStatus::Warning,
        engine::BudgetStatus::Exceeded => BudgetStatus::Exceeded,
    }
}

fn map_budget(budget: engine::Budget) -> BudgetView {
    BudgetView {
        id: budget.id,
        status: map_status(budget.status()),
        name: budget.name,
        amount_minor: budget.amount_minor,
        spent_minor: budget.spent_minor,
        period: map_period(budget.period),
        category_id: budget.category_id,
        start_date: budget.start_date,
        end_date: budget.end_date,
        active: budget.active,
        threshold_pct: budget.threshold_pct,
    }
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<BudgetListResponse>, ServerError> {
    let identity = user::identity(&user)?;
    let budgets = state
        .engine
        .list_budgets(&identity)
        .await?
        .into_iter()
        .map(map_budget)
        .collect();

    Ok(Json(BudgetListResponse { budgets }))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<Json<BudgetView>, ServerError> {
    let identity = user::identity(&user)?;
    let budget = state.engine.budget(&identity, budget_id).await?;
    Ok(Json(map_budget(budget)))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetCreate>,
) -> Result<(StatusCode, Json<BudgetView>), ServerError> {
    let identity = user::identity(&user)?;
    let budget = state
        .engine
        .create_budget(
            &identity,
            &payload.name,
            payload.amount_minor,
            period(payload.period),
            payload.category_id,
            payload.start_date,
            payload.threshold_pct,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(map_budget(budget))))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<BudgetUpdate>,
) -> Result<Json<BudgetView>, ServerError> {
    let identity = user::identity(&user)?;
    let budget = state
        .engine
        .update_budget(
            &identity,
            budget_id,
            payload.name.as_deref(),
            payload.amount_minor,
            payload.period.map(period),
            payload.category_id,
            payload.start_date,
            payload.active,
            payload.threshold_pct,
        )
        .await?;

    Ok(Json(map_budget(budget)))
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let identity = user::identity(&user)?;
    state.engine.delete_budget(&identity, budget_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
