//! Expenses API endpoints.

use api_types::expense::{
    ExpenseApprovalSet, ExpenseCreate, ExpenseListResponse, ExpenseUpdate, ExpenseView,
    Frequency, PaymentMethod,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, notifications::map_approval_status, server::ServerState, user};

fn payment_method(method: PaymentMethod) -> engine::PaymentMethod {
    match method {
        PaymentMethod::Cash => engine::PaymentMethod::Cash,
        PaymentMethod::Card => engine::PaymentMethod::Card,
        PaymentMethod::BankTransfer => engine::PaymentMethod::BankTransfer,
        PaymentMethod::Mobile => engine::PaymentMethod::Mobile,
        PaymentMethod::Other => engine::PaymentMethod::Other,
    }
}

fn map_payment_method(method: engine::PaymentMethod) -> PaymentMethod {
    match method {
        engine::PaymentMethod::Cash => PaymentMethod::Cash,
        engine::PaymentMethod::Card => PaymentMethod::Card,
        engine::PaymentMethod::BankTransfer => PaymentMethod::BankTransfer,
        engine::PaymentMethod::Mobile => PaymentMethod::Mobile,
        engine::PaymentMethod::Other => PaymentMethod::Other,
    }
}

fn frequency(freq: Frequency) -> engine::Frequency {
    match freq {
        Frequency::Daily => engine::Frequency::Daily,
        Frequency::Weekly => engine::Frequency::Weekly,
        Frequency::Monthly => engine::Frequency::Monthly,
        Frequency::Yearly => engine::Frequency::Yearly,
    }
}

fn map_frequency(freq: engine::Frequency) -> Frequency {
    match freq {
        engine::Frequency::Daily => Frequency::Daily,
        engine::Frequency::Weekly => Frequency::Weekly,
        engine::Frequency::Monthly => Frequency::Monthly,
        engine::Frequency::Yearly => Frequency::Yearly,
    }
}

fn map_expense(expense: engine::Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        owner: expense.owner,
        category_id: expense.category_id,
        amount_minor: expense.amount_minor,
        description: expense.description,
        date: expense.date,
        payment_method: map_payment_method(expense.payment_method),
        recurring: expense.recurring,
        frequency: expense.frequency.map(map_frequency),
        attachments: expense.attachments,
        approval_status: map_approval_status(expense.approval.status),
        approval_note: expense.approval.note,
    }
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let identity = user::identity(&user)?;
    let expenses = state
        .engine
        .list_expenses(&identity)
        .await?
        .into_iter()
        .map(map_expense)
        .collect();

    Ok(Json(ExpenseListResponse { expenses }))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<ExpenseView>, ServerError> {
    let identity = user::identity(&user)?;
    let expense = state.engine.expense(&identity, expense_id).await?;
    Ok(Json(map_expense(expense)))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseCreate>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let identity = user::identity(&user)?;
    let expense = state
        .engine
        .create_expense(
            &identity,
            payload.category_id,
            payload.amount_minor,
            &payload.description,
            payload.date,
            payment_method(payload.payment_method),
            payload.recurring,
            payload.frequency.map(frequency),
            payload.attachments,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(map_expense(expense))))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<ExpenseView>, ServerError> {
    let identity = user::identity(&user)?;
    let expense = state
        .engine
        .update_expense(
            &identity,
            expense_id,
            payload.category_id,
            payload.amount_minor,
            payload.description.as_deref(),
            payload.date,
            payload.payment_method.map(payment_method),
            payload.recurring,
            payload.frequency.map(|f| f.map(frequency)),
            payload.attachments,
        )
        .await?;

    Ok(Json(map_expense(expense)))
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let identity = user::identity(&user)?;
    state.engine.delete_expense(&identity, expense_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_approval(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<ExpenseApprovalSet>,
) -> Result<Json<ExpenseView>, ServerError> {
    let identity = user::identity(&user)?;
    let expense = state
        .engine
        .set_expense_approval(
            &identity,
            expense_id,
            crate::notifications::approval_status(payload.status),
            payload.note.as_deref(),
        )
        .await?;

    Ok(Json(map_expense(expense)))
}
