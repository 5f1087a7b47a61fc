//! Expense ledger writes and the reconciliation orchestration.
//!
//! Every mutation that can move money across a budget window (create, update,
//! delete) runs the budget reconciliation inside the same transaction, for the
//! old and the new category when an update moves the expense.

use chrono::NaiveDate;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    ApprovalStatus, EngineError, Expense, Frequency, PaymentMethod, ResultEngine, expenses,
    util::normalize_required,
};

use super::{Engine, Identity, with_tx};

impl Engine {
    /// Record an expense and reconcile the owner's matching budgets.
    ///
    /// The category must be `active` for the caller at creation time. The
    /// approval sub-record starts at `requested`.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_expense(
        &self,
        identity: &Identity,
        category_id: Uuid,
        amount_minor: i64,
        description: &str,
        date: NaiveDate,
        payment_method: PaymentMethod,
        recurring: bool,
        frequency: Option<Frequency>,
        attachments: Vec<String>,
    ) -> ResultEngine<Expense> {
        if amount_minor < 0 {
            return Err(EngineError::Validation(
                "expense amount must be >= 0".to_string(),
            ));
        }
        let description = normalize_required(description, "expense description")?;
        if recurring && frequency.is_none() {
            return Err(EngineError::Validation(
                "recurring expense requires a frequency".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, &identity.username).await?;
            self.require_active_category(&db_tx, category_id).await?;

            let active = expenses::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                owner: ActiveValue::Set(identity.username.clone()),
                category_id: ActiveValue::Set(category_id),
                amount_minor: ActiveValue::Set(amount_minor),
                description: ActiveValue::Set(description.clone()),
                date: ActiveValue::Set(date),
                payment_method: ActiveValue::Set(payment_method.as_str().to_string()),
                recurring: ActiveValue::Set(recurring),
                frequency: ActiveValue::Set(frequency.map(|f| f.as_str().to_string())),
                attachments: ActiveValue::Set(serde_json::json!(attachments)),
                approval_status: ActiveValue::Set(ApprovalStatus::Requested.as_str().to_string()),
                approval_note: ActiveValue::Set(None),
            };
            let model = active.insert(&db_tx).await?;

            self.reconcile_budgets(&db_tx, &identity.username, category_id)
                .await?;

            Expense::try_from(model)
        })
    }

    /// Update an expense owned by the caller.
    ///
    /// When the category changes, both the old and the new category's budgets
    /// are reconciled; date/amount changes reconcile the current category.
    /// The stored (recurring, frequency) pair is validated after the patch is
    /// applied; `frequency: Some(None)` clears the stored frequency.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_expense(
        &self,
        identity: &Identity,
        expense_id: Uuid,
        category_id: Option<Uuid>,
        amount_minor: Option<i64>,
        description: Option<&str>,
        date: Option<NaiveDate>,
        payment_method: Option<PaymentMethod>,
        recurring: Option<bool>,
        frequency: Option<Option<Frequency>>,
        attachments: Option<Vec<String>>,
    ) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            let model = self.require_owned_expense(&db_tx, expense_id, identity).await?;
            let old_category = model.category_id;

            // Validate the pair as it will be stored, not just the patch.
            let new_recurring = recurring.unwrap_or(model.recurring);
            let new_frequency = match frequency {
                Some(frequency) => frequency,
                None => model
                    .frequency
                    .as_deref()
                    .map(Frequency::try_from)
                    .transpose()?,
            };
            if new_recurring && new_frequency.is_none() {
                return Err(EngineError::Validation(
                    "recurring expense requires a frequency".to_string(),
                ));
            }

            let new_category = match category_id {
                Some(category_id) if category_id != old_category => {
                    self.require_active_category(&db_tx, category_id).await?;
                    category_id
                }
                _ => old_category,
            };

            let mut active: expenses::ActiveModel = model.into();
            if let Some(amount_minor) = amount_minor {
                if amount_minor < 0 {
                    return Err(EngineError::Validation(
                        "expense amount must be >= 0".to_string(),
                    ));
                }
                active.amount_minor = ActiveValue::Set(amount_minor);
            }
            if let Some(description) = description {
                active.description =
                    ActiveValue::Set(normalize_required(description, "expense description")?);
            }
            if let Some(date) = date {
                active.date = ActiveValue::Set(date);
            }
            if let Some(payment_method) = payment_method {
                active.payment_method = ActiveValue::Set(payment_method.as_str().to_string());
            }
            active.recurring = ActiveValue::Set(new_recurring);
            active.frequency =
                ActiveValue::Set(new_frequency.map(|f| f.as_str().to_string()));
            if let Some(attachments) = attachments {
                active.attachments = ActiveValue::Set(serde_json::json!(attachments));
            }
            active.category_id = ActiveValue::Set(new_category);

            let model = active.update(&db_tx).await?;

            self.reconcile_budgets(&db_tx, &identity.username, old_category)
                .await?;
            if new_category != old_category {
                self.reconcile_budgets(&db_tx, &identity.username, new_category)
                    .await?;
            }

            Expense::try_from(model)
        })
    }

    /// Delete an expense owned by the caller and reconcile its budgets.
    ///
    /// The source system skipped reconciliation on delete; recomputing the
    /// full aggregate here keeps `spent_minor` honest after removals.
    pub async fn delete_expense(&self, identity: &Identity, expense_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_owned_expense(&db_tx, expense_id, identity).await?;
            let category_id = model.category_id;

            expenses::Entity::delete_by_id(expense_id).exec(&db_tx).await?;

            self.reconcile_budgets(&db_tx, &identity.username, category_id)
                .await?;
            Ok(())
        })
    }

    /// Resolve the approval sub-record of an expense. Admin only; the record
    /// must still be `requested`.
    pub async fn set_expense_approval(
        &self,
        identity: &Identity,
        expense_id: Uuid,
        status: ApprovalStatus,
        note: Option<&str>,
    ) -> ResultEngine<Expense> {
        self.require_admin(identity)?;
        if !status.is_terminal() {
            return Err(EngineError::Validation(
                "approval status must be approved or denied".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let model = expenses::Entity::find_by_id(expense_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;

            let current = ApprovalStatus::try_from(model.approval_status.as_str())?;
            if current.is_terminal() {
                return Err(EngineError::InvalidState(format!(
                    "expense approval already {}",
                    current.as_str()
                )));
            }

            let mut active: expenses::ActiveModel = model.into();
            active.approval_status = ActiveValue::Set(status.as_str().to_string());
            active.approval_note = ActiveValue::Set(note.map(str::trim).map(ToString::to_string));
            let model = active.update(&db_tx).await?;
            Expense::try_from(model)
        })
    }

    /// List the caller's expenses, newest date first.
    pub async fn list_expenses(&self, identity: &Identity) -> ResultEngine<Vec<Expense>> {
        let models = expenses::Entity::find()
            .filter(expenses::Column::Owner.eq(identity.username.clone()))
            .order_by_desc(expenses::Column::Date)
            .all(&self.database)
            .await?;
        models.into_iter().map(Expense::try_from).collect()
    }

    /// Fetch a single expense; visible to the owner and to admins.
    pub async fn expense(&self, identity: &Identity, expense_id: Uuid) -> ResultEngine<Expense> {
        let model = expenses::Entity::find_by_id(expense_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
        if model.owner != identity.username && !identity.can_administer() {
            return Err(EngineError::KeyNotFound("expense not exists".to_string()));
        }
        Expense::try_from(model)
    }

    async fn require_owned_expense(
        &self,
        db_tx: &DatabaseTransaction,
        expense_id: Uuid,
        identity: &Identity,
    ) -> ResultEngine<expenses::Model> {
        expenses::Entity::find_by_id(expense_id)
            .filter(expenses::Column::Owner.eq(identity.username.clone()))
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))
    }
}
