//! Budget ledger and spend reconciliation.
//!
//! `spent_minor` is always recomputed as a full aggregate over the matching
//! expenses, never adjusted by a delta. Recomputation is idempotent and
//! order-independent, so concurrent expense writes can only race towards the
//! same final value.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{Budget, EngineError, Period, ResultEngine, budgets, expenses, util::normalize_required};

use super::{Engine, Identity, with_tx};

impl Engine {
    /// Create a budget. The end date is derived from `start_date` and
    /// `period`; the initial `spent_minor` is computed from the expenses
    /// already inside the window. At most one active budget may cover a given
    /// (category scope, period) window at a time.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_budget(
        &self,
        identity: &Identity,
        name: &str,
        amount_minor: i64,
        period: Period,
        category_id: Option<Uuid>,
        start_date: NaiveDate,
        threshold_pct: Option<i32>,
    ) -> ResultEngine<Budget> {
        let name = normalize_required(name, "budget name")?;
        if amount_minor <= 0 {
            return Err(EngineError::Validation(
                "budget amount must be > 0".to_string(),
            ));
        }
        let threshold_pct = validate_threshold(threshold_pct)?;
        let end_date = period.window_end(start_date);

        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, &identity.username).await?;
            if let Some(category_id) = category_id {
                self.require_category_exists(&db_tx, category_id).await?;
            }
            self.require_window_free(
                &db_tx,
                &identity.username,
                period,
                category_id,
                start_date,
                end_date,
                None,
            )
            .await?;

            let spent_minor = self
                .aggregate_spent(&db_tx, &identity.username, category_id, start_date, end_date)
                .await?;

            let active = budgets::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                owner: ActiveValue::Set(identity.username.clone()),
                name: ActiveValue::Set(name.clone()),
                amount_minor: ActiveValue::Set(amount_minor),
                spent_minor: ActiveValue::Set(spent_minor),
                period: ActiveValue::Set(period.as_str().to_string()),
                category_id: ActiveValue::Set(category_id),
                start_date: ActiveValue::Set(start_date),
                end_date: ActiveValue::Set(end_date),
                active: ActiveValue::Set(true),
                threshold_pct: ActiveValue::Set(threshold_pct),
            };
            let model = active.insert(&db_tx).await?;
            Budget::try_from(model)
        })
    }

    /// Update a budget owned by the caller.
    ///
    /// The end date is re-derived whenever `start_date` or `period` changes,
    /// and `spent_minor` is recomputed against the (possibly new) window.
    /// `category_id: Some(None)` clears the scope back to all categories.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_budget(
        &self,
        identity: &Identity,
        budget_id: Uuid,
        name: Option<&str>,
        amount_minor: Option<i64>,
        period: Option<Period>,
        category_id: Option<Option<Uuid>>,
        start_date: Option<NaiveDate>,
        active: Option<bool>,
        threshold_pct: Option<i32>,
    ) -> ResultEngine<Budget> {
        with_tx!(self, |db_tx| {
            let model = self.require_owned_budget(&db_tx, budget_id, identity).await?;

            let new_period = match period {
                Some(period) => period,
                None => Period::try_from(model.period.as_str())?,
            };
            let new_start = start_date.unwrap_or(model.start_date);
            let new_end = new_period.window_end(new_start);
            let new_scope = match category_id {
                Some(Some(category_id)) => {
                    self.require_category_exists(&db_tx, category_id).await?;
                    Some(category_id)
                }
                Some(None) => None,
                None => model.category_id,
            };
            let new_active = active.unwrap_or(model.active);
            if new_active {
                self.require_window_free(
                    &db_tx,
                    &identity.username,
                    new_period,
                    new_scope,
                    new_start,
                    new_end,
                    Some(budget_id),
                )
                .await?;
            }

            let mut active_model: budgets::ActiveModel = model.into();
            if let Some(name) = name {
                active_model.name = ActiveValue::Set(normalize_required(name, "budget name")?);
            }
            if let Some(amount_minor) = amount_minor {
                if amount_minor <= 0 {
                    return Err(EngineError::Validation(
                        "budget amount must be > 0".to_string(),
                    ));
                }
                active_model.amount_minor = ActiveValue::Set(amount_minor);
            }
            if let Some(threshold_pct) = threshold_pct {
                active_model.threshold_pct = ActiveValue::Set(validate_threshold(Some(threshold_pct))?);
            }
            if let Some(active) = active {
                active_model.active = ActiveValue::Set(active);
            }
            active_model.period = ActiveValue::Set(new_period.as_str().to_string());
            active_model.category_id = ActiveValue::Set(new_scope);
            active_model.start_date = ActiveValue::Set(new_start);
            active_model.end_date = ActiveValue::Set(new_end);

            let spent_minor = self
                .aggregate_spent(&db_tx, &identity.username, new_scope, new_start, new_end)
                .await?;
            active_model.spent_minor = ActiveValue::Set(spent_minor);

            let model = active_model.update(&db_tx).await?;
            Budget::try_from(model)
        })
    }

    /// Delete a budget owned by the caller.
    pub async fn delete_budget(&self, identity: &Identity, budget_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_owned_budget(&db_tx, budget_id, identity).await?;
            budgets::Entity::delete_by_id(budget_id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// List the caller's budgets, newest window first.
    pub async fn list_budgets(&self, identity: &Identity) -> ResultEngine<Vec<Budget>> {
        let models = budgets::Entity::find()
            .filter(budgets::Column::Owner.eq(identity.username.clone()))
            .order_by_desc(budgets::Column::StartDate)
            .all(&self.database)
            .await?;
        models.into_iter().map(Budget::try_from).collect()
    }

    /// Fetch a budget owned by the caller.
    pub async fn budget(&self, identity: &Identity, budget_id: Uuid) -> ResultEngine<Budget> {
        with_tx!(self, |db_tx| {
            let model = self.require_owned_budget(&db_tx, budget_id, identity).await?;
            Budget::try_from(model)
        })
    }

    /// Reconcile every budget of `owner` whose window currently contains
    /// "now" and whose scope covers `category_id`.
    ///
    /// Called from expense create/update/delete inside the same transaction.
    /// A miss is an intentional no-op: an expense is valid without a budget.
    pub(super) async fn reconcile_budgets(
        &self,
        db_tx: &DatabaseTransaction,
        owner: &str,
        category_id: Uuid,
    ) -> ResultEngine<()> {
        let today = Utc::now().date_naive();

        let models = budgets::Entity::find()
            .filter(budgets::Column::Owner.eq(owner))
            .filter(budgets::Column::Active.eq(true))
            .filter(budgets::Column::StartDate.lte(today))
            .filter(budgets::Column::EndDate.gte(today))
            .filter(
                Condition::any()
                    .add(budgets::Column::CategoryId.is_null())
                    .add(budgets::Column::CategoryId.eq(category_id)),
            )
            .all(db_tx)
            .await?;

        for model in models {
            let spent_minor = self
                .aggregate_spent(
                    db_tx,
                    owner,
                    model.category_id,
                    model.start_date,
                    model.end_date,
                )
                .await?;
            if spent_minor != model.spent_minor {
                tracing::debug!(
                    budget = %model.id,
                    old = model.spent_minor,
                    new = spent_minor,
                    "reconciled budget spend"
                );
                let active = budgets::ActiveModel {
                    id: ActiveValue::Set(model.id),
                    spent_minor: ActiveValue::Set(spent_minor),
                    ..Default::default()
                };
                active.update(db_tx).await?;
            }
        }
        Ok(())
    }

    /// Full aggregate over matching expenses inside [start, end].
    async fn aggregate_spent(
        &self,
        db_tx: &DatabaseTransaction,
        owner: &str,
        category_id: Option<Uuid>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> ResultEngine<i64> {
        let mut query = expenses::Entity::find()
            .select_only()
            .column_as(expenses::Column::AmountMinor.sum(), "total")
            .filter(expenses::Column::Owner.eq(owner))
            .filter(expenses::Column::Date.gte(start_date))
            .filter(expenses::Column::Date.lte(end_date));
        if let Some(category_id) = category_id {
            query = query.filter(expenses::Column::CategoryId.eq(category_id));
        }

        let total: Option<Option<i64>> = query.into_tuple().one(db_tx).await?;
        Ok(total.flatten().unwrap_or(0))
    }

    /// One active budget per (owner, category scope, period) at a time: reject
    /// a window that overlaps another active budget with the same scope and
    /// period.
    #[allow(clippy::too_many_arguments)]
    async fn require_window_free(
        &self,
        db_tx: &DatabaseTransaction,
        owner: &str,
        period: Period,
        category_id: Option<Uuid>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = budgets::Entity::find()
            .filter(budgets::Column::Owner.eq(owner))
            .filter(budgets::Column::Active.eq(true))
            .filter(budgets::Column::Period.eq(period.as_str()))
            .filter(budgets::Column::StartDate.lte(end_date))
            .filter(budgets::Column::EndDate.gte(start_date));
        query = match category_id {
            Some(category_id) => query.filter(budgets::Column::CategoryId.eq(category_id)),
            None => query.filter(budgets::Column::CategoryId.is_null()),
        };
        if let Some(id) = exclude {
            query = query.filter(budgets::Column::Id.ne(id));
        }

        if query.one(db_tx).await?.is_some() {
            return Err(EngineError::ExistingKey(
                "budget for this category and period".to_string(),
            ));
        }
        Ok(())
    }

    async fn require_owned_budget(
        &self,
        db_tx: &DatabaseTransaction,
        budget_id: Uuid,
        identity: &Identity,
    ) -> ResultEngine<budgets::Model> {
        budgets::Entity::find_by_id(budget_id)
            .filter(budgets::Column::Owner.eq(identity.username.clone()))
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("budget not exists".to_string()))
    }

    async fn require_category_exists(
        &self,
        db_tx: &DatabaseTransaction,
        category_id: Uuid,
    ) -> ResultEngine<()> {
        let exists = crate::categories::Entity::find_by_id(category_id)
            .one(db_tx)
            .await?
            .is_some();
        if !exists {
            return Err(EngineError::KeyNotFound("category not exists".to_string()));
        }
        Ok(())
    }
}

fn validate_threshold(threshold_pct: Option<i32>) -> ResultEngine<i32> {
    let value = threshold_pct.unwrap_or(crate::budgets::WARNING_THRESHOLD_PCT as i32);
    if !(1..=100).contains(&value) {
        return Err(EngineError::Validation(
            "threshold_pct must be within 1..=100".to_string(),
        ));
    }
    Ok(value)
}
