//! Category visibility state machine.

use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Category, CategoryState, EngineError, ResultEngine, categories,
    util::{normalize_name_key, normalize_optional_text, normalize_required, validate_hex_color},
};

use super::{Engine, Identity, with_tx};

impl Engine {
    /// Create a category.
    ///
    /// Admin callers get an `active` category; everyone else gets a `pending`
    /// one, and the HTTP layer raises the companion approval thread. The
    /// normalized name must be unique among non-inactive categories.
    pub async fn create_category(
        &self,
        identity: &Identity,
        name: &str,
        color: &str,
        icon: Option<&str>,
    ) -> ResultEngine<Category> {
        let name = normalize_required(name, "category name")?;
        let name_norm = normalize_name_key(&name)?;
        let color = validate_hex_color(color)?;
        let icon = normalize_optional_text(icon);

        let state = if identity.can_administer() {
            CategoryState::Active
        } else {
            CategoryState::Pending
        };

        with_tx!(self, |db_tx| {
            self.require_name_free(&db_tx, &name_norm, None).await?;

            let id = Uuid::new_v4();
            let active = categories::ActiveModel {
                id: ActiveValue::Set(id),
                name: ActiveValue::Set(name.clone()),
                name_norm: ActiveValue::Set(name_norm.clone()),
                color: ActiveValue::Set(color.clone()),
                icon: ActiveValue::Set(icon.clone()),
                state: ActiveValue::Set(state.as_str().to_string()),
            };
            let model = active.insert(&db_tx).await?;
            Category::try_from(model)
        })
    }

    /// Update name/color/icon of a category. A rename re-checks uniqueness
    /// excluding the category itself; `icon: Some(None)` clears the icon.
    pub async fn update_category(
        &self,
        category_id: Uuid,
        name: Option<&str>,
        color: Option<&str>,
        icon: Option<Option<&str>>,
    ) -> ResultEngine<Category> {
        with_tx!(self, |db_tx| {
            let model = categories::Entity::find_by_id(category_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;

            let mut active: categories::ActiveModel = model.into();

            if let Some(name) = name {
                let name = normalize_required(name, "category name")?;
                let name_norm = normalize_name_key(&name)?;
                self.require_name_free(&db_tx, &name_norm, Some(category_id))
                    .await?;
                active.name = ActiveValue::Set(name);
                active.name_norm = ActiveValue::Set(name_norm);
            }
            if let Some(color) = color {
                active.color = ActiveValue::Set(validate_hex_color(color)?);
            }
            if let Some(icon) = icon {
                active.icon = ActiveValue::Set(normalize_optional_text(icon));
            }

            let model = active.update(&db_tx).await?;
            Category::try_from(model)
        })
    }

    /// Soft-delete: flip the lifecycle tag to `inactive`, keep the row so
    /// existing expenses stay resolvable.
    pub async fn soft_delete_category(&self, category_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = categories::Entity::find_by_id(category_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;

            let mut active: categories::ActiveModel = model.into();
            active.state = ActiveValue::Set(CategoryState::Inactive.as_str().to_string());
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Activate or deactivate a category. Admin only; activating a `pending`
    /// category is how a user-requested category goes live.
    pub async fn set_category_active(
        &self,
        identity: &Identity,
        category_id: Uuid,
        active: bool,
    ) -> ResultEngine<Category> {
        self.require_admin(identity)?;

        let state = if active {
            CategoryState::Active
        } else {
            CategoryState::Inactive
        };

        with_tx!(self, |db_tx| {
            let model = categories::Entity::find_by_id(category_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;

            if state == CategoryState::Active {
                self.require_name_free(&db_tx, &model.name_norm, Some(category_id))
                    .await?;
            }

            let mut active_model: categories::ActiveModel = model.into();
            active_model.state = ActiveValue::Set(state.as_str().to_string());
            let model = active_model.update(&db_tx).await?;
            Category::try_from(model)
        })
    }

    /// List categories sorted by name. Admins see every state; everyone else
    /// sees only active categories.
    pub async fn list_categories(&self, identity: &Identity) -> ResultEngine<Vec<Category>> {
        let mut query = categories::Entity::find().order_by_asc(categories::Column::Name);
        if !identity.can_administer() {
            query = query.filter(categories::Column::State.eq(CategoryState::Active.as_str()));
        }

        let models = query.all(&self.database).await?;
        models.into_iter().map(Category::try_from).collect()
    }

    /// Fetch a single category by id.
    pub async fn category(&self, category_id: Uuid) -> ResultEngine<Category> {
        let model = categories::Entity::find_by_id(category_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;
        Category::try_from(model)
    }

    /// A category is usable for a new expense only while `active`.
    pub(super) async fn require_active_category(
        &self,
        db: &DatabaseTransaction,
        category_id: Uuid,
    ) -> ResultEngine<categories::Model> {
        let model = categories::Entity::find_by_id(category_id)
            .filter(categories::Column::State.eq(CategoryState::Active.as_str()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;
        Ok(model)
    }

    async fn require_name_free(
        &self,
        db: &DatabaseTransaction,
        name_norm: &str,
        exclude: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = categories::Entity::find()
            .filter(categories::Column::NameNorm.eq(name_norm))
            .filter(categories::Column::State.ne(CategoryState::Inactive.as_str()));
        if let Some(id) = exclude {
            query = query.filter(categories::Column::Id.ne(id));
        }

        if query.one(db).await?.is_some() {
            return Err(EngineError::ExistingKey(name_norm.to_string()));
        }
        Ok(())
    }
}
