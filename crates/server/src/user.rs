//! The authenticated user entity used by the basic-auth middleware.

use engine::Identity;
use sea_orm::entity::prelude::*;

use crate::ServerError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Build the engine identity from the authenticated user row.
pub fn identity(user: &Model) -> Result<Identity, ServerError> {
    let role = engine::Role::try_from(user.role.as_str())
        .map_err(|_| ServerError::Generic(format!("unknown role for user {}", user.username)))?;
    Ok(Identity::new(user.username.clone(), role))
}
