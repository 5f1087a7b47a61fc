//! Caller identity and the capability-check seam.
//!
//! Every workflow operation takes an [`Identity`] instead of comparing role
//! strings inline. Ownership checks that must not leak existence return
//! `KeyNotFound`; capability checks return `Forbidden`.

use sea_orm::{DatabaseTransaction, prelude::*};

use crate::{EngineError, ResultEngine, users};

use super::Engine;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(EngineError::Validation(format!("invalid role: {other}"))),
        }
    }
}

/// The authenticated caller, supplied by the auth collaborator on every call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub role: Role,
}

impl Identity {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    /// The single capability policy: admins administer, everyone else doesn't.
    pub fn can_administer(&self) -> bool {
        self.role == Role::Admin
    }
}

impl TryFrom<&users::Model> for Identity {
    type Error = EngineError;

    fn try_from(model: &users::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            username: model.username.clone(),
            role: Role::try_from(model.role.as_str())?,
        })
    }
}

impl Engine {
    pub(super) fn require_admin(&self, identity: &Identity) -> ResultEngine<()> {
        if !identity.can_administer() {
            return Err(EngineError::Forbidden(
                "admin capability required".to_string(),
            ));
        }
        Ok(())
    }

    pub(super) async fn require_user_exists(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<()> {
        let exists = users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .is_some();
        if !exists {
            return Err(EngineError::KeyNotFound("user not exists".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admins_administer() {
        assert!(Identity::new("root", Role::Admin).can_administer());
        assert!(!Identity::new("alice", Role::User).can_administer());
    }

    #[test]
    fn role_round_trip() {
        assert_eq!(Role::try_from("admin").unwrap(), Role::Admin);
        assert_eq!(Role::try_from("user").unwrap(), Role::User);
        assert!(Role::try_from("root").is_err());
    }
}
