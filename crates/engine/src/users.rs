//! Users table and the `Role` a user acts with.
//!
//! Users are created by registration or by the admin CLI and are never
//! deleted in the normal flow. The password column only ever holds a bcrypt
//! hash.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{EngineError, ResultEngine};

pub use api_types::auth::Role;

/// A user as exposed outside the engine (no password hash).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password: String,
    pub role: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::budgets::Entity")]
    Budgets,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(value: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: value.id,
            role: value.role.parse().map_err(EngineError::InvalidInput)?,
            name: value.name,
            email: value.email,
            created_at: value.created_at,
        })
    }
}

/// Builds the row for a new user. `password_hash` must already be hashed.
pub(crate) fn new_active_model(
    name: &str,
    email: &str,
    password_hash: String,
    role: Role,
) -> ActiveModel {
    let now = Utc::now();
    ActiveModel {
        id: ActiveValue::NotSet,
        name: ActiveValue::Set(name.to_string()),
        email: ActiveValue::Set(email.to_string()),
        password: ActiveValue::Set(password_hash),
        role: ActiveValue::Set(role.as_str().to_string()),
        created_at: ActiveValue::Set(now),
        updated_at: ActiveValue::Set(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_literals() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::Funcionaria.as_str(), "FUNCIONARIA");
        assert!("admin".parse::<Role>().is_err());
        assert_eq!(Role::default(), Role::Funcionaria);
    }
}
