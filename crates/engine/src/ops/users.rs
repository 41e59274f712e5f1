use sea_orm::{PaginatorTrait, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    EngineError, ResultEngine, User,
    auth::{self, Claims},
    users::{self, Role},
};

use super::{Engine, normalize_email, normalize_required_name, with_tx};

impl Engine {
    /// Creates a user and returns it with a fresh token.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Option<Role>,
    ) -> ResultEngine<(User, String)> {
        let user = self
            .create_user(name, email, password, role.unwrap_or_default())
            .await?;
        let token = self.tokens.issue(user.id, &user.email, user.role)?;
        Ok((user, token))
    }

    /// Creates a user without issuing a token.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> ResultEngine<User> {
        let name = normalize_required_name(name, "name")?;
        let email = normalize_email(email)?;
        if password.is_empty() {
            return Err(EngineError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }
        let hash = auth::hash_password(password, self.bcrypt_cost).await?;

        let model = with_tx!(self, |db_tx| {
            let exists = users::Entity::find()
                .filter(users::Column::Email.eq(email.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey("email".to_string()));
            }
            users::new_active_model(&name, &email, hash, role)
                .insert(&db_tx)
                .await
                .map_err(|err| EngineError::from_db(err, "email"))
        })?;

        tracing::info!(user_id = model.id, role = role.as_str(), "user created");
        User::try_from(model)
    }

    /// Checks credentials. Unknown email and wrong password fail the same way.
    pub async fn login(&self, email: &str, password: &str) -> ResultEngine<(User, String)> {
        let email = email.trim().to_lowercase();
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(&self.database)
            .await?;

        let Some(model) = model else {
            auth::verify_password(password, &self.decoy_hash).await?;
            tracing::debug!("login rejected: unknown email");
            return Err(EngineError::InvalidCredentials);
        };
        if !auth::verify_password(password, &model.password).await? {
            tracing::debug!(user_id = model.id, "login rejected: wrong password");
            return Err(EngineError::InvalidCredentials);
        }

        let user = User::try_from(model)?;
        let token = self.tokens.issue(user.id, &user.email, user.role)?;
        tracing::info!(user_id = user.id, "login");
        Ok((user, token))
    }

    /// Returns the user behind a token.
    pub async fn profile(&self, user_id: i32) -> ResultEngine<User> {
        let model = users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user".to_string()))?;
        User::try_from(model)
    }

    /// Verifies signature and expiry of a bearer token.
    pub fn verify_token(&self, token: &str) -> ResultEngine<Claims> {
        self.tokens.verify(token)
    }

    pub async fn user_count(&self) -> ResultEngine<u64> {
        Ok(users::Entity::find().count(&self.database).await?)
    }
}
