use sea_orm::DatabaseConnection;

use crate::{
    EngineError, ResultEngine,
    auth::{self, AuthConfig, TokenIssuer},
};

mod budgets;
mod dentists;
mod patients;
mod users;

pub use patients::PatientDetail;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    tokens: TokenIssuer,
    bcrypt_cost: u32,
    decoy_hash: String,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The store handle the engine was built with.
    pub fn database(&self) -> &DatabaseConnection {
        &self.database
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn normalize_email(value: &str) -> ResultEngine<String> {
    let email = value.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(EngineError::InvalidInput("invalid email".to_string()));
    }
    Ok(email)
}

fn normalize_optional_email(value: Option<&str>) -> ResultEngine<Option<String>> {
    normalize_optional_text(value)
        .map(|email| normalize_email(&email))
        .transpose()
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    auth: AuthConfig,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Token secret, token lifetime and bcrypt cost.
    pub fn auth(mut self, auth: AuthConfig) -> EngineBuilder {
        self.auth = auth;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let tokens = TokenIssuer::new(&self.auth)?;
        let decoy_hash = auth::decoy_hash(self.auth.bcrypt_cost).await?;
        Ok(Engine {
            database: self.database,
            tokens,
            bcrypt_cost: self.auth.bcrypt_cost,
            decoy_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn decoy_hash_uses_the_configured_cost() {
        let engine = Engine::builder()
            .auth(AuthConfig {
                jwt_secret: "test-secret".to_string(),
                bcrypt_cost: 5,
                ..AuthConfig::default()
            })
            .build()
            .await
            .unwrap();
        assert!(engine.decoy_hash.starts_with("$2b$05$"));
    }

    #[test]
    fn optional_text_drops_blank_values() {
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(normalize_optional_text(Some(" x ")), Some("x".to_string()));
        assert_eq!(normalize_optional_text(None), None);
    }

    #[test]
    fn emails_are_lowercased() {
        assert_eq!(normalize_email(" Ana@Clinica.COM ").unwrap(), "ana@clinica.com");
        assert!(normalize_email("nope").is_err());
        assert_eq!(normalize_optional_email(Some("")).unwrap(), None);
    }

    #[test]
    fn required_names_are_trimmed() {
        assert_eq!(normalize_required_name(" Ana ", "name").unwrap(), "Ana");
        assert_eq!(
            normalize_required_name("   ", "patient name"),
            Err(EngineError::InvalidInput(
                "patient name must not be empty".to_string()
            ))
        );
    }
}
