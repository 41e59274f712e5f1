use std::{error::Error, sync::Arc};

use engine::{AuthConfig, Engine};
use migration::{Migrator, MigratorTrait};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "clinica={level},server={level},engine={level},reports={level},tower_http={level}",
            level = settings.app.level
        ))
        .init();

    let db = connect_db(&settings.database).await?;

    let engine = Engine::builder()
        .database(db.clone())
        .auth(AuthConfig {
            jwt_secret: settings.auth.jwt_secret,
            token_ttl_secs: settings.auth.token_ttl_secs,
            bcrypt_cost: settings.auth.bcrypt_cost,
        })
        .build()
        .await?;

    let config = server::ServerConfig {
        cors_origin: settings.server.cors_origin.parse()?,
    };
    let addr = format!("{}:{}", settings.server.bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let served =
        server::run_with_listener(Arc::new(engine), &config, listener, shutdown_signal()).await;
    if let Err(err) = &served {
        tracing::error!("server failed: {err}");
    }

    db.close().await?;
    tracing::info!("database closed");
    Ok(served?)
}

async fn connect_db(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let database = sea_orm::Database::connect(config.url()).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
