use axum::{
    Router,
    extract::{Request, State},
    handler::Handler,
    http::{HeaderValue, Method, Uri, header},
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use std::{future::Future, sync::Arc};

use crate::{ServerError, auth, budgets, dentists, exports, health, patients};
use engine::{Claims, Engine, Role};

const ADMIN_ONLY: &[Role] = &[Role::Admin];

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// HTTP settings that do not belong to the engine.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// The only origin allowed by CORS.
    pub cors_origin: HeaderValue,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            cors_origin: HeaderValue::from_static("http://localhost:5173"),
        }
    }
}

/// Bearer token check. A missing token is 401, a bad or expired one 403.
///
/// On success the token [`Claims`] are stored in the request extensions.
async fn authenticate(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(bearer) = request.headers().typed_get::<Authorization<Bearer>>() else {
        return Err(ServerError::Unauthorized("token not provided".to_string()));
    };

    let claims = state.engine.verify_token(bearer.token()).map_err(|err| {
        tracing::debug!("token rejected: {err}");
        ServerError::Forbidden("invalid or expired token".to_string())
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Lets the request through only for the listed roles. Must run after
/// [`authenticate`].
async fn require_role(
    State(allowed): State<&'static [Role]>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    match request.extensions().get::<Claims>() {
        Some(claims) if allowed.contains(&claims.role) => Ok(next.run(request).await),
        Some(claims) => {
            tracing::debug!(user_id = claims.id, "role not allowed");
            Err(ServerError::Forbidden("insufficient permissions".to_string()))
        }
        None => Err(ServerError::Unauthorized("token not provided".to_string())),
    }
}

async fn route_not_found(uri: Uri) -> ServerError {
    ServerError::RouteNotFound(uri.path().to_string())
}

fn cors(config: &ServerConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(config.cors_origin.clone())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

pub fn router(engine: Arc<Engine>, config: &ServerConfig) -> Router {
    let state = ServerState { engine };

    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let protected = Router::new()
        .route("/auth/profile", get(auth::profile))
        .route("/patients", get(patients::list).post(patients::create))
        .route(
            "/patients/{id}",
            get(patients::get)
                .put(patients::update)
                .delete(patients::delete),
        )
        .route("/dentists", get(dentists::list).post(dentists::create))
        .route("/dentists/active", get(dentists::active))
        .route(
            "/dentists/{id}",
            get(dentists::get).put(dentists::update).delete(
                dentists::delete
                    .layer(middleware::from_fn_with_state(ADMIN_ONLY, require_role)),
            ),
        )
        .route("/budgets", get(budgets::list).post(budgets::create))
        .route("/budgets/patient/{patient_id}", get(budgets::by_patient))
        .route(
            "/budgets/{id}",
            get(budgets::get)
                .put(budgets::update)
                .delete(budgets::delete),
        )
        .route("/budgets/{id}/status", patch(budgets::update_status))
        .route("/reports/export/budgets", get(exports::budgets))
        .route("/reports/export/patients", get(exports::patients))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", public.merge(protected))
        .fallback(route_not_found)
        .layer(cors(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves until `shutdown` resolves, then lets in-flight requests finish.
pub async fn run_with_listener<F>(
    engine: Arc<Engine>,
    config: &ServerConfig,
    listener: tokio::net::TcpListener,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine, config))
        .with_graceful_shutdown(shutdown)
        .await
}
