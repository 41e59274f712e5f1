//! Registration, login and profile endpoints.
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::Claims;

use crate::{
    ServerError,
    extract::ValidatedJson,
    server::ServerState,
    types::auth::{AuthResponse, LoginRequest, RegisterRequest, UserView},
    views,
};

pub async fn register(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ServerError> {
    let role = payload.role.as_deref().map(views::parse_role).transpose()?;

    let (user, token) = state
        .engine
        .register(&payload.name, &payload.email, &payload.password, role)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: views::user(user),
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ServerError> {
    let (user, token) = state
        .engine
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(AuthResponse {
        user: views::user(user),
        token,
    }))
}

pub async fn profile(
    Extension(claims): Extension<Claims>,
    State(state): State<ServerState>,
) -> Result<Json<UserView>, ServerError> {
    let user = state.engine.profile(claims.id).await?;
    Ok(Json(views::user(user)))
}
