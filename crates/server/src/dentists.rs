//! Dentists API endpoints
use api_types::Message;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

use crate::{
    ServerError,
    extract::{Path, ValidatedJson},
    server::ServerState,
    types::dentist::{DentistNew, DentistUpdate, DentistView},
    views,
};

fn dentist_input(payload: DentistNew) -> engine::DentistNew {
    engine::DentistNew {
        name: payload.name,
        cro: payload.cro,
        phone: payload.phone,
        email: payload.email,
        specialty: payload.specialty,
        active: payload.active,
    }
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<DentistView>>, ServerError> {
    let dentists = state.engine.dentists().await?;
    Ok(Json(dentists.into_iter().map(views::dentist).collect()))
}

pub async fn active(
    State(state): State<ServerState>,
) -> Result<Json<Vec<DentistView>>, ServerError> {
    let dentists = state.engine.active_dentists().await?;
    Ok(Json(dentists.into_iter().map(views::dentist).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<DentistView>, ServerError> {
    let dentist = state.engine.dentist(id).await?;
    Ok(Json(views::dentist(dentist)))
}

pub async fn create(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<DentistNew>,
) -> Result<(StatusCode, Json<DentistView>), ServerError> {
    let dentist = state.engine.new_dentist(&dentist_input(payload)).await?;
    Ok((StatusCode::CREATED, Json(views::dentist(dentist))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<DentistUpdate>,
) -> Result<Json<DentistView>, ServerError> {
    let dentist = state
        .engine
        .update_dentist(id, &dentist_input(payload))
        .await?;
    Ok(Json(views::dentist(dentist)))
}

/// Admin only. Budgets of the dentist are kept, unassigned.
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Message>, ServerError> {
    state.engine.delete_dentist(id).await?;

    Ok(Json(Message {
        message: "dentist deleted".to_string(),
    }))
}
