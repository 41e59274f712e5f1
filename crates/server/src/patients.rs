//! Patients API endpoints
use api_types::Message;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use engine::{PatientNew, PatientPatch};

use crate::{
    ServerError,
    extract::{Path, ValidatedJson},
    server::ServerState,
    types::patient::{PatientNew as PatientBody, PatientUpdate, PatientView},
    views,
};

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<PatientView>>, ServerError> {
    let patients = state.engine.patients().await?;

    Ok(Json(
        patients
            .into_iter()
            .map(|overview| PatientView {
                budget_count: Some(overview.budget_count),
                ..views::patient(overview.patient)
            })
            .collect(),
    ))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<PatientView>, ServerError> {
    let detail = state.engine.patient(id).await?;

    Ok(Json(PatientView {
        budgets: Some(views::budgets(detail.budgets)),
        ..views::patient(detail.patient)
    }))
}

pub async fn create(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<PatientBody>,
) -> Result<(StatusCode, Json<PatientView>), ServerError> {
    let patient = state
        .engine
        .new_patient(&PatientNew {
            name: payload.name,
            phone: payload.phone,
            email: payload.email,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(views::patient(patient))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<PatientUpdate>,
) -> Result<Json<PatientView>, ServerError> {
    let patient = state
        .engine
        .update_patient(
            id,
            &PatientPatch {
                name: payload.name,
                phone: payload.phone,
                email: payload.email,
            },
        )
        .await?;

    Ok(Json(views::patient(patient)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Message>, ServerError> {
    state.engine.delete_patient(id).await?;

    Ok(Json(Message {
        message: "patient deleted".to_string(),
    }))
}
