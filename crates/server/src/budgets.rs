//! Budgets API endpoints
use api_types::Message;
use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use engine::{BudgetItemDraft, BudgetNew as NewBudget, BudgetPatch, Claims};

use crate::{
    ServerError,
    extract::{Path, ValidatedJson},
    server::ServerState,
    types::budget::{BudgetItemNew, BudgetNew, BudgetStatusUpdate, BudgetUpdate, BudgetView},
    views,
};

fn drafts(items: Vec<BudgetItemNew>) -> Vec<BudgetItemDraft> {
    items
        .into_iter()
        .map(|item| {
            BudgetItemDraft::new(
                item.description,
                item.unit_price.unwrap_or_default(),
                item.quantity.unwrap_or(1),
            )
        })
        .collect()
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<BudgetView>>, ServerError> {
    let budgets = state.engine.budgets().await?;
    Ok(Json(views::budgets(budgets)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<BudgetView>, ServerError> {
    let budget = state.engine.budget(id).await?;
    Ok(Json(views::budget(budget)))
}

pub async fn by_patient(
    State(state): State<ServerState>,
    Path(patient_id): Path<i32>,
) -> Result<Json<Vec<BudgetView>>, ServerError> {
    let budgets = state.engine.budgets_for_patient(patient_id).await?;
    Ok(Json(views::budgets(budgets)))
}

/// The authenticated user is recorded as the creator.
pub async fn create(
    Extension(claims): Extension<Claims>,
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<BudgetNew>,
) -> Result<(StatusCode, Json<BudgetView>), ServerError> {
    let input = NewBudget {
        patient_id: payload.patient_id.unwrap_or_default(),
        dentist_id: payload.dentist_id,
        items: drafts(payload.items),
        notes: payload.notes,
        discount: payload.discount.unwrap_or_default(),
    };

    let budget = state.engine.new_budget(claims.id, &input).await?;
    Ok((StatusCode::CREATED, Json(views::budget(budget))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<BudgetUpdate>,
) -> Result<Json<BudgetView>, ServerError> {
    let patch = BudgetPatch {
        status: payload
            .status
            .as_deref()
            .map(views::parse_status)
            .transpose()?,
        notes: payload.notes,
        dentist_id: payload.dentist_id,
        discount: payload.discount,
        items: payload.items.map(drafts),
    };

    let budget = state.engine.update_budget(id, &patch).await?;
    Ok(Json(views::budget(budget)))
}

pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<BudgetStatusUpdate>,
) -> Result<Json<BudgetView>, ServerError> {
    let status = views::parse_status(&payload.status)?;
    let budget = state.engine.set_budget_status(id, status).await?;
    Ok(Json(views::budget(budget)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Message>, ServerError> {
    state.engine.delete_budget(id).await?;

    Ok(Json(Message {
        message: "budget deleted".to_string(),
    }))
}
