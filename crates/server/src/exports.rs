//! Spreadsheet downloads.
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use reports::{ReportError, XLSX_CONTENT_TYPE};

use crate::{ServerError, server::ServerState};

fn attachment(bytes: Vec<u8>, file_name: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={file_name}"),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// Builds a workbook off the async runtime.
async fn render<F>(build: F) -> Result<Vec<u8>, ServerError>
where
    F: FnOnce() -> Result<Vec<u8>, ReportError> + Send + 'static,
{
    tokio::task::spawn_blocking(build)
        .await
        .map_err(|err| ServerError::Internal(format!("report task failed: {err}")))?
        .map_err(ServerError::from)
}

pub async fn budgets(State(state): State<ServerState>) -> Result<Response, ServerError> {
    let budgets = state.engine.budgets().await?;
    let now = Utc::now();
    let count = budgets.len();

    let bytes = render(move || reports::budgets_workbook(&budgets, now)).await?;
    tracing::info!(budgets = count, "budgets report exported");

    Ok(attachment(bytes, reports::budgets_file_name(now)))
}

pub async fn patients(State(state): State<ServerState>) -> Result<Response, ServerError> {
    let patients = state.engine.patients().await?;
    let now = Utc::now();

    let bytes = render(move || reports::patients_workbook(&patients)).await?;

    Ok(attachment(bytes, reports::patients_file_name(now)))
}
