//! HTTP request handlers

use axum::{
    body::Bytes,
    extract::{Multipart, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::{render_page, Page, PageView};
use crate::data::{
    preview_rows, read_csv_bytes, EmployeeRecord, CHOICE_FIELDS, NUMERIC_FIELDS, SAMPLE_CSV,
    SAMPLE_FILE_NAME,
};
use crate::inference::{format_currency, PREDICTIONS_FILE_NAME};

use super::error::{Result, ServerError};
use super::state::AppState;

const PREVIEW_ROWS: usize = 5;

// ============================================================================
// Pages
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

fn base_view(state: &AppState) -> PageView {
    PageView::default().with_model(state.predictor.model_name())
}

pub async fn serve_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    let page = query
        .page
        .as_deref()
        .and_then(Page::from_query)
        .unwrap_or_default();
    Html(render_page(page, &base_view(&state)))
}

/// Manual entry form submission
pub async fn submit_manual(
    State(state): State<Arc<AppState>>,
    Form(record): Form<EmployeeRecord>,
) -> Result<(StatusCode, Html<String>)> {
    let view = base_view(&state).with_record(record.clone());

    match state.predictor.predict_record(&record) {
        Ok(prediction) => {
            info!(salary = prediction, "Manual prediction");
            let html = render_page(Page::ManualEntry, &view.with_prediction(prediction));
            Ok((StatusCode::OK, Html(html)))
        }
        Err(e) if e.is_input_error() => {
            warn!(error = %e, "Rejected manual entry");
            let html = render_page(Page::ManualEntry, &view.with_error(e.to_string()));
            Ok((StatusCode::BAD_REQUEST, Html(html)))
        }
        Err(e) => Err(e.into()),
    }
}

/// Bulk upload preview rendered into the page
pub async fn submit_bulk_preview(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Html<String>)> {
    let view = base_view(&state);
    let (_, data) = read_upload(multipart).await?;

    match read_csv_bytes(&data) {
        Ok(df) => {
            let view = view.with_preview(preview_rows(&df, PREVIEW_ROWS));
            Ok((StatusCode::OK, Html(render_page(Page::BulkUpload, &view))))
        }
        Err(e) => {
            let html = render_page(Page::BulkUpload, &view.with_error(e.to_string()));
            Ok((StatusCode::BAD_REQUEST, Html(html)))
        }
    }
}

// ============================================================================
// API
// ============================================================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.predictor.model_name(),
        "uptime_secs": state.uptime_secs(),
    }))
}

/// Feature schema, form choices and the loaded model's metrics
pub async fn get_schema(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let manifest = state.predictor.manifest();
    Json(serde_json::json!({
        "target": manifest.schema.target(),
        "features": manifest.schema.features(),
        "choices": CHOICE_FIELDS,
        "numeric_fields": NUMERIC_FIELDS,
        "model": manifest.model_type,
        "metrics": manifest.report.best_metrics,
        "candidates": manifest.report.candidates,
        "created_at": manifest.created_at,
        "schema_fingerprint": manifest.schema_fingerprint,
    }))
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(record): Json<EmployeeRecord>,
) -> Result<Json<serde_json::Value>> {
    let prediction = state.predictor.predict_record(&record)?;
    Ok(Json(serde_json::json!({
        "predicted_salary": prediction,
        "formatted": format_currency(prediction),
    })))
}

pub async fn bulk_preview(multipart: Multipart) -> Result<Json<serde_json::Value>> {
    let (file_name, data) = read_upload(multipart).await?;
    let df = read_csv_bytes(&data)?;

    let columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    Ok(Json(serde_json::json!({
        "file_name": file_name,
        "rows": df.height(),
        "columns": columns,
        "preview": preview_rows(&df, PREVIEW_ROWS),
    })))
}

/// Predict every row of an uploaded CSV and return it as a download
pub async fn bulk_predict(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response> {
    let (file_name, data) = read_upload(multipart).await?;

    let output = state.predictor.predict_csv_bytes(&data).map_err(|e| {
        warn!(file = %file_name, error = %e, "Bulk prediction rejected");
        ServerError::from(e)
    })?;

    info!(file = %file_name, bytes = output.len(), "Bulk prediction complete");
    Ok(csv_attachment(PREDICTIONS_FILE_NAME, output.into()))
}

pub async fn download_sample() -> Response {
    csv_attachment(SAMPLE_FILE_NAME, Bytes::from_static(SAMPLE_CSV.as_bytes()))
}

// ============================================================================
// Helpers
// ============================================================================

/// First uploaded file in the form, preferring a field named `file`
async fn read_upload(mut multipart: Multipart) -> Result<(String, Bytes)> {
    let mut fallback = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(e.to_string()))?
    {
        let is_file_field = field.name() == Some("file");
        let file_name = field.file_name().unwrap_or("upload.csv").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ServerError::BadRequest(e.to_string()))?;

        info!(file = %file_name, bytes = data.len(), "Received upload");
        if is_file_field {
            return Ok((file_name, data));
        }
        if fallback.is_none() {
            fallback = Some((file_name, data));
        }
    }

    fallback.ok_or_else(|| ServerError::BadRequest("no file uploaded".to_string()))
}

fn csv_attachment(file_name: &str, body: Bytes) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    )
        .into_response()
}
