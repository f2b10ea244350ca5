//! Request handlers sequencing the application services.

use std::collections::HashMap;
use std::path::Path as FsPath;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::application::error::AppError;
use crate::application::pipeline::parse_platform_counts;
use crate::application::repos::ContentRepo;
use crate::cache::DraftPayload;
use crate::domain::content::WeeklyContent;

use super::HttpState;

/// Parsed multipart payload: one document plus its text form fields.
struct DocumentForm {
    file_name: String,
    data: Bytes,
    fields: HashMap<String, String>,
}

impl DocumentForm {
    fn required(&self, key: &str) -> Result<&str, AppError> {
        self.fields
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| AppError::validation(format!("missing `{key}` field")))
    }

    fn weeks(&self, key: &str) -> Result<u32, AppError> {
        self.required(key)?
            .trim()
            .parse()
            .map_err(|_| AppError::validation(format!("`{key}` must be a positive integer")))
    }

    fn days(&self) -> Result<Vec<String>, AppError> {
        Ok(self
            .required("days")?
            .split(',')
            .map(|day| day.trim().to_string())
            .filter(|day| !day.is_empty())
            .collect())
    }

    fn file_type(&self) -> String {
        FsPath::new(&self.file_name)
            .extension()
            .and_then(|value| value.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default()
    }
}

async fn read_document_form(mut multipart: Multipart) -> Result<DocumentForm, AppError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut fields = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::validation(format!("invalid multipart payload: {err}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let file_name = field
                .file_name()
                .map(str::to_string)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| "upload.bin".to_string());
            let data = field
                .bytes()
                .await
                .map_err(|err| AppError::validation(format!("unreadable file field: {err}")))?;
            file = Some((file_name, data));
        } else if !name.is_empty() {
            let value = field
                .text()
                .await
                .map_err(|err| AppError::validation(format!("unreadable `{name}` field: {err}")))?;
            fields.insert(name, value);
        }
    }

    let (file_name, data) = file.ok_or_else(|| AppError::validation("missing `file` field"))?;
    Ok(DocumentForm {
        file_name,
        data,
        fields,
    })
}

/// Store the document, hand its path to `work`, then clean the file up
/// whatever the outcome.
async fn with_stored_document<T, F>(
    state: &HttpState,
    form: &DocumentForm,
    work: F,
) -> Result<T, AppError>
where
    F: AsyncFnOnce(&FsPath) -> Result<T, AppError>,
{
    let stored = state
        .uploads
        .store(&form.file_name, form.data.clone())
        .await
        .map_err(|err| AppError::validation(err.to_string()))?;
    let path = state
        .uploads
        .absolute_path(&stored.stored_path)
        .map_err(|err| AppError::unexpected(err.to_string()))?;

    let result = work(&path).await;

    if let Err(err) = state.uploads.delete(&stored.stored_path).await {
        warn!(stored_path = %stored.stored_path, error = %err, "upload cleanup failed");
    }

    result
}

pub async fn upload_document(
    State(state): State<HttpState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_document_form(multipart).await?;
    let content_type = mime_guess::from_path(&form.file_name)
        .first_or_octet_stream()
        .to_string();
    let stored = state
        .uploads
        .store(&form.file_name, form.data)
        .await
        .map_err(|err| AppError::validation(err.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "file_name": form.file_name,
            "content_type": content_type,
            "stored_path": stored.stored_path,
            "checksum": stored.checksum,
            "size_bytes": stored.size_bytes,
        })),
    )
        .into_response())
}

pub async fn generate_scripts(
    State(state): State<HttpState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_document_form(multipart).await?;
    let weeks = form.weeks("weeks")?;
    let platform = form.required("platform")?.to_string();

    let outcome = with_stored_document(&state, &form, async |path| {
        let text = crate::infra::extract::extract_text(path).await?;
        state
            .generation
            .generate_weekly(&text, weeks, &platform, &form.file_name, &form.file_type())
            .await
    })
    .await?;

    Ok(Json(outcome).into_response())
}

pub async fn generate_custom_scripts(
    State(state): State<HttpState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_document_form(multipart).await?;
    let weeks = form.weeks("weeks")?;
    let days = form.days()?;
    let platform_counts = parse_platform_counts(form.required("platforms")?)?;

    let outcome = with_stored_document(&state, &form, async |path| {
        let text = crate::infra::extract::extract_text(path).await?;
        state
            .generation
            .generate_custom(
                &text,
                weeks,
                &days,
                &platform_counts,
                &form.file_name,
                &form.file_type(),
            )
            .await
    })
    .await?;

    Ok(Json(outcome).into_response())
}

#[derive(Debug, Deserialize)]
pub struct RegenerateScriptRequest {
    pub content: String,
}

pub async fn regenerate_script(
    State(state): State<HttpState>,
    Json(request): Json<RegenerateScriptRequest>,
) -> Result<Response, AppError> {
    let record = state.generation.rewrite_post(&request.content).await?;
    Ok(Json(json!({
        "status": "success",
        "content": record,
    }))
    .into_response())
}

pub async fn extract_content(
    State(state): State<HttpState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_document_form(multipart).await?;
    let weeks = form.weeks("week")?;
    let days = form.days()?;

    let outcome = with_stored_document(&state, &form, async |path| {
        state.extraction.extract_and_plan(path, weeks, &days).await
    })
    .await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Content extracted successfully",
        "content": outcome.content,
        "handle": outcome.handle,
        "expiration": outcome.expires_at,
    }))
    .into_response())
}

pub async fn get_draft(
    State(state): State<HttpState>,
    Path(handle): Path<String>,
) -> Result<Response, AppError> {
    let snapshot = state.drafts.lookup(&handle)?;
    Ok(Json(json!({
        "handle": snapshot.handle,
        "content": snapshot.payload,
        "timestamp": snapshot.created_at,
        "expiration": snapshot.expires_at,
    }))
    .into_response())
}

pub async fn update_draft(
    State(state): State<HttpState>,
    Path(handle): Path<String>,
    Json(content): Json<WeeklyContent>,
) -> Result<Response, AppError> {
    content.validate()?;
    let snapshot = state.drafts.update(&handle, DraftPayload::Week(content))?;
    Ok(Json(json!({
        "status": "success",
        "message": "Content updated successfully",
        "handle": snapshot.handle,
        "content": snapshot.payload,
        "expiration": snapshot.expires_at,
    }))
    .into_response())
}

#[derive(Debug, Deserialize)]
pub struct RegenerateContentRequest {
    pub week_content: Option<String>,
}

pub async fn regenerate_content(
    State(state): State<HttpState>,
    Json(request): Json<RegenerateContentRequest>,
) -> Result<Response, AppError> {
    let outcome = state
        .regeneration
        .regenerate_week_content(request.week_content.as_deref())
        .await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Content regenerated successfully",
        "week_content": outcome.regenerated,
        "handle": outcome.handle,
        "expiration": outcome.expires_at,
    }))
    .into_response())
}

#[derive(Debug, Deserialize)]
pub struct RegenerateSubcontentRequest {
    pub subcontent: Option<String>,
}

pub async fn regenerate_subcontent(
    State(state): State<HttpState>,
    Json(request): Json<RegenerateSubcontentRequest>,
) -> Result<Response, AppError> {
    let outcome = state
        .regeneration
        .regenerate_subcontent(request.subcontent.as_deref())
        .await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Subcontent regenerated successfully",
        "subcontent": outcome.regenerated,
        "handle": outcome.handle,
        "expiration": outcome.expires_at,
    }))
    .into_response())
}

pub async fn pending_content(State(state): State<HttpState>) -> Result<Response, AppError> {
    let rows = state.repos.pending_content().await?;
    Ok(Json(json!({ "pending_content": rows })).into_response())
}

pub async fn pending_files(State(state): State<HttpState>) -> Result<Response, AppError> {
    let files = state.repos.pending_files().await?;
    Ok(Json(json!({ "pending_files": files })).into_response())
}

#[derive(Debug, Deserialize)]
pub struct PendingFileQuery {
    pub file_name: String,
}

pub async fn pending_content_by_file(
    State(state): State<HttpState>,
    Query(query): Query<PendingFileQuery>,
) -> Result<Response, AppError> {
    let rows = state.repos.pending_content_for_file(&query.file_name).await?;
    Ok(Json(json!({
        "file_name": query.file_name,
        "pending_content": rows,
    }))
    .into_response())
}

pub async fn healthz(State(state): State<HttpState>) -> Response {
    match state.repos.health_check().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            warn!(error = %err, "database health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "detail": "database unavailable" })),
            )
                .into_response()
        }
    }
}
