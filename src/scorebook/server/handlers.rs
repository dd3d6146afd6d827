//! Route handlers.

use super::{caller_from_headers, ApiError, AppState};
use crate::commands::{
    Attachments, CmdMessage, CmdResult, DisplaySheet, FilterChoices, SheetPage, TagUsage,
};
use crate::form::SheetForm;
use crate::query::ListQuery;
use crate::store::blob::{BlobStore, Upload};
use crate::store::DataStore;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

type HandlerResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub ok: bool,
    pub page: SheetPage,
}

#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<DisplaySheet>,
    pub form: SheetForm,
    pub choices: FilterChoices,
}

#[derive(Debug, Serialize)]
pub struct SheetResponse {
    pub ok: bool,
    pub sheet: DisplaySheet,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<CmdMessage>,
}

#[derive(Debug, Serialize)]
pub struct TagsResponse {
    pub ok: bool,
    pub tags: Vec<TagUsage>,
}

fn sheet_response(result: CmdResult) -> HandlerResult<SheetResponse> {
    let CmdResult {
        mut affected_sheets,
        messages,
        ..
    } = result;
    if affected_sheets.is_empty() {
        return Err(ApiError::internal("no sheet in command result"));
    }
    Ok(SheetResponse {
        ok: true,
        sheet: affected_sheets.swap_remove(0),
        messages,
    })
}

/// Ids that do not parse cannot name an existing sheet.
fn parse_id(raw: &str) -> HandlerResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(format!("Sheet not found: {}", raw)))
}

/// GET /
pub(crate) async fn list<S, B>(
    State(state): State<AppState<S, B>>,
    headers: HeaderMap,
    params: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> HandlerResult<Json<ListResponse>>
where
    S: DataStore + Send + 'static,
    B: BlobStore + Send + 'static,
{
    let caller = caller_from_headers(&headers)?;
    let Query(params) = params?;
    let query = ListQuery::from_map(&params)?;
    let result = state
        .with_api(move |api| api.list_sheets(&caller, &query))
        .await??;
    let page = result
        .page
        .ok_or_else(|| ApiError::internal("no page in command result"))?;
    Ok(Json(ListResponse { ok: true, page }))
}

/// GET /sheet/add
pub(crate) async fn add_form<S, B>(
    State(state): State<AppState<S, B>>,
    headers: HeaderMap,
) -> HandlerResult<Json<FormResponse>>
where
    S: DataStore + Send + 'static,
    B: BlobStore + Send + 'static,
{
    caller_from_headers(&headers)?;
    let result = state.with_api(|api| Ok(api.choices())).await??;
    Ok(Json(FormResponse {
        ok: true,
        sheet: None,
        form: SheetForm::default(),
        choices: result.choices.unwrap_or_else(FilterChoices::all),
    }))
}

/// POST /sheet/add
pub(crate) async fn create<S, B>(
    State(state): State<AppState<S, B>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> HandlerResult<Response>
where
    S: DataStore + Send + 'static,
    B: BlobStore + Send + 'static,
{
    let caller = caller_from_headers(&headers)?;
    let submitted = SubmittedForm::read(multipart).await?;
    let input = submitted.form.clone();

    let result = state
        .with_api(move |api| {
            api.create_sheet(&caller, &submitted.form, submitted.attachments())
        })
        .await?
        .map_err(|e| ApiError::from_write(e, Some(input)))?;

    Ok((StatusCode::CREATED, Json(sheet_response(result)?)).into_response())
}

/// GET /edit/{id}
pub(crate) async fn edit_form<S, B>(
    State(state): State<AppState<S, B>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> HandlerResult<Json<FormResponse>>
where
    S: DataStore + Send + 'static,
    B: BlobStore + Send + 'static,
{
    let caller = caller_from_headers(&headers)?;
    let id = parse_id(&id)?;
    let result = state
        .with_api(move |api| api.sheet_for_edit(&caller, &id))
        .await??;
    let choices = result.choices.clone().unwrap_or_else(FilterChoices::all);
    let shown = sheet_response(result)?.sheet;
    Ok(Json(FormResponse {
        ok: true,
        form: SheetForm::from_sheet(&shown.sheet, &shown.tag_names),
        sheet: Some(shown),
        choices,
    }))
}

/// POST /edit/{id}
pub(crate) async fn update<S, B>(
    State(state): State<AppState<S, B>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    multipart: Multipart,
) -> HandlerResult<Json<SheetResponse>>
where
    S: DataStore + Send + 'static,
    B: BlobStore + Send + 'static,
{
    let caller = caller_from_headers(&headers)?;
    let id = parse_id(&id)?;
    let submitted = SubmittedForm::read(multipart).await?;
    let input = submitted.form.clone();

    let result = state
        .with_api(move |api| {
            api.update_sheet(&caller, &id, &submitted.form, submitted.attachments())
        })
        .await?
        .map_err(|e| ApiError::from_write(e, Some(input)))?;
    Ok(Json(sheet_response(result)?))
}

/// GET /delete/{id}
pub(crate) async fn confirm_delete<S, B>(
    State(state): State<AppState<S, B>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> HandlerResult<Json<SheetResponse>>
where
    S: DataStore + Send + 'static,
    B: BlobStore + Send + 'static,
{
    let caller = caller_from_headers(&headers)?;
    let id = parse_id(&id)?;
    let result = state
        .with_api(move |api| api.sheet_for_edit(&caller, &id))
        .await??;
    Ok(Json(sheet_response(result)?))
}

/// POST /delete/{id}
pub(crate) async fn delete<S, B>(
    State(state): State<AppState<S, B>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> HandlerResult<Json<SheetResponse>>
where
    S: DataStore + Send + 'static,
    B: BlobStore + Send + 'static,
{
    let caller = caller_from_headers(&headers)?;
    let id = parse_id(&id)?;
    let result = state
        .with_api(move |api| api.delete_sheet(&caller, &id))
        .await?
        .map_err(|e| ApiError::from_write(e, None))?;
    Ok(Json(sheet_response(result)?))
}

/// GET /noty/{slug}
pub(crate) async fn detail<S, B>(
    State(state): State<AppState<S, B>>,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> HandlerResult<Json<SheetResponse>>
where
    S: DataStore + Send + 'static,
    B: BlobStore + Send + 'static,
{
    let caller = caller_from_headers(&headers)?;
    let result = state
        .with_api(move |api| api.sheet_by_slug(&caller, &slug))
        .await??;
    Ok(Json(sheet_response(result)?))
}

/// GET /book/{id}
///
/// Old links address sheets by id. Redirects to the slug address, or answers
/// with the record itself when its title cannot produce a slug.
pub(crate) async fn legacy_detail<S, B>(
    State(state): State<AppState<S, B>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> HandlerResult<Response>
where
    S: DataStore + Send + 'static,
    B: BlobStore + Send + 'static,
{
    let caller = caller_from_headers(&headers)?;
    let id = parse_id(&id)?;
    let result = state
        .with_api(move |api| api.sheet_by_id(&caller, &id))
        .await?
        .map_err(|e| ApiError::from_write(e, None))?;
    let response = sheet_response(result)?;
    match response.sheet.sheet.slug.clone() {
        // 302, matching the redirect old bookmarks were issued
        Some(slug) => Ok((
            StatusCode::FOUND,
            [(axum::http::header::LOCATION, format!("/noty/{}", slug))],
        )
            .into_response()),
        None => Ok(Json(response).into_response()),
    }
}

/// GET /tags
pub(crate) async fn tags<S, B>(
    State(state): State<AppState<S, B>>,
    headers: HeaderMap,
) -> HandlerResult<Json<TagsResponse>>
where
    S: DataStore + Send + 'static,
    B: BlobStore + Send + 'static,
{
    let caller = caller_from_headers(&headers)?;
    let result = state.with_api(move |api| api.tags(&caller)).await??;
    Ok(Json(TagsResponse {
        ok: true,
        tags: result.tags,
    }))
}

/// A multipart sheet form, split into text fields and uploads.
#[derive(Debug, Default)]
struct SubmittedForm {
    form: SheetForm,
    sheet_file: Option<Upload>,
    preview_image: Option<Upload>,
}

impl SubmittedForm {
    async fn read(mut multipart: Multipart) -> HandlerResult<Self> {
        let mut submitted = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "sheet_file" | "preview_image" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    // Browsers send an empty part for an untouched file input
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    let upload = Upload::new(file_name, bytes.to_vec());
                    if name == "sheet_file" {
                        submitted.sheet_file = Some(upload);
                    } else {
                        submitted.preview_image = Some(upload);
                    }
                }
                _ => {
                    let value = field.text().await.map_err(multipart_error)?;
                    submitted.set_text(&name, value);
                }
            }
        }
        Ok(submitted)
    }

    fn set_text(&mut self, name: &str, value: String) {
        let form = &mut self.form;
        let slot = match name {
            "title" => &mut form.title,
            "composer" => &mut form.composer,
            "arranger" => &mut form.arranger,
            "cast" => &mut form.cast,
            "season" => &mut form.season,
            "liturgical_use" => &mut form.liturgical_use,
            "genre" => &mut form.genre,
            "difficulty" => &mut form.difficulty,
            "publication_year" => &mut form.publication_year,
            "publisher" => &mut form.publisher,
            "isbn" => &mut form.isbn,
            "description" => &mut form.description,
            "tags" => &mut form.tags,
            "public" => {
                form.public = !matches!(
                    value.trim().to_ascii_lowercase().as_str(),
                    "off" | "false" | "0"
                );
                return;
            }
            other => {
                tracing::debug!(field = other, "ignoring unknown form field");
                return;
            }
        };
        *slot = value;
    }

    fn attachments(&self) -> Attachments<'_> {
        Attachments {
            sheet_file: self.sheet_file.as_ref(),
            preview_image: self.preview_image.as_ref(),
        }
    }
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::new(err.status(), "bad_request", err.body_text())
}
