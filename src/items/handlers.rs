// HTTP handlers for item endpoints

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    Json,
};
use chrono::Utc;
use serde_json::{Map, Value};
use validator::Validate;

use crate::error::ApiError;
use crate::items::{
    models::{DeleteItemResponse, Item, NewItem, UpdateItemRequest, UpdateItemResponse},
    upload::UploadedFile,
};
use crate::AppState;

/// Multipart part carrying the image
const FILE_FIELD: &str = "file";

/// Item fields plus an optional image, read from either a multipart form
/// or a JSON object.
#[derive(Debug)]
pub struct ItemSubmission {
    pub fields: Map<String, Value>,
    pub file: Option<UploadedFile>,
}

#[async_trait]
impl<S> FromRequest<S> for ItemSubmission
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));

        if !is_multipart {
            let Json(fields) = Json::<Map<String, Value>>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            return Ok(Self { fields, file: None });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        let mut fields = Map::new();
        let mut file = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();

            if name == FILE_FIELD {
                let file_name = field.file_name().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                // Browsers send an empty part when no file was chosen
                if let Some(file_name) = file_name.filter(|n| !n.is_empty()) {
                    file = Some(UploadedFile {
                        file_name,
                        data: data.to_vec(),
                    });
                }
                continue;
            }

            let text = field
                .text()
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            fields.insert(name.clone(), form_value(&name, text)?);
        }

        Ok(Self { fields, file })
    }
}

/// Form parts are text; numeric item fields are converted here.
fn form_value(name: &str, text: String) -> Result<Value, ApiError> {
    match name {
        "age_days" => text
            .trim()
            .parse::<i32>()
            .map(Value::from)
            .map_err(|_| ApiError::BadRequest(format!("age_days must be an integer, got {:?}", text))),
        _ => Ok(Value::String(text)),
    }
}

fn parse_item_update(body: &[u8]) -> Result<UpdateItemRequest, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid item update: {}", e)))
}

fn item_not_found(id: &str) -> ApiError {
    ApiError::NotFound {
        resource: "Item".to_string(),
        id: id.to_string(),
    }
}

/// Handler for GET /items
#[utoipa::path(
    get,
    path = "/items",
    responses(
        (status = 200, description = "Every item in the collection"),
        (status = 500, description = "Internal server error")
    ),
    tag = "items"
)]
pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<Item>>, ApiError> {
    tracing::debug!("Listing all items");

    let items = state.items.list().await?;

    tracing::debug!("Retrieved {} items", items.len());
    Ok(Json(items))
}

/// Handler for POST /items
/// Accepts multipart/form-data (with an optional `file` part) or a JSON object
#[utoipa::path(
    post,
    path = "/items",
    responses(
        (status = 201, description = "Item created"),
        (status = 400, description = "Invalid item fields"),
        (status = 500, description = "Internal server error")
    ),
    tag = "items"
)]
pub async fn create_item(
    State(state): State<AppState>,
    submission: ItemSubmission,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let mut draft = NewItem::from_fields(submission.fields)?;
    draft.validate()?;

    let saved = match &submission.file {
        Some(file) => Some(state.uploads.save(file).await?),
        None => None,
    };
    if let Some(public_path) = &saved {
        draft.image.get_or_insert_with(|| public_path.clone());
    }

    let item = match state.items.insert_next(draft, Utc::now().timestamp()).await {
        Ok(item) => item,
        Err(e) => {
            // No item will point at the file
            if let Some(public_path) = &saved {
                state.uploads.discard(public_path).await;
            }
            return Err(e.into());
        }
    };

    tracing::info!("Successfully created item with id: {}", item.id);
    Ok((StatusCode::CREATED, Json(item)))
}

/// Handler for GET /items/{id}
#[utoipa::path(
    get,
    path = "/items/{id}",
    params(("id" = String, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item found"),
        (status = 404, description = "Item not found", body = String, example = json!({"error": "Item not found"}))
    ),
    tag = "items"
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Item>, ApiError> {
    tracing::debug!("Fetching item with id: {}", id);

    let item = state
        .items
        .find_by_id(&id)
        .await?
        .ok_or_else(|| item_not_found(&id))?;

    Ok(Json(item))
}

/// Handler for PUT /items/{id}
/// Replaces category, condition, age_days and description; age_years is recomputed.
/// The item is looked up before the body is read, so a missing id is 404
/// whatever was sent.
#[utoipa::path(
    put,
    path = "/items/{id}",
    params(("id" = String, Path, description = "Item id")),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Update outcome", body = UpdateItemResponse),
        (status = 400, description = "Invalid fields"),
        (status = 404, description = "Item not found", body = String, example = json!({"error": "Item not found"}))
    ),
    tag = "items"
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<UpdateItemResponse>, ApiError> {
    tracing::debug!("Updating item with id: {}", id);

    let mut item = state
        .items
        .find_by_id(&id)
        .await?
        .ok_or_else(|| {
            tracing::error!("Item {} not found for update", id);
            item_not_found(&id)
        })?;

    let payload = parse_item_update(&body)?;
    payload.validate()?;

    item.apply_update(payload, Utc::now());

    let uploaded = match state.items.replace(&item).await? {
        Some(_) => {
            tracing::info!("Successfully updated item with id: {}", id);
            "success"
        }
        None => {
            tracing::warn!("Item {} disappeared before update was written", id);
            "failed"
        }
    };

    Ok(Json(UpdateItemResponse {
        uploaded: uploaded.to_string(),
    }))
}

/// Handler for DELETE /items/{id}
#[utoipa::path(
    delete,
    path = "/items/{id}",
    params(("id" = String, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item deleted", body = DeleteItemResponse),
        (status = 404, description = "Item not found", body = String, example = json!({"error": "Item not found"}))
    ),
    tag = "items"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteItemResponse>, ApiError> {
    tracing::debug!("Deleting item with id: {}", id);

    if !state.items.delete(&id).await? {
        tracing::error!("Item {} not found for deletion", id);
        return Err(item_not_found(&id));
    }

    tracing::info!("Successfully deleted item with id: {}", id);
    Ok(Json(DeleteItemResponse {
        deleted: "success".to_string(),
    }))
}
