// Generic CRUD handlers, instantiated once per resource type by the router.
use axum::extract::{Extension, Json, Path};
use serde_json::Value;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::schema::Resource;
use crate::database::store::{Document, Store};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

async fn store<R: Resource>() -> Result<Store<R>, ApiError> {
    Ok(Store::new(DatabaseManager::pool().await?))
}

/// Malformed identifiers get the same 404 as unknown ones; the contract does
/// not distinguish "never a valid id" from "no longer present".
fn parse_id<R: Resource>(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::not_found(format!("No such {}", R::NAME)))
}

fn not_found<R: Resource>() -> ApiError {
    ApiError::not_found(format!("{} not found", title_case(R::NAME)))
}

fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// GET /api/<resource> - List all documents, newest first
pub async fn list<R: Resource>() -> ApiResult<Value> {
    let documents = store::<R>().await?.list().await?;
    Ok(ApiResponse::success(Document::to_api_value_array(
        &documents,
    )))
}

/// GET /api/<resource>/:id - Get a single document by ID
pub async fn get_by_id<R: Resource>(Path(id): Path<String>) -> ApiResult<Value> {
    let id = parse_id::<R>(&id)?;

    let document = store::<R>()
        .await?
        .fetch(id)
        .await?
        .ok_or_else(not_found::<R>)?;

    Ok(ApiResponse::success(document.to_api_value()))
}

/// POST /api/<resource> - Create a document owned by the authenticated user
pub async fn create<R: Resource>(
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    let document = store::<R>()
        .await?
        .create(&payload, Some(auth_user.user_id))
        .await?;

    Ok(ApiResponse::created(document.to_api_value()))
}

/// PUT /api/<resource>/:id - Merge fields over a document and return the
/// post-update state
pub async fn update<R: Resource>(
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    let id = parse_id::<R>(&id)?;

    let document = store::<R>()
        .await?
        .update(id, &payload)
        .await?
        .ok_or_else(not_found::<R>)?;

    Ok(ApiResponse::success(document.to_api_value()))
}

/// DELETE /api/<resource>/:id - Remove a document
pub async fn remove<R: Resource>(Path(id): Path<String>) -> Result<ApiResponse<()>, ApiError> {
    let id = parse_id::<R>(&id)?;

    let deleted = store::<R>().await?.delete(id).await?;
    if !deleted {
        return Err(not_found::<R>());
    }

    Ok(ApiResponse::<()>::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Book;

    #[test]
    fn malformed_id_maps_to_not_found() {
        let err = parse_id::<Book>("not-a-uuid").unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.message(), "No such book");
    }

    #[test]
    fn well_formed_id_parses() {
        assert!(parse_id::<Book>("5d0c2aa2-8a32-4ad4-9e88-6b8babe9a7b2").is_ok());
    }

    #[test]
    fn title_cases_resource_names() {
        assert_eq!(title_case("book"), "Book");
        assert_eq!(not_found::<Book>().message(), "Book not found");
    }
}
