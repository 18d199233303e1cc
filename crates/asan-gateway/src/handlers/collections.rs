use crate::error::{AppError, Result};
use crate::model::{OkResponse, OwnerQuery};
use crate::state::AppState;
use asan_storage::{Fields, Record};
use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, put, MethodRouter};
use axum::Json;
use serde_json::Value;

const OWNER_FIELD: &str = "userId";

/// `GET` lists the collection, `POST` adds the request body to it.
pub fn collection_routes(collection: &'static str) -> MethodRouter<AppState> {
    get(move |State(state): State<AppState>| list(state, collection)).post(
        move |State(state): State<AppState>, Json(body): Json<Fields>| {
            create(state, collection, body)
        },
    )
}

/// Like [`collection_routes`] for records that belong to a user: listing
/// honours `?userId=`, and adding requires a `userId` field.
pub fn owned_collection_routes(collection: &'static str) -> MethodRouter<AppState> {
    get(
        move |State(state): State<AppState>, Query(query): Query<OwnerQuery>| {
            list_owned(state, collection, query)
        },
    )
    .post(
        move |State(state): State<AppState>, Json(body): Json<Fields>| {
            create_owned(state, collection, body)
        },
    )
}

/// `PUT /{id}` updates and `DELETE /{id}` removes a single record.
pub fn editable_routes(collection: &'static str) -> MethodRouter<AppState> {
    put(
        move |State(state): State<AppState>, Path(id): Path<String>, Json(patch): Json<Fields>| {
            update(state, collection, id, patch)
        },
    )
    .merge(deletable_routes(collection))
}

/// `DELETE /{id}` removes a single record.
pub fn deletable_routes(collection: &'static str) -> MethodRouter<AppState> {
    delete(move |State(state): State<AppState>, Path(id): Path<String>| {
        remove(state, collection, id)
    })
}

async fn list(state: AppState, collection: &'static str) -> Result<Json<Vec<Record>>> {
    Ok(Json(state.db().get(collection).await?))
}

async fn create(state: AppState, collection: &'static str, body: Fields) -> Result<Json<Record>> {
    Ok(Json(state.db().add(collection, body).await?))
}

async fn list_owned(
    state: AppState,
    collection: &'static str,
    query: OwnerQuery,
) -> Result<Json<Vec<Record>>> {
    let records = match query.user_id.filter(|id| !id.is_empty()) {
        Some(user_id) => {
            state
                .db()
                .filter(collection, |record| {
                    record.get_str(OWNER_FIELD) == Some(user_id.as_str())
                })
                .await?
        }
        None => state.db().get(collection).await?,
    };

    Ok(Json(records))
}

async fn create_owned(
    state: AppState,
    collection: &'static str,
    body: Fields,
) -> Result<Json<Record>> {
    let has_owner = body
        .get(OWNER_FIELD)
        .and_then(Value::as_str)
        .is_some_and(|owner| !owner.is_empty());
    if !has_owner {
        return Err(AppError::bad_request("userId required"));
    }

    create(state, collection, body).await
}

async fn update(
    state: AppState,
    collection: &'static str,
    id: String,
    patch: Fields,
) -> Result<Json<Record>> {
    state
        .db()
        .update(collection, &id, patch)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound(None))
}

async fn remove(state: AppState, collection: &'static str, id: String) -> Result<Json<OkResponse>> {
    state.db().remove(collection, &id).await?;
    Ok(Json(OkResponse::ok()))
}

