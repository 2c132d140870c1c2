//! Request handlers
//!
//! CRUD is generic over [`Entity`]; each collection gets the same five
//! operations. Search endpoints are per-entity because their filter shapes
//! differ — that is where the dynamic filter builder and range resolver are
//! driven from.

use axum::Json;
use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::core::entity::Entity;
use crate::core::error::{ApiError, DomainError};
use crate::entities::{Permission, Product, Sale, Stocktaking, User};
use crate::server::AppState;
use crate::storage::MongoStore;

fn store<T: Entity>(state: &AppState) -> MongoStore<T> {
    MongoStore::new(state.db.clone())
}

fn validation_errors(errors: &validator::ValidationErrors) -> Vec<String> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "is invalid".to_string());
                format!("{}: {}", field, message)
            })
        })
        .collect()
}

fn validated<I: Validate>(input: &I, path: &str) -> Result<(), ApiError> {
    input.validate().map_err(|errors| {
        ApiError::bad_request("validation failed", validation_errors(&errors), path)
    })
}

// ---------------------------------------------------------------------------
// Generic CRUD
// ---------------------------------------------------------------------------

pub async fn list<T: Entity>(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<Vec<T>>, ApiError> {
    let entities = store::<T>(&state)
        .list()
        .await
        .map_err(|e| ApiError::internal(e.to_string(), uri.path()))?;
    Ok(Json(entities))
}

pub async fn create<T: Entity>(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Json(input): Json<T::Input>,
) -> Result<(StatusCode, Json<T>), ApiError> {
    validated(&input, uri.path())?;

    let entity = store::<T>(&state)
        .insert(T::from_input(input))
        .await
        .map_err(|e| ApiError::internal(e.to_string(), uri.path()))?;
    Ok((StatusCode::CREATED, Json(entity)))
}

pub async fn fetch<T: Entity>(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<Uuid>,
) -> Result<Json<T>, ApiError> {
    let entity = store::<T>(&state)
        .get(&id)
        .await
        .map_err(|e| ApiError::internal(e.to_string(), uri.path()))?
        .ok_or_else(|| {
            ApiError::domain(DomainError::not_found(T::kind(), id.to_string()), uri.path())
        })?;
    Ok(Json(entity))
}

pub async fn update<T: Entity>(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<Uuid>,
    Json(input): Json<T::Input>,
) -> Result<Json<T>, ApiError> {
    validated(&input, uri.path())?;

    let store = store::<T>(&state);
    let mut entity = store
        .get(&id)
        .await
        .map_err(|e| ApiError::internal(e.to_string(), uri.path()))?
        .ok_or_else(|| {
            ApiError::domain(DomainError::not_found(T::kind(), id.to_string()), uri.path())
        })?;

    entity.apply_input(input);
    let updated = store
        .replace(&id, entity)
        .await
        .map_err(|e| ApiError::internal(e.to_string(), uri.path()))?;
    Ok(Json(updated))
}

pub async fn remove<T: Entity>(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let store = store::<T>(&state);
    store
        .get(&id)
        .await
        .map_err(|e| ApiError::internal(e.to_string(), uri.path()))?
        .ok_or_else(|| {
            ApiError::domain(DomainError::not_found(T::kind(), id.to_string()), uri.path())
        })?;

    store
        .delete(&id)
        .await
        .map_err(|e| ApiError::internal(e.to_string(), uri.path()))?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Search endpoints
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ProductSearchQuery {
    pub name: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub provider: Option<String>,
}

pub async fn search_products(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<ProductSearchQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let spec = Product::search_filter(
        query.name.as_deref(),
        query.category.as_deref(),
        query.brand.as_deref(),
        query.provider.as_deref(),
    );

    let products = store::<Product>(&state)
        .find(&spec)
        .await
        .map_err(|e| ApiError::internal(e.to_string(), uri.path()))?;
    Ok(Json(products))
}

#[derive(Debug, Default, Deserialize)]
pub struct SaleSearchQuery {
    pub sold_after: Option<String>,
    pub sold_before: Option<String>,
    pub min_total: Option<f64>,
    pub max_total: Option<f64>,
}

pub async fn search_sales(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<SaleSearchQuery>,
) -> Result<Json<Vec<Sale>>, ApiError> {
    let path = uri.path();
    let sold_after = parse_rfc3339(query.sold_after.as_deref(), "sold_after", path)?;
    let sold_before = parse_rfc3339(query.sold_before.as_deref(), "sold_before", path)?;

    if let (Some(after), Some(before)) = (sold_after, sold_before)
        && after > before
    {
        return Err(ApiError::domain(DomainError::invalid_range("sold_at"), path));
    }
    if let (Some(min), Some(max)) = (query.min_total, query.max_total)
        && min > max
    {
        return Err(ApiError::domain(DomainError::invalid_range("total"), path));
    }

    let spec = Sale::search_filter(sold_after, sold_before, query.min_total, query.max_total);
    let sales = store::<Sale>(&state)
        .find(&spec)
        .await
        .map_err(|e| ApiError::internal(e.to_string(), path))?;
    Ok(Json(sales))
}

#[derive(Debug, Default, Deserialize)]
pub struct StocktakingSearchQuery {
    pub taken_after: Option<String>,
    pub taken_before: Option<String>,
}

pub async fn search_stocktakings(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<StocktakingSearchQuery>,
) -> Result<Json<Vec<Stocktaking>>, ApiError> {
    let path = uri.path();
    let taken_after = parse_rfc3339(query.taken_after.as_deref(), "taken_after", path)?;
    let taken_before = parse_rfc3339(query.taken_before.as_deref(), "taken_before", path)?;

    if let (Some(after), Some(before)) = (taken_after, taken_before)
        && after > before
    {
        return Err(ApiError::domain(
            DomainError::invalid_range("taken_at"),
            path,
        ));
    }

    let spec = Stocktaking::search_filter(taken_after, taken_before);
    let stocktakings = store::<Stocktaking>(&state)
        .find(&spec)
        .await
        .map_err(|e| ApiError::internal(e.to_string(), path))?;
    Ok(Json(stocktakings))
}

#[derive(Debug, Default, Deserialize)]
pub struct PermissionSearchQuery {
    /// Comma-separated candidate terms, e.g. `names=admin,manager`.
    pub names: Option<String>,
}

pub async fn search_permissions(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<PermissionSearchQuery>,
) -> Result<Json<Vec<Permission>>, ApiError> {
    let terms: Vec<&str> = query
        .names
        .as_deref()
        .map(|names| names.split(',').map(str::trim).collect())
        .unwrap_or_default();

    let spec = Permission::names_filter(terms);
    let permissions = store::<Permission>(&state)
        .find(&spec)
        .await
        .map_err(|e| ApiError::internal(e.to_string(), uri.path()))?;
    Ok(Json(permissions))
}

#[derive(Debug, Default, Deserialize)]
pub struct UserLookupQuery {
    pub username: Option<String>,
    pub email: Option<String>,
}

pub async fn lookup_user(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<UserLookupQuery>,
) -> Result<Json<User>, ApiError> {
    let spec = User::identifier_filter(query.username.as_deref(), query.email.as_deref());

    let users = store::<User>(&state)
        .find(&spec)
        .await
        .map_err(|e| ApiError::internal(e.to_string(), uri.path()))?;

    let key = query
        .username
        .as_deref()
        .or(query.email.as_deref())
        .unwrap_or("unspecified")
        .to_string();

    let user = users.into_iter().next().ok_or_else(|| {
        ApiError::domain(DomainError::not_found("User", key), uri.path())
    })?;
    Ok(Json(user))
}

fn parse_rfc3339(
    raw: Option<&str>,
    field: &str,
    path: &str,
) -> Result<Option<DateTime<Utc>>, ApiError> {
    match raw {
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|_| ApiError::domain(DomainError::invalid_format(field), path)),
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub username: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in_ms: i64,
}

/// Check credentials and issue a signed token.
///
/// The failure message is the same whether the user is unknown or the
/// password is wrong.
pub async fn login(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let path = uri.path();
    validated(&request, path)?;

    let spec = User::identifier_filter(Some(&request.username), None);
    let users = store::<User>(&state)
        .find(&spec)
        .await
        .map_err(|e| ApiError::internal(e.to_string(), path))?;

    let user = users
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::unauthorized("invalid credentials", path))?;

    if !state
        .passwords
        .verify(&request.password, &user.password_hash)
        .await
    {
        return Err(ApiError::unauthorized("invalid credentials", path));
    }

    let token = state
        .issuer
        .issue(&user.username, user.roles.clone())
        .await
        .map_err(|e| ApiError::internal(e.to_string(), path))?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer",
        expires_in_ms: state.issuer.ttl_ms(),
    }))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
