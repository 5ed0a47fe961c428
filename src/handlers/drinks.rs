use axum::{
    body::Bytes,
    extract::{Path, State},
    Extension,
};
use serde_json::Value;
use tracing::info;

use crate::api::{parse_body, validate_drink_changes, validate_new_drink, Deleted, DrinkList};
use crate::auth::Claims;
use crate::context::AppContext;
use crate::database::models::{Drink, DrinkId};
use crate::error::{ApiError, DRINK_NOT_FOUND, NO_DRINKS};
use crate::middleware::{ApiResponse, ApiResult};

/// `{id}` segments are plain non-negative integers; anything else matches no drink
fn parse_id(raw: &str) -> Result<DrinkId, ApiError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::not_found(DRINK_NOT_FOUND));
    }
    raw.parse().map_err(|_| ApiError::not_found(DRINK_NOT_FOUND))
}

async fn all_drinks(ctx: &AppContext) -> Result<Vec<Drink>, ApiError> {
    let drinks = ctx.store.list_all().await?;
    // An empty menu is reported as 404 rather than an empty list
    if drinks.is_empty() {
        return Err(ApiError::not_found(NO_DRINKS));
    }
    Ok(drinks)
}

/// GET /drinks - public menu, short form
pub async fn list(State(ctx): State<AppContext>) -> ApiResult<Value> {
    let drinks = all_drinks(&ctx).await?;
    let body = serde_json::to_value(DrinkList {
        drinks: drinks.iter().map(Drink::short).collect::<Vec<_>>(),
    });
    respond(body)
}

/// GET /drinks-detail - full recipes, requires `get:drinks-detail`
pub async fn detail(State(ctx): State<AppContext>) -> ApiResult<Value> {
    let drinks = all_drinks(&ctx).await?;
    let body = serde_json::to_value(DrinkList {
        drinks: drinks.iter().map(Drink::long).collect::<Vec<_>>(),
    });
    respond(body)
}

/// POST /drinks - requires `post:drinks`
pub async fn create(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
    body: Bytes,
) -> ApiResult<Value> {
    let payload = parse_body(&body)?;
    let new_drink = validate_new_drink(&payload)?;

    let drink = ctx
        .store
        .create(&new_drink.title, &new_drink.recipe)
        .await
        .map_err(|e| ApiError::from_write(e, "Could not create drink."))?;

    info!(
        "Drink {} '{}' added to the menu by {}",
        drink.id,
        drink.title,
        claims.subject().unwrap_or("<unknown>")
    );
    respond(serde_json::to_value(DrinkList {
        drinks: vec![drink.long()],
    }))
}

/// PATCH /drinks/:id - requires `patch:drinks`; absent fields are left alone
pub async fn update(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> ApiResult<Value> {
    let id = parse_id(&raw_id)?;
    let current = ctx
        .store
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(DRINK_NOT_FOUND))?;

    let payload = parse_body(&body)?;
    let changes = validate_drink_changes(&payload)?;
    if changes.is_empty() {
        return respond(serde_json::to_value(DrinkList {
            drinks: vec![current.long()],
        }));
    }

    let drink = ctx
        .store
        .update(id, &changes)
        .await
        .map_err(|e| ApiError::from_write(e, "Could not update drink."))?;

    info!(
        "Drink {} updated by {}",
        drink.id,
        claims.subject().unwrap_or("<unknown>")
    );
    respond(serde_json::to_value(DrinkList {
        drinks: vec![drink.long()],
    }))
}

/// DELETE /drinks/:id - requires `delete:drinks`
pub async fn delete(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
    Path(raw_id): Path<String>,
) -> ApiResult<Deleted> {
    let id = parse_id(&raw_id)?;

    let deleted = ctx
        .store
        .delete(id)
        .await
        .map_err(|e| ApiError::from_write(e, "Could not delete drink."))?;

    info!(
        "Drink {} removed from the menu by {}",
        deleted,
        claims.subject().unwrap_or("<unknown>")
    );
    Ok(ApiResponse::success(Deleted { delete: deleted }))
}

fn respond(body: Result<Value, serde_json::Error>) -> ApiResult<Value> {
    body.map(ApiResponse::success).map_err(|e| {
        tracing::error!("JSON serialization error: {}", e);
        ApiError::internal_server_error("Failed to format response")
    })
}
