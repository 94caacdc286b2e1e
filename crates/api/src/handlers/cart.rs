/*
 * SPDX-FileCopyrightText: Copyright (c) 2021-2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: LicenseRef-NvidiaProprietary
 *
 * NVIDIA CORPORATION, its affiliates and licensors retain all intellectual
 * property and proprietary rights in and to this material, related
 * documentation and any modifications thereto. Any use, reproduction,
 * disclosure or distribution of this material and related documentation
 * without an express license agreement from NVIDIA CORPORATION or
 * its affiliates is strictly prohibited.
 */

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::routing::{Router, delete, get, post};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::auth::AuthContext;
use crate::errors::{ApiError, ApiResult};
use crate::workspace::{self, ExpandMode};
use crate::{AppState, acquire};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_cart))
        .route("/add", post(add_component))
        .route("/add-build/{buildId}", post(add_build))
        .route("/addTempBuild", post(add_temp_build))
        .route("/{itemId}", delete(decrement_item))
        .route("/deleteRow/{itemId}", delete(delete_item_row))
}

async fn get_cart(State(state): State<Arc<AppState>>, auth: AuthContext) -> ApiResult<Json<Value>> {
    let mut conn = acquire(&state.pool).await?;
    let items = db::cart::items_for_user(&mut conn, auth.user_id).await?;
    Ok(Json(json!({ "success": true, "items": items })))
}

#[derive(Deserialize)]
struct AddComponentRequest {
    #[serde(rename = "componentId")]
    component_id: i64,
    #[serde(default = "default_quantity")]
    quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

async fn add_component(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(request): Json<AddComponentRequest>,
) -> ApiResult<Json<Value>> {
    if request.quantity < 1 {
        return Err(ApiError::Validation("Quantity must be at least 1".to_string()));
    }
    let mut txn = state.pool.begin().await.map_err(db::DatabaseError::Begin)?;
    let Some(component) = state
        .catalog
        .get_component(&mut txn, request.component_id)
        .await?
    else {
        return Err(ApiError::NotFound("Component"));
    };
    if !component.component.is_visible() {
        return Err(ApiError::Validation(
            "Component is not available".to_string(),
        ));
    }

    let cart = db::cart::find_or_create(&mut txn, auth.user_id).await?;
    let item = db::cart::add_component_line(
        &mut txn,
        cart.id,
        auth.user_id,
        component.id(),
        component.price(),
        component.category(),
        request.quantity,
    )
    .await?;
    txn.commit().await.map_err(db::DatabaseError::Commit)?;
    Ok(Json(json!({ "success": true, "item": item })))
}

async fn add_build(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(build_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let mut txn = state.pool.begin().await.map_err(db::DatabaseError::Begin)?;
    let Some(build) = db::saved_build::find_for_user(&mut txn, auth.user_id, build_id).await?
    else {
        return Err(ApiError::NotFound("Build"));
    };

    let expanded =
        workspace::expand(&state.catalog, &mut txn, &build.components, ExpandMode::Strict).await?;
    if expanded.parts.is_empty() {
        return Err(ApiError::Validation("Build has no components".to_string()));
    }

    let cart = db::cart::find_or_create(&mut txn, auth.user_id).await?;
    let item = db::cart::add_bundle_line(
        &mut txn,
        cart.id,
        auth.user_id,
        build.id,
        &build.name,
        expanded.summary().total_price,
        expanded.parts.len() as i32,
    )
    .await?;
    txn.commit().await.map_err(db::DatabaseError::Commit)?;
    Ok(Json(json!({ "success": true, "item": item })))
}

/// Adds the current workspace to the cart as individual component lines.
/// The workspace has no persisted build id, so a bundle line would be
/// unresolvable at checkout; individual lines are the only shape offered.
async fn add_temp_build(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
) -> ApiResult<Json<Value>> {
    let mut txn = state.pool.begin().await.map_err(db::DatabaseError::Begin)?;
    let temp = workspace::get(&mut txn, auth.user_id).await?;
    let expanded =
        workspace::expand(&state.catalog, &mut txn, &temp.components, ExpandMode::Strict).await?;
    if expanded.parts.is_empty() {
        return Err(ApiError::Validation("Workspace is empty".to_string()));
    }

    let cart = db::cart::find_or_create(&mut txn, auth.user_id).await?;
    let mut items = Vec::with_capacity(expanded.parts.len());
    for (category, part) in &expanded.parts {
        let Some(component_id) = part.id else {
            continue;
        };
        items.push(
            db::cart::add_component_line(
                &mut txn,
                cart.id,
                auth.user_id,
                component_id,
                part.price,
                *category,
                1,
            )
            .await?,
        );
    }
    txn.commit().await.map_err(db::DatabaseError::Commit)?;
    Ok(Json(json!({ "success": true, "items": items })))
}

/// One click of the minus button: drop the quantity by one, removing the
/// line at zero.
async fn decrement_item(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(item_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let mut conn = acquire(&state.pool).await?;
    if db::cart::find_item(&mut conn, auth.user_id, item_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("Cart item"));
    }
    let remaining = db::cart::decrement_or_delete(&mut conn, auth.user_id, item_id).await?;
    Ok(Json(json!({ "success": true, "remaining_quantity": remaining })))
}

async fn delete_item_row(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(item_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let mut conn = acquire(&state.pool).await?;
    if !db::cart::delete_row(&mut conn, auth.user_id, item_id).await? {
        return Err(ApiError::NotFound("Cart item"));
    }
    Ok(Json(json!({ "success": true })))
}
