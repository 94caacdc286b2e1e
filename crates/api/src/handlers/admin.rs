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

//! Admin catalog CRUD. Kept thin; its one hard responsibility is
//! invalidating the specs cache on every mutation.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::routing::{Router, post, put};
use model::category::{CategorySlug, UnknownCategory};
use model::component::ComponentDraft;
use model::specs::Specs;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::AppState;
use crate::auth::AdminContext;
use crate::errors::{ApiError, ApiResult};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/components", post(create_component))
        .route(
            "/components/{id}",
            put(update_component).delete(delete_component),
        )
        .route("/orders/{id}/status", put(update_order_status))
}

#[derive(Deserialize)]
struct CreateComponentRequest {
    category: String,
    #[serde(flatten)]
    draft: ComponentDraft,
    specs: Option<Value>,
}

async fn create_component(
    State(state): State<Arc<AppState>>,
    _admin: AdminContext,
    Json(request): Json<CreateComponentRequest>,
) -> ApiResult<Json<Value>> {
    let slug: CategorySlug = request
        .category
        .parse()
        .map_err(|error: UnknownCategory| ApiError::Validation(error.to_string()))?;
    if request.draft.name.trim().is_empty() {
        return Err(ApiError::Validation("Name must not be empty".to_string()));
    }

    let mut txn = state.pool.begin().await.map_err(db::DatabaseError::Begin)?;
    let Some(category) = db::category::find_by_slug(&mut txn, slug).await? else {
        return Err(ApiError::NotFound("Category"));
    };
    let component = db::component::create(&mut txn, category.id, &request.draft).await?;
    if let Some(specs) = request.specs {
        let specs = Specs::from_json(slug, specs)
            .map_err(|error| ApiError::Validation(format!("Invalid specs: {error}")))?;
        db::specs::upsert(&mut txn, component.id, &specs).await?;
    }
    txn.commit().await.map_err(db::DatabaseError::Commit)?;

    state.catalog.invalidate(component.id);
    Ok(Json(json!({ "success": true, "component": component })))
}

#[derive(Deserialize)]
struct UpdateComponentRequest {
    #[serde(flatten)]
    draft: ComponentDraft,
    specs: Option<Value>,
}

async fn update_component(
    State(state): State<Arc<AppState>>,
    _admin: AdminContext,
    Path(component_id): Path<i64>,
    Json(request): Json<UpdateComponentRequest>,
) -> ApiResult<Json<Value>> {
    if request.draft.name.trim().is_empty() {
        return Err(ApiError::Validation("Name must not be empty".to_string()));
    }

    let mut txn = state.pool.begin().await.map_err(db::DatabaseError::Begin)?;
    let Some(component) = db::component::update(&mut txn, component_id, &request.draft).await?
    else {
        return Err(ApiError::NotFound("Component"));
    };
    if let Some(specs) = request.specs {
        let specs = Specs::from_json(component.category, specs)
            .map_err(|error| ApiError::Validation(format!("Invalid specs: {error}")))?;
        db::specs::upsert(&mut txn, component.id, &specs).await?;
    }
    txn.commit().await.map_err(db::DatabaseError::Commit)?;

    state.catalog.invalidate(component.id);
    Ok(Json(json!({ "success": true, "component": component })))
}

async fn delete_component(
    State(state): State<Arc<AppState>>,
    _admin: AdminContext,
    Path(component_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let mut txn = state.pool.begin().await.map_err(db::DatabaseError::Begin)?;
    // The specs row goes with the component via the schema; order items keep
    // their snapshots and only lose the live reference.
    if !db::component::delete(&mut txn, component_id).await? {
        return Err(ApiError::NotFound("Component"));
    }
    txn.commit().await.map_err(db::DatabaseError::Commit)?;

    state.catalog.invalidate(component_id);
    Ok(Json(json!({ "success": true })))
}

#[derive(Deserialize)]
struct StatusRequest {
    status: String,
}

async fn update_order_status(
    State(state): State<Arc<AppState>>,
    _admin: AdminContext,
    Path(order_id): Path<i64>,
    Json(request): Json<StatusRequest>,
) -> ApiResult<Json<Value>> {
    let order = crate::orders::update_status(&state.pool, order_id, &request.status).await?;
    Ok(Json(json!({ "success": true, "order": order })))
}
