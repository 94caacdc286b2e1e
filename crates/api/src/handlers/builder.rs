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
use axum::extract::{Path, Query, State};
use axum::routing::{Router, get, post, put};
use model::build::Selection;
use model::category::{CategorySlug, UnknownCategory};
use model::purpose::{Purpose, UnknownPurpose};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::builder::{self, AutoBuildRequest};
use crate::errors::{ApiError, ApiResult, AUTOBUILD_INCOMPATIBLE};
use crate::workspace::{self, ExpandMode};
use crate::{AppState, acquire};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/components", get(pickable_components))
        .route("/temp", get(get_temp))
        .route("/temp/add", post(add_to_temp))
        .route("/temp/remove", post(remove_from_temp))
        .route("/temp/reset", post(reset_temp))
        .route("/save", post(save_build))
        .route("/my", get(my_builds))
        .route("/my/{id}", get(my_build).delete(delete_build))
        .route("/my/{id}/duplicate", post(duplicate_build))
        .route("/load/{id}", post(load_build))
        .route("/update/{id}", put(update_build))
        .route("/autobuild", post(autobuild))
        .route("/autocomplete", post(autocomplete))
}

fn parse_category(value: &str) -> ApiResult<CategorySlug> {
    value
        .parse()
        .map_err(|error: UnknownCategory| ApiError::Validation(error.to_string()))
}

#[derive(Deserialize)]
struct ComponentsQuery {
    category: String,
}

async fn pickable_components(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Query(query): Query<ComponentsQuery>,
) -> ApiResult<Json<Value>> {
    let category = parse_category(&query.category)?;
    let mut conn = acquire(&state.pool).await?;
    let components =
        workspace::list_pickable(&state.catalog, &mut conn, auth.user_id, category).await?;

    if components.is_empty() {
        return Ok(Json(json!({
            "success": true,
            "components": components,
            "message": "No compatible components available for this category",
        })));
    }
    Ok(Json(json!({ "success": true, "components": components })))
}

/// The current workspace, expanded, with its running summary.
async fn workspace_payload(
    state: &AppState,
    conn: &mut sqlx::PgConnection,
    user_id: Uuid,
) -> ApiResult<Value> {
    let temp = workspace::get(conn, user_id).await?;
    let expanded =
        workspace::expand(&state.catalog, conn, &temp.components, ExpandMode::Lenient).await?;
    let summary = expanded.summary();
    Ok(json!({
        "success": true,
        "build": expanded,
        "summary": summary,
        "source_build_id": temp.source_build_id,
    }))
}

async fn get_temp(State(state): State<Arc<AppState>>, auth: AuthContext) -> ApiResult<Json<Value>> {
    let mut conn = acquire(&state.pool).await?;
    Ok(Json(workspace_payload(&state, &mut conn, auth.user_id).await?))
}

#[derive(Deserialize)]
struct AddRequest {
    category: String,
    #[serde(rename = "componentId")]
    component_id: i64,
}

async fn add_to_temp(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(request): Json<AddRequest>,
) -> ApiResult<Json<Value>> {
    let category = parse_category(&request.category)?;
    let mut conn = acquire(&state.pool).await?;
    let (_, expanded) = workspace::add(
        &state.catalog,
        &mut conn,
        auth.user_id,
        category,
        request.component_id,
    )
    .await?;
    let summary = expanded.summary();
    Ok(Json(json!({ "success": true, "build": expanded, "summary": summary })))
}

#[derive(Deserialize)]
struct RemoveRequest {
    category: String,
}

async fn remove_from_temp(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(request): Json<RemoveRequest>,
) -> ApiResult<Json<Value>> {
    let category = parse_category(&request.category)?;
    let mut conn = acquire(&state.pool).await?;
    workspace::remove(&mut conn, auth.user_id, category).await?;
    Ok(Json(workspace_payload(&state, &mut conn, auth.user_id).await?))
}

async fn reset_temp(State(state): State<Arc<AppState>>, auth: AuthContext) -> ApiResult<Json<Value>> {
    let mut conn = acquire(&state.pool).await?;
    workspace::reset(&mut conn, auth.user_id).await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Deserialize, Default)]
struct SaveRequest {
    name: Option<String>,
}

async fn save_build(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    request: Option<Json<SaveRequest>>,
) -> ApiResult<Json<Value>> {
    let Json(request) = request.unwrap_or_default();
    let mut txn = state.pool.begin().await.map_err(db::DatabaseError::Begin)?;
    let build = workspace::save(&state.catalog, &mut txn, auth.user_id, request.name).await?;
    txn.commit().await.map_err(db::DatabaseError::Commit)?;
    Ok(Json(json!({ "success": true, "build": build })))
}

async fn my_builds(State(state): State<Arc<AppState>>, auth: AuthContext) -> ApiResult<Json<Value>> {
    let mut conn = acquire(&state.pool).await?;
    let builds = db::saved_build::list_for_user(&mut conn, auth.user_id).await?;
    Ok(Json(json!({ "success": true, "builds": builds })))
}

async fn my_build(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(build_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let mut conn = acquire(&state.pool).await?;
    let Some(build) = db::saved_build::find_for_user(&mut conn, auth.user_id, build_id).await?
    else {
        return Err(ApiError::NotFound("Build"));
    };
    let expanded =
        workspace::expand(&state.catalog, &mut conn, &build.components, ExpandMode::Lenient)
            .await?;
    Ok(Json(json!({ "success": true, "build": build, "components": expanded })))
}

async fn delete_build(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(build_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let mut conn = acquire(&state.pool).await?;
    workspace::delete(&mut conn, auth.user_id, build_id).await?;
    Ok(Json(json!({ "success": true })))
}

async fn duplicate_build(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(build_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let mut conn = acquire(&state.pool).await?;
    let build = workspace::duplicate(&mut conn, auth.user_id, build_id).await?;
    Ok(Json(json!({ "success": true, "build": build })))
}

async fn load_build(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(build_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let mut conn = acquire(&state.pool).await?;
    workspace::load(&mut conn, auth.user_id, build_id).await?;
    Ok(Json(workspace_payload(&state, &mut conn, auth.user_id).await?))
}

#[derive(Deserialize, Default)]
struct UpdateRequest {
    name: Option<String>,
}

async fn update_build(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(build_id): Path<i64>,
    request: Option<Json<UpdateRequest>>,
) -> ApiResult<Json<Value>> {
    let Json(request) = request.unwrap_or_default();
    let mut txn = state.pool.begin().await.map_err(db::DatabaseError::Begin)?;
    let build =
        workspace::update_saved(&state.catalog, &mut txn, auth.user_id, build_id, request.name)
            .await?;
    txn.commit().await.map_err(db::DatabaseError::Commit)?;
    Ok(Json(json!({ "success": true, "build": build })))
}

#[derive(Deserialize)]
struct AutoBuildBody {
    purpose: String,
    budget: Option<Decimal>,
}

async fn autobuild(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(body): Json<AutoBuildBody>,
) -> ApiResult<Json<Value>> {
    let purpose: Purpose = body
        .purpose
        .parse()
        .map_err(|error: UnknownPurpose| ApiError::Validation(error.to_string()))?;

    let mut conn = acquire(&state.pool).await?;
    let request = AutoBuildRequest::from_purpose(purpose, body.budget);
    let generated = builder::generate(&state.catalog, &mut conn, &request).await?;

    let selection: Selection = generated
        .iter()
        .filter_map(|(category, id)| id.map(|id| (*category, id)))
        .collect();
    let expanded =
        workspace::expand(&state.catalog, &mut conn, &selection, ExpandMode::Strict).await?;

    // The generator's own output gets a final whole-build verdict before it
    // is allowed to touch the workspace.
    if let Err(reason) = compat::check_whole_build(&expanded) {
        return Err(ApiError::Incompatible {
            error: AUTOBUILD_INCOMPATIBLE,
            reason,
        });
    }

    workspace::replace(&mut conn, auth.user_id, &selection, None).await?;
    let summary = expanded.summary();
    Ok(Json(json!({
        "success": true,
        "components": generated,
        "build": expanded,
        "summary": summary,
    })))
}

async fn autocomplete(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
) -> ApiResult<Json<Value>> {
    let mut conn = acquire(&state.pool).await?;
    let temp = workspace::get(&mut conn, auth.user_id).await?;
    let current =
        workspace::expand(&state.catalog, &mut conn, &temp.components, ExpandMode::Strict).await?;

    // Only categories with a real component constrain the generator.
    let preset: Selection = current
        .parts
        .iter()
        .filter_map(|(category, part)| part.id.map(|id| (*category, id)))
        .collect();

    let request = AutoBuildRequest {
        purpose: builder::infer_purpose(&current),
        budget: None,
        respect_cpu: preset.get(&CategorySlug::Cpu).copied(),
        preset: preset.clone(),
    };
    let generated = builder::generate(&state.catalog, &mut conn, &request).await?;

    let mut selection = preset;
    selection.extend(
        generated
            .iter()
            .filter_map(|(category, id)| id.map(|id| (*category, id))),
    );
    let expanded =
        workspace::expand(&state.catalog, &mut conn, &selection, ExpandMode::Strict).await?;

    // Auto-complete output is held to the same final check as autobuild.
    if let Err(reason) = compat::check_whole_build(&expanded) {
        return Err(ApiError::Incompatible {
            error: AUTOBUILD_INCOMPATIBLE,
            reason,
        });
    }

    workspace::replace(&mut conn, auth.user_id, &selection, temp.source_build_id).await?;
    let summary = expanded.summary();
    Ok(Json(json!({
        "success": true,
        "components": generated,
        "build": expanded,
        "summary": summary,
    })))
}
