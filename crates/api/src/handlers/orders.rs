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
use axum::routing::{Router, get};
use serde_json::{Value, json};

use crate::auth::AuthContext;
use crate::errors::{ApiError, ApiResult};
use crate::{AppState, acquire};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_orders))
        .route("/{id}", get(get_order))
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
) -> ApiResult<Json<Value>> {
    let mut conn = acquire(&state.pool).await?;
    let orders = db::order::list_for_user(&mut conn, auth.user_id).await?;
    Ok(Json(json!({ "success": true, "orders": orders })))
}

/// Owner-scoped order detail. Items carry their snapshot columns, so the
/// response stays renderable even when the referenced component is gone.
async fn get_order(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(order_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let mut conn = acquire(&state.pool).await?;
    let Some(order) = db::order::find_for_user(&mut conn, auth.user_id, order_id).await? else {
        return Err(ApiError::NotFound("Order"));
    };
    let items = db::order::items(&mut conn, order.id).await?;
    Ok(Json(json!({ "success": true, "order": order, "items": items })))
}
