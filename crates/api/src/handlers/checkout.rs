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
use axum::routing::{Router, post};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::auth::AuthContext;
use crate::errors::ApiResult;
use crate::orders::{self, CheckoutOptions};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(checkout_cart))
        .route("/build/{buildId}", post(checkout_build))
}

#[derive(Deserialize, Default)]
struct CheckoutRequest {
    item_ids: Option<Vec<i64>>,
    payment_method: Option<String>,
    notes: Option<String>,
}

async fn checkout_cart(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    request: Option<Json<CheckoutRequest>>,
) -> ApiResult<Json<Value>> {
    let Json(request) = request.unwrap_or_default();
    let options = CheckoutOptions {
        payment_method: request.payment_method,
        notes: request.notes,
    };
    let (order, items) = orders::checkout_cart(
        &state.catalog,
        &state.pool,
        auth.user_id,
        request.item_ids,
        options,
    )
    .await?;
    Ok(Json(json!({ "success": true, "order": order, "items": items })))
}

#[derive(Deserialize, Default)]
struct BuildCheckoutRequest {
    payment_method: Option<String>,
    notes: Option<String>,
}

async fn checkout_build(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(build_id): Path<i64>,
    request: Option<Json<BuildCheckoutRequest>>,
) -> ApiResult<Json<Value>> {
    let Json(request) = request.unwrap_or_default();
    let options = CheckoutOptions {
        payment_method: request.payment_method,
        notes: request.notes,
    };
    let (order, items) =
        orders::checkout_saved_build(&state.catalog, &state.pool, auth.user_id, build_id, options)
            .await?;
    Ok(Json(json!({ "success": true, "order": order, "items": items })))
}
