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

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::AppState;

mod admin;
mod builder;
mod cart;
mod checkout;
mod orders;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api/builder", builder::router())
        .nest("/api/cart", cart::router())
        .nest("/api/checkout", checkout::router())
        .nest("/api/orders", orders::router())
        .nest("/api/admin", admin::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
