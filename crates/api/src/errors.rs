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

use axum::Json;
use axum::response::{IntoResponse, Response};
use compat::Incompatibility;
use db::DatabaseError;
use http::StatusCode;
use serde_json::json;
use thiserror::Error;

/// Error context for a compatibility rejection while mutating a workspace.
pub const INCOMPATIBLE_COMPONENT: &str = "Incompatible component";

/// Error context when the auto-builder's own output fails the final check.
pub const AUTOBUILD_INCOMPATIBLE: &str = "AutoBuild generated an incompatible build";

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad input: unknown category, missing field, invalid status, …
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    /// A compatibility-rule rejection, surfaced with its reason.
    #[error("{error}: {reason}")]
    Incompatible {
        error: &'static str,
        reason: Incompatibility,
    },

    #[error("Insufficient stock for {name}. Remaining: {remaining}")]
    InsufficientStock { name: String, remaining: i32 },

    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("forbidden")]
    Forbidden,

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("identity provider request failed: {0}")]
    Identity(#[from] reqwest::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Validation(message) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            ApiError::NotFound(_) => {
                (StatusCode::NOT_FOUND, json!({ "error": self.to_string() }))
            }
            ApiError::Incompatible { error, reason } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": error, "reason": reason.to_string() }),
            ),
            ApiError::InsufficientStock { .. } => {
                (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() }))
            }
            ApiError::Unauthorized(_) => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Authentication required" }),
            ),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, json!({ "error": "Admin only" })),
            // Infrastructure failures: details go to the log, the client
            // gets a generic message.
            ApiError::Database(error) => {
                tracing::error!(%error, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
            ApiError::Identity(error) => {
                tracing::error!(%error, "identity provider error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
