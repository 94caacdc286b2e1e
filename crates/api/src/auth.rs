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

//! Bearer-token authentication, proxied to the external identity provider.
//! The provider owns accounts and passwords; this service only resolves a
//! token to a user id and role.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use http::StatusCode;
use http::header::AUTHORIZATION;
use http::request::Parts;
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::errors::ApiError;

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub is_admin: bool,
}

/// An authenticated caller that has passed the admin gate.
#[derive(Debug, Clone)]
pub struct AdminContext(pub AuthContext);

#[derive(Debug, Deserialize)]
struct IdentityUser {
    id: Uuid,
    #[serde(default)]
    role: Option<String>,
}

/// Resolves a bearer token against the identity provider. Invalid tokens are
/// a 401 and provider outages never silently grant access.
pub async fn verify_bearer(state: &AppState, token: &str) -> Result<AuthContext, ApiError> {
    let url = format!(
        "{}/auth/v1/user",
        state.config.identity_url.trim_end_matches('/')
    );
    let response = state
        .http
        .get(url)
        .bearer_auth(token)
        .header("apikey", &state.config.identity_service_key)
        .send()
        .await?;

    match response.status() {
        status if status.is_success() => {
            let user: IdentityUser = response.json().await?;
            let is_admin = matches!(user.role.as_deref(), Some("admin") | Some("service_role"));
            Ok(AuthContext {
                user_id: user.id,
                is_admin,
            })
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(ApiError::Unauthorized("token rejected by identity provider"))
        }
        status => {
            tracing::error!(%status, "unexpected identity provider response");
            Err(ApiError::Unauthorized("token verification failed"))
        }
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::Unauthorized("missing bearer token"))
}

impl FromRequestParts<Arc<AppState>> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        verify_bearer(state, token).await
    }
}

impl FromRequestParts<Arc<AppState>> for AdminContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthContext::from_request_parts(parts, state).await?;
        if !auth.is_admin {
            return Err(ApiError::Forbidden);
        }
        Ok(AdminContext(auth))
    }
}
