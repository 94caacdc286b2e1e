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

use sqlx::PgPool;
use sqlx::pool::PoolConnection;
use sqlx::Postgres;

pub mod auth;
pub mod builder;
pub mod catalog;
pub mod cfg;
pub mod errors;
pub mod handlers;
pub mod logging;
pub mod orders;
pub mod workspace;

#[cfg(test)]
mod tests;

pub use cfg::command_line::{Command, Options};
pub use cfg::file::RigforgeConfig;

use crate::catalog::{CatalogService, StorageUrls};
use crate::errors::ApiError;

/// Shared state behind every request handler. The catalog's specs cache is
/// the only mutable part.
pub struct AppState {
    pub pool: PgPool,
    pub catalog: CatalogService,
    pub config: RigforgeConfig,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(pool: PgPool, config: RigforgeConfig) -> Self {
        let storage = StorageUrls::new(config.identity_url.clone(), config.storage_bucket.clone());
        AppState {
            pool,
            catalog: CatalogService::new(storage),
            config,
            http: reqwest::Client::new(),
        }
    }
}

/// One pooled connection, with acquisition failures mapped onto the API
/// error surface.
pub async fn acquire(pool: &PgPool) -> Result<PoolConnection<Postgres>, ApiError> {
    pool.acquire()
        .await
        .map_err(db::DatabaseError::acquire)
        .map_err(ApiError::from)
}

/// Brings the service up: pool, keep-alive probe, router, listener. Blocks
/// until shutdown.
pub async fn run(config: RigforgeConfig) -> eyre::Result<()> {
    let pool = db::connect(&config.database_url).await?;
    let _keepalive = db::spawn_keepalive(pool.clone());

    let listen_address = config.listen_address;
    let state = Arc::new(AppState::new(pool, config));
    let app = handlers::router(state);

    let listener = tokio::net::TcpListener::bind(listen_address).await?;
    tracing::info!(%listen_address, "rigforge-api listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to install shutdown handler");
    }
}
