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

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// The upstream connection pooler tolerates few concurrent connections, so
/// the whole process shares this bounded pool.
pub const MAX_CONNECTIONS: u32 = 5;

/// Connections idle longer than this are reaped by upstream poolers anyway;
/// drop them first so we never hand out a dead connection.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(15);

pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(10);

pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .idle_timeout(IDLE_TIMEOUT)
        .connect(database_url)
        .await
}

/// Spawns the periodic keep-alive probe. Probe failures are logged and never
/// terminate the process; the pool re-establishes connections on demand.
pub fn spawn_keepalive(pool: PgPool) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(KEEPALIVE_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if let Err(error) = sqlx::query("SELECT 1").execute(&pool).await {
                tracing::warn!(%error, "database keep-alive probe failed");
            }
        }
    })
}
