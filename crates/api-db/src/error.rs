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

use thiserror::Error;

pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("query `{query}` failed: {source}")]
    Query {
        query: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to acquire database connection: {0}")]
    Acquire(#[source] sqlx::Error),

    #[error("failed to begin transaction: {0}")]
    Begin(#[source] sqlx::Error),

    #[error("failed to commit transaction: {0}")]
    Commit(#[source] sqlx::Error),
}

impl DatabaseError {
    /// Standard constructor for query failures, keeping the failing SQL next
    /// to the driver error in the log line.
    pub fn query(query: &str, source: sqlx::Error) -> Self {
        DatabaseError::Query {
            query: query.to_string(),
            source,
        }
    }

    pub fn acquire(source: sqlx::Error) -> Self {
        DatabaseError::Acquire(source)
    }
}
