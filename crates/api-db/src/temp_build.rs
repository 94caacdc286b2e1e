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

use model::build::{Selection, TempBuild};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::DatabaseError;

pub async fn find(
    txn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Option<TempBuild>, DatabaseError> {
    let query = "SELECT * FROM user_builds_temp WHERE user_id = $1";
    sqlx::query_as(query)
        .bind(user_id)
        .fetch_optional(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

/// Writes the whole workspace row. The workspace is implicitly created on
/// first mutation; the row is the unit of last-writer-wins for a user's
/// request stream.
pub async fn upsert(
    txn: &mut PgConnection,
    user_id: Uuid,
    components: &Selection,
    source_build_id: Option<i64>,
) -> Result<TempBuild, DatabaseError> {
    let query = "INSERT INTO user_builds_temp (user_id, components, source_build_id, updated_at) \
                 VALUES ($1, $2, $3, NOW()) \
                 ON CONFLICT (user_id) DO UPDATE SET \
                     components = $2, source_build_id = $3, updated_at = NOW() \
                 RETURNING *";
    sqlx::query_as(query)
        .bind(user_id)
        .bind(sqlx::types::Json(components))
        .bind(source_build_id)
        .fetch_one(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

/// Clearing is idempotent: a missing row already is the empty workspace.
pub async fn clear(txn: &mut PgConnection, user_id: Uuid) -> Result<(), DatabaseError> {
    let query = "DELETE FROM user_builds_temp WHERE user_id = $1";
    sqlx::query(query)
        .bind(user_id)
        .execute(txn)
        .await
        .map(|_| ())
        .map_err(|e| DatabaseError::query(query, e))
}

#[cfg(test)]
mod tests {
    use model::category::CategorySlug;

    use super::*;

    #[sqlx::test(migrator = "crate::migrations::MIGRATOR")]
    async fn workspace_round_trip(pool: sqlx::PgPool) {
        let mut txn = pool.begin().await.unwrap();
        let user = Uuid::new_v4();

        assert!(find(&mut txn, user).await.unwrap().is_none());

        let mut selection = Selection::new();
        selection.insert(CategorySlug::Cpu, 7);
        let row = upsert(&mut txn, user, &selection, None).await.unwrap();
        assert_eq!(row.components.get(&CategorySlug::Cpu), Some(&7));
        assert_eq!(row.source_build_id, None);

        // Re-upserting replaces the selection and keeps one row per user.
        selection.insert(CategorySlug::Memory, 9);
        let row = upsert(&mut txn, user, &selection, None).await.unwrap();
        assert_eq!(row.components.len(), 2);

        clear(&mut txn, user).await.unwrap();
        assert!(find(&mut txn, user).await.unwrap().is_none());
        // Clearing twice is fine.
        clear(&mut txn, user).await.unwrap();

        txn.commit().await.unwrap();
    }
}
