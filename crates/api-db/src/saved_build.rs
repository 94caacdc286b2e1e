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

use model::build::{BuildCompatibility, SavedBuild, Selection};
use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::DatabaseError;

/// The denormalized columns written whenever a build is saved or updated.
#[derive(Debug, Clone)]
pub struct SavedBuildRecord<'a> {
    pub name: &'a str,
    pub components: &'a Selection,
    pub total_price: Decimal,
    pub power_usage: i32,
    pub compatibility: BuildCompatibility,
    pub image_url: Option<&'a str>,
}

pub async fn insert(
    txn: &mut PgConnection,
    user_id: Uuid,
    record: &SavedBuildRecord<'_>,
) -> Result<SavedBuild, DatabaseError> {
    let query = "INSERT INTO user_builds \
                     (user_id, name, components, total_price, power_usage, compatibility, image_url) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 RETURNING *";
    sqlx::query_as(query)
        .bind(user_id)
        .bind(record.name)
        .bind(sqlx::types::Json(record.components))
        .bind(record.total_price)
        .bind(record.power_usage)
        .bind(record.compatibility)
        .bind(record.image_url)
        .fetch_one(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

pub async fn update(
    txn: &mut PgConnection,
    user_id: Uuid,
    build_id: i64,
    record: &SavedBuildRecord<'_>,
) -> Result<Option<SavedBuild>, DatabaseError> {
    let query = "UPDATE user_builds SET \
                     name = $3, components = $4, total_price = $5, power_usage = $6, \
                     compatibility = $7, image_url = $8, updated_at = NOW() \
                 WHERE id = $2 AND user_id = $1 AND is_saved \
                 RETURNING *";
    sqlx::query_as(query)
        .bind(user_id)
        .bind(build_id)
        .bind(record.name)
        .bind(sqlx::types::Json(record.components))
        .bind(record.total_price)
        .bind(record.power_usage)
        .bind(record.compatibility)
        .bind(record.image_url)
        .fetch_optional(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

/// The user's build library: saved builds only, newest first.
pub async fn list_for_user(
    txn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Vec<SavedBuild>, DatabaseError> {
    let query = "SELECT * FROM user_builds WHERE user_id = $1 AND is_saved \
                 ORDER BY created_at DESC, id DESC";
    sqlx::query_as(query)
        .bind(user_id)
        .fetch_all(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

pub async fn find_for_user(
    txn: &mut PgConnection,
    user_id: Uuid,
    build_id: i64,
) -> Result<Option<SavedBuild>, DatabaseError> {
    let query = "SELECT * FROM user_builds WHERE id = $2 AND user_id = $1 AND is_saved";
    sqlx::query_as(query)
        .bind(user_id)
        .bind(build_id)
        .fetch_optional(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

/// Lookup that ignores the soft-delete flag, for order lines that reference
/// a build no longer in the library.
pub async fn find_any_for_user(
    txn: &mut PgConnection,
    user_id: Uuid,
    build_id: i64,
) -> Result<Option<SavedBuild>, DatabaseError> {
    let query = "SELECT * FROM user_builds WHERE id = $2 AND user_id = $1";
    sqlx::query_as(query)
        .bind(user_id)
        .bind(build_id)
        .fetch_optional(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

pub async fn names_for_user(
    txn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Vec<String>, DatabaseError> {
    let query = "SELECT name FROM user_builds WHERE user_id = $1 AND is_saved";
    let names: Vec<(String,)> = sqlx::query_as(query)
        .bind(user_id)
        .fetch_all(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))?;
    Ok(names.into_iter().map(|(name,)| name).collect())
}

/// Soft deletes a build by flipping `is_saved`. Returns `None` when the
/// build is absent or already deleted, so the operation is idempotent.
pub async fn soft_delete(
    txn: &mut PgConnection,
    user_id: Uuid,
    build_id: i64,
) -> Result<Option<i64>, DatabaseError> {
    let query = "UPDATE user_builds SET is_saved = FALSE, updated_at = NOW() \
                 WHERE id = $2 AND user_id = $1 AND is_saved \
                 RETURNING id";
    match sqlx::query_as::<_, (i64,)>(query)
        .bind(user_id)
        .bind(build_id)
        .fetch_one(txn)
        .await
    {
        Ok((id,)) => Ok(Some(id)),
        Err(sqlx::Error::RowNotFound) => Ok(None),
        Err(e) => Err(DatabaseError::query(query, e)),
    }
}

#[cfg(test)]
mod tests {
    use model::category::CategorySlug;
    use rust_decimal_macros::dec;

    use super::*;

    fn selection() -> Selection {
        let mut selection = Selection::new();
        selection.insert(CategorySlug::Cpu, 1);
        selection.insert(CategorySlug::Motherboard, 2);
        selection
    }

    #[sqlx::test(migrator = "crate::migrations::MIGRATOR")]
    async fn saved_build_crud_and_soft_delete(pool: sqlx::PgPool) {
        let mut txn = pool.begin().await.unwrap();
        let user = Uuid::new_v4();
        let components = selection();

        let record = SavedBuildRecord {
            name: "My Rig",
            components: &components,
            total_price: dec!(1234.50),
            power_usage: 410,
            compatibility: BuildCompatibility::Incomplete,
            image_url: None,
        };
        let build = insert(&mut txn, user, &record).await.unwrap();
        assert_eq!(build.name, "My Rig");
        assert!(build.is_saved);
        assert_eq!(build.components, components);

        let listed = list_for_user(&mut txn, user).await.unwrap();
        assert_eq!(listed.len(), 1);

        // Another user cannot see or touch it.
        let stranger = Uuid::new_v4();
        assert!(
            find_for_user(&mut txn, stranger, build.id)
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(soft_delete(&mut txn, stranger, build.id).await.unwrap(), None);

        // Soft delete hides the build but keeps the row resolvable.
        assert_eq!(
            soft_delete(&mut txn, user, build.id).await.unwrap(),
            Some(build.id)
        );
        assert!(
            find_for_user(&mut txn, user, build.id)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            find_any_for_user(&mut txn, user, build.id)
                .await
                .unwrap()
                .is_some()
        );
        // Second delete is a no-op.
        assert_eq!(soft_delete(&mut txn, user, build.id).await.unwrap(), None);

        txn.commit().await.unwrap();
    }
}
