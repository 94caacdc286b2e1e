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

use model::category::{Category, CategorySlug};
use sqlx::PgConnection;

use crate::DatabaseError;

pub async fn list(txn: &mut PgConnection) -> Result<Vec<Category>, DatabaseError> {
    let query = "SELECT * FROM categories ORDER BY id";
    sqlx::query_as(query)
        .fetch_all(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

pub async fn find_by_slug(
    txn: &mut PgConnection,
    slug: CategorySlug,
) -> Result<Option<Category>, DatabaseError> {
    let query = "SELECT * FROM categories WHERE slug = $1";
    sqlx::query_as(query)
        .bind(slug)
        .fetch_optional(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}
