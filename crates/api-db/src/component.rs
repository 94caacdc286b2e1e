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

use model::category::CategorySlug;
use model::component::{Component, ComponentDraft};
use rust_decimal::Decimal;
use sqlx::PgConnection;

use crate::DatabaseError;

/// Components are always read joined with their category slug; the slug is
/// what selects the specs table and the compatibility rules.
pub async fn find_by_id(
    txn: &mut PgConnection,
    component_id: i64,
) -> Result<Option<Component>, DatabaseError> {
    let query = "SELECT c.*, cat.slug AS category FROM components c \
                 JOIN categories cat ON cat.id = c.category_id \
                 WHERE c.id = $1";
    sqlx::query_as(query)
        .bind(component_id)
        .fetch_optional(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

pub async fn find_by_ids(
    txn: &mut PgConnection,
    component_ids: &[i64],
) -> Result<Vec<Component>, DatabaseError> {
    let query = "SELECT c.*, cat.slug AS category FROM components c \
                 JOIN categories cat ON cat.id = c.category_id \
                 WHERE c.id = ANY($1)";
    sqlx::query_as(query)
        .bind(component_ids)
        .fetch_all(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

/// Lists a category's components ordered by ascending price, the order every
/// catalog listing presents.
pub async fn list_by_category(
    txn: &mut PgConnection,
    slug: CategorySlug,
) -> Result<Vec<Component>, DatabaseError> {
    let query = "SELECT c.*, cat.slug AS category FROM components c \
                 JOIN categories cat ON cat.id = c.category_id \
                 WHERE cat.slug = $1 \
                 ORDER BY c.price ASC, c.id ASC";
    sqlx::query_as(query)
        .bind(slug)
        .fetch_all(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

/// The row shape the order path locks: enough to validate stock and snapshot
/// the line.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LockedComponent {
    pub id: i64,
    pub category: CategorySlug,
    pub name: String,
    pub price: Decimal,
    pub stock: Option<i32>,
    pub image_path: Option<String>,
}

/// Locks the given component rows for the rest of the transaction. Rows are
/// locked in id order so concurrent checkouts touching the same set cannot
/// deadlock.
pub async fn lock_for_update(
    txn: &mut PgConnection,
    component_ids: &[i64],
) -> Result<Vec<LockedComponent>, DatabaseError> {
    let query = "SELECT c.id, cat.slug AS category, c.name, c.price, c.stock, c.image_path \
                 FROM components c \
                 JOIN categories cat ON cat.id = c.category_id \
                 WHERE c.id = ANY($1) \
                 ORDER BY c.id \
                 FOR UPDATE OF c";
    sqlx::query_as(query)
        .bind(component_ids)
        .fetch_all(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

/// Deducts sold stock. Untracked stock (NULL) stays untracked.
pub async fn decrement_stock(
    txn: &mut PgConnection,
    component_id: i64,
    quantity: i32,
) -> Result<(), DatabaseError> {
    let query = "UPDATE components SET stock = stock - $2, updated_at = NOW() WHERE id = $1";
    sqlx::query(query)
        .bind(component_id)
        .bind(quantity)
        .execute(txn)
        .await
        .map(|_| ())
        .map_err(|e| DatabaseError::query(query, e))
}

pub async fn create(
    txn: &mut PgConnection,
    category_id: i64,
    draft: &ComponentDraft,
) -> Result<Component, DatabaseError> {
    let query = "WITH inserted AS (\
                     INSERT INTO components \
                         (category_id, name, brand, price, stock, status, low_stock_threshold, vendor, image_path) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
                     RETURNING *\
                 ) \
                 SELECT inserted.*, cat.slug AS category FROM inserted \
                 JOIN categories cat ON cat.id = inserted.category_id";
    sqlx::query_as(query)
        .bind(category_id)
        .bind(&draft.name)
        .bind(&draft.brand)
        .bind(draft.price)
        .bind(draft.stock)
        .bind(draft.status)
        .bind(draft.low_stock_threshold)
        .bind(&draft.vendor)
        .bind(&draft.image_path)
        .fetch_one(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

pub async fn update(
    txn: &mut PgConnection,
    component_id: i64,
    draft: &ComponentDraft,
) -> Result<Option<Component>, DatabaseError> {
    let query = "WITH updated AS (\
                     UPDATE components SET \
                         name = $2, brand = $3, price = $4, stock = $5, status = $6, \
                         low_stock_threshold = $7, vendor = $8, image_path = $9, updated_at = NOW() \
                     WHERE id = $1 \
                     RETURNING *\
                 ) \
                 SELECT updated.*, cat.slug AS category FROM updated \
                 JOIN categories cat ON cat.id = updated.category_id";
    sqlx::query_as(query)
        .bind(component_id)
        .bind(&draft.name)
        .bind(&draft.brand)
        .bind(draft.price)
        .bind(draft.stock)
        .bind(draft.status)
        .bind(draft.low_stock_threshold)
        .bind(&draft.vendor)
        .bind(&draft.image_path)
        .fetch_optional(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

pub async fn delete(txn: &mut PgConnection, component_id: i64) -> Result<bool, DatabaseError> {
    let query = "DELETE FROM components WHERE id = $1";
    sqlx::query(query)
        .bind(component_id)
        .execute(txn)
        .await
        .map(|result| result.rows_affected() > 0)
        .map_err(|e| DatabaseError::query(query, e))
}
