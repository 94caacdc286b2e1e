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

use model::order::{Order, OrderItem, OrderStatus};
use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::DatabaseError;

pub async fn insert(
    txn: &mut PgConnection,
    user_id: Uuid,
    total: Decimal,
    payment_method: &str,
    notes: Option<&str>,
) -> Result<Order, DatabaseError> {
    let query = "INSERT INTO orders (user_id, total, payment_method, notes) \
                 VALUES ($1, $2, $3, $4) \
                 RETURNING *";
    sqlx::query_as(query)
        .bind(user_id)
        .bind(total)
        .bind(payment_method)
        .bind(notes)
        .fetch_one(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

/// The catalog snapshot and line data for one order item.
#[derive(Debug, Clone)]
pub struct NewOrderItem<'a> {
    pub component_id: Option<i64>,
    pub build_id: Option<i64>,
    pub quantity: i32,
    pub price_each: Decimal,
    pub category: &'a str,
    pub component_name: &'a str,
    pub component_image: Option<&'a str>,
    pub component_category: &'a str,
}

pub async fn insert_item(
    txn: &mut PgConnection,
    order_id: i64,
    item: &NewOrderItem<'_>,
) -> Result<OrderItem, DatabaseError> {
    let query = "INSERT INTO order_items \
                     (order_id, component_id, build_id, quantity, price_each, category, \
                      component_name, component_image, component_category) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
                 RETURNING *";
    sqlx::query_as(query)
        .bind(order_id)
        .bind(item.component_id)
        .bind(item.build_id)
        .bind(item.quantity)
        .bind(item.price_each)
        .bind(item.category)
        .bind(item.component_name)
        .bind(item.component_image)
        .bind(item.component_category)
        .fetch_one(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

pub async fn list_for_user(
    txn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Vec<Order>, DatabaseError> {
    let query = "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC";
    sqlx::query_as(query)
        .bind(user_id)
        .fetch_all(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

pub async fn find_for_user(
    txn: &mut PgConnection,
    user_id: Uuid,
    order_id: i64,
) -> Result<Option<Order>, DatabaseError> {
    let query = "SELECT * FROM orders WHERE id = $2 AND user_id = $1";
    sqlx::query_as(query)
        .bind(user_id)
        .bind(order_id)
        .fetch_optional(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

pub async fn items(
    txn: &mut PgConnection,
    order_id: i64,
) -> Result<Vec<OrderItem>, DatabaseError> {
    let query = "SELECT * FROM order_items WHERE order_id = $1 ORDER BY id";
    sqlx::query_as(query)
        .bind(order_id)
        .fetch_all(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

/// Moves an order to `status`, stamping `updated_at` and the status's own
/// transition timestamp. Transitions are admin-driven and deliberately not a
/// state machine.
pub async fn update_status(
    txn: &mut PgConnection,
    order_id: i64,
    status: OrderStatus,
) -> Result<Option<Order>, DatabaseError> {
    // The column name comes from the fixed status vocabulary, never from
    // user input.
    let query = match status.timestamp_column() {
        Some(column) => format!(
            "UPDATE orders SET status = $1, updated_at = NOW(), {column} = NOW() \
             WHERE id = $2 RETURNING *"
        ),
        None => "UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING *"
            .to_string(),
    };
    sqlx::query_as(&query)
        .bind(status)
        .bind(order_id)
        .fetch_optional(txn)
        .await
        .map_err(|e| DatabaseError::query(&query, e))
}
