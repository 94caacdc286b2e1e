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

use model::cart::{BUILD_BUNDLE_CATEGORY, Cart, CartItem};
use model::category::CategorySlug;
use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::DatabaseError;

/// Fetches the user's cart, creating the row on first touch.
pub async fn find_or_create(txn: &mut PgConnection, user_id: Uuid) -> Result<Cart, DatabaseError> {
    let query = "INSERT INTO carts (user_id) VALUES ($1) \
                 ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id \
                 RETURNING *";
    sqlx::query_as(query)
        .bind(user_id)
        .fetch_one(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

pub async fn items_for_user(
    txn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Vec<CartItem>, DatabaseError> {
    let query = "SELECT * FROM cart_items WHERE user_id = $1 ORDER BY created_at, id";
    sqlx::query_as(query)
        .bind(user_id)
        .fetch_all(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

pub async fn find_item(
    txn: &mut PgConnection,
    user_id: Uuid,
    item_id: i64,
) -> Result<Option<CartItem>, DatabaseError> {
    let query = "SELECT * FROM cart_items WHERE id = $2 AND user_id = $1";
    sqlx::query_as(query)
        .bind(user_id)
        .bind(item_id)
        .fetch_optional(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

/// Adds a component line. At most one line exists per (user, component);
/// adding a component already in the cart bumps its quantity instead.
pub async fn add_component_line(
    txn: &mut PgConnection,
    cart_id: i64,
    user_id: Uuid,
    component_id: i64,
    price: Decimal,
    category: CategorySlug,
    quantity: i32,
) -> Result<CartItem, DatabaseError> {
    let query = "INSERT INTO cart_items (cart_id, user_id, component_id, price, quantity, category) \
                 VALUES ($1, $2, $3, $4, $5, $6) \
                 ON CONFLICT (user_id, component_id) WHERE component_id IS NOT NULL \
                 DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity \
                 RETURNING *";
    sqlx::query_as(query)
        .bind(cart_id)
        .bind(user_id)
        .bind(component_id)
        .bind(price)
        .bind(quantity)
        .bind(category)
        .fetch_one(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

/// Adds a bundle line standing for a whole saved build.
pub async fn add_bundle_line(
    txn: &mut PgConnection,
    cart_id: i64,
    user_id: Uuid,
    build_id: i64,
    build_name: &str,
    build_total_price: Decimal,
    bundle_item_count: i32,
) -> Result<CartItem, DatabaseError> {
    let query = "INSERT INTO cart_items \
                     (cart_id, user_id, build_id, build_name, build_total_price, \
                      bundle_item_count, price, quantity, category) \
                 VALUES ($1, $2, $3, $4, $5, $6, $5, 1, $7) \
                 RETURNING *";
    sqlx::query_as(query)
        .bind(cart_id)
        .bind(user_id)
        .bind(build_id)
        .bind(build_name)
        .bind(build_total_price)
        .bind(bundle_item_count)
        .bind(BUILD_BUNDLE_CATEGORY)
        .fetch_one(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

/// Decrements a line's quantity, deleting the row when it reaches zero.
/// Returns the remaining quantity, or `None` when the line is gone (or never
/// existed).
pub async fn decrement_or_delete(
    txn: &mut PgConnection,
    user_id: Uuid,
    item_id: i64,
) -> Result<Option<i32>, DatabaseError> {
    let query = "UPDATE cart_items SET quantity = quantity - 1 \
                 WHERE id = $2 AND user_id = $1 AND quantity > 1 \
                 RETURNING quantity";
    let remaining: Option<(i32,)> = sqlx::query_as(query)
        .bind(user_id)
        .bind(item_id)
        .fetch_optional(&mut *txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))?;

    if let Some((quantity,)) = remaining {
        return Ok(Some(quantity));
    }

    delete_row(txn, user_id, item_id).await?;
    Ok(None)
}

pub async fn delete_row(
    txn: &mut PgConnection,
    user_id: Uuid,
    item_id: i64,
) -> Result<bool, DatabaseError> {
    let query = "DELETE FROM cart_items WHERE id = $2 AND user_id = $1";
    sqlx::query(query)
        .bind(user_id)
        .bind(item_id)
        .execute(txn)
        .await
        .map(|result| result.rows_affected() > 0)
        .map_err(|e| DatabaseError::query(query, e))
}

/// Removes exactly the given lines, used by selective checkout.
pub async fn delete_items(
    txn: &mut PgConnection,
    user_id: Uuid,
    item_ids: &[i64],
) -> Result<(), DatabaseError> {
    let query = "DELETE FROM cart_items WHERE user_id = $1 AND id = ANY($2)";
    sqlx::query(query)
        .bind(user_id)
        .bind(item_ids)
        .execute(txn)
        .await
        .map(|_| ())
        .map_err(|e| DatabaseError::query(query, e))
}

#[cfg(test)]
mod tests {
    use model::component::{ComponentDraft, ComponentStatus};
    use rust_decimal_macros::dec;

    use super::*;

    async fn seed_component(txn: &mut PgConnection, name: &str) -> i64 {
        let category = crate::category::find_by_slug(txn, CategorySlug::Gpu)
            .await
            .unwrap()
            .unwrap();
        crate::component::create(
            txn,
            category.id,
            &ComponentDraft {
                name: name.to_string(),
                brand: None,
                price: dec!(499.99),
                stock: Some(10),
                status: ComponentStatus::Active,
                low_stock_threshold: None,
                vendor: None,
                image_path: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[sqlx::test(migrator = "crate::migrations::MIGRATOR")]
    async fn component_lines_are_unique_per_user(pool: sqlx::PgPool) {
        let mut txn = pool.begin().await.unwrap();
        let user = Uuid::new_v4();
        let component_id = seed_component(&mut txn, "gpu one").await;
        let cart = find_or_create(&mut txn, user).await.unwrap();

        let first = add_component_line(
            &mut txn,
            cart.id,
            user,
            component_id,
            dec!(499.99),
            CategorySlug::Gpu,
            1,
        )
        .await
        .unwrap();
        assert_eq!(first.quantity, 1);

        // Re-adding increments the one existing row.
        let second = add_component_line(
            &mut txn,
            cart.id,
            user,
            component_id,
            dec!(499.99),
            CategorySlug::Gpu,
            1,
        )
        .await
        .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.quantity, 2);

        let items = items_for_user(&mut txn, user).await.unwrap();
        assert_eq!(items.len(), 1);

        // The same component in a different user's cart is a different row.
        let other_user = Uuid::new_v4();
        let other_cart = find_or_create(&mut txn, other_user).await.unwrap();
        let other = add_component_line(
            &mut txn,
            other_cart.id,
            other_user,
            component_id,
            dec!(499.99),
            CategorySlug::Gpu,
            1,
        )
        .await
        .unwrap();
        assert_ne!(other.id, first.id);

        txn.commit().await.unwrap();
    }

    #[sqlx::test(migrator = "crate::migrations::MIGRATOR")]
    async fn decrement_deletes_at_quantity_one(pool: sqlx::PgPool) {
        let mut txn = pool.begin().await.unwrap();
        let user = Uuid::new_v4();
        let component_id = seed_component(&mut txn, "gpu two").await;
        let cart = find_or_create(&mut txn, user).await.unwrap();

        let item = add_component_line(
            &mut txn,
            cart.id,
            user,
            component_id,
            dec!(499.99),
            CategorySlug::Gpu,
            2,
        )
        .await
        .unwrap();

        assert_eq!(
            decrement_or_delete(&mut txn, user, item.id).await.unwrap(),
            Some(1)
        );
        assert_eq!(decrement_or_delete(&mut txn, user, item.id).await.unwrap(), None);
        assert!(find_item(&mut txn, user, item.id).await.unwrap().is_none());

        txn.commit().await.unwrap();
    }
}
