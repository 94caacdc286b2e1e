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

//! The order engine: turns a cart selection or a saved build into a durable
//! order inside one transaction. Every touched component row is locked
//! before any write, so either the order exists with stock decremented or
//! nothing changed.

use std::collections::{BTreeMap, BTreeSet};

use db::DatabaseError;
use db::component::LockedComponent;
use model::cart::CartItem;
use model::order::{DEFAULT_PAYMENT_METHOD, Order, OrderItem, OrderStatus};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::catalog::CatalogService;
use crate::errors::{ApiError, ApiResult};

#[derive(Debug, Clone, Default)]
pub struct CheckoutOptions {
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

/// Converts the user's cart (or the subset named by `item_ids`) into an
/// order. Selected lines are removed from the cart; unselected lines
/// survive.
#[tracing::instrument(skip(catalog, pool, options))]
pub async fn checkout_cart(
    catalog: &CatalogService,
    pool: &PgPool,
    user_id: Uuid,
    item_ids: Option<Vec<i64>>,
    options: CheckoutOptions,
) -> ApiResult<(Order, Vec<OrderItem>)> {
    let mut txn = pool.begin().await.map_err(DatabaseError::Begin)?;
    match cart_checkout_in_txn(catalog, &mut txn, user_id, item_ids, &options).await {
        Ok(result) => {
            txn.commit().await.map_err(DatabaseError::Commit)?;
            Ok(result)
        }
        Err(error) => {
            // Rollback before responding so the failure leaves no trace.
            txn.rollback().await.ok();
            Err(error)
        }
    }
}

/// Converts a saved build into an order of its parts and soft-deletes the
/// build afterwards, keeping the order's build reference resolvable.
#[tracing::instrument(skip(catalog, pool, options))]
pub async fn checkout_saved_build(
    catalog: &CatalogService,
    pool: &PgPool,
    user_id: Uuid,
    build_id: i64,
    options: CheckoutOptions,
) -> ApiResult<(Order, Vec<OrderItem>)> {
    let mut txn = pool.begin().await.map_err(DatabaseError::Begin)?;
    match build_checkout_in_txn(catalog, &mut txn, user_id, build_id, &options).await {
        Ok(result) => {
            txn.commit().await.map_err(DatabaseError::Commit)?;
            Ok(result)
        }
        Err(error) => {
            txn.rollback().await.ok();
            Err(error)
        }
    }
}

enum Line {
    Component {
        item: CartItem,
        component_id: i64,
    },
    Bundle {
        item: CartItem,
        build_id: i64,
        internal: Vec<i64>,
    },
}

async fn cart_checkout_in_txn(
    catalog: &CatalogService,
    txn: &mut PgConnection,
    user_id: Uuid,
    item_ids: Option<Vec<i64>>,
    options: &CheckoutOptions,
) -> ApiResult<(Order, Vec<OrderItem>)> {
    let items = db::cart::items_for_user(txn, user_id).await?;
    if items.is_empty() {
        return Err(ApiError::Validation("Cart is empty".to_string()));
    }

    let selected: Vec<CartItem> = match &item_ids {
        Some(ids) => items
            .into_iter()
            .filter(|item| ids.contains(&item.id))
            .collect(),
        None => items,
    };
    if selected.is_empty() {
        return Err(ApiError::Validation("No valid items selected".to_string()));
    }
    let selected_ids: Vec<i64> = selected.iter().map(|item| item.id).collect();

    // Resolve every line before locking anything so that the lock set is
    // complete up front.
    let mut lines = Vec::with_capacity(selected.len());
    for item in selected {
        match (item.component_id, item.build_id) {
            (Some(component_id), _) => lines.push(Line::Component { item, component_id }),
            (None, Some(build_id)) => {
                let Some(build) =
                    db::saved_build::find_any_for_user(txn, user_id, build_id).await?
                else {
                    return Err(ApiError::NotFound("Build"));
                };
                let internal: Vec<i64> = build.components.values().copied().collect();
                lines.push(Line::Bundle {
                    item,
                    build_id,
                    internal,
                });
            }
            (None, None) => {
                return Err(ApiError::Validation("Malformed cart line".to_string()));
            }
        }
    }

    let mut lock_set: BTreeSet<i64> = BTreeSet::new();
    for line in &lines {
        match line {
            Line::Component { component_id, .. } => {
                lock_set.insert(*component_id);
            }
            Line::Bundle { internal, .. } => {
                lock_set.extend(internal.iter().copied());
            }
        }
    }
    let lock_ids: Vec<i64> = lock_set.into_iter().collect();
    let locked = lock_components(txn, &lock_ids).await?;

    // Bundle internals whose component vanished from the catalog are
    // dropped, matching strict expansion; a component line with no catalog
    // row cannot be priced and fails the checkout.
    let mut needed: BTreeMap<i64, i32> = BTreeMap::new();
    for line in &lines {
        match line {
            Line::Component { item, component_id } => {
                if !locked.contains_key(component_id) {
                    return Err(ApiError::NotFound("Component"));
                }
                *needed.entry(*component_id).or_default() += item.quantity;
            }
            Line::Bundle { item, internal, .. } => {
                for component_id in internal {
                    if locked.contains_key(component_id) {
                        *needed.entry(*component_id).or_default() += item.quantity;
                    }
                }
            }
        }
    }
    validate_stock(&locked, &needed)?;

    let mut total = Decimal::ZERO;
    let mut planned: Vec<PlannedItem> = Vec::new();
    for line in &lines {
        match line {
            Line::Component { item, component_id } => {
                let Some(row) = locked.get(component_id) else {
                    return Err(ApiError::NotFound("Component"));
                };
                total += item.price * Decimal::from(item.quantity);
                planned.push(PlannedItem {
                    component_id: Some(*component_id),
                    build_id: None,
                    quantity: item.quantity,
                    price_each: item.price,
                    category: item.category.clone(),
                    row: row.clone(),
                });
            }
            Line::Bundle {
                item,
                build_id,
                internal,
            } => {
                for component_id in internal {
                    let Some(row) = locked.get(component_id) else {
                        continue;
                    };
                    total += row.price * Decimal::from(item.quantity);
                    planned.push(PlannedItem {
                        component_id: Some(*component_id),
                        build_id: Some(*build_id),
                        quantity: item.quantity,
                        price_each: row.price,
                        category: row.category.to_string(),
                        row: row.clone(),
                    });
                }
            }
        }
    }

    let order = db::order::insert(
        txn,
        user_id,
        total,
        options
            .payment_method
            .as_deref()
            .unwrap_or(DEFAULT_PAYMENT_METHOD),
        options.notes.as_deref(),
    )
    .await?;
    let inserted = insert_and_decrement(catalog, txn, order.id, &planned).await?;

    db::cart::delete_items(txn, user_id, &selected_ids).await?;
    Ok((order, inserted))
}

async fn build_checkout_in_txn(
    catalog: &CatalogService,
    txn: &mut PgConnection,
    user_id: Uuid,
    build_id: i64,
    options: &CheckoutOptions,
) -> ApiResult<(Order, Vec<OrderItem>)> {
    let Some(build) = db::saved_build::find_for_user(txn, user_id, build_id).await? else {
        return Err(ApiError::NotFound("Build"));
    };

    let component_ids: Vec<i64> = build.components.values().copied().collect();
    let locked = lock_components(txn, &component_ids).await?;
    // Dangling selection entries are excluded, as in strict expansion.
    if locked.is_empty() {
        return Err(ApiError::Validation("Build has no components".to_string()));
    }

    let needed: BTreeMap<i64, i32> = locked.keys().map(|id| (*id, 1)).collect();
    validate_stock(&locked, &needed)?;

    let mut total = Decimal::ZERO;
    let mut planned: Vec<PlannedItem> = Vec::new();
    for row in locked.values() {
        total += row.price;
        planned.push(PlannedItem {
            component_id: Some(row.id),
            build_id: Some(build.id),
            quantity: 1,
            price_each: row.price,
            category: row.category.to_string(),
            row: row.clone(),
        });
    }

    let order = db::order::insert(
        txn,
        user_id,
        total,
        options
            .payment_method
            .as_deref()
            .unwrap_or(DEFAULT_PAYMENT_METHOD),
        options.notes.as_deref(),
    )
    .await?;
    let inserted = insert_and_decrement(catalog, txn, order.id, &planned).await?;

    db::saved_build::soft_delete(txn, user_id, build_id).await?;
    Ok((order, inserted))
}

struct PlannedItem {
    component_id: Option<i64>,
    build_id: Option<i64>,
    quantity: i32,
    price_each: Decimal,
    category: String,
    row: LockedComponent,
}

async fn lock_components(
    txn: &mut PgConnection,
    component_ids: &[i64],
) -> ApiResult<BTreeMap<i64, LockedComponent>> {
    let rows = db::component::lock_for_update(txn, component_ids).await?;
    Ok(rows.into_iter().map(|row| (row.id, row)).collect())
}

fn validate_stock(
    locked: &BTreeMap<i64, LockedComponent>,
    needed: &BTreeMap<i64, i32>,
) -> ApiResult<()> {
    for (component_id, quantity) in needed {
        let Some(row) = locked.get(component_id) else {
            continue;
        };
        // Untracked stock never blocks a sale.
        let Some(stock) = row.stock else {
            continue;
        };
        if stock < *quantity {
            return Err(ApiError::InsufficientStock {
                name: row.name.clone(),
                remaining: stock,
            });
        }
    }
    Ok(())
}

async fn insert_and_decrement(
    catalog: &CatalogService,
    txn: &mut PgConnection,
    order_id: i64,
    planned: &[PlannedItem],
) -> ApiResult<Vec<OrderItem>> {
    let mut inserted = Vec::with_capacity(planned.len());
    for item in planned {
        let image = item
            .row
            .image_path
            .as_deref()
            .map(|path| catalog.image_url(path));
        let new_item = db::order::NewOrderItem {
            component_id: item.component_id,
            build_id: item.build_id,
            quantity: item.quantity,
            price_each: item.price_each,
            category: &item.category,
            component_name: &item.row.name,
            component_image: image.as_deref(),
            component_category: item.row.category.as_str(),
        };
        inserted.push(db::order::insert_item(txn, order_id, &new_item).await?);
        if let Some(component_id) = item.component_id {
            db::component::decrement_stock(txn, component_id, item.quantity).await?;
        }
    }
    Ok(inserted)
}

/// Validates and applies an admin status transition, stamping the matching
/// timestamp column.
pub async fn update_status(pool: &PgPool, order_id: i64, status: &str) -> ApiResult<Order> {
    let status: OrderStatus = status
        .parse()
        .map_err(|error: model::order::InvalidOrderStatus| {
            ApiError::Validation(error.to_string())
        })?;
    let mut txn = pool.begin().await.map_err(DatabaseError::Begin)?;
    let order = db::order::update_status(&mut txn, order_id, status)
        .await?
        .ok_or(ApiError::NotFound("Order"))?;
    txn.commit().await.map_err(DatabaseError::Commit)?;
    Ok(order)
}
