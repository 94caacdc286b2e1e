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

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category marker carried by cart and order lines that stand for a whole
/// saved build rather than a single component.
pub const BUILD_BUNDLE_CATEGORY: &str = "build_bundle";

/// A user's cart. One row per user; items hang off it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Cart {
    pub id: i64,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// One cart line. Component lines carry `component_id` + unit `price` +
/// `quantity`; bundle lines carry the saved-build columns and
/// `category = "build_bundle"`. At most one component line exists per
/// `(user_id, component_id)`; re-adding increments `quantity` instead.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CartItem {
    pub id: i64,
    pub cart_id: i64,
    pub user_id: Uuid,
    pub component_id: Option<i64>,
    pub build_id: Option<i64>,
    pub build_name: Option<String>,
    pub build_total_price: Option<Decimal>,
    pub bundle_item_count: Option<i32>,
    pub price: Decimal,
    pub quantity: i32,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl CartItem {
    pub fn is_bundle(&self) -> bool {
        self.build_id.is_some() && self.category == BUILD_BUNDLE_CATEGORY
    }
}
