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

use std::fmt;
use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::category::CategorySlug;
use crate::specs::Specs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "component_status")]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Active,
    Inactive,
}

impl Display for ComponentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let string = match self {
            ComponentStatus::Active => "active",
            ComponentStatus::Inactive => "inactive",
        };
        write!(f, "{string}")
    }
}

/// A sellable part, joined with its category slug. `status = active` together
/// with `stock > 0` is the necessary condition for user-facing visibility;
/// `stock` is nullable for parts whose inventory is not tracked.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Component {
    pub id: i64,
    pub category_id: i64,
    pub category: CategorySlug,
    pub name: String,
    pub brand: Option<String>,
    pub price: Decimal,
    pub stock: Option<i32>,
    pub status: ComponentStatus,
    pub low_stock_threshold: Option<i32>,
    pub vendor: Option<String>,
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Component {
    /// Whether the component may appear in user-facing listings.
    pub fn is_visible(&self) -> bool {
        self.status == ComponentStatus::Active && self.stock.is_none_or(|stock| stock > 0)
    }
}

/// The writable attributes of a component, as admin CRUD submits them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentDraft {
    pub name: String,
    pub brand: Option<String>,
    pub price: Decimal,
    pub stock: Option<i32>,
    #[serde(default = "default_status")]
    pub status: ComponentStatus,
    pub low_stock_threshold: Option<i32>,
    pub vendor: Option<String>,
    pub image_path: Option<String>,
}

fn default_status() -> ComponentStatus {
    ComponentStatus::Active
}

/// A component joined with its resolved specs and derived image URL, the unit
/// every catalog read returns.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogComponent {
    #[serde(flatten)]
    pub component: Component,
    pub image_url: Option<String>,
    pub specs: Option<Specs>,
}

impl CatalogComponent {
    pub fn id(&self) -> i64 {
        self.component.id
    }

    pub fn category(&self) -> CategorySlug {
        self.component.category
    }

    pub fn price(&self) -> Decimal {
        self.component.price
    }
}
