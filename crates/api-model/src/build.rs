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

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::category::CategorySlug;
use crate::component::CatalogComponent;
use crate::specs::Specs;

/// Categories a build must fill before it counts as complete.
pub const REQUIRED_CATEGORIES: [CategorySlug; 5] = [
    CategorySlug::Cpu,
    CategorySlug::Motherboard,
    CategorySlug::Memory,
    CategorySlug::Psu,
    CategorySlug::Case,
];

/// Priority order for choosing a saved build's display image from its parts.
pub const IMAGE_PRIORITY: [CategorySlug; 5] = [
    CategorySlug::Case,
    CategorySlug::Gpu,
    CategorySlug::Cpu,
    CategorySlug::Motherboard,
    CategorySlug::Memory,
];

/// Name shown for a selection entry whose component no longer exists.
pub const MISSING_COMPONENT_NAME: &str = "Missing Component";

/// The category → component id selection of a build, shared by the per-user
/// workspace and saved builds.
pub type Selection = BTreeMap<CategorySlug, i64>;

/// The per-user transient workspace. `source_build_id` marks an edit session
/// of a saved build; it lives beside the selection, never inside it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TempBuild {
    pub user_id: Uuid,
    #[sqlx(json)]
    pub components: Selection,
    pub source_build_id: Option<i64>,
    pub updated_at: DateTime<Utc>,
}

impl TempBuild {
    pub fn empty(user_id: Uuid) -> Self {
        TempBuild {
            user_id,
            components: Selection::new(),
            source_build_id: None,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "build_compatibility")]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BuildCompatibility {
    Ok,
    Incomplete,
    Invalid,
}

impl Display for BuildCompatibility {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let string = match self {
            BuildCompatibility::Ok => "ok",
            BuildCompatibility::Incomplete => "incomplete",
            BuildCompatibility::Invalid => "invalid",
        };
        write!(f, "{string}")
    }
}

/// A named snapshot of a workspace. Deletion flips `is_saved` instead of
/// removing the row so order items keep resolving their build reference.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SavedBuild {
    pub id: i64,
    pub user_id: Uuid,
    pub name: String,
    #[sqlx(json)]
    pub components: Selection,
    pub total_price: Decimal,
    pub power_usage: i32,
    pub compatibility: BuildCompatibility,
    pub image_url: Option<String>,
    pub is_saved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// One slot of an expanded build. Missing components keep a placeholder
/// entry (lenient expansion) so the client can render the hole.
#[derive(Debug, Clone, Serialize)]
pub struct ExpandedPart {
    pub id: Option<i64>,
    pub name: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub specs: Option<Specs>,
}

impl ExpandedPart {
    pub fn missing() -> Self {
        ExpandedPart {
            id: None,
            name: MISSING_COMPONENT_NAME.to_string(),
            price: Decimal::ZERO,
            image_url: None,
            specs: None,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.id.is_none()
    }
}

impl From<CatalogComponent> for ExpandedPart {
    fn from(catalog: CatalogComponent) -> Self {
        ExpandedPart {
            id: Some(catalog.component.id),
            name: catalog.component.name,
            price: catalog.component.price,
            image_url: catalog.image_url,
            specs: catalog.specs,
        }
    }
}

/// A workspace selection expanded into full parts, the shape the
/// compatibility engine evaluates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExpandedBuild {
    #[serde(flatten)]
    pub parts: BTreeMap<CategorySlug, ExpandedPart>,
}

impl ExpandedBuild {
    pub fn get(&self, category: CategorySlug) -> Option<&ExpandedPart> {
        self.parts.get(&category)
    }

    pub fn insert(&mut self, category: CategorySlug, part: ExpandedPart) {
        self.parts.insert(category, part);
    }

    /// Total price and power draw of the expanded parts. Compatibility stays
    /// unknown; the caller runs the engine when it needs a verdict.
    pub fn summary(&self) -> BuildSummary {
        let total_price = self.parts.values().map(|part| part.price).sum();
        let power_usage = self
            .parts
            .values()
            .filter_map(|part| part.specs.as_ref().and_then(Specs::tdp))
            .map(i64::from)
            .sum();
        BuildSummary {
            total_price,
            power_usage,
            compatibility: SummaryState::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryState {
    Unknown,
    Ok,
    Incomplete,
    Invalid,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildSummary {
    pub total_price: Decimal,
    pub power_usage: i64,
    pub compatibility: SummaryState,
}

/// Derives the name for a duplicate of `name` that collides with none of
/// `taken`. A name already carrying a ` (N)` suffix keeps it and chains a new
/// one: duplicating `"X (3)"` yields `"X (3)(1)"`, then `"X (3)(2)"`, while
/// duplicating `"X"` yields `"X (1)"`, `"X (2)"`, …
pub fn duplicate_name<'a, I>(name: &str, taken: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: std::collections::BTreeSet<&str> = taken.into_iter().collect();
    let separator = if ends_with_copy_suffix(name) { "" } else { " " };
    let mut counter = 1u32;
    loop {
        let candidate = format!("{name}{separator}({counter})");
        if !taken.contains(candidate.as_str()) {
            return candidate;
        }
        counter += 1;
    }
}

fn ends_with_copy_suffix(name: &str) -> bool {
    let Some(rest) = name.strip_suffix(')') else {
        return false;
    };
    let Some(open) = rest.rfind('(') else {
        return false;
    };
    let digits = &rest[open + 1..];
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
