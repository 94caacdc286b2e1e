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
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::{Database, Postgres};
use thiserror::Error;

/// The machine slug of a component category. Categories are seeded once and
/// immutable during operation; the slug selects which specs table applies to
/// a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySlug {
    Cpu,
    CpuCooler,
    Motherboard,
    Gpu,
    Memory,
    Storage,
    Psu,
    Case,
}

/// All category slugs, in the order the catalog presents them.
pub const ALL_CATEGORIES: [CategorySlug; 8] = [
    CategorySlug::Cpu,
    CategorySlug::CpuCooler,
    CategorySlug::Motherboard,
    CategorySlug::Gpu,
    CategorySlug::Memory,
    CategorySlug::Storage,
    CategorySlug::Psu,
    CategorySlug::Case,
];

#[derive(Debug, Error)]
#[error("unknown component category: {0}")]
pub struct UnknownCategory(pub String);

impl CategorySlug {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategorySlug::Cpu => "cpu",
            CategorySlug::CpuCooler => "cpu_cooler",
            CategorySlug::Motherboard => "motherboard",
            CategorySlug::Gpu => "gpu",
            CategorySlug::Memory => "memory",
            CategorySlug::Storage => "storage",
            CategorySlug::Psu => "psu",
            CategorySlug::Case => "case",
        }
    }
}

impl Display for CategorySlug {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategorySlug {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cpu" => Ok(CategorySlug::Cpu),
            "cpu_cooler" => Ok(CategorySlug::CpuCooler),
            "motherboard" => Ok(CategorySlug::Motherboard),
            "gpu" => Ok(CategorySlug::Gpu),
            "memory" => Ok(CategorySlug::Memory),
            "storage" => Ok(CategorySlug::Storage),
            "psu" => Ok(CategorySlug::Psu),
            "case" => Ok(CategorySlug::Case),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

// Make CategorySlug bindable directly into a sqlx query. Slugs are stored as
// plain varchar since the categories table owns the vocabulary.
impl sqlx::Encode<'_, Postgres> for CategorySlug {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'_>,
    ) -> Result<IsNull, BoxDynError> {
        buf.extend(self.as_str().as_bytes());
        Ok(IsNull::No)
    }
}

impl<'r, DB> sqlx::Decode<'r, DB> for CategorySlug
where
    DB: Database,
    String: sqlx::Decode<'r, DB>,
{
    fn decode(value: <DB as Database>::ValueRef<'r>) -> Result<Self, BoxDynError> {
        let slug: String = String::decode(value)?;
        Ok(CategorySlug::from_str(&slug).map_err(|e| sqlx::Error::Decode(Box::new(e)))?)
    }
}

impl<DB> sqlx::Type<DB> for CategorySlug
where
    DB: Database,
    String: sqlx::Type<DB>,
{
    fn type_info() -> <DB as Database>::TypeInfo {
        String::type_info()
    }

    fn compatible(ty: &DB::TypeInfo) -> bool {
        String::compatible(ty)
    }
}

/// A component category row. Seeded at install time.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub slug: CategorySlug,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_round_trip() {
        for slug in ALL_CATEGORIES {
            assert_eq!(slug.as_str().parse::<CategorySlug>().unwrap(), slug);
        }
    }

    #[test]
    fn unknown_slug_is_rejected() {
        assert!("keyboard".parse::<CategorySlug>().is_err());
        assert!("CPU".parse::<CategorySlug>().is_err());
    }
}
