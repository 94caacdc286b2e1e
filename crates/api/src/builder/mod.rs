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

//! The auto-builder: generates a complete, compatible selection from a
//! purpose profile and an optional budget, category by category in the
//! profile's order.

pub mod picker;

use std::collections::BTreeMap;

use model::build::{ExpandedBuild, ExpandedPart, Selection};
use model::category::CategorySlug;
use model::component::CatalogComponent;
use model::purpose::{Purpose, PurposeProfile};
use model::specs::{Specs, norm_opt, norm_set};
use model::tuning::{
    BUILD_DEADLINE, FETCH_TIME_FLOOR, GPU_MIN_BUDGET_FRACTION, POOL_CEILING_FLOOR,
    WORKSTATION_RAM_THRESHOLD_GB,
};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use sqlx::PgConnection;
use tokio::time::Instant;

use crate::catalog::CatalogService;
use crate::errors::ApiResult;

#[derive(Debug, Clone)]
pub struct AutoBuildRequest {
    pub purpose: Purpose,
    pub budget: Option<Decimal>,
    /// A CPU the generated build must keep when it stays compatible and
    /// affordable; used by auto-complete.
    pub respect_cpu: Option<i64>,
    /// Parts already chosen by the user. Their categories are not generated
    /// and their specs constrain everything else.
    pub preset: Selection,
}

impl AutoBuildRequest {
    pub fn from_purpose(purpose: Purpose, budget: Option<Decimal>) -> Self {
        AutoBuildRequest {
            purpose,
            budget,
            respect_cpu: None,
            preset: Selection::new(),
        }
    }
}

/// Infers a purpose for auto-complete from what the partial build already
/// says about itself.
pub fn infer_purpose(expanded: &ExpandedBuild) -> Purpose {
    let ram_gb = expanded
        .get(CategorySlug::Memory)
        .and_then(|part| part.specs.as_ref())
        .and_then(Specs::as_memory)
        .and_then(|memory| memory.capacity_gb)
        .unwrap_or(0);
    if ram_gb >= WORKSTATION_RAM_THRESHOLD_GB {
        Purpose::Workstation
    } else {
        Purpose::Gaming
    }
}

fn decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// The per-category spending ceiling: the profile's fraction of the budget,
/// or the shared pool (floored) for categories without one. Gaming and
/// streaming builds never starve the GPU below its minimum share.
fn ceiling_for(
    profile: &PurposeProfile,
    category: CategorySlug,
    budget: Option<Decimal>,
    remaining: Decimal,
) -> Option<Decimal> {
    let budget = budget?;
    let mut ceiling = match profile.allocation(category) {
        Some(fraction) => budget * decimal(fraction),
        None => {
            let pool = (budget * decimal(profile.pool_fraction())).min(remaining.max(Decimal::ZERO));
            pool.max(decimal(POOL_CEILING_FLOOR))
        }
    };
    if category == CategorySlug::Gpu
        && matches!(profile.purpose, Purpose::Gaming | Purpose::Streaming)
    {
        ceiling = ceiling.max(budget * decimal(GPU_MIN_BUDGET_FRACTION));
    }
    Some(ceiling)
}

fn socket_of(expanded: &ExpandedBuild, category: CategorySlug) -> Option<String> {
    let specs = expanded.get(category)?.specs.as_ref()?;
    match specs {
        Specs::Cpu(cpu) => norm_opt(cpu.socket.as_deref()),
        Specs::Motherboard(board) => norm_opt(board.socket.as_deref()),
        _ => None,
    }
}

/// The strict constraints of the selection pipeline. These are narrower than
/// the compatibility rules: where the engine lets unknown data through, the
/// builder refuses to gamble on parts that do not declare the field the
/// chosen build already pins down.
fn passes_hard_constraints(
    category: CategorySlug,
    candidate: &CatalogComponent,
    expanded: &ExpandedBuild,
) -> bool {
    match category {
        CategorySlug::Motherboard => {
            let Some(cpu_socket) = socket_of(expanded, CategorySlug::Cpu) else {
                return true;
            };
            candidate
                .specs
                .as_ref()
                .and_then(Specs::as_motherboard)
                .and_then(|board| norm_opt(board.socket.as_deref()))
                .is_some_and(|socket| socket == cpu_socket)
        }
        CategorySlug::Memory => {
            let board_type = expanded
                .get(CategorySlug::Motherboard)
                .and_then(|part| part.specs.as_ref())
                .and_then(Specs::as_motherboard)
                .and_then(|board| norm_opt(board.memory_type.as_deref()));
            let Some(board_type) = board_type else {
                return true;
            };
            candidate
                .specs
                .as_ref()
                .and_then(Specs::as_memory)
                .and_then(|memory| norm_opt(memory.memory_type.as_deref()))
                .is_some_and(|memory_type| memory_type == board_type)
        }
        CategorySlug::CpuCooler => {
            let Some(cpu_socket) = socket_of(expanded, CategorySlug::Cpu) else {
                return true;
            };
            let sockets = norm_set(
                candidate
                    .specs
                    .as_ref()
                    .and_then(Specs::as_cpu_cooler)
                    .and_then(|cooler| cooler.compatible_sockets.as_deref()),
            );
            sockets.is_empty() || sockets.contains(&cpu_socket)
        }
        _ => true,
    }
}

fn tdp_of(expanded: &ExpandedBuild, category: CategorySlug) -> i32 {
    expanded
        .get(category)
        .and_then(|part| part.specs.as_ref())
        .and_then(Specs::tdp)
        .unwrap_or(0)
}

/// Generates component ids for every category of the profile that the preset
/// does not already fill. Missing categories map to `None`. The run holds one
/// wall-clock deadline; a category that fails or times out is skipped and the
/// rest of the build still completes.
pub async fn generate(
    catalog: &CatalogService,
    txn: &mut PgConnection,
    request: &AutoBuildRequest,
) -> ApiResult<BTreeMap<CategorySlug, Option<i64>>> {
    let profile = PurposeProfile::for_purpose(request.purpose);
    let deadline = Instant::now() + BUILD_DEADLINE;

    let mut expanded =
        crate::workspace::expand(catalog, txn, &request.preset, crate::workspace::ExpandMode::Strict)
            .await?;
    let mut remaining = request.budget.unwrap_or(Decimal::ZERO);
    let mut chosen: BTreeMap<CategorySlug, Option<i64>> = BTreeMap::new();

    for &category in profile.order {
        if request.preset.contains_key(&category) {
            continue;
        }
        chosen.insert(category, None);

        if Instant::now() >= deadline {
            tracing::warn!(%category, "auto-build deadline reached, returning partial build");
            break;
        }

        let time_left = deadline
            .saturating_duration_since(Instant::now())
            .max(FETCH_TIME_FLOOR);
        let candidates =
            match tokio::time::timeout(time_left, catalog.list_by_category(txn, category)).await {
                Ok(Ok(candidates)) => candidates,
                Ok(Err(error)) => {
                    tracing::warn!(%category, %error, "auto-build: catalog fetch failed, skipping category");
                    continue;
                }
                Err(_) => {
                    tracing::warn!(%category, "auto-build: catalog fetch timed out, skipping category");
                    continue;
                }
            };

        let pool: Vec<&CatalogComponent> = candidates
            .iter()
            .filter(|candidate| candidate.component.is_visible())
            .filter(|candidate| passes_hard_constraints(category, candidate, &expanded))
            .filter(|candidate| compat::is_compatible(&expanded, candidate).is_ok())
            .collect();

        let ceiling = ceiling_for(profile, category, request.budget, remaining);
        let pick = pick_for_category(category, &pool, profile, &expanded, ceiling, request);

        let Some(pick) = pick else {
            tracing::warn!(%category, "auto-build: no viable candidate, skipping category");
            continue;
        };

        chosen.insert(category, Some(pick.id()));
        remaining = (remaining - pick.price()).max(Decimal::ZERO);
        tracing::debug!(%category, component = pick.id(), %remaining, "auto-build: committed");
        expanded.insert(category, ExpandedPart::from(pick.clone()));
    }

    Ok(chosen)
}

fn pick_for_category<'a>(
    category: CategorySlug,
    pool: &[&'a CatalogComponent],
    profile: &PurposeProfile,
    expanded: &ExpandedBuild,
    ceiling: Option<Decimal>,
    request: &AutoBuildRequest,
) -> Option<&'a CatalogComponent> {
    match category {
        CategorySlug::Cpu => {
            // A respected CPU short-circuits the rank selection whenever it
            // survived the filters and the budget.
            if let Some(respected) = request.respect_cpu {
                let keep = pool.iter().copied().find(|candidate| {
                    candidate.id() == respected && picker::affordable(candidate, ceiling)
                });
                if keep.is_some() {
                    return keep;
                }
            }
            picker::pick_cpu(pool, profile.cpu_rank, ceiling)
        }
        CategorySlug::Gpu => {
            if !profile.prefer_gpu {
                return None;
            }
            picker::pick_gpu(pool, ceiling)
        }
        CategorySlug::Memory => picker::pick_memory(pool, profile.ram_target_gb, ceiling),
        CategorySlug::Storage => picker::pick_storage(pool, ceiling),
        CategorySlug::Psu => {
            let required = picker::required_psu_wattage(
                tdp_of(expanded, CategorySlug::Cpu),
                tdp_of(expanded, CategorySlug::Gpu),
            );
            picker::pick_psu(pool, required, ceiling)
        }
        // Motherboard, case and cooler all take the price-ordered median of
        // whatever survived the filters.
        CategorySlug::Motherboard | CategorySlug::Case | CategorySlug::CpuCooler => {
            let within: Vec<&CatalogComponent> = pool
                .iter()
                .copied()
                .filter(|candidate| picker::affordable(candidate, ceiling))
                .collect();
            picker::median(&within)
        }
    }
}
