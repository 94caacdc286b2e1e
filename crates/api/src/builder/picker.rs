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

//! Category-specific scoring and selection. Everything here is pure over
//! candidate slices; the orchestrator owns fetching, filtering and budgets.

use model::component::CatalogComponent;
use model::purpose::RankBucket;
use model::specs::Specs;
use model::tuning::{
    CPU_MIDDLE_SHARE, CPU_TOP_SHARE, PSU_HEADROOM_PICK, PSU_MIN_WATTAGE, STORAGE_NVME_BONUS,
};
use rust_decimal::Decimal;

pub fn affordable(candidate: &CatalogComponent, ceiling: Option<Decimal>) -> bool {
    ceiling.is_none_or(|max| candidate.price() <= max)
}

/// The element a price-ordered pool's median pick lands on.
pub fn median<'a>(pool: &[&'a CatalogComponent]) -> Option<&'a CatalogComponent> {
    if pool.is_empty() {
        None
    } else {
        Some(pool[pool.len() / 2])
    }
}

pub fn cpu_score(candidate: &CatalogComponent) -> f64 {
    let Some(cpu) = candidate.specs.as_ref().and_then(Specs::as_cpu) else {
        return 0.0;
    };
    if let Some(score) = cpu.performance_score {
        return score;
    }
    f64::from(cpu.cores.unwrap_or(0)) * 100.0
        + cpu.base_clock.unwrap_or(0.0) * 30.0
        + f64::from(cpu.threads.unwrap_or(0)) * 10.0
}

/// Partitions the affordable candidates into score terciles and picks by
/// rank bucket: `high` takes the median of the top, `mid-high` the worst of
/// the top, `mid` the median of the middle, `entry` the median of the
/// bottom.
pub fn pick_cpu<'a>(
    candidates: &[&'a CatalogComponent],
    rank: RankBucket,
    ceiling: Option<Decimal>,
) -> Option<&'a CatalogComponent> {
    let mut pool: Vec<&CatalogComponent> = candidates
        .iter()
        .copied()
        .filter(|candidate| affordable(candidate, ceiling))
        .collect();
    if pool.is_empty() {
        return None;
    }
    pool.sort_by(|a, b| cpu_score(b).total_cmp(&cpu_score(a)));

    let n = pool.len();
    let top_len = ((n as f64 * CPU_TOP_SHARE).ceil() as usize).clamp(1, n);
    let middle_len = ((n as f64 * CPU_MIDDLE_SHARE).ceil() as usize).min(n - top_len);
    let (top, rest) = pool.split_at(top_len);
    let (middle, bottom) = rest.split_at(middle_len);

    match rank {
        RankBucket::High => top.get(top.len() / 2).copied(),
        RankBucket::MidHigh => top.last().copied().or_else(|| middle.first().copied()),
        RankBucket::Mid => median(middle).or_else(|| median(&pool)),
        RankBucket::Entry => median(bottom).or_else(|| pool.last().copied()),
    }
}

pub fn memory_score(candidate: &CatalogComponent) -> f64 {
    let Some(memory) = candidate.specs.as_ref().and_then(Specs::as_memory) else {
        return 0.0;
    };
    f64::from(memory.capacity_gb.unwrap_or(0)) * 100.0
        + f64::from(memory.speed_mhz.unwrap_or(0)) / 10.0
}

fn memory_capacity(candidate: &CatalogComponent) -> i32 {
    candidate
        .specs
        .as_ref()
        .and_then(Specs::as_memory)
        .and_then(|memory| memory.capacity_gb)
        .unwrap_or(0)
}

/// Prefers kits meeting the profile's capacity target: the affordable median
/// of that subset, else the top-scored kit meeting the target, else the best
/// affordable kit.
pub fn pick_memory<'a>(
    candidates: &[&'a CatalogComponent],
    ram_target_gb: i32,
    ceiling: Option<Decimal>,
) -> Option<&'a CatalogComponent> {
    let mut scored: Vec<&CatalogComponent> = candidates.to_vec();
    scored.sort_by(|a, b| memory_score(b).total_cmp(&memory_score(a)));

    let meeting: Vec<&CatalogComponent> = scored
        .iter()
        .copied()
        .filter(|candidate| memory_capacity(candidate) >= ram_target_gb)
        .collect();
    let affordable_meeting: Vec<&CatalogComponent> = meeting
        .iter()
        .copied()
        .filter(|candidate| affordable(candidate, ceiling))
        .collect();

    if let Some(pick) = median(&affordable_meeting) {
        return Some(pick);
    }
    if let Some(pick) = meeting.first() {
        return Some(pick);
    }
    scored
        .into_iter()
        .find(|candidate| affordable(candidate, ceiling))
}

pub fn gpu_score(candidate: &CatalogComponent) -> f64 {
    let Some(gpu) = candidate.specs.as_ref().and_then(Specs::as_gpu) else {
        // No specs at all: price is the only signal left.
        return decimal_to_f64(candidate.price());
    };
    if let Some(score) = gpu.performance_score {
        return score;
    }
    match gpu.tdp {
        Some(tdp) => f64::from(tdp) * 10.0,
        None => decimal_to_f64(candidate.price()),
    }
}

/// Highest-scored GPU within the ceiling.
pub fn pick_gpu<'a>(
    candidates: &[&'a CatalogComponent],
    ceiling: Option<Decimal>,
) -> Option<&'a CatalogComponent> {
    candidates
        .iter()
        .copied()
        .filter(|candidate| affordable(candidate, ceiling))
        .max_by(|a, b| gpu_score(a).total_cmp(&gpu_score(b)))
}

fn is_nvme(candidate: &CatalogComponent) -> bool {
    let Some(storage) = candidate.specs.as_ref().and_then(Specs::as_storage) else {
        return false;
    };
    let nvme_token = |value: &Option<String>| {
        value.as_deref().is_some_and(|value| {
            let value = value.to_ascii_lowercase();
            value.contains("nvme") || value.contains("m.2") || value.contains("m2")
        })
    };
    nvme_token(&storage.interface) || nvme_token(&storage.form_factor)
}

/// NVMe drives dominate the score, so they win whenever any exist.
pub fn storage_score(candidate: &CatalogComponent) -> f64 {
    let capacity = candidate
        .specs
        .as_ref()
        .and_then(Specs::as_storage)
        .and_then(|storage| storage.capacity_gb)
        .unwrap_or(0);
    let bonus = if is_nvme(candidate) {
        STORAGE_NVME_BONUS
    } else {
        0.0
    };
    bonus + f64::from(capacity)
}

pub fn pick_storage<'a>(
    candidates: &[&'a CatalogComponent],
    ceiling: Option<Decimal>,
) -> Option<&'a CatalogComponent> {
    candidates
        .iter()
        .copied()
        .filter(|candidate| affordable(candidate, ceiling))
        .max_by(|a, b| storage_score(a).total_cmp(&storage_score(b)))
}

/// PSU wattage the auto-builder sizes for: combined draw with headroom,
/// floored at the smallest sensible unit.
pub fn required_psu_wattage(cpu_tdp: i32, gpu_tdp: i32) -> i32 {
    let sized = (f64::from(cpu_tdp + gpu_tdp) * PSU_HEADROOM_PICK).ceil() as i32;
    sized.max(PSU_MIN_WATTAGE)
}

fn psu_wattage(candidate: &CatalogComponent) -> i32 {
    candidate
        .specs
        .as_ref()
        .and_then(Specs::as_psu)
        .and_then(|psu| psu.wattage)
        .unwrap_or(0)
}

/// Units meeting the requirement first (cheapest of those); if none meets,
/// the biggest available.
pub fn pick_psu<'a>(
    candidates: &[&'a CatalogComponent],
    required_watts: i32,
    ceiling: Option<Decimal>,
) -> Option<&'a CatalogComponent> {
    let mut pool: Vec<&CatalogComponent> = candidates
        .iter()
        .copied()
        .filter(|candidate| affordable(candidate, ceiling))
        .collect();
    if pool.is_empty() {
        pool = candidates.to_vec();
    }
    pool.sort_by(|a, b| {
        let (wattage_a, wattage_b) = (psu_wattage(a), psu_wattage(b));
        let (meets_a, meets_b) = (wattage_a >= required_watts, wattage_b >= required_watts);
        match (meets_a, meets_b) {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            (true, true) => a.price().cmp(&b.price()),
            (false, false) => wattage_b.cmp(&wattage_a),
        }
    });
    pool.first().copied()
}

fn decimal_to_f64(value: Decimal) -> f64 {
    use rust_decimal::prelude::ToPrimitive;
    value.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use model::category::CategorySlug;
    use model::component::{Component, ComponentStatus};
    use model::specs::{CpuSpecs, MemorySpecs, PsuSpecs, StorageSpecs};
    use rust_decimal_macros::dec;

    use super::*;

    fn candidate(category: CategorySlug, price: Decimal, specs: Specs) -> CatalogComponent {
        CatalogComponent {
            component: Component {
                id: 0,
                category_id: 0,
                category,
                name: "candidate".to_string(),
                brand: None,
                price,
                stock: Some(5),
                status: ComponentStatus::Active,
                low_stock_threshold: None,
                vendor: None,
                image_path: None,
                created_at: Utc::now(),
                updated_at: None,
            },
            image_url: None,
            specs: Some(specs),
        }
    }

    fn cpu(price: Decimal, cores: i32, base_clock: f64, threads: i32) -> CatalogComponent {
        candidate(
            CategorySlug::Cpu,
            price,
            Specs::Cpu(CpuSpecs {
                cores: Some(cores),
                base_clock: Some(base_clock),
                threads: Some(threads),
                ..Default::default()
            }),
        )
    }

    #[test]
    fn cpu_score_falls_back_to_core_formula() {
        let c = cpu(dec!(100), 8, 3.5, 16);
        assert_eq!(cpu_score(&c), 8.0 * 100.0 + 3.5 * 30.0 + 16.0 * 10.0);

        let scored = candidate(
            CategorySlug::Cpu,
            dec!(100),
            Specs::Cpu(CpuSpecs {
                performance_score: Some(4242.0),
                cores: Some(4),
                ..Default::default()
            }),
        );
        assert_eq!(cpu_score(&scored), 4242.0);
    }

    #[test]
    fn cpu_rank_buckets_pick_from_their_tercile() {
        // Ten CPUs, scores descending 10_000, 9_000, … 1_000.
        let cpus: Vec<CatalogComponent> = (0..10)
            .map(|i| cpu(dec!(200), 10 - i, 0.0, 0))
            .collect();
        let refs: Vec<&CatalogComponent> = cpus.iter().collect();

        // top = 3, middle = 4, bottom = 3.
        let high = pick_cpu(&refs, RankBucket::High, None).unwrap();
        assert_eq!(cpu_score(high), cpu_score(&cpus[1]));

        let mid_high = pick_cpu(&refs, RankBucket::MidHigh, None).unwrap();
        assert_eq!(cpu_score(mid_high), cpu_score(&cpus[2]));

        let mid = pick_cpu(&refs, RankBucket::Mid, None).unwrap();
        assert_eq!(cpu_score(mid), cpu_score(&cpus[5]));

        let entry = pick_cpu(&refs, RankBucket::Entry, None).unwrap();
        assert_eq!(cpu_score(entry), cpu_score(&cpus[8]));
    }

    #[test]
    fn cpu_ceiling_excludes_expensive_parts() {
        let cheap = cpu(dec!(150), 4, 3.0, 8);
        let pricey = cpu(dec!(900), 16, 4.0, 32);
        let refs: Vec<&CatalogComponent> = vec![&cheap, &pricey];

        let pick = pick_cpu(&refs, RankBucket::High, Some(dec!(200))).unwrap();
        assert_eq!(pick.price(), dec!(150));
        assert!(pick_cpu(&refs, RankBucket::High, Some(dec!(100))).is_none());
    }

    fn memory(price: Decimal, capacity: i32, speed: i32) -> CatalogComponent {
        candidate(
            CategorySlug::Memory,
            price,
            Specs::Memory(MemorySpecs {
                capacity_gb: Some(capacity),
                speed_mhz: Some(speed),
                ..Default::default()
            }),
        )
    }

    #[test]
    fn memory_prefers_target_capacity() {
        let small = memory(dec!(40), 8, 3200);
        let right = memory(dec!(90), 32, 5600);
        let big = memory(dec!(450), 64, 6000);
        let refs: Vec<&CatalogComponent> = vec![&small, &right, &big];

        // Affordable kit meeting the 32 GB target wins.
        let pick = pick_memory(&refs, 32, Some(dec!(120))).unwrap();
        assert_eq!(memory_capacity(pick), 32);

        // Nothing affordable meets the target: the top-scored kit meeting it
        // is taken anyway.
        let pick = pick_memory(&refs, 64, Some(dec!(120))).unwrap();
        assert_eq!(memory_capacity(pick), 64);

        // Nothing meets the target at all: best affordable kit.
        let pick = pick_memory(&refs, 128, Some(dec!(60))).unwrap();
        assert_eq!(memory_capacity(pick), 8);
    }

    fn psu(price: Decimal, wattage: i32) -> CatalogComponent {
        candidate(
            CategorySlug::Psu,
            price,
            Specs::Psu(PsuSpecs {
                wattage: Some(wattage),
                ..Default::default()
            }),
        )
    }

    #[test]
    fn psu_sizing_applies_headroom_and_floor() {
        assert_eq!(required_psu_wattage(125, 285), 533);
        assert_eq!(required_psu_wattage(65, 0), 350);
    }

    #[test]
    fn psu_pick_prefers_cheapest_sufficient_unit() {
        let small = psu(dec!(40), 450);
        let fit = psu(dec!(70), 650);
        let big = psu(dec!(160), 1000);
        let refs: Vec<&CatalogComponent> = vec![&small, &fit, &big];

        let pick = pick_psu(&refs, 533, None).unwrap();
        assert_eq!(pick.price(), dec!(70));

        // When nothing suffices, the biggest unit is the least bad.
        let pick = pick_psu(&refs, 1200, None).unwrap();
        assert_eq!(pick.price(), dec!(160));
    }

    fn storage(price: Decimal, capacity: i32, interface: &str) -> CatalogComponent {
        candidate(
            CategorySlug::Storage,
            price,
            Specs::Storage(StorageSpecs {
                capacity_gb: Some(capacity),
                interface: Some(interface.to_string()),
                ..Default::default()
            }),
        )
    }

    #[test]
    fn storage_prefers_nvme_over_bigger_sata() {
        let sata = storage(dec!(90), 4000, "SATA");
        let nvme = storage(dec!(100), 1000, "NVMe");
        let refs: Vec<&CatalogComponent> = vec![&sata, &nvme];

        let pick = pick_storage(&refs, None).unwrap();
        assert!(is_nvme(pick));

        // Unless the NVMe drive is out of budget.
        let pick = pick_storage(&refs, Some(dec!(95))).unwrap();
        assert!(!is_nvme(pick));
    }

    #[test]
    fn median_of_price_ordered_pool() {
        let a = psu(dec!(40), 450);
        let b = psu(dec!(70), 650);
        let c = psu(dec!(160), 1000);
        let refs: Vec<&CatalogComponent> = vec![&a, &b, &c];
        assert_eq!(median(&refs).unwrap().price(), dec!(70));
        assert!(median(&[]).is_none());
    }
}
