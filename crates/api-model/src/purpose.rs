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
use thiserror::Error;

use crate::category::CategorySlug;

/// What the generated machine is for. The purpose drives both the category
/// selection order and how the budget is split across categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    Gaming,
    Workstation,
    Streaming,
    Basic,
}

#[derive(Debug, Error)]
#[error("unknown build purpose: {0}")]
pub struct UnknownPurpose(pub String);

impl Display for Purpose {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let string = match self {
            Purpose::Gaming => "gaming",
            Purpose::Workstation => "workstation",
            Purpose::Streaming => "streaming",
            Purpose::Basic => "basic",
        };
        write!(f, "{string}")
    }
}

impl FromStr for Purpose {
    type Err = UnknownPurpose;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gaming" => Ok(Purpose::Gaming),
            "workstation" => Ok(Purpose::Workstation),
            "streaming" => Ok(Purpose::Streaming),
            "basic" => Ok(Purpose::Basic),
            other => Err(UnknownPurpose(other.to_string())),
        }
    }
}

/// Coarse tier a CPU pick lands in within its affordable candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankBucket {
    Entry,
    Mid,
    MidHigh,
    High,
}

/// Per-purpose selection policy: category order, budget fractions, RAM
/// target, CPU tier and whether a discrete GPU belongs in the build.
/// Allocation fractions sum to less than one; the remainder is a shared pool
/// that soft-caps every category without an explicit fraction.
#[derive(Debug, Clone, Copy)]
pub struct PurposeProfile {
    pub purpose: Purpose,
    pub ram_target_gb: i32,
    pub cpu_rank: RankBucket,
    pub prefer_gpu: bool,
    pub order: &'static [CategorySlug],
    allocations: &'static [(CategorySlug, f64)],
}

const GAMING_ORDER: [CategorySlug; 8] = [
    CategorySlug::Cpu,
    CategorySlug::Motherboard,
    CategorySlug::Memory,
    CategorySlug::Gpu,
    CategorySlug::Storage,
    CategorySlug::Psu,
    CategorySlug::Case,
    CategorySlug::CpuCooler,
];

const WORKSTATION_ORDER: [CategorySlug; 8] = [
    CategorySlug::Cpu,
    CategorySlug::Motherboard,
    CategorySlug::Memory,
    CategorySlug::Storage,
    CategorySlug::Gpu,
    CategorySlug::Psu,
    CategorySlug::Case,
    CategorySlug::CpuCooler,
];

const BASIC_ORDER: [CategorySlug; 7] = [
    CategorySlug::Cpu,
    CategorySlug::Motherboard,
    CategorySlug::Memory,
    CategorySlug::Storage,
    CategorySlug::Psu,
    CategorySlug::Case,
    CategorySlug::CpuCooler,
];

static GAMING: PurposeProfile = PurposeProfile {
    purpose: Purpose::Gaming,
    ram_target_gb: 16,
    cpu_rank: RankBucket::MidHigh,
    prefer_gpu: true,
    order: &GAMING_ORDER,
    allocations: &[
        (CategorySlug::Cpu, 0.20),
        (CategorySlug::Motherboard, 0.12),
        (CategorySlug::Memory, 0.08),
        (CategorySlug::Gpu, 0.35),
        (CategorySlug::Storage, 0.08),
        (CategorySlug::Psu, 0.06),
        (CategorySlug::Case, 0.05),
    ],
};

static WORKSTATION: PurposeProfile = PurposeProfile {
    purpose: Purpose::Workstation,
    ram_target_gb: 64,
    cpu_rank: RankBucket::High,
    prefer_gpu: true,
    order: &WORKSTATION_ORDER,
    allocations: &[
        (CategorySlug::Cpu, 0.30),
        (CategorySlug::Motherboard, 0.12),
        (CategorySlug::Memory, 0.15),
        (CategorySlug::Storage, 0.10),
        (CategorySlug::Gpu, 0.18),
        (CategorySlug::Psu, 0.06),
        (CategorySlug::Case, 0.04),
    ],
};

static STREAMING: PurposeProfile = PurposeProfile {
    purpose: Purpose::Streaming,
    ram_target_gb: 32,
    cpu_rank: RankBucket::High,
    prefer_gpu: true,
    order: &GAMING_ORDER,
    allocations: &[
        (CategorySlug::Cpu, 0.25),
        (CategorySlug::Motherboard, 0.12),
        (CategorySlug::Memory, 0.10),
        (CategorySlug::Gpu, 0.30),
        (CategorySlug::Storage, 0.08),
        (CategorySlug::Psu, 0.06),
        (CategorySlug::Case, 0.04),
    ],
};

static BASIC: PurposeProfile = PurposeProfile {
    purpose: Purpose::Basic,
    ram_target_gb: 16,
    cpu_rank: RankBucket::Entry,
    prefer_gpu: false,
    order: &BASIC_ORDER,
    allocations: &[
        (CategorySlug::Cpu, 0.28),
        (CategorySlug::Motherboard, 0.18),
        (CategorySlug::Memory, 0.14),
        (CategorySlug::Storage, 0.14),
        (CategorySlug::Psu, 0.10),
        (CategorySlug::Case, 0.08),
    ],
};

impl PurposeProfile {
    pub fn for_purpose(purpose: Purpose) -> &'static PurposeProfile {
        match purpose {
            Purpose::Gaming => &GAMING,
            Purpose::Workstation => &WORKSTATION,
            Purpose::Streaming => &STREAMING,
            Purpose::Basic => &BASIC,
        }
    }

    /// Budget fraction granted to a category, if the profile names one.
    pub fn allocation(&self, category: CategorySlug) -> Option<f64> {
        self.allocations
            .iter()
            .find(|(slug, _)| *slug == category)
            .map(|(_, fraction)| *fraction)
    }

    /// Share of the budget left over after the explicit allocations; used as
    /// a soft ceiling for every category without one.
    pub fn pool_fraction(&self) -> f64 {
        let allocated: f64 = self.allocations.iter().map(|(_, fraction)| fraction).sum();
        (1.0 - allocated).max(0.0)
    }
}
