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

//! Tuning constants for compatibility checking and auto-building. These are
//! parameters of the design, kept in one place so they can be adjusted
//! without hunting through the engines.

use std::time::Duration;

/// Headroom factor the compatibility engine demands of a PSU over the
/// combined CPU + GPU draw.
pub const PSU_HEADROOM_CHECK: f64 = 1.25;

/// Headroom factor the auto-builder sizes a PSU with. Deliberately above the
/// check factor so generated builds never sit at the compatibility boundary.
pub const PSU_HEADROOM_PICK: f64 = 1.3;

/// Smallest PSU the auto-builder will consider, in watts.
pub const PSU_MIN_WATTAGE: i32 = 350;

/// Minimum share of the total budget granted to the GPU for the gaming and
/// streaming profiles.
pub const GPU_MIN_BUDGET_FRACTION: f64 = 0.25;

/// Soft ceiling applied to categories without an explicit allocation when
/// the shared pool is smaller than this.
pub const POOL_CEILING_FLOOR: f64 = 500.0;

/// Wall-clock budget for one auto-build run. The builder returns whatever it
/// has chosen when the deadline passes.
pub const BUILD_DEADLINE: Duration = Duration::from_secs(10);

/// Lower bound on the time granted to any single catalog fetch inside an
/// auto-build run, regardless of how little of the deadline remains.
pub const FETCH_TIME_FLOOR: Duration = Duration::from_millis(200);

/// CPU candidates are partitioned by score into top / middle / bottom
/// terciles of these relative sizes before a rank bucket picks among them.
pub const CPU_TOP_SHARE: f64 = 0.3;
pub const CPU_MIDDLE_SHARE: f64 = 0.4;

/// Memory capacity at or above which a partial build is assumed to be a
/// workstation when inferring a purpose for auto-complete.
pub const WORKSTATION_RAM_THRESHOLD_GB: i32 = 32;

/// Bonus applied to NVMe drives when scoring storage candidates.
pub const STORAGE_NVME_BONUS: f64 = 10_000.0;
