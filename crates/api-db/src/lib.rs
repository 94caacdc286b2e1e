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

pub mod cart;
pub mod category;
pub mod component;
mod error;
pub mod migrations;
pub mod order;
mod pool;
pub mod saved_build;
pub mod specs;
pub mod temp_build;

pub use error::{DatabaseError, DatabaseResult};
pub use pool::{KEEPALIVE_INTERVAL, connect, spawn_keepalive};
