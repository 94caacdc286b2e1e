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

use std::net::SocketAddr;

use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::Deserialize;

/// Service configuration. `database_url`, `identity_url`,
/// `identity_service_key` and `storage_bucket` have no defaults: startup
/// fails when any is absent from both the config file and the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct RigforgeConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: SocketAddr,

    /// Postgres connection string.
    pub database_url: String,

    /// Base URL of the external identity provider that bearer tokens are
    /// verified against.
    pub identity_url: String,

    /// Service key sent alongside token-verification requests.
    pub identity_service_key: String,

    /// Blob-storage bucket that component images live in.
    pub storage_bucket: String,
}

fn default_listen_address() -> SocketAddr {
    "0.0.0.0:8080".parse().expect("static listen address")
}

impl RigforgeConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, figment::Error> {
        let mut figment = Figment::new();
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed("RIGFORGE_API_")).extract()
    }
}
