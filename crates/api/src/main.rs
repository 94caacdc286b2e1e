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

use clap::CommandFactory;
use rigforge::{Command, Options, RigforgeConfig};
use sqlx::PgPool;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let config = Options::load();
    if config.version {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    let debug = config.debug;

    let sub_cmd = match &config.sub_cmd {
        None => {
            return Ok(Options::command().print_long_help()?);
        }
        Some(s) => s,
    };
    match sub_cmd {
        Command::Migrate(m) => {
            rigforge::logging::init(debug);
            tracing::info!("Running migrations");
            let pool = PgPool::connect(&m.datastore).await?;
            db::migrations::migrate(&pool).await?;
        }
        Command::Run(daemon) => {
            // THIS SECTION HAS BEEN INTENTIONALLY KEPT SMALL.
            // Nothing should go before the call to rigforge::run that isn't
            // already here.
            rigforge::logging::init(debug);
            let config = RigforgeConfig::load(daemon.config_path.as_deref())?;
            rigforge::run(config).await?;
        }
    }
    Ok(())
}
