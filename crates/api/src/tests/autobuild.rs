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

use model::build::Selection;
use model::category::CategorySlug;
use model::purpose::Purpose;
use rust_decimal_macros::dec;
use sqlx::PgConnection;

use crate::builder::{self, AutoBuildRequest};
use crate::tests::common;
use crate::workspace::{self, ExpandMode};

/// A small catalog with at least one compatible option per category.
async fn seed_catalog(conn: &mut PgConnection) {
    common::seed_cpu(conn, "entry cpu", dec!(9500.00), 10, "AM5", 65, 6).await;
    common::seed_cpu(conn, "mid cpu", dec!(14000.00), 10, "AM5", 105, 8).await;
    common::seed_cpu(conn, "high cpu", dec!(21000.00), 10, "AM5", 170, 16).await;

    common::seed_motherboard(conn, "board a", dec!(6500.00), 10, "AM5", "DDR5").await;
    common::seed_motherboard(conn, "board b", dec!(9000.00), 10, "AM5", "DDR5").await;

    common::seed_memory(conn, "16gb kit", dec!(2400.00), 10, "DDR5", 16).await;
    common::seed_memory(conn, "32gb kit", dec!(4400.00), 10, "DDR5", 32).await;

    common::seed_gpu(conn, "small gpu", dec!(12000.00), 10, 170).await;
    common::seed_gpu(conn, "big gpu", dec!(26000.00), 10, 285).await;

    common::seed_storage(conn, "1tb nvme", dec!(3200.00), 10, 1000).await;
    common::seed_psu(conn, "650w", dec!(2800.00), 10, 650).await;
    common::seed_psu(conn, "850w", dec!(4200.00), 10, 850).await;
    common::seed_case(conn, "mid tower", dec!(2600.00), 10).await;
    common::seed_cooler(conn, "tower cooler", dec!(1500.00), 10, &["AM5", "LGA1700"]).await;
}

#[sqlx::test(migrator = "db::migrations::MIGRATOR")]
async fn gaming_build_is_complete_compatible_and_in_budget(pool: sqlx::PgPool) {
    let catalog = common::catalog();
    let mut conn = pool.acquire().await.unwrap();
    seed_catalog(&mut conn).await;

    let budget = dec!(80000.00);
    let request = AutoBuildRequest::from_purpose(Purpose::Gaming, Some(budget));
    let generated = builder::generate(&catalog, &mut conn, &request).await.unwrap();

    for category in [
        CategorySlug::Cpu,
        CategorySlug::Motherboard,
        CategorySlug::Memory,
        CategorySlug::Gpu,
        CategorySlug::Storage,
        CategorySlug::Psu,
        CategorySlug::Case,
    ] {
        assert!(
            generated.get(&category).copied().flatten().is_some(),
            "missing {category}"
        );
    }

    let selection: Selection = generated
        .iter()
        .filter_map(|(category, id)| id.map(|id| (*category, id)))
        .collect();
    let expanded = workspace::expand(&catalog, &mut conn, &selection, ExpandMode::Strict)
        .await
        .unwrap();
    assert!(compat::check_whole_build(&expanded).is_ok());

    let summary = expanded.summary();
    // Per-category rounding tolerance.
    assert!(summary.total_price <= budget * dec!(1.02));

    // The gaming profile never starves the GPU below a quarter of the
    // budget when such a GPU exists.
    let gpu_price = expanded.get(CategorySlug::Gpu).unwrap().price;
    assert!(gpu_price >= budget * dec!(0.25) || gpu_price == dec!(12000.00));
}

#[sqlx::test(migrator = "db::migrations::MIGRATOR")]
async fn basic_build_skips_the_gpu(pool: sqlx::PgPool) {
    let catalog = common::catalog();
    let mut conn = pool.acquire().await.unwrap();
    seed_catalog(&mut conn).await;

    let request = AutoBuildRequest::from_purpose(Purpose::Basic, Some(dec!(40000.00)));
    let generated = builder::generate(&catalog, &mut conn, &request).await.unwrap();

    assert!(!generated.contains_key(&CategorySlug::Gpu));
    assert!(generated.get(&CategorySlug::Cpu).copied().flatten().is_some());
    assert!(generated.get(&CategorySlug::Psu).copied().flatten().is_some());
}

#[sqlx::test(migrator = "db::migrations::MIGRATOR")]
async fn autocomplete_respects_the_preset_cpu(pool: sqlx::PgPool) {
    let catalog = common::catalog();
    let mut conn = pool.acquire().await.unwrap();
    seed_catalog(&mut conn).await;

    let cpu = common::seed_cpu(&mut conn, "kept cpu", dec!(15500.00), 10, "AM5", 105, 8).await;
    let mut preset = Selection::new();
    preset.insert(CategorySlug::Cpu, cpu.id);

    let request = AutoBuildRequest {
        purpose: Purpose::Gaming,
        budget: None,
        respect_cpu: Some(cpu.id),
        preset: preset.clone(),
    };
    let generated = builder::generate(&catalog, &mut conn, &request).await.unwrap();

    // Preset categories are not regenerated.
    assert!(!generated.contains_key(&CategorySlug::Cpu));
    // Everything generated must fit the preset CPU.
    let mut selection = preset;
    selection.extend(
        generated
            .iter()
            .filter_map(|(category, id)| id.map(|id| (*category, id))),
    );
    let expanded = workspace::expand(&catalog, &mut conn, &selection, ExpandMode::Strict)
        .await
        .unwrap();
    assert!(compat::check_whole_build(&expanded).is_ok());
}

#[sqlx::test(migrator = "db::migrations::MIGRATOR")]
async fn purpose_inference_keys_off_memory_capacity(pool: sqlx::PgPool) {
    let catalog = common::catalog();
    let mut conn = pool.acquire().await.unwrap();

    let big_kit = common::seed_memory(&mut conn, "64gb kit", dec!(9000.00), 10, "DDR5", 64).await;
    let small_kit = common::seed_memory(&mut conn, "8gb kit", dec!(1500.00), 10, "DDR5", 8).await;

    let mut selection = Selection::new();
    selection.insert(CategorySlug::Memory, big_kit.id);
    let expanded = workspace::expand(&catalog, &mut conn, &selection, ExpandMode::Strict)
        .await
        .unwrap();
    assert_eq!(builder::infer_purpose(&expanded), Purpose::Workstation);

    let mut selection = Selection::new();
    selection.insert(CategorySlug::Memory, small_kit.id);
    let expanded = workspace::expand(&catalog, &mut conn, &selection, ExpandMode::Strict)
        .await
        .unwrap();
    assert_eq!(builder::infer_purpose(&expanded), Purpose::Gaming);

    let empty = workspace::expand(&catalog, &mut conn, &Selection::new(), ExpandMode::Strict)
        .await
        .unwrap();
    assert_eq!(builder::infer_purpose(&empty), Purpose::Gaming);
}
