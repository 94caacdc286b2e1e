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

//! Seed helpers shared by the service-level tests.

use model::category::CategorySlug;
use model::component::{Component, ComponentDraft, ComponentStatus};
use model::specs::{
    CaseSpecs, CpuCoolerSpecs, CpuSpecs, GpuSpecs, MemorySpecs, MotherboardSpecs, PsuSpecs, Specs,
    StorageSpecs,
};
use rust_decimal::Decimal;
use sqlx::PgConnection;

use crate::catalog::{CatalogService, StorageUrls};

pub fn catalog() -> CatalogService {
    CatalogService::new(StorageUrls::new(
        "https://identity.test.example.com",
        "component-images",
    ))
}

pub async fn seed_component(
    conn: &mut PgConnection,
    slug: CategorySlug,
    name: &str,
    price: Decimal,
    stock: Option<i32>,
    specs: Option<Specs>,
) -> Component {
    let category = db::category::find_by_slug(conn, slug)
        .await
        .unwrap()
        .expect("categories are seeded by migration");
    let component = db::component::create(
        conn,
        category.id,
        &ComponentDraft {
            name: name.to_string(),
            brand: None,
            price,
            stock,
            status: ComponentStatus::Active,
            low_stock_threshold: None,
            vendor: None,
            image_path: None,
        },
    )
    .await
    .unwrap();
    if let Some(specs) = specs {
        db::specs::upsert(conn, component.id, &specs).await.unwrap();
    }
    component
}

pub async fn seed_cpu(
    conn: &mut PgConnection,
    name: &str,
    price: Decimal,
    stock: i32,
    socket: &str,
    tdp: i32,
    cores: i32,
) -> Component {
    seed_component(
        conn,
        CategorySlug::Cpu,
        name,
        price,
        Some(stock),
        Some(Specs::Cpu(CpuSpecs {
            socket: Some(socket.to_string()),
            cores: Some(cores),
            threads: Some(cores * 2),
            base_clock: Some(3.5),
            tdp: Some(tdp),
            ..Default::default()
        })),
    )
    .await
}

pub async fn seed_motherboard(
    conn: &mut PgConnection,
    name: &str,
    price: Decimal,
    stock: i32,
    socket: &str,
    memory_type: &str,
) -> Component {
    seed_component(
        conn,
        CategorySlug::Motherboard,
        name,
        price,
        Some(stock),
        Some(Specs::Motherboard(MotherboardSpecs {
            socket: Some(socket.to_string()),
            form_factor: Some("ATX".to_string()),
            memory_type: Some(memory_type.to_string()),
            max_memory_speed_mhz: Some(6400),
            storage_support: Some(vec!["NVMe".to_string(), "SATA".to_string()]),
            nvme_slots: Some(2),
            sata_ports: Some(4),
            ..Default::default()
        })),
    )
    .await
}

pub async fn seed_memory(
    conn: &mut PgConnection,
    name: &str,
    price: Decimal,
    stock: i32,
    memory_type: &str,
    capacity_gb: i32,
) -> Component {
    seed_component(
        conn,
        CategorySlug::Memory,
        name,
        price,
        Some(stock),
        Some(Specs::Memory(MemorySpecs {
            memory_type: Some(memory_type.to_string()),
            capacity_gb: Some(capacity_gb),
            speed_mhz: Some(5600),
            ..Default::default()
        })),
    )
    .await
}

pub async fn seed_gpu(
    conn: &mut PgConnection,
    name: &str,
    price: Decimal,
    stock: i32,
    tdp: i32,
) -> Component {
    seed_component(
        conn,
        CategorySlug::Gpu,
        name,
        price,
        Some(stock),
        Some(Specs::Gpu(GpuSpecs {
            tdp: Some(tdp),
            length_mm: Some(280),
            ..Default::default()
        })),
    )
    .await
}

pub async fn seed_psu(
    conn: &mut PgConnection,
    name: &str,
    price: Decimal,
    stock: i32,
    wattage: i32,
) -> Component {
    seed_component(
        conn,
        CategorySlug::Psu,
        name,
        price,
        Some(stock),
        Some(Specs::Psu(PsuSpecs {
            wattage: Some(wattage),
            ..Default::default()
        })),
    )
    .await
}

pub async fn seed_case(
    conn: &mut PgConnection,
    name: &str,
    price: Decimal,
    stock: i32,
) -> Component {
    seed_component(
        conn,
        CategorySlug::Case,
        name,
        price,
        Some(stock),
        Some(Specs::Case(CaseSpecs {
            form_factor: Some("ATX".to_string()),
            form_factor_support: Some(vec!["ATX".to_string(), "Micro-ATX".to_string()]),
            max_gpu_length_mm: Some(360),
            max_cpu_cooler_height_mm: Some(170),
            ..Default::default()
        })),
    )
    .await
}

pub async fn seed_storage(
    conn: &mut PgConnection,
    name: &str,
    price: Decimal,
    stock: i32,
    capacity_gb: i32,
) -> Component {
    seed_component(
        conn,
        CategorySlug::Storage,
        name,
        price,
        Some(stock),
        Some(Specs::Storage(StorageSpecs {
            capacity_gb: Some(capacity_gb),
            storage_type: Some("SSD".to_string()),
            interface: Some("NVMe".to_string()),
            ..Default::default()
        })),
    )
    .await
}

pub async fn seed_cooler(
    conn: &mut PgConnection,
    name: &str,
    price: Decimal,
    stock: i32,
    sockets: &[&str],
) -> Component {
    seed_component(
        conn,
        CategorySlug::CpuCooler,
        name,
        price,
        Some(stock),
        Some(Specs::CpuCooler(CpuCoolerSpecs {
            height_mm: Some(158),
            compatible_sockets: Some(sockets.iter().map(|s| s.to_string()).collect()),
            ..Default::default()
        })),
    )
    .await
}

pub async fn stock_of(conn: &mut PgConnection, component_id: i64) -> Option<i32> {
    db::component::find_by_id(conn, component_id)
        .await
        .unwrap()
        .expect("component exists")
        .stock
}
