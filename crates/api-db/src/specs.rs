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

//! Per-category specs storage. The component's category slug dispatches to
//! the one table that can hold its specs, so a lookup is a single query and
//! the result type is known at the call site.

use model::category::CategorySlug;
use model::specs::Specs;
use sqlx::PgConnection;

use crate::DatabaseError;

fn table(category: CategorySlug) -> &'static str {
    match category {
        CategorySlug::Cpu => "cpu_specs",
        CategorySlug::CpuCooler => "cpu_cooler_specs",
        CategorySlug::Motherboard => "motherboard_specs",
        CategorySlug::Gpu => "gpu_specs",
        CategorySlug::Memory => "memory_specs",
        CategorySlug::Storage => "storage_specs",
        CategorySlug::Psu => "psu_specs",
        CategorySlug::Case => "case_specs",
    }
}

/// Fetches a component's specs from the table its category dispatches to.
/// The identity columns (`component_id`, `created_at`) never reach the
/// returned record.
pub async fn find(
    txn: &mut PgConnection,
    category: CategorySlug,
    component_id: i64,
) -> Result<Option<Specs>, DatabaseError> {
    let query = format!(
        "SELECT * FROM {} WHERE component_id = $1",
        table(category)
    );
    let specs = match category {
        CategorySlug::Cpu => sqlx::query_as(&query)
            .bind(component_id)
            .fetch_optional(txn)
            .await
            .map_err(|e| DatabaseError::query(&query, e))?
            .map(Specs::Cpu),
        CategorySlug::CpuCooler => sqlx::query_as(&query)
            .bind(component_id)
            .fetch_optional(txn)
            .await
            .map_err(|e| DatabaseError::query(&query, e))?
            .map(Specs::CpuCooler),
        CategorySlug::Motherboard => sqlx::query_as(&query)
            .bind(component_id)
            .fetch_optional(txn)
            .await
            .map_err(|e| DatabaseError::query(&query, e))?
            .map(Specs::Motherboard),
        CategorySlug::Gpu => sqlx::query_as(&query)
            .bind(component_id)
            .fetch_optional(txn)
            .await
            .map_err(|e| DatabaseError::query(&query, e))?
            .map(Specs::Gpu),
        CategorySlug::Memory => sqlx::query_as(&query)
            .bind(component_id)
            .fetch_optional(txn)
            .await
            .map_err(|e| DatabaseError::query(&query, e))?
            .map(Specs::Memory),
        CategorySlug::Storage => sqlx::query_as(&query)
            .bind(component_id)
            .fetch_optional(txn)
            .await
            .map_err(|e| DatabaseError::query(&query, e))?
            .map(Specs::Storage),
        CategorySlug::Psu => sqlx::query_as(&query)
            .bind(component_id)
            .fetch_optional(txn)
            .await
            .map_err(|e| DatabaseError::query(&query, e))?
            .map(Specs::Psu),
        CategorySlug::Case => sqlx::query_as(&query)
            .bind(component_id)
            .fetch_optional(txn)
            .await
            .map_err(|e| DatabaseError::query(&query, e))?
            .map(Specs::Case),
    };
    Ok(specs)
}

/// Writes a component's specs. Editing is upsert-by-component: a component
/// has at most one specs row and a second write replaces the first.
pub async fn upsert(
    txn: &mut PgConnection,
    component_id: i64,
    specs: &Specs,
) -> Result<(), DatabaseError> {
    match specs {
        Specs::Cpu(s) => {
            let query = "INSERT INTO cpu_specs \
                             (component_id, socket, cores, threads, base_clock, boost_clock, tdp, \
                              integrated_graphics, process, architecture, performance_score) \
                         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
                         ON CONFLICT (component_id) DO UPDATE SET \
                             socket = $2, cores = $3, threads = $4, base_clock = $5, \
                             boost_clock = $6, tdp = $7, integrated_graphics = $8, \
                             process = $9, architecture = $10, performance_score = $11";
            sqlx::query(query)
                .bind(component_id)
                .bind(&s.socket)
                .bind(s.cores)
                .bind(s.threads)
                .bind(s.base_clock)
                .bind(s.boost_clock)
                .bind(s.tdp)
                .bind(&s.integrated_graphics)
                .bind(&s.process)
                .bind(&s.architecture)
                .bind(s.performance_score)
                .execute(txn)
                .await
                .map_err(|e| DatabaseError::query(query, e))?;
        }
        Specs::CpuCooler(s) => {
            let query = "INSERT INTO cpu_cooler_specs \
                             (component_id, type, fan_rpm, noise_level, height_mm, compatible_sockets) \
                         VALUES ($1, $2, $3, $4, $5, $6) \
                         ON CONFLICT (component_id) DO UPDATE SET \
                             type = $2, fan_rpm = $3, noise_level = $4, height_mm = $5, \
                             compatible_sockets = $6";
            sqlx::query(query)
                .bind(component_id)
                .bind(&s.cooler_type)
                .bind(&s.fan_rpm)
                .bind(&s.noise_level)
                .bind(s.height_mm)
                .bind(&s.compatible_sockets)
                .execute(txn)
                .await
                .map_err(|e| DatabaseError::query(query, e))?;
        }
        Specs::Motherboard(s) => {
            let query = "INSERT INTO motherboard_specs \
                             (component_id, socket, chipset, form_factor, memory_slots, memory_type, \
                              max_memory_gb, max_memory_speed_mhz, storage_support, pcie_slots, \
                              nvme_slots, m2_slots, sata_ports) \
                         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
                         ON CONFLICT (component_id) DO UPDATE SET \
                             socket = $2, chipset = $3, form_factor = $4, memory_slots = $5, \
                             memory_type = $6, max_memory_gb = $7, max_memory_speed_mhz = $8, \
                             storage_support = $9, pcie_slots = $10, nvme_slots = $11, \
                             m2_slots = $12, sata_ports = $13";
            sqlx::query(query)
                .bind(component_id)
                .bind(&s.socket)
                .bind(&s.chipset)
                .bind(&s.form_factor)
                .bind(s.memory_slots)
                .bind(&s.memory_type)
                .bind(s.max_memory_gb)
                .bind(s.max_memory_speed_mhz)
                .bind(&s.storage_support)
                .bind(&s.pcie_slots)
                .bind(s.nvme_slots)
                .bind(s.m2_slots)
                .bind(s.sata_ports)
                .execute(txn)
                .await
                .map_err(|e| DatabaseError::query(query, e))?;
        }
        Specs::Gpu(s) => {
            let query = "INSERT INTO gpu_specs \
                             (component_id, chipset, memory_size, core_clock, boost_clock, tdp, \
                              length_mm, ports, performance_score) \
                         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
                         ON CONFLICT (component_id) DO UPDATE SET \
                             chipset = $2, memory_size = $3, core_clock = $4, boost_clock = $5, \
                             tdp = $6, length_mm = $7, ports = $8, performance_score = $9";
            sqlx::query(query)
                .bind(component_id)
                .bind(&s.chipset)
                .bind(&s.memory_size)
                .bind(s.core_clock)
                .bind(s.boost_clock)
                .bind(s.tdp)
                .bind(s.length_mm)
                .bind(&s.ports)
                .bind(s.performance_score)
                .execute(txn)
                .await
                .map_err(|e| DatabaseError::query(query, e))?;
        }
        Specs::Memory(s) => {
            let query = "INSERT INTO memory_specs \
                             (component_id, type, capacity_gb, speed_mhz, modules, cas_latency) \
                         VALUES ($1, $2, $3, $4, $5, $6) \
                         ON CONFLICT (component_id) DO UPDATE SET \
                             type = $2, capacity_gb = $3, speed_mhz = $4, modules = $5, \
                             cas_latency = $6";
            sqlx::query(query)
                .bind(component_id)
                .bind(&s.memory_type)
                .bind(s.capacity_gb)
                .bind(s.speed_mhz)
                .bind(&s.modules)
                .bind(&s.cas_latency)
                .execute(txn)
                .await
                .map_err(|e| DatabaseError::query(query, e))?;
        }
        Specs::Storage(s) => {
            let query = "INSERT INTO storage_specs \
                             (component_id, capacity_gb, type, interface, form_factor) \
                         VALUES ($1, $2, $3, $4, $5) \
                         ON CONFLICT (component_id) DO UPDATE SET \
                             capacity_gb = $2, type = $3, interface = $4, form_factor = $5";
            sqlx::query(query)
                .bind(component_id)
                .bind(s.capacity_gb)
                .bind(&s.storage_type)
                .bind(&s.interface)
                .bind(&s.form_factor)
                .execute(txn)
                .await
                .map_err(|e| DatabaseError::query(query, e))?;
        }
        Specs::Psu(s) => {
            let query = "INSERT INTO psu_specs \
                             (component_id, wattage, efficiency_rating, efficiency_level, modular, form_factor) \
                         VALUES ($1, $2, $3, $4, $5, $6) \
                         ON CONFLICT (component_id) DO UPDATE SET \
                             wattage = $2, efficiency_rating = $3, efficiency_level = $4, \
                             modular = $5, form_factor = $6";
            sqlx::query(query)
                .bind(component_id)
                .bind(s.wattage)
                .bind(&s.efficiency_rating)
                .bind(&s.efficiency_level)
                .bind(&s.modular)
                .bind(&s.form_factor)
                .execute(txn)
                .await
                .map_err(|e| DatabaseError::query(query, e))?;
        }
        Specs::Case(s) => {
            let query = "INSERT INTO case_specs \
                             (component_id, form_factor, form_factor_support, max_gpu_length_mm, \
                              max_cpu_cooler_height_mm, psu_shroud, side_panel) \
                         VALUES ($1, $2, $3, $4, $5, $6, $7) \
                         ON CONFLICT (component_id) DO UPDATE SET \
                             form_factor = $2, form_factor_support = $3, max_gpu_length_mm = $4, \
                             max_cpu_cooler_height_mm = $5, psu_shroud = $6, side_panel = $7";
            sqlx::query(query)
                .bind(component_id)
                .bind(&s.form_factor)
                .bind(&s.form_factor_support)
                .bind(s.max_gpu_length_mm)
                .bind(s.max_cpu_cooler_height_mm)
                .bind(s.psu_shroud)
                .bind(&s.side_panel)
                .execute(txn)
                .await
                .map_err(|e| DatabaseError::query(query, e))?;
        }
    }
    Ok(())
}

pub async fn delete(
    txn: &mut PgConnection,
    category: CategorySlug,
    component_id: i64,
) -> Result<(), DatabaseError> {
    let query = format!("DELETE FROM {} WHERE component_id = $1", table(category));
    sqlx::query(&query)
        .bind(component_id)
        .execute(txn)
        .await
        .map(|_| ())
        .map_err(|e| DatabaseError::query(&query, e))
}

#[cfg(test)]
mod tests {
    use model::specs::{CpuSpecs, MotherboardSpecs};

    use super::*;

    #[sqlx::test(migrator = "crate::migrations::MIGRATOR")]
    async fn specs_dispatch_and_upsert(pool: sqlx::PgPool) {
        let mut txn = pool.begin().await.unwrap();

        let category = crate::category::find_by_slug(&mut txn, CategorySlug::Cpu)
            .await
            .unwrap()
            .unwrap();
        let draft = model::component::ComponentDraft {
            name: "test cpu".to_string(),
            brand: None,
            price: rust_decimal_macros::dec!(249.99),
            stock: Some(10),
            status: model::component::ComponentStatus::Active,
            low_stock_threshold: None,
            vendor: None,
            image_path: None,
        };
        let component = crate::component::create(&mut txn, category.id, &draft)
            .await
            .unwrap();

        // No row yet: not an error, just absent.
        let specs = find(&mut txn, CategorySlug::Cpu, component.id).await.unwrap();
        assert!(specs.is_none());

        upsert(
            &mut txn,
            component.id,
            &Specs::Cpu(CpuSpecs {
                socket: Some("AM5".to_string()),
                cores: Some(8),
                tdp: Some(105),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        let specs = find(&mut txn, CategorySlug::Cpu, component.id)
            .await
            .unwrap()
            .unwrap();
        let cpu = specs.as_cpu().unwrap();
        assert_eq!(cpu.socket.as_deref(), Some("AM5"));
        assert_eq!(cpu.cores, Some(8));

        // Upsert replaces in place; still one row.
        upsert(
            &mut txn,
            component.id,
            &Specs::Cpu(CpuSpecs {
                socket: Some("AM5".to_string()),
                cores: Some(16),
                tdp: Some(170),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        let specs = find(&mut txn, CategorySlug::Cpu, component.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(specs.as_cpu().unwrap().cores, Some(16));

        // The dispatch only consults the candidate category's table.
        let other = find(&mut txn, CategorySlug::Motherboard, component.id)
            .await
            .unwrap();
        assert!(other.is_none());

        // A motherboard row for a different component exercises array columns.
        let board_category = crate::category::find_by_slug(&mut txn, CategorySlug::Motherboard)
            .await
            .unwrap()
            .unwrap();
        let board = crate::component::create(
            &mut txn,
            board_category.id,
            &model::component::ComponentDraft {
                name: "test board".to_string(),
                price: rust_decimal_macros::dec!(189.00),
                ..draft.clone()
            },
        )
        .await
        .unwrap();
        upsert(
            &mut txn,
            board.id,
            &Specs::Motherboard(MotherboardSpecs {
                socket: Some("AM5".to_string()),
                storage_support: Some(vec!["NVMe".to_string(), "SATA".to_string()]),
                nvme_slots: Some(2),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        let specs = find(&mut txn, CategorySlug::Motherboard, board.id)
            .await
            .unwrap()
            .unwrap();
        let board_specs = specs.as_motherboard().unwrap();
        assert_eq!(
            board_specs.storage_support.as_deref(),
            Some(["NVMe".to_string(), "SATA".to_string()].as_slice())
        );

        txn.commit().await.unwrap();
    }
}
