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

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::category::CategorySlug;

/// Typed attributes of a CPU. Every field is optional: a partially catalogued
/// part must stay representable, and compatibility treats missing fields as
/// unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CpuSpecs {
    pub socket: Option<String>,
    pub cores: Option<i32>,
    pub threads: Option<i32>,
    pub base_clock: Option<f64>,
    pub boost_clock: Option<f64>,
    pub tdp: Option<i32>,
    pub integrated_graphics: Option<String>,
    pub process: Option<String>,
    pub architecture: Option<String>,
    pub performance_score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CpuCoolerSpecs {
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub cooler_type: Option<String>,
    pub fan_rpm: Option<String>,
    pub noise_level: Option<String>,
    pub height_mm: Option<i32>,
    pub compatible_sockets: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MotherboardSpecs {
    pub socket: Option<String>,
    pub chipset: Option<String>,
    pub form_factor: Option<String>,
    pub memory_slots: Option<i32>,
    pub memory_type: Option<String>,
    pub max_memory_gb: Option<i32>,
    pub max_memory_speed_mhz: Option<i32>,
    pub storage_support: Option<Vec<String>>,
    pub pcie_slots: Option<Vec<String>>,
    pub nvme_slots: Option<i32>,
    pub m2_slots: Option<i32>,
    pub sata_ports: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct GpuSpecs {
    pub chipset: Option<String>,
    pub memory_size: Option<String>,
    pub core_clock: Option<f64>,
    pub boost_clock: Option<f64>,
    pub tdp: Option<i32>,
    pub length_mm: Option<i32>,
    pub ports: Option<Vec<String>>,
    pub performance_score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MemorySpecs {
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub memory_type: Option<String>,
    pub capacity_gb: Option<i32>,
    pub speed_mhz: Option<i32>,
    pub modules: Option<String>,
    pub cas_latency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StorageSpecs {
    pub capacity_gb: Option<i32>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub storage_type: Option<String>,
    pub interface: Option<String>,
    pub form_factor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PsuSpecs {
    pub wattage: Option<i32>,
    pub efficiency_rating: Option<String>,
    pub efficiency_level: Option<String>,
    pub modular: Option<String>,
    pub form_factor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CaseSpecs {
    pub form_factor: Option<String>,
    pub form_factor_support: Option<Vec<String>>,
    pub max_gpu_length_mm: Option<i32>,
    pub max_cpu_cooler_height_mm: Option<i32>,
    pub psu_shroud: Option<bool>,
    pub side_panel: Option<String>,
}

/// The specs of a component, resolved through its category. The category of
/// the component decides which variant applies; a component without a specs
/// row simply has no `Specs` at all.
///
/// Serialization is untagged (the record is flat JSON). Deserialization goes
/// through [`Specs::from_json`] because every field of every family is
/// optional and an untagged decode could not tell the families apart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Specs {
    Cpu(CpuSpecs),
    CpuCooler(CpuCoolerSpecs),
    Motherboard(MotherboardSpecs),
    Gpu(GpuSpecs),
    Memory(MemorySpecs),
    Storage(StorageSpecs),
    Psu(PsuSpecs),
    Case(CaseSpecs),
}

impl Specs {
    pub fn category(&self) -> CategorySlug {
        match self {
            Specs::Cpu(_) => CategorySlug::Cpu,
            Specs::CpuCooler(_) => CategorySlug::CpuCooler,
            Specs::Motherboard(_) => CategorySlug::Motherboard,
            Specs::Gpu(_) => CategorySlug::Gpu,
            Specs::Memory(_) => CategorySlug::Memory,
            Specs::Storage(_) => CategorySlug::Storage,
            Specs::Psu(_) => CategorySlug::Psu,
            Specs::Case(_) => CategorySlug::Case,
        }
    }

    /// Empty specs for a category, used when a component has no specs row but
    /// a typed record is still required.
    pub fn empty(category: CategorySlug) -> Self {
        match category {
            CategorySlug::Cpu => Specs::Cpu(CpuSpecs::default()),
            CategorySlug::CpuCooler => Specs::CpuCooler(CpuCoolerSpecs::default()),
            CategorySlug::Motherboard => Specs::Motherboard(MotherboardSpecs::default()),
            CategorySlug::Gpu => Specs::Gpu(GpuSpecs::default()),
            CategorySlug::Memory => Specs::Memory(MemorySpecs::default()),
            CategorySlug::Storage => Specs::Storage(StorageSpecs::default()),
            CategorySlug::Psu => Specs::Psu(PsuSpecs::default()),
            CategorySlug::Case => Specs::Case(CaseSpecs::default()),
        }
    }

    pub fn as_cpu(&self) -> Option<&CpuSpecs> {
        match self {
            Specs::Cpu(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_cpu_cooler(&self) -> Option<&CpuCoolerSpecs> {
        match self {
            Specs::CpuCooler(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_motherboard(&self) -> Option<&MotherboardSpecs> {
        match self {
            Specs::Motherboard(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_gpu(&self) -> Option<&GpuSpecs> {
        match self {
            Specs::Gpu(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_memory(&self) -> Option<&MemorySpecs> {
        match self {
            Specs::Memory(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_storage(&self) -> Option<&StorageSpecs> {
        match self {
            Specs::Storage(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_psu(&self) -> Option<&PsuSpecs> {
        match self {
            Specs::Psu(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_case(&self) -> Option<&CaseSpecs> {
        match self {
            Specs::Case(s) => Some(s),
            _ => None,
        }
    }

    /// Thermal design power, for the categories that draw it (CPU, GPU).
    pub fn tdp(&self) -> Option<i32> {
        match self {
            Specs::Cpu(s) => s.tdp,
            Specs::Gpu(s) => s.tdp,
            _ => None,
        }
    }

    /// Decodes a flat JSON record into the specs family selected by
    /// `category`.
    pub fn from_json(
        category: CategorySlug,
        value: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(match category {
            CategorySlug::Cpu => Specs::Cpu(serde_json::from_value(value)?),
            CategorySlug::CpuCooler => Specs::CpuCooler(serde_json::from_value(value)?),
            CategorySlug::Motherboard => Specs::Motherboard(serde_json::from_value(value)?),
            CategorySlug::Gpu => Specs::Gpu(serde_json::from_value(value)?),
            CategorySlug::Memory => Specs::Memory(serde_json::from_value(value)?),
            CategorySlug::Storage => Specs::Storage(serde_json::from_value(value)?),
            CategorySlug::Psu => Specs::Psu(serde_json::from_value(value)?),
            CategorySlug::Case => Specs::Case(serde_json::from_value(value)?),
        })
    }
}

/// Lowercases and trims a spec value for comparison. Comparisons between spec
/// strings always go through here so that `AM5` and ` am5 ` agree.
pub fn norm(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

/// Normalizes an optional scalar, mapping whitespace-only values to `None`.
pub fn norm_opt(value: Option<&str>) -> Option<String> {
    value.map(norm).filter(|v| !v.is_empty())
}

/// Normalizes a token list (sockets, form factors, storage support) into a
/// set of comparable strings.
pub fn norm_set(values: Option<&[String]>) -> BTreeSet<String> {
    values
        .unwrap_or_default()
        .iter()
        .map(|v| norm(v))
        .filter(|v| !v.is_empty())
        .collect()
}
