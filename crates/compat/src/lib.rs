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

//! Component compatibility rules.
//!
//! Every rule is symmetric: the same constraint applies no matter which side
//! is the candidate and which is already installed. A rule that depends on a
//! field missing on either side is a no-op, so partially catalogued parts
//! never produce spurious rejections.

use model::build::{ExpandedBuild, ExpandedPart};
use model::category::CategorySlug;
use model::component::CatalogComponent;
use model::specs::{
    CaseSpecs, CpuCoolerSpecs, CpuSpecs, GpuSpecs, MemorySpecs, MotherboardSpecs, PsuSpecs, Specs,
    StorageSpecs, norm_opt, norm_set,
};
use model::tuning::PSU_HEADROOM_CHECK;
use thiserror::Error;

/// Why a candidate cannot join a build. `Display` renders the reason shown
/// to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Incompatibility {
    #[error("CPU socket does not match motherboard")]
    CpuSocketMismatch,
    #[error("RAM type incompatible with motherboard")]
    MemoryTypeMismatch,
    #[error("RAM speed exceeds motherboard limit")]
    MemorySpeedTooHigh,
    #[error("GPU is too long for the case")]
    GpuTooLong,
    #[error("Cooler height exceeds case clearance")]
    CoolerTooTall,
    #[error("Cooler not compatible with CPU socket")]
    CoolerSocketMismatch,
    #[error("PSU wattage insufficient for the build")]
    PsuWattageInsufficient,
    #[error("PSU cannot support CPU + GPU load")]
    PsuOverloaded,
    #[error("Case does not support motherboard form factor")]
    CaseFormFactorUnsupported,
    #[error("Motherboard form factor not supported by case")]
    MotherboardFormFactorUnsupported,
    #[error("Storage interface not supported by motherboard")]
    StorageInterfaceUnsupported,
}

impl serde::Serialize for Incompatibility {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Checks whether `candidate` (an expanded part of `category`) can join
/// `build`. The build's own entry for `category`, if any, is the one being
/// replaced and is ignored.
pub fn check(
    build: &ExpandedBuild,
    category: CategorySlug,
    candidate: &ExpandedPart,
) -> Result<(), Incompatibility> {
    check_candidate_specs(build, category, candidate.specs.as_ref())
}

/// Filter form of [`check`]: the candidate's own category field decides which
/// rules apply.
pub fn is_compatible(
    build: &ExpandedBuild,
    candidate: &CatalogComponent,
) -> Result<(), Incompatibility> {
    check_candidate_specs(build, candidate.category(), candidate.specs.as_ref())
}

/// Treats each installed part in turn as the candidate against the rest and
/// returns the first failure.
pub fn check_whole_build(build: &ExpandedBuild) -> Result<(), Incompatibility> {
    for (category, part) in &build.parts {
        // `check` resolves the candidate's own slot to the candidate, so the
        // part may stay in the build while it is re-validated.
        check(build, *category, part)?;
    }
    Ok(())
}

fn check_candidate_specs(
    build: &ExpandedBuild,
    category: CategorySlug,
    candidate: Option<&Specs>,
) -> Result<(), Incompatibility> {
    let specs_at = |slot: CategorySlug| -> Option<&Specs> {
        if slot == category {
            candidate
        } else {
            build.get(slot).and_then(|part| part.specs.as_ref())
        }
    };

    let cpu = specs_at(CategorySlug::Cpu).and_then(Specs::as_cpu);
    let cooler = specs_at(CategorySlug::CpuCooler).and_then(Specs::as_cpu_cooler);
    let motherboard = specs_at(CategorySlug::Motherboard).and_then(Specs::as_motherboard);
    let gpu = specs_at(CategorySlug::Gpu).and_then(Specs::as_gpu);
    let memory = specs_at(CategorySlug::Memory).and_then(Specs::as_memory);
    let storage = specs_at(CategorySlug::Storage).and_then(Specs::as_storage);
    let psu = specs_at(CategorySlug::Psu).and_then(Specs::as_psu);
    let case = specs_at(CategorySlug::Case).and_then(Specs::as_case);

    if matches!(category, CategorySlug::Cpu | CategorySlug::Motherboard) {
        cpu_socket_matches_motherboard(cpu, motherboard)?;
    }
    if matches!(category, CategorySlug::Memory | CategorySlug::Motherboard) {
        memory_type_matches_motherboard(memory, motherboard)?;
        memory_speed_within_motherboard_limit(memory, motherboard)?;
    }
    if matches!(category, CategorySlug::Gpu | CategorySlug::Case) {
        gpu_fits_case(gpu, case)?;
    }
    if matches!(category, CategorySlug::CpuCooler | CategorySlug::Case) {
        cooler_fits_case(cooler, case)?;
    }
    if matches!(category, CategorySlug::Cpu | CategorySlug::CpuCooler) {
        cooler_supports_cpu_socket(cpu, cooler)?;
    }
    if matches!(
        category,
        CategorySlug::Psu | CategorySlug::Gpu | CategorySlug::Cpu
    ) {
        psu_covers_load(cpu, gpu, psu, category)?;
    }
    if matches!(category, CategorySlug::Case | CategorySlug::Motherboard) {
        case_supports_motherboard(motherboard, case, category)?;
    }
    if matches!(category, CategorySlug::Storage | CategorySlug::Motherboard) {
        motherboard_supports_storage(storage, motherboard)?;
    }

    Ok(())
}

fn cpu_socket_matches_motherboard(
    cpu: Option<&CpuSpecs>,
    motherboard: Option<&MotherboardSpecs>,
) -> Result<(), Incompatibility> {
    let (Some(cpu_socket), Some(board_socket)) = (
        cpu.and_then(|s| norm_opt(s.socket.as_deref())),
        motherboard.and_then(|s| norm_opt(s.socket.as_deref())),
    ) else {
        return Ok(());
    };
    if cpu_socket != board_socket {
        return Err(Incompatibility::CpuSocketMismatch);
    }
    Ok(())
}

fn memory_type_matches_motherboard(
    memory: Option<&MemorySpecs>,
    motherboard: Option<&MotherboardSpecs>,
) -> Result<(), Incompatibility> {
    let (Some(memory_type), Some(board_type)) = (
        memory.and_then(|s| norm_opt(s.memory_type.as_deref())),
        motherboard.and_then(|s| norm_opt(s.memory_type.as_deref())),
    ) else {
        return Ok(());
    };
    if memory_type != board_type {
        return Err(Incompatibility::MemoryTypeMismatch);
    }
    Ok(())
}

fn memory_speed_within_motherboard_limit(
    memory: Option<&MemorySpecs>,
    motherboard: Option<&MotherboardSpecs>,
) -> Result<(), Incompatibility> {
    let (Some(speed), Some(limit)) = (
        memory.and_then(|s| s.speed_mhz),
        motherboard.and_then(|s| s.max_memory_speed_mhz),
    ) else {
        return Ok(());
    };
    if limit > 0 && speed > limit {
        return Err(Incompatibility::MemorySpeedTooHigh);
    }
    Ok(())
}

fn gpu_fits_case(gpu: Option<&GpuSpecs>, case: Option<&CaseSpecs>) -> Result<(), Incompatibility> {
    let (Some(length), Some(limit)) = (
        gpu.and_then(|s| s.length_mm),
        case.and_then(|s| s.max_gpu_length_mm),
    ) else {
        return Ok(());
    };
    if limit > 0 && length > limit {
        return Err(Incompatibility::GpuTooLong);
    }
    Ok(())
}

fn cooler_fits_case(
    cooler: Option<&CpuCoolerSpecs>,
    case: Option<&CaseSpecs>,
) -> Result<(), Incompatibility> {
    let (Some(height), Some(limit)) = (
        cooler.and_then(|s| s.height_mm),
        case.and_then(|s| s.max_cpu_cooler_height_mm),
    ) else {
        return Ok(());
    };
    if limit > 0 && height > limit {
        return Err(Incompatibility::CoolerTooTall);
    }
    Ok(())
}

fn cooler_supports_cpu_socket(
    cpu: Option<&CpuSpecs>,
    cooler: Option<&CpuCoolerSpecs>,
) -> Result<(), Incompatibility> {
    let Some(cpu_socket) = cpu.and_then(|s| norm_opt(s.socket.as_deref())) else {
        return Ok(());
    };
    let sockets = norm_set(cooler.and_then(|s| s.compatible_sockets.as_deref()));
    // A cooler that declares no socket list fits anything.
    if sockets.is_empty() {
        return Ok(());
    }
    if !sockets.contains(&cpu_socket) {
        return Err(Incompatibility::CoolerSocketMismatch);
    }
    Ok(())
}

fn psu_covers_load(
    cpu: Option<&CpuSpecs>,
    gpu: Option<&GpuSpecs>,
    psu: Option<&PsuSpecs>,
    candidate: CategorySlug,
) -> Result<(), Incompatibility> {
    let required = cpu.and_then(|s| s.tdp).unwrap_or(0) + gpu.and_then(|s| s.tdp).unwrap_or(0);
    let Some(wattage) = psu.and_then(|s| s.wattage) else {
        return Ok(());
    };
    if required <= 0 {
        return Ok(());
    }
    let needed = (f64::from(required) * PSU_HEADROOM_CHECK).ceil() as i32;
    if wattage < needed {
        return Err(if candidate == CategorySlug::Psu {
            Incompatibility::PsuWattageInsufficient
        } else {
            Incompatibility::PsuOverloaded
        });
    }
    Ok(())
}

fn case_supports_motherboard(
    motherboard: Option<&MotherboardSpecs>,
    case: Option<&CaseSpecs>,
    candidate: CategorySlug,
) -> Result<(), Incompatibility> {
    let Some(form_factor) = motherboard.and_then(|s| norm_opt(s.form_factor.as_deref())) else {
        return Ok(());
    };
    let supported = norm_set(case.and_then(|s| s.form_factor_support.as_deref()));
    if supported.is_empty() {
        return Ok(());
    }
    if !supported.contains(&form_factor) {
        return Err(if candidate == CategorySlug::Case {
            Incompatibility::CaseFormFactorUnsupported
        } else {
            Incompatibility::MotherboardFormFactorUnsupported
        });
    }
    Ok(())
}

fn is_nvme_like(token: &str) -> bool {
    token.contains("nvme") || token.contains("m.2") || token.contains("m2") || token.contains("pci")
}

fn motherboard_supports_storage(
    storage: Option<&StorageSpecs>,
    motherboard: Option<&MotherboardSpecs>,
) -> Result<(), Incompatibility> {
    let Some(interface) = storage.and_then(|s| norm_opt(s.interface.as_deref())) else {
        return Ok(());
    };
    let Some(board) = motherboard else {
        return Ok(());
    };

    let tokens = norm_set(board.storage_support.as_deref());
    let slot_info_declared =
        board.nvme_slots.is_some() || board.m2_slots.is_some() || board.sata_ports.is_some();
    // A board that catalogues neither support tokens nor port counts is
    // unknown territory: allow.
    if tokens.is_empty() && !slot_info_declared {
        return Ok(());
    }

    if is_nvme_like(&interface) {
        if !tokens.is_empty() && !tokens.iter().any(|t| is_nvme_like(t)) {
            return Err(Incompatibility::StorageInterfaceUnsupported);
        }
        if (board.nvme_slots.is_some() || board.m2_slots.is_some())
            && board.nvme_slots.unwrap_or(0) < 1
            && board.m2_slots.unwrap_or(0) < 1
        {
            return Err(Incompatibility::StorageInterfaceUnsupported);
        }
    } else if interface.contains("sata") {
        match board.sata_ports {
            Some(ports) if ports < 1 => {
                return Err(Incompatibility::StorageInterfaceUnsupported);
            }
            Some(_) => {}
            None => {
                if !tokens.is_empty() && !tokens.iter().any(|t| t.contains("sata")) {
                    return Err(Incompatibility::StorageInterfaceUnsupported);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use model::build::ExpandedPart;
    use rust_decimal::Decimal;

    use super::*;

    fn part(specs: Specs) -> ExpandedPart {
        ExpandedPart {
            id: Some(1),
            name: "part".to_string(),
            price: Decimal::ZERO,
            image_url: None,
            specs: Some(specs),
        }
    }

    fn build_with(parts: Vec<(CategorySlug, Specs)>) -> ExpandedBuild {
        let mut build = ExpandedBuild::default();
        for (category, specs) in parts {
            build.insert(category, part(specs));
        }
        build
    }

    fn cpu(socket: &str, tdp: i32) -> Specs {
        Specs::Cpu(CpuSpecs {
            socket: Some(socket.to_string()),
            tdp: Some(tdp),
            ..Default::default()
        })
    }

    fn motherboard(socket: &str) -> Specs {
        Specs::Motherboard(MotherboardSpecs {
            socket: Some(socket.to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn cpu_socket_mismatch_is_rejected_with_reason() {
        let build = build_with(vec![(CategorySlug::Motherboard, motherboard("AM5"))]);
        let candidate = part(cpu("LGA1700", 125));

        let err = check(&build, CategorySlug::Cpu, &candidate).unwrap_err();
        assert_eq!(err, Incompatibility::CpuSocketMismatch);
        assert_eq!(err.to_string(), "CPU socket does not match motherboard");
    }

    #[test]
    fn cpu_socket_match_is_case_insensitive() {
        let build = build_with(vec![(CategorySlug::Motherboard, motherboard(" am5 "))]);
        let candidate = part(cpu("AM5", 125));
        assert!(check(&build, CategorySlug::Cpu, &candidate).is_ok());
    }

    #[test]
    fn rules_are_symmetric() {
        let cpu_part = part(cpu("LGA1700", 125));
        let board_part = part(motherboard("AM5"));

        let cpu_side = build_with(vec![(CategorySlug::Cpu, cpu("LGA1700", 125))]);
        let board_side = build_with(vec![(CategorySlug::Motherboard, motherboard("AM5"))]);

        let adding_board = check(&cpu_side, CategorySlug::Motherboard, &board_part);
        let adding_cpu = check(&board_side, CategorySlug::Cpu, &cpu_part);
        assert_eq!(adding_board.is_ok(), adding_cpu.is_ok());
        assert!(adding_cpu.is_err());
    }

    #[test]
    fn missing_fields_allow() {
        // A motherboard without a socket cannot contradict any CPU.
        let build = build_with(vec![(
            CategorySlug::Motherboard,
            Specs::Motherboard(MotherboardSpecs::default()),
        )]);
        let candidate = part(cpu("AM5", 65));
        assert!(check(&build, CategorySlug::Cpu, &candidate).is_ok());

        // A part with no specs row at all is unknown, not invalid.
        let empty = ExpandedPart {
            specs: None,
            ..part(cpu("AM5", 65))
        };
        assert!(check(&build, CategorySlug::Cpu, &empty).is_ok());
    }

    #[test]
    fn memory_type_and_speed_rules() {
        let board = Specs::Motherboard(MotherboardSpecs {
            memory_type: Some("DDR5".to_string()),
            max_memory_speed_mhz: Some(6000),
            ..Default::default()
        });
        let build = build_with(vec![(CategorySlug::Motherboard, board)]);

        let ddr4 = part(Specs::Memory(MemorySpecs {
            memory_type: Some("DDR4".to_string()),
            speed_mhz: Some(3200),
            ..Default::default()
        }));
        assert_eq!(
            check(&build, CategorySlug::Memory, &ddr4).unwrap_err(),
            Incompatibility::MemoryTypeMismatch
        );

        let too_fast = part(Specs::Memory(MemorySpecs {
            memory_type: Some("DDR5".to_string()),
            speed_mhz: Some(7200),
            ..Default::default()
        }));
        assert_eq!(
            check(&build, CategorySlug::Memory, &too_fast).unwrap_err(),
            Incompatibility::MemorySpeedTooHigh
        );

        let fits = part(Specs::Memory(MemorySpecs {
            memory_type: Some("DDR5".to_string()),
            speed_mhz: Some(6000),
            ..Default::default()
        }));
        assert!(check(&build, CategorySlug::Memory, &fits).is_ok());
    }

    #[test]
    fn gpu_length_against_case() {
        let case = Specs::Case(CaseSpecs {
            max_gpu_length_mm: Some(330),
            ..Default::default()
        });
        let build = build_with(vec![(CategorySlug::Case, case)]);

        let long_gpu = part(Specs::Gpu(GpuSpecs {
            length_mm: Some(340),
            ..Default::default()
        }));
        assert_eq!(
            check(&build, CategorySlug::Gpu, &long_gpu).unwrap_err(),
            Incompatibility::GpuTooLong
        );
    }

    #[test]
    fn cooler_height_and_socket() {
        let build = build_with(vec![
            (
                CategorySlug::Case,
                Specs::Case(CaseSpecs {
                    max_cpu_cooler_height_mm: Some(160),
                    ..Default::default()
                }),
            ),
            (CategorySlug::Cpu, cpu("AM5", 105)),
        ]);

        let tall = part(Specs::CpuCooler(CpuCoolerSpecs {
            height_mm: Some(165),
            compatible_sockets: Some(vec!["AM5".to_string()]),
            ..Default::default()
        }));
        assert_eq!(
            check(&build, CategorySlug::CpuCooler, &tall).unwrap_err(),
            Incompatibility::CoolerTooTall
        );

        let wrong_socket = part(Specs::CpuCooler(CpuCoolerSpecs {
            height_mm: Some(150),
            compatible_sockets: Some(vec!["LGA1700".to_string()]),
            ..Default::default()
        }));
        assert_eq!(
            check(&build, CategorySlug::CpuCooler, &wrong_socket).unwrap_err(),
            Incompatibility::CoolerSocketMismatch
        );

        // No declared socket list fits anything.
        let universal = part(Specs::CpuCooler(CpuCoolerSpecs {
            height_mm: Some(150),
            ..Default::default()
        }));
        assert!(check(&build, CategorySlug::CpuCooler, &universal).is_ok());
    }

    #[test]
    fn psu_headroom_with_reason_per_side() {
        // cpu 125 + gpu 285 = 410; ceil(410 * 1.25) = 513.
        let build = build_with(vec![
            (CategorySlug::Cpu, cpu("AM5", 125)),
            (
                CategorySlug::Gpu,
                Specs::Gpu(GpuSpecs {
                    tdp: Some(285),
                    ..Default::default()
                }),
            ),
        ]);

        let small = part(Specs::Psu(PsuSpecs {
            wattage: Some(500),
            ..Default::default()
        }));
        assert_eq!(
            check(&build, CategorySlug::Psu, &small).unwrap_err(),
            Incompatibility::PsuWattageInsufficient
        );

        let enough = part(Specs::Psu(PsuSpecs {
            wattage: Some(650),
            ..Default::default()
        }));
        assert!(check(&build, CategorySlug::Psu, &enough).is_ok());

        // Same constraint from the GPU side, with the GPU-side reason.
        let psu_build = build_with(vec![
            (CategorySlug::Cpu, cpu("AM5", 125)),
            (
                CategorySlug::Psu,
                Specs::Psu(PsuSpecs {
                    wattage: Some(500),
                    ..Default::default()
                }),
            ),
        ]);
        let hungry_gpu = part(Specs::Gpu(GpuSpecs {
            tdp: Some(285),
            ..Default::default()
        }));
        assert_eq!(
            check(&psu_build, CategorySlug::Gpu, &hungry_gpu).unwrap_err(),
            Incompatibility::PsuOverloaded
        );
    }

    #[test]
    fn case_form_factor_reasons_per_side() {
        let matx_board = Specs::Motherboard(MotherboardSpecs {
            form_factor: Some("E-ATX".to_string()),
            ..Default::default()
        });
        let small_case = Specs::Case(CaseSpecs {
            form_factor_support: Some(vec!["ATX".to_string(), "Micro-ATX".to_string()]),
            ..Default::default()
        });

        let build = build_with(vec![(CategorySlug::Motherboard, matx_board.clone())]);
        assert_eq!(
            check(&build, CategorySlug::Case, &part(small_case.clone())).unwrap_err(),
            Incompatibility::CaseFormFactorUnsupported
        );

        let build = build_with(vec![(CategorySlug::Case, small_case)]);
        assert_eq!(
            check(&build, CategorySlug::Motherboard, &part(matx_board)).unwrap_err(),
            Incompatibility::MotherboardFormFactorUnsupported
        );

        // A case without a support list allows any board.
        let open_case = Specs::Case(CaseSpecs::default());
        let build = build_with(vec![(CategorySlug::Case, open_case)]);
        let board = Specs::Motherboard(MotherboardSpecs {
            form_factor: Some("E-ATX".to_string()),
            ..Default::default()
        });
        assert!(check(&build, CategorySlug::Motherboard, &part(board)).is_ok());
    }

    #[test]
    fn storage_interface_rules() {
        let nvme = |iface: &str| {
            part(Specs::Storage(StorageSpecs {
                interface: Some(iface.to_string()),
                ..Default::default()
            }))
        };

        // Board with NVMe support.
        let board = Specs::Motherboard(MotherboardSpecs {
            storage_support: Some(vec!["NVMe".to_string(), "SATA".to_string()]),
            nvme_slots: Some(2),
            sata_ports: Some(4),
            ..Default::default()
        });
        let build = build_with(vec![(CategorySlug::Motherboard, board)]);
        assert!(check(&build, CategorySlug::Storage, &nvme("NVMe")).is_ok());
        assert!(check(&build, CategorySlug::Storage, &nvme("SATA")).is_ok());

        // Board advertising SATA only rejects M.2 drives.
        let sata_board = Specs::Motherboard(MotherboardSpecs {
            storage_support: Some(vec!["SATA".to_string()]),
            sata_ports: Some(6),
            ..Default::default()
        });
        let build = build_with(vec![(CategorySlug::Motherboard, sata_board)]);
        assert_eq!(
            check(&build, CategorySlug::Storage, &nvme("M.2")).unwrap_err(),
            Incompatibility::StorageInterfaceUnsupported
        );

        // Board with zero SATA ports rejects SATA drives.
        let no_sata = Specs::Motherboard(MotherboardSpecs {
            storage_support: Some(vec!["NVMe".to_string()]),
            nvme_slots: Some(1),
            sata_ports: Some(0),
            ..Default::default()
        });
        let build = build_with(vec![(CategorySlug::Motherboard, no_sata)]);
        assert_eq!(
            check(&build, CategorySlug::Storage, &nvme("SATA")).unwrap_err(),
            Incompatibility::StorageInterfaceUnsupported
        );

        // Board cataloguing nothing about storage allows everything.
        let unknown_board = Specs::Motherboard(MotherboardSpecs::default());
        let build = build_with(vec![(CategorySlug::Motherboard, unknown_board)]);
        assert!(check(&build, CategorySlug::Storage, &nvme("NVMe")).is_ok());
        assert!(check(&build, CategorySlug::Storage, &nvme("SATA")).is_ok());
    }

    #[test]
    fn whole_build_reports_first_failure() {
        let good = build_with(vec![
            (CategorySlug::Cpu, cpu("AM5", 105)),
            (CategorySlug::Motherboard, motherboard("AM5")),
        ]);
        assert!(check_whole_build(&good).is_ok());

        let bad = build_with(vec![
            (CategorySlug::Cpu, cpu("LGA1700", 105)),
            (CategorySlug::Motherboard, motherboard("AM5")),
        ]);
        assert_eq!(
            check_whole_build(&bad).unwrap_err(),
            Incompatibility::CpuSocketMismatch
        );
    }

    #[test]
    fn accepted_candidate_keeps_whole_build_ok() {
        let mut build = build_with(vec![
            (CategorySlug::Cpu, cpu("AM5", 105)),
            (CategorySlug::Motherboard, motherboard("AM5")),
        ]);
        let memory = part(Specs::Memory(MemorySpecs {
            memory_type: Some("DDR5".to_string()),
            speed_mhz: Some(5600),
            ..Default::default()
        }));
        assert!(check(&build, CategorySlug::Memory, &memory).is_ok());

        build.insert(CategorySlug::Memory, memory);
        assert!(check_whole_build(&build).is_ok());
    }
}
