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

//! The per-user build workspace: a transient category → component selection
//! that every mutation re-validates through the compatibility engine.

use model::build::{
    BuildCompatibility, ExpandedBuild, ExpandedPart, IMAGE_PRIORITY, REQUIRED_CATEGORIES,
    SavedBuild, Selection, TempBuild, duplicate_name,
};
use model::category::CategorySlug;
use model::component::CatalogComponent;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::catalog::CatalogService;
use crate::errors::{ApiError, ApiResult, INCOMPATIBLE_COMPONENT};

/// Name given to a build saved without one.
const DEFAULT_BUILD_NAME: &str = "Custom Build";

/// How [`expand`] treats selection entries whose component no longer exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandMode {
    /// Emit a placeholder part so the client can render the hole.
    Lenient,
    /// Omit the entry entirely; used everywhere a real component is needed.
    Strict,
}

/// The user's workspace, or the empty one if they have none yet.
pub async fn get(txn: &mut PgConnection, user_id: Uuid) -> ApiResult<TempBuild> {
    Ok(db::temp_build::find(txn, user_id)
        .await?
        .unwrap_or_else(|| TempBuild::empty(user_id)))
}

/// Expands a selection into full parts.
pub async fn expand(
    catalog: &CatalogService,
    txn: &mut PgConnection,
    selection: &Selection,
    mode: ExpandMode,
) -> ApiResult<ExpandedBuild> {
    let mut expanded = ExpandedBuild::default();
    for (&category, &component_id) in selection {
        match catalog.get_component(txn, component_id).await? {
            Some(component) if component.category() == category => {
                expanded.insert(category, ExpandedPart::from(component));
            }
            // Dangling id, or a component that moved category out from under
            // the selection.
            _ => {
                if mode == ExpandMode::Lenient {
                    expanded.insert(category, ExpandedPart::missing());
                }
            }
        }
    }
    Ok(expanded)
}

/// Adds a component to the workspace after checking it against the current
/// parts. On rejection nothing is written and the reason is returned.
pub async fn add(
    catalog: &CatalogService,
    txn: &mut PgConnection,
    user_id: Uuid,
    category: CategorySlug,
    component_id: i64,
) -> ApiResult<(TempBuild, ExpandedBuild)> {
    let Some(component) = catalog.get_component(txn, component_id).await? else {
        return Err(ApiError::NotFound("Component"));
    };
    if component.category() != category {
        return Err(ApiError::Validation(format!(
            "Component {} is not a {}",
            component_id, category
        )));
    }

    let mut workspace = get(txn, user_id).await?;
    let mut expanded = expand(catalog, txn, &workspace.components, ExpandMode::Lenient).await?;

    if let Err(reason) = compat::is_compatible(&expanded, &component) {
        return Err(ApiError::Incompatible {
            error: INCOMPATIBLE_COMPONENT,
            reason,
        });
    }

    workspace.components.insert(category, component_id);
    let workspace = db::temp_build::upsert(
        txn,
        user_id,
        &workspace.components,
        workspace.source_build_id,
    )
    .await?;
    expanded.insert(category, ExpandedPart::from(component));
    Ok((workspace, expanded))
}

/// Removes a category from the workspace. Removing an absent category is a
/// no-op.
pub async fn remove(
    txn: &mut PgConnection,
    user_id: Uuid,
    category: CategorySlug,
) -> ApiResult<TempBuild> {
    let mut workspace = get(txn, user_id).await?;
    if workspace.components.remove(&category).is_none() {
        return Ok(workspace);
    }
    Ok(db::temp_build::upsert(
        txn,
        user_id,
        &workspace.components,
        workspace.source_build_id,
    )
    .await?)
}

pub async fn reset(txn: &mut PgConnection, user_id: Uuid) -> ApiResult<()> {
    db::temp_build::clear(txn, user_id).await?;
    Ok(())
}

/// Replaces the whole selection, preserving the source marker unless the
/// caller supplies a new one.
pub async fn replace(
    txn: &mut PgConnection,
    user_id: Uuid,
    selection: &Selection,
    source_build_id: Option<i64>,
) -> ApiResult<TempBuild> {
    Ok(db::temp_build::upsert(txn, user_id, selection, source_build_id).await?)
}

/// The category's candidates that are visible and would pass the
/// compatibility engine against the current workspace.
pub async fn list_pickable(
    catalog: &CatalogService,
    txn: &mut PgConnection,
    user_id: Uuid,
    category: CategorySlug,
) -> ApiResult<Vec<CatalogComponent>> {
    let workspace = get(txn, user_id).await?;
    let expanded = expand(catalog, txn, &workspace.components, ExpandMode::Lenient).await?;
    let candidates = catalog.list_by_category(txn, category).await?;
    Ok(candidates
        .into_iter()
        .filter(|candidate| candidate.component.is_visible())
        .filter(|candidate| compat::is_compatible(&expanded, candidate).is_ok())
        .collect())
}

/// Computes the persisted compatibility state of an expanded build.
pub fn compatibility_state(expanded: &ExpandedBuild) -> BuildCompatibility {
    if compat::check_whole_build(expanded).is_err() {
        return BuildCompatibility::Invalid;
    }
    let complete = REQUIRED_CATEGORIES.iter().all(|category| {
        expanded
            .get(*category)
            .is_some_and(|part| !part.is_missing())
    });
    if complete {
        BuildCompatibility::Ok
    } else {
        BuildCompatibility::Incomplete
    }
}

/// The build image, picked from the parts by fixed priority.
fn pick_image(expanded: &ExpandedBuild) -> Option<&str> {
    IMAGE_PRIORITY
        .iter()
        .filter_map(|category| expanded.get(*category))
        .find_map(|part| part.image_url.as_deref())
}

/// Snapshots the workspace into a saved build and clears the workspace. The
/// source marker never survives into the saved record.
pub async fn save(
    catalog: &CatalogService,
    txn: &mut PgConnection,
    user_id: Uuid,
    name: Option<String>,
) -> ApiResult<SavedBuild> {
    let workspace = get(txn, user_id).await?;
    if workspace.components.is_empty() {
        return Err(ApiError::Validation("Workspace is empty".to_string()));
    }

    let name = name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_BUILD_NAME.to_string());

    let expanded = expand(catalog, txn, &workspace.components, ExpandMode::Lenient).await?;
    let compatibility = compatibility_state(&expanded);
    let summary = expanded.summary();

    // Placeholders never make it into the saved selection.
    let selection: Selection = expanded
        .parts
        .iter()
        .filter_map(|(category, part)| part.id.map(|id| (*category, id)))
        .collect();

    let record = db::saved_build::SavedBuildRecord {
        name: &name,
        components: &selection,
        total_price: summary.total_price,
        power_usage: summary.power_usage as i32,
        compatibility,
        image_url: pick_image(&expanded),
    };
    let build = db::saved_build::insert(txn, user_id, &record).await?;
    db::temp_build::clear(txn, user_id).await?;
    Ok(build)
}

/// Starts an edit session: copies the saved build into the workspace and
/// marks where it came from.
pub async fn load(txn: &mut PgConnection, user_id: Uuid, build_id: i64) -> ApiResult<TempBuild> {
    let Some(build) = db::saved_build::find_for_user(txn, user_id, build_id).await? else {
        return Err(ApiError::NotFound("Build"));
    };
    Ok(db::temp_build::upsert(txn, user_id, &build.components, Some(build.id)).await?)
}

/// Commits an edit session back to the saved build, then clears the
/// workspace. Accepts the workspace either when its source marker matches or
/// when its category set equals the build's (clients that dropped the marker
/// while editing).
pub async fn update_saved(
    catalog: &CatalogService,
    txn: &mut PgConnection,
    user_id: Uuid,
    build_id: i64,
    name: Option<String>,
) -> ApiResult<SavedBuild> {
    let Some(build) = db::saved_build::find_for_user(txn, user_id, build_id).await? else {
        return Err(ApiError::NotFound("Build"));
    };
    let workspace = get(txn, user_id).await?;

    let marker_matches = workspace.source_build_id == Some(build_id);
    let same_categories = workspace.components.keys().eq(build.components.keys());
    if !marker_matches && !same_categories {
        return Err(ApiError::Validation(
            "Workspace is not an edit of this build".to_string(),
        ));
    }

    let expanded = expand(catalog, txn, &workspace.components, ExpandMode::Lenient).await?;
    if let Err(reason) = compat::check_whole_build(&expanded) {
        return Err(ApiError::Incompatible {
            error: INCOMPATIBLE_COMPONENT,
            reason,
        });
    }

    let name = name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| build.name.clone());
    let compatibility = compatibility_state(&expanded);
    let summary = expanded.summary();
    let selection: Selection = expanded
        .parts
        .iter()
        .filter_map(|(category, part)| part.id.map(|id| (*category, id)))
        .collect();

    let record = db::saved_build::SavedBuildRecord {
        name: &name,
        components: &selection,
        total_price: summary.total_price,
        power_usage: summary.power_usage as i32,
        compatibility,
        image_url: pick_image(&expanded),
    };
    let updated = db::saved_build::update(txn, user_id, build_id, &record)
        .await?
        .ok_or(ApiError::NotFound("Build"))?;
    db::temp_build::clear(txn, user_id).await?;
    Ok(updated)
}

/// Deep-copies a saved build under a derived, unused name.
pub async fn duplicate(
    txn: &mut PgConnection,
    user_id: Uuid,
    build_id: i64,
) -> ApiResult<SavedBuild> {
    let Some(build) = db::saved_build::find_for_user(txn, user_id, build_id).await? else {
        return Err(ApiError::NotFound("Build"));
    };
    let taken = db::saved_build::names_for_user(txn, user_id).await?;
    let name = duplicate_name(&build.name, taken.iter().map(String::as_str));

    let record = db::saved_build::SavedBuildRecord {
        name: &name,
        components: &build.components,
        total_price: build.total_price,
        power_usage: build.power_usage,
        compatibility: build.compatibility,
        image_url: build.image_url.as_deref(),
    };
    Ok(db::saved_build::insert(txn, user_id, &record).await?)
}

/// Soft-deletes a saved build; order items referencing it keep resolving.
pub async fn delete(txn: &mut PgConnection, user_id: Uuid, build_id: i64) -> ApiResult<()> {
    db::saved_build::soft_delete(txn, user_id, build_id)
        .await?
        .ok_or(ApiError::NotFound("Build"))?;
    Ok(())
}
