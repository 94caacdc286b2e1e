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

//! Catalog reads: components joined with their category slug and typed
//! specs, plus the process-wide specs cache.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use db::DatabaseError;
use lru::LruCache;
use model::category::CategorySlug;
use model::component::{CatalogComponent, Component};
use model::specs::Specs;
use sqlx::PgConnection;

/// Upper bound on cached specs entries. The catalog of a single store fits
/// comfortably; the bound only guards against unbounded admin imports.
const SPECS_CACHE_CAPACITY: NonZeroUsize = NonZeroUsize::new(4096).unwrap();

/// Derives public object URLs for catalog images stored in the blob bucket.
#[derive(Debug, Clone)]
pub struct StorageUrls {
    base: String,
    bucket: String,
}

impl StorageUrls {
    pub fn new(base: impl Into<String>, bucket: impl Into<String>) -> Self {
        StorageUrls {
            base: base.into(),
            bucket: bucket.into(),
        }
    }

    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base.trim_end_matches('/'),
            self.bucket,
            path.trim_start_matches('/')
        )
    }
}

/// Catalog accessor. The specs cache is the only process-wide mutable state
/// in the service; admin writes must call [`CatalogService::invalidate`].
pub struct CatalogService {
    specs_cache: Mutex<LruCache<i64, Option<Specs>>>,
    storage: StorageUrls,
}

impl CatalogService {
    pub fn new(storage: StorageUrls) -> Self {
        CatalogService {
            specs_cache: Mutex::new(LruCache::new(SPECS_CACHE_CAPACITY)),
            storage,
        }
    }

    fn cache(&self) -> std::sync::MutexGuard<'_, LruCache<i64, Option<Specs>>> {
        match self.specs_cache.lock() {
            Ok(guard) => guard,
            // A poisoned cache only ever holds clones of database rows;
            // recover rather than take the process down.
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// A component's specs, from cache or from the table its category
    /// dispatches to. The "no specs row" result is cached too.
    pub async fn specs(
        &self,
        txn: &mut PgConnection,
        category: CategorySlug,
        component_id: i64,
    ) -> Result<Option<Specs>, DatabaseError> {
        if let Some(cached) = self.cache().get(&component_id) {
            return Ok(cached.clone());
        }
        let specs = db::specs::find(txn, category, component_id).await?;
        self.cache().put(component_id, specs.clone());
        Ok(specs)
    }

    /// Drops a component's cached specs. Admin CRUD calls this on every
    /// mutation of a component or its specs.
    pub fn invalidate(&self, component_id: i64) {
        self.cache().pop(&component_id);
    }

    /// The public URL for an image path in the component bucket.
    pub fn image_url(&self, path: &str) -> String {
        self.storage.public_url(path)
    }

    /// A missing component is not an error, it is `None`.
    pub async fn get_component(
        &self,
        txn: &mut PgConnection,
        component_id: i64,
    ) -> Result<Option<CatalogComponent>, DatabaseError> {
        let Some(component) = db::component::find_by_id(txn, component_id).await? else {
            return Ok(None);
        };
        Ok(Some(self.decorate(txn, component).await?))
    }

    /// A category's components, cheapest first.
    pub async fn list_by_category(
        &self,
        txn: &mut PgConnection,
        slug: CategorySlug,
    ) -> Result<Vec<CatalogComponent>, DatabaseError> {
        let components = db::component::list_by_category(txn, slug).await?;
        let mut catalog = Vec::with_capacity(components.len());
        for component in components {
            catalog.push(self.decorate(txn, component).await?);
        }
        Ok(catalog)
    }

    async fn decorate(
        &self,
        txn: &mut PgConnection,
        component: Component,
    ) -> Result<CatalogComponent, DatabaseError> {
        let specs = self.specs(txn, component.category, component.id).await?;
        let image_url = component
            .image_path
            .as_deref()
            .map(|path| self.storage.public_url(path));
        Ok(CatalogComponent {
            component,
            image_url,
            specs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_joins_cleanly() {
        let storage = StorageUrls::new("https://identity.example.com/", "component-images");
        assert_eq!(
            storage.public_url("/gpus/rtx.png"),
            "https://identity.example.com/storage/v1/object/public/component-images/gpus/rtx.png"
        );
    }

    #[sqlx::test(migrator = "db::migrations::MIGRATOR")]
    async fn specs_cache_serves_and_invalidates(pool: sqlx::PgPool) {
        use model::component::{ComponentDraft, ComponentStatus};
        use model::specs::CpuSpecs;
        use rust_decimal_macros::dec;

        let catalog = CatalogService::new(StorageUrls::new("https://x.example.com", "imgs"));
        let mut conn = pool.acquire().await.unwrap();

        let category = db::category::find_by_slug(&mut conn, CategorySlug::Cpu)
            .await
            .unwrap()
            .unwrap();
        let component = db::component::create(
            &mut conn,
            category.id,
            &ComponentDraft {
                name: "cached cpu".to_string(),
                brand: None,
                price: dec!(100.00),
                stock: Some(1),
                status: ComponentStatus::Active,
                low_stock_threshold: None,
                vendor: None,
                image_path: None,
            },
        )
        .await
        .unwrap();

        // First lookup caches the "no row" sentinel.
        assert!(
            catalog
                .specs(&mut conn, CategorySlug::Cpu, component.id)
                .await
                .unwrap()
                .is_none()
        );

        db::specs::upsert(
            &mut conn,
            component.id,
            &Specs::Cpu(CpuSpecs {
                socket: Some("AM5".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        // Still the cached sentinel until the write path invalidates.
        assert!(
            catalog
                .specs(&mut conn, CategorySlug::Cpu, component.id)
                .await
                .unwrap()
                .is_none()
        );

        catalog.invalidate(component.id);
        let specs = catalog
            .specs(&mut conn, CategorySlug::Cpu, component.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(specs.as_cpu().unwrap().socket.as_deref(), Some("AM5"));
    }
}
