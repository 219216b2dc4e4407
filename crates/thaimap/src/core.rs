//! The [`DataManager`]: owner of the loaded boundary collections and their
//! search index.
//!
//! # Quick Start
//!
//! ```rust
//! use thaimap::{AdminLevel, AtlasConfig, DataManager};
//! use thaimap::data_processing::test_data::{TestDataConfig, memory_source};
//!
//! let mut manager = DataManager::new(AtlasConfig::default());
//! manager.load_all_blocking(&memory_source(&TestDataConfig::full()))?;
//! assert!(manager.is_ready());
//!
//! let results = manager.search("bangkok");
//! assert_eq!(results[0].feature_id(), "10");
//!
//! let stats = manager.statistics(AdminLevel::Provinces);
//! println!("{} provinces, {:.1} km² on average", stats.count, stats.average_area);
//! # Ok::<(), thaimap::error::ThaiMapError>(())
//! ```

use std::sync::Arc;

use ahash::AHashMap;
use futures::stream::{FuturesUnordered, StreamExt};
use itertools::Itertools;
use serde::Serialize;
use thaimap_data::{
    AdminLevel, AdminProperties, BoundaryFetcher, DataError, DataSource, Feature,
    FeatureCollection,
};
use tracing::{debug, info, instrument, warn};

use crate::{
    config::AtlasConfig,
    error::{Result, ThaiMapError},
    geometry::{self, Bounds, LatLng},
    index::{SearchEntry, SearchIndex},
    style::StyleResolver,
};

/// Area totals for one level.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AreaStatistics {
    pub count: usize,
    pub total_area: f64,
    pub average_area: f64,
}

impl AreaStatistics {
    /// Zero features give all zeros rather than a NaN average.
    pub fn from_features<'a, I>(features: I) -> Self
    where
        I: IntoIterator<Item = &'a Feature>,
    {
        let areas: Vec<f64> = features.into_iter().map(Feature::area_sqkm).collect();
        let count = areas.len();
        let total_area: f64 = areas.iter().sum();
        let average_area = if count == 0 {
            0.0
        } else {
            total_area / count as f64
        };
        Self {
            count,
            total_area,
            average_area,
        }
    }
}

/// Owns the five boundary collections and the search index built from them.
#[derive(Debug, Clone, Default)]
pub struct DataManager {
    config: AtlasConfig,
    collections: AHashMap<AdminLevel, FeatureCollection>,
    index: SearchIndex,
}

impl DataManager {
    pub fn new(config: AtlasConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub const fn config(&self) -> &AtlasConfig {
        &self.config
    }

    pub const fn index(&self) -> &SearchIndex {
        &self.index
    }

    /// A fresh style resolver using the configured styles. Its caches start
    /// empty.
    pub fn style_resolver(&self) -> StyleResolver {
        StyleResolver::new(self.config.style.clone())
    }

    /// Load all five levels from `source` concurrently.
    ///
    /// Each level is stored and indexed as soon as it finishes. The first
    /// failure aborts the load: the failing level is evicted, levels that
    /// already finished stay loaded, and the remaining loads are dropped.
    #[instrument(name = "Load all boundary levels", skip_all, level = "info")]
    pub async fn load_all(&mut self, source: &DataSource) -> Result<()> {
        let t_load = std::time::Instant::now();
        let fetcher = BoundaryFetcher::new(source.clone());

        let mut pending: FuturesUnordered<_> = AdminLevel::ALL
            .into_iter()
            .map(|level| {
                let fetcher = &fetcher;
                async move { (level, fetcher.load_level(level).await) }
            })
            .collect();

        while let Some((level, result)) = pending.next().await {
            let stored = result
                .map_err(ThaiMapError::from)
                .and_then(|collection| self.insert_collection(collection));
            if let Err(e) = stored {
                warn!(%level, error = %e, "Boundary level failed to load");
                self.evict(level);
                return Err(e);
            }
        }

        info!(
            elapsed = ?t_load.elapsed(),
            terms = self.index.term_count(),
            "All boundary levels loaded"
        );
        Ok(())
    }

    /// [`load_all`](Self::load_all) on a dedicated tokio runtime. Must not be
    /// called from within an async context.
    pub fn load_all_blocking(&mut self, source: &DataSource) -> Result<()> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.load_all(source))
    }

    /// Store a parsed collection under its level, replacing any previous one
    /// together with its index entries.
    ///
    /// A collection without features is rejected and leaves the current state
    /// of its level untouched.
    pub fn insert_collection(&mut self, collection: FeatureCollection) -> Result<()> {
        let level = collection.level();
        if collection.is_empty() {
            return Err(DataError::EmptyCollection(level).into());
        }
        self.index.remove_level(level);
        self.index.add_collection(&collection);
        debug!(%level, features = collection.len(), "Collection stored");
        self.collections.insert(level, collection);
        Ok(())
    }

    fn evict(&mut self, level: AdminLevel) {
        if self.collections.remove(&level).is_some() {
            debug!(%level, "Evicted previously loaded collection");
        }
        self.index.remove_level(level);
    }

    pub fn get_collection(&self, level: AdminLevel) -> Option<&FeatureCollection> {
        self.collections.get(&level)
    }

    /// Features of `level`; empty when the level is not loaded.
    pub fn features(&self, level: AdminLevel) -> &[Arc<Feature>] {
        self.collections
            .get(&level)
            .map(FeatureCollection::features)
            .unwrap_or_default()
    }

    /// True once all five levels are loaded.
    pub fn is_ready(&self) -> bool {
        self.collections.len() == AdminLevel::ALL.len()
    }

    /// Search with the configured result limit.
    pub fn search(&self, query: &str) -> Vec<SearchEntry> {
        self.search_with_limit(query, self.config.search_limit)
    }

    pub fn search_with_limit(&self, query: &str, limit: usize) -> Vec<SearchEntry> {
        self.index.search(query, limit)
    }

    pub fn bounds(&self, feature: &Feature) -> Option<Bounds> {
        geometry::bounds(&feature.geometry)
    }

    /// Bounding-box midpoint.
    pub fn center(&self, feature: &Feature) -> Option<LatLng> {
        geometry::center(&feature.geometry)
    }

    /// Label point; see [`geometry::centroid`].
    pub fn centroid(&self, feature: &Feature) -> Option<LatLng> {
        geometry::centroid(&feature.geometry)
    }

    /// Whether a point lies within the configured country bounds.
    pub fn in_country(&self, lat: f64, lng: f64) -> bool {
        self.config.country_bounds.contains(LatLng::new(lat, lng))
    }

    pub fn statistics(&self, level: AdminLevel) -> AreaStatistics {
        AreaStatistics::from_features(self.features(level).iter().map(|f| &**f))
    }

    /// Distinct region names found on the features of `level`, sorted.
    ///
    /// The NESDB level lists NESDB names; every other level lists ROYIN names.
    pub fn region_list(&self, level: AdminLevel) -> Vec<String> {
        self.features(level)
            .iter()
            .filter_map(|f| {
                let regions = f.properties.regions();
                match level {
                    AdminLevel::RegionNesdb => regions.reg_nesdb.as_deref(),
                    _ => regions.reg_royin.as_deref(),
                }
            })
            .filter(|name| !name.is_empty())
            .unique()
            .sorted()
            .map(ToString::to_string)
            .collect()
    }

    /// Features of `level` tagged with region `name` under either scheme.
    pub fn filter_by_region(&self, level: AdminLevel, name: &str) -> Vec<Arc<Feature>> {
        self.features(level)
            .iter()
            .filter(|f| f.properties.regions().contains(name))
            .cloned()
            .collect()
    }

    /// Look up a feature by its level-specific id (code, or name for regions).
    pub fn find_by_id(&self, level: AdminLevel, id: &str) -> Option<&Arc<Feature>> {
        self.features(level).iter().find(|f| f.feature_id() == id)
    }

    pub fn districts_of(&self, pro_code: &str) -> Vec<Arc<Feature>> {
        self.features(AdminLevel::Districts)
            .iter()
            .filter(|f| {
                f.properties
                    .province()
                    .is_some_and(|p| p.pro_code == pro_code)
            })
            .cloned()
            .collect()
    }

    pub fn subdistricts_of(&self, amp_code: &str) -> Vec<Arc<Feature>> {
        self.features(AdminLevel::Subdistricts)
            .iter()
            .filter(|f| {
                f.properties
                    .district()
                    .is_some_and(|d| d.amp_code == amp_code)
            })
            .cloned()
            .collect()
    }

    /// The loaded province a district or subdistrict belongs to.
    pub fn province_of(&self, feature: &Feature) -> Option<&Arc<Feature>> {
        let pro_code = match &feature.properties {
            AdminProperties::District(p) => &p.province.pro_code,
            AdminProperties::Subdistrict(p) => &p.province.pro_code,
            AdminProperties::Province(_) | AdminProperties::Region(_) => return None,
        };
        self.find_by_id(AdminLevel::Provinces, pro_code)
    }

    /// The loaded district a subdistrict belongs to.
    pub fn district_of(&self, feature: &Feature) -> Option<&Arc<Feature>> {
        match &feature.properties {
            AdminProperties::Subdistrict(p) => {
                self.find_by_id(AdminLevel::Districts, &p.district.amp_code)
            }
            _ => None,
        }
    }
}
