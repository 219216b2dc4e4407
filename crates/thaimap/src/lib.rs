//! thaimap - Thai administrative boundary atlas core
//!
//! thaimap loads Thailand's administrative boundaries (provinces, districts,
//! subdistricts and the ROYIN and NESDB region schemes), indexes their Thai
//! and English names and codes for search, computes label points and extents,
//! and resolves fill colors for the map layer that renders them.
//!
//! # Quick Start
//!
//! ```rust
//! use thaimap::{AdminLevel, ColorScheme, DataManager};
//! use thaimap::data_processing::test_data::{TestDataConfig, memory_source};
//!
//! let mut manager = DataManager::default();
//! manager.load_all_blocking(&memory_source(&TestDataConfig::full()))?;
//!
//! // Search by Thai or English name, or by code
//! for hit in manager.search("เชียงใหม่") {
//!     println!("{} [{}]", hit.display_name, hit.level);
//! }
//!
//! // Color provinces by region
//! let mut styles = manager.style_resolver();
//! styles.update_region_colors(manager.region_list(AdminLevel::Provinces));
//! for feature in manager.features(AdminLevel::Provinces) {
//!     let style = styles.style_for(feature, AdminLevel::Provinces, ColorScheme::ByRegion);
//!     println!("{} -> {}", feature.feature_id(), style.fill_color);
//! }
//! # Ok::<(), thaimap::error::ThaiMapError>(())
//! ```
//!
//! # Data
//!
//! Boundaries come from five GeoJSON documents named `<level>.geojson`, read
//! from a directory, downloaded from a base URL (`download_data` feature) or
//! supplied in memory. See [`DataSource`].
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod config;
mod core;
pub mod error;
pub mod geometry;
mod index;
mod style;

pub use crate::core::{AreaStatistics, DataManager};

pub use config::{AtlasConfig, AtlasConfigBuilder, THAILAND_BOUNDS};
pub use geometry::{Bounds, LatLng};
pub use index::{
    DEFAULT_SEARCH_LIMIT, SearchEntry, SearchIndex, display_name, normalize_term,
    searchable_terms,
};
pub use style::{
    AreaGradient, CATEGORY10, ColorScheme, StrokeOverride, Style, StyleConfig, StyleError,
    StyleResolver, hsl_to_hex,
};
pub use thaimap_data as data_processing;
pub use thaimap_data::{AdminLevel, AdminProperties, DataSource, Feature, FeatureCollection};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for thaimap.
///
/// Installs a `tracing` fmt subscriber. `RUST_LOG` takes precedence over
/// `level` when set. Later calls are no-ops.
///
/// # Examples
///
/// ```rust
/// use thaimap::init_logging;
/// use tracing::Level;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), thaimap::error::ThaiMapError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), error::ThaiMapError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("reqwest=warn".parse()?)
            .add_directive("hyper_util=warn".parse()?);

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .init();
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_processing::test_data::{TestDataConfig, memory_source};

    fn setup_test_env() {
        let _ = init_logging(tracing::Level::WARN);
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        setup_test_env();
        assert!(init_logging(tracing::Level::DEBUG).is_ok());
    }

    #[test]
    fn test_blocking_load_and_search() {
        setup_test_env();

        let mut manager = DataManager::new(AtlasConfigBuilder::new().search_limit(2).build());
        manager
            .load_all_blocking(&memory_source(&TestDataConfig::full()))
            .unwrap();
        assert!(manager.is_ready());

        let results = manager.search("bangkok");
        assert_eq!(results.len(), 2, "configured limit should cap results");
        assert_eq!(results[0].display_name, "กรุงเทพมหานคร (Bangkok)");
        assert_eq!(manager.search_with_limit("bangkok", 20).len(), 3);
    }
}
