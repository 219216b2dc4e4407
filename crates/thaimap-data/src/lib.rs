//! Boundary data model and ingestion for `thaimap`.
//!
//! This crate owns everything between raw bytes and typed records: the five
//! [`AdminLevel`]s, the per-level property variants, GeoJSON parsing and the
//! sources the boundary documents are fetched from.

use once_cell::sync::Lazy;
use std::{env, path::PathBuf};
use tracing::debug;

pub mod level;
pub mod model;
pub mod raw;
pub mod test_data;

mod error;

pub use error::{DataError, Result};
pub use level::AdminLevel;
pub use model::{
    AdminProperties, Coordinates, DistrictProperties, DistrictRef, Feature, FeatureCollection,
    Geometry, Measures, Position, ProvinceProperties, ProvinceRef, RegionProperties, RegionTags,
    Ring, SubdistrictProperties, coerce_finite_non_negative,
};
pub use raw::{BoundaryFetcher, DataSource, parse_collection};

pub const DATA_DIR_DEFAULT: &str = "./thaimap_data";

/// Global data directory path.
///
/// Resolution order: the `DATA_DIR` environment variable, the platform data
/// directory (with the `system-dirs` feature), then [`DATA_DIR_DEFAULT`].
pub static DATA_DIR: Lazy<PathBuf> = Lazy::new(|| resolve_data_dir(env::var("DATA_DIR").ok()));

fn resolve_data_dir(from_env: Option<String>) -> PathBuf {
    if let Some(dir) = from_env {
        return PathBuf::from(dir);
    }

    #[cfg(feature = "system-dirs")]
    if let Some(dirs) = directories::ProjectDirs::from("", "", "thaimap") {
        let dir = dirs.data_dir().to_path_buf();
        debug!(dir = ?dir, "Using platform data directory");
        return dir;
    }

    debug!(dir = DATA_DIR_DEFAULT, "Using default data directory");
    PathBuf::from(DATA_DIR_DEFAULT)
}

pub fn get_data_dir() -> &'static std::path::Path {
    DATA_DIR.as_path()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_env_value_wins() {
        let dir = resolve_data_dir(Some("/srv/thaimap".to_string()));
        assert_eq!(dir, PathBuf::from("/srv/thaimap"));
    }

    #[cfg(not(feature = "system-dirs"))]
    #[test]
    fn test_data_dir_falls_back_to_default() {
        assert_eq!(resolve_data_dir(None), PathBuf::from(DATA_DIR_DEFAULT));
    }

    #[test]
    fn test_default_directory_is_boundaries_under_data_dir() {
        let DataSource::Directory(dir) = DataSource::default_directory() else {
            panic!("default source should be a directory");
        };
        assert!(dir.ends_with("boundaries"));
        assert_eq!(dir, get_data_dir().join("boundaries"));
        if let Ok(from_env) = env::var("DATA_DIR") {
            assert_eq!(get_data_dir(), PathBuf::from(from_env));
        }
    }
}
