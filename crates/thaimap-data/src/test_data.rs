//! A small but realistic five-level sample of Thai boundary data.
//!
//! Three provinces (Bangkok, Nonthaburi, Chiang Mai), the capital district of
//! each, one subdistrict per district, and both region schemes. Geometries are
//! simple rectangles; Chiang Mai is a `MultiPolygon` with a small outlying part.

use std::io::Write;

use bytes::Bytes;
use serde_json::{Value, json};
use tempfile::TempDir;
use tracing::info;

use super::error::Result;
use crate::{AdminLevel, DataSource, FeatureCollection, parse_collection};

/// Which levels the generated sample contains.
#[derive(Debug, Clone)]
pub struct TestDataConfig {
    pub levels: Vec<AdminLevel>,
}

impl Default for TestDataConfig {
    fn default() -> Self {
        Self::full()
    }
}

impl TestDataConfig {
    /// All five levels.
    pub fn full() -> Self {
        Self {
            levels: AdminLevel::ALL.to_vec(),
        }
    }

    /// Provinces only.
    pub fn minimal() -> Self {
        Self {
            levels: vec![AdminLevel::Provinces],
        }
    }

    /// Drop one level, e.g. to simulate a missing boundary file.
    pub fn without(mut self, level: AdminLevel) -> Self {
        self.levels.retain(|l| *l != level);
        self
    }
}

const CENTRAL: &str = "ภาคกลาง";
const NORTHERN: &str = "ภาคเหนือ";
const BANGKOK_VICINITY: &str = "กรุงเทพฯและปริมณฑล";

/// Closed rectangle ring from `(min_lng, min_lat)` to `(max_lng, max_lat)`.
fn rect(min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> Value {
    json!([
        [min_lng, min_lat],
        [max_lng, min_lat],
        [max_lng, max_lat],
        [min_lng, max_lat],
        [min_lng, min_lat]
    ])
}

fn polygon(ring: Value) -> Value {
    json!({"type": "Polygon", "coordinates": [ring]})
}

fn feature(properties: Value, geometry: Value) -> Value {
    json!({"type": "Feature", "properties": properties, "geometry": geometry})
}

fn chiang_mai_geometry() -> Value {
    json!({
        "type": "MultiPolygon",
        "coordinates": [
            [rect(99.6, 18.0, 99.7, 18.1)],
            [rect(98.0, 18.0, 99.5, 20.0)]
        ]
    })
}

/// The GeoJSON document for one level.
pub fn sample_document(level: AdminLevel) -> Value {
    let features = match level {
        AdminLevel::Provinces => vec![
            feature(
                json!({"pro_code": "10", "pro_th": "กรุงเทพมหานคร", "pro_en": "Bangkok",
                       "area_sqkm": 1568.737, "perimeter": 286.3,
                       "reg_royin": CENTRAL, "reg_nesdb": BANGKOK_VICINITY}),
                polygon(rect(100.3, 13.5, 100.9, 14.0)),
            ),
            feature(
                json!({"pro_code": "12", "pro_th": "นนทบุรี", "pro_en": "Nonthaburi",
                       "area_sqkm": "622.303", "perimeter": 151.2,
                       "reg_royin": CENTRAL, "reg_nesdb": BANGKOK_VICINITY}),
                polygon(rect(100.2, 13.8, 100.6, 14.1)),
            ),
            feature(
                json!({"pro_code": 50, "pro_th": "เชียงใหม่", "pro_en": "Chiang Mai",
                       "area_sqkm": 20107.057, "perimeter": null,
                       "reg_royin": NORTHERN, "reg_nesdb": NORTHERN}),
                chiang_mai_geometry(),
            ),
        ],
        AdminLevel::Districts => vec![
            feature(
                json!({"amp_code": "1001", "amp_th": "พระนคร", "amp_en": "Phra Nakhon",
                       "pro_code": "10", "pro_th": "กรุงเทพมหานคร", "pro_en": "Bangkok",
                       "area_sqkm": 5.536, "perimeter": 11.8,
                       "reg_royin": CENTRAL, "reg_nesdb": BANGKOK_VICINITY}),
                polygon(rect(100.48, 13.74, 100.52, 13.77)),
            ),
            feature(
                json!({"amp_code": "1201", "amp_th": "เมืองนนทบุรี", "amp_en": "Mueang Nonthaburi",
                       "pro_code": "12", "pro_th": "นนทบุรี", "pro_en": "Nonthaburi",
                       "area_sqkm": 77.018, "perimeter": 44.1,
                       "reg_royin": CENTRAL, "reg_nesdb": BANGKOK_VICINITY}),
                polygon(rect(100.45, 13.82, 100.55, 13.9)),
            ),
            feature(
                json!({"amp_code": "5001", "amp_th": "เมืองเชียงใหม่", "amp_en": "Mueang Chiang Mai",
                       "pro_code": "50", "pro_th": "เชียงใหม่", "pro_en": "Chiang Mai",
                       "area_sqkm": 152.4, "perimeter": 58.9,
                       "reg_royin": NORTHERN, "reg_nesdb": NORTHERN}),
                polygon(rect(98.9, 18.7, 99.05, 18.85)),
            ),
        ],
        AdminLevel::Subdistricts => vec![
            feature(
                json!({"tam_code": "100101", "tam_th": "พระบรมมหาราชวัง", "tam_en": "Phra Borom Maha Ratchawang",
                       "amp_code": "1001", "amp_th": "พระนคร", "amp_en": "Phra Nakhon",
                       "pro_code": "10", "pro_th": "กรุงเทพมหานคร", "pro_en": "Bangkok",
                       "area_sqkm": 2.153,
                       "reg_royin": CENTRAL, "reg_nesdb": BANGKOK_VICINITY}),
                polygon(rect(100.485, 13.745, 100.5, 13.76)),
            ),
            feature(
                json!({"tam_code": "120101", "tam_th": "สวนใหญ่", "tam_en": "Suan Yai",
                       "amp_code": "1201", "amp_th": "เมืองนนทบุรี", "amp_en": "Mueang Nonthaburi",
                       "pro_code": "12", "pro_th": "นนทบุรี", "pro_en": "Nonthaburi",
                       "area_sqkm": 3.2,
                       "reg_royin": CENTRAL, "reg_nesdb": BANGKOK_VICINITY}),
                polygon(rect(100.48, 13.83, 100.5, 13.85)),
            ),
            feature(
                json!({"tam_code": "500101", "tam_th": "ศรีภูมิ", "tam_en": "Si Phum",
                       "amp_code": "5001", "amp_th": "เมืองเชียงใหม่", "amp_en": "Mueang Chiang Mai",
                       "pro_code": "50", "pro_th": "เชียงใหม่", "pro_en": "Chiang Mai",
                       "area_sqkm": 1.8,
                       "reg_royin": NORTHERN, "reg_nesdb": NORTHERN}),
                polygon(rect(98.98, 18.79, 99.0, 18.81)),
            ),
        ],
        AdminLevel::RegionRoyin => vec![
            feature(
                json!({"reg_royin": CENTRAL, "area_sqkm": 91795.0}),
                polygon(rect(99.0, 12.5, 101.5, 16.0)),
            ),
            feature(
                json!({"reg_royin": NORTHERN, "area_sqkm": 93691.0}),
                polygon(rect(97.5, 17.0, 101.5, 20.5)),
            ),
        ],
        AdminLevel::RegionNesdb => vec![
            feature(
                json!({"reg_nesdb": BANGKOK_VICINITY, "area_sqkm": 7761.5}),
                polygon(rect(100.0, 13.4, 101.0, 14.3)),
            ),
            feature(
                json!({"reg_nesdb": NORTHERN, "area_sqkm": 169644.0}),
                polygon(rect(97.3, 15.0, 101.5, 20.5)),
            ),
        ],
    };

    json!({"type": "FeatureCollection", "features": features})
}

pub fn sample_bytes(level: AdminLevel) -> Bytes {
    Bytes::from(sample_document(level).to_string())
}

/// The sample document for `level`, already parsed.
pub fn sample_collection(level: AdminLevel) -> Result<FeatureCollection> {
    parse_collection(level, &sample_bytes(level))
}

/// An in-memory [`DataSource`] holding the configured levels.
pub fn memory_source(config: &TestDataConfig) -> DataSource {
    DataSource::from_memory(
        config
            .levels
            .iter()
            .map(|level| (*level, sample_bytes(*level))),
    )
}

/// Write the configured levels as `<level>.geojson` files into a fresh
/// temporary directory. The directory is removed when the returned handle is
/// dropped.
pub fn create_test_data(config: &TestDataConfig) -> Result<TempDir> {
    info!("Creating test data with config: {:?}", config);

    let dir = TempDir::new()?;
    for level in &config.levels {
        let mut file = std::fs::File::create(dir.path().join(level.file_name()))?;
        file.write_all(&sample_bytes(*level))?;
        file.flush()?;
    }
    Ok(dir)
}
