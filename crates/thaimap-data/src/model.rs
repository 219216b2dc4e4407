//! Typed boundary records.
//!
//! Each [`Feature`] pairs a GeoJSON [`Geometry`] with an [`AdminProperties`]
//! variant chosen by the level it was loaded from. Raw property bags are only
//! looked at once, in [`AdminProperties::from_raw`]; everything downstream
//! matches on the variant.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::AdminLevel;

/// A `[longitude, latitude]` pair. Extra ordinates (altitude) are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct Position {
    pub lng: f64,
    pub lat: f64,
}

impl Position {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        match values.as_slice() {
            [lng, lat, ..] => Ok(Self::new(*lng, *lat)),
            _ => Err(format!(
                "a position needs at least two numbers, got {}",
                values.len()
            )),
        }
    }
}

impl From<Position> for [f64; 2] {
    fn from(position: Position) -> Self {
        [position.lng, position.lat]
    }
}

pub type Ring = Vec<Position>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    /// Rings; the first one is the outer boundary.
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

/// A coordinate tree of any nesting depth whose leaves are [`Position`]s.
pub trait Coordinates {
    fn for_each_position<F: FnMut(Position)>(&self, f: &mut F);
}

impl Coordinates for Position {
    fn for_each_position<F: FnMut(Position)>(&self, f: &mut F) {
        f(*self);
    }
}

impl<T: Coordinates> Coordinates for Vec<T> {
    fn for_each_position<F: FnMut(Position)>(&self, f: &mut F) {
        for child in self {
            child.for_each_position(f);
        }
    }
}

impl Coordinates for Geometry {
    fn for_each_position<F: FnMut(Position)>(&self, f: &mut F) {
        match self {
            Self::Point(p) => p.for_each_position(f),
            Self::MultiPoint(ps) | Self::LineString(ps) => ps.for_each_position(f),
            Self::MultiLineString(lines) | Self::Polygon(lines) => lines.for_each_position(f),
            Self::MultiPolygon(polygons) => polygons.for_each_position(f),
        }
    }
}

/// Coerce a raw numeric property into a finite, non-negative number.
///
/// Numbers and numeric strings are accepted; anything else (missing, `null`,
/// non-numeric text, `NaN`, infinities, negative values) becomes `0.0`.
pub fn coerce_finite_non_negative(value: Option<&Value>) -> f64 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number
        .filter(|n| n.is_finite() && *n >= 0.0)
        .unwrap_or_default()
}

fn text(raw: &Map<String, Value>, key: &str) -> String {
    match raw.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn optional_text(raw: &Map<String, Value>, key: &str) -> Option<String> {
    Some(text(raw, key)).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Measures {
    pub area_sqkm: f64,
    pub perimeter: f64,
}

impl Measures {
    fn from_raw(raw: &Map<String, Value>) -> Self {
        Self {
            area_sqkm: coerce_finite_non_negative(raw.get("area_sqkm")),
            perimeter: coerce_finite_non_negative(raw.get("perimeter")),
        }
    }
}

/// Region names under both classification schemes, when the feature has them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionTags {
    pub reg_royin: Option<String>,
    pub reg_nesdb: Option<String>,
}

impl RegionTags {
    fn from_raw(raw: &Map<String, Value>) -> Self {
        Self {
            reg_royin: optional_text(raw, "reg_royin"),
            reg_nesdb: optional_text(raw, "reg_nesdb"),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.reg_royin.as_deref() == Some(name) || self.reg_nesdb.as_deref() == Some(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvinceRef {
    pub pro_code: String,
    pub pro_th: String,
    pub pro_en: String,
}

impl ProvinceRef {
    fn from_raw(raw: &Map<String, Value>) -> Self {
        Self {
            pro_code: text(raw, "pro_code"),
            pro_th: text(raw, "pro_th"),
            pro_en: text(raw, "pro_en"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictRef {
    pub amp_code: String,
    pub amp_th: String,
    pub amp_en: String,
}

impl DistrictRef {
    fn from_raw(raw: &Map<String, Value>) -> Self {
        Self {
            amp_code: text(raw, "amp_code"),
            amp_th: text(raw, "amp_th"),
            amp_en: text(raw, "amp_en"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvinceProperties {
    pub province: ProvinceRef,
    pub measures: Measures,
    pub regions: RegionTags,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistrictProperties {
    pub district: DistrictRef,
    pub province: ProvinceRef,
    pub measures: Measures,
    pub regions: RegionTags,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubdistrictProperties {
    pub tam_code: String,
    pub tam_th: String,
    pub tam_en: String,
    pub district: DistrictRef,
    pub province: ProvinceRef,
    pub measures: Measures,
    pub regions: RegionTags,
}

/// A region under one of the two classification schemes. The name is both
/// identifier and display name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionProperties {
    pub name: String,
    pub measures: Measures,
    pub regions: RegionTags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AdminProperties {
    Province(ProvinceProperties),
    District(DistrictProperties),
    Subdistrict(SubdistrictProperties),
    Region(RegionProperties),
}

impl AdminProperties {
    /// Build the typed properties for `level` from a raw GeoJSON property bag.
    ///
    /// Missing text fields become empty strings; numeric fields go through
    /// [`coerce_finite_non_negative`].
    pub fn from_raw(level: AdminLevel, raw: &Map<String, Value>) -> Self {
        let measures = Measures::from_raw(raw);
        let regions = RegionTags::from_raw(raw);
        match level {
            AdminLevel::Provinces => Self::Province(ProvinceProperties {
                province: ProvinceRef::from_raw(raw),
                measures,
                regions,
            }),
            AdminLevel::Districts => Self::District(DistrictProperties {
                district: DistrictRef::from_raw(raw),
                province: ProvinceRef::from_raw(raw),
                measures,
                regions,
            }),
            AdminLevel::Subdistricts => Self::Subdistrict(SubdistrictProperties {
                tam_code: text(raw, "tam_code"),
                tam_th: text(raw, "tam_th"),
                tam_en: text(raw, "tam_en"),
                district: DistrictRef::from_raw(raw),
                province: ProvinceRef::from_raw(raw),
                measures,
                regions,
            }),
            AdminLevel::RegionRoyin => Self::Region(RegionProperties {
                name: text(raw, "reg_royin"),
                measures,
                regions,
            }),
            AdminLevel::RegionNesdb => Self::Region(RegionProperties {
                name: text(raw, "reg_nesdb"),
                measures,
                regions,
            }),
        }
    }

    pub const fn measures(&self) -> &Measures {
        match self {
            Self::Province(p) => &p.measures,
            Self::District(p) => &p.measures,
            Self::Subdistrict(p) => &p.measures,
            Self::Region(p) => &p.measures,
        }
    }

    pub const fn regions(&self) -> &RegionTags {
        match self {
            Self::Province(p) => &p.regions,
            Self::District(p) => &p.regions,
            Self::Subdistrict(p) => &p.regions,
            Self::Region(p) => &p.regions,
        }
    }

    /// The level-specific identifier: `pro_code`, `amp_code`, `tam_code`, or
    /// the region name.
    pub fn feature_id(&self) -> &str {
        match self {
            Self::Province(p) => &p.province.pro_code,
            Self::District(p) => &p.district.amp_code,
            Self::Subdistrict(p) => &p.tam_code,
            Self::Region(p) => &p.name,
        }
    }

    /// The owning province, for every level below regions.
    pub const fn province(&self) -> Option<&ProvinceRef> {
        match self {
            Self::Province(p) => Some(&p.province),
            Self::District(p) => Some(&p.province),
            Self::Subdistrict(p) => Some(&p.province),
            Self::Region(_) => None,
        }
    }

    /// The owning district, for districts and subdistricts.
    pub const fn district(&self) -> Option<&DistrictRef> {
        match self {
            Self::District(p) => Some(&p.district),
            Self::Subdistrict(p) => Some(&p.district),
            Self::Province(_) | Self::Region(_) => None,
        }
    }

    /// Region name used for coloring: ROYIN first, NESDB as fallback.
    pub fn region_name(&self) -> Option<&str> {
        let regions = self.regions();
        regions
            .reg_royin
            .as_deref()
            .or(regions.reg_nesdb.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: AdminProperties,
}

impl Feature {
    pub const fn new(geometry: Geometry, properties: AdminProperties) -> Self {
        Self {
            geometry,
            properties,
        }
    }

    pub const fn area_sqkm(&self) -> f64 {
        self.properties.measures().area_sqkm
    }

    pub const fn perimeter(&self) -> f64 {
        self.properties.measures().perimeter
    }

    pub fn feature_id(&self) -> &str {
        self.properties.feature_id()
    }
}

/// All features of one level, shared immutably for the session.
#[derive(Debug, Clone)]
pub struct FeatureCollection {
    level: AdminLevel,
    features: Vec<Arc<Feature>>,
}

impl FeatureCollection {
    pub fn new(level: AdminLevel, features: Vec<Feature>) -> Self {
        Self {
            level,
            features: features.into_iter().map(Arc::new).collect(),
        }
    }

    pub const fn level(&self) -> AdminLevel {
        self.level
    }

    pub fn features(&self) -> &[Arc<Feature>] {
        &self.features
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Feature>> {
        self.features.iter()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
