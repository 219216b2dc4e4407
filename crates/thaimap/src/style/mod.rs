//! Fill colors and stroke styles for boundary features.
//!
//! [`StyleResolver`] owns three caches: the region-to-color assignment, the
//! area range used by the gradient, and custom per-feature overrides. None of
//! them follows the loaded data on its own. Callers refresh them with
//! [`StyleResolver::update_region_colors`] and
//! [`StyleResolver::update_area_range`] whenever the active level or scheme
//! changes; until then styles are computed from the previous state.

use std::fmt;
use std::str::FromStr;

use ahash::AHashMap;
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thaimap_data::{AdminLevel, Feature};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Error, Debug)]
pub enum StyleError {
    #[error("Invalid color {0:?}: expected #rgb or #rrggbb")]
    InvalidColor(String),
    #[error("Unknown color scheme: {0:?}")]
    UnknownScheme(String),
    #[error("Color pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

const HEX_COLOR_PATTERN: &str = r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$";
static HEX_COLOR: OnceCell<Regex> = OnceCell::new();

fn validate_color(color: &str) -> Result<(), StyleError> {
    let pattern = HEX_COLOR.get_or_try_init(|| Regex::new(HEX_COLOR_PATTERN))?;
    if pattern.is_match(color) {
        Ok(())
    } else {
        Err(StyleError::InvalidColor(color.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorScheme {
    #[default]
    Monochrome,
    ByRegion,
    ByArea,
    Custom,
}

impl ColorScheme {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monochrome => "monochrome",
            Self::ByRegion => "by-region",
            Self::ByArea => "by-area",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorScheme {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "monochrome" => Ok(Self::Monochrome),
            "by-region" => Ok(Self::ByRegion),
            "by-area" => Ok(Self::ByArea),
            "custom" => Ok(Self::Custom),
            other => Err(StyleError::UnknownScheme(other.to_string())),
        }
    }
}

/// Path style handed to the map layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    pub fill_color: String,
    pub fill_opacity: f64,
    pub stroke_color: String,
    pub stroke_weight: f64,
    pub stroke_opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill_color: "#3388ff".to_string(),
            fill_opacity: 0.6,
            stroke_color: "#ffffff".to_string(),
            stroke_weight: 1.0,
            stroke_opacity: 0.8,
        }
    }
}

/// Border override applied on top of a computed style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeOverride {
    pub stroke_color: String,
    pub stroke_weight: f64,
    pub stroke_opacity: f64,
}

impl StrokeOverride {
    pub fn apply(&self, style: &Style) -> Style {
        Style {
            stroke_color: self.stroke_color.clone(),
            stroke_weight: self.stroke_weight,
            stroke_opacity: self.stroke_opacity,
            ..style.clone()
        }
    }
}

/// Hue interpolation used by the by-area scheme. Hues in degrees, saturation
/// and lightness in percent.
///
/// The default runs from 240° (blue) for the smallest area down to 0° (red)
/// for the largest, passing through green and yellow. Hue is linear in the
/// normalized area, so the midpoint of the range lands on 120° (green).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaGradient {
    pub start_hue: f64,
    pub end_hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

impl Default for AreaGradient {
    fn default() -> Self {
        Self {
            start_hue: 240.0,
            end_hue: 0.0,
            saturation: 70.0,
            lightness: 50.0,
        }
    }
}

impl AreaGradient {
    /// Color for a normalized position in `[0, 1]`.
    pub fn color_at(&self, t: f64) -> String {
        let t = t.clamp(0.0, 1.0);
        let hue = (self.end_hue - self.start_hue).mul_add(t, self.start_hue);
        hsl_to_hex(hue, self.saturation, self.lightness)
    }
}

pub const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    pub base: Style,
    pub palette: Vec<String>,
    pub area_gradient: AreaGradient,
    /// Used by the by-area scheme when no usable range is cached.
    pub area_default_color: String,
    pub highlight: StrokeOverride,
    pub selection: StrokeOverride,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            base: Style::default(),
            palette: CATEGORY10.iter().map(ToString::to_string).collect(),
            area_gradient: AreaGradient::default(),
            area_default_color: "#cccccc".to_string(),
            highlight: StrokeOverride {
                stroke_color: "#ffcc00".to_string(),
                stroke_weight: 3.0,
                stroke_opacity: 1.0,
            },
            selection: StrokeOverride {
                stroke_color: "#ff3300".to_string(),
                stroke_weight: 4.0,
                stroke_opacity: 1.0,
            },
        }
    }
}

impl StyleConfig {
    /// Check every configured color.
    pub fn validate(&self) -> Result<(), StyleError> {
        validate_color(&self.base.fill_color)?;
        validate_color(&self.base.stroke_color)?;
        validate_color(&self.area_default_color)?;
        validate_color(&self.highlight.stroke_color)?;
        validate_color(&self.selection.stroke_color)?;
        self.palette.iter().try_for_each(|c| validate_color(c))
    }
}

/// Convert HSL (degrees, percent, percent) to `#rrggbb`.
pub fn hsl_to_hex(hue: f64, saturation: f64, lightness: f64) -> String {
    let s = (saturation / 100.0).clamp(0.0, 1.0);
    let l = (lightness / 100.0).clamp(0.0, 1.0);
    let chroma = (1.0 - 2.0f64.mul_add(l, -1.0).abs()) * s;
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = l - chroma / 2.0;
    let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    format!("#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b))
}

#[derive(Debug, Clone, Default)]
pub struct StyleResolver {
    config: StyleConfig,
    region_colors: IndexMap<String, String>,
    area_range: Option<(f64, f64)>,
    custom_colors: AHashMap<String, String>,
}

impl StyleResolver {
    pub fn new(config: StyleConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub const fn config(&self) -> &StyleConfig {
        &self.config
    }

    /// Reassign palette colors to `names` in first-seen order, cycling
    /// through the palette. Blank names are skipped.
    pub fn update_region_colors<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.region_colors.clear();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() || self.region_colors.contains_key(name) {
                continue;
            }
            let color = self
                .config
                .palette
                .get(self.region_colors.len() % self.config.palette.len().max(1))
                .cloned()
                .unwrap_or_else(|| self.config.base.fill_color.clone());
            self.region_colors.insert(name.to_string(), color);
        }
        debug!(regions = self.region_colors.len(), "Region colors updated");
    }

    /// Cache the min/max area of `features`. An empty input clears the range.
    pub fn update_area_range<'a, I>(&mut self, features: I)
    where
        I: IntoIterator<Item = &'a Feature>,
    {
        self.area_range = features
            .into_iter()
            .map(Feature::area_sqkm)
            .fold(None, |range, area| match range {
                None => Some((area, area)),
                Some((min, max)) => Some((f64::min(min, area), f64::max(max, area))),
            });
        debug!(range = ?self.area_range, "Area range updated");
    }

    pub const fn area_range(&self) -> Option<(f64, f64)> {
        self.area_range
    }

    pub fn set_custom_color(
        &mut self,
        id: impl Into<String>,
        color: &str,
    ) -> Result<(), StyleError> {
        validate_color(color)?;
        self.custom_colors.insert(id.into(), color.to_string());
        Ok(())
    }

    pub fn custom_color(&self, id: &str) -> Option<&str> {
        self.custom_colors.get(id).map(String::as_str)
    }

    pub fn clear_custom_colors(&mut self) {
        self.custom_colors.clear();
    }

    /// Cached region assignment, in assignment order. Used for legends.
    pub const fn region_colors(&self) -> &IndexMap<String, String> {
        &self.region_colors
    }

    fn area_color(&self, area: f64) -> String {
        match self.area_range {
            Some((min, max)) if max > min => {
                let gradient = &self.config.area_gradient;
                gradient.color_at((area - min) / (max - min))
            }
            _ => self.config.area_default_color.clone(),
        }
    }

    /// Style of `feature` under `scheme`, from the current caches.
    pub fn style_for(&self, feature: &Feature, level: AdminLevel, scheme: ColorScheme) -> Style {
        let base = &self.config.base;
        let fill_color = match scheme {
            ColorScheme::Monochrome => base.fill_color.clone(),
            ColorScheme::ByRegion => feature
                .properties
                .region_name()
                .and_then(|name| self.region_colors.get(name))
                .unwrap_or(&base.fill_color)
                .clone(),
            ColorScheme::ByArea => self.area_color(feature.area_sqkm()),
            ColorScheme::Custom => self
                .custom_color(feature.feature_id())
                .unwrap_or(base.fill_color.as_str())
                .to_string(),
        };
        trace!(%level, %scheme, id = feature.feature_id(), fill = %fill_color, "Resolved style");
        Style {
            fill_color,
            ..base.clone()
        }
    }

    pub fn highlight(&self, style: &Style) -> Style {
        self.config.highlight.apply(style)
    }

    pub fn selection(&self, style: &Style) -> Style {
        self.config.selection.apply(style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thaimap_data::test_data::sample_collection;

    fn provinces() -> thaimap_data::FeatureCollection {
        sample_collection(AdminLevel::Provinces).unwrap()
    }

    fn fill(resolver: &StyleResolver, feature: &Feature, scheme: ColorScheme) -> String {
        resolver
            .style_for(feature, AdminLevel::Provinces, scheme)
            .fill_color
    }

    #[test]
    fn test_color_scheme_parsing() {
        assert_eq!(
            "by-region".parse::<ColorScheme>().unwrap(),
            ColorScheme::ByRegion
        );
        assert_eq!(
            "by-area".parse::<ColorScheme>().unwrap(),
            ColorScheme::ByArea
        );
        assert_eq!(ColorScheme::Custom.to_string(), "custom");
        assert!(matches!(
            "rainbow".parse::<ColorScheme>(),
            Err(StyleError::UnknownScheme(_))
        ));
    }

    #[test]
    fn test_hsl_to_hex() {
        assert_eq!(hsl_to_hex(240.0, 70.0, 50.0), "#2626d9");
        assert_eq!(hsl_to_hex(0.0, 70.0, 50.0), "#d92626");
        assert_eq!(hsl_to_hex(120.0, 100.0, 50.0), "#00ff00");
        assert_eq!(hsl_to_hex(360.0, 0.0, 100.0), "#ffffff");
    }

    #[test]
    fn test_area_gradient_runs_blue_through_green_to_red() {
        let gradient = AreaGradient::default();
        assert_eq!(gradient.color_at(0.0), "#2626d9");
        assert_eq!(gradient.color_at(0.5), "#26d926");
        assert_eq!(gradient.color_at(1.0), "#d92626");
        assert_eq!(gradient.color_at(7.0), "#d92626");
    }

    #[test]
    fn test_monochrome_uses_base_style() {
        let resolver = StyleResolver::default();
        let collection = provinces();
        let feature = &collection.features()[0];
        let style = resolver.style_for(feature, AdminLevel::Provinces, ColorScheme::Monochrome);
        assert_eq!(style, Style::default());
    }

    #[test]
    fn test_region_colors_cycle_in_first_seen_order() {
        let mut resolver = StyleResolver::default();
        let names: Vec<String> = (0..12).map(|i| format!("region {i}")).collect();
        resolver.update_region_colors(&names);

        let colors = resolver.region_colors();
        assert_eq!(colors.len(), 12);
        assert_eq!(colors["region 0"], CATEGORY10[0]);
        assert_eq!(colors["region 9"], CATEGORY10[9]);
        assert_eq!(colors["region 10"], CATEGORY10[0]);
    }

    #[test]
    fn test_region_color_assignment_is_stable() {
        let names = ["ภาคเหนือ", "ภาคกลาง", "ภาคเหนือ", "", "ภาคใต้"];
        let mut resolver = StyleResolver::default();
        resolver.update_region_colors(names);
        let first = resolver.region_colors().clone();
        resolver.update_region_colors(names);

        assert_eq!(&first, resolver.region_colors());
        assert_eq!(
            first.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["ภาคเหนือ", "ภาคกลาง", "ภาคใต้"]
        );
    }

    #[test]
    fn test_by_region_falls_back_to_base_for_unseen_region() {
        let collection = provinces();
        let features = collection.features();
        let mut resolver = StyleResolver::default();
        resolver.update_region_colors(["ภาคกลาง"]);

        let bangkok = fill(&resolver, &features[0], ColorScheme::ByRegion);
        let chiang_mai = fill(&resolver, &features[2], ColorScheme::ByRegion);
        assert_eq!(bangkok, CATEGORY10[0]);
        assert_eq!(chiang_mai, "#3388ff");
    }

    #[test]
    fn test_by_area_gradient_spans_blue_to_red() {
        let collection = provinces();
        let features = collection.features();
        let mut resolver = StyleResolver::default();
        resolver.update_area_range(features.iter().map(|f| &**f));
        assert_eq!(resolver.area_range(), Some((622.303, 20107.057)));

        let smallest = fill(&resolver, &features[1], ColorScheme::ByArea);
        let largest = fill(&resolver, &features[2], ColorScheme::ByArea);
        assert_eq!(smallest, "#2626d9");
        assert_eq!(largest, "#d92626");
    }

    #[test]
    fn test_by_area_degenerate_range_uses_default_color() {
        let collection = provinces();
        let bangkok = &collection.features()[0];
        let mut resolver = StyleResolver::default();

        let style = resolver.style_for(bangkok, AdminLevel::Provinces, ColorScheme::ByArea);
        assert_eq!(style.fill_color, "#cccccc");

        resolver.update_area_range([&**bangkok]);
        assert_eq!(resolver.area_range(), Some((1568.737, 1568.737)));
        let style = resolver.style_for(bangkok, AdminLevel::Provinces, ColorScheme::ByArea);
        assert_eq!(style.fill_color, "#cccccc");
    }

    #[test]
    fn test_custom_colors() {
        let collection = provinces();
        let features = collection.features();
        let mut resolver = StyleResolver::default();
        resolver.set_custom_color("10", "#abc").unwrap();

        let bangkok = fill(&resolver, &features[0], ColorScheme::Custom);
        let nonthaburi = fill(&resolver, &features[1], ColorScheme::Custom);
        assert_eq!(bangkok, "#abc");
        assert_eq!(nonthaburi, "#3388ff");

        assert!(matches!(
            resolver.set_custom_color("12", "red"),
            Err(StyleError::InvalidColor(_))
        ));
        assert!(resolver.set_custom_color("12", "#12345").is_err());

        resolver.clear_custom_colors();
        assert_eq!(resolver.custom_color("10"), None);
    }

    #[test]
    fn test_highlight_and_selection_only_touch_stroke() {
        let resolver = StyleResolver::default();
        let collection = provinces();
        let bangkok = &collection.features()[0];
        let style = resolver.style_for(bangkok, AdminLevel::Provinces, ColorScheme::Monochrome);

        let highlighted = resolver.highlight(&style);
        assert_eq!(highlighted.fill_color, style.fill_color);
        assert_eq!(highlighted.stroke_weight, 3.0);

        let selected = resolver.selection(&style);
        assert_eq!(selected.stroke_weight, 4.0);
        assert_eq!(selected.stroke_color, "#ff3300");
        // Overrides are transient; the computed style is unchanged.
        assert_eq!(style.stroke_weight, 1.0);
    }

    #[test]
    fn test_style_serializes_camel_case() {
        let json = serde_json::to_value(Style::default()).unwrap();
        assert_eq!(json["fillColor"], "#3388ff");
        assert!(json.get("strokeWeight").is_some());
    }

    #[test]
    fn test_default_config_is_valid() {
        StyleConfig::default().validate().unwrap();
        let mut config = StyleConfig::default();
        config.palette.push("teal".to_string());
        assert!(config.validate().is_err());
    }
}
