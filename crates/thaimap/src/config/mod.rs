use serde::{Deserialize, Serialize};

use crate::{
    error::ThaiMapError,
    geometry::Bounds,
    index::DEFAULT_SEARCH_LIMIT,
    style::{AreaGradient, Style, StyleConfig},
};

/// Thailand's extent, `[[min_lat, min_lng], [max_lat, max_lng]]`.
pub const THAILAND_BOUNDS: [[f64; 2]; 2] = [[5.61, 97.34], [20.46, 105.64]];

/// Runtime settings for a [`DataManager`](crate::DataManager) and its style
/// resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtlasConfig {
    /// Results returned by a plain `search`.
    pub search_limit: usize,
    /// Used by `in_country`.
    pub country_bounds: Bounds,
    pub style: StyleConfig,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            search_limit: DEFAULT_SEARCH_LIMIT,
            country_bounds: Bounds::from_array(THAILAND_BOUNDS),
            style: StyleConfig::default(),
        }
    }
}

/// Builder for [`AtlasConfig`] starting from the defaults.
#[derive(Debug, Clone, Default)]
pub struct AtlasConfigBuilder {
    config: AtlasConfig,
}

impl AtlasConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AtlasConfig::default(),
        }
    }

    /// Set the number of results a plain `search` returns
    pub fn search_limit(mut self, limit: usize) -> Self {
        self.config.search_limit = limit;
        self
    }

    /// Set the country extent used by `in_country`. Corners are
    /// `[[min_lat, min_lng], [max_lat, max_lng]]`.
    pub fn country_bounds(mut self, corners: [[f64; 2]; 2]) -> Result<Self, ThaiMapError> {
        let bounds = Bounds::from_array(corners);
        let ordered = bounds.min.lat <= bounds.max.lat && bounds.min.lng <= bounds.max.lng;
        let finite = corners.iter().flatten().all(|v| v.is_finite());
        if !ordered || !finite {
            return Err(ThaiMapError::ConfigError(format!(
                "country bounds must be finite and ordered min to max, got {corners:?}"
            )));
        }
        self.config.country_bounds = bounds;
        Ok(self)
    }

    /// Replace the region palette. Must hold at least one `#rgb`/`#rrggbb` color.
    pub fn palette<I, S>(mut self, colors: I) -> Result<Self, ThaiMapError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let palette: Vec<String> = colors.into_iter().map(Into::into).collect();
        if palette.is_empty() {
            return Err(ThaiMapError::ConfigError(
                "palette must contain at least one color".to_string(),
            ));
        }
        let previous = std::mem::replace(&mut self.config.style.palette, palette);
        if let Err(e) = self.config.style.validate() {
            self.config.style.palette = previous;
            return Err(e.into());
        }
        Ok(self)
    }

    /// Set the base style used by monochrome and as the fallback fill
    pub fn base_style(mut self, style: Style) -> Result<Self, ThaiMapError> {
        let previous = std::mem::replace(&mut self.config.style.base, style);
        if let Err(e) = self.config.style.validate() {
            self.config.style.base = previous;
            return Err(e.into());
        }
        Ok(self)
    }

    /// Configure the by-area gradient
    pub fn area_gradient(mut self, gradient: AreaGradient) -> Result<Self, ThaiMapError> {
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        if !(gradient.start_hue.is_finite()
            && gradient.end_hue.is_finite()
            && in_range(gradient.saturation)
            && in_range(gradient.lightness))
        {
            return Err(ThaiMapError::ConfigError(format!(
                "area gradient needs finite hues and saturation/lightness within 0..=100, got {gradient:?}"
            )));
        }
        self.config.style.area_gradient = gradient;
        Ok(self)
    }

    /// Build the final configuration
    pub fn build(self) -> AtlasConfig {
        self.config
    }
}
