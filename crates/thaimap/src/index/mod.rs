//! Term index over bilingual administrative names and codes.
//!
//! Every feature contributes a handful of normalized terms (Thai name, English
//! name, code, and the names of its parent units). A query first takes the
//! bucket of its exact term and then, if that is not enough, scans every other
//! term for a substring match. Each level has its own term map, so result
//! order does not depend on which level finished loading first.

use std::collections::BTreeMap;
use std::sync::Arc;

use ahash::AHashSet;
use indexmap::IndexMap;
use itertools::Itertools;
use thaimap_data::{AdminLevel, AdminProperties, Feature, FeatureCollection};
use tracing::{debug, instrument, trace, warn};

/// Default cap on returned results.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// One hit in the index: a feature as seen from one of its terms.
#[derive(Debug, Clone)]
pub struct SearchEntry {
    pub feature: Arc<Feature>,
    pub level: AdminLevel,
    pub display_name: String,
    /// Level plus serialized properties; identical for every entry of the
    /// same feature.
    key: Arc<str>,
}

impl SearchEntry {
    pub fn feature_id(&self) -> &str {
        self.feature.feature_id()
    }
}

/// Lowercase and trim. Thai text has no case and passes through unchanged.
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// The raw (not yet normalized) terms a feature is findable by. Empty values
/// are dropped.
pub fn searchable_terms(properties: &AdminProperties) -> Vec<&str> {
    let terms: Vec<&str> = match properties {
        AdminProperties::Province(p) => vec![
            p.province.pro_th.as_str(),
            p.province.pro_en.as_str(),
            p.province.pro_code.as_str(),
        ],
        AdminProperties::District(p) => vec![
            p.district.amp_th.as_str(),
            p.district.amp_en.as_str(),
            p.district.amp_code.as_str(),
            p.province.pro_th.as_str(),
            p.province.pro_en.as_str(),
        ],
        AdminProperties::Subdistrict(p) => vec![
            p.tam_th.as_str(),
            p.tam_en.as_str(),
            p.tam_code.as_str(),
            p.district.amp_th.as_str(),
            p.district.amp_en.as_str(),
            p.province.pro_th.as_str(),
            p.province.pro_en.as_str(),
        ],
        AdminProperties::Region(p) => vec![p.name.as_str()],
    };
    terms.into_iter().filter(|t| !t.trim().is_empty()).collect()
}

fn with_english(th: &str, en: &str) -> String {
    if en.is_empty() {
        th.to_string()
    } else {
        format!("{th} ({en})")
    }
}

/// Human-readable label, e.g. `พระนคร (Phra Nakhon), กรุงเทพมหานคร`.
pub fn display_name(properties: &AdminProperties) -> String {
    match properties {
        AdminProperties::Province(p) => with_english(&p.province.pro_th, &p.province.pro_en),
        AdminProperties::District(p) => format!(
            "{}, {}",
            with_english(&p.district.amp_th, &p.district.amp_en),
            p.province.pro_th
        ),
        AdminProperties::Subdistrict(p) => format!(
            "{}, {}, {}",
            with_english(&p.tam_th, &p.tam_en),
            p.district.amp_th,
            p.province.pro_th
        ),
        AdminProperties::Region(p) => p.name.clone(),
    }
}

fn dedup_key(level: AdminLevel, feature: &Feature) -> Arc<str> {
    match serde_json::to_string(&feature.properties) {
        Ok(json) => format!("{level}:{json}").into(),
        Err(e) => {
            warn!(%level, error = %e, "Could not serialize properties, keying by id");
            format!("{level}#{}", feature.feature_id()).into()
        }
    }
}

/// Per-level term maps, searched in level order (provinces first).
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    levels: BTreeMap<AdminLevel, IndexMap<String, Vec<SearchEntry>>>,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every feature of `collection` under each of its terms.
    #[instrument(
        name = "Index collection",
        skip_all,
        fields(level = %collection.level(), features = collection.len()),
        level = "debug"
    )]
    pub fn add_collection(&mut self, collection: &FeatureCollection) {
        let level = collection.level();
        let terms = self.levels.entry(level).or_default();
        for feature in collection.iter() {
            let key = dedup_key(level, feature);
            let display_name = display_name(&feature.properties);
            for term in searchable_terms(&feature.properties)
                .into_iter()
                .map(normalize_term)
                .unique()
            {
                terms.entry(term).or_default().push(SearchEntry {
                    feature: Arc::clone(feature),
                    level,
                    display_name: display_name.clone(),
                    key: Arc::clone(&key),
                });
            }
        }
        debug!(terms = terms.len(), "Index updated");
    }

    /// Drop every entry of `level`.
    pub fn remove_level(&mut self, level: AdminLevel) {
        self.levels.remove(&level);
    }

    /// Exact matches first, then substring matches, de-duplicated per feature
    /// and capped at `limit`. Within each pass, levels go from provinces to
    /// regions and entries keep their insertion order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchEntry> {
        let term = normalize_term(query);
        if term.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut seen = AHashSet::new();
        let mut results = Vec::new();

        for exact in self.levels.values().filter_map(|terms| terms.get(&term)) {
            extend_unique(&mut results, &mut seen, exact, limit);
        }
        trace!(query = %term, exact = results.len(), "Exact pass done");

        let needle = term.as_str();
        let partial = self.levels.values().flat_map(move |terms| {
            terms
                .iter()
                .filter(move |(candidate, _)| {
                    candidate.as_str() != needle && candidate.contains(needle)
                })
                .map(|(_, entries)| entries)
        });
        for entries in partial {
            if results.len() >= limit {
                break;
            }
            extend_unique(&mut results, &mut seen, entries, limit);
        }

        debug!(query = %term, results = results.len(), "Search complete");
        results
    }

    /// Number of (level, term) buckets.
    pub fn term_count(&self) -> usize {
        self.levels.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.values().all(IndexMap::is_empty)
    }
}

fn extend_unique(
    results: &mut Vec<SearchEntry>,
    seen: &mut AHashSet<Arc<str>>,
    entries: &[SearchEntry],
    limit: usize,
) {
    for entry in entries {
        if results.len() >= limit {
            return;
        }
        if seen.insert(Arc::clone(&entry.key)) {
            results.push(entry.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thaimap_data::test_data::sample_collection;

    fn index_of(levels: &[AdminLevel]) -> SearchIndex {
        let mut index = SearchIndex::new();
        for level in levels {
            index.add_collection(&sample_collection(*level).unwrap());
        }
        index
    }

    fn ids(results: &[SearchEntry]) -> Vec<&str> {
        results.iter().map(SearchEntry::feature_id).collect()
    }

    #[test]
    fn test_normalize_term() {
        assert_eq!(normalize_term("  Bangkok "), "bangkok");
        assert_eq!(normalize_term("กรุงเทพมหานคร"), "กรุงเทพมหานคร");
        assert_eq!(normalize_term("   "), "");
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let index = index_of(&AdminLevel::ALL);
        assert!(index.search("", 20).is_empty());
        assert!(index.search("  ", 20).is_empty());
        assert!(index.search("bangkok", 0).is_empty());
    }

    #[test]
    fn test_single_province_found_by_any_term() {
        let index = index_of(&[AdminLevel::Provinces]);
        for query in ["bangkok", "BANGKOK", "กรุงเทพ", "กรุงเทพมหานคร", "10"] {
            let results = index.search(query, DEFAULT_SEARCH_LIMIT);
            assert_eq!(ids(&results), vec!["10"], "query {query:?}");
            assert_eq!(results[0].level, AdminLevel::Provinces);
        }
    }

    #[test]
    fn test_feature_matching_two_terms_appears_once() {
        let index = index_of(&[AdminLevel::Districts]);
        // Exact on the province name, substring on "เมืองเชียงใหม่".
        let results = index.search("เชียงใหม่", DEFAULT_SEARCH_LIMIT);
        assert_eq!(ids(&results), vec!["5001"]);

        let results = index.search("chiang mai", DEFAULT_SEARCH_LIMIT);
        assert_eq!(ids(&results), vec!["5001"]);
    }

    #[test]
    fn test_exact_matches_precede_partial_matches() {
        let index = index_of(&AdminLevel::ALL);
        let results = index.search("nonthaburi", DEFAULT_SEARCH_LIMIT);
        assert_eq!(ids(&results), vec!["12", "1201", "120101"]);

        let first = index.search("chiang mai", 1);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].level, AdminLevel::Provinces);
    }

    #[test]
    fn test_partial_matches_keep_level_and_insertion_order() {
        let index = index_of(&AdminLevel::ALL);
        let results = index.search("mueang", DEFAULT_SEARCH_LIMIT);
        assert_eq!(ids(&results), vec!["1201", "5001", "120101", "500101"]);

        let capped = index.search("mueang", 2);
        assert_eq!(ids(&capped), vec!["1201", "5001"]);
    }

    #[test]
    fn test_region_names_match_per_level() {
        let index = index_of(&AdminLevel::ALL);
        let results = index.search("ภาคเหนือ", DEFAULT_SEARCH_LIMIT);
        let levels: Vec<_> = results.iter().map(|r| r.level).collect();
        assert_eq!(
            levels,
            vec![AdminLevel::RegionRoyin, AdminLevel::RegionNesdb]
        );
    }

    #[test]
    fn test_identical_region_features_are_deduplicated() {
        let mut index = index_of(&[AdminLevel::RegionRoyin]);
        index.add_collection(&sample_collection(AdminLevel::RegionRoyin).unwrap());
        assert_eq!(index.search("ภาคกลาง", DEFAULT_SEARCH_LIMIT).len(), 1);
    }

    #[test]
    fn test_remove_level_drops_its_entries() {
        let mut index = index_of(&[AdminLevel::Provinces, AdminLevel::Districts]);
        let before = index.term_count();
        index.remove_level(AdminLevel::Districts);

        assert!(index.term_count() < before);
        let districts = index.search("phra nakhon", DEFAULT_SEARCH_LIMIT);
        assert!(districts.is_empty());
        let provinces = index.search("bangkok", DEFAULT_SEARCH_LIMIT);
        assert_eq!(ids(&provinces), vec!["10"]);

        index.remove_level(AdminLevel::Provinces);
        assert!(index.is_empty());
    }

    #[test]
    fn test_display_names() {
        let provinces = sample_collection(AdminLevel::Provinces).unwrap();
        let districts = sample_collection(AdminLevel::Districts).unwrap();
        let subdistricts = sample_collection(AdminLevel::Subdistricts).unwrap();
        let regions = sample_collection(AdminLevel::RegionNesdb).unwrap();

        assert_eq!(
            display_name(&provinces.features()[0].properties),
            "กรุงเทพมหานคร (Bangkok)"
        );
        assert_eq!(
            display_name(&districts.features()[0].properties),
            "พระนคร (Phra Nakhon), กรุงเทพมหานคร"
        );
        assert_eq!(
            display_name(&subdistricts.features()[1].properties),
            "สวนใหญ่ (Suan Yai), เมืองนนทบุรี, นนทบุรี"
        );
        assert_eq!(
            display_name(&regions.features()[0].properties),
            "กรุงเทพฯและปริมณฑล"
        );
    }

    #[test]
    fn test_missing_english_name_is_omitted_from_display() {
        let props = AdminProperties::from_raw(
            AdminLevel::Provinces,
            serde_json::json!({"pro_code": "99", "pro_th": "ทดสอบ"})
                .as_object()
                .unwrap(),
        );
        assert_eq!(display_name(&props), "ทดสอบ");
        assert_eq!(searchable_terms(&props), vec!["ทดสอบ", "99"]);
    }
}
