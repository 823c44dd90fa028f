use serde_json::{json, Value};
use crate::models::{DietaryOptions, HygieneLevel};

/// Hygiene levels accepted when the threshold cannot be resolved
pub const FALLBACK_HYGIENE: HygieneLevel = HygieneLevel::Acceptable;

/// Document's cuisines must intersect the requested set
pub fn cuisine_filter(cuisines: &[String]) -> Value {
    json!({ "terms": { "cuisines": cuisines } })
}

/// Inclusive lower bound on a numeric field
pub fn min_range_filter(field: &str, threshold: f64) -> Value {
    json!({ "range": { field: { "gte": threshold } } })
}

/// Resolve a requested hygiene threshold into the accepted levels
///
/// Returns the threshold and every better level. A label that is not on the
/// scale resolves to `[FALLBACK_HYGIENE]` rather than an error.
pub fn acceptable_hygiene_levels(threshold: &str) -> Vec<HygieneLevel> {
    match threshold.parse::<HygieneLevel>() {
        Ok(level) => level.at_least_as_good(),
        Err(e) => {
            tracing::warn!("{}, restricting to {:?}", e, FALLBACK_HYGIENE.as_str());
            vec![FALLBACK_HYGIENE]
        }
    }
}

pub fn hygiene_filter(threshold: &str) -> Value {
    let levels: Vec<&str> = acceptable_hygiene_levels(threshold)
        .iter()
        .map(HygieneLevel::as_str)
        .collect();
    json!({ "terms": { "hygiene": levels } })
}

/// One `term` filter per requested flag; unset flags add nothing
pub fn dietary_filters(preferences: &DietaryOptions) -> Vec<Value> {
    preferences
        .enabled()
        .map(|flag| {
            let field = format!("dietary_options.{}", flag.field_name());
            json!({ "term": { field: true } })
        })
        .collect()
}

/// Every term of the location text must match
pub fn location_filter(location: &str) -> Value {
    json!({ "match": { "location": { "query": location, "operator": "and" } } })
}
