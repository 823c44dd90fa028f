use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::DietaryOptions;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Restaurant search request
///
/// `min_hygiene` stays a raw string: it is resolved against the hygiene scale
/// when the query is built, so an unknown label narrows the results instead of
/// failing the request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub cuisine_types: Option<Vec<String>>,
    #[validate(range(min = 0.0, max = 5.0))]
    #[serde(default)]
    pub min_rating: Option<f64>,
    #[validate(range(min = 0.0, max = 10.0))]
    #[serde(default)]
    pub min_quality: Option<f64>,
    #[serde(default)]
    pub min_hygiene: Option<String>,
    #[serde(default)]
    pub dietary_preferences: Option<DietaryOptions>,
    #[serde(default)]
    pub location: Option<String>,
    #[validate(range(min = 1))]
    #[serde(default = "default_page")]
    pub page: u32,
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            query: None,
            cuisine_types: None,
            min_rating: None,
            min_quality: None,
            min_hygiene: None,
            dietary_preferences: None,
            location: None,
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl SearchRequest {
    /// Free text, or `None` when missing or blank
    pub fn query_text(&self) -> Option<&str> {
        non_blank(self.query.as_deref())
    }

    pub fn location_text(&self) -> Option<&str> {
        non_blank(self.location.as_deref())
    }

    /// Hygiene threshold label; a blank label counts as no threshold
    pub fn min_hygiene_text(&self) -> Option<&str> {
        non_blank(self.min_hygiene.as_deref())
    }

    pub fn cuisines(&self) -> Option<&[String]> {
        self.cuisine_types
            .as_deref()
            .filter(|cuisines| !cuisines.is_empty())
    }

    /// Offset of the first hit on the requested page
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}
