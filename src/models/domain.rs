use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Food hygiene rating, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HygieneLevel {
    VeryGood,
    Good,
    Acceptable,
    NeedsImprovement,
    Bad,
    VeryBad,
}

impl HygieneLevel {
    /// Every level, best first
    pub const ALL: [HygieneLevel; 6] = [
        HygieneLevel::VeryGood,
        HygieneLevel::Good,
        HygieneLevel::Acceptable,
        HygieneLevel::NeedsImprovement,
        HygieneLevel::Bad,
        HygieneLevel::VeryBad,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HygieneLevel::VeryGood => "very good",
            HygieneLevel::Good => "good",
            HygieneLevel::Acceptable => "acceptable",
            HygieneLevel::NeedsImprovement => "needs improvement",
            HygieneLevel::Bad => "bad",
            HygieneLevel::VeryBad => "very bad",
        }
    }

    /// Levels from the best down to and including `self`
    pub fn at_least_as_good(&self) -> Vec<HygieneLevel> {
        HygieneLevel::ALL
            .iter()
            .copied()
            .filter(|level| level <= self)
            .collect()
    }
}

impl fmt::Display for HygieneLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown hygiene level: {0:?}")]
pub struct UnknownHygieneLevel(pub String);

impl FromStr for HygieneLevel {
    type Err = UnknownHygieneLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        HygieneLevel::ALL
            .iter()
            .copied()
            .find(|level| level.as_str() == normalized)
            .ok_or_else(|| UnknownHygieneLevel(s.to_string()))
    }
}

impl Serialize for HygieneLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HygieneLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Dietary flags in the order filters are emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DietaryFlag {
    Vegetarian,
    Vegan,
    Halal,
    Kosher,
    GlutenFree,
    Jain,
}

impl DietaryFlag {
    pub const ALL: [DietaryFlag; 6] = [
        DietaryFlag::Vegetarian,
        DietaryFlag::Vegan,
        DietaryFlag::Halal,
        DietaryFlag::Kosher,
        DietaryFlag::GlutenFree,
        DietaryFlag::Jain,
    ];

    /// Field name under `dietary_options` in the index
    pub fn field_name(&self) -> &'static str {
        match self {
            DietaryFlag::Vegetarian => "vegetarian",
            DietaryFlag::Vegan => "vegan",
            DietaryFlag::Halal => "halal",
            DietaryFlag::Kosher => "kosher",
            DietaryFlag::GlutenFree => "gluten_free",
            DietaryFlag::Jain => "jain",
        }
    }
}

/// Dietary options of a restaurant, also used as the requested preferences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietaryOptions {
    #[serde(default, deserialize_with = "null_as_default")]
    pub vegetarian: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vegan: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub halal: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub kosher: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gluten_free: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub jain: bool,
}

impl DietaryOptions {
    pub fn get(&self, flag: DietaryFlag) -> bool {
        match flag {
            DietaryFlag::Vegetarian => self.vegetarian,
            DietaryFlag::Vegan => self.vegan,
            DietaryFlag::Halal => self.halal,
            DietaryFlag::Kosher => self.kosher,
            DietaryFlag::GlutenFree => self.gluten_free,
            DietaryFlag::Jain => self.jain,
        }
    }

    /// Flags set to `true`, in `DietaryFlag::ALL` order
    pub fn enabled(&self) -> impl Iterator<Item = DietaryFlag> + '_ {
        DietaryFlag::ALL.into_iter().filter(|flag| self.get(*flag))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub website: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Restaurant document as stored in the search index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contact: Contact,
    pub cuisines: Vec<String>,
    pub dietary_options: DietaryOptions,
    #[serde(default, deserialize_with = "null_as_default")]
    pub certification: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quality: f64,
    pub hygiene: HygieneLevel,
    #[serde(default, alias = "coords", deserialize_with = "complete_coordinates")]
    pub coordinates: Option<Coordinates>,
}

/// Geocoding leaves some documents with a null `lat` or `lng`; those carry no position
fn complete_coordinates<'de, D>(deserializer: D) -> Result<Option<Coordinates>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Partial {
        #[serde(default)]
        lat: Option<f64>,
        #[serde(default)]
        lng: Option<f64>,
    }

    Ok(Option::<Partial>::deserialize(deserializer)?.and_then(|p| match (p.lat, p.lng) {
        (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
        _ => None,
    }))
}

/// Treats an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
