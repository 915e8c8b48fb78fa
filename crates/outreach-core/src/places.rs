//! Location and place records shared by the directory client, the batch
//! search pipeline, and the campaign wizard.
//!
//! Upstream services are loose about JSON types: identifiers arrive as strings
//! or numbers, coordinates and ratings as numbers or numeric strings, and
//! categories as a single string or a list. The types here normalise those
//! shapes at deserialization time so the rest of the workspace never sees them.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A country offered by the directory service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
}

impl Country {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A city with the coordinates used as the search center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub lat: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub lon: f64,
}

impl City {
    /// Center in the `"lat, lon"` form the details endpoint expects.
    pub fn center_loc(&self) -> String {
        format!("{}, {}", self.lat, self.lon)
    }
}

/// Opaque place identifier returned by the nearby-search endpoint.
///
/// Numeric identifiers are kept in their decimal string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawPlaceId", into = "String")]
pub struct PlaceId(String);

impl PlaceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<PlaceId> for String {
    fn from(id: PlaceId) -> Self {
        id.0
    }
}

impl From<&str> for PlaceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPlaceId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawPlaceId> for PlaceId {
    fn from(raw: RawPlaceId) -> Self {
        match raw {
            RawPlaceId::Text(s) => Self(s),
            RawPlaceId::Number(n) => Self(n.to_string()),
        }
    }
}

/// Business category: a single label or a list of labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Category {
    One(String),
    Many(Vec<String>),
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::One(label) => f.write_str(label),
            Category::Many(labels) => f.write_str(&labels.join(", ")),
        }
    }
}

/// Enrichment record returned by the details endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    #[serde(rename = "placeId")]
    pub place_id: PlaceId,
    #[serde(default)]
    pub place_name: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A collected identifier, enriched when the details endpoint knew about it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub place_id: PlaceId,
    pub details: Option<PlaceDetails>,
}

impl SearchResult {
    pub fn identifier_only(place_id: PlaceId) -> Self {
        Self {
            place_id,
            details: None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.details.as_ref()?.place_name.as_deref()
    }

    pub fn phone(&self) -> Option<&str> {
        non_empty(self.details.as_ref()?.phone.as_deref())
    }

    pub fn email(&self) -> Option<&str> {
        non_empty(self.details.as_ref()?.email.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Map every collected identifier through the details lookup.
///
/// Output length and order always match `place_ids`: duplicates are kept and
/// identifiers with no matching record become identifier-only results. When
/// the details list repeats an identifier, the last record wins.
pub fn merge_details(place_ids: &[PlaceId], details: Vec<PlaceDetails>) -> Vec<SearchResult> {
    let lookup: HashMap<PlaceId, PlaceDetails> = details
        .into_iter()
        .map(|d| (d.place_id.clone(), d))
        .collect();

    place_ids
        .iter()
        .map(|id| SearchResult {
            place_id: id.clone(),
            details: lookup.get(id).cloned(),
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom),
    }
}

/// Like [`lenient_f64`] but maps null and unparsable text (e.g. `"N/A"`) to `None`.
fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match Option::<NumberOrText>::deserialize(deserializer)? {
            Some(NumberOrText::Number(n)) => Some(n),
            Some(NumberOrText::Text(s)) => s.trim().parse::<f64>().ok(),
            None => None,
        },
    )
}
