//! Datamodel van een geotag-antwoord zoals de backend het levert.

use std::collections::{HashMap, HashSet};

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::HighlightPolicy;
use crate::map::GeoPoint;

/// Aantal taxonomie-dimensies (type, geografie, populatie).
pub const DIMENSIONS: usize = 3;

/// Fouten bij het inlezen van een antwoord.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// Het antwoord is geen geldige JSON of heeft de verkeerde vorm.
    #[error("ongeldig geotag-antwoord: {0}")]
    Json(#[from] serde_json::Error),
    /// De toewijzing heeft geen categorie.
    #[error("toewijzing {0} heeft geen categorie")]
    NoCategory(usize),
    /// De toewijzing heeft geen kandidaat-puntenverzameling.
    #[error("toewijzing {0} heeft geen interpretaties")]
    NoInterpretation(usize),
}

/// Volledig antwoord van `GET ./geotag`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeotagResponse {
    #[serde(alias = "response")]
    pub assignments: Vec<Assignment>,
    /// Leesbare namen voor taxonomiecodes, op pad.
    #[serde(default)]
    pub cat_node_text: HashMap<String, String>,
}

/// Eén kandidaat-interpretatie van de ingevoerde tekst.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(deserialize_with = "loose_f64")]
    pub likelihood: f64,
    #[serde(alias = "assignment")]
    pub categories: Vec<Category>,
    #[serde(default, alias = "interpretations")]
    pub cell_interpretations: Vec<Vec<Point>>,
}

impl Assignment {
    /// Alleen de eerste categorie wordt weergegeven.
    pub fn primary_category(&self, index: usize) -> Result<&Category, ResponseError> {
        self.categories
            .first()
            .ok_or(ResponseError::NoCategory(index))
    }

    /// Alleen de eerste puntenverzameling wordt weergegeven.
    pub fn primary_points(&self, index: usize) -> Result<&[Point], ResponseError> {
        self.cell_interpretations
            .first()
            .map(Vec::as_slice)
            .ok_or(ResponseError::NoInterpretation(index))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub category: [String; DIMENSIONS],
    pub stats: CategoryStats,
    #[serde(deserialize_with = "loose_f64")]
    pub normalized_prob: f64,
    /// Beschrijving van de categorie, door de backend opgesteld.
    #[serde(default)]
    pub txt: Option<String>,
}

impl Category {
    /// Korte label: laatste segment van dimensie 0, volledige dimensie 1,
    /// laatste segment van dimensie 2.
    #[must_use]
    pub fn cats_label(&self) -> String {
        format!(
            "{}, {}, {}",
            leaf_segment(&self.category[0]),
            self.category[1],
            leaf_segment(&self.category[2])
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    #[serde(deserialize_with = "loose_f64")]
    pub coverage: f64,
    #[serde(deserialize_with = "loose_f64")]
    pub total: f64,
    #[serde(deserialize_with = "loose_f64")]
    pub ambiguity: f64,
}

/// Kandidaatlocatie voor één ingevoerde plaatsnaam.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub name: String,
    #[serde(deserialize_with = "loose_f64")]
    pub latitude: f64,
    #[serde(deserialize_with = "loose_f64")]
    pub longitude: f64,
    #[serde(default)]
    pub geonameid: Option<i64>,
    #[serde(default)]
    pub official_name: Option<String>,
    #[serde(default, deserialize_with = "loose_opt_f64")]
    pub population: Option<f64>,
    #[serde(default)]
    pub likely: bool,
    #[serde(default)]
    pub prox_likely: bool,
    pub cat: [String; DIMENSIONS],
}

impl Point {
    #[must_use]
    pub fn geo(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    #[must_use]
    pub fn is_highlighted(&self, policy: HighlightPolicy) -> bool {
        match policy {
            HighlightPolicy::Likely => self.likely,
            HighlightPolicy::Proximity => self.prox_likely,
        }
    }

    /// Sleutel die stabiel blijft zolang de naam dezelfde is.
    #[must_use]
    pub fn name_key(&self) -> String {
        self.name.clone()
    }

    fn record_key_base(&self) -> String {
        match self.geonameid {
            Some(id) => format!("{id}:{}", self.name),
            None => format!("?:{}", self.name),
        }
    }
}

/// Unieke sleutel per record. Een record dat meerdere keren voorkomt krijgt
/// een volgnummer achter de basissleutel.
#[must_use]
pub fn record_keys(points: &[Point]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(points.len());
    points
        .iter()
        .map(|point| {
            let base = point.record_key_base();
            let mut key = base.clone();
            let mut n = 1;
            while !seen.insert(key.clone()) {
                key = format!("{base}#{n}");
                n += 1;
            }
            key
        })
        .collect()
}

/// Laatste `|`-gescheiden segment van een code.
#[must_use]
pub fn leaf_segment(code: &str) -> &str {
    code.rsplit('|').next().unwrap_or(code)
}

/// Leest een geotag-antwoord uit JSON-tekst.
pub fn parse_response(input: &str) -> Result<GeotagResponse, ResponseError> {
    let response: GeotagResponse = serde_json::from_str(input)?;
    log::debug!("{} toewijzingen ontvangen", response.assignments.len());
    Ok(response)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Number(f64),
    Text(String),
}

impl LooseNumber {
    fn into_f64<E: de::Error>(self) -> Result<f64, E> {
        match self {
            Self::Number(value) => Ok(value),
            Self::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("`{text}` is geen getal"))),
        }
    }
}

// De backend levert getallen soms als string.
fn loose_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    LooseNumber::deserialize(deserializer)?.into_f64()
}

fn loose_opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Option::<LooseNumber>::deserialize(deserializer)?
        .map(LooseNumber::into_f64)
        .transpose()
}
