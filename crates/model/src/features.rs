//! Canonical feature schema and prediction-time feature mapping
//!
//! The user-facing form exposes a fixed six-field schema, while a trained
//! model may expect raw dataset columns (`GrLivArea`, `OverallQual`, ...).
//! The mapping below reconciles the two: alias lookup, then direct name
//! match, then a fixed derivation formula, and 0.0 for everything else. The
//! result always matches the model schema in order and cardinality.

use serde::{Deserialize, Serialize};

/// The six canonical form-facing fields, in order
pub const CANONICAL_FEATURES: [&str; 6] = [
    "area",
    "bedrooms",
    "bathrooms",
    "floors",
    "year_built",
    "location_score",
];

/// Form field -> model column aliases; first match wins
const FORM_ALIASES: [(&str, &[&str]); 6] = [
    (
        "area",
        &["area", "LotArea", "GrLivArea", "TotalBsmtSF", "1stFlrSF"],
    ),
    ("bedrooms", &["bedrooms", "BedroomAbvGr"]),
    ("bathrooms", &["bathrooms", "FullBath", "HalfBath"]),
    ("floors", &["floors", "2ndFlrSF"]),
    ("year_built", &["year_built", "YearBuilt", "YearRemodAdd"]),
    (
        "location_score",
        &["location_score", "OverallQual", "OverallCond"],
    ),
];

/// Canonical named input for a single prediction
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HouseInput {
    pub area: f64,
    pub bedrooms: f64,
    pub bathrooms: f64,
    #[serde(default = "default_floors")]
    pub floors: f64,
    #[serde(default)]
    pub year_built: Option<f64>,
    #[serde(default)]
    pub location_score: Option<f64>,
}

fn default_floors() -> f64 {
    1.0
}

impl HouseInput {
    /// Value of a canonical field, if present
    fn field(&self, name: &str) -> Option<f64> {
        match name {
            "area" => Some(self.area),
            "bedrooms" => Some(self.bedrooms),
            "bathrooms" => Some(self.bathrooms),
            "floors" => Some(self.floors),
            "year_built" => self.year_built,
            "location_score" => self.location_score,
            _ => None,
        }
    }

    /// Map this input onto a model feature schema, in schema order
    ///
    /// Total over any schema: every column receives a value.
    pub fn map_to_schema(&self, schema: &[String]) -> Vec<f64> {
        schema
            .iter()
            .map(|column| self.resolve_column(column))
            .collect()
    }

    fn resolve_column(&self, column: &str) -> f64 {
        // Tier 1: the column is an alias of a canonical field
        for (form_key, aliases) in FORM_ALIASES {
            if aliases.contains(&column) {
                if let Some(value) = self.field(form_key) {
                    return value;
                }
            }
        }

        // Tier 2: the column names a canonical field directly
        if let Some(value) = self.field(column) {
            return value;
        }

        // Tier 3: fixed derivation formulas
        if column.contains("GrLivArea") || column.contains("TotalBsmtSF") {
            return self.area * 0.8;
        }
        if column.contains("2ndFlrSF") {
            return if self.floors > 1.0 { self.area * 0.3 } else { 0.0 };
        }
        if column.contains("OverallQual") || column.contains("OverallCond") {
            return self.location_score.unwrap_or(5.0) * 10.0;
        }

        0.0
    }
}

/// Prediction input resolved at the API boundary
///
/// Either a canonical named form or a raw positional vector already in the
/// model's schema order.
#[derive(Clone, Debug)]
pub enum PredictInput {
    Named(HouseInput),
    Vector(Vec<f64>),
}
