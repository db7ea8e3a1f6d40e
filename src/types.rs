use phf::phf_map;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::{PssmError, Result};
use crate::pssm::Pssm;

/// Base order of every matrix row
pub const BASES: [char; 4] = ['A', 'C', 'G', 'T'];

/// One motif column: probabilities for A, C, G and T
pub type Row = [f64; 4];

/// Motif columns in position order, one row per column
pub type Matrix = Vec<Row>;

/// Represents a Position Weight Matrix (PWM)
/// Stored as a DataFrame with columns A, C, G, T
pub type PWM = DataFrame;

/// Collection of PSSMs indexed by name
pub type PssmCollection = HashMap<String, Pssm>;

/// Converts a slice of parsed values into a matrix row.
///
/// `row` is the 1-based position reported on error.
pub fn row_from_slice(values: &[f64], row: usize) -> Result<Row> {
    <Row>::try_from(values).map_err(|_| {
        PssmError::invalid_row(row, format!("expected 4 values, found {}", values.len()))
    })
}

/// The de novo motif discovery tool that produced a matrix.
///
/// Tags that are not recognized are kept as-is; exporting such a PSSM fails
/// with [`PssmError::UnknownMethod`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeNovoMethod {
    #[default]
    Meme,
    Weeder,
    Other(String),
}

static METHODS: phf::Map<&'static str, DeNovoMethod> = phf_map! {
    "meme" => DeNovoMethod::Meme,
    "weeder" => DeNovoMethod::Weeder,
};

impl DeNovoMethod {
    /// Looks up a method tag, preserving unrecognized tags
    pub fn from_tag(tag: &str) -> Self {
        METHODS
            .get(tag)
            .cloned()
            .unwrap_or_else(|| DeNovoMethod::Other(tag.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            DeNovoMethod::Meme => "meme",
            DeNovoMethod::Weeder => "weeder",
            DeNovoMethod::Other(tag) => tag,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, DeNovoMethod::Other(_))
    }
}

impl From<&str> for DeNovoMethod {
    fn from(tag: &str) -> Self {
        DeNovoMethod::from_tag(tag)
    }
}

impl From<String> for DeNovoMethod {
    fn from(tag: String) -> Self {
        DeNovoMethod::from_tag(&tag)
    }
}

impl From<DeNovoMethod> for String {
    fn from(method: DeNovoMethod) -> Self {
        method.as_str().to_string()
    }
}

impl fmt::Display for DeNovoMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A match against a known transcription factor motif
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub factor: String,
    pub confidence: f64,
}

/// A match inherited through a seed factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandedMatch {
    pub factor: String,
    #[serde(rename = "seedFactor")]
    pub seed_factor: String,
}

/// Correlation of a factor with the motif within one subset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelatedMatch {
    pub factor: String,
    pub rho: f64,
    #[serde(rename = "pValue")]
    pub p_value: f64,
}

/// Permutation p-value attached after analysis.
///
/// Depending on the analysis it is a single value, a textual value or a
/// table of values keyed by subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermutedPValue {
    Scalar(f64),
    Text(String),
    Table(BTreeMap<String, f64>),
}

impl From<f64> for PermutedPValue {
    fn from(value: f64) -> Self {
        PermutedPValue::Scalar(value)
    }
}

impl From<&str> for PermutedPValue {
    fn from(value: &str) -> Self {
        PermutedPValue::Text(value.to_string())
    }
}

impl From<BTreeMap<String, f64>> for PermutedPValue {
    fn from(value: BTreeMap<String, f64>) -> Self {
        PermutedPValue::Table(value)
    }
}
