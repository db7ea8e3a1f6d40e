//! Loading and saving PSSM collections as JSON records
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{PssmError, Result};
use crate::export::WEEDER_EVALUE;
use crate::pssm::Pssm;
use crate::types::*;

/// Site count as stored in a record: a number, or the list of site genes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SiteCount {
    Count(usize),
    Genes(Vec<String>),
}

impl SiteCount {
    pub fn count(&self) -> usize {
        match self {
            SiteCount::Count(n) => *n,
            SiteCount::Genes(genes) => genes.len(),
        }
    }
}

/// E-value as stored in a record, either numeric or its text form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EValue {
    Number(f64),
    Text(String),
}

impl EValue {
    pub fn value(&self) -> Result<f64> {
        match self {
            EValue::Number(v) => Ok(*v),
            EValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| PssmError::malformed(format!("Invalid e-value '{}'", s))),
        }
    }
}

/// Serialized form of a PSSM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PssmRecord {
    pub name: String,
    pub nsites: SiteCount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evalue: Option<EValue>,
    pub matrix: Vec<Vec<f64>>,
    pub genes: Vec<String>,
    #[serde(default)]
    pub de_novo_method: DeNovoMethod,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<Match>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expanded_matches: Vec<ExpandedMatch>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub correlated_matches: BTreeMap<String, Vec<CorrelatedMatch>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permuted_pvalue: Option<PermutedPValue>,
}

impl From<&Pssm> for PssmRecord {
    fn from(pssm: &Pssm) -> Self {
        let correlated_matches = pssm
            .correlated_subsets()
            .filter_map(|subset| {
                pssm.correlated_matches(subset)
                    .map(|m| (subset.to_string(), m.to_vec()))
            })
            .collect();

        PssmRecord {
            name: pssm.name().to_string(),
            nsites: SiteCount::Count(pssm.nsites()),
            evalue: Some(EValue::Number(pssm.evalue())),
            matrix: pssm.matrix().iter().map(|row| row.to_vec()).collect(),
            genes: pssm.genes().to_vec(),
            de_novo_method: pssm.method().clone(),
            matches: pssm.matches().unwrap_or_default().to_vec(),
            expanded_matches: pssm.expanded_matches().unwrap_or_default().to_vec(),
            correlated_matches,
            permuted_pvalue: pssm.permuted_p_value().cloned(),
        }
    }
}

/// E-value of a record, falling back to the nominal weeder value when the
/// method reports none
fn record_evalue(evalue: Option<&EValue>, method: &DeNovoMethod, name: &str) -> Result<f64> {
    match (evalue, method) {
        (Some(evalue), _) => evalue.value(),
        (None, DeNovoMethod::Weeder) => Ok(WEEDER_EVALUE),
        (None, method) => Err(PssmError::malformed(format!(
            "PSSM {} has no e-value, required for method {}",
            name, method
        ))),
    }
}

/// Builds a PSSM from a record, restoring any stored annotations
///
/// A missing or null e-value is accepted for weeder records, which get
/// [`WEEDER_EVALUE`].
///
/// # Errors
/// * `PssmError::InvalidRow` if a matrix row is not 4 valid probabilities
/// * `PssmError::MalformedInput` for an empty matrix, an unparsable e-value,
///   or a missing e-value on a non-weeder record
pub fn make_pssm(record: PssmRecord) -> Result<Pssm> {
    let matrix = record
        .matrix
        .iter()
        .enumerate()
        .map(|(idx, row)| row_from_slice(row, idx + 1))
        .collect::<Result<Matrix>>()?;
    let nsites = record.nsites.count();
    if record.genes.len() != nsites {
        warn!(
            "PSSM {} lists {} genes for {} sites",
            record.name,
            record.genes.len(),
            nsites
        );
    }

    let evalue = record_evalue(record.evalue.as_ref(), &record.de_novo_method, &record.name)?;

    let mut pssm = Pssm::new(
        record.name,
        nsites,
        evalue,
        matrix,
        record.genes,
        record.de_novo_method,
    )?;

    for m in record.matches {
        pssm.add_match(m.factor, m.confidence);
    }
    for m in record.expanded_matches {
        pssm.add_expanded_match(m.factor, m.seed_factor);
    }
    for (subset, matches) in record.correlated_matches {
        for m in matches {
            pssm.add_correlated_match(subset.as_str(), m.factor, m.rho, m.p_value);
        }
    }
    if let Some(value) = record.permuted_pvalue {
        pssm.set_permuted_p_value(value);
    }

    Ok(pssm)
}

/// Reads a JSON object of name -> record into a collection keyed the same way
pub fn load_pssms<R: Read>(reader: R) -> Result<PssmCollection> {
    let records: HashMap<String, PssmRecord> = serde_json::from_reader(reader)?;

    records
        .into_iter()
        .map(|(key, record)| Ok((key, make_pssm(record)?)))
        .collect()
}

/// Loads PSSMs from a JSON file
///
/// # Example
/// ```ignore
/// use pssm_rs::loader::load_pssms_json;
///
/// let pssms = load_pssms_json("path/to/pssms.json").unwrap();
/// for (name, pssm) in &pssms {
///     println!("{}: width {}", name, pssm.width());
/// }
/// ```
pub fn load_pssms_json(filename: impl AsRef<Path>) -> Result<PssmCollection> {
    let file = File::open(filename.as_ref())?;
    let pssms = load_pssms(BufReader::new(file))?;
    debug!(
        "loaded {} PSSMs from {}",
        pssms.len(),
        filename.as_ref().display()
    );
    Ok(pssms)
}

/// Writes a collection as a JSON object of name -> record, sorted by name
pub fn write_pssms<W: Write>(writer: W, pssms: &PssmCollection) -> Result<()> {
    let records: BTreeMap<&str, PssmRecord> = pssms
        .iter()
        .map(|(key, pssm)| (key.as_str(), PssmRecord::from(pssm)))
        .collect();
    serde_json::to_writer_pretty(writer, &records)?;
    Ok(())
}

pub fn write_pssms_json(filename: impl AsRef<Path>, pssms: &PssmCollection) -> Result<()> {
    let mut writer = BufWriter::new(File::create(filename)?);
    write_pssms(&mut writer, pssms)?;
    writer.flush()?;
    Ok(())
}
