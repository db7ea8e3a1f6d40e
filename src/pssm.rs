use log::debug;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::consensus::{self, ConsensusParams};
use crate::error::{PssmError, Result};
use crate::export::{self, Background};
use crate::types::*;

/// Allowed deviation of a row's sum from 1.0
pub const ROW_SUM_TOLERANCE: f64 = 0.01;

/// A position-specific scoring matrix discovered for a set of genes.
///
/// Identity, statistics and matrix are fixed at construction; only the
/// annotations (matches, expanded matches, correlated matches and the
/// permuted p-value) change afterwards, and those only grow.
#[derive(Debug, Clone, PartialEq)]
pub struct Pssm {
    name: String,
    nsites: usize,
    evalue: f64,
    matrix: Matrix,
    genes: Vec<String>,
    method: DeNovoMethod,
    matches: Vec<Match>,
    expanded_matches: Vec<ExpandedMatch>,
    correlated_matches: HashMap<String, Vec<CorrelatedMatch>>,
    permuted_p_value: Option<PermutedPValue>,
}

/// Checks that every row holds finite, non-negative probabilities summing to 1
pub fn validate_matrix(matrix: &[Row]) -> Result<()> {
    if matrix.is_empty() {
        return Err(PssmError::malformed("Empty matrix"));
    }

    for (idx, row) in matrix.iter().enumerate() {
        if let Some(value) = row.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(PssmError::invalid_row(
                idx + 1,
                format!("probability {} is not a non-negative number", value),
            ));
        }
        let total: f64 = row.iter().sum();
        if (total - 1.0).abs() > ROW_SUM_TOLERANCE {
            return Err(PssmError::invalid_row(
                idx + 1,
                format!("probabilities sum to {}, expected 1.0", total),
            ));
        }
    }

    Ok(())
}

fn parse_field<T: std::str::FromStr>(field: &str, what: &str, line_no: usize) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    field.trim().parse::<T>().map_err(|e| {
        PssmError::malformed(format!("Invalid {} '{}' on line {}: {}", what, field, line_no, e))
    })
}

impl Pssm {
    /// Builds a PSSM from explicit field values.
    ///
    /// The matrix is validated eagerly; annotations start out empty.
    ///
    /// # Errors
    /// * `PssmError::MalformedInput` if the matrix is empty
    /// * `PssmError::InvalidRow` if a row has negative or non-finite values or
    ///   does not sum to 1.0
    pub fn new(
        name: impl Into<String>,
        nsites: usize,
        evalue: f64,
        matrix: Matrix,
        genes: Vec<String>,
        method: DeNovoMethod,
    ) -> Result<Self> {
        validate_matrix(&matrix)?;

        Ok(Pssm {
            name: name.into(),
            nsites,
            evalue,
            matrix,
            genes,
            method,
            matches: Vec::new(),
            expanded_matches: Vec::new(),
            correlated_matches: HashMap::new(),
            permuted_p_value: None,
        })
    }

    /// Reads a PSSM from a comma-separated source file.
    ///
    /// # Format
    /// * Line 1: `<evalue>,<nsites>`
    /// * Next `nsites` lines: `<gene>,...` (only the first field is used)
    /// * Remaining lines: `<A>,<C>,<G>,<T>`, one per motif column
    ///
    /// The PSSM is named `<identifier>_<file stem>_<method>`, where the stem is
    /// the file name up to its first '.'.
    ///
    /// # Errors
    /// * `PssmError::Io` if the file cannot be read
    /// * `PssmError::MalformedInput` for a bad header, missing gene lines or
    ///   non-numeric matrix values
    /// * `PssmError::InvalidRow` for rows that are not valid distributions
    pub fn from_file(
        path: impl AsRef<Path>,
        identifier: &str,
        method: DeNovoMethod,
    ) -> Result<Self> {
        let path = path.as_ref();
        let stem = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.split('.').next())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                PssmError::malformed(format!("Cannot derive a name from {}", path.display()))
            })?;
        let name = format!("{}_{}_{}", identifier, stem, method);
        debug!(
            "reading PSSM {} from {} ({})",
            identifier,
            path.display(),
            method
        );

        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), name, method)
    }

    /// Parses the comma-separated source format from any buffered reader
    pub fn from_reader<R: BufRead>(
        reader: R,
        name: impl Into<String>,
        method: DeNovoMethod,
    ) -> Result<Self> {
        let mut lines = reader
            .lines()
            .enumerate()
            .map(|(idx, line)| line.map(|l| (idx + 1, l)));

        let (line_no, header) = lines
            .next()
            .transpose()?
            .ok_or_else(|| PssmError::malformed("Empty PSSM file"))?;
        let fields: Vec<&str> = header.trim().split(',').collect();
        if fields.len() < 2 {
            return Err(PssmError::malformed(format!(
                "Expected '<evalue>,<nsites>' on line {}, found '{}'",
                line_no, header
            )));
        }
        let evalue: f64 = parse_field(fields[0], "e-value", line_no)?;
        let nsites: usize = parse_field(fields[1], "site count", line_no)?;

        let mut genes = Vec::with_capacity(nsites);
        while genes.len() < nsites {
            let (line_no, line) = lines.next().transpose()?.ok_or_else(|| {
                PssmError::malformed(format!(
                    "Expected {} gene lines, found {}",
                    nsites,
                    genes.len()
                ))
            })?;
            let gene = line.trim().split(',').next().unwrap_or_default();
            if gene.is_empty() {
                return Err(PssmError::malformed(format!(
                    "Missing gene name on line {}",
                    line_no
                )));
            }
            genes.push(gene.to_string());
        }

        let mut matrix = Matrix::new();
        for line in lines {
            let (line_no, line) = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let values = line
                .split(',')
                .map(|v| parse_field::<f64>(v, "probability", line_no))
                .collect::<Result<Vec<_>>>()?;
            matrix.push(row_from_slice(&values, matrix.len() + 1)?);
        }

        Pssm::new(name, nsites, evalue, matrix, genes, method)
    }

    /// Returns the name of the PSSM
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of sequences the motif was built from
    pub fn nsites(&self) -> usize {
        self.nsites
    }

    pub fn evalue(&self) -> f64 {
        self.evalue
    }

    /// Returns the matrix as is, one row per motif column
    pub fn matrix(&self) -> &[Row] {
        &self.matrix
    }

    /// Motif width, the number of matrix rows
    pub fn width(&self) -> usize {
        self.matrix.len()
    }

    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    pub fn num_genes(&self) -> usize {
        self.genes.len()
    }

    pub fn method(&self) -> &DeNovoMethod {
        &self.method
    }

    pub fn add_match(&mut self, factor: impl Into<String>, confidence: f64) {
        self.matches.push(Match {
            factor: factor.into(),
            confidence,
        });
    }

    /// Known-motif matches in insertion order, `None` if none were added
    pub fn matches(&self) -> Option<&[Match]> {
        non_empty(&self.matches)
    }

    pub fn add_expanded_match(&mut self, factor: impl Into<String>, seed_factor: impl Into<String>) {
        self.expanded_matches.push(ExpandedMatch {
            factor: factor.into(),
            seed_factor: seed_factor.into(),
        });
    }

    pub fn expanded_matches(&self) -> Option<&[ExpandedMatch]> {
        non_empty(&self.expanded_matches)
    }

    /// Appends a correlation result to `subset`, creating its list on first use
    pub fn add_correlated_match(
        &mut self,
        subset: impl Into<String>,
        factor: impl Into<String>,
        rho: f64,
        p_value: f64,
    ) {
        self.correlated_matches
            .entry(subset.into())
            .or_default()
            .push(CorrelatedMatch {
                factor: factor.into(),
                rho,
                p_value,
            });
    }

    /// Correlation results for `subset`, `None` if nothing was added for it
    pub fn correlated_matches(&self, subset: &str) -> Option<&[CorrelatedMatch]> {
        self.correlated_matches
            .get(subset)
            .and_then(|matches| non_empty(matches))
    }

    /// Subsets with at least one correlated match, in no particular order
    pub fn correlated_subsets(&self) -> impl Iterator<Item = &str> {
        self.correlated_matches.keys().map(String::as_str)
    }

    /// Stores the permuted p-value, replacing any previous one
    pub fn set_permuted_p_value(&mut self, value: impl Into<PermutedPValue>) {
        self.permuted_p_value = Some(value.into());
    }

    pub fn permuted_p_value(&self) -> Option<&PermutedPValue> {
        self.permuted_p_value.as_ref()
    }

    /// MEME letter-probability block, see [`export::to_meme`]
    pub fn to_meme(&self, background: &Background) -> Result<String> {
        export::to_meme(self, background)
    }

    /// MAST log-odds block, see [`export::to_mast`]
    pub fn to_mast(&self, background: &Background) -> Result<String> {
        export::to_mast(self, background)
    }

    /// Degenerate consensus string, see [`consensus::consensus`]
    pub fn consensus(&self, params: &ConsensusParams) -> String {
        consensus::consensus(&self.matrix, params)
    }
}

fn non_empty<T>(items: &[T]) -> Option<&[T]> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}
