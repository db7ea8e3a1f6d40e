use ndarray::Array2;
use polars::prelude::*;

use crate::consensus::ConsensusParams;
use crate::error::{PssmError, Result};
use crate::pssm::Pssm;
use crate::types::{DeNovoMethod, Matrix, PssmCollection, BASES, PWM};

/// Converts a PSSM matrix into a PWM DataFrame.
///
/// # Returns
/// * `Result<PWM>` - A DataFrame with one row per motif column and the
///   columns "A", "C", "G", "T"
pub fn to_pwm(pssm: &Pssm) -> Result<PWM> {
    let columns = BASES
        .iter()
        .enumerate()
        .map(|(j, base)| {
            Column::new(
                base.to_string().into(),
                pssm.matrix().iter().map(|row| row[j]).collect::<Vec<f64>>(),
            )
        })
        .collect::<Vec<_>>();

    DataFrame::new(columns).map_err(|e| PssmError::DataError(e.to_string()))
}

/// Builds a PSSM from a PWM DataFrame with "A", "C", "G" and "T" columns
///
/// # Errors
/// * `PssmError::DataError` if a base column is missing or not numeric
/// * `PssmError::InvalidRow` if a row is null or not a valid distribution
pub fn from_pwm(
    name: impl Into<String>,
    pwm: &PWM,
    nsites: usize,
    evalue: f64,
    genes: Vec<String>,
    method: DeNovoMethod,
) -> Result<Pssm> {
    let mut matrix: Matrix = vec![[0.0; 4]; pwm.height()];

    for (j, base) in BASES.iter().enumerate() {
        let series = pwm
            .column(&base.to_string())
            .map_err(|e| PssmError::DataError(e.to_string()))?
            .as_materialized_series()
            .cast(&DataType::Float64)
            .map_err(|e| PssmError::DataError(e.to_string()))?;
        let values = series
            .f64()
            .map_err(|e| PssmError::DataError(e.to_string()))?;

        for (i, value) in values.into_iter().enumerate() {
            matrix[i][j] = value
                .ok_or_else(|| PssmError::invalid_row(i + 1, format!("missing {} value", base)))?;
        }
    }

    Pssm::new(name, nsites, evalue, matrix, genes, method)
}

/// Returns the matrix as a width x 4 array
pub fn to_array(pssm: &Pssm) -> Array2<f64> {
    let matrix = pssm.matrix();
    Array2::from_shape_fn((matrix.len(), BASES.len()), |(i, j)| matrix[i][j])
}

fn count_column(
    entries: &[(&String, &Pssm)],
    column: &str,
    count: fn(&Pssm) -> usize,
) -> Result<Vec<u64>> {
    entries
        .iter()
        .map(|(_, p)| {
            u64::try_from(count(p))
                .map_err(|e| PssmError::DataError(format!("{} of {}: {}", column, p.name(), e)))
        })
        .collect()
}

/// Tabulates a collection, one row per PSSM sorted by name.
///
/// # Returns
/// * `Result<DataFrame>` - Columns "name", "method", "width", "nsites",
///   "num_genes", "evalue" and "consensus"
pub fn summary(pssms: &PssmCollection, params: &ConsensusParams) -> Result<DataFrame> {
    let mut entries: Vec<(&String, &Pssm)> = pssms.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let names: Vec<String> = entries.iter().map(|(name, _)| name.to_string()).collect();
    let methods: Vec<String> = entries
        .iter()
        .map(|(_, p)| p.method().to_string())
        .collect();
    let widths = count_column(&entries, "width", Pssm::width)?;
    let nsites = count_column(&entries, "nsites", Pssm::nsites)?;
    let num_genes = count_column(&entries, "num_genes", Pssm::num_genes)?;
    let evalues: Vec<f64> = entries.iter().map(|(_, p)| p.evalue()).collect();
    let consensus: Vec<String> = entries.iter().map(|(_, p)| p.consensus(params)).collect();

    DataFrame::new(vec![
        Column::new("name".into(), names),
        Column::new("method".into(), methods),
        Column::new("width".into(), widths),
        Column::new("nsites".into(), nsites),
        Column::new("num_genes".into(), num_genes),
        Column::new("evalue".into(), evalues),
        Column::new("consensus".into(), consensus),
    ])
    .map_err(|e| PssmError::DataError(e.to_string()))
}
