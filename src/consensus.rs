//! Degenerate consensus strings using IUPAC nucleotide ambiguity codes
use phf::phf_map;
use serde::{Deserialize, Serialize};

use crate::types::{Row, BASES};

/// Two-base codes with their member columns, in candidate order
const TWO_BASE: [(char, [usize; 2]); 6] = [
    ('Y', [1, 3]),
    ('R', [0, 2]),
    ('W', [0, 3]),
    ('S', [1, 2]),
    ('K', [2, 3]),
    ('M', [0, 1]),
];

/// Three-base codes with their member columns, in candidate order
const THREE_BASE: [(char, [usize; 3]); 4] = [
    ('V', [0, 1, 2]),
    ('H', [0, 1, 3]),
    ('D', [0, 2, 3]),
    ('B', [1, 2, 3]),
];

static IUPAC: phf::Map<char, &'static str> = phf_map! {
    'A' => "A",
    'C' => "C",
    'G' => "G",
    'T' => "T",
    'Y' => "CT",
    'R' => "AG",
    'W' => "AT",
    'S' => "CG",
    'K' => "GT",
    'M' => "AC",
    'V' => "ACG",
    'H' => "ACT",
    'D' => "AGT",
    'B' => "CGT",
    'N' => "ACGT",
};

/// Thresholds for calling a consensus letter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsensusParams {
    /// Minimum probability for a single base call
    pub lim1: f64,
    /// Value a two- or three-base sum must exceed
    pub lim2: f64,
    /// Try three-base codes when no pair exceeds `lim2`
    pub three_base: bool,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        ConsensusParams {
            lim1: 0.6,
            lim2: 0.8,
            three_base: false,
        }
    }
}

/// Bases covered by an ambiguity code, e.g. `'M'` -> `"AC"`
pub fn ambiguity_bases(code: char) -> Option<&'static str> {
    IUPAC.get(&code.to_ascii_uppercase()).copied()
}

/// Largest candidate sum above `current`; ties keep the earlier candidate
fn best_code<const N: usize>(
    row: &Row,
    candidates: &[(char, [usize; N])],
    mut current: (char, f64),
) -> (char, f64) {
    for (code, members) in candidates {
        let sum: f64 = members.iter().map(|&i| row[i]).sum();
        if sum > current.1 {
            current = (*code, sum);
        }
    }
    current
}

/// Returns the consensus letter for one motif column.
///
/// # Precedence
/// 1. The first base in A, C, G, T order with probability `>= lim1`
/// 2. The best two-base code whose sum exceeds `lim2`
/// 3. With `three_base`, the best three-base code exceeding `lim2`
/// 4. `'N'`
pub fn column_consensus(row: &Row, params: &ConsensusParams) -> char {
    if let Some(idx) = row.iter().position(|&p| p >= params.lim1) {
        return BASES[idx];
    }

    let mut best = best_code(row, &TWO_BASE, ('N', 0.0));
    if best.1 <= params.lim2 && params.three_base {
        best = best_code(row, &THREE_BASE, best);
    }

    if best.1 > params.lim2 {
        best.0
    } else {
        'N'
    }
}

/// Returns the consensus word for a matrix, one letter per column
pub fn consensus(matrix: &[Row], params: &ConsensusParams) -> String {
    matrix
        .iter()
        .map(|row| column_consensus(row, params))
        .collect()
}
