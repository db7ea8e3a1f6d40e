//! MEME letter-probability and MAST log-odds text output
use serde::{Deserialize, Serialize};

use crate::error::{PssmError, Result};
use crate::pssm::Pssm;
use crate::types::{DeNovoMethod, Row};

/// Probability substituted for zero before taking a log-odds score
pub const ZERO_PROBABILITY_FLOOR: f64 = 1e-300;

/// E-value reported for weeder motifs, which carry no significance of their own
pub const WEEDER_EVALUE: f64 = 0.05;

/// Minimum width of a MEME probability field
pub const MEME_FIELD_WIDTH: usize = 8;

/// Minimum width of a MAST score field
pub const MAST_FIELD_WIDTH: usize = 6;

const MEME_DECIMALS: usize = 6;

/// Background base frequencies, one for A/T and one for C/G
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Background {
    pub at: f64,
    pub cg: f64,
}

impl Default for Background {
    fn default() -> Self {
        Background { at: 0.25, cg: 0.25 }
    }
}

impl Background {
    pub fn new(at: f64, cg: f64) -> Result<Self> {
        let background = Background { at, cg };
        background.validate()?;
        Ok(background)
    }

    /// Both frequencies must lie in (0, 1]
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("at", self.at), ("cg", self.cg)] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(PssmError::invalid_parameter(
                    name,
                    value,
                    "background frequency must be in (0, 1]",
                ));
            }
        }
        Ok(())
    }

    /// Frequencies in A, C, G, T order
    pub fn frequencies(&self) -> Row {
        [self.at, self.cg, self.cg, self.at]
    }
}

/// Formats a float the short way: plain decimals for ordinary magnitudes,
/// scientific notation with a two-digit exponent for tiny or huge ones.
///
/// `0.05` -> `"0.05"`, `1.0` -> `"1.0"`, `1e-10` -> `"1e-10"`
pub fn short_float(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let abs = value.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let formatted = format!("{:e}", value);
        return match formatted.split_once('e') {
            Some((mantissa, exp)) => {
                let (sign, digits) = match exp.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exp),
                };
                format!("{}e{}{:0>2}", mantissa, sign, digits)
            }
            None => formatted,
        };
    }

    let formatted = value.to_string();
    if formatted.contains('.') {
        formatted
    } else {
        formatted + ".0"
    }
}

/// Rounds a probability to 6 decimals and right-pads its text with '0'
/// characters to at least 8 characters.
///
/// Rounding is done on the exact stored value, so `0.5414125` (stored just
/// below the tie) gives `"0.541412"`. The padding is textual: `0.25` becomes
/// `"0.250000"`.
pub fn pad_probability(value: f64) -> String {
    // plain decimal notation, never scientific
    let fixed = format!("{:.*}", MEME_DECIMALS, value);
    let mut text = match fixed.split_once('.') {
        Some((int, frac)) => {
            let frac = frac.trim_end_matches('0');
            format!("{}.{}", int, if frac.is_empty() { "0" } else { frac })
        }
        None => fixed + ".0",
    };
    while text.len() < MEME_FIELD_WIDTH {
        text.push('0');
    }
    text
}

/// Integer log2 odds of probability `p` against background frequency `f`.
///
/// Zero probabilities are floored at [`ZERO_PROBABILITY_FLOOR`] so the score
/// is strongly negative instead of undefined.
///
/// # Errors
/// * `PssmError::InvalidParameter` if the score is not finite, e.g. when
///   `p / f` underflows to zero or overflows to infinity
pub fn log_odds(p: f64, f: f64) -> Result<i64> {
    let p = if p == 0.0 { ZERO_PROBABILITY_FLOOR } else { p };
    let score = (p / f).log2().round();
    if !score.is_finite() {
        return Err(PssmError::invalid_parameter(
            "f",
            f,
            format!("log-odds of {} against this frequency is not finite", p),
        ));
    }
    Ok(score as i64)
}

/// [`log_odds`] left-padded with spaces to at least 6 characters; wider
/// scores are written in full
pub fn format_log_odds(p: f64, f: f64) -> Result<String> {
    Ok(format!(
        "{:>width$}",
        log_odds(p, f)?,
        width = MAST_FIELD_WIDTH
    ))
}

/// Site count and E-value to report for the PSSM's discovery method
fn meme_statistics(pssm: &Pssm) -> Result<(usize, f64)> {
    match pssm.method() {
        DeNovoMethod::Meme => Ok((pssm.nsites(), pssm.evalue())),
        DeNovoMethod::Weeder => Ok((pssm.nsites(), WEEDER_EVALUE)),
        DeNovoMethod::Other(tag) => Err(PssmError::UnknownMethod(tag.clone())),
    }
}

/// Returns a MEME 3 formatted letter-probability matrix block.
///
/// # Format
/// ```text
/// MOTIF <name>
/// BL   MOTIF <name> width=0 seqs=0
/// letter-probability matrix: alength= 4 w= <width> nsites= <N> E= <E>
///  0.250000  0.250000  0.250000  0.250000
/// ```
/// The background is accepted for symmetry with [`to_mast`] and does not
/// change the block; [`meme_document`] reports it in the file header.
///
/// # Errors
/// * `PssmError::UnknownMethod` if the discovery method is not meme or weeder
pub fn to_meme(pssm: &Pssm, _background: &Background) -> Result<String> {
    let (nsites, evalue) = meme_statistics(pssm)?;

    let mut lines = Vec::with_capacity(pssm.width() + 3);
    lines.push(format!("MOTIF {}", pssm.name()));
    lines.push(format!("BL   MOTIF {} width=0 seqs=0", pssm.name()));
    lines.push(format!(
        "letter-probability matrix: alength= 4 w= {} nsites= {} E= {}",
        pssm.width(),
        nsites,
        short_float(evalue)
    ));
    for row in pssm.matrix() {
        let fields: Vec<String> = row.iter().map(|&p| pad_probability(p)).collect();
        lines.push(format!(" {}", fields.join("  ")));
    }

    Ok(lines.join("\n"))
}

/// Returns a MAST formatted log-odds matrix block.
///
/// A and T are scored against `background.at`, C and G against `background.cg`.
///
/// # Errors
/// * `PssmError::InvalidParameter` if a background frequency is outside (0, 1]
pub fn to_mast(pssm: &Pssm, background: &Background) -> Result<String> {
    background.validate()?;
    let freqs = background.frequencies();

    let mut lines = Vec::with_capacity(pssm.width() + 1);
    lines.push(format!("log-odds matrix: alength= 4 w= {}", pssm.width()));
    for row in pssm.matrix() {
        let fields = row
            .iter()
            .zip(freqs.iter())
            .map(|(&p, &f)| format_log_odds(p, f))
            .collect::<Result<Vec<_>>>()?;
        lines.push(format!(" {}", fields.join("  ")));
    }

    Ok(lines.join("\n"))
}

/// Writes a complete MEME 3 motif file: version, alphabet, strands and
/// background header followed by one block per PSSM.
pub fn meme_document<'a, I>(pssms: I, background: &Background) -> Result<String>
where
    I: IntoIterator<Item = &'a Pssm>,
{
    background.validate()?;
    let [a, c, g, t] = background.frequencies();

    let mut document = String::from("MEME version 3.0\n\nALPHABET= ACGT\n\nstrands: + -\n\n");
    document.push_str("Background letter frequencies (from dataset with add-one prior applied):\n");
    document.push_str(&format!("A {:.3} C {:.3} G {:.3} T {:.3}\n", a, c, g, t));

    for pssm in pssms {
        document.push('\n');
        document.push_str(&to_meme(pssm, background)?);
        document.push('\n');
    }

    Ok(document)
}
