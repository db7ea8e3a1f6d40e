use log::debug;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::iter::Peekable;
use std::path::Path;

use crate::error::{PssmError, Result};
use crate::pssm::Pssm;
use crate::types::*;

const MATRIX_HEADER: &str = "letter-probability matrix:";

/// Values of the `key= value` pairs on a letter-probability header line
struct MatrixHeader {
    width: Option<usize>,
    nsites: usize,
    evalue: f64,
}

/// Moves past lines until the next MOTIF line, leaving it unread.
///
/// Returns `false` at end of input; a read error is returned rather than
/// treated as the end.
fn seek_motif<I>(lines: &mut Peekable<I>) -> Result<bool>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    while let Some(line) = lines.peek() {
        match line {
            Ok(l) if l.starts_with("MOTIF") => return Ok(true),
            Ok(_) => {
                lines.next();
            }
            Err(_) => {
                return match lines.next() {
                    Some(Err(e)) => Err(PssmError::Io(e)),
                    _ => Ok(false),
                }
            }
        }
    }
    Ok(false)
}

fn header_value<'a>(tokens: &[&'a str], key: &str) -> Option<&'a str> {
    tokens
        .iter()
        .position(|t| *t == key)
        .and_then(|i| tokens.get(i + 1).copied())
}

fn parse_header(line: &str) -> Result<MatrixHeader> {
    let tokens: Vec<&str> = line[MATRIX_HEADER.len()..].split_whitespace().collect();
    let invalid = |key: &str, value: &str| {
        PssmError::malformed(format!("Invalid {} value '{}' in '{}'", key, value, line))
    };

    let width = match header_value(&tokens, "w=") {
        Some(v) => Some(v.parse::<usize>().map_err(|_| invalid("w=", v))?),
        None => None,
    };
    let nsites = match header_value(&tokens, "nsites=") {
        // MEME writes fractional site counts for some models
        Some(v) => v
            .parse::<f64>()
            .map(|n| n.round() as usize)
            .map_err(|_| invalid("nsites=", v))?,
        None => 0,
    };
    let evalue = match header_value(&tokens, "E=") {
        Some(v) => v.parse::<f64>().map_err(|_| invalid("E=", v))?,
        None => 0.0,
    };

    Ok(MatrixHeader {
        width,
        nsites,
        evalue,
    })
}

/// Parses a single motif block from the iterator
fn parse_motif<I>(lines: &mut Peekable<I>) -> Result<Option<Pssm>>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    let motif_line = match lines.next() {
        Some(Ok(line)) if line.starts_with("MOTIF") => line,
        Some(Err(e)) => return Err(PssmError::Io(e)),
        _ => return Ok(None),
    };

    let name = motif_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| PssmError::malformed("Missing motif name"))?
        .to_string();

    // Skip BL and any other lines up to the matrix header
    let header = loop {
        match lines.next() {
            Some(Ok(line)) => {
                let line = line.trim();
                if line.starts_with(MATRIX_HEADER) {
                    break parse_header(line)?;
                }
                if line.starts_with("MOTIF") {
                    return Err(PssmError::malformed(format!(
                        "Motif {} has no letter-probability matrix",
                        name
                    )));
                }
            }
            Some(Err(e)) => return Err(PssmError::Io(e)),
            None => {
                return Err(PssmError::malformed(format!(
                    "Motif {} has no letter-probability matrix",
                    name
                )))
            }
        }
    };

    let mut matrix = Matrix::new();
    while let Some(Ok(line)) = lines.peek() {
        let trimmed = line.trim();
        if trimmed.is_empty() || !trimmed.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            break;
        }
        let values = trimmed
            .split_whitespace()
            .map(|s| s.parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| PssmError::malformed(format!("Invalid probability in {}: {}", name, e)))?;
        matrix.push(row_from_slice(&values, matrix.len() + 1)?);
        lines.next();

        if header.width == Some(matrix.len()) {
            break;
        }
    }

    if let Some(width) = header.width {
        if width != matrix.len() {
            return Err(PssmError::malformed(format!(
                "Motif {}: header declares w= {} but {} rows were found",
                name,
                width,
                matrix.len()
            )));
        }
    }

    let pssm = Pssm::new(
        name,
        header.nsites,
        header.evalue,
        matrix,
        Vec::new(),
        DeNovoMethod::Meme,
    )?;
    Ok(Some(pssm))
}

/// Parses every letter-probability motif block from MEME formatted text.
///
/// Blocks written by [`crate::export::to_meme`] and complete MEME files are
/// both accepted; lines before the first `MOTIF` are ignored. Motifs come
/// back in file order with method `meme` and no genes.
///
/// # Errors
/// * `PssmError::Io` if reading fails
/// * `PssmError::MalformedInput` for a missing matrix header, unparsable
///   values, or a row count that differs from `w=`
pub fn parse_meme<R: BufRead>(reader: R) -> Result<Vec<Pssm>> {
    let mut lines = reader.lines().peekable();
    let mut pssms = Vec::new();

    while seek_motif(&mut lines)? {
        match parse_motif(&mut lines)? {
            Some(pssm) => pssms.push(pssm),
            None => break,
        }
    }

    Ok(pssms)
}

/// Reads the motifs of a MEME file into a collection keyed by motif name.
///
/// # Errors
/// * Same as [`parse_meme`], and `PssmError::MalformedInput` if the file
///   holds no motifs
pub fn read_meme_file(filename: impl AsRef<Path>) -> Result<PssmCollection> {
    let file = File::open(filename.as_ref())?;
    let pssms = parse_meme(BufReader::new(file))?;

    if pssms.is_empty() {
        return Err(PssmError::malformed("No PSSMs found"));
    }
    debug!(
        "read {} motifs from {}",
        pssms.len(),
        filename.as_ref().display()
    );

    Ok(pssms
        .into_iter()
        .map(|p| (p.name().to_string(), p))
        .collect::<HashMap<_, _>>())
}
