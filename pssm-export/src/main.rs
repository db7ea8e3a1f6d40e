use clap::{Parser, ValueEnum};
use log::info;
use polars::prelude::*;
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use pssm_rs::consensus::ConsensusParams;
use pssm_rs::error::PssmError;
use pssm_rs::export::{self, Background};
use pssm_rs::frame;
use pssm_rs::loader::load_pssms_json;
use pssm_rs::types::{DeNovoMethod, PssmCollection};
use pssm_rs::Pssm;

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("PSSM error: {0}")]
    Pssm(#[from] PssmError),

    #[error("Duplicate PSSM name: {0}")]
    DuplicateName(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// MEME 3 motif file with letter-probability matrices
    Meme,
    /// MAST log-odds matrices
    Mast,
    /// One consensus word per motif
    Consensus,
    /// CSV table of names, statistics and consensus words
    Summary,
}

#[derive(Parser)]
#[command(
    name = "pssm-export",
    about = "Exports position-specific scoring matrices as MEME, MAST, consensus or summary output",
    long_about = "Reads PSSMs from JSON collections or comma-separated PSSM source files \
                  and writes them as a MEME motif file, MAST log-odds matrices, IUPAC \
                  consensus words or a CSV summary table.",
    version,
    after_help = "Example usage:\n    \
                  pssm-export pssms.json --format meme --output motifs.meme\n    \
                  pssm-export motif1.csv motif2.csv --identifier bicluster_7 --method weeder --format mast",
    color = clap::ColorChoice::Always
)]
#[derive(Debug)]
struct Args {
    /// Input files: JSON collections (.json) or PSSM source files
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "meme")]
    format: Format,

    /// Path for output file, standard output if omitted
    /// Will create output directory if it doesn't exist
    #[arg(long)]
    output: Option<String>,

    /// Identifier prefixed to the names of PSSMs read from source files
    #[arg(long, default_value = "pssm")]
    identifier: String,

    /// De novo method that produced the PSSM source files (meme or weeder)
    #[arg(long, default_value = "meme")]
    method: String,

    /// Background frequency of A and T
    #[arg(long, default_value = "0.25")]
    at_freq: f64,

    /// Background frequency of C and G
    #[arg(long, default_value = "0.25")]
    cg_freq: f64,

    /// Minimum probability for a single-base consensus call
    #[arg(long, default_value = "0.6")]
    lim1: f64,

    /// Threshold a two- or three-base sum must exceed
    #[arg(long, default_value = "0.8")]
    lim2: f64,

    /// Allow three-base ambiguity codes in consensus words
    #[arg(long)]
    three_base: bool,
}

fn read_inputs(args: &Args) -> Result<PssmCollection, ExportError> {
    let method = DeNovoMethod::from_tag(&args.method);
    let mut pssms = PssmCollection::new();

    for input in &args.inputs {
        let loaded: Vec<(String, Pssm)> = if input.ends_with(".json") {
            load_pssms_json(input)?.into_iter().collect()
        } else {
            let pssm = Pssm::from_file(input, &args.identifier, method.clone())?;
            vec![(pssm.name().to_string(), pssm)]
        };

        for (name, pssm) in loaded {
            if pssms.contains_key(&name) {
                return Err(ExportError::DuplicateName(name));
            }
            pssms.insert(name, pssm);
        }
    }

    Ok(pssms)
}

fn render(
    pssms: &PssmCollection,
    format: Format,
    background: &Background,
    params: &ConsensusParams,
) -> Result<String, ExportError> {
    let mut names: Vec<&String> = pssms.keys().collect();
    names.sort();

    let text = match format {
        Format::Meme => export::meme_document(names.iter().map(|n| &pssms[*n]), background)?,
        Format::Mast => {
            let blocks = names
                .par_iter()
                .map(|name| pssms[*name].to_mast(background))
                .collect::<Result<Vec<_>, _>>()?;
            blocks.join("\n\n") + "\n"
        }
        Format::Consensus => names
            .par_iter()
            .map(|name| format!("{}\t{}\n", name, pssms[*name].consensus(params)))
            .collect::<Vec<_>>()
            .concat(),
        Format::Summary => {
            let mut df = frame::summary(pssms, params)?;
            let mut buffer = Vec::new();
            CsvWriter::new(&mut buffer).finish(&mut df)?;
            String::from_utf8_lossy(&buffer).into_owned()
        }
    };

    Ok(text)
}

fn main() -> Result<(), ExportError> {
    env_logger::init();
    let start_time = std::time::Instant::now();

    let args = Args::parse();

    let background = Background::new(args.at_freq, args.cg_freq)?;
    let params = ConsensusParams {
        lim1: args.lim1,
        lim2: args.lim2,
        three_base: args.three_base,
    };

    let pssms = read_inputs(&args)?;
    info!("{} PSSMs to export", pssms.len());

    let text = render(&pssms, args.format, &background, &params)?;

    match &args.output {
        Some(output) => {
            // Create output directory if it doesn't exist
            if let Some(parent) = Path::new(output).parent() {
                fs::create_dir_all(parent)?;
            }
            let mut file = File::create(output)?;
            file.write_all(text.as_bytes())?;
            info!("wrote {:?} output to {}", args.format, output);
        }
        None => io::stdout().write_all(text.as_bytes())?,
    }

    let elapsed = start_time.elapsed();
    info!(
        "Total execution time: {:.4} minutes",
        elapsed.as_secs_f64() / 60.0
    );

    Ok(())
}
