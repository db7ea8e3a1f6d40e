use polars::prelude::*;
use pssm_rs::consensus::ConsensusParams;
use pssm_rs::error::{PssmError, Result};
use pssm_rs::frame;
use pssm_rs::loader;
use pssm_rs::plot::{plot, LogoRenderer};
use pssm_rs::types::DeNovoMethod;
use pssm_rs::Pssm;
use ndarray::ArrayView2;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

fn motif1() -> Pssm {
    Pssm::from_file("tests/data/motif1.csv", "bicluster_7", DeNovoMethod::Meme).unwrap()
}

#[test]
fn test_to_pwm() {
    let pssm = motif1();
    let pwm = frame::to_pwm(&pssm).unwrap();
    assert_eq!(pwm.height(), 5);
    assert_eq!(pwm.width(), 4);
    let names: Vec<String> = pwm
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(names, ["A", "C", "G", "T"]);

    let back = frame::from_pwm(
        pssm.name(),
        &pwm,
        pssm.nsites(),
        pssm.evalue(),
        pssm.genes().to_vec(),
        DeNovoMethod::Meme,
    )
    .unwrap();
    assert_eq!(back, pssm);
}

#[test]
fn test_from_pwm_errors() {
    let pwm: DataFrame = df!(
        "A" => [0.25, 0.5],
        "C" => [0.25, 0.5],
        "G" => [0.25, 0.0],
    )
    .unwrap();
    let result = frame::from_pwm("m", &pwm, 0, 1.0, vec![], DeNovoMethod::Meme);
    assert!(matches!(result, Err(PssmError::DataError(_))));

    let pwm: DataFrame = df!(
        "A" => [0.25, 0.9],
        "C" => [0.25, 0.5],
        "G" => [0.25, 0.0],
        "T" => [0.25, 0.0],
    )
    .unwrap();
    let result = frame::from_pwm("m", &pwm, 0, 1.0, vec![], DeNovoMethod::Meme);
    assert!(matches!(result, Err(PssmError::InvalidRow { row: 2, .. })));
}

#[test]
fn test_to_array() {
    let pssm = motif1();
    let array = frame::to_array(&pssm);
    assert_eq!(array.shape(), &[5, 4]);
    assert_eq!(array[[1, 0]], 0.45);
    assert_eq!(array[[3, 2]], 1.0);
}

#[test]
fn test_summary() {
    let pssms = loader::load_pssms_json("tests/data/pssms.json").unwrap();
    let df = frame::summary(&pssms, &ConsensusParams::default()).unwrap();
    assert_eq!(df.height(), 2);
    assert_eq!(df.width(), 7);

    let names = df.column("name").unwrap().str().unwrap();
    assert_eq!(names.get(0), Some("bicluster_1_motif1_meme"));
    assert_eq!(names.get(1), Some("bicluster_1_motif2_weeder"));

    let consensus = df.column("consensus").unwrap().str().unwrap();
    assert_eq!(consensus.get(0), Some("AMT"));
    assert_eq!(consensus.get(1), Some("GY"));

    let methods = df.column("method").unwrap().str().unwrap();
    assert_eq!(methods.get(1), Some("weeder"));

    // counts are stored as unsigned 64-bit columns
    let widths = df.column("width").unwrap().u64().unwrap();
    assert_eq!(widths.get(0), Some(3));
    let nsites = df.column("nsites").unwrap().u64().unwrap();
    assert_eq!(nsites.get(1), Some(3));
    let num_genes = df.column("num_genes").unwrap().u64().unwrap();
    assert_eq!(num_genes.get(0), Some(2));
}

struct RecordingRenderer {
    calls: RefCell<Vec<(Vec<usize>, PathBuf)>>,
}

impl LogoRenderer for RecordingRenderer {
    fn render(&self, matrix: ArrayView2<'_, f64>, path: &Path) -> Result<()> {
        self.calls
            .borrow_mut()
            .push((matrix.shape().to_vec(), path.to_path_buf()));
        Ok(())
    }
}

#[test]
fn test_plot() {
    let renderer = RecordingRenderer {
        calls: RefCell::new(Vec::new()),
    };
    plot(&motif1(), &renderer, "logo.png").unwrap();

    let calls = renderer.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, vec![5, 4]);
    assert_eq!(calls[0].1, PathBuf::from("logo.png"));
}
