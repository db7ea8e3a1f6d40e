use pssm_rs::error::PssmError;
use pssm_rs::export::{self, Background};
use pssm_rs::meme;
use pssm_rs::types::DeNovoMethod;
use pssm_rs::Pssm;

#[test]
fn test_parse_exported_block() {
    let pssm = Pssm::from_file("tests/data/motif1.csv", "bicluster_7", DeNovoMethod::Meme).unwrap();
    let text = pssm.to_meme(&Background::default()).unwrap();

    let parsed = meme::parse_meme(text.as_bytes()).unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].name(), pssm.name());
    assert_eq!(parsed[0].width(), pssm.width());
    assert_eq!(parsed[0].nsites(), 3);
    assert_eq!(parsed[0].evalue(), 0.00042);
    assert_eq!(parsed[0].matrix(), pssm.matrix());
}

#[test]
fn test_read_meme_file() {
    let path = "tests/data/motifs_out.meme";
    let first = Pssm::from_file("tests/data/motif1.csv", "bicluster_7", DeNovoMethod::Meme).unwrap();
    let second =
        Pssm::from_file("tests/data/motif2.meme.csv", "bicluster_7", DeNovoMethod::Weeder).unwrap();
    let document = export::meme_document([&first, &second], &Background::default()).unwrap();
    std::fs::write(path, document).unwrap();

    let pssms = meme::read_meme_file(path).unwrap();
    assert_eq!(pssms.len(), 2);
    assert_eq!(pssms["bicluster_7_motif1_meme"].width(), 5);

    // weeder motifs are reported with the fixed e-value
    let weeder = &pssms["bicluster_7_motif2_weeder"];
    assert_eq!(weeder.evalue(), 0.05);
    assert_eq!(weeder.nsites(), 2);
    assert_eq!(weeder.matrix()[1], [0.9, 0.0, 0.1, 0.0]);

    // clean up
    std::fs::remove_file(path).unwrap();

    // test file does not exist
    let result = meme::read_meme_file("tests/data/nonexistent.meme");
    assert!(result.is_err());
}

#[test]
fn test_parse_meme_errors() {
    let text = "MOTIF m1\nletter-probability matrix: alength= 4 w= 2 nsites= 1 E= 0.1\n 0.25  0.25  0.25  0.25\n\n";
    let result = meme::parse_meme(text.as_bytes());
    assert!(matches!(result, Err(PssmError::MalformedInput(_))));

    let text = "MOTIF m1\nMOTIF m2\n";
    let result = meme::parse_meme(text.as_bytes());
    assert!(matches!(result, Err(PssmError::MalformedInput(_))));

    let text = "MOTIF m1\nletter-probability matrix: alength= 4 w= 1\n 0.5  0.5\n";
    let result = meme::parse_meme(text.as_bytes());
    assert!(matches!(result, Err(PssmError::InvalidRow { row: 1, .. })));

    assert!(meme::parse_meme("".as_bytes()).unwrap().is_empty());
}

#[test]
fn test_parse_meme_read_error() {
    // invalid UTF-8 before the first motif is reported, not skipped
    let text: &[u8] = b"MEME version 3.0\n\xff\xfe\nMOTIF m1\nletter-probability matrix: alength= 4 w= 1\n 0.25  0.25  0.25  0.25\n";
    let result = meme::parse_meme(text);
    assert!(matches!(result, Err(PssmError::Io(_))));
}
