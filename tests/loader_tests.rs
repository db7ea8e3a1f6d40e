use pssm_rs::error::PssmError;
use pssm_rs::export::WEEDER_EVALUE;
use pssm_rs::loader::{self, make_pssm, EValue, PssmRecord, SiteCount};
use pssm_rs::types::{DeNovoMethod, PermutedPValue, PssmCollection};
use pssm_rs::Pssm;

#[test]
fn test_load_pssms() {
    let json = r#"{"m1": {"name":"m1","nsites":5,"evalue":0.001,"matrix":[[0.25,0.25,0.25,0.25]],"genes":["g1"]}}"#;
    let pssms = loader::load_pssms(json.as_bytes()).unwrap();

    assert_eq!(pssms.len(), 1);
    let pssm = &pssms["m1"];
    assert_eq!(pssm.name(), "m1");
    assert_eq!(pssm.nsites(), 5);
    assert_eq!(pssm.evalue(), 0.001);
    assert_eq!(pssm.width(), 1);
    assert_eq!(pssm.genes(), ["g1"]);
    assert_eq!(pssm.method(), &DeNovoMethod::Meme);
    assert!(pssm.matches().is_none());
    assert!(pssm.permuted_p_value().is_none());
}

#[test]
fn test_load_pssms_json() {
    let pssms = loader::load_pssms_json("tests/data/pssms.json").unwrap();
    assert_eq!(pssms.len(), 2);

    let meme = &pssms["bicluster_1_motif1_meme"];
    assert_eq!(meme.width(), 3);
    assert_eq!(meme.nsites(), 2);

    // gene-list site count and textual e-value are normalized
    let weeder = &pssms["bicluster_1_motif2_weeder"];
    assert_eq!(weeder.method(), &DeNovoMethod::Weeder);
    assert_eq!(weeder.nsites(), 3);
    assert_eq!(weeder.evalue(), 1e-5);
    assert_eq!(weeder.matches().unwrap()[0].factor, "GCN4");
    assert_eq!(
        weeder.permuted_p_value(),
        Some(&PermutedPValue::Scalar(0.013))
    );

    let result = loader::load_pssms_json("tests/data/nonexistent.json");
    assert!(matches!(result, Err(PssmError::Io(_))));
}

#[test]
fn test_load_pssms_malformed() {
    let json = r#"{"m1": {"name":"m1","nsites":1,"evalue":0.1,"matrix":[[0.5,0.5,0.0]],"genes":["g1"]}}"#;
    let result = loader::load_pssms(json.as_bytes());
    assert!(matches!(result, Err(PssmError::InvalidRow { row: 1, .. })));

    let json = r#"{"m1": {"name":"m1","nsites":1,"evalue":"abc","matrix":[[0.25,0.25,0.25,0.25]],"genes":["g1"]}}"#;
    let result = loader::load_pssms(json.as_bytes());
    assert!(matches!(result, Err(PssmError::MalformedInput(_))));

    let json = r#"{"m1": {"name":"m1"}}"#;
    let result = loader::load_pssms(json.as_bytes());
    assert!(matches!(result, Err(PssmError::Json(_))));
}

#[test]
fn test_load_pssms_missing_evalue() {
    // weeder reports no e-value, null and absent both fall back to the nominal one
    let json = r#"{
        "w1": {"name":"w1","nsites":1,"evalue":null,"matrix":[[0.25,0.25,0.25,0.25]],"genes":["g1"],"de_novo_method":"weeder"},
        "w2": {"name":"w2","nsites":1,"matrix":[[0.25,0.25,0.25,0.25]],"genes":["g1"],"de_novo_method":"weeder"}
    }"#;
    let pssms = loader::load_pssms(json.as_bytes()).unwrap();
    assert_eq!(pssms["w1"].evalue(), WEEDER_EVALUE);
    assert_eq!(pssms["w2"].evalue(), WEEDER_EVALUE);

    // meme records must carry one
    let json = r#"{"m1": {"name":"m1","nsites":1,"evalue":null,"matrix":[[0.25,0.25,0.25,0.25]],"genes":["g1"]}}"#;
    let result = loader::load_pssms(json.as_bytes());
    assert!(matches!(result, Err(PssmError::MalformedInput(_))));
}

#[test]
fn test_make_pssm() {
    let record = PssmRecord {
        name: "m2".to_string(),
        nsites: SiteCount::Count(2),
        evalue: Some(EValue::Number(0.2)),
        matrix: vec![vec![0.1, 0.1, 0.1, 0.7]],
        genes: vec!["g1".to_string(), "g2".to_string()],
        de_novo_method: DeNovoMethod::from_tag("weeder"),
        matches: vec![],
        expanded_matches: vec![],
        correlated_matches: Default::default(),
        permuted_pvalue: None,
    };
    let pssm = make_pssm(record).unwrap();
    assert_eq!(pssm.name(), "m2");
    assert_eq!(pssm.method(), &DeNovoMethod::Weeder);
    assert_eq!(pssm.matrix(), [[0.1, 0.1, 0.1, 0.7]]);
}

#[test]
fn test_write_pssms_json() {
    let path = "tests/data/pssms_out.json";
    let mut pssm = Pssm::new(
        "m1",
        1,
        0.004,
        vec![[0.7, 0.1, 0.1, 0.1], [0.25, 0.25, 0.25, 0.25]],
        vec!["g1".to_string()],
        DeNovoMethod::Meme,
    )
    .unwrap();
    pssm.add_match("GCN4", 0.9);
    pssm.add_expanded_match("CBF1", "GCN4");
    pssm.add_correlated_match("stress", "MSN2", 0.7, 0.002);
    pssm.set_permuted_p_value(0.01);

    let mut pssms = PssmCollection::new();
    pssms.insert("m1".to_string(), pssm.clone());

    loader::write_pssms_json(path, &pssms).unwrap();
    let loaded = loader::load_pssms_json(path).unwrap();
    assert_eq!(loaded["m1"], pssm);
    assert_eq!(loaded["m1"].correlated_matches("stress").unwrap()[0].factor, "MSN2");
    assert!(loaded["m1"].correlated_matches("all").is_none());

    // clean up
    std::fs::remove_file(path).unwrap();
}
