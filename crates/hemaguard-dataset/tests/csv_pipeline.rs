use std::io::Write;

use hemaguard_contracts::markers;
use hemaguard_dataset::{DatasetNormalizer, PreparationOptions, Table, TrainingPreparer};
use hemaguard_rules::Labeler;

const EXPORT: &str = "\
Unnamed: 0,HGB,RBC,MCV,MCH,MCHC,RDW,PCV,TLC,PLT /mm3,Sex
0,9.8,4.6,64,21,31,17.5,30,7200,310000,F
1,14.1,5.1,90,29,33,13.1,42,6800,250000,M
2,12.2,4.3,82,28,33,14.6,37,5400,220000,female
";

#[test]
fn normalize_file_round_trip() {
    let mut input = tempfile::NamedTempFile::new().unwrap();
    input.write_all(EXPORT.as_bytes()).unwrap();
    let output = tempfile::NamedTempFile::new().unwrap();

    let table = Table::read_csv(input.path()).unwrap();
    let normalized = DatasetNormalizer::default().normalize(table).unwrap();
    normalized.write_csv(output.path()).unwrap();

    let reloaded = Table::read_csv(output.path()).unwrap();
    assert_eq!(reloaded.len(), 3);
    assert_eq!(
        reloaded.numeric(markers::TARGET).unwrap(),
        vec![Some(1.0), Some(0.0), Some(0.0)]
    );
    assert_eq!(reloaded.numeric(markers::WBC).unwrap()[1], Some(6800.0));
    // Row records carry the canonical markers the live path expects.
    let record = reloaded.record(0);
    for name in markers::CORE_MARKERS {
        assert!(record.get(name).is_some(), "{name} missing from row record");
    }
}

#[test]
fn prepare_then_write() {
    let table = Table::from_reader(EXPORT.as_bytes()).unwrap();
    let prepared = TrainingPreparer::new(
        Labeler::default(),
        PreparationOptions { inject_signatures: false, ..Default::default() },
    )
    .prepare(table)
    .unwrap();

    assert!(!prepared.has("Unnamed: 0"));
    // The `Sex` column is not renamed during preparation, so gender is
    // unknown and the male threshold applies: 12.2 < 13.0.
    assert_eq!(
        prepared.numeric(markers::TARGET).unwrap(),
        vec![Some(1.0), Some(0.0), Some(1.0)]
    );

    let mut out = Vec::new();
    prepared.to_writer(&mut out).unwrap();
    let header = String::from_utf8(out).unwrap().lines().next().unwrap().to_string();
    for name in [markers::IS_SMOKER, markers::IS_ATHLETE, markers::RISK_SCORE, markers::IS_EMERGENCY] {
        assert!(header.contains(name), "header lacks {name}: {header}");
    }
}
