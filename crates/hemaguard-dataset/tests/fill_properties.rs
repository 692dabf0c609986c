use hemaguard_dataset::{DatasetNormalizer, PreparationOptions, Table, TrainingPreparer};
use proptest::prelude::*;

/// A lab cell as it shows up in exports: a value, a blank, or junk text.
fn raw_cell() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => (1.0f64..20.0).prop_map(|v| format!("{:.2}", v)),
        1 => Just(String::new()),
        1 => Just("n/a".to_string()),
        1 => Just("?".to_string()),
    ]
}

/// A CSV whose first row is fully numeric, so every column has a median.
fn messy_csv(header: &str, width: usize) -> impl Strategy<Value = String> {
    let header = header.to_string();
    prop::collection::vec(prop::collection::vec(raw_cell(), width), 0..12).prop_map(
        move |rows| {
            let mut csv = format!("{}\n", header);
            csv.push_str(&vec!["10.0"; width].join(","));
            csv.push('\n');
            for row in rows {
                csv.push_str(&row.join(","));
                csv.push('\n');
            }
            csv
        },
    )
}

fn assert_complete(table: &Table) -> Result<(), TestCaseError> {
    for name in table.names() {
        let cells = table.column(name).unwrap_or_default();
        for (row, cell) in cells.iter().enumerate() {
            prop_assert!(cell.as_f64().is_some(), "{} row {} is {:?}", name, row, cell);
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn normalize_leaves_no_gaps(csv in messy_csv("HGB,RBC,MCV,RDW,TLC,PCV", 6)) {
        let table = Table::from_reader(csv.as_bytes()).unwrap();
        let out = DatasetNormalizer::default().normalize(table).unwrap();
        assert_complete(&out)?;
    }

    #[test]
    fn prepare_never_rejects_text_cells(csv in messy_csv("HGB,RBC,MCV,RDW,WBC", 5)) {
        let table = Table::from_reader(csv.as_bytes()).unwrap();
        let rows = table.len();
        let preparer = TrainingPreparer::new(
            Default::default(),
            PreparationOptions { inject_signatures: false, ..Default::default() },
        );
        let out = preparer.prepare(table).unwrap();
        prop_assert_eq!(out.len(), rows);
        assert_complete(&out)?;
    }
}
