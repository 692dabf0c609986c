use hemaguard_core::traits::Classifier;
use hemaguard_model::{DecisionTree, ForestArtifact, ForestClassifier, Node};
use proptest::prelude::*;

/// A stump over `feature` with arbitrary leaf probabilities.
fn stump(feature: usize, threshold: f64, low: f64, high: f64) -> DecisionTree {
    DecisionTree {
        nodes: vec![
            Node::Split { feature, threshold, left: 1, right: 2 },
            Node::Leaf { probability: low },
            Node::Leaf { probability: high },
        ],
    }
}

fn features() -> Vec<String> {
    ["HGB", "RBC", "MCV"].iter().map(|s| s.to_string()).collect()
}

proptest! {
    #[test]
    fn probability_stays_in_unit_interval(
        leaves in prop::collection::vec((0usize..3, -50.0f64..50.0, 0.0f64..=1.0, 0.0f64..=1.0), 1..8),
        vector in prop::collection::vec(-100.0f64..100.0, 3),
    ) {
        let trees = leaves.into_iter().map(|(f, t, lo, hi)| stump(f, t, lo, hi)).collect();
        let model = ForestClassifier::from_parts(
            features(),
            ForestArtifact { trees, feature_importances: vec![1.0, 1.0, 1.0] },
        ).unwrap();

        let prediction = model.predict(&vector).unwrap();
        prop_assert!((0.0..=1.0).contains(&prediction.probability));
        prop_assert_eq!(prediction.label.is_anemic(), prediction.probability > 0.5);
    }

    #[test]
    fn importances_always_sum_to_one(
        raw in prop::collection::vec(0.0f64..10.0, 3).prop_filter("not all zero", |v| v.iter().sum::<f64>() > 1e-9),
    ) {
        let model = ForestClassifier::from_parts(
            features(),
            ForestArtifact { trees: vec![stump(0, 12.0, 0.9, 0.1)], feature_importances: raw },
        ).unwrap();

        let total: f64 = model.feature_importances().iter().map(|w| w.weight).sum();
        prop_assert!((total - 1.0).abs() < 1e-9);
        prop_assert!(model.feature_importances().iter().all(|w| w.weight >= 0.0));
    }
}
