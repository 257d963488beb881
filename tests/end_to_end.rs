use cgpa_predictor::app::pipeline::{Predictor, run_generate, run_train};
use cgpa_predictor::domain::{Feature, GenerateConfig, StudentInputs, TrainConfig, TreeParams};
use cgpa_predictor::io::read_artifact;

fn generate_and_train(dir: &std::path::Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let data = dir.join("data").join("students.csv");
    let model = dir.join("model").join("model.json");

    run_generate(&GenerateConfig {
        count: 300,
        seed: 42,
        output: data.clone(),
    })
    .unwrap();

    run_train(&TrainConfig {
        data_path: data.clone(),
        output: model.clone(),
        n_estimators: 20,
        seed: 42,
        test_fraction: 0.2,
        tree: TreeParams::default(),
    })
    .unwrap();

    (data, model)
}

#[test]
fn generate_train_predict_explain() {
    let dir = tempfile::tempdir().unwrap();
    let (data, model) = generate_and_train(dir.path());

    let predictor = Predictor::load(&model, Some(&data)).unwrap();
    assert_eq!(predictor.feature_order(), Feature::ALL.as_slice());

    let inputs = StudentInputs {
        g1: 3.5,
        g2: 3.8,
        failures: 0,
        absences: 2,
        studytime: 3,
        health: 4,
        goout: 3,
        higher: true,
        activities: true,
    };
    let p = predictor.predict(&inputs, true).unwrap();
    assert!(p.raw.is_finite());
    assert!((0.0..=5.0).contains(&p.cgpa));
    assert!(!p.tier.label().is_empty());

    // Same inputs, same artifact, same answer.
    assert_eq!(predictor.predict(&inputs, true).unwrap(), p);

    let e = p.explanation.unwrap();
    assert_eq!(e.attributions.len(), 9);
    assert!((e.reconstructed() - p.raw).abs() < 1e-9);
    assert_eq!(e.top_contributors(3).len(), 3);
}

#[test]
fn missing_artifact_stops_before_any_prediction() {
    let dir = tempfile::tempdir().unwrap();
    let err = Predictor::load(&dir.path().join("model.json"), None).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("not found"));
}

#[test]
fn missing_background_dataset_is_fatal_when_explaining() {
    let dir = tempfile::tempdir().unwrap();
    let (_, model) = generate_and_train(dir.path());

    assert!(Predictor::load(&model, None).is_ok());
    let err = Predictor::load(&model, Some(&dir.path().join("nope.csv"))).unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn artifact_with_unknown_feature_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (_, model) = generate_and_train(dir.path());
    assert!(read_artifact(&model).is_ok());

    let json = std::fs::read_to_string(&model).unwrap();
    let tampered = json.replacen("\"goout\"", "\"partying\"", 1);
    assert_ne!(json, tampered);
    std::fs::write(&model, tampered).unwrap();

    let err = Predictor::load(&model, None).unwrap_err();
    assert_eq!(err.exit_code(), 3);
}
