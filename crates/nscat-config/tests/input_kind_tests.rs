mod common;

use common::{hydrogens, static_trajectory};
use nscat_config::{ConfiguratorKind, Settings, SetupContext};
use serde_json::{json, Value};

#[test]
fn input_file_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.txt");
    std::fs::write(&path, "payload").unwrap();

    let settings = Settings::new().with("file", ConfiguratorKind::InputFile, Value::Null);
    let config = settings
        .configure(&json!({"file": path.to_str().unwrap()}), &SetupContext::new())
        .unwrap();
    assert!(config.is_valid());
    assert_eq!(config.input_file("file").unwrap().filename, "data.txt");

    let config = settings
        .configure(&json!({"file": "/no/such/file.txt"}), &SetupContext::new())
        .unwrap();
    assert!(!config.is_valid());
}

#[test]
fn input_directory_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let settings = Settings::new().with("dir", ConfiguratorKind::InputDirectory, Value::Null);
    let config = settings
        .configure(&json!({"dir": nested.to_str().unwrap()}), &SetupContext::new())
        .unwrap();
    assert!(config.is_valid(), "{}", config.report());
    assert!(nested.is_dir());
}

#[test]
fn results_file_requires_its_datasets() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.json");
    std::fs::write(
        &path,
        serde_json::to_string(&json!({
            "info": {"job": "density"},
            "variables": {
                "time": {"units": "ps", "data": [0.0, 1.0]},
                "atomic_density": {"units": "1/cm3", "data": [4.0, 4.0]}
            }
        }))
        .unwrap(),
    )
    .unwrap();

    let settings = Settings::new().with(
        "results",
        ConfiguratorKind::ResultsFile,
        json!({"datasets": ["time", "atomic_density"]}),
    );
    let config = settings
        .configure(&json!({"results": path.to_str().unwrap()}), &SetupContext::new())
        .unwrap();
    assert!(config.is_valid(), "{}", config.report());
    let results = config.results_file("results").unwrap();
    assert_eq!(results.datasets["time"].1, "ps");
    assert_eq!(results.datasets["atomic_density"].0, json!([4.0, 4.0]));

    let settings = Settings::new().with(
        "results",
        ConfiguratorKind::ResultsFile,
        json!({"datasets": ["missing_variable"]}),
    );
    let config = settings
        .configure(&json!({"results": path.to_str().unwrap()}), &SetupContext::new())
        .unwrap();
    assert!(!config.is_valid());
}

#[test]
fn script_file_checks_required_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transform.py");
    std::fs::write(&path, "scale = 2.0\n\ndef transform(r):\n    return r * scale\n").unwrap();

    let settings = Settings::new().with(
        "script",
        ConfiguratorKind::ScriptFile,
        json!({"required_names": ["transform", "scale"]}),
    );
    let config = settings
        .configure(&json!({"script": path.to_str().unwrap()}), &SetupContext::new())
        .unwrap();
    assert!(config.is_valid(), "{}", config.report());

    let settings = Settings::new().with(
        "script",
        ConfiguratorKind::ScriptFile,
        json!({"required_names": ["kernel"]}),
    );
    let config = settings
        .configure(&json!({"script": path.to_str().unwrap()}), &SetupContext::new())
        .unwrap();
    assert!(!config.is_valid());
    assert!(config.failures()[0].1.contains("kernel"));
}

#[test]
fn single_choice_tracks_the_index() {
    let settings = Settings::new().with(
        "window",
        ConfiguratorKind::SingleChoice,
        json!({"choices": ["gaussian", "lorentzian", "square"]}),
    );
    let config = settings
        .configure(&json!({"window": "lorentzian"}), &SetupContext::new())
        .unwrap();
    let choice = config.single_choice("window").unwrap();
    assert_eq!(choice.index, 1);
    assert_eq!(choice.value, json!("lorentzian"));

    let config = settings
        .configure(&json!({"window": "voigt"}), &SetupContext::new())
        .unwrap();
    assert!(!config.is_valid());
}

#[test]
fn multiple_choices_enforce_cardinality() {
    let settings = Settings::new().with(
        "axes",
        ConfiguratorKind::MultipleChoices,
        json!({"choices": ["x", "y", "z"], "n_choices": 2}),
    );
    let config = settings
        .configure(&json!({"axes": ["x", "z"]}), &SetupContext::new())
        .unwrap();
    assert!(config.is_valid());
    assert_eq!(config.multiple_choices("axes").unwrap().indexes, vec![0, 2]);

    for bad in [json!(["x"]), json!([]), json!(["x", "w"])] {
        let config = settings
            .configure(&json!({ "axes": bad }), &SetupContext::new())
            .unwrap();
        assert!(!config.is_valid());
    }
}

#[test]
fn vector_normalization_and_null_checks() {
    let settings = Settings::new().with(
        "axis",
        ConfiguratorKind::Vector,
        json!({"normalize": true, "not_null": true}),
    );
    let config = settings
        .configure(&json!({"axis": [0, 3, 4]}), &SetupContext::new())
        .unwrap();
    assert!(config.is_valid());
    let v = &config.vector("axis").unwrap().vector;
    assert!((v[1] - 0.6).abs() < 1e-12);
    assert!((v[2] - 0.8).abs() < 1e-12);

    for bad in [json!([0, 0, 0]), json!([1, 2]), json!(["a", "b", "c"])] {
        let config = settings
            .configure(&json!({ "axis": bad }), &SetupContext::new())
            .unwrap();
        assert!(!config.is_valid());
    }
}

#[test]
fn trajectory_variable_checks_the_stored_set() {
    let traj = static_trajectory(hydrogens(3), 4, 1.0, 10.0);
    let ctx = SetupContext::new().preload("t", traj);
    let settings = Settings::new()
        .with("trajectory", ConfiguratorKind::Trajectory, Value::Null)
        .with(
            "variable",
            ConfiguratorKind::TrajectoryVariable,
            Value::Null,
        );
    let config = settings
        .configure(
            &json!({"trajectory": "mem:t", "variable": "coordinates"}),
            &ctx,
        )
        .unwrap();
    assert!(config.is_valid(), "{}", config.report());

    // No velocities stored in the static trajectory.
    let config = settings
        .configure(
            &json!({"trajectory": "mem:t", "variable": "velocities"}),
            &ctx,
        )
        .unwrap();
    assert!(!config.is_valid());
}

#[test]
fn literal_and_string_eval_types() {
    let settings = Settings::new()
        .with("token", ConfiguratorKind::Literal, Value::Null)
        .with(
            "count",
            ConfiguratorKind::Str,
            json!({"eval_type": "int", "default": "0"}),
        );
    let config = settings
        .configure(
            &json!({"token": "[1, 2, 3]", "count": "42"}),
            &SetupContext::new(),
        )
        .unwrap();
    assert!(config.is_valid(), "{}", config.report());
    assert_eq!(config.literal("token").unwrap().value, json!([1, 2, 3]));

    let config = settings
        .configure(
            &json!({"token": "not a literal", "count": "many"}),
            &SetupContext::new(),
        )
        .unwrap();
    assert!(!config.is_valid());
    assert_eq!(config.failures().len(), 2);
}
