mod common;

use common::{hydrogens, peroxide, static_trajectory, water_dimer};
use nscat_config::{ConfiguratorKind, Settings, SetupContext, UserDefinitionStore};
use serde_json::{json, Value};

fn ctx_with(key: &str, traj: nscat_traj::Trajectory) -> SetupContext<'static> {
    SetupContext::new().preload(key, traj)
}

fn traj_settings() -> Settings {
    Settings::new().with("trajectory", ConfiguratorKind::Trajectory, Value::Null)
}

#[test]
fn range_laws_hold() {
    let settings = Settings::new().with(
        "span",
        ConfiguratorKind::Range,
        json!({"value_type": "float", "include_last": true}),
    );
    let config = settings
        .configure(&json!({"span": [0.0, 1.0, 0.25]}), &SetupContext::new())
        .unwrap();
    assert!(config.is_valid(), "{}", config.report());
    let range = config.range("span").unwrap();
    assert_eq!(range.value, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    assert_eq!(range.number, 5);
    assert_eq!(range.first, 0.0);
    assert!(range.value.contains(&1.0));
    assert_eq!(range.mid_points, vec![0.125, 0.375, 0.625, 0.875]);

    // Exclusive end: last not in value.
    let settings = Settings::new().with(
        "span",
        ConfiguratorKind::Range,
        json!({"value_type": "float"}),
    );
    let config = settings
        .configure(&json!({"span": [0.0, 1.0, 0.25]}), &SetupContext::new())
        .unwrap();
    let range = config.range("span").unwrap();
    assert_eq!(range.value, vec![0.0, 0.25, 0.5, 0.75]);
    assert_eq!(range.number, 4);
    assert!(!range.value.contains(&1.0));
}

#[test]
fn range_rejects_zero_step_and_empty_ranges() {
    let settings = Settings::new().with("span", ConfiguratorKind::Range, Value::Null);
    let config = settings
        .configure(&json!({"span": [0, 10, 0]}), &SetupContext::new())
        .unwrap();
    assert!(!config.is_valid());

    let config = settings
        .configure(&json!({"span": [5, 5, 1]}), &SetupContext::new())
        .unwrap();
    assert!(!config.is_valid());
}

#[test]
fn integer_bounds_and_choices() {
    let settings = Settings::new().with(
        "n",
        ConfiguratorKind::Integer,
        json!({"mini": 0, "maxi": 10, "exclude": [5]}),
    );
    for (raw, ok) in [
        (json!(0), true),
        (json!(10), true),
        (json!(7), true),
        (json!(-1), false),
        (json!(11), false),
        (json!(5), false),
        (json!("three"), false),
    ] {
        let config = settings
            .configure(&json!({ "n": raw.clone() }), &SetupContext::new())
            .unwrap();
        assert_eq!(config.is_valid(), ok, "raw {raw}");
        if !ok {
            assert!(!config.failures()[0].1.is_empty());
        }
    }
}

#[test]
fn frames_scenario_1_11_3() {
    let traj = static_trajectory(hydrogens(4), 20, 0.5, 10.0);
    let ctx = ctx_with("t", traj);
    let settings = traj_settings().with("frames", ConfiguratorKind::Frames, Value::Null);
    let config = settings
        .configure(
            &json!({"trajectory": "mem:t", "frames": [1, 11, 3]}),
            &ctx,
        )
        .unwrap();
    assert!(config.is_valid(), "{}", config.report());
    let frames = config.frames("frames").unwrap();
    assert_eq!(frames.value, vec![1, 4, 7, 10]);
    assert_eq!(frames.n_frames, 4);
    assert_eq!(frames.time, vec![0.5, 2.0, 3.5, 5.0]);
    assert!((frames.time_step - 1.5).abs() < 1e-12);
    assert!((frames.duration - 4.5).abs() < 1e-12);
}

#[test]
fn frames_all_covers_the_trajectory() {
    let traj = static_trajectory(hydrogens(4), 12, 0.25, 10.0);
    let ctx = ctx_with("t", traj);
    let settings = traj_settings().with("frames", ConfiguratorKind::Frames, Value::Null);
    let config = settings
        .configure(&json!({"trajectory": "mem:t", "frames": "all"}), &ctx)
        .unwrap();
    let frames = config.frames("frames").unwrap();
    assert_eq!(frames.n_frames, 12);
    for (i, t) in frames.time.iter().enumerate() {
        assert!((t - i as f64 * 0.25).abs() < 1e-12);
    }
}

#[test]
fn single_frame_selection_uses_the_sentinel_time_step() {
    let traj = static_trajectory(hydrogens(4), 10, 0.5, 10.0);
    let ctx = ctx_with("t", traj);
    let settings = traj_settings().with("frames", ConfiguratorKind::Frames, Value::Null);
    let config = settings
        .configure(&json!({"trajectory": "mem:t", "frames": [3, 4, 1]}), &ctx)
        .unwrap();
    let frames = config.frames("frames").unwrap();
    assert_eq!(frames.n_frames, 1);
    assert!((frames.time_step - 1.0).abs() < 1e-12);
    assert_eq!(frames.duration, 0.0);
}

#[test]
fn correlation_frames_window_bounds() {
    let traj = static_trajectory(hydrogens(4), 10, 0.5, 10.0);
    let ctx = ctx_with("t", traj);
    let settings =
        traj_settings().with("frames", ConfiguratorKind::CorrelationFrames, Value::Null);

    let config = settings
        .configure(
            &json!({"trajectory": "mem:t", "frames": [0, 10, 1, 4]}),
            &ctx,
        )
        .unwrap();
    assert!(config.is_valid(), "{}", config.report());
    let frames = config.correlation_frames("frames").unwrap();
    assert_eq!(frames.n_frames, 4);
    assert_eq!(frames.n_configs, 7);
    assert_eq!(frames.time.len(), 4);

    // Window longer than the selection.
    let config = settings
        .configure(
            &json!({"trajectory": "mem:t", "frames": [0, 10, 1, 11]}),
            &ctx,
        )
        .unwrap();
    assert!(!config.is_valid());

    // Degenerate window.
    let config = settings
        .configure(
            &json!({"trajectory": "mem:t", "frames": [0, 10, 1, 1]}),
            &ctx,
        )
        .unwrap();
    assert!(!config.is_valid());
}

#[test]
fn atom_selection_all_on_100_atoms() {
    let traj = static_trajectory(hydrogens(100), 2, 1.0, 10.0);
    let ctx = ctx_with("t", traj);
    let settings =
        traj_settings().with("atom_selection", ConfiguratorKind::AtomSelection, Value::Null);
    let config = settings
        .configure(
            &json!({"trajectory": "mem:t", "atom_selection": {"all": true}}),
            &ctx,
        )
        .unwrap();
    assert!(config.is_valid(), "{}", config.report());
    let selection = config.atom_selection("atom_selection").unwrap();
    assert_eq!(selection.selection_length, 100);
    let expected: Vec<u32> = (0..100).collect();
    assert_eq!(selection.flatten_indexes, expected);
    assert_eq!(selection.elements.len(), 100);
    assert_eq!(selection.unique_names, vec!["H"]);
}

#[test]
fn atom_selection_accepts_json_encoded_strings() {
    let traj = static_trajectory(peroxide(), 2, 1.0, 10.0);
    let ctx = ctx_with("t", traj);
    let settings =
        traj_settings().with("atom_selection", ConfiguratorKind::AtomSelection, Value::Null);
    let config = settings
        .configure(
            &json!({"trajectory": "mem:t", "atom_selection": "{\"elements\": [\"O\"]}"}),
            &ctx,
        )
        .unwrap();
    let selection = config.atom_selection("atom_selection").unwrap();
    assert_eq!(selection.flatten_indexes, vec![1, 2]);

    let config = settings
        .configure(
            &json!({"trajectory": "mem:t", "atom_selection": "{not json"}),
            &ctx,
        )
        .unwrap();
    assert!(!config.is_valid());
}

#[test]
fn transmutation_to_deuterium_rewrites_the_selection() {
    let traj = static_trajectory(peroxide(), 2, 1.0, 10.0);
    let ctx = ctx_with("t", traj);
    let settings = traj_settings()
        .with("atom_selection", ConfiguratorKind::AtomSelection, Value::Null)
        .with(
            "atom_transmutation",
            ConfiguratorKind::AtomTransmutation,
            Value::Null,
        );
    let config = settings
        .configure(
            &json!({
                "trajectory": "mem:t",
                "atom_selection": {"all": true},
                "atom_transmutation": {"0": "D", "3": "D"}
            }),
            &ctx,
        )
        .unwrap();
    assert!(config.is_valid(), "{}", config.report());
    let selection = config.atom_selection("atom_selection").unwrap();
    assert_eq!(selection.names[0], vec!["D"]);
    assert_eq!(selection.names[3], vec!["D"]);
    assert_eq!(selection.names[1], vec!["O"]);
    assert_eq!(selection.names[2], vec!["O"]);
    let d_mass = nscat_core::ELEMENTS.get("D").unwrap().atomic_weight;
    assert!((selection.masses[0][0] - d_mass).abs() < 1e-9);
    assert!((selection.masses[3][0] - d_mass).abs() < 1e-9);
    assert!(selection.unique_names.contains(&"D".to_string()));
}

#[test]
fn transmutation_rejects_bad_indices_and_symbols() {
    let traj = static_trajectory(peroxide(), 2, 1.0, 10.0);
    let ctx = ctx_with("t", traj);
    let settings = traj_settings()
        .with("atom_selection", ConfiguratorKind::AtomSelection, Value::Null)
        .with(
            "atom_transmutation",
            ConfiguratorKind::AtomTransmutation,
            Value::Null,
        );
    for bad in [json!({"99": "D"}), json!({"0": "Xx"})] {
        let config = settings
            .configure(
                &json!({
                    "trajectory": "mem:t",
                    "atom_selection": {"all": true},
                    "atom_transmutation": bad
                }),
                &ctx,
            )
            .unwrap();
        assert!(!config.is_valid());
    }
}

#[test]
fn grouping_by_molecule_rolls_the_selection_up() {
    let traj = static_trajectory(water_dimer(), 2, 1.0, 10.0);
    let ctx = ctx_with("t", traj);
    let settings = traj_settings()
        .with("atom_selection", ConfiguratorKind::AtomSelection, Value::Null)
        .with("grouping_level", ConfiguratorKind::GroupingLevel, Value::Null);
    let config = settings
        .configure(
            &json!({
                "trajectory": "mem:t",
                "atom_selection": {"all": true},
                "grouping_level": "molecule"
            }),
            &ctx,
        )
        .unwrap();
    assert!(config.is_valid(), "{}", config.report());
    let selection = config.atom_selection("atom_selection").unwrap();
    assert_eq!(selection.indexes.len(), 2);
    assert_eq!(selection.indexes[0], vec![0, 1, 2]);
    assert_eq!(selection.indexes[1], vec![3, 4, 5]);
    assert_eq!(selection.elements[0], vec!["O", "H", "H"]);
    assert_eq!(selection.names[0], vec!["WAT"]);
    assert_eq!(selection.unique_names, vec!["WAT"]);
    assert_eq!(selection.selection_length, 6);
}

#[test]
fn weights_reject_unknown_properties() {
    let traj = static_trajectory(peroxide(), 2, 1.0, 10.0);
    let ctx = ctx_with("t", traj);
    let settings = traj_settings()
        .with("atom_selection", ConfiguratorKind::AtomSelection, Value::Null)
        .with("weights", ConfiguratorKind::Weights, Value::Null);
    let config = settings
        .configure(
            &json!({
                "trajectory": "mem:t",
                "atom_selection": {"all": true},
                "weights": "no_such_property"
            }),
            &ctx,
        )
        .unwrap();
    assert!(!config.is_valid());
}

#[test]
fn weights_average_group_sums_per_label() {
    let traj = static_trajectory(water_dimer(), 2, 1.0, 10.0);
    let ctx = ctx_with("t", traj);
    let settings = traj_settings()
        .with("atom_selection", ConfiguratorKind::AtomSelection, Value::Null)
        .with("grouping_level", ConfiguratorKind::GroupingLevel, Value::Null)
        .with("weights", ConfiguratorKind::Weights, Value::Null);
    let config = settings
        .configure(
            &json!({
                "trajectory": "mem:t",
                "atom_selection": {"all": true},
                "grouping_level": "molecule",
                "weights": "atomic_weight"
            }),
            &ctx,
        )
        .unwrap();
    assert!(config.is_valid(), "{}", config.report());
    let selection = config.atom_selection("atom_selection").unwrap();
    let weights = config.weights("weights").unwrap();
    let map = weights.get_weights(selection, &nscat_core::ELEMENTS);
    let water_mass = 15.999 + 2.0 * 1.0079;
    assert!((map["WAT"] - water_mass).abs() < 1e-9);

    // Atom-level weights reduce to the bare property.
    let settings = traj_settings()
        .with("atom_selection", ConfiguratorKind::AtomSelection, Value::Null)
        .with("weights", ConfiguratorKind::Weights, Value::Null);
    let config = settings
        .configure(
            &json!({
                "trajectory": "mem:t",
                "atom_selection": {"all": true},
                "weights": "atomic_weight"
            }),
            &ctx,
        )
        .unwrap();
    let selection = config.atom_selection("atom_selection").unwrap();
    let weights = config.weights("weights").unwrap();
    let map = weights.get_weights(selection, &nscat_core::ELEMENTS);
    assert!((map["O"] - 15.999).abs() < 1e-9);
    assert!((map["H"] - 1.0079).abs() < 1e-9);
}

#[test]
fn interpolation_order_zero_needs_velocities() {
    let traj = static_trajectory(hydrogens(4), 4, 1.0, 10.0);
    let ctx = ctx_with("t", traj);
    let settings = traj_settings().with(
        "interpolation_order",
        ConfiguratorKind::InterpolationOrder,
        Value::Null,
    );
    let config = settings
        .configure(
            &json!({"trajectory": "mem:t", "interpolation_order": 0}),
            &ctx,
        )
        .unwrap();
    assert!(!config.is_valid());

    let config = settings
        .configure(
            &json!({"trajectory": "mem:t", "interpolation_order": 3}),
            &ctx,
        )
        .unwrap();
    assert!(config.is_valid());
    assert_eq!(
        config.interpolation_order("interpolation_order").unwrap().variable,
        "coordinates"
    );
}

#[test]
fn q_vector_shells_are_populated_and_scaled() {
    let traj = static_trajectory(hydrogens(4), 2, 1.0, 10.0);
    let ctx = ctx_with("t", traj);
    let settings = traj_settings().with("q_vectors", ConfiguratorKind::QVectors, Value::Null);
    let config = settings
        .configure(
            &json!({
                "trajectory": "mem:t",
                "q_vectors": {
                    "generator": "spherical_shells",
                    "parameters": {"shells": [0.5, 1.5, 0.5], "n_vectors": 8, "seed": 7}
                }
            }),
            &ctx,
        )
        .unwrap();
    assert!(config.is_valid(), "{}", config.report());
    let q = config.q_vectors("q_vectors").unwrap();
    assert_eq!(q.n_shells, 3);
    assert!(!q.is_lattice);
    for shell in &q.q_vectors {
        assert_eq!(shell.vectors.len(), 8);
        for v in &shell.vectors {
            let norm = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert!((norm - shell.q).abs() < 1e-9);
        }
    }
}

#[test]
fn lattice_q_vectors_live_on_the_reciprocal_lattice() {
    let traj = static_trajectory(hydrogens(4), 2, 1.0, 10.0);
    let ctx = ctx_with("t", traj);
    let settings = traj_settings().with("q_vectors", ConfiguratorKind::QVectors, Value::Null);
    let config = settings
        .configure(
            &json!({
                "trajectory": "mem:t",
                "q_vectors": {
                    "generator": "spherical_lattice",
                    "parameters": {"shells": [0.6, 1.2, 0.6], "n_vectors": 10, "width": 0.3}
                }
            }),
            &ctx,
        )
        .unwrap();
    assert!(config.is_valid(), "{}", config.report());
    let q = config.q_vectors("q_vectors").unwrap();
    assert!(q.is_lattice);
    // Cubic cell of 10 ang: reciprocal spacing 2 pi / 10.
    let b = 2.0 * std::f64::consts::PI / 10.0;
    for shell in &q.q_vectors {
        for v in &shell.vectors {
            for component in v {
                let steps = component / b;
                assert!((steps - steps.round()).abs() < 1e-9);
            }
        }
    }
}

#[test]
fn q_vectors_resolve_user_definitions() {
    let traj = static_trajectory(hydrogens(4), 2, 1.0, 10.0);
    let mut store = UserDefinitionStore::in_memory();
    store
        .set_definition(
            "hydrogens",
            "q_vectors",
            "coarse",
            json!({"generator": "spherical_shells", "parameters": {"shells": [1.0, 1.0, 1.0], "n_vectors": 4}}),
        )
        .unwrap();
    let ctx = ctx_with("t", traj).with_definitions(&store);
    let settings = traj_settings().with("q_vectors", ConfiguratorKind::QVectors, Value::Null);
    let config = settings
        .configure(&json!({"trajectory": "mem:t", "q_vectors": "coarse"}), &ctx)
        .unwrap();
    assert!(config.is_valid(), "{}", config.report());
    assert_eq!(config.q_vectors("q_vectors").unwrap().n_shells, 1);

    let config = settings
        .configure(&json!({"trajectory": "mem:t", "q_vectors": "missing"}), &ctx)
        .unwrap();
    assert!(!config.is_valid());
}

#[test]
fn resolution_kernels_produce_windows() {
    let traj = static_trajectory(hydrogens(4), 16, 0.5, 10.0);
    let ctx = ctx_with("t", traj);
    let settings = traj_settings()
        .with("frames", ConfiguratorKind::Frames, Value::Null)
        .with(
            "instrument_resolution",
            ConfiguratorKind::InstrumentResolution,
            Value::Null,
        );
    let config = settings
        .configure(
            &json!({
                "trajectory": "mem:t",
                "frames": "all",
                "instrument_resolution": ["gaussian", {"sigma": 4.0}]
            }),
            &ctx,
        )
        .unwrap();
    assert!(config.is_valid(), "{}", config.report());
    let resolution = config
        .instrument_resolution("instrument_resolution")
        .unwrap();
    let n_omegas = 2 * 16 - 1;
    assert_eq!(resolution.omega.len(), n_omegas);
    assert_eq!(resolution.time_window.len(), n_omegas);
    assert!((resolution.time_window[16 - 1] - 1.0).abs() < 1e-9);
    // Frequency window is normalized to unit integral.
    let d_omega = resolution.omega[1] - resolution.omega[0];
    let integral: f64 = resolution.omega_window.iter().sum::<f64>() * d_omega;
    assert!((integral - 1.0).abs() < 1e-9);
}

#[test]
fn ideal_kernel_leaves_the_time_window_flat() {
    let traj = static_trajectory(hydrogens(4), 8, 0.5, 10.0);
    let ctx = ctx_with("t", traj);
    let settings = traj_settings()
        .with("frames", ConfiguratorKind::Frames, Value::Null)
        .with(
            "instrument_resolution",
            ConfiguratorKind::InstrumentResolution,
            Value::Null,
        );
    let config = settings
        .configure(&json!({"trajectory": "mem:t", "frames": "all"}), &ctx)
        .unwrap();
    assert!(config.is_valid(), "{}", config.report());
    let resolution = config
        .instrument_resolution("instrument_resolution")
        .unwrap();
    assert_eq!(resolution.kernel, "ideal");
    assert!(resolution.time_window.iter().all(|w| (w - 1.0).abs() < 1e-12));
}

#[test]
fn too_sharp_kernels_are_rejected() {
    let traj = static_trajectory(hydrogens(4), 16, 0.5, 10.0);
    let ctx = ctx_with("t", traj);
    let settings = traj_settings()
        .with("frames", ConfiguratorKind::Frames, Value::Null)
        .with(
            "instrument_resolution",
            ConfiguratorKind::InstrumentResolution,
            Value::Null,
        );
    // A near-delta gaussian has a near-flat time window, whose tails stay
    // above the sharpness threshold.
    let config = settings
        .configure(
            &json!({
                "trajectory": "mem:t",
                "frames": "all",
                "instrument_resolution": ["gaussian", {"sigma": 1e-6}]
            }),
            &ctx,
        )
        .unwrap();
    assert!(!config.is_valid());
    assert!(config.failures()[0].1.contains("too sharp"));
}

#[test]
fn running_mode_validates_slots() {
    let settings = Settings::new().with("running_mode", ConfiguratorKind::RunningMode, Value::Null);
    let ctx = SetupContext::new();

    let config = settings
        .configure(&json!({"running_mode": "monoprocessor"}), &ctx)
        .unwrap();
    assert!(config.is_valid());
    assert_eq!(config.running_mode("running_mode").unwrap().slots, 1);

    let config = settings
        .configure(&json!({"running_mode": ["multiprocessor", 1]}), &ctx)
        .unwrap();
    assert!(config.is_valid());

    let config = settings
        .configure(&json!({"running_mode": ["multiprocessor", 0]}), &ctx)
        .unwrap();
    assert!(!config.is_valid());

    let config = settings
        .configure(&json!({"running_mode": ["multiprocessor", 100000]}), &ctx)
        .unwrap();
    assert!(!config.is_valid());
}

#[test]
fn output_files_validate_formats_against_the_registry() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("results").join("run1");
    let settings =
        Settings::new().with("output_files", ConfiguratorKind::OutputFiles, Value::Null);
    let ctx = SetupContext::new();

    let config = settings
        .configure(
            &json!({"output_files": [root.to_str().unwrap(), ["text", "json"], false]}),
            &ctx,
        )
        .unwrap();
    assert!(config.is_valid(), "{}", config.report());
    let output = config.output_files("output_files").unwrap();
    assert_eq!(output.formats, vec!["text", "json"]);
    assert_eq!(output.files.len(), 2);
    assert!(root.parent().unwrap().is_dir());

    let config = settings
        .configure(
            &json!({"output_files": [root.to_str().unwrap(), ["hdf5"], false]}),
            &ctx,
        )
        .unwrap();
    assert!(!config.is_valid());
    assert!(config.failures()[0].1.contains("not registered"));
}

#[test]
fn output_trajectory_validates_dtype_and_compression() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("out.ntj");
    let settings = Settings::new().with(
        "output_trajectory",
        ConfiguratorKind::OutputTrajectory,
        Value::Null,
    );
    let ctx = SetupContext::new();

    let config = settings
        .configure(
            &json!({"output_trajectory": [file.to_str().unwrap(), 32, "zstd"]}),
            &ctx,
        )
        .unwrap();
    assert!(config.is_valid(), "{}", config.report());

    let config = settings
        .configure(
            &json!({"output_trajectory": [file.to_str().unwrap(), 16, "none"]}),
            &ctx,
        )
        .unwrap();
    assert!(!config.is_valid());

    let config = settings
        .configure(
            &json!({"output_trajectory": [file.to_str().unwrap(), 64, "lzma"]}),
            &ctx,
        )
        .unwrap();
    assert!(!config.is_valid());
    assert!(config.failures()[0].1.contains("unknown compression"));
}

#[test]
fn projection_requires_an_axis_when_projecting() {
    let settings = Settings::new().with("projection", ConfiguratorKind::Projection, Value::Null);
    let ctx = SetupContext::new();

    let config = settings
        .configure(&json!({"projection": ["axial", [0, 0, 2]]}), &ctx)
        .unwrap();
    assert!(config.is_valid());
    let axis = config.projection("projection").unwrap().axis.unwrap();
    assert!((axis[2] - 1.0).abs() < 1e-12);

    let config = settings
        .configure(&json!({"projection": ["axial"]}), &ctx)
        .unwrap();
    assert!(!config.is_valid());

    let config = settings
        .configure(&json!({"projection": ["planar", [0, 0, 0]]}), &ctx)
        .unwrap();
    assert!(!config.is_valid());
}

#[test]
fn partial_charges_zero_fill_unspecified_atoms() {
    let traj = static_trajectory(hydrogens(5), 2, 1.0, 10.0);
    let ctx = ctx_with("t", traj);
    let settings =
        traj_settings().with("partial_charge", ConfiguratorKind::PartialCharge, Value::Null);
    let config = settings
        .configure(
            &json!({"trajectory": "mem:t", "partial_charge": {"1": -0.5, "3": 0.25}}),
            &ctx,
        )
        .unwrap();
    assert!(config.is_valid(), "{}", config.report());
    let charges = &config.partial_charge("partial_charge").unwrap().charges;
    assert_eq!(charges.len(), 5);
    assert_eq!(charges[0], 0.0);
    assert_eq!(charges[1], -0.5);
    assert_eq!(charges[3], 0.25);

    let config = settings
        .configure(
            &json!({"trajectory": "mem:t", "partial_charge": {"9": 1.0}}),
            &ctx,
        )
        .unwrap();
    assert!(!config.is_valid());
}
