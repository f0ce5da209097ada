//! Integration tests for pipeline files and engine settings on disk

mod common;

use common::builders::{feature_ids, grain_pipeline};
use gridflow::config::{EngineSettings, FilterEntry, PipelineFile};
use gridflow::data::ContainerRegistry;
use gridflow::pipeline::{FilterKind, NullObserver, ParameterValue, PipelineState};
use gridflow::shape::ShapeKind;
use gridflow::GridFlowError;
use tempfile::TempDir;

#[test]
fn test_saved_pipeline_runs_like_the_original() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("grain.json");

    let mut original = grain_pipeline(8, ShapeKind::SuperEllipsoid, 4.0, 60.0);
    PipelineFile::from_pipeline(&original).unwrap().save(&path).unwrap();
    let mut loaded = PipelineFile::load(&path).unwrap().build().unwrap();
    assert_eq!(loaded.name(), original.name());
    assert_eq!(loaded.len(), original.len());

    let mut a = ContainerRegistry::new();
    let mut b = ContainerRegistry::new();
    assert!(original.run(&mut a, &mut NullObserver).is_success());
    assert!(loaded.run(&mut b, &mut NullObserver).is_success());
    assert_eq!(a.array(&feature_ids()).unwrap(), b.array(&feature_ids()).unwrap());
}

#[test]
fn test_handwritten_file_with_integer_for_float() {
    let json = r#"{
        "name": "handwritten",
        "filters": [
            { "filter": "create_image_geometry",
              "parameters": { "dimensions": { "type": "int_vec3", "value": [4, 4, 4] },
                              "spacing": { "type": "int_vec3", "value": [2, 2, 2] } } },
            { "filter": "create_data_array",
              "parameters": { "output": { "type": "text", "value": "ImageDataContainer/CellData/Phase" },
                              "element_type": { "type": "text", "value": "u8" },
                              "initial_value": { "type": "integer", "value": 1 } } }
        ]
    }"#;
    let file: PipelineFile = serde_json::from_str(json).unwrap();
    let mut pipeline = file.build().unwrap();

    let mut registry = ContainerRegistry::new();
    let report = pipeline.run(&mut registry, &mut NullObserver);
    assert_eq!(report.state, PipelineState::Completed);

    let phase = registry
        .array(&"ImageDataContainer/CellData/Phase".parse().unwrap())
        .unwrap();
    assert_eq!(phase.tuple_count(), 64);
    assert!(phase.as_slice::<u8>().unwrap().iter().all(|&v| v == 1));
}

#[test]
fn test_bad_choice_is_reported_with_filter_id() {
    let file = PipelineFile {
        filters: vec![FilterEntry::new(FilterKind::ThresholdArray)
            .with("comparison", ParameterValue::Text("~=".to_string()))],
        ..PipelineFile::new("bad")
    };
    let err = file.build().unwrap_err();
    assert!(matches!(err, GridFlowError::Pipeline(_)));
    assert!(err.to_string().contains("threshold_array"));
}

#[test]
fn test_unknown_filter_kind_fails_to_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("unknown.json");
    std::fs::write(&path, r#"{ "name": "x", "filters": [ { "filter": "blur" } ] }"#).unwrap();
    assert!(matches!(PipelineFile::load(&path), Err(GridFlowError::Config(_))));
}

#[test]
fn test_settings_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.toml");
    let settings = EngineSettings {
        rollback_on_failure: true,
        progress_channel_capacity: 8,
        ..EngineSettings::default()
    };
    settings.save(&path).unwrap();
    assert_eq!(EngineSettings::load(&path).unwrap(), settings);
}
