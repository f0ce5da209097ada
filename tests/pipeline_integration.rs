//! Integration tests for complete pipeline runs
//!
//! These tests exercise the preflight gate, execution, cancellation,
//! rollback and the array store round trip through the public API.

mod common;

use common::builders::{feature_ids, grain_pipeline, RegistryBuilder, CELLS, CONTAINER};
use common::{assert_float_eq, error_codes};
use gridflow::data::{ContainerRegistry, DataArray, DataContainer, DataPath, Geometry, ImageGeometry};
use gridflow::pipeline::filters::{
    CreateDataArray, CreateImageGeometry, ExportArray, FindFeatureSizes, ImportArray, InsertShape,
    RenameContainer, ThresholdArray,
};
use gridflow::pipeline::observer::drain;
use gridflow::pipeline::{
    CancelToken, ChannelObserver, ErrorCode, NullObserver, Phase, Pipeline, PipelineMessage,
    PipelineObserver, PipelineState,
};
use gridflow::shape::{equivalent_sphere_diameter, ShapeKind};
use gridflow::types::ElementType;
use tempfile::TempDir;

/// Cancels the run once the filter at `index` has executed.
struct CancelAfter {
    index: usize,
    token: CancelToken,
}

impl PipelineObserver for CancelAfter {
    fn filter_finished(&mut self, index: usize, phase: Phase) {
        if phase == Phase::Execute && index == self.index {
            self.token.cancel();
        }
    }
}

fn features(name: &str) -> DataPath {
    DataPath::new(CONTAINER, "CellFeatureData", name)
}

#[test]
fn test_full_grain_workflow() {
    let dir = TempDir::new().unwrap();
    let store_root = dir.path().to_string_lossy().to_string();

    let mut pipeline = grain_pipeline(10, ShapeKind::Cube, 5.0, 64.0);
    pipeline.push(FindFeatureSizes::default());
    pipeline.push(ThresholdArray::new(feature_ids(), ">", 0.0).with_output("Grain"));
    pipeline.push(
        ExportArray::new(DataPath::new(CONTAINER, CELLS, "Grain"))
            .with_store_root(store_root.clone())
            .with_location("grain/mask"),
    );

    let mut registry = ContainerRegistry::new();
    let report = pipeline.run(&mut registry, &mut NullObserver);

    assert_eq!(report.state, PipelineState::Completed);
    assert!(report.is_success());
    assert!(error_codes(&report).is_empty());
    assert_eq!(report.filters_executed, 5);
    assert!(report.finished_at >= report.started_at);

    let counts = registry.array(&features("NumCells")).unwrap();
    assert_eq!(counts.as_slice::<i32>().unwrap(), &[0, 64]);
    let volumes = registry.array(&features("Volumes")).unwrap();
    assert_float_eq(volumes.value(1).unwrap(), 64.0, 1e-4);
    let diameters = registry.array(&features("EquivalentDiameters")).unwrap();
    assert_float_eq(diameters.value(1).unwrap(), equivalent_sphere_diameter(64.0), 1e-4);

    let mask = registry.array(&DataPath::new(CONTAINER, CELLS, "Grain")).unwrap();
    assert_eq!(mask.element_type(), ElementType::Bool);
    assert_eq!(mask.as_slice::<bool>().unwrap().iter().filter(|&&m| m).count(), 64);
    assert!(dir.path().join("grain/mask.json").exists());

    // Read the exported mask back into a fresh grid.
    let mut import = ImportArray::new("grain/mask", DataPath::new(CONTAINER, CELLS, "Imported"));
    import.store_root = store_root;
    let mut reader = Pipeline::new("reader");
    reader.push(CreateImageGeometry::new(CONTAINER, [10; 3]));
    reader.push(import);
    let mut fresh = ContainerRegistry::new();
    let report = reader.run(&mut fresh, &mut NullObserver);
    assert_eq!(report.state, PipelineState::Completed);
    let imported = fresh.array(&DataPath::new(CONTAINER, CELLS, "Imported")).unwrap();
    assert_eq!(imported.name(), "Imported");
    assert_eq!(
        imported.as_slice::<bool>().unwrap(),
        mask.as_slice::<bool>().unwrap()
    );
}

#[test]
fn test_missing_input_fails_preflight_without_executing() {
    let mut pipeline = Pipeline::new("broken");
    pipeline.push(ThresholdArray::new(
        DataPath::new("Nowhere", CELLS, "Confidence"),
        ">=",
        0.5,
    ));
    pipeline.push(CreateDataArray::new(
        DataPath::new(CONTAINER, CELLS, "Never"),
        ElementType::F32,
        1,
    ));

    let mut registry = ContainerRegistry::new();
    let first = pipeline.run(&mut registry, &mut NullObserver);
    assert_eq!(first.state, PipelineState::Failed);
    assert_eq!(first.filters_executed, 0);
    assert_eq!(first.errors().next().unwrap().code, ErrorCode::MissingData.code());
    assert!(registry.is_empty());

    let second = pipeline.run(&mut registry, &mut NullObserver);
    assert_eq!(second.state, PipelineState::Failed);
    assert_eq!(error_codes(&second), error_codes(&first));
    assert!(registry.is_empty());
}

#[test]
fn test_preflight_sees_outputs_of_earlier_filters() {
    let mut pipeline = grain_pipeline(8, ShapeKind::Ellipsoid, 4.0, 30.0);
    pipeline.push(FindFeatureSizes::default());

    let registry = ContainerRegistry::new();
    let report = pipeline.preflight(&registry, &mut NullObserver);
    assert!(!report.has_errors());
    assert_eq!(report.filters_executed, 0);
    assert!(registry.is_empty());
}

#[test]
fn test_overflowing_grid_is_rejected_before_execution() {
    let mut pipeline = grain_pipeline(1 << 22, ShapeKind::Cube, 5.0, 64.0);
    let mut registry = ContainerRegistry::new();
    let report = pipeline.run(&mut registry, &mut NullObserver);

    assert_eq!(report.state, PipelineState::Failed);
    assert_eq!(report.filters_executed, 0);
    let first = report.errors().next().unwrap();
    assert_eq!(first.filter_index, 0);
    assert_eq!(first.code, ErrorCode::InvalidParameter.code());
    assert!(registry.is_empty());
}

#[test]
fn test_cell_group_disagreeing_with_grid_fails_cleanly() {
    let mut registry = RegistryBuilder::new([10, 10, 10]).build();
    registry
        .group_mut(&feature_ids())
        .unwrap()
        .resize(10)
        .unwrap();

    let mut pipeline = Pipeline::new("short cells");
    pipeline.push(InsertShape::new(ShapeKind::Cube, [5.0; 3], 64.0).with_feature_ids(feature_ids()));
    let report = pipeline.run(&mut registry, &mut NullObserver);

    assert_eq!(report.state, PipelineState::Failed);
    assert_eq!(error_codes(&report), vec![ErrorCode::InvalidParameter.code()]);
    assert!(registry.array(&feature_ids()).is_err());
}

#[test]
fn test_cancel_before_run_is_honored_once() {
    let mut pipeline = grain_pipeline(6, ShapeKind::Cube, 3.0, 8.0);
    pipeline.cancel_token().cancel();

    let mut registry = ContainerRegistry::new();
    let report = pipeline.run(&mut registry, &mut NullObserver);
    assert_eq!(report.state, PipelineState::Cancelled);
    assert_eq!(report.filters_executed, 0);
    assert!(registry.is_empty());

    let report = pipeline.run(&mut registry, &mut NullObserver);
    assert_eq!(report.state, PipelineState::Completed);
    assert_eq!(report.filters_executed, 2);
}

#[test]
fn test_every_preflight_error_is_collected() {
    let mut pipeline = Pipeline::new("two problems");
    pipeline.push(FindFeatureSizes::default());
    pipeline.push(RenameContainer::new("Missing", "Renamed"));

    let report = pipeline.preflight(&ContainerRegistry::new(), &mut NullObserver);
    assert_eq!(report.state, PipelineState::Failed);
    let indices: Vec<usize> = report.errors().map(|d| d.filter_index).collect();
    assert_eq!(indices, vec![0, 1]);
}

#[test]
fn test_cancel_between_filters_keeps_earlier_results() {
    let mut pipeline = grain_pipeline(6, ShapeKind::Cube, 3.0, 8.0);
    pipeline.push(FindFeatureSizes::default());
    let mut observer = CancelAfter {
        index: 0,
        token: pipeline.cancel_token(),
    };

    let mut registry = ContainerRegistry::new();
    let report = pipeline.run(&mut registry, &mut observer);

    assert_eq!(report.state, PipelineState::Cancelled);
    assert_eq!(report.filters_executed, 1);
    assert!(!report.has_errors());
    assert!(report.diagnostics.iter().any(|d| d.is_cancellation() && d.filter_index == 1));

    // The grid exists, the shape was never inserted.
    let cells = registry.group(&feature_ids()).unwrap();
    assert_eq!(cells.tuple_count(), 216);
    assert!(!cells.contains("FeatureIds"));
}

#[test]
fn test_rollback_restores_registry_on_cancel() {
    let mut pipeline = grain_pipeline(6, ShapeKind::Cube, 3.0, 8.0);
    let mut observer = CancelAfter {
        index: 0,
        token: pipeline.cancel_token(),
    };

    let mut registry = RegistryBuilder::new([2, 1, 1])
        .cell_array(DataArray::from_vec("FeatureIds", vec![1i32, 1], 1).unwrap())
        .build();
    registry.rename(CONTAINER, "Existing").unwrap();
    let before = registry.clone();

    let report = pipeline.run_with_rollback(&mut registry, &mut observer);
    assert_eq!(report.state, PipelineState::Cancelled);
    assert!(report.rolled_back);
    assert_eq!(registry, before);
}

#[test]
fn test_rename_to_existing_name_is_duplicate() {
    let mut registry = ContainerRegistry::new();
    for name in ["A", "B"] {
        registry
            .insert(DataContainer::new(name, Geometry::Image(ImageGeometry::new([1, 1, 1]))))
            .unwrap();
    }

    let mut pipeline = Pipeline::new("rename");
    pipeline.push(RenameContainer::new("A", "B"));
    let report = pipeline.run(&mut registry, &mut NullObserver);

    assert_eq!(report.state, PipelineState::Failed);
    assert_eq!(error_codes(&report), vec![ErrorCode::DuplicateName.code()]);
    assert!(registry.contains("A"));
    assert!(registry.contains("B"));
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_type_mismatch_on_existing_array() {
    let mut registry = RegistryBuilder::new([2, 2, 1])
        .cell_array(DataArray::from_vec("FeatureIds", vec![0.0f32; 4], 1).unwrap())
        .build();
    let mut pipeline = Pipeline::new("wrong type");
    pipeline.push(FindFeatureSizes::default());

    let report = pipeline.run(&mut registry, &mut NullObserver);
    assert_eq!(error_codes(&report), vec![ErrorCode::TypeMismatch.code()]);
}

#[test]
fn test_channel_observer_sees_whole_run() {
    let mut pipeline = grain_pipeline(4, ShapeKind::Ellipsoid, 1.5, 10.0);
    let (mut observer, rx) = ChannelObserver::bounded(1024);

    let mut registry = ContainerRegistry::new();
    let report = pipeline.run(&mut registry, &mut observer);
    assert!(report.is_success());
    assert_eq!(observer.dropped(), 0);

    let msgs = drain(&rx);
    let states: Vec<PipelineState> = msgs
        .iter()
        .filter_map(|m| match m {
            PipelineMessage::State(s) => Some(*s),
            _ => None,
        })
        .collect();
    assert_eq!(
        states,
        vec![
            PipelineState::Preflighting,
            PipelineState::Executing,
            PipelineState::Completed
        ]
    );
    assert!(msgs.iter().any(|m| matches!(
        m,
        PipelineMessage::FilterStarted { index: 1, phase: Phase::Execute, .. }
    )));
    assert!(msgs
        .iter()
        .any(|m| matches!(m, PipelineMessage::Progress { index: 1, .. })));
}

#[test]
fn test_run_on_worker_thread() {
    let mut pipeline = grain_pipeline(8, ShapeKind::Cylinder, 4.0, 40.0);
    let (mut observer, rx) = ChannelObserver::bounded(16);

    let worker = std::thread::spawn(move || {
        let mut registry = ContainerRegistry::new();
        let report = pipeline.run(&mut registry, &mut observer);
        (report, registry)
    });
    let received = rx.iter().count();
    let (report, registry) = worker.join().unwrap();

    assert!(report.is_success());
    assert!(received > 0);
    assert!(registry.array(&feature_ids()).is_ok());
}
