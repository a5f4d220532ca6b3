mod common;

use common::{linear_model, num, sample_upload, table, text, write_model, xlsx_bytes};
use harga_tools::ToolError;
use harga_tools::config::{Config, ConfigFile};
use harga_tools::export::{DOWNLOAD_FILE_NAME, XLSX_MIME_TYPE};
use harga_tools::io::excel_read;
use harga_tools::model::{Regressor, load_model};
use harga_tools::pipeline::{Pipeline, Stage};
use harga_tools::predict::{PREDICTION_COLUMN, PREDICTION_LABEL, predict};
use harga_tools::present::{IDENTIFIER_COLUMN, Preview, present};
use harga_tools::session::Session;
use harga_tools::table::{Cell, Table};
use tempfile::tempdir;

struct ConstantModel(f64);

impl Regressor for ConstantModel {
    fn predict_rows(&self, table: &Table) -> harga_tools::Result<Vec<f64>> {
        Ok(vec![self.0; table.row_count()])
    }
}

struct ShortModel;

impl Regressor for ShortModel {
    fn predict_rows(&self, _table: &Table) -> harga_tools::Result<Vec<f64>> {
        Ok(vec![1.0])
    }
}

#[test]
fn grouped_distance_upload_is_scored_end_to_end() {
    let dir = tempdir().expect("temporary directory");
    let model_path = write_model(dir.path(), "model.json", &linear_model());
    let pipeline = Pipeline::new(Config::new(&model_path));

    let mut session = Session::new();
    session.upload(&pipeline, "data_baru.xlsx", &sample_upload());
    assert_eq!(session.state_name(), "loaded");

    session.trigger(&pipeline).expect("trigger accepted");
    assert_eq!(session.state_name(), "done");

    let outcome = session.outcome().expect("prediction outcome");
    assert_eq!(outcome.converted_columns, vec!["Dist_SPBU".to_string()]);
    assert_eq!(outcome.table.row_count(), 3);
    assert_eq!(
        outcome.table.column("Dist_SPBU").expect("distance column").cells(),
        vec![num(1000.0), num(2500.0), num(750.0)]
    );
    assert_eq!(
        outcome.table.column(PREDICTION_COLUMN).expect("prediction column").cells(),
        vec![num(4200.0), num(6800.0), num(4500.0)]
    );
    assert!(outcome.table.column(PREDICTION_LABEL).is_none());

    let download = session.download().expect("download offered");
    assert_eq!(download.file_name, DOWNLOAD_FILE_NAME);
    assert_eq!(download.mime_type, XLSX_MIME_TYPE);
    assert!(!download.bytes.is_empty());
}

#[test]
fn invalid_model_path_fails_at_load_stage_without_download() {
    let dir = tempdir().expect("temporary directory");
    let pipeline = Pipeline::new(Config::new(dir.path().join("missing_model")));

    let mut session = Session::new();
    session.upload(&pipeline, "data_baru.xlsx", &sample_upload());
    session.trigger(&pipeline).expect("trigger accepted");

    assert_eq!(session.state_name(), "failed");
    let failure = session.failure().expect("failure recorded");
    assert_eq!(failure.stage, Stage::LoadModel);
    assert!(matches!(failure.error, ToolError::Load { .. }));
    assert!(failure.to_string().starts_with(Stage::LoadModel.headline()));
    let reported = ToolError::StageFailed(failure.to_string());
    assert_eq!(reported.to_string(), failure.to_string());
    assert!(session.download().is_none());
    assert!(session.table().is_some(), "upload survives the failure");
}

#[test]
fn failed_session_recovers_once_the_model_appears() {
    let dir = tempdir().expect("temporary directory");
    let pipeline = Pipeline::new(Config::new(dir.path().join("model")));

    let mut session = Session::new();
    session.upload(&pipeline, "data_baru.xlsx", &sample_upload());
    session.trigger(&pipeline).expect("trigger accepted");
    assert_eq!(session.state_name(), "failed");
    assert_eq!(session.failure().expect("failure recorded").stage, Stage::LoadModel);

    write_model(dir.path(), "model.json", &linear_model());
    session.trigger(&pipeline).expect("retrigger accepted");
    assert_eq!(session.state_name(), "done");
    assert!(session.failure().is_none());
    assert!(session.download().is_some());

    session.upload(&pipeline, "data_lain.xlsx", &sample_upload());
    assert_eq!(session.state_name(), "loaded");
    assert!(session.download().is_none(), "a new upload discards the old result");
    assert!(session.outcome().is_none());
}

#[test]
fn malformed_distance_fails_at_predict_stage() {
    let dir = tempdir().expect("temporary directory");
    let model_path = write_model(dir.path(), "model.json", &linear_model());
    let pipeline = Pipeline::new(Config::new(&model_path));
    let upload = xlsx_bytes(
        &["NOP", "Luas", "Dist_SPBU"],
        &[vec![text("NOP-001"), num(1.0), text("satu")]],
    );

    let mut session = Session::new();
    session.upload(&pipeline, "data.xlsx", &upload);
    session.trigger(&pipeline).expect("trigger accepted");

    let failure = session.failure().expect("failure recorded");
    assert_eq!(failure.stage, Stage::Predict);
    assert!(matches!(failure.error, ToolError::Conversion { .. }));
    assert!(session.download().is_none());
}

#[test]
fn unreadable_upload_fails_at_read_stage() {
    let pipeline = Pipeline::new(Config::new("unused"));
    let mut session = Session::new();

    session.upload(&pipeline, "data.xlsx", b"definitely not a zip archive");

    let failure = session.failure().expect("failure recorded");
    assert_eq!(failure.stage, Stage::Read);
    assert!(matches!(failure.error, ToolError::Parse(_)));
    assert!(session.table().is_none());
}

#[test]
fn non_xlsx_upload_is_rejected() {
    let pipeline = Pipeline::new(Config::new("unused"));
    let mut session = Session::new();

    session.upload(&pipeline, "data.csv", &sample_upload());

    let failure = session.failure().expect("failure recorded");
    assert!(matches!(failure.error, ToolError::UnsupportedUpload(_)));
}

#[test]
fn trigger_requires_a_loaded_table() {
    let pipeline = Pipeline::new(Config::new("unused"));
    let mut session = Session::new();

    let error = session.trigger(&pipeline).expect_err("idle session cannot predict");

    assert!(matches!(error, ToolError::InvalidTransition { .. }));
    assert_eq!(session.state_name(), "idle");
}

#[test]
fn finish_requires_a_running_prediction() {
    let pipeline = Pipeline::new(Config::new("unused"));
    let mut session = Session::new();
    session.upload(&pipeline, "data.xlsx", &sample_upload());

    let table = session.table().cloned().expect("table loaded");
    let result = pipeline.run_with_model(&ConstantModel(1.0), &table);
    let error = session.finish(result).expect_err("not predicting");

    assert!(matches!(error, ToolError::InvalidTransition { .. }));
    assert_eq!(session.state_name(), "loaded");

    session.begin_prediction().expect("prediction started");
    assert_eq!(session.state_name(), "predicting");
    let result = pipeline.run_with_model(&ConstantModel(1.0), &table);
    session.finish(result).expect("prediction finished");
    assert_eq!(session.state_name(), "done");
}

#[test]
fn repeated_runs_give_identical_results() {
    let dir = tempdir().expect("temporary directory");
    let model_path = write_model(dir.path(), "model.json", &linear_model());
    let pipeline = Pipeline::new(Config::new(&model_path));
    let input = excel_read::read_table(&sample_upload()).expect("upload parsed");

    let first = pipeline.run(&input).expect("first run");
    let second = pipeline.run(&input).expect("second run");

    assert_eq!(first.table, second.table);
    assert_eq!(
        input.column("Dist_SPBU").expect("column").cells()[0],
        text("1,000"),
        "input table is not mutated"
    );

    let mut session = Session::new();
    session.upload(&pipeline, "data.xlsx", &sample_upload());
    session.trigger(&pipeline).expect("first trigger");
    let first_table = session.outcome().expect("outcome").table.clone();
    session.trigger(&pipeline).expect("second trigger");
    assert_eq!(session.outcome().expect("outcome").table, first_table);
}

#[test]
fn identifier_and_prediction_move_to_the_front() {
    let scored = predict(
        &ConstantModel(5.0),
        &table(
            &["Luas", "NOP", "Dist_SPBU"],
            vec![vec![num(1.0), text("A"), num(2.0)]],
        ),
    )
    .expect("scored");

    let presented = present(scored);

    assert_eq!(
        presented.column_names(),
        vec![IDENTIFIER_COLUMN, PREDICTION_COLUMN, "Luas", "Dist_SPBU"]
    );
}

#[test]
fn order_is_kept_when_identifier_is_missing() {
    let scored = predict(
        &ConstantModel(5.0),
        &table(&["Luas", "Dist_SPBU"], vec![vec![num(1.0), num(2.0)]]),
    )
    .expect("scored");

    let presented = present(scored);

    assert_eq!(
        presented.column_names(),
        vec!["Luas", "Dist_SPBU", PREDICTION_COLUMN]
    );
}

#[test]
fn order_is_kept_when_prediction_is_missing() {
    let data = table(&["Luas", "NOP"], vec![vec![num(1.0), text("A")]]);

    assert_eq!(present(data.clone()), data);
}

#[test]
fn predictions_are_rounded_and_existing_prediction_replaced() {
    let data = table(
        &["NOP", PREDICTION_COLUMN],
        vec![vec![text("A"), num(1.0)], vec![text("B"), num(2.0)]],
    );

    let scored = predict(&ConstantModel(1.234_567_89), &data).expect("scored");

    assert_eq!(scored.column_names(), vec!["NOP", PREDICTION_COLUMN]);
    assert_eq!(
        scored.column(PREDICTION_COLUMN).expect("prediction").cells(),
        vec![num(1.2346), num(1.2346)]
    );
}

#[test]
fn wrong_prediction_count_is_rejected() {
    let data = table(&["Luas"], vec![vec![num(1.0)], vec![num(2.0)]]);

    assert!(matches!(
        predict(&ShortModel, &data),
        Err(ToolError::Prediction(_))
    ));
}

#[test]
fn preview_never_exceeds_the_table() {
    let rows: Vec<Vec<Cell>> = (0..8).map(|i| vec![num(i as f64)]).collect();
    let data = table(&["Luas"], rows);

    let preview = Preview::new(&data, 5);
    assert_eq!(preview.head.row_count(), 5);
    assert_eq!(preview.total_rows, 8);
    assert_eq!(preview.head.column("Luas").expect("column").cells()[4], num(4.0));

    let short = table(&["Luas"], vec![vec![num(1.0)], vec![num(2.0)]]);
    assert_eq!(Preview::new(&short, 5).head.row_count(), 2);

    let rendered = preview.to_string();
    assert!(rendered.starts_with("Luas"));
    assert!(rendered.ends_with("(5 of 8 rows shown)"));
}

#[test]
fn export_round_trips_the_presented_table() {
    let dir = tempdir().expect("temporary directory");
    let model_path = write_model(dir.path(), "model.json", &linear_model());
    let model = load_model(&model_path).expect("model loaded");
    let pipeline = Pipeline::new(Config::new(&model_path));
    let input = excel_read::read_table(&sample_upload()).expect("upload parsed");

    let outcome = pipeline.run_with_model(&model, &input).expect("prediction");
    let decoded = excel_read::read_table(&outcome.download.bytes).expect("download parsed");

    assert_eq!(decoded, outcome.table);
    assert_eq!(decoded.column_names()[..2], [IDENTIFIER_COLUMN, PREDICTION_COLUMN]);
}

#[test]
fn config_file_values_are_merged_with_flags() {
    let dir = tempdir().expect("temporary directory");
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"model_path": "from_file", "preview_rows": 3, "download_name": "out.xlsx"}"#,
    )
    .expect("config written");

    let file = ConfigFile::load(&path).expect("config parsed");
    let config = Config::resolve(Some(file.clone()), None).expect("config resolved");
    assert_eq!(config.model_path, std::path::PathBuf::from("from_file"));
    assert_eq!(config.preview_rows, 3);
    assert_eq!(config.download_name, "out.xlsx");

    let overridden =
        Config::resolve(Some(file), Some("from_flag".into())).expect("config resolved");
    assert_eq!(overridden.model_path, std::path::PathBuf::from("from_flag"));

    assert!(matches!(
        Config::resolve(None, None),
        Err(ToolError::Config(_))
    ));
}
