mod support;

use assert_matches::assert_matches;

use datasource_admin::app::App;
use datasource_admin::error::AdminError;

use support::{Call, MockLookup, MockServer};

fn app(server: &MockServer) -> App<MockServer, MockLookup> {
    let mut app = App::new(server.clone(), None);
    assert!(app.load());
    app
}

#[test]
fn upload_without_staged_file_is_rejected() {
    let server = MockServer::with_ids(&["pid"]);
    let mut app = app(&server);

    assert_matches!(app.upload("pid"), Err(AdminError::NoFileStaged(id)) if id == "pid");
    assert!(server.writes().is_empty());
}

#[test]
fn successful_upload_marks_record_and_clears_stage() {
    let server = MockServer::with_ids(&["pid"]);
    let mut app = app(&server);
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("pid.owl.zip");
    std::fs::write(&file, b"PK").unwrap();
    let file = file.to_str().unwrap().to_string();

    app.stage_file("PID", file.as_str()).unwrap();
    let report = app.upload("pid").unwrap();

    assert!(report.uploaded);
    assert!(app.store().records()[0].uploaded);
    assert_eq!(server.writes(), vec![Call::Upload("pid".to_string(), file)]);
    assert_matches!(app.upload("pid"), Err(AdminError::NoFileStaged(_)));
}

#[test]
fn failed_upload_leaves_flag_and_clears_stage() {
    let server = MockServer::failing_writes(&["pid"]);
    let mut app = app(&server);

    app.stage_file("pid", "/data/pid.owl.zip").unwrap();
    let report = app.upload("pid").unwrap();

    assert!(!report.uploaded);
    assert!(!app.store().records()[0].uploaded);
    assert_matches!(app.upload("pid"), Err(AdminError::NoFileStaged(_)));
}

#[test]
fn staging_again_replaces_the_file() {
    let server = MockServer::with_ids(&["pid"]);
    let mut app = app(&server);

    app.stage_file("pid", "/data/first.zip").unwrap();
    app.stage_file("pid", "/data/second.zip").unwrap();
    app.upload("pid").unwrap();

    assert_eq!(
        server.writes(),
        vec![Call::Upload(
            "pid".to_string(),
            "/data/second.zip".to_string()
        )]
    );
}

#[test]
fn staging_for_unknown_record_fails() {
    let server = MockServer::with_ids(&["pid"]);
    let mut app = app(&server);

    assert_matches!(
        app.stage_file("reactome", "/data/r.zip"),
        Err(AdminError::RecordNotFound(_))
    );
}
