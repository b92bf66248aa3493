//! Silver scripts run in a single transaction.
//!
//! Needs MEDALLION_TEST_DATABASE_URL pointing at a disposable database.

use std::collections::HashMap;
use std::fs;

use diesel::prelude::*;
use diesel::sql_types::Bool;

use medallion_shared::clients::db::create_pool;
use medallion_shared::{ErrorCode, PipelineConfig};

#[derive(QueryableByName)]
struct Exists {
    #[diesel(sql_type = Bool)]
    present: bool,
}

#[test]
fn failing_build_script_rolls_back_schema_script() {
    let Ok(url) = std::env::var("MEDALLION_TEST_DATABASE_URL") else {
        eprintln!("MEDALLION_TEST_DATABASE_URL not set, skipping database test");
        return;
    };

    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(medallion_silver::SCHEMA_SCRIPT),
        "CREATE SCHEMA IF NOT EXISTS silver_rollback_probe;\n\
         CREATE TABLE silver_rollback_probe.marker (id INTEGER);\n",
    )
    .unwrap();
    fs::write(
        dir.path().join(medallion_silver::BUILD_SCRIPT),
        "INSERT INTO silver_rollback_probe.marker SELECT id FROM bronze.no_such_table;\n",
    )
    .unwrap();

    let vars: HashMap<String, String> = [
        ("MEDALLION_SQL_DIR".to_string(), dir.path().display().to_string()),
        ("MEDALLION_DATABASE_URL".to_string(), url.clone()),
    ]
    .into_iter()
    .collect();
    let config = PipelineConfig::from_vars(Some(vars)).unwrap();
    let pool = create_pool(&url).unwrap();

    let err = medallion_silver::run(&config, &pool).unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ScriptFailed);

    let mut conn = pool.get().unwrap();
    let probe = diesel::sql_query(
        "SELECT EXISTS (SELECT 1 FROM pg_namespace WHERE nspname = 'silver_rollback_probe') AS present",
    )
    .get_result::<Exists>(&mut conn)
    .unwrap();
    assert!(!probe.present);
}

#[test]
fn missing_script_file_fails_the_stage() {
    let Ok(url) = std::env::var("MEDALLION_TEST_DATABASE_URL") else {
        eprintln!("MEDALLION_TEST_DATABASE_URL not set, skipping database test");
        return;
    };

    let dir = tempfile::tempdir().unwrap();
    let vars: HashMap<String, String> = [
        ("MEDALLION_SQL_DIR".to_string(), dir.path().display().to_string()),
        ("MEDALLION_DATABASE_URL".to_string(), url.clone()),
    ]
    .into_iter()
    .collect();
    let config = PipelineConfig::from_vars(Some(vars)).unwrap();
    let pool = create_pool(&url).unwrap();

    let err = medallion_silver::run(&config, &pool).unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ScriptFailed);
    assert!(err.to_string().contains(medallion_silver::SCHEMA_SCRIPT));
}
