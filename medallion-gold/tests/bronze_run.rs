//! Bronze table-level outcomes against a real PostgreSQL database.
//!
//! Set MEDALLION_TEST_DATABASE_URL to a disposable database to run these.

mod common;

use std::collections::HashMap;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use medallion_bronze::{land_from_source, SheetSource};
use medallion_shared::clients::sheets::Spreadsheet;
use medallion_shared::{PipelineConfig, PipelineError, PipelineResult};

use common::{count, lock_db, test_env};

/// Worksheets keyed by title; `None` makes the fetch fail.
struct CannedSheets {
    worksheets: HashMap<&'static str, Option<Value>>,
}

impl SheetSource for CannedSheets {
    async fn open_spreadsheet(&self, _config: &PipelineConfig) -> PipelineResult<Spreadsheet> {
        Ok(Spreadsheet {
            id: "sheet-1".into(),
            title: "Medallion_data".into(),
            worksheets: self.worksheets.keys().map(|title| title.to_string()).collect(),
        })
    }

    async fn fetch_worksheet(&self, spreadsheet: &Spreadsheet, title: &str) -> PipelineResult<Vec<Vec<Value>>> {
        if !spreadsheet.has_worksheet(title) {
            return Err(PipelineError::WorksheetNotFound(title.to_string()));
        }
        match &self.worksheets[title] {
            Some(values) => Ok(serde_json::from_value(values.clone()).unwrap()),
            None => Err(PipelineError::SourceApi("500 Internal Server Error".into())),
        }
    }
}

#[tokio::test]
async fn failed_table_does_not_stop_later_tables() {
    let _guard = lock_db();
    let Some((config, pool)) = test_env() else { return };

    medallion_bronze::apply_schema(&config, &pool).unwrap();
    let sheets = CannedSheets {
        worksheets: HashMap::from([
            ("payments", None),
            ("users", Some(json!([["id", "name"], [1, "Alice"], [2, "Bob"]]))),
        ]),
    };
    let config = PipelineConfig {
        tables: vec!["payments".into(), "watchlist".into(), "users".into()],
        ..config
    };

    let summary = land_from_source(Ok(sheets), &config, &pool).await;

    assert_eq!(summary.source_error, None);
    assert_eq!(summary.failed, vec!["payments".to_string()]);
    assert_eq!(summary.skipped, vec!["watchlist".to_string()]);
    assert_eq!(summary.loaded, vec!["users".to_string()]);
    assert_eq!(count(&pool, "bronze.users"), 2);
    // The failed and missing tables keep their empty placeholders.
    assert_eq!(count(&pool, "bronze.payments"), 0);
    assert_eq!(count(&pool, "bronze.watchlist"), 0);
}
