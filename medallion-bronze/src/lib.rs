pub mod checksum;
pub mod frame;
pub mod loader;
pub mod source;

use std::time::Instant;

use diesel::Connection;

use medallion_shared::clients::db::{run_sql_script, DbPool};
use medallion_shared::clients::sheets::{SheetsClient, Spreadsheet};
use medallion_shared::{PipelineConfig, PipelineError, PipelineResult};

use crate::checksum::table_checksum;
use crate::frame::RawTable;
pub use crate::source::SheetSource;

pub const SCHEMA_SCRIPT: &str = "bronze_schema.sql";

/// What happened to each configured table during one bronze run.
#[derive(Debug, Default)]
pub struct BronzeSummary {
    pub loaded: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
    /// Set when the spreadsheet could not be reached; no table was attempted.
    pub source_error: Option<String>,
}

/// Outcome of landing a single table.
#[derive(Debug, PartialEq)]
pub enum TableOutcome {
    Loaded { rows: usize, checksum: String },
    Empty,
}

/// Apply the bronze DDL, then extract and replace every configured table.
///
/// Only the DDL is fatal. An unreachable spreadsheet ends the run early with
/// the error recorded in the summary, and per-table failures are logged and
/// skipped.
pub async fn run(config: &PipelineConfig, pool: &DbPool) -> PipelineResult<BronzeSummary> {
    let started = Instant::now();
    tracing::info!("starting bronze layer load");

    apply_schema(config, pool)?;

    let source = SheetsClient::connect(&config.credentials_path(), config.accept_invalid_certs).await;
    let summary = land_from_source(source, config, pool).await;

    tracing::info!(
        loaded = summary.loaded.len(),
        skipped = summary.skipped.len(),
        failed = summary.failed.len(),
        elapsed_secs = started.elapsed().as_secs_f64(),
        "bronze layer load finished"
    );
    Ok(summary)
}

/// Land every configured table from a connected source.
///
/// A source that failed to connect, or a spreadsheet that cannot be opened,
/// is recorded in `source_error` and nothing is attempted.
pub async fn land_from_source<S: SheetSource>(
    source: PipelineResult<S>,
    config: &PipelineConfig,
    pool: &DbPool,
) -> BronzeSummary {
    let mut summary = BronzeSummary::default();

    let source = match source {
        Ok(source) => source,
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to Google Sheets API");
            summary.source_error = Some(e.to_string());
            return summary;
        }
    };

    let spreadsheet = match source.open_spreadsheet(config).await {
        Ok(sheet) => sheet,
        Err(e @ PipelineError::SpreadsheetNotFound(_)) => {
            tracing::error!(
                spreadsheet = %config.spreadsheet_name,
                error = %e,
                "spreadsheet not found, check the name and sharing settings"
            );
            summary.source_error = Some(e.to_string());
            return summary;
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to open spreadsheet");
            summary.source_error = Some(e.to_string());
            return summary;
        }
    };
    tracing::info!(spreadsheet = %spreadsheet.title, worksheets = spreadsheet.worksheets.len(), "opened spreadsheet");

    for table_name in &config.tables {
        match land_table(&source, &spreadsheet, table_name, pool, config.insert_batch_size).await {
            Ok(TableOutcome::Loaded { rows, checksum }) => {
                tracing::info!(table = %table_name, rows, checksum = %checksum, "loaded bronze table");
                summary.loaded.push(table_name.clone());
            }
            Ok(TableOutcome::Empty) => {
                tracing::warn!(table = %table_name, "no data found in worksheet, skipping");
                summary.skipped.push(table_name.clone());
            }
            Err(PipelineError::WorksheetNotFound(_)) => {
                tracing::warn!(table = %table_name, "worksheet not found in the spreadsheet, skipping");
                summary.skipped.push(table_name.clone());
            }
            Err(e) => {
                tracing::error!(table = %table_name, error = %e, "failed to process table");
                summary.failed.push(table_name.clone());
            }
        }
    }
    summary
}

/// Create or reset the bronze schema. Failure here aborts the stage.
pub fn apply_schema(config: &PipelineConfig, pool: &DbPool) -> PipelineResult<()> {
    let mut conn = pool.get()?;
    let path = config.sql_path(SCHEMA_SCRIPT);
    conn.transaction::<_, PipelineError, _>(|conn| run_sql_script(conn, &path))?;
    tracing::info!("bronze schema ready");
    Ok(())
}

async fn land_table<S: SheetSource>(
    source: &S,
    spreadsheet: &Spreadsheet,
    table_name: &str,
    pool: &DbPool,
    batch_size: usize,
) -> PipelineResult<TableOutcome> {
    tracing::info!(table = %table_name, "extracting worksheet");
    let values = source.fetch_worksheet(spreadsheet, table_name).await?;
    let table = RawTable::from_values(table_name, &values);
    load_table(pool, &table, batch_size)
}

/// Fingerprint and replace one extracted table. Empty tables are left alone.
pub fn load_table(pool: &DbPool, table: &RawTable, batch_size: usize) -> PipelineResult<TableOutcome> {
    if table.is_empty() {
        return Ok(TableOutcome::Empty);
    }
    let checksum = table_checksum(table);
    tracing::info!(table = %table.name, rows = table.rows.len(), checksum = %checksum, "extracted worksheet");

    let mut conn = pool.get()?;
    let rows = loader::replace_table(&mut conn, table, batch_size)?;
    Ok(TableOutcome::Loaded { rows, checksum })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use diesel::pg::PgConnection;
    use diesel::r2d2::{ConnectionManager, Pool};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    enum Worksheet {
        Values(Value),
        Fails(&'static str),
    }

    /// Serves canned worksheets and records which titles were fetched.
    struct ScriptedSource {
        spreadsheet: Option<Spreadsheet>,
        worksheets: HashMap<&'static str, Worksheet>,
        fetched: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedSource {
        fn new(worksheets: Vec<(&'static str, Worksheet)>) -> Self {
            let spreadsheet = Spreadsheet {
                id: "sheet-1".into(),
                title: "Medallion_data".into(),
                worksheets: worksheets.iter().map(|(title, _)| title.to_string()).collect(),
            };
            Self {
                spreadsheet: Some(spreadsheet),
                worksheets: worksheets.into_iter().collect(),
                fetched: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn without_spreadsheet() -> Self {
            Self {
                spreadsheet: None,
                worksheets: HashMap::new(),
                fetched: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl SheetSource for ScriptedSource {
        async fn open_spreadsheet(&self, config: &PipelineConfig) -> PipelineResult<Spreadsheet> {
            self.spreadsheet
                .clone()
                .ok_or_else(|| PipelineError::SpreadsheetNotFound(config.spreadsheet_name.clone()))
        }

        async fn fetch_worksheet(&self, spreadsheet: &Spreadsheet, title: &str) -> PipelineResult<Vec<Vec<Value>>> {
            self.fetched.lock().unwrap().push(title.to_string());
            if !spreadsheet.has_worksheet(title) {
                return Err(PipelineError::WorksheetNotFound(title.to_string()));
            }
            match &self.worksheets[title] {
                Worksheet::Values(values) => Ok(serde_json::from_value(values.clone()).unwrap()),
                Worksheet::Fails(message) => Err(PipelineError::SourceApi(message.to_string())),
            }
        }
    }

    fn config(tables: &str) -> PipelineConfig {
        let vars = HashMap::from([("MEDALLION_TABLES".to_string(), tables.to_string())]);
        PipelineConfig::from_vars(Some(vars)).unwrap()
    }

    // Nothing listens on port 1, so every checkout fails quickly.
    fn unreachable_pool() -> DbPool {
        Pool::builder()
            .max_size(1)
            .min_idle(Some(0))
            .connection_timeout(Duration::from_millis(250))
            .build_unchecked(ConnectionManager::<PgConnection>::new(
                "postgres://medallion@127.0.0.1:1/medallion",
            ))
    }

    #[tokio::test]
    async fn connect_failure_is_recorded_and_nothing_is_attempted() {
        let summary = land_from_source::<ScriptedSource>(
            Err(PipelineError::SourceAuth("invalid private key".into())),
            &config("users,payments"),
            &unreachable_pool(),
        )
        .await;

        assert!(summary.source_error.unwrap().contains("invalid private key"));
        assert!(summary.loaded.is_empty());
        assert!(summary.skipped.is_empty());
        assert!(summary.failed.is_empty());
    }

    #[tokio::test]
    async fn missing_spreadsheet_ends_the_run_early() {
        let source = ScriptedSource::without_spreadsheet();
        let fetched = Arc::clone(&source.fetched);

        let summary = land_from_source(Ok(source), &config("users,payments"), &unreachable_pool()).await;

        assert!(summary.source_error.unwrap().contains("Medallion_data"));
        assert!(fetched.lock().unwrap().is_empty());
        assert!(summary.failed.is_empty());
    }

    #[tokio::test]
    async fn table_problems_are_recorded_and_the_run_continues() {
        let source = ScriptedSource::new(vec![
            ("devices", Worksheet::Values(json!([["device_id", "user_id"]]))),
            ("payments", Worksheet::Fails("503 Service Unavailable")),
            ("watchlist", Worksheet::Values(json!([["content_id", "title"], ["c1", "Dune"]]))),
        ]);
        let fetched = Arc::clone(&source.fetched);

        let summary = land_from_source(
            Ok(source),
            &config("users,devices,payments,watchlist"),
            &unreachable_pool(),
        )
        .await;

        assert_eq!(summary.source_error, None);
        // users has no worksheet and devices has only a header.
        assert_eq!(summary.skipped, vec!["users".to_string(), "devices".to_string()]);
        // payments fails to fetch and watchlist cannot reach the database.
        assert_eq!(summary.failed, vec!["payments".to_string(), "watchlist".to_string()]);
        assert!(summary.loaded.is_empty());
        assert_eq!(
            *fetched.lock().unwrap(),
            vec!["users", "devices", "payments", "watchlist"]
        );
    }
}
