//! Silver stage: run the silver schema and build scripts against bronze.

use std::time::Instant;

use diesel::Connection;

use medallion_shared::clients::db::{run_sql_script, DbPool};
use medallion_shared::{PipelineConfig, PipelineError, PipelineResult};

pub const SCHEMA_SCRIPT: &str = "silver_schema.sql";
pub const BUILD_SCRIPT: &str = "build_silver_layer.sql";

/// Execute the schema script and then the build script in one transaction.
///
/// Any SQL error rolls back both; nothing is partially committed.
pub fn run(config: &PipelineConfig, pool: &DbPool) -> PipelineResult<()> {
    let started = Instant::now();
    tracing::info!("starting silver layer build");

    let schema_path = config.sql_path(SCHEMA_SCRIPT);
    let build_path = config.sql_path(BUILD_SCRIPT);

    let mut conn = pool.get()?;
    conn.transaction::<_, PipelineError, _>(|conn| {
        run_sql_script(conn, &schema_path)?;
        run_sql_script(conn, &build_path)
    })?;

    tracing::info!(
        elapsed_secs = started.elapsed().as_secs_f64(),
        "silver layer build finished"
    );
    Ok(())
}
