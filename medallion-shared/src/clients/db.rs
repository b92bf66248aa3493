use std::path::Path;

use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};

use crate::errors::{PipelineError, PipelineResult};

pub type DbPool = Pool<ConnectionManager<PgConnection>>;
pub type DbConn = PooledConnection<ConnectionManager<PgConnection>>;

/// Stages run one unit of work at a time, so the pool stays small.
pub fn create_pool(database_url: &str) -> PipelineResult<DbPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(2)
        .min_idle(Some(0))
        .test_on_check_out(true)
        .build(manager)?;

    tracing::info!("database connection pool created");
    Ok(pool)
}

/// Read a SQL file and execute its statements as a single batch.
///
/// Callers decide the transaction scope; the script itself is not wrapped.
pub fn run_sql_script(conn: &mut PgConnection, path: &Path) -> PipelineResult<()> {
    tracing::info!(script = %path.display(), "executing sql script");
    let sql = std::fs::read_to_string(path)
        .map_err(|e| PipelineError::script(path, PipelineError::Io(e)))?;
    conn.batch_execute(&sql)
        .map_err(|e| PipelineError::script(path, PipelineError::Database(e)))?;
    tracing::info!(script = %path.display(), "sql script executed");
    Ok(())
}

/// Quote a PostgreSQL identifier, doubling embedded quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// `schema.table` with both parts quoted.
pub fn qualified(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}
