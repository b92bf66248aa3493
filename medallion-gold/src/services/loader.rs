use diesel::pg::PgConnection;
use diesel::result::QueryResult;
use diesel::Connection;

use medallion_shared::{PipelineError, PipelineResult, GOLD_SCHEMA};

/// Append `rows` to a gold table in batches, inside one transaction.
///
/// Existing rows are never touched, so running this twice duplicates the data.
/// An empty result set is skipped with a warning.
pub fn append_rows<T, F>(
    conn: &mut PgConnection,
    table_name: &str,
    rows: &[T],
    batch_size: usize,
    insert: F,
) -> PipelineResult<usize>
where
    F: Fn(&mut PgConnection, &[T]) -> QueryResult<usize>,
{
    let target = format!("{GOLD_SCHEMA}.{table_name}");
    if rows.is_empty() {
        tracing::warn!(table = %target, "result set is empty, skipping");
        return Ok(0);
    }

    tracing::info!(table = %target, rows = rows.len(), "loading rows");
    let inserted = conn.transaction::<_, PipelineError, _>(|conn| {
        let mut inserted = 0;
        for chunk in rows.chunks(batch_size.max(1)) {
            inserted += insert(conn, chunk)?;
        }
        Ok(inserted)
    })?;
    tracing::info!(table = %target, rows = inserted, "loaded rows");
    Ok(inserted)
}
