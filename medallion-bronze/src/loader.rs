use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::Jsonb;

use medallion_shared::clients::db::{qualified, quote_ident};
use medallion_shared::{PipelineError, PipelineResult, BRONZE_SCHEMA};

use crate::frame::{ColumnType, RawTable};

pub fn create_table_sql(table: &RawTable, types: &[ColumnType]) -> String {
    let columns = table
        .columns
        .iter()
        .zip(types)
        .map(|(name, ty)| format!("{} {}", quote_ident(name), ty.sql_type()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {} ({columns})", qualified(BRONZE_SCHEMA, &table.name))
}

/// Inserts a JSON array of row objects through `jsonb_populate_recordset`,
/// so one statement carries a whole batch through a single bind parameter.
pub fn insert_sql(table_name: &str) -> String {
    let target = qualified(BRONZE_SCHEMA, table_name);
    format!("INSERT INTO {target} SELECT * FROM jsonb_populate_recordset(NULL::{target}, $1)")
}

/// Drop and recreate `bronze.<table>` with the table's columns, then insert every row.
///
/// Runs in one transaction: a failure leaves the previous table in place.
pub fn replace_table(
    conn: &mut PgConnection,
    table: &RawTable,
    batch_size: usize,
) -> PipelineResult<usize> {
    let types = table.column_types();
    let target = qualified(BRONZE_SCHEMA, &table.name);
    let insert = insert_sql(&table.name);

    conn.transaction::<_, PipelineError, _>(|conn| {
        diesel::sql_query(format!("DROP TABLE IF EXISTS {target}")).execute(conn)?;
        diesel::sql_query(create_table_sql(table, &types)).execute(conn)?;

        let mut inserted = 0;
        for chunk in table.rows.chunks(batch_size.max(1)) {
            inserted += diesel::sql_query(&insert)
                .bind::<Jsonb, _>(table.records(chunk, &types))
                .execute(conn)?;
        }
        Ok(inserted)
    })
}
