use chrono::NaiveDate;
use diesel::pg::PgConnection;
use diesel::prelude::*;

use medallion_shared::{PipelineError, PipelineResult};

use crate::models::{DimContent, DimUser};
use crate::queries;
use crate::schema::{dim_content, dim_date, dim_user};
use crate::services::calendar::date_rows;
use crate::services::loader::append_rows;

/// Fixed calendar covered by `gold.dim_date`.
pub const CALENDAR_START: (i32, u32, u32) = (2018, 1, 1);
pub const CALENDAR_END: (i32, u32, u32) = (2025, 12, 31);

fn calendar_bound((y, m, d): (i32, u32, u32)) -> PipelineResult<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| PipelineError::internal(format!("invalid calendar bound {y}-{m}-{d}")))
}

pub fn build_dim_date(conn: &mut PgConnection, batch_size: usize) -> PipelineResult<usize> {
    tracing::info!("building gold.dim_date");
    let rows = date_rows(calendar_bound(CALENDAR_START)?, calendar_bound(CALENDAR_END)?);
    append_rows(conn, "dim_date", &rows, batch_size, |conn, chunk| {
        diesel::insert_into(dim_date::table).values(chunk).execute(conn)
    })
}

pub fn build_dim_content(conn: &mut PgConnection, batch_size: usize) -> PipelineResult<usize> {
    tracing::info!("building gold.dim_content");
    let rows: Vec<DimContent> = diesel::sql_query(queries::dim_content_query()).load(conn)?;
    append_rows(conn, "dim_content", &rows, batch_size, |conn, chunk| {
        diesel::insert_into(dim_content::table).values(chunk).execute(conn)
    })
}

pub fn build_dim_user(conn: &mut PgConnection, batch_size: usize) -> PipelineResult<usize> {
    tracing::info!("building gold.dim_user");
    let rows: Vec<DimUser> = diesel::sql_query(queries::dim_user_query()).load(conn)?;
    append_rows(conn, "dim_user", &rows, batch_size, |conn, chunk| {
        diesel::insert_into(dim_user::table).values(chunk).execute(conn)
    })
}
