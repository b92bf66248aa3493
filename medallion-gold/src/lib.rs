//! Gold stage: star schema built from silver tables.

pub mod models;
pub mod queries;
pub mod schema;
pub mod services;

use std::time::Instant;

use diesel::Connection;

use medallion_shared::clients::db::{run_sql_script, DbPool};
use medallion_shared::{PipelineConfig, PipelineError, PipelineResult};

use crate::services::{dimensions, facts};

pub const SCHEMA_SCRIPT: &str = "gold_schema.sql";

/// Row counts appended to each gold table during one build.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GoldSummary {
    pub dim_date: usize,
    pub dim_content: usize,
    pub dim_user: usize,
    pub fact_subscription_events: usize,
    pub fact_viewing_activity: usize,
}

/// Reset the gold schema, then build dimensions followed by facts.
///
/// Any failure aborts the remaining steps and is returned to the caller,
/// which logs it.
pub fn run(config: &PipelineConfig, pool: &DbPool) -> PipelineResult<GoldSummary> {
    let started = Instant::now();
    tracing::info!("starting gold layer build");

    let summary = build(config, pool)?;
    tracing::info!(
        ?summary,
        elapsed_secs = started.elapsed().as_secs_f64(),
        "gold layer build finished"
    );
    Ok(summary)
}

fn build(config: &PipelineConfig, pool: &DbPool) -> PipelineResult<GoldSummary> {
    apply_schema(config, pool)?;
    let mut summary = build_dimensions(pool, config.insert_batch_size)?;
    let (events, viewing) = build_facts(pool, config.insert_batch_size)?;
    summary.fact_subscription_events = events;
    summary.fact_viewing_activity = viewing;
    Ok(summary)
}

pub fn apply_schema(config: &PipelineConfig, pool: &DbPool) -> PipelineResult<()> {
    let mut conn = pool.get()?;
    let path = config.sql_path(SCHEMA_SCRIPT);
    conn.transaction::<_, PipelineError, _>(|conn| run_sql_script(conn, &path))
}

/// Date, content, and user dimensions, each step on its own connection checkout.
pub fn build_dimensions(pool: &DbPool, batch_size: usize) -> PipelineResult<GoldSummary> {
    let mut conn = pool.get()?;
    let dim_date = dimensions::build_dim_date(&mut conn, batch_size)?;
    drop(conn);

    let mut conn = pool.get()?;
    let dim_content = dimensions::build_dim_content(&mut conn, batch_size)?;
    drop(conn);

    let mut conn = pool.get()?;
    let dim_user = dimensions::build_dim_user(&mut conn, batch_size)?;
    Ok(GoldSummary {
        dim_date,
        dim_content,
        dim_user,
        ..GoldSummary::default()
    })
}

/// Subscription-event and viewing facts joined against the current dimensions.
///
/// Rows are appended. Calling this again without resetting the schema
/// duplicates every fact row.
pub fn build_facts(pool: &DbPool, batch_size: usize) -> PipelineResult<(usize, usize)> {
    let mut conn = pool.get()?;
    let events = facts::build_subscription_events(&mut conn, batch_size)?;
    drop(conn);

    let mut conn = pool.get()?;
    let viewing = facts::build_viewing_activity(&mut conn, batch_size)?;
    Ok((events, viewing))
}
