use diesel::pg::PgConnection;
use diesel::prelude::*;

use medallion_shared::PipelineResult;

use crate::models::{SubscriptionEventFact, ViewingActivityFact};
use crate::queries;
use crate::schema::{fact_subscription_events, fact_viewing_activity};
use crate::services::loader::append_rows;

pub fn build_subscription_events(conn: &mut PgConnection, batch_size: usize) -> PipelineResult<usize> {
    tracing::info!("building gold.fact_subscription_events");
    let rows: Vec<SubscriptionEventFact> =
        diesel::sql_query(queries::subscription_events_query()).load(conn)?;
    append_rows(conn, "fact_subscription_events", &rows, batch_size, |conn, chunk| {
        diesel::insert_into(fact_subscription_events::table).values(chunk).execute(conn)
    })
}

pub fn build_viewing_activity(conn: &mut PgConnection, batch_size: usize) -> PipelineResult<usize> {
    tracing::info!("building gold.fact_viewing_activity");
    let rows: Vec<ViewingActivityFact> =
        diesel::sql_query(queries::viewing_activity_query()).load(conn)?;
    append_rows(conn, "fact_viewing_activity", &rows, batch_size, |conn, chunk| {
        diesel::insert_into(fact_viewing_activity::table).values(chunk).execute(conn)
    })
}
