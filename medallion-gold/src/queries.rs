//! Read queries that shape silver tables into gold dimension and fact rows.
//!
//! Column aliases match the gold table columns so results load straight into
//! the `QueryableByName` models.

use medallion_shared::{GOLD_SCHEMA, SILVER_SCHEMA};

pub fn dim_content_query() -> String {
    format!(
        "SELECT \
             w.content_id AS content_key, \
             w.title, \
             ct.content_type_name, \
             g.genre_name, \
             w.release_year \
         FROM {silver}.watchlist w \
         LEFT JOIN {silver}.dim_content_types ct ON w.content_type_id = ct.content_type_id \
         LEFT JOIN {silver}.dim_genres g ON w.genre_id = g.genre_id",
        silver = SILVER_SCHEMA,
    )
}

/// One row per user. The current plan comes from the subscription with the
/// latest start date (rank 1 per user); the user is active when that
/// subscription has no end date or ends after today.
pub fn dim_user_query() -> String {
    format!(
        "WITH latest_subscription AS ( \
             SELECT \
                 s.user_legacy_id, \
                 s.start_date, \
                 s.end_date, \
                 s.plan_type_id, \
                 ROW_NUMBER() OVER (PARTITION BY s.user_legacy_id ORDER BY s.start_date DESC) AS rn \
             FROM {silver}.subscriptions s \
         ) \
         SELECT \
             TRIM(u.user_legacy_id) AS user_key, \
             u.name, \
             u.email, \
             l.country_name, \
             l.region_name, \
             MIN(sub.start_date) AS first_subscription_date, \
             pt.plan_type_name AS current_plan_type, \
             (latest_sub.end_date IS NULL OR latest_sub.end_date > CURRENT_DATE) AS is_active \
         FROM {silver}.users u \
         LEFT JOIN {silver}.locations l ON u.country_id = l.country_id \
         LEFT JOIN {silver}.subscriptions sub ON u.user_legacy_id = sub.user_legacy_id \
         LEFT JOIN latest_subscription latest_sub \
             ON u.user_legacy_id = latest_sub.user_legacy_id AND latest_sub.rn = 1 \
         LEFT JOIN {silver}.dim_plan_types pt ON latest_sub.plan_type_id = pt.plan_type_id \
         GROUP BY \
             TRIM(u.user_legacy_id), u.name, u.email, l.country_name, l.region_name, \
             pt.plan_type_name, latest_sub.end_date",
        silver = SILVER_SCHEMA,
    )
}

/// One row per payment, dated by the subscription's start date.
pub fn subscription_events_query() -> String {
    format!(
        "SELECT \
             d.date_key, \
             u.user_key, \
             et.event_type_name, \
             p.amount::DOUBLE PRECISION AS mrr_change \
         FROM {silver}.payments p \
         JOIN {silver}.subscriptions s ON p.sub_id = s.sub_id \
         JOIN {gold}.dim_user u ON TRIM(p.user_legacy_id) = u.user_key \
         JOIN {gold}.dim_date d ON s.start_date = d.full_date \
         JOIN {silver}.dim_event_types et ON s.last_event_type_id = et.event_type_id",
        silver = SILVER_SCHEMA,
        gold = GOLD_SCHEMA,
    )
}

/// One row per viewing session, dated by the session start.
pub fn viewing_activity_query() -> String {
    format!(
        "SELECT \
             d.date_key, \
             u.user_key, \
             c.content_key, \
             va.device_id, \
             va.duration_watched_sec, \
             va.rating AS user_rating \
         FROM {silver}.viewing_activity va \
         JOIN {gold}.dim_user u ON TRIM(va.user_legacy_id) = u.user_key \
         JOIN {gold}.dim_content c ON va.content_id = c.content_key \
         JOIN {gold}.dim_date d ON va.session_start_ts::DATE = d.full_date",
        silver = SILVER_SCHEMA,
        gold = GOLD_SCHEMA,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_subscription_ranks_by_start_date_descending() {
        let sql = dim_user_query();
        assert!(sql.contains("PARTITION BY s.user_legacy_id ORDER BY s.start_date DESC"));
        assert!(sql.contains("latest_sub.rn = 1"));
        assert!(sql.contains("latest_sub.end_date IS NULL OR latest_sub.end_date > CURRENT_DATE"));
    }

    #[test]
    fn facts_match_users_on_trimmed_legacy_id() {
        assert!(subscription_events_query().contains("TRIM(p.user_legacy_id) = u.user_key"));
        assert!(viewing_activity_query().contains("TRIM(va.user_legacy_id) = u.user_key"));
    }

    #[test]
    fn fact_dates_come_from_start_dates() {
        assert!(subscription_events_query().contains("s.start_date = d.full_date"));
        assert!(viewing_activity_query().contains("va.session_start_ts::DATE = d.full_date"));
    }

    #[test]
    fn queries_read_silver_and_gold_schemas() {
        assert!(dim_content_query().contains("FROM silver.watchlist w"));
        assert!(subscription_events_query().contains("JOIN gold.dim_date d"));
        assert!(!dim_content_query().contains("{silver}"));
    }
}
