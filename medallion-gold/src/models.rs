use chrono::NaiveDate;
use diesel::prelude::*;

use crate::schema::{dim_content, dim_date, dim_user, fact_subscription_events, fact_viewing_activity};

// --- Dimensions ---

#[derive(Debug, Clone, PartialEq, Queryable, Insertable)]
#[diesel(table_name = dim_date)]
pub struct DimDate {
    pub date_key: i32,
    pub full_date: NaiveDate,
    pub year: i32,
    pub quarter: i32,
    pub month: i32,
    pub day: i32,
    pub day_of_week: i32,
    pub month_name: String,
    pub is_weekend: bool,
}

#[derive(Debug, Clone, PartialEq, QueryableByName, Insertable)]
#[diesel(table_name = dim_content)]
pub struct DimContent {
    pub content_key: String,
    pub title: Option<String>,
    pub content_type_name: Option<String>,
    pub genre_name: Option<String>,
    pub release_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, QueryableByName, Queryable, Insertable)]
#[diesel(table_name = dim_user)]
pub struct DimUser {
    pub user_key: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub country_name: Option<String>,
    pub region_name: Option<String>,
    pub first_subscription_date: Option<NaiveDate>,
    pub current_plan_type: Option<String>,
    pub is_active: bool,
}

// --- Facts ---

#[derive(Debug, Clone, PartialEq, QueryableByName, Insertable)]
#[diesel(table_name = fact_subscription_events)]
pub struct SubscriptionEventFact {
    pub date_key: i32,
    pub user_key: String,
    pub event_type_name: String,
    pub mrr_change: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, QueryableByName, Insertable)]
#[diesel(table_name = fact_viewing_activity)]
pub struct ViewingActivityFact {
    pub date_key: i32,
    pub user_key: String,
    pub content_key: String,
    pub device_id: Option<String>,
    pub duration_watched_sec: Option<i32>,
    pub user_rating: Option<i32>,
}
