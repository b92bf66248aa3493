// Gold star schema, kept in step with sql/gold_schema.sql.

diesel::table! {
    gold.dim_date (date_key) {
        date_key -> Int4,
        full_date -> Date,
        year -> Int4,
        quarter -> Int4,
        month -> Int4,
        day -> Int4,
        day_of_week -> Int4,
        #[max_length = 20]
        month_name -> Varchar,
        is_weekend -> Bool,
    }
}

diesel::table! {
    gold.dim_content (content_key) {
        content_key -> Text,
        title -> Nullable<Text>,
        content_type_name -> Nullable<Text>,
        genre_name -> Nullable<Text>,
        release_year -> Nullable<Int4>,
    }
}

diesel::table! {
    gold.dim_user (user_key) {
        user_key -> Text,
        name -> Nullable<Text>,
        email -> Nullable<Text>,
        country_name -> Nullable<Text>,
        region_name -> Nullable<Text>,
        first_subscription_date -> Nullable<Date>,
        current_plan_type -> Nullable<Text>,
        is_active -> Bool,
    }
}

diesel::table! {
    gold.fact_subscription_events (event_id) {
        event_id -> Int8,
        date_key -> Int4,
        user_key -> Text,
        event_type_name -> Text,
        mrr_change -> Nullable<Float8>,
    }
}

diesel::table! {
    gold.fact_viewing_activity (viewing_id) {
        viewing_id -> Int8,
        date_key -> Int4,
        user_key -> Text,
        content_key -> Text,
        device_id -> Nullable<Text>,
        duration_watched_sec -> Nullable<Int4>,
        user_rating -> Nullable<Int4>,
    }
}

diesel::joinable!(fact_subscription_events -> dim_date (date_key));
diesel::joinable!(fact_subscription_events -> dim_user (user_key));
diesel::joinable!(fact_viewing_activity -> dim_date (date_key));
diesel::joinable!(fact_viewing_activity -> dim_user (user_key));
diesel::joinable!(fact_viewing_activity -> dim_content (content_key));

diesel::allow_tables_to_appear_in_same_query!(
    dim_date,
    dim_content,
    dim_user,
    fact_subscription_events,
    fact_viewing_activity,
);
