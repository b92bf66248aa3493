use chrono::{Datelike, NaiveDate};

use crate::models::DimDate;

/// One `dim_date` row per calendar day from `start` to `end`, both inclusive.
///
/// `day_of_week` is ISO (Monday = 1 .. Sunday = 7) and weekends are days 6 and 7.
pub fn date_rows(start: NaiveDate, end: NaiveDate) -> Vec<DimDate> {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(date_row)
        .collect()
}

pub fn date_row(date: NaiveDate) -> DimDate {
    let year = date.year();
    let month = date.month() as i32;
    let day = date.day() as i32;
    let day_of_week = date.weekday().number_from_monday() as i32;

    DimDate {
        date_key: year * 10_000 + month * 100 + day,
        full_date: date,
        year,
        quarter: (month - 1) / 3 + 1,
        month,
        day,
        day_of_week,
        month_name: date.format("%B").to_string(),
        is_weekend: day_of_week >= 6,
    }
}
