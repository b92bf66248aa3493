#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use diesel::prelude::*;
use diesel::sql_types::BigInt;
use serde_json::Value;

use medallion_bronze::frame::RawTable;
use medallion_shared::clients::db::{create_pool, DbPool};
use medallion_shared::PipelineConfig;

pub const TEST_DATABASE_ENV: &str = "MEDALLION_TEST_DATABASE_URL";

static DB_LOCK: Mutex<()> = Mutex::new(());

/// Serializes tests that reset the shared bronze/silver/gold schemas.
pub fn lock_db() -> MutexGuard<'static, ()> {
    DB_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Config pointing at the workspace `sql/` directory and the test database.
/// `None` when no test database is configured; callers skip.
pub fn test_env() -> Option<(PipelineConfig, DbPool)> {
    let Ok(url) = std::env::var(TEST_DATABASE_ENV) else {
        eprintln!("{TEST_DATABASE_ENV} not set, skipping database test");
        return None;
    };
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..");
    let vars: HashMap<String, String> = [
        ("MEDALLION_PROJECT_ROOT".to_string(), root.display().to_string()),
        ("MEDALLION_DATABASE_URL".to_string(), url.clone()),
    ]
    .into_iter()
    .collect();
    let config = PipelineConfig::from_vars(Some(vars)).expect("test config");
    let pool = create_pool(&url).expect("test pool");
    Some((config, pool))
}

/// Land a worksheet fixture (header row first) into bronze.
pub fn land(pool: &DbPool, name: &str, sheet: Value) {
    let values: Vec<Vec<Value>> = serde_json::from_value(sheet).expect("sheet fixture");
    let table = RawTable::from_values(name, &values);
    medallion_bronze::load_table(pool, &table, 100).expect("bronze load");
}

#[derive(QueryableByName)]
struct Count {
    #[diesel(sql_type = BigInt)]
    n: i64,
}

pub fn count(pool: &DbPool, table: &str) -> i64 {
    let mut conn = pool.get().expect("connection");
    diesel::sql_query(format!("SELECT COUNT(*) AS n FROM {table}"))
        .get_result::<Count>(&mut conn)
        .expect("count query")
        .n
}
