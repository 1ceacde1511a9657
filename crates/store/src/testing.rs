//! Shared test fixtures.

use sqlx::SqlitePool;

pub(crate) use irve_model::testing::statique;

/// Registers the `FR123` operational unit used by [`statique`].
pub(crate) async fn register_fr123(pool: &SqlitePool) {
    sqlx::query(
        "INSERT INTO operationalunit (id, code, name, type, created_at, updated_at) \
         VALUES ('00000000-0000-4000-8000-000000000123', 'FR123', 'Recharge Test', 1, 0, 0)",
    )
    .execute(pool)
    .await
    .unwrap();
}

pub(crate) async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}")).fetch_one(pool).await.unwrap()
}
