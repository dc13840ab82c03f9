//! SQLSTATE helpers shared by the storage layers.

use sea_orm::{DbErr, SqlErr};

/// Unique constraint violation codes across backends (Postgres 23505, SQLite 2067/1555).
pub fn is_unique_violation_code(code: &str) -> bool {
    matches!(code, "23505" | "2067" | "1555")
}

/// True if a SeaORM error was caused by a unique (or primary key) constraint.
pub fn is_unique_violation(err: &DbErr) -> bool {
    if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
        return true;
    }
    match err {
        DbErr::Exec(sea_orm::RuntimeErr::SqlxError(sqlx::Error::Database(db)))
        | DbErr::Query(sea_orm::RuntimeErr::SqlxError(sqlx::Error::Database(db))) => db
            .code()
            .map(|c| is_unique_violation_code(c.as_ref()))
            .unwrap_or(false),
        _ => false,
    }
}
