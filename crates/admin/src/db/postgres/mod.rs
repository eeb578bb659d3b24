//! `PostgreSQL` repository backend.
//!
//! Queries are built at runtime (`query_as` / `QueryBuilder`) against the
//! `admin` schema created by the migrations. Row types stay private and are
//! converted to domain types with `TryFrom`, surfacing bad data as
//! `RepositoryError::DataCorruption`.

mod activity_logs;
mod admin_users;
mod orders;
mod products;

pub use activity_logs::PgActivityLog;
pub use admin_users::PgAdminUsers;
pub use orders::PgOrders;
pub use products::PgProducts;

use super::RepositoryError;

/// Convert a database count to `u64`.
fn to_count(value: i64) -> Result<u64, RepositoryError> {
    u64::try_from(value)
        .map_err(|_| RepositoryError::DataCorruption(format!("negative count: {value}")))
}

/// Map unique violations to `Conflict`, everything else to `Database`.
fn conflict_or_database(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(err)
}
