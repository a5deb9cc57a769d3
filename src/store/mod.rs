//! Persistence operations over the tracker tables.
//!
//! Every operation is a single logical record change; multi-row changes
//! (an airdrop together with its tasks) run inside one transaction.

use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, Func, IntoColumnRef, LikeExpr, SimpleExpr};
use sea_orm::{DbBackend, DbErr};

pub mod airdrops;
pub mod listings;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        Self::NotFound { entity, id }
    }
}

/// Case-insensitive substring match; LIKE wildcards in `needle` match literally.
///
/// Postgres uses `ILIKE`, which folds Unicode. Other backends compare against
/// `LOWER(column)`; SQLite's `LOWER` only folds ASCII, so non-ASCII letters
/// there match case-sensitively.
pub(crate) fn contains_insensitive<C>(backend: DbBackend, column: C, needle: &str) -> SimpleExpr
where
    C: IntoColumnRef,
{
    match backend {
        DbBackend::Postgres => {
            let pattern = format!("%{}%", escape_like(needle));
            Expr::col(column).ilike(LikeExpr::new(pattern).escape('\\'))
        }
        _ => {
            let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
            Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\'))
        }
    }
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Trims a list filter, treating blank input as "no filter".
pub fn normalize_filter(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
pub(crate) mod test_support {
    use migration::MigratorTrait;
    use sea_orm::{ConnectOptions, Database, DatabaseConnection};

    pub async fn memory_database() -> DatabaseConnection {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).sqlx_logging(false);
        let database = Database::connect(options)
            .await
            .expect("in-memory sqlite");
        migration::Migrator::up(&database, None)
            .await
            .expect("migrations apply");
        database
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("100%_a\\b"), "100\\%\\_a\\\\b");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn postgres_filter_uses_ilike() {
        use sea_orm::sea_query::{Alias, PostgresQueryBuilder, Query, SqliteQueryBuilder};

        let select = |backend| {
            Query::select()
                .column(Alias::new("name"))
                .from(Alias::new("faucets"))
                .and_where(contains_insensitive(backend, Alias::new("name"), "Über"))
                .to_owned()
        };

        let postgres = select(DbBackend::Postgres).to_string(PostgresQueryBuilder);
        assert!(postgres.contains(r#""name" ILIKE '%Über%'"#), "{postgres}");
        assert!(!postgres.contains("LOWER"), "{postgres}");

        let sqlite = select(DbBackend::Sqlite).to_string(SqliteQueryBuilder);
        assert!(sqlite.contains(r#"LOWER("name") LIKE '%über%'"#), "{sqlite}");
    }

    #[test]
    fn blank_filter_is_ignored() {
        assert_eq!(normalize_filter(None), None);
        assert_eq!(normalize_filter(Some("   ")), None);
        assert_eq!(normalize_filter(Some(" zk ")), Some("zk"));
    }
}
