use sqlx::{postgres::PgArguments, postgres::PgRow, FromRow, Postgres};

use super::types::SqlValue;

/// Bind fragment values onto a `sqlx::query` in placeholder order.
pub fn bind_values<'q>(
    mut q: sqlx::query::Query<'q, Postgres, PgArguments>,
    values: &'q [SqlValue],
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    for v in values {
        q = match v {
            SqlValue::Bool(b) => q.bind(*b),
            SqlValue::Int(i) => q.bind(*i),
            SqlValue::Text(s) => q.bind(s.as_deref()),
            SqlValue::Decimal(d) => q.bind(*d),
        };
    }
    q
}

/// Same as [`bind_values`] for `sqlx::query_as`.
pub fn bind_values_as<'q, O>(
    mut q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    values: &'q [SqlValue],
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    for v in values {
        q = match v {
            SqlValue::Bool(b) => q.bind(*b),
            SqlValue::Int(i) => q.bind(*i),
            SqlValue::Text(s) => q.bind(s.as_deref()),
            SqlValue::Decimal(d) => q.bind(*d),
        };
    }
    q
}
