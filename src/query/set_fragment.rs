use super::error::QueryError;
use super::types::{column_for, quote_identifier, ColumnMap, FieldUpdates, SqlFragment};

/// Render a partial update as `"col1"=$1, "col2"=$2, ...`.
///
/// Values are returned in placeholder order and are never written into the
/// SQL text. Column names come from `columns` (or the logical field name on
/// a miss) and are quoted as identifiers.
pub fn build_set_fragment(updates: &FieldUpdates, columns: ColumnMap) -> Result<SqlFragment, QueryError> {
    if updates.is_empty() {
        return Err(QueryError::EmptyInput);
    }

    let mut clauses = Vec::with_capacity(updates.len());
    let mut values = Vec::with_capacity(updates.len());

    for (idx, (field, value)) in updates.iter().enumerate() {
        let column = quote_identifier(column_for(columns, field));
        clauses.push(format!("{}=${}", column, idx + 1));
        values.push(value.clone());
    }

    Ok(SqlFragment { sql: clauses.join(", "), values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SqlValue;

    const COLUMNS: ColumnMap = &[("firstName", "first_name"), ("isAdmin", "is_admin")];

    #[test]
    fn empty_updates_are_rejected() {
        let err = build_set_fragment(&FieldUpdates::new(), COLUMNS).unwrap_err();
        assert_eq!(err, QueryError::EmptyInput);
    }

    #[test]
    fn renders_one_clause_per_field_in_supply_order() {
        let mut updates = FieldUpdates::new();
        updates.set("firstName", "Aliya").set("age", 32);

        let fragment = build_set_fragment(&updates, COLUMNS).unwrap();
        assert_eq!(fragment.sql, "\"first_name\"=$1, \"age\"=$2");
        assert_eq!(fragment.values, vec![SqlValue::text("Aliya"), SqlValue::Int(Some(32))]);
        assert_eq!(fragment.next_placeholder(), 3);
    }

    #[test]
    fn supply_order_drives_numbering() {
        let mut updates = FieldUpdates::new();
        updates.set("isAdmin", true).set("firstName", "Bo");

        let fragment = build_set_fragment(&updates, COLUMNS).unwrap();
        assert_eq!(fragment.sql, "\"is_admin\"=$1, \"first_name\"=$2");
        assert_eq!(fragment.values[0], SqlValue::Bool(Some(true)));
    }

    #[test]
    fn placeholders_are_unique_and_match_value_count() {
        let fields = ["a", "b", "c", "d", "e", "f", "g"];
        let updates: FieldUpdates = fields.iter().map(|f| (*f, SqlValue::text(*f))).collect();

        let fragment = build_set_fragment(&updates, COLUMNS).unwrap();
        let clauses: Vec<&str> = fragment.sql.split(", ").collect();
        assert_eq!(clauses.len(), fields.len());
        assert_eq!(fragment.values.len(), fields.len());
        for (i, clause) in clauses.iter().enumerate() {
            assert!(clause.ends_with(&format!("=${}", i + 1)), "clause {} was {}", i, clause);
        }
    }

    #[test]
    fn null_values_are_bound_not_rendered() {
        let mut updates = FieldUpdates::new();
        updates.set("logoUrl", SqlValue::Text(None));

        let fragment = build_set_fragment(&updates, COLUMNS).unwrap();
        assert_eq!(fragment.sql, "\"logoUrl\"=$1");
        assert!(fragment.values[0].is_null());
        assert!(!fragment.sql.contains("NULL"));
    }

    #[test]
    fn user_text_never_reaches_sql() {
        let mut updates = FieldUpdates::new();
        updates.set("firstName", "x'; DROP TABLE users; --");

        let fragment = build_set_fragment(&updates, COLUMNS).unwrap();
        assert!(!fragment.sql.contains("DROP"));
        assert_eq!(fragment.values, vec![SqlValue::text("x'; DROP TABLE users; --")]);
    }
}
