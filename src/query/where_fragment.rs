use super::error::QueryError;
use super::types::{FilterTerms, FilterValue, SqlFragment, SqlValue, TriState};

/// How a present filter term turns into a WHERE clause.
#[derive(Debug, Clone, Copy)]
pub enum Predicate {
    /// `"<template> $n"` with the term bound as `$n`, passed through
    /// `transform` when given.
    Bound {
        template: &'static str,
        transform: Option<fn(FilterValue) -> FilterValue>,
    },
    /// Fixed clause emitted only for `TriState::True`; binds nothing.
    Flag { clause: &'static str },
}

#[derive(Debug, Clone, Copy)]
pub struct FilterRule {
    pub key: &'static str,
    pub predicate: Predicate,
}

/// Pair of numeric bounds that must not be inverted when both are given.
#[derive(Debug, Clone, Copy)]
pub struct RangeRule {
    pub min: &'static str,
    pub max: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct FilterRules {
    pub rules: &'static [FilterRule],
    pub ranges: &'static [RangeRule],
}

const TAUTOLOGY: &str = "1=1";

/// Wraps text terms as `%term%` for substring matching.
pub fn contains_pattern(value: FilterValue) -> FilterValue {
    match value {
        FilterValue::Text(s) => FilterValue::Text(format!("%{}%", s)),
        other => other,
    }
}

/// Render present filter terms as AND-joined clauses.
///
/// The returned SQL is never empty: with no active clause it is `1=1`, so
/// callers can always write `WHERE {sql}`.
pub fn build_where_fragment<T>(terms: &T, rules: &FilterRules) -> Result<SqlFragment, QueryError>
where
    T: FilterTerms + ?Sized,
{
    check_ranges(terms, rules.ranges)?;

    let mut clauses: Vec<String> = vec![];
    let mut values: Vec<SqlValue> = vec![];

    for rule in rules.rules {
        let Some(value) = terms.term(rule.key).filter(is_active) else {
            continue;
        };

        match rule.predicate {
            Predicate::Bound { template, transform } => {
                let value = match transform {
                    Some(f) => f(value),
                    None => value,
                };
                values.push(bind_value(rule.key, value)?);
                clauses.push(format!("{} ${}", template, values.len()));
            }
            Predicate::Flag { clause } => match value {
                FilterValue::Flag(TriState::True) => clauses.push(clause.to_string()),
                FilterValue::Flag(_) => {}
                _ => return Err(QueryError::InvalidTerm(rule.key)),
            },
        }
    }

    let sql = if clauses.is_empty() { TAUTOLOGY.to_string() } else { clauses.join(" AND ") };
    Ok(SqlFragment { sql, values })
}

fn is_active(value: &FilterValue) -> bool {
    match value {
        FilterValue::Text(s) => !s.is_empty(),
        FilterValue::Int(_) => true,
        FilterValue::Flag(state) => *state != TriState::Unset,
    }
}

fn bind_value(key: &'static str, value: FilterValue) -> Result<SqlValue, QueryError> {
    match value {
        FilterValue::Text(s) => Ok(SqlValue::Text(Some(s))),
        FilterValue::Int(i) => Ok(SqlValue::Int(Some(i))),
        FilterValue::Flag(_) => Err(QueryError::InvalidTerm(key)),
    }
}

fn check_ranges<T>(terms: &T, ranges: &[RangeRule]) -> Result<(), QueryError>
where
    T: FilterTerms + ?Sized,
{
    for range in ranges {
        if let (Some(FilterValue::Int(min)), Some(FilterValue::Int(max))) = (terms.term(range.min), terms.term(range.max)) {
            if min > max {
                return Err(QueryError::RangeConflict { min: range.min, max: range.max });
            }
        }
    }
    Ok(())
}
