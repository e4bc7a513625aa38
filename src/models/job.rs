use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::query::{
    bind_values_as, build_set_fragment, build_where_fragment, contains_pattern, ColumnMap, FieldUpdates,
    FilterRule, FilterRules, FilterTerms, FilterValue, Predicate, TriState,
};

use super::company::Company;
use super::nullable;
use super::validation::Validator;

/// Job fields share their column names.
pub const JOB_COLUMNS: ColumnMap = &[];

pub const JOB_FILTERS: FilterRules = FilterRules {
    rules: &[
        FilterRule {
            key: "title",
            predicate: Predicate::Bound { template: "title ILIKE", transform: Some(contains_pattern) },
        },
        FilterRule {
            key: "minSalary",
            predicate: Predicate::Bound { template: "salary >=", transform: None },
        },
        FilterRule { key: "hasEquity", predicate: Predicate::Flag { clause: "equity > 0" } },
    ],
    ranges: &[],
};

const JOB_SELECT: &str = "id, title, salary, equity, company_handle";

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// Job as listed under its company.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct JobSummary {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
}

/// Job as returned by search, with the owning company's name.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
    pub company_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobDetail {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company: Company,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl NewJob {
    pub fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .length("title", &self.title, 1, usize::MAX)
            .non_negative("salary", self.salary)
            .fraction("equity", self.equity)
            .length("companyHandle", &self.company_handle, 1, 25)
            .finish("Invalid job")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobUpdate {
    #[serde(default, deserialize_with = "nullable")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub salary: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub equity: Option<Option<Decimal>>,
}

impl JobUpdate {
    pub fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .not_null("title", &self.title)
            .optional_length("title", self.title.as_ref().and_then(Option::as_deref), 1, usize::MAX)
            .non_negative("salary", self.salary.flatten())
            .fraction("equity", self.equity.flatten())
            .finish("Invalid job update")
    }

    pub fn into_updates(self) -> FieldUpdates {
        let mut updates = FieldUpdates::new();
        updates
            .set_if("title", self.title)
            .set_if("salary", self.salary)
            .set_if("equity", self.equity);
        updates
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobSearch {
    pub title: Option<String>,
    pub min_salary: Option<i32>,
    #[serde(default)]
    pub has_equity: TriState,
}

impl JobSearch {
    pub fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .non_negative("minSalary", self.min_salary)
            .finish("Invalid job search")
    }
}

impl FilterTerms for JobSearch {
    fn term(&self, key: &str) -> Option<FilterValue> {
        match key {
            "title" => self.title.clone().map(FilterValue::Text),
            "minSalary" => self.min_salary.map(FilterValue::Int),
            "hasEquity" => Some(FilterValue::Flag(self.has_equity)),
            _ => None,
        }
    }
}

impl Job {
    pub async fn create(pool: &PgPool, data: NewJob) -> Result<Job, DatabaseError> {
        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) VALUES ($1, $2, $3, $4) RETURNING {}",
            JOB_SELECT
        );
        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(&data.title)
            .bind(data.salary)
            .bind(data.equity)
            .bind(&data.company_handle)
            .fetch_one(pool)
            .await
            .map_err(|e| match DatabaseError::from(e) {
                DatabaseError::InvalidReference(_) => {
                    DatabaseError::InvalidReference(format!("No company: {}", data.company_handle))
                }
                other => other,
            })?;

        tracing::info!("Created job {} for {}", job.id, job.company_handle);
        Ok(job)
    }

    pub async fn find_all(pool: &PgPool, search: &JobSearch) -> Result<Vec<JobListing>, DatabaseError> {
        let fragment = build_where_fragment(search, &JOB_FILTERS)?;
        let sql = format!(
            "SELECT j.id, j.title, j.salary, j.equity, j.company_handle, c.name AS company_name \
             FROM jobs j LEFT JOIN companies c ON c.handle = j.company_handle \
             WHERE {} ORDER BY j.title, j.id",
            fragment.sql
        );

        let q = bind_values_as(sqlx::query_as::<_, JobListing>(&sql), &fragment.values);
        Ok(q.fetch_all(pool).await?)
    }

    pub async fn get(pool: &PgPool, id: i32) -> Result<JobDetail, DatabaseError> {
        let sql = format!("SELECT {} FROM jobs WHERE id = $1", JOB_SELECT);
        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| not_found(id))?;

        let company = sqlx::query_as::<_, Company>(
            "SELECT handle, name, description, num_employees, logo_url FROM companies WHERE handle = $1",
        )
        .bind(&job.company_handle)
        .fetch_one(pool)
        .await?;

        Ok(JobDetail {
            id: job.id,
            title: job.title,
            salary: job.salary,
            equity: job.equity,
            company,
        })
    }

    pub async fn update(pool: &PgPool, id: i32, data: JobUpdate) -> Result<Job, DatabaseError> {
        let fragment = build_set_fragment(&data.into_updates(), JOB_COLUMNS)?;
        let sql = format!(
            "UPDATE jobs SET {} WHERE id = ${} RETURNING {}",
            fragment.sql,
            fragment.next_placeholder(),
            JOB_SELECT
        );

        let q = bind_values_as(sqlx::query_as::<_, Job>(&sql), &fragment.values).bind(id);
        q.fetch_optional(pool).await?.ok_or_else(|| not_found(id))
    }

    pub async fn remove(pool: &PgPool, id: i32) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM jobs WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| not_found(id))?;

        tracing::info!("Deleted job {}", id);
        Ok(())
    }
}

pub(crate) fn not_found(id: i32) -> DatabaseError {
    DatabaseError::NotFound(format!("No job: {}", id))
}
