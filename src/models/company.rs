use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::query::{
    bind_values_as, build_set_fragment, build_where_fragment, contains_pattern, ColumnMap, FieldUpdates,
    FilterRule, FilterRules, FilterTerms, FilterValue, Predicate, RangeRule,
};

use super::job::JobSummary;
use super::nullable;
use super::validation::Validator;

pub const COMPANY_COLUMNS: ColumnMap = &[("numEmployees", "num_employees"), ("logoUrl", "logo_url")];

pub const COMPANY_FILTERS: FilterRules = FilterRules {
    rules: &[
        FilterRule {
            key: "name",
            predicate: Predicate::Bound { template: "name ILIKE", transform: Some(contains_pattern) },
        },
        FilterRule {
            key: "minEmployees",
            predicate: Predicate::Bound { template: "num_employees >=", transform: None },
        },
        FilterRule {
            key: "maxEmployees",
            predicate: Predicate::Bound { template: "num_employees <=", transform: None },
        },
    ],
    ranges: &[RangeRule { min: "minEmployees", max: "maxEmployees" }],
};

const COMPANY_SELECT: &str = "handle, name, description, num_employees, logo_url";

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<JobSummary>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl NewCompany {
    pub fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .length("handle", &self.handle, 1, 25)
            .check("handle", self.handle == self.handle.to_lowercase(), "must be lowercase")
            .length("name", &self.name, 1, usize::MAX)
            .non_negative("numEmployees", self.num_employees)
            .url("logoUrl", self.logo_url.as_deref())
            .finish("Invalid company")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyUpdate {
    #[serde(default, deserialize_with = "nullable")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub num_employees: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub logo_url: Option<Option<String>>,
}

impl CompanyUpdate {
    pub fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .not_null("name", &self.name)
            .not_null("description", &self.description)
            .optional_length("name", self.name.as_ref().and_then(Option::as_deref), 1, usize::MAX)
            .non_negative("numEmployees", self.num_employees.flatten())
            .url("logoUrl", self.logo_url.as_ref().and_then(|v| v.as_deref()))
            .finish("Invalid company update")
    }

    pub fn into_updates(self) -> FieldUpdates {
        let mut updates = FieldUpdates::new();
        updates
            .set_if("name", self.name)
            .set_if("description", self.description)
            .set_if("numEmployees", self.num_employees)
            .set_if("logoUrl", self.logo_url);
        updates
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanySearch {
    pub name: Option<String>,
    pub min_employees: Option<i32>,
    pub max_employees: Option<i32>,
}

impl CompanySearch {
    pub fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .non_negative("minEmployees", self.min_employees)
            .non_negative("maxEmployees", self.max_employees)
            .finish("Invalid company search")
    }
}

impl FilterTerms for CompanySearch {
    fn term(&self, key: &str) -> Option<FilterValue> {
        match key {
            "name" => self.name.clone().map(FilterValue::Text),
            "minEmployees" => self.min_employees.map(FilterValue::Int),
            "maxEmployees" => self.max_employees.map(FilterValue::Int),
            _ => None,
        }
    }
}

impl Company {
    pub async fn create(pool: &PgPool, data: NewCompany) -> Result<Company, DatabaseError> {
        let existing = sqlx::query("SELECT handle FROM companies WHERE handle = $1")
            .bind(&data.handle)
            .fetch_optional(pool)
            .await?;
        if existing.is_some() {
            return Err(DatabaseError::Duplicate(format!("Duplicate company: {}", data.handle)));
        }

        let sql = format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            COMPANY_SELECT
        );
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(&data.handle)
            .bind(&data.name)
            .bind(&data.description)
            .bind(data.num_employees)
            .bind(data.logo_url.as_deref())
            .fetch_one(pool)
            .await?;

        tracing::info!("Created company {}", company.handle);
        Ok(company)
    }

    pub async fn find_all(pool: &PgPool, search: &CompanySearch) -> Result<Vec<Company>, DatabaseError> {
        let fragment = build_where_fragment(search, &COMPANY_FILTERS)?;
        let sql = format!("SELECT {} FROM companies WHERE {} ORDER BY name", COMPANY_SELECT, fragment.sql);

        let q = bind_values_as(sqlx::query_as::<_, Company>(&sql), &fragment.values);
        Ok(q.fetch_all(pool).await?)
    }

    pub async fn get(pool: &PgPool, handle: &str) -> Result<CompanyDetail, DatabaseError> {
        let sql = format!("SELECT {} FROM companies WHERE handle = $1", COMPANY_SELECT);
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(handle)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| not_found(handle))?;

        let jobs = sqlx::query_as::<_, JobSummary>(
            "SELECT id, title, salary, equity FROM jobs WHERE company_handle = $1 ORDER BY id",
        )
        .bind(handle)
        .fetch_all(pool)
        .await?;

        Ok(CompanyDetail { company, jobs })
    }

    pub async fn update(pool: &PgPool, handle: &str, data: CompanyUpdate) -> Result<Company, DatabaseError> {
        let fragment = build_set_fragment(&data.into_updates(), COMPANY_COLUMNS)?;
        let sql = format!(
            "UPDATE companies SET {} WHERE handle = ${} RETURNING {}",
            fragment.sql,
            fragment.next_placeholder(),
            COMPANY_SELECT
        );

        let q = bind_values_as(sqlx::query_as::<_, Company>(&sql), &fragment.values).bind(handle);
        q.fetch_optional(pool).await?.ok_or_else(|| not_found(handle))
    }

    pub async fn remove(pool: &PgPool, handle: &str) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM companies WHERE handle = $1 RETURNING handle")
            .bind(handle)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| not_found(handle))?;

        tracing::info!("Deleted company {}", handle);
        Ok(())
    }
}

fn not_found(handle: &str) -> DatabaseError {
    DatabaseError::NotFound(format!("No company: {}", handle))
}
