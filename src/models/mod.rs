pub mod company;
pub mod job;
pub mod user;
pub mod validation;

pub use company::{Company, CompanyDetail, CompanySearch, CompanyUpdate, NewCompany};
pub use job::{Job, JobDetail, JobListing, JobSearch, JobSummary, JobUpdate, NewJob};
pub use user::{Credentials, NewUser, Registration, User, UserDetail, UserUpdate};

use serde::{Deserialize, Deserializer};

/// Distinguishes an explicit `null` from an omitted field: use together with
/// `#[serde(default)]` on an `Option<Option<T>>`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
