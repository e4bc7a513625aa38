use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("No data")]
    EmptyInput,

    #[error("{min} cannot be greater than {max}")]
    RangeConflict { min: &'static str, max: &'static str },

    #[error("Invalid value for filter: {0}")]
    InvalidTerm(&'static str),
}
