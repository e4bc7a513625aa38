pub mod bind;
pub mod error;
pub mod set_fragment;
pub mod types;
pub mod where_fragment;

pub use bind::{bind_values, bind_values_as};
pub use error::QueryError;
pub use set_fragment::build_set_fragment;
pub use types::*;
pub use where_fragment::{
    build_where_fragment, contains_pattern, FilterRule, FilterRules, Predicate, RangeRule,
};
