pub mod auth;
pub mod response;

pub use auth::{authenticate_jwt, CurrentUser};
pub use response::{ApiResponse, ApiResult};
