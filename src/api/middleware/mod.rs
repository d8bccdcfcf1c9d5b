pub mod auth;
pub mod cors;
pub mod request_log;

pub use auth::{AUTH_HEADER, TokenAuth};
pub use cors::CorsHeaders;
pub use request_log::{RequestId, RequestLogger};
