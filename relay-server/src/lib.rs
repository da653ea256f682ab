pub mod admin;
pub mod error;
pub mod health;
pub mod logger;
pub mod routes;

pub use error::{Result as ServerResult, ServerError};

pub use crate::routes::build_router;
