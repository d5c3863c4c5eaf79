//! Data models shared across the database layer.

pub mod response;
pub mod statement;

pub use response::{DatabaseResponse, GENERIC_ERROR_CODE, QueryResult, ResponseError};
pub use statement::{SqlParam, SqlStatement};
