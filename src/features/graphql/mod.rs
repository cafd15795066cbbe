pub mod routes;
pub mod schema;

pub use schema::{build_schema, AppSchema, Principal};
