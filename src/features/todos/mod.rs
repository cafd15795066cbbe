pub mod dtos;
pub mod handlers;
pub mod models;
pub mod payload;
pub mod query;
pub mod routes;
pub mod services;

pub use services::TodoService;
