pub mod auth;
pub mod categories;
pub mod graphql;
pub mod todos;
